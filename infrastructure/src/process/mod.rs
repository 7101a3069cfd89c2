//! Subprocess-backed port adapters.
//!
//! The external oracle and participants are opaque async calls; here each
//! one is a short-lived subprocess: the input goes to stdin, the reply
//! comes back on stdout. Binaries are resolved once at construction via
//! `which`, so a misconfigured command fails fast instead of mid-run.

pub mod command_oracle;
pub mod command_participant;

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Default time limit for one subprocess call.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(120);

/// Error resolving a configured command to an executable.
#[derive(Error, Debug)]
#[error("Command not found: {command}")]
pub struct CommandResolveError {
    pub command: String,
    #[source]
    source: which::Error,
}

/// Resolve `command` against PATH.
pub(crate) fn resolve_command(command: &str) -> Result<PathBuf, CommandResolveError> {
    which::which(command).map_err(|source| CommandResolveError {
        command: command.to_string(),
        source,
    })
}

/// Failure modes of one subprocess call.
#[derive(Error, Debug)]
pub(crate) enum CommandError {
    #[error("Failed to spawn: {0}")]
    Spawn(std::io::Error),

    #[error("I/O error: {0}")]
    Io(std::io::Error),

    #[error("Exited with {status}: {stderr}")]
    NonZeroExit {
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

/// Run the program once: feed `input` to stdin, wait for exit, return
/// trimmed stdout. Kills the process on timeout.
///
/// The stdin write happens inside the timed section, concurrently with the
/// wait: input larger than the pipe buffer fed to a child that is slow to
/// read it (or never reads it) still respects the timeout.
pub(crate) async fn run_command(
    program: &PathBuf,
    args: &[String],
    input: &str,
    timeout: Duration,
) -> Result<String, CommandError> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(CommandError::Spawn)?;

    let stdin = child.stdin.take();
    let output = tokio::time::timeout(timeout, async {
        let feed = async {
            if let Some(mut stdin) = stdin {
                stdin.write_all(input.as_bytes()).await?;
                // Close stdin so the child sees EOF
                drop(stdin);
            }
            Ok::<_, std::io::Error>(())
        };
        let (fed, output) = tokio::join!(feed, child.wait_with_output());
        // A child that exits without draining its stdin is judged by its
        // exit status, not by the resulting broken pipe.
        if let Err(e) = fed
            && e.kind() != std::io::ErrorKind::BrokenPipe
        {
            return Err(CommandError::Io(e));
        }
        output.map_err(CommandError::Io)
    })
    .await
    .map_err(|_| CommandError::Timeout(timeout))??;

    if !output.status.success() {
        return Err(CommandError::NonZeroExit {
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_command_captures_stdout() {
        let cat = resolve_command("cat").unwrap();
        let output = run_command(&cat, &[], "hello\n", DEFAULT_COMMAND_TIMEOUT)
            .await
            .unwrap();
        assert_eq!(output, "hello");
    }

    #[tokio::test]
    async fn test_run_command_nonzero_exit() {
        let sh = resolve_command("sh").unwrap();
        let args = vec!["-c".to_string(), "echo oops >&2; exit 3".to_string()];
        let err = run_command(&sh, &args, "", DEFAULT_COMMAND_TIMEOUT)
            .await
            .unwrap_err();
        match err {
            CommandError::NonZeroExit { stderr, .. } => assert_eq!(stderr, "oops"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_run_command_timeout() {
        let sleep = resolve_command("sleep").unwrap();
        let err = run_command(
            &sleep,
            &["5".to_string()],
            "",
            Duration::from_millis(50),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CommandError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_timeout_covers_stdin_write() {
        // A child that never reads stdin, fed more than a pipe buffer holds:
        // the write blocks, and the timeout must still fire on time.
        let sleep = resolve_command("sleep").unwrap();
        let input = "x".repeat(256 * 1024);
        let start = std::time::Instant::now();
        let err = run_command(
            &sleep,
            &["3".to_string()],
            &input,
            Duration::from_millis(100),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CommandError::Timeout(_)));
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_child_exiting_without_reading_stdin_is_not_an_error() {
        let truth = resolve_command("true").unwrap();
        let input = "x".repeat(256 * 1024);
        let output = run_command(&truth, &[], &input, DEFAULT_COMMAND_TIMEOUT)
            .await
            .unwrap();
        assert_eq!(output, "");
    }

    #[test]
    fn test_resolve_missing_command() {
        let err = resolve_command("definitely-not-a-real-binary-xyz").unwrap_err();
        assert!(err.to_string().contains("definitely-not-a-real-binary"));
    }
}
