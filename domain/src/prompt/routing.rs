//! Routing prompt renderer.
//!
//! Deterministic projection of the history snapshot plus the static routing
//! rules into the single prompt string sent to the decision oracle. Pure
//! function of its inputs, no side effects.

use crate::conversation::entities::{Message, Participant};
use crate::util::truncate_marked;

/// Default per-message truncation length in bytes.
pub const DEFAULT_MAX_MESSAGE_LEN: usize = 600;

/// Default budget for the whole rendered prompt in bytes.
pub const DEFAULT_MAX_RENDERED_LEN: usize = 12_000;

/// Length budgets for prompt rendering.
#[derive(Debug, Clone, Copy)]
pub struct RenderLimits {
    /// Message bodies longer than this are cut with an explicit marker.
    pub max_message_len: usize,
    /// If the full rendering would exceed this, the oldest messages are
    /// dropped first until the most recent N fit.
    pub max_rendered_len: usize,
}

impl Default for RenderLimits {
    fn default() -> Self {
        Self {
            max_message_len: DEFAULT_MAX_MESSAGE_LEN,
            max_rendered_len: DEFAULT_MAX_RENDERED_LEN,
        }
    }
}

/// Template for the routing decision prompt.
///
/// Holds the static parts (roster and decision rules); [`render`] combines
/// them with a history snapshot.
///
/// [`render`]: RoutingPrompt::render
#[derive(Debug, Clone)]
pub struct RoutingPrompt {
    participants: Vec<Participant>,
    rules: Vec<String>,
    limits: RenderLimits,
}

impl RoutingPrompt {
    /// Generic decision rules used when the caller supplies none.
    pub fn default_rules(participants: &[Participant]) -> Vec<String> {
        let mut rules = vec![
            "Pick the participant whose capabilities best match what the conversation needs next."
                .to_string(),
            "If a participant's output was rejected or sent back, route to the participant who \
             can fix it, not back to the start."
                .to_string(),
        ];
        if let Some(first) = participants.first() {
            rules.push(format!(
                "If no participant has spoken yet, select {}.",
                first.name
            ));
        }
        rules.push(format!(
            "If the shared goal is complete, respond {}.",
            crate::routing::termination::TERMINATE_KEYWORD
        ));
        rules
    }

    pub fn new(participants: Vec<Participant>) -> Self {
        let rules = Self::default_rules(&participants);
        Self {
            participants,
            rules,
            limits: RenderLimits::default(),
        }
    }

    pub fn with_rules(mut self, rules: Vec<String>) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_limits(mut self, limits: RenderLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Render the full prompt: preamble, roster, ordered decision rules,
    /// then the messages as `[author]: text` lines in sequence order.
    ///
    /// Each message body longer than the per-message budget is truncated
    /// with an explicit marker. If the whole rendering would exceed the
    /// total budget, only the most recent messages that fit are included
    /// (oldest dropped first, with an omission note). The most recent
    /// message is always included, even if that overruns the budget.
    pub fn render(&self, messages: &[Message]) -> String {
        let mut prompt = String::new();
        prompt.push_str(
            "You are the routing orchestrator for a team of cooperating agents.\n\
             Your ONLY job is to decide which participant should speak next.\n\n",
        );

        prompt.push_str("Available participants:\n");
        for p in &self.participants {
            prompt.push_str(&format!("- {}: {}\n", p.name, p.description));
        }
        prompt.push('\n');

        prompt.push_str("Decision rules:\n");
        for (i, rule) in self.rules.iter().enumerate() {
            prompt.push_str(&format!("{}. {}\n", i + 1, rule));
        }
        prompt.push('\n');

        let footer = self.footer();
        let lines: Vec<String> = messages
            .iter()
            .map(|m| {
                format!(
                    "[{}]: {}\n",
                    m.author.display_name(),
                    truncate_marked(&m.text, self.limits.max_message_len)
                )
            })
            .collect();

        // Budget left for the history section, after the static parts.
        let header = "Conversation history:\n\n";
        let fixed = prompt.len() + header.len() + footer.len();
        let budget = self.limits.max_rendered_len.saturating_sub(fixed);

        let mut used = 0usize;
        let mut keep_from = lines.len();
        for line in lines.iter().rev() {
            if keep_from < lines.len() && used + line.len() > budget {
                break;
            }
            used += line.len();
            keep_from -= 1;
        }

        prompt.push_str(header);
        if keep_from > 0 {
            prompt.push_str(&format!("({} earlier messages omitted)\n", keep_from));
        }
        for line in &lines[keep_from..] {
            prompt.push_str(line);
        }
        prompt.push_str(&footer);

        prompt
    }

    fn footer(&self) -> String {
        let names: Vec<&str> = self.participants.iter().map(|p| p.name.as_str()).collect();
        format!(
            "\nBased on this conversation, which participant should speak next?\n\
             Reply with ONLY one word: {}, or {}.\n",
            names.join(", "),
            crate::routing::termination::TERMINATE_KEYWORD
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::entities::Message;
    use crate::util::TRUNCATION_MARKER;

    fn roster() -> Vec<Participant> {
        vec![
            Participant::new("Analyst", "reads issues and creates implementation plans"),
            Participant::new("Coder", "writes code based on the plan"),
            Participant::new("Reviewer", "reviews code and creates pull requests"),
        ]
    }

    fn sample_messages() -> Vec<Message> {
        vec![
            Message::initiator("start task", 0),
            Message::participant("Analyst", "here is the plan", 1),
            Message::participant("Coder", "code written", 2),
        ]
    }

    /// Re-parse `[author]: text` pairs out of a rendered prompt.
    fn parse_rendered(prompt: &str) -> Vec<(String, String)> {
        prompt
            .lines()
            .filter_map(|line| {
                let rest = line.strip_prefix('[')?;
                let (author, text) = rest.split_once("]: ")?;
                Some((author.to_string(), text.to_string()))
            })
            .collect()
    }

    #[test]
    fn test_render_contains_all_sections() {
        let prompt = RoutingPrompt::new(roster()).render(&sample_messages());
        assert!(prompt.contains("Available participants:"));
        assert!(prompt.contains("- Coder: writes code based on the plan"));
        assert!(prompt.contains("Decision rules:"));
        assert!(prompt.contains("Conversation history:"));
        assert!(prompt.contains("[initiator]: start task"));
        assert!(prompt.contains("[Analyst]: here is the plan"));
        assert!(prompt.contains("TERMINATE"));
    }

    #[test]
    fn test_round_trip_preserves_count_and_order() {
        let messages = sample_messages();
        let prompt = RoutingPrompt::new(roster()).render(&messages);
        let parsed = parse_rendered(&prompt);
        assert_eq!(parsed.len(), messages.len());
        for (message, (author, text)) in messages.iter().zip(&parsed) {
            assert_eq!(message.author.display_name(), author);
            assert_eq!(&message.text, text);
        }
    }

    #[test]
    fn test_long_message_truncated_with_marker() {
        let limits = RenderLimits {
            max_message_len: 20,
            max_rendered_len: DEFAULT_MAX_RENDERED_LEN,
        };
        let messages = vec![Message::initiator("x".repeat(100), 0)];
        let prompt = RoutingPrompt::new(roster())
            .with_limits(limits)
            .render(&messages);
        assert!(prompt.contains(TRUNCATION_MARKER));
        assert!(!prompt.contains(&"x".repeat(21)));
    }

    #[test]
    fn test_oldest_dropped_first_under_total_budget() {
        let mut messages = vec![Message::initiator("start", 0)];
        for i in 1..=50 {
            messages.push(Message::participant(
                "Coder",
                format!("progress update number {i}"),
                i,
            ));
        }
        let limits = RenderLimits {
            max_message_len: 600,
            max_rendered_len: 1200,
        };
        let prompt = RoutingPrompt::new(roster())
            .with_limits(limits)
            .render(&messages);

        assert!(prompt.contains("earlier messages omitted"));
        // Newest survives, oldest does not
        assert!(prompt.contains("progress update number 50"));
        assert!(!prompt.contains("[initiator]: start"));

        let parsed = parse_rendered(&prompt);
        assert!(!parsed.is_empty());
        assert!(parsed.len() < messages.len());
        // Order of the kept tail is preserved
        let tail = &messages[messages.len() - parsed.len()..];
        for (message, (author, _)) in tail.iter().zip(&parsed) {
            assert_eq!(message.author.display_name(), author);
        }
    }

    #[test]
    fn test_newest_message_always_kept() {
        let messages = vec![
            Message::initiator("start", 0),
            Message::participant("Coder", "y".repeat(500), 1),
        ];
        let limits = RenderLimits {
            max_message_len: 600,
            max_rendered_len: 10, // absurdly small
        };
        let prompt = RoutingPrompt::new(roster())
            .with_limits(limits)
            .render(&messages);
        let parsed = parse_rendered(&prompt);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].0, "Coder");
    }

    #[test]
    fn test_render_is_deterministic() {
        let template = RoutingPrompt::new(roster());
        let messages = sample_messages();
        assert_eq!(template.render(&messages), template.render(&messages));
    }
}
