//! Structured transcript logging.

pub mod jsonl_logger;
