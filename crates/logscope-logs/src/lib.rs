//! Log processing for logscope
//!
//! This crate provides rule evaluation, bounded buffering and directory
//! scanning for log records.

mod buffer;
mod rules;
mod scan;

pub use buffer::{BufferError, LogBuffer};
pub use rules::{RuleError, RuleOp, RuleRegistry};
pub use scan::{ScanError, process_dir};

// Re-export types used in our public API
pub use logscope_types::{LogRecord, Rule};
