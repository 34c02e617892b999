//! CLI presentation: text and json formatters per command family.

mod check;
mod files;
mod run;
mod shared;

pub use check::{format_check_report_json, format_check_report_text, CheckReport};
pub use files::{format_discovered_files, format_generated_files, list_generated_files};
pub use run::{format_event_json, format_event_line, format_log_line};
