//! CLI domain: parse, route, help, output, and presentation only.
//! No generation logic; single route table dispatches to domain services.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::command_name;
pub use output::map_error;
pub use parse::{Cli, Commands, GenerateArgs};
pub use presentation::{
    format_check_report_json, format_check_report_text, format_discovered_files,
    format_event_json, format_event_line, format_generated_files, format_log_line,
    list_generated_files, CheckReport,
};
pub use route::RunContext;
