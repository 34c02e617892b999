//! Shared presentation helpers.

use owo_colors::OwoColorize;

pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

/// Check mark or cross for a yes/no cell.
pub(crate) fn status_mark(ok: bool) -> String {
    if ok {
        format!("{}", "✓".green())
    } else {
        format!("{}", "✗".red())
    }
}
