//! `protobatch check` report.

use crate::cli::presentation::shared::{format_section_heading, status_mark};
use crate::error::ApiError;
use crate::probe::{DependencyStatus, ProbeResult};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckReport {
    pub compiler: String,
    pub compiler_status: ProbeResult,
    pub python: String,
    pub toolchain_status: ProbeResult,
    pub dependencies: Vec<DependencyStatus>,
}

impl CheckReport {
    pub fn all_ok(&self) -> bool {
        self.compiler_status.ok
            && self.toolchain_status.ok
            && self.dependencies.iter().all(|d| d.installed)
    }
}

pub fn format_check_report_text(report: &CheckReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading("Tools")));
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Tool", "Command", "Available", "Detail"]);
    table.add_row(vec![
        "Schema compiler".to_string(),
        report.compiler.clone(),
        status_mark(report.compiler_status.ok),
        report.compiler_status.detail.clone(),
    ]);
    table.add_row(vec![
        "gRPC toolchain".to_string(),
        report.python.clone(),
        status_mark(report.toolchain_status.ok),
        report.toolchain_status.detail.clone(),
    ]);
    out.push_str(&format!("{}\n\n", table));

    out.push_str(&format!("{}\n\n", format_section_heading("Python packages")));
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Package", "Module", "Installed"]);
    for dep in &report.dependencies {
        table.add_row(vec![
            dep.package.clone(),
            dep.module.clone(),
            status_mark(dep.installed),
        ]);
    }
    out.push_str(&format!("{}\n", table));

    if !report.toolchain_status.ok {
        out.push_str("\nRun `protobatch install-tools` to install grpcio-tools.\n");
    }
    out
}

pub fn format_check_report_json(report: &CheckReport) -> Result<String, ApiError> {
    serde_json::to_string_pretty(report)
        .map_err(|e| ApiError::ConfigError(format!("Failed to encode report: {}", e)))
}
