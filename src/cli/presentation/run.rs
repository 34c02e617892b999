//! Run events as timestamped log lines or JSON lines.

use crate::error::ApiError;
use crate::generation::RunEvent;
use chrono::NaiveTime;

/// `[HH:MM:SS] message`
pub fn format_log_line(time: NaiveTime, message: &str) -> String {
    format!("[{}] {}", time.format("%H:%M:%S"), message)
}

pub fn format_event_line(time: NaiveTime, event: &RunEvent) -> String {
    format_log_line(time, event.message())
}

/// One compact JSON object per event.
pub fn format_event_json(event: &RunEvent) -> Result<String, ApiError> {
    serde_json::to_string(event)
        .map_err(|e| ApiError::GenerationFailed(format!("Failed to encode event: {}", e)))
}
