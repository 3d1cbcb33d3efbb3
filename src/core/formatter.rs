use std::path::Path;
use std::time::Duration;

use crate::core::request::ResolvedRequest;

pub fn format_request_lines(request: &ResolvedRequest) -> [String; 2] {
    let mut settings = format!("Format: {} | Quality: {}", request.format, request.quality);
    if let Some(resolution) = &request.resolution {
        settings.push_str(&format!(" | Resolution: {resolution}"));
    }
    if let Some(codec) = request.codec {
        settings.push_str(&format!(" | Codec: {codec}"));
    }

    [
        format!(
            "Converting: {} -> {}",
            request.input.display(),
            request.output.display()
        ),
        settings,
    ]
}

pub fn format_done_line(elapsed: Duration, output: &Path, size_bytes: Option<u64>) -> String {
    let size = size_bytes
        .map(|bytes| format!(" ({})", format_bytes(bytes)))
        .unwrap_or_default();
    format!(
        "Done in {} -> {}{size}",
        format_duration(elapsed),
        output.display()
    )
}

pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

pub fn format_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;
    let value = bytes as f64;
    if value >= GB {
        format!("{:.2} GB", value / GB)
    } else if value >= MB {
        format!("{:.2} MB", value / MB)
    } else if value >= KB {
        format!("{:.2} KB", value / KB)
    } else {
        format!("{} B", bytes)
    }
}
