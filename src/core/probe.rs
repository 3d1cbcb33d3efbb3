use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;

use crate::core::error::ProbeError;

/// Asks ffprobe for the container duration, printed as bare seconds.
pub fn probe_duration(ffprobe: &Path, input: &Path) -> Result<Duration, ProbeError> {
    let output = Command::new(ffprobe)
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(input)
        .stdin(Stdio::null())
        .output()?;

    if !output.status.success() {
        return Err(ProbeError::Failed {
            exit_code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    parse_duration_output(&String::from_utf8_lossy(&output.stdout))
}

pub fn parse_duration_output(stdout: &str) -> Result<Duration, ProbeError> {
    let trimmed = stdout.trim();
    trimmed
        .parse::<f64>()
        .ok()
        .and_then(|seconds| Duration::try_from_secs_f64(seconds).ok())
        .ok_or_else(|| ProbeError::Unparsable {
            output: trimmed.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_seconds() {
        assert_eq!(
            parse_duration_output("20.000000\n").unwrap(),
            Duration::from_secs(20)
        );
        assert_eq!(
            parse_duration_output("  1.5 ").unwrap(),
            Duration::from_millis(1500)
        );
    }

    #[test]
    fn rejects_non_numeric_output() {
        for output in ["N/A", "", "duration=20.0", "-3.0", "NaN"] {
            assert!(
                matches!(
                    parse_duration_output(output),
                    Err(ProbeError::Unparsable { .. })
                ),
                "{output:?}"
            );
        }
    }

    #[test]
    fn missing_binary_is_a_spawn_error() {
        let result = probe_duration(
            Path::new("/nonexistent/ffprobe-for-tests"),
            Path::new("a.mov"),
        );
        assert!(matches!(result, Err(ProbeError::Spawn(_))));
    }
}
