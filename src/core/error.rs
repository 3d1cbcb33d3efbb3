use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("input file does not exist: {}", path.display())]
    InputNotFound { path: PathBuf },
    #[error("unsupported format: {value} (supported: mp4, mkv, webm, avi, mov)")]
    UnsupportedFormat { value: String },
    #[error("unsupported codec: {value} (supported: h264, h265, vp9)")]
    UnsupportedCodec { value: String },
    #[error("unsupported quality: {value} (supported: low, medium, high, lossless)")]
    UnsupportedQuality { value: String },
    #[error("invalid resolution: {value} (examples: 1080p, 720p, 480p, or 1920x1080)")]
    InvalidResolution { value: String },
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to run ffprobe: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("ffprobe failed (exit_code={exit_code:?}): {stderr}")]
    Failed {
        exit_code: Option<i32>,
        stderr: String,
    },
    #[error("unparsable duration from ffprobe: {output:?}")]
    Unparsable { output: String },
}

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(
        "{binary} not found in PATH. Install it:\n  macOS:   brew install ffmpeg\n  Ubuntu:  sudo apt install ffmpeg\n  Windows: https://ffmpeg.org/download.html"
    )]
    BinaryNotFound { binary: String },
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Probe(#[from] ProbeError),
    #[error("failed to start ffmpeg: {0}")]
    Spawn(std::io::Error),
    #[error("ffmpeg conversion failed (exit_code={exit_code:?}): {stderr}")]
    ProcessFailed {
        exit_code: Option<i32>,
        stderr: String,
    },
}
