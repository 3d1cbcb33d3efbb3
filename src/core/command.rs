use std::path::{Path, PathBuf};

use crate::core::options::{Codec, Format};
use crate::core::request::ResolvedRequest;

const AUDIO_CODEC: &str = "aac";
const AUDIO_BITRATE: &str = "128k";
const VP9_MARKER: &str = "vpx";

/// Everything ffmpeg needs for one conversion, in the order it is passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FfmpegCommand {
    pub input: PathBuf,
    pub output: PathBuf,
    pub video_codec: &'static str,
    pub crf: u8,
    pub scale: Option<String>,
}

impl FfmpegCommand {
    pub fn new(request: &ResolvedRequest) -> Self {
        let codec = request.codec.unwrap_or(match request.format {
            Format::Webm => Codec::Vp9,
            _ => Codec::H264,
        });

        Self {
            input: request.input.clone(),
            output: request.output.clone(),
            video_codec: codec.library(),
            crf: request.quality.crf(),
            scale: request.resolution.as_ref().map(|res| res.scale_filter()),
        }
    }

    /// VP9 only runs in constant quality mode when the target bitrate is zero.
    pub fn needs_zero_bitrate(&self) -> bool {
        self.video_codec.contains(VP9_MARKER)
    }

    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        args.push("-i".to_string());
        args.push(self.input.to_string_lossy().into_owned());
        args.push("-y".to_string());
        args.push("-progress".to_string());
        args.push("pipe:2".to_string());
        args.push("-nostats".to_string());

        args.push("-c:v".to_string());
        args.push(self.video_codec.to_string());

        args.push("-crf".to_string());
        args.push(self.crf.to_string());
        if self.needs_zero_bitrate() {
            args.push("-b:v".to_string());
            args.push("0".to_string());
        }

        args.push("-c:a".to_string());
        args.push(AUDIO_CODEC.to_string());
        args.push("-b:a".to_string());
        args.push(AUDIO_BITRATE.to_string());

        if let Some(scale) = &self.scale {
            args.push("-vf".to_string());
            args.push(scale.clone());
        }

        args.push(self.output.to_string_lossy().into_owned());

        args
    }
}

pub fn build_args(request: &ResolvedRequest) -> Vec<String> {
    FfmpegCommand::new(request).to_args()
}

/// Shell-quoted rendering of an invocation, for logs and `--dry-run`.
pub fn command_line(program: &Path, args: &[String]) -> String {
    let program = program.to_string_lossy();
    shell_words::join(std::iter::once(program.as_ref()).chain(args.iter().map(String::as_str)))
}
