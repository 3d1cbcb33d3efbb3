use std::fs;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use clap::{Parser, Subcommand};
use tracing::debug;

use crate::core::command::{build_args, command_line};
use crate::core::error::ConvertError;
use crate::core::formatter::{format_done_line, format_duration, format_request_lines};
use crate::core::options::{Codec, Format, Quality, ResolutionPreset};
use crate::core::probe::probe_duration;
use crate::core::request::{ConversionRequest, ResolvedRequest};
use crate::core::{self, Tools};
use crate::tui;

#[derive(Debug, Parser)]
#[command(
    name = "ffconvert",
    version,
    about = "A fast video converter powered by ffmpeg",
    long_about = "ffconvert converts video files between formats with quality control.\nIt wraps ffmpeg with sensible defaults and a progress bar."
)]
pub struct Cli {
    /// Print debug logs to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// ffmpeg binary to run
    #[arg(long, global = true, value_name = "PATH", env = "FFCONVERT_FFMPEG", default_value = "ffmpeg")]
    pub ffmpeg: PathBuf,

    /// ffprobe binary used to read the input duration
    #[arg(long, global = true, value_name = "PATH", env = "FFCONVERT_FFPROBE", default_value = "ffprobe")]
    pub ffprobe: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Convert a video file
    #[command(after_help = "Examples:\n  ffconvert convert video.mov -o output.mp4\n  ffconvert convert video.avi -f mkv -q high\n  ffconvert convert video.mp4 -r 720p -q low\n  ffconvert convert video.mov --codec h265 -q high -o compressed.mp4")]
    Convert(ConvertArgs),
    /// Print the duration of a media file
    Probe(ProbeArgs),
    /// List supported formats, qualities, codecs and resolutions
    Presets,
}

#[derive(Debug, Parser)]
pub struct ConvertArgs {
    /// Video file to convert
    #[arg(value_name = "INPUT", value_hint = clap::ValueHint::FilePath)]
    pub input: PathBuf,

    /// Output file path
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Output format (mp4, mkv, webm, avi, mov)
    #[arg(short, long)]
    pub format: Option<String>,

    /// Quality preset: low, medium, high, lossless (default: medium)
    #[arg(short, long)]
    pub quality: Option<String>,

    /// Target resolution (e.g. 1080p, 720p, 480p or 1280x720)
    #[arg(short, long)]
    pub resolution: Option<String>,

    /// Video codec (h264, h265, vp9)
    #[arg(long)]
    pub codec: Option<String>,

    /// Print the ffmpeg command without running it
    #[arg(short = 'p', long)]
    pub dry_run: bool,
}

#[derive(Debug, Parser)]
pub struct ProbeArgs {
    /// Media file to inspect
    #[arg(value_name = "INPUT", value_hint = clap::ValueHint::FilePath)]
    pub input: PathBuf,
}

impl Cli {
    pub fn tools(&self) -> Tools {
        Tools {
            ffmpeg: self.ffmpeg.clone(),
            ffprobe: self.ffprobe.clone(),
        }
    }
}

pub fn convert_args_to_request(args: &ConvertArgs) -> ConversionRequest {
    ConversionRequest {
        input: args.input.clone(),
        output: args.output.clone(),
        format: args.format.clone(),
        quality: args.quality.clone(),
        resolution: args.resolution.clone(),
        codec: args.codec.clone(),
    }
}

pub fn execute(cli: Cli) -> Result<(), ConvertError> {
    let tools = cli.tools();
    match cli.command {
        Commands::Convert(args) => run_convert(&args, tools, !cli.verbose),
        Commands::Probe(args) => {
            let duration = probe_duration(&tools.ffprobe, &args.input)?;
            println!(
                "{}: {} ({:.3}s)",
                args.input.display(),
                format_duration(duration),
                duration.as_secs_f64()
            );
            Ok(())
        }
        Commands::Presets => {
            for line in preset_lines() {
                println!("{line}");
            }
            Ok(())
        }
    }
}

fn run_convert(args: &ConvertArgs, tools: Tools, show_progress: bool) -> Result<(), ConvertError> {
    let ffmpeg = tools.check()?;
    let tools = Tools { ffmpeg, ..tools };

    let request = ResolvedRequest::try_from(convert_args_to_request(args))?;
    debug!(?request, "resolved conversion request");

    if args.dry_run {
        println!("{}", command_line(&tools.ffmpeg, &build_args(&request)));
        return Ok(());
    }

    for line in format_request_lines(&request) {
        println!("{line}");
    }

    let (progress_tx, progress_rx) = mpsc::channel::<f64>();
    let worker_request = request.clone();
    let worker = thread::spawn(move || {
        core::convert(&worker_request, &tools, move |percent| {
            let _ = progress_tx.send(percent);
        })
    });

    tui::show_progress(progress_rx, show_progress);

    let job = worker.join().map_err(|_| ConvertError::ProcessFailed {
        exit_code: None,
        stderr: "conversion thread panicked".to_string(),
    })??;

    let size = fs::metadata(&request.output).ok().map(|meta| meta.len());
    println!("{}", format_done_line(job.elapsed(), &request.output, size));
    Ok(())
}

pub fn preset_lines() -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("Formats:".to_string());
    for format in Format::ALL {
        lines.push(format!("  {format}"));
    }

    lines.push("Qualities:".to_string());
    for quality in Quality::ALL {
        lines.push(format!("  {:<10} crf {}", quality.as_str(), quality.crf()));
    }

    lines.push("Codecs:".to_string());
    for codec in Codec::ALL {
        lines.push(format!("  {:<10} {}", codec.as_str(), codec.library()));
    }

    lines.push("Resolutions:".to_string());
    for preset in ResolutionPreset::ALL {
        lines.push(format!("  {:<10} scale=-2:{}", preset.as_str(), preset.height()));
    }
    lines.push("  WxH        scale=W:H".to_string());

    lines
}
