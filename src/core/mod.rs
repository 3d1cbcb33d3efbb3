use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};

use tracing::{debug, info, warn};

pub mod command;
pub mod error;
pub mod formatter;
pub mod job;
pub mod options;
pub mod probe;
pub mod progress;
pub mod request;

use command::{build_args, command_line};
use error::ConvertError;
use job::{Job, JobStatus};
use progress::TotalDuration;
use request::ResolvedRequest;

/// External binaries the converter shells out to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tools {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl Default for Tools {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
        }
    }
}

impl Tools {
    /// Locates ffmpeg before any other work is done. ffprobe is optional.
    pub fn check(&self) -> Result<PathBuf, ConvertError> {
        let found = which::which(&self.ffmpeg).map_err(|_| ConvertError::BinaryNotFound {
            binary: self.ffmpeg.display().to_string(),
        })?;
        debug!(ffmpeg = %found.display(), "found ffmpeg");

        if which::which(&self.ffprobe).is_err() {
            warn!(
                ffprobe = %self.ffprobe.display(),
                "ffprobe not found, progress percentage will be unavailable"
            );
        }

        Ok(found)
    }
}

/// Best effort: any probe failure means the duration is unknown.
pub fn total_duration(tools: &Tools, input: &Path) -> Option<TotalDuration> {
    match probe::probe_duration(&tools.ffprobe, input) {
        Ok(duration) => {
            debug!(seconds = duration.as_secs_f64(), "probed input duration");
            TotalDuration::new(duration)
        }
        Err(err) => {
            warn!(error = %err, "could not determine input duration");
            None
        }
    }
}

/// Converts `request` and blocks until ffmpeg exits.
///
/// `on_progress` runs on the thread that reads ffmpeg's diagnostic stream and only fires
/// when the input duration is known.
pub fn convert<F>(request: &ResolvedRequest, tools: &Tools, on_progress: F) -> Result<Job, ConvertError>
where
    F: FnMut(f64) + Send + 'static,
{
    let total = total_duration(tools, &request.input);
    run_args_with_progress(&tools.ffmpeg, build_args(request), total, on_progress)
}

pub fn run_args_with_progress<F>(
    ffmpeg: &Path,
    args: Vec<String>,
    total: Option<TotalDuration>,
    on_progress: F,
) -> Result<Job, ConvertError>
where
    F: FnMut(f64) + Send + 'static,
{
    let mut job = Job::start(total.map(TotalDuration::get));

    info!(command = %command_line(ffmpeg, &args), "starting ffmpeg");

    let mut cmd = Command::new(ffmpeg);
    cmd.args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped());

    let mut child = cmd.spawn().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConvertError::BinaryNotFound {
                binary: ffmpeg.display().to_string(),
            }
        } else {
            ConvertError::Spawn(e)
        }
    })?;

    let stderr = child.stderr.take().ok_or_else(|| ConvertError::ProcessFailed {
        exit_code: None,
        stderr: "failed to capture ffmpeg stderr".to_string(),
    })?;

    let reader_handle = thread::spawn(move || match total {
        Some(total) => progress::stream_progress(stderr, total, on_progress),
        None => progress::drain(stderr),
    });

    let waited = child.wait();
    let (waited, tail) = settle(
        waited,
        || {
            let _ = child.kill();
            let _ = child.wait();
        },
        reader_handle,
    );
    let status = waited.map_err(|e| ConvertError::ProcessFailed {
        exit_code: None,
        stderr: e.to_string(),
    })?;

    if status.success() {
        job.finish(JobStatus::Finished);
        info!(elapsed_ms = job.elapsed().as_millis() as u64, "ffmpeg finished");
        Ok(job)
    } else {
        job.finish(JobStatus::Failed);
        warn!(exit_code = ?status.code(), "ffmpeg failed");
        let stderr = if tail.is_empty() {
            format!("ffmpeg exited with status {status}")
        } else {
            tail.into_string()
        };
        Err(ConvertError::ProcessFailed {
            exit_code: status.code(),
            stderr,
        })
    }
}

/// Joins the stderr reader once the child is done. If waiting failed the child is killed
/// first so the reader sees end of stream.
fn settle<T: Default>(
    waited: io::Result<ExitStatus>,
    kill: impl FnOnce(),
    reader: JoinHandle<T>,
) -> (io::Result<ExitStatus>, T) {
    if let Err(err) = &waited {
        warn!(error = %err, "waiting on ffmpeg failed, killing it");
        kill();
    }
    (waited, reader.join().unwrap_or_default())
}
