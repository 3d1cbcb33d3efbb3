use std::collections::VecDeque;
use std::io::{BufReader, ErrorKind, Read};
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;

static RE_OUT_TIME_US: Lazy<Regex> = Lazy::new(|| Regex::new(r"out_time_us=(\d+)").unwrap());
static RE_PROGRESS_KEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z0-9_]+=").unwrap());

/// Number of diagnostic lines kept for the error message of a failed run.
const TAIL_LINES: usize = 20;

/// Total media duration, known to be non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TotalDuration(Duration);

impl TotalDuration {
    pub fn new(duration: Duration) -> Option<Self> {
        if duration.is_zero() {
            None
        } else {
            Some(Self(duration))
        }
    }

    pub fn get(self) -> Duration {
        self.0
    }

    /// Share of this duration covered by `elapsed`, as a percentage clamped to `[0, 100]`.
    pub fn percent(self, elapsed: Duration) -> f64 {
        (elapsed.as_secs_f64() / self.0.as_secs_f64() * 100.0).clamp(0.0, 100.0)
    }
}

pub fn parse_out_time(line: &str) -> Option<Duration> {
    let micros = RE_OUT_TIME_US
        .captures(line)?
        .get(1)?
        .as_str()
        .parse::<u64>()
        .ok()?;
    Some(Duration::from_micros(micros))
}

/// Last few human readable lines of the diagnostic stream.
#[derive(Debug, Default)]
pub struct StderrTail {
    lines: VecDeque<String>,
}

impl StderrTail {
    fn push(&mut self, line: &str) {
        if RE_PROGRESS_KEY.is_match(line) {
            return;
        }
        if self.lines.len() == TAIL_LINES {
            self.lines.pop_front();
        }
        self.lines.push_back(line.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn into_string(self) -> String {
        Vec::from(self.lines).join("\n")
    }
}

/// Reads ffmpeg's diagnostic stream and reports completion for every `out_time_us` marker.
///
/// Percentages are forwarded in stream order. A marker past the end clamps to 100,
/// a marker lower than the previous one is reported as is.
pub fn stream_progress<R, F>(reader: R, total: TotalDuration, mut on_progress: F) -> StderrTail
where
    R: Read,
    F: FnMut(f64),
{
    let mut tail = StderrTail::default();
    for_each_line(reader, |line| {
        if let Some(elapsed) = parse_out_time(line) {
            on_progress(total.percent(elapsed));
        }
        tail.push(line);
    });
    tail
}

/// Consumes the stream without interpreting progress so the child never blocks on a full pipe.
pub fn drain<R: Read>(reader: R) -> StderrTail {
    let mut tail = StderrTail::default();
    for_each_line(reader, |line| tail.push(line));
    tail
}

/// Splits on both `\r` and `\n` since ffmpeg redraws its status line with carriage returns.
fn for_each_line<R: Read>(reader: R, mut handle: impl FnMut(&str)) {
    let mut reader = BufReader::new(reader);
    let mut line_buf: Vec<u8> = Vec::new();
    let mut byte = [0u8; 1];

    loop {
        match reader.read(&mut byte) {
            Ok(0) => break,
            Ok(_) => {}
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(_) => break,
        }

        match byte[0] {
            b'\r' | b'\n' => {
                emit_line(&mut line_buf, &mut handle);
            }
            other => {
                line_buf.push(other);
            }
        }
    }

    emit_line(&mut line_buf, &mut handle);
}

fn emit_line(line_buf: &mut Vec<u8>, handle: &mut impl FnMut(&str)) {
    if line_buf.is_empty() {
        return;
    }
    let line = String::from_utf8_lossy(line_buf).trim().to_string();
    line_buf.clear();
    if !line.is_empty() {
        handle(&line);
    }
}
