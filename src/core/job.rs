use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Running,
    Finished,
    Failed,
}

#[derive(Debug, Clone)]
pub struct Job {
    pub status: JobStatus,
    pub started_at: Instant,
    pub ended_at: Option<Instant>,
    /// `None` when ffprobe could not tell how long the input is.
    pub total_duration: Option<Duration>,
}

impl Job {
    pub fn start(total_duration: Option<Duration>) -> Self {
        Self {
            status: JobStatus::Running,
            started_at: Instant::now(),
            ended_at: None,
            total_duration,
        }
    }

    pub fn finish(&mut self, status: JobStatus) {
        self.status = status;
        self.ended_at = Some(Instant::now());
    }

    pub fn elapsed(&self) -> Duration {
        self.ended_at
            .unwrap_or_else(Instant::now)
            .duration_since(self.started_at)
    }
}
