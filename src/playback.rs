//! Deciding when a playing movie should report its position.

use crate::api::{Movie, ProgressUpdate};
use crate::config::PlaybackConfig;

/// Progress bookkeeping for one movie.
///
/// Feed it positions as they are observed; it hands back an update whenever
/// one is due. Reports are sent through `Library::record_progress`.
#[derive(Debug, Clone)]
pub struct PlaybackTracker {
    duration_secs: u64,
    interval_secs: u64,
    completion_ratio: f64,
    last_reported: Option<u64>,
    completed: bool,
}

impl PlaybackTracker {
    pub fn new(duration_secs: u64, config: &PlaybackConfig) -> Self {
        Self {
            duration_secs,
            interval_secs: config.report_interval_secs.max(1),
            completion_ratio: config.completion_ratio,
            last_reported: None,
            completed: false,
        }
    }

    pub fn for_movie(movie: &Movie, config: &PlaybackConfig) -> Self {
        Self::new(movie.duration_secs(), config)
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Record the current position; returns an update if one should be sent.
    pub fn observe(&mut self, position_secs: u64) -> Option<ProgressUpdate> {
        let position = self.clamp(position_secs);

        if !self.completed && self.crosses_completion(position) {
            self.completed = true;
            return Some(self.report(position));
        }

        let due = match self.last_reported {
            None => position >= self.interval_secs,
            Some(last) => position.abs_diff(last) >= self.interval_secs,
        };
        due.then(|| self.report(position))
    }

    /// Final update when playback stops, regardless of interval.
    pub fn finish(&mut self, position_secs: u64) -> ProgressUpdate {
        let position = self.clamp(position_secs);
        if self.crosses_completion(position) {
            self.completed = true;
        }
        self.report(position)
    }

    fn clamp(&self, position: u64) -> u64 {
        if self.duration_secs == 0 {
            position
        } else {
            position.min(self.duration_secs)
        }
    }

    fn crosses_completion(&self, position: u64) -> bool {
        self.duration_secs > 0
            && position as f64 >= self.duration_secs as f64 * self.completion_ratio
    }

    fn report(&mut self, position: u64) -> ProgressUpdate {
        self.last_reported = Some(position);
        ProgressUpdate {
            progress_seconds: position,
            completed: self.completed,
        }
    }
}
