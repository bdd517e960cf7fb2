//! The upload → processing → result state machine and its progress model.
//!
//! Progress is a UX approximation, not a measurement: bytes actually sent
//! map linearly onto 0–40%, the wait for the provider advances 40–95%
//! synthetically, and the response jumps to 100%. The value is clamped
//! monotonic so out-of-order reports can never move it backwards.

use std::time::{Duration, Instant};

/// What the client shows for any server-side failure; the detailed reason
/// is only logged.
pub const GENERIC_FAILURE: &str = "Failed to analyze image. Please try again.";

pub const UPLOAD_BAND_END: u8 = 40;
pub const SYNTHETIC_BAND_END: u8 = 95;
const SYNTHETIC_STEP: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Upload,
    Processing,
    Result,
}

/// Monotonic non-decreasing 0–100 value.
#[derive(Debug, Clone, Copy, Default)]
pub struct Progress {
    value: u8,
}

impl Progress {
    pub fn get(self) -> u8 {
        self.value
    }

    pub fn advance_to(&mut self, value: u8) {
        self.value = self.value.max(value.min(100));
    }

    pub fn finish(&mut self) {
        self.value = 100;
    }
}

/// Advances progress one point per elapsed step while the response is
/// pending. Owned by the session only during `Processing`, so completion or
/// failure drops it and no periodic callback leaks.
#[derive(Debug)]
struct SyntheticTicker {
    last: Instant,
}

impl SyntheticTicker {
    fn new(now: Instant) -> Self {
        Self { last: now }
    }

    fn tick(&mut self, now: Instant, progress: &mut Progress) {
        while now.duration_since(self.last) >= SYNTHETIC_STEP
            && progress.get() < SYNTHETIC_BAND_END
        {
            self.last += SYNTHETIC_STEP;
            progress.advance_to(progress.get() + 1);
        }
    }
}

#[derive(Debug)]
pub struct Session {
    phase: Phase,
    progress: Progress,
    error: Option<String>,
    ticker: Option<SyntheticTicker>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            phase: Phase::Upload,
            progress: Progress::default(),
            error: None,
            ticker: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn progress(&self) -> u8 {
        self.progress.get()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_uploading(&self) -> bool {
        self.phase == Phase::Processing
    }

    /// Enter `Processing`. Returns false (and does nothing) while a request
    /// is already in flight — the re-submission gate.
    pub fn begin_processing(&mut self) -> bool {
        if self.phase == Phase::Processing {
            return false;
        }
        self.phase = Phase::Processing;
        self.progress = Progress::default();
        self.progress.advance_to(10);
        self.error = None;
        self.ticker = Some(SyntheticTicker::new(Instant::now()));
        true
    }

    /// Report bytes actually sent; maps onto the 0–40% band.
    pub fn upload_progress(&mut self, sent: u64, total: u64) {
        if total == 0 {
            return;
        }
        let fraction = sent.min(total) as f64 / total as f64;
        self.progress
            .advance_to((fraction * f64::from(UPLOAD_BAND_END)).round() as u8);
    }

    /// Advance the synthetic band. Call once per frame while processing.
    pub fn poll(&mut self) {
        self.poll_at(Instant::now());
    }

    fn poll_at(&mut self, now: Instant) {
        if let Some(ticker) = &mut self.ticker {
            ticker.tick(now, &mut self.progress);
        }
    }

    /// The response arrived: jump to 100% and show the result.
    pub fn complete(&mut self) {
        self.progress.finish();
        self.phase = Phase::Result;
        self.ticker = None;
    }

    /// The request failed: back to `Upload` with the generic message.
    pub fn fail(&mut self) {
        self.phase = Phase::Upload;
        self.error = Some(GENERIC_FAILURE.to_string());
        self.ticker = None;
    }

    /// "New reading" — discard everything.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
