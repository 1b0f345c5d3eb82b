//! Recency filter over a trailing window ending at `now`.

use super::Rejection;
use crate::models::DatedCandidate;
use chrono::{DateTime, Duration, FixedOffset};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecencyWindow {
    length: Duration,
}

impl RecencyWindow {
    pub fn new(length: Duration) -> Self {
        Self { length }
    }

    pub fn length(&self) -> Duration {
        self.length
    }

    /// `[now - length, now]`, both ends inclusive.
    pub fn contains(&self, now: DateTime<FixedOffset>, published_at: DateTime<FixedOffset>) -> bool {
        let start = now.checked_sub_signed(self.length);
        start.is_none_or(|start| start <= published_at) && published_at <= now
    }

    pub fn check(&self, now: DateTime<FixedOffset>, dated: DatedCandidate) -> Result<DatedCandidate, Rejection> {
        if self.contains(now, dated.published_at) {
            Ok(dated)
        } else {
            Err(Rejection::OutOfWindow {
                published_at: dated.published_at,
            })
        }
    }
}
