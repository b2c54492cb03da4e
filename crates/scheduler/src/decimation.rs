//! Break state machine
//!
//! A channel transmits `N` times, then sits out a break, then repeats.
//! Every attempt goes through [`Decimator::attempt`], which is the only place
//! the counters change:
//!
//! 1. `seen += 1`
//! 2. if suppressed: `seen_on_break += 1`; once it reaches `M` the break ends,
//!    taking effect from the next attempt; this attempt is skipped
//! 3. otherwise transmit; on success `published += 1` and enter a break when
//!    `published % N == 0`
//!
//! A break therefore skips `max(M, 1)` attempts. A failed transmission
//! advances `seen` only.

use std::fmt;

use serde::Serialize;
use serde_json::json;

/// Current break state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakState {
    /// Transmitting
    #[default]
    Normal,
    /// On a break; attempts are counted but nothing is sent
    Suppressed,
}

impl fmt::Display for BreakState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::Suppressed => write!(f, "suppressed"),
        }
    }
}

/// Outcome of one publish attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    /// No new records; decimation untouched
    Idle,
    /// Transmitted
    Sent,
    /// Skipped because the channel is on a break
    Suppressed,
}

impl Attempt {
    /// Metric label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Sent => "sent",
            Self::Suppressed => "suppressed",
        }
    }
}

/// Per-channel decimation counters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decimator {
    publishes_per_batch: u32,
    ignored_after_batch: u32,
    published: u64,
    seen: u64,
    seen_on_break: u64,
    state: BreakState,
}

impl Decimator {
    /// Create a decimator transmitting `publishes_per_batch` (N) times before
    /// ignoring `ignored_after_batch` (M) attempts
    ///
    /// Returns `None` when N is 0.
    pub fn new(publishes_per_batch: u32, ignored_after_batch: u32) -> Option<Self> {
        if publishes_per_batch == 0 {
            return None;
        }
        Some(Self {
            publishes_per_batch,
            ignored_after_batch,
            published: 0,
            seen: 0,
            seen_on_break: 0,
            state: BreakState::Normal,
        })
    }

    /// Run one attempt, calling `transmit` only when not on a break
    ///
    /// Returns [`Attempt::Sent`] or [`Attempt::Suppressed`]; a transmission
    /// error is passed through unchanged after `seen` has been counted.
    pub fn attempt<E, F>(&mut self, transmit: F) -> Result<Attempt, E>
    where
        F: FnOnce() -> Result<(), E>,
    {
        self.seen += 1;

        if self.state == BreakState::Suppressed {
            self.seen_on_break += 1;
            if self.seen_on_break >= u64::from(self.ignored_after_batch) {
                self.state = BreakState::Normal;
                self.seen_on_break = 0;
            }
            return Ok(Attempt::Suppressed);
        }

        transmit()?;

        self.published += 1;
        if self.published % u64::from(self.publishes_per_batch) == 0 {
            self.state = BreakState::Suppressed;
            self.seen_on_break = 0;
        }
        Ok(Attempt::Sent)
    }

    /// Zero all counters and return to `Normal`
    pub fn reset(&mut self) {
        self.published = 0;
        self.seen = 0;
        self.seen_on_break = 0;
        self.state = BreakState::Normal;
    }

    pub fn publishes_per_batch(&self) -> u32 {
        self.publishes_per_batch
    }

    pub fn ignored_after_batch(&self) -> u32 {
        self.ignored_after_batch
    }

    /// Successful transmissions
    pub fn published(&self) -> u64 {
        self.published
    }

    /// Attempts, sent or not
    pub fn seen(&self) -> u64 {
        self.seen
    }

    /// Attempts counted during the current break
    pub fn seen_on_break(&self) -> u64 {
        self.seen_on_break
    }

    pub fn state(&self) -> BreakState {
        self.state
    }

    /// Counters as a JSON object, for logs
    pub fn describe(&self) -> serde_json::Value {
        json!({
            "published": self.published,
            "seen": self.seen,
            "seen_on_break": self.seen_on_break,
            "on_break": self.state == BreakState::Suppressed,
        })
    }
}
