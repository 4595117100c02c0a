//! Sampling controller
//!
//! Drives two periodic tasks over one explicit state object:
//! - `refresh`: re-reads both sides of the quote book and resyncs the view cache
//! - `record`: while armed, stores the best (buy, sell) pair as a sample
//!
//! The tasks are not synchronized with each other, so a recording tick sees
//! whatever the most recent refresh left behind.

mod sampler;

pub use sampler::SamplingController;

use crate::cache::Provenance;
use crate::quote::{LiveQuotes, QuoteFilter};
use crate::store::Sample;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Controller cadence and initial filter
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Quote refresh period
    pub refresh_interval: Duration,
    /// Sample recording period
    pub record_interval: Duration,
    /// Filter in effect at startup
    pub filter: QuoteFilter,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(20),
            record_interval: Duration::from_secs(30 * 60),
            filter: QuoteFilter::default(),
        }
    }
}

/// Recording session state
#[derive(Debug, Clone, Default)]
pub struct RecordingSession {
    pub armed: bool,
    pub armed_at: Option<DateTime<Utc>>,
    /// Samples stored since arming
    pub recorded: u64,
}

impl RecordingSession {
    fn arm(&mut self) {
        self.armed = true;
        self.armed_at = Some(Utc::now());
        self.recorded = 0;
    }

    /// Returns whether the session was armed
    fn disarm(&mut self) -> bool {
        let was_armed = self.armed;
        self.armed = false;
        self.armed_at = None;
        was_armed
    }
}

/// Live state shared by both tasks
#[derive(Debug, Clone)]
pub struct ControllerState {
    pub filter: QuoteFilter,
    pub quotes: LiveQuotes,
    pub session: RecordingSession,
}

impl ControllerState {
    fn new(filter: QuoteFilter) -> Self {
        Self {
            filter,
            quotes: LiveQuotes::default(),
            session: RecordingSession::default(),
        }
    }
}

/// Result of a start-recording command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmOutcome {
    /// Recording started; the first tick runs immediately
    Armed,
    /// A recording task was already running and was left untouched
    AlreadyArmed,
}

/// Result of one recording tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// One sample was stored
    Recorded(Sample),
    /// A side had no listings; nothing was stored
    Skipped,
    /// The store rejected the insert; the sample is lost
    Failed,
}

/// Point-in-time summary for the operator
#[derive(Debug, Clone)]
pub struct ControllerStatus {
    pub filter: QuoteFilter,
    pub armed: bool,
    pub armed_at: Option<DateTime<Utc>>,
    pub recorded: u64,
    pub buy_count: usize,
    pub sell_count: usize,
    pub last_refresh: Option<DateTime<Utc>>,
    pub cached_samples: usize,
    pub provenance: Provenance,
    pub refreshing: bool,
}
