//! Local view of the sample store
//!
//! The view cache mirrors the persisted collection and remembers where its
//! contents came from, so callers can tell a confirmed listing from a restored
//! or locally cleared one.

mod reconciler;
mod shadow;

pub use reconciler::Reconciler;
pub use shadow::{ShadowEntry, ShadowSlot};

use crate::store::Sample;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Origin of the view cache contents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Provenance {
    /// Nothing loaded yet
    #[default]
    Empty,
    /// Loaded from the shadow slot, not yet confirmed by the store
    Restored,
    /// Replaced by a successful store listing
    Confirmed { at: DateTime<Utc> },
    /// Emptied locally; the store may still hold samples
    LocallyCleared { at: DateTime<Utc> },
}

impl Provenance {
    /// True when the contents came from a successful store listing
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Provenance::Confirmed { .. })
    }
}

/// In-process mirror of the persisted samples
#[derive(Debug, Clone, Default)]
pub struct ViewCache {
    samples: Vec<Sample>,
    provenance: Provenance,
}

impl ViewCache {
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Replace the contents wholesale with a store listing
    pub fn confirm(&mut self, samples: Vec<Sample>) {
        self.samples = samples;
        self.provenance = Provenance::Confirmed { at: Utc::now() };
    }

    /// Empty the cache without touching the store
    pub fn clear_local(&mut self) {
        self.samples.clear();
        self.provenance = Provenance::LocallyCleared { at: Utc::now() };
    }

    /// Load advisory contents from a shadow entry
    pub fn restore(&mut self, samples: Vec<Sample>) {
        self.samples = samples;
        self.provenance = Provenance::Restored;
    }

    pub fn to_entry(&self) -> ShadowEntry {
        ShadowEntry {
            provenance: self.provenance,
            samples: self.samples.clone(),
        }
    }
}
