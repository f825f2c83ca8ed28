//! Per-slot cache state
//!
//! Each slot moves through `Absent -> Fetching -> Present`; a failed
//! fetch returns it to absent (represented as no map entry at all) so a
//! later call may retry. A present slot only leaves that state through an
//! explicit invalidation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::models::ResourceValue;

/// Outcome broadcast to callers that attached to an in-flight fetch.
///
/// The owning caller gets the full typed error; attached callers receive
/// the rendered reason, since the underlying transport error is not
/// clonable.
#[derive(Debug, Clone)]
pub(crate) enum FlightState {
    Pending,
    Done(Result<Arc<ResourceValue>, String>),
}

/// State held in the slot map for one (kind, key) pair.
pub(crate) enum SlotState {
    /// A fetch is outstanding. `prev` keeps the last known value visible
    /// while a detail refetch runs over a partial app record.
    Fetching {
        done: watch::Receiver<FlightState>,
        prev: Option<(Arc<ResourceValue>, DateTime<Utc>)>,
    },
    /// Last successful fetch.
    Present {
        value: Arc<ResourceValue>,
        fetched_at: DateTime<Utc>,
    },
}

/// Read-only view of a slot as exposed to views.
#[derive(Debug, Clone)]
pub enum SlotView {
    /// Never fetched, or the first fetch is still in flight.
    NotLoaded,
    /// Cached value from the last successful fetch.
    Loaded {
        value: Arc<ResourceValue>,
        fetched_at: DateTime<Utc>,
    },
}

impl SlotView {
    pub fn is_loaded(&self) -> bool {
        matches!(self, SlotView::Loaded { .. })
    }

    pub fn value(&self) -> Option<&ResourceValue> {
        match self {
            SlotView::Loaded { value, .. } => Some(value),
            SlotView::NotLoaded => None,
        }
    }
}
