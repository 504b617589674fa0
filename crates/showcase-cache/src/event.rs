//! Query events for presentation-layer subscribers.

use showcase_core::CatalogError;

use crate::key::QueryKey;
use crate::state::QueryStatus;

/// Capacity of the event channel. Slow subscribers lose the oldest events.
pub const EVENT_CAPACITY: usize = 64;

/// Something a subscriber may want to surface to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryEvent {
    /// One fetch attempt failed.
    AttemptFailed {
        key: QueryKey,
        /// 1-based attempt number.
        attempt: u32,
        error: CatalogError,
        /// Another attempt follows.
        will_retry: bool,
    },
    /// A fetch settled into success or error.
    Settled { key: QueryKey, status: QueryStatus },
}

impl QueryEvent {
    /// The key this event concerns.
    pub fn key(&self) -> &QueryKey {
        match self {
            Self::AttemptFailed { key, .. } | Self::Settled { key, .. } => key,
        }
    }
}
