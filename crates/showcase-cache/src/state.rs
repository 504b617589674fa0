//! Observable query state.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use showcase_core::CatalogError;

/// Lifecycle of a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryStatus {
    /// Never fetched.
    #[default]
    Idle,
    /// First fetch in flight, no data yet.
    Loading,
    /// Last fetch succeeded.
    Success,
    /// Last fetch failed after exhausting retries.
    Error,
}

impl fmt::Display for QueryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Loading => write!(f, "loading"),
            Self::Success => write!(f, "success"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Snapshot of one query, shared by every subscriber of its key.
///
/// Data survives a later failure or a background re-fetch, so a view can
/// keep showing the previous result while revalidating.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryState<T> {
    pub status: QueryStatus,
    pub data: Option<T>,
    pub error: Option<CatalogError>,
    /// A fetch for this key is in flight.
    pub is_fetching: bool,
    /// Failed attempts of the current fetch.
    pub failure_count: u32,
    /// Wall-clock time of the last successful fetch.
    pub updated_at: Option<DateTime<Utc>>,
}

impl<T> QueryState<T> {
    /// State of a key that was never fetched.
    pub fn idle() -> Self {
        Self {
            status: QueryStatus::Idle,
            data: None,
            error: None,
            is_fetching: false,
            failure_count: 0,
            updated_at: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Loading
    }

    pub fn is_success(&self) -> bool {
        self.status == QueryStatus::Success
    }

    pub fn is_error(&self) -> bool {
        self.status == QueryStatus::Error
    }

    pub(crate) fn begin_fetch(&mut self) {
        self.is_fetching = true;
        self.failure_count = 0;
        if self.data.is_none() {
            self.status = QueryStatus::Loading;
            self.error = None;
        }
    }

    pub(crate) fn succeed(&mut self, data: T) {
        self.status = QueryStatus::Success;
        self.data = Some(data);
        self.error = None;
        self.is_fetching = false;
        self.failure_count = 0;
        self.updated_at = Some(Utc::now());
    }

    pub(crate) fn fail(&mut self, error: CatalogError) {
        self.status = QueryStatus::Error;
        self.error = Some(error);
        self.is_fetching = false;
    }
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self::idle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_fetch_is_loading() {
        let mut state: QueryState<u32> = QueryState::idle();
        state.begin_fetch();
        assert!(state.is_loading());
        assert!(state.is_fetching);
    }

    #[test]
    fn test_refetch_keeps_previous_data() {
        let mut state = QueryState::idle();
        state.begin_fetch();
        state.succeed(1);
        state.begin_fetch();
        assert!(state.is_success());
        assert_eq!(state.data, Some(1));
        assert!(state.is_fetching);
    }

    #[test]
    fn test_failure_keeps_data_and_records_error() {
        let mut state = QueryState::idle();
        state.succeed("page");
        state.fail(CatalogError::transport("Network Error", None));
        assert!(state.is_error());
        assert_eq!(state.data, Some("page"));
        assert_eq!(state.error.as_ref().map(|e| e.to_string()).as_deref(), Some("Network Error"));
    }

    #[test]
    fn test_retry_from_error_without_data_clears_error() {
        let mut state: QueryState<u32> = QueryState::idle();
        state.fail(CatalogError::transport("x", None));
        state.begin_fetch();
        assert!(state.is_loading());
        assert!(state.error.is_none());
    }
}
