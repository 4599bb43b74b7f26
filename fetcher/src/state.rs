use jiff::Timestamp;
use serde_json::Value;

use crate::error::FetchError;

/// What a consumer sees of a fetcher at a point in time.
///
/// `data` survives refetches and failures: a failed cycle only sets
/// `error`, and a refetch only sets `loading`, so the last good value stays
/// visible until a newer one lands.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchState<T = Value> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<FetchError>,
    /// When the last successful response was committed.
    pub last_fetched_at: Option<Timestamp>,
}

/// Coarse lifecycle position, derived from a [`FetchState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing fetched yet; `data` is the initial value.
    Idle,
    Loading,
    Success,
    Failed,
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self::new(None)
    }
}

impl<T> FetchState<T> {
    pub fn new(initial_data: Option<T>) -> Self {
        Self {
            data: initial_data,
            loading: false,
            error: None,
            last_fetched_at: None,
        }
    }

    pub fn phase(&self) -> Phase {
        if self.loading {
            Phase::Loading
        } else if self.error.is_some() {
            Phase::Failed
        } else if self.last_fetched_at.is_some() {
            Phase::Success
        } else {
            Phase::Idle
        }
    }

    /// True for the very first load: in flight, nothing fetched, no error.
    pub fn is_initial_loading(&self) -> bool {
        self.loading && self.last_fetched_at.is_none() && self.error.is_none()
    }

    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }

    pub(crate) fn begin(&mut self) {
        self.loading = true;
    }

    pub(crate) fn succeed(&mut self, data: T, at: Timestamp) {
        self.data = Some(data);
        self.error = None;
        self.loading = false;
        self.last_fetched_at = Some(at);
    }

    pub(crate) fn fail(&mut self, error: FetchError) {
        self.error = Some(error);
        self.loading = false;
    }
}
