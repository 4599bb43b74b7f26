use std::time::Duration;

use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};

use crate::error::ConfigError;
use crate::transport::FetchRequest;

/// Per-request overrides. Headers here win over the JSON defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: HeaderMap::new(),
        }
    }
}

impl RequestOptions {
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Set a header, replacing any previous value for the same name.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Like [`RequestOptions::header`], parsing name and value from strings.
    pub fn try_header(
        self,
        name: &str,
        value: &str,
    ) -> Result<Self, ConfigError> {
        let name = HeaderName::from_bytes(name.as_bytes())?;
        let value = HeaderValue::from_str(value)?;
        Ok(self.header(name, value))
    }

    /// The default JSON headers overlaid with the caller's headers.
    ///
    /// Header names compare case-insensitively; every value the caller set
    /// for a name replaces the default for that name.
    pub fn merged_headers(&self) -> HeaderMap {
        let mut merged = HeaderMap::new();
        merged.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for name in self.headers.keys() {
            merged.remove(name);
        }
        for (name, value) in self.headers.iter() {
            merged.append(name.clone(), value.clone());
        }
        merged
    }
}

/// What to fetch and how often.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    pub url: String,
    /// `None` or zero disables polling.
    pub poll_interval: Option<Duration>,
    pub request_options: RequestOptions,
}

impl FetchConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            poll_interval: None,
            request_options: RequestOptions::default(),
        }
    }

    pub fn poll_every(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    pub fn poll_interval(mut self, interval: Option<Duration>) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn request_options(mut self, options: RequestOptions) -> Self {
        self.request_options = options;
        self
    }

    pub fn effective_poll_interval(&self) -> Option<Duration> {
        self.poll_interval.filter(|interval| !interval.is_zero())
    }

    /// Whether moving from `self` to `next` requires a fresh request.
    pub fn restarts_cycle(&self, next: &FetchConfig) -> bool {
        self.url != next.url || self.request_options != next.request_options
    }

    pub(crate) fn request(&self) -> FetchRequest {
        FetchRequest {
            method: self.request_options.method.clone(),
            url: self.url.clone(),
            headers: self.request_options.merged_headers(),
        }
    }
}
