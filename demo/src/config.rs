use std::time::Duration;

use anyhow::Context;

pub const DEFAULT_POST_LIMIT: usize = 5;
pub const DEFAULT_USER_LIMIT: usize = 3;

/// Everything the demo needs, read once at startup and passed down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// `None` spawns a local mock API instead.
    pub api_base_url: Option<String>,
    pub poll_interval: Option<Duration>,
    pub post_limit: usize,
    pub user_limit: usize,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<Self> {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let poll_interval = non_empty("POLL_INTERVAL_MS")
            .map(|ms| {
                ms.parse::<u64>()
                    .context("POLL_INTERVAL_MS must be a whole number")
            })
            .transpose()?
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis);

        let parse_limit = |key: &str, default: usize| {
            non_empty(key)
                .map(|limit| {
                    limit
                        .parse::<usize>()
                        .with_context(|| format!("{key} must be a whole number"))
                })
                .transpose()
                .map(|limit| limit.unwrap_or(default))
        };

        Ok(Config {
            api_base_url: non_empty("API_BASE_URL"),
            poll_interval,
            post_limit: parse_limit("POST_LIMIT", DEFAULT_POST_LIMIT)?,
            user_limit: parse_limit("USER_LIMIT", DEFAULT_USER_LIMIT)?,
        })
    }
}
