//! Fetch a JSON resource, keep it fresh on a timer, and hand every state
//! change to a renderer.
//!
//! ```no_run
//! # async fn demo() {
//! use std::time::Duration;
//! use fetcher::{FetchConfig, PollingFetcher};
//!
//! let fetcher = PollingFetcher::<serde_json::Value>::builder(
//!     FetchConfig::new("https://jsonplaceholder.typicode.com/posts?_limit=5")
//!         .poll_every(Duration::from_secs(5)),
//! )
//! .renderer(|view| println!("{}", view.render("posts", |data, _, _| data.to_string())))
//! .activate();
//!
//! fetcher.refetch();
//! fetcher.deactivate();
//! # }
//! ```

pub mod config;
pub mod error;
pub mod poller;
pub mod state;
pub mod telemetry;
pub mod transport;
pub mod view;

pub use config::{FetchConfig, RequestOptions};
pub use error::{ConfigError, FetchError};
pub use poller::{FetchControls, FetchData, FetcherBuilder, FetcherId, PollingFetcher};
pub use state::{FetchState, Phase};
pub use transport::{FetchRequest, FetchResponse, HttpTransport, Transport};
pub use view::FetchView;
