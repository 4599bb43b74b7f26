mod polling;
mod rendering;

use std::sync::Arc;

use fetcher::{FetchConfig, PollingFetcher};
use test_helpers::scripted::ScriptedTransport;

fn scripted() -> Arc<ScriptedTransport> {
    Arc::new(ScriptedTransport::new())
}

fn activate(
    transport: &Arc<ScriptedTransport>,
    config: FetchConfig,
) -> PollingFetcher {
    PollingFetcher::builder(config)
        .transport(transport.clone())
        .activate()
}
