pub mod mock;
pub mod scripted;
pub mod server;

use std::sync::Arc;

use actix_web::web;
use fetcher::telemetry;
use reqwest::StatusCode;
use serde_json::Value;

use crate::mock::MockDataset;
use crate::server::MockState;

pub struct TestApp {
    #[allow(unused)]
    pub port: u16,
    pub address: String,
    pub client: payloads::APIClient,
    pub state: Arc<MockState>,
}

impl TestApp {
    /// Absolute url for a path on the mock API, e.g. `app.url("/posts")`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.address)
    }

    /// Serve `body` with `status` at `/fixtures/{name}`, returning its url.
    pub fn set_fixture(
        &self,
        name: &str,
        status: StatusCode,
        body: Value,
    ) -> String {
        self.state.set_fixture(name, status.as_u16(), body);
        self.url(&format!("/fixtures/{name}"))
    }
}

pub async fn spawn_app_on_port(port: u16, dataset: MockDataset) -> TestApp {
    // Every test spawns an app; only the first install takes effect.
    let _ = telemetry::init_subscriber(telemetry::get_subscriber("error"));

    let state = web::Data::new(MockState::new(dataset));
    let (server, port) =
        server::build(port, state.clone()).expect("Failed to bind mock API");
    tokio::spawn(server);

    let address = format!("http://127.0.0.1:{port}");
    TestApp {
        port,
        client: payloads::APIClient::new(address.clone()),
        address,
        state: state.into_inner(),
    }
}

/// Use OS-assigned port for parallel testing.
pub async fn spawn_app() -> TestApp {
    spawn_app_on_port(0, MockDataset::default()).await
}

pub async fn spawn_app_with(dataset: MockDataset) -> TestApp {
    spawn_app_on_port(0, dataset).await
}

/// Assert that the result of an API action results in a specific status code.
pub fn assert_status_code<T>(
    result: Result<T, payloads::ClientError>,
    expected: StatusCode,
) {
    match result {
        Err(payloads::ClientError::APIError(code, _)) => {
            assert_eq!(code, expected)
        }
        _ => panic!("Expected APIError"),
    };
}
