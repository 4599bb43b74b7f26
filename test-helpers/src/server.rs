//! A local stand-in for the posts/users JSON API.
//!
//! Besides the dataset routes it has a few endpoints that exist only to
//! exercise fetcher behavior: a counter, a header echo, a malformed body,
//! a slow response, and named fixtures whose status and body tests set.

use std::collections::HashMap;
use std::net::TcpListener;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use actix_web::dev::{HttpServiceFactory, Server};
use actix_web::http::StatusCode;
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, Responder, get, web};
use payloads::PostId;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::mock::MockDataset;

pub struct MockState {
    dataset: MockDataset,
    fixtures: Mutex<HashMap<String, (u16, Value)>>,
    counter: AtomicU64,
}

impl MockState {
    pub fn new(dataset: MockDataset) -> Self {
        Self {
            dataset,
            fixtures: Mutex::new(HashMap::new()),
            counter: AtomicU64::new(0),
        }
    }

    pub fn dataset(&self) -> &MockDataset {
        &self.dataset
    }

    pub fn set_fixture(&self, name: &str, status: u16, body: Value) {
        self.fixtures
            .lock()
            .unwrap()
            .insert(name.to_string(), (status, body));
    }

    /// How many times `/counter` has been hit.
    pub fn counter_hits(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }
}

/// Build the server, but not await it.
///
/// Returns the port the server has bound to; pass 0 for an OS-assigned one.
pub fn build(
    port: u16,
    state: web::Data<MockState>,
) -> std::io::Result<(Server, u16)> {
    let listener = TcpListener::bind(("127.0.0.1", port))?;
    let port = listener.local_addr()?.port();
    let server = HttpServer::new(move || {
        App::new().service(mock_services()).app_data(state.clone())
    })
    .workers(1)
    .disable_signals()
    .listen(listener)?
    .run();
    Ok((server, port))
}

fn mock_services() -> impl HttpServiceFactory {
    (
        list_posts,
        get_post,
        list_users,
        counter,
        echo_headers,
        malformed,
        slow,
        fixture,
    )
}

#[derive(Deserialize)]
struct Limit {
    #[serde(rename = "_limit")]
    limit: Option<usize>,
}

#[get("/posts")]
async fn list_posts(
    query: web::Query<Limit>,
    state: web::Data<MockState>,
) -> impl Responder {
    let posts = &state.dataset.posts;
    let limit = query.limit.unwrap_or(posts.len()).min(posts.len());
    HttpResponse::Ok().json(&posts[..limit])
}

#[get("/posts/{id}")]
async fn get_post(
    path: web::Path<u64>,
    state: web::Data<MockState>,
) -> impl Responder {
    match state.dataset.post(&PostId(path.into_inner())) {
        Some(post) => HttpResponse::Ok().json(post),
        None => HttpResponse::NotFound().body("Post not found"),
    }
}

#[get("/users")]
async fn list_users(
    query: web::Query<Limit>,
    state: web::Data<MockState>,
) -> impl Responder {
    let users = &state.dataset.users;
    let limit = query.limit.unwrap_or(users.len()).min(users.len());
    HttpResponse::Ok().json(&users[..limit])
}

/// Returns 1, 2, 3, ... on successive requests.
#[get("/counter")]
async fn counter(state: web::Data<MockState>) -> impl Responder {
    let count = state.counter.fetch_add(1, Ordering::SeqCst) + 1;
    HttpResponse::Ok().json(count)
}

/// Returns the request headers as a JSON object keyed by lowercase name.
#[get("/echo_headers")]
async fn echo_headers(req: HttpRequest) -> impl Responder {
    let headers: Map<String, Value> = req
        .headers()
        .iter()
        .map(|(name, value)| {
            let value = value.to_str().unwrap_or_default().to_string();
            (name.as_str().to_string(), Value::String(value))
        })
        .collect();
    HttpResponse::Ok().json(headers)
}

#[get("/malformed")]
async fn malformed() -> impl Responder {
    HttpResponse::Ok()
        .content_type("application/json")
        .body("{\"id\": ")
}

#[derive(Deserialize)]
struct Delay {
    delay_ms: u64,
}

#[get("/slow")]
async fn slow(query: web::Query<Delay>) -> impl Responder {
    tokio::time::sleep(Duration::from_millis(query.delay_ms)).await;
    HttpResponse::Ok().json(serde_json::json!({ "slept_ms": query.delay_ms }))
}

#[get("/fixtures/{name}")]
async fn fixture(
    name: web::Path<String>,
    state: web::Data<MockState>,
) -> impl Responder {
    let found = state.fixtures.lock().unwrap().get(name.as_str()).cloned();
    match found {
        Some((status, body)) => {
            let status = StatusCode::from_u16(status)
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            HttpResponse::build(status).json(body)
        }
        None => HttpResponse::NotFound().body("No such fixture"),
    }
}
