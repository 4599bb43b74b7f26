use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use fetcher::{FetchConfig, Phase, PollingFetcher};
use reqwest::StatusCode;
use serde_json::{Value, json};
use test_helpers::scripted::Reply;
use tokio::time::sleep;

use crate::scripted;

type Seen = Arc<Mutex<Vec<(Phase, bool, Option<Value>, Option<String>)>>>;

#[tokio::test(start_paused = true)]
async fn renderer_sees_every_state_change_in_order() {
    let transport = scripted();
    transport.push(Reply::Json(StatusCode::OK, json!([1])));

    let seen: Seen = Arc::default();
    let fetcher = PollingFetcher::<Value>::builder(FetchConfig::new("/posts"))
        .transport(transport.clone())
        .renderer({
            let seen = seen.clone();
            move |view| {
                seen.lock().unwrap().push((
                    view.phase(),
                    view.loading,
                    view.data.cloned(),
                    view.error.map(ToString::to_string),
                ));
            }
        })
        .activate();
    sleep(Duration::from_millis(1)).await;

    fetcher.set_data(json!(5));
    sleep(Duration::from_millis(1)).await;

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            (Phase::Loading, true, None, None),
            (Phase::Success, false, Some(json!([1])), None),
            (Phase::Success, false, Some(json!(5)), None),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn renderer_can_refetch_through_its_view() {
    let transport = scripted();
    transport.push(Reply::Json(StatusCode::INTERNAL_SERVER_ERROR, json!(null)));
    transport.push(Reply::Json(StatusCode::OK, json!([1])));

    let retried = Arc::new(AtomicBool::new(false));
    let fetcher = PollingFetcher::<Value>::builder(FetchConfig::new("/posts"))
        .transport(transport.clone())
        .renderer({
            let retried = retried.clone();
            move |view| {
                if view.error.is_some() && !retried.swap(true, Ordering::SeqCst)
                {
                    view.refetch();
                }
            }
        })
        .activate();
    sleep(Duration::from_millis(10)).await;

    let state = fetcher.state();
    assert!(retried.load(Ordering::SeqCst));
    assert_eq!(transport.calls(), 2);
    assert_eq!(state.data, Some(json!([1])));
    assert_eq!(state.error, None);
}

#[tokio::test(start_paused = true)]
async fn render_helper_falls_back_when_there_is_no_data() {
    let transport = scripted();
    transport.push(Reply::Json(StatusCode::NOT_FOUND, json!(null)));
    transport.push(Reply::Json(StatusCode::OK, json!([{"id": 1}])));
    transport.push(Reply::Json(StatusCode::OK, json!([{"id": 1}, {"id": 2}])));

    let frames = Arc::new(Mutex::new(Vec::<String>::new()));
    let fetcher = PollingFetcher::<Value>::builder(FetchConfig::new("/posts"))
        .transport(transport.clone())
        .renderer({
            let frames = frames.clone();
            move |view| {
                let frame = view.render("posts", |posts, loading, _| {
                    let count = posts.as_array().map_or(0, Vec::len);
                    if loading {
                        format!("{count} posts (refreshing)")
                    } else {
                        format!("{count} posts")
                    }
                });
                frames.lock().unwrap().push(frame);
            }
        })
        .activate();
    sleep(Duration::from_millis(1)).await;

    fetcher.refetch();
    sleep(Duration::from_millis(1)).await;
    fetcher.refetch();
    sleep(Duration::from_millis(1)).await;
    fetcher.update_data(|_| None);
    sleep(Duration::from_millis(1)).await;

    assert_eq!(
        *frames.lock().unwrap(),
        vec![
            "Loading posts...",
            "Error loading posts: HTTP error! status: 404",
            "Loading posts...",
            "1 posts",
            "1 posts (refreshing)",
            "2 posts",
            "No posts found",
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn renderer_stops_after_deactivation() {
    let transport = scripted();
    transport.push_delayed(
        Reply::Json(StatusCode::OK, json!([1])),
        Duration::from_millis(100),
    );

    let frames = Arc::new(Mutex::new(0usize));
    let fetcher = PollingFetcher::<Value>::builder(
        FetchConfig::new("/posts").poll_every(Duration::from_millis(50)),
    )
    .transport(transport.clone())
    .renderer({
        let frames = frames.clone();
        move |_view| {
            *frames.lock().unwrap() += 1;
        }
    })
    .activate();
    sleep(Duration::from_millis(1)).await;
    assert_eq!(*frames.lock().unwrap(), 1);

    fetcher.deactivate();
    sleep(Duration::from_secs(1)).await;
    assert_eq!(*frames.lock().unwrap(), 1);
}
