use std::time::Duration;

use fetcher::FetchConfig;
use reqwest::StatusCode;
use serde_json::json;
use test_helpers::scripted::Reply;
use tokio::time::sleep;

use crate::{activate, scripted};

fn every(ms: u64) -> Duration {
    Duration::from_millis(ms)
}

#[tokio::test(start_paused = true)]
async fn polls_once_per_interval_and_stops_on_deactivation() {
    let transport = scripted();
    let fetcher =
        activate(&transport, FetchConfig::new("/posts").poll_every(every(1000)));

    sleep(every(1)).await;
    assert_eq!(transport.calls(), 1);

    // ticks at 1000, 2000 and 3000
    sleep(every(3500)).await;
    assert_eq!(transport.calls(), 4);

    fetcher.deactivate();
    sleep(every(5000)).await;
    assert_eq!(transport.calls(), 4);
}

#[tokio::test(start_paused = true)]
async fn first_tick_is_one_full_interval_after_activation() {
    let transport = scripted();
    let _fetcher =
        activate(&transport, FetchConfig::new("/posts").poll_every(every(1000)));

    sleep(every(999)).await;
    assert_eq!(transport.calls(), 1);
    sleep(every(2)).await;
    assert_eq!(transport.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn no_interval_or_zero_interval_means_no_polling() {
    let transport = scripted();
    let _plain = activate(&transport, FetchConfig::new("/posts"));
    let _zero =
        activate(&transport, FetchConfig::new("/users").poll_every(every(0)));

    sleep(Duration::from_secs(60)).await;
    assert_eq!(transport.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn polled_responses_update_state() {
    let transport = scripted();
    transport.push(Reply::Json(StatusCode::OK, json!(1)));
    transport.push(Reply::Json(StatusCode::OK, json!(2)));
    transport.push(Reply::Json(StatusCode::SERVICE_UNAVAILABLE, json!(null)));

    let fetcher =
        activate(&transport, FetchConfig::new("/count").poll_every(every(100)));

    sleep(every(50)).await;
    assert_eq!(fetcher.state().data, Some(json!(1)));

    sleep(every(100)).await;
    assert_eq!(fetcher.state().data, Some(json!(2)));

    sleep(every(100)).await;
    let state = fetcher.state();
    assert_eq!(state.data, Some(json!(2)));
    assert_eq!(state.error_message().as_deref(), Some("HTTP error! status: 503"));
}

#[tokio::test(start_paused = true)]
async fn interval_change_reschedules_without_fetching() {
    let transport = scripted();
    let config = FetchConfig::new("/posts").poll_every(every(1000));
    let fetcher = activate(&transport, config.clone());

    sleep(every(1500)).await;
    assert_eq!(transport.calls(), 2);

    fetcher.reconfigure(config.poll_every(every(5000)));
    sleep(every(1)).await;
    assert_eq!(transport.calls(), 2);

    // the old 1000ms timer is gone; the new one first fires at 6500
    sleep(every(3900)).await;
    assert_eq!(transport.calls(), 2);
    sleep(every(1200)).await;
    assert_eq!(transport.calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn disabling_the_interval_stops_polling() {
    let transport = scripted();
    let config = FetchConfig::new("/posts").poll_every(every(1000));
    let fetcher = activate(&transport, config.clone());

    sleep(every(1500)).await;
    assert_eq!(transport.calls(), 2);

    fetcher.reconfigure(config.poll_interval(None));
    sleep(every(10_000)).await;
    assert_eq!(transport.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn url_change_restarts_the_cycle() {
    let transport = scripted();
    transport.push(Reply::Json(StatusCode::OK, json!("posts")));
    transport.push(Reply::Json(StatusCode::OK, json!("users")));

    let fetcher =
        activate(&transport, FetchConfig::new("/posts").poll_every(every(1000)));

    sleep(every(500)).await;
    assert_eq!(fetcher.state().data, Some(json!("posts")));

    fetcher.reconfigure(FetchConfig::new("/users").poll_every(every(1000)));
    assert!(fetcher.state().loading);
    sleep(every(1)).await;
    assert_eq!(transport.calls(), 2);
    assert_eq!(transport.requests()[1].url, "/users");
    assert_eq!(fetcher.state().data, Some(json!("users")));
    assert_eq!(fetcher.config().url, "/users");

    // polling restarted from the reconfigure at 500: next tick at 1500
    sleep(every(598)).await;
    assert_eq!(transport.calls(), 2);
    sleep(every(500)).await;
    assert_eq!(transport.calls(), 3);
    assert_eq!(transport.requests()[2].url, "/users");
}

#[tokio::test(start_paused = true)]
async fn identical_config_is_a_no_op() {
    let transport = scripted();
    let config = FetchConfig::new("/posts").poll_every(every(1000));
    let fetcher = activate(&transport, config.clone());

    sleep(every(600)).await;
    fetcher.reconfigure(config);
    sleep(every(1)).await;
    assert_eq!(transport.calls(), 1);

    // first schedule kept: tick at 1000
    sleep(every(500)).await;
    assert_eq!(transport.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_fetcher_stops_polling() {
    let transport = scripted();
    {
        let _fetcher = activate(
            &transport,
            FetchConfig::new("/posts").poll_every(every(100)),
        );
        sleep(every(250)).await;
    }
    let calls = transport.calls();
    assert_eq!(calls, 3);

    sleep(every(1000)).await;
    assert_eq!(transport.calls(), calls);
}

#[tokio::test(start_paused = true)]
async fn responses_slower_than_the_interval_still_land() {
    let transport = scripted();
    for n in 0..50 {
        transport.push_delayed(Reply::Json(StatusCode::OK, json!(n)), every(150));
    }
    let config = FetchConfig::new("/slow").poll_every(every(100));
    let fetcher = activate(&transport, config.clone());

    // request 0 landed at 150, request 1 is in flight
    sleep(every(160)).await;
    let state = fetcher.state();
    assert_eq!(state.data, Some(json!(0)));
    assert!(state.loading);
    assert_eq!(state.error, None);

    // request n goes out at n * 100 and lands 150 later
    sleep(every(1000)).await;
    let state = fetcher.state();
    assert_eq!(transport.calls(), 12);
    assert_eq!(state.data, Some(json!(10)));
    assert!(state.loading);

    // once polling stops the last request settles the cycle
    fetcher.reconfigure(config.poll_interval(None));
    sleep(every(500)).await;
    let state = fetcher.state();
    assert_eq!(transport.calls(), 12);
    assert_eq!(state.data, Some(json!(11)));
    assert!(!state.loading);
}

#[tokio::test(start_paused = true)]
async fn url_change_drops_responses_for_the_old_url() {
    let transport = scripted();
    transport.push_delayed(Reply::Json(StatusCode::OK, json!("posts")), every(50));
    transport.push_delayed(Reply::Json(StatusCode::OK, json!("users")), every(100));

    let fetcher = activate(&transport, FetchConfig::new("/posts"));
    sleep(every(10)).await;
    fetcher.reconfigure(FetchConfig::new("/users"));

    // the /posts reply arrives first but is stale
    sleep(every(50)).await;
    let state = fetcher.state();
    assert_eq!(state.data, None);
    assert!(state.loading);

    sleep(every(100)).await;
    let state = fetcher.state();
    assert_eq!(state.data, Some(json!("users")));
    assert!(!state.loading);
}
