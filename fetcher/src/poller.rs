//! A fetcher that keeps one JSON resource fresh.
//!
//! ```text
//!   activate ──> start ──> Loading ──2xx──> Success ─┐
//!                  ^          │                      │ refetch / poll tick
//!                  │          └──error──> Failed ────┤
//!                  └─────────────────────────────────┘
//!   deactivate: timer, in-flight requests and renderer are torn down;
//!               nothing is committed afterwards.
//! ```
//!
//! Every request gets a sequence number. A response commits only if it is
//! newer than the last committed one, so a slow response can never
//! overwrite a newer one. `loading` stays set while a newer request is
//! still in flight, which keeps data flowing when polling outpaces the
//! backend.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use derive_more::Display;
use jiff::Timestamp;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::Instrument;
use uuid::Uuid;

use crate::config::FetchConfig;
use crate::error::FetchError;
use crate::state::FetchState;
use crate::transport::{FetchRequest, HttpTransport, Transport};
use crate::view::FetchView;

/// Data a fetcher can hold: parsed from JSON and shared with observers.
pub trait FetchData: DeserializeOwned + Clone + Send + Sync + 'static {}

impl<T> FetchData for T where T: DeserializeOwned + Clone + Send + Sync + 'static {}

/// Distinguishes fetchers in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub struct FetcherId(pub Uuid);

type Renderer<T> = Box<dyn FnMut(FetchView<'_, T>) + Send>;

/// An active fetcher. Dropping it deactivates it.
///
/// Must be activated inside a tokio runtime.
pub struct PollingFetcher<T = Value> {
    controls: FetchControls<T>,
}

/// The capabilities handed to consumers: read state, refetch, edit data.
///
/// Cheap to clone. Once the owning [`PollingFetcher`] is deactivated every
/// method is a no-op.
pub struct FetchControls<T = Value> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for FetchControls<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

/// Configures a [`PollingFetcher`] before activation.
pub struct FetcherBuilder<T = Value> {
    config: FetchConfig,
    transport: Arc<dyn Transport>,
    initial_data: Option<T>,
    renderer: Option<Renderer<T>>,
}

struct Shared<T> {
    id: FetcherId,
    transport: Arc<dyn Transport>,
    inner: Mutex<Inner<T>>,
    state_tx: watch::Sender<FetchState<T>>,
}

struct Inner<T> {
    state: FetchState<T>,
    config: FetchConfig,
    active: bool,
    /// Sequence number of the most recently issued request.
    latest_request: u64,
    /// Responses with a sequence at or below this are dropped.
    committed_request: u64,
    requests: JoinSet<()>,
    poll_task: Option<JoinHandle<()>>,
    render_tx: Option<mpsc::UnboundedSender<FetchState<T>>>,
    render_task: Option<JoinHandle<()>>,
}

impl<T: FetchData> PollingFetcher<T> {
    pub fn builder(config: FetchConfig) -> FetcherBuilder<T> {
        FetcherBuilder {
            config,
            transport: Arc::new(HttpTransport::new()),
            initial_data: None,
            renderer: None,
        }
    }

    /// Activate over HTTP with no initial data and no renderer.
    pub fn activate(config: FetchConfig) -> Self {
        Self::builder(config).activate()
    }

    pub fn id(&self) -> FetcherId {
        self.controls.shared.id
    }

    pub fn controls(&self) -> FetchControls<T> {
        self.controls.clone()
    }

    pub fn state(&self) -> FetchState<T> {
        self.controls.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState<T>> {
        self.controls.subscribe()
    }

    pub fn refetch(&self) {
        self.controls.refetch();
    }

    pub fn update_data<F>(&self, f: F)
    where
        F: FnOnce(Option<T>) -> Option<T>,
    {
        self.controls.update_data(f);
    }

    pub fn set_data(&self, data: T) {
        self.controls.set_data(data);
    }

    pub fn config(&self) -> FetchConfig {
        self.controls.shared.lock().config.clone()
    }

    /// Apply a new configuration.
    ///
    /// A different url or request options restart the cycle: the timer is
    /// canceled, a request goes out now and polling is rescheduled from
    /// this moment. A different poll interval alone only reschedules the
    /// timer.
    pub fn reconfigure(&self, config: FetchConfig) {
        let shared = &self.controls.shared;
        let mut inner = shared.lock();
        if !inner.active {
            return;
        }
        let restart = inner.config.restarts_cycle(&config);
        let reschedule = restart
            || inner.config.effective_poll_interval()
                != config.effective_poll_interval();
        inner.config = config;

        if restart {
            tracing::info!(id = %shared.id, url = %inner.config.url, "restarting fetch cycle");
            // responses for the previous url or options are stale
            inner.committed_request = inner.latest_request;
            shared.start(&mut inner);
        }
        if reschedule {
            shared.schedule_polling(&mut inner);
        }
    }

    pub fn is_active(&self) -> bool {
        self.controls.is_active()
    }

    /// Tear everything down. Also happens on drop.
    pub fn deactivate(self) {
        // Drop does the work.
    }
}

impl<T> Drop for PollingFetcher<T> {
    fn drop(&mut self) {
        self.controls.shared.deactivate();
    }
}

impl<T: FetchData> FetcherBuilder<T> {
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    /// Data visible before the first response lands.
    pub fn initial_data(mut self, data: T) -> Self {
        self.initial_data = Some(data);
        self
    }

    /// Called with a [`FetchView`] after every state change, in order.
    ///
    /// Runs on its own task, so it may call back into the view's controls.
    pub fn renderer<F>(mut self, render: F) -> Self
    where
        F: FnMut(FetchView<'_, T>) + Send + 'static,
    {
        self.renderer = Some(Box::new(render));
        self
    }

    pub fn activate(self) -> PollingFetcher<T> {
        let id = FetcherId(Uuid::new_v4());
        let state = FetchState::new(self.initial_data);
        let (state_tx, _) = watch::channel(state.clone());
        let shared = Arc::new(Shared {
            id,
            transport: self.transport,
            inner: Mutex::new(Inner {
                state,
                config: self.config,
                active: true,
                latest_request: 0,
                committed_request: 0,
                requests: JoinSet::new(),
                poll_task: None,
                render_tx: None,
                render_task: None,
            }),
            state_tx,
        });
        let controls = FetchControls { shared };

        let mut inner = controls.shared.lock();
        tracing::info!(%id, url = %inner.config.url, "activating fetcher");
        if let Some(renderer) = self.renderer {
            let (render_tx, render_rx) = mpsc::unbounded_channel();
            inner.render_tx = Some(render_tx);
            inner.render_task =
                Some(spawn_renderer(controls.clone(), render_rx, renderer));
        }
        controls.shared.start(&mut inner);
        controls.shared.schedule_polling(&mut inner);
        drop(inner);

        PollingFetcher { controls }
    }
}

impl<T: FetchData> FetchControls<T> {
    pub fn state(&self) -> FetchState<T> {
        self.shared.lock().state.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState<T>> {
        self.shared.state_tx.subscribe()
    }

    /// Issue the request again. Current data stays visible while loading.
    pub fn refetch(&self) {
        let mut inner = self.shared.lock();
        self.shared.start(&mut inner);
    }

    /// Replace data with `f(current)`; `loading` and `error` are untouched.
    ///
    /// `f` runs while the fetcher is locked and must not call back into
    /// these controls. `f` gets a copy, so if it panics the current data
    /// stays.
    pub fn update_data<F>(&self, f: F)
    where
        F: FnOnce(Option<T>) -> Option<T>,
    {
        let mut inner = self.shared.lock();
        if !inner.active {
            return;
        }
        let data = f(inner.state.data.clone());
        inner.state.data = data;
        self.shared.publish(&inner);
    }

    pub fn set_data(&self, data: T) {
        self.update_data(|_| Some(data));
    }

    pub fn is_active(&self) -> bool {
        self.shared.lock().active
    }
}

impl<T> Shared<T> {
    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn deactivate(&self) {
        let mut inner = self.lock();
        if !inner.active {
            return;
        }
        inner.active = false;
        if let Some(task) = inner.poll_task.take() {
            task.abort();
        }
        inner.requests.abort_all();
        inner.render_tx = None;
        if let Some(task) = inner.render_task.take() {
            task.abort();
        }
        tracing::info!(id = %self.id, "deactivated fetcher");
    }
}

impl<T: FetchData> Shared<T> {
    /// Push the current state to subscribers and the renderer.
    fn publish(&self, inner: &Inner<T>) {
        self.state_tx.send_replace(inner.state.clone());
        if let Some(render_tx) = &inner.render_tx {
            // The receiver only goes away on deactivation.
            let _ = render_tx.send(inner.state.clone());
        }
    }

    fn start(self: &Arc<Self>, inner: &mut Inner<T>) {
        if !inner.active {
            return;
        }
        // reap finished requests
        while inner.requests.try_join_next().is_some() {}

        inner.latest_request += 1;
        let sequence = inner.latest_request;
        let request = inner.config.request();
        inner.state.begin();
        self.publish(inner);

        let span = tracing::debug_span!("fetch", id = %self.id, sequence, url = %request.url);
        let shared = Arc::clone(self);
        inner.requests.spawn(
            async move {
                let outcome = shared.perform(request).await;
                shared.commit(sequence, outcome);
            }
            .instrument(span),
        );
    }

    async fn perform(&self, request: FetchRequest) -> Result<T, FetchError> {
        let response = self.transport.send(request).await?;
        if !response.status.is_success() {
            return Err(FetchError::Http {
                status: response.status,
            });
        }
        Ok(serde_json::from_slice(&response.body)?)
    }

    fn commit(&self, sequence: u64, outcome: Result<T, FetchError>) {
        let mut inner = self.lock();
        if !inner.active {
            tracing::debug!("discarding response after deactivation");
            return;
        }
        if sequence <= inner.committed_request {
            tracing::debug!(
                committed = inner.committed_request,
                "discarding superseded response"
            );
            return;
        }
        inner.committed_request = sequence;
        match outcome {
            Ok(data) => inner.state.succeed(data, Timestamp::now()),
            Err(e) => {
                tracing::warn!(error = %e, "fetch failed");
                inner.state.fail(e);
            }
        }
        // a newer request is still on its way
        inner.state.loading = sequence != inner.latest_request;
        self.publish(&inner);
    }

    /// Replace the poll timer according to the current config.
    fn schedule_polling(self: &Arc<Self>, inner: &mut Inner<T>) {
        if let Some(task) = inner.poll_task.take() {
            task.abort();
        }
        if !inner.active {
            return;
        }
        let Some(period) = inner.config.effective_poll_interval() else {
            return;
        };
        tracing::debug!(id = %self.id, ?period, "scheduling polling");

        // The timer must not keep the fetcher alive.
        let weak: Weak<Self> = Arc::downgrade(self);
        inner.poll_task = Some(tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                let Some(shared) = weak.upgrade() else {
                    break;
                };
                let mut inner = shared.lock();
                if !inner.active {
                    break;
                }
                shared.start(&mut inner);
            }
        }));
    }
}

fn spawn_renderer<T: FetchData>(
    controls: FetchControls<T>,
    mut render_rx: mpsc::UnboundedReceiver<FetchState<T>>,
    mut render: Renderer<T>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(state) = render_rx.recv().await {
            render(FetchView::new(&state, &controls));
        }
    })
}
