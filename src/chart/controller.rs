//! `LiveChartController`: owns one rendering surface and the background
//! tasks that feed it.
//!
//! - Load task: candles and (for live sources) remote signals fetched
//!   concurrently; candles are drawn as soon as they arrive
//! - Resize task: follows the container width `watch` channel
//! - Poll task (live sources): re-fetches signals on a fixed interval
//! - Generation counter: every completion re-checks it under the state lock
//!   and is dropped when a newer rebuild has happened
//! - Event delivery over an mpsc channel, consumed as a `Stream`

use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures_util::stream::Stream;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::marker::{markers_from_signals, MarkerStyle};
use super::reconcile::{reconcile, Action, PanelDeps};
use super::surface::{ChartOptions, ChartSurface, SeriesId, SurfaceFactory};
use super::{ChartConfig, ChartEvent, ChartSnapshot, ChartState, PanelNotice};
use crate::domain::alert::AlertProjector;
use crate::domain::candle::Candle;
use crate::domain::signal::{RemoteEndpoint, Signal, SignalStrategy};
use crate::error::SdkError;
use crate::feed::{FeedRequest, MarketFeed};
use crate::http::RetryPolicy;

const EVENT_BUFFER: usize = 256;

// ─── State shared with background tasks ──────────────────────────────────────

struct Shared {
    generation: u64,
    surface: Option<Box<dyn ChartSurface>>,
    series: Option<SeriesId>,
    state: ChartState,
    notice: Option<PanelNotice>,
    candle_count: usize,
    signals: Vec<Signal>,
}

impl Shared {
    fn new() -> Self {
        Self {
            generation: 0,
            surface: None,
            series: None,
            state: ChartState::Idle,
            notice: None,
            candle_count: 0,
            signals: Vec::new(),
        }
    }

    fn render(&mut self, f: impl FnOnce(&mut dyn ChartSurface, SeriesId)) {
        if let (Some(surface), Some(series)) = (self.surface.as_mut(), self.series) {
            f(&mut **surface, series);
        }
    }

    fn dispose_surface(&mut self) {
        if let Some(mut surface) = self.surface.take() {
            surface.remove();
        }
        self.series = None;
        self.candle_count = 0;
        self.signals.clear();
        self.notice = None;
        self.state = ChartState::Idle;
    }
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

fn abort(task: &mut Option<JoinHandle<()>>) {
    if let Some(handle) = task.take() {
        handle.abort();
    }
}

// ─── One render cycle ────────────────────────────────────────────────────────

/// Everything a background task of one generation needs.
#[derive(Clone)]
struct Cycle {
    generation: u64,
    shared: Arc<Mutex<Shared>>,
    events: mpsc::Sender<ChartEvent>,
    feed: Arc<dyn MarketFeed>,
    projector: Option<AlertProjector>,
    markers: MarkerStyle,
    strategy: SignalStrategy,
    request: FeedRequest,
}

impl Cycle {
    /// The state lock, or `None` when this cycle has been superseded.
    fn current(&self) -> Option<MutexGuard<'_, Shared>> {
        let guard = lock(&self.shared);
        (guard.generation == self.generation).then_some(guard)
    }

    fn emit(&self, event: ChartEvent) {
        let _ = self.events.try_send(event);
    }

    fn fail(&self, notice: PanelNotice) {
        let Some(mut shared) = self.current() else {
            return;
        };
        shared.render(|surface, series| surface.set_series_markers(series, &[]));
        shared.signals.clear();
        shared.state = ChartState::Failed;
        shared.notice = Some(notice.clone());
        tracing::info!(symbol = %self.request.symbol, "Chart failed: {}", notice);
        self.emit(ChartEvent::Notice(notice));
        self.emit(ChartEvent::StateChanged(ChartState::Failed));
    }

    /// Draw candles in one bulk update. `None` when the cycle ends here.
    fn apply_candles(&self, result: Result<Vec<Candle>, SdkError>) -> Option<Vec<Candle>> {
        let candles = match result {
            Ok(candles) if !candles.is_empty() => candles,
            Ok(_) => {
                self.fail(PanelNotice::NoCandles {
                    symbol: self.request.symbol.clone(),
                });
                return None;
            }
            Err(e) => {
                tracing::warn!(symbol = %self.request.symbol, error = %e, "Candle fetch failed");
                self.fail(PanelNotice::from_error(&e));
                return None;
            }
        };

        let Some(mut shared) = self.current() else {
            tracing::debug!(generation = self.generation, "Discarding stale candles");
            return None;
        };
        shared.render(|surface, series| surface.set_series_data(series, &candles));
        shared.candle_count = candles.len();
        Some(candles)
    }

    /// Replace the marker overlay.
    ///
    /// `initial` completes the load (→ `Rendered`). Poll refreshes only apply
    /// to a panel that is already rendered.
    fn apply_signals(&self, signals: Vec<Signal>, notice: Option<PanelNotice>, initial: bool) {
        {
            let Some(mut shared) = self.current() else {
                tracing::debug!(generation = self.generation, "Discarding stale signals");
                return;
            };
            if !initial && shared.state != ChartState::Rendered {
                return;
            }

            let markers = markers_from_signals(&signals, &self.markers);
            shared.render(|surface, series| surface.set_series_markers(series, &markers));
            shared.signals = signals.clone();

            if let Some(notice) = &notice {
                self.emit(ChartEvent::Notice(notice.clone()));
            }
            self.emit(ChartEvent::SignalsUpdated {
                symbol: self.request.symbol.clone(),
                signals: signals.clone(),
            });
            if initial {
                shared.notice = notice;
                shared.state = ChartState::Rendered;
                self.emit(ChartEvent::StateChanged(ChartState::Rendered));
            }
        }

        self.project_alert(&signals);
    }

    fn project_alert(&self, signals: &[Signal]) {
        let Some(projector) = &self.projector else {
            return;
        };
        match projector.project(&self.request.symbol, signals) {
            Ok(Some(alert)) => self.emit(ChartEvent::Alert {
                symbol: self.request.symbol.clone(),
                alert,
            }),
            Ok(None) => {}
            Err(e) => tracing::warn!(symbol = %self.request.symbol, error = %e, "Alert projection failed"),
        }
    }
}

// ─── Background tasks ────────────────────────────────────────────────────────

async fn run_load(cycle: Cycle) {
    let candles = async {
        let result = cycle.feed.candles(&cycle.request).await;
        cycle.apply_candles(result)
    };
    let remote = async {
        match cycle.strategy {
            SignalStrategy::Remote(endpoint) => {
                Some(cycle.feed.remote_signals(endpoint, &cycle.request).await)
            }
            SignalStrategy::Local(_) => None,
        }
    };
    let (candles, remote) = futures_util::future::join(candles, remote).await;

    let Some(candles) = candles else {
        return;
    };

    let (signals, notice) = match remote {
        Some(Ok(signals)) => (signals, None),
        Some(Err(e)) => {
            tracing::warn!(symbol = %cycle.request.symbol, error = %e, "Signal fetch failed");
            (Vec::new(), Some(PanelNotice::from_error(&e)))
        }
        None => (cycle.strategy.compute_local(&candles).unwrap_or_default(), None),
    };
    cycle.apply_signals(signals, notice, true);
}

async fn run_poll(cycle: Cycle, endpoint: RemoteEndpoint, period: Duration) {
    let request = cycle.request.clone().with_retry(RetryPolicy::Polling);
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let Some(state) = cycle.current().map(|shared| shared.state) else {
            return;
        };
        if state != ChartState::Rendered {
            tracing::debug!(symbol = %request.symbol, %state, "Skipping signal poll");
            continue;
        }

        tracing::debug!(symbol = %request.symbol, "Polling signals");
        match cycle.feed.remote_signals(endpoint, &request).await {
            Ok(signals) => cycle.apply_signals(signals, None, false),
            Err(e) => {
                tracing::warn!(symbol = %request.symbol, error = %e, "Signal poll failed, keeping current overlay")
            }
        }
    }
}

async fn track_width(mut width: watch::Receiver<u32>, shared: Arc<Mutex<Shared>>, generation: u64) {
    while width.changed().await.is_ok() {
        let w = *width.borrow_and_update();
        let mut guard = lock(&shared);
        if guard.generation != generation {
            break;
        }
        if let Some(surface) = guard.surface.as_mut() {
            surface.apply_width(w);
        }
    }
}

// ─── Public controller ───────────────────────────────────────────────────────

/// Keeps one chart panel in sync with its inputs.
///
/// Call [`update`](Self::update) whenever the panel's inputs may have changed
/// and [`unmount`](Self::unmount) (or drop the controller) when the panel goes
/// away. Both must run inside a tokio runtime.
pub struct LiveChartController {
    feed: Arc<dyn MarketFeed>,
    factory: Arc<dyn SurfaceFactory>,
    config: ChartConfig,
    width: watch::Receiver<u32>,
    projector: Option<AlertProjector>,
    shared: Arc<Mutex<Shared>>,
    deps: Option<PanelDeps>,
    load_task: Option<JoinHandle<()>>,
    resize_task: Option<JoinHandle<()>>,
    poll_task: Option<JoinHandle<()>>,
    event_tx: mpsc::Sender<ChartEvent>,
    event_rx: tokio::sync::Mutex<mpsc::Receiver<ChartEvent>>,
}

impl LiveChartController {
    /// `width` is the container width in pixels, updated by the embedder.
    pub fn new(
        feed: Arc<dyn MarketFeed>,
        factory: Arc<dyn SurfaceFactory>,
        width: watch::Receiver<u32>,
        config: ChartConfig,
    ) -> Self {
        let (event_tx, event_rx) = mpsc::channel(EVENT_BUFFER);
        Self {
            feed,
            factory,
            config,
            width,
            projector: None,
            shared: Arc::new(Mutex::new(Shared::new())),
            deps: None,
            load_task: None,
            resize_task: None,
            poll_task: None,
            event_tx,
            event_rx: tokio::sync::Mutex::new(event_rx),
        }
    }

    /// Project every signal update onto per-symbol alerts.
    pub fn with_alerts(mut self, projector: AlertProjector) -> Self {
        self.projector = Some(projector);
        self
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    pub fn deps(&self) -> Option<&PanelDeps> {
        self.deps.as_ref()
    }

    /// Apply a (possibly unchanged) set of panel inputs.
    ///
    /// Returns the actions taken; empty when nothing changed.
    pub fn update(&mut self, deps: PanelDeps) -> Vec<Action> {
        let actions = reconcile(self.deps.as_ref(), &deps);
        if actions.is_empty() {
            self.deps = Some(deps);
            return actions;
        }

        tracing::debug!(?actions, symbol = %deps.symbol, source = ?deps.source, "Reconciling chart panel");

        let generation = {
            let mut shared = lock(&self.shared);
            shared.generation += 1;
            shared.generation
        };

        let mut fetch = false;
        let mut poll = false;
        for action in &actions {
            match action {
                Action::StopPoll => abort(&mut self.poll_task),
                Action::DisposeSurface => self.dispose_surface(),
                Action::CreateSurface => self.create_surface(generation),
                Action::FetchCandles | Action::FetchSignals => fetch = true,
                Action::StartPoll => poll = true,
            }
        }

        let state = lock(&self.shared).state;
        let _ = self.event_tx.try_send(ChartEvent::StateChanged(state));

        if let Some(cycle) = self.cycle(&deps, generation) {
            if fetch {
                self.load_task = Some(tokio::spawn(run_load(cycle.clone())));
            }
            if let (true, SignalStrategy::Remote(endpoint)) = (poll, cycle.strategy) {
                // Never stack pollers.
                abort(&mut self.poll_task);
                self.poll_task = Some(tokio::spawn(run_poll(
                    cycle,
                    endpoint,
                    self.config.poll_interval,
                )));
            }
        }

        self.deps = Some(deps);
        actions
    }

    /// Tear everything down. The controller can be updated again afterwards.
    pub fn unmount(&mut self) {
        let had_surface = lock(&self.shared).surface.is_some();
        self.teardown();
        self.deps = None;
        if had_surface {
            let _ = self.event_tx.try_send(ChartEvent::StateChanged(ChartState::Idle));
        }
    }

    pub fn snapshot(&self) -> ChartSnapshot {
        let shared = lock(&self.shared);
        ChartSnapshot {
            state: shared.state,
            notice: shared.notice.clone(),
            generation: shared.generation,
            has_surface: shared.surface.is_some(),
            poll_active: self.poll_task.as_ref().is_some_and(|h| !h.is_finished()),
            candle_count: shared.candle_count,
            signals: shared.signals.clone(),
        }
    }

    /// Stream of controller events.
    ///
    /// The returned stream borrows `self`, so it must be dropped before
    /// calling `update` or `unmount`.
    pub fn events(&self) -> Pin<Box<dyn Stream<Item = ChartEvent> + Send + '_>> {
        Box::pin(futures_util::stream::unfold(
            &self.event_rx,
            |rx| async move {
                let mut guard = rx.lock().await;
                guard.recv().await.map(|event| (event, rx))
            },
        ))
    }

    /// Non-blocking read of the next buffered event.
    pub fn try_next_event(&self) -> Option<ChartEvent> {
        self.event_rx.try_lock().ok()?.try_recv().ok()
    }

    // ── Internals ────────────────────────────────────────────────────────

    fn cycle(&self, deps: &PanelDeps, generation: u64) -> Option<Cycle> {
        let source = deps.source?;
        let strategy = SignalStrategy::for_source(source, &self.config.crossover)?;
        Some(Cycle {
            generation,
            shared: Arc::clone(&self.shared),
            events: self.event_tx.clone(),
            feed: Arc::clone(&self.feed),
            projector: self.projector.clone(),
            markers: self.config.markers.clone(),
            strategy,
            request: FeedRequest {
                source,
                symbol: deps.symbol.clone(),
                credential: deps.credential.clone(),
                uploaded_rows: deps.uploaded_rows.clone(),
                retry: RetryPolicy::Idempotent,
            },
        })
    }

    fn create_surface(&mut self, generation: u64) {
        let width = *self.width.borrow();
        let options = ChartOptions {
            width,
            height: self.config.height,
            theme: self.config.theme.clone(),
            time_visible: true,
            seconds_visible: false,
        };
        let mut surface = self.factory.create(&options);
        let series = surface.add_candle_series(&self.config.series_style);

        {
            let mut shared = lock(&self.shared);
            // One live surface at a time.
            shared.dispose_surface();
            shared.surface = Some(surface);
            shared.series = Some(series);
            shared.state = ChartState::Loading;
        }

        let mut width_rx = self.width.clone();
        width_rx.borrow_and_update();
        abort(&mut self.resize_task);
        self.resize_task = Some(tokio::spawn(track_width(
            width_rx,
            Arc::clone(&self.shared),
            generation,
        )));
    }

    fn dispose_surface(&mut self) {
        abort(&mut self.load_task);
        abort(&mut self.resize_task);
        lock(&self.shared).dispose_surface();
    }

    fn teardown(&mut self) {
        abort(&mut self.poll_task);
        abort(&mut self.load_task);
        abort(&mut self.resize_task);
        let mut shared = lock(&self.shared);
        shared.generation += 1;
        shared.dispose_surface();
    }
}

impl Drop for LiveChartController {
    fn drop(&mut self) {
        self.teardown();
    }
}
