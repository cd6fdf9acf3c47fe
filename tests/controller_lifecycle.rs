//! Lifecycle tests for `LiveChartController` against a scripted feed and a
//! recording surface. Time is paused, so the 90 s poll runs instantly.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chartdesk::chart::{
    Action, ChartConfig, ChartEvent, ChartOptions, ChartState, ChartSurface, LiveChartController,
    MarkerPosition, PanelDeps, PanelNotice, SeriesId, SeriesMarker, SurfaceFactory,
};
use chartdesk::chart::surface::CandleSeriesStyle;
use chartdesk::domain::alert::AlertProjector;
use chartdesk::domain::candle::{from_csv_rows, Candle, CsvRow};
use chartdesk::domain::signal::{
    Confidence, CrossoverConfig, RemoteEndpoint, Signal, SignalTimestamp, SignalType,
};
use chartdesk::error::{HttpError, SdkError};
use chartdesk::feed::{FeedRequest, MarketFeed};
use chartdesk::shared::DataSource;
use tokio::sync::watch;

// ─── Scripted feed ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
enum SignalMode {
    Ok,
    WrongShape,
    Unavailable,
}

struct FakeFeed {
    candles: Mutex<HashMap<String, Vec<Candle>>>,
    delays: Mutex<HashMap<String, Duration>>,
    signals: Mutex<Vec<Signal>>,
    mode: Mutex<SignalMode>,
    signal_calls: Mutex<HashMap<String, usize>>,
}

impl FakeFeed {
    fn new() -> Self {
        Self {
            candles: Mutex::new(HashMap::new()),
            delays: Mutex::new(HashMap::new()),
            signals: Mutex::new(vec![
                signal(SignalType::Buy, candle_time(2)),
                signal(SignalType::Sell, candle_time(5)),
            ]),
            mode: Mutex::new(SignalMode::Ok),
            signal_calls: Mutex::new(HashMap::new()),
        }
    }

    fn set_candles(&self, symbol: &str, candles: Vec<Candle>) {
        self.candles.lock().unwrap().insert(symbol.to_string(), candles);
    }

    fn set_delay(&self, symbol: &str, delay: Duration) {
        self.delays.lock().unwrap().insert(symbol.to_string(), delay);
    }

    fn set_mode(&self, mode: SignalMode) {
        *self.mode.lock().unwrap() = mode;
    }

    fn signal_calls(&self, symbol: &str) -> usize {
        self.signal_calls.lock().unwrap().get(symbol).copied().unwrap_or(0)
    }
}

#[async_trait]
impl MarketFeed for FakeFeed {
    async fn candles(&self, req: &FeedRequest) -> Result<Vec<Candle>, SdkError> {
        let delay = self.delays.lock().unwrap().get(req.symbol.as_str()).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if req.source == DataSource::CsvUpload {
            return Ok(req
                .uploaded_rows
                .as_deref()
                .map(|rows| from_csv_rows(rows))
                .unwrap_or_default());
        }
        let scripted = self.candles.lock().unwrap().get(req.symbol.as_str()).cloned();
        Ok(scripted.unwrap_or_else(|| series(&[10.0, 11.0, 12.0, 11.0, 10.0, 11.0, 12.0, 13.0])))
    }

    async fn remote_signals(
        &self,
        endpoint: RemoteEndpoint,
        req: &FeedRequest,
    ) -> Result<Vec<Signal>, SdkError> {
        *self
            .signal_calls
            .lock()
            .unwrap()
            .entry(req.symbol.as_str().to_string())
            .or_default() += 1;

        let mode = *self.mode.lock().unwrap();
        match mode {
            SignalMode::Ok => Ok(self.signals.lock().unwrap().clone()),
            SignalMode::WrongShape => Err(SdkError::ShapeMismatch {
                endpoint: endpoint.path().to_string(),
                expected: "array of signals",
            }),
            SignalMode::Unavailable => Err(SdkError::Http(HttpError::ServerError {
                status: 503,
                body: "upstream rate limited".into(),
            })),
        }
    }
}

// ─── Recording surface ───────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct SurfaceLog {
    options: Option<ChartOptions>,
    series_added: usize,
    data_sets: Vec<usize>,
    markers: Vec<Vec<SeriesMarker>>,
    widths: Vec<u32>,
    removed: bool,
}

struct FakeSurface {
    log: Arc<Mutex<SurfaceLog>>,
}

impl ChartSurface for FakeSurface {
    fn add_candle_series(&mut self, _style: &CandleSeriesStyle) -> SeriesId {
        let mut log = self.log.lock().unwrap();
        log.series_added += 1;
        SeriesId(log.series_added as u32)
    }

    fn set_series_data(&mut self, _series: SeriesId, candles: &[Candle]) {
        self.log.lock().unwrap().data_sets.push(candles.len());
    }

    fn set_series_markers(&mut self, _series: SeriesId, markers: &[SeriesMarker]) {
        self.log.lock().unwrap().markers.push(markers.to_vec());
    }

    fn apply_width(&mut self, width: u32) {
        self.log.lock().unwrap().widths.push(width);
    }

    fn remove(&mut self) {
        self.log.lock().unwrap().removed = true;
    }
}

#[derive(Default)]
struct FakeFactory {
    surfaces: Mutex<Vec<Arc<Mutex<SurfaceLog>>>>,
}

impl FakeFactory {
    fn created(&self) -> usize {
        self.surfaces.lock().unwrap().len()
    }

    fn live(&self) -> usize {
        self.surfaces
            .lock()
            .unwrap()
            .iter()
            .filter(|s| !s.lock().unwrap().removed)
            .count()
    }

    fn surface(&self, index: usize) -> Arc<Mutex<SurfaceLog>> {
        Arc::clone(&self.surfaces.lock().unwrap()[index])
    }
}

impl SurfaceFactory for FakeFactory {
    fn create(&self, options: &ChartOptions) -> Box<dyn ChartSurface> {
        let log = Arc::new(Mutex::new(SurfaceLog {
            options: Some(options.clone()),
            ..SurfaceLog::default()
        }));
        self.surfaces.lock().unwrap().push(Arc::clone(&log));
        Box::new(FakeSurface { log })
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

const BASE_TIME: i64 = 1_700_000_000;

fn candle_time(i: i64) -> i64 {
    BASE_TIME + i * 300
}

fn series(closes: &[f64]) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, c)| Candle {
            time: candle_time(i as i64),
            open: *c,
            high: *c + 1.0,
            low: *c - 1.0,
            close: *c,
            volume: 100.0,
        })
        .collect()
}

fn signal(kind: SignalType, time_secs: i64) -> Signal {
    Signal {
        kind,
        confidence: Confidence::Value(80.0),
        timestamp: SignalTimestamp::from_millis(time_secs * 1000),
        symbol: None,
    }
}

struct Harness {
    feed: Arc<FakeFeed>,
    factory: Arc<FakeFactory>,
    width: watch::Sender<u32>,
    chart: LiveChartController,
}

fn harness(config: ChartConfig) -> Harness {
    harness_with_alerts(config, None)
}

fn harness_with_alerts(config: ChartConfig, alerts: Option<AlertProjector>) -> Harness {
    let feed = Arc::new(FakeFeed::new());
    let factory = Arc::new(FakeFactory::default());
    let (width, width_rx) = watch::channel(800);
    let mut chart = LiveChartController::new(
        Arc::clone(&feed) as Arc<dyn MarketFeed>,
        Arc::clone(&factory) as Arc<dyn SurfaceFactory>,
        width_rx,
        config,
    );
    if let Some(projector) = alerts {
        chart = chart.with_alerts(projector);
    }
    Harness {
        feed,
        factory,
        width,
        chart,
    }
}

/// Let spawned tasks run to their next suspension point.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

fn drain(chart: &LiveChartController) -> Vec<ChartEvent> {
    std::iter::from_fn(|| chart.try_next_event()).collect()
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_live_panel_renders_candles_and_markers() {
    let mut h = harness(ChartConfig::default());
    h.chart.update(PanelDeps::new(DataSource::Stocks, "AAPL"));
    settle().await;

    let snap = h.chart.snapshot();
    assert_eq!(snap.state, ChartState::Rendered);
    assert_eq!(snap.candle_count, 8);
    assert_eq!(snap.signals.len(), 2);
    assert!(snap.poll_active);
    assert!(snap.notice.is_none());

    let surface = h.factory.surface(0);
    let log = surface.lock().unwrap();
    let options = log.options.as_ref().unwrap();
    assert_eq!((options.width, options.height), (800, 320));
    assert_eq!(log.series_added, 1);
    assert_eq!(log.data_sets, [8]);

    let markers = log.markers.last().unwrap();
    assert_eq!(markers.len(), 2);
    assert_eq!(markers[0].position, MarkerPosition::BelowBar);
    assert_eq!(markers[0].text, "BUY");
    assert_eq!(markers[0].time, candle_time(2));
    assert_eq!(markers[1].text, "SELL");
    assert_eq!(markers[1].color, "#ef4444");
}

#[tokio::test(start_paused = true)]
async fn test_unchanged_deps_are_idempotent() {
    let mut h = harness(ChartConfig::default());
    let deps = PanelDeps::new(DataSource::Crypto, "bitcoin");

    assert!(!h.chart.update(deps.clone()).is_empty());
    assert!(h.chart.update(deps.clone()).is_empty());
    settle().await;
    assert!(h.chart.update(deps).is_empty());

    assert_eq!(h.factory.created(), 1);
    assert_eq!(h.feed.signal_calls("bitcoin"), 1);

    // One poller: exactly one extra fetch per interval.
    tokio::time::sleep(Duration::from_secs(91)).await;
    assert_eq!(h.feed.signal_calls("bitcoin"), 2);
    tokio::time::sleep(Duration::from_secs(90)).await;
    assert_eq!(h.feed.signal_calls("bitcoin"), 3);
}

#[tokio::test(start_paused = true)]
async fn test_symbol_switch_cancels_previous_poll() {
    let mut h = harness(ChartConfig::default());
    h.chart.update(PanelDeps::new(DataSource::Stocks, "AAPL"));
    settle().await;

    let actions = h.chart.update(PanelDeps::new(DataSource::Stocks, "MSFT"));
    assert_eq!(actions.first(), Some(&Action::StopPoll));
    settle().await;

    tokio::time::sleep(Duration::from_secs(91)).await;
    assert_eq!(h.feed.signal_calls("AAPL"), 1);
    assert_eq!(h.feed.signal_calls("MSFT"), 2);

    assert_eq!(h.factory.created(), 2);
    assert_eq!(h.factory.live(), 1);
    assert!(h.factory.surface(0).lock().unwrap().removed);
}

#[tokio::test(start_paused = true)]
async fn test_stale_load_is_discarded() {
    let mut h = harness(ChartConfig::default());
    h.feed.set_delay("SLOW", Duration::from_secs(10));

    h.chart.update(PanelDeps::new(DataSource::Stocks, "SLOW"));
    settle().await;
    h.chart.update(PanelDeps::new(DataSource::Stocks, "FAST"));
    tokio::time::sleep(Duration::from_secs(20)).await;

    let slow = h.factory.surface(0);
    assert!(slow.lock().unwrap().data_sets.is_empty());
    assert!(slow.lock().unwrap().removed);

    let snap = h.chart.snapshot();
    assert_eq!(snap.state, ChartState::Rendered);
    assert_eq!(h.chart.deps().unwrap().symbol.as_str(), "FAST");
    assert_eq!(h.factory.surface(1).lock().unwrap().data_sets, [8]);
}

#[tokio::test(start_paused = true)]
async fn test_empty_candles_fail_with_notice() {
    let mut h = harness(ChartConfig::default());
    h.feed.set_candles("NONE", Vec::new());
    h.chart.update(PanelDeps::new(DataSource::Stocks, "NONE"));
    settle().await;

    let snap = h.chart.snapshot();
    assert_eq!(snap.state, ChartState::Failed);
    assert!(matches!(snap.notice, Some(PanelNotice::NoCandles { .. })));
    assert!(snap.signals.is_empty());

    let surface = h.factory.surface(0);
    let log = surface.lock().unwrap();
    assert!(log.data_sets.is_empty());
    assert_eq!(log.markers.last().map(Vec::len), Some(0));

    let events = drain(&h.chart);
    assert!(events
        .iter()
        .any(|e| matches!(e, ChartEvent::Notice(PanelNotice::NoCandles { .. }))));
    assert_eq!(
        events.last(),
        Some(&ChartEvent::StateChanged(ChartState::Failed))
    );
}

#[tokio::test(start_paused = true)]
async fn test_failed_panel_does_not_poll() {
    let mut h = harness(ChartConfig::default());
    h.feed.set_candles("NONE", Vec::new());
    h.chart.update(PanelDeps::new(DataSource::Stocks, "NONE"));
    settle().await;
    assert_eq!(h.chart.snapshot().state, ChartState::Failed);
    // The load fetches signals alongside candles.
    assert_eq!(h.feed.signal_calls("NONE"), 1);

    tokio::time::sleep(Duration::from_secs(91 * 3)).await;
    assert_eq!(h.feed.signal_calls("NONE"), 1);
    assert_eq!(h.chart.snapshot().state, ChartState::Failed);
}

#[tokio::test(start_paused = true)]
async fn test_signal_shape_mismatch_still_renders_candles() {
    let mut h = harness(ChartConfig::default());
    h.feed.set_mode(SignalMode::WrongShape);
    h.chart.update(PanelDeps::new(DataSource::Crypto, "bitcoin"));
    settle().await;

    let snap = h.chart.snapshot();
    assert_eq!(snap.state, ChartState::Rendered);
    assert_eq!(snap.candle_count, 8);
    assert!(snap.signals.is_empty());
    assert_eq!(
        snap.notice,
        Some(PanelNotice::UnexpectedShape {
            endpoint: "/api/crypto-signals".into()
        })
    );
}

#[tokio::test(start_paused = true)]
async fn test_poll_failures_keep_current_overlay() {
    let mut h = harness(ChartConfig::default());
    h.chart.update(PanelDeps::new(DataSource::Stocks, "AAPL"));
    settle().await;

    h.feed.set_mode(SignalMode::Unavailable);
    tokio::time::sleep(Duration::from_secs(91)).await;

    let snap = h.chart.snapshot();
    assert_eq!(h.feed.signal_calls("AAPL"), 2);
    assert_eq!(snap.state, ChartState::Rendered);
    assert_eq!(snap.signals.len(), 2);
    assert!(snap.poll_active);
}

#[tokio::test(start_paused = true)]
async fn test_poll_reapplies_markers() {
    let mut h = harness(ChartConfig::default());
    h.chart.update(PanelDeps::new(DataSource::Stocks, "AAPL"));
    settle().await;

    h.feed
        .signals
        .lock()
        .unwrap()
        .push(signal(SignalType::Buy, candle_time(7)));
    tokio::time::sleep(Duration::from_secs(91)).await;

    let surface = h.factory.surface(0);
    let log = surface.lock().unwrap();
    assert_eq!(log.markers.len(), 2);
    assert_eq!(log.markers[1].len(), 3);
    // Candles are never re-fetched by the poll.
    assert_eq!(log.data_sets, [8]);
}

#[tokio::test(start_paused = true)]
async fn test_csv_upload_uses_local_crossover_without_poll() {
    let config = ChartConfig {
        crossover: CrossoverConfig::new(2, 5).unwrap(),
        ..ChartConfig::default()
    };
    let mut h = harness(config);

    let closes = [
        10, 10, 10, 10, 10, 11, 12, 13, 14, 15, 14, 13, 12, 11, 10, 9, 8,
    ];
    let rows: Vec<CsvRow> = closes
        .iter()
        .enumerate()
        .rev()
        .map(|(day, close)| {
            let close = close.to_string();
            CsvRow::new(
                "ACME",
                &format!("2024-03-{:02}", day + 1),
                &close,
                &close,
                &close,
                &close,
                "1000",
            )
        })
        .collect();

    let actions = h.chart.update(
        PanelDeps::new(DataSource::CsvUpload, "ACME").with_uploaded_rows(Arc::new(rows)),
    );
    assert!(!actions.contains(&Action::StartPoll));
    settle().await;

    let snap = h.chart.snapshot();
    assert_eq!(snap.state, ChartState::Rendered);
    assert_eq!(snap.candle_count, closes.len());
    assert!(!snap.poll_active);

    let kinds: Vec<SignalType> = snap.signals.iter().map(|s| s.kind).collect();
    assert_eq!(kinds, [SignalType::Buy, SignalType::Sell]);
    assert_eq!(snap.signals[0].confidence, Confidence::Value(70.0));
    assert_eq!(snap.latest_signal().unwrap().kind, SignalType::Sell);
    assert_eq!(h.feed.signal_calls("ACME"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_resize_follows_container_until_rebuild() {
    let mut h = harness(ChartConfig::default());
    h.chart.update(PanelDeps::new(DataSource::Stocks, "AAPL"));
    settle().await;

    h.width.send(1024).unwrap();
    settle().await;
    assert_eq!(h.factory.surface(0).lock().unwrap().widths, [1024]);

    h.chart.update(PanelDeps::new(DataSource::Stocks, "MSFT"));
    settle().await;
    let second = h.factory.surface(1);
    assert_eq!(second.lock().unwrap().options.as_ref().unwrap().width, 1024);

    h.width.send(640).unwrap();
    settle().await;
    assert_eq!(h.factory.surface(0).lock().unwrap().widths, [1024]);
    assert_eq!(second.lock().unwrap().widths, [640]);
}

#[tokio::test(start_paused = true)]
async fn test_idle_inputs_create_nothing() {
    let mut h = harness(ChartConfig::default());
    assert!(h.chart.update(PanelDeps::new(DataSource::Stocks, "")).is_empty());
    assert!(h.chart.update(PanelDeps::new(DataSource::Csv, "AAPL")).is_empty());
    assert!(h.chart.update(PanelDeps::default()).is_empty());
    settle().await;

    assert_eq!(h.factory.created(), 0);
    assert_eq!(h.chart.snapshot().state, ChartState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_going_idle_disposes_surface_and_poll() {
    let mut h = harness(ChartConfig::default());
    h.chart.update(PanelDeps::new(DataSource::Stocks, "AAPL"));
    settle().await;

    h.chart.update(PanelDeps::new(DataSource::Stocks, ""));
    let snap = h.chart.snapshot();
    assert_eq!(snap.state, ChartState::Idle);
    assert!(!snap.has_surface);
    assert!(!snap.poll_active);
    assert_eq!(h.factory.live(), 0);

    tokio::time::sleep(Duration::from_secs(200)).await;
    assert_eq!(h.feed.signal_calls("AAPL"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_unmount_and_drop_release_everything() {
    let mut h = harness(ChartConfig::default());
    h.chart.update(PanelDeps::new(DataSource::Crypto, "ethereum"));
    settle().await;

    h.chart.unmount();
    assert_eq!(h.factory.live(), 0);
    assert!(h.chart.deps().is_none());
    tokio::time::sleep(Duration::from_secs(200)).await;
    assert_eq!(h.feed.signal_calls("ethereum"), 1);

    h.chart.update(PanelDeps::new(DataSource::Crypto, "ethereum"));
    settle().await;
    assert_eq!(h.factory.live(), 1);

    let Harness { feed, factory, chart, .. } = h;
    drop(chart);
    assert_eq!(factory.live(), 0);
    tokio::time::sleep(Duration::from_secs(200)).await;
    assert_eq!(feed.signal_calls("ethereum"), 2);
}

#[tokio::test(start_paused = true)]
async fn test_alerts_flag_only_new_signals() {
    let projector = AlertProjector::in_memory();
    let mut h = harness_with_alerts(ChartConfig::default(), Some(projector.clone()));

    h.chart.update(PanelDeps::new(DataSource::Stocks, "AAPL"));
    settle().await;
    tokio::time::sleep(Duration::from_secs(91)).await;

    let alerts: Vec<bool> = drain(&h.chart)
        .into_iter()
        .filter_map(|e| match e {
            ChartEvent::Alert { alert, .. } => Some(alert.is_new),
            _ => None,
        })
        .collect();
    assert_eq!(alerts, [true, false]);

    let marker = projector.store().get(&"AAPL".into()).unwrap();
    assert_eq!(marker, Some(candle_time(5) * 1000));
}
