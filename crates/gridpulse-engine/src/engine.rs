//! The engine: single-threaded owner of all view and notification state.
//!
//! Spawned tasks and the shell communicate with the engine exclusively
//! through [`Message`]s; `update` applies each message and returns the
//! [`Effect`]s the shell must perform (currently only route changes).
//! Nothing in here blocks: fetches and timers live in the scheduler's tasks.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc;

use gridpulse_core::prelude::*;
use gridpulse_core::{DatasetId, DatasetSpec, Route};
use gridpulse_feed::{apply_tick, DataService, TickProfile};

use crate::config::Settings;
use crate::highlight::RowHighlighter;
use crate::message::Message;
use crate::navigation::{NavigationOutcome, NavigationRouter, NavigationTarget};
use crate::notifications::NotificationStore;
use crate::scheduler::RefreshScheduler;
use crate::surface::RenderingSurface;
use crate::view::TableView;

/// Side effects the shell performs on the engine's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Perform a route change, then report back with `RouteChanged` and a
    /// `GridReady` for each grid the new page mounts.
    Redirect(Route),
}

/// Per-dataset registration: static wiring plus its tick simulation profile.
#[derive(Debug, Clone)]
struct DatasetRuntime {
    spec: DatasetSpec,
    tick: TickProfile,
}

/// Owner of all live-grid state.
pub struct Engine<S: DataService + Send + Sync + 'static> {
    service: Arc<S>,
    settings: Settings,
    datasets: HashMap<DatasetId, DatasetRuntime>,
    /// grid id → identity key field, for notifications without an explicit one.
    grid_keys: HashMap<String, String>,
    views: HashMap<DatasetId, TableView>,
    pub scheduler: RefreshScheduler,
    pub notifications: NotificationStore,
    pub router: NavigationRouter,
    pub highlighter: RowHighlighter,
    last_updated: HashMap<DatasetId, DateTime<Utc>>,
    last_error: HashMap<DatasetId, String>,
    rng: StdRng,
}

impl<S: DataService + Send + Sync + 'static> Engine<S> {
    pub fn new(service: Arc<S>, settings: Settings, msg_tx: mpsc::Sender<Message>) -> Self {
        let pacing = Duration::from_millis(settings.refresh.pacing_ms);
        let notifications = NotificationStore::new(settings.notifications.page_size);
        Self {
            service,
            scheduler: RefreshScheduler::new(msg_tx, pacing),
            notifications,
            router: NavigationRouter::new(),
            highlighter: RowHighlighter::new(),
            datasets: HashMap::new(),
            grid_keys: HashMap::new(),
            views: HashMap::new(),
            last_updated: HashMap::new(),
            last_error: HashMap::new(),
            rng: StdRng::from_entropy(),
            settings,
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Registration & accessors
    // ─────────────────────────────────────────────────────────────

    /// Register a dataset with its grid wiring and tick profile.
    pub fn register_dataset(&mut self, spec: DatasetSpec, tick: TickProfile) {
        let id = spec.id.clone();
        self.grid_keys
            .insert(spec.grid_id.clone(), spec.row_key_field.clone());
        self.views
            .insert(id.clone(), TableView::new(self.settings.table.page_size));
        self.datasets.insert(id, DatasetRuntime { spec, tick });
    }

    pub fn spec(&self, dataset: &DatasetId) -> Option<&DatasetSpec> {
        self.datasets.get(dataset).map(|r| &r.spec)
    }

    pub fn dataset_ids(&self) -> Vec<DatasetId> {
        let mut ids: Vec<DatasetId> = self.datasets.keys().cloned().collect();
        ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        ids
    }

    /// Specs of the grids that live on a route (what a page mounts).
    pub fn specs_for_route(&self, route: &Route) -> Vec<&DatasetSpec> {
        self.datasets
            .values()
            .map(|r| &r.spec)
            .filter(|s| &Route::for_target(&s.module, &s.subtab) == route)
            .collect()
    }

    pub fn view(&self, dataset: &DatasetId) -> Option<&TableView> {
        self.views.get(dataset)
    }

    pub fn view_mut(&mut self, dataset: &DatasetId) -> Option<&mut TableView> {
        self.views.get_mut(dataset)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn last_updated(&self, dataset: &DatasetId) -> Option<DateTime<Utc>> {
        self.last_updated.get(dataset).copied()
    }

    pub fn last_error(&self, dataset: &DatasetId) -> Option<&str> {
        self.last_error.get(dataset).map(String::as_str)
    }

    // ─────────────────────────────────────────────────────────────
    // Refresh entry points
    // ─────────────────────────────────────────────────────────────

    pub fn start_auto_refresh(&mut self, dataset: &DatasetId) {
        let interval = Duration::from_millis(self.settings.refresh.auto_interval_ms);
        self.scheduler.start_auto_refresh(dataset.clone(), interval);
    }

    pub fn stop_auto_refresh(&mut self, dataset: &DatasetId) {
        self.scheduler.stop_auto_refresh(dataset);
    }

    /// Kick off a (debounced) full reload of a dataset. Also the initial
    /// load path when a page mounts.
    pub fn force_refresh(&mut self, dataset: &DatasetId) {
        self.scheduler.force_refresh(dataset, self.service.clone());
    }

    /// Push a dataset's current projection into the rendering surface.
    ///
    /// Call after view parameter changes (search, sort, page) so surface
    /// lookups operate on current rows.
    pub fn sync_surface<R: RenderingSurface>(&mut self, surface: &mut R, dataset: &DatasetId) {
        let Some(runtime) = self.datasets.get(dataset) else {
            return;
        };
        let grid_id = runtime.spec.grid_id.clone();
        let key_field = runtime.spec.row_key_field.clone();
        if let Some(view) = self.views.get_mut(dataset) {
            surface.render_rows(&grid_id, &key_field, view.sorted());
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Update loop
    // ─────────────────────────────────────────────────────────────

    /// Apply one message. Returns the effects the shell must perform.
    pub fn update<R: RenderingSurface>(&mut self, surface: &mut R, msg: Message) -> Vec<Effect> {
        match msg {
            Message::Tick => {
                self.highlighter.reapply(surface);
            }

            Message::RefreshTick { dataset } => {
                self.apply_simulated_tick(surface, &dataset);
            }

            Message::RefreshStarted { dataset } => {
                debug!(dataset = %dataset, "refresh in flight");
            }

            Message::RefreshCompleted { dataset, rows } => {
                self.scheduler.finish_refresh(&dataset);
                if let Some(view) = self.views.get_mut(&dataset) {
                    view.set_rows(rows);
                    self.last_updated.insert(dataset.clone(), Utc::now());
                    self.last_error.remove(&dataset);
                    self.sync_surface(surface, &dataset);
                } else {
                    warn!(dataset = %dataset, "refresh completed for unregistered dataset");
                }
            }

            Message::RefreshFailed { dataset, error } => {
                // Keep the last known good collection; a stale grid beats a
                // blank one.
                self.scheduler.finish_refresh(&dataset);
                warn!(dataset = %dataset, error = %error, "refresh failed, keeping stale rows");
                self.last_error.insert(dataset, error);
            }

            Message::IngestNotifications { drafts } => {
                self.notifications.ingest(drafts);
            }

            Message::NavigateToNotification { id } => {
                return self.navigate(surface, id);
            }

            Message::RouteChanged { route } => {
                self.router.set_route(route);
                // Highlights do not survive page navigation; a pending
                // cross-page highlight is re-established on GridReady.
                self.highlighter.clear(surface);
            }

            Message::GridReady { grid_id } => {
                self.router
                    .grid_ready(&grid_id, surface, &mut self.highlighter);
            }

            Message::ClearHighlight => {
                self.highlighter.clear(surface);
            }

            Message::Shutdown => {
                self.scheduler.stop_all();
            }
        }
        Vec::new()
    }

    /// One auto-refresh tick: bounded random mutation, copy-on-write
    /// replacement, re-render.
    fn apply_simulated_tick<R: RenderingSurface>(&mut self, surface: &mut R, dataset: &DatasetId) {
        let Some(runtime) = self.datasets.get(dataset) else {
            warn!(dataset = %dataset, "tick for unregistered dataset");
            return;
        };
        let tick = runtime.tick.clone();
        let Some(view) = self.views.get_mut(dataset) else {
            return;
        };
        if view.rows().is_empty() {
            // Nothing loaded yet; ticks before the initial fetch are no-ops.
            return;
        }
        let rows = apply_tick(view.rows(), &tick, &mut self.rng);
        view.set_rows(rows);
        self.last_updated.insert(dataset.clone(), Utc::now());
        self.sync_surface(surface, dataset);
    }

    fn navigate<R: RenderingSurface>(&mut self, surface: &mut R, id: u64) -> Vec<Effect> {
        let Some(notification) = self.notifications.get(id) else {
            debug!(id, "navigation target notification absent");
            return Vec::new();
        };

        let grid_id = notification.grid_id.clone();
        let row_key = notification.row_key.clone();
        let explicit_field = notification.row_key_field.clone();
        let route = notification.target_route();

        self.notifications.mark_read(id);

        let row_key_field = explicit_field
            .or_else(|| self.grid_keys.get(&grid_id).cloned())
            .unwrap_or_else(|| "id".to_string());

        let target = NavigationTarget {
            route,
            grid_id,
            row_key,
            row_key_field,
        };
        match self.router.navigate(target, surface, &mut self.highlighter) {
            NavigationOutcome::Redirect(route) => vec![Effect::Redirect(route)],
            NavigationOutcome::Highlighted { found } => {
                debug!(found, "same-page navigation handled");
                Vec::new()
            }
            NavigationOutcome::Ignored => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::HeadlessSurface;
    use gridpulse_core::{NotificationDraft, Record, RowSet};
    use serde_json::json;

    struct StaticService {
        rows: RowSet,
    }

    impl DataService for StaticService {
        async fn fetch_all(&self, _dataset: &DatasetId) -> Result<RowSet> {
            Ok(self.rows.clone())
        }
    }

    fn rows() -> RowSet {
        ["AAPL", "MSFT", "TSLA"]
            .iter()
            .map(|t| {
                Arc::new(Record::from_pairs([
                    ("ticker", json!(t)),
                    ("notional", json!("$1,000.00")),
                ]))
            })
            .collect()
    }

    fn market_spec() -> DatasetSpec {
        DatasetSpec::new(
            "market_data",
            "market_data_grid",
            "Market Data",
            "Market Data",
            "ticker",
        )
    }

    fn engine_with_data() -> (Engine<StaticService>, mpsc::Receiver<Message>) {
        let (tx, rx) = mpsc::channel(64);
        let service = Arc::new(StaticService { rows: rows() });
        let mut engine = Engine::new(service, Settings::default(), tx);
        engine.register_dataset(
            market_spec(),
            TickProfile::default().with_value_fields(["notional"]),
        );
        (engine, rx)
    }

    fn dataset() -> DatasetId {
        DatasetId::new("market_data")
    }

    #[tokio::test]
    async fn test_refresh_completed_replaces_rows_and_renders() {
        let (mut engine, _rx) = engine_with_data();
        let mut surface = HeadlessSurface::new();
        surface.mount_grid("market_data_grid", "ticker", &[]);

        engine.update(
            &mut surface,
            Message::RefreshCompleted {
                dataset: dataset(),
                rows: rows(),
            },
        );

        assert_eq!(engine.view(&dataset()).unwrap().rows().len(), 3);
        assert!(engine.last_updated(&dataset()).is_some());
        assert_eq!(
            surface.find_row("market_data_grid", "AAPL"),
            Some("AAPL".to_string())
        );
    }

    #[tokio::test]
    async fn test_refresh_failed_keeps_stale_rows() {
        let (mut engine, _rx) = engine_with_data();
        let mut surface = HeadlessSurface::new();
        surface.mount_grid("market_data_grid", "ticker", &[]);

        engine.update(
            &mut surface,
            Message::RefreshCompleted {
                dataset: dataset(),
                rows: rows(),
            },
        );
        engine.update(
            &mut surface,
            Message::RefreshFailed {
                dataset: dataset(),
                error: "backend down".into(),
            },
        );

        assert_eq!(engine.view(&dataset()).unwrap().rows().len(), 3);
        assert_eq!(engine.last_error(&dataset()), Some("backend down"));
        assert!(!engine.scheduler.is_loading(&dataset()));
    }

    #[tokio::test]
    async fn test_simulated_tick_is_copy_on_write() {
        let (mut engine, _rx) = engine_with_data();
        let mut surface = HeadlessSurface::new();
        surface.mount_grid("market_data_grid", "ticker", &[]);

        engine.update(
            &mut surface,
            Message::RefreshCompleted {
                dataset: dataset(),
                rows: rows(),
            },
        );
        let before: RowSet = engine.view(&dataset()).unwrap().rows().clone();

        engine.update(&mut surface, Message::RefreshTick { dataset: dataset() });

        let after = engine.view(&dataset()).unwrap().rows();
        let changed = before
            .iter()
            .zip(after)
            .filter(|(a, b)| !Arc::ptr_eq(a, b))
            .count();
        assert!(changed >= 1 && changed <= 3, "1-3 rows mutated per tick");
    }

    #[tokio::test]
    async fn test_tick_before_initial_load_is_noop() {
        let (mut engine, _rx) = engine_with_data();
        let mut surface = HeadlessSurface::new();
        engine.update(&mut surface, Message::RefreshTick { dataset: dataset() });
        assert!(engine.view(&dataset()).unwrap().rows().is_empty());
        assert!(engine.last_updated(&dataset()).is_none());
    }

    #[tokio::test]
    async fn test_cross_page_navigation_full_flow() {
        let (mut engine, _rx) = engine_with_data();
        let mut surface = HeadlessSurface::new();

        engine.update(
            &mut surface,
            Message::IngestNotifications {
                drafts: vec![NotificationDraft {
                    header: "Price Alert".into(),
                    message: "AAPL crossed $190".into(),
                    module: "Market Data".into(),
                    subtab: "Market Data".into(),
                    grid_id: "market_data_grid".into(),
                    row_key: "AAPL".into(),
                    ..NotificationDraft::default()
                }],
            },
        );

        // Not on the market-data page: must redirect and park the highlight.
        let effects = engine.update(&mut surface, Message::NavigateToNotification { id: 1 });
        let route = Route::from_path("/market-data/market-data");
        assert_eq!(effects, vec![Effect::Redirect(route.clone())]);
        let pending = engine.router.pending().unwrap();
        assert_eq!(pending.grid_id, "market_data_grid");
        assert_eq!(pending.row_key, "AAPL");
        assert!(engine.notifications.get(1).unwrap().read);

        // Shell performs the redirect: mounts the grid, reports back.
        surface.mount_grid("market_data_grid", "ticker", &rows());
        engine.update(&mut surface, Message::RouteChanged { route });
        engine.update(
            &mut surface,
            Message::GridReady {
                grid_id: "market_data_grid".into(),
            },
        );

        assert!(engine.router.pending().is_none());
        assert!(surface.marker_applied("market_data_grid", "AAPL"));
        assert_eq!(surface.flash_count("market_data_grid"), 1);
    }

    #[tokio::test]
    async fn test_navigation_to_absent_notification_is_noop() {
        let (mut engine, _rx) = engine_with_data();
        let mut surface = HeadlessSurface::new();
        let effects = engine.update(&mut surface, Message::NavigateToNotification { id: 99 });
        assert!(effects.is_empty());
        assert!(engine.router.pending().is_none());
    }

    #[tokio::test]
    async fn test_route_change_clears_highlight() {
        let (mut engine, _rx) = engine_with_data();
        let mut surface = HeadlessSurface::new();
        surface.mount_grid("market_data_grid", "ticker", &rows());

        engine
            .highlighter
            .jump_to_row(&mut surface, "market_data_grid", "AAPL", "ticker");
        assert!(engine.highlighter.active().is_some());

        engine.update(
            &mut surface,
            Message::RouteChanged {
                route: Route::from_path("/pnl/pnl-change"),
            },
        );
        assert!(engine.highlighter.active().is_none());
    }

    #[tokio::test]
    async fn test_tick_reapplies_marker_after_rerender() {
        let (mut engine, _rx) = engine_with_data();
        let mut surface = HeadlessSurface::new();
        surface.mount_grid("market_data_grid", "ticker", &rows());

        engine
            .highlighter
            .jump_to_row(&mut surface, "market_data_grid", "AAPL", "ticker");
        assert!(surface.marker_applied("market_data_grid", "AAPL"));

        // A re-render (virtualization churn) drops the marker...
        surface.render_rows("market_data_grid", "ticker", &rows());
        assert!(!surface.marker_applied("market_data_grid", "AAPL"));

        // ...and the next housekeeping tick restores it.
        engine.update(&mut surface, Message::Tick);
        assert!(surface.marker_applied("market_data_grid", "AAPL"));
    }

    #[tokio::test]
    async fn test_specs_for_route() {
        let (engine, _rx) = engine_with_data();
        let specs = engine.specs_for_route(&Route::from_path("/market-data/market-data"));
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].grid_id, "market_data_grid");
        assert!(engine
            .specs_for_route(&Route::from_path("/risk/risk-measures"))
            .is_empty());
    }
}
