//! GridPulse - live tabular state and notification engine demo.
//!
//! This is the binary entry point. All engine logic lives in the workspace
//! crates; this shell wires the engine to the demo feed and a headless
//! rendering surface, runs a short live session, and prints a summary.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use gridpulse_core::prelude::*;
use gridpulse_core::{DatasetId, DatasetSpec, NotificationDraft, NotificationKind, Route};
use gridpulse_engine::{load_default_settings, Effect, Engine, HeadlessSurface, Message, Settings};
use gridpulse_feed::{DemoFeed, TickProfile};

/// GridPulse - live tabular state and notification engine demo
#[derive(Parser, Debug)]
#[command(name = "gridpulse")]
#[command(about = "Live tabular state and notification engine demo", long_about = None)]
struct Args {
    /// How long the demo session runs, in seconds
    #[arg(long, default_value_t = 6)]
    duration_secs: u64,

    /// Seed for the demo feed (random when omitted)
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    if let Err(e) = gridpulse_core::logging::init() {
        eprintln!("warning: logging init failed: {e}");
    }

    let settings = match load_default_settings() {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "config load failed, using defaults");
            Settings::default()
        }
    };

    run_demo(args, settings).await;
    Ok(())
}

/// Datasets the demo registers, mirroring the dashboard's grids.
fn dataset_specs() -> Vec<(DatasetSpec, TickProfile)> {
    vec![
        (
            DatasetSpec::new(
                "market_data",
                "market_data_grid",
                "Market Data",
                "Market Data",
                "ticker",
            ),
            TickProfile::default()
                .with_numeric_fields(["last_price", "volume"])
                .with_pct_fields(["chg_pct"]),
        ),
        (
            DatasetSpec::new("fx_data", "fx_data_grid", "Market Data", "FX Data", "ticker"),
            TickProfile::default()
                .with_numeric_fields(["rate"])
                .with_pct_fields(["chg_pct"]),
        ),
        (
            DatasetSpec::new(
                "positions",
                "positions_grid",
                "Positions",
                "Positions",
                "ticker",
            ),
            TickProfile::default().with_value_fields(["notional"]),
        ),
        (
            DatasetSpec::new(
                "pnl_change",
                "pnl_change_grid",
                "PnL",
                "PnL Change",
                "ticker",
            ),
            TickProfile::default()
                .with_value_fields(["pnl_1d", "pnl_ytd"])
                .with_pct_fields(["chg_pct"]),
        ),
        (
            DatasetSpec::new(
                "risk_measures",
                "risk_measures_grid",
                "Risk",
                "Risk Measures",
                "ticker",
            ),
            TickProfile::default().with_numeric_fields(["delta", "gamma", "vega"]),
        ),
    ]
}

fn demo_notifications() -> Vec<NotificationDraft> {
    vec![
        NotificationDraft {
            header: "Price Alert".into(),
            message: "AAPL crossed above $190.00".into(),
            kind: NotificationKind::Alert,
            module: "Market Data".into(),
            subtab: "Market Data".into(),
            grid_id: "market_data_grid".into(),
            row_key: "AAPL".into(),
            ..NotificationDraft::default()
        },
        NotificationDraft {
            header: "Risk Warning".into(),
            message: "Delta limit approached for TSLA".into(),
            kind: NotificationKind::Warning,
            module: "Risk".into(),
            subtab: "Risk Measures".into(),
            grid_id: "risk_measures_grid".into(),
            row_key: "TSLA".into(),
            ..NotificationDraft::default()
        },
    ]
}

/// Perform a route change the way a page shell would: remount the route's
/// grids and report back. Grids that already hold data signal ready at
/// once; freshly mounted empty grids signal ready when their initial load
/// lands (returned for the caller to track).
fn apply_route(
    engine: &mut Engine<DemoFeed>,
    surface: &mut HeadlessSurface,
    route: Route,
) -> Vec<String> {
    let specs: Vec<DatasetSpec> = engine
        .specs_for_route(&route)
        .into_iter()
        .cloned()
        .collect();

    surface.unmount_all();
    for spec in &specs {
        let rows = engine
            .view_mut(&spec.id)
            .map(|v| v.sorted().to_vec())
            .unwrap_or_default();
        surface.mount_grid(&spec.grid_id, &spec.row_key_field, &rows);
    }

    engine.update(surface, Message::RouteChanged { route });
    let mut awaiting = Vec::new();
    for spec in &specs {
        let loaded = engine.view(&spec.id).is_some_and(|v| !v.rows().is_empty());
        if loaded {
            engine.update(
                surface,
                Message::GridReady {
                    grid_id: spec.grid_id.clone(),
                },
            );
        } else {
            awaiting.push(spec.grid_id.clone());
        }
        // A freshly mounted grid kicks off a (debounced) reload either way.
        engine.force_refresh(&spec.id);
    }
    awaiting
}

async fn run_demo(args: Args, settings: Settings) {
    let (tx, mut rx) = tokio::sync::mpsc::channel::<Message>(256);

    let feed = match args.seed {
        Some(seed) => DemoFeed::seeded(seed),
        None => DemoFeed::new(),
    }
    .with_latency(Duration::from_millis(50));

    let reapply_ms = settings.highlight.reapply_ms.max(50);
    let mut engine = Engine::new(Arc::new(feed), settings, tx.clone());
    let mut surface = HeadlessSurface::new();

    for (spec, tick) in dataset_specs() {
        engine.register_dataset(spec, tick);
    }

    // Housekeeping ticks drive persistent-highlight re-application.
    let tick_tx = tx.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_millis(reapply_ms));
        loop {
            ticker.tick().await;
            if tick_tx.send(Message::Tick).await.is_err() {
                break;
            }
        }
    });

    // Land on the market-data page and start live updates there.
    let mut awaiting_ready = apply_route(
        &mut engine,
        &mut surface,
        Route::for_target("Market Data", "Market Data"),
    );
    engine.start_auto_refresh(&DatasetId::new("market_data"));

    engine.update(
        &mut surface,
        Message::IngestNotifications {
            drafts: demo_notifications(),
        },
    );

    // Mid-session, the user clicks the risk notification (a cross-page jump).
    let nav_tx = tx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(2)).await;
        let _ = nav_tx.send(Message::NavigateToNotification { id: 2 }).await;
    });

    println!("Running demo session for {}s...", args.duration_secs);
    let deadline = tokio::time::Instant::now() + Duration::from_secs(args.duration_secs);
    loop {
        tokio::select! {
            _ = tokio::time::sleep_until(deadline) => break,
            msg = rx.recv() => {
                let Some(msg) = msg else { break };
                let completed_grid = match &msg {
                    Message::RefreshCompleted { dataset, .. } => engine
                        .spec(dataset)
                        .map(|s| s.grid_id.clone())
                        .filter(|g| awaiting_ready.contains(g)),
                    _ => None,
                };
                let effects = engine.update(&mut surface, msg);
                if let Some(grid_id) = completed_grid {
                    awaiting_ready.retain(|g| g != &grid_id);
                    engine.update(&mut surface, Message::GridReady { grid_id });
                }
                for effect in effects {
                    match effect {
                        Effect::Redirect(route) => {
                            info!(route = %route, "shell performing route change");
                            let mut newly = apply_route(&mut engine, &mut surface, route);
                            awaiting_ready.append(&mut newly);
                        }
                    }
                }
            }
        }
    }

    engine.update(&mut surface, Message::Shutdown);
    print_summary(&engine);
}

fn print_summary(engine: &Engine<DemoFeed>) {
    println!();
    println!("── session summary ──────────────────────────────");
    for id in engine.dataset_ids() {
        let updated = engine
            .last_updated(&id)
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "—".to_string());
        let rows = engine.view(&id).map_or(0, |v| v.rows().len());
        println!(
            "{:>16}: {:>3} rows, last updated {}",
            id.as_str(),
            rows,
            updated
        );
    }
    println!(
        "{:>16}: {} total, {} unread",
        "notifications",
        engine.notifications.len(),
        engine.notifications.unread_count()
    );
    match engine.highlighter.active() {
        Some(active) => println!(
            "{:>16}: {} in {}",
            "highlight", active.row_id, active.grid_id
        ),
        None => println!("{:>16}: none", "highlight"),
    }
    println!("{:>16}: {}", "route", engine.router.current_route());
}
