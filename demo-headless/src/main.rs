use clap::Parser;
use fire_map_core::{
    DashboardState, HeadlessBackend, MapBackend, MapConfig, MapSession, Reconciler,
    REFRESH_INTERVAL_SECS,
};
use serde_json::json;

/// Fire telemetry map demo against the headless backend
#[derive(Parser, Debug)]
#[command(name = "fire-map-demo")]
#[command(about = "Run reconciliation passes over a synthetic sensor feed", long_about = None)]
struct Args {
    /// Number of synthetic devices
    #[arg(short, long, default_value_t = 6)]
    devices: u32,

    /// Latitude of the first device
    #[arg(long, default_value_t = 19.0760)]
    lat: f64,

    /// Longitude of the first device
    #[arg(long, default_value_t = 72.8777)]
    lng: f64,

    /// Spacing between devices in degrees
    #[arg(long, default_value_t = 0.02)]
    spacing: f64,

    /// Devices reporting an active fire (taken from the front of the list)
    #[arg(short, long, default_value_t = 2)]
    fires: u32,

    /// Device id to select after the first pass (e.g. demo-1)
    #[arg(short, long)]
    select: Option<String>,

    /// Number of refresh cycles to simulate
    #[arg(short, long, default_value_t = 3)]
    cycles: u32,
}

fn synthetic_feed(args: &Args) -> Vec<serde_json::Value> {
    (0..args.devices)
        .map(|i| {
            let on_fire = i < args.fires;
            let offset = f64::from(i) * args.spacing;
            // Every third device reports transposed axes, like the real feed
            let (lat, lng) = if i % 3 == 2 {
                (args.lng + offset, args.lat + offset)
            } else {
                (args.lat + offset, args.lng + offset)
            };
            json!({
                "_id": format!("demo-{i}"),
                "deviceId": format!("node-{i}"),
                "latitude": lat,
                "longitude": lng,
                "temp": if on_fire { 54.0 } else { 29.0 },
                "humidity": if on_fire { 14.0 } else { 46.0 },
                "smoke": if on_fire { 380.0 } else { 12.0 },
                "isfire": on_fire,
                "lastUpdate": "2026-08-29T09:15:00Z"
            })
        })
        .collect()
}

fn main() -> fire_map_core::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    println!("Fire Telemetry Map - headless demo");
    println!("==================================");
    println!(
        "{} devices, {} on fire, refresh interval {REFRESH_INTERVAL_SECS}s",
        args.devices, args.fires
    );

    let mut state = DashboardState::new();
    let mut session = MapSession::create(HeadlessBackend::new(), &MapConfig::default())?;
    let mut reconciler = Reconciler::new();

    for cycle in 0..args.cycles {
        state.ingest_raw_snapshot(&synthetic_feed(&args));
        if cycle == 1 {
            if let Some(id) = &args.select {
                state.select_device(id);
                println!("\nSelected device {id}");
            }
        }

        let summary = reconciler.reconcile(&mut session, &state.reconcile_input())?;
        println!(
            "cycle {cycle}: {} markers, {} polylines, {} labels ({} unresolvable skipped)",
            summary.markers, summary.polylines, summary.labels, summary.skipped_unresolvable
        );
        if let Some(center) = summary.focused {
            println!("         camera recentered on {center}");
        }
    }

    let backend = session.backend()?;
    println!("\nFinal surface: {} layers", backend.layer_count());
    if let Some((center, zoom)) = backend.view() {
        println!("View: {center} @ zoom {zoom}");
    }
    if let Some(team) = state.team_position() {
        println!("Response team at {team}");
    }

    session.teardown();
    println!("Session torn down cleanly");
    Ok(())
}
