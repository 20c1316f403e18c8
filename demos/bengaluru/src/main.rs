//! bengaluru: traffic-aware routing across central Bengaluru.
//!
//! Routes between named landmarks at morning rush hour and in the early
//! afternoon, against a synthetic flow snapshot with a jam between MG Road
//! and Indiranagar.
//!
//! ```text
//! bengaluru [--config service.json] [--csv demos/bengaluru/data]
//! ```
//!
//! `--config` reads a JSON `ServiceConfig` (missing fields take defaults).
//! `--csv` loads the region from `<root>/bengaluru/{nodes,edges}.csv`
//! instead of the built-in network.

mod network;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use chrono::{TimeZone, Utc};

use tr_core::Timestamp;
use tr_route::{CachedGeocoder, PlanOutcome, RouteError, RouteResponse, RouteService, ServiceConfig};
use tr_spatial::{CsvNetworkLoader, InMemoryLoader, NetworkLoader};
use tr_traffic::StaticProvider;

use network::{build_network, gazetteer, simulated_flow};

// ── Constants ─────────────────────────────────────────────────────────────────

const REGION:              &str = "bengaluru";
const IST_OFFSET_SECS:     i32  = 19_800; // UTC+05:30
const GEOCODE_TTL_SECS:    u64  = 86_400;

/// `(label, from, to)`.
const TRIPS: [(&str, &str, &str); 2] = [
    ("commute",  "Shivajinagar", "Koramangala"),
    ("crosstown", "MG Road",     "Domlur"),
];

// ── Arguments ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON `ServiceConfig`; missing fields take defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Root holding `bengaluru/{nodes,edges}.csv`.
    #[arg(long)]
    csv: Option<PathBuf>,
}

fn load_config(path: Option<&Path>) -> Result<ServiceConfig> {
    let Some(path) = path else {
        let mut config = ServiceConfig::default();
        config.fusion.utc_offset_secs = IST_OFFSET_SECS;
        return Ok(config);
    };
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

// ── Output ────────────────────────────────────────────────────────────────────

fn print_response(label: &str, response: &RouteResponse) {
    let report = &response.fusion;
    println!(
        "[{label}] hour {:02}  live: {:?}  matched {} edges from {} samples{}",
        report.hour,
        report.source,
        report.matched_edges,
        report.sample_count,
        if report.degraded { "  (static only)" } else { "" },
    );
    println!(
        "  snapped start {} ({:.0} m), end {} ({:.0} m)",
        response.start.node, response.start.distance_m, response.end.node, response.end.distance_m
    );

    let (PlanOutcome::Found(route), Some(view)) = (&response.outcome, &response.presentation) else {
        println!("  no path found");
        return;
    };
    println!("  cost {:.5}  via {} edges, {} polyline vertices", route.cost, route.edges.len(), view.polyline.len());
    for marker in &view.congestion_markers {
        println!(
            "  congestion on edge {} at ({:.4}, {:.4}): {:.1}× baseline",
            marker.edge, marker.position.lat, marker.position.lon, marker.ratio
        );
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    println!("=== bengaluru: traffic-aware routing ===");
    println!();

    // 1. Network source.
    let loader: Arc<dyn NetworkLoader> = match &args.csv {
        Some(root) => Arc::new(CsvNetworkLoader::new(root.clone())),
        None => Arc::new(InMemoryLoader::new().with_region(REGION, build_network()?)),
    };

    // 2. Traffic snapshot and service.
    let config = load_config(args.config.as_deref())?;
    let samples = simulated_flow();
    println!("Flow snapshot: {} samples", samples.len());
    let service = RouteService::new(loader, Arc::new(StaticProvider::new(samples)), config)?
        .with_geocoder(Arc::new(CachedGeocoder::new(gazetteer(), GEOCODE_TTL_SECS)));

    // 3. Same trips at 09:00 and 14:00 IST.
    let times: [(&str, Timestamp); 2] = [
        ("rush hour", Utc.with_ymd_and_hms(2024, 3, 5, 3, 30, 0).single().context("bad time")?),
        ("afternoon", Utc.with_ymd_and_hms(2024, 3, 5, 8, 30, 0).single().context("bad time")?),
    ];
    for (when, now) in times {
        println!("--- {when} ({now}) ---");
        for (label, from, to) in TRIPS {
            let response = service.route_between_places(REGION, from, to, now)?;
            print_response(label, &response);
        }
        println!();
    }

    // 4. Presentation payload of the last commute, as a client would get it.
    let response = service.route_between_places(REGION, TRIPS[0].1, TRIPS[0].2, times[1].1)?;
    if let Some(view) = &response.presentation {
        println!("Presentation JSON ({} → {}):", TRIPS[0].1, TRIPS[0].2);
        println!("{}", serde_json::to_string_pretty(view)?);
        println!();
    }

    // 5. Unknown place names are reported, not fatal to the service.
    match service.route_between_places(REGION, "Whitefield Lake", "MG Road", times[1].1) {
        Err(RouteError::Geocode(e)) => println!("Geocoding failed as expected: {e}"),
        Err(e) => return Err(e.into()),
        Ok(_) => println!("unexpectedly routed from an unknown place"),
    }

    println!("Cached regions: {:?}", service.cached_regions()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_are_optional_paths() {
        let args = Args::try_parse_from(["bengaluru"]).unwrap();
        assert!(args.config.is_none() && args.csv.is_none());

        let args = Args::try_parse_from(["bengaluru", "--csv", "demos/bengaluru/data", "--config", "svc.json"]).unwrap();
        assert_eq!(args.csv, Some(PathBuf::from("demos/bengaluru/data")));
        assert_eq!(args.config, Some(PathBuf::from("svc.json")));
    }

    #[test]
    fn unknown_flags_are_rejected() {
        assert!(Args::try_parse_from(["bengaluru", "--region", "x"]).is_err());
        assert!(Args::try_parse_from(["bengaluru", "--csv"]).is_err());
    }

    #[test]
    fn default_config_runs_on_ist() {
        let config = load_config(None).unwrap();
        assert_eq!(config.fusion.utc_offset_secs, IST_OFFSET_SECS);
    }
}
