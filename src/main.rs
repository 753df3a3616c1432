//! OR Route Builder.
//!
//! Baut aus einem TOML-Routenplan einen Gleisgraphen und schreibt ihn als
//! Open-Rails-Route samt Pfad-Dateien.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use or_route_builder::{RoutePlan, RouteWriter, WriterOptions};

const USAGE: &str = "Aufruf: OR-Route-Builder <plan.toml> <routen-verzeichnis> [optionen.toml]";

fn main() -> Result<()> {
    // Logger initialisieren
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    log::info!("OR Route Builder v{} startet...", env!("CARGO_PKG_VERSION"));

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (plan_path, route_dir, options_path) = match args.as_slice() {
        [plan, route] => (PathBuf::from(plan), PathBuf::from(route), None),
        [plan, route, options] => (
            PathBuf::from(plan),
            PathBuf::from(route),
            Some(PathBuf::from(options)),
        ),
        _ => bail!(USAGE),
    };

    let options = WriterOptions::load_from_file(
        &options_path.unwrap_or_else(WriterOptions::config_path),
    );
    let plan = RoutePlan::load_from_file(&plan_path)?;
    let route = plan
        .build()
        .with_context(|| format!("Plan nicht baubar: {}", plan_path.display()))?;

    let writer = RouteWriter::new(&route_dir, &route.graph, options)?;
    writer.write_all()?;
    for request in &route.paths {
        if request.path.is_empty() {
            log::warn!("Pfad '{}' ist leer und wird übersprungen", request.name);
            continue;
        }
        writer.write_path_file(
            &request.file,
            &request.name,
            &request.start_name,
            &request.end_name,
            &request.path,
        )?;
    }

    log::info!("Fertig: {}", route_dir.display());
    Ok(())
}
