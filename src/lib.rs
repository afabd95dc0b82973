//! ferrywatch -- periodic ferry route status checks.
//!
//! This crate loads monitored routes, retrieves each route's public status
//! page, classifies the status indicator into a severity tier and prepends
//! the run to a persisted JSON history.

pub mod checker;
pub mod classify;
pub mod config;
pub mod extract;
pub mod history;
pub mod registry;
pub mod render;
pub mod scheduler;

use std::sync::Arc;

use tracing::{error, info};

use crate::checker::{CheckSettings, RunError, RunOutcome, RunStart};
use crate::config::{Config, RenderConfig};
use crate::history::RunLog;
use crate::render::{HttpRenderer, RenderError, Renderer};

/// Run one status check with the HTTP renderer and record it.
pub async fn run_once(config: &Config) -> RunOutcome {
    run_once_with(config, |render| {
        HttpRenderer::new(render).map(|r| Arc::new(r) as Arc<dyn Renderer>)
    })
    .await
}

/// Run one status check with a caller-supplied rendering engine.
///
/// Registry and engine failures abort the run before the history is
/// touched. A failed history write is logged; the record is still returned.
pub async fn run_once_with<F>(config: &Config, start_engine: F) -> RunOutcome
where
    F: FnOnce(&RenderConfig) -> Result<Arc<dyn Renderer>, RenderError>,
{
    let start = RunStart::now();
    info!(timestamp = %start.timestamp, "Local start time");

    let routes = match registry::load(&config.paths.routes_file) {
        Ok(routes) => routes,
        Err(e) => {
            error!(error = %e, "Route registry could not be loaded");
            return RunError::ConfigLoad(e).into();
        }
    };

    info!("Starting rendering engine");
    let renderer = match start_engine(&config.render) {
        Ok(renderer) => renderer,
        Err(e) => {
            error!(error = %e, "Rendering engine failed to start");
            return RunError::EngineInit(e).into();
        }
    };

    let settings = Arc::new(CheckSettings::from_config(&config.check, &config.render));
    let record = checker::run_check(&routes, renderer, settings, start).await;
    info!(seconds = record.execution_time_seconds, "Execution time");

    let log = RunLog::new(&config.paths.history_file, config.history.max_runs);
    if let Err(e) = log.record(&record) {
        error!(path = %log.path().display(), error = ?e, "Failed to write output");
    }

    RunOutcome::Completed(record)
}
