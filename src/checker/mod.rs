//! Route status checker: render, extract and classify every route, then
//! gather the per-route results into one run record.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::classify::{Classifier, Vocabulary};
use crate::config::{CheckConfig, RenderConfig};
use crate::extract::StatusSelector;
use crate::registry::{RegistryError, Route};
use crate::render::{RenderError, Renderer};

pub mod record;

pub use self::record::{RouteResult, RunFailure, RunOutcome, RunRecord, RunStart};

/// Failures that abort a whole run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to load routes: {0}")]
    ConfigLoad(#[from] RegistryError),

    #[error("{0}")]
    EngineInit(RenderError),
}

impl From<RunError> for RunOutcome {
    fn from(e: RunError) -> Self {
        RunOutcome::Failed(RunFailure::new(e.to_string()))
    }
}

/// Everything a route check needs besides the route and the renderer.
#[derive(Debug, Clone)]
pub struct CheckSettings {
    pub page_load_timeout: Duration,
    /// Routes in flight at once; at least 1.
    pub concurrency: usize,
    pub run_deadline: Option<Duration>,
    pub selector: StatusSelector,
    pub classifier: Classifier,
}

impl Default for CheckSettings {
    fn default() -> Self {
        Self::from_config(&CheckConfig::default(), &RenderConfig::default())
    }
}

impl CheckSettings {
    pub fn from_config(check: &CheckConfig, render: &RenderConfig) -> Self {
        Self {
            page_load_timeout: Duration::from_secs(render.page_load_timeout_secs),
            concurrency: check.concurrency.max(1),
            run_deadline: (check.run_deadline_secs > 0)
                .then(|| Duration::from_secs(check.run_deadline_secs)),
            selector: StatusSelector::new(&check.selector_tag, &check.selector_class),
            classifier: Classifier::new(Vocabulary::from_config(&check.vocabulary)),
        }
    }
}

/// Message for failures outside the render/extract/classify model.
pub fn unexpected_error(cause: impl std::fmt::Display) -> String {
    format!("Unexpected error while checking route: {}", cause)
}

/// Check one route. Never fails: every outcome is folded into the result.
pub async fn check_route(
    route: &Route,
    renderer: &dyn Renderer,
    selector: &StatusSelector,
    classifier: &Classifier,
    timeout: Duration,
) -> RouteResult {
    info!(route = %route.name, "Checking route");
    debug!(url = %route.status_url, "Navigating to URL");

    let page = match renderer.render(&route.status_url, timeout).await {
        Ok(page) => page,
        Err(e) => {
            warn!(route = %route.name, error = %e, "Page load failed");
            return RouteResult::failed(route, e.to_string());
        }
    };

    let text = match selector.extract(&page) {
        Ok(text) => text,
        Err(e) => {
            warn!(route = %route.name, error = %e, "Status extraction failed");
            return RouteResult::failed(route, e.to_string());
        }
    };
    debug!(route = %route.name, %text, "Found status text");

    let (tier, recognized) = classifier.classify(&text);
    let error = if recognized {
        None
    } else {
        warn!(route = %route.name, %text, "Unrecognized status text");
        Some(format!("Unexpected status text: '{}'", text))
    };

    RouteResult::loaded(route, tier, text, error)
}

/// Check every route and assemble the run record. Results keep registry
/// order regardless of completion order.
pub async fn run_check(
    routes: &[Route],
    renderer: Arc<dyn Renderer>,
    settings: Arc<CheckSettings>,
    start: RunStart,
) -> RunRecord {
    info!(routes = routes.len(), concurrency = settings.concurrency, "Starting ferry status check");

    let deadline = settings
        .run_deadline
        .map(|d| tokio::time::Instant::from_std(start.instant) + d);

    let results: Vec<RouteResult> = stream::iter(routes.iter().cloned())
        .map(|route| isolated_check(route, renderer.clone(), settings.clone(), deadline))
        .buffered(settings.concurrency.max(1))
        .collect()
        .await;

    start.finish(results)
}

/// Run a check on its own task so a panic stays inside the route.
async fn isolated_check(
    route: Route,
    renderer: Arc<dyn Renderer>,
    settings: Arc<CheckSettings>,
    deadline: Option<tokio::time::Instant>,
) -> RouteResult {
    let task_route = route.clone();
    let handle = tokio::spawn(async move {
        let check = check_route(
            &task_route,
            renderer.as_ref(),
            &settings.selector,
            &settings.classifier,
            settings.page_load_timeout,
        );
        match deadline {
            Some(at) => tokio::time::timeout_at(at, check).await.ok(),
            None => Some(check.await),
        }
    });

    match handle.await {
        Ok(Some(result)) => result,
        Ok(None) => {
            warn!(route = %route.name, "Run deadline exceeded before route finished");
            RouteResult::failed(&route, unexpected_error("run deadline exceeded"))
        }
        Err(e) => {
            error!(route = %route.name, error = %e, "Route check aborted");
            RouteResult::failed(&route, unexpected_error(e))
        }
    }
}
