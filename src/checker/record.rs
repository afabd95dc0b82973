//! Per-route and per-run result records, in their persisted JSON shape.

use std::time::{Duration, Instant};

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};

use crate::classify::{Tier, UNKNOWN_TEXT};
use crate::registry::{Route, RouteId};

/// Timestamp layout used in the run history.
pub const TIMESTAMP_FORMAT: &str = "%H:%M:%S %d-%m-%Y";

pub fn format_timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// One route's outcome for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    #[serde(rename = "ID", default)]
    pub id: Option<RouteId>,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Status_Color")]
    pub status_color: Tier,
    #[serde(rename = "Exact_Text_Found")]
    pub exact_text_found: String,
    #[serde(rename = "Error")]
    pub error: Option<String>,
    #[serde(rename = "Page_Load_Success")]
    pub page_load_success: bool,
}

impl RouteResult {
    /// The page loaded and the indicator was found. `error` is set when the
    /// text was not recognized.
    pub fn loaded(route: &Route, tier: Tier, text: String, error: Option<String>) -> Self {
        Self {
            id: route.id.clone(),
            name: route.name.clone(),
            status_color: tier,
            exact_text_found: text,
            error,
            page_load_success: true,
        }
    }

    /// No status text could be obtained.
    pub fn failed(route: &Route, error: impl Into<String>) -> Self {
        Self {
            id: route.id.clone(),
            name: route.name.clone(),
            status_color: Tier::Unknown,
            exact_text_found: UNKNOWN_TEXT.to_string(),
            error: Some(error.into()),
            page_load_success: false,
        }
    }

    pub fn display_id(&self) -> String {
        self.id.as_ref().map(ToString::to_string).unwrap_or_default()
    }
}

/// Wall-clock start of a run.
#[derive(Debug, Clone)]
pub struct RunStart {
    pub timestamp: String,
    pub instant: Instant,
}

impl RunStart {
    pub fn now() -> Self {
        Self {
            timestamp: format_timestamp(&Local::now()),
            instant: Instant::now(),
        }
    }

    pub fn finish(self, routes: Vec<RouteResult>) -> RunRecord {
        RunRecord::new(self.timestamp, routes, self.instant.elapsed())
    }
}

/// One invocation's outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub timestamp: String,
    pub routes: Vec<RouteResult>,
    pub execution_time_seconds: f64,
}

impl RunRecord {
    pub fn new(timestamp: String, routes: Vec<RouteResult>, elapsed: Duration) -> Self {
        Self {
            timestamp,
            routes,
            execution_time_seconds: round2(elapsed.as_secs_f64()),
        }
    }

    /// `[RESULT]` status lines, names dash-padded to a common width.
    pub fn summary_lines(&self) -> Vec<String> {
        let width = self
            .routes
            .iter()
            .map(|r| r.name.chars().count())
            .max()
            .unwrap_or(0)
            + 2;

        self.routes
            .iter()
            .map(|r| {
                format!(
                    "[RESULT] {:>3}: {:-<width$} {}",
                    r.display_id(),
                    format!("{} ", r.name),
                    r.exact_text_found,
                    width = width
                )
            })
            .collect()
    }
}

fn round2(secs: f64) -> f64 {
    (secs * 100.0).round() / 100.0
}

/// Whole-run failure, serialized as `{"status": "error", "message": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunFailure {
    pub status: String,
    pub message: String,
}

impl RunFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
        }
    }
}

/// What a run hands back to its caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RunOutcome {
    Completed(RunRecord),
    Failed(RunFailure),
}

impl RunOutcome {
    pub fn record(&self) -> Option<&RunRecord> {
        match self {
            RunOutcome::Completed(record) => Some(record),
            RunOutcome::Failed(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, RunOutcome::Failed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(id: i64, name: &str) -> Route {
        Route {
            id: Some(RouteId::Number(id)),
            name: name.to_string(),
            status_url: format!("https://example.org/{}", id),
        }
    }

    #[test]
    fn test_route_result_json_shape() {
        let r = RouteResult::loaded(&route(3, "Oban - Craignure"), Tier::Green, "Normal service".into(), None);
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(
            v,
            serde_json::json!({
                "ID": 3,
                "Name": "Oban - Craignure",
                "Status_Color": "Green",
                "Exact_Text_Found": "Normal service",
                "Error": null,
                "Page_Load_Success": true
            })
        );
    }

    #[test]
    fn test_failed_result_uses_sentinel() {
        let r = RouteResult::failed(&route(1, "A"), "Page load timeout exceeded");
        assert_eq!(r.status_color, Tier::Unknown);
        assert_eq!(r.exact_text_found, "Unknown");
        assert!(!r.page_load_success);
        assert_eq!(r.error.as_deref(), Some("Page load timeout exceeded"));
    }

    #[test]
    fn test_execution_time_is_rounded() {
        let rec = RunRecord::new("t".into(), vec![], Duration::from_millis(12_346));
        assert_eq!(rec.execution_time_seconds, 12.35);
        let rec = RunRecord::new("t".into(), vec![], Duration::from_millis(999));
        assert_eq!(rec.execution_time_seconds, 1.0);
    }

    #[test]
    fn test_timestamp_format() {
        let at = chrono::Utc.with_ymd_and_hms(2025, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(format_timestamp(&at), "07:05:01 09-03-2025");
    }

    #[test]
    fn test_summary_lines_pad_names() {
        let rec = RunRecord::new(
            "t".into(),
            vec![
                RouteResult::loaded(&route(1, "Short"), Tier::Green, "Normal service".into(), None),
                RouteResult::failed(&route(12, "Much longer"), "x"),
            ],
            Duration::ZERO,
        );
        assert_eq!(
            rec.summary_lines(),
            vec![
                "[RESULT]   1: Short ------- Normal service".to_string(),
                "[RESULT]  12: Much longer - Unknown".to_string(),
            ]
        );
    }

    #[test]
    fn test_failure_outcome_shape() {
        let out = RunOutcome::Failed(RunFailure::new("boom"));
        assert!(out.is_failed());
        assert!(out.record().is_none());
        assert_eq!(
            serde_json::to_value(&out).unwrap(),
            serde_json::json!({"status": "error", "message": "boom"})
        );
    }
}
