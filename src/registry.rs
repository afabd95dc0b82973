//! Route registry: loads monitored routes from a YAML document.
//!
//! ```yaml
//! Routes:
//!   - ID: 1
//!     Name: Ardrossan - Brodick
//!     Status_URL: https://example.org/status/1
//! ```
//!
//! Entries without a non-empty scalar `Name` and `Status_URL` are skipped
//! with a warning. Numeric or boolean names and URLs are kept as text. Only an unreadable or undecodable document fails the load.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to read route file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode route document: {0}")]
    Decode(#[from] serde_yaml::Error),
}

/// Opaque route identity: whatever scalar the registry carries, echoed back
/// unchanged in results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RouteId {
    Number(i64),
    Unsigned(u64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl std::fmt::Display for RouteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteId::Number(n) => n.fmt(f),
            RouteId::Unsigned(n) => n.fmt(f),
            RouteId::Float(n) => n.fmt(f),
            RouteId::Bool(b) => b.fmt(f),
            RouteId::Text(s) => s.fmt(f),
        }
    }
}

/// A monitored route.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub id: Option<RouteId>,
    pub name: String,
    pub status_url: String,
}

impl Route {
    /// The ID as shown in status lines; empty when absent.
    pub fn display_id(&self) -> String {
        self.id.as_ref().map(ToString::to_string).unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct Document {
    #[serde(rename = "Routes", default)]
    routes: Vec<Value>,
}

/// Read and decode the route file at `path`.
pub fn load(path: &Path) -> Result<Vec<Route>, RegistryError> {
    info!(path = %path.display(), "Loading routes");
    let content = std::fs::read_to_string(path).map_err(|source| RegistryError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse(&content)
}

/// Decode a route document, keeping document order and duplicate IDs.
pub fn parse(content: &str) -> Result<Vec<Route>, RegistryError> {
    let doc: Document = serde_yaml::from_str(content)?;

    let mut routes = Vec::with_capacity(doc.routes.len());
    for entry in doc.routes {
        match route_from_entry(&entry) {
            Some(route) => routes.push(route),
            None => warn!(entry = ?entry, "Skipping invalid route entry"),
        }
    }

    info!(count = routes.len(), "Loaded routes");
    Ok(routes)
}

fn route_from_entry(entry: &Value) -> Option<Route> {
    let name = scalar_text(entry.get("Name")?)?;
    let status_url = scalar_text(entry.get("Status_URL")?)?;
    let id = match entry.get("ID") {
        Some(value) => route_id(value),
        None => None,
    };
    Some(Route {
        id,
        name,
        status_url,
    })
}

/// Strings as written, numbers and booleans in their YAML spelling. Null,
/// blank and non-scalar values yield nothing.
fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Tagged(tagged) => return scalar_text(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => return None,
    };
    (!text.trim().is_empty()).then_some(text)
}

fn route_id(value: &Value) -> Option<RouteId> {
    match value {
        Value::Null => None,
        Value::Number(n) => n
            .as_i64()
            .map(RouteId::Number)
            .or_else(|| n.as_u64().map(RouteId::Unsigned))
            .or_else(|| n.as_f64().map(RouteId::Float)),
        Value::Bool(b) => Some(RouteId::Bool(*b)),
        Value::String(s) => Some(RouteId::Text(s.clone())),
        Value::Tagged(tagged) => route_id(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => {
            warn!(id = ?value, "Ignoring non-scalar route ID");
            None
        }
    }
}
