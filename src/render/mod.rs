//! Page rendering capability: given a URL, return the page content or a
//! load failure.

use std::time::Duration;

use thiserror::Error;

pub mod http;

pub use self::http::HttpRenderer;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("Page load timeout exceeded")]
    Timeout,

    #[error("General error during navigation: {0}")]
    Navigation(String),

    #[error("failed to start rendering engine: {0}")]
    EngineInit(String),
}

/// Content of a loaded status page.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub url: String,
    pub html: String,
}

impl RenderedPage {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
        }
    }
}

/// Trait for page-rendering backends.
#[async_trait::async_trait]
pub trait Renderer: Send + Sync {
    /// Load `url`. `timeout` bounds the page-load phase; any settle delay
    /// the backend applies after loading is not counted against it.
    async fn render(&self, url: &str, timeout: Duration) -> Result<RenderedPage, RenderError>;
}
