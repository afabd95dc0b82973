use super::{RenderError, RenderedPage, Renderer};
use crate::config::RenderConfig;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::debug;

/// Plain HTTP backend: fetches the page and hands back the raw HTML.
pub struct HttpRenderer {
    client: Client,
    settle_delay: Duration,
}

impl HttpRenderer {
    pub fn new(config: &RenderConfig) -> Result<Self, RenderError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| RenderError::EngineInit(describe(&e)))?;

        Ok(Self {
            client,
            settle_delay: Duration::from_millis(config.settle_delay_ms),
        })
    }
}

#[async_trait::async_trait]
impl Renderer for HttpRenderer {
    async fn render(&self, url: &str, timeout: Duration) -> Result<RenderedPage, RenderError> {
        let start = Instant::now();

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(classify_error)?;

        // Per-request timeout also covers the body.
        let html = response.text().await.map_err(classify_error)?;
        debug!(%url, bytes = html.len(), elapsed_ms = start.elapsed().as_millis() as u64, "Page loaded");

        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }

        Ok(RenderedPage::new(url, html))
    }
}

fn classify_error(e: reqwest::Error) -> RenderError {
    if e.is_timeout() {
        RenderError::Timeout
    } else {
        RenderError::Navigation(describe(&e))
    }
}

/// reqwest's top-level message omits the cause (DNS, refused, ...), so walk
/// the source chain.
fn describe(e: &(dyn std::error::Error + 'static)) -> String {
    let mut msg = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        msg.push_str(": ");
        msg.push_str(&cause.to_string());
        source = cause.source();
    }
    msg
}
