//! HttpRenderer against a loopback server.

use std::time::Duration;

use ferrywatch::config::RenderConfig;
use ferrywatch::render::{HttpRenderer, RenderError, Renderer};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

fn renderer() -> HttpRenderer {
    HttpRenderer::new(&RenderConfig {
        settle_delay_ms: 0,
        ..RenderConfig::default()
    })
    .unwrap()
}

/// Serve one connection with `response`, after an optional delay.
async fn serve_once(response: &'static str, delay: Duration) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        if let Ok((mut sock, _)) = listener.accept().await {
            let mut buf = [0u8; 4096];
            let _ = sock.read(&mut buf).await;
            tokio::time::sleep(delay).await;
            let _ = sock.write_all(response.as_bytes()).await;
            let _ = sock.shutdown().await;
        }
    });
    format!("http://{}/status", addr)
}

#[tokio::test]
async fn test_loads_page_body() {
    let url = serve_once(
        "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 48\r\nConnection: close\r\n\r\n<span class=\"sailingStatus\">Cancelled</span>    ",
        Duration::ZERO,
    )
    .await;

    let page = renderer().render(&url, Duration::from_secs(5)).await.unwrap();
    assert_eq!(page.url, url);
    assert!(page.html.contains("sailingStatus"));
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let url = serve_once(
        "HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        Duration::from_secs(5),
    )
    .await;

    let err = renderer()
        .render(&url, Duration::from_millis(200))
        .await
        .unwrap_err();
    assert_eq!(err, RenderError::Timeout);
    assert_eq!(err.to_string(), "Page load timeout exceeded");
}

#[tokio::test]
async fn test_refused_connection_is_navigation_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = renderer()
        .render(&format!("http://{}/", addr), Duration::from_secs(5))
        .await
        .unwrap_err();
    match err {
        RenderError::Navigation(msg) => assert!(!msg.is_empty()),
        other => panic!("expected navigation error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_http_error_status_is_navigation_error() {
    let url = serve_once(
        "HTTP/1.1 503 Service Unavailable\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        Duration::ZERO,
    )
    .await;

    let err = renderer().render(&url, Duration::from_secs(5)).await.unwrap_err();
    assert!(err.to_string().starts_with("General error during navigation:"));
    assert!(err.to_string().contains("503"));
}

#[tokio::test]
async fn test_invalid_url_is_navigation_error() {
    let err = renderer()
        .render("not a url", Duration::from_secs(1))
        .await
        .unwrap_err();
    assert!(matches!(err, RenderError::Navigation(_)));
}
