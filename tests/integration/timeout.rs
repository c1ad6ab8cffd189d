//! Deadline enforcement against a server that accepts connections and never answers.

use senpai_vision::vision::{DetectArgs, VisionService};
use senpai_vision::{Error, VisionClient};
use std::time::{Duration, Instant};
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// Accept every connection, read without ever replying, and report each
/// connection the client closes.
async fn silent_server() -> (String, mpsc::UnboundedReceiver<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (closed_tx, closed_rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let closed_tx = closed_tx.clone();
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                loop {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(_) => {}
                    }
                }
                let _ = closed_tx.send(());
            });
        }
    });
    (format!("http://{}/v1", addr), closed_rx)
}

#[tokio::test]
async fn test_request_aborted_at_deadline() {
    let (base_url, mut closed) = silent_server().await;
    let client = VisionClient::builder()
        .api_key("test-key")
        .base_url(base_url)
        .timeout(Duration::from_millis(200))
        .build()
        .unwrap();

    let started = Instant::now();
    let err = client
        .detect(&DetectArgs {
            image_url: "https://images.example.com/kitchen.jpg".into(),
            object: "mug".into(),
        })
        .await
        .unwrap_err();

    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(matches!(err, Error::Timeout { timeout_ms: 200, .. }));
    assert_eq!(
        err.to_string(),
        "Moondream Detect failed: request timed out after 200ms"
    );

    // The abandoned request must not keep its connection open.
    let saw_close = tokio::time::timeout(Duration::from_secs(2), closed.recv())
        .await
        .ok()
        .flatten()
        .is_some();
    assert!(saw_close, "connection still open after the deadline");
}
