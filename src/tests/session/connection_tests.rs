use std::time::Instant;

use super::*;

#[tokio::test]
async fn sleep_runs_to_completion() {
    let token = CancellationToken::new();
    let started = Instant::now();
    assert!(sleep_or_cancel(&token, Duration::from_millis(10)).await);
    assert!(started.elapsed() >= Duration::from_millis(10));
}

#[tokio::test]
async fn cancelled_sleep_returns_early() {
    let token = CancellationToken::new();
    let cancel = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        cancel.cancel();
    });
    let woke = tokio::time::timeout(
        Duration::from_secs(5),
        sleep_or_cancel(&token, Duration::from_secs(3600)),
    )
    .await
    .unwrap();
    assert!(!woke);
}

#[tokio::test]
async fn parent_shutdown_cancels_child_sleep() {
    let parent = CancellationToken::new();
    let child = parent.child_token();
    parent.cancel();
    assert!(!sleep_or_cancel(&child, Duration::from_secs(3600)).await);
}
