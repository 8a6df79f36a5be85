//! Background poll and stream tasks, one per connected page.
//!
//! Tasks hold only a weak handle to the session. They never touch rendered
//! state; every fetched page goes through the session like any other update.

use std::time::Duration;

use super::*;

/// Sleeps for `dur`. Returns `false` early if `token` is cancelled first.
pub async fn sleep_or_cancel(token: &CancellationToken, dur: Duration) -> bool {
    tokio::select! {
        _ = token.cancelled() => false,
        _ = tokio::time::sleep(dur) => true,
    }
}

pub(super) fn spawn<P: Presenter>(
    session: Weak<SessionInner<P>>,
    key: PageKey,
    mode: ConnectionMode,
    token: CancellationToken,
) {
    match mode {
        ConnectionMode::Disconnected => {}
        ConnectionMode::Poll(secs) => {
            let interval = Duration::from_secs(u64::from(secs));
            tokio::spawn(poll_page(session, key, interval, token));
        }
        ConnectionMode::Stream => {
            tokio::spawn(stream_page(session, key, token));
        }
    }
}

async fn poll_page<P: Presenter>(
    session: Weak<SessionInner<P>>,
    key: PageKey,
    interval: Duration,
    token: CancellationToken,
) {
    let mut attempt: u32 = 0;
    let mut delay = interval;
    loop {
        if !sleep_or_cancel(&token, delay).await {
            tracing::debug!(%key, "poll cancelled");
            return;
        }
        let Some(inner) = session.upgrade() else {
            return;
        };
        if inner.is_fresh(&key).await {
            delay = interval;
            continue;
        }
        let result = inner.caller.fetch(key.as_str(), &[]).await;
        if token.is_cancelled() {
            return;
        }
        let applied = match result {
            Ok(update) => {
                attempt = 0;
                delay = interval;
                inner.apply_update(&key, update).await
            }
            Err(err) => {
                delay = inner.retry.delay(attempt);
                attempt = attempt.saturating_add(1);
                tracing::warn!(%key, %err, attempt, retry_in_ms = delay.as_millis() as u64, "poll failed");
                inner.record_error(&key, err).await
            }
        };
        if let Err(err) = applied {
            tracing::warn!(%key, %err, "poll update not applied");
        }
    }
}

async fn stream_page<P: Presenter>(
    session: Weak<SessionInner<P>>,
    key: PageKey,
    token: CancellationToken,
) {
    let mut attempt: u32 = 0;
    loop {
        let Some(inner) = session.upgrade() else {
            return;
        };
        let retry = inner.retry.clone();
        let opened = tokio::select! {
            _ = token.cancelled() => return,
            opened = inner.caller.stream(key.as_str()) => opened,
        };
        drop(inner);

        match opened {
            Ok(mut stream) => loop {
                let next = tokio::select! {
                    _ = token.cancelled() => return,
                    next = stream.next() => next,
                };
                let Some(inner) = session.upgrade() else {
                    return;
                };
                let applied = match next {
                    Ok(Some(spec)) => {
                        attempt = 0;
                        let update = PageUpdate {
                            spec,
                            meta: CacheMeta::new(time::OffsetDateTime::now_utc()),
                        };
                        inner.apply_update(&key, Some(update)).await
                    }
                    Ok(None) => {
                        tracing::info!(%key, "stream closed by server");
                        break;
                    }
                    Err(err) => {
                        tracing::warn!(%key, %err, "stream failed");
                        if let Err(err) = inner.record_error(&key, err).await {
                            tracing::warn!(%key, %err, "stream error not recorded");
                        }
                        break;
                    }
                };
                if let Err(err) = applied {
                    tracing::warn!(%key, %err, "stream update not applied");
                }
            },
            Err(err) => {
                tracing::warn!(%key, %err, attempt, "stream connect failed");
                if let Some(inner) = session.upgrade()
                    && let Err(err) = inner.record_error(&key, err).await
                {
                    tracing::warn!(%key, %err, "stream error not recorded");
                }
            }
        }

        let delay = retry.delay(attempt);
        attempt = attempt.saturating_add(1);
        if !sleep_or_cancel(&token, delay).await {
            return;
        }
    }
}

#[cfg(test)]
#[path = "../tests/session/connection_tests.rs"]
mod tests;
