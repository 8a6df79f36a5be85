//! Desired-state owner.
//!
//! A [`Session`] keeps the ordered page keys, the latest spec per key and the
//! variable values. Every change builds a full stack snapshot and hands it to
//! the [`Navigator`] while the session lock is held, so snapshots reach the
//! engine in the order they were made.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::config::{ClientConfig, RetryPolicy};
use crate::error::{ApplinError, interpolate_error_details};
use crate::model::{
    ActionSpec, ConnectionMode, ModalButtonSpec, ModalKind, ModalSpec, NavPageSpec, PageKey,
    PageKind, PageSpec, PlainPageSpec, Var, WidgetSpec,
};
use crate::navigation::{EntryId, Navigator, Presenter};
use crate::remote::{CacheMeta, PageUpdate, ServerCaller};

mod actions;
mod connection;
pub use self::connection::sleep_or_cancel;

/// Key of the local alert shown after an interactive action failed.
pub const ERROR_MODAL_KEY: &str = "/applin-error";

/// Text of the working indicator during network actions.
pub const WORKING_TEXT: &str = "Working";

pub struct Session<P: Presenter> {
    inner: Arc<SessionInner<P>>,
}

impl<P: Presenter> Clone for Session<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct SessionInner<P: Presenter> {
    caller: ServerCaller,
    navigator: Navigator<P>,
    retry: RetryPolicy,
    shutdown: CancellationToken,
    state: Mutex<SessionState>,
    /// Network actions currently holding the working indicator up.
    working: Mutex<usize>,
}

#[derive(Default)]
struct SessionState {
    stack: Vec<PageKey>,
    pages: HashMap<PageKey, PageRecord>,
    vars: HashMap<String, Var>,
    interactive_error: Option<ApplinError>,
    connections: HashMap<PageKey, Connection>,
}

/// What the session knows about one page key.
#[derive(Default)]
struct PageRecord {
    spec: Option<PageSpec>,
    meta: Option<CacheMeta>,
    error: Option<ApplinError>,
}

struct Connection {
    mode: ConnectionMode,
    token: CancellationToken,
}

impl<P: Presenter> Session<P> {
    pub fn new(config: &ClientConfig, presenter: P) -> Result<Self, ApplinError> {
        let caller = ServerCaller::new(config)?;
        Ok(Self {
            inner: Arc::new(SessionInner {
                caller,
                navigator: Navigator::new(presenter),
                retry: config.retry.clone(),
                shutdown: CancellationToken::new(),
                state: Mutex::new(SessionState::default()),
                working: Mutex::new(0),
            }),
        })
    }

    pub fn navigator(&self) -> &Navigator<P> {
        &self.inner.navigator
    }

    pub fn caller(&self) -> &ServerCaller {
        &self.inner.caller
    }

    /// Current page keys, bottom to top, modals included.
    pub async fn stack(&self) -> Vec<PageKey> {
        self.inner.state.lock().await.stack.clone()
    }

    pub async fn page_spec(&self, key: &PageKey) -> Option<PageSpec> {
        let state = self.inner.state.lock().await;
        state.pages.get(key).and_then(|r| r.spec.clone())
    }

    pub async fn page_error(&self, key: &PageKey) -> Option<ApplinError> {
        let state = self.inner.state.lock().await;
        state.pages.get(key).and_then(|r| r.error.clone())
    }

    pub async fn interactive_error(&self) -> Option<ApplinError> {
        self.inner.state.lock().await.interactive_error.clone()
    }

    pub async fn var(&self, name: &str) -> Option<Var> {
        self.inner.state.lock().await.vars.get(name).cloned()
    }

    /// Keys that currently have a poll or stream task.
    pub async fn connected_keys(&self) -> Vec<(PageKey, ConnectionMode)> {
        let state = self.inner.state.lock().await;
        let mut out: Vec<_> = state
            .connections
            .iter()
            .map(|(k, c)| (k.clone(), c.mode))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }

    /// Cancels every connection task. The session stays usable for direct calls.
    pub async fn shutdown(&self) {
        self.inner.shutdown.cancel();
        let mut state = self.inner.state.lock().await;
        for (_, conn) in state.connections.drain() {
            conn.token.cancel();
        }
    }
}

impl<P: Presenter> SessionInner<P> {
    /// Builds the desired stack from `state` and runs one navigator pass.
    async fn publish(self: &Arc<Self>, state: &mut SessionState) -> Result<(), ApplinError> {
        let pages: Vec<(PageKey, PageSpec)> = state
            .stack
            .iter()
            .map(|key| (key.clone(), state.render_spec(key)))
            .collect();
        if pages.is_empty() {
            return Ok(());
        }
        self.navigator.update(pages).await?;
        self.sync_connections(state);
        Ok(())
    }

    /// Starts, restarts or cancels connection tasks to match the stack.
    fn sync_connections(self: &Arc<Self>, state: &mut SessionState) {
        let mut wanted: HashMap<PageKey, ConnectionMode> = HashMap::new();
        for key in &state.stack {
            let mode = state
                .pages
                .get(key)
                .and_then(|r| r.spec.as_ref())
                .map(PageSpec::connection_mode)
                .unwrap_or_default();
            if mode != ConnectionMode::Disconnected {
                wanted.insert(key.clone(), mode);
            }
        }

        state.connections.retain(|key, conn| {
            let keep = wanted.get(key) == Some(&conn.mode);
            if !keep {
                tracing::debug!(%key, "stopping connection");
                conn.token.cancel();
            }
            keep
        });

        if self.shutdown.is_cancelled() {
            return;
        }
        for (key, mode) in wanted {
            if state.connections.contains_key(&key) {
                continue;
            }
            let token = self.shutdown.child_token();
            tracing::debug!(%key, ?mode, "starting connection");
            connection::spawn(Arc::downgrade(self), key.clone(), mode, token.clone());
            state.connections.insert(key, Connection { mode, token });
        }
    }

    /// Stores a fetched page and republishes when it is on the stack.
    async fn apply_update(
        self: &Arc<Self>,
        key: &PageKey,
        update: Option<PageUpdate>,
    ) -> Result<(), ApplinError> {
        let mut state = self.state.lock().await;
        state.store(key, update);
        if state.stack.contains(key) {
            self.publish(&mut state).await?;
        }
        Ok(())
    }

    /// Records a background fetch failure, unless a stale copy may still serve.
    async fn record_error(self: &Arc<Self>, key: &PageKey, err: ApplinError) -> Result<(), ApplinError> {
        let now = time::OffsetDateTime::now_utc();
        let mut state = self.state.lock().await;
        let record = state.pages.entry(key.clone()).or_default();
        if record.spec.is_some()
            && let Some(meta) = &record.meta
            && meta.may_serve_stale(now)
        {
            tracing::debug!(%key, %err, "serving stale copy after error");
            return Ok(());
        }
        record.error = Some(err);
        if state.stack.contains(key) {
            self.publish(&mut state).await?;
        }
        Ok(())
    }

    async fn is_fresh(&self, key: &PageKey) -> bool {
        let now = time::OffsetDateTime::now_utc();
        let state = self.state.lock().await;
        state
            .pages
            .get(key)
            .and_then(|r| r.meta.as_ref())
            .map(|m| m.is_fresh(now))
            .unwrap_or(false)
    }
}

impl SessionState {
    /// Keeps a fetched page. `None` leaves the stored spec as it was.
    fn store(&mut self, key: &PageKey, update: Option<PageUpdate>) {
        let record = self.pages.entry(key.clone()).or_default();
        record.error = None;
        if let Some(update) = update {
            record.spec = Some(update.spec);
            record.meta = Some(update.meta);
        }
    }

    /// Spec shown for `key`: the stored page, or a local loading/error page.
    fn render_spec(&self, key: &PageKey) -> PageSpec {
        let record = self.pages.get(key);
        match record {
            Some(PageRecord {
                spec: Some(PageSpec::Modal(modal)),
                ..
            }) => {
                let mut modal = modal.clone();
                modal.text = modal
                    .text
                    .map(|t| interpolate_error_details(&t, self.interactive_error.as_ref()));
                PageSpec::Modal(modal)
            }
            Some(PageRecord {
                spec: Some(spec), ..
            }) => spec.clone(),
            Some(PageRecord {
                spec: None,
                error: Some(err),
                ..
            }) => error_page(err),
            _ => loading_page(),
        }
    }

    /// Key of the top page that is not a modal.
    fn top_page_key(&self) -> Option<&PageKey> {
        self.stack.iter().rev().find(|key| {
            !matches!(
                self.pages.get(*key).and_then(|r| r.spec.as_ref()).map(PageSpec::kind),
                Some(PageKind::Modal)
            )
        })
    }

    /// Variables bound by `key`'s widgets, with values the user changed.
    fn page_vars(&self, key: &PageKey) -> Vec<(String, Var)> {
        let Some(spec) = self.pages.get(key).and_then(|r| r.spec.as_ref()) else {
            return Vec::new();
        };
        spec.vars()
            .into_iter()
            .map(|(name, default)| {
                let value = self.vars.get(&name).cloned().unwrap_or(default);
                (name, value)
            })
            .collect()
    }
}

fn loading_page() -> PageSpec {
    PlainPageSpec::new(
        Some("Loading".to_string()),
        WidgetSpec::Text {
            text: "Loading...".to_string(),
        },
    )
    .into()
}

fn error_page(err: &ApplinError) -> PageSpec {
    NavPageSpec::new(
        "Error",
        WidgetSpec::Column {
            widgets: vec![
                WidgetSpec::Text {
                    text: err.interactive_message(),
                },
                WidgetSpec::Button {
                    text: "Retry".to_string(),
                    actions: vec![ActionSpec::Poll],
                },
            ],
        },
    )
    .into()
}

fn error_modal(err: &ApplinError) -> PageSpec {
    ModalSpec::new(
        ModalKind::Alert,
        "Error",
        Some(err.interactive_message()),
        vec![ModalButtonSpec::new("OK", vec![ActionSpec::Pop])],
    )
    .into()
}

impl<P: Presenter> Drop for SessionInner<P> {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
