//! User-triggered operations.

use std::future::Future;

use super::*;
use crate::navigation::BackAction;

impl<P: Presenter> Session<P> {
    /// Shows a local loading page for `key`, then fetches it.
    pub async fn start(&self, key: PageKey) -> Result<(), ApplinError> {
        {
            let mut state = self.inner.state.lock().await;
            state.stack = vec![key.clone()];
            self.inner.publish(&mut state).await?;
        }
        match self.inner.caller.fetch(key.as_str(), &[]).await {
            Ok(Some(update)) => self.inner.apply_update(&key, Some(update)).await,
            Ok(None) => self.inner.record_error(&key, no_page(&key)).await,
            Err(err) => {
                tracing::warn!(%key, %err, "initial page load failed");
                self.inner.record_error(&key, err).await
            }
        }
    }

    /// Fetches `key` unless a fresh copy is cached, then puts it on top.
    ///
    /// A key already on the stack pops back to it instead.
    pub async fn push(&self, key: PageKey) -> Result<(), ApplinError> {
        let update = self.load(&key).await?;
        let mut state = self.inner.state.lock().await;
        state.store(&key, update);
        if let Some(pos) = state.stack.iter().position(|k| *k == key) {
            state.stack.truncate(pos + 1);
        } else {
            state.stack.push(key);
        }
        self.inner.publish(&mut state).await
    }

    /// Removes the top page. The last page is never removed.
    pub async fn pop(&self) -> Result<(), ApplinError> {
        let mut state = self.inner.state.lock().await;
        if state.stack.len() <= 1 {
            tracing::warn!("ignoring pop of the last page");
            return Ok(());
        }
        state.stack.pop();
        self.inner.publish(&mut state).await
    }

    pub async fn replace_all(&self, key: PageKey) -> Result<(), ApplinError> {
        let update = self.load(&key).await?;
        let mut state = self.inner.state.lock().await;
        state.store(&key, update);
        state.stack = vec![key];
        self.inner.publish(&mut state).await
    }

    /// POSTs the top page's variables to `path`. A returned page replaces the top page.
    pub async fn rpc(&self, path: &str) -> Result<(), ApplinError> {
        let (top, vars) = {
            let state = self.inner.state.lock().await;
            let top = state
                .top_page_key()
                .cloned()
                .ok_or_else(|| ApplinError::App("rpc with an empty stack".to_string()))?;
            let vars = state.page_vars(&top);
            (top, vars)
        };
        let update = self
            .with_working(self.inner.caller.fetch(path, &vars))
            .await?;
        if update.is_some() {
            self.inner.apply_update(&top, update).await?;
        }
        Ok(())
    }

    /// Refetches the top page.
    pub async fn poll(&self) -> Result<(), ApplinError> {
        let top = {
            let state = self.inner.state.lock().await;
            state.top_page_key().cloned()
        };
        let Some(top) = top else {
            return Ok(());
        };
        let update = self
            .with_working(self.inner.caller.fetch(top.as_str(), &[]))
            .await?;
        self.inner.apply_update(&top, update).await
    }

    /// Runs `actions` in order and stops at the first failure, which is shown to the user.
    pub async fn do_actions(&self, actions: &[ActionSpec]) -> Result<(), ApplinError> {
        for action in actions {
            tracing::debug!(%action, "action");
            let result = match action {
                ActionSpec::Nothing => Ok(()),
                ActionSpec::Poll => self.poll().await,
                ActionSpec::Pop => self.pop().await,
                ActionSpec::Push(key) => self.push(key.clone()).await,
                ActionSpec::ReplaceAll(key) => self.replace_all(key.clone()).await,
                ActionSpec::Rpc(path) => self.rpc(path).await,
            };
            if let Err(err) = result {
                self.show_error(err.clone()).await?;
                return Err(err);
            }
        }
        Ok(())
    }

    pub async fn set_var(&self, name: impl Into<String>, value: Var) {
        let name = name.into();
        tracing::debug!(%name, ?value, "set var");
        self.inner.state.lock().await.vars.insert(name, value);
    }

    /// Handles a tap on the back control of the nav page `entry`.
    pub async fn back(&self, entry: EntryId) -> Result<(), ApplinError> {
        match self.inner.navigator.back(entry).await {
            BackAction::Run(actions) => self.do_actions(&actions).await,
            BackAction::Pop => self.do_actions(&[ActionSpec::Pop]).await,
            BackAction::Ignore => Ok(()),
        }
    }

    /// Records `err` and shows it in the local error alert on top of the stack.
    pub async fn show_error(&self, err: ApplinError) -> Result<(), ApplinError> {
        tracing::warn!(%err, "action failed");
        let key = PageKey::new(ERROR_MODAL_KEY);
        let mut state = self.inner.state.lock().await;
        state.pages.insert(
            key.clone(),
            PageRecord {
                spec: Some(error_modal(&err)),
                ..PageRecord::default()
            },
        );
        state.interactive_error = Some(err);
        state.stack.retain(|k| *k != key);
        if state.stack.is_empty() {
            return Ok(());
        }
        state.stack.push(key);
        self.inner.publish(&mut state).await
    }

    /// Fetches `key` for display. `None` means the cached copy stands.
    async fn load(&self, key: &PageKey) -> Result<Option<PageUpdate>, ApplinError> {
        let now = time::OffsetDateTime::now_utc();
        let cached = {
            let state = self.inner.state.lock().await;
            state.pages.get(key).and_then(|r| r.spec.as_ref().map(|_| r.meta.clone()))
        };
        if let Some(meta) = &cached
            && meta.as_ref().is_some_and(|m| m.is_fresh(now))
        {
            tracing::debug!(%key, "using fresh cached page");
            return Ok(None);
        }
        let update = self
            .with_working(self.inner.caller.fetch(key.as_str(), &[]))
            .await?;
        if update.is_none() && cached.is_none() {
            return Err(no_page(key));
        }
        Ok(update)
    }

    /// Shows the working indicator until the last overlapping action finishes.
    pub(super) async fn with_working<T>(&self, fut: impl Future<Output = T>) -> T {
        {
            let mut in_flight = self.inner.working.lock().await;
            *in_flight += 1;
            if *in_flight == 1 {
                self.inner
                    .navigator
                    .set_working(Some(WORKING_TEXT.to_string()))
                    .await;
            }
        }
        let out = fut.await;
        let mut in_flight = self.inner.working.lock().await;
        *in_flight -= 1;
        if *in_flight == 0 {
            self.inner.navigator.set_working(None).await;
        }
        out
    }
}

fn no_page(key: &PageKey) -> ApplinError {
    ApplinError::server(None, format!("server returned no page for {}", key))
}
