//! Page-stack reconciliation.
//!
//! A [`Navigator`] turns each desired stack of `(key, spec)` pairs into entry
//! reuse/creation/release, then tells its [`Presenter`] which stacked pages
//! and which single overlay to show. All passes and working-indicator
//! changes run one at a time under one async lock, in submission order.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::ApplinError;
use crate::model::{ActionSpec, PageKey, PageKind, PageSpec, StartSpec};

mod entry;
mod entry_cache;
mod presenter;

pub use entry::{BackControl, Entry, EntryId, ModalEntry, NavPageEntry, PlainPageEntry};
use entry_cache::EntryCache;
pub use presenter::{Overlay, Presentation, Presenter};

/// What one reconciliation pass did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PassReport {
    pub created: usize,
    pub reused: usize,
    pub released: usize,
    pub changed_top: bool,
    pub stack_replaced: bool,
    pub animated: bool,
}

/// Outcome of a nav page's own back control.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackAction {
    Run(Vec<ActionSpec>),
    Pop,
    Ignore,
}

pub struct Navigator<P: Presenter> {
    state: Arc<Mutex<NavState<P>>>,
}

impl<P: Presenter> Clone for Navigator<P> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

struct NavState<P: Presenter> {
    presenter: P,
    entries: Vec<Entry<P::Widget>>,
    stack_ids: Vec<EntryId>,
    stack_rendered: bool,
    top: Option<EntryId>,
    working: Option<String>,
    presented: Option<Overlay>,
    next_entry_id: u64,
}

impl<P: Presenter> Navigator<P> {
    pub fn new(presenter: P) -> Self {
        Self {
            state: Arc::new(Mutex::new(NavState {
                presenter,
                entries: Vec::new(),
                stack_ids: Vec::new(),
                stack_rendered: false,
                top: None,
                working: None,
                presented: None,
                next_entry_id: 0,
            })),
        }
    }

    /// Runs one reconciliation pass against the full desired stack, bottom to top.
    ///
    /// Panics on an empty stack.
    pub async fn update(&self, pages: Vec<(PageKey, PageSpec)>) -> Result<PassReport, ApplinError> {
        assert!(!pages.is_empty(), "navigator update with an empty stack");
        let mut seen = HashSet::new();
        for (key, _) in &pages {
            if !seen.insert(key) {
                return Err(ApplinError::App(format!("duplicate page key {key} in stack")));
            }
        }
        if pages.iter().all(|(_, spec)| spec.kind() == PageKind::Modal) {
            return Err(ApplinError::App(
                "stack has no page to show under the modal".to_string(),
            ));
        }
        let mut state = self.state.lock().await;
        Ok(state.reconcile(pages).await)
    }

    /// Sets or clears the working indicator. It outranks any modal.
    pub async fn set_working(&self, text: Option<String>) {
        let mut state = self.state.lock().await;
        if state.working == text {
            return;
        }
        state.working = text;
        state.present_correct_overlay().await;
    }

    pub async fn allow_back_swipe(&self) -> bool {
        let state = self.state.lock().await;
        if state.presented.is_some() {
            return false;
        }
        state
            .top_stacked()
            .map(Entry::allow_back_swipe)
            .unwrap_or(false)
    }

    /// Resolves a tap on the back control of `entry`.
    ///
    /// A control on a page that is no longer the top stacked page does nothing.
    pub async fn back(&self, entry: EntryId) -> BackAction {
        let state = self.state.lock().await;
        let Some(Entry::NavPage(top)) = state.top_stacked() else {
            return BackAction::Ignore;
        };
        if top.id != entry {
            tracing::debug!(%entry, top = %top.id, "ignoring back from covered page");
            return BackAction::Ignore;
        }
        match &top.spec.start {
            StartSpec::CustomBack(actions) if actions.is_empty() => BackAction::Ignore,
            StartSpec::CustomBack(actions) => BackAction::Run(actions.clone()),
            StartSpec::DefaultBack => BackAction::Pop,
            StartSpec::Suppressed => BackAction::Ignore,
        }
    }

    pub async fn presented(&self) -> Option<Overlay> {
        self.state.lock().await.presented.clone()
    }

    /// Keys of the stacked pages, bottom to top.
    pub async fn stack_keys(&self) -> Vec<PageKey> {
        let state = self.state.lock().await;
        state
            .entries
            .iter()
            .filter(|e| e.is_stacked())
            .map(|e| e.key().clone())
            .collect()
    }

    pub async fn top_stacked_id(&self) -> Option<EntryId> {
        self.state.lock().await.top_stacked().map(Entry::id)
    }

    /// Runs `f` with exclusive access to the presenter.
    pub async fn with_presenter<R>(&self, f: impl FnOnce(&mut P) -> R) -> R {
        let mut state = self.state.lock().await;
        f(&mut state.presenter)
    }
}

impl<P: Presenter> NavState<P> {
    async fn reconcile(&mut self, pages: Vec<(PageKey, PageSpec)>) -> PassReport {
        let mut report = PassReport::default();
        let mut cache = EntryCache::new(std::mem::take(&mut self.entries));
        let mut entries: Vec<Entry<P::Widget>> = Vec::with_capacity(pages.len());
        let mut updated = Vec::new();
        let mut stacked = 0usize;

        for (key, spec) in pages {
            let has_prev_page = stacked > 0;
            let entry = match cache.remove(&key) {
                Some(mut entry) if entry.kind() == spec.kind() => {
                    if entry.update(&spec, has_prev_page) {
                        updated.push(entry.id());
                    }
                    report.reused += 1;
                    entry
                }
                prior => {
                    if let Some(prior) = prior {
                        tracing::debug!(%key, from = %prior.kind(), to = %spec.kind(), "page kind changed");
                        report.released += 1;
                    }
                    report.created += 1;
                    self.next_entry_id += 1;
                    Entry::new(EntryId(self.next_entry_id), key, spec, has_prev_page)
                }
            };
            if entry.is_stacked() {
                stacked += 1;
            }
            entries.push(entry);
        }
        report.released += cache.len();
        drop(cache);

        let top = match entries.last() {
            Some(top) => top.id(),
            None => unreachable!("reconciled an empty stack"),
        };
        report.changed_top = self.top != Some(top);

        let stack_ids: Vec<EntryId> = entries
            .iter()
            .filter(|e| e.is_stacked())
            .map(Entry::id)
            .collect();
        if stack_ids != self.stack_ids {
            if let Some(overlay) = self.presented.take() {
                self.presenter
                    .dismiss(&overlay, overlay.presentation())
                    .await;
            }
            let animated = report.changed_top && self.stack_rendered;
            let stack: Vec<&Entry<P::Widget>> = entries.iter().filter(|e| e.is_stacked()).collect();
            self.presenter.set_stack(&stack, animated).await;
            self.stack_rendered = true;
            report.stack_replaced = true;
            report.animated = animated;
        } else {
            for entry in entries.iter().filter(|e| e.is_stacked()) {
                if updated.contains(&entry.id()) {
                    self.presenter.page_updated(entry);
                }
            }
        }

        self.entries = entries;
        self.stack_ids = stack_ids;
        self.top = Some(top);
        self.present_correct_overlay().await;

        tracing::debug!(
            created = report.created,
            reused = report.reused,
            released = report.released,
            changed_top = report.changed_top,
            stack_replaced = report.stack_replaced,
            "reconciliation pass"
        );
        report
    }

    fn top_stacked(&self) -> Option<&Entry<P::Widget>> {
        self.entries.iter().rev().find(|e| e.is_stacked())
    }

    fn desired_overlay(&self) -> Option<Overlay> {
        if let Some(text) = &self.working {
            return Some(Overlay::Working { text: text.clone() });
        }
        match self.entries.last() {
            Some(Entry::Modal(modal)) => Some(Overlay::Modal {
                entry: modal.id,
                key: modal.key.clone(),
                spec: modal.spec.clone(),
            }),
            _ => None,
        }
    }

    async fn present_correct_overlay(&mut self) {
        let desired = self.desired_overlay();
        if desired == self.presented {
            return;
        }
        if let Some(current) = self.presented.take() {
            self.presenter
                .dismiss(&current, current.presentation())
                .await;
        }
        if let Some(overlay) = desired {
            self.presenter
                .present(&overlay, overlay.presentation())
                .await;
            self.presented = Some(overlay);
        }
    }
}

#[cfg(test)]
#[path = "tests/navigation_tests.rs"]
mod tests;
