//! Keyed pool of render instances for one page.
//!
//! Each `update_all` starts a new generation: instances from the previous
//! generation are claimed by identity key while the new tree is walked, and
//! whatever nobody claimed is dropped at the end of the walk.

use std::collections::HashMap;
use std::fmt;

use crate::model::WidgetSpec;

/// Identity of one render instance. Stable for as long as the instance is reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(u64);

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "w{}", self.0)
    }
}

/// Render instance supplied by the rendering layer.
pub trait Widget: Send + Sync + 'static {
    fn new(spec: &WidgetSpec) -> Self
    where
        Self: Sized;

    /// Whether this instance can render `spec` after an in-place update.
    fn accepts(&self, spec: &WidgetSpec) -> bool;

    fn update(&mut self, spec: &WidgetSpec, subs: &[WidgetId]);
}

/// Shape of the rendered tree; instances themselves stay in the cache.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WidgetTree {
    pub id: WidgetId,
    pub subs: Vec<WidgetTree>,
}

impl WidgetTree {
    /// Depth-first, children before parents.
    pub fn ids(&self) -> Vec<WidgetId> {
        let mut out = Vec::new();
        self.collect_ids(&mut out);
        out
    }

    fn collect_ids(&self, out: &mut Vec<WidgetId>) {
        for sub in &self.subs {
            sub.collect_ids(out);
        }
        out.push(self.id);
    }
}

pub struct WidgetCache<W> {
    next_id: u64,
    widgets: HashMap<WidgetId, W>,
    keys: HashMap<String, WidgetId>,
    prev_widgets: HashMap<WidgetId, W>,
    prev_keys: HashMap<String, WidgetId>,
}

impl<W> Default for WidgetCache<W> {
    fn default() -> Self {
        Self {
            next_id: 0,
            widgets: HashMap::new(),
            keys: HashMap::new(),
            prev_widgets: HashMap::new(),
            prev_keys: HashMap::new(),
        }
    }
}

impl<W: Widget> WidgetCache<W> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders `roots` into a fresh generation, reusing instances by key.
    pub fn update_all(&mut self, roots: &[&WidgetSpec]) -> Vec<WidgetTree> {
        self.begin();
        let trees = roots
            .iter()
            .enumerate()
            .map(|(n, spec)| self.update_node(spec, &n.to_string()))
            .collect();
        self.finish();
        trees
    }

    /// `update_all` for a page with a single root widget.
    pub fn update_one(&mut self, root: &WidgetSpec) -> WidgetTree {
        self.begin();
        let tree = self.update_node(root, "0");
        self.finish();
        tree
    }

    fn begin(&mut self) {
        self.prev_widgets = std::mem::take(&mut self.widgets);
        self.prev_keys = std::mem::take(&mut self.keys);
    }

    fn finish(&mut self) {
        let released = self.prev_widgets.len();
        self.prev_widgets.clear();
        self.prev_keys.clear();
        if released > 0 {
            tracing::debug!(released, live = self.widgets.len(), "widget cache released instances");
        }
    }

    fn update_node(&mut self, spec: &WidgetSpec, position: &str) -> WidgetTree {
        let subs: Vec<WidgetTree> = spec
            .subs()
            .into_iter()
            .enumerate()
            .map(|(n, sub)| self.update_node(sub, &format!("{}.{}", position, n)))
            .collect();
        let sub_ids: Vec<WidgetId> = subs.iter().map(|t| t.id).collect();

        // Position only identifies widgets that declare no identity of their own.
        let mut keys = spec.keys();
        if keys.is_empty() {
            keys.push(format!("{}:{}", position, spec.typ()));
        }

        let (id, mut widget) = match self.remove(&keys) {
            Some((id, widget)) if widget.accepts(spec) => (id, widget),
            _ => (self.alloc_id(), W::new(spec)),
        };
        widget.update(spec, &sub_ids);
        self.put_next(id, &keys, widget);
        WidgetTree { id, subs }
    }

    /// Takes the first previous-generation instance registered under any of `keys`.
    pub fn remove(&mut self, keys: &[String]) -> Option<(WidgetId, W)> {
        for key in keys {
            if let Some(id) = self.prev_keys.remove(key)
                && let Some(widget) = self.prev_widgets.remove(&id)
            {
                return Some((id, widget));
            }
        }
        None
    }

    /// Registers an instance into the generation being built.
    pub fn put_next(&mut self, id: WidgetId, keys: &[String], widget: W) {
        for key in keys {
            self.keys.entry(key.clone()).or_insert(id);
        }
        self.widgets.insert(id, widget);
    }

    pub fn get(&self, id: WidgetId) -> Option<&W> {
        self.widgets.get(&id)
    }

    pub fn get_mut(&mut self, id: WidgetId) -> Option<&mut W> {
        self.widgets.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    fn alloc_id(&mut self) -> WidgetId {
        self.next_id += 1;
        WidgetId(self.next_id)
    }
}

#[cfg(test)]
#[path = "tests/widget_cache_tests.rs"]
mod tests;
