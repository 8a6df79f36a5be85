use std::collections::HashMap;

use super::entry::Entry;
use crate::model::PageKey;

/// Leftover entries from the previous pass, consumed by the current one.
///
/// Per key, the bottom-most historical entry is handed out first.
pub(crate) struct EntryCache<W> {
    by_key: HashMap<PageKey, Vec<Entry<W>>>,
}

impl<W> EntryCache<W> {
    pub(crate) fn new(entries: Vec<Entry<W>>) -> Self {
        let mut by_key: HashMap<PageKey, Vec<Entry<W>>> = HashMap::new();
        for entry in entries.into_iter().rev() {
            by_key.entry(entry.key().clone()).or_default().push(entry);
        }
        Self { by_key }
    }

    pub(crate) fn remove(&mut self, key: &PageKey) -> Option<Entry<W>> {
        let entries = self.by_key.get_mut(key)?;
        let entry = entries.pop();
        if entries.is_empty() {
            self.by_key.remove(key);
        }
        entry
    }

    pub(crate) fn len(&self) -> usize {
        self.by_key.values().map(Vec::len).sum()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

#[cfg(test)]
#[path = "../tests/navigation/entry_cache_tests.rs"]
mod tests;
