use super::*;
use crate::model::{PageSpec, PlainPageSpec, WidgetSpec};
use crate::navigation::entry::EntryId;
use crate::widget_cache::{Widget, WidgetId};

struct Noop;

impl Widget for Noop {
    fn new(_spec: &WidgetSpec) -> Self {
        Noop
    }

    fn accepts(&self, _spec: &WidgetSpec) -> bool {
        true
    }

    fn update(&mut self, _spec: &WidgetSpec, _subs: &[WidgetId]) {}
}

fn entry(id: u64, key: &str) -> Entry<Noop> {
    let spec = PageSpec::from(PlainPageSpec::new(None, WidgetSpec::Empty));
    Entry::new(EntryId(id), PageKey::new(key), spec, false)
}

#[test]
fn repeated_key_hands_out_bottom_most_first() {
    let mut cache = EntryCache::new(vec![entry(1, "/a"), entry(2, "/b"), entry(3, "/a")]);
    assert_eq!(cache.len(), 3);
    assert_eq!(cache.remove(&PageKey::new("/a")).map(|e| e.id()), Some(EntryId(1)));
    assert_eq!(cache.remove(&PageKey::new("/a")).map(|e| e.id()), Some(EntryId(3)));
    assert!(cache.remove(&PageKey::new("/a")).is_none());
    assert_eq!(cache.len(), 1);
}

#[test]
fn consumed_cache_is_empty() {
    let mut cache = EntryCache::new(vec![entry(1, "/a")]);
    assert!(!cache.is_empty());
    assert!(cache.remove(&PageKey::new("/missing")).is_none());
    assert!(cache.remove(&PageKey::new("/a")).is_some());
    assert!(cache.is_empty());
}
