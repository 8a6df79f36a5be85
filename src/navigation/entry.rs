use std::fmt;

use crate::model::{ModalSpec, NavPageSpec, PageKey, PageKind, PageSpec, PlainPageSpec, StartSpec};
use crate::widget_cache::{Widget, WidgetCache, WidgetTree};

/// Render identity of one entry. A reused entry keeps its id across passes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(pub(crate) u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// How a nav page's leading control is drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackControl {
    Hidden,
    /// "Back" label that does nothing.
    Disabled,
    Enabled,
}

pub struct PlainPageEntry<W> {
    pub id: EntryId,
    pub key: PageKey,
    pub spec: PlainPageSpec,
    pub widgets: WidgetCache<W>,
    pub root: WidgetTree,
}

pub struct NavPageEntry<W> {
    pub id: EntryId,
    pub key: PageKey,
    pub spec: NavPageSpec,
    pub widgets: WidgetCache<W>,
    pub root: WidgetTree,
    pub end: Option<WidgetTree>,
    pub has_prev_page: bool,
}

pub struct ModalEntry {
    pub id: EntryId,
    pub key: PageKey,
    pub spec: ModalSpec,
}

/// Materialized page or modal, owned by the navigator.
pub enum Entry<W> {
    PlainPage(PlainPageEntry<W>),
    NavPage(NavPageEntry<W>),
    Modal(ModalEntry),
}

impl<W: Widget> PlainPageEntry<W> {
    fn new(id: EntryId, key: PageKey, spec: PlainPageSpec) -> Self {
        let mut widgets = WidgetCache::new();
        let root = widgets.update_one(&spec.widget);
        Self {
            id,
            key,
            spec,
            widgets,
            root,
        }
    }

    fn update(&mut self, spec: &PlainPageSpec) -> bool {
        if self.spec == *spec {
            return false;
        }
        self.spec = spec.clone();
        self.root = self.widgets.update_one(&self.spec.widget);
        true
    }
}

impl<W: Widget> NavPageEntry<W> {
    fn new(id: EntryId, key: PageKey, spec: NavPageSpec, has_prev_page: bool) -> Self {
        let mut widgets = WidgetCache::new();
        let (root, end) = render_nav(&mut widgets, &spec);
        Self {
            id,
            key,
            spec,
            widgets,
            root,
            end,
            has_prev_page,
        }
    }

    fn update(&mut self, spec: &NavPageSpec, has_prev_page: bool) -> bool {
        if self.spec == *spec && self.has_prev_page == has_prev_page {
            return false;
        }
        self.spec = spec.clone();
        self.has_prev_page = has_prev_page;
        let (root, end) = render_nav(&mut self.widgets, &self.spec);
        self.root = root;
        self.end = end;
        true
    }

    pub fn back_control(&self) -> BackControl {
        match &self.spec.start {
            StartSpec::CustomBack(actions) if actions.is_empty() => BackControl::Disabled,
            StartSpec::CustomBack(_) => BackControl::Enabled,
            StartSpec::DefaultBack if self.has_prev_page => BackControl::Enabled,
            StartSpec::DefaultBack | StartSpec::Suppressed => BackControl::Hidden,
        }
    }
}

fn render_nav<W: Widget>(
    widgets: &mut WidgetCache<W>,
    spec: &NavPageSpec,
) -> (WidgetTree, Option<WidgetTree>) {
    match &spec.end {
        Some(end) => {
            let mut trees = widgets.update_all(&[&spec.widget, end]).into_iter();
            match (trees.next(), trees.next()) {
                (Some(root), end) => (root, end),
                (None, _) => unreachable!("update_all returns one tree per root"),
            }
        }
        None => (widgets.update_one(&spec.widget), None),
    }
}

impl<W> Entry<W> {
    pub(crate) fn new(id: EntryId, key: PageKey, spec: PageSpec, has_prev_page: bool) -> Self
    where
        W: Widget,
    {
        match spec {
            PageSpec::PlainPage(spec) => Entry::PlainPage(PlainPageEntry::new(id, key, spec)),
            PageSpec::NavPage(spec) => {
                Entry::NavPage(NavPageEntry::new(id, key, spec, has_prev_page))
            }
            PageSpec::Modal(spec) => Entry::Modal(ModalEntry { id, key, spec }),
        }
    }

    /// Re-renders in place. Returns whether anything changed.
    ///
    /// Callers only pass a spec of the entry's own kind; anything else is a bug.
    pub(crate) fn update(&mut self, spec: &PageSpec, has_prev_page: bool) -> bool
    where
        W: Widget,
    {
        match (self, spec) {
            (Entry::PlainPage(entry), PageSpec::PlainPage(spec)) => entry.update(spec),
            (Entry::NavPage(entry), PageSpec::NavPage(spec)) => entry.update(spec, has_prev_page),
            (Entry::Modal(entry), PageSpec::Modal(spec)) => {
                if entry.spec == *spec {
                    return false;
                }
                entry.spec = spec.clone();
                true
            }
            (entry, spec) => unreachable!(
                "{} entry {} updated with {} spec",
                entry.kind(),
                entry.id(),
                spec.kind()
            ),
        }
    }

    pub fn id(&self) -> EntryId {
        match self {
            Entry::PlainPage(e) => e.id,
            Entry::NavPage(e) => e.id,
            Entry::Modal(e) => e.id,
        }
    }

    pub fn key(&self) -> &PageKey {
        match self {
            Entry::PlainPage(e) => &e.key,
            Entry::NavPage(e) => &e.key,
            Entry::Modal(e) => &e.key,
        }
    }

    pub fn kind(&self) -> PageKind {
        match self {
            Entry::PlainPage(_) => PageKind::PlainPage,
            Entry::NavPage(_) => PageKind::NavPage,
            Entry::Modal(_) => PageKind::Modal,
        }
    }

    pub fn is_stacked(&self) -> bool {
        !matches!(self, Entry::Modal(_))
    }

    pub fn allow_back_swipe(&self) -> bool {
        match self {
            Entry::PlainPage(_) => true,
            Entry::NavPage(e) => e.spec.start == StartSpec::DefaultBack,
            Entry::Modal(_) => false,
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            Entry::PlainPage(e) => e.spec.title.as_deref(),
            Entry::NavPage(e) => Some(&e.spec.title),
            Entry::Modal(e) => Some(&e.spec.title),
        }
    }

    /// Widget pool and rendered root for stacked entries.
    pub fn widgets(&self) -> Option<(&WidgetCache<W>, &WidgetTree)> {
        match self {
            Entry::PlainPage(e) => Some((&e.widgets, &e.root)),
            Entry::NavPage(e) => Some((&e.widgets, &e.root)),
            Entry::Modal(_) => None,
        }
    }
}

impl<W> fmt::Debug for Entry<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::PlainPage(e) => write!(f, "Entry::PlainPage{{{} {}}}", e.id, e.key),
            Entry::NavPage(e) => write!(f, "Entry::NavPage{{{} {}}}", e.id, e.key),
            Entry::Modal(e) => write!(f, "Entry::Modal{{{} {}}}", e.id, e.key),
        }
    }
}
