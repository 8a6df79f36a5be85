use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::model::{ActionSpec, ModalKind, PageKey, WidgetSpec};
use crate::navigation::{BackControl, Entry, EntryId, Overlay, Presentation, Presenter};
use crate::widget_cache::{Widget, WidgetCache, WidgetId, WidgetTree};

/// Render instance for one widget. Checkbox state lives here, so it
/// survives page updates for as long as the instance is reused.
pub struct TermWidget {
    spec: WidgetSpec,
    checked: Arc<AtomicBool>,
    subs: Vec<WidgetId>,
}

impl Widget for TermWidget {
    fn new(spec: &WidgetSpec) -> Self {
        let initial = matches!(
            spec,
            WidgetSpec::Checkbox {
                initial_bool: true,
                ..
            }
        );
        Self {
            spec: spec.clone(),
            checked: Arc::new(AtomicBool::new(initial)),
            subs: Vec::new(),
        }
    }

    fn accepts(&self, spec: &WidgetSpec) -> bool {
        self.spec.typ() == spec.typ()
    }

    fn update(&mut self, spec: &WidgetSpec, subs: &[WidgetId]) {
        self.spec = spec.clone();
        self.subs = subs.to_vec();
    }
}

impl TermWidget {
    pub fn is_checked(&self) -> bool {
        self.checked.load(Ordering::Relaxed)
    }
}

/// One selectable line of a page body.
#[derive(Clone, Debug)]
pub struct Row {
    pub widget: WidgetId,
    pub text: String,
    pub actions: Vec<ActionSpec>,
    /// Variable name and shared checked flag for checkboxes.
    pub checkbox: Option<(String, Arc<AtomicBool>)>,
}

impl Row {
    pub fn is_checked(&self) -> Option<bool> {
        self.checkbox
            .as_ref()
            .map(|(_, checked)| checked.load(Ordering::Relaxed))
    }

    /// Flips a checkbox row and returns the new value.
    pub fn toggle(&self) -> Option<bool> {
        self.checkbox
            .as_ref()
            .map(|(_, checked)| !checked.fetch_xor(true, Ordering::Relaxed))
    }

    pub fn label(&self) -> String {
        match self.is_checked() {
            Some(true) => format!("[x] {}", self.text),
            Some(false) => format!("[ ] {}", self.text),
            None => self.text.clone(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct PageView {
    pub entry: EntryId,
    pub key: PageKey,
    pub title: Option<String>,
    /// `None` for plain pages.
    pub back: Option<BackControl>,
    pub end: Option<Row>,
    pub rows: Vec<Row>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OverlayView {
    Working(String),
    Modal {
        key: PageKey,
        kind: ModalKind,
        title: String,
        text: Option<String>,
        buttons: Vec<(String, Vec<ActionSpec>)>,
    },
}

/// What the terminal shows. Written by the presenter, read by the draw loop.
#[derive(Clone, Debug, Default)]
pub struct Screen {
    pub pages: Vec<PageView>,
    pub overlay: Option<OverlayView>,
    /// Bumped on every change so the UI can reset its selection.
    pub generation: u64,
    pub last_animated: bool,
}

impl Screen {
    pub fn top(&self) -> Option<&PageView> {
        self.pages.last()
    }
}

pub type SharedScreen = Arc<Mutex<Screen>>;

pub fn lock_screen(screen: &SharedScreen) -> MutexGuard<'_, Screen> {
    screen.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct TerminalPresenter {
    screen: SharedScreen,
}

impl TerminalPresenter {
    pub fn new(screen: SharedScreen) -> Self {
        Self { screen }
    }
}

#[async_trait]
impl Presenter for TerminalPresenter {
    type Widget = TermWidget;

    async fn set_stack(&mut self, stack: &[&Entry<TermWidget>], animated: bool) {
        let pages: Vec<PageView> = stack.iter().filter_map(|e| page_view(e)).collect();
        let mut screen = lock_screen(&self.screen);
        screen.pages = pages;
        screen.last_animated = animated;
        screen.generation += 1;
    }

    async fn present(&mut self, overlay: &Overlay, _presentation: Presentation) {
        let view = match overlay {
            Overlay::Working { text } => OverlayView::Working(text.clone()),
            Overlay::Modal { key, spec, .. } => OverlayView::Modal {
                key: key.clone(),
                kind: spec.kind,
                title: spec.title.clone(),
                text: spec.text.clone(),
                buttons: spec
                    .widgets
                    .iter()
                    .map(|b| (b.text.clone(), b.actions.clone()))
                    .collect(),
            },
        };
        let mut screen = lock_screen(&self.screen);
        screen.overlay = Some(view);
        screen.generation += 1;
    }

    async fn dismiss(&mut self, _overlay: &Overlay, _presentation: Presentation) {
        let mut screen = lock_screen(&self.screen);
        screen.overlay = None;
        screen.generation += 1;
    }

    fn page_updated(&mut self, entry: &Entry<TermWidget>) {
        let Some(view) = page_view(entry) else {
            return;
        };
        let mut screen = lock_screen(&self.screen);
        if let Some(slot) = screen.pages.iter_mut().find(|p| p.entry == view.entry) {
            *slot = view;
        }
    }
}

fn page_view(entry: &Entry<TermWidget>) -> Option<PageView> {
    let (widgets, root) = entry.widgets()?;
    let mut rows = Vec::new();
    collect_rows(widgets, root, &mut rows);
    let (back, end) = match entry {
        Entry::NavPage(nav) => {
            let end = nav.end.as_ref().and_then(|tree| {
                let mut out = Vec::new();
                collect_rows(widgets, tree, &mut out);
                out.into_iter().next()
            });
            (Some(nav.back_control()), end)
        }
        _ => (None, None),
    };
    Some(PageView {
        entry: entry.id(),
        key: entry.key().clone(),
        title: entry.title().map(str::to_string),
        back,
        end,
        rows,
    })
}

/// Flattens a rendered tree into rows, containers contributing only their children.
pub fn collect_rows(widgets: &WidgetCache<TermWidget>, tree: &WidgetTree, out: &mut Vec<Row>) {
    let Some(widget) = widgets.get(tree.id) else {
        return;
    };
    let (text, checkbox) = match &widget.spec {
        WidgetSpec::Empty => return,
        WidgetSpec::Column { .. } | WidgetSpec::Scroll { .. } => {
            for sub in &tree.subs {
                collect_rows(widgets, sub, out);
            }
            return;
        }
        WidgetSpec::Text { text } => (text.clone(), None),
        WidgetSpec::Button { text, .. } => (format!("[ {} ]", text), None),
        WidgetSpec::Checkbox { var_name, text, .. } => (
            text.clone().unwrap_or_else(|| var_name.clone()),
            Some((var_name.clone(), Arc::clone(&widget.checked))),
        ),
        WidgetSpec::DetailCell { text, .. } => (format!("{}  >", text), None),
        WidgetSpec::Image { url } => (format!("<image {}>", url), None),
    };
    out.push(Row {
        widget: tree.id,
        text,
        actions: widget.spec.actions().to_vec(),
        checkbox,
    });
}

#[cfg(test)]
#[path = "../tests/tui_shell/presenter_tests.rs"]
mod tests;
