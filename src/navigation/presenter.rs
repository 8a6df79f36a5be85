use async_trait::async_trait;

use super::entry::{Entry, EntryId};
use crate::model::{ModalSpec, PageKey};
use crate::widget_cache::Widget;

/// Directive passed alongside every present/dismiss call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Presentation {
    pub suppress_animation: bool,
}

/// The single view shown above the stacked pages.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Overlay {
    Working { text: String },
    Modal {
        entry: EntryId,
        key: PageKey,
        spec: ModalSpec,
    },
}

impl Overlay {
    pub fn presentation(&self) -> Presentation {
        Presentation {
            suppress_animation: matches!(self, Overlay::Working { .. }),
        }
    }
}

/// Rendering collaborator driven by the navigator.
///
/// Every call happens inside the navigator's critical section, one at a
/// time. A call returns once the transition it requested has completed.
#[async_trait]
pub trait Presenter: Send + 'static {
    type Widget: Widget;

    /// Replaces the stacked container contents, bottom to top.
    async fn set_stack(&mut self, stack: &[&Entry<Self::Widget>], animated: bool);

    async fn present(&mut self, overlay: &Overlay, presentation: Presentation);

    async fn dismiss(&mut self, overlay: &Overlay, presentation: Presentation);

    /// An entry that stays in place was re-rendered.
    fn page_updated(&mut self, _entry: &Entry<Self::Widget>) {}
}
