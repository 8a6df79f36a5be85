mod action;
mod connection_mode;
mod ids;
mod json_item;
mod modal;
mod page;
mod var;
mod widget;

pub use self::action::ActionSpec;
pub use self::connection_mode::ConnectionMode;
pub use self::ids::PageKey;
pub use self::json_item::JsonItem;
pub use self::modal::{ModalButtonSpec, ModalKind, ModalSpec};
pub use self::page::{NavPageSpec, PageKind, PageSpec, PlainPageSpec, StartSpec};
pub use self::var::Var;
pub use self::widget::WidgetSpec;

#[cfg(test)]
#[path = "../tests/model/spec_tests.rs"]
mod tests;
