use std::fmt;

use crate::error::ApplinError;
use crate::model::action::{encode_actions, parse_actions};
use crate::model::{ActionSpec, ConnectionMode, JsonItem, ModalKind, ModalSpec, Var, WidgetSpec};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PageKind {
    PlainPage,
    NavPage,
    Modal,
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PageKind::PlainPage => "plain-page",
            PageKind::NavPage => "nav-page",
            PageKind::Modal => "modal",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PlainPageSpec {
    pub connection_mode: ConnectionMode,
    pub title: Option<String>,
    pub widget: WidgetSpec,
}

impl PlainPageSpec {
    pub const TYP: &'static str = "plain-page";

    pub fn new(title: Option<String>, widget: WidgetSpec) -> Self {
        Self {
            connection_mode: ConnectionMode::Disconnected,
            title,
            widget,
        }
    }

    pub fn from_item(item: &JsonItem) -> Result<Self, ApplinError> {
        Ok(Self {
            connection_mode: ConnectionMode::new(item.stream, item.poll_seconds),
            title: item.title.clone(),
            widget: WidgetSpec::from_item(item.require_widget()?)?,
        })
    }

    pub fn to_item(&self) -> JsonItem {
        let mut item = JsonItem::new(Self::TYP);
        item.poll_seconds = self.connection_mode.poll_seconds();
        item.stream = self.connection_mode.stream();
        item.title = self.title.clone();
        item.widget = Some(Box::new(self.widget.to_item()));
        item
    }
}

/// What a nav page shows in its leading (back) slot.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum StartSpec {
    /// Runs the actions. With no actions it renders a disabled "Back" label.
    CustomBack(Vec<ActionSpec>),
    #[default]
    DefaultBack,
    Suppressed,
}

impl StartSpec {
    pub const BACK_BUTTON: &'static str = "back-button";
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NavPageSpec {
    pub connection_mode: ConnectionMode,
    pub title: String,
    pub start: StartSpec,
    pub end: Option<WidgetSpec>,
    pub widget: WidgetSpec,
}

impl NavPageSpec {
    pub const TYP: &'static str = "nav-page";

    pub fn new(title: impl Into<String>, widget: WidgetSpec) -> Self {
        Self {
            connection_mode: ConnectionMode::Disconnected,
            title: title.into(),
            start: StartSpec::DefaultBack,
            end: None,
            widget,
        }
    }

    pub fn from_item(item: &JsonItem) -> Result<Self, ApplinError> {
        let start = match item.start.as_deref() {
            None => StartSpec::DefaultBack,
            Some(s) if s.typ == StartSpec::BACK_BUTTON => {
                StartSpec::CustomBack(parse_actions(s.actions.as_deref())?)
            }
            Some(s) if s.typ == WidgetSpec::EMPTY => StartSpec::Suppressed,
            Some(s) => {
                return Err(ApplinError::Deserialize(format!(
                    "bad {}.start: {}",
                    item.typ, s.typ
                )));
            }
        };
        let end = match item.end.as_deref() {
            None => None,
            Some(e) => match WidgetSpec::from_item(e)? {
                WidgetSpec::Column { .. } | WidgetSpec::Scroll { .. } => {
                    return Err(ApplinError::Deserialize(format!(
                        "bad {}.end: {}",
                        item.typ, e.typ
                    )));
                }
                widget => Some(widget),
            },
        };
        Ok(Self {
            connection_mode: ConnectionMode::new(item.stream, item.poll_seconds),
            title: item.require_title()?,
            start,
            end,
            widget: WidgetSpec::from_item(item.require_widget()?)?,
        })
    }

    pub fn to_item(&self) -> JsonItem {
        let mut item = JsonItem::new(Self::TYP);
        item.poll_seconds = self.connection_mode.poll_seconds();
        item.stream = self.connection_mode.stream();
        item.title = Some(self.title.clone());
        item.start = match &self.start {
            StartSpec::CustomBack(actions) => {
                let mut back = JsonItem::new(StartSpec::BACK_BUTTON);
                back.actions = encode_actions(actions);
                Some(Box::new(back))
            }
            StartSpec::DefaultBack => None,
            StartSpec::Suppressed => Some(Box::new(JsonItem::new(WidgetSpec::EMPTY))),
        };
        item.end = self.end.as_ref().map(|e| Box::new(e.to_item()));
        item.widget = Some(Box::new(self.widget.to_item()));
        item
    }
}

/// A page or modal as described by the server.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PageSpec {
    PlainPage(PlainPageSpec),
    NavPage(NavPageSpec),
    Modal(ModalSpec),
}

impl PageSpec {
    pub fn from_item(item: &JsonItem) -> Result<Self, ApplinError> {
        match item.typ.as_str() {
            PlainPageSpec::TYP => Ok(PageSpec::PlainPage(PlainPageSpec::from_item(item)?)),
            NavPageSpec::TYP => Ok(PageSpec::NavPage(NavPageSpec::from_item(item)?)),
            ModalSpec::ALERT => Ok(PageSpec::Modal(ModalSpec::from_item(ModalKind::Alert, item)?)),
            ModalSpec::DRAWER => Ok(PageSpec::Modal(ModalSpec::from_item(
                ModalKind::Drawer,
                item,
            )?)),
            other => Err(ApplinError::Deserialize(format!(
                "unknown page type: {:?}",
                other
            ))),
        }
    }

    pub fn to_item(&self) -> JsonItem {
        match self {
            PageSpec::PlainPage(spec) => spec.to_item(),
            PageSpec::NavPage(spec) => spec.to_item(),
            PageSpec::Modal(spec) => spec.to_item(),
        }
    }

    pub fn kind(&self) -> PageKind {
        match self {
            PageSpec::PlainPage(_) => PageKind::PlainPage,
            PageSpec::NavPage(_) => PageKind::NavPage,
            PageSpec::Modal(_) => PageKind::Modal,
        }
    }

    pub fn connection_mode(&self) -> ConnectionMode {
        match self {
            PageSpec::PlainPage(spec) => spec.connection_mode,
            PageSpec::NavPage(spec) => spec.connection_mode,
            PageSpec::Modal(spec) => spec.connection_mode,
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            PageSpec::PlainPage(spec) => spec.title.as_deref(),
            PageSpec::NavPage(spec) => Some(&spec.title),
            PageSpec::Modal(spec) => Some(&spec.title),
        }
    }

    pub fn vars(&self) -> Vec<(String, Var)> {
        match self {
            PageSpec::PlainPage(spec) => spec.widget.vars(),
            PageSpec::NavPage(spec) => {
                let mut vars = spec.widget.vars();
                if let Some(end) = &spec.end {
                    vars.extend(end.vars());
                }
                vars
            }
            PageSpec::Modal(_) => Vec::new(),
        }
    }
}

impl From<PlainPageSpec> for PageSpec {
    fn from(spec: PlainPageSpec) -> Self {
        PageSpec::PlainPage(spec)
    }
}

impl From<NavPageSpec> for PageSpec {
    fn from(spec: NavPageSpec) -> Self {
        PageSpec::NavPage(spec)
    }
}

impl From<ModalSpec> for PageSpec {
    fn from(spec: ModalSpec) -> Self {
        PageSpec::Modal(spec)
    }
}
