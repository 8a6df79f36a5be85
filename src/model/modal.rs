use crate::error::ApplinError;
use crate::model::action::{encode_actions, parse_actions};
use crate::model::{ActionSpec, ConnectionMode, JsonItem};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModalKind {
    Alert,
    Drawer,
}

impl ModalKind {
    pub fn typ(self) -> &'static str {
        match self {
            ModalKind::Alert => ModalSpec::ALERT,
            ModalKind::Drawer => ModalSpec::DRAWER,
        }
    }
}

/// One button of a modal: a label and what tapping it does.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ModalButtonSpec {
    pub text: String,
    pub actions: Vec<ActionSpec>,
}

impl ModalButtonSpec {
    pub const TYP: &'static str = "modal-button";

    pub fn new(text: impl Into<String>, actions: Vec<ActionSpec>) -> Self {
        Self {
            text: text.into(),
            actions,
        }
    }

    pub fn from_item(item: &JsonItem) -> Result<Self, ApplinError> {
        Ok(Self {
            text: item.require_text()?,
            actions: parse_actions(item.actions.as_deref())?,
        })
    }

    pub fn to_item(&self) -> JsonItem {
        let mut item = JsonItem::new(Self::TYP);
        item.text = Some(self.text.clone());
        item.actions = encode_actions(&self.actions);
        item
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ModalSpec {
    pub kind: ModalKind,
    pub connection_mode: ConnectionMode,
    pub title: String,
    pub text: Option<String>,
    pub widgets: Vec<ModalButtonSpec>,
}

impl ModalSpec {
    pub const ALERT: &'static str = "alert-modal";
    pub const DRAWER: &'static str = "drawer-modal";

    pub fn new(
        kind: ModalKind,
        title: impl Into<String>,
        text: Option<String>,
        widgets: Vec<ModalButtonSpec>,
    ) -> Self {
        Self {
            kind,
            connection_mode: ConnectionMode::Disconnected,
            title: title.into(),
            text,
            widgets,
        }
    }

    pub fn from_item(kind: ModalKind, item: &JsonItem) -> Result<Self, ApplinError> {
        let typ = kind.typ();
        let widgets = item
            .require_widgets()?
            .iter()
            .map(|w| {
                if w.typ == ModalButtonSpec::TYP {
                    ModalButtonSpec::from_item(w)
                } else {
                    Err(ApplinError::Deserialize(format!(
                        "{}.widgets contains entry that is not {}: {}",
                        typ,
                        ModalButtonSpec::TYP,
                        w.typ
                    )))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            kind,
            connection_mode: ConnectionMode::new(item.stream, item.poll_seconds),
            title: item.require_title()?,
            text: item.text.clone(),
            widgets,
        })
    }

    pub fn to_item(&self) -> JsonItem {
        let mut item = JsonItem::new(self.kind.typ());
        item.poll_seconds = self.connection_mode.poll_seconds();
        item.stream = self.connection_mode.stream();
        item.title = Some(self.title.clone());
        item.text = self.text.clone();
        item.widgets = Some(self.widgets.iter().map(ModalButtonSpec::to_item).collect());
        item
    }
}
