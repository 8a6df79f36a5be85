use crate::error::ApplinError;
use crate::model::action::{encode_actions, parse_actions};
use crate::model::{ActionSpec, JsonItem, Var};

/// Leaf and container widgets that can appear in a page's widget tree.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum WidgetSpec {
    Empty,
    Text {
        text: String,
    },
    Button {
        text: String,
        actions: Vec<ActionSpec>,
    },
    Checkbox {
        var_name: String,
        text: Option<String>,
        initial_bool: bool,
        actions: Vec<ActionSpec>,
    },
    DetailCell {
        text: String,
        actions: Vec<ActionSpec>,
        photo_url: Option<String>,
    },
    Image {
        url: String,
    },
    Column {
        widgets: Vec<WidgetSpec>,
    },
    Scroll {
        widget: Box<WidgetSpec>,
    },
}

impl WidgetSpec {
    pub const EMPTY: &'static str = "empty";
    pub const TEXT: &'static str = "text";
    pub const BUTTON: &'static str = "button";
    pub const CHECKBOX: &'static str = "checkbox";
    pub const DETAIL_CELL: &'static str = "detail-cell";
    pub const IMAGE: &'static str = "image";
    pub const COLUMN: &'static str = "column";
    pub const SCROLL: &'static str = "scroll";

    pub fn typ(&self) -> &'static str {
        match self {
            WidgetSpec::Empty => Self::EMPTY,
            WidgetSpec::Text { .. } => Self::TEXT,
            WidgetSpec::Button { .. } => Self::BUTTON,
            WidgetSpec::Checkbox { .. } => Self::CHECKBOX,
            WidgetSpec::DetailCell { .. } => Self::DETAIL_CELL,
            WidgetSpec::Image { .. } => Self::IMAGE,
            WidgetSpec::Column { .. } => Self::COLUMN,
            WidgetSpec::Scroll { .. } => Self::SCROLL,
        }
    }

    pub fn from_item(item: &JsonItem) -> Result<Self, ApplinError> {
        let spec = match item.typ.as_str() {
            Self::EMPTY => WidgetSpec::Empty,
            Self::TEXT => WidgetSpec::Text {
                text: item.require_text()?,
            },
            Self::BUTTON => WidgetSpec::Button {
                text: item.require_text()?,
                actions: parse_actions(item.actions.as_deref())?,
            },
            Self::CHECKBOX => WidgetSpec::Checkbox {
                var_name: item.require_var_name()?,
                text: item.text.clone(),
                initial_bool: item.initial_bool.unwrap_or(false),
                actions: parse_actions(item.actions.as_deref())?,
            },
            Self::DETAIL_CELL => WidgetSpec::DetailCell {
                text: item.require_text()?,
                actions: parse_actions(item.actions.as_deref())?,
                photo_url: item.photo_url.clone(),
            },
            Self::IMAGE => WidgetSpec::Image {
                url: item.require_url()?,
            },
            Self::COLUMN => WidgetSpec::Column {
                widgets: item
                    .widgets
                    .as_deref()
                    .unwrap_or_default()
                    .iter()
                    .map(WidgetSpec::from_item)
                    .collect::<Result<_, _>>()?,
            },
            Self::SCROLL => WidgetSpec::Scroll {
                widget: Box::new(WidgetSpec::from_item(item.require_widget()?)?),
            },
            other => {
                return Err(ApplinError::Deserialize(format!(
                    "unknown widget type: {:?}",
                    other
                )));
            }
        };
        Ok(spec)
    }

    pub fn to_item(&self) -> JsonItem {
        let mut item = JsonItem::new(self.typ());
        match self {
            WidgetSpec::Empty => {}
            WidgetSpec::Text { text } => {
                item.text = Some(text.clone());
            }
            WidgetSpec::Button { text, actions } => {
                item.text = Some(text.clone());
                item.actions = encode_actions(actions);
            }
            WidgetSpec::Checkbox {
                var_name,
                text,
                initial_bool,
                actions,
            } => {
                item.var_name = Some(var_name.clone());
                item.text = text.clone();
                item.initial_bool = initial_bool.then_some(true);
                item.actions = encode_actions(actions);
            }
            WidgetSpec::DetailCell {
                text,
                actions,
                photo_url,
            } => {
                item.text = Some(text.clone());
                item.actions = encode_actions(actions);
                item.photo_url = photo_url.clone();
            }
            WidgetSpec::Image { url } => {
                item.url = Some(url.clone());
            }
            WidgetSpec::Column { widgets } => {
                item.widgets = Some(widgets.iter().map(WidgetSpec::to_item).collect());
            }
            WidgetSpec::Scroll { widget } => {
                item.widget = Some(Box::new(widget.to_item()));
            }
        }
        item
    }

    /// Declared identities a render instance for this widget may be found under.
    pub fn keys(&self) -> Vec<String> {
        match self {
            WidgetSpec::Checkbox { var_name, .. } => vec![format!("checkbox:{}", var_name)],
            WidgetSpec::Button { text, .. } => vec![format!("button:{}", text)],
            WidgetSpec::DetailCell { text, .. } => vec![format!("detail-cell:{}", text)],
            WidgetSpec::Image { url } => vec![format!("image:{}", url)],
            WidgetSpec::Text { text } => vec![format!("text:{}", text)],
            WidgetSpec::Empty | WidgetSpec::Column { .. } | WidgetSpec::Scroll { .. } => {
                Vec::new()
            }
        }
    }

    pub fn subs(&self) -> Vec<&WidgetSpec> {
        match self {
            WidgetSpec::Column { widgets } => widgets.iter().collect(),
            WidgetSpec::Scroll { widget } => vec![widget.as_ref()],
            _ => Vec::new(),
        }
    }

    pub fn actions(&self) -> &[ActionSpec] {
        match self {
            WidgetSpec::Button { actions, .. }
            | WidgetSpec::Checkbox { actions, .. }
            | WidgetSpec::DetailCell { actions, .. } => actions,
            _ => &[],
        }
    }

    /// Variables bound anywhere in this subtree, with their initial values.
    pub fn vars(&self) -> Vec<(String, Var)> {
        let mut out = Vec::new();
        self.collect_vars(&mut out);
        out
    }

    fn collect_vars(&self, out: &mut Vec<(String, Var)>) {
        if let WidgetSpec::Checkbox {
            var_name,
            initial_bool,
            ..
        } = self
        {
            out.push((var_name.clone(), Var::Bool(*initial_bool)));
        }
        for sub in self.subs() {
            sub.collect_vars(out);
        }
    }
}
