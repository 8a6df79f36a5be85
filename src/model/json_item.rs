//! Raw wire node. Every typed spec decodes from and encodes back to this shape.

use serde::{Deserialize, Serialize};

use crate::error::ApplinError;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonItem {
    #[serde(rename = "type")]
    pub typ: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<Box<JsonItem>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_bool: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_seconds: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<Box<JsonItem>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub var_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widget: Option<Box<JsonItem>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widgets: Option<Vec<JsonItem>>,
}

impl JsonItem {
    pub fn new(typ: &str) -> Self {
        Self {
            typ: typ.to_string(),
            ..Self::default()
        }
    }

    fn missing(&self, field: &str) -> ApplinError {
        ApplinError::Deserialize(format!("{}.{} is missing", self.typ, field))
    }

    pub fn require_title(&self) -> Result<String, ApplinError> {
        self.title.clone().ok_or_else(|| self.missing("title"))
    }

    pub fn require_text(&self) -> Result<String, ApplinError> {
        self.text.clone().ok_or_else(|| self.missing("text"))
    }

    pub fn require_url(&self) -> Result<String, ApplinError> {
        self.url.clone().ok_or_else(|| self.missing("url"))
    }

    pub fn require_var_name(&self) -> Result<String, ApplinError> {
        match self.var_name.as_deref() {
            Some(name) if !name.is_empty() => Ok(name.to_string()),
            Some(_) => Err(ApplinError::Deserialize(format!(
                "{}.var_name is empty",
                self.typ
            ))),
            None => Err(self.missing("var_name")),
        }
    }

    pub fn require_widget(&self) -> Result<&JsonItem, ApplinError> {
        self.widget.as_deref().ok_or_else(|| self.missing("widget"))
    }

    pub fn require_widgets(&self) -> Result<&[JsonItem], ApplinError> {
        self.widgets.as_deref().ok_or_else(|| self.missing("widgets"))
    }
}
