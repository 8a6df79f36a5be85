use serde::{Deserialize, Serialize};

/// Current value of a page variable, posted as a bare JSON value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Var {
    Bool(bool),
    String(String),
}

impl Var {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Var::Bool(b) => Some(*b),
            Var::String(_) => None,
        }
    }
}
