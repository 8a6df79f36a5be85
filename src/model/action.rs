use std::fmt;
use std::str::FromStr;

use crate::error::ApplinError;
use crate::model::PageKey;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ActionSpec {
    Nothing,
    Poll,
    Pop,
    Push(PageKey),
    ReplaceAll(PageKey),
    Rpc(String),
}

impl FromStr for ActionSpec {
    type Err = ApplinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, arg) = match s.split_once(':') {
            Some((name, arg)) => (name, Some(arg)),
            None => (s, None),
        };
        let need_arg = || {
            arg.filter(|a| !a.is_empty())
                .ok_or_else(|| ApplinError::Deserialize(format!("action '{}' needs an argument", s)))
        };
        match name {
            "nothing" => Ok(ActionSpec::Nothing),
            "poll" => Ok(ActionSpec::Poll),
            "pop" => Ok(ActionSpec::Pop),
            "push" => Ok(ActionSpec::Push(PageKey::new(need_arg()?))),
            "replace-all" => Ok(ActionSpec::ReplaceAll(PageKey::new(need_arg()?))),
            "rpc" => Ok(ActionSpec::Rpc(need_arg()?.to_string())),
            _ => Err(ApplinError::Deserialize(format!("unknown action: {:?}", s))),
        }
    }
}

impl fmt::Display for ActionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionSpec::Nothing => f.write_str("nothing"),
            ActionSpec::Poll => f.write_str("poll"),
            ActionSpec::Pop => f.write_str("pop"),
            ActionSpec::Push(key) => write!(f, "push:{}", key),
            ActionSpec::ReplaceAll(key) => write!(f, "replace-all:{}", key),
            ActionSpec::Rpc(path) => write!(f, "rpc:{}", path),
        }
    }
}

pub(crate) fn parse_actions(raw: Option<&[String]>) -> Result<Vec<ActionSpec>, ApplinError> {
    raw.unwrap_or_default()
        .iter()
        .map(|s| s.parse())
        .collect()
}

pub(crate) fn encode_actions(actions: &[ActionSpec]) -> Option<Vec<String>> {
    if actions.is_empty() {
        None
    } else {
        Some(actions.iter().map(|a| a.to_string()).collect())
    }
}
