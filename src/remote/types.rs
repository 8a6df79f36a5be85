//! Wire envelopes and results of server exchanges.

use crate::model::{JsonItem, PageSpec};

use super::CacheMeta;

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub(super) struct ResponseEnvelope {
    pub(super) page: JsonItem,
}

#[derive(Debug, serde::Deserialize)]
pub(super) struct ErrorEnvelope {
    pub(super) message: String,
}

/// A decoded page plus the caching headers it arrived with.
#[derive(Clone, Debug, PartialEq)]
pub struct PageUpdate {
    pub spec: PageSpec,
    pub meta: CacheMeta,
}

/// Raw bytes for a PUT upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadBody {
    pub data: Vec<u8>,
    pub content_type: String,
}

impl UploadBody {
    pub fn new(data: impl Into<Vec<u8>>, content_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            content_type: content_type.into(),
        }
    }
}
