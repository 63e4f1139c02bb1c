use std::fmt;

use serde::{Deserialize, Serialize};

const DOCUMENT_PREFIX: &str = "gdoc-";
const IMAGE_PREFIX: &str = "gdoc-image-";

/// Numeric id assigned to a content object by the target repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(pub u64);

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Deterministic cross-system identifier of an imported object.
///
/// Derived from source identifiers only, never from content, so repeated
/// imports of the same source resolve to the same target object.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteId(String);

impl RemoteId {
    pub fn for_document(document_id: &str) -> Self {
        Self(format!("{DOCUMENT_PREFIX}{document_id}"))
    }

    pub fn for_image(inline_object_id: &str) -> Self {
        Self(format!("{IMAGE_PREFIX}{inline_object_id}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
