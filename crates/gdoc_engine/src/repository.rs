use std::collections::BTreeMap;
use std::io;

use gdoc_core::{ContentId, RemoteId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::persist::PersistError;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("content object not found: {0}")]
    NotFound(String),
    #[error("remote id already in use: {0}")]
    DuplicateRemoteId(RemoteId),
    #[error("draft {0} is not open")]
    DraftNotOpen(DraftId),
    #[error("unknown content type: {0}")]
    UnknownContentType(String),
    #[error("storage failed: {0}")]
    Storage(String),
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    /// Serialized rich-text XML.
    RichText(String),
    Image { filename: String, data: Vec<u8> },
}

pub type Fields = BTreeMap<String, FieldValue>;

/// Published revision of a stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentObject {
    pub id: ContentId,
    pub remote_id: RemoteId,
    pub content_type: String,
    pub parent_location: u64,
    pub language_code: String,
    pub version: u32,
    pub fields: Fields,
}

impl ContentObject {
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DraftId(pub u64);

impl std::fmt::Display for DraftId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Staged revision, invisible to readers until published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub id: DraftId,
    /// `None` until the first publish of a new object assigns an id.
    pub content_id: Option<ContentId>,
    pub remote_id: RemoteId,
    pub content_type: String,
    pub parent_location: u64,
    pub language_code: String,
    pub version: u32,
    pub fields: Fields,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentCreate {
    pub content_type: String,
    pub remote_id: RemoteId,
    pub parent_location: u64,
    pub language_code: String,
    pub fields: Fields,
}

/// Result of a remote id lookup; absence is an expected outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(ContentObject),
    NotFound,
}

/// Target repository with draft/publish revisions.
///
/// Nothing a draft carries becomes visible through [`load_by_remote_id`]
/// until [`publish`] succeeds.
///
/// [`load_by_remote_id`]: ContentRepository::load_by_remote_id
/// [`publish`]: ContentRepository::publish
#[async_trait::async_trait]
pub trait ContentRepository: Send + Sync {
    async fn load_by_remote_id(&self, remote_id: &RemoteId) -> Result<Lookup, RepositoryError>;

    /// Opens a draft for a new object.
    async fn create_draft(&self, create: ContentCreate) -> Result<Draft, RepositoryError>;

    /// Opens a draft for the next version of a published object.
    async fn create_draft_from(&self, object: &ContentObject) -> Result<Draft, RepositoryError>;

    /// Replaces the given fields of an open draft, keeping the others.
    async fn update_draft(&self, draft: &Draft, fields: Fields) -> Result<Draft, RepositoryError>;

    async fn publish(&self, draft: &Draft) -> Result<ContentObject, RepositoryError>;

    async fn discard_draft(&self, draft: &Draft) -> Result<(), RepositoryError>;
}
