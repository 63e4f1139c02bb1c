use std::fmt;

use gdoc_core::{ContentId, RemoteId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutput {
    pub bytes: Vec<u8>,
    pub metadata: FetchMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchMetadata {
    pub original_url: String,
    pub final_url: String,
    pub redirect_count: usize,
    pub content_type: Option<String>,
    pub content_disposition: Option<String>,
    pub byte_len: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    UnsupportedContentType { content_type: String },
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::UnsupportedContentType { content_type } => {
                write!(f, "unsupported content type {content_type}")
            }
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

/// A source element that produced no output node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedElement {
    /// Position in the source body.
    pub index: usize,
    pub kind: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Unsupported,
    AssetFailed { message: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Unsupported => write!(f, "import for this element not implemented"),
            SkipReason::AssetFailed { message } => write!(f, "image skipped: {message}"),
        }
    }
}

/// Progress notices emitted during one import run, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportEvent {
    ClientReady,
    DocumentLoaded {
        document_id: String,
        elements: usize,
    },
    ElementSkipped(SkippedElement),
    AssetCreated {
        remote_id: RemoteId,
        content_id: ContentId,
    },
    AssetReused {
        remote_id: RemoteId,
        content_id: ContentId,
    },
    ContentCreated {
        remote_id: RemoteId,
        content_id: ContentId,
    },
    ContentUpdated {
        remote_id: RemoteId,
        content_id: ContentId,
        version: u32,
    },
    Done,
}

impl fmt::Display for ImportEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportEvent::ClientReady => write!(f, "Document API client ok"),
            ImportEvent::DocumentLoaded {
                document_id,
                elements,
            } => write!(f, "Loaded document {document_id} ({elements} elements)"),
            ImportEvent::ElementSkipped(skipped) => write!(
                f,
                "Element #{} ({}) skipped: {}",
                skipped.index, skipped.kind, skipped.reason
            ),
            ImportEvent::AssetCreated {
                remote_id,
                content_id,
            } => write!(f, "Image object {content_id} created ({remote_id})"),
            ImportEvent::AssetReused {
                remote_id,
                content_id,
            } => write!(f, "Image object {content_id} reused ({remote_id})"),
            ImportEvent::ContentCreated {
                remote_id,
                content_id,
            } => write!(f, "Content object {content_id} created ({remote_id})"),
            ImportEvent::ContentUpdated {
                remote_id,
                content_id,
                version,
            } => write!(
                f,
                "Content object {content_id} updated to version {version} ({remote_id})"
            ),
            ImportEvent::Done => write!(f, "Done."),
        }
    }
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: ImportEvent);
}

/// Discards every event.
impl ProgressSink for () {
    fn emit(&self, _event: ImportEvent) {}
}
