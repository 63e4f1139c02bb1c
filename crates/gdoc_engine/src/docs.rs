use std::sync::Arc;

use gdoc_core::{DecodeError, SourceDocument};
use thiserror::Error;
use url::Url;

use crate::fetch::Fetcher;
use crate::{FailureKind, FetchError};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("not authorized to read document: {0}")]
    Auth(String),
    #[error("document fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("document could not be decoded: {0}")]
    Decode(#[from] DecodeError),
}

/// Read access to source documents.
#[async_trait::async_trait]
pub trait DocumentSource: Send + Sync {
    async fn get(&self, document_id: &str) -> Result<SourceDocument, SourceError>;
}

/// Client for the `documents.get` endpoint of the Docs REST API.
///
/// Credentials are attached by the supplied [`Fetcher`].
pub struct GoogleDocsClient {
    fetcher: Arc<dyn Fetcher>,
    base_url: Url,
}

impl GoogleDocsClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://docs.googleapis.com/";

    pub fn new(fetcher: Arc<dyn Fetcher>, base_url: &str) -> Result<Self, SourceError> {
        let base_url = Url::parse(base_url)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(FetchError::new(FailureKind::InvalidUrl, "not a base url").into());
        }
        Ok(Self { fetcher, base_url })
    }

    pub fn document_url(&self, document_id: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["v1", "documents", document_id]);
        }
        url
    }
}

#[async_trait::async_trait]
impl DocumentSource for GoogleDocsClient {
    async fn get(&self, document_id: &str) -> Result<SourceDocument, SourceError> {
        let url = self.document_url(document_id);
        let output = self.fetcher.fetch(url.as_str()).await.map_err(|err| {
            match err.kind {
                FailureKind::HttpStatus(401) | FailureKind::HttpStatus(403) => {
                    SourceError::Auth(err.to_string())
                }
                _ => SourceError::Fetch(err),
            }
        })?;

        let mut document = SourceDocument::from_json(&output.bytes)?;
        if document.id.is_empty() {
            document.id = document_id.to_string();
        }
        Ok(document)
    }
}
