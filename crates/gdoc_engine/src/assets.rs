use std::collections::HashMap;
use std::sync::Arc;

use gdoc_core::RemoteId;
use import_logging::{import_debug, import_info, import_warn};
use percent_encoding::percent_decode_str;
use thiserror::Error;

use crate::fetch::Fetcher;
use crate::repository::{
    ContentCreate, ContentObject, ContentRepository, FieldValue, Fields, Lookup, RepositoryError,
};
use crate::FetchError;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("inline object {0} is not part of the document")]
    MissingInlineObject(String),
    #[error("inline object {0} has no content uri")]
    MissingContentUri(String),
    #[error("image download failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("image response from {0} has no usable content-disposition filename")]
    MissingContentDisposition(String),
    #[error("image object could not be stored: {0}")]
    Repository(#[from] RepositoryError),
}

/// Where and how image objects are created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetTarget {
    pub content_type: String,
    pub parent_location: u64,
    pub language_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// Created and published by this call.
    Created(ContentObject),
    /// Already present in the repository or resolved earlier in this run.
    Existing(ContentObject),
}

impl Resolved {
    pub fn object(&self) -> &ContentObject {
        match self {
            Resolved::Created(object) | Resolved::Existing(object) => object,
        }
    }
}

/// Resolves inline objects to stored image objects, creating each at most once.
pub struct AssetResolver {
    repository: Arc<dyn ContentRepository>,
    fetcher: Arc<dyn Fetcher>,
    target: AssetTarget,
    resolved: HashMap<String, ContentObject>,
}

impl AssetResolver {
    pub fn new(
        repository: Arc<dyn ContentRepository>,
        fetcher: Arc<dyn Fetcher>,
        target: AssetTarget,
    ) -> Self {
        Self {
            repository,
            fetcher,
            target,
            resolved: HashMap::new(),
        }
    }

    pub async fn resolve(
        &mut self,
        inline_object_id: &str,
        content_uri: &str,
    ) -> Result<Resolved, AssetError> {
        if let Some(object) = self.resolved.get(inline_object_id) {
            return Ok(Resolved::Existing(object.clone()));
        }

        let remote_id = RemoteId::for_image(inline_object_id);
        if let Lookup::Found(object) = self.repository.load_by_remote_id(&remote_id).await? {
            import_debug!("Image {} already stored as {}", remote_id, object.id);
            self.resolved
                .insert(inline_object_id.to_string(), object.clone());
            return Ok(Resolved::Existing(object));
        }

        let output = self.fetcher.fetch(content_uri).await?;
        let filename = output
            .metadata
            .content_disposition
            .as_deref()
            .and_then(parse_content_disposition)
            .ok_or_else(|| AssetError::MissingContentDisposition(content_uri.to_string()))?;

        let mut fields = Fields::new();
        fields.insert(
            "name".to_string(),
            FieldValue::Text(format!("Google Docs image ({inline_object_id})")),
        );
        fields.insert(
            "image".to_string(),
            FieldValue::Image {
                filename,
                data: output.bytes,
            },
        );

        let draft = self
            .repository
            .create_draft(ContentCreate {
                content_type: self.target.content_type.clone(),
                remote_id: remote_id.clone(),
                parent_location: self.target.parent_location,
                language_code: self.target.language_code.clone(),
                fields,
            })
            .await?;
        let object = match self.repository.publish(&draft).await {
            Ok(object) => object,
            Err(err) => {
                if let Err(discard_err) = self.repository.discard_draft(&draft).await {
                    import_warn!("Could not discard draft {}: {}", draft.id, discard_err);
                }
                return Err(err.into());
            }
        };

        import_info!("Image {} created as {}", remote_id, object.id);
        self.resolved
            .insert(inline_object_id.to_string(), object.clone());
        Ok(Resolved::Created(object))
    }
}

/// Extracts the filename from a content-disposition header value.
///
/// Reads the `filename` parameter, quoted or bare, and falls back to the
/// RFC 5987 `filename*` form when no plain name is given. Path components
/// are stripped. Returns `None` when no non-empty name is present.
pub fn parse_content_disposition(value: &str) -> Option<String> {
    let mut plain = None;
    let mut extended = None;
    for part in value.split(';') {
        let Some((key, val)) = part.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let val = val.trim();
        if key.eq_ignore_ascii_case("filename") && plain.is_none() {
            plain = Some(unquote(val).to_string());
        } else if key.eq_ignore_ascii_case("filename*") && extended.is_none() {
            extended = decode_extended_value(unquote(val));
        }
    }

    let raw = plain.filter(|name| !name.trim().is_empty()).or(extended)?;
    let name = raw.rsplit(&['/', '\\'][..]).next().unwrap_or(&raw).trim();
    if name.is_empty() || name == "." || name == ".." {
        None
    } else {
        Some(name.to_string())
    }
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Decodes `charset'language'percent-encoded`; only UTF-8 and ISO-8859-1 are known.
fn decode_extended_value(value: &str) -> Option<String> {
    let mut parts = value.splitn(3, '\'');
    let charset = parts.next()?;
    let _language = parts.next()?;
    let encoded = parts.next()?;
    let bytes: Vec<u8> = percent_decode_str(encoded).collect();
    if charset.eq_ignore_ascii_case("utf-8") {
        String::from_utf8(bytes).ok()
    } else if charset.eq_ignore_ascii_case("iso-8859-1") {
        Some(bytes.iter().map(|&b| char::from(b)).collect())
    } else {
        None
    }
}
