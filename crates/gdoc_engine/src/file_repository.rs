use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{SecondsFormat, Utc};
use gdoc_core::{ContentId, RemoteId};
use import_logging::{import_debug, import_warn};
use serde::{Deserialize, Serialize};

use crate::filename::object_file_stem;
use crate::persist::{ensure_repository_dir, AtomicFileWriter};
use crate::repository::{
    ContentCreate, ContentObject, ContentRepository, Draft, DraftId, FieldValue, Fields, Lookup,
    RepositoryError,
};

pub type Clock = Arc<dyn Fn() -> String + Send + Sync>;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredObject {
    id: ContentId,
    remote_id: RemoteId,
    content_type: String,
    parent_location: u64,
    /// Oldest first; the last entry is the published one.
    versions: Vec<StoredVersion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredVersion {
    version: u32,
    language_code: String,
    published_utc: String,
    fields: BTreeMap<String, StoredField>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum StoredField {
    Text { value: String },
    RichText { xml: String },
    Image { filename: String, blob: String },
}

#[derive(Debug, Default)]
struct DraftTable {
    open: BTreeMap<DraftId, Draft>,
    next_id: u64,
}

/// Repository stored as one JSON file per object in a directory.
///
/// Image binaries live next to the object file, one blob per version. The
/// object file is replaced atomically on publish, so a failed publish leaves
/// the previously published version in place.
pub struct FileRepository {
    dir: PathBuf,
    content_types: Option<BTreeSet<String>>,
    drafts: Mutex<DraftTable>,
    clock: Clock,
}

impl FileRepository {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, RepositoryError> {
        let dir = dir.into();
        ensure_repository_dir(&dir)?;
        Ok(Self {
            dir,
            content_types: None,
            drafts: Mutex::new(DraftTable {
                open: BTreeMap::new(),
                next_id: 1,
            }),
            clock: Arc::new(|| Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
        })
    }

    /// Restricts accepted content types; others fail at draft creation.
    pub fn with_content_types<I, S>(mut self, content_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.content_types = Some(content_types.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Published version numbers of an object, oldest first.
    pub fn versions(&self, remote_id: &RemoteId) -> Result<Vec<u32>, RepositoryError> {
        Ok(self
            .read_stored(remote_id)?
            .map(|stored| stored.versions.iter().map(|v| v.version).collect())
            .unwrap_or_default())
    }

    /// Publish timestamp of the current version.
    pub fn published_utc(&self, remote_id: &RemoteId) -> Result<Option<String>, RepositoryError> {
        Ok(self
            .read_stored(remote_id)?
            .and_then(|stored| stored.versions.last().map(|v| v.published_utc.clone())))
    }

    fn object_path(&self, remote_id: &RemoteId) -> PathBuf {
        self.dir
            .join(format!("{}.json", object_file_stem(remote_id)))
    }

    fn read_stored(&self, remote_id: &RemoteId) -> Result<Option<StoredObject>, RepositoryError> {
        let path = self.object_path(remote_id);
        let content = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let stored: StoredObject = serde_json::from_slice(&content)?;
        if stored.remote_id != *remote_id {
            return Err(RepositoryError::Storage(format!(
                "{} holds {} instead of {}",
                path.display(),
                stored.remote_id,
                remote_id
            )));
        }
        Ok(Some(stored))
    }

    fn to_object(&self, stored: &StoredObject) -> Result<ContentObject, RepositoryError> {
        let current = stored.versions.last().ok_or_else(|| {
            RepositoryError::Storage(format!("{} has no published version", stored.remote_id))
        })?;
        let mut fields = Fields::new();
        for (name, field) in &current.fields {
            let value = match field {
                StoredField::Text { value } => FieldValue::Text(value.clone()),
                StoredField::RichText { xml } => FieldValue::RichText(xml.clone()),
                StoredField::Image { filename, blob } => FieldValue::Image {
                    filename: filename.clone(),
                    data: fs::read(self.dir.join(blob))?,
                },
            };
            fields.insert(name.clone(), value);
        }
        Ok(ContentObject {
            id: stored.id,
            remote_id: stored.remote_id.clone(),
            content_type: stored.content_type.clone(),
            parent_location: stored.parent_location,
            language_code: current.language_code.clone(),
            version: current.version,
            fields,
        })
    }

    /// Highest content id in the directory plus one.
    fn next_content_id(&self) -> Result<ContentId, RepositoryError> {
        let mut max_id = 0;
        for entry in fs::read_dir(&self.dir)?.filter_map(|e| e.ok()) {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            match fs::read(&path)
                .map_err(RepositoryError::from)
                .and_then(|bytes| Ok(serde_json::from_slice::<StoredObject>(&bytes)?))
            {
                Ok(stored) => max_id = max_id.max(stored.id.0),
                Err(err) => import_warn!("Ignoring unreadable object file {:?}: {}", path, err),
            }
        }
        Ok(ContentId(max_id + 1))
    }

    /// Writes image blobs for `version` and returns the stored field table.
    fn store_fields(
        &self,
        stem: &str,
        version: u32,
        fields: &Fields,
    ) -> Result<BTreeMap<String, StoredField>, RepositoryError> {
        let writer = AtomicFileWriter::new(self.dir.clone());
        let mut stored = BTreeMap::new();
        for (name, value) in fields {
            let field = match value {
                FieldValue::Text(value) => StoredField::Text {
                    value: value.clone(),
                },
                FieldValue::RichText(xml) => StoredField::RichText { xml: xml.clone() },
                FieldValue::Image { filename, data } => {
                    let blob = format!("{stem}.v{version}.{name}.bin");
                    writer.write(&blob, data)?;
                    StoredField::Image {
                        filename: filename.clone(),
                        blob,
                    }
                }
            };
            stored.insert(name.clone(), field);
        }
        Ok(stored)
    }

    fn drafts(&self) -> MutexGuard<'_, DraftTable> {
        self.drafts.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn open_draft(&self, mut draft: Draft) -> Draft {
        let mut table = self.drafts();
        draft.id = DraftId(table.next_id);
        table.next_id += 1;
        table.open.insert(draft.id, draft.clone());
        draft
    }
}

#[async_trait::async_trait]
impl ContentRepository for FileRepository {
    async fn load_by_remote_id(&self, remote_id: &RemoteId) -> Result<Lookup, RepositoryError> {
        match self.read_stored(remote_id)? {
            Some(stored) => Ok(Lookup::Found(self.to_object(&stored)?)),
            None => Ok(Lookup::NotFound),
        }
    }

    async fn create_draft(&self, create: ContentCreate) -> Result<Draft, RepositoryError> {
        if let Some(types) = &self.content_types {
            if !types.contains(&create.content_type) {
                return Err(RepositoryError::UnknownContentType(create.content_type));
            }
        }
        Ok(self.open_draft(Draft {
            id: DraftId(0),
            content_id: None,
            remote_id: create.remote_id,
            content_type: create.content_type,
            parent_location: create.parent_location,
            language_code: create.language_code,
            version: 1,
            fields: create.fields,
        }))
    }

    async fn create_draft_from(&self, object: &ContentObject) -> Result<Draft, RepositoryError> {
        let stored = self
            .read_stored(&object.remote_id)?
            .ok_or_else(|| RepositoryError::NotFound(object.remote_id.to_string()))?;
        let current = self.to_object(&stored)?;
        Ok(self.open_draft(Draft {
            id: DraftId(0),
            content_id: Some(current.id),
            remote_id: current.remote_id,
            content_type: current.content_type,
            parent_location: current.parent_location,
            language_code: current.language_code,
            version: current.version + 1,
            fields: current.fields,
        }))
    }

    async fn update_draft(&self, draft: &Draft, fields: Fields) -> Result<Draft, RepositoryError> {
        let mut table = self.drafts();
        let stored = table
            .open
            .get_mut(&draft.id)
            .ok_or(RepositoryError::DraftNotOpen(draft.id))?;
        stored.fields.extend(fields);
        Ok(stored.clone())
    }

    async fn publish(&self, draft: &Draft) -> Result<ContentObject, RepositoryError> {
        let draft = self
            .drafts()
            .open
            .get(&draft.id)
            .cloned()
            .ok_or(RepositoryError::DraftNotOpen(draft.id))?;

        let existing = self.read_stored(&draft.remote_id)?;
        let mut stored = match (draft.content_id, existing) {
            (None, Some(_)) => return Err(RepositoryError::DuplicateRemoteId(draft.remote_id)),
            (None, None) => StoredObject {
                id: self.next_content_id()?,
                remote_id: draft.remote_id.clone(),
                content_type: draft.content_type.clone(),
                parent_location: draft.parent_location,
                versions: Vec::new(),
            },
            (Some(_), None) => return Err(RepositoryError::NotFound(draft.remote_id.to_string())),
            (Some(id), Some(stored)) if stored.id != id => {
                return Err(RepositoryError::Storage(format!(
                    "draft for {} targets content {} but {} is stored",
                    draft.remote_id, id, stored.id
                )))
            }
            (Some(_), Some(stored)) => stored,
        };

        let stem = object_file_stem(&draft.remote_id);
        let fields = self.store_fields(&stem, draft.version, &draft.fields)?;
        stored.versions.push(StoredVersion {
            version: draft.version,
            language_code: draft.language_code.clone(),
            published_utc: (self.clock)(),
            fields,
        });

        let json = serde_json::to_vec_pretty(&stored)?;
        AtomicFileWriter::new(self.dir.clone()).write(&format!("{stem}.json"), &json)?;
        import_debug!(
            "Published {} version {} as content {}",
            draft.remote_id,
            draft.version,
            stored.id
        );

        self.drafts().open.remove(&draft.id);
        self.to_object(&stored)
    }

    async fn discard_draft(&self, draft: &Draft) -> Result<(), RepositoryError> {
        self.drafts().open.remove(&draft.id);
        Ok(())
    }
}
