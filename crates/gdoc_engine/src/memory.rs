use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

use gdoc_core::{ContentId, RemoteId};

use crate::repository::{
    ContentCreate, ContentObject, ContentRepository, Draft, DraftId, Fields, Lookup,
    RepositoryError,
};

/// Repository operations that can be made to fail on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Operation {
    Load,
    CreateDraft,
    UpdateDraft,
    Publish,
}

#[derive(Debug, Default)]
struct MemoryState {
    /// Published versions per remote id, oldest first.
    objects: BTreeMap<RemoteId, Vec<ContentObject>>,
    drafts: BTreeMap<DraftId, Draft>,
    content_types: Option<BTreeSet<String>>,
    next_content_id: u64,
    next_draft_id: u64,
    failing: BTreeSet<Operation>,
    publish_count: usize,
}

/// Process-local repository for tests and dry runs.
#[derive(Debug)]
pub struct InMemoryRepository {
    state: Mutex<MemoryState>,
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState {
                next_content_id: 1,
                next_draft_id: 1,
                ..MemoryState::default()
            }),
        }
    }

    /// Restricts accepted content types; others fail at draft creation.
    pub fn with_content_types<I, S>(self, content_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lock().content_types = Some(content_types.into_iter().map(Into::into).collect());
        self
    }

    /// Makes every following call of `operation` fail until [`recover`](Self::recover).
    pub fn fail_on(&self, operation: Operation) {
        self.lock().failing.insert(operation);
    }

    pub fn recover(&self) {
        self.lock().failing.clear();
    }

    /// Latest published version.
    pub fn object(&self, remote_id: &RemoteId) -> Option<ContentObject> {
        self.lock()
            .objects
            .get(remote_id)
            .and_then(|versions| versions.last().cloned())
    }

    /// Every published version, oldest first.
    pub fn history(&self, remote_id: &RemoteId) -> Vec<ContentObject> {
        self.lock()
            .objects
            .get(remote_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn object_count(&self) -> usize {
        self.lock().objects.len()
    }

    pub fn objects_of_type(&self, content_type: &str) -> Vec<ContentObject> {
        self.lock()
            .objects
            .values()
            .filter_map(|versions| versions.last())
            .filter(|object| object.content_type == content_type)
            .cloned()
            .collect()
    }

    pub fn open_draft_count(&self) -> usize {
        self.lock().drafts.len()
    }

    pub fn publish_count(&self) -> usize {
        self.lock().publish_count
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        // A panicking test thread must not poison the others.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl MemoryState {
    fn check(&self, operation: Operation) -> Result<(), RepositoryError> {
        if self.failing.contains(&operation) {
            return Err(RepositoryError::Storage(format!(
                "injected failure on {operation:?}"
            )));
        }
        Ok(())
    }

    fn open_draft(&mut self, mut draft: Draft) -> Draft {
        draft.id = DraftId(self.next_draft_id);
        self.next_draft_id += 1;
        self.drafts.insert(draft.id, draft.clone());
        draft
    }
}

#[async_trait::async_trait]
impl ContentRepository for InMemoryRepository {
    async fn load_by_remote_id(&self, remote_id: &RemoteId) -> Result<Lookup, RepositoryError> {
        let state = self.lock();
        state.check(Operation::Load)?;
        Ok(match state.objects.get(remote_id).and_then(|v| v.last()) {
            Some(object) => Lookup::Found(object.clone()),
            None => Lookup::NotFound,
        })
    }

    async fn create_draft(&self, create: ContentCreate) -> Result<Draft, RepositoryError> {
        let mut state = self.lock();
        state.check(Operation::CreateDraft)?;
        if let Some(types) = &state.content_types {
            if !types.contains(&create.content_type) {
                return Err(RepositoryError::UnknownContentType(create.content_type));
            }
        }
        let draft = Draft {
            id: DraftId(0),
            content_id: None,
            remote_id: create.remote_id,
            content_type: create.content_type,
            parent_location: create.parent_location,
            language_code: create.language_code,
            version: 1,
            fields: create.fields,
        };
        Ok(state.open_draft(draft))
    }

    async fn create_draft_from(&self, object: &ContentObject) -> Result<Draft, RepositoryError> {
        let mut state = self.lock();
        state.check(Operation::CreateDraft)?;
        let current = state
            .objects
            .get(&object.remote_id)
            .and_then(|versions| versions.last())
            .ok_or_else(|| RepositoryError::NotFound(object.remote_id.to_string()))?;
        let draft = Draft {
            id: DraftId(0),
            content_id: Some(current.id),
            remote_id: current.remote_id.clone(),
            content_type: current.content_type.clone(),
            parent_location: current.parent_location,
            language_code: current.language_code.clone(),
            version: current.version + 1,
            fields: current.fields.clone(),
        };
        Ok(state.open_draft(draft))
    }

    async fn update_draft(&self, draft: &Draft, fields: Fields) -> Result<Draft, RepositoryError> {
        let mut state = self.lock();
        state.check(Operation::UpdateDraft)?;
        let stored = state
            .drafts
            .get_mut(&draft.id)
            .ok_or(RepositoryError::DraftNotOpen(draft.id))?;
        stored.fields.extend(fields);
        Ok(stored.clone())
    }

    async fn publish(&self, draft: &Draft) -> Result<ContentObject, RepositoryError> {
        let mut state = self.lock();
        state.check(Operation::Publish)?;
        let draft = state
            .drafts
            .get(&draft.id)
            .cloned()
            .ok_or(RepositoryError::DraftNotOpen(draft.id))?;

        let content_id = match draft.content_id {
            Some(id) => id,
            None => {
                if state.objects.contains_key(&draft.remote_id) {
                    return Err(RepositoryError::DuplicateRemoteId(draft.remote_id));
                }
                let id = ContentId(state.next_content_id);
                state.next_content_id += 1;
                id
            }
        };

        let object = ContentObject {
            id: content_id,
            remote_id: draft.remote_id.clone(),
            content_type: draft.content_type,
            parent_location: draft.parent_location,
            language_code: draft.language_code,
            version: draft.version,
            fields: draft.fields,
        };
        state.drafts.remove(&draft.id);
        state
            .objects
            .entry(draft.remote_id)
            .or_default()
            .push(object.clone());
        state.publish_count += 1;
        Ok(object)
    }

    async fn discard_draft(&self, draft: &Draft) -> Result<(), RepositoryError> {
        self.lock().drafts.remove(&draft.id);
        Ok(())
    }
}
