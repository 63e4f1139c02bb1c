use std::sync::Arc;

use gdoc_core::{to_xml, RemoteId, RichTextDocument, SourceDocument};
use import_logging::{import_error, import_info, import_warn};

use crate::repository::{
    ContentCreate, ContentObject, ContentRepository, Draft, FieldValue, Fields, Lookup,
    RepositoryError,
};

/// Content type, parent location and language for newly created objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetLocation {
    pub content_type: String,
    pub parent_location: u64,
    pub language_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Created(ContentObject),
    Updated(ContentObject),
}

impl ReconcileOutcome {
    pub fn object(&self) -> &ContentObject {
        match self {
            ReconcileOutcome::Created(object) | ReconcileOutcome::Updated(object) => object,
        }
    }
}

/// Create-or-update of the document object keyed by its remote id.
pub struct Reconciler {
    repository: Arc<dyn ContentRepository>,
    target: TargetLocation,
}

impl Reconciler {
    pub fn new(repository: Arc<dyn ContentRepository>, target: TargetLocation) -> Self {
        Self { repository, target }
    }

    /// Publishes `body` as the next version of the object for `source`.
    ///
    /// On error the repository is left at its last published state: any
    /// draft opened here is discarded.
    pub async fn reconcile(
        &self,
        source: &SourceDocument,
        body: &RichTextDocument,
    ) -> Result<ReconcileOutcome, RepositoryError> {
        let remote_id = RemoteId::for_document(&source.id);
        let mut fields = Fields::new();
        fields.insert("title".to_string(), FieldValue::Text(source.title.clone()));
        fields.insert("body".to_string(), FieldValue::RichText(to_xml(body)));

        let result = self.upsert(&remote_id, fields).await;
        match &result {
            Ok(ReconcileOutcome::Created(object)) => {
                import_info!("Content object {} created for {}", object.id, remote_id)
            }
            Ok(ReconcileOutcome::Updated(object)) => import_info!(
                "Content object {} updated to version {} for {}",
                object.id,
                object.version,
                remote_id
            ),
            Err(err) => import_error!("Saving {} failed: {}", remote_id, err),
        }
        result
    }

    async fn upsert(
        &self,
        remote_id: &RemoteId,
        fields: Fields,
    ) -> Result<ReconcileOutcome, RepositoryError> {
        match self.repository.load_by_remote_id(remote_id).await? {
            Lookup::Found(existing) => self
                .update(&existing, fields)
                .await
                .map(ReconcileOutcome::Updated),
            Lookup::NotFound => self
                .create(remote_id.clone(), fields)
                .await
                .map(ReconcileOutcome::Created),
        }
    }

    async fn update(
        &self,
        existing: &ContentObject,
        fields: Fields,
    ) -> Result<ContentObject, RepositoryError> {
        let draft = self.repository.create_draft_from(existing).await?;
        let published = match self.repository.update_draft(&draft, fields).await {
            Ok(updated) => self.repository.publish(&updated).await,
            Err(err) => Err(err),
        };
        self.discard_on_error(&draft, published).await
    }

    async fn create(
        &self,
        remote_id: RemoteId,
        fields: Fields,
    ) -> Result<ContentObject, RepositoryError> {
        let draft = self
            .repository
            .create_draft(ContentCreate {
                content_type: self.target.content_type.clone(),
                remote_id,
                parent_location: self.target.parent_location,
                language_code: self.target.language_code.clone(),
                fields,
            })
            .await?;
        let published = self.repository.publish(&draft).await;
        self.discard_on_error(&draft, published).await
    }

    async fn discard_on_error(
        &self,
        draft: &Draft,
        result: Result<ContentObject, RepositoryError>,
    ) -> Result<ContentObject, RepositoryError> {
        if result.is_err() {
            if let Err(err) = self.repository.discard_draft(draft).await {
                import_warn!("Could not discard draft {}: {}", draft.id, err);
            }
        }
        result
    }
}
