use std::sync::Arc;

use gdoc_core::{ContentId, RemoteId};
use import_logging::{import_error, import_info};
use thiserror::Error;

use crate::assets::{AssetResolver, AssetTarget, Resolved};
use crate::convert::convert_document;
use crate::docs::{DocumentSource, SourceError};
use crate::fetch::Fetcher;
use crate::reconcile::{ReconcileOutcome, Reconciler, TargetLocation};
use crate::repository::{ContentRepository, RepositoryError};
use crate::{ImportEvent, ProgressSink, SkippedElement};

/// Document-level failures; element and image failures are reported in
/// [`ImportReport::skipped`] instead.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("authorization failed: {0}")]
    Auth(String),
    #[error("document unavailable: {0}")]
    Fetch(SourceError),
    #[error("document could not be saved: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<SourceError> for ImportError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::Auth(message) => ImportError::Auth(message),
            other => ImportError::Fetch(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportTargets {
    pub language_code: String,
    pub document_content_type: String,
    pub document_parent_location: u64,
    pub image_content_type: String,
    pub image_parent_location: u64,
}

impl ImportTargets {
    fn document(&self) -> TargetLocation {
        TargetLocation {
            content_type: self.document_content_type.clone(),
            parent_location: self.document_parent_location,
            language_code: self.language_code.clone(),
        }
    }

    fn image(&self) -> AssetTarget {
        AssetTarget {
            content_type: self.image_content_type.clone(),
            parent_location: self.image_parent_location,
            language_code: self.language_code.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub remote_id: RemoteId,
    pub content_id: ContentId,
    pub created: bool,
    pub version: u32,
    pub source_elements: usize,
    pub output_nodes: usize,
    pub skipped: Vec<SkippedElement>,
    pub assets_created: Vec<ContentId>,
    pub assets_reused: Vec<ContentId>,
}

/// One-document import: fetch, convert, reconcile.
pub struct Importer {
    source: Arc<dyn DocumentSource>,
    repository: Arc<dyn ContentRepository>,
    image_fetcher: Arc<dyn Fetcher>,
    targets: ImportTargets,
}

impl Importer {
    pub fn new(
        source: Arc<dyn DocumentSource>,
        repository: Arc<dyn ContentRepository>,
        image_fetcher: Arc<dyn Fetcher>,
        targets: ImportTargets,
    ) -> Self {
        Self {
            source,
            repository,
            image_fetcher,
            targets,
        }
    }

    pub async fn run(
        &self,
        document_id: &str,
        sink: &dyn ProgressSink,
    ) -> Result<ImportReport, ImportError> {
        sink.emit(ImportEvent::ClientReady);

        let source = self.source.get(document_id).await.map_err(|err| {
            import_error!("Loading document {} failed: {}", document_id, err);
            ImportError::from(err)
        })?;
        import_info!(
            "Loaded document {} \"{}\" with {} elements",
            source.id,
            source.title,
            source.elements.len()
        );
        sink.emit(ImportEvent::DocumentLoaded {
            document_id: source.id.clone(),
            elements: source.elements.len(),
        });

        let mut resolver = AssetResolver::new(
            self.repository.clone(),
            self.image_fetcher.clone(),
            self.targets.image(),
        );
        let conversion = convert_document(&source, &mut resolver, sink).await;

        let reconciler = Reconciler::new(self.repository.clone(), self.targets.document());
        let outcome = reconciler.reconcile(&source, &conversion.document).await?;
        let object = outcome.object();
        sink.emit(match &outcome {
            ReconcileOutcome::Created(_) => ImportEvent::ContentCreated {
                remote_id: object.remote_id.clone(),
                content_id: object.id,
            },
            ReconcileOutcome::Updated(_) => ImportEvent::ContentUpdated {
                remote_id: object.remote_id.clone(),
                content_id: object.id,
                version: object.version,
            },
        });

        let mut assets_created = Vec::new();
        let mut assets_reused = Vec::new();
        for asset in &conversion.assets {
            match asset {
                Resolved::Created(object) => assets_created.push(object.id),
                Resolved::Existing(object) => assets_reused.push(object.id),
            }
        }

        let report = ImportReport {
            remote_id: object.remote_id.clone(),
            content_id: object.id,
            created: matches!(outcome, ReconcileOutcome::Created(_)),
            version: object.version,
            source_elements: source.elements.len(),
            output_nodes: conversion.document.len(),
            skipped: conversion.skipped,
            assets_created,
            assets_reused,
        };
        sink.emit(ImportEvent::Done);
        Ok(report)
    }
}
