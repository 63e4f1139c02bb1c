//! Gdoc engine: fetching, asset resolution, conversion and repository reconciliation.
mod assets;
mod convert;
mod docs;
mod fetch;
mod file_repository;
mod filename;
mod importer;
mod memory;
mod persist;
mod reconcile;
mod repository;
mod types;

pub use assets::{parse_content_disposition, AssetError, AssetResolver, AssetTarget, Resolved};
pub use convert::{convert_document, Conversion};
pub use docs::{DocumentSource, GoogleDocsClient, SourceError};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use file_repository::{Clock, FileRepository};
pub use filename::object_file_stem;
pub use importer::{ImportError, ImportReport, ImportTargets, Importer};
pub use memory::{InMemoryRepository, Operation};
pub use persist::{ensure_repository_dir, AtomicFileWriter, PersistError};
pub use reconcile::{ReconcileOutcome, Reconciler, TargetLocation};
pub use repository::{
    ContentCreate, ContentObject, ContentRepository, Draft, DraftId, FieldValue, Fields, Lookup,
    RepositoryError,
};
pub use types::{
    FailureKind, FetchError, FetchMetadata, FetchOutput, ImportEvent, ProgressSink, SkipReason,
    SkippedElement,
};
