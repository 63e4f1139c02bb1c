use std::sync::Arc;

use anyhow::Context;
use gdoc_engine::{
    FileRepository, GoogleDocsClient, ImportReport, Importer, ProgressSink, ReqwestFetcher,
};
use import_logging::import_info;

use crate::config::ImportConfig;

/// Wires the HTTP clients and the file repository from `config` and imports
/// one document.
pub async fn import_document(
    config: &ImportConfig,
    access_token: &str,
    document_id: &str,
    sink: &dyn ProgressSink,
) -> anyhow::Result<ImportReport> {
    let docs_fetcher = Arc::new(ReqwestFetcher::new(
        config.document_fetch_settings(access_token),
    ));
    let source = GoogleDocsClient::new(docs_fetcher, &config.docs_api_base_url)
        .with_context(|| format!("invalid docs_api_base_url {}", config.docs_api_base_url))?;
    let repository = FileRepository::open(&config.repository_dir).with_context(|| {
        format!(
            "cannot open repository directory {}",
            config.repository_dir.display()
        )
    })?;
    import_info!("Repository at {}", repository.dir().display());

    let importer = Importer::new(
        Arc::new(source),
        Arc::new(repository),
        Arc::new(ReqwestFetcher::new(config.image_fetch_settings())),
        config.targets(),
    );
    let report = importer
        .run(document_id, sink)
        .await
        .with_context(|| format!("import of document {document_id} failed"))?;
    Ok(report)
}
