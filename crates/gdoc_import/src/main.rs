//! gdoc-import: imports one Google Docs document into a content repository.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use gdoc_engine::ImportReport;
use gdoc_import::{import_document, ConsoleProgress, ImportConfig};
use import_logging::{import_error, import_info, LogDestination};
use log::LevelFilter;

#[derive(Parser)]
#[command(name = "gdoc-import")]
#[command(version)]
#[command(about = "Import a Google Docs document as a rich-text content object", long_about = None)]
struct Cli {
    /// RON configuration file
    #[arg(short, long, value_name = "FILE", env = "GDOC_IMPORT_CONFIG")]
    config: PathBuf,

    /// Document to import; overrides `document_id` from the config
    #[arg(long, value_name = "ID")]
    document_id: Option<String>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(report) => {
            println!(
                "{} content object {} ({}) at version {}: {} elements, {} nodes, {} skipped",
                if report.created { "Created" } else { "Updated" },
                report.content_id,
                report.remote_id,
                report.version,
                report.source_elements,
                report.output_nodes,
                report.skipped.len()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            import_error!("{:#}", err);
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ImportReport> {
    let config = ImportConfig::load(&cli.config)?;

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let destination = match &config.log_file {
        Some(path) => LogDestination::Both(path.clone()),
        None => LogDestination::Terminal,
    };
    import_logging::initialize(destination, level);
    import_info!("Using config {}", cli.config.display());

    let document_id = cli
        .document_id
        .or_else(|| config.document_id.clone())
        .context("no document id: pass --document-id or set `document_id` in the config")?;
    let access_token = config.access_token(|name| std::env::var(name).ok())?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("cannot start async runtime")?;
    runtime.block_on(import_document(
        &config,
        &access_token,
        &document_id,
        &ConsoleProgress::stdout(),
    ))
}
