//! Import command handlers for the CLI.
//!
//! `run` goes through the same pipeline as the HTTP endpoint. `preview` and
//! `template` never touch the database or the catalog.

use std::path::{Path, PathBuf};

use clap::Subcommand;

use reviewdb_catalog::CatalogResolver;
use reviewdb_core::{CommitSummary, InvalidRatingPolicy, ReviewSink, SinkError, WritePlan};
use reviewdb_db::PgReviewSink;
use reviewdb_import::{
    audit_csv, run_import, validate_upload, ImportReport, ImportRequest, ImportSettings, Upload,
    TEMPLATE_CSV,
};

/// Sub-commands available under `import`.
#[derive(Debug, Subcommand)]
pub enum ImportCommands {
    /// Normalize a CSV export and store its reviews
    Run {
        /// Shop domain the reviews belong to (e.g., demo.myshopify.com)
        #[arg(long)]
        shop: String,
        /// Path to the CSV file
        #[arg(long)]
        file: PathBuf,
        /// What to do with rows whose rating cannot be read
        #[arg(long)]
        on_invalid_rating: Option<InvalidRatingPolicy>,
        /// Run every stage except the final database write
        #[arg(long)]
        dry_run: bool,
    },
    /// Summarize what a CSV file would import
    Preview {
        /// Path to the CSV file
        #[arg(long)]
        file: PathBuf,
    },
    /// Write the CSV template
    Template {
        /// Output path; prints to stdout when omitted
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

pub(crate) async fn run(command: ImportCommands) -> anyhow::Result<()> {
    match command {
        ImportCommands::Run {
            shop,
            file,
            on_invalid_rating,
            dry_run,
        } => run_import_file(shop, &file, on_invalid_rating, dry_run).await,
        ImportCommands::Preview { file } => run_preview(&file).await,
        ImportCommands::Template { out } => write_template(out.as_deref()).await,
    }
}

async fn run_import_file(
    shop: String,
    file: &Path,
    on_invalid_rating: Option<InvalidRatingPolicy>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let config = reviewdb_core::load_app_config()?;
    let mut settings = ImportSettings::from_app_config(&config);
    if let Some(policy) = on_invalid_rating {
        settings.on_invalid_rating = policy;
    }
    settings.dry_run = dry_run;

    let resolver = CatalogResolver::from_app_config(&config)?;
    tracing::info!(
        shop = %shop,
        file = %file.display(),
        dry_run,
        catalog_enabled = resolver.is_enabled(),
        "starting import"
    );
    let request = ImportRequest {
        shop,
        upload: Some(read_upload(file).await?),
    };

    let report = if dry_run {
        run_import(&resolver, &DiscardSink, &request, &settings).await?
    } else {
        let pool = crate::connect(&config).await?;
        let sink = PgReviewSink::new(pool.clone());
        let report = run_import(&resolver, &sink, &request, &settings).await;
        pool.close().await;
        report?
    };

    for line in report_lines(&report) {
        println!("{line}");
    }
    Ok(())
}

async fn run_preview(file: &Path) -> anyhow::Result<()> {
    let upload = read_upload(file).await?;
    let text = validate_upload(Some(&upload), ImportSettings::default().max_bytes)?;
    let audit = audit_csv(text);
    println!("{}", serde_json::to_string_pretty(&audit)?);
    Ok(())
}

async fn write_template(out: Option<&Path>) -> anyhow::Result<()> {
    match out {
        Some(path) => {
            tokio::fs::write(path, TEMPLATE_CSV).await?;
            println!("wrote template to {}", path.display());
        }
        None => println!("{TEMPLATE_CSV}"),
    }
    Ok(())
}

pub(crate) async fn read_upload(path: &Path) -> anyhow::Result<Upload> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(Upload { file_name, bytes })
}

/// Human-readable summary printed after an import.
pub(crate) fn report_lines(report: &ImportReport) -> Vec<String> {
    let mut lines = Vec::new();
    if report.dry_run {
        lines.push(format!("dry-run: would import {} reviews", report.count));
    }
    lines.push(report.message.clone());
    for skipped in &report.skipped_rows {
        lines.push(format!("  skipped row {}: {}", skipped.row, skipped.reason));
    }
    if let Some(debug) = &report.debug {
        lines.push(format!(
            "detected headers: {}",
            debug.detected_headers.join(", ")
        ));
    }
    lines
}

/// Sink used for dry runs. The pipeline never commits when `dry_run` is set.
struct DiscardSink;

impl ReviewSink for DiscardSink {
    async fn commit(&self, _shop: &str, _plan: &WritePlan) -> Result<CommitSummary, SinkError> {
        Ok(CommitSummary::default())
    }
}
