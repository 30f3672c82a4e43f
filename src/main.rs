use clap::{Parser, Subcommand};
use fieldreport::{
    AttachmentMerger, FilesystemFetcher, HttpFetcher, HttpFetcherOptions, MediaFetcher, PipelineError, PrintConfig,
    PrintSession, PrintableReport, ReportForm, ReportPipeline, RoutedFetcher, ServiceReportRecord, SnapshotBuilder,
    SpoolPlatform,
};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Renders field-service reports to PDF.
#[derive(Parser, Debug)]
#[command(name = "fieldreport", version, about)]
struct Cli {
    /// TOML configuration file, layered under FIELDREPORT__* variables.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Session cookie (`name=value`) sent with media and attachment requests.
    #[arg(long, global = true)]
    session_cookie: Option<String>,

    /// Bearer token sent with media and attachment requests.
    #[arg(long, global = true, env = "FIELDREPORT_TOKEN")]
    token: Option<String>,

    /// Serve page-origin assets (logo, watermark, QR code) from this directory.
    #[arg(long, global = true)]
    assets_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a report (form values or a stored record, as JSON) to a PDF file.
    Render {
        report: PathBuf,
        output: PathBuf,
        /// Append the report's attachment PDFs after its pages.
        #[arg(long)]
        merge_attachments: bool,
    },
    /// Print a report through a spool directory, as a browser session would.
    Print {
        report: PathBuf,
        spool_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(e) = run(Cli::parse()).await {
        log::error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = PrintConfig::load(cli.config.as_deref()).map_err(PipelineError::from)?;
    let origins = config.origins();
    let http: Arc<dyn MediaFetcher> = Arc::new(HttpFetcher::new(HttpFetcherOptions {
        session_cookie: cli.session_cookie.clone(),
        cookie_origin: Some(origins.media.clone()),
        bearer_token: cli.token.clone(),
        timeout: None,
    })?);
    let fetcher: Arc<dyn MediaFetcher> = match &cli.assets_dir {
        Some(dir) => {
            log::info!("Serving {} assets from {}", origins.page, dir.display());
            let assets = Arc::new(FilesystemFetcher::new(origins.page.clone(), dir));
            Arc::new(RoutedFetcher::new(http).route(format!("{}/", origins.page), assets))
        }
        None => http,
    };
    let pipeline = Arc::new(ReportPipeline::new(config, Arc::clone(&fetcher)));

    match cli.command {
        Command::Render { report, output, merge_attachments } => {
            let report = read_report(&report)?;
            let mut bytes = pipeline.render_pdf(&report).await?;
            if merge_attachments && report.has_attachments() {
                let config = pipeline.config();
                let merger = AttachmentMerger::new(fetcher, config.resolver(), config.image_fetch_timeout());
                let merged = merger.merge(&bytes, &report.attachments).await.map_err(PipelineError::from)?;
                log::info!("Merged PDF has {} page(s)", merged.page_count());
                bytes = merged.bytes;
            }
            fs::write(&output, &bytes).map_err(PipelineError::from)?;
            println!("Wrote {}", output.display());
        }
        Command::Print { report, spool_dir } => {
            let report = read_report(&report)?;
            let platform = Arc::new(SpoolPlatform::new(&spool_dir));
            let session = PrintSession::new(pipeline, platform);
            session.open(report, true).await?;
            let name = session.download().await?;
            session.close();
            println!("Spooled print job and {} to {}", name, spool_dir.display());
        }
    }
    Ok(())
}

/// Reads a stored report record when the JSON carries payload columns,
/// otherwise plain form values.
fn read_report(path: &Path) -> Result<PrintableReport, PipelineError> {
    let value: Value = serde_json::from_str(&fs::read_to_string(path)?)?;
    let is_record = value.get("form_payload").is_some() || value.get("teknisi_payload").is_some();
    let builder = if is_record {
        let record: ServiceReportRecord = serde_json::from_value(value)?;
        SnapshotBuilder::from_record(&record)?
    } else {
        let form: ReportForm = serde_json::from_value(value)?;
        SnapshotBuilder::from_form(form)
    };
    Ok(builder.build())
}
