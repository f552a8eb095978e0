//! CLI entry point for the giro completion report.
//!
//! Provides subcommands for analyzing a shipment feed into a route
//! completion report and for looking up which routes still hold a product.

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use giro_report::analyzers::analyzer::analyze;
use giro_report::analyzers::types::{AnalysisResponse, GiroReport, RawRecord};
use giro_report::config::AppConfig;
use giro_report::error::AnalysisError;
use giro_report::fetch::{BasicClient, HttpClient, load_source};
use giro_report::loadings::{LoadingIndex, join_loading_names};
use giro_report::output::{append_record, print_json, print_pretty, write_json};
use giro_report::parser::{parse_records, parse_records_csv};
use giro_report::stats::ReportStats;
use std::ffi::OsStr;
use std::path::Path;
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "giro_report")]
#[command(about = "Route completion report for shipment check feeds", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a shipment feed from a file or URL
    Analyze {
        /// Path to file or URL to fetch (CSV when it ends in .csv, JSON otherwise)
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        /// Loadings reference feed used to resolve route destinations
        #[arg(short, long, value_name = "FILE_OR_URL")]
        loadings: Option<String>,

        /// JSON file to write the report to (logged when omitted)
        #[arg(short, long)]
        output: Option<String>,

        /// CSV file to append the run summary to
        #[arg(short, long)]
        summary: Option<String>,

        /// Site label recorded in the run summary
        #[arg(long)]
        site: Option<String>,
    },
    /// List the routes that still hold a product
    Search {
        /// Path to file or URL to fetch
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        /// Product code as shown in the report (e.g. TIG-4455)
        #[arg(short, long)]
        product: String,

        /// Loadings reference feed used to resolve route destinations
        #[arg(short, long, value_name = "FILE_OR_URL")]
        loadings: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file
    let config = AppConfig::from_env();

    // Logging setup: colored stderr + JSON rolling log file
    let log_dir = Path::new(&config.log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&config.log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("giro_report.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let client = BasicClient::new(config.http_timeout)?;

    match cli.command {
        Commands::Analyze {
            source,
            loadings,
            output,
            summary,
            site,
        } => {
            let summary_path = summary.unwrap_or_else(|| config.summary_path.clone());
            run_analyze(
                &client,
                &source,
                loadings.as_deref(),
                output.as_deref(),
                &summary_path,
                site.as_deref(),
            )
            .await?;
        }
        Commands::Search {
            source,
            product,
            loadings,
        } => {
            let records = load_records(&client, &source, loadings.as_deref()).await?;
            let report = analyze(&records)?;
            search_product(&report, &product);
        }
    }

    Ok(())
}

/// Loads, joins and analyzes a feed, then writes the response and appends
/// a run summary. Any failure is still recorded before it is returned.
#[tracing::instrument(skip(client, summary_path))]
async fn run_analyze<C: HttpClient>(
    client: &C,
    source: &str,
    loadings: Option<&str>,
    output: Option<&str>,
    summary_path: &str,
    site: Option<&str>,
) -> Result<()> {
    let records = match load_records(client, source, loadings).await {
        Ok(records) => records,
        Err(e) => {
            error!(error = %e, "Feed could not be loaded");
            let error_type = if e.downcast_ref::<AnalysisError>().is_some() {
                "parse_error"
            } else {
                "fetch_error"
            };
            let failure = AnalysisResponse {
                success: false,
                report: None,
                error: Some(format!("{e:#}")),
            };
            emit_response(output, &failure)?;
            let stats = ReportStats::from_error(error_type, &format!("{e:#}"))
                .with_source_info(source, site);
            append_record(summary_path, &stats)?;
            return Err(e);
        }
    };

    let result = analyze(&records);
    let stats = match &result {
        Ok(report) => {
            print_pretty(report);
            ReportStats::from_report(records.len(), report)
        }
        Err(e) => {
            error!(error = %e, "Analysis failed");
            ReportStats::from_error("analysis_error", &e.to_string())
        }
    }
    .with_source_info(source, site);

    let response = AnalysisResponse::from_result(result);
    emit_response(output, &response)?;
    append_record(summary_path, &stats)?;

    match response.error {
        Some(message) => Err(anyhow!(message)),
        None => {
            info!(
                routes = stats.routes,
                routes_completed = stats.routes_completed,
                percentage = stats.percentage,
                "Report ready"
            );
            Ok(())
        }
    }
}

/// Reads the feed and, when a loadings reference is given, joins loading
/// names onto every record.
async fn load_records<C: HttpClient>(
    client: &C,
    source: &str,
    loadings: Option<&str>,
) -> Result<Vec<RawRecord>> {
    let bytes = load_source(client, source).await?;
    let records = decode(source, &bytes)?;
    info!(records = records.len(), "Feed decoded");

    let Some(loadings_source) = loadings else {
        return Ok(records);
    };

    let reference_bytes = load_source(client, loadings_source).await?;
    let reference = decode(loadings_source, &reference_bytes)?;
    let index = LoadingIndex::from_records(&reference);
    if index.is_empty() {
        warn!(source = loadings_source, "Loadings reference holds no usable ids");
    }

    Ok(join_loading_names(&records, &index))
}

fn decode(source: &str, bytes: &[u8]) -> Result<Vec<RawRecord>, AnalysisError> {
    if source.to_lowercase().ends_with(".csv") {
        parse_records_csv(bytes)
    } else {
        parse_records(bytes)
    }
}

fn emit_response(output: Option<&str>, response: &AnalysisResponse) -> Result<()> {
    match output {
        Some(path) => {
            write_json(path, response)?;
            info!(path, success = response.success, "Response written");
            Ok(())
        }
        None => print_json(response),
    }
}

fn search_product(report: &GiroReport, product: &str) {
    let Some((code, routes)) = report.product_search.find(product) else {
        info!(product, "Product not pending on any route");
        return;
    };

    let description = report.product_search.description(code).unwrap_or("");
    let total: usize = routes.values().sum();
    info!(product = code, description, routes = routes.len(), total, "Product found");

    for (route, count) in routes {
        let destination = report
            .routes
            .iter()
            .find(|r| r.summary.route == *route)
            .map(|r| r.summary.destination.as_str())
            .unwrap_or("");
        info!(route = %route, destination, count, "Route");
    }
}
