mod domain;
mod infra;
mod usecase;


use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use log::LevelFilter;

use crate::domain::column::resolve;
use crate::domain::entities::dataset::{RecordQuery, SortSpec};
use crate::domain::entities::edit::{CellEdit, NewCompany};
use crate::domain::entities::record::{
    Company, HeaderList, Record, RowId, SheetSnapshot, FIRST_DATA_ROW,
};
use crate::domain::entities::update::{BatchSummary, CleaningRequest, UpdateResult};
use crate::domain::summary::{visible_buckets, DashboardSummary};
use crate::infra::config::AppConfig;
use crate::infra::gemini::client::{resolve_model, GeminiClient, DEFAULT_MODEL, SUPPORTED_MODELS};
use crate::infra::google::auth::{GoogleCredentials, TokenProvider};
use crate::infra::google::public_csv::PublicCsvSheet;
use crate::infra::google::sheets::{http_client, GoogleSheetsClient};
use crate::infra::import::csv_sheet::CsvFileSheet;
use crate::usecase::ports::error::PortError;
use crate::usecase::ports::observer::{BatchObserver, LogObserver};
use crate::usecase::ports::sheet::{SheetSource, SheetWriter};
use crate::usecase::services::cleaning_service::{BatchReport, CleaningService};
use crate::usecase::services::edit_service::EditService;
use crate::usecase::services::insight_service::InsightService;
use crate::usecase::services::query_service::QueryService;

const MAX_CELL_WIDTH: usize = 40;

#[derive(Parser)]
#[command(name = "company-sheet")]
#[command(about = "Company list dashboard over a Google Sheet")]
#[command(version)]
struct Cli {
    /// Config file (defaults to the per-user config directory)
    #[arg(long, global = true, env = "COMPANY_SHEET_CONFIG")]
    config: Option<PathBuf>,

    /// Where rows come from: api, public, or csv:PATH
    #[arg(long, global = true, default_value = "api")]
    source: SourceKind,

    /// Debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the company table
    List {
        #[arg(long, value_name = "COLUMN")]
        sort: Option<String>,

        #[arg(long, requires = "sort")]
        desc: bool,

        #[arg(long, value_name = "TERM")]
        filter: Option<String>,
    },
    /// Totals plus ecosystem and revenue distributions
    Summary {
        #[arg(long, value_name = "TERM")]
        filter: Option<String>,
    },
    /// Ask the model for trends across the listed companies
    Insights {
        #[arg(long, value_name = "TERM")]
        filter: Option<String>,
    },
    /// Fill one column for every listed company, one row at a time
    Clean {
        /// What to find, in plain language
        #[arg(long)]
        request: String,

        /// Header of the column that receives the answers
        #[arg(long)]
        column: String,

        #[arg(long, value_name = "TERM")]
        filter: Option<String>,
    },
    /// Append a company
    Add {
        /// Repeatable Header=Value pair
        #[arg(long = "field", value_name = "HEADER=VALUE", required = true)]
        fields: Vec<String>,
    },
    /// Write one cell
    Set {
        /// Sheet row number (the header is row 1)
        #[arg(long)]
        row: u32,

        #[arg(long)]
        column: String,

        #[arg(long)]
        value: String,
    },
    /// Supported model ids
    Models,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SourceKind {
    Api,
    Public,
    Csv(PathBuf),
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "api" => Ok(SourceKind::Api),
            "public" => Ok(SourceKind::Public),
            other => match other.strip_prefix("csv:") {
                Some(path) if !path.is_empty() => Ok(SourceKind::Csv(PathBuf::from(path))),
                _ => Err(format!("expected api, public or csv:PATH, got {other:?}")),
            },
        }
    }
}

/// Read side and write side of the configured sheet. The public export is
/// read-only, so writes still go through the API there.
struct Backends {
    source: Arc<dyn SheetSource>,
    writer: Arc<dyn SheetWriter>,
}

fn build_backends(kind: &SourceKind, config: &AppConfig) -> Result<Backends> {
    if let SourceKind::Csv(path) = kind {
        let sheet = Arc::new(CsvFileSheet::new(path, config.sheet.sheet_name.clone()));
        log::debug!("using local sheet {}", sheet.path().display());
        return Ok(Backends {
            source: sheet.clone(),
            writer: sheet,
        });
    }

    let http = http_client()?;
    let auth = TokenProvider::new(
        http.clone(),
        config.google.token_url.clone(),
        GoogleCredentials::from_config(&config.google),
    );
    let api = Arc::new(GoogleSheetsClient::new(
        http.clone(),
        config.sheet.api_base.clone(),
        config.sheet.spreadsheet_id.clone(),
        config.sheet.sheet_name.clone(),
        auth,
    ));
    let source: Arc<dyn SheetSource> = match kind {
        SourceKind::Public => Arc::new(PublicCsvSheet::new(
            http,
            config.sheet.public_base.clone(),
            config.sheet.spreadsheet_id.clone(),
            config.sheet.sheet_name.clone(),
        )),
        SourceKind::Api | SourceKind::Csv(_) => api.clone(),
    };
    Ok(Backends {
        source,
        writer: api,
    })
}

fn build_model(config: &AppConfig) -> Result<Arc<GeminiClient>> {
    let client = GeminiClient::new(
        http_client()?,
        config.gemini.api_base.clone(),
        config.gemini.api_key.clone(),
        &config.gemini.model,
    );
    log::debug!("using model {}", client.model());
    Ok(Arc::new(client))
}

fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_default_env();
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    } else if std::env::var_os("RUST_LOG").is_none() {
        builder.filter_level(LevelFilter::Warn);
    }
    builder.init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = AppConfig::load(cli.config.as_deref())?;
    let backends = build_backends(&cli.source, &config)?;
    let fields = config.sheet.field_names();
    let queries = QueryService::new(backends.source.clone(), fields.clone());

    match cli.command {
        Commands::List { sort, desc, filter } => {
            // a second toggle on the same column flips it to descending
            let sort = sort.map(|column| {
                let spec = SortSpec::toggled(None, &column);
                if desc {
                    SortSpec::toggled(Some(&spec), &column)
                } else {
                    spec
                }
            });
            let query = RecordQuery {
                global_search: filter.unwrap_or_default(),
                sort,
            };
            let snapshot = queries.query(&query)?;
            if let Some(spec) = &query.sort {
                resolve(&spec.column, &snapshot.headers).map_err(PortError::from)?;
            }
            print!("{}", render_records(&snapshot.headers, &snapshot.records));
            println!("{} companies", snapshot.records.len());
            Ok(ExitCode::SUCCESS)
        }
        Commands::Summary { filter } => {
            let snapshot = filtered(&queries, filter)?;
            print!("{}", render_summary(&queries.summary(&snapshot)));
            Ok(ExitCode::SUCCESS)
        }
        Commands::Insights { filter } => {
            let snapshot = filtered(&queries, filter)?;
            let insights = InsightService::new(build_model(&config)?)
                .generate(&snapshot.headers, &snapshot.records)?;
            println!("{insights}");
            Ok(ExitCode::SUCCESS)
        }
        Commands::Clean {
            request,
            column,
            filter,
        } => {
            let snapshot = filtered(&queries, filter)?;
            let service = CleaningService::new(backends.writer, build_model(&config)?, fields);
            let mut observer = ProgressPrinter::new(std::io::stderr());
            let report = service.run(
                &snapshot.headers,
                &snapshot.records,
                &CleaningRequest::new(request, column),
                &mut observer,
            )?;
            print!("{}", render_report(&report));
            Ok(if report.aborted.is_some() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            })
        }
        Commands::Add { fields: pairs } => {
            let company = NewCompany::from_assignments(&pairs).map_err(|err| anyhow!(err))?;
            let snapshot = queries.load()?;
            let record = EditService::new(backends.writer, fields)
                .add_company(&snapshot.headers, company)?;
            let company = Company::new(&record, queries.fields());
            println!("added {} at row {}", company.name(), company.row());
            Ok(ExitCode::SUCCESS)
        }
        Commands::Set { row, column, value } => {
            if row < FIRST_DATA_ROW {
                return Err(anyhow!("row must be {FIRST_DATA_ROW} or greater, the header is row 1"));
            }
            let snapshot = queries.load()?;
            let edit = CellEdit {
                row: RowId(row),
                column,
                value,
            };
            let address = EditService::new(backends.writer, fields)
                .update_cell(&snapshot.headers, &edit)
                .with_context(|| format!("failed to update row {row}"))?;
            println!("updated {address}");
            Ok(ExitCode::SUCCESS)
        }
        Commands::Models => cmd_models(&config.gemini.model),
    }
}

fn filtered(queries: &QueryService, filter: Option<String>) -> Result<SheetSnapshot> {
    let query = RecordQuery {
        global_search: filter.unwrap_or_default(),
        sort: None,
    };
    Ok(queries.query(&query)?)
}

fn cmd_models(configured: &str) -> Result<ExitCode> {
    let active = if configured.trim().is_empty() {
        DEFAULT_MODEL
    } else {
        resolve_model(configured)
    };
    for model in SUPPORTED_MODELS {
        let marker = if model == active { "*" } else { " " };
        println!("{marker} {model}");
    }
    Ok(ExitCode::SUCCESS)
}

/// Prints one progress line per row and forwards everything to the log.
/// A broken output stream never stops the batch; the first failure is logged.
struct ProgressPrinter<W: Write> {
    out: W,
    log: LogObserver,
    write_failed: bool,
}

impl<W: Write> ProgressPrinter<W> {
    fn new(out: W) -> Self {
        Self {
            out,
            log: LogObserver,
            write_failed: false,
        }
    }

    fn print_line(&mut self, line: &str) {
        if let Err(err) = writeln!(self.out, "{line}") {
            if !self.write_failed {
                log::debug!("progress output failed: {err}");
                self.write_failed = true;
            }
        }
    }
}

impl<W: Write> BatchObserver for ProgressPrinter<W> {
    fn row_started(&mut self, index: usize, total: usize, record: &Record) {
        self.log.row_started(index, total, record);
    }

    fn row_finished(&mut self, result: &UpdateResult, progress: f64) {
        self.log.row_finished(result, progress);
        self.print_line(&format!("[{progress:>3.0}%] {}", describe_result(result)));
    }

    fn batch_aborted(&mut self, result: &UpdateResult, error: &PortError) {
        self.log.batch_aborted(result, error);
        self.print_line(&format!(
            "Batch stopped at row {} ({}): {error}",
            result.row, result.company
        ));
    }

    fn batch_finished(&mut self, summary: &BatchSummary) {
        self.log.batch_finished(summary);
        self.print_line(&describe_summary(summary));
    }
}

fn describe_result(result: &UpdateResult) -> String {
    match &result.error {
        Some(error) => format!("row {} {}: error: {error}", result.row, result.company),
        None if result.written => {
            format!("row {} {}: {}", result.row, result.company, result.value)
        }
        None => format!("row {} {}: no value found", result.row, result.company),
    }
}

fn describe_summary(summary: &BatchSummary) -> String {
    let mut line = format!(
        "{} of {} rows processed: {} succeeded, {} failed, {} cells written",
        summary.processed, summary.total, summary.succeeded, summary.failed, summary.written
    );
    if summary.aborted {
        line.push_str(" (aborted)");
    }
    line
}

fn truncate_cell(value: &str) -> String {
    if value.chars().count() <= MAX_CELL_WIDTH {
        return value.to_string();
    }
    let mut cut: String = value.chars().take(MAX_CELL_WIDTH - 1).collect();
    cut.push('…');
    cut
}

/// Left-aligned text table with a dashed rule under the header.
fn render_table(header: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = header.iter().map(|cell| cell.chars().count()).collect();
    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            let width = cell.chars().count();
            match widths.get_mut(idx) {
                Some(current) => *current = (*current).max(width),
                None => widths.push(width),
            }
        }
    }

    let line = |cells: &[String]| {
        let padded: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(idx, width)| {
                let cell = cells.get(idx).map(String::as_str).unwrap_or("");
                format!("{cell:<width$}")
            })
            .collect();
        format!("{}\n", padded.join("  ").trim_end())
    };

    let mut out = line(header);
    let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    out.push_str(&line(&rule));
    for row in rows {
        out.push_str(&line(row));
    }
    out
}

fn render_records(headers: &HeaderList, records: &[Record]) -> String {
    let named: Vec<&str> = headers.named_columns().map(|(_, name)| name).collect();
    let mut header = vec!["Row".to_string()];
    header.extend(named.iter().map(|name| truncate_cell(name)));
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|record| {
            let mut row = vec![record.row().to_string()];
            row.extend(named.iter().map(|name| truncate_cell(record.get(name))));
            row
        })
        .collect();
    render_table(&header, &rows)
}

fn render_summary(summary: &DashboardSummary) -> String {
    let mut out = format!("Total companies: {}\n\nEcosystem\n", summary.total);
    let categories: Vec<Vec<String>> = summary
        .by_category
        .iter()
        .map(|(category, count)| vec![category.clone(), count.to_string()])
        .collect();
    out.push_str(&render_table(
        &["Category".to_string(), "Companies".to_string()],
        &categories,
    ));

    out.push_str("\nEstimated annual revenue\n");
    let buckets: Vec<Vec<String>> = visible_buckets(&summary.by_revenue)
        .into_iter()
        .map(|(bucket, count)| vec![bucket.label().to_string(), count.to_string()])
        .collect();
    out.push_str(&render_table(
        &["Revenue".to_string(), "Companies".to_string()],
        &buckets,
    ));
    out
}

fn render_report(report: &BatchReport) -> String {
    let header = ["Row", "Company", "Status", "Value / Error"].map(String::from);
    let rows: Vec<Vec<String>> = report
        .results
        .iter()
        .map(|result| {
            let detail = result.error.as_deref().unwrap_or(result.value.as_str());
            vec![
                result.row.to_string(),
                truncate_cell(&result.company),
                result.status.as_str().to_string(),
                truncate_cell(detail),
            ]
        })
        .collect();
    let mut out = render_table(&header, &rows);
    if let Some(err) = &report.aborted {
        out.push_str(&format!(
            "\nThe batch was stopped: {err}\nFix the configuration and run it again.\n"
        ));
    }
    out
}
