use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;
use workflow_autofix::engine::fallback_report;
use workflow_autofix::prelude::*;
use workflow_autofix::RunRecord;

#[derive(Parser)]
#[command(name = "workflow-autofix")]
#[command(about = "Fetch, summarize, and repair failing GitHub Actions workflows", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to an autofix.yaml config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Download run, job, and step logs into a JSON snapshot
    FetchLogs {
        /// Workflow run ID
        #[arg(long)]
        run_id: u64,

        /// GitHub token
        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
        token: String,

        /// Where to write the snapshot
        #[arg(long, value_name = "PATH")]
        output: PathBuf,

        /// Repository as owner/name
        #[arg(long, env = "GITHUB_REPOSITORY")]
        repo: String,
    },

    /// Render a snapshot as a Markdown report
    Summarize {
        /// Snapshot written by fetch-logs
        #[arg(long, value_name = "PATH")]
        logs: PathBuf,

        /// Where to write the report
        #[arg(long, value_name = "PATH")]
        output: PathBuf,
    },

    /// Print the next fix attempt number
    NextAttempt {
        /// Repository as owner/name
        #[arg(long, env = "GITHUB_REPOSITORY")]
        repo: Option<String>,
    },

    /// Propose, commit, and push a fix for a workflow file
    Fix {
        /// Workflow file to repair
        #[arg(long, value_name = "PATH")]
        workflow_file: PathBuf,

        /// Snapshot written by fetch-logs
        #[arg(long, value_name = "PATH")]
        logs: PathBuf,

        /// Highest attempt number allowed to run
        #[arg(long)]
        max_retries: u32,

        /// Model name for the chat-completions request
        #[arg(long)]
        openai_model: String,

        /// Branch to push to
        #[arg(long)]
        branch: String,

        /// This attempt's number
        #[arg(long)]
        attempt: u32,
    },
}

fn tracing_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("workflow_autofix=debug")
    } else {
        EnvFilter::new("workflow_autofix=info")
    }
}

#[cfg(feature = "otel")]
fn init_otel_tracing(verbose: bool) -> anyhow::Result<()> {
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry_otlp::WithExportConfig;
    use opentelemetry_sdk::runtime::Tokio;
    use opentelemetry_sdk::trace::TracerProvider;

    let otlp_endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
        .unwrap_or_else(|_| "http://localhost:4317".to_string());

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&otlp_endpoint)
        .build()
        .context("Failed to create OTLP exporter")?;

    let provider = TracerProvider::builder()
        .with_batch_exporter(exporter, Tokio)
        .build();

    let tracer = provider.tracer("workflow-autofix");
    let otel_layer = tracing_opentelemetry::layer().with_tracer(tracer);

    tracing_subscriber::registry()
        .with(tracing_filter(verbose))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(otel_layer)
        .init();

    opentelemetry::global::set_tracer_provider(provider);
    Ok(())
}

fn init_tracing(verbose: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_filter(verbose))
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help and version go to stdout and are not failures.
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            return ExitCode::from(code);
        }
    };

    #[cfg(feature = "otel")]
    if let Err(e) = init_otel_tracing(cli.verbose) {
        eprintln!("{:#}, continuing without OpenTelemetry", e);
        init_tracing(cli.verbose);
    }

    #[cfg(not(feature = "otel"))]
    init_tracing(cli.verbose);

    let result = run(cli).await;

    #[cfg(feature = "otel")]
    opentelemetry::global::shutdown_tracer_provider();

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            error!(error = %format!("{:#}", e), "Command failed");
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<bool> {
    let config = match AutofixConfig::load_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) if matches!(cli.command, Commands::NextAttempt { .. }) => {
            warn!(error = %e, "Ignoring unreadable config");
            AutofixConfig::default()
        }
        Err(e) => return Err(e.into()),
    };

    match cli.command {
        Commands::FetchLogs {
            run_id,
            token,
            output,
            repo,
        } => fetch_logs(&config, run_id, token, &output, &repo).await,
        Commands::Summarize { logs, output } => summarize(&config, &logs, &output),
        Commands::NextAttempt { repo } => {
            let attempt = next_attempt(&config, repo.as_deref()).await;
            println!("{}", attempt);
            Ok(true)
        }
        Commands::Fix {
            workflow_file,
            logs,
            max_retries,
            openai_model,
            branch,
            attempt,
        } => {
            let request = RepairRequest {
                workflow_file,
                logs_file: logs,
                max_retries,
                attempt,
                branch,
                model: openai_model,
            };
            fix(&config, &request).await
        }
    }
}

async fn fetch_logs(
    config: &AutofixConfig,
    run_id: u64,
    token: String,
    output: &Path,
    repo: &str,
) -> anyhow::Result<bool> {
    let client = match GitHubClient::new(&config.github, repo, token) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Error downloading logs");
            SnapshotLoader::write_file(output, &RunRecord::error_snapshot(run_id, e.to_string()))
                .with_context(|| format!("Failed to write {}", output.display()))?;
            return Ok(false);
        }
    };

    let fetcher = LogFetcher::new(&client).with_log_cap(config.limits.fetch_log_chars);
    Ok(fetcher.fetch_to_file(run_id, output).await)
}

fn summarize(config: &AutofixConfig, logs: &Path, output: &Path) -> anyhow::Result<bool> {
    let renderer = SummaryRenderer::new().with_log_cap(config.limits.summary_log_chars);

    let (report, success) = match renderer.render_file(logs, Utc::now()) {
        Ok(report) => (report, true),
        Err(e) => {
            error!(error = %e, "Error creating summary");
            (fallback_report(&e), false)
        }
    };

    fs::write(output, report).with_context(|| format!("Failed to write {}", output.display()))?;
    if success {
        info!(path = %output.display(), "Summary written");
    }
    Ok(success)
}

async fn next_attempt(config: &AutofixConfig, repo: Option<&str>) -> u32 {
    let Some(repo) = repo else {
        warn!("No repository given, starting at attempt 1");
        return 1;
    };

    let client = match GitHubClient::from_env(&config.github, repo) {
        Ok(client) => client,
        Err(e) => {
            warn!(error = %e, "Could not create GitHub client, starting at attempt 1");
            return 1;
        }
    };

    AttemptCounter::new(&client)
        .with_max_pages(config.github.max_pages)
        .next_attempt()
        .await
}

async fn fix(config: &AutofixConfig, request: &RepairRequest) -> anyhow::Result<bool> {
    let inference = OpenAiClient::new(&config.inference)?;
    let git = GitCli::new(&config.git);

    let outcome = RepairEngine::new(&inference, &git)
        .with_settings(config.inference.clone())
        .run(request)
        .await?;

    match outcome {
        RepairOutcome::Committed { .. } => {
            println!("Successfully applied fixes");
            Ok(true)
        }
        RepairOutcome::CeilingReached { .. } => Ok(false),
    }
}
