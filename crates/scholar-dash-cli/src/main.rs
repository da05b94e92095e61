use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use scholar_dash_core::config_file::{self, BackendConfig, ConfigFile};
use scholar_dash_core::controller::{
    CitationsController, ClustersController, CompareController, PapersController,
    SummarizeController, UploadController,
};
use scholar_dash_core::{AnalysisClient, Config, OperationError, PdfFile, ViewState};
use tracing_subscriber::EnvFilter;

mod output;

use output::ColorMode;

/// Research paper dashboard - upload, summarize and analyse papers from the terminal
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Analysis backend base URL (overrides SCHOLAR_DASH_API_URL and config files)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload a PDF for indexing
    Upload {
        /// Path to the PDF
        path: PathBuf,
    },

    /// Ask a question over the uploaded papers
    Summarize {
        /// Question or topic; multiple words are joined with spaces
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },

    /// Extract citations from text and highlight them
    Citations {
        /// Text to analyse
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        text: Option<String>,

        /// Read the text to analyse from a file
        #[arg(long)]
        file: Option<PathBuf>,

        /// Only list the citations, without the highlighted text
        #[arg(long)]
        no_highlight: bool,
    },

    /// Score the similarity of a generated summary to its original
    Compare {
        /// Original text
        #[arg(
            long,
            conflicts_with = "original_file",
            required_unless_present = "original_file"
        )]
        original: Option<String>,

        /// Read the original text from a file
        #[arg(long)]
        original_file: Option<PathBuf>,

        /// Generated text
        #[arg(
            long,
            conflicts_with = "generated_file",
            required_unless_present = "generated_file"
        )]
        generated: Option<String>,

        /// Read the generated text from a file
        #[arg(long)]
        generated_file: Option<PathBuf>,
    },

    /// List uploaded papers
    Papers,

    /// Delete uploaded papers
    Delete {
        /// Filenames as shown by `papers`
        #[arg(required = true)]
        filenames: Vec<String>,
    },

    /// Show topic clusters across all uploaded papers
    Cluster,

    /// Inspect or change persistent settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the resolved configuration
    Show,
    /// Persist the backend base URL to the user config file
    SetUrl {
        /// Base URL, e.g. https://example.org
        url: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    tokio::select! {
        result = run(cli) => result,
        _ = tokio::signal::ctrl_c() => anyhow::bail!("Interrupted"),
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let file_config = config_file::load_config();
    let color = ColorMode(!cli.no_color && file_config.color_enabled());
    let config = Config::resolve(
        cli.api_url,
        std::env::var(scholar_dash_core::BASE_URL_ENV).ok(),
        &file_config,
    );

    match cli.command {
        Command::Config { action } => match action {
            ConfigAction::Show => {
                let path = config_file::config_path();
                output::print_config(&mut std::io::stdout(), &config, path.as_deref(), color)?;
                Ok(())
            }
            ConfigAction::SetUrl { url } => set_url(&url),
        },
        Command::Upload { path } => upload(connect(&config)?, &path, color).await,
        Command::Summarize { query } => {
            summarize(connect(&config)?, &query.join(" "), color).await
        }
        Command::Citations {
            text,
            file,
            no_highlight,
        } => {
            let text = text_input(text, file.as_deref())?;
            citations(connect(&config)?, &text, !no_highlight, color).await
        }
        Command::Compare {
            original,
            original_file,
            generated,
            generated_file,
        } => {
            let original = text_input(original, original_file.as_deref())?;
            let generated = text_input(generated, generated_file.as_deref())?;
            compare(connect(&config)?, &original, &generated, color).await
        }
        Command::Papers => papers(connect(&config)?, color).await,
        Command::Delete { filenames } => delete(connect(&config)?, &filenames, color).await,
        Command::Cluster => cluster(connect(&config)?, color).await,
    }
}

fn connect(config: &Config) -> anyhow::Result<Arc<AnalysisClient>> {
    let client = AnalysisClient::new(config)?;
    tracing::debug!(base_url = client.base_url(), "using analysis backend");
    Ok(Arc::new(client))
}

/// Inline text wins; otherwise read `file`.
fn text_input(inline: Option<String>, file: Option<&Path>) -> anyhow::Result<String> {
    match (inline, file) {
        (Some(text), _) => Ok(text),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        (None, None) => anyhow::bail!("No input text given"),
    }
}

fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

/// Print the success notice, or turn the failure notice into the process error.
fn conclude<T, R>(
    outcome: Result<R, OperationError>,
    state: &ViewState<T>,
    color: ColorMode,
) -> anyhow::Result<R> {
    match outcome {
        Ok(value) => {
            if let Some(notice) = &state.notice {
                output::print_notice(&mut std::io::stdout(), notice, color)?;
            }
            Ok(value)
        }
        Err(err) => match &state.notice {
            Some(notice) => anyhow::bail!("{}: {}", notice.title, notice.description),
            None => Err(err.into()),
        },
    }
}

async fn upload(client: Arc<AnalysisClient>, path: &Path, color: ColorMode) -> anyhow::Result<()> {
    let file =
        PdfFile::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let ctl = UploadController::new(client);

    let mut out = std::io::stdout();
    output::print_selected_file(&mut out, &file, color)?;
    if let Err(err) = ctl.select_file(file) {
        return conclude(Err::<(), _>(err), &ctl.state(), color);
    }

    let bar = spinner("Uploading and indexing...");
    let outcome = ctl.upload().await;
    bar.finish_and_clear();

    let result = conclude(outcome, &ctl.state(), color)?;
    output::print_upload(&mut out, &result, color)?;
    Ok(())
}

async fn summarize(
    client: Arc<AnalysisClient>,
    query: &str,
    color: ColorMode,
) -> anyhow::Result<()> {
    let ctl = SummarizeController::new(client);

    let bar = spinner("Summarizing...");
    let outcome = ctl.summarize(query).await;
    bar.finish_and_clear();

    let result = conclude(outcome, &ctl.state(), color)?;
    output::print_summary(&mut std::io::stdout(), &result, color)?;
    Ok(())
}

async fn citations(
    client: Arc<AnalysisClient>,
    text: &str,
    highlight: bool,
    color: ColorMode,
) -> anyhow::Result<()> {
    let ctl = CitationsController::new(client);

    let bar = spinner("Extracting citations...");
    let outcome = ctl.extract(text).await;
    bar.finish_and_clear();

    let report = conclude(outcome, &ctl.state(), color)?;
    output::print_citations(&mut std::io::stdout(), &report, highlight, color)?;
    Ok(())
}

async fn compare(
    client: Arc<AnalysisClient>,
    original: &str,
    generated: &str,
    color: ColorMode,
) -> anyhow::Result<()> {
    let ctl = CompareController::new(client);

    let bar = spinner("Comparing...");
    let outcome = ctl.compare(original, generated).await;
    bar.finish_and_clear();

    let score = conclude(outcome, &ctl.state(), color)?;
    output::print_similarity(&mut std::io::stdout(), score, color)?;
    Ok(())
}

async fn papers(client: Arc<AnalysisClient>, color: ColorMode) -> anyhow::Result<()> {
    let ctl = PapersController::new(client);

    let bar = spinner("Loading papers...");
    ctl.activate().await;
    bar.finish_and_clear();

    let state = ctl.state();
    if let Some(err) = &state.list.error {
        return conclude(Err::<(), _>(err.clone()), &state.list, color);
    }
    output::print_papers(&mut std::io::stdout(), state.papers(), color)?;
    Ok(())
}

/// Delete every named file concurrently, then report each result.
async fn delete(
    client: Arc<AnalysisClient>,
    filenames: &[String],
    color: ColorMode,
) -> anyhow::Result<()> {
    let ctl = PapersController::new(client);

    let bar = spinner(&format!("Deleting {} file(s)...", filenames.len()));
    let outcomes =
        futures_util::future::join_all(filenames.iter().map(|name| ctl.delete(name))).await;
    bar.finish_and_clear();

    let mut out = std::io::stdout();
    let mut failed = 0;
    for (name, outcome) in filenames.iter().zip(&outcomes) {
        output::print_delete_outcome(&mut out, name, outcome, color)?;
        if outcome.is_err() {
            failed += 1;
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} deletions failed", failed, filenames.len());
    }
    Ok(())
}

async fn cluster(client: Arc<AnalysisClient>, color: ColorMode) -> anyhow::Result<()> {
    let ctl = ClustersController::new(client);

    let bar = spinner("Clustering papers...");
    ctl.activate().await;
    bar.finish_and_clear();

    let state = ctl.state();
    if let Some(err) = &state.error {
        return conclude(Err::<(), _>(err.clone()), &state, color);
    }
    let clusters = state.result.unwrap_or_default();
    output::print_clusters(&mut std::io::stdout(), &clusters, color)?;
    Ok(())
}

fn set_url(url: &str) -> anyhow::Result<()> {
    let config = Config {
        base_url: url.trim().to_string(),
    };
    // Validate before persisting.
    AnalysisClient::new(&config)?;

    let mut file = config_file::config_path()
        .and_then(|p| config_file::load_from_path(&p))
        .unwrap_or_default();
    file.backend = Some(BackendConfig {
        base_url: Some(config.base_url.clone()),
    });
    let path = save_file(&file)?;
    println!("Saved backend URL {} to {}", config.base_url, path.display());
    Ok(())
}

fn save_file(file: &ConfigFile) -> anyhow::Result<PathBuf> {
    config_file::save_config(file).map_err(|e| anyhow::anyhow!(e))
}
