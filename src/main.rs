use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value as JsonValue;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tabrec_chat::{ChatResponse, Session};
use tabrec_core::Dataset;
use tabrec_similarity::{EngineConfig, RecommendationResult, SimilarResponse, Weights};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Hybrid recommendations over a tabular dataset
#[derive(Parser, Debug)]
#[command(name = "tabrec")]
#[command(about = "Recommend similar rows from a table", long_about = None)]
struct Args {
    /// Dataset file: CSV with a header row (.csv), otherwise a JSON array of row objects
    #[arg(short, long)]
    data: PathBuf,

    /// Column whose values name each row
    #[arg(long)]
    id_column: Option<String>,

    /// Text column fed to TF-IDF (repeatable)
    #[arg(long = "text-column")]
    text_columns: Vec<String>,

    /// Numeric column to standardize (repeatable)
    #[arg(long = "numeric-column")]
    numeric_columns: Vec<String>,

    /// Number of recommendations
    #[arg(long, default_value_t = 5)]
    top_n: usize,

    /// Text similarity weight
    #[arg(long)]
    w_text: Option<f32>,

    /// Numeric similarity weight
    #[arg(long)]
    w_num: Option<f32>,

    /// Cluster co-membership weight
    #[arg(long)]
    w_cluster: Option<f32>,

    /// Engine configuration JSON file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format for recommendation tables
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    Json,
    Csv,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the dataset shape and column types
    Info,
    /// Recommend rows similar to a named seed
    Recommend {
        seed: String,
        /// Include the per-signal score breakdown
        #[arg(long)]
        explain: bool,
    },
    /// Detect a title in a free-text message and recommend
    Ask { query: String },
    /// Interactive loop on stdin; an empty line or "more" repeats the last title
    Chat,
}

impl Args {
    fn weights(&self) -> Weights {
        let mut weights = Weights::default();
        if let Some(w) = self.w_text {
            weights.text = w;
        }
        if let Some(w) = self.w_num {
            weights.num = w;
        }
        if let Some(w) = self.w_cluster {
            weights.cluster = w;
        }
        weights
    }

    fn engine_config(&self) -> anyhow::Result<EngineConfig> {
        match &self.config {
            Some(path) => EngineConfig::from_json_file(path)
                .with_context(|| format!("loading engine config from {:?}", path)),
            None => Ok(EngineConfig::default()),
        }
    }

    fn build_session(&self, dataset: Dataset) -> anyhow::Result<Session> {
        let Some(id_column) = self.id_column.as_deref() else {
            bail!("--id-column is required for this command");
        };
        if self.text_columns.is_empty() && self.numeric_columns.is_empty() {
            warn!("No text or numeric columns given; only cluster co-membership will score");
        }
        if self.top_n == 0 {
            bail!("--top-n must be positive");
        }
        let session = Session::new(dataset, self.engine_config()?)?;
        session.build(id_column, &self.text_columns, &self.numeric_columns)?;
        Ok(session)
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting tabrec v{}", env!("CARGO_PKG_VERSION"));
    let dataset = load_dataset(&args.data)
        .with_context(|| format!("reading dataset {:?}", args.data))?;
    info!("Loaded {} rows from {:?}", dataset.len(), args.data);

    match &args.command {
        Command::Info => print_json(&serde_json::to_value(dataset.info())?),
        Command::Recommend { seed, explain } => {
            let session = args.build_session(dataset)?;
            let model = session.model()?;
            let result = model.recommend_by_identifier(seed, args.top_n, &args.weights())?;
            let columns = model.dataset().columns().to_vec();
            if *explain {
                if args.format == OutputFormat::Csv {
                    warn!("--explain output is JSON only");
                }
                let response = SimilarResponse::from_result(&result, model.id_column(), &columns, true);
                print_json(&serde_json::to_value(response)?)
            } else {
                print_result(args.format, &result, &columns)
            }
        }
        Command::Ask { query } => {
            let session = args.build_session(dataset)?;
            let response = session.ask(query, args.top_n, &args.weights())?;
            print_response(&session, &response, args.format)
        }
        Command::Chat => {
            let session = args.build_session(dataset)?;
            chat_loop(&session, args.top_n, &args.weights(), args.format)
        }
    }
}

fn load_dataset(path: &Path) -> tabrec_core::Result<Dataset> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if is_csv {
        Dataset::from_csv_path(path)
    } else {
        Dataset::from_json_file(path)
    }
}

fn chat_loop(session: &Session, top_n: usize, weights: &Weights, format: OutputFormat) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    write!(stdout, "> ")?;
    stdout.flush()?;

    for line in stdin.lock().lines() {
        let line = line?;
        let query = line.trim();
        if matches!(query, "quit" | "exit") {
            break;
        }
        let response = if query.is_empty() || query.eq_ignore_ascii_case("more") {
            session.ask_followup(query, top_n, weights)?
        } else {
            session.ask(query, top_n, weights)?
        };
        print_response(session, &response, format)?;
        write!(stdout, "> ")?;
        stdout.flush()?;
    }
    info!("Chat ended after {} turns", session.history().len());
    Ok(())
}

fn print_response(session: &Session, response: &ChatResponse, format: OutputFormat) -> anyhow::Result<()> {
    let columns = session.dataset().columns().to_vec();
    match response.result() {
        Some(result) if format == OutputFormat::Csv => print_result(format, result, &columns),
        _ => print_json(&response.to_json(&columns)),
    }
}

fn print_result(format: OutputFormat, result: &RecommendationResult, columns: &[String]) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => print_json(&JsonValue::Array(result.to_records(columns))),
        OutputFormat::Csv => Ok(result.write_csv(io::stdout().lock(), columns)?),
    }
}

fn print_json(value: &JsonValue) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
