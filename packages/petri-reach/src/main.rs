use std::{fmt::Display, path::Path, str::FromStr};

use anyhow::Context;
use clap::Parser;
use petri_reach_lib::{
    analysis::SerializableAnalysisResult,
    config::AnalysisConfig,
    logger::{LogLevel, Logger},
    net::{PetriNet, ids::TransitionId, initialized::InitializedNet, model::NetModel},
    report::AnalysisReport,
};
use serde::Serialize;

/// How results are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Table,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Invalid output format: {}", s)),
        }
    }
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "Petri Net Boundedness Tool")]
#[command(version = "0.1")]
#[command(
    about = "Build reachability graphs of Petri nets and decide boundedness",
    long_about = None
)]
struct Args {
    /// Nets to analyse (.pnml, .spec or .json).
    #[arg(required = true)]
    files: Vec<String>,

    #[arg(short, long)]
    config: Option<String>,

    #[arg(short, long, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Write the reachability graph of the first net as DOT to this file.
    #[arg(short, long)]
    dot: Option<String>,

    /// Transitions (names or indices) to fire on the first net before the
    /// analysis.
    #[arg(long, value_delimiter = ',')]
    fire: Vec<String>,
}

#[derive(Debug, Serialize)]
struct FileResult {
    file: String,
    #[serde(flatten)]
    result: SerializableAnalysisResult,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = AnalysisConfig::from_optional_file(args.config.as_deref())?;
    let logger_config = config.get_logger();
    if *logger_config.get_enabled() {
        tracing_subscriber::fmt()
            .with_max_level(logger_config.get_log_level().to_tracing())
            .with_writer(std::io::stderr)
            .init();
    }
    let logger = Logger::from_config(logger_config, "petri-reach".into())?;

    let mut report = AnalysisReport::new();
    let mut json_results = vec![];

    for (i, file) in args.files.iter().enumerate() {
        let net = InitializedNet::from_file(file)?;
        let file_name = Path::new(file)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.clone());

        log(
            logger.as_ref(),
            LogLevel::Info,
            &format!(
                "Loaded {}: {} places, {} transitions",
                file_name,
                net.net.place_count(),
                net.net.transition_count()
            ),
        );

        let mut model = NetModel::new();
        model.load_net(net);
        model.set_cap(*config.get_cap());

        if i == 0 && !args.fire.is_empty() {
            play(&mut model, &args.fire, logger.as_ref());
        }

        tracing::debug!("analysing {} with cap {}", file_name, config.get_cap());
        let Some(result) = model.analyse(&config) else {
            continue;
        };

        if let Some(logger) = &logger {
            let mut record = logger
                .object("AnalysisResult")
                .add_field("file", &file_name)
                .add_field("bounded", result.is_bounded())
                .add_field("nodes", result.node_count())
                .add_field("edges", result.edge_count())
                .add_field("time", format!("{:?}", result.statistics.time));
            if let Some(witness) = result.witness() {
                record = record
                    .add_field("dominated", &witness.dominated)
                    .add_field("dominating", &witness.dominating);
            }
            record.log(LogLevel::Info);
        }

        if i == 0
            && let Some(dot_path) = &args.dot
            && let Some(net) = model.net()
        {
            std::fs::write(dot_path, result.to_graphviz(net))
                .with_context(|| format!("failed to write DOT file {}", dot_path))?;
        }

        report.add(file_name.clone(), &result);
        json_results.push(FileResult {
            file: file_name,
            result: SerializableAnalysisResult::from(&result),
        });
    }

    match args.format {
        OutputFormat::Table => print!("{}", report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&json_results)?),
    }

    Ok(())
}

fn log(logger: Option<&Logger>, level: LogLevel, message: &str) {
    if let Some(logger) = logger {
        logger.log(level, message);
    }
}

fn resolve_transition(net: &PetriNet, token: &str) -> Option<TransitionId> {
    net.transition_by_name(token).or_else(|| {
        token
            .parse::<usize>()
            .ok()
            .map(TransitionId::new)
            .filter(|id| id.index() < net.transition_count())
    })
}

/// Fires the given transitions one after another on the live marking.
fn play(model: &mut NetModel, transitions: &[String], logger: Option<&Logger>) {
    for token in transitions {
        let Some(transition) = model.net().and_then(|net| resolve_transition(net, token)) else {
            log(
                logger,
                LogLevel::Warn,
                &format!("Unknown transition '{}'", token),
            );
            continue;
        };

        if model.fire(transition) {
            if let Some(marking) = model.snapshot() {
                log(
                    logger,
                    LogLevel::Info,
                    &format!("Fired {} -> {}", token, marking),
                );
            }
        } else {
            log(
                logger,
                LogLevel::Warn,
                &format!("Transition {} is not enabled", token),
            );
        }
    }

    if let Some(marking) = model.snapshot() {
        println!("marking after firing: {}", marking);
    }
}
