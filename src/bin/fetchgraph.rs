use std::collections::BTreeSet;
use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use biodata_fetchgraph::app::App;
use biodata_fetchgraph::auth::{AllowAll, AuthorizationGate};
use biodata_fetchgraph::config::{ConfigLoader, ResolvedConfig};
use biodata_fetchgraph::domain::{ObjectId, Principal};
use biodata_fetchgraph::error::FetchGraphError;
use biodata_fetchgraph::fetch::{DataSetFetchOptions, DataSetRelation};
use biodata_fetchgraph::memory::{MemoryLoader, Snapshot};
use biodata_fetchgraph::output::{JsonOutput, OutputMode};

#[derive(Parser)]
#[command(name = "fetchgraph")]
#[command(about = "Translate data sets from a record snapshot into an authorized object graph")]
#[command(version, author)]
struct Cli {
    #[arg(long, global = true)]
    compact: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Data set operations")]
    DataSets(DataSetArgs),
}

#[derive(Args)]
struct DataSetArgs {
    #[command(subcommand)]
    command: DataSetCommand,
}

#[derive(Subcommand)]
enum DataSetCommand {
    #[command(about = "Translate data sets and print the reachable graph")]
    Translate(TranslateArgs),
    #[command(about = "List the relation names accepted by --with")]
    Relations,
}

#[derive(Args)]
struct TranslateArgs {
    #[arg(required = true)]
    ids: Vec<ObjectId>,

    #[arg(long)]
    config: Option<String>,

    #[arg(long)]
    snapshot: Option<Utf8PathBuf>,

    #[arg(long)]
    principal: Option<String>,

    #[arg(long, value_enum, value_delimiter = ',')]
    with: Vec<DataSetRelation>,

    #[arg(long)]
    allow_all: bool,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(error) = report.downcast_ref::<FetchGraphError>() {
            return ExitCode::from(map_exit_code(error));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &FetchGraphError) -> u8 {
    match error {
        FetchGraphError::MissingConfig
        | FetchGraphError::ConfigRead(_)
        | FetchGraphError::ConfigParse(_)
        | FetchGraphError::UnsupportedSchema(_)
        | FetchGraphError::SnapshotRead(_)
        | FetchGraphError::SnapshotParse(_)
        | FetchGraphError::InvalidObjectId(_)
        | FetchGraphError::InvalidRelation(_) => 2,
        FetchGraphError::Loader(_) | FetchGraphError::Gate(_) => 3,
        FetchGraphError::Mapping { .. }
        | FetchGraphError::DuplicateShell { .. }
        | FetchGraphError::MissingShell { .. }
        | FetchGraphError::UnfinishedShell { .. }
        | FetchGraphError::CacheType { .. } => 4,
        FetchGraphError::Filesystem(_) => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mode = if cli.compact {
        OutputMode::Compact
    } else {
        OutputMode::Pretty
    };

    match cli.command {
        Commands::DataSets(args) => match args.command {
            DataSetCommand::Translate(args) => run_translate(args, mode),
            DataSetCommand::Relations => JsonOutput::print_relations(mode).into_diagnostic(),
        },
    }
}

fn run_translate(args: TranslateArgs, mode: OutputMode) -> miette::Result<()> {
    let config = match ConfigLoader::resolve(args.config.as_deref()) {
        Ok(config) => Some(config),
        Err(FetchGraphError::MissingConfig) => None,
        Err(err) => return Err(err.into()),
    };

    let snapshot_path = args
        .snapshot
        .clone()
        .or_else(|| config.as_ref().and_then(|config| config.snapshot.clone()))
        .ok_or_else(|| {
            miette::Report::msg("no snapshot given (use --snapshot or fetchgraph.json)")
        })?;
    let snapshot = Snapshot::from_path(&snapshot_path)?;

    let principal = args
        .principal
        .clone()
        .map(Principal::new)
        .or_else(|| config.as_ref().map(|config| config.principal.clone()))
        .unwrap_or_default();
    let fetch = resolve_fetch(&args, config.as_ref());
    let ids = args.ids.iter().copied().collect::<BTreeSet<_>>();

    let grants = snapshot.grants.clone();
    let loader = MemoryLoader::new(snapshot);
    if args.allow_all {
        print_graph(App::new(loader, AllowAll), principal, &ids, &fetch, mode)
    } else {
        print_graph(App::new(loader, grants), principal, &ids, &fetch, mode)
    }
}

fn resolve_fetch(args: &TranslateArgs, config: Option<&ResolvedConfig>) -> DataSetFetchOptions {
    if !args.with.is_empty() {
        return DataSetFetchOptions::with_relations(&args.with);
    }
    config
        .map(|config| config.fetch.clone())
        .unwrap_or_default()
}

fn print_graph<G: AuthorizationGate>(
    app: App<MemoryLoader, G>,
    principal: Principal,
    ids: &BTreeSet<ObjectId>,
    fetch: &DataSetFetchOptions,
    mode: OutputMode,
) -> miette::Result<()> {
    let graph = app.data_set_graph(principal, ids, fetch)?;
    JsonOutput::print_graph(&graph, mode).into_diagnostic()
}
