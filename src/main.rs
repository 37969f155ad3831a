use anyhow::{anyhow, Context, Result};
use byte_unit::{Byte, UnitType};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod enrich;
mod error;
mod hash;
mod narinfo;
mod prune;
mod util;
use enrich::Enricher;
use prune::PathInfo;
use util::{now_epoch_secs, read_input, write_output};

const LOG_ENV: &str = "NARINFO_REGISTRATION_LOG";

#[derive(Parser, Debug)]
#[command(
    name = "narinfo-registration",
    version,
    about = "Binary-cache path info enrichment and pruning"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Add registrationTime and path from <hash>.narinfo files to path info
    Enrich(EnrichArgs),
    /// List narinfo files and NARs not reachable from recently registered paths
    Prune(PruneArgs),
}

#[derive(Parser, Debug)]
struct EnrichArgs {
    /// Directory holding the <hash>.narinfo descriptors
    #[arg(long, value_name = "DIR", default_value = ".")]
    narinfo_dir: PathBuf,

    /// JSON object of identifier -> path info (defaults to stdin)
    #[arg(long, value_name = "PATH")]
    input: Option<PathBuf>,

    /// Output path for the enriched JSON array (defaults to stdout)
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Pretty-print the output array
    #[arg(long)]
    pretty: bool,
}

#[derive(Parser, Debug)]
struct PruneArgs {
    /// Keep paths registered within this many days, plus their closures
    #[arg(long, allow_negative_numbers = true)]
    days: Option<i64>,

    /// JSON array of enriched path info (defaults to stdin)
    #[arg(long, value_name = "PATH")]
    input: Option<PathBuf>,

    /// Output path for the deletion list (defaults to stdout)
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Enrich(args) => cmd_enrich(args),
        Commands::Prune(args) => cmd_prune(args),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn cmd_enrich(args: EnrichArgs) -> Result<()> {
    let content = read_input(args.input.as_deref())?;
    let document = match serde_json::from_str::<Value>(&content).context("parse input JSON")? {
        Value::Object(document) => document,
        _ => return Err(anyhow!("input must be a JSON object of path info")),
    };
    let entries = document.len();

    let enricher = Enricher::new(args.narinfo_dir);
    tracing::info!(
        entries,
        narinfo_dir = %enricher.base_dir().display(),
        "enriching path info"
    );
    let enriched = enricher.enrich_document(document)?;

    let serialized = if args.pretty {
        serde_json::to_vec_pretty(&enriched)
    } else {
        serde_json::to_vec(&enriched)
    };
    let mut json = serialized.context("serialize enriched path info")?;
    json.push(b'\n');
    write_output(args.output.as_deref(), &json)?;
    tracing::info!(entries = enriched.len(), "wrote enriched path info");
    Ok(())
}

fn cmd_prune(args: PruneArgs) -> Result<()> {
    let content = read_input(args.input.as_deref())?;
    let infos: Vec<PathInfo> =
        serde_json::from_str(&content).context("parse enriched path info")?;
    tracing::info!(paths = infos.len(), "parsed path info");

    let days = prune::retention_days(args.days);
    let cutoff = prune::cutoff_timestamp(now_epoch_secs(), days);
    let plan = prune::plan(&infos, cutoff);

    tracing::info!(
        "Will delete {}/{} paths and {}/{} nar files, totalling {}.",
        plan.paths.len(),
        plan.total_paths,
        plan.nars.len(),
        plan.total_nars,
        format_nar_total(plan.nar_bytes()),
    );

    write_output(args.output.as_deref(), plan.render_lines().as_bytes())
}

/// Human-readable NAR total with binary units, e.g. `1.50 KiB`.
fn format_nar_total(bytes: u64) -> String {
    let adjusted = Byte::from_u64(bytes).get_appropriate_unit(UnitType::Binary);
    format!("{adjusted:.2}")
}
