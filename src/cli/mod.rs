pub mod reduce;
pub mod run;
pub mod scaffold;
pub mod schema;

use crate::config::ProviderKind;
use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "prism")]
#[command(
    author,
    version,
    about = "Spectrum-spread perspective generation and stratified reduction"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose/debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate the full perspective set for a statement
    Run(RunArgs),

    /// Reduce a run output to leftist/common/rightist subsets
    Reduce(ReduceArgs),

    /// Show the bias scaffold for a significance or count
    Scaffold(ScaffoldArgs),

    /// Print JSON Schema for config validation
    Schema,
}

#[derive(Parser, Clone)]
pub struct RunArgs {
    /// Path to config file
    #[arg(short, long, default_value = "prism.yaml")]
    pub config: PathBuf,

    /// Override run input file
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Override output file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Override the HTTP generation endpoint
    #[arg(long, env = "PRISM_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Override the model for the selected provider
    #[arg(long)]
    pub model: Option<String>,

    /// Override band generation temperature
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Override provider (http, claude_cli)
    #[arg(long)]
    pub provider: Option<ProviderKind>,

    /// Print each completed band as a JSON line on stdout
    #[arg(long)]
    pub stream: bool,

    /// Also write the stratified subsets after generation
    #[arg(long)]
    pub reduce: bool,

    /// Write a markdown run report to this path
    #[arg(long)]
    pub report: Option<PathBuf>,
}

#[derive(Parser, Clone)]
pub struct ReduceArgs {
    /// Path to config file
    #[arg(short, long, default_value = "prism.yaml")]
    pub config: PathBuf,

    /// Run output to reduce (default: configured output)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Directory for leftist.json, common.json and rightist.json
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
}

#[derive(Parser, Clone)]
#[command(group(ArgGroup::new("size").required(true).args(["significance", "count"])))]
pub struct ScaffoldArgs {
    /// Derive the count from a significance score in [0, 1]
    #[arg(short, long)]
    pub significance: Option<f64>,

    /// Use an explicit perspective count
    #[arg(short = 'n', long)]
    pub count: Option<usize>,

    /// Print slots as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}
