use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use stackgen::paths::ENV_CONFIG;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "stackgen")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Synthesize the products API stack to CloudFormation", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Stack config file (defaults to ./stack.toml, then the user config dir)
    #[arg(short, long, global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Write the cloud assembly (manifest, template, asset manifest)
    Synth(SynthArgs),

    /// Compare against a previously synthesized template
    Diff(DiffArgs),

    /// Show resources in creation order with their dependencies
    Graph(GraphArgs),

    /// List API routes and table grants
    Routes,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser)]
pub struct SynthArgs {
    /// Output directory for the cloud assembly
    #[arg(short, long, default_value = "cdk.out")]
    pub out: PathBuf,

    /// Overwrite existing files without asking
    #[arg(short, long)]
    pub force: bool,

    /// Print the template to stdout instead of writing files
    #[arg(long, conflicts_with_all = ["out", "force"])]
    pub stdout: bool,
}

#[derive(Parser)]
pub struct DiffArgs {
    /// Previously synthesized template (defaults to <out>/<stack>.template.json)
    pub template: Option<PathBuf>,

    /// Assembly directory to look in when no template is given
    #[arg(short, long, default_value = "cdk.out")]
    pub out: PathBuf,

    /// Show property-level text diffs
    #[arg(short, long)]
    pub detail: bool,

    /// Exit with status 1 when there are changes
    #[arg(long)]
    pub fail: bool,
}

#[derive(Parser)]
pub struct GraphArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: GraphFormat,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum GraphFormat {
    /// Human-readable listing
    Text,
    /// JSON with nodes, dependencies and edges
    Json,
}
