use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Tony Kan, Ted Yu, William A. Goddard III, Victor Wai Tak Kam",
    version,
    about = "fepforge CLI - prepares stratified forward/backward NAMD free-energy perturbation inputs and merges their result streams.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Partition the lambda range and write per-process NAMD configurations plus a run script.
    Prepare(PrepareArgs),
    /// Concatenate per-process .fepout result streams into one stream per direction.
    Merge(MergeArgs),
}

/// Arguments for the `prepare` subcommand.
#[derive(Args, Debug)]
pub struct PrepareArgs {
    // --- Core Arguments ---
    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory the configurations and run script are written to.
    #[arg(short, long, default_value = ".", value_name = "DIR")]
    pub output_dir: PathBuf,

    /// Print the partition and schedules as TOML instead of writing files.
    #[arg(long)]
    pub dry_run: bool,

    // --- Template Overrides ---
    /// Override the forward template file.
    #[arg(long, value_name = "PATH")]
    pub forward_template: Option<PathBuf>,

    /// Override the backward template file.
    #[arg(long, value_name = "PATH")]
    pub backward_template: Option<PathBuf>,

    // --- Run Overrides ---
    /// Override the NAMD executable.
    #[arg(long, value_name = "PATH")]
    pub namd_binary: Option<PathBuf>,

    /// Override the number of parallel NAMD processes.
    #[arg(short = 'n', long, value_name = "INT")]
    pub num_processes: Option<usize>,

    /// Override the number of threads per NAMD process (+pN).
    #[arg(short = 't', long, value_name = "INT")]
    pub threads_per_process: Option<usize>,

    /// Override single-node GPU mode from the config file.
    #[command(flatten)]
    pub gpu: GpuMode,

    /// GPU device ids, one per process, e.g. '0-3' or '0,2,4,6'.
    #[arg(long, value_name = "LIST")]
    pub devices: Option<String>,

    // --- FEP Overrides ---
    /// Override the starting lambda.
    #[arg(long, value_name = "FLOAT", allow_hyphen_values = true)]
    pub lambda_start: Option<f64>,

    /// Override the ending lambda.
    #[arg(long, value_name = "FLOAT", allow_hyphen_values = true)]
    pub lambda_end: Option<f64>,

    /// Override the number of stratified windows.
    #[arg(short = 'w', long, value_name = "INT")]
    pub num_windows: Option<usize>,

    /// Override the total steps run in each window.
    #[arg(long, value_name = "INT")]
    pub steps_per_window: Option<u64>,

    /// Override the equilibration steps discarded at the start of each window.
    #[arg(long, value_name = "INT")]
    pub equilibration_steps: Option<u64>,

    /// Override the prefix for forward files.
    #[arg(long, value_name = "PREFIX")]
    pub forward_prefix: Option<String>,

    /// Override the prefix for backward files.
    #[arg(long, value_name = "PREFIX")]
    pub backward_prefix: Option<String>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S fep.num-windows=40
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// A group to handle mutually exclusive flags for single-node GPU mode.
#[derive(Args, Debug, Clone, Copy)]
#[group(required = false, multiple = false)]
pub struct GpuMode {
    /// Run every process on its own GPU of a single node.
    #[arg(long)]
    pub gpu: bool,
    /// Run on CPUs only.
    #[arg(long)]
    pub no_gpu: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeDirection {
    Forward,
    Backward,
    Both,
}

/// Arguments for the `merge` subcommand.
#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Path to the configuration file used for `prepare`.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Which direction(s) to merge.
    #[arg(short, long, value_enum, default_value_t = MergeDirection::Both)]
    pub direction: MergeDirection,

    /// Directory containing the per-process .fepout files.
    #[arg(short, long, default_value = ".", value_name = "DIR")]
    pub input_dir: PathBuf,

    /// Directory for the merged files (defaults to the input directory).
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Override the number of parallel processes that produced the results.
    #[arg(short = 'n', long, value_name = "INT")]
    pub num_processes: Option<usize>,

    /// Override the prefix of forward files.
    #[arg(long, value_name = "PREFIX")]
    pub forward_prefix: Option<String>,

    /// Override the prefix of backward files.
    #[arg(long, value_name = "PREFIX")]
    pub backward_prefix: Option<String>,
}
