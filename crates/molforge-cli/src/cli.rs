use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "MolForge Contributors",
    version,
    about = "MolForge CLI - Validate molecular structures against a bonding rule model and place new atoms with collision-aware geometry.",
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

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,

    #[command(flatten)]
    pub engine: EngineArgs,
}

/// Engine configuration shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct EngineArgs {
    /// Path to an engine configuration file in TOML format.
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the spatial hash cell size in Angstroms.
    #[arg(long, global = true, value_name = "FLOAT")]
    pub cell_size: Option<f64>,

    /// Use randomized candidate directions with this seed for reproducible placement.
    #[arg(long, global = true, value_name = "INT")]
    pub seed: Option<u64>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S placement.candidate-count=64
    #[arg(short = 'S', long = "set", global = true, value_name = "KEY=VALUE")]
    pub set_values: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check a structure against the valency, octet and bond-pattern rules.
    Validate(ValidateArgs),
    /// Add the missing hydrogens of every under-bonded atom.
    Complete(CompleteArgs),
    /// List all atom pairs within a distance cutoff.
    Pairs(PairsArgs),
    /// Suggest a position for a new atom bonded to an existing one.
    Place(PlaceArgs),
    /// Print the molecular formula and weight of a structure.
    Formula(FormulaArgs),
}

/// Arguments for the `validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the input molecule file (JSON).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Print the full validation result as JSON instead of a report.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `complete` subcommand.
#[derive(Args, Debug)]
pub struct CompleteArgs {
    /// Path to the input molecule file (JSON).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the completed molecule. Defaults to standard output.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Arguments for the `pairs` subcommand.
#[derive(Args, Debug)]
pub struct PairsArgs {
    /// Path to the input molecule file (JSON).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Maximum pair distance in Angstroms.
    #[arg(short = 'd', long, default_value_t = 2.5, value_name = "FLOAT")]
    pub max_distance: f64,

    /// Print the pairs as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `place` subcommand.
#[derive(Args, Debug)]
pub struct PlaceArgs {
    /// Path to the input molecule file (JSON).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Identifier of the atom the new atom bonds to.
    #[arg(short, long, required = true, value_name = "ID")]
    pub atom: String,

    /// Element symbol of the new atom.
    #[arg(short, long, default_value = "H", value_name = "SYMBOL")]
    pub element: String,

    /// Override the bond length in Angstroms. Defaults to the sum of covalent radii.
    #[arg(short, long, value_name = "FLOAT")]
    pub bond_length: Option<f64>,

    /// Print the position as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `formula` subcommand.
#[derive(Args, Debug)]
pub struct FormulaArgs {
    /// Path to the input molecule file (JSON).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,
}
