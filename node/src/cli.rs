//! # CLI Interface
//!
//! Defines the command-line argument structure for `transit-node` using
//! `clap` derive. Three subcommands: `init`, `invoke`, and `version`.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use transit_protocol::config::{MODULE_ISSUE, MODULE_PAYMENT, MODULE_TRAVEL};

/// Transit settlement ledger host.
///
/// Deploys and invokes the card issuance, payment, and travel modules
/// against a local sled ledger.
#[derive(Parser, Debug)]
#[command(
    name = "transit-node",
    about = "Transit settlement ledger host",
    version,
    propagate_version = true
)]
pub struct TransitNodeCli {
    /// Path to the node configuration file (TOML).
    ///
    /// When omitted, the node looks for `config.toml` in the data directory.
    #[arg(long, short = 'c', env = "TRANSIT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the ledger database.
    #[arg(long, short = 'd', env = "TRANSIT_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Log output format: `pretty` or `json`.
    #[arg(long, env = "TRANSIT_LOG_FORMAT", global = true)]
    pub log_format: Option<String>,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the deployment hook of one module, or all of them.
    Init(InitArgs),
    /// Invoke a module function as the holder of a certificate.
    #[command(allow_negative_numbers = true)]
    Invoke(InvokeArgs),
    /// Print version information and exit.
    Version,
}

/// A contract module.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Module {
    /// Card issuance.
    Issue,
    /// Payment accumulation.
    Payment,
    /// Journey tracking and fare settlement.
    Travel,
}

impl Module {
    /// Every module, in deployment order.
    pub const ALL: [Module; 3] = [Module::Issue, Module::Payment, Module::Travel];

    /// Ledger partition name.
    pub fn name(self) -> &'static str {
        match self {
            Module::Issue => MODULE_ISSUE,
            Module::Payment => MODULE_PAYMENT,
            Module::Travel => MODULE_TRAVEL,
        }
    }
}

/// Which modules `init` deploys.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum InitTarget {
    Issue,
    Payment,
    Travel,
    All,
}

impl InitTarget {
    /// The modules this target covers.
    pub fn modules(self) -> Vec<Module> {
        match self {
            InitTarget::Issue => vec![Module::Issue],
            InitTarget::Payment => vec![Module::Payment],
            InitTarget::Travel => vec![Module::Travel],
            InitTarget::All => Module::ALL.to_vec(),
        }
    }
}

/// Arguments for the `init` subcommand.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Module to deploy.
    #[arg(value_enum, default_value = "all")]
    pub target: InitTarget,
}

/// Arguments for the `invoke` subcommand.
#[derive(Args, Debug)]
pub struct InvokeArgs {
    /// Module to invoke.
    #[arg(value_enum)]
    pub module: Module,

    /// Function name, e.g. `create`, `request`, `swipe`, `query`.
    pub function: String,

    /// Function arguments, passed as strings.
    pub args: Vec<String>,

    /// PEM file with the caller's certificate.
    #[arg(long)]
    pub creator: PathBuf,
}
