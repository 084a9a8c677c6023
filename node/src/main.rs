// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Transit Node
//!
//! Entry point for the `transit-node` binary. Parses CLI arguments, resolves
//! configuration, initializes logging, opens the sled ledger, and hosts the
//! three contract modules, each on its own tree.
//!
//! - `init`    — run the deployment hook of one module or all of them
//! - `invoke`  — invoke a module function as the holder of a certificate
//! - `version` — print build version information
//!
//! `invoke` prints the response as a single JSON object on stdout and exits
//! non-zero when the invocation failed.

mod cli;
mod config;
mod logging;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use std::path::Path;

use transit_contracts::{ContractHost, IssuanceContract, PaymentContract, Response, TravelContract};
use transit_protocol::storage::{LedgerDb, SledBackend};

use cli::{Commands, InvokeArgs, Module, TransitNodeCli};
use config::{NodeConfig, Overrides, Settings};

fn main() -> Result<()> {
    let cli = TransitNodeCli::parse();

    if let Commands::Version = cli.command {
        print_version();
        return Ok(());
    }

    let lookup_dir = cli
        .data_dir
        .clone()
        .unwrap_or_else(|| config::DEFAULT_DATA_DIR.into());
    let file = NodeConfig::discover(cli.config.as_deref(), &lookup_dir)?;
    let settings = Settings::resolve(
        Overrides {
            data_dir: cli.data_dir,
            log_format: cli.log_format,
        },
        file,
    );

    logging::init_logging(&settings.log_level, settings.log_format);
    tracing::debug!(data_dir = %settings.data_dir.display(), "configuration resolved");

    let ledgers = Ledgers::open(&settings)?;

    match cli.command {
        Commands::Init(args) => {
            for module in args.target.modules() {
                let response = ledgers.init(module);
                report(module, "init", &response)?;
            }
            Ok(())
        }
        Commands::Invoke(args) => invoke(&ledgers, args),
        Commands::Version => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Ledgers
// ---------------------------------------------------------------------------

/// The three modules, each hosted over its own sled tree.
struct Ledgers {
    issue: ContractHost<IssuanceContract, SledBackend>,
    payment: ContractHost<PaymentContract, SledBackend>,
    travel: ContractHost<TravelContract, SledBackend>,
}

impl Ledgers {
    fn open(settings: &Settings) -> Result<Self> {
        let path = settings.ledger_path();
        std::fs::create_dir_all(&path)
            .with_context(|| format!("failed to create ledger directory: {}", path.display()))?;

        let db = LedgerDb::open(&path)
            .with_context(|| format!("failed to open ledger at {}", path.display()))?;
        tracing::info!(path = %path.display(), "ledger opened");

        let backend = |module: Module| {
            db.backend(module.name())
                .with_context(|| format!("failed to open {} tree", module.name()))
        };

        Ok(Self {
            issue: ContractHost::new(IssuanceContract::new(), backend(Module::Issue)?),
            payment: ContractHost::new(PaymentContract::new(), backend(Module::Payment)?),
            travel: ContractHost::new(
                TravelContract::with_tariff(settings.tariff.clone()),
                backend(Module::Travel)?,
            ),
        })
    }

    fn init(&self, module: Module) -> Response {
        match module {
            Module::Issue => self.issue.init(),
            Module::Payment => self.payment.init(),
            Module::Travel => self.travel.init(),
        }
    }

    fn invoke(&self, module: Module, creator: &[u8], function: &str, args: &[String]) -> Response {
        match module {
            Module::Issue => self.issue.invoke(creator, function, args),
            Module::Payment => self.payment.invoke(creator, function, args),
            Module::Travel => self.travel.invoke(creator, function, args),
        }
    }
}

fn invoke(ledgers: &Ledgers, args: InvokeArgs) -> Result<()> {
    let creator = read_creator(&args.creator)?;
    let response = ledgers.invoke(args.module, &creator, &args.function, &args.args);
    report(args.module, &args.function, &response)
}

fn read_creator(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path)
        .with_context(|| format!("failed to read creator certificate {}", path.display()))
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct RenderedEvent<'a> {
    name: &'a str,
    payload: String,
}

#[derive(Serialize)]
struct RenderedResponse<'a> {
    module: &'static str,
    function: &'a str,
    status: u16,
    #[serde(skip_serializing_if = "str::is_empty")]
    message: &'a str,
    payload: String,
    events: Vec<RenderedEvent<'a>>,
}

impl<'a> RenderedResponse<'a> {
    fn new(module: Module, function: &'a str, response: &'a Response) -> Self {
        Self {
            module: module.name(),
            function,
            status: response.status,
            message: &response.message,
            payload: String::from_utf8_lossy(&response.payload).into_owned(),
            events: response
                .events
                .iter()
                .map(|e| RenderedEvent {
                    name: &e.name,
                    payload: String::from_utf8_lossy(&e.payload).into_owned(),
                })
                .collect(),
        }
    }
}

/// Prints `response` as JSON and turns a failed invocation into an error.
fn report(module: Module, function: &str, response: &Response) -> Result<()> {
    let rendered = RenderedResponse::new(module, function, response);
    println!("{}", serde_json::to_string(&rendered)?);

    if !response.is_success() {
        bail!(
            "{}.{} failed with status {}: {}",
            module.name(),
            function,
            response.status,
            response.message
        );
    }
    Ok(())
}

/// Prints version information to stdout.
fn print_version() {
    println!("transit-node {}", env!("CARGO_PKG_VERSION"));
    println!("modules      {}", transit_protocol::config::MODULES.join(", "));
}
