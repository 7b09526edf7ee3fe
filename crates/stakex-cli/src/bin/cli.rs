use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File};
use serde_json::json;
use tracing::{error, info};

use stakex_core::Amount;
use stakex_executor::{Block, BlockApplier, BlockReport, ExecutorConfig};
use stakex_state::{Genesis, LedgerState};

#[derive(Parser)]
#[command(name = "stakex-cli")]
#[command(about = "StakeX stake executor CLI", long_about = None)]
struct Cli {
    /// Executor config file (TOML/JSON/YAML). STAKEX_* variables override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Accept any fee instead of the exact policy fee
    #[arg(long, global = true)]
    lenient: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay blocks on top of a genesis ledger
    Apply {
        #[arg(long)]
        genesis: PathBuf,
        /// JSON array of blocks, applied in order
        #[arg(long)]
        blocks: PathBuf,
        /// Print the final ledger as JSON
        #[arg(long)]
        dump: bool,
    },

    /// Hash of the ledger built from a genesis file
    StateHash {
        #[arg(long)]
        genesis: PathBuf,
    },

    /// Policy fee for moving an amount
    Fee { amount: Amount },

    /// Print the effective executor config
    Config,
}

/// Layer STAKEX_* environment variables (e.g. `STAKEX_FEE__MIN_FEE=500`) over
/// `sources`, then validate the result.
fn load_config(sources: ConfigBuilder<DefaultState>, lenient: bool) -> Result<ExecutorConfig> {
    let mut config: ExecutorConfig = sources
        .add_source(
            Environment::with_prefix("STAKEX")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("reading executor config")?
        .try_deserialize()
        .context("parsing executor config")?;
    if lenient {
        config.strict = false;
    }
    config.validate()?;
    Ok(config)
}

fn config_sources(path: Option<&Path>) -> ConfigBuilder<DefaultState> {
    let builder = config::Config::builder();
    match path {
        Some(path) => builder.add_source(File::from(path)),
        None => builder,
    }
}

fn load_blocks(path: &Path) -> Result<Vec<Block>> {
    let json = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("parsing blocks from {}", path.display()))
}

fn report_json(report: &BlockReport) -> serde_json::Value {
    let rejections: Vec<_> = report
        .outcomes
        .iter()
        .filter_map(|outcome| {
            outcome.result.as_ref().err().map(|err| {
                json!({
                    "id": outcome.id.to_string(),
                    "type": outcome.payload_type.to_string(),
                    "kind": format!("{:?}", err.kind()),
                    "reason": err.to_string(),
                })
            })
        })
        .collect();
    json!({
        "height": report.height,
        "applied": report.applied(),
        "rejected": rejections,
        "total_fee": report.total_fee,
        "state_hash": report.state_hash.to_string(),
    })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("stakex_cli=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();
    let config = load_config(config_sources(cli.config.as_deref()), cli.lenient)?;

    match cli.command {
        Commands::Apply { genesis, blocks, dump } => {
            let genesis = Genesis::load(&genesis)?;
            let mut ledger = LedgerState::from_genesis(&genesis)?;
            let blocks = load_blocks(&blocks)?;
            info!(blocks = blocks.len(), strict = config.strict, "replaying blocks");

            let mut applier = BlockApplier::new(&config);
            for block in &blocks {
                match applier.apply(&mut ledger, block) {
                    Ok(report) => println!("{}", report_json(&report)),
                    Err(e) => {
                        error!(height = block.height, "block failed: {}", e);
                        bail!("block {} failed: {}", block.height, e);
                    }
                }
            }
            if dump {
                println!("{}", serde_json::to_string_pretty(&ledger)?);
            }
        }
        Commands::StateHash { genesis } => {
            let ledger = LedgerState::from_genesis(&Genesis::load(&genesis)?)?;
            println!("{}", ledger.state_hash()?);
        }
        Commands::Fee { amount } => {
            println!("{}", config.fee.calculate(amount));
        }
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
