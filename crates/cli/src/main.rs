use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use procurebot_purchasing::{FlowConfig, OrderRequest, SupplierAliases};

mod plan;

use plan::OrderPlan;

#[derive(Parser, Debug)]
#[command(name = "procurebot", version, about = "Purchase order automation tooling")]
struct Cli {
    /// Flow configuration file (defaults to $PROCUREBOT_CONFIG, then built-in values)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Supplier alias table
    #[arg(long, global = true, value_name = "PATH", default_value = "config/supplier_aliases.json")]
    aliases: PathBuf,

    /// Human-readable logs instead of JSON
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load and validate the configuration and alias table, then print them
    CheckConfig,
    /// Show how a supplier name would be entered
    ResolveSupplier {
        name: String,
    },
    /// Validate an order request and print what a run would type
    Plan {
        #[arg(value_name = "REQUEST")]
        request: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.pretty {
        procurebot_observability::init_pretty();
    } else {
        procurebot_observability::init();
    }

    let config = load_config(cli.config.as_deref())?;
    let aliases = SupplierAliases::load(&cli.aliases)
        .with_context(|| format!("loading supplier aliases from {}", cli.aliases.display()))?;

    match cli.command {
        Commands::CheckConfig => {
            tracing::info!(aliases = aliases.len(), "configuration valid");
            print_json(&ConfigSummary {
                config: &config,
                alias_count: aliases.len(),
            })
        }
        Commands::ResolveSupplier { name } => {
            let code = aliases.lookup(&name);
            if code.is_none() {
                tracing::info!(supplier = %name.trim(), "no alias; a run would search the hit list");
            }
            print_json(&SupplierAnswer {
                name: name.trim(),
                code: code.map(|c| c.as_str()),
            })
        }
        Commands::Plan { request } => {
            let text = std::fs::read_to_string(&request)
                .with_context(|| format!("reading {}", request.display()))?;
            let order: OrderRequest =
                serde_json::from_str(&text).with_context(|| format!("invalid order request {}", request.display()))?;
            print_json(&OrderPlan::build(&order, &config, &aliases))
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<FlowConfig> {
    let config = match path {
        Some(path) => FlowConfig::load(path)?,
        None => FlowConfig::from_env()?,
    };
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[derive(Serialize)]
struct ConfigSummary<'a> {
    config: &'a FlowConfig,
    alias_count: usize,
}

#[derive(Serialize)]
struct SupplierAnswer<'a> {
    name: &'a str,
    code: Option<&'a str>,
}
