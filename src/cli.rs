use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};

use crate::core::ClusterInventory;


/// Executable inventory built from a cluster config file.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
  /// Inventory source naming the plugin, e.g. env/prod/inventory.config.yml
  #[arg(short, long, env = "CLUSTER_INVENTORY_SOURCE")]
  inventory: PathBuf,
  /// Print the whole inventory (default)
  #[arg(long, conflicts_with_all = ["host", "verify"])]
  list: bool,
  /// Print the variables of a single host
  #[arg(long, conflicts_with_all = ["verify", "graph"])]
  host: Option<String>,
  /// Print groups and hosts as a tree
  #[arg(long, conflicts_with_all = ["list", "verify"])]
  graph: bool,
  /// Only check whether the inventory source is handled by this plugin
  #[arg(long)]
  verify: bool,
  /// Pretty-print JSON output
  #[arg(long)]
  pretty: bool,
  /// Increase log verbosity (-v info, -vv debug, -vvv trace)
  #[arg(short, long, action = ArgAction::Count)]
  verbose: u8,
}

fn log_level(verbose: u8) -> &'static str {
  match verbose {
    0 => "warn",
    1 => "info",
    2 => "debug",
    _ => "trace",
  }
}

fn init_logging(verbose: u8) {
  // Logs go to stderr, stdout carries the JSON
  let env = env_logger::Env::default().default_filter_or(log_level(verbose));
  let _ = env_logger::Builder::from_env(env).try_init();
}

pub fn main() -> Result<ExitCode> {
  let cli = Cli::parse();
  init_logging(cli.verbose);

  let source = std::path::absolute(&cli.inventory)
    .with_context(|| format!("Failed to resolve inventory source {:?}", cli.inventory))?;
  let mut cluster_inventory = ClusterInventory::new();

  if cli.verify {
    return Ok(if cluster_inventory.verify(&source) {
      ExitCode::SUCCESS
    } else {
      ExitCode::FAILURE
    });
  }

  cluster_inventory
    .load(&source)
    .with_context(|| format!("Failed to build inventory from {:?}", source))?;

  let output = match &cli.host {
    Some(host) => cluster_inventory.host_json(host, cli.pretty)?,
    None if cli.graph => cluster_inventory.graph(),
    None => cluster_inventory.list_json(cli.pretty)?,
  };
  println!("{output}");
  Ok(ExitCode::SUCCESS)
}
