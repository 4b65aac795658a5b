use std::fs;
use std::path::Path;

use log::{debug, info};

use crate::core::inventory::InventorySink;
use crate::core::loader::DataLoader;
use crate::core::parsers::options::{CONFIG_FILE_ENV, PluginOptions, read_plugin_options};
use crate::core::parsers::utils::is_truthy;
use crate::core::parsers::{ParserError, populate_inventory};

#[cfg(test)]
mod tests;

/// Name inventory sources use in their `plugin` key.
pub const PLUGIN_NAME: &str = "custom_cluster_inventory";

/// Inventory sources this plugin recognises end with one of these.
const VALID_SUFFIXES: [&str; 2] = [".config.yml", ".config.yaml"];

/// Contract between the orchestration tool and an inventory plugin.
pub trait InventoryPlugin {
  fn name(&self) -> &str;

  /// Whether `path` looks like a source for this plugin. `false` means "not applicable".
  fn verify_file(&self, path: &Path) -> bool;

  /// Populate `inventory` from the source at `path`, reading files through `loader`.
  fn parse(
    &self,
    inventory: &mut dyn InventorySink,
    loader: &dyn DataLoader,
    path: &Path,
  ) -> Result<(), ParserError>;
}

/// Builds one group and its hosts from the cluster config named by an inventory source.
#[derive(Debug, Clone)]
pub struct ClusterInventoryPlugin {
  env_config_file: Option<String>,
}

impl ClusterInventoryPlugin {
  /// Plugin picking up `CUSTOM_CLUSTER_CONFIG_FILE` from the process environment.
  pub fn new() -> Self {
    Self::with_env_config_file(std::env::var(CONFIG_FILE_ENV).ok())
  }

  pub fn with_env_config_file(env_config_file: Option<String>) -> Self {
    ClusterInventoryPlugin { env_config_file }
  }

  fn populate(
    &self,
    inventory: &mut dyn InventorySink,
    loader: &dyn DataLoader,
    path: &Path,
    options: &PluginOptions,
  ) -> Result<(), ParserError> {
    let config_file = options
      .config_file
      .as_deref()
      .ok_or(ParserError::MissingConfigFile)?;

    let inventory_dir = path.parent().unwrap_or(Path::new(""));
    let config_path = inventory_dir.join(config_file);
    info!("Reading cluster config from: {:?}", config_path);

    let data = loader
      .load_from_file(&config_path)
      .map_err(|source| ParserError::LoadFailed {
        path: config_path.clone(),
        source,
      })?
      .filter(is_truthy)
      .ok_or_else(|| ParserError::EmptyConfig(config_path.clone()))?;

    // Group is named after the environment directory, e.g. env/prod -> prod
    let env_name = inventory_dir
      .file_name()
      .map(|name| name.to_string_lossy().into_owned())
      .unwrap_or_default();
    let added = populate_inventory(&data, &env_name, inventory)?;
    info!("Added {} host(s) to group '{}'", added, env_name);
    Ok(())
  }
}

impl InventoryPlugin for ClusterInventoryPlugin {
  fn name(&self) -> &str {
    PLUGIN_NAME
  }

  fn verify_file(&self, path: &Path) -> bool {
    let readable = fs::metadata(path).is_ok_and(|m| m.is_file()) && fs::File::open(path).is_ok();
    if !readable {
      debug!("Inventory source {:?} is missing or unreadable", path);
      return false;
    }
    let name = path.to_string_lossy();
    VALID_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
  }

  fn parse(
    &self,
    inventory: &mut dyn InventorySink,
    loader: &dyn DataLoader,
    path: &Path,
  ) -> Result<(), ParserError> {
    let options = read_plugin_options(loader, path, self.name(), self.env_config_file.as_deref())?;
    self
      .populate(inventory, loader, path, &options)
      .map_err(|e| ParserError::ParseFailed(Box::new(e)))
  }
}
