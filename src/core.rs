pub mod inventory;
pub mod loader;
mod parsers;
pub mod plugin;


use std::path::{Path, PathBuf};

use log::debug;

use crate::core::inventory::Inventory;
use crate::core::loader::YamlFileLoader;
use crate::core::plugin::{ClusterInventoryPlugin, InventoryPlugin};
pub use parsers::ParserError;

#[derive(thiserror::Error, Debug)]
pub enum CoreError {
  #[error("Parser Error: {0}")]
  ParserError(#[from] ParserError),
  #[error("JSON Error: {0}")]
  JsonError(#[from] serde_json::Error),
  #[error("Inventory source {0:?} is not handled by the '{1}' plugin")]
  NotApplicable(PathBuf, String),
}

/// Ties the cluster plugin, the YAML loader and an inventory store together.
pub struct ClusterInventory {
  plugin: ClusterInventoryPlugin,
  loader: YamlFileLoader,
  inventory: Inventory,
}

impl ClusterInventory {
  pub fn new() -> Self {
    Self::with_plugin(ClusterInventoryPlugin::new())
  }

  pub fn with_plugin(plugin: ClusterInventoryPlugin) -> Self {
    ClusterInventory {
      plugin,
      loader: YamlFileLoader,
      inventory: Inventory::new(),
    }
  }

  pub fn verify(&self, source: &Path) -> bool {
    self.plugin.verify_file(source)
  }

  /// Parses `source` into the inventory. Sources the plugin does not recognise are rejected
  /// before anything is read.
  pub fn load(&mut self, source: &Path) -> Result<(), CoreError> {
    if !self.verify(source) {
      return Err(CoreError::NotApplicable(
        source.to_path_buf(),
        self.plugin.name().to_string(),
      ));
    }
    debug!("Parsing inventory source {:?}", source);
    self
      .plugin
      .parse(&mut self.inventory, &self.loader, source)?;
    Ok(())
  }

  #[cfg(test)]
  pub fn inventory(&self) -> &Inventory {
    &self.inventory
  }

  pub fn list_json(&self, pretty: bool) -> Result<String, CoreError> {
    to_json_string(&self.inventory.to_list_json()?, pretty)
  }

  pub fn graph(&self) -> String {
    self.inventory.to_graph()
  }

  pub fn host_json(&self, host: &str, pretty: bool) -> Result<String, CoreError> {
    to_json_string(&self.inventory.host_vars_json(host)?, pretty)
  }
}

fn to_json_string(value: &serde_json::Value, pretty: bool) -> Result<String, CoreError> {
  let text = if pretty {
    serde_json::to_string_pretty(value)?
  } else {
    serde_json::to_string(value)?
  };
  Ok(text)
}
