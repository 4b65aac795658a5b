pub mod cluster_config;
pub mod options;
pub mod utils;
pub mod variables;


use std::path::PathBuf;

use thiserror::Error;

use crate::core::inventory::InventoryError;
use crate::core::loader::LoaderError;
pub use cluster_config::populate_inventory;

#[derive(Error, Debug)]
pub enum ParserError {
  #[error("Inventory source {0:?} is empty")]
  EmptySource(PathBuf),
  #[error("Inventory source has invalid structure, it should be a mapping, got: {0}")]
  InvalidSourceStructure(String),
  #[error("Incorrect plugin name in file: {0}")]
  IncorrectPluginName(String),
  #[error("Missing 'config_file' option, set it in the inventory source or through CUSTOM_CLUSTER_CONFIG_FILE")]
  MissingConfigFile,
  #[error("Failed to load {path:?}: {source}")]
  LoadFailed { path: PathBuf, source: LoaderError },
  #[error("Cluster config file is empty or invalid: {0:?}")]
  EmptyConfig(PathBuf),
  #[error("Wrong type for value \"{0}\", expected type {1}")]
  WrongType(String, String),
  #[error("Inventory Error: {0}")]
  InventoryError(#[from] InventoryError),
  #[error("Failed to parse inventory plugin config: {0}")]
  ParseFailed(Box<ParserError>),
}
