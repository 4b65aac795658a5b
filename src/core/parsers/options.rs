use std::path::Path;

use log::debug;
use saphyr::YamlOwned;

use crate::core::loader::DataLoader;
use crate::core::parsers::ParserError;
use crate::core::parsers::utils::{is_truthy, scalar_to_string, wrong_type_err, yaml_lookup};

/// Environment fallback for `config_file`.
pub const CONFIG_FILE_ENV: &str = "CUSTOM_CLUSTER_CONFIG_FILE";

/// Options declared in the inventory source file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PluginOptions {
  /// Cluster config path, relative to the inventory source's directory unless absolute
  pub config_file: Option<String>,
}

impl PluginOptions {
  /// Build options from an already loaded inventory source. The source must be a mapping whose
  /// `plugin` key names `plugin_name`. `config_file` in the source wins over `env_config_file`.
  pub fn from_source(
    source: &YamlOwned,
    plugin_name: &str,
    env_config_file: Option<&str>,
  ) -> Result<Self, ParserError> {
    if !matches!(source, YamlOwned::Mapping(_)) {
      return Err(ParserError::InvalidSourceStructure(format!("{:?}", source)));
    }

    let plugin = yaml_lookup(source, "plugin").and_then(scalar_to_string);
    if plugin.as_deref() != Some(plugin_name) {
      return Err(ParserError::IncorrectPluginName(
        plugin.unwrap_or_else(|| "none found".to_string()),
      ));
    }

    let direct = match yaml_lookup(source, "config_file") {
      Some(value) if is_truthy(value) => Some(
        scalar_to_string(value).ok_or(wrong_type_err!(value, "string"))?,
      ),
      _ => None,
    };
    let config_file = direct.or_else(|| {
      env_config_file
        .filter(|s| !s.is_empty())
        .map(str::to_string)
    });

    Ok(PluginOptions { config_file })
  }
}

/// Load the inventory source at `path` and read the plugin options out of it.
pub fn read_plugin_options(
  loader: &dyn DataLoader,
  path: &Path,
  plugin_name: &str,
  env_config_file: Option<&str>,
) -> Result<PluginOptions, ParserError> {
  let source = loader
    .load_from_file(path)
    .map_err(|source| ParserError::LoadFailed {
      path: path.to_path_buf(),
      source,
    })?
    .filter(is_truthy)
    .ok_or_else(|| ParserError::EmptySource(path.to_path_buf()))?;

  let options = PluginOptions::from_source(&source, plugin_name, env_config_file)?;
  debug!("Plugin options from {:?}: {:?}", path, options);
  Ok(options)
}
