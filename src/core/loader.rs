use std::fs;
use std::path::Path;

use hashlink::LinkedHashMap;
use log::debug;
use saphyr::{LoadableYamlNode, YamlOwned};
use thiserror::Error;

use crate::core::parsers::utils::value_from_str;


#[derive(Error, Debug)]
pub enum LoaderError {
  #[error("IO Error: {0}")]
  IoError(#[from] std::io::Error),
  #[error("YAML parsing failed: {0}")]
  YamlParseFailed(#[from] saphyr::ScanError),
}

/// Reads a data file into a YAML tree.
///
/// Implementations may carry encrypted scalars through untouched; `!vault` tagged values are
/// surfaced to the variable layer as opaque ciphertext.
pub trait DataLoader {
  /// Returns the first document of the file, or `None` when the file holds no document.
  fn load_from_file(&self, path: &Path) -> Result<Option<YamlOwned>, LoaderError>;
}

/// Plain filesystem loader backed by saphyr.
#[derive(Debug, Default, Clone, Copy)]
pub struct YamlFileLoader;

impl DataLoader for YamlFileLoader {
  fn load_from_file(&self, path: &Path) -> Result<Option<YamlOwned>, LoaderError> {
    debug!("Loading YAML from file: {:?}", path);
    let text = fs::read_to_string(path)?;
    let yaml = YamlOwned::load_from_str(&text)?
      .into_iter() // Take the first document
      .next()
      .map(expand_merge_keys);
    Ok(yaml)
  }
}

/// Fold `<<` merge entries into their parent mapping. Keys written on the mapping itself win
/// over merged ones, and within a list of merge sources the earlier source wins.
pub fn expand_merge_keys(yaml: YamlOwned) -> YamlOwned {
  match yaml {
    YamlOwned::Mapping(map) => {
      let merge_key = value_from_str("<<");
      let mut expanded = LinkedHashMap::new();
      let mut sources = Vec::new();
      for (key, value) in map {
        let value = expand_merge_keys(value);
        if key != merge_key {
          expanded.insert(expand_merge_keys(key), value);
          continue;
        }
        match value {
          YamlOwned::Mapping(source) => sources.push(source),
          YamlOwned::Sequence(items) => {
            for item in items {
              match item {
                YamlOwned::Mapping(source) => sources.push(source),
                other => debug!("Ignoring non-mapping merge source: {:?}", other),
              }
            }
          }
          // Not a merge, keep it as a plain key
          other => {
            expanded.insert(key, other);
          }
        }
      }
      for source in sources {
        for (key, value) in source {
          if !expanded.contains_key(&key) {
            expanded.insert(key, value);
          }
        }
      }
      YamlOwned::Mapping(expanded)
    }
    YamlOwned::Sequence(items) => {
      YamlOwned::Sequence(items.into_iter().map(expand_merge_keys).collect())
    }
    YamlOwned::Tagged(tag, inner) => YamlOwned::Tagged(tag, Box::new(expand_merge_keys(*inner))),
    other => other,
  }
}
