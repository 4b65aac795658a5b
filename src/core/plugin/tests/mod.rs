use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use saphyr::{LoadableYamlNode, YamlOwned};

use crate::core::inventory::Inventory;
use crate::core::loader::{DataLoader, LoaderError, YamlFileLoader};
use crate::core::parsers::ParserError;
use crate::core::parsers::variables::Variable;
use crate::core::plugin::{ClusterInventoryPlugin, InventoryPlugin, PLUGIN_NAME};
use crate::core::test_utils::{capture_logs, warnings, write_environment};

fn plugin() -> ClusterInventoryPlugin {
  ClusterInventoryPlugin::with_env_config_file(None)
}

fn fixture_source() -> PathBuf {
  let src_dir = Path::new(file!()).parent().unwrap();
  src_dir
    .join("files")
    .join("env")
    .join("prod")
    .join("inventory.config.yml")
}

/// Serves files from memory, keyed by path.
struct MemoryLoader {
  files: HashMap<PathBuf, String>,
}

impl DataLoader for MemoryLoader {
  fn load_from_file(&self, path: &Path) -> Result<Option<YamlOwned>, LoaderError> {
    let text = self.files.get(path).ok_or_else(|| {
      std::io::Error::new(std::io::ErrorKind::NotFound, format!("{:?} not found", path))
    })?;
    Ok(YamlOwned::load_from_str(text)?.into_iter().next())
  }
}

fn unwrap_parse_failed(result: Result<(), ParserError>) -> ParserError {
  match result {
    Err(ParserError::ParseFailed(inner)) => *inner,
    other => panic!("expected ParseFailed, got {:?}", other),
  }
}

// ============================================================================
// verify_file
// ============================================================================

#[test]
fn verify_accepts_both_suffixes() {
  let temp_dir = tempfile::tempdir().unwrap();
  for name in ["inventory.config.yml", "inventory.config.yaml"] {
    let path = temp_dir.path().join(name);
    fs::write(&path, "plugin: custom_cluster_inventory\n").unwrap();
    assert!(plugin().verify_file(&path), "{name} should be accepted");
  }
}

#[test]
fn verify_rejects_other_names() {
  let temp_dir = tempfile::tempdir().unwrap();
  for name in ["inventory.yml", "hosts.ini", "cluster_config.yml", "inventory.config.json"] {
    let path = temp_dir.path().join(name);
    fs::write(&path, "plugin: custom_cluster_inventory\n").unwrap();
    assert!(!plugin().verify_file(&path), "{name} should be rejected");
  }
}

#[test]
fn verify_rejects_missing_files_and_directories() {
  let temp_dir = tempfile::tempdir().unwrap();
  assert!(!plugin().verify_file(&temp_dir.path().join("inventory.config.yml")));

  let dir = temp_dir.path().join("dir.config.yml");
  fs::create_dir(&dir).unwrap();
  assert!(!plugin().verify_file(&dir));
}

#[test]
fn plugin_name() {
  assert_eq!(plugin().name(), PLUGIN_NAME);
}

// ============================================================================
// parse
// ============================================================================

#[test]
fn parse_fixture_environment() {
  capture_logs();
  let source = fixture_source();
  assert!(plugin().verify_file(&source));

  let mut inventory = Inventory::new();
  plugin()
    .parse(&mut inventory, &YamlFileLoader, &source)
    .unwrap();

  let group = inventory.get_group("prod").unwrap();
  assert_eq!(group.hosts, vec!["node1"]);
  let vars = &inventory.get_host("node1").unwrap().vars;
  assert_eq!(vars.get("ansible_host"), Some(&Variable::from("10.0.0.5")));
  assert_eq!(vars.get("ansible_user"), Some(&Variable::from("deploy")));
  assert_eq!(vars.get("ansible_password"), Some(&Variable::from("s3cr3t")));
  assert_eq!(vars.get("ansible_become_pass"), Some(&Variable::from("s3cr3t")));
  assert!(inventory.get_host("node2").is_none());
  assert!(warnings().iter().any(|w| w.contains("node2")));
}

#[test]
fn parse_without_config_file() {
  let temp_dir = tempfile::tempdir().unwrap();
  let source = write_environment(temp_dir.path(), "prod", "nodes: {}\n");
  fs::write(&source, "plugin: custom_cluster_inventory\n").unwrap();

  let mut inventory = Inventory::new();
  let error = unwrap_parse_failed(plugin().parse(&mut inventory, &YamlFileLoader, &source));
  assert!(matches!(error, ParserError::MissingConfigFile));
  assert_eq!(inventory.groups().count(), 0);
  assert_eq!(inventory.hosts().count(), 0);
}

#[test]
fn parse_with_config_file_from_environment() {
  let temp_dir = tempfile::tempdir().unwrap();
  let source = write_environment(
    temp_dir.path(),
    "dev",
    "nodes:\n  node1:\n    docker_node_ip: 10.0.0.5\n",
  );
  fs::write(&source, "plugin: custom_cluster_inventory\n").unwrap();

  let mut inventory = Inventory::new();
  ClusterInventoryPlugin::with_env_config_file(Some("cluster_config.yml".to_string()))
    .parse(&mut inventory, &YamlFileLoader, &source)
    .unwrap();
  assert_eq!(inventory.get_group("dev").unwrap().hosts, vec!["node1"]);
}

#[test]
fn parse_empty_config() {
  let temp_dir = tempfile::tempdir().unwrap();
  let source = write_environment(temp_dir.path(), "prod", "");

  let mut inventory = Inventory::new();
  let error = unwrap_parse_failed(plugin().parse(&mut inventory, &YamlFileLoader, &source));
  assert!(matches!(error, ParserError::EmptyConfig(_)));
  assert_eq!(inventory.hosts().count(), 0);
}

#[test]
fn parse_null_config() {
  let temp_dir = tempfile::tempdir().unwrap();
  let source = write_environment(temp_dir.path(), "prod", "~\n");

  let mut inventory = Inventory::new();
  let error = unwrap_parse_failed(plugin().parse(&mut inventory, &YamlFileLoader, &source));
  assert!(matches!(error, ParserError::EmptyConfig(_)));
}

#[test]
fn parse_missing_config() {
  let temp_dir = tempfile::tempdir().unwrap();
  let source = write_environment(temp_dir.path(), "prod", "nodes: {}\n");
  fs::remove_file(source.parent().unwrap().join("cluster_config.yml")).unwrap();

  let mut inventory = Inventory::new();
  let error = unwrap_parse_failed(plugin().parse(&mut inventory, &YamlFileLoader, &source));
  assert!(matches!(
    error,
    ParserError::LoadFailed {
      source: LoaderError::IoError(_),
      ..
    }
  ));
}

#[test]
fn parse_invalid_yaml_config() {
  let temp_dir = tempfile::tempdir().unwrap();
  let source = write_environment(temp_dir.path(), "prod", "nodes: {node1: [\n");

  let mut inventory = Inventory::new();
  let error = unwrap_parse_failed(plugin().parse(&mut inventory, &YamlFileLoader, &source));
  assert!(matches!(
    error,
    ParserError::LoadFailed {
      source: LoaderError::YamlParseFailed(_),
      ..
    }
  ));
}

#[test]
fn parse_wrong_shape_is_wrapped() {
  let temp_dir = tempfile::tempdir().unwrap();
  let source = write_environment(temp_dir.path(), "prod", "nodes: [node1]\n");

  let mut inventory = Inventory::new();
  let result = plugin().parse(&mut inventory, &YamlFileLoader, &source);
  let error = result.unwrap_err();
  assert!(
    error
      .to_string()
      .starts_with("Failed to parse inventory plugin config:")
  );
  assert!(matches!(error, ParserError::ParseFailed(inner) if matches!(*inner, ParserError::WrongType(_, _))));
}

#[test]
fn source_errors_are_not_wrapped() {
  let temp_dir = tempfile::tempdir().unwrap();
  let source = write_environment(temp_dir.path(), "prod", "nodes: {}\n");
  fs::write(&source, "plugin: another_plugin\nconfig_file: cluster_config.yml\n").unwrap();

  let mut inventory = Inventory::new();
  let result = plugin().parse(&mut inventory, &YamlFileLoader, &source);
  assert!(matches!(result, Err(ParserError::IncorrectPluginName(_))));
}

#[test]
fn parse_absolute_config_path() {
  let temp_dir = tempfile::tempdir().unwrap();
  let shared = temp_dir.path().join("shared_cluster.yml");
  fs::write(&shared, "nodes:\n  node9:\n    docker_node_ip: 10.0.0.9\n").unwrap();
  let source = write_environment(temp_dir.path(), "qa", "nodes: {}\n");
  fs::write(
    &source,
    format!(
      "plugin: custom_cluster_inventory\nconfig_file: {}\n",
      shared.display()
    ),
  )
  .unwrap();

  let mut inventory = Inventory::new();
  plugin()
    .parse(&mut inventory, &YamlFileLoader, &source)
    .unwrap();
  assert_eq!(inventory.get_group("qa").unwrap().hosts, vec!["node9"]);
}

#[test]
fn parse_through_custom_loader() {
  let mut files = HashMap::new();
  files.insert(
    PathBuf::from("/inv/env/stage/inventory.config.yml"),
    "plugin: custom_cluster_inventory\nconfig_file: cluster.yml\n".to_string(),
  );
  files.insert(
    PathBuf::from("/inv/env/stage/cluster.yml"),
    "general_config:\n  docker_version: '24.0'\nnodes:\n  a:\n    docker_node_ip: 10.1.0.1\n  b:\n    docker_node_ip: 10.1.0.2\n    docker_node_name: worker-b\n".to_string(),
  );
  let loader = MemoryLoader { files };

  let mut inventory = Inventory::new();
  plugin()
    .parse(
      &mut inventory,
      &loader,
      Path::new("/inv/env/stage/inventory.config.yml"),
    )
    .unwrap();

  assert_eq!(inventory.get_group("stage").unwrap().hosts, vec!["a", "b"]);
  let b = &inventory.get_host("b").unwrap().vars;
  assert_eq!(b.get("docker_version"), Some(&Variable::from("24.0")));
  assert_eq!(b.get("docker_node_name"), Some(&Variable::from("worker-b")));
  assert!(inventory.get_host("a").unwrap().vars.get("docker_node_name").is_none());
}
