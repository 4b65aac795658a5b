use log::{debug, warn};
use saphyr::YamlOwned;

use crate::core::inventory::InventorySink;
use crate::core::parsers::ParserError;
use crate::core::parsers::utils::{
  YamlMapping, lookup_mapping, lookup_present, scalar_to_string, wrong_type_err,
};
use crate::core::parsers::variables::{Variable, parse_variable};

/// Interpreter set on every emitted host.
pub const PYTHON_INTERPRETER: &str = "/usr/bin/python3.9";

/// Values taken from `general_config` and applied to every host.
struct SharedVars {
  username: Option<Variable>,
  become_password: Option<Variable>,
  docker_version: Option<Variable>,
}

impl SharedVars {
  /// A field that cannot be turned into a variable is dropped with a warning.
  fn from_general_config(general_config: Option<&YamlMapping>) -> Self {
    let field = |key: &str| {
      let value = general_config.and_then(|map| lookup_present(map, key))?;
      match parse_variable(value) {
        Ok(variable) => Some(variable),
        Err(e) => {
          warn!("Ignoring general_config.{}: {}", key, e);
          None
        }
      }
    };
    SharedVars {
      username: field("username"),
      become_password: field("become_password_vault"),
      docker_version: field("docker_version"),
    }
  }
}

/// Walk `general_config` and `nodes` of a loaded cluster config and emit one group named
/// `env_name` holding a host per addressable node. Returns the number of hosts added.
///
/// Nodes without `docker_node_ip` are skipped with a warning. Any other failure on a single node
/// is logged and does not stop the remaining nodes.
pub fn populate_inventory(
  data: &YamlOwned,
  env_name: &str,
  inventory: &mut dyn InventorySink,
) -> Result<usize, ParserError> {
  if !matches!(data, YamlOwned::Mapping(_)) {
    return Err(wrong_type_err!(data, "mapping"));
  }
  let general_config = lookup_mapping(data, "general_config")?;
  let nodes = lookup_mapping(data, "nodes")?;
  let shared = SharedVars::from_general_config(general_config);

  inventory.add_group(env_name)?;

  let mut added = 0;
  for (key, node_data) in nodes.into_iter().flatten() {
    let node_name = match scalar_to_string(key) {
      Some(name) => name,
      None => {
        warn!("Could not process node {:?}: node names must be scalars", key);
        continue;
      }
    };
    match populate_node(&node_name, node_data, env_name, &shared, inventory) {
      Ok(true) => added += 1,
      Ok(false) => {}
      Err(e) => warn!("Could not process node '{}': {}", node_name, e),
    }
  }

  Ok(added)
}

/// Returns whether a host was created for the node.
fn populate_node(
  node_name: &str,
  node_data: &YamlOwned,
  env_name: &str,
  shared: &SharedVars,
  inventory: &mut dyn InventorySink,
) -> Result<bool, ParserError> {
  let node = match node_data {
    YamlOwned::Mapping(map) => map,
    _ => return Err(wrong_type_err!(node_data, "mapping")),
  };

  let ip_address = match lookup_present(node, "docker_node_ip") {
    Some(ip) => parse_variable(ip)?,
    None => {
      warn!(
        "Skipping node '{}' due to missing 'docker_node_ip'.",
        node_name
      );
      return Ok(false);
    }
  };
  let docker_node_name = lookup_present(node, "docker_node_name")
    .map(parse_variable)
    .transpose()?;

  inventory.add_host(node_name, env_name)?;
  inventory.set_variable(node_name, "ansible_host", ip_address)?;
  inventory.set_variable(
    node_name,
    "ansible_python_interpreter",
    Variable::from(PYTHON_INTERPRETER),
  )?;

  if let Some(user) = &shared.username {
    inventory.set_variable(node_name, "ansible_user", user.clone())?;
  }
  // Same secret for login and privilege escalation
  if let Some(password) = &shared.become_password {
    inventory.set_variable(node_name, "ansible_password", password.clone())?;
    inventory.set_variable(node_name, "ansible_become_pass", password.clone())?;
  }
  if let Some(version) = &shared.docker_version {
    inventory.set_variable(node_name, "docker_version", version.clone())?;
  }
  if let Some(name) = docker_node_name {
    inventory.set_variable(node_name, "docker_node_name", name)?;
  }

  debug!("Added host '{}' to group '{}'", node_name, env_name);
  Ok(true)
}
