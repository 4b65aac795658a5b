use hashlink::LinkedHashMap;
use serde_json::{Map, Value, json};
use thiserror::Error;

use crate::core::parsers::variables::Variable;


/// Implicit group of hosts with no other membership.
pub const UNGROUPED: &str = "ungrouped";

#[derive(Error, Debug)]
pub enum InventoryError {
  #[error("Invalid empty {0} name provided")]
  InvalidName(&'static str),
  #[error("Could not find group '{0}'")]
  UnknownGroup(String),
  #[error("Could not identify group or host named '{0}'")]
  UnknownHost(String),
}

/// Write side of an inventory, as seen by inventory plugins.
pub trait InventorySink {
  /// Create `group` if it does not exist yet.
  fn add_group(&mut self, group: &str) -> Result<(), InventoryError>;
  /// Create `host` if needed and make it a member of the existing `group`.
  fn add_host(&mut self, host: &str, group: &str) -> Result<(), InventoryError>;
  /// Set (or overwrite) a variable on an existing host.
  fn set_variable(
    &mut self,
    host: &str,
    key: &str,
    value: Variable,
  ) -> Result<(), InventoryError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Host {
  pub name: String,
  pub vars: LinkedHashMap<String, Variable>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Group {
  pub name: String,
  pub hosts: Vec<String>,
}

/// In-memory inventory. Groups, hosts and variables keep insertion order.
#[derive(Debug, Default)]
pub struct Inventory {
  groups: LinkedHashMap<String, Group>,
  hosts: LinkedHashMap<String, Host>,
}

impl Inventory {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn groups(&self) -> impl Iterator<Item = &Group> {
    self.groups.values()
  }

  pub fn hosts(&self) -> impl Iterator<Item = &Host> {
    self.hosts.values()
  }

  #[cfg(test)]
  pub fn get_group(&self, name: &str) -> Option<&Group> {
    self.groups.get(name)
  }

  pub fn get_host(&self, name: &str) -> Option<&Host> {
    self.hosts.get(name)
  }

  /// Hosts that belong to no group.
  fn ungrouped(&self) -> Vec<&str> {
    self
      .hosts()
      .filter(|host| !self.groups().any(|group| group.hosts.contains(&host.name)))
      .map(|host| host.name.as_str())
      .collect()
  }

  /// Render the whole inventory in the executable inventory `--list` format.
  pub fn to_list_json(&self) -> Result<Value, serde_json::Error> {
    let mut hostvars = Map::new();
    for host in self.hosts() {
      hostvars.insert(host.name.clone(), vars_to_json(&host.vars)?);
    }

    let mut root = Map::new();
    root.insert("_meta".to_string(), json!({ "hostvars": hostvars }));
    let mut children = vec![UNGROUPED];
    children.extend(self.groups().map(|group| group.name.as_str()));
    root.insert("all".to_string(), json!({ "children": children }));
    root.insert(UNGROUPED.to_string(), json!({ "hosts": self.ungrouped() }));
    for group in self.groups() {
      root.insert(group.name.clone(), json!({ "hosts": group.hosts }));
    }
    Ok(Value::Object(root))
  }

  /// Tree view of groups and their hosts, in the same layout as `ansible-inventory --graph`.
  pub fn to_graph(&self) -> String {
    let mut lines = vec!["@all:".to_string(), format!("  |--@{}:", UNGROUPED)];
    for host in self.ungrouped() {
      lines.push(format!("  |  |--{}", host));
    }
    for group in self.groups() {
      lines.push(format!("  |--@{}:", group.name));
      for host in &group.hosts {
        lines.push(format!("  |  |--{}", host));
      }
    }
    lines.join("\n")
  }

  /// Variables of one host in the `--host` format. Unknown hosts yield an empty object.
  pub fn host_vars_json(&self, host: &str) -> Result<Value, serde_json::Error> {
    match self.get_host(host) {
      Some(host) => vars_to_json(&host.vars),
      None => Ok(Value::Object(Map::new())),
    }
  }
}

fn vars_to_json(vars: &LinkedHashMap<String, Variable>) -> Result<Value, serde_json::Error> {
  let mut map = Map::new();
  for (key, value) in vars {
    map.insert(key.clone(), serde_json::to_value(value)?);
  }
  Ok(Value::Object(map))
}

impl InventorySink for Inventory {
  fn add_group(&mut self, group: &str) -> Result<(), InventoryError> {
    if group.is_empty() {
      return Err(InventoryError::InvalidName("group"));
    }
    self
      .groups
      .entry(group.to_string())
      .or_insert_with(|| Group {
        name: group.to_string(),
        hosts: Vec::new(),
      });
    Ok(())
  }

  fn add_host(&mut self, host: &str, group: &str) -> Result<(), InventoryError> {
    if host.is_empty() {
      return Err(InventoryError::InvalidName("host"));
    }
    let group_entry = self
      .groups
      .get_mut(group)
      .ok_or_else(|| InventoryError::UnknownGroup(group.to_string()))?;
    if !group_entry.hosts.iter().any(|h| h == host) {
      group_entry.hosts.push(host.to_string());
    }

    self
      .hosts
      .entry(host.to_string())
      .or_insert_with(|| Host {
        name: host.to_string(),
        vars: LinkedHashMap::new(),
      });
    Ok(())
  }

  fn set_variable(
    &mut self,
    host: &str,
    key: &str,
    value: Variable,
  ) -> Result<(), InventoryError> {
    let host_entry = self
      .hosts
      .get_mut(host)
      .ok_or_else(|| InventoryError::UnknownHost(host.to_string()))?;
    // Overwrite in place so the original key position is kept
    match host_entry.vars.get_mut(key) {
      Some(existing) => *existing = value,
      None => {
        host_entry.vars.insert(key.to_string(), value);
      }
    }
    Ok(())
  }
}
