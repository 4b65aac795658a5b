use hashlink::LinkedHashMap;
use saphyr::{ScalarOwned as YamlOwnedScalar, Tag, YamlOwned};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::core::parsers::ParserError;
use crate::core::parsers::utils::{scalar_to_string, wrong_type_err};

/// Key under which vaulted values are handed back to the orchestration tool.
pub const VAULT_KEY: &str = "__ansible_vault";

/// A host variable value, keeping the type it had in the source YAML.
#[derive(Debug, Clone, PartialEq)]
pub enum Variable {
  Null,
  Bool(bool),
  Int(i64),
  Float(f64),
  String(String),
  /// Encrypted scalar, kept as ciphertext
  Vault(String),
  List(Vec<Variable>),
  Map(LinkedHashMap<String, Variable>),
}

impl From<&str> for Variable {
  fn from(s: &str) -> Self {
    Variable::String(s.to_string())
  }
}

impl From<String> for Variable {
  fn from(s: String) -> Self {
    Variable::String(s)
  }
}

impl Serialize for Variable {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    match self {
      Variable::Null => serializer.serialize_unit(),
      Variable::Bool(b) => serializer.serialize_bool(*b),
      Variable::Int(i) => serializer.serialize_i64(*i),
      Variable::Float(f) => serializer.serialize_f64(*f),
      Variable::String(s) => serializer.serialize_str(s),
      Variable::Vault(ciphertext) => {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(VAULT_KEY, ciphertext)?;
        map.end()
      }
      Variable::List(items) => {
        let mut seq = serializer.serialize_seq(Some(items.len()))?;
        for item in items {
          seq.serialize_element(item)?;
        }
        seq.end()
      }
      Variable::Map(entries) => {
        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for (k, v) in entries {
          map.serialize_entry(k, v)?;
        }
        map.end()
      }
    }
  }
}

fn parse_scalar(s: &YamlOwnedScalar) -> Variable {
  match s {
    YamlOwnedScalar::String(s) => Variable::String(s.to_string()),
    YamlOwnedScalar::Integer(i) => Variable::Int(*i),
    YamlOwnedScalar::FloatingPoint(f) => Variable::Float(**f),
    YamlOwnedScalar::Boolean(b) => Variable::Bool(*b),
    _ => Variable::Null,
  }
}

/// Handles `!vault`; any other local tag is dropped and the wrapped value parsed as usual.
fn parse_tagged(tag: &Tag, yaml: &YamlOwned) -> Result<Variable, ParserError> {
  if tag.suffix == "vault" {
    return match yaml {
      YamlOwned::Value(YamlOwnedScalar::String(ciphertext)) => {
        Ok(Variable::Vault(ciphertext.trim().to_string()))
      }
      _ => Err(wrong_type_err!(yaml, "vault-encrypted string")),
    };
  }
  parse_variable(yaml)
}

/// Convert a YAML node into a host variable.
pub fn parse_variable(yaml: &YamlOwned) -> Result<Variable, ParserError> {
  match yaml {
    YamlOwned::Value(s) => Ok(parse_scalar(s)),
    YamlOwned::Tagged(tag, inner) => parse_tagged(tag, inner),
    YamlOwned::Sequence(seq) => seq
      .iter()
      .map(parse_variable)
      .collect::<Result<Vec<_>, _>>()
      .map(Variable::List),
    YamlOwned::Mapping(map) => {
      let mut entries = LinkedHashMap::new();
      for (k, v) in map.iter() {
        let key = scalar_to_string(k).ok_or(wrong_type_err!(k, "scalar key"))?;
        entries.insert(key, parse_variable(v)?);
      }
      Ok(Variable::Map(entries))
    }
    _ => Err(wrong_type_err!(yaml, "scalar, sequence, or mapping")),
  }
}
