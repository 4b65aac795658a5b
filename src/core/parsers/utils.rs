use hashlink::LinkedHashMap;
use saphyr::{ScalarOwned, YamlOwned};

use crate::core::parsers::ParserError;

pub type YamlMapping = LinkedHashMap<YamlOwned, YamlOwned>;

/// Helper macro to create WrongType ParserError
macro_rules! wrong_type_err {
  ($value:expr, $expected:expr) => {
    crate::core::parsers::ParserError::WrongType(format!("{:?}", $value), $expected.to_string())
  };
}
pub(crate) use wrong_type_err;

pub fn value_from_str(s: &str) -> YamlOwned {
  YamlOwned::Value(ScalarOwned::String(s.to_string()))
}

pub fn yaml_lookup<'a>(node: &'a YamlOwned, key: &str) -> Option<&'a YamlOwned> {
  if let YamlOwned::Mapping(map) = node {
    return mapping_get(map, key);
  }
  None
}

pub fn mapping_get<'a>(map: &'a YamlMapping, key: &str) -> Option<&'a YamlOwned> {
  map.get(&value_from_str(key))
}

/// Look up a mapping under `key`. A missing key or an explicit null yields `None`, any other
/// non-mapping value is a type error.
pub fn lookup_mapping<'a>(
  yaml: &'a YamlOwned,
  key: &str,
) -> Result<Option<&'a YamlMapping>, ParserError> {
  match yaml_lookup(yaml, key) {
    None | Some(YamlOwned::Value(ScalarOwned::Null)) => Ok(None),
    Some(YamlOwned::Mapping(map)) => Ok(Some(map)),
    Some(other) => Err(wrong_type_err!(other, "mapping")),
  }
}

/// Truthiness of a YAML value: null, false, zero, and empty strings or collections are falsy.
/// Tagged values are judged by what they wrap.
pub fn is_truthy(yaml: &YamlOwned) -> bool {
  match yaml {
    YamlOwned::Value(scalar) => match scalar {
      ScalarOwned::Boolean(b) => *b,
      ScalarOwned::Integer(i) => *i != 0,
      ScalarOwned::FloatingPoint(f) => **f != 0.0,
      ScalarOwned::String(s) => !s.is_empty(),
      _ => false,
    },
    YamlOwned::Sequence(seq) => !seq.is_empty(),
    YamlOwned::Mapping(map) => !map.is_empty(),
    YamlOwned::Tagged(_, inner) => is_truthy(inner),
    _ => false,
  }
}

/// `mapping_get` restricted to truthy values.
pub fn lookup_present<'a>(map: &'a YamlMapping, key: &str) -> Option<&'a YamlOwned> {
  mapping_get(map, key).filter(|v| is_truthy(v))
}

/// String form of a scalar, as used for node names and option values. Null and collections
/// have none.
pub fn scalar_to_string(yaml: &YamlOwned) -> Option<String> {
  match yaml {
    YamlOwned::Value(scalar) => match scalar {
      ScalarOwned::Boolean(b) => Some(b.to_string()),
      ScalarOwned::Integer(i) => Some(i.to_string()),
      ScalarOwned::FloatingPoint(f) => Some((**f).to_string()),
      ScalarOwned::String(s) => Some(s.clone()),
      _ => None,
    },
    _ => None,
  }
}
