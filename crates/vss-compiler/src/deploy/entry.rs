//! A single node of the deployment layer tree.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use super::keys;

/// How many values a deploy entry stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Cardinality {
    One,
    Many,
}

/// One layer-file node wrapped with its cardinality and config mapping.
///
/// Built once from the raw node and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct DeployEntry {
    /// Qualified `_`-joined name (e.g. `Vehicle_Cabin_Door`).
    pub name: String,

    /// Config mapping consulted by the deploy type factory.
    pub config: Map<String, Value>,

    pub cardinality: Cardinality,

    /// Whether the node is backed by a Franca IDL proxy.
    pub is_resolvable: bool,
}

impl DeployEntry {
    /// Wraps a raw layer node.
    ///
    /// - a list node is `Many` and takes its config from the first item
    ///   (list items are assumed to share the same proxy data);
    /// - a mapping is `One`, unless it carries more than one constant branch;
    /// - any other value is a constant.
    pub fn new(name: impl Into<String>, data: &Value) -> Self {
        let name = name.into();
        let is_resolvable = data
            .as_object()
            .is_some_and(|map| map.contains_key(keys::FRANCA_IDL));

        let (config, cardinality) = match data {
            Value::Array(items) => {
                let config = items
                    .first()
                    .and_then(Value::as_object)
                    .cloned()
                    .unwrap_or_default();
                (config, Cardinality::Many)
            }
            Value::Object(map) => {
                let many = map
                    .get(keys::CONSTANTS)
                    .is_some_and(|constants| constant_branches(constants) > 1);
                let cardinality = if many { Cardinality::Many } else { Cardinality::One };
                (map.clone(), cardinality)
            }
            other => {
                let mut config = Map::new();
                config.insert(keys::CONSTANTS.to_string(), other.clone());
                (config, Cardinality::One)
            }
        };

        Self {
            name,
            config,
            cardinality,
            is_resolvable,
        }
    }

    /// Whether the config carries no directive at all.
    pub fn is_empty(&self) -> bool {
        self.config.is_empty()
    }
}

impl fmt::Display for DeployEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let config = serde_json::to_string_pretty(&self.config).map_err(|_| fmt::Error)?;
        writeln!(f, "{}: {}", self.name, config)
    }
}

/// Number of branches a `_constants` payload declares.
fn constant_branches(constants: &Value) -> usize {
    match constants {
        Value::Object(map) => map.len(),
        Value::Array(items) => items.len(),
        _ => 0,
    }
}
