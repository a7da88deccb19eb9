//! Resolution of flat-map entries into deploy types.

use indexmap::IndexMap;

use super::entry::DeployEntry;
use super::factory::deploy_from_config;
use super::map::{DeployFlatMap, FlatEntry};
use super::types::{DeployList, DeployType};
use crate::diagnostic::CompilerError;

/// Resolves one flat-map slot.
///
/// List slots become a [`DeployList`] of their resolvable items, named after
/// the first one. Empty configs and configs without a directive key resolve
/// to `None`.
pub fn deploy_from_entry(entry: &FlatEntry) -> Result<Option<DeployType>, CompilerError> {
    match entry {
        FlatEntry::Single(entry) => entry.resolve(),
        FlatEntry::Many(entries) => {
            let mut resolved = Vec::with_capacity(entries.len());
            for entry in entries {
                if let Some(deploy) = entry.resolve()? {
                    resolved.push(deploy);
                }
            }
            let Some(first) = resolved.first() else {
                return Ok(None);
            };
            let name = first.name().to_string();
            Ok(Some(DeployType::List(DeployList {
                name,
                entries: resolved,
            })))
        }
    }
}

impl DeployEntry {
    /// Resolves this entry's config through the deploy factory.
    pub fn resolve(&self) -> Result<Option<DeployType>, CompilerError> {
        if self.is_empty() {
            return Ok(None);
        }
        deploy_from_config(&self.name, &self.config)
    }
}

/// Every resolvable flat-map entry, keyed by qualified name.
#[derive(Debug, Clone, Default)]
pub struct DeployTypesMap {
    types: IndexMap<String, DeployType>,
}

impl DeployTypesMap {
    pub fn from_flat_map(flat: &DeployFlatMap) -> Result<Self, CompilerError> {
        let mut types = IndexMap::new();
        for (name, entry) in flat.iter() {
            if let Some(deploy) = deploy_from_entry(entry)? {
                types.insert(name.to_string(), deploy);
            }
        }
        Ok(Self { types })
    }

    pub fn get(&self, name: &str) -> Option<&DeployType> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DeployType)> {
        self.types.iter().map(|(name, deploy)| (name.as_str(), deploy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_types_map_skips_plain_branches() {
        let flat = DeployFlatMap::from_tree(&json!({
            "Vehicle": {
                "Speed": { "_custom": { "origin": "CAN", "sharedOrigin": true, "methods": {} } },
                "Width": 1920
            }
        }));
        let types = DeployTypesMap::from_flat_map(&flat).unwrap();

        assert!(!types.contains("Vehicle"));
        assert_eq!(types.get("Vehicle_Speed").map(DeployType::kind), Some("custom"));
        assert_eq!(types.get("Vehicle_Width").map(DeployType::kind), Some("constant"));
        assert_eq!(types.len(), 2);
    }

    #[test]
    fn test_list_entry_resolves_to_list() {
        let flat = DeployFlatMap::from_tree(&json!({
            "Door": [
                { "Row": { "_constants": 1 } },
                { "Row": { "_constants": 2 } }
            ]
        }));
        let types = DeployTypesMap::from_flat_map(&flat).unwrap();

        let Some(DeployType::List(rows)) = types.get("Door_Row") else {
            panic!("expected list for Door_Row");
        };
        assert_eq!(rows.name, "Door_Row");
        assert_eq!(rows.entries.len(), 2);
        assert_eq!(rows.entry_kind(), Some("constant"));
    }

    #[test]
    fn test_empty_list_resolves_to_none() {
        assert!(deploy_from_entry(&FlatEntry::Many(Vec::new())).unwrap().is_none());
    }
}
