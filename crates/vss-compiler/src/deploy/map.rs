//! Flat, name-keyed view of the nested deployment layer tree.

use indexmap::IndexMap;
use serde_json::Value;

use super::entry::DeployEntry;
use super::keys;

/// A flat-map slot: one entry, or the entries collected from list items.
#[derive(Debug, Clone, PartialEq)]
pub enum FlatEntry {
    Single(DeployEntry),
    Many(Vec<DeployEntry>),
}

impl FlatEntry {
    /// The entry itself, or the first list item.
    pub fn first(&self) -> Option<&DeployEntry> {
        match self {
            FlatEntry::Single(entry) => Some(entry),
            FlatEntry::Many(entries) => entries.first(),
        }
    }

    pub fn entries(&self) -> &[DeployEntry] {
        match self {
            FlatEntry::Single(entry) => std::slice::from_ref(entry),
            FlatEntry::Many(entries) => entries,
        }
    }

    pub fn is_many(&self) -> bool {
        matches!(self, FlatEntry::Many(_))
    }
}

/// Qualified name (`Vehicle_Cabin_Door`) to entry table.
///
/// Insertion order follows the depth-first walk of the layer tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeployFlatMap {
    entries: IndexMap<String, FlatEntry>,
}

impl DeployFlatMap {
    /// Flattens a loaded layer tree.
    pub fn from_tree(tree: &Value) -> Self {
        let mut map = Self::default();
        map.flatten("", tree, false);
        map
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&FlatEntry> {
        self.entries.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FlatEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn flatten(&mut self, path: &str, node: &Value, is_list_item: bool) {
        match node {
            Value::Object(map) => {
                if map.contains_key(keys::CONSTANTS) {
                    self.handle_constant(path, node, is_list_item);
                }
                for (key, value) in map {
                    if keys::is_reserved(key) {
                        continue;
                    }
                    let name = join(path, key);
                    if is_list_item {
                        self.push_list_item(&name, value);
                    } else {
                        self.entries
                            .insert(name.clone(), FlatEntry::Single(DeployEntry::new(&name, value)));
                    }
                    if matches!(value, Value::Array(_) | Value::Object(_)) {
                        self.flatten(&name, value, is_list_item);
                    }
                }
            }
            Value::Array(items) => {
                for item in items {
                    if let Value::Object(map) = item {
                        for key in map.keys().filter(|k| !keys::is_reserved(k)) {
                            self.entries
                                .entry(join(path, key))
                                .or_insert_with(|| FlatEntry::Many(Vec::new()));
                        }
                    }
                    self.flatten(path, item, true);
                }
            }
            _ => {}
        }
    }

    /// Registers a constant-bearing node plus one synthetic child per key of
    /// its first constant branch.
    ///
    /// Inside list items the node was already appended by its parent.
    fn handle_constant(&mut self, path: &str, node: &Value, is_list_item: bool) {
        if !is_list_item {
            self.entries
                .insert(path.to_string(), FlatEntry::Single(DeployEntry::new(path, node)));
        } else if !self.entries.contains_key(path) {
            self.push_list_item(path, node);
        }

        let branch = match node.get(keys::CONSTANTS) {
            Some(Value::Object(constants)) => constants.values().next(),
            Some(Value::Array(constants)) => constants.first(),
            _ => None,
        };
        if let Some(Value::Object(fields)) = branch {
            for (key, value) in fields {
                let name = format!("{}_{}", path, key);
                if is_list_item {
                    self.push_list_item(&name, value);
                } else {
                    self.entries
                        .insert(name.clone(), FlatEntry::Single(DeployEntry::new(&name, value)));
                }
            }
        }
    }

    fn push_list_item(&mut self, name: &str, value: &Value) {
        let entry = DeployEntry::new(name, value);
        match self.entries.get_mut(name) {
            Some(FlatEntry::Many(entries)) => entries.push(entry),
            Some(slot) => {
                if let FlatEntry::Single(previous) = std::mem::replace(slot, FlatEntry::Many(Vec::new())) {
                    *slot = FlatEntry::Many(vec![previous, entry]);
                }
            }
            None => {
                self.entries.insert(name.to_string(), FlatEntry::Many(vec![entry]));
            }
        }
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}_{}", path, key)
    }
}
