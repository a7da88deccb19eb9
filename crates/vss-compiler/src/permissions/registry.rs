//! Persisted permission-string to id registry.
//!
//! The registry file is a flat YAML mapping (`Vehicle.Speed_READ: 0`). Ids are
//! allocated in first-seen order and never reused, so generated permission
//! tables stay stable across runs.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use tracing::debug;

use crate::diagnostic::CompilerError;

pub type PermissionId = u32;

/// Append-only permission table.
///
/// Single-writer: nothing guards against two generation runs sharing one
/// registry file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PermissionRegistry {
    registry: IndexMap<String, PermissionId>,
    next_id: PermissionId,
    changed: bool,
}

impl PermissionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from an existing table.
    pub fn from_table(registry: IndexMap<String, PermissionId>) -> Self {
        let next_id = registry.values().max().map_or(0, |max| max + 1);
        Self {
            registry,
            next_id,
            changed: false,
        }
    }

    /// Loads the registry at `path`.
    ///
    /// A missing or empty file yields an empty registry.
    pub fn create(path: &Path) -> Result<Self, CompilerError> {
        if !path.exists() {
            debug!(path = %path.display(), "No permissions registry, starting empty");
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path).map_err(|e| CompilerError::io(path, e.to_string()))?;
        if content.trim().is_empty() {
            return Ok(Self::new());
        }

        let table: Option<IndexMap<String, PermissionId>> =
            serde_yaml::from_str(&content).map_err(|e| CompilerError::RegistryParse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        Ok(Self::from_table(table.unwrap_or_default()))
    }

    /// Returns the id of `permission`, allocating the next one if unseen.
    pub fn register(&mut self, permission: &str) -> PermissionId {
        if let Some(id) = self.registry.get(permission) {
            return *id;
        }
        let id = self.next_id;
        self.registry.insert(permission.to_string(), id);
        self.next_id += 1;
        self.changed = true;
        debug!(permission, id, "Registered permission");
        id
    }

    pub fn get(&self, permission: &str) -> Option<PermissionId> {
        self.registry.get(permission).copied()
    }

    /// Whether any permission was allocated since loading.
    pub fn changed(&self) -> bool {
        self.changed
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, PermissionId)> {
        self.registry.iter().map(|(permission, id)| (permission.as_str(), *id))
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Writes the table to `path` if it changed. Returns whether it wrote.
    ///
    /// The file is replaced whole through a temporary sibling.
    pub fn save(&self, path: &Path) -> Result<bool, CompilerError> {
        if !self.changed {
            return Ok(false);
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| CompilerError::io(parent, e.to_string()))?;
        }

        let content = serde_yaml::to_string(&self.registry)
            .map_err(|e| CompilerError::io(path, format!("Failed to serialize permissions: {}", e)))?;

        let tmp = path.with_extension("tmp");
        fs::write(&tmp, content).map_err(|e| CompilerError::io(&tmp, e.to_string()))?;
        fs::rename(&tmp, path).map_err(|e| CompilerError::io(path, e.to_string()))?;

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_register_is_idempotent() {
        let mut registry = PermissionRegistry::new();
        assert!(!registry.changed());

        assert_eq!(registry.register("Vehicle.Speed_READ"), 0);
        assert!(registry.changed());
        assert_eq!(registry.register("Vehicle.Cabin_READ"), 1);
        assert_eq!(registry.register("Vehicle.Speed_READ"), 0);
        assert!(registry.changed());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_next_id_follows_max() {
        let mut table = IndexMap::new();
        table.insert("A".to_string(), 4);
        table.insert("B".to_string(), 1);
        let mut registry = PermissionRegistry::from_table(table);

        assert_eq!(registry.register("C"), 5);
        assert_eq!(registry.get("B"), Some(1));
    }

    #[test]
    fn test_missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let registry = PermissionRegistry::create(&temp.path().join("permissions.yaml")).unwrap();
        assert!(registry.is_empty());
        assert!(!registry.changed());
    }

    #[test]
    fn test_save_only_when_changed() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("permissions.yaml");

        let mut registry = PermissionRegistry::create(&path).unwrap();
        assert!(!registry.save(&path).unwrap());
        assert!(!path.exists());

        registry.register("Vehicle.Speed_READ");
        registry.register("Vehicle.Cabin_READ");
        assert!(registry.save(&path).unwrap());

        let mut reloaded = PermissionRegistry::create(&path).unwrap();
        assert!(!reloaded.changed());
        assert_eq!(reloaded.get("Vehicle.Cabin_READ"), Some(1));
        assert_eq!(reloaded.register("Vehicle.Speed_READ"), 0);
        assert!(!reloaded.save(&path).unwrap());
    }

    #[test]
    fn test_malformed_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("permissions.yaml");
        fs::write(&path, "- not\n- a mapping\n").unwrap();

        let err = PermissionRegistry::create(&path).unwrap_err();
        assert!(matches!(err, CompilerError::RegistryParse { .. }));
    }
}
