//! Compiler configuration.

use std::path::PathBuf;

/// Configuration for the schema compiler.
#[derive(Debug, Clone)]
pub struct CompilerConfig {
    /// GraphQL SDL file.
    pub schema_path: PathBuf,

    /// Root deployment layer file (`.depl`).
    pub layer_path: PathBuf,

    /// Persisted permission registry (YAML).
    pub permissions_path: PathBuf,

    /// Schema language (default: "graphql").
    pub language: String,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            schema_path: PathBuf::from("schema.graphql"),
            layer_path: PathBuf::from("vspec.depl"),
            permissions_path: PathBuf::from("permissions.yaml"),
            language: "graphql".to_string(),
        }
    }
}
