//! # VSS Schema Compiler
//!
//! Builds the intermediate representation that resolver and permission
//! generators consume, from a GraphQL schema describing a Vehicle Signal
//! Specification tree and a deployment layer describing how each field is
//! backed.
//!
//! ## Architecture
//!
//! ```text
//!  .depl layer files             schema.graphql
//!        │                              │
//!        ▼                              ▼
//! ┌──────────────┐              ┌──────────────┐
//! │    Loader    │  !include    │   Frontend   │  SDL → SchemaDocument
//! └──────┬───────┘              └──────┬───────┘
//!        ▼                              │
//! ┌──────────────┐                      │
//! │   Flat map   │  name → entries      │
//! │  Types map   │  name → DeployType   │
//! └──────┬───────┘                      │
//!        │        ┌──────────────┐      │
//!        │        │ Permissions  │◄─────┤  @hasPermissions → stable ids
//!        │        └──────────────┘      │
//!        ▼                              ▼
//! ┌─────────────────────────────────────────┐
//! │               IR builder                │  two passes, flag propagation
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vss_compiler::{Compiler, CompilerConfig};
//!
//! let config = CompilerConfig {
//!     schema_path: "vss.graphql".into(),
//!     layer_path: "vspec.depl".into(),
//!     permissions_path: "permissions.yaml".into(),
//!     language: "graphql".to_string(),
//! };
//!
//! let output = Compiler::new(config).compile()?;
//! for object in output.schema.objects() {
//!     println!("{}", object.name);
//! }
//! ```

pub mod collect;
pub mod config;
pub mod deploy;
pub mod diagnostic;
pub mod frontend;
pub mod permissions;
pub mod schema;
pub mod vss;

use std::fs;

use tracing::info;

pub use collect::collect_implementations;
pub use config::CompilerConfig;
pub use diagnostic::CompilerError;

use deploy::{DeployFlatMap, DeployTypesMap};
use permissions::{update_permissions, PermissionRegistry};
use schema::{build_schema, VssSchema};

/// The main compiler struct that orchestrates the pipeline.
pub struct Compiler {
    config: CompilerConfig,
}

/// Everything one compiler run produces.
#[derive(Debug)]
pub struct CompileOutput {
    pub schema: VssSchema,
    pub flat_map: DeployFlatMap,
    pub deploy: DeployTypesMap,
    pub permissions: PermissionRegistry,
    /// The schema declared permissions the registry did not know yet.
    pub permissions_changed: bool,
    /// The registry file was rewritten by this run.
    pub permissions_saved: bool,
}

/// Summary counts of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileStats {
    pub scalars: usize,
    pub enums: usize,
    pub inputs: usize,
    pub objects: usize,
    pub deploy_entries: usize,
    pub permissions: usize,
}

impl CompileOutput {
    pub fn stats(&self) -> CompileStats {
        CompileStats {
            scalars: self.schema.scalars().count(),
            enums: self.schema.enums().count(),
            inputs: self.schema.inputs().count(),
            objects: self.schema.objects().count(),
            deploy_entries: self.deploy.len(),
            permissions: self.permissions.len(),
        }
    }
}

impl Compiler {
    /// Creates a new compiler with the given configuration.
    pub fn new(config: CompilerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Runs the full pipeline, persisting the permission registry if it
    /// changed:
    /// 1. Load the deployment layer and resolve its entries
    /// 2. Parse the schema through the configured frontend
    /// 3. Register the schema's permissions
    /// 4. Build the IR
    pub fn compile(&self) -> Result<CompileOutput, CompilerError> {
        self.run(true)
    }

    /// Runs the pipeline without writing anything.
    pub fn check(&self) -> Result<CompileOutput, CompilerError> {
        self.run(false)
    }

    /// Persists a registry that gained permissions after compilation.
    pub fn save_permissions(&self, registry: &PermissionRegistry) -> Result<bool, CompilerError> {
        registry.save(&self.config.permissions_path)
    }

    fn run(&self, persist: bool) -> Result<CompileOutput, CompilerError> {
        // Phase 1: Deployment layer
        let layer = deploy::load_layer(&self.config.layer_path)?;
        let flat_map = DeployFlatMap::from_tree(&layer);
        let deploy = DeployTypesMap::from_flat_map(&flat_map)?;
        info!(entries = flat_map.len(), resolved = deploy.len(), "Deployment layer loaded");

        // Phase 2: Schema
        let mut frontend = frontend::create_frontend(&self.config.language)?;
        let source = fs::read_to_string(&self.config.schema_path)
            .map_err(|e| CompilerError::io(&self.config.schema_path, e.to_string()))?;
        let document = frontend.parse(&source, &self.config.schema_path)?;

        // Phase 3: Permissions
        let mut permissions = PermissionRegistry::create(&self.config.permissions_path)?;
        update_permissions(&mut permissions, &document);
        let permissions_changed = permissions.changed();
        let permissions_saved = if persist && permissions_changed {
            let saved = self.save_permissions(&permissions)?;
            info!(path = %self.config.permissions_path.display(), "Permissions updated");
            saved
        } else {
            false
        };

        // Phase 4: IR
        let schema = build_schema(&document, &deploy)?;

        Ok(CompileOutput {
            schema,
            flat_map,
            deploy,
            permissions,
            permissions_changed,
            permissions_saved,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SDL: &str = r#"
directive @hasPermissions(permissions: [String]) on FIELD_DEFINITION
type Query { vehicle: Vehicle }
type Vehicle { speed: Float @hasPermissions(permissions: ["Vehicle.Speed_READ"]) }
"#;

    fn config(dir: &TempDir) -> CompilerConfig {
        std::fs::write(dir.path().join("schema.graphql"), SDL).unwrap();
        std::fs::write(dir.path().join("vspec.depl"), "Vehicle:\n  Speed: 0\n").unwrap();
        CompilerConfig {
            schema_path: dir.path().join("schema.graphql"),
            layer_path: dir.path().join("vspec.depl"),
            permissions_path: dir.path().join("permissions.yaml"),
            ..CompilerConfig::default()
        }
    }

    #[test]
    fn test_check_does_not_persist() {
        let temp = TempDir::new().unwrap();
        let compiler = Compiler::new(config(&temp));

        let output = compiler.check().unwrap();
        assert!(output.permissions_changed);
        assert!(!output.permissions_saved);
        assert!(!temp.path().join("permissions.yaml").exists());

        let stats = output.stats();
        assert_eq!(stats.objects, 2);
        assert_eq!(stats.permissions, 1);
    }

    #[test]
    fn test_compile_persists_once() {
        let temp = TempDir::new().unwrap();
        let compiler = Compiler::new(config(&temp));

        let first = compiler.compile().unwrap();
        assert!(first.permissions_saved);

        let second = compiler.compile().unwrap();
        assert!(!second.permissions_changed);
        assert!(!second.permissions_saved);
        assert_eq!(second.permissions.get("Vehicle.Speed_READ"), Some(0));
    }

    #[test]
    fn test_missing_schema_file() {
        let temp = TempDir::new().unwrap();
        let mut config = config(&temp);
        config.schema_path = temp.path().join("missing.graphql");

        let err = Compiler::new(config).compile().unwrap_err();
        assert!(matches!(err, CompilerError::IoError { .. }));
    }
}
