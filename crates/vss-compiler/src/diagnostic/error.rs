//! Compiler error types.
#![allow(unused_assignments)]

use std::path::PathBuf;
use miette::Diagnostic;
use thiserror::Error;

/// Errors that can occur while building the schema model.
///
/// Every variant is fatal: generation is all-or-nothing and there is no
/// partial-result mode.
#[allow(unused_assignments)]
#[derive(Error, Diagnostic, Debug)]
pub enum CompilerError {
    // =========================================================================
    // IO Errors
    // =========================================================================
    #[error("Failed to access file '{path}': {message}")]
    #[diagnostic(code(vss::io::error))]
    IoError {
        path: PathBuf,
        message: String,
    },

    // =========================================================================
    // Parse Errors
    // =========================================================================
    #[error("Failed to parse GraphQL schema '{}':\n{message}", path.display())]
    #[diagnostic(code(vss::parse::schema))]
    SchemaParse {
        path: PathBuf,
        message: String,
    },

    #[error("Failed to parse deployment layer '{}': {message}", path.display())]
    #[diagnostic(code(vss::parse::layer))]
    LayerParse {
        path: PathBuf,
        message: String,
    },

    #[error("Included layer file not found: {}", path.display())]
    #[diagnostic(
        code(vss::parse::include_not_found),
        help("!include paths are resolved relative to the including file")
    )]
    IncludeNotFound {
        path: PathBuf,
        included_from: PathBuf,
    },

    #[error("Layer include cycle through '{}'", path.display())]
    #[diagnostic(code(vss::parse::include_cycle))]
    IncludeCycle {
        path: PathBuf,
    },

    #[error("Failed to parse permissions registry '{}': {message}", path.display())]
    #[diagnostic(
        code(vss::permissions::parse),
        help("The registry must be a flat YAML mapping of permission string to integer id")
    )]
    RegistryParse {
        path: PathBuf,
        message: String,
    },

    // =========================================================================
    // Schema Errors
    // =========================================================================
    #[error("Unsupported named type '{name}' ({kind})")]
    #[diagnostic(
        code(vss::schema::unsupported_type),
        help("Unions and interfaces cannot be expressed in the resolver model")
    )]
    UnsupportedType {
        name: String,
        kind: String,
    },

    #[error("Unresolved type reference '{name}' in '{parent}'")]
    #[diagnostic(
        code(vss::schema::unresolved_type),
        help("Every referenced type must be a scalar, enum, input or object declared in the schema")
    )]
    UnresolvedType {
        name: String,
        parent: String,
    },

    // =========================================================================
    // Deploy Errors
    // =========================================================================
    #[error("Malformed deploy entry '{entry}': {message}")]
    #[diagnostic(
        code(vss::deploy::malformed),
        help("Is some layer (deploy) missing entries?")
    )]
    MalformedDeploy {
        entry: String,
        message: String,
    },

    #[error("Deploy entry '{entry}' is missing required key '{key}'")]
    #[diagnostic(code(vss::deploy::missing_key))]
    MissingDeployKey {
        entry: String,
        key: String,
    },

    #[error("Unknown deploy key '{key}' in entry '{entry}'")]
    #[diagnostic(
        code(vss::deploy::unknown_key),
        help("Known keys: _constants, _defaultValue, _dispatcher, _francaIDL, _parentAttribute, _custom")
    )]
    UnknownDeployKey {
        entry: String,
        key: String,
    },

    #[error("Failed to read VSS tree '{}': {message}", path.display())]
    #[diagnostic(code(vss::tree::parse))]
    VssParse {
        path: PathBuf,
        message: String,
    },

    // =========================================================================
    // Frontend Errors
    // =========================================================================
    #[error("Unsupported schema language: {language}")]
    #[diagnostic(code(vss::frontend::unsupported_language))]
    UnsupportedLanguage {
        language: String,
    },
}

impl CompilerError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::IoError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a malformed deploy entry error.
    pub fn malformed(entry: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedDeploy {
            entry: entry.into(),
            message: message.into(),
        }
    }

    /// Creates a missing deploy key error.
    pub fn missing_key(entry: impl Into<String>, key: impl Into<String>) -> Self {
        Self::MissingDeployKey {
            entry: entry.into(),
            key: key.into(),
        }
    }
}
