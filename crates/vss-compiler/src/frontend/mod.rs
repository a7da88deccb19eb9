//! Schema frontends.
//!
//! A frontend parses schema source text and lowers it into a
//! [`SchemaDocument`], the only schema form the IR builder consumes.

mod document;
pub mod graphql;

use std::path::Path;

use crate::diagnostic::CompilerError;

pub use document::{
    DirectiveUse, FieldDef, InputValueDef, SchemaDocument, TypeDef, TypeDefKind, TypeExpr,
};

/// Trait for schema language frontends.
pub trait SchemaFrontend {
    /// Returns the language name (e.g., "graphql").
    fn language(&self) -> &str;

    /// Returns file extensions this frontend handles.
    fn extensions(&self) -> &[&str];

    /// Parses one schema source file.
    fn parse(&mut self, source: &str, path: &Path) -> Result<SchemaDocument, CompilerError>;
}

/// Creates a frontend for the given language.
pub fn create_frontend(language: &str) -> Result<Box<dyn SchemaFrontend>, CompilerError> {
    match language {
        "graphql" | "gql" => Ok(Box::new(graphql::GraphQLFrontend::new())),
        _ => Err(CompilerError::UnsupportedLanguage {
            language: language.to_string(),
        }),
    }
}
