//! Language-neutral schema document consumed by the IR builder.

use indexmap::IndexMap;
use serde_json::Value;

/// A (possibly wrapped) type reference as written in the schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    Named(String),
    NonNull(Box<TypeExpr>),
    List(Box<TypeExpr>),
}

impl TypeExpr {
    /// Innermost named type.
    pub fn named(&self) -> &str {
        match self {
            TypeExpr::Named(name) => name,
            TypeExpr::NonNull(inner) | TypeExpr::List(inner) => inner.named(),
        }
    }

    /// Whether a list wrapper appears at any depth.
    pub fn is_list(&self) -> bool {
        match self {
            TypeExpr::Named(_) => false,
            TypeExpr::List(_) => true,
            TypeExpr::NonNull(inner) => inner.is_list(),
        }
    }
}

impl std::fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeExpr::Named(name) => write!(f, "{}", name),
            TypeExpr::NonNull(inner) => write!(f, "{}!", inner),
            TypeExpr::List(inner) => write!(f, "[{}]", inner),
        }
    }
}

/// A directive application with its arguments lowered to JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectiveUse {
    pub name: String,
    pub arguments: IndexMap<String, Value>,
}

impl DirectiveUse {
    pub fn argument(&self, name: &str) -> Option<&Value> {
        self.arguments.get(name)
    }
}

/// Input field or field argument.
#[derive(Debug, Clone, PartialEq)]
pub struct InputValueDef {
    pub name: String,
    pub description: Option<String>,
    pub ty: TypeExpr,
    pub directives: Vec<DirectiveUse>,
}

/// Output field of an object type.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub description: Option<String>,
    pub ty: TypeExpr,
    pub arguments: Vec<InputValueDef>,
    pub directives: Vec<DirectiveUse>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeDefKind {
    Scalar,
    Enum { values: Vec<String> },
    InputObject { fields: Vec<InputValueDef> },
    Object { fields: Vec<FieldDef> },
    Interface,
    Union,
}

impl TypeDefKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeDefKind::Scalar => "scalar",
            TypeDefKind::Enum { .. } => "enum",
            TypeDefKind::InputObject { .. } => "input",
            TypeDefKind::Object { .. } => "object",
            TypeDefKind::Interface => "interface",
            TypeDefKind::Union => "union",
        }
    }
}

/// A named type definition.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDef {
    pub name: String,
    pub description: Option<String>,
    pub kind: TypeDefKind,
    pub directives: Vec<DirectiveUse>,
}

/// Parsed schema: the named-type table plus root operation type names.
///
/// Introspection types are never part of `types`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaDocument {
    pub types: IndexMap<String, TypeDef>,
    pub query: Option<String>,
    pub mutation: Option<String>,
    pub subscription: Option<String>,
}

impl SchemaDocument {
    pub fn get(&self, name: &str) -> Option<&TypeDef> {
        self.types.get(name)
    }

    /// Type definitions sorted by name.
    pub fn sorted_types(&self) -> Vec<&TypeDef> {
        let mut types: Vec<&TypeDef> = self.types.values().collect();
        types.sort_by(|a, b| a.name.cmp(&b.name));
        types
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_expr_list_detection() {
        let named = TypeExpr::Named("Door".into());
        let non_null_list = TypeExpr::NonNull(Box::new(TypeExpr::List(Box::new(TypeExpr::NonNull(
            Box::new(named.clone()),
        )))));

        assert!(!named.is_list());
        assert!(!TypeExpr::NonNull(Box::new(named.clone())).is_list());
        assert!(non_null_list.is_list());
        assert_eq!(non_null_list.named(), "Door");
        assert_eq!(non_null_list.to_string(), "[Door!]!");
    }
}
