//! GraphQL SDL frontend built on `apollo-compiler`.

use std::path::Path;

use apollo_compiler::ast;
use apollo_compiler::schema::ExtendedType;
use apollo_compiler::Schema;
use indexmap::IndexMap;
use serde_json::{Number, Value};
use tracing::debug;

use super::document::{
    DirectiveUse, FieldDef, InputValueDef, SchemaDocument, TypeDef, TypeDefKind, TypeExpr,
};
use super::SchemaFrontend;
use crate::diagnostic::CompilerError;

/// Parses and validates SDL, then lowers it into a [`SchemaDocument`].
#[derive(Debug, Default)]
pub struct GraphQLFrontend;

impl GraphQLFrontend {
    pub fn new() -> Self {
        Self
    }
}

impl SchemaFrontend for GraphQLFrontend {
    fn language(&self) -> &str {
        "graphql"
    }

    fn extensions(&self) -> &[&str] {
        &["graphql", "gql"]
    }

    fn parse(&mut self, source: &str, path: &Path) -> Result<SchemaDocument, CompilerError> {
        let schema = Schema::parse_and_validate(source, path).map_err(|invalid| {
            CompilerError::SchemaParse {
                path: path.to_path_buf(),
                message: invalid.errors.to_string(),
            }
        })?;

        let document = lower_schema(&schema);
        debug!(types = document.types.len(), "Lowered GraphQL schema");
        Ok(document)
    }
}

fn lower_schema(schema: &Schema) -> SchemaDocument {
    let types = schema
        .types
        .iter()
        .filter(|(name, _)| !name.starts_with("__"))
        .map(|(name, ty)| (name.to_string(), lower_type_def(ty)))
        .collect();

    let roots = &schema.schema_definition;
    SchemaDocument {
        types,
        query: roots.query.as_ref().map(|root| root.name.to_string()),
        mutation: roots.mutation.as_ref().map(|root| root.name.to_string()),
        subscription: roots.subscription.as_ref().map(|root| root.name.to_string()),
    }
}

fn lower_type_def(ty: &ExtendedType) -> TypeDef {
    match ty {
        ExtendedType::Scalar(def) => TypeDef {
            name: def.name.to_string(),
            description: def.description.as_ref().map(|d| d.to_string()),
            kind: TypeDefKind::Scalar,
            directives: lower_directives(def.directives.iter().map(|d| &***d)),
        },
        ExtendedType::Enum(def) => TypeDef {
            name: def.name.to_string(),
            description: def.description.as_ref().map(|d| d.to_string()),
            kind: TypeDefKind::Enum {
                values: def.values.keys().map(|v| v.to_string()).collect(),
            },
            directives: lower_directives(def.directives.iter().map(|d| &***d)),
        },
        ExtendedType::InputObject(def) => TypeDef {
            name: def.name.to_string(),
            description: def.description.as_ref().map(|d| d.to_string()),
            kind: TypeDefKind::InputObject {
                fields: def.fields.values().map(|f| lower_input_value(f)).collect(),
            },
            directives: lower_directives(def.directives.iter().map(|d| &***d)),
        },
        ExtendedType::Object(def) => TypeDef {
            name: def.name.to_string(),
            description: def.description.as_ref().map(|d| d.to_string()),
            kind: TypeDefKind::Object {
                fields: def.fields.values().map(|f| lower_field(f)).collect(),
            },
            directives: lower_directives(def.directives.iter().map(|d| &***d)),
        },
        ExtendedType::Interface(def) => TypeDef {
            name: def.name.to_string(),
            description: def.description.as_ref().map(|d| d.to_string()),
            kind: TypeDefKind::Interface,
            directives: Vec::new(),
        },
        ExtendedType::Union(def) => TypeDef {
            name: def.name.to_string(),
            description: def.description.as_ref().map(|d| d.to_string()),
            kind: TypeDefKind::Union,
            directives: Vec::new(),
        },
    }
}

fn lower_field(field: &ast::FieldDefinition) -> FieldDef {
    FieldDef {
        name: field.name.to_string(),
        description: field.description.as_ref().map(|d| d.to_string()),
        ty: lower_type_expr(&field.ty),
        arguments: field.arguments.iter().map(|a| lower_input_value(a)).collect(),
        directives: lower_directives(field.directives.iter().map(|d| &**d)),
    }
}

fn lower_input_value(value: &ast::InputValueDefinition) -> InputValueDef {
    InputValueDef {
        name: value.name.to_string(),
        description: value.description.as_ref().map(|d| d.to_string()),
        ty: lower_type_expr(&value.ty),
        directives: lower_directives(value.directives.iter().map(|d| &**d)),
    }
}

fn lower_type_expr(ty: &ast::Type) -> TypeExpr {
    match ty {
        ast::Type::Named(name) => TypeExpr::Named(name.to_string()),
        ast::Type::NonNullNamed(name) => {
            TypeExpr::NonNull(Box::new(TypeExpr::Named(name.to_string())))
        }
        ast::Type::List(inner) => TypeExpr::List(Box::new(lower_type_expr(inner))),
        ast::Type::NonNullList(inner) => TypeExpr::NonNull(Box::new(TypeExpr::List(Box::new(
            lower_type_expr(inner),
        )))),
    }
}

fn lower_directives<'a>(directives: impl Iterator<Item = &'a ast::Directive>) -> Vec<DirectiveUse> {
    directives
        .map(|directive| DirectiveUse {
            name: directive.name.to_string(),
            arguments: directive
                .arguments
                .iter()
                .map(|arg| (arg.name.to_string(), lower_value(&arg.value)))
                .collect::<IndexMap<_, _>>(),
        })
        .collect()
}

fn lower_value(value: &ast::Value) -> Value {
    match value {
        ast::Value::Null => Value::Null,
        ast::Value::Enum(name) => Value::String(name.to_string()),
        ast::Value::Variable(name) => Value::String(format!("${}", name)),
        ast::Value::String(s) => Value::String(s.to_string()),
        ast::Value::Float(f) => float_value(f.as_str()),
        ast::Value::Int(i) => match i.as_str().parse::<i64>() {
            Ok(n) => Value::from(n),
            Err(_) => float_value(i.as_str()),
        },
        ast::Value::Boolean(b) => Value::Bool(*b),
        ast::Value::List(items) => Value::Array(items.iter().map(|item| lower_value(item)).collect()),
        ast::Value::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(name, value)| (name.to_string(), lower_value(value)))
                .collect(),
        ),
    }
}

fn float_value(text: &str) -> Value {
    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map_or(Value::Null, Value::Number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SDL: &str = r#"
directive @range(min: Float, max: Float) on FIELD_DEFINITION | INPUT_FIELD_DEFINITION | ARGUMENT_DEFINITION
directive @hasPermissions(permissions: [String]) on FIELD_DEFINITION | INPUT_FIELD_DEFINITION | INPUT_OBJECT | OBJECT

type Query {
  "The vehicle"
  vehicle: Vehicle
}

type Vehicle {
  speed(unit: String): Float @range(min: 0, max: 250.5) @hasPermissions(permissions: ["Vehicle.Speed_READ"])
  doors: [Door!]!
}

type Door @hasPermissions(permissions: ["Vehicle.Door_READ"]) {
  isOpen: Boolean
}
"#;

    #[test]
    fn test_lowering() {
        let doc = GraphQLFrontend::new()
            .parse(SDL, Path::new("schema.graphql"))
            .unwrap();

        assert_eq!(doc.query.as_deref(), Some("Query"));
        assert_eq!(doc.mutation, None);
        assert!(doc.types.keys().all(|name| !name.starts_with("__")));
        assert!(matches!(doc.get("String").map(|t| &t.kind), Some(TypeDefKind::Scalar)));

        let Some(TypeDefKind::Object { fields }) = doc.get("Vehicle").map(|t| &t.kind) else {
            panic!("Vehicle should be an object");
        };
        let speed = &fields[0];
        assert_eq!(speed.arguments[0].name, "unit");
        assert_eq!(speed.directives[0].name, "range");
        assert_eq!(speed.directives[0].argument("min"), Some(&json!(0)));
        assert_eq!(speed.directives[0].argument("max"), Some(&json!(250.5)));
        assert_eq!(
            speed.directives[1].argument("permissions"),
            Some(&json!(["Vehicle.Speed_READ"]))
        );
        assert_eq!(fields[1].ty.to_string(), "[Door!]!");
    }

    #[test]
    fn test_type_level_directives() {
        let doc = GraphQLFrontend::new()
            .parse(SDL, Path::new("schema.graphql"))
            .unwrap();

        let door = doc.get("Door").unwrap();
        assert_eq!(door.directives.len(), 1);
        assert_eq!(door.directives[0].name, "hasPermissions");
        assert_eq!(
            door.directives[0].argument("permissions"),
            Some(&json!(["Vehicle.Door_READ"]))
        );
        assert!(doc.get("Vehicle").unwrap().directives.is_empty());
    }

    #[test]
    fn test_invalid_sdl() {
        let err = GraphQLFrontend::new()
            .parse("type Query { vehicle: Missing }", Path::new("bad.graphql"))
            .unwrap_err();
        assert!(matches!(err, CompilerError::SchemaParse { .. }));
    }
}
