//! `@range` / `@hasPermissions` synthesis for VSS nodes.

use std::fmt;

use serde_json::Value;

use super::node::VssNode;
use crate::permissions::PermissionRegistry;
use crate::schema::{HAS_PERMISSIONS, RANGE};

const READ: &str = "READ";

/// A directive application to be written into SDL.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectiveNode {
    pub name: String,
    pub arguments: Vec<(String, Value)>,
}

impl fmt::Display for DirectiveNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arguments: Vec<String> = self
            .arguments
            .iter()
            .map(|(name, value)| format!("{}: {}", name, graphql_value(value)))
            .collect();
        write!(f, "@{}({})", self.name, arguments.join(", "))
    }
}

/// Directives derived for one node. Branches get none.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Directives {
    pub range: Option<DirectiveNode>,
    pub has_permissions: Option<DirectiveNode>,
}

impl Directives {
    pub fn iter(&self) -> impl Iterator<Item = &DirectiveNode> {
        self.range.iter().chain(self.has_permissions.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_none() && self.has_permissions.is_none()
    }
}

impl fmt::Display for Directives {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for directive in self.iter() {
            write!(f, " {}", directive)?;
        }
        Ok(())
    }
}

/// Derives the directives of `node`, registering its read permission.
pub fn synthesize_directives(node: &VssNode, registry: &mut PermissionRegistry) -> Directives {
    if !node.is_leaf() {
        return Directives::default();
    }
    Directives {
        range: range_directive(node),
        has_permissions: Some(has_permissions_directive(node, READ, registry)),
    }
}

/// `@range` from the node's `min`/`max`, skipping null and empty values.
pub fn range_directive(node: &VssNode) -> Option<DirectiveNode> {
    let arguments: Vec<(String, Value)> = [("min", &node.min), ("max", &node.max)]
        .into_iter()
        .filter_map(|(name, value)| match value {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.is_empty() => None,
            Some(value) => Some((name.to_string(), value.clone())),
        })
        .collect();

    if arguments.is_empty() {
        return None;
    }
    Some(DirectiveNode {
        name: RANGE.to_string(),
        arguments,
    })
}

/// `@hasPermissions(permissions: ["Vehicle.Speed_READ"])`.
pub fn has_permissions_directive(
    node: &VssNode,
    operation: &str,
    registry: &mut PermissionRegistry,
) -> DirectiveNode {
    let permission = format!("{}_{}", node.qualified_name("."), operation);
    registry.register(&permission);
    DirectiveNode {
        name: HAS_PERMISSIONS.to_string(),
        arguments: vec![(
            "permissions".to_string(),
            Value::Array(vec![Value::String(permission)]),
        )],
    }
}

fn graphql_value(value: &Value) -> String {
    match value {
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(graphql_value).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(fields) => {
            let fields: Vec<String> = fields
                .iter()
                .map(|(k, v)| format!("{}: {}", k, graphql_value(v)))
                .collect();
            format!("{{{}}}", fields.join(", "))
        }
        other => other.to_string(),
    }
}
