//! `@range` and `@hasPermissions` directive values.

use std::fmt;

use serde_json::Value;

use crate::frontend::DirectiveUse;

pub const RANGE: &str = "range";
pub const HAS_PERMISSIONS: &str = "hasPermissions";

/// Numeric bounds from `@range(min:, max:)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Range {
    /// `None` unless a `@range` with at least one bound is present.
    pub fn from_directives(directives: &[DirectiveUse]) -> Option<Self> {
        let directive = directives.iter().find(|d| d.name == RANGE)?;
        let min = directive.argument("min").and_then(Value::as_f64);
        let max = directive.argument("max").and_then(Value::as_f64);
        if min.is_none() && max.is_none() {
            return None;
        }
        Some(Self { min, max })
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut bounds = Vec::with_capacity(2);
        if let Some(min) = self.min {
            bounds.push(format!("min: {}", min));
        }
        if let Some(max) = self.max {
            bounds.push(format!("max: {}", max));
        }
        write!(f, "@range({})", bounds.join(", "))
    }
}

/// Permission strings from `@hasPermissions(permissions: [...])`.
pub fn permissions_from_directives(directives: &[DirectiveUse]) -> Option<Vec<String>> {
    let directive = directives.iter().find(|d| d.name == HAS_PERMISSIONS)?;
    let permissions = match directive.argument("permissions") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Some(Value::String(single)) => vec![single.clone()],
        _ => Vec::new(),
    };
    Some(permissions)
}

/// Renders a permission list the way it is written in SDL.
pub fn format_permissions(permissions: &[String]) -> String {
    let quoted: Vec<String> = permissions
        .iter()
        .map(|p| Value::String(p.clone()).to_string())
        .collect();
    format!("@hasPermissions(permissions: [{}])", quoted.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use serde_json::json;

    fn directive(name: &str, args: &[(&str, Value)]) -> DirectiveUse {
        DirectiveUse {
            name: name.to_string(),
            arguments: args
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect::<IndexMap<_, _>>(),
        }
    }

    #[test]
    fn test_range() {
        let range = Range::from_directives(&[directive("range", &[("min", json!(0)), ("max", json!(250.5))])]).unwrap();
        assert_eq!(range.min, Some(0.0));
        assert_eq!(range.to_string(), "@range(min: 0, max: 250.5)");

        let only_max = Range::from_directives(&[directive("range", &[("max", json!(10))])]).unwrap();
        assert_eq!(only_max.to_string(), "@range(max: 10)");

        assert!(Range::from_directives(&[directive("range", &[("min", Value::Null)])]).is_none());
        assert!(Range::from_directives(&[]).is_none());
    }

    #[test]
    fn test_permissions() {
        let permissions = permissions_from_directives(&[
            directive("range", &[("min", json!(0))]),
            directive("hasPermissions", &[("permissions", json!(["A_READ", "B_READ"]))]),
        ])
        .unwrap();
        assert_eq!(permissions, vec!["A_READ", "B_READ"]);
        assert_eq!(
            format_permissions(&permissions),
            r#"@hasPermissions(permissions: ["A_READ", "B_READ"])"#
        );
        assert!(permissions_from_directives(&[]).is_none());
    }
}
