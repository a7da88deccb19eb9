//! Resolved deployment directives.
//!
//! A [`DeployType`] is what a schema field is backed by: a constant, an
//! attribute of the parent object, an external proxy call, a custom origin,
//! a selector-driven choice between alternatives, or a list of those.

use std::fmt;

use serde_json::Value;

use super::binding::{DeployCustom, DeployProtocolBinding};
use super::methods::DeployMethods;
use crate::diagnostic::CompilerError;

/// Constant value (`_constants` / `_defaultValue`).
#[derive(Debug, Clone, PartialEq)]
pub struct DeployConstant {
    pub name: String,
    pub constant: Value,
}

impl DeployConstant {
    pub fn new(constant: Value, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constant,
        }
    }
}

/// Value read from an attribute of the parent object (`_parentAttribute`).
///
/// A missing attribute name is defaulted to the field's VSS name once the
/// owning object is populated.
#[derive(Debug, Clone, PartialEq)]
pub struct DeployParentAttribute {
    pub name: String,
    pub attribute: Option<String>,
}

impl DeployParentAttribute {
    pub fn from_spec(spec: &Value, name: &str) -> Result<Self, CompilerError> {
        let attribute = match spec {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            _ => {
                return Err(CompilerError::malformed(
                    name,
                    "_parentAttribute expects a string or null",
                ))
            }
        };
        Ok(Self {
            name: name.to_string(),
            attribute,
        })
    }
}

/// Selector-driven choice among alternative bindings (`_dispatcher`).
#[derive(Debug, Clone, PartialEq)]
pub struct DeployDispatcher {
    pub name: String,
    pub selector: String,
    pub options: Vec<DeployType>,
}

/// Bindings collected from the items of a list-valued layer node.
#[derive(Debug, Clone, PartialEq)]
pub struct DeployList {
    pub name: String,
    pub entries: Vec<DeployType>,
}

impl DeployList {
    /// Kind of the first entry; list items share their binding kind.
    pub fn entry_kind(&self) -> Option<&'static str> {
        self.entries.first().map(DeployType::kind)
    }
}

/// A resolved deploy directive.
#[derive(Debug, Clone, PartialEq)]
pub enum DeployType {
    Constant(DeployConstant),
    ParentAttribute(DeployParentAttribute),
    ProtocolBinding(DeployProtocolBinding),
    CustomBinding(DeployCustom),
    Dispatcher(DeployDispatcher),
    List(DeployList),
}

impl DeployType {
    /// Entry name the directive was declared under.
    pub fn name(&self) -> &str {
        match self {
            DeployType::Constant(d) => &d.name,
            DeployType::ParentAttribute(d) => &d.name,
            DeployType::ProtocolBinding(d) => &d.name,
            DeployType::CustomBinding(d) => &d.name,
            DeployType::Dispatcher(d) => &d.name,
            DeployType::List(d) => &d.name,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            DeployType::Constant(_) => "constant",
            DeployType::ParentAttribute(_) => "parent_attribute",
            DeployType::ProtocolBinding(_) => "franca_idl",
            DeployType::CustomBinding(_) => "custom",
            DeployType::Dispatcher(_) => "dispatcher",
            DeployType::List(_) => "list",
        }
    }

    /// Path of the implementation header backing this directive.
    ///
    /// Empty for directive-only variants; collections expose their
    /// [`entries`](Self::entries) instead.
    pub fn include_path(&self) -> String {
        match self {
            DeployType::ProtocolBinding(d) => d.include_path(),
            DeployType::CustomBinding(d) => d.include_path(),
            DeployType::Constant(_)
            | DeployType::ParentAttribute(_)
            | DeployType::Dispatcher(_)
            | DeployType::List(_) => String::new(),
        }
    }

    /// Nested directives of `Dispatcher` and `List`.
    pub fn entries(&self) -> Option<&[DeployType]> {
        match self {
            DeployType::Dispatcher(d) => Some(&d.options),
            DeployType::List(d) => Some(&d.entries),
            _ => None,
        }
    }

    pub fn is_collection(&self) -> bool {
        self.entries().is_some()
    }

    pub fn methods(&self) -> Option<&DeployMethods> {
        match self {
            DeployType::ProtocolBinding(d) => Some(&d.methods),
            DeployType::CustomBinding(d) => Some(&d.methods),
            _ => None,
        }
    }

    pub fn has_write_method(&self) -> bool {
        self.methods().is_some_and(DeployMethods::has_write_method)
    }
}

impl fmt::Display for DeployType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeployType::Constant(d) => write!(f, "constant(constant={})", d.constant),
            DeployType::ParentAttribute(d) => write!(
                f,
                "parent_attribute(attribute={})",
                d.attribute.as_deref().unwrap_or("None")
            ),
            DeployType::ProtocolBinding(d) => write!(
                f,
                "franca_idl(package={}, interface={}, instance_id={}, version={}, methods={})",
                d.package, d.interface, d.instance_id, d.version, d.methods
            ),
            DeployType::CustomBinding(d) => write!(
                f,
                "custom(origin={}, shared_origin={}, shared_attribute={}, methods={})",
                d.origin, d.shared_origin, d.shared_attribute, d.methods
            ),
            DeployType::Dispatcher(d) => {
                let options: Vec<String> = d.options.iter().map(ToString::to_string).collect();
                write!(f, "dispatcher(selector={}, options=[{}])", d.selector, options.join(", "))
            }
            DeployType::List(d) => {
                let entries: Vec<String> = d.entries.iter().map(ToString::to_string).collect();
                write!(f, "list({})", entries.join(", "))
            }
        }
    }
}

/// Include name derived from an entry name: lowercased, split on `_`, last
/// segment dropped, joined with `/`.
pub(crate) fn include_name(name: &str) -> String {
    let lowered = name.to_lowercase();
    let segments: Vec<&str> = lowered.split('_').collect();
    let keep = segments.len().saturating_sub(1);
    segments[..keep].join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_include_name() {
        assert_eq!(include_name("Vehicle_Cabin_Door_IsOpen"), "vehicle/cabin/door");
        assert_eq!(include_name("Vehicle"), "");
    }

    #[test]
    fn test_parent_attribute_spec() {
        let named = DeployParentAttribute::from_spec(&json!("Row"), "Seat_Row").unwrap();
        assert_eq!(named.attribute.as_deref(), Some("Row"));

        let unnamed = DeployParentAttribute::from_spec(&Value::Null, "Seat_Row").unwrap();
        assert_eq!(unnamed.attribute, None);

        assert!(DeployParentAttribute::from_spec(&json!(3), "Seat_Row").is_err());
    }

    #[test]
    fn test_directive_only_variants_have_no_include_path() {
        let constant = DeployType::Constant(DeployConstant::new(json!([1, 2]), "Vehicle_Rows"));
        assert_eq!(constant.include_path(), "");
        assert!(!constant.is_collection());

        let list = DeployType::List(DeployList {
            name: "Vehicle_Rows".into(),
            entries: vec![constant.clone()],
        });
        assert_eq!(list.include_path(), "");
        assert_eq!(list.entries().map(<[DeployType]>::len), Some(1));
        assert_eq!(list.to_string(), "list(constant(constant=[1,2]))");
    }
}
