//! VSS signal tree as exported to JSON by vss-tools.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::diagnostic::CompilerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VssNodeType {
    Branch,
    Sensor,
    Actuator,
    Attribute,
    Struct,
    Property,
    #[serde(other)]
    Other,
}

/// One node of the signal tree.
#[derive(Debug, Clone, PartialEq)]
pub struct VssNode {
    pub name: String,
    /// Names from the root down to this node, inclusive.
    pub path: Vec<String>,
    pub node_type: VssNodeType,
    pub datatype: Option<String>,
    pub description: Option<String>,
    pub unit: Option<String>,
    pub min: Option<Value>,
    pub max: Option<Value>,
    pub deprecation: Option<String>,
    pub children: Vec<VssNode>,
}

#[derive(Deserialize)]
struct RawNode {
    #[serde(rename = "type")]
    node_type: VssNodeType,
    datatype: Option<String>,
    description: Option<String>,
    unit: Option<String>,
    min: Option<Value>,
    max: Option<Value>,
    deprecation: Option<String>,
    #[serde(default)]
    children: IndexMap<String, RawNode>,
}

impl VssNode {
    /// Reads a JSON export (`{"Vehicle": {"type": "branch", "children": {...}}}`).
    pub fn load(path: &Path) -> Result<Self, CompilerError> {
        let content = fs::read_to_string(path).map_err(|e| CompilerError::io(path, e.to_string()))?;
        Self::from_json_str(&content).map_err(|message| CompilerError::VssParse {
            path: path.to_path_buf(),
            message,
        })
    }

    pub fn from_json_str(source: &str) -> Result<Self, String> {
        let roots: IndexMap<String, RawNode> =
            serde_json::from_str(source).map_err(|e| e.to_string())?;
        let mut roots = roots.into_iter();
        let (name, raw) = roots.next().ok_or("VSS export has no root node")?;
        if roots.next().is_some() {
            return Err("VSS export has more than one root node".to_string());
        }
        Ok(Self::from_raw(name, raw, &[]))
    }

    fn from_raw(name: String, raw: RawNode, parent_path: &[String]) -> Self {
        let mut path = parent_path.to_vec();
        path.push(name.clone());
        let children = raw
            .children
            .into_iter()
            .map(|(child, node)| Self::from_raw(child, node, &path))
            .collect();
        Self {
            name,
            path,
            node_type: raw.node_type,
            datatype: raw.datatype,
            description: raw.description,
            unit: raw.unit,
            min: raw.min,
            max: raw.max,
            deprecation: raw.deprecation,
            children,
        }
    }

    /// `Vehicle.Cabin.Door` for `"."`, `Vehicle_Cabin_Door` for `"_"`.
    pub fn qualified_name(&self, separator: &str) -> String {
        self.path.join(separator)
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Depth-first, parents before children.
    pub fn walk(&self) -> Vec<&VssNode> {
        let mut nodes = vec![self];
        for child in &self.children {
            nodes.extend(child.walk());
        }
        nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TREE: &str = r#"{
        "Vehicle": {
            "type": "branch",
            "description": "High-level vehicle data.",
            "children": {
                "Speed": { "type": "sensor", "datatype": "float", "unit": "km/h", "min": 0, "max": 250, "description": "Vehicle speed." },
                "Cabin": {
                    "type": "branch",
                    "children": {
                        "DoorCount": { "type": "attribute", "datatype": "uint8", "min": "", "description": "Number of doors." }
                    }
                }
            }
        }
    }"#;

    #[test]
    fn test_parse_tree() {
        let root = VssNode::from_json_str(TREE).unwrap();
        assert_eq!(root.name, "Vehicle");
        assert_eq!(root.node_type, VssNodeType::Branch);
        assert!(!root.is_leaf());

        let names: Vec<String> = root.walk().iter().map(|n| n.qualified_name(".")).collect();
        assert_eq!(
            names,
            vec!["Vehicle", "Vehicle.Speed", "Vehicle.Cabin", "Vehicle.Cabin.DoorCount"]
        );
        assert_eq!(root.children[0].unit.as_deref(), Some("km/h"));
        assert_eq!(root.children[1].children[0].qualified_name("_"), "Vehicle_Cabin_DoorCount");
    }

    #[test]
    fn test_unknown_node_type() {
        let root = VssNode::from_json_str(r#"{ "A": { "type": "rbranch" } }"#).unwrap();
        assert_eq!(root.node_type, VssNodeType::Other);
        assert!(VssNode::from_json_str("{}").is_err());
    }
}
