//! Pruning of the VSS tree down to the nodes a deploy layer covers.

use tracing::warn;

use super::directives::{synthesize_directives, Directives};
use super::node::{VssNode, VssNodeType};
use crate::deploy::{Cardinality, DeployEntry, DeployFlatMap, DeployType, FlatEntry};
use crate::diagnostic::CompilerError;
use crate::permissions::PermissionRegistry;

/// A kept VSS node with its deploy data and synthesized directives.
#[derive(Debug, Clone)]
pub struct VehicleNode<'a> {
    pub node: &'a VssNode,
    pub children: Vec<VehicleNode<'a>>,
    /// For list-valued entries, the first item.
    pub deploy_entry: Option<DeployEntry>,
    pub deploy: Option<DeployType>,
    pub directives: Directives,
}

impl<'a> VehicleNode<'a> {
    pub fn name(&self) -> &str {
        &self.node.name
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn node_type(&self) -> VssNodeType {
        self.node.node_type
    }

    pub fn datatype(&self) -> Option<&str> {
        self.node.datatype.as_deref()
    }

    pub fn cardinality(&self) -> Option<Cardinality> {
        self.deploy_entry.as_ref().map(|entry| entry.cardinality)
    }

    pub fn has_write_method(&self) -> bool {
        self.deploy.as_ref().is_some_and(DeployType::has_write_method)
    }

    /// Description with an `@Unit:` line appended when the node has a unit.
    pub fn description(&self) -> Option<String> {
        let description = self.node.description.as_deref().filter(|d| !d.is_empty());
        match (&self.node.unit, description) {
            (Some(unit), Some(description)) => Some(format!("{}\n@Unit: {}", description, unit)),
            (Some(unit), None) => Some(format!("{}\n@Unit: {}", self.node.name, unit)),
            (None, description) => description.map(str::to_string),
        }
    }

    pub fn deprecation(&self) -> Option<&str> {
        self.node.deprecation.as_deref().filter(|d| !d.is_empty())
    }

    pub fn qualified_name(&self, separator: &str) -> String {
        self.node.qualified_name(separator)
    }

    /// Depth-first, parents before children.
    pub fn walk(&self) -> Vec<&VehicleNode<'a>> {
        let mut nodes = vec![self];
        for child in &self.children {
            nodes.extend(child.walk());
        }
        nodes
    }
}

/// Builds the vehicle tree rooted at `node`.
///
/// With a flat map, only children whose `_`-qualified name it contains are
/// kept. A child whose leaf-ness changes through filtering (a VSS branch
/// with nothing deployed below it) is dropped.
pub fn filter_vss_tree<'a>(
    node: &'a VssNode,
    flat: Option<&DeployFlatMap>,
    registry: &mut PermissionRegistry,
) -> Result<VehicleNode<'a>, CompilerError> {
    let deploy_entry = flat
        .and_then(|map| map.get(&node.qualified_name("_")))
        .and_then(FlatEntry::first)
        .cloned();
    let deploy = match &deploy_entry {
        Some(entry) => entry.resolve()?,
        None => None,
    };
    let directives = synthesize_directives(node, registry);

    let mut children = Vec::with_capacity(node.children.len());
    for child in &node.children {
        let name = child.qualified_name("_");
        if flat.is_some_and(|map| !map.contains(&name)) {
            continue;
        }
        let filtered = filter_vss_tree(child, flat, registry)?;
        if child.is_leaf() == filtered.is_leaf() {
            children.push(filtered);
        } else {
            warn!(node = %name, "Deploy has extra node(s) at");
        }
    }

    Ok(VehicleNode {
        node,
        children,
        deploy_entry,
        deploy,
        directives,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TREE: &str = r#"{
        "Vehicle": {
            "type": "branch",
            "children": {
                "Speed": { "type": "sensor", "unit": "km/h", "description": "Vehicle speed.", "min": 0 },
                "Cabin": {
                    "type": "branch",
                    "children": {
                        "Door": { "type": "branch", "children": {
                            "IsOpen": { "type": "actuator", "datatype": "boolean" }
                        } }
                    }
                },
                "Width": { "type": "attribute", "datatype": "uint16" }
            }
        }
    }"#;

    #[test]
    fn test_filter_keeps_deployed_nodes() {
        let tree = VssNode::from_json_str(TREE).unwrap();
        let flat = DeployFlatMap::from_tree(&json!({
            "Vehicle": {
                "Speed": { "_custom": { "origin": "CAN", "methods": { "write": { "source": { "method": "set" } } } } },
                "Cabin": { "Seat": 1 }
            }
        }));
        let mut registry = PermissionRegistry::new();
        let vehicle = filter_vss_tree(&tree, Some(&flat), &mut registry).unwrap();

        let names: Vec<String> = vehicle.walk().iter().map(|n| n.qualified_name(".")).collect();
        assert_eq!(names, vec!["Vehicle", "Vehicle.Speed"]);

        let speed = &vehicle.children[0];
        assert!(speed.has_write_method());
        assert_eq!(speed.cardinality(), Some(Cardinality::One));
        assert_eq!(speed.description().as_deref(), Some("Vehicle speed.\n@Unit: km/h"));
        assert!(speed.directives.range.is_some());

        assert_eq!(registry.get("Vehicle.Speed_READ"), Some(0));
        assert!(registry.get("Vehicle.Width_READ").is_none());
    }

    #[test]
    fn test_without_flat_map_keeps_everything() {
        let tree = VssNode::from_json_str(TREE).unwrap();
        let mut registry = PermissionRegistry::new();
        let vehicle = filter_vss_tree(&tree, None, &mut registry).unwrap();

        assert_eq!(vehicle.walk().len(), 6);
        assert_eq!(registry.len(), 3);
        assert!(vehicle.deploy.is_none());
        assert_eq!(vehicle.cardinality(), None);
    }
}
