//! VSS signal tree support: loading, deploy-driven filtering and directive
//! synthesis.

mod directives;
mod filter;
mod node;

pub use directives::{
    has_permissions_directive, range_directive, synthesize_directives, DirectiveNode, Directives,
};
pub use filter::{filter_vss_tree, VehicleNode};
pub use node::{VssNode, VssNodeType};
