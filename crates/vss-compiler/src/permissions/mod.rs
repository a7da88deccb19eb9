//! Permission ids.

mod registry;
mod update;

pub use registry::{PermissionId, PermissionRegistry};
pub use update::update_permissions;
