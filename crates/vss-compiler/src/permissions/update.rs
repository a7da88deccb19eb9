//! Registration of the permissions a schema declares.

use crate::frontend::{SchemaDocument, TypeDefKind};
use crate::schema::permissions_from_directives;

use super::PermissionRegistry;

/// Registers every `@hasPermissions` string found on object and input
/// fields, walking types by name and fields in declaration order.
pub fn update_permissions(registry: &mut PermissionRegistry, schema: &SchemaDocument) {
    for ty in schema.sorted_types() {
        let field_directives: Vec<_> = match &ty.kind {
            TypeDefKind::Object { fields } => fields.iter().map(|f| f.directives.as_slice()).collect(),
            TypeDefKind::InputObject { fields } => fields.iter().map(|f| f.directives.as_slice()).collect(),
            _ => continue,
        };
        for directives in field_directives {
            for permission in permissions_from_directives(directives).into_iter().flatten() {
                registry.register(&permission);
            }
        }
    }
}
