//! Implementation include collection.

use std::collections::BTreeSet;

use crate::schema::VssSchema;

/// Include paths of every object field's implementation.
///
/// Collection deploys contribute their entries' paths. A field with no
/// deploy on a list-item object, or a list field, needs the generic list
/// implementation of its object (`list/vehicle/cabin`).
pub fn collect_implementations(schema: &VssSchema) -> BTreeSet<String> {
    let mut includes = BTreeSet::new();
    for object in schema.objects() {
        for field in object.fields.values() {
            match &field.deploy {
                Some(deploy) => {
                    includes.insert(deploy.include_path());
                    for entry in deploy.entries().unwrap_or_default() {
                        includes.insert(entry.include_path());
                    }
                }
                None if object.is_list_item || field.is_list => {
                    let name = object.name.to_lowercase().replace('_', "/");
                    includes.insert(format!("list/{}", name));
                }
                None => {}
            }
        }
    }
    includes.remove("");
    includes
}
