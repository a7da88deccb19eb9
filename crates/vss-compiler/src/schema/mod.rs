//! Schema IR and its builder.

mod builder;
mod directives;
mod names;
mod types;

pub use builder::{build_schema, SchemaBuilder};
pub use directives::{format_permissions, permissions_from_directives, Range, HAS_PERMISSIONS, RANGE};
pub use names::vss_name_candidates;
pub use types::{
    Argument, EnumType, Field, InputField, InputObjectType, NamedType, ObjectType, RootKind,
    ScalarType, TypeId, TypeKind, TypeRef, VssSchema,
};
