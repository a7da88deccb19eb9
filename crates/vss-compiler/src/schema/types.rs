//! Schema IR: named types stored in an arena and referenced by [`TypeId`].
//!
//! Object graphs may be cyclic (`Seat.row: Row`, `Row.seats: [Seat]`), so
//! types never own each other. Flags that propagate through the graph are
//! updated through the arena.

use std::fmt;

use indexmap::IndexMap;

use super::directives::{format_permissions, Range};
use crate::deploy::DeployType;

/// Index of a named type in [`VssSchema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub(crate) usize);

/// Resolved (possibly wrapped) type reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    Named(TypeId),
    NonNull(Box<TypeRef>),
    List(Box<TypeRef>),
}

impl TypeRef {
    /// The named type with every wrapper stripped.
    pub fn unwrapped(&self) -> TypeId {
        match self {
            TypeRef::Named(id) => *id,
            TypeRef::NonNull(inner) | TypeRef::List(inner) => inner.unwrapped(),
        }
    }
}

/// Root operation a type is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootKind {
    Query,
    Mutation,
    Subscription,
}

impl RootKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RootKind::Query => "query",
            RootKind::Mutation => "mutation",
            RootKind::Subscription => "subscription",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Scalar,
    Enum,
    Input,
    Object,
}

impl TypeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeKind::Scalar => "scalar",
            TypeKind::Enum => "enum",
            TypeKind::Input => "input",
            TypeKind::Object => "object",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScalarType {
    pub name: String,
    pub description: Option<String>,
    /// Not one of the five built-in GraphQL scalars.
    pub is_custom: bool,
    pub is_string: bool,
    /// One of the sized integer scalars (`Int8` .. `UInt16`).
    pub is_integer: bool,
    pub is_list: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumType {
    pub name: String,
    pub description: Option<String>,
    pub values: Vec<String>,
    pub is_list: bool,
}

/// Input object field, also used for field arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct InputField {
    pub name: String,
    pub description: Option<String>,
    pub ty: TypeRef,
    pub unwrapped: TypeId,
    pub deploy: Option<DeployType>,
    pub permissions: Option<Vec<String>>,
    pub range: Option<Range>,
    pub is_list: bool,
}

pub type Argument = InputField;

/// Object field.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub description: Option<String>,
    pub ty: TypeRef,
    pub unwrapped: TypeId,
    /// Ordered by argument name.
    pub arguments: IndexMap<String, Argument>,
    pub deploy: Option<DeployType>,
    pub permissions: Option<Vec<String>>,
    pub range: Option<Range>,
    pub is_list: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputObjectType {
    pub name: String,
    pub description: Option<String>,
    pub fields: IndexMap<String, InputField>,
    pub deploy: Option<DeployType>,
    /// Own deploy followed by every field deploy; `None` when there is none.
    pub all_deploy: Option<Vec<DeployType>>,
    pub permissions: Option<Vec<String>>,
    pub range: Option<Range>,
    pub is_list_item: bool,
    pub is_list: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectType {
    pub name: String,
    pub description: Option<String>,
    pub fields: IndexMap<String, Field>,
    pub deploy: Option<DeployType>,
    pub all_deploy: Option<Vec<DeployType>>,
    pub permissions: Option<Vec<String>>,
    pub root: Option<RootKind>,
    /// Directly reachable from a field of the query root.
    pub is_entry_point: bool,
    /// May appear as an element of a list, possibly through other objects.
    pub is_list_item: bool,
    pub is_list: bool,
    /// Fields read from an attribute of the parent object.
    pub local_attributes: Option<IndexMap<String, TypeRef>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NamedType {
    Scalar(ScalarType),
    Enum(EnumType),
    InputObject(InputObjectType),
    Object(ObjectType),
}

impl NamedType {
    pub fn name(&self) -> &str {
        match self {
            NamedType::Scalar(t) => &t.name,
            NamedType::Enum(t) => &t.name,
            NamedType::InputObject(t) => &t.name,
            NamedType::Object(t) => &t.name,
        }
    }

    pub fn kind(&self) -> TypeKind {
        match self {
            NamedType::Scalar(_) => TypeKind::Scalar,
            NamedType::Enum(_) => TypeKind::Enum,
            NamedType::InputObject(_) => TypeKind::Input,
            NamedType::Object(_) => TypeKind::Object,
        }
    }

    /// Type-level `@hasPermissions`, merged into every field of this type.
    pub fn permissions(&self) -> Option<&[String]> {
        match self {
            NamedType::InputObject(t) => t.permissions.as_deref(),
            NamedType::Object(t) => t.permissions.as_deref(),
            NamedType::Scalar(_) | NamedType::Enum(_) => None,
        }
    }

    pub fn is_list(&self) -> bool {
        match self {
            NamedType::Scalar(t) => t.is_list,
            NamedType::Enum(t) => t.is_list,
            NamedType::InputObject(t) => t.is_list,
            NamedType::Object(t) => t.is_list,
        }
    }

    pub(crate) fn mark_as_list(&mut self) {
        match self {
            NamedType::Scalar(t) => t.is_list = true,
            NamedType::Enum(t) => t.is_list = true,
            NamedType::InputObject(t) => t.is_list = true,
            NamedType::Object(t) => t.is_list = true,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectType> {
        match self {
            NamedType::Object(t) => Some(t),
            _ => None,
        }
    }
}

impl fmt::Display for NamedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamedType::Scalar(t) => {
                write!(f, "scalar {}", t.name)?;
                if t.is_custom {
                    write!(f, " is_custom")?;
                }
                if t.is_string {
                    write!(f, " is_string")?;
                }
                if t.is_integer {
                    write!(f, " is_integer")?;
                }
                Ok(())
            }
            NamedType::Enum(t) => write!(f, "enum {}", t.name),
            NamedType::InputObject(t) => {
                write!(f, "input {}", t.name)?;
                if let Some(range) = &t.range {
                    write!(f, " {}", range)?;
                }
                if t.is_list_item {
                    write!(f, " is_list_item")?;
                }
                if let Some(deploy) = &t.deploy {
                    write!(f, " (deploy: {})", deploy)?;
                }
                Ok(())
            }
            NamedType::Object(t) => {
                write!(f, "type {}", t.name)?;
                if let Some(root) = t.root {
                    write!(f, " root={}", root.as_str())?;
                }
                if t.is_entry_point {
                    write!(f, " is_entry_point")?;
                }
                if t.local_attributes.is_some() {
                    write!(f, " local_attributes")?;
                }
                if t.is_list_item {
                    write!(f, " is_list_item")?;
                }
                if let Some(deploy) = &t.deploy {
                    write!(f, " (deploy: {})", deploy)?;
                }
                Ok(())
            }
        }
    }
}

/// The populated schema IR.
///
/// Iteration order is scalars, enums, inputs, objects; each section is
/// sorted by name.
#[derive(Debug, Clone, Default)]
pub struct VssSchema {
    pub(crate) types: Vec<NamedType>,
    pub(crate) by_name: IndexMap<String, TypeId>,
    pub(crate) scalars: Vec<TypeId>,
    pub(crate) enums: Vec<TypeId>,
    pub(crate) inputs: Vec<TypeId>,
    pub(crate) objects: Vec<TypeId>,
}

impl VssSchema {
    pub fn get(&self, id: TypeId) -> &NamedType {
        &self.types[id.0]
    }

    pub(crate) fn get_mut(&mut self, id: TypeId) -> &mut NamedType {
        &mut self.types[id.0]
    }

    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    pub fn by_name(&self, name: &str) -> Option<&NamedType> {
        self.lookup(name).map(|id| self.get(id))
    }

    pub fn object(&self, name: &str) -> Option<&ObjectType> {
        match self.by_name(name)? {
            NamedType::Object(t) => Some(t),
            _ => None,
        }
    }

    pub fn input(&self, name: &str) -> Option<&InputObjectType> {
        match self.by_name(name)? {
            NamedType::InputObject(t) => Some(t),
            _ => None,
        }
    }

    pub fn scalar(&self, name: &str) -> Option<&ScalarType> {
        match self.by_name(name)? {
            NamedType::Scalar(t) => Some(t),
            _ => None,
        }
    }

    pub fn enum_type(&self, name: &str) -> Option<&EnumType> {
        match self.by_name(name)? {
            NamedType::Enum(t) => Some(t),
            _ => None,
        }
    }

    pub fn scalars(&self) -> impl Iterator<Item = &ScalarType> {
        self.scalars.iter().filter_map(|id| match self.get(*id) {
            NamedType::Scalar(t) => Some(t),
            _ => None,
        })
    }

    pub fn enums(&self) -> impl Iterator<Item = &EnumType> {
        self.enums.iter().filter_map(|id| match self.get(*id) {
            NamedType::Enum(t) => Some(t),
            _ => None,
        })
    }

    pub fn inputs(&self) -> impl Iterator<Item = &InputObjectType> {
        self.inputs.iter().filter_map(|id| match self.get(*id) {
            NamedType::InputObject(t) => Some(t),
            _ => None,
        })
    }

    pub fn objects(&self) -> impl Iterator<Item = &ObjectType> {
        self.objects.iter().filter_map(|id| self.get(*id).as_object())
    }

    /// Sections in emission order.
    pub fn sections(&self) -> [(TypeKind, &[TypeId]); 4] {
        [
            (TypeKind::Scalar, self.scalars.as_slice()),
            (TypeKind::Enum, self.enums.as_slice()),
            (TypeKind::Input, self.inputs.as_slice()),
            (TypeKind::Object, self.objects.as_slice()),
        ]
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Marks an object as a list item, along with every object reachable
    /// through its fields.
    ///
    /// Already-marked objects stop the walk, which keeps cyclic graphs finite
    /// and makes repeated calls no-ops.
    pub fn mark_list_item(&mut self, id: TypeId) {
        let mut pending = vec![id];
        while let Some(id) = pending.pop() {
            let NamedType::Object(object) = self.get_mut(id) else {
                continue;
            };
            if object.is_list_item {
                continue;
            }
            object.is_list_item = true;
            pending.extend(object.fields.values().map(|f| f.unwrapped));
        }
    }

    /// SDL spelling of a type reference (`[Door!]!`).
    pub fn render_type(&self, ty: &TypeRef) -> String {
        match ty {
            TypeRef::Named(id) => self.get(*id).name().to_string(),
            TypeRef::NonNull(inner) => format!("{}!", self.render_type(inner)),
            TypeRef::List(inner) => format!("[{}]", self.render_type(inner)),
        }
    }

    pub fn render_input_field(&self, field: &InputField) -> String {
        let mut out = format!("{}: {}", field.name, self.render_type(&field.ty));
        push_qualifiers(&mut out, field.is_list, field.permissions.as_deref(), field.range.as_ref());
        if let Some(deploy) = &field.deploy {
            out.push_str(&format!(" (deploy: {})", deploy));
        }
        out
    }

    pub fn render_field(&self, field: &Field) -> String {
        let mut out = field.name.clone();
        if !field.arguments.is_empty() {
            let args: Vec<String> = field
                .arguments
                .values()
                .map(|a| self.render_input_field(a))
                .collect();
            out.push_str(&format!("({})", args.join(", ")));
        }
        out.push_str(&format!(": {}", self.render_type(&field.ty)));
        push_qualifiers(&mut out, field.is_list, field.permissions.as_deref(), field.range.as_ref());
        if let Some(deploy) = &field.deploy {
            out.push_str(&format!(" (deploy: {})", deploy));
        }
        out
    }
}

fn push_qualifiers(out: &mut String, is_list: bool, permissions: Option<&[String]>, range: Option<&Range>) {
    if is_list {
        out.push_str(" is_list");
    }
    if let Some(permissions) = permissions.filter(|p| !p.is_empty()) {
        out.push(' ');
        out.push_str(&format_permissions(permissions));
    }
    if let Some(range) = range {
        out.push_str(&format!(" {}", range));
    }
}
