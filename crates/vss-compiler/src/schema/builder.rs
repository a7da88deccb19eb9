//! Two-pass schema IR builder.
//!
//! 1. Register every named type (sorted by name) so that fields can refer
//!    to types declared later.
//! 2. Populate input fields, then object fields, resolving type references,
//!    deploy directives and permissions, and propagating the entry-point and
//!    list-item flags.

use indexmap::IndexMap;
use tracing::{debug, info};

use super::directives::{permissions_from_directives, Range};
use super::names::vss_name_candidates;
use super::types::{
    EnumType, Field, InputField, InputObjectType, NamedType, ObjectType, RootKind, ScalarType,
    TypeId, TypeRef, VssSchema,
};
use crate::deploy::{DeployType, DeployTypesMap};
use crate::diagnostic::CompilerError;
use crate::frontend::{DirectiveUse, InputValueDef, SchemaDocument, TypeDef, TypeDefKind, TypeExpr};

const BUILTIN_SCALARS: &[&str] = &["Int", "Float", "String", "Boolean", "ID"];
const INTEGER_SCALARS: &[&str] = &["Int8", "Int16", "Int32", "UInt8", "UInt16"];
const NON_STRING_SCALARS: &[&str] = &["Float", "Int", "Boolean"];

/// Suffix stripped from input object names before deploy lookups.
const INPUT_SUFFIX: &str = "_Input";

/// Builds the IR from a parsed schema and resolved deploy types.
pub fn build_schema(
    document: &SchemaDocument,
    deploy: &DeployTypesMap,
) -> Result<VssSchema, CompilerError> {
    SchemaBuilder::new(document, deploy).build()
}

pub struct SchemaBuilder<'a> {
    document: &'a SchemaDocument,
    deploy: &'a DeployTypesMap,
    schema: VssSchema,
}

impl<'a> SchemaBuilder<'a> {
    pub fn new(document: &'a SchemaDocument, deploy: &'a DeployTypesMap) -> Self {
        Self {
            document,
            deploy,
            schema: VssSchema::default(),
        }
    }

    pub fn build(mut self) -> Result<VssSchema, CompilerError> {
        // Phase 1: named type slots
        self.register_types()?;

        // Phase 2: fields
        self.populate_inputs()?;
        self.populate_objects()?;

        info!(
            scalars = self.schema.scalars.len(),
            enums = self.schema.enums.len(),
            inputs = self.schema.inputs.len(),
            objects = self.schema.objects.len(),
            "Schema IR built"
        );
        Ok(self.schema)
    }

    fn register_types(&mut self) -> Result<(), CompilerError> {
        let document = self.document;
        for def in document.sorted_types() {
            let id = TypeId(self.schema.types.len());
            let named = match &def.kind {
                TypeDefKind::Scalar => {
                    self.schema.scalars.push(id);
                    NamedType::Scalar(scalar_type(def))
                }
                TypeDefKind::Enum { values } => {
                    self.schema.enums.push(id);
                    NamedType::Enum(EnumType {
                        name: def.name.clone(),
                        description: def.description.clone(),
                        values: values.clone(),
                        is_list: false,
                    })
                }
                TypeDefKind::InputObject { .. } => {
                    self.schema.inputs.push(id);
                    NamedType::InputObject(InputObjectType {
                        name: def.name.clone(),
                        description: def.description.clone(),
                        fields: IndexMap::new(),
                        deploy: self.deploy.get(&def.name).cloned(),
                        all_deploy: None,
                        permissions: permissions_from_directives(&def.directives),
                        range: Range::from_directives(&def.directives),
                        is_list_item: false,
                        is_list: false,
                    })
                }
                TypeDefKind::Object { .. } => {
                    self.schema.objects.push(id);
                    NamedType::Object(ObjectType {
                        name: def.name.clone(),
                        description: def.description.clone(),
                        fields: IndexMap::new(),
                        deploy: self.deploy.get(&def.name).cloned(),
                        all_deploy: None,
                        permissions: permissions_from_directives(&def.directives),
                        root: self.root_kind(&def.name),
                        is_entry_point: false,
                        is_list_item: false,
                        is_list: false,
                        local_attributes: None,
                    })
                }
                TypeDefKind::Interface | TypeDefKind::Union => {
                    return Err(CompilerError::UnsupportedType {
                        name: def.name.clone(),
                        kind: def.kind.as_str().to_string(),
                    });
                }
            };

            debug!(name = %def.name, kind = named.kind().as_str(), "Registered type");
            self.schema.by_name.insert(def.name.clone(), id);
            self.schema.types.push(named);
        }
        Ok(())
    }

    fn root_kind(&self, name: &str) -> Option<RootKind> {
        let is = |root: &Option<String>| root.as_deref() == Some(name);
        if is(&self.document.query) {
            Some(RootKind::Query)
        } else if is(&self.document.mutation) {
            Some(RootKind::Mutation)
        } else if is(&self.document.subscription) {
            Some(RootKind::Subscription)
        } else {
            None
        }
    }

    fn populate_inputs(&mut self) -> Result<(), CompilerError> {
        let document = self.document;
        for id in self.schema.inputs.clone() {
            let name = self.schema.get(id).name().to_string();
            let Some(TypeDef {
                kind: TypeDefKind::InputObject { fields: defs },
                ..
            }) = document.get(&name)
            else {
                continue;
            };

            let prefix = name.strip_suffix(INPUT_SUFFIX).unwrap_or(&name);
            let mut fields = IndexMap::with_capacity(defs.len());
            for def in defs {
                fields.insert(def.name.clone(), self.input_value(def, prefix, &name)?);
            }
            let child_deploy = fields.values().filter_map(|f: &InputField| f.deploy.clone()).collect();

            if let NamedType::InputObject(input) = self.schema.get_mut(id) {
                input.all_deploy = merge_all_deploy(input.deploy.as_ref(), child_deploy);
                input.fields = fields;
            }
        }
        Ok(())
    }

    fn populate_objects(&mut self) -> Result<(), CompilerError> {
        let document = self.document;
        for id in self.schema.objects.clone() {
            let name = self.schema.get(id).name().to_string();
            let Some(TypeDef {
                kind: TypeDefKind::Object { fields: defs },
                ..
            }) = document.get(&name)
            else {
                continue;
            };

            let mut fields = IndexMap::with_capacity(defs.len());
            let mut local_attributes = IndexMap::new();
            for def in defs {
                let ty = self.resolve_type(&def.ty, &name)?;
                let unwrapped = ty.unwrapped();

                let mut deploy = self.find_deploy(&name, &def.name);
                if let Some(DeployType::ParentAttribute(parent)) = &mut deploy {
                    if parent.attribute.is_none() {
                        parent.attribute = vss_name_candidates(&def.name).into_iter().next();
                    }
                    local_attributes.insert(def.name.clone(), ty.clone());
                }

                let mut args: Vec<&InputValueDef> = def.arguments.iter().collect();
                args.sort_by(|a, b| a.name.cmp(&b.name));
                let mut arguments = IndexMap::with_capacity(args.len());
                for arg in args {
                    arguments.insert(arg.name.clone(), self.input_value(arg, &name, &name)?);
                }

                let is_list = def.ty.is_list();
                if is_list {
                    self.schema.get_mut(unwrapped).mark_as_list();
                    self.schema.mark_list_item(unwrapped);
                }

                fields.insert(
                    def.name.clone(),
                    Field {
                        name: def.name.clone(),
                        description: def.description.clone(),
                        permissions: self.field_permissions(&def.directives, &ty),
                        range: Range::from_directives(&def.directives),
                        ty,
                        unwrapped,
                        arguments,
                        deploy,
                        is_list,
                    },
                );
            }

            let targets: Vec<TypeId> = fields.values().map(|f: &Field| f.unwrapped).collect();
            let child_deploy = fields.values().filter_map(|f: &Field| f.deploy.clone()).collect();

            let (root, is_list_item) = match self.schema.get_mut(id) {
                NamedType::Object(object) => {
                    object.all_deploy = merge_all_deploy(object.deploy.as_ref(), child_deploy);
                    object.fields = fields;
                    if !local_attributes.is_empty() {
                        object.local_attributes = Some(local_attributes);
                    }
                    (object.root, object.is_list_item)
                }
                _ => continue,
            };

            if root == Some(RootKind::Query) {
                for target in &targets {
                    if let NamedType::Object(child) = self.schema.get_mut(*target) {
                        child.is_entry_point = true;
                    }
                }
            }

            if is_list_item {
                for target in targets {
                    self.schema.mark_list_item(target);
                }
            }
        }
        Ok(())
    }

    fn input_value(
        &self,
        def: &InputValueDef,
        prefix: &str,
        parent: &str,
    ) -> Result<InputField, CompilerError> {
        let ty = self.resolve_type(&def.ty, parent)?;
        let unwrapped = ty.unwrapped();
        Ok(InputField {
            name: def.name.clone(),
            description: def.description.clone(),
            deploy: self.find_deploy(prefix, &def.name),
            permissions: self.field_permissions(&def.directives, &ty),
            range: Range::from_directives(&def.directives),
            is_list: def.ty.is_list(),
            ty,
            unwrapped,
        })
    }

    fn resolve_type(&self, expr: &TypeExpr, parent: &str) -> Result<TypeRef, CompilerError> {
        Ok(match expr {
            TypeExpr::Named(name) => TypeRef::Named(self.schema.lookup(name).ok_or_else(|| {
                CompilerError::UnresolvedType {
                    name: name.clone(),
                    parent: parent.to_string(),
                }
            })?),
            TypeExpr::NonNull(inner) => TypeRef::NonNull(Box::new(self.resolve_type(inner, parent)?)),
            TypeExpr::List(inner) => TypeRef::List(Box::new(self.resolve_type(inner, parent)?)),
        })
    }

    /// First deploy hit among `{prefix}_{candidate}` keys.
    fn find_deploy(&self, prefix: &str, field: &str) -> Option<DeployType> {
        vss_name_candidates(field).into_iter().find_map(|candidate| {
            let key = format!("{}_{}", prefix, candidate);
            let deploy = self.deploy.get(&key)?;
            debug!(key = %key, kind = deploy.kind(), "Deploy hit");
            Some(deploy.clone())
        })
    }

    /// Field-level permissions followed by those of the field's type.
    ///
    /// Type-level permissions are inherited only through a bare named type;
    /// list and non-null wrappers carry none.
    fn field_permissions(&self, directives: &[DirectiveUse], ty: &TypeRef) -> Option<Vec<String>> {
        let own = permissions_from_directives(directives);
        let inherited = match ty {
            TypeRef::Named(id) => self.schema.get(*id).permissions().filter(|p| !p.is_empty()),
            TypeRef::NonNull(_) | TypeRef::List(_) => None,
        };
        match (own, inherited) {
            (Some(mut own), Some(inherited)) => {
                own.extend(inherited.iter().cloned());
                Some(own)
            }
            (None, Some(inherited)) => Some(inherited.to_vec()),
            (own, None) => own,
        }
    }
}

fn scalar_type(def: &TypeDef) -> ScalarType {
    let name = def.name.as_str();
    let is_integer = INTEGER_SCALARS.contains(&name);
    ScalarType {
        name: def.name.clone(),
        description: def.description.clone(),
        is_custom: !BUILTIN_SCALARS.contains(&name),
        is_string: !(is_integer || NON_STRING_SCALARS.contains(&name)),
        is_integer,
        is_list: false,
    }
}

fn merge_all_deploy(own: Option<&DeployType>, mut children: Vec<DeployType>) -> Option<Vec<DeployType>> {
    if let Some(own) = own {
        children.insert(0, own.clone());
    }
    if children.is_empty() {
        None
    } else {
        Some(children)
    }
}
