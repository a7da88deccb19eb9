//! External bindings: Franca IDL proxies and custom origins.

use std::fmt;

use serde_json::{Map, Value};

use super::methods::DeployMethods;
use super::types::include_name;
use crate::diagnostic::CompilerError;

/// Interface version of a Franca IDL proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolVersion {
    pub major: u32,
    pub minor: u32,
}

impl ProtocolVersion {
    /// Accepts `2`, `"2.1"` or `2.1`.
    pub fn from_spec(spec: &Value, entry: &str) -> Result<Self, CompilerError> {
        match spec {
            Value::Number(n) => {
                if let Some(major) = n.as_u64() {
                    let major = u32::try_from(major)
                        .map_err(|_| CompilerError::malformed(entry, format!("version {} out of range", n)))?;
                    Ok(Self { major, minor: 0 })
                } else {
                    Self::parse(&n.to_string(), entry)
                }
            }
            Value::String(s) => Self::parse(s, entry),
            _ => Err(CompilerError::malformed(
                entry,
                "_francaIDL.version expects str, int or float",
            )),
        }
    }

    fn parse(text: &str, entry: &str) -> Result<Self, CompilerError> {
        let invalid = || CompilerError::malformed(entry, format!("invalid version '{}'", text));
        let mut parts = text.trim().splitn(2, '.');
        let major = parts
            .next()
            .and_then(|p| p.parse::<u32>().ok())
            .ok_or_else(invalid)?;
        let minor = match parts.next() {
            Some(p) => p.parse::<u32>().map_err(|_| invalid())?,
            None => 0,
        };
        Ok(Self { major, minor })
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Field backed by a Franca IDL proxy call (`_francaIDL`).
#[derive(Debug, Clone, PartialEq)]
pub struct DeployProtocolBinding {
    pub name: String,
    pub package: String,
    pub interface: String,
    pub instance_id: String,
    pub version: ProtocolVersion,
    pub methods: DeployMethods,
}

impl DeployProtocolBinding {
    pub fn from_spec(spec: &Value, name: &str) -> Result<Self, CompilerError> {
        let spec = expect_object(spec, name)?;
        let methods = DeployMethods::from_spec(require(spec, "methods", name)?, name)?;
        Ok(Self {
            name: name.to_string(),
            package: require_str(spec, "package", name)?,
            interface: require_str(spec, "interface", name)?,
            instance_id: scalar_to_string(require(spec, "instanceId", name)?),
            version: ProtocolVersion::from_spec(require(spec, "version", name)?, name)?,
            methods,
        })
    }

    pub fn include_path(&self) -> String {
        format!("franca/{}", include_name(&self.name))
    }
}

/// Field backed by a custom origin (`_custom`), e.g. `"http"` or `"MQTT"`.
///
/// With `shared_origin` the resolver reaches the origin through a singleton
/// named `originName__attributeName`; otherwise it calls a plain function of
/// the implementation library.
#[derive(Debug, Clone, PartialEq)]
pub struct DeployCustom {
    pub name: String,
    pub origin: String,
    pub shared_origin: bool,
    pub shared_attribute: bool,
    pub methods: DeployMethods,
}

impl DeployCustom {
    pub fn from_spec(spec: &Value, name: &str) -> Result<Self, CompilerError> {
        let spec = expect_object(spec, name)?;
        let methods = DeployMethods::from_spec(require(spec, "methods", name)?, name)?;
        Ok(Self {
            name: name.to_string(),
            origin: require_str(spec, "origin", name)?,
            shared_origin: spec.get("sharedOrigin").is_some_and(truthy),
            shared_attribute: spec.get("sharedAttribute").is_some_and(truthy),
            methods,
        })
    }

    pub fn uses_singleton(&self) -> bool {
        self.shared_origin
    }

    pub fn include_path(&self) -> String {
        let mut chars = self.origin.chars();
        let origin: String = match chars.next() {
            Some(first) => first.to_lowercase().chain(chars).collect(),
            None => String::new(),
        };
        format!("{}/{}", origin, include_name(&self.name))
    }
}

fn expect_object<'a>(spec: &'a Value, name: &str) -> Result<&'a Map<String, Value>, CompilerError> {
    spec.as_object()
        .ok_or_else(|| CompilerError::malformed(name, format!("JSON value is not an object: {}", spec)))
}

pub(crate) fn require<'a>(
    spec: &'a Map<String, Value>,
    key: &str,
    name: &str,
) -> Result<&'a Value, CompilerError> {
    spec.get(key).ok_or_else(|| CompilerError::missing_key(name, key))
}

pub(crate) fn require_str(spec: &Map<String, Value>, key: &str, name: &str) -> Result<String, CompilerError> {
    match require(spec, key, name)? {
        Value::String(s) => Ok(s.clone()),
        other => Err(CompilerError::malformed(
            name,
            format!("'{}' expects a string, got {}", key, other),
        )),
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}
