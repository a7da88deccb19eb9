//! Access methods (`subscribe` / `read` / `write`) of bound deploy entries.

use std::fmt;

use serde_json::{Map, Value};

use crate::diagnostic::CompilerError;

/// Kind of access method, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    Subscribe,
    Read,
    Write,
}

impl MethodKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MethodKind::Subscribe => "subscribe",
            MethodKind::Read => "read",
            MethodKind::Write => "write",
        }
    }

    /// Whether the method produces values for the resolver.
    pub fn is_read(&self) -> bool {
        matches!(self, MethodKind::Subscribe | MethodKind::Read)
    }
}

/// `methods.subscribe`: value pushed by a broadcast or attribute change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubscribeMethod {
    pub source_broadcast: Option<String>,
    pub source_attribute: Option<String>,
    pub implementation_function: Option<String>,
    pub implementation_getter: Option<String>,
}

/// `methods.read`: value fetched on demand.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadMethod {
    pub source_attribute: Option<String>,
    pub source_method: Option<String>,
    pub implementation_function: Option<String>,
    pub implementation_getter: Option<String>,
}

/// `methods.write`: value pushed back to the source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteMethod {
    pub source_method: Option<String>,
    pub source_attribute: Option<String>,
    pub implementation_function: Option<String>,
}

impl SubscribeMethod {
    fn from_spec(spec: &Map<String, Value>) -> Self {
        let source = spec.get("source").and_then(Value::as_object);
        Self {
            source_broadcast: source.and_then(|s| opt_string(s, "broadcast")),
            source_attribute: source.and_then(|s| opt_string(s, "attribute")),
            implementation_function: opt_string(spec, "conversionFunction"),
            implementation_getter: opt_string(spec, "conversionGetter"),
        }
    }

    pub fn attribute(&self) -> Option<&str> {
        self.source_attribute
            .as_deref()
            .or(self.source_broadcast.as_deref())
    }

    /// A subscription fed by a broadcast is an event, not a state attribute.
    pub fn is_event(&self) -> bool {
        self.source_broadcast.is_some()
    }
}

impl ReadMethod {
    fn from_spec(spec: &Map<String, Value>) -> Self {
        let source = spec.get("source").and_then(Value::as_object);
        Self {
            source_attribute: source.and_then(|s| opt_string(s, "attribute")),
            source_method: source.and_then(|s| opt_string(s, "method")),
            implementation_function: opt_string(spec, "conversionFunction"),
            implementation_getter: opt_string(spec, "conversionGetter"),
        }
    }

    pub fn attribute(&self) -> Option<&str> {
        self.source_attribute
            .as_deref()
            .or(self.source_method.as_deref())
    }
}

impl WriteMethod {
    fn from_spec(spec: &Map<String, Value>) -> Self {
        let source = spec.get("source").and_then(Value::as_object);
        Self {
            source_method: source.and_then(|s| opt_string(s, "method")),
            source_attribute: source.and_then(|s| opt_string(s, "attribute")),
            implementation_function: opt_string(spec, "conversionFunction"),
        }
    }

    pub fn attribute(&self) -> Option<&str> {
        self.source_attribute
            .as_deref()
            .or(self.source_method.as_deref())
    }
}

/// Borrowed view over one declared method.
#[derive(Debug, Clone, Copy)]
pub enum DeployMethod<'a> {
    Subscribe(&'a SubscribeMethod),
    Read(&'a ReadMethod),
    Write(&'a WriteMethod),
}

impl<'a> DeployMethod<'a> {
    pub fn kind(&self) -> MethodKind {
        match self {
            DeployMethod::Subscribe(_) => MethodKind::Subscribe,
            DeployMethod::Read(_) => MethodKind::Read,
            DeployMethod::Write(_) => MethodKind::Write,
        }
    }

    pub fn attribute(&self) -> Option<&'a str> {
        match self {
            DeployMethod::Subscribe(m) => m.attribute(),
            DeployMethod::Read(m) => m.attribute(),
            DeployMethod::Write(m) => m.attribute(),
        }
    }

    pub fn implementation_function(&self) -> Option<&'a str> {
        match self {
            DeployMethod::Subscribe(m) => m.implementation_function.as_deref(),
            DeployMethod::Read(m) => m.implementation_function.as_deref(),
            DeployMethod::Write(m) => m.implementation_function.as_deref(),
        }
    }

    pub fn implementation_getter(&self) -> Option<&'a str> {
        match self {
            DeployMethod::Subscribe(m) => m.implementation_getter.as_deref(),
            DeployMethod::Read(m) => m.implementation_getter.as_deref(),
            DeployMethod::Write(_) => None,
        }
    }
}

impl fmt::Display for DeployMethod<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let attribute = self.attribute().unwrap_or("?");
        if let Some(function) = self.implementation_function() {
            write!(f, "{}({})", function, attribute)
        } else if let Some(getter) = self.implementation_getter() {
            write!(f, "{}.{}()", attribute, getter)
        } else {
            f.write_str(attribute)
        }
    }
}

/// The `methods` block of a protocol or custom binding.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeployMethods {
    pub subscribe: Option<SubscribeMethod>,
    pub read: Option<ReadMethod>,
    pub write: Option<WriteMethod>,
}

impl DeployMethods {
    /// Parses a `methods` mapping. Absent or empty methods are skipped.
    pub fn from_spec(spec: &Value, entry: &str) -> Result<Self, CompilerError> {
        let spec = spec
            .as_object()
            .ok_or_else(|| CompilerError::malformed(entry, "methods expects a JSON object"))?;

        Ok(Self {
            subscribe: method_spec(spec, MethodKind::Subscribe, entry)?.map(SubscribeMethod::from_spec),
            read: method_spec(spec, MethodKind::Read, entry)?.map(ReadMethod::from_spec),
            write: method_spec(spec, MethodKind::Write, entry)?.map(WriteMethod::from_spec),
        })
    }

    /// Declared methods in `subscribe`, `read`, `write` order.
    pub fn iter(&self) -> impl Iterator<Item = DeployMethod<'_>> {
        let subscribe = self.subscribe.as_ref().map(DeployMethod::Subscribe);
        let read = self.read.as_ref().map(DeployMethod::Read);
        let write = self.write.as_ref().map(DeployMethod::Write);
        subscribe.into_iter().chain(read).chain(write)
    }

    fn first_of<'a, F>(&'a self, read_only: Option<bool>, get: F) -> Option<&'a str>
    where
        F: Fn(&DeployMethod<'a>) -> Option<&'a str>,
    {
        self.iter()
            .filter(|m| read_only.map_or(true, |r| m.kind().is_read() == r))
            .find_map(|m| get(&m))
    }

    /// First source attribute declared by any method.
    pub fn attribute(&self) -> Option<&str> {
        self.first_of(None, |m| m.attribute())
    }

    pub fn read_implementation_function(&self) -> Option<&str> {
        self.first_of(Some(true), |m| m.implementation_function())
    }

    pub fn write_implementation_function(&self) -> Option<&str> {
        self.first_of(Some(false), |m| m.implementation_function())
    }

    pub fn implementation_getter(&self) -> Option<&str> {
        self.first_of(None, |m| m.implementation_getter())
    }

    pub fn has_implementation(&self) -> bool {
        self.read_implementation_function().is_some() || self.write_implementation_function().is_some()
    }

    pub fn is_event(&self) -> bool {
        self.subscribe.as_ref().is_some_and(SubscribeMethod::is_event)
    }

    /// Whether the preferred method (read, then write, then subscribe) maps to an attribute.
    pub fn is_attribute(&self) -> bool {
        if let Some(read) = &self.read {
            read.attribute().is_some()
        } else if let Some(write) = &self.write {
            write.attribute().is_some()
        } else if let Some(subscribe) = &self.subscribe {
            subscribe.attribute().is_some()
        } else {
            false
        }
    }

    pub fn has_subscribe(&self) -> bool {
        self.subscribe.is_some()
    }

    pub fn has_read(&self) -> bool {
        self.read.is_some()
    }

    pub fn has_write_method(&self) -> bool {
        self.write.is_some()
    }
}

impl fmt::Display for DeployMethods {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let items: Vec<String> = self
            .iter()
            .map(|m| format!("{}={}", m.kind().as_str(), m))
            .collect();
        write!(f, "{{{}}}", items.join(", "))
    }
}

fn method_spec<'a>(
    spec: &'a Map<String, Value>,
    kind: MethodKind,
    entry: &str,
) -> Result<Option<&'a Map<String, Value>>, CompilerError> {
    match spec.get(kind.as_str()) {
        None => Ok(None),
        Some(value) if is_falsy(value) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(_) => Err(CompilerError::malformed(
            entry,
            format!("methods.{} expects a JSON object", kind.as_str()),
        )),
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Number(_) => false,
    }
}

pub(crate) fn opt_string(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_all_methods() {
        let methods = DeployMethods::from_spec(
            &json!({
                "subscribe": { "source": { "broadcast": "speedChanged" }, "conversionFunction": "toKmh" },
                "read": { "source": { "attribute": "speed" }, "conversionGetter": "value" },
                "write": { "source": { "method": "setSpeed" } }
            }),
            "Vehicle_Speed",
        )
        .unwrap();

        assert!(methods.is_event());
        assert!(methods.is_attribute());
        assert!(methods.has_write_method());
        assert_eq!(methods.attribute(), Some("speedChanged"));
        assert_eq!(methods.read_implementation_function(), Some("toKmh"));
        assert_eq!(methods.write_implementation_function(), None);
        assert_eq!(methods.implementation_getter(), Some("value"));
        assert!(methods.has_implementation());
        assert_eq!(
            methods.to_string(),
            "{subscribe=toKmh(speedChanged), read=speed.value(), write=setSpeed}"
        );
    }

    #[test]
    fn test_is_attribute_falls_back_to_method_and_broadcast() {
        let write_only =
            DeployMethods::from_spec(&json!({ "write": { "source": { "method": "setX" } } }), "X").unwrap();
        assert_eq!(write_only.attribute(), Some("setX"));
        assert!(write_only.is_attribute());

        let broadcast = DeployMethods::from_spec(
            &json!({ "subscribe": { "source": { "broadcast": "xChanged" } } }),
            "X",
        )
        .unwrap();
        assert!(broadcast.is_attribute());
        assert!(broadcast.is_event());

        assert!(!DeployMethods::default().is_attribute());
    }

    #[test]
    fn test_empty_method_is_skipped() {
        let methods = DeployMethods::from_spec(&json!({ "read": {}, "write": null }), "X").unwrap();
        assert_eq!(methods, DeployMethods::default());
        assert!(!methods.is_attribute());
    }

    #[test]
    fn test_methods_must_be_mapping() {
        let err = DeployMethods::from_spec(&json!(["read"]), "Vehicle_Speed").unwrap_err();
        assert!(err.to_string().contains("Vehicle_Speed"));

        let err = DeployMethods::from_spec(&json!({ "read": "speed" }), "Vehicle_Speed").unwrap_err();
        assert!(err.to_string().contains("methods.read"));
    }
}
