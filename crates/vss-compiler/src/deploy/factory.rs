//! Keyed factory turning a config mapping into a [`DeployType`].
//!
//! The table is tried in declaration order and the first key present in the
//! config wins. Configs carrying several directive keys silently resolve to
//! the earliest one.

use serde_json::{Map, Value};
use tracing::debug;

use super::binding::{require, require_str, DeployCustom, DeployProtocolBinding};
use super::keys;
use super::types::{DeployConstant, DeployDispatcher, DeployParentAttribute, DeployType};
use crate::diagnostic::CompilerError;

/// Builds one variant from the directive's payload and the entry name.
pub type DeployBuilder = fn(&Value, &str) -> Result<DeployType, CompilerError>;

/// Directive keys in precedence order.
pub const DEPLOY_FACTORY: &[(&str, DeployBuilder)] = &[
    (keys::CONSTANTS, build_constant),
    (keys::DEFAULT_VALUE, build_constant),
    (keys::DISPATCHER, build_dispatcher),
    (keys::FRANCA_IDL, build_protocol_binding),
    (keys::PARENT_ATTRIBUTE, build_parent_attribute),
    (keys::CUSTOM, build_custom),
];

/// Looks up the builder registered for a directive key.
pub fn builder_for(key: &str) -> Option<DeployBuilder> {
    DEPLOY_FACTORY
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, builder)| *builder)
}

/// Resolves a config mapping, or `None` when it carries no directive key.
pub fn deploy_from_config(
    name: &str,
    config: &Map<String, Value>,
) -> Result<Option<DeployType>, CompilerError> {
    for (key, builder) in DEPLOY_FACTORY {
        if let Some(value) = config.get(*key) {
            debug!(entry = name, key = *key, "Resolving deploy directive");
            return builder(value, name).map(Some);
        }
    }
    Ok(None)
}

fn build_constant(spec: &Value, name: &str) -> Result<DeployType, CompilerError> {
    Ok(DeployType::Constant(DeployConstant::new(spec.clone(), name)))
}

fn build_parent_attribute(spec: &Value, name: &str) -> Result<DeployType, CompilerError> {
    DeployParentAttribute::from_spec(spec, name).map(DeployType::ParentAttribute)
}

fn build_protocol_binding(spec: &Value, name: &str) -> Result<DeployType, CompilerError> {
    DeployProtocolBinding::from_spec(spec, name).map(DeployType::ProtocolBinding)
}

fn build_custom(spec: &Value, name: &str) -> Result<DeployType, CompilerError> {
    DeployCustom::from_spec(spec, name).map(DeployType::CustomBinding)
}

/// Each option is a one-key mapping naming its variant; options are built
/// under the dispatcher's own name.
fn build_dispatcher(spec: &Value, name: &str) -> Result<DeployType, CompilerError> {
    let spec = spec
        .as_object()
        .ok_or_else(|| CompilerError::malformed(name, "_dispatcher expects a JSON object"))?;
    let selector = require_str(spec, "selector", name)?;
    let raw_options = require(spec, "options", name)?
        .as_array()
        .ok_or_else(|| CompilerError::malformed(name, "_dispatcher.options expects a list"))?;

    let mut options = Vec::with_capacity(raw_options.len());
    for option in raw_options {
        let option = option
            .as_object()
            .ok_or_else(|| CompilerError::malformed(name, "dispatcher option expects a JSON object"))?;
        let Some((key, value)) = option.iter().next() else {
            continue;
        };
        let builder = builder_for(key).ok_or_else(|| CompilerError::UnknownDeployKey {
            entry: name.to_string(),
            key: key.clone(),
        })?;
        options.push(builder(value, name)?);
    }

    Ok(DeployType::Dispatcher(DeployDispatcher {
        name: name.to_string(),
        selector,
        options,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_first_registered_key_wins() {
        let cfg = config(json!({
            "_parentAttribute": "Row",
            "_constants": 3
        }));
        let deploy = deploy_from_config("Seat_Row", &cfg).unwrap().unwrap();
        assert_eq!(deploy.kind(), "constant");
        assert_eq!(deploy.name(), "Seat_Row");
    }

    #[test]
    fn test_no_directive_key() {
        let cfg = config(json!({ "Cabin": {} }));
        assert!(deploy_from_config("Vehicle", &cfg).unwrap().is_none());
    }

    #[test]
    fn test_default_value_is_constant() {
        let cfg = config(json!({ "_defaultValue": false }));
        let deploy = deploy_from_config("Vehicle_IsMoving", &cfg).unwrap().unwrap();
        assert!(matches!(deploy, DeployType::Constant(ref c) if c.constant == json!(false)));
    }

    #[test]
    fn test_dispatcher_options() {
        let cfg = config(json!({
            "_dispatcher": {
                "selector": "variant",
                "options": [
                    { "_constants": 1 },
                    {},
                    { "_custom": { "origin": "http", "methods": { "read": { "source": { "attribute": "x" } } } } }
                ]
            }
        }));
        let deploy = deploy_from_config("Vehicle_Speed", &cfg).unwrap().unwrap();
        let DeployType::Dispatcher(dispatcher) = &deploy else {
            panic!("expected dispatcher, got {}", deploy);
        };
        assert_eq!(dispatcher.selector, "variant");
        assert_eq!(dispatcher.options.len(), 2);
        assert!(dispatcher.options.iter().all(|o| o.name() == "Vehicle_Speed"));
        assert_eq!(deploy.entries().map(<[DeployType]>::len), Some(2));
        assert_eq!(deploy.include_path(), "");
        assert_eq!(dispatcher.options[1].include_path(), "http/vehicle");
    }

    #[test]
    fn test_dispatcher_unknown_option_key() {
        let cfg = config(json!({
            "_dispatcher": { "selector": "s", "options": [{ "_bogus": 1 }] }
        }));
        let err = deploy_from_config("Vehicle_Speed", &cfg).unwrap_err();
        assert!(matches!(err, CompilerError::UnknownDeployKey { ref key, .. } if key == "_bogus"));
    }

    #[test]
    fn test_malformed_methods() {
        let cfg = config(json!({ "_custom": { "origin": "CAN", "methods": "read" } }));
        let err = deploy_from_config("Vehicle_Speed", &cfg).unwrap_err();
        assert!(matches!(err, CompilerError::MalformedDeploy { ref entry, .. } if entry == "Vehicle_Speed"));
    }
}
