//! Reserved keys of the deployment layer format.
//!
//! Keys starting with an underscore (plus `methods`) carry deploy directives
//! and are never treated as attribute branch names.

pub const CONSTANTS: &str = "_constants";
pub const DEFAULT_VALUE: &str = "_defaultValue";
pub const DISPATCHER: &str = "_dispatcher";
pub const FRANCA_IDL: &str = "_francaIDL";
pub const PARENT_ATTRIBUTE: &str = "_parentAttribute";
pub const CUSTOM: &str = "_custom";
pub const METHODS: &str = "methods";

/// Keys consumed by the deploy type factory instead of being flattened.
pub const RESERVED_KEYS: &[&str] = &[
    METHODS,
    FRANCA_IDL,
    CONSTANTS,
    PARENT_ATTRIBUTE,
    DISPATCHER,
    CUSTOM,
    DEFAULT_VALUE,
];

/// Whether `key` is a deploy directive key.
pub fn is_reserved(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}
