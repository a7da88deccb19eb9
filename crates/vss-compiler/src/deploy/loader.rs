//! Deployment layer loader.
//!
//! Layer files are YAML with an `!include <path>` tag that splices another
//! layer file in place. Include paths are relative to the including file.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Number, Value};
use serde_yaml::Value as Yaml;
use tracing::debug;

use crate::diagnostic::CompilerError;

const INCLUDE_TAG: &str = "!include";

/// Loads a root layer file and every file it includes.
pub fn load_layer(path: &Path) -> Result<Value, CompilerError> {
    LayerLoader::default().load_file(path, None)
}

/// Loads layer text; includes resolve against `origin`'s directory.
pub fn load_layer_str(source: &str, origin: &Path) -> Result<Value, CompilerError> {
    let mut loader = LayerLoader::default();
    loader.stack.push(origin.to_path_buf());
    loader.parse(source, origin)
}

#[derive(Default)]
struct LayerLoader {
    /// Files currently being loaded, outermost first.
    stack: Vec<PathBuf>,
}

impl LayerLoader {
    fn load_file(&mut self, path: &Path, included_from: Option<&Path>) -> Result<Value, CompilerError> {
        let canonical = fs::canonicalize(path).map_err(|e| match included_from {
            Some(from) => CompilerError::IncludeNotFound {
                path: path.to_path_buf(),
                included_from: from.to_path_buf(),
            },
            None => CompilerError::io(path, e.to_string()),
        })?;

        if self.stack.contains(&canonical) {
            return Err(CompilerError::IncludeCycle { path: canonical });
        }

        debug!(path = %canonical.display(), "Loading layer file");
        let source = fs::read_to_string(&canonical).map_err(|e| CompilerError::io(&canonical, e.to_string()))?;

        self.stack.push(canonical.clone());
        let value = self.parse(&source, &canonical);
        self.stack.pop();
        value
    }

    fn parse(&mut self, source: &str, path: &Path) -> Result<Value, CompilerError> {
        let yaml: Yaml = serde_yaml::from_str(source).map_err(|e| CompilerError::LayerParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        self.convert(yaml, path)
    }

    fn convert(&mut self, yaml: Yaml, current: &Path) -> Result<Value, CompilerError> {
        Ok(match yaml {
            Yaml::Null => Value::Null,
            Yaml::Bool(b) => Value::Bool(b),
            Yaml::Number(n) => convert_number(&n),
            Yaml::String(s) => Value::String(s),
            Yaml::Sequence(items) => Value::Array(
                items
                    .into_iter()
                    .map(|item| self.convert(item, current))
                    .collect::<Result<_, _>>()?,
            ),
            Yaml::Mapping(mapping) => {
                let mut map = Map::with_capacity(mapping.len());
                for (key, value) in mapping {
                    map.insert(key_to_string(&key), self.convert(value, current)?);
                }
                Value::Object(map)
            }
            Yaml::Tagged(tagged) if tagged.tag == INCLUDE_TAG => {
                let Yaml::String(relative) = tagged.value else {
                    return Err(CompilerError::LayerParse {
                        path: current.to_path_buf(),
                        message: format!("{} expects a file path", INCLUDE_TAG),
                    });
                };
                let base = current.parent().unwrap_or_else(|| Path::new(""));
                self.load_file(&base.join(relative), Some(current))?
            }
            Yaml::Tagged(tagged) => self.convert(tagged.value, current)?,
        })
    }
}

fn convert_number(n: &serde_yaml::Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::Number(i.into())
    } else if let Some(u) = n.as_u64() {
        Value::Number(u.into())
    } else {
        n.as_f64()
            .and_then(Number::from_f64)
            .map_or(Value::Null, Value::Number)
    }
}

fn key_to_string(key: &Yaml) -> String {
    match key {
        Yaml::String(s) => s.clone(),
        Yaml::Bool(b) => b.to_string(),
        Yaml::Number(n) => n.to_string(),
        Yaml::Null => "null".to_string(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_include_relative_to_including_file() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("cabin")).unwrap();
        fs::write(
            temp.path().join("root.depl"),
            "Vehicle:\n  Cabin: !include cabin/cabin.depl\n  Width: 1920\n",
        )
        .unwrap();
        fs::write(temp.path().join("cabin/cabin.depl"), "Door: !include door.depl\n").unwrap();
        fs::write(temp.path().join("cabin/door.depl"), "IsOpen:\n  _constants: false\n").unwrap();

        let layer = load_layer(&temp.path().join("root.depl")).unwrap();
        assert_eq!(
            layer,
            json!({
                "Vehicle": {
                    "Cabin": { "Door": { "IsOpen": { "_constants": false } } },
                    "Width": 1920
                }
            })
        );
    }

    #[test]
    fn test_key_order_is_preserved() {
        let layer = load_layer_str("b: 1\na: 2\nc: 3\n", Path::new("inline.depl")).unwrap();
        let keys: Vec<&String> = layer.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_missing_include() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("root.depl"), "Vehicle: !include nope.depl\n").unwrap();

        let err = load_layer(&temp.path().join("root.depl")).unwrap_err();
        assert!(matches!(err, CompilerError::IncludeNotFound { .. }));
    }

    #[test]
    fn test_include_cycle() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.depl"), "A: !include b.depl\n").unwrap();
        fs::write(temp.path().join("b.depl"), "B: !include a.depl\n").unwrap();

        let err = load_layer(&temp.path().join("a.depl")).unwrap_err();
        assert!(matches!(err, CompilerError::IncludeCycle { .. }));
    }

    #[test]
    fn test_non_string_keys() {
        let layer = load_layer_str("1: one\ntrue: yes\n", Path::new("inline.depl")).unwrap();
        assert_eq!(layer, json!({ "1": "one", "true": "yes" }));
    }
}
