//! Built-in validators describing the `jm` option schema

use serde_json::Value;
use std::sync::Arc;

use super::validator::{pointer, OptionValidator, ValidationError, ValidatorRegistry};

/// Every property the `jm` block may declare
pub const OPTION_KEYS: [&str; 14] = [
    "electron",
    "ie8",
    "proxy",
    "importPlugin",
    "enableDuplicatePackageCheck",
    "enableCircularDependencyCheck",
    "enableTypeCheck",
    "enableLint",
    "useBuiltIns",
    "alias",
    "happypack",
    "enableDllInProduction",
    "dll",
    "electronExternalsWhitelist",
];

const BOOLEAN_KEYS: [&str; 8] = [
    "electron",
    "ie8",
    "enableDuplicatePackageCheck",
    "enableCircularDependencyCheck",
    "enableTypeCheck",
    "enableLint",
    "happypack",
    "enableDllInProduction",
];

const USE_BUILT_INS: [&str; 2] = ["entry", "usage"];

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn should_be(path: String, expected: &str) -> ValidationError {
    ValidationError::new(path, format!("should be {}", expected))
}

fn string_array(value: &Value, path: &str, errors: &mut Vec<ValidationError>) {
    match value {
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                if !item.is_string() {
                    errors.push(should_be(pointer(path, index), "string"));
                }
            }
        }
        _ => errors.push(should_be(path.to_string(), "array")),
    }
}

/// Block is an object and declares only known properties
pub struct ShapeValidator;

impl OptionValidator for ShapeValidator {
    fn name(&self) -> &str {
        "shape"
    }

    fn validate(&self, options: &Value) -> Vec<ValidationError> {
        let Value::Object(map) = options else {
            return vec![should_be(String::new(), "object")];
        };

        map.keys()
            .filter(|key| !OPTION_KEYS.contains(&key.as_str()))
            .map(|key| {
                ValidationError::new(
                    pointer("", key),
                    format!("is not a known option (expected one of: {})", OPTION_KEYS.join(", ")),
                )
            })
            .collect()
    }

    fn priority(&self) -> u32 {
        0
    }
}

/// Boolean switches and the `useBuiltIns` enum
pub struct ScalarValidator;

impl OptionValidator for ScalarValidator {
    fn name(&self) -> &str {
        "scalars"
    }

    fn validate(&self, options: &Value) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        for key in BOOLEAN_KEYS {
            if let Some(value) = options.get(key) {
                if !value.is_boolean() {
                    errors.push(should_be(pointer("", key), "boolean"));
                }
            }
        }

        if let Some(value) = options.get("useBuiltIns") {
            if !value.as_str().is_some_and(|v| USE_BUILT_INS.contains(&v)) {
                errors.push(ValidationError::new(
                    "/useBuiltIns",
                    format!(
                        "should be equal to one of the allowed values: {}",
                        USE_BUILT_INS.join(", ")
                    ),
                ));
            }
        }

        errors
    }
}

/// `alias`, `dll` and `electronExternalsWhitelist`
pub struct CollectionValidator;

impl OptionValidator for CollectionValidator {
    fn name(&self) -> &str {
        "collections"
    }

    fn validate(&self, options: &Value) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if let Some(alias) = options.get("alias") {
            match alias {
                Value::Object(map) => {
                    for (key, target) in map {
                        if !target.is_string() {
                            errors.push(should_be(pointer("/alias", key), "string"));
                        }
                    }
                }
                _ => errors.push(should_be("/alias".to_string(), "object")),
            }
        }

        if let Some(dll) = options.get("dll") {
            match dll {
                Value::Object(map) => {
                    for (key, value) in map {
                        let path = pointer("/dll", key);
                        if key == "include" || key == "exclude" {
                            string_array(value, &path, &mut errors);
                        } else {
                            errors.push(ValidationError::new(path, "is not a known dll option"));
                        }
                    }
                }
                _ => errors.push(should_be("/dll".to_string(), "object")),
            }
        }

        if let Some(whitelist) = options.get("electronExternalsWhitelist") {
            string_array(whitelist, "/electronExternalsWhitelist", &mut errors);
        }

        errors
    }
}

/// `importPlugin`: one `{libraryName, ...}` object or an array of them
pub struct ImportPluginValidator;

impl ImportPluginValidator {
    fn check_entry(value: &Value, path: &str, errors: &mut Vec<ValidationError>) {
        let Value::Object(map) = value else {
            errors.push(should_be(path.to_string(), "object"));
            return;
        };

        match map.get("libraryName") {
            Some(Value::String(_)) => {}
            Some(_) => errors.push(should_be(pointer(path, "libraryName"), "string")),
            None => errors.push(ValidationError::new(
                path,
                "should have required property 'libraryName'",
            )),
        }

        for (key, value) in map {
            let child = pointer(path, key);
            match key.as_str() {
                "libraryName" => {}
                "style" => {
                    if !(value.is_boolean() || value.is_string()) {
                        errors.push(should_be(child.clone(), "boolean"));
                        errors.push(should_be(child, "string"));
                    }
                }
                "libraryDirectory" => {
                    if !value.is_string() {
                        errors.push(should_be(child, "string"));
                    }
                }
                "camel2DashComponentName" => {
                    if !value.is_boolean() {
                        errors.push(should_be(child, "boolean"));
                    }
                }
                _ => errors.push(ValidationError::new(child, "is not a known importPlugin option")),
            }
        }
    }
}

impl OptionValidator for ImportPluginValidator {
    fn name(&self) -> &str {
        "import-plugin"
    }

    fn validate(&self, options: &Value) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        match options.get("importPlugin") {
            None => {}
            Some(Value::Array(items)) => {
                for (index, item) in items.iter().enumerate() {
                    Self::check_entry(item, &pointer("/importPlugin", index), &mut errors);
                }
            }
            Some(value @ Value::Object(_)) => Self::check_entry(value, "/importPlugin", &mut errors),
            Some(_) => {
                errors.push(should_be("/importPlugin".to_string(), "object"));
                errors.push(should_be("/importPlugin".to_string(), "array"));
            }
        }
        errors
    }
}

/// `proxy`: shorthand string, context map, `{context, target}` or an array
pub struct ProxyValidator;

impl ProxyValidator {
    fn check_origin(map: &serde_json::Map<String, Value>, path: &str, errors: &mut Vec<ValidationError>) {
        match map.get("context") {
            Some(Value::String(_)) => {}
            Some(Value::Array(items)) => {
                for (index, item) in items.iter().enumerate() {
                    if !item.is_string() {
                        errors.push(should_be(pointer(&pointer(path, "context"), index), "string"));
                    }
                }
            }
            Some(_) => {
                let child = pointer(path, "context");
                errors.push(should_be(child.clone(), "string"));
                errors.push(should_be(child, "array"));
            }
            None => {}
        }
        Self::check_target(map, path, errors);
    }

    fn check_target(map: &serde_json::Map<String, Value>, path: &str, errors: &mut Vec<ValidationError>) {
        match map.get("target") {
            Some(Value::String(_)) => {}
            Some(_) => errors.push(should_be(pointer(path, "target"), "string")),
            None => errors.push(ValidationError::new(
                path,
                "should have required property 'target'",
            )),
        }
    }
}

impl OptionValidator for ProxyValidator {
    fn name(&self) -> &str {
        "proxy"
    }

    fn validate(&self, options: &Value) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let Some(proxy) = options.get("proxy") else {
            return errors;
        };

        match proxy {
            Value::String(_) => {}
            Value::Array(items) => {
                for (index, item) in items.iter().enumerate() {
                    let path = pointer("/proxy", index);
                    match item {
                        Value::String(_) => {}
                        Value::Object(map) => {
                            if !map.contains_key("context") {
                                errors.push(ValidationError::new(
                                    path.clone(),
                                    "should have required property 'context'",
                                ));
                            }
                            Self::check_origin(map, &path, &mut errors);
                        }
                        other => errors.push(ValidationError::new(
                            path,
                            format!("should be string or object, found {}", type_name(other)),
                        )),
                    }
                }
            }
            Value::Object(map) if map.contains_key("context") => {
                Self::check_origin(map, "/proxy", &mut errors);
            }
            Value::Object(map) => {
                for (context, target) in map {
                    let path = pointer("/proxy", context);
                    match target {
                        Value::String(_) => {}
                        Value::Object(target) => Self::check_target(target, &path, &mut errors),
                        _ => {
                            errors.push(should_be(path.clone(), "string"));
                            errors.push(should_be(path, "object"));
                        }
                    }
                }
            }
            _ => {
                for expected in ["string", "object", "array"] {
                    errors.push(should_be("/proxy".to_string(), expected));
                }
            }
        }

        errors
    }
}

/// Registry preloaded with every built-in validator
///
/// # Examples
///
/// ```
/// use jm_cli::options::schema::default_registry;
/// use serde_json::json;
///
/// let registry = default_registry();
/// assert!(registry.validate_all(&json!({ "electron": true })).is_empty());
/// assert!(!registry.validate_all(&json!({ "electron": "yes" })).is_empty());
/// ```
pub fn default_registry() -> ValidatorRegistry {
    let registry = ValidatorRegistry::new();
    registry.register(Arc::new(ShapeValidator));
    registry.register(Arc::new(ScalarValidator));
    registry.register(Arc::new(CollectionValidator));
    registry.register(Arc::new(ImportPluginValidator));
    registry.register(Arc::new(ProxyValidator));
    registry
}
