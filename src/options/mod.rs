//! Tool options declared under the `jm` key of `package.json`
//!
//! The raw block is validated by a [`ValidatorRegistry`], shallow-merged over
//! [`JmOptions::default`] (declared values win) and deserialized into typed
//! options. Resolution happens once per invocation, when the
//! [`InvocationContext`](crate::context::InvocationContext) is built.

pub mod schema;
pub mod validator;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::JmError;
use crate::manifest::Manifest;
use crate::proxy::ProxyConfig;

pub use validator::{aggregate, OptionValidator, ValidationError, ValidatorRegistry};

/// `style` setting of an import plugin entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImportStyle {
    /// `true` imports the library's default style entry
    Enabled(bool),
    /// Named style entry such as `"css"`
    Named(String),
}

/// On-demand import configuration for one component library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportPluginConfig {
    /// Library to rewrite imports for, e.g. `antd`
    pub library_name: String,
    /// Style import behavior
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<ImportStyle>,
    /// Directory components live in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library_directory: Option<String>,
    /// Convert `DatePicker` to `date-picker` when resolving files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camel2_dash_component_name: Option<bool>,
}

/// `importPlugin` accepts one entry or a list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImportPluginSetting {
    /// Single library
    One(ImportPluginConfig),
    /// Several libraries
    Many(Vec<ImportPluginConfig>),
}

impl ImportPluginSetting {
    /// Entries as a flat list
    pub fn entries(&self) -> Vec<&ImportPluginConfig> {
        match self {
            Self::One(config) => vec![config],
            Self::Many(configs) => configs.iter().collect(),
        }
    }
}

/// Polyfill injection strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UseBuiltIns {
    /// Replace a single polyfill import in the entry
    Entry,
    /// Add polyfills per usage
    #[default]
    Usage,
}

/// DLL pre-bundle module selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DllOptions {
    /// Modules added on top of the dependency list
    #[serde(default)]
    pub include: Vec<String>,
    /// Names or `/regex/` literals removed from the list
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// Validated tool options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JmOptions {
    /// Build an Electron renderer plus main process
    pub electron: bool,
    /// Target IE8: no hot reload, extracted CSS in development
    pub ie8: bool,
    /// Dev-server proxy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<ProxyConfig>,
    /// On-demand import rewriting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import_plugin: Option<ImportPluginSetting>,
    /// Warn about several versions of one package
    pub enable_duplicate_package_check: bool,
    /// Warn about circular imports
    pub enable_circular_dependency_check: bool,
    /// Run the type checker alongside the build
    pub enable_type_check: bool,
    /// Run the linter alongside the build
    pub enable_lint: bool,
    /// Polyfill injection strategy
    pub use_built_ins: UseBuiltIns,
    /// Extra module aliases
    #[serde(default)]
    pub alias: BTreeMap<String, String>,
    /// Transpile scripts on a worker pool
    pub happypack: bool,
    /// Reference the DLL in production builds too
    pub enable_dll_in_production: bool,
    /// DLL module selection
    #[serde(default)]
    pub dll: DllOptions,
    /// Modules bundled into the Electron main process instead of externalized
    #[serde(default)]
    pub electron_externals_whitelist: Vec<String>,
}

impl Default for JmOptions {
    fn default() -> Self {
        let cpus = std::thread::available_parallelism().map_or(1, |n| n.get());
        Self {
            electron: false,
            ie8: false,
            proxy: None,
            import_plugin: None,
            enable_duplicate_package_check: true,
            enable_circular_dependency_check: true,
            enable_type_check: true,
            enable_lint: true,
            use_built_ins: UseBuiltIns::Usage,
            alias: BTreeMap::new(),
            happypack: cpus > 1,
            enable_dll_in_production: false,
            dll: DllOptions::default(),
            electron_externals_whitelist: Vec::new(),
        }
    }
}

impl JmOptions {
    /// Resolve options from the manifest using the built-in schema
    ///
    /// # Examples
    ///
    /// ```
    /// use jm_cli::manifest::Manifest;
    /// use jm_cli::options::JmOptions;
    /// use serde_json::json;
    ///
    /// let manifest = Manifest {
    ///     options: Some(json!({ "electron": true })),
    ///     ..Manifest::default()
    /// };
    /// let options = JmOptions::resolve(&manifest)?;
    /// assert!(options.electron);
    /// assert!(options.enable_lint);
    /// # Ok::<(), jm_cli::error::JmError>(())
    /// ```
    pub fn resolve(manifest: &Manifest) -> Result<Self, JmError> {
        Self::resolve_with(manifest, &schema::default_registry())
    }

    /// Resolve options, validating with a custom registry
    pub fn resolve_with(manifest: &Manifest, registry: &ValidatorRegistry) -> Result<Self, JmError> {
        let Some(block) = &manifest.options else {
            return Ok(Self::default());
        };

        let errors = registry.validate_all(block);
        if !errors.is_empty() {
            return Err(JmError::ConfigurationValidation {
                errors: aggregate(errors),
            });
        }

        let mut merged = match serde_json::to_value(Self::default()) {
            Ok(serde_json::Value::Object(defaults)) => defaults,
            _ => serde_json::Map::new(),
        };
        if let serde_json::Value::Object(declared) = block {
            for (key, value) in declared {
                merged.insert(key.clone(), value.clone());
            }
        }

        serde_json::from_value(serde_json::Value::Object(merged)).map_err(|e| {
            JmError::ConfigurationValidation {
                errors: vec![ValidationError::new("", e.to_string())],
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn manifest_with(block: serde_json::Value) -> Manifest {
        Manifest {
            options: Some(block),
            ..Manifest::default()
        }
    }

    #[test]
    fn test_missing_block_yields_defaults() {
        let options = JmOptions::resolve(&Manifest::default()).unwrap();
        assert_eq!(options, JmOptions::default());
        assert_eq!(options.use_built_ins, UseBuiltIns::Usage);
        assert!(options.enable_duplicate_package_check);
    }

    #[test]
    fn test_declared_values_win_over_defaults() {
        let options = JmOptions::resolve(&manifest_with(json!({
            "enableDuplicatePackageCheck": false,
            "useBuiltIns": "entry",
            "happypack": false,
            "alias": { "@": "./src" }
        })))
        .unwrap();

        assert!(!options.enable_duplicate_package_check);
        assert!(options.enable_circular_dependency_check);
        assert_eq!(options.use_built_ins, UseBuiltIns::Entry);
        assert!(!options.happypack);
        assert_eq!(options.alias["@"], "./src");
    }

    #[test]
    fn test_invalid_block_reports_aggregated_errors() {
        let err = JmOptions::resolve(&manifest_with(json!({
            "electron": 1,
            "proxy": 2
        })))
        .unwrap_err();

        let JmError::ConfigurationValidation { errors } = err else {
            panic!("expected a validation error");
        };
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].path, "/electron");
        assert_eq!(errors[1].path, "/proxy");
    }

    #[test]
    fn test_import_plugin_accepts_single_entry_or_list() {
        let single = JmOptions::resolve(&manifest_with(json!({
            "importPlugin": { "libraryName": "antd", "style": true }
        })))
        .unwrap();
        assert_eq!(single.import_plugin.unwrap().entries().len(), 1);

        let many = JmOptions::resolve(&manifest_with(json!({
            "importPlugin": [{ "libraryName": "antd" }, { "libraryName": "antd-mobile" }]
        })))
        .unwrap();
        assert_eq!(many.import_plugin.unwrap().entries().len(), 2);
    }

    #[test]
    fn test_resolution_is_repeatable() {
        let manifest = manifest_with(json!({ "ie8": true }));
        assert_eq!(
            JmOptions::resolve(&manifest).unwrap(),
            JmOptions::resolve(&manifest).unwrap()
        );
    }
}
