//! Plugin names and conditional plugin descriptors

use std::fmt;

use super::types::Plugin;

/// `IgnorePlugin`
pub const IGNORE: &str = "IgnorePlugin";
/// `DefinePlugin`
pub const DEFINE: &str = "DefinePlugin";
/// `HtmlWebpackPlugin`
pub const HTML: &str = "HtmlWebpackPlugin";
/// `InterpolateHtmlPlugin`
pub const HTML_INTERPOLATE: &str = "InterpolateHtmlPlugin";
/// `HotModuleReplacementPlugin`
pub const HOT_MODULE_REPLACEMENT: &str = "HotModuleReplacementPlugin";
/// `CaseSensitivePathsPlugin`
pub const CASE_SENSITIVE_PATHS: &str = "CaseSensitivePathsPlugin";
/// `MiniCssExtractPlugin`
pub const CSS_EXTRACT: &str = "MiniCssExtractPlugin";
/// `DllReferencePlugin`
pub const DLL_REFERENCE: &str = "DllReferencePlugin";
/// `HtmlInjectedDllReferencesPlugin`
pub const HTML_DLL_REFERENCES: &str = "HtmlInjectedDllReferencesPlugin";
/// `DllPlugin`
pub const DLL: &str = "DllPlugin";
/// `DuplicatePackageCheckerPlugin`
pub const DUPLICATE_PACKAGE_CHECK: &str = "DuplicatePackageCheckerPlugin";
/// `CircularDependencyPlugin`
pub const CIRCULAR_DEPENDENCY: &str = "CircularDependencyPlugin";
/// `TerserPlugin`
pub const TERSER: &str = "TerserPlugin";
/// `OptimizeCSSAssetsPlugin`
pub const OPTIMIZE_CSS: &str = "OptimizeCSSAssetsPlugin";
/// `WriteFilePlugin`
pub const WRITE_FILE: &str = "WriteFilePlugin";
/// `ForkTsCheckerWebpackPlugin`
pub const TYPE_CHECK: &str = "ForkTsCheckerWebpackPlugin";
/// `ESLintPlugin`
pub const LINT: &str = "ESLintPlugin";

/// A plugin that is only instantiated when its condition holds.
///
/// The factory runs lazily so disabled plugins never compute their options.
pub struct PluginDescriptor<'a> {
    /// Plugin name, for logging and tests
    pub name: &'static str,
    /// Whether the plugin ends up in the configuration
    pub enabled: bool,
    factory: Box<dyn Fn() -> Plugin + 'a>,
}

impl<'a> PluginDescriptor<'a> {
    /// Descriptor that is instantiated only when `enabled`
    pub fn new(name: &'static str, enabled: bool, factory: impl Fn() -> Plugin + 'a) -> Self {
        Self {
            name,
            enabled,
            factory: Box::new(factory),
        }
    }

    /// Always-on descriptor
    pub fn always(name: &'static str, factory: impl Fn() -> Plugin + 'a) -> Self {
        Self::new(name, true, factory)
    }

    /// Build the plugin, or `None` when disabled
    pub fn instantiate(&self) -> Option<Plugin> {
        self.enabled.then(|| (self.factory)())
    }
}

impl fmt::Debug for PluginDescriptor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginDescriptor")
            .field("name", &self.name)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

/// Instantiate every enabled descriptor, preserving order
pub fn instantiate_all(descriptors: &[PluginDescriptor<'_>]) -> Vec<Plugin> {
    descriptors
        .iter()
        .filter_map(|descriptor| {
            let plugin = descriptor.instantiate();
            if plugin.is_none() {
                log::debug!("Skipping disabled plugin {}", descriptor.name);
            }
            plugin
        })
        .collect()
}
