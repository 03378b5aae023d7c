//! Data model of the configuration handed to the bundler

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Development or production build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    /// Unminified, hot-reloading, unhashed filenames
    Development,
    /// Minified, content-hashed filenames
    Production,
}

impl BuildMode {
    /// Name used for `NODE_ENV` and dotenv file suffixes
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }

    /// Whether this is a production build
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runtime the bundle targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Target {
    /// Browser
    Web,
    /// Electron renderer process
    ElectronRenderer,
    /// Electron main process
    ElectronMain,
}

/// A loader and its options
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Loader {
    /// Loader package name
    pub loader: String,
    /// Loader options
    #[serde(skip_serializing_if = "serde_json::Value::is_null")]
    pub options: serde_json::Value,
}

impl Loader {
    /// Loader without options
    pub fn new(loader: impl Into<String>) -> Self {
        Self {
            loader: loader.into(),
            options: serde_json::Value::Null,
        }
    }

    /// Loader with options
    pub fn with_options(loader: impl Into<String>, options: serde_json::Value) -> Self {
        Self {
            loader: loader.into(),
            options,
        }
    }
}

/// Module transform rule matched by file name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rule {
    /// Regex sources a file must match (any)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub test: Vec<String>,
    /// Directories the rule is limited to
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<PathBuf>,
    /// Regex sources of files the rule skips
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
    /// Loader chain, applied last to first
    #[serde(rename = "use")]
    pub loaders: Vec<Loader>,
}

impl Rule {
    /// Rule matching `test`
    pub fn new(test: &[&str], loaders: Vec<Loader>) -> Self {
        Self {
            test: test.iter().map(|t| t.to_string()).collect(),
            include: Vec::new(),
            exclude: Vec::new(),
            loaders,
        }
    }

    /// Skip files matching `exclude`
    pub fn excluding(mut self, exclude: &[&str]) -> Self {
        self.exclude.extend(exclude.iter().map(|e| e.to_string()));
        self
    }

    /// Limit the rule to `dir`
    pub fn including(mut self, dir: PathBuf) -> Self {
        self.include.push(dir);
        self
    }
}

/// A plugin instance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plugin {
    /// Plugin name
    pub name: String,
    /// Constructor options
    #[serde(skip_serializing_if = "serde_json::Value::is_null")]
    pub options: serde_json::Value,
}

impl Plugin {
    /// Plugin with constructor options
    pub fn new(name: impl Into<String>, options: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            options,
        }
    }

    /// Plugin without options
    pub fn bare(name: impl Into<String>) -> Self {
        Self::new(name, serde_json::Value::Null)
    }

    fn option_str(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(serde_json::Value::as_str)
    }
}

/// Which chunks a cache group may split from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkScope {
    /// Entry chunks only
    Initial,
    /// Entry and lazily loaded chunks
    All,
}

/// Chunk-splitting rule extracting shared modules into a named chunk
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheGroup {
    /// Name of the extracted chunk
    pub name: String,
    /// Regex source of module paths eligible for the group
    pub test: String,
    /// Chunks considered
    pub chunks: ChunkScope,
    /// Number of chunks that must share a module before it is extracted
    pub min_chunks: u32,
    /// Higher priority wins when a module matches several groups
    pub priority: i32,
    /// Reuse an existing chunk instead of creating a new one
    pub reuse_existing_chunk: bool,
}

/// Chunk-splitting settings
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitChunks {
    /// Name split chunks after their cache group
    pub name: bool,
    /// Cache groups in priority order
    pub cache_groups: Vec<CacheGroup>,
}

/// Optimization policy
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Optimization {
    /// Readable module ids
    pub named_modules: bool,
    /// Readable chunk ids
    pub named_chunks: bool,
    /// Skip emitting when compilation has errors
    pub no_emit_on_errors: bool,
    /// Shared chunk extraction
    #[serde(skip_serializing_if = "Option::is_none")]
    pub split_chunks: Option<SplitChunks>,
    /// Name of the dedicated runtime chunk
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime_chunk: Option<String>,
    /// Run the minimizers
    pub minimize: bool,
    /// Minimizer plugins
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub minimizer: Vec<Plugin>,
}

/// Chunk names shared between pages, in injection order
pub const SHARED_CHUNK_ORDER: [&str; 4] = ["runtime", "polyfill", "vendor", "commons"];

impl Optimization {
    /// Shared chunks this policy defines, in injection order
    pub fn shared_chunks(&self) -> Vec<String> {
        let mut defined: Vec<&str> = Vec::new();
        if let Some(runtime) = &self.runtime_chunk {
            defined.push(runtime);
        }
        if let Some(split) = &self.split_chunks {
            defined.extend(split.cache_groups.iter().map(|g| g.name.as_str()));
        }

        SHARED_CHUNK_ORDER
            .iter()
            .filter(|name| defined.contains(name))
            .map(|name| name.to_string())
            .collect()
    }
}

/// Asset size warnings
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Performance {
    /// `"warning"`, or `false` to disable hints
    pub hints: serde_json::Value,
    /// Regex source of asset names excluded from the size check
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_assets: Option<String>,
}

/// Output location and filename patterns
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Output {
    /// Output directory
    pub path: PathBuf,
    /// Entry chunk filename pattern
    pub filename: String,
    /// Non-entry chunk filename pattern
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_filename: Option<String>,
    /// URL prefix assets are served from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_path: Option<String>,
    /// Emit module path comments
    pub pathinfo: bool,
    /// Exported library name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub library: Option<String>,
    /// Module format of the library export
    #[serde(skip_serializing_if = "Option::is_none")]
    pub library_target: Option<String>,
}

/// Module resolution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolve {
    /// Directories searched for bare imports
    pub modules: Vec<String>,
    /// Extensions tried for extension-less imports
    pub extensions: Vec<String>,
    /// Import aliases
    pub alias: BTreeMap<String, String>,
}

/// Node-modules externalization for the Electron main process
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Externals {
    /// Keep `node_modules` imports as runtime `require` calls
    pub node_modules: bool,
    /// Modules bundled anyway
    pub allow_list: Vec<String>,
}

/// Module rules
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModuleConfig {
    /// Rules, first match wins
    pub rules: Vec<Rule>,
}

/// Fully composed configuration handed to the bundler
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundlerConfiguration {
    /// Configuration name for multi-compiler runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Build mode
    pub mode: BuildMode,
    /// Runtime target
    pub target: Target,
    /// Directory entries are resolved from
    pub context: PathBuf,
    /// Source-map style, `None` when disabled
    pub devtool: Option<String>,
    /// Abort on the first error
    pub bail: bool,
    /// Entry chunks by name
    pub entry: BTreeMap<String, Vec<String>>,
    /// Output settings
    pub output: Output,
    /// Resolution settings
    pub resolve: Resolve,
    /// Externalized modules
    #[serde(skip_serializing_if = "Option::is_none")]
    pub externals: Option<Externals>,
    /// Module rules
    pub module: ModuleConfig,
    /// Plugins in application order
    pub plugins: Vec<Plugin>,
    /// Optimization policy
    pub optimization: Optimization,
    /// Asset size hints
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance: Option<Performance>,
}

impl BundlerConfiguration {
    /// Names of the plugins in application order
    pub fn plugin_names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name.as_str()).collect()
    }

    /// Find the first plugin called `name`
    pub fn plugin(&self, name: &str) -> Option<&Plugin> {
        self.plugins.iter().find(|p| p.name == name)
    }

    /// Filename patterns of emitted scripts, stylesheets and media
    pub fn asset_filenames(&self) -> Vec<String> {
        let mut names = vec![self.output.filename.clone()];
        names.extend(self.output.chunk_filename.clone());

        for plugin in &self.plugins {
            if plugin.name == super::plugins::CSS_EXTRACT {
                names.extend(plugin.option_str("filename").map(str::to_string));
                names.extend(plugin.option_str("chunkFilename").map(str::to_string));
            }
        }

        for rule in &self.module.rules {
            for loader in &rule.loaders {
                if let Some(name) = loader.options.get("name").and_then(serde_json::Value::as_str) {
                    names.push(name.to_string());
                }
            }
        }

        names
    }

    /// Filenames of the generated HTML pages
    pub fn html_filenames(&self) -> Vec<String> {
        self.plugins
            .iter()
            .filter(|p| p.name == super::plugins::HTML)
            .filter_map(|p| p.option_str("filename").map(str::to_string))
            .collect()
    }

    /// Every generated output filename or pattern
    pub fn output_filenames(&self) -> Vec<String> {
        let mut names = self.asset_filenames();
        names.extend(self.html_filenames());
        names
    }
}
