//! Mode fragments: the parts of a configuration that differ per build mode
//!
//! Each [`Mode`] variant has its own builder returning a [`ConfigFragment`].
//! The composer matches on the mode once and merges the fragment into the
//! base configuration.

use serde_json::json;

use super::plugins::{self, PluginDescriptor};
use super::types::{
    BuildMode, CacheGroup, ChunkScope, Externals, Optimization, Performance, Plugin, Rule,
    SplitChunks, Target,
};
use super::{dev, electron_main, naming::Naming, prod};
use crate::env::EnvironmentSnapshot;
use crate::manifest::Manifest;
use crate::options::JmOptions;
use crate::paths::Paths;

/// Library name the DLL bundle is published under
pub const DLL_NAME: &str = "dll";

/// Everything a fragment builder reads
#[derive(Debug, Clone, Copy)]
pub struct FragmentInputs<'a> {
    /// Environment snapshot for this invocation
    pub env: &'a EnvironmentSnapshot,
    /// Project manifest
    pub manifest: &'a Manifest,
    /// Project paths
    pub paths: &'a Paths,
    /// Resolved tool options
    pub options: &'a JmOptions,
    /// Filename conventions of the configuration being composed
    pub naming: &'a Naming,
    /// Build mode
    pub mode: BuildMode,
    /// Whether a previously generated DLL exists on disk
    pub dll_present: bool,
}

/// Which fragment builder applies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Dev server with hot reload
    Development,
    /// Minified, hashed, extracted output
    Production,
    /// The Electron main process bundle
    ElectronMain,
}

impl Mode {
    /// Browser fragment for a build mode
    pub fn for_build(mode: BuildMode) -> Self {
        match mode {
            BuildMode::Development => Self::Development,
            BuildMode::Production => Self::Production,
        }
    }

    /// Run the builder for this mode
    pub fn build<'a>(&self, inputs: &FragmentInputs<'a>) -> ConfigFragment<'a> {
        log::debug!("Building {:?} fragment", self);
        match self {
            Self::Development => dev::fragment(inputs),
            Self::Production => prod::fragment(inputs),
            Self::ElectronMain => electron_main::fragment(inputs),
        }
    }
}

/// Partial configuration produced by a mode builder
#[derive(Debug)]
pub struct ConfigFragment<'a> {
    /// Compilation target
    pub target: Target,
    /// Source map style, `None` disables source maps
    pub devtool: Option<String>,
    /// Stop at the first error
    pub bail: bool,
    /// Scripts prepended to every entry
    pub entry_prelude: Vec<String>,
    /// Rules appended after the base rules, before the catch-all
    pub rules: Vec<Rule>,
    /// Mode-specific plugins, in order
    pub plugins: Vec<PluginDescriptor<'a>>,
    /// Chunk splitting and minimization
    pub optimization: Optimization,
    /// Extract stylesheets to files instead of injecting them at runtime
    pub extract_css: bool,
    /// Asset size hints
    pub performance: Option<Performance>,
    /// Modules left out of the bundle
    pub externals: Option<Externals>,
}

impl ConfigFragment<'_> {
    /// Names of the plugins this fragment will instantiate
    pub fn enabled_plugins(&self) -> Vec<&'static str> {
        self.plugins
            .iter()
            .filter(|p| p.enabled)
            .map(|p| p.name)
            .collect()
    }
}

/// Devtool for browser builds
pub fn devtool(mode: BuildMode, env: &EnvironmentSnapshot) -> Option<String> {
    if !env.source_map_enabled() {
        None
    } else if mode.is_production() {
        Some("source-map".to_string())
    } else if env.flag("EVAL") {
        Some("cheap-module-eval-source-map".to_string())
    } else {
        Some("cheap-module-source-map".to_string())
    }
}

/// Plugin that extracts stylesheets to files
pub fn css_extract_plugin(naming: &Naming) -> Plugin {
    Plugin::new(
        plugins::CSS_EXTRACT,
        json!({ "filename": naming.style(), "chunkFilename": naming.style_chunk() }),
    )
}

/// DLL reference plugins, active only when `enabled`
pub fn dll_reference_plugins<'a>(inputs: &FragmentInputs<'a>, enabled: bool) -> Vec<PluginDescriptor<'a>> {
    let paths = inputs.paths;
    vec![
        PluginDescriptor::new(plugins::DLL_REFERENCE, enabled, move || {
            Plugin::new(
                plugins::DLL_REFERENCE,
                json!({
                    "context": paths.app_src,
                    "manifest": paths.app_dll_manifest,
                    "name": DLL_NAME,
                }),
            )
        }),
        PluginDescriptor::new(plugins::HTML_DLL_REFERENCES, enabled, || {
            Plugin::new(plugins::HTML_DLL_REFERENCES, json!({ "name": DLL_NAME }))
        }),
    ]
}

/// Shared-chunk policy: vendor code and, outside Electron, shared application code.
///
/// Both groups need at least two referencing chunks before they are split out.
pub fn split_chunks(electron: bool) -> SplitChunks {
    let mut cache_groups = vec![CacheGroup {
        name: "vendor".to_string(),
        test: r"[\\/]node_modules[\\/]".to_string(),
        chunks: ChunkScope::Initial,
        min_chunks: 2,
        priority: -10,
        reuse_existing_chunk: false,
    }];
    if !electron {
        cache_groups.push(CacheGroup {
            name: "commons".to_string(),
            test: "src".to_string(),
            chunks: ChunkScope::Initial,
            min_chunks: 2,
            priority: -20,
            reuse_existing_chunk: true,
        });
    }

    SplitChunks {
        name: true,
        cache_groups,
    }
}

/// Terser options parameterized by source map support
pub fn terser_plugin(source_map: bool) -> Plugin {
    Plugin::new(
        plugins::TERSER,
        json!({
            "terserOptions": {
                "parse": { "ecma": 8 },
                "compress": { "ecma": 5, "warnings": false, "comparisons": false, "inline": 2 },
                "mangle": { "safari10": true },
                "output": { "ecma": 5, "comments": false, "ascii_only": true },
            },
            "parallel": true,
            "cache": true,
            "sourceMap": source_map,
        }),
    )
}

/// CSS minifier options parameterized by source map support
pub fn optimize_css_plugin(source_map: bool) -> Plugin {
    let map = if source_map {
        json!({ "inline": false, "annotation": true })
    } else {
        json!(false)
    };
    Plugin::new(
        plugins::OPTIMIZE_CSS,
        json!({ "cssProcessorOptions": { "parser": "postcss-safe-parser", "map": map } }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn env(mode: BuildMode, vars: &[(&str, &str)]) -> EnvironmentSnapshot {
        let vars: BTreeMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EnvironmentSnapshot::from_variables(mode, &vars, &Manifest::default())
    }

    #[test]
    fn test_devtool_policy() {
        let dev = |vars: &[(&str, &str)]| devtool(BuildMode::Development, &env(BuildMode::Development, vars));

        assert_eq!(dev(&[("SOURCE_MAP", "false")]), None);
        assert_eq!(dev(&[("EVAL", "true")]).as_deref(), Some("cheap-module-eval-source-map"));
        assert_eq!(dev(&[]).as_deref(), Some("cheap-module-source-map"));
        assert_eq!(
            devtool(BuildMode::Production, &env(BuildMode::Production, &[("EVAL", "true")])).as_deref(),
            Some("source-map")
        );
    }

    #[test]
    fn test_mode_for_build() {
        assert_eq!(Mode::for_build(BuildMode::Development), Mode::Development);
        assert_eq!(Mode::for_build(BuildMode::Production), Mode::Production);
    }

    #[test]
    fn test_split_chunks_drop_commons_in_electron() {
        let web = split_chunks(false);
        let names: Vec<&str> = web.cache_groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, ["vendor", "commons"]);
        assert!(web.cache_groups.iter().all(|g| g.min_chunks == 2));

        let electron = split_chunks(true);
        assert_eq!(electron.cache_groups.len(), 1);
    }

    #[test]
    fn test_minimizers_follow_source_map_flag() {
        assert_eq!(terser_plugin(false).options["sourceMap"], false);
        assert_eq!(
            optimize_css_plugin(true).options["cssProcessorOptions"]["map"]["inline"],
            false
        );
        assert_eq!(optimize_css_plugin(false).options["cssProcessorOptions"]["map"], false);
    }
}
