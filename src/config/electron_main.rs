//! Electron main-process fragment

use serde_json::json;

use super::fragment::{self, ConfigFragment, FragmentInputs};
use super::plugins::{self, PluginDescriptor};
use super::rules;
use super::types::{Externals, Loader, Optimization, Plugin, Rule, Target};

/// Configuration name of the main-process bundle
pub const MAIN_CONFIG_NAME: &str = "main";

/// Output file of the main-process bundle
pub const MAIN_FILENAME: &str = "main.js";

/// Cache-loader id, kept apart from the renderer's babel cache
pub const MAIN_CACHE_ID: &str = "babel-loader-main";

/// CommonJS output, node modules externalized except the allow-list.
///
/// Development builds write the bundle to disk so Electron can load it, and
/// type-check the main-process sources.
pub fn fragment<'a>(inputs: &FragmentInputs<'a>) -> ConfigFragment<'a> {
    let production = inputs.mode.is_production();
    let paths = inputs.paths;
    let env = inputs.env;

    let babel = Rule::new(
        &[r"\.(ts|tsx|js|jsx)$"],
        vec![
            rules::cache_loader(MAIN_CACHE_ID, env, paths),
            Loader::with_options(
                "babel-loader",
                rules::babel_options(inputs.mode, inputs.options, true),
            ),
        ],
    )
    .including(paths.app_path.clone())
    .excluding(&["node_modules"]);

    let descriptors = vec![
        PluginDescriptor::new(plugins::WRITE_FILE, !production, || {
            Plugin::bare(plugins::WRITE_FILE)
        }),
        PluginDescriptor::new(plugins::TYPE_CHECK, !production, move || {
            let watch = paths
                .app_electron_main
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            Plugin::new(
                plugins::TYPE_CHECK,
                json!({
                    "tsconfig": paths.app_ts_config,
                    "async": false,
                    "checkSyntacticErrors": true,
                    "formatter": "codeframe",
                    "watch": paths.app_electron_main,
                    "reportFiles": [
                        format!("{}/**/*.@(ts|tsx)", watch),
                        "!**/__tests__/**",
                        "!**/?(*.)(spec|test).*",
                    ],
                }),
            )
        }),
        PluginDescriptor::always(plugins::DEFINE, move || {
            Plugin::new(plugins::DEFINE, json!(env.stringified))
        }),
    ];

    let source_map = env.source_map_enabled();
    ConfigFragment {
        target: Target::ElectronMain,
        devtool: source_map.then(|| "source-map".to_string()),
        bail: production,
        entry_prelude: Vec::new(),
        rules: vec![babel],
        plugins: descriptors,
        optimization: Optimization {
            minimize: production,
            minimizer: vec![fragment::terser_plugin(source_map)],
            ..Optimization::default()
        },
        extract_css: false,
        performance: None,
        externals: Some(Externals {
            node_modules: true,
            allow_list: inputs.options.electron_externals_whitelist.clone(),
        }),
    }
}
