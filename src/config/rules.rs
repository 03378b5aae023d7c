//! Base module rules shared by every browser build
//!
//! Order matters: the first matching rule wins, and the catch-all
//! file-emitting rule always comes last, after any fragment rules.

use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use super::fragment::FragmentInputs;
use super::naming::Naming;
use super::types::{BuildMode, Loader, Rule};
use crate::env::EnvironmentSnapshot;
use crate::options::{JmOptions, UseBuiltIns};
use crate::paths::Paths;

/// Inline images below this size as data URLs
pub const INLINE_LIMIT_BYTES: u64 = 10_000;

/// Loader name of the CSS extraction loader
pub const CSS_EXTRACT_LOADER: &str = "mini-css-extract-plugin/loader";

/// Cache-loader settings for a loader chain identified by `id`.
///
/// The identifier changes with the tool version and `NODE_ENV`, so caches
/// never leak between modes or releases.
pub fn cache_loader(id: &str, env: &EnvironmentSnapshot, paths: &Paths) -> Loader {
    let mut hasher = Sha256::new();
    hasher.update(env!("CARGO_PKG_VERSION"));
    hasher.update([0]);
    hasher.update(env.get("NODE_ENV").unwrap_or_default());
    hasher.update([0]);
    hasher.update(id);
    let digest = hasher.finalize();
    let identifier: String = digest.iter().take(8).map(|b| format!("{:02x}", b)).collect();

    Loader::with_options(
        "cache-loader",
        json!({
            "cacheDirectory": paths.app_node_modules.join(".cache-loader").join(id),
            "cacheIdentifier": identifier,
        }),
    )
}

/// Babel options for application code
pub fn babel_options(mode: BuildMode, options: &JmOptions, electron_main: bool) -> Value {
    let production = mode.is_production();
    let use_built_ins = match options.use_built_ins {
        UseBuiltIns::Entry => "entry",
        UseBuiltIns::Usage => "usage",
    };

    let env_preset = if electron_main {
        json!(["@babel/preset-env", { "targets": { "electron": "current" }, "modules": false }])
    } else {
        json!(["@babel/preset-env", {
            "useBuiltIns": use_built_ins,
            "corejs": 3,
            "modules": false,
            "exclude": ["transform-typeof-symbol"],
        }])
    };

    let mut plugins = vec![
        json!(["@babel/plugin-proposal-decorators", { "legacy": true }]),
        json!(["@babel/plugin-proposal-class-properties", { "loose": true }]),
        json!("babel-plugin-macros"),
        json!(["@babel/plugin-transform-runtime", { "corejs": false, "helpers": true, "regenerator": true }]),
        json!("@babel/plugin-syntax-dynamic-import"),
    ];
    if production && !electron_main {
        plugins.push(json!(["babel-plugin-transform-react-remove-prop-types", { "removeImport": true }]));
    }
    if let Some(import_plugin) = &options.import_plugin {
        for entry in import_plugin.entries() {
            plugins.push(json!(["babel-plugin-import", entry, entry.library_name]));
        }
    }

    json!({
        "babelrc": false,
        "configFile": false,
        "presets": [
            env_preset,
            ["@babel/preset-react", { "development": !production }],
            "@babel/preset-typescript",
        ],
        "plugins": plugins,
        "compact": production,
        "cacheDirectory": true,
        "cacheCompression": production,
    })
}

/// Transpile TypeScript and JavaScript sources
pub fn script_rule(inputs: &FragmentInputs<'_>) -> Rule {
    let mut loaders = vec![cache_loader("babel-loader", inputs.env, inputs.paths)];
    if inputs.options.happypack {
        loaders.push(Loader::new("thread-loader"));
    }
    loaders.push(Loader::with_options(
        "babel-loader",
        babel_options(inputs.mode, inputs.options, false),
    ));

    Rule::new(&[r"\.(tsx?|jsx?|mjs)$"], loaders)
        .including(inputs.paths.app_src.clone())
        .excluding(&["node_modules"])
}

/// `*.icon.svg` files become sprite symbols
pub fn svg_sprite_rule() -> Rule {
    Rule::new(
        &[r"\.icon\.svg$"],
        vec![
            Loader::with_options("svg-sprite-loader", json!({ "esModule": false })),
            Loader::new("svgo-loader"),
        ],
    )
}

/// Small images are inlined, larger ones emitted
pub fn image_rule(naming: &Naming) -> Rule {
    Rule::new(
        &[r"\.bmp$", r"\.gif$", r"\.jpe?g$", r"\.png$", r"\.svg$"],
        vec![Loader::with_options(
            "url-loader",
            json!({ "limit": INLINE_LIMIT_BYTES, "name": naming.media() }),
        )],
    )
}

/// Loader chain for stylesheets, optionally ending in a preprocessor
pub fn style_loaders(
    mode: BuildMode,
    env: &EnvironmentSnapshot,
    extract: bool,
    import_loaders: u32,
    preprocessor: Option<&str>,
) -> Vec<Loader> {
    let production = mode.is_production();
    let source_map = production && env.source_map_enabled();
    let relative_assets = matches!(env.public_url(), "./" | ".");

    let mut loaders = Vec::new();
    if extract {
        let public_path = if relative_assets { json!("../../") } else { Value::Null };
        loaders.push(Loader::with_options(
            CSS_EXTRACT_LOADER,
            json!({ "publicPath": public_path }),
        ));
    } else {
        loaders.push(Loader::new("style-loader"));
    }

    loaders.push(Loader::with_options(
        "css-loader",
        json!({ "importLoaders": import_loaders, "sourceMap": source_map }),
    ));
    loaders.push(Loader::with_options(
        "postcss-loader",
        json!({
            "ident": "postcss",
            "plugins": [
                "postcss-flexbugs-fixes",
                ["postcss-preset-env", { "autoprefixer": { "flexbox": "no-2009" }, "stage": 3 }],
            ],
            "sourceMap": source_map,
        }),
    ));

    if let Some(preprocessor) = preprocessor {
        loaders.push(Loader::with_options(
            preprocessor,
            json!({ "sourceMap": source_map }),
        ));
    }

    loaders
}

/// Plain CSS, Sass and Less
pub fn style_rules(mode: BuildMode, env: &EnvironmentSnapshot, extract: bool) -> Vec<Rule> {
    vec![
        Rule::new(&[r"\.css$"], style_loaders(mode, env, extract, 1, None)),
        Rule::new(
            &[r"\.(scss|sass)$"],
            style_loaders(mode, env, extract, 2, Some("sass-loader")),
        ),
        Rule::new(
            &[r"\.less$"],
            style_loaders(mode, env, extract, 2, Some("less-loader")),
        ),
    ]
}

/// Every browser build's rules, before fragment rules
pub fn base_rules(inputs: &FragmentInputs<'_>, extract_css: bool) -> Vec<Rule> {
    let mut rules = vec![
        script_rule(inputs),
        svg_sprite_rule(),
        image_rule(inputs.naming),
    ];
    rules.extend(style_rules(inputs.mode, inputs.env, extract_css));
    rules
}

/// Emit anything no other rule handled
pub fn catch_all_rule(naming: &Naming) -> Rule {
    Rule {
        test: Vec::new(),
        include: Vec::new(),
        exclude: vec![
            r"\.(js|jsx|mjs|ts|tsx)$".to_string(),
            r"\.html$".to_string(),
            r"\.json$".to_string(),
        ],
        loaders: vec![Loader::with_options(
            "file-loader",
            json!({ "name": naming.media() }),
        )],
    }
}
