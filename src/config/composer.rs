//! Configuration composer
//!
//! Merges base rules, the mode fragment, discovered pages and the plugin list
//! into one [`BundlerConfiguration`]. Any failure before the merge aborts
//! composition; no partial configuration is ever returned.

use anyhow::Result;
use serde_json::json;
use std::collections::BTreeMap;

use super::entry::{Discovery, PageEntry};
use super::fragment::{self, ConfigFragment, FragmentInputs, Mode};
use super::naming::Naming;
use super::plugins::{self, PluginDescriptor};
use super::template::{self, HtmlPlan};
use super::types::{
    BuildMode, BundlerConfiguration, ModuleConfig, Output, Plugin, Resolve, Target,
};
use super::{electron_main, rules};
use crate::context::InvocationContext;
use crate::error::JmError;
use crate::infra::{FileSystem, RealFileSystem};

/// Extensions resolved for browser builds, in lookup order
pub const BROWSER_EXTENSIONS: [&str; 5] = [".tsx", ".ts", ".jsx", ".js", ".json"];

/// Extensions resolved for the Electron main process
pub const MAIN_EXTENSIONS: [&str; 4] = [".ts", ".tsx", ".js", ".jsx"];

/// Alias for the source directory
pub const SOURCE_ALIAS: &str = "~";

/// Caller-controlled composition inputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overrides {
    /// Group name; prefixes every emitted filename with `{name}_`
    pub name: Option<String>,
    /// Restrict the build to these pages
    pub entry: Option<Vec<String>>,
    /// Build mode
    pub mode: BuildMode,
}

impl Overrides {
    /// Unnamed build of every page
    pub fn new(mode: BuildMode) -> Self {
        Self {
            name: None,
            entry: None,
            mode,
        }
    }

    /// Name the configuration group
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Build only `entry`
    pub fn with_entry(mut self, entry: Vec<String>) -> Self {
        self.entry = Some(entry);
        self
    }
}

/// Compose the browser configuration for the project in `ctx`
///
/// # Examples
///
/// ```no_run
/// use jm_cli::config::{compose, BuildMode, Overrides};
/// use jm_cli::context::InvocationContext;
/// use std::path::Path;
///
/// let ctx = InvocationContext::load(Path::new("."), BuildMode::Production)?;
/// let config = compose(&ctx, &Overrides::new(BuildMode::Production))?;
/// println!("{} pages", config.entry.len());
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn compose(ctx: &InvocationContext, overrides: &Overrides) -> Result<BundlerConfiguration> {
    compose_with_fs(ctx, overrides, &RealFileSystem)
}

/// Compose with a custom filesystem implementation
pub fn compose_with_fs<FS: FileSystem>(
    ctx: &InvocationContext,
    overrides: &Overrides,
    fs: &FS,
) -> Result<BundlerConfiguration> {
    check_mode(ctx, overrides)?;

    let paths = &ctx.paths;
    let naming = Naming::new(overrides.name.as_deref(), overrides.mode);
    let inputs = FragmentInputs {
        env: &ctx.env,
        manifest: &ctx.manifest,
        paths,
        options: &ctx.options,
        naming: &naming,
        mode: overrides.mode,
        dll_present: fs.exists(&paths.app_dll_hash),
    };
    let mode_fragment = Mode::for_build(overrides.mode).build(&inputs);

    let pages = Discovery::new(&paths.app_src, ctx.env.page_ext())
        .with_entries(overrides.entry.as_deref())
        .electron(ctx.options.electron)
        .default_template(template::default_template(
            &paths.app_html,
            fs.is_file(&paths.app_html),
        ))
        .run(fs)?;

    let mut optimization = mode_fragment.optimization.clone();
    if optimization.split_chunks.is_none() {
        optimization.split_chunks = Some(fragment::split_chunks(ctx.options.electron));
    }
    let html = template::plan(
        &pages,
        overrides.mode.is_production(),
        &optimization.shared_chunks(),
    );

    let mut module_rules = rules::base_rules(&inputs, mode_fragment.extract_css);
    module_rules.extend(mode_fragment.rules.iter().cloned());
    module_rules.push(rules::catch_all_rule(&naming));

    let descriptors = plugin_descriptors(ctx, overrides.mode, &naming, &html, &mode_fragment);
    let plugins = plugins::instantiate_all(&descriptors);
    log::debug!(
        "Active plugins: {}",
        plugins
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let target = match (mode_fragment.target, ctx.options.electron) {
        (Target::Web, true) => Target::ElectronRenderer,
        (target, _) => target,
    };

    Ok(BundlerConfiguration {
        name: overrides.name.clone(),
        mode: overrides.mode,
        target,
        context: paths.app_src.clone(),
        devtool: mode_fragment.devtool.clone(),
        bail: mode_fragment.bail,
        entry: entries(&pages, &mode_fragment.entry_prelude),
        output: Output {
            path: paths.app_dist.clone(),
            filename: naming.script(),
            chunk_filename: Some(naming.script_chunk()),
            public_path: Some(ctx.env.public_url().to_string()),
            pathinfo: true,
            library: None,
            library_target: None,
        },
        resolve: resolve(ctx, &BROWSER_EXTENSIONS),
        externals: mode_fragment.externals.clone(),
        module: ModuleConfig {
            rules: module_rules,
        },
        plugins,
        optimization,
        performance: mode_fragment.performance.clone(),
    })
}

/// Compose the Electron main-process configuration
pub fn compose_electron_main(
    ctx: &InvocationContext,
    overrides: &Overrides,
) -> Result<BundlerConfiguration> {
    check_mode(ctx, overrides)?;

    let paths = &ctx.paths;
    let naming = Naming::new(None, overrides.mode);
    let inputs = FragmentInputs {
        env: &ctx.env,
        manifest: &ctx.manifest,
        paths,
        options: &ctx.options,
        naming: &naming,
        mode: overrides.mode,
        dll_present: false,
    };
    let fragment = Mode::ElectronMain.build(&inputs);
    let plugins = plugins::instantiate_all(&fragment.plugins);

    Ok(BundlerConfiguration {
        name: Some(electron_main::MAIN_CONFIG_NAME.to_string()),
        mode: overrides.mode,
        target: fragment.target,
        context: paths.app_src.clone(),
        devtool: fragment.devtool.clone(),
        bail: fragment.bail,
        entry: BTreeMap::from([(
            electron_main::MAIN_CONFIG_NAME.to_string(),
            vec![paths.app_electron_main.to_string_lossy().into_owned()],
        )]),
        output: Output {
            path: paths.app_dist.clone(),
            filename: electron_main::MAIN_FILENAME.to_string(),
            chunk_filename: None,
            public_path: None,
            pathinfo: true,
            library: None,
            library_target: Some("commonjs2".to_string()),
        },
        resolve: resolve(ctx, &MAIN_EXTENSIONS),
        externals: fragment.externals.clone(),
        module: ModuleConfig {
            rules: fragment.rules.clone(),
        },
        plugins,
        optimization: fragment.optimization.clone(),
        performance: None,
    })
}

/// The environment, public URL and devtool all derive from the context's
/// mode, so the overrides must agree with it.
fn check_mode(ctx: &InvocationContext, overrides: &Overrides) -> Result<(), JmError> {
    if overrides.mode == ctx.mode {
        Ok(())
    } else {
        Err(JmError::ModeMismatch {
            requested: overrides.mode,
            environment: ctx.mode,
        })
    }
}

fn entries(pages: &[PageEntry], prelude: &[String]) -> BTreeMap<String, Vec<String>> {
    pages
        .iter()
        .map(|page| {
            let scripts = prelude
                .iter()
                .cloned()
                .chain(std::iter::once(page.script_path.clone()))
                .collect();
            (page.name.clone(), scripts)
        })
        .collect()
}

fn resolve(ctx: &InvocationContext, extensions: &[&str]) -> Resolve {
    let mut alias = ctx.options.alias.clone();
    alias.insert(
        SOURCE_ALIAS.to_string(),
        ctx.paths.app_src.to_string_lossy().into_owned(),
    );

    Resolve {
        modules: vec!["node_modules".to_string()],
        extensions: extensions.iter().map(|e| e.to_string()).collect(),
        alias,
    }
}

fn html_plugin(ctx: &InvocationContext, naming: &Naming, plan: &HtmlPlan) -> Plugin {
    Plugin::new(
        plugins::HTML,
        json!({
            "title": plan.title,
            "filename": naming.page(&plan.page),
            "template": template::template_path(&plan.template, &ctx.paths.app_cache),
            "chunks": plan.chunks,
            "inject": true,
            "templateParameters": ctx.env.raw,
            "minify": plan.minify,
        }),
    )
}

/// Every plugin of a browser configuration, in order, with its condition
pub fn plugin_descriptors<'a>(
    ctx: &'a InvocationContext,
    mode: BuildMode,
    naming: &'a Naming,
    html: &'a [HtmlPlan],
    fragment: &'a ConfigFragment<'a>,
) -> Vec<PluginDescriptor<'a>> {
    let options = &ctx.options;
    let production = mode.is_production();

    let mut descriptors = vec![
        PluginDescriptor::always(plugins::IGNORE, || {
            Plugin::new(
                plugins::IGNORE,
                json!({ "resourceRegExp": r"^\./locale$", "contextRegExp": "moment$" }),
            )
        }),
        PluginDescriptor::always(plugins::DEFINE, || {
            Plugin::new(plugins::DEFINE, json!(ctx.env.stringified))
        }),
    ];

    descriptors.extend(html.iter().map(|plan| {
        PluginDescriptor::always(plugins::HTML, move || html_plugin(ctx, naming, plan))
    }));

    descriptors.push(PluginDescriptor::always(plugins::HTML_INTERPOLATE, || {
        Plugin::new(plugins::HTML_INTERPOLATE, json!(ctx.env.raw))
    }));

    // fragment descriptors are re-wrapped so the list owns one flat order
    descriptors.extend(fragment.plugins.iter().map(|descriptor| {
        PluginDescriptor::new(descriptor.name, descriptor.enabled, move || {
            descriptor
                .instantiate()
                .unwrap_or_else(|| Plugin::bare(descriptor.name))
        })
    }));

    let type_checker = ctx.capabilities.type_checker.as_deref();
    descriptors.push(PluginDescriptor::new(
        plugins::TYPE_CHECK,
        options.enable_type_check && type_checker.is_some(),
        move || match type_checker {
            Some(checker) => checker.plugin(&ctx.paths, mode),
            None => Plugin::bare(plugins::TYPE_CHECK),
        },
    ));

    let linter = ctx.capabilities.linter.as_deref();
    descriptors.push(PluginDescriptor::new(
        plugins::LINT,
        options.enable_lint && linter.is_some(),
        move || match linter {
            Some(linter) => linter.plugin(&ctx.paths, mode),
            None => Plugin::bare(plugins::LINT),
        },
    ));

    descriptors.push(PluginDescriptor::new(
        plugins::DUPLICATE_PACKAGE_CHECK,
        options.enable_duplicate_package_check && production,
        || {
            Plugin::new(
                plugins::DUPLICATE_PACKAGE_CHECK,
                json!({ "verbose": true, "showHelp": true }),
            )
        },
    ));
    descriptors.push(PluginDescriptor::new(
        plugins::CIRCULAR_DEPENDENCY,
        options.enable_circular_dependency_check && production,
        || {
            Plugin::new(
                plugins::CIRCULAR_DEPENDENCY,
                json!({ "exclude": r"a\.js|node_modules", "failOnError": false }),
            )
        },
    ));

    descriptors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{Capabilities, TsconfigTypeChecker};
    use crate::env::EnvironmentSnapshot;
    use crate::manifest::Manifest;
    use crate::options::JmOptions;
    use crate::paths::Paths;
    use std::fs;
    use tempfile::TempDir;

    fn project(files: &[&str]) -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("src")).unwrap();
        for file in files {
            fs::write(temp_dir.path().join("src").join(file), "").unwrap();
        }
        temp_dir
    }

    fn context(root: &std::path::Path, mode: BuildMode, options: JmOptions) -> InvocationContext {
        let manifest = Manifest {
            name: "shop".to_string(),
            version: "1.0.0".to_string(),
            ..Manifest::default()
        };
        let env = EnvironmentSnapshot::from_variables(mode, &BTreeMap::new(), &manifest);
        InvocationContext::from_parts(
            Paths::from_root(root),
            manifest,
            options,
            env,
            Capabilities::default(),
        )
    }

    #[test]
    fn test_development_entry_gets_hot_client_prelude() {
        let temp_dir = project(&["index.html", "index.tsx"]);
        let ctx = context(temp_dir.path(), BuildMode::Development, JmOptions::default());

        let config = compose(&ctx, &Overrides::new(BuildMode::Development)).unwrap();

        let index = &config.entry["index"];
        assert_eq!(index.last().unwrap(), "./index.tsx");
        assert_eq!(index.len(), 3);
        assert_eq!(config.target, Target::Web);
        assert!(config.plugin(plugins::HOT_MODULE_REPLACEMENT).is_some());
    }

    #[test]
    fn test_plugin_order() {
        let temp_dir = project(&["a.html", "a.ts", "b.html", "b.ts"]);
        let ctx = context(temp_dir.path(), BuildMode::Production, JmOptions::default());

        let config = compose(&ctx, &Overrides::new(BuildMode::Production)).unwrap();

        assert_eq!(
            config.plugin_names(),
            [
                plugins::IGNORE,
                plugins::DEFINE,
                plugins::HTML,
                plugins::HTML,
                plugins::HTML_INTERPOLATE,
                plugins::CSS_EXTRACT,
                plugins::DUPLICATE_PACKAGE_CHECK,
                plugins::CIRCULAR_DEPENDENCY,
            ]
        );
    }

    #[test]
    fn test_diagnostic_plugins_only_in_production() {
        let temp_dir = project(&["index.html", "index.tsx"]);
        let ctx = context(temp_dir.path(), BuildMode::Development, JmOptions::default());

        let config = compose(&ctx, &Overrides::new(BuildMode::Development)).unwrap();
        assert!(config.plugin(plugins::DUPLICATE_PACKAGE_CHECK).is_none());
        assert!(config.plugin(plugins::CIRCULAR_DEPENDENCY).is_none());
    }

    #[test]
    fn test_type_check_needs_option_and_capability() {
        let temp_dir = project(&["index.html", "index.tsx"]);
        let mut ctx = context(temp_dir.path(), BuildMode::Production, JmOptions::default());
        let overrides = Overrides::new(BuildMode::Production);

        assert!(compose(&ctx, &overrides).unwrap().plugin(plugins::TYPE_CHECK).is_none());

        ctx.capabilities.type_checker = Some(Box::new(TsconfigTypeChecker::new(
            ctx.paths.app_ts_config.clone(),
        )));
        assert!(compose(&ctx, &overrides).unwrap().plugin(plugins::TYPE_CHECK).is_some());

        ctx.options.enable_type_check = false;
        assert!(compose(&ctx, &overrides).unwrap().plugin(plugins::TYPE_CHECK).is_none());
    }

    #[test]
    fn test_html_plugins_carry_chunks_and_prefixed_filename() {
        let temp_dir = project(&["index.html", "index.tsx"]);
        let ctx = context(temp_dir.path(), BuildMode::Production, JmOptions::default());

        let config = compose(&ctx, &Overrides::new(BuildMode::Production).named("admin")).unwrap();

        let html = config.plugin(plugins::HTML).unwrap();
        assert_eq!(html.options["filename"], "admin_index.html");
        assert_eq!(
            html.options["chunks"],
            json!(["runtime", "vendor", "commons", "index"])
        );
        assert_eq!(html.options["templateParameters"]["NAME"], "shop");
        assert!(html.options["minify"].is_object());
        assert_eq!(config.name.as_deref(), Some("admin"));
    }

    #[test]
    fn test_catch_all_rule_is_last() {
        let temp_dir = project(&["index.html", "index.tsx"]);
        let ctx = context(temp_dir.path(), BuildMode::Development, JmOptions::default());

        let config = compose(&ctx, &Overrides::new(BuildMode::Development)).unwrap();
        let last = config.module.rules.last().unwrap();
        assert_eq!(last.loaders[0].loader, "file-loader");
        assert_eq!(config.module.rules[0].loaders[0].loader, "cache-loader");
    }

    #[test]
    fn test_missing_entry_aborts_composition() {
        let temp_dir = project(&["a.html", "a.ts"]);
        let ctx = context(temp_dir.path(), BuildMode::Production, JmOptions::default());

        let err = compose(
            &ctx,
            &Overrides::new(BuildMode::Production).with_entry(vec!["zzz".to_string()]),
        )
        .unwrap_err();

        match err.downcast_ref::<JmError>() {
            Some(JmError::EntryNotFound { missing, .. }) => assert_eq!(missing, &["zzz"]),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_electron_renderer_target_and_alias() {
        let temp_dir = project(&["index.html", "index.tsx"]);
        let options = JmOptions {
            electron: true,
            alias: BTreeMap::from([("@".to_string(), "./lib".to_string())]),
            ..JmOptions::default()
        };
        let ctx = context(temp_dir.path(), BuildMode::Production, options);

        let config = compose(&ctx, &Overrides::new(BuildMode::Production)).unwrap();
        assert_eq!(config.target, Target::ElectronRenderer);
        assert_eq!(config.resolve.alias["@"], "./lib");
        assert!(config.resolve.alias.contains_key(SOURCE_ALIAS));
        assert_eq!(config.optimization.shared_chunks(), ["vendor"]);
    }

    #[test]
    fn test_electron_main_configuration() {
        let temp_dir = project(&[]);
        let options = JmOptions {
            electron: true,
            ..JmOptions::default()
        };
        let ctx = context(temp_dir.path(), BuildMode::Production, options);

        let config = compose_electron_main(&ctx, &Overrides::new(BuildMode::Production)).unwrap();
        assert_eq!(config.name.as_deref(), Some("main"));
        assert_eq!(config.target, Target::ElectronMain);
        assert_eq!(config.output.filename, "main.js");
        assert_eq!(config.output.library_target.as_deref(), Some("commonjs2"));
        assert_eq!(config.resolve.extensions, MAIN_EXTENSIONS);
        assert!(config.externals.is_some());
    }

    #[test]
    fn test_mode_mismatch_is_rejected() {
        let temp_dir = project(&["index.html", "index.tsx"]);
        let ctx = context(temp_dir.path(), BuildMode::Development, JmOptions::default());
        let overrides = Overrides::new(BuildMode::Production);

        let err = compose(&ctx, &overrides).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<JmError>(),
            Some(JmError::ModeMismatch {
                requested: BuildMode::Production,
                environment: BuildMode::Development,
            })
        ));

        let err = compose_electron_main(&ctx, &overrides).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<JmError>(),
            Some(JmError::ModeMismatch { .. })
        ));
    }
}
