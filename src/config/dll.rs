//! DLL pre-bundle of rarely changing dependencies
//!
//! The bundle is rebuilt only when the set of modules or one of their
//! installed versions changes. Change detection compares a hash of sorted
//! `name:version` pairs with the one stored after the last successful build.

use regex::Regex;
use serde::Deserialize;
use serde_json::json;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

use super::fragment::DLL_NAME;
use super::plugins;
use super::types::{
    BuildMode, BundlerConfiguration, ModuleConfig, Optimization, Output, Performance, Plugin,
    Resolve, Target,
};
use crate::context::InvocationContext;
use crate::error::JmError;
use crate::infra::FileSystem;
use crate::manifest::Manifest;
use crate::options::JmOptions;
use crate::paths::Paths;

static REGEX_LITERAL_RE: OnceLock<Regex> = OnceLock::new();

fn regex_literal_re() -> &'static Regex {
    REGEX_LITERAL_RE
        .get_or_init(|| Regex::new(r"^/(.*)/$").expect("regex literal pattern is valid"))
}

/// An exclude entry: an exact module name or a `/regex/` literal
#[derive(Debug)]
enum Exclusion {
    Exact(String),
    Pattern(Regex),
}

impl Exclusion {
    fn parse(entry: &str) -> Self {
        if let Some(caps) = regex_literal_re().captures(entry) {
            match Regex::new(&caps[1]) {
                Ok(re) => return Self::Pattern(re),
                Err(e) => log::warn!("Treating invalid dll exclude {} as a name: {}", entry, e),
            }
        }
        Self::Exact(entry.to_string())
    }

    fn matches(&self, module: &str) -> bool {
        match self {
            Self::Exact(name) => name == module,
            Self::Pattern(re) => re.is_match(module),
        }
    }
}

/// Modules that go into the DLL, in declaration order
///
/// # Examples
///
/// ```
/// use jm_cli::config::dll::dll_modules;
/// use jm_cli::manifest::Manifest;
/// use jm_cli::options::{DllOptions, JmOptions};
/// use std::collections::BTreeMap;
///
/// let manifest = Manifest {
///     dependencies: BTreeMap::from([
///         ("@types/react".to_string(), "^16".to_string()),
///         ("react".to_string(), "^16".to_string()),
///     ]),
///     ..Manifest::default()
/// };
/// let options = JmOptions {
///     dll: DllOptions {
///         include: vec!["lodash".to_string()],
///         exclude: vec!["/^@types/".to_string()],
///     },
///     ..JmOptions::default()
/// };
///
/// assert_eq!(dll_modules(&manifest, &options), ["react", "lodash"]);
/// ```
pub fn dll_modules(manifest: &Manifest, options: &JmOptions) -> Vec<String> {
    let declared = if options.electron {
        &manifest.optional_dependencies
    } else {
        &manifest.dependencies
    };
    let exclusions: Vec<Exclusion> = options
        .dll
        .exclude
        .iter()
        .map(|e| Exclusion::parse(e))
        .collect();

    let mut modules: Vec<String> = Vec::new();
    for name in declared.keys().chain(options.dll.include.iter()) {
        if modules.contains(name) || exclusions.iter().any(|e| e.matches(name)) {
            continue;
        }
        modules.push(name.clone());
    }
    modules
}

/// Bundler configuration that builds the DLL into the cache directory
pub fn dll_configuration(ctx: &InvocationContext, modules: &[String]) -> BundlerConfiguration {
    let paths = &ctx.paths;

    BundlerConfiguration {
        name: Some(DLL_NAME.to_string()),
        mode: BuildMode::Development,
        target: Target::Web,
        context: paths.app_src.clone(),
        devtool: Some("eval".to_string()),
        bail: false,
        entry: BTreeMap::from([(DLL_NAME.to_string(), modules.to_vec())]),
        output: Output {
            path: paths.app_cache.clone(),
            filename: "[name].js".to_string(),
            chunk_filename: None,
            public_path: None,
            pathinfo: false,
            library: Some("[name]".to_string()),
            library_target: None,
        },
        resolve: Resolve {
            modules: vec!["node_modules".to_string()],
            extensions: vec![".js".to_string(), ".json".to_string()],
            alias: BTreeMap::new(),
        },
        externals: None,
        module: ModuleConfig::default(),
        plugins: vec![
            Plugin::new(
                plugins::DLL,
                json!({
                    "context": paths.app_src,
                    "name": "[name]",
                    "path": paths.app_cache.join("[name].json"),
                }),
            ),
            Plugin::new(plugins::DEFINE, json!(ctx.env.stringified)),
        ],
        optimization: Optimization::default(),
        performance: Some(Performance {
            hints: json!(false),
            exclude_assets: None,
        }),
    }
}

#[derive(Deserialize)]
struct InstalledPackage {
    version: String,
}

/// Installed version of `module` from its own `package.json`
fn installed_version<FS: FileSystem>(fs: &FS, paths: &Paths, module: &str) -> Result<String, JmError> {
    let manifest = paths.app_node_modules.join(module).join("package.json");
    let missing = || JmError::DllModuleMissing {
        module: module.to_string(),
    };

    let contents = fs.read_to_string(&manifest).map_err(|_| missing())?;
    let package: InstalledPackage = serde_json::from_str(&contents).map_err(|_| missing())?;
    Ok(package.version)
}

/// Hash of the installed versions of `modules`.
///
/// Fails with [`JmError::DllModuleMissing`] naming the first module that is
/// not installed.
pub fn dll_hash<FS: FileSystem>(fs: &FS, paths: &Paths, modules: &[String]) -> Result<String, JmError> {
    let mut pairs = modules
        .iter()
        .map(|module| installed_version(fs, paths, module).map(|version| (module.as_str(), version)))
        .collect::<Result<Vec<_>, JmError>>()?;
    pairs.sort();

    for (name, version) in &pairs {
        log::info!("    {}: {}", name, version);
    }

    let key = pairs
        .iter()
        .map(|(name, version)| format!("{}:{}", name, version))
        .collect::<Vec<_>>()
        .join("/");

    let digest = Sha256::digest(key.as_bytes());
    Ok(digest.iter().map(|b| format!("{:02x}", b)).collect())
}

/// Whether the stored hash is missing or differs from `hash`
pub fn should_update_dll<FS: FileSystem>(fs: &FS, hash_file: &Path, hash: &str) -> bool {
    match fs.read_to_string(hash_file) {
        Ok(previous) => previous.trim() != hash,
        Err(_) => true,
    }
}
