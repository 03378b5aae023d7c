//! Optional type-check and lint capabilities
//!
//! Both are resolved once when the invocation context is built. The composer
//! only asks a present capability for its plugin and never probes the project
//! itself.

use serde_json::json;
use std::fmt::Debug;
use std::path::PathBuf;

use crate::config::plugins;
use crate::config::types::{BuildMode, Plugin};
use crate::env::EnvironmentSnapshot;
use crate::infra::FileSystem;
use crate::paths::Paths;

/// Type checking that runs beside the transpiler
pub trait TypeChecker: Debug + Send + Sync {
    /// Human-readable name
    fn name(&self) -> &str;

    /// Bundler plugin performing the check
    fn plugin(&self, paths: &Paths, mode: BuildMode) -> Plugin;
}

/// Source linting during compilation
pub trait Linter: Debug + Send + Sync {
    /// Human-readable name
    fn name(&self) -> &str;

    /// Bundler plugin performing the lint
    fn plugin(&self, paths: &Paths, mode: BuildMode) -> Plugin;
}

/// Type checking driven by the project's `tsconfig.json`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TsconfigTypeChecker {
    tsconfig: PathBuf,
}

impl TsconfigTypeChecker {
    /// Checker for the given tsconfig
    pub fn new(tsconfig: PathBuf) -> Self {
        Self { tsconfig }
    }
}

impl TypeChecker for TsconfigTypeChecker {
    fn name(&self) -> &str {
        "typescript"
    }

    fn plugin(&self, _paths: &Paths, mode: BuildMode) -> Plugin {
        Plugin::new(
            plugins::TYPE_CHECK,
            json!({
                "tsconfig": self.tsconfig,
                "useTypescriptIncrementalApi": true,
                // production waits for the check so errors fail the build
                "async": !mode.is_production(),
                "silent": true,
                "checkSyntacticErrors": true,
                "formatter": "codeframe",
            }),
        )
    }
}

/// ESLint with the project's own configuration file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EslintLinter {
    config: PathBuf,
}

impl EslintLinter {
    /// Linter using `config`
    pub fn new(config: PathBuf) -> Self {
        Self { config }
    }
}

impl Linter for EslintLinter {
    fn name(&self) -> &str {
        "eslint"
    }

    fn plugin(&self, paths: &Paths, _mode: BuildMode) -> Plugin {
        Plugin::new(
            plugins::LINT,
            json!({
                "context": paths.app_src,
                "overrideConfigFile": self.config,
                "useEslintrc": true,
                "extensions": ["ts", "tsx", "js", "jsx"],
                "formatter": "codeframe",
                "emitWarning": true,
            }),
        )
    }
}

/// Capabilities available to a project
#[derive(Debug, Default)]
pub struct Capabilities {
    /// Present when a tsconfig exists
    pub type_checker: Option<Box<dyn TypeChecker>>,
    /// Present when an ESLint config exists and linting is not disabled
    pub linter: Option<Box<dyn Linter>>,
}

/// Probe the project once for optional tooling
pub fn detect<FS: FileSystem>(paths: &Paths, env: &EnvironmentSnapshot, fs: &FS) -> Capabilities {
    let type_checker: Option<Box<dyn TypeChecker>> = if fs.exists(&paths.app_ts_config) {
        Some(Box::new(TsconfigTypeChecker::new(paths.app_ts_config.clone())))
    } else {
        log::info!("No tsconfig.json found, type checking disabled");
        None
    };

    let linter: Option<Box<dyn Linter>> = if env.flag("UNSAFE_DISABLE_TSLINT") {
        log::warn!("Linting disabled by UNSAFE_DISABLE_TSLINT");
        None
    } else {
        paths
            .app_lint_configs
            .iter()
            .find(|config| fs.exists(config))
            .map(|config| {
                log::debug!("Using lint config {}", config.display());
                Box::new(EslintLinter::new(config.clone())) as Box<dyn Linter>
            })
    };

    Capabilities {
        type_checker,
        linter,
    }
}
