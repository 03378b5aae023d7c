//! Per-invocation context
//!
//! Built once by each command and passed by reference to everything that
//! needs the manifest, options, environment or paths.

use anyhow::Result;
use std::collections::BTreeMap;
use std::path::Path;

use crate::capability::{self, Capabilities};
use crate::config::BuildMode;
use crate::env::{self, EnvironmentSnapshot};
use crate::infra::{FileSystem, RealFileSystem};
use crate::manifest::{Manifest, ManifestLoader};
use crate::options::JmOptions;
use crate::paths::Paths;

/// Inputs shared by every step of one CLI invocation
#[derive(Debug)]
pub struct InvocationContext {
    /// Resolved project paths
    pub paths: Paths,
    /// Parsed `package.json`
    pub manifest: Manifest,
    /// Validated `jm` options with defaults applied
    pub options: JmOptions,
    /// Environment for `mode`
    pub env: EnvironmentSnapshot,
    /// Mode the environment was assembled for
    pub mode: BuildMode,
    /// Optional type-check and lint tooling
    pub capabilities: Capabilities,
}

impl InvocationContext {
    /// Load everything for the project at `root` from disk and the process environment
    pub fn load(root: &Path, mode: BuildMode) -> Result<Self> {
        Self::load_with(root, mode, &env::process_env(), &RealFileSystem)
    }

    /// Load with an explicit process environment and filesystem
    pub fn load_with<FS: FileSystem>(
        root: &Path,
        mode: BuildMode,
        process_env: &BTreeMap<String, String>,
        fs: &FS,
    ) -> Result<Self> {
        let paths = Paths::from_root(root);
        let manifest = ManifestLoader::load_with_fs(root, fs)?;
        let options = JmOptions::resolve(&manifest)?;
        let env = EnvironmentSnapshot::assemble_with_fs(
            mode,
            process_env,
            &paths.dotenv_chain(mode),
            &manifest,
            fs,
        )?;
        let capabilities = capability::detect(&paths, &env, fs);

        log::debug!(
            "Loaded {} {} in {} mode",
            manifest.name,
            manifest.version,
            mode
        );

        Ok(Self {
            paths,
            manifest,
            options,
            env,
            mode,
            capabilities,
        })
    }

    /// Assemble a context from values already in hand
    pub fn from_parts(
        paths: Paths,
        manifest: Manifest,
        options: JmOptions,
        env: EnvironmentSnapshot,
        capabilities: Capabilities,
    ) -> Self {
        let mode = if env.is_production() {
            BuildMode::Production
        } else {
            BuildMode::Development
        };
        Self {
            paths,
            manifest,
            options,
            env,
            mode,
            capabilities,
        }
    }
}
