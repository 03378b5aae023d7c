//! Project manifest (`package.json`) loading

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::JmError;
use crate::infra::{FileSystem, RealFileSystem};

/// Reserved manifest key holding the tool options
pub const OPTIONS_KEY: &str = "jm";

/// The subset of `package.json` the tool reads
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Package name
    #[serde(default)]
    pub name: String,
    /// Package version
    #[serde(default)]
    pub version: String,
    /// Runtime dependencies
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
    /// Build-time dependencies
    #[serde(default)]
    pub dev_dependencies: BTreeMap<String, String>,
    /// Dependencies pre-bundled in electron mode
    #[serde(default)]
    pub optional_dependencies: BTreeMap<String, String>,
    /// Browser target list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browserslist: Option<serde_json::Value>,
    /// Raw, not yet validated tool options block
    #[serde(rename = "jm", default, skip_serializing_if = "Option::is_none")]
    pub options: Option<serde_json::Value>,
}

impl Manifest {
    /// Whether `name` appears in any dependency table
    pub fn depends_on(&self, name: &str) -> bool {
        self.dependencies.contains_key(name)
            || self.dev_dependencies.contains_key(name)
            || self.optional_dependencies.contains_key(name)
    }
}

/// Loads the manifest from a project directory
pub struct ManifestLoader;

impl ManifestLoader {
    /// Load `package.json` from the given project root
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use jm_cli::manifest::ManifestLoader;
    /// use std::path::Path;
    ///
    /// let manifest = ManifestLoader::load(Path::new("."))?;
    /// println!("{}@{}", manifest.name, manifest.version);
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn load(project_root: &Path) -> Result<Manifest> {
        Self::load_with_fs(project_root, &RealFileSystem)
    }

    /// Load the manifest with a custom filesystem implementation
    pub fn load_with_fs<FS: FileSystem>(project_root: &Path, fs: &FS) -> Result<Manifest> {
        let path = project_root.join("package.json");

        let contents = fs
            .read_to_string(&path)
            .map_err(|source| JmError::ManifestNotFound {
                path: path.clone(),
                source,
            })?;

        let manifest = serde_json::from_str(&contents)
            .map_err(|source| JmError::ManifestParse { path, source })?;

        Ok(manifest)
    }
}
