//! Fixed project layout resolved from the project root

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::BuildMode;

/// Candidate eslint configuration files, checked in order
pub const LINT_CONFIG_FILES: [&str; 3] = [".eslintrc.js", ".eslintrc.json", ".eslintrc"];

/// Absolute paths every command works against
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paths {
    /// Project root
    pub app_path: PathBuf,
    /// Page sources
    pub app_src: PathBuf,
    /// Build output
    pub app_dist: PathBuf,
    /// Static files copied verbatim into the output
    pub app_public: PathBuf,
    /// Project-wide default page template
    pub app_html: PathBuf,
    /// Electron main-process sources
    pub app_electron_main: PathBuf,
    /// Base dotenv file
    pub app_dotenv: PathBuf,
    /// Project manifest
    pub app_package_json: PathBuf,
    /// TypeScript configuration
    pub app_ts_config: PathBuf,
    /// Candidate lint configuration files
    pub app_lint_configs: Vec<PathBuf>,
    /// Installed packages
    pub app_node_modules: PathBuf,
    /// Tool cache directory
    pub app_cache: PathBuf,
    /// DLL manifest produced by the pre-bundle step
    pub app_dll_manifest: PathBuf,
    /// DLL change-detection hash
    pub app_dll_hash: PathBuf,
}

impl Paths {
    /// Resolve the project layout below `root`
    ///
    /// # Examples
    ///
    /// ```
    /// use jm_cli::paths::Paths;
    /// use std::path::Path;
    ///
    /// let paths = Paths::from_root(Path::new("/work/app"));
    /// assert_eq!(paths.app_src, Path::new("/work/app/src"));
    /// assert_eq!(paths.app_dll_hash, Path::new("/work/app/node_modules/.cache/jm/dll.hash"));
    /// ```
    pub fn from_root(root: &Path) -> Self {
        let app_node_modules = root.join("node_modules");
        let app_cache = app_node_modules.join(".cache").join("jm");

        Self {
            app_path: root.to_path_buf(),
            app_src: root.join("src"),
            app_dist: root.join("dist"),
            app_public: root.join("public"),
            app_html: root.join("public").join("index.html"),
            app_electron_main: root.join("main"),
            app_dotenv: root.join(".env"),
            app_package_json: root.join("package.json"),
            app_ts_config: root.join("tsconfig.json"),
            app_lint_configs: LINT_CONFIG_FILES.iter().map(|f| root.join(f)).collect(),
            app_dll_manifest: app_cache.join("dll.json"),
            app_dll_hash: app_cache.join("dll.hash"),
            app_node_modules,
            app_cache,
        }
    }

    /// Dotenv files for `mode`, lowest precedence first
    pub fn dotenv_chain(&self, mode: BuildMode) -> Vec<PathBuf> {
        let base = self.app_dotenv.display().to_string();
        let mode = mode.as_str();
        vec![
            PathBuf::from(&base),
            PathBuf::from(format!("{base}.local")),
            PathBuf::from(format!("{base}.{mode}")),
            PathBuf::from(format!("{base}.{mode}.local")),
        ]
    }

    /// Loader cache directories removed by `jm clean`
    pub fn loader_caches(&self) -> Vec<PathBuf> {
        vec![
            self.app_node_modules.join(".cache-loader"),
            self.app_node_modules.join(".cache"),
        ]
    }
}
