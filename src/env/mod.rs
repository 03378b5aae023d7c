//! Environment snapshot assembly
//!
//! Dotenv files are read in increasing precedence, expanded, and then
//! overlaid by the process environment. Only allow-listed names and names
//! with the `JM_` prefix (any case) reach the snapshot, on top of the
//! built-in defaults derived from the manifest.

pub mod dotenv;

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::config::BuildMode;
use crate::error::JmError;
use crate::infra::{FileSystem, RealFileSystem};
use crate::manifest::Manifest;

/// Built-in variable names passed through from the environment
pub const ALLOWED_VARIABLES: [&str; 10] = [
    "VERSION",
    "SOURCE_MAP",
    "NAME",
    "PUBLIC_URL",
    "PAGE_EXT",
    "UNSAFE_DISABLE_TSLINT",
    "PORT",
    "HTTPS",
    "EVAL",
    "DISABLE_DLL",
];

/// Prefix of user-defined variables injected into client code
pub const USER_PREFIX: &str = "JM_";

/// Default page template extension
pub const DEFAULT_PAGE_EXT: &str = ".html";

/// Whether `name` belongs to the user namespace
pub fn is_user_variable(name: &str) -> bool {
    name.len() >= USER_PREFIX.len()
        && name.is_char_boundary(USER_PREFIX.len())
        && name[..USER_PREFIX.len()].eq_ignore_ascii_case(USER_PREFIX)
}

fn is_allowed(name: &str) -> bool {
    ALLOWED_VARIABLES.contains(&name) || is_user_variable(name)
}

/// Immutable view of the variables a build sees
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentSnapshot {
    /// Every variable by name
    pub raw: BTreeMap<String, String>,
    /// The `JM_` subset of `raw`
    pub user_define: BTreeMap<String, String>,
    /// `process.env.NAME` mapped to a JSON string literal, one per `raw` entry
    pub stringified: BTreeMap<String, String>,
}

impl EnvironmentSnapshot {
    /// Assemble the snapshot from the process environment and dotenv files on disk
    pub fn assemble(
        mode: BuildMode,
        process_env: &BTreeMap<String, String>,
        dotenv_files: &[PathBuf],
        manifest: &Manifest,
    ) -> Result<Self, JmError> {
        Self::assemble_with_fs(mode, process_env, dotenv_files, manifest, &RealFileSystem)
    }

    /// Assemble the snapshot with a custom filesystem implementation
    pub fn assemble_with_fs<FS: FileSystem>(
        mode: BuildMode,
        process_env: &BTreeMap<String, String>,
        dotenv_files: &[PathBuf],
        manifest: &Manifest,
        fs: &FS,
    ) -> Result<Self, JmError> {
        let defined = dotenv::load_chain(fs, dotenv_files).map_err(|source| JmError::Io {
            context: "reading .env files".to_string(),
            source,
        })?;

        let mut combined = dotenv::expand(&defined, process_env);
        combined.extend(process_env.iter().map(|(k, v)| (k.clone(), v.clone())));

        Ok(Self::from_variables(mode, &combined, manifest))
    }

    /// Build the snapshot from already-merged variables
    pub fn from_variables(
        mode: BuildMode,
        variables: &BTreeMap<String, String>,
        manifest: &Manifest,
    ) -> Self {
        let public_url = match mode {
            BuildMode::Production => "./",
            BuildMode::Development => "/",
        };

        let mut raw = BTreeMap::from([
            ("VERSION".to_string(), manifest.version.clone()),
            ("NAME".to_string(), manifest.name.clone()),
            ("PUBLIC_URL".to_string(), public_url.to_string()),
            ("PAGE_EXT".to_string(), DEFAULT_PAGE_EXT.to_string()),
        ]);

        raw.extend(
            variables
                .iter()
                .filter(|(name, _)| is_allowed(name))
                .map(|(k, v)| (k.clone(), v.clone())),
        );

        // NODE_ENV always reflects the mode
        raw.insert("NODE_ENV".to_string(), mode.as_str().to_string());

        let user_define = raw
            .iter()
            .filter(|(name, _)| is_user_variable(name))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let stringified = raw
            .iter()
            .map(|(k, v)| (format!("process.env.{}", k), serde_json::Value::from(v.as_str()).to_string()))
            .collect();

        Self {
            raw,
            user_define,
            stringified,
        }
    }

    /// Look up a variable
    pub fn get(&self, name: &str) -> Option<&str> {
        self.raw.get(name).map(String::as_str)
    }

    /// Whether `name` is set to `true`
    pub fn flag(&self, name: &str) -> bool {
        self.get(name) == Some("true")
    }

    /// Whether `NODE_ENV` is `production`
    pub fn is_production(&self) -> bool {
        self.get("NODE_ENV") == Some("production")
    }

    /// Source maps stay on unless `SOURCE_MAP=false`
    pub fn source_map_enabled(&self) -> bool {
        self.get("SOURCE_MAP") != Some("false")
    }

    /// Page template extension
    pub fn page_ext(&self) -> &str {
        match self.get("PAGE_EXT") {
            Some(ext) if !ext.is_empty() => ext,
            _ => DEFAULT_PAGE_EXT,
        }
    }

    /// Public path assets are served from
    pub fn public_url(&self) -> &str {
        self.get("PUBLIC_URL").unwrap_or("/")
    }
}

/// Current process environment as an ordered map
pub fn process_env() -> BTreeMap<String, String> {
    std::env::vars().collect()
}
