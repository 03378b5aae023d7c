//! Test fixture helpers for creating front-end projects
//!
//! Provides a builder that lays out `package.json`, pages under `src`,
//! dotenv files and installed modules in a temporary directory.

#![allow(dead_code)]

use jm_cli::config::BuildMode;
use jm_cli::context::InvocationContext;
use jm_cli::infra::RealFileSystem;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Builder for a temporary project
#[derive(Debug, Default)]
pub struct ProjectFixture {
    name: Option<String>,
    jm: Option<Value>,
    dependencies: Vec<String>,
    files: Vec<(PathBuf, String)>,
    installed: Vec<(String, String)>,
}

impl ProjectFixture {
    /// Empty project named `fixture`
    pub fn new() -> Self {
        Self::default()
    }

    /// Package name
    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// `jm` block of the manifest
    pub fn jm(mut self, jm: Value) -> Self {
        self.jm = Some(jm);
        self
    }

    /// Runtime dependency, installed at `version`
    pub fn dependency(mut self, name: &str, version: &str) -> Self {
        self.dependencies.push(name.to_string());
        self.installed.push((name.to_string(), version.to_string()));
        self
    }

    /// Page `src/{name}.html` with a `src/{name}.{script_ext}` entry
    pub fn page(self, name: &str, script_ext: &str) -> Self {
        self.template(name)
            .file(&format!("src/{}.{}", name, script_ext), "export {}\n")
    }

    /// Template `src/{name}.html` without a script
    pub fn template(self, name: &str) -> Self {
        self.file(
            &format!("src/{}.html", name),
            "<!DOCTYPE html><div id=\"root\"></div>",
        )
    }

    /// Arbitrary file relative to the project root
    pub fn file(mut self, path: &str, contents: &str) -> Self {
        self.files.push((PathBuf::from(path), contents.to_string()));
        self
    }

    /// Write everything to a fresh temporary directory
    pub fn build(self) -> Project {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let root = dir.path();

        let mut manifest = json!({
            "name": self.name.as_deref().unwrap_or("fixture"),
            "version": "1.0.0",
        });
        if !self.dependencies.is_empty() {
            let deps: BTreeMap<&str, &str> =
                self.dependencies.iter().map(|d| (d.as_str(), "*")).collect();
            manifest["dependencies"] = json!(deps);
        }
        if let Some(jm) = self.jm {
            manifest["jm"] = jm;
        }
        fs::write(
            root.join("package.json"),
            serde_json::to_string_pretty(&manifest).expect("manifest serializes"),
        )
        .expect("Failed to write package.json");

        fs::create_dir_all(root.join("src")).expect("Failed to create src");
        for (path, contents) in &self.files {
            let path = root.join(path);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).expect("Failed to create parent dir");
            }
            fs::write(&path, contents).expect("Failed to write fixture file");
        }

        let project = Project { dir };
        for (name, version) in &self.installed {
            project.install(name, version);
        }
        project
    }
}

/// A project on disk; removed when dropped
pub struct Project {
    dir: TempDir,
}

impl Project {
    /// Project root
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Install `name@version` into `node_modules`
    pub fn install(&self, name: &str, version: &str) {
        let dir = self.root().join("node_modules").join(name);
        fs::create_dir_all(&dir).expect("Failed to create module dir");
        fs::write(
            dir.join("package.json"),
            json!({"name": name, "version": version}).to_string(),
        )
        .expect("Failed to write module manifest");
    }

    /// Write or overwrite a file relative to the root
    pub fn write(&self, path: &str, contents: &str) {
        let path = self.root().join(path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        fs::write(path, contents).expect("Failed to write file");
    }

    /// Remove a file relative to the root
    pub fn remove(&self, path: &str) {
        fs::remove_file(self.root().join(path)).expect("Failed to remove file");
    }

    /// Load the context with an empty process environment
    pub fn context(&self, mode: BuildMode) -> InvocationContext {
        self.context_with(mode, &BTreeMap::new())
    }

    /// Load the context with the given process environment
    pub fn context_with(
        &self,
        mode: BuildMode,
        process_env: &BTreeMap<String, String>,
    ) -> InvocationContext {
        InvocationContext::load_with(self.root(), mode, process_env, &RealFileSystem)
            .expect("Failed to load context")
    }

    /// Source directory
    pub fn src(&self) -> PathBuf {
        self.root().join("src")
    }
}
