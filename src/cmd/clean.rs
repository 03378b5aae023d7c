//! Clean command implementation
//!
//! Empties the loader caches under `node_modules` so the next build starts
//! cold.

use anyhow::Result;
use console::style;
use std::path::PathBuf;

use crate::cmd::GlobalArgs;
use crate::error::JmError;
use crate::fmt::{BROOM, CHECKMARK};
use crate::infra::{empty_dir, FileSystem, RealFileSystem};
use crate::paths::Paths;

/// Empty every loader cache, returning the directories that existed
pub fn clean_caches<FS: FileSystem>(fs: &FS, paths: &Paths) -> Result<Vec<PathBuf>, JmError> {
    let mut cleaned = Vec::new();
    for dir in paths.loader_caches() {
        let existed = fs.exists(&dir);
        empty_dir(fs, &dir).map_err(|source| JmError::Io {
            context: format!("emptying {}", dir.display()),
            source,
        })?;
        log::debug!("Emptied {}", dir.display());
        if existed {
            cleaned.push(dir);
        }
    }
    Ok(cleaned)
}

/// Main clean command handler
pub fn cmd_clean(global: &GlobalArgs) -> Result<()> {
    let paths = Paths::from_root(&global.project_root);

    println!("{} Cleaning loader caches", BROOM);
    let cleaned = clean_caches(&RealFileSystem, &paths)?;

    if cleaned.is_empty() {
        println!("   {} Nothing to clean", style("•").dim());
    }
    for dir in &cleaned {
        let shown = dir.strip_prefix(&paths.app_path).unwrap_or(dir);
        println!("{} {}", CHECKMARK, style(shown.display()).dim());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_clean_empties_existing_caches() {
        let temp_dir = TempDir::new().unwrap();
        let cache_loader = temp_dir.path().join("node_modules").join(".cache-loader");
        fs::create_dir_all(cache_loader.join("babel-loader")).unwrap();
        fs::write(cache_loader.join("babel-loader").join("a.json"), "{}").unwrap();
        let paths = Paths::from_root(temp_dir.path());

        let cleaned = clean_caches(&RealFileSystem, &paths).unwrap();

        assert_eq!(cleaned, [cache_loader.clone()]);
        assert!(cache_loader.exists());
        assert_eq!(fs::read_dir(&cache_loader).unwrap().count(), 0);
        assert!(temp_dir.path().join("node_modules").join(".cache").exists());
    }
}
