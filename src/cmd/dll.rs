//! Dll command implementation

use anyhow::Result;
use console::style;

use crate::bundler::{Bundler, BundlerJob};
use crate::cmd::inspect::print_inspection;
use crate::cmd::GlobalArgs;
use crate::config::dll::{dll_configuration, dll_hash, dll_modules, should_update_dll};
use crate::config::BuildMode;
use crate::context::InvocationContext;
use crate::error::JmError;
use crate::fmt::{Spinner, CHECKMARK, INFO, PACKAGE};
use crate::infra::{FileSystem, RealFileSystem};

/// What `jm dll` ended up doing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DllOutcome {
    /// Nothing is configured for pre-bundling
    NoModules,
    /// Installed versions match the stored hash
    UpToDate {
        /// Current hash
        hash: String,
    },
    /// The bundle was rebuilt and the hash stored
    Rebuilt {
        /// Modules in the bundle
        modules: Vec<String>,
        /// Stored hash
        hash: String,
    },
}

/// Rebuild the DLL through `bundler` when its inputs changed
pub fn run_dll<B: Bundler + ?Sized, FS: FileSystem>(
    ctx: &InvocationContext,
    bundler: &B,
    fs: &FS,
) -> Result<DllOutcome> {
    let modules = dll_modules(&ctx.manifest, &ctx.options);
    if modules.is_empty() {
        return Ok(DllOutcome::NoModules);
    }

    let paths = &ctx.paths;
    let hash = dll_hash(fs, paths, &modules)?;
    if !should_update_dll(fs, &paths.app_dll_hash, &hash) {
        return Ok(DllOutcome::UpToDate { hash });
    }

    bundler.run(&[dll_configuration(ctx, &modules)], &BundlerJob::Build)?;

    fs.create_dir_all(&paths.app_cache)
        .and_then(|()| fs.write(&paths.app_dll_hash, &hash))
        .map_err(|source| JmError::Io {
            context: format!("writing {}", paths.app_dll_hash.display()),
            source,
        })?;

    Ok(DllOutcome::Rebuilt { modules, hash })
}

/// Main dll command handler
pub fn cmd_dll(global: &GlobalArgs) -> Result<()> {
    let ctx = InvocationContext::load(&global.project_root, BuildMode::Development)?;

    if global.inspect {
        let modules = dll_modules(&ctx.manifest, &ctx.options);
        return print_inspection(&ctx, None, &[dll_configuration(&ctx, &modules)]);
    }

    println!("{} {} DLL pre-bundle", PACKAGE, style(&ctx.manifest.name).bold());
    println!();

    let bundler = global.locate_bundler(&ctx)?;
    let spinner = Spinner::new("Checking installed versions...");
    match run_dll(&ctx, &bundler, &RealFileSystem) {
        Ok(DllOutcome::NoModules) => {
            spinner.finish("Nothing to pre-bundle.");
            println!("{} Add `dependencies` or `jm.dll.include` to package.json", INFO);
        }
        Ok(DllOutcome::UpToDate { .. }) => spinner.finish("DLL is up to date."),
        Ok(DllOutcome::Rebuilt { modules, hash }) => {
            spinner.finish("DLL generated.");
            for module in &modules {
                println!("   {} {}", style("•").dim(), module);
            }
            println!();
            println!("{} Hash {}", CHECKMARK, style(&hash[..12.min(hash.len())]).dim());
        }
        Err(e) => {
            spinner.fail("Failed to generate DLL.");
            return Err(e);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::testing::RecordingBundler;
    use std::collections::BTreeMap;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn project(dependencies: &[(&str, &str)]) -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let deps: BTreeMap<_, _> = dependencies.iter().map(|(n, _)| (*n, "*")).collect();
        fs::write(
            root.join("package.json"),
            serde_json::json!({"name": "demo", "version": "1.0.0", "dependencies": deps}).to_string(),
        )
        .unwrap();
        for (name, version) in dependencies {
            install(root, name, version);
        }
        temp_dir
    }

    fn install(root: &Path, name: &str, version: &str) {
        let dir = root.join("node_modules").join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("package.json"),
            format!(r#"{{"name":"{}","version":"{}"}}"#, name, version),
        )
        .unwrap();
    }

    fn load(root: &Path) -> InvocationContext {
        InvocationContext::load_with(root, BuildMode::Development, &BTreeMap::new(), &RealFileSystem)
            .unwrap()
    }

    #[test]
    fn test_no_modules_skips_bundler() {
        let temp_dir = project(&[]);
        let bundler = RecordingBundler::default();

        let outcome = run_dll(&load(temp_dir.path()), &bundler, &RealFileSystem).unwrap();

        assert_eq!(outcome, DllOutcome::NoModules);
        assert!(bundler.runs.lock().is_empty());
    }

    #[test]
    fn test_rebuilds_once_then_up_to_date_until_version_changes() {
        let temp_dir = project(&[("react", "16.8.0")]);
        let bundler = RecordingBundler::default();

        let first = run_dll(&load(temp_dir.path()), &bundler, &RealFileSystem).unwrap();
        assert!(matches!(first, DllOutcome::Rebuilt { ref modules, .. } if modules == &["react"]));
        let hash_file = temp_dir.path().join("node_modules/.cache/jm/dll.hash");
        assert!(hash_file.exists());

        let second = run_dll(&load(temp_dir.path()), &bundler, &RealFileSystem).unwrap();
        assert!(matches!(second, DllOutcome::UpToDate { .. }));
        assert_eq!(bundler.runs.lock().len(), 1);

        install(temp_dir.path(), "react", "16.9.0");
        let third = run_dll(&load(temp_dir.path()), &bundler, &RealFileSystem).unwrap();
        assert!(matches!(third, DllOutcome::Rebuilt { .. }));
        assert_eq!(bundler.runs.lock().len(), 2);
    }

    #[test]
    fn test_failed_bundle_does_not_store_hash() {
        let temp_dir = project(&[("react", "16.8.0")]);
        let bundler = RecordingBundler {
            fail_with: Some("boom"),
            ..RecordingBundler::default()
        };

        assert!(run_dll(&load(temp_dir.path()), &bundler, &RealFileSystem).is_err());
        assert!(!temp_dir.path().join("node_modules/.cache/jm/dll.hash").exists());
    }

    #[test]
    fn test_uninstalled_module_is_reported() {
        let temp_dir = project(&[("react", "16.8.0")]);
        fs::remove_dir_all(temp_dir.path().join("node_modules").join("react")).unwrap();
        let bundler = RecordingBundler::default();

        let err = run_dll(&load(temp_dir.path()), &bundler, &RealFileSystem).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<JmError>(),
            Some(JmError::DllModuleMissing { .. })
        ));
    }
}
