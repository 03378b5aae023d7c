#![warn(missing_docs)]
#![warn(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! jm-cli library
//!
//! This library turns a front-end project (a `package.json`, a `src`
//! directory of pages and a handful of dotenv files) into the configuration
//! an external bundler compiles. It can be used programmatically in addition
//! to the `jm` CLI.
//!
//! # Basic Example
//!
//! Assembling the environment a build sees:
//!
//! ```
//! use jm_cli::config::BuildMode;
//! use jm_cli::env::EnvironmentSnapshot;
//! use jm_cli::manifest::Manifest;
//! use std::collections::BTreeMap;
//!
//! let manifest = Manifest {
//!     name: "shop".to_string(),
//!     version: "1.2.0".to_string(),
//!     ..Manifest::default()
//! };
//! let vars = BTreeMap::from([
//!     ("JM_API".to_string(), "/api".to_string()),
//!     ("HOME".to_string(), "/root".to_string()),
//! ]);
//!
//! let env = EnvironmentSnapshot::from_variables(BuildMode::Production, &vars, &manifest);
//!
//! assert_eq!(env.get("NODE_ENV"), Some("production"));
//! assert_eq!(env.get("VERSION"), Some("1.2.0"));
//! assert_eq!(env.get("JM_API"), Some("/api"));
//! assert_eq!(env.get("HOME"), None);
//! assert_eq!(env.stringified["process.env.JM_API"], "\"/api\"");
//! ```
//!
//! # Advanced Example: Composing a Configuration
//!
//! Discovering pages and composing the production configuration:
//!
//! ```
//! use jm_cli::config::{compose, BuildMode, Overrides};
//! use jm_cli::context::InvocationContext;
//! use jm_cli::infra::RealFileSystem;
//! use std::collections::BTreeMap;
//! use std::fs;
//! use tempfile::TempDir;
//!
//! let project = TempDir::new().unwrap();
//! let root = project.path();
//! fs::write(root.join("package.json"), r#"{"name":"shop","version":"1.0.0"}"#).unwrap();
//! fs::create_dir(root.join("src")).unwrap();
//! for page in ["index", "cart"] {
//!     fs::write(root.join("src").join(format!("{page}.html")), "<div id=root></div>").unwrap();
//!     fs::write(root.join("src").join(format!("{page}.tsx")), "").unwrap();
//! }
//!
//! let ctx = InvocationContext::load_with(
//!     root,
//!     BuildMode::Production,
//!     &BTreeMap::new(),
//!     &RealFileSystem,
//! )
//! .unwrap();
//! let config = compose(&ctx, &Overrides::new(BuildMode::Production)).unwrap();
//!
//! assert_eq!(config.entry["cart"], ["./cart.tsx"]);
//! assert_eq!(config.html_filenames(), ["cart.html", "index.html"]);
//! ```

/// Handing composed configurations to the external bundler
pub mod bundler;
/// Optional type-check and lint capabilities
pub mod capability;
/// Command handlers for CLI operations
pub mod cmd;
/// Bundler configuration composition
pub mod config;
/// Per-invocation project state
pub mod context;
/// Build environment assembly
pub mod env;
/// Enhanced error types with contextual suggestions
pub mod error;
/// Shared formatting utilities
pub mod fmt;
/// Infrastructure traits for filesystem and command execution
pub mod infra;
/// `${NAME}` interpolation
pub mod interpolate;
/// Project manifest loading
pub mod manifest;
/// Tool options from the manifest
pub mod options;
/// Fixed project layout
pub mod paths;
/// Dev-server proxy declarations
pub mod proxy;
