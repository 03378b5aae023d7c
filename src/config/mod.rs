//! Bundler configuration composition
//!
//! This module provides:
//! - The configuration data model handed to the bundler
//! - Page discovery and HTML injection planning
//! - Base rules plus one fragment builder per mode
//! - The composer merging all of the above
//! - Dev-server settings and the DLL pre-bundle

pub mod composer;
pub mod dev;
pub mod dev_server;
pub mod dll;
pub mod electron_main;
pub mod entry;
pub mod fragment;
pub mod naming;
pub mod plugins;
pub mod prod;
pub mod rules;
pub mod template;
pub mod types;

pub use composer::{compose, compose_electron_main, compose_with_fs, Overrides};
pub use dev_server::{dev_server_config, DevServerConfig};
pub use entry::{discover, Discovery, PageEntry, TemplateRef};
pub use fragment::{ConfigFragment, FragmentInputs, Mode};
pub use naming::Naming;
pub use template::{plan, HtmlPlan};
pub use types::{BuildMode, BundlerConfiguration, Plugin, Rule, Target};
