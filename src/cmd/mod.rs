//! Command handlers for the jm CLI
//!
//! Each submodule handles one sub-command. Handlers load an
//! [`InvocationContext`], compose configurations and hand them to the
//! bundler, printing progress along the way. The `run_*` functions hold the
//! orchestration and take the bundler and filesystem as parameters so they
//! can be driven from tests.

pub mod analyze;
pub mod build;
pub mod clean;
pub mod completions;
pub mod dll;
pub mod inspect;
pub mod start;

pub use analyze::cmd_analyze;
pub use build::{cmd_build, BuildArgs, EntryGroup};
pub use clean::cmd_clean;
pub use completions::cmd_completions;
pub use dll::cmd_dll;
pub use start::{cmd_start, StartArgs};

use std::path::PathBuf;

use crate::bundler::{ExternalBundler, DEFAULT_BUNDLER};
use crate::context::InvocationContext;
use crate::error::JmError;

/// Flags shared by every command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalArgs {
    /// Project directory containing `package.json`
    pub project_root: PathBuf,
    /// Print the composed configuration instead of running the bundler
    pub inspect: bool,
    /// Bundler executable name or path
    pub bundler: String,
}

impl GlobalArgs {
    /// Defaults for the project at `project_root`
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            inspect: false,
            bundler: DEFAULT_BUNDLER.to_string(),
        }
    }

    /// Locate the configured bundler for the project in `ctx`
    pub fn locate_bundler(&self, ctx: &InvocationContext) -> Result<ExternalBundler, JmError> {
        ExternalBundler::locate(&self.bundler, &ctx.paths.app_path, &ctx.paths.app_cache)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Bundler double shared by the command tests

    use anyhow::Result;
    use parking_lot::Mutex;

    use crate::bundler::{Bundler, BundlerJob, CompileReport};
    use crate::config::BundlerConfiguration;
    use crate::error::JmError;

    #[derive(Default)]
    pub struct RecordingBundler {
        pub runs: Mutex<Vec<(Vec<BundlerConfiguration>, BundlerJob)>>,
        pub fail_with: Option<&'static str>,
    }

    impl Bundler for RecordingBundler {
        fn run(&self, configs: &[BundlerConfiguration], job: &BundlerJob) -> Result<CompileReport> {
            self.runs.lock().push((configs.to_vec(), job.clone()));
            match self.fail_with {
                Some(diagnostics) => Err(JmError::BundlerCompile {
                    diagnostics: diagnostics.to_string(),
                }
                .into()),
                None => Ok(CompileReport {
                    output: "compiled".to_string(),
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_args_default_to_jm_bundler() {
        let args = GlobalArgs::new("/app");
        assert_eq!(args.bundler, DEFAULT_BUNDLER);
        assert!(!args.inspect);
        assert_eq!(args.project_root, PathBuf::from("/app"));
    }
}
