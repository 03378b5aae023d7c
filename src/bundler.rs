//! Hand-off of composed configurations to the external bundler
//!
//! The bundler and dev server run outside this process. Configurations are
//! written as JSON under the cache directory and the bundler executable is
//! pointed at them.

use anyhow::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::template::{BUILTIN_TEMPLATE, BUILTIN_TEMPLATE_FILE};
use crate::config::{BundlerConfiguration, DevServerConfig};
use crate::error::JmError;
use crate::infra::{CommandExecutor, FileSystem, RealCommandExecutor, RealFileSystem};

/// Executable used unless `--bundler` says otherwise
pub const DEFAULT_BUNDLER: &str = "jm-bundler";

/// Install hint shown when the bundler is missing
pub const BUNDLER_INSTALL_CMD: &str = "npm install --save-dev jm-bundler";

/// Configuration file handed to the bundler
pub const CONFIG_FILE: &str = "bundler.config.json";

/// Dev-server settings file handed to the bundler
pub const DEV_SERVER_FILE: &str = "dev-server.json";

/// What the bundler should do with the configurations
#[derive(Debug, Clone, PartialEq)]
pub enum BundlerJob {
    /// One-shot compilation
    Build,
    /// Serve with the dev server until interrupted
    Watch(DevServerConfig),
    /// Compile and open the bundle analyzer
    Analyze,
}

impl BundlerJob {
    /// Sub-command passed to the bundler executable
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::Watch(_) => "watch",
            Self::Analyze => "analyze",
        }
    }
}

/// Result of a finished bundler run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileReport {
    /// Bundler stdout, empty for watch runs
    pub output: String,
}

/// Something that can compile configurations
pub trait Bundler {
    /// Run `job` over `configs`
    fn run(&self, configs: &[BundlerConfiguration], job: &BundlerJob) -> Result<CompileReport>;
}

/// Bundler executable invoked as a child process
pub struct ExternalBundler<FS: FileSystem = RealFileSystem, CE: CommandExecutor = RealCommandExecutor> {
    program: PathBuf,
    project_root: PathBuf,
    cache_dir: PathBuf,
    fs: FS,
    cmd_executor: CE,
}

impl ExternalBundler {
    /// Locate `program` on `PATH` or in `node_modules/.bin`
    pub fn locate(program: &str, project_root: &Path, cache_dir: &Path) -> Result<Self, JmError> {
        let local = project_root.join("node_modules").join(".bin").join(program);
        let resolved = which::which(program)
            .or_else(|_| which::which(&local))
            .map_err(|_| JmError::ToolMissing {
                tool: program.to_string(),
                install_cmd: BUNDLER_INSTALL_CMD.to_string(),
            })?;
        log::debug!("Using bundler {}", resolved.display());

        Ok(Self::with_executors(
            resolved,
            project_root,
            cache_dir,
            RealFileSystem,
            RealCommandExecutor,
        ))
    }
}

impl<FS: FileSystem, CE: CommandExecutor> ExternalBundler<FS, CE> {
    /// Bundler at an already resolved path with custom executors
    pub fn with_executors(
        program: impl Into<PathBuf>,
        project_root: &Path,
        cache_dir: &Path,
        fs: FS,
        cmd_executor: CE,
    ) -> Self {
        Self {
            program: program.into(),
            project_root: project_root.to_path_buf(),
            cache_dir: cache_dir.to_path_buf(),
            fs,
            cmd_executor,
        }
    }

    fn write_json(&self, file: &str, value: &impl Serialize) -> Result<PathBuf, JmError> {
        let path = self.cache_dir.join(file);
        let json = serde_json::to_string_pretty(value).map_err(|e| JmError::Io {
            context: format!("serializing {}", file),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        })?;
        self.fs.write(&path, json).map_err(|source| JmError::Io {
            context: format!("writing {}", path.display()),
            source,
        })?;
        Ok(path)
    }

    fn ensure_builtin_template(&self) -> Result<(), JmError> {
        let path = self.cache_dir.join(BUILTIN_TEMPLATE_FILE);
        if self.fs.exists(&path) {
            return Ok(());
        }
        self.fs
            .write(&path, BUILTIN_TEMPLATE)
            .map_err(|source| JmError::Io {
                context: format!("writing {}", path.display()),
                source,
            })
    }

    fn spawn_error(&self, source: std::io::Error) -> JmError {
        if source.kind() == std::io::ErrorKind::NotFound {
            JmError::ToolMissing {
                tool: self.program.display().to_string(),
                install_cmd: BUNDLER_INSTALL_CMD.to_string(),
            }
        } else {
            JmError::Io {
                context: format!("running {}", self.program.display()),
                source,
            }
        }
    }
}

impl<FS: FileSystem, CE: CommandExecutor> Bundler for ExternalBundler<FS, CE> {
    fn run(&self, configs: &[BundlerConfiguration], job: &BundlerJob) -> Result<CompileReport> {
        self.fs
            .create_dir_all(&self.cache_dir)
            .map_err(|source| JmError::Io {
                context: format!("creating {}", self.cache_dir.display()),
                source,
            })?;
        self.ensure_builtin_template()?;
        let config_file = self.write_json(CONFIG_FILE, &configs)?;

        let mut cmd = Command::new(&self.program);
        cmd.current_dir(&self.project_root)
            .arg(job.verb())
            .arg("--config")
            .arg(&config_file);

        log::debug!(
            "Running {} {} for {} configuration(s)",
            self.program.display(),
            job.verb(),
            configs.len()
        );

        match job {
            BundlerJob::Watch(server) => {
                let server_file = self.write_json(DEV_SERVER_FILE, server)?;
                cmd.arg("--dev-server").arg(&server_file);

                let status = self
                    .cmd_executor
                    .status(&mut cmd)
                    .map_err(|e| self.spawn_error(e))?;
                if !status.success() {
                    return Err(JmError::BundlerCompile {
                        diagnostics: format!("dev server exited with {}", status),
                    }
                    .into());
                }
                Ok(CompileReport::default())
            }
            BundlerJob::Build | BundlerJob::Analyze => {
                let output = self
                    .cmd_executor
                    .output(&mut cmd)
                    .map_err(|e| self.spawn_error(e))?;
                if !output.status.success() {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    let diagnostics = if stderr.trim().is_empty() {
                        String::from_utf8_lossy(&output.stdout).into_owned()
                    } else {
                        stderr.into_owned()
                    };
                    return Err(JmError::BundlerCompile { diagnostics }.into());
                }
                Ok(CompileReport {
                    output: String::from_utf8_lossy(&output.stdout).into_owned(),
                })
            }
        }
    }
}
