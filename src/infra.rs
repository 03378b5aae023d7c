//! Infrastructure traits for abstracting I/O operations.
//!
//! Entry discovery, the DLL hash check and the build command only touch the
//! disk through [`FileSystem`], and the bundler hand-off only spawns processes
//! through [`CommandExecutor`], so both can be swapped out in tests.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Output};

/// Trait for abstracting filesystem operations.
pub trait FileSystem {
    /// Copy a file from one location to another.
    fn copy(&self, from: &Path, to: &Path) -> io::Result<u64>;

    /// Create a directory and all missing parent directories.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Remove a directory and everything below it.
    fn remove_dir_all(&self, path: &Path) -> io::Result<()>;

    /// List the immediate children of a directory.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;

    /// Whether a file or directory exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Whether `path` is an existing regular file.
    fn is_file(&self, path: &Path) -> bool;

    /// Whether `path` itself is a symbolic link, without following it.
    fn is_symlink(&self, path: &Path) -> bool;

    /// Read the entire contents of a file into a string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write a slice of bytes to a file.
    fn write(&self, path: &Path, contents: impl AsRef<[u8]>) -> io::Result<()>;
}

/// Real filesystem implementation that delegates to std::fs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn copy(&self, from: &Path, to: &Path) -> io::Result<u64> {
        std::fs::copy(from, to)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_dir_all(path)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        std::fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect()
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_symlink(&self, path: &Path) -> bool {
        path.is_symlink()
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, contents: impl AsRef<[u8]>) -> io::Result<()> {
        std::fs::write(path, contents)
    }
}

/// Empty a directory, creating it when missing.
pub fn empty_dir<FS: FileSystem>(fs: &FS, dir: &Path) -> io::Result<()> {
    if fs.exists(dir) {
        fs.remove_dir_all(dir)?;
    }
    fs.create_dir_all(dir)
}

/// Recursively copy `from` into `to`. A missing source is a no-op.
///
/// Symbolic links are skipped.
pub fn copy_dir<FS: FileSystem>(fs: &FS, from: &Path, to: &Path) -> io::Result<u64> {
    if !fs.exists(from) {
        return Ok(0);
    }

    fs.create_dir_all(to)?;
    let mut copied = 0;
    for child in fs.read_dir(from)? {
        let Some(name) = child.file_name() else {
            continue;
        };
        let target = to.join(name);
        if fs.is_symlink(&child) {
            log::debug!("skipping symlink {}", child.display());
        } else if fs.is_file(&child) {
            copied += fs.copy(&child, &target)?;
        } else {
            copied += copy_dir(fs, &child, &target)?;
        }
    }
    Ok(copied)
}

/// Trait for abstracting command execution.
pub trait CommandExecutor {
    /// Execute a command with inherited stdio and return its exit status.
    fn status(&self, cmd: &mut Command) -> io::Result<ExitStatus>;

    /// Execute a command and return its output (stdout, stderr, status).
    fn output(&self, cmd: &mut Command) -> io::Result<Output>;
}

/// Real command executor that delegates to std::process::Command.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealCommandExecutor;

impl CommandExecutor for RealCommandExecutor {
    fn status(&self, cmd: &mut Command) -> io::Result<ExitStatus> {
        cmd.status()
    }

    fn output(&self, cmd: &mut Command) -> io::Result<Output> {
        cmd.output()
    }
}

/// Create an ExitStatus with the given exit code for use in test mocks.
///
/// This avoids spawning actual processes (like `Command::new("true")`) in tests.
#[cfg(all(test, unix))]
pub fn mock_exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8) // Unix stores exit code in upper bits
}

#[cfg(all(test, windows))]
pub fn mock_exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    ExitStatus::from_raw(code as u32)
}
