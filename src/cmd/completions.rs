//! Completions command implementation
//!
//! Handles the `jm completions` command which generates
//! shell completion scripts for bash, zsh, fish, etc.

use clap::Command;
use clap_complete::{generate, Shell};
use std::io::Write;

/// Binary name completions are generated for
pub const BIN_NAME: &str = "jm";

/// Write the completion script for `shell` to `out`
pub fn write_completions(shell: Shell, cmd: &mut Command, out: &mut dyn Write) {
    generate(shell, cmd, BIN_NAME, out);
}

/// Generate shell completion scripts
///
/// Outputs completion script for the specified shell to stdout.
/// Users can redirect this to their shell's completion directory.
///
/// # Examples
///
/// ```bash
/// # Bash
/// jm completions bash > /etc/bash_completion.d/jm
///
/// # Zsh
/// jm completions zsh > ~/.zfunc/_jm
///
/// # Fish
/// jm completions fish > ~/.config/fish/completions/jm.fish
/// ```
pub fn cmd_completions(shell: Shell, cmd: &mut Command) {
    write_completions(shell, cmd, &mut std::io::stdout());
}
