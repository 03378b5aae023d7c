//! Error types with contextual suggestions
//!
//! Every configuration-phase failure is fatal: composition stops at the first
//! error and the CLI exits non-zero. Each variant carries enough context to
//! print an actionable one-line summary, plus a detail block for manifest
//! validation failures.
//!
//! # Examples
//!
//! ```
//! use jm_cli::error::JmError;
//!
//! let error = JmError::EntryNotFound {
//!     missing: vec!["c".to_string(), "d".to_string()],
//!     context: "src".into(),
//! };
//!
//! assert!(error.to_string().contains("c, d"));
//! assert_eq!(error.exit_code(), 66);
//! ```

use std::path::PathBuf;
use thiserror::Error;

use crate::config::BuildMode;
use crate::options::ValidationError;

/// Errors raised while preparing or handing off a bundler configuration
#[derive(Error, Debug)]
pub enum JmError {
    /// `package.json` could not be read
    #[error("Manifest not found: {path}")]
    ManifestNotFound {
        /// Path to the manifest
        path: PathBuf,
        #[source]
        /// IO error source
        source: std::io::Error,
    },

    /// `package.json` is not valid JSON
    #[error("Failed to parse manifest: {path}")]
    ManifestParse {
        /// Path to the manifest
        path: PathBuf,
        #[source]
        /// JSON error source
        source: serde_json::Error,
    },

    /// The `jm` block of the manifest violates the option schema
    #[error("Configuration error. Check property `jm` of the package.json")]
    ConfigurationValidation {
        /// Aggregated validation errors
        errors: Vec<ValidationError>,
    },

    /// Requested entry names have no corresponding page
    #[error("Entry not found: {}", missing.join(", "))]
    EntryNotFound {
        /// Every requested name that could not be matched
        missing: Vec<String>,
        /// Directory that was scanned
        context: PathBuf,
    },

    /// A page template was found but no script entry accompanies it
    #[error("Page '{page}' found, but no entry script ({}) exists in {}", tried.join(", "), context.display())]
    TemplateOrScriptMissing {
        /// Page name
        page: String,
        /// Script file names that were tried
        tried: Vec<String>,
        /// Directory that was scanned
        context: PathBuf,
    },

    /// Discovery produced no pages at all
    #[error("No pages (*{page_ext}) found in {}", context.display())]
    NoEntries {
        /// Page template extension that was searched for
        page_ext: String,
        /// Directory that was scanned
        context: PathBuf,
    },

    /// The external bundler reported a failure
    #[error("Failed to compile")]
    BundlerCompile {
        /// Bundler diagnostics, passed through verbatim
        diagnostics: String,
    },

    /// Required executable is not installed
    #[error("Tool not installed: {tool}")]
    ToolMissing {
        /// Tool name
        tool: String,
        /// Installation command
        install_cmd: String,
    },

    /// Electron mode without electron installed in the project
    #[error("Electron is not installed in this project")]
    ElectronMissing,

    /// A configuration was requested in a different mode than the environment was loaded for
    #[error("Cannot compose a {requested} configuration from a {environment} environment")]
    ModeMismatch {
        /// Mode asked of the composer
        requested: BuildMode,
        /// Mode the invocation context was loaded in
        environment: BuildMode,
    },

    /// A DLL module is listed but not installed
    #[error("Module {module} not found in node_modules")]
    DllModuleMissing {
        /// Module name
        module: String,
    },

    /// Generic I/O error with context
    #[error("I/O error: {context}")]
    Io {
        /// Context about where the error occurred
        context: String,
        #[source]
        /// IO error source
        source: std::io::Error,
    },
}

impl JmError {
    /// Get actionable suggestion for resolving this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use jm_cli::error::JmError;
    ///
    /// let error = JmError::ElectronMissing;
    /// assert!(error.suggestion().unwrap().contains("electron"));
    /// ```
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::ManifestNotFound { .. } => {
                Some("Run jm inside a project directory that contains package.json".to_string())
            }
            Self::ManifestParse { .. } => Some("Fix the JSON syntax of package.json".to_string()),
            Self::ConfigurationValidation { .. } => {
                Some("Edit the `jm` block of package.json to match the option schema".to_string())
            }
            Self::EntryNotFound { context, .. } => Some(format!(
                "Check the names passed to --entry; pages are *.html files in {}",
                context.display()
            )),
            Self::TemplateOrScriptMissing { page, .. } => Some(format!(
                "Create {page}.tsx (or .ts/.jsx/.js) next to the page template, or {page}.page.tsx"
            )),
            Self::NoEntries { page_ext, .. } => Some(format!(
                "Add a page template such as index{page_ext} with an index.tsx entry"
            )),
            Self::BundlerCompile { .. } => {
                Some("Check the bundler errors above and fix compilation issues".to_string())
            }
            Self::ToolMissing { install_cmd, .. } => Some(format!("Install with: {}", install_cmd)),
            Self::ElectronMissing => Some(
                "Please install Electron: `yarn add electron -D` or `npm i electron --save-dev`"
                    .to_string(),
            ),
            Self::ModeMismatch { requested, .. } => Some(format!(
                "Load the invocation context in {requested} mode before composing"
            )),
            Self::DllModuleMissing { module } => Some(format!(
                "Install {module}, or exclude it with `jm.dll.exclude` in package.json"
            )),
            Self::Io { context, .. } => Some(format!(
                "Check file permissions and that {} is accessible",
                context
            )),
        }
    }

    /// Structured detail lines printed below the summary
    pub fn details(&self) -> Vec<String> {
        match self {
            Self::ConfigurationValidation { errors } => errors
                .iter()
                .map(|e| {
                    let path = if e.path.is_empty() { "jm" } else { &e.path };
                    format!("{}: {}", path, e.message)
                })
                .collect(),
            Self::BundlerCompile { diagnostics } if !diagnostics.trim().is_empty() => {
                diagnostics.lines().map(str::to_string).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Get appropriate exit code for this error, following sysexits.h conventions.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ManifestNotFound { .. } => 66,        // EX_NOINPUT
            Self::ManifestParse { .. } => 65,           // EX_DATAERR
            Self::ConfigurationValidation { .. } => 78, // EX_CONFIG
            Self::EntryNotFound { .. } => 66,
            Self::TemplateOrScriptMissing { .. } => 66,
            Self::NoEntries { .. } => 66,
            Self::BundlerCompile { .. } => 1,
            Self::ToolMissing { .. } => 127, // Command not found
            Self::ElectronMissing => 69,     // EX_UNAVAILABLE
            Self::ModeMismatch { .. } => 70, // EX_SOFTWARE
            Self::DllModuleMissing { .. } => 69,
            Self::Io { .. } => 74, // EX_IOERR
        }
    }
}

/// Error formatter with colors and structured output
pub struct ErrorFormatter;

impl ErrorFormatter {
    /// Format error with details and suggestions
    pub fn format(error: &anyhow::Error) -> String {
        use console::style;

        let mut output = String::new();

        output.push_str(&format!(
            "{} {} {}\n",
            crate::fmt::CROSSMARK,
            style("error:").red().bold(),
            style(error).red()
        ));

        let mut source = error.source();
        let mut indent = 1;
        while let Some(err) = source {
            output.push_str(&format!(
                "{}{} {}\n",
                "  ".repeat(indent),
                style("caused by:").yellow(),
                err
            ));
            source = err.source();
            indent += 1;
        }

        if let Some(jm_error) = error.downcast_ref::<JmError>() {
            let details = jm_error.details();
            if !details.is_empty() {
                output.push('\n');
                for line in details {
                    output.push_str(&format!("  {}\n", line));
                }
            }

            if let Some(suggestion) = jm_error.suggestion() {
                output.push_str(&format!(
                    "\n{} {}\n",
                    style("help:").cyan().bold(),
                    suggestion
                ));
            }
        }

        output
    }

    /// Get exit code from error
    pub fn exit_code(error: &anyhow::Error) -> i32 {
        if let Some(jm_error) = error.downcast_ref::<JmError>() {
            jm_error.exit_code()
        } else {
            1
        }
    }
}
