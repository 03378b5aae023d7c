//! Build command implementation
//!
//! Production build: empty `dist`, copy `public` into it, then compose one
//! configuration per entry group and run the bundler once over all of them.

use anyhow::Result;
use console::style;
use std::fmt;
use std::str::FromStr;

use crate::bundler::{Bundler, BundlerJob, CompileReport};
use crate::cmd::inspect::print_inspection;
use crate::cmd::GlobalArgs;
use crate::config::{compose_with_fs, BuildMode, BundlerConfiguration, Overrides};
use crate::context::InvocationContext;
use crate::error::JmError;
use crate::fmt::{format_bytes, page_list, Spinner, CHECKMARK, HAMMER, SPARKLES};
use crate::infra::{copy_dir, empty_dir, FileSystem, RealFileSystem};

/// Group whose pages fold into `--entry`
pub const DEFAULT_GROUP: &str = "default";

/// A named set of pages built as its own configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryGroup {
    /// Group name, used to prefix output filenames
    pub name: String,
    /// Pages in the group
    pub entries: Vec<String>,
}

impl FromStr for EntryGroup {
    type Err = String;

    /// Parse `name=a,b`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, entries) = s
            .split_once('=')
            .ok_or_else(|| format!("expected name=page[,page...], got {:?}", s))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(format!("group name is empty in {:?}", s));
        }
        let entries: Vec<String> = entries
            .split(',')
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_string)
            .collect();
        if entries.is_empty() {
            return Err(format!("group {} lists no pages", name));
        }
        Ok(Self {
            name: name.to_string(),
            entries,
        })
    }
}

impl fmt::Display for EntryGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.entries.join(","))
    }
}

/// Options of `jm build`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildArgs {
    /// Pages to build, every page when `None`
    pub entry: Option<Vec<String>>,
    /// Entry groups from `--group`
    pub groups: Vec<EntryGroup>,
    /// Keep the existing contents of `dist`
    pub dont_clean: bool,
    /// Skip copying `public` into `dist`
    pub dont_copy: bool,
}

impl BuildArgs {
    /// One [`Overrides`] per configuration to compose.
    ///
    /// A `default` group folds into `--entry`. Named groups replace the plain
    /// `--entry` selection; the folded default group is kept as an unnamed
    /// configuration next to them.
    ///
    /// # Examples
    ///
    /// ```
    /// use jm_cli::cmd::{BuildArgs, EntryGroup};
    ///
    /// let args = BuildArgs {
    ///     groups: vec![
    ///         "default=index".parse::<EntryGroup>().unwrap(),
    ///         "admin=dashboard,users".parse().unwrap(),
    ///     ],
    ///     ..BuildArgs::default()
    /// };
    /// let overrides = args.overrides();
    ///
    /// assert_eq!(overrides.len(), 2);
    /// assert_eq!(overrides[0].name, None);
    /// assert_eq!(overrides[1].name.as_deref(), Some("admin"));
    /// ```
    pub fn overrides(&self) -> Vec<Overrides> {
        let base = Overrides::new(BuildMode::Production);
        let (defaults, named): (Vec<&EntryGroup>, Vec<&EntryGroup>) = self
            .groups
            .iter()
            .partition(|g| g.name == DEFAULT_GROUP);

        let mut entry = self.entry.clone();
        for group in &defaults {
            entry
                .get_or_insert_with(Vec::new)
                .extend(group.entries.iter().cloned());
        }

        if named.is_empty() {
            return vec![match entry {
                Some(entry) => base.with_entry(entry),
                None => base,
            }];
        }

        let mut overrides = Vec::with_capacity(named.len() + 1);
        match entry {
            Some(entry) if !defaults.is_empty() => overrides.push(base.clone().with_entry(entry)),
            Some(entry) => log::warn!(
                "--group overrides --entry; ignoring {}",
                entry.join(",")
            ),
            None => {}
        }
        overrides.extend(named.into_iter().map(|group| {
            base.clone()
                .named(group.name.clone())
                .with_entry(group.entries.clone())
        }));
        overrides
    }
}

/// Files staged into `dist` before compiling
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Staging {
    /// Whether `dist` was emptied
    pub cleaned: bool,
    /// Bytes copied from `public`, `None` when copying was skipped
    pub copied: Option<u64>,
}

/// Empty `dist` and copy `public` into it, as requested by `args`
pub fn stage_dist<FS: FileSystem>(
    ctx: &InvocationContext,
    args: &BuildArgs,
    fs: &FS,
) -> Result<Staging, JmError> {
    let paths = &ctx.paths;

    if !args.dont_clean {
        empty_dir(fs, &paths.app_dist).map_err(|source| JmError::Io {
            context: format!("emptying {}", paths.app_dist.display()),
            source,
        })?;
    }
    let copied = if args.dont_copy {
        None
    } else {
        let bytes = copy_dir(fs, &paths.app_public, &paths.app_dist).map_err(|source| {
            JmError::Io {
                context: format!("copying {}", paths.app_public.display()),
                source,
            }
        })?;
        Some(bytes)
    };

    Ok(Staging {
        cleaned: !args.dont_clean,
        copied,
    })
}

/// Compose every configuration named by `args`
pub fn build_configurations<FS: FileSystem>(
    ctx: &InvocationContext,
    args: &BuildArgs,
    fs: &FS,
) -> Result<Vec<BundlerConfiguration>> {
    args.overrides()
        .iter()
        .map(|overrides| compose_with_fs(ctx, overrides, fs))
        .collect()
}

/// Stage `dist`, compose and compile through `bundler`
pub fn run_build<B: Bundler + ?Sized, FS: FileSystem>(
    ctx: &InvocationContext,
    args: &BuildArgs,
    bundler: &B,
    fs: &FS,
) -> Result<CompileReport> {
    let configs = build_configurations(ctx, args, fs)?;
    stage_dist(ctx, args, fs)?;
    bundler.run(&configs, &BundlerJob::Build)
}

/// Main build command handler (presentation layer)
///
/// # Examples
///
/// ```no_run
/// use jm_cli::cmd::{cmd_build, BuildArgs, GlobalArgs};
///
/// let global = GlobalArgs::new(".");
/// cmd_build(&global, &BuildArgs::default())?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn cmd_build(global: &GlobalArgs, args: &BuildArgs) -> Result<()> {
    let ctx = InvocationContext::load(&global.project_root, BuildMode::Production)?;
    let fs = RealFileSystem;
    let configs = build_configurations(&ctx, args, &fs)?;

    if global.inspect {
        return print_inspection(&ctx, None, &configs);
    }

    println!(
        "{} {} Production build",
        HAMMER,
        style(&ctx.manifest.name).bold()
    );
    println!();

    let bundler = global.locate_bundler(&ctx)?;
    let staging = stage_dist(&ctx, args, &fs)?;
    present_staging(&staging);
    present_configurations(&configs);

    let started = std::time::Instant::now();
    let spinner = Spinner::new("Creating an optimized production build...");
    match bundler.run(&configs, &BundlerJob::Build) {
        Ok(report) => {
            spinner.finish("Compiled successfully.");
            if !report.output.trim().is_empty() {
                println!("{}", report.output.trim_end());
            }
        }
        Err(e) => {
            spinner.fail("Failed to compile.");
            return Err(e);
        }
    }

    println!();
    println!(
        "{} Done in {:.2}s!",
        SPARKLES,
        started.elapsed().as_secs_f64()
    );
    Ok(())
}

fn present_staging(staging: &Staging) {
    if staging.cleaned {
        println!("   {} Cleaned dist", style("•").dim());
    }
    if let Some(bytes) = staging.copied {
        println!(
            "   {} Copied public ({})",
            style("•").dim(),
            format_bytes(bytes)
        );
    }
}

fn present_configurations(configs: &[BundlerConfiguration]) {
    for config in configs {
        let label = config.name.as_deref().unwrap_or(DEFAULT_GROUP);
        println!(
            "{} {}: {}",
            CHECKMARK,
            style(label).cyan(),
            page_list(config.entry.keys().map(String::as_str))
        );
    }
    println!();
}
