//! Analyze command implementation
//!
//! Composes the production configuration and asks the bundler to compile it
//! without emitting files and open its bundle analyzer.

use anyhow::Result;
use console::style;

use crate::bundler::{Bundler, BundlerJob, CompileReport};
use crate::cmd::inspect::print_inspection;
use crate::cmd::GlobalArgs;
use crate::config::{compose_with_fs, BuildMode, BundlerConfiguration, Overrides};
use crate::context::InvocationContext;
use crate::fmt::{Spinner, MICROSCOPE};
use crate::infra::{FileSystem, RealFileSystem};

/// Production configuration restricted to `entry`
pub fn analyze_configuration<FS: FileSystem>(
    ctx: &InvocationContext,
    entry: Option<&[String]>,
    fs: &FS,
) -> Result<BundlerConfiguration> {
    let mut overrides = Overrides::new(BuildMode::Production);
    if let Some(entry) = entry {
        overrides = overrides.with_entry(entry.to_vec());
    }
    compose_with_fs(ctx, &overrides, fs)
}

/// Compose and analyze through `bundler`
pub fn run_analyze<B: Bundler + ?Sized, FS: FileSystem>(
    ctx: &InvocationContext,
    entry: Option<&[String]>,
    bundler: &B,
    fs: &FS,
) -> Result<CompileReport> {
    let config = analyze_configuration(ctx, entry, fs)?;
    bundler.run(&[config], &BundlerJob::Analyze)
}

/// Main analyze command handler
pub fn cmd_analyze(global: &GlobalArgs, entry: Option<&[String]>) -> Result<()> {
    let ctx = InvocationContext::load(&global.project_root, BuildMode::Production)?;
    let config = analyze_configuration(&ctx, entry, &RealFileSystem)?;

    if global.inspect {
        return print_inspection(&ctx, None, std::slice::from_ref(&config));
    }

    println!(
        "{} {} Bundle analysis",
        MICROSCOPE,
        style(&ctx.manifest.name).bold()
    );
    println!();

    let bundler = global.locate_bundler(&ctx)?;
    let spinner = Spinner::new("Extracting bundle stats...");
    match bundler.run(std::slice::from_ref(&config), &BundlerJob::Analyze) {
        Ok(report) => {
            spinner.finish("Extract successfully.");
            if !report.output.trim().is_empty() {
                println!("{}", report.output.trim_end());
            }
            Ok(())
        }
        Err(e) => {
            spinner.fail("Failed to compile.");
            Err(e)
        }
    }
}
