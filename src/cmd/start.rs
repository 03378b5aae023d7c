//! Start command implementation
//!
//! Composes the development configuration and hands it to the bundler's
//! dev server. In electron mode the main-process configuration is composed
//! alongside the renderer.

use anyhow::Result;
use console::style;

use crate::bundler::{Bundler, BundlerJob, CompileReport};
use crate::cmd::inspect::print_inspection;
use crate::cmd::GlobalArgs;
use crate::config::{
    compose_electron_main, compose_with_fs, dev_server_config, BuildMode, BundlerConfiguration,
    DevServerConfig, Overrides,
};
use crate::context::InvocationContext;
use crate::error::JmError;
use crate::fmt::{page_list, INFO, ROCKET};
use crate::infra::{FileSystem, RealFileSystem};
use crate::paths::Paths;
use crate::proxy::describe_proxy;

/// Options of `jm start`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartArgs {
    /// Pages to serve, every page when `None`
    pub entry: Option<Vec<String>>,
}

/// Fail with [`JmError::ElectronMissing`] unless `electron` is installed
pub fn check_electron<FS: FileSystem>(fs: &FS, paths: &Paths) -> Result<(), JmError> {
    let manifest = paths
        .app_node_modules
        .join("electron")
        .join("package.json");
    if fs.exists(&manifest) {
        Ok(())
    } else {
        Err(JmError::ElectronMissing)
    }
}

/// Configurations served by `jm start`: the renderer last, preceded by the
/// electron main process when enabled
pub fn start_configurations<FS: FileSystem>(
    ctx: &InvocationContext,
    args: &StartArgs,
    fs: &FS,
) -> Result<Vec<BundlerConfiguration>> {
    let mut overrides = Overrides::new(BuildMode::Development);
    if let Some(entry) = &args.entry {
        overrides = overrides.with_entry(entry.clone());
    }

    let mut configs = Vec::with_capacity(2);
    if ctx.options.electron {
        check_electron(fs, &ctx.paths)?;
        configs.push(compose_electron_main(ctx, &overrides)?);
    }
    configs.push(compose_with_fs(ctx, &overrides, fs)?);
    Ok(configs)
}

/// Compose and serve through `bundler`
pub fn run_start<B: Bundler + ?Sized, FS: FileSystem>(
    ctx: &InvocationContext,
    args: &StartArgs,
    bundler: &B,
    fs: &FS,
) -> Result<CompileReport> {
    let configs = start_configurations(ctx, args, fs)?;
    let server = dev_server(ctx, &configs);
    bundler.run(&configs, &BundlerJob::Watch(server))
}

fn dev_server(ctx: &InvocationContext, configs: &[BundlerConfiguration]) -> DevServerConfig {
    dev_server_config(configs.last(), &ctx.env, &ctx.options, &ctx.paths)
}

/// Main start command handler
///
/// # Examples
///
/// ```no_run
/// use jm_cli::cmd::{cmd_start, GlobalArgs, StartArgs};
///
/// let global = GlobalArgs::new(".");
/// cmd_start(&global, &StartArgs::default())?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn cmd_start(global: &GlobalArgs, args: &StartArgs) -> Result<()> {
    let ctx = InvocationContext::load(&global.project_root, BuildMode::Development)?;
    let configs = start_configurations(&ctx, args, &RealFileSystem)?;
    let server = dev_server(&ctx, &configs);

    if global.inspect {
        return print_inspection(&ctx, Some(&server), &configs);
    }

    println!(
        "{} {} Development server",
        ROCKET,
        style(&ctx.manifest.name).bold()
    );
    present_server(&server, &configs);

    let bundler = global.locate_bundler(&ctx)?;
    bundler.run(&configs, &BundlerJob::Watch(server))?;
    Ok(())
}

fn present_server(server: &DevServerConfig, configs: &[BundlerConfiguration]) {
    let scheme = if server.https { "https" } else { "http" };
    println!(
        "   {} Listening on {}",
        style("•").dim(),
        style(format!("{}://{}:{}", scheme, server.host, server.port)).cyan()
    );

    if let Some(renderer) = configs.last() {
        println!(
            "   {} Pages: {}",
            style("•").dim(),
            page_list(renderer.entry.keys().map(String::as_str))
        );
    }
    if configs.len() > 1 {
        println!("   {} Electron main process enabled", style("•").dim());
    }

    if let Some(proxy) = &server.proxy {
        println!();
        println!("{} Proxy", INFO);
        for line in describe_proxy(proxy).lines() {
            println!("   {}", line);
        }
    }
    println!();
}
