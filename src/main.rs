use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use jm_cli::bundler::DEFAULT_BUNDLER;
use jm_cli::cmd::{self, BuildArgs, EntryGroup, GlobalArgs, StartArgs};
use std::path::PathBuf;
use std::process;

/// Build orchestration for multi-page front-end applications
///
/// jm discovers the pages of a project, composes a bundler configuration
/// for development or production and hands it to the bundler.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Disable emoji output (useful for CI/CD or accessibility)
    #[arg(long, global = true)]
    no_emoji: bool,

    /// Print the composed configuration as JSON instead of running the bundler
    #[arg(long, global = true)]
    inspect: bool,

    /// Bundler executable
    #[arg(long, global = true, value_name = "PROGRAM", default_value = DEFAULT_BUNDLER)]
    bundler: String,

    /// Project directory (defaults to the current directory)
    #[arg(long, global = true, value_name = "DIR")]
    cwd: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start development server
    Start {
        /// Entry names to serve, e.g. a,b
        #[arg(short, long, value_delimiter = ',')]
        entry: Option<Vec<String>>,
    },

    /// Build project for production
    Build {
        /// Entry names to build, e.g. a,b
        #[arg(short, long, value_delimiter = ',')]
        entry: Option<Vec<String>>,

        /// Entry group, repeatable: --group client=a,b --group server=c
        #[arg(short, long, value_name = "NAME=PAGES")]
        group: Vec<EntryGroup>,

        /// Don't clean the dist folder
        #[arg(long)]
        dont_clean: bool,

        /// Don't copy files in `public`
        #[arg(long)]
        dont_copy: bool,
    },

    /// Analyze the production bundle
    Analyze {
        /// Entry names to analyze, e.g. a,b
        #[arg(short, long, value_delimiter = ',')]
        entry: Option<Vec<String>>,
    },

    /// Generate or update the DLL pre-bundle
    Dll,

    /// Empty the loader caches
    Clean,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn global_args(cli: &Cli) -> std::io::Result<GlobalArgs> {
    let project_root = match &cli.cwd {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?,
    };
    Ok(GlobalArgs {
        project_root,
        inspect: cli.inspect,
        bundler: cli.bundler.clone(),
    })
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let global = global_args(&cli)?;

    match cli.command {
        None => cmd::cmd_start(&global, &StartArgs::default()),
        Some(Commands::Start { entry }) => cmd::cmd_start(&global, &StartArgs { entry }),
        Some(Commands::Build {
            entry,
            group,
            dont_clean,
            dont_copy,
        }) => cmd::cmd_build(
            &global,
            &BuildArgs {
                entry,
                groups: group,
                dont_clean,
                dont_copy,
            },
        ),
        Some(Commands::Analyze { entry }) => cmd::cmd_analyze(&global, entry.as_deref()),
        Some(Commands::Dll) => cmd::cmd_dll(&global),
        Some(Commands::Clean) => cmd::cmd_clean(&global),
        Some(Commands::Completions { shell }) => {
            cmd::cmd_completions(shell, &mut Cli::command());
            Ok(())
        }
    }
}

fn main() {
    // Initialize logger (use RUST_LOG env var to control verbosity)
    env_logger::init();

    let cli = Cli::parse();

    // Set console emoji mode based on CLI flag
    if cli.no_emoji {
        std::env::set_var("NO_EMOJI", "1");
    }

    if let Err(e) = run(cli) {
        use jm_cli::error::ErrorFormatter;
        eprintln!("{}", ErrorFormatter::format(&e));
        let exit_code = ErrorFormatter::exit_code(&e);
        process::exit(exit_code);
    }
}
