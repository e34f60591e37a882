mod commands;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use commands::{EXIT_DESCRIPTOR_ERROR, EXIT_FAILURE, EXIT_RESOLVE_ERROR};
use std::path::PathBuf;
use std::process::ExitCode;
use whelk_core::{Engine, PlanOptions};
use whelk_resolver::select_resolver;

#[derive(Debug, Parser)]
#[command(
    name = "whelk",
    version,
    about = "Declarative shell-environment activator"
)]
struct Cli {
    /// Path to the package catalog file.
    #[arg(long, default_value = "~/.local/share/whelk/catalog.toml", global = true)]
    catalog: String,

    /// Resolver to use ('catalog' or 'mock').
    #[arg(long, default_value = "catalog", global = true)]
    resolver: String,

    /// Output results as structured JSON.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Enable verbose (debug) logging output.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    /// Enable trace-level logging (more detailed than --verbose).
    #[arg(long, default_value_t = false, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scaffold a whelk.toml descriptor from a built-in preset.
    New {
        /// Environment name written into the descriptor.
        name: String,
        /// Preset to start from (see 'whelk presets').
        #[arg(long)]
        preset: Option<String>,
        /// Overwrite an existing descriptor without asking.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
    /// Parse and validate a descriptor without resolving anything.
    Check {
        /// Path to descriptor TOML file.
        #[arg(default_value = "whelk.toml")]
        descriptor: PathBuf,
    },
    /// Resolve a descriptor and print the activation plan.
    Plan {
        /// Path to descriptor TOML file.
        #[arg(default_value = "whelk.toml")]
        descriptor: PathBuf,
        /// Require an existing lock file and fail if the plan would drift.
        #[arg(long, default_value_t = false)]
        locked: bool,
        /// Fetch and checksum-verify every pinned source in the plan.
        #[arg(long, default_value_t = false)]
        verify_sources: bool,
        /// Write whelk.lock next to the descriptor after planning.
        #[arg(long, default_value_t = false)]
        write_lock: bool,
    },
    /// Resolve a descriptor and write whelk.lock.
    Lock {
        /// Path to descriptor TOML file.
        #[arg(default_value = "whelk.toml")]
        descriptor: PathBuf,
        /// Fetch and checksum-verify every pinned source in the plan.
        #[arg(long, default_value_t = false)]
        verify_sources: bool,
    },
    /// Activate an environment and enter an interactive shell.
    Shell {
        /// Path to descriptor TOML file.
        #[arg(default_value = "whelk.toml")]
        descriptor: PathBuf,
        /// Require an existing lock file and fail if the plan would drift.
        #[arg(long, default_value_t = false)]
        locked: bool,
        /// Ad-hoc packages appended after the descriptor's list. With no
        /// descriptor file present, builds a pure ad-hoc environment.
        #[arg(short, long = "package")]
        packages: Vec<String>,
    },
    /// Activate an environment and run a command (after --).
    Run {
        /// Path to descriptor TOML file.
        #[arg(default_value = "whelk.toml")]
        descriptor: PathBuf,
        /// Require an existing lock file and fail if the plan would drift.
        #[arg(long, default_value_t = false)]
        locked: bool,
        /// Ad-hoc packages appended after the descriptor's list.
        #[arg(short, long = "package")]
        packages: Vec<String>,
        /// Command and arguments to run.
        #[arg(required = true, last = true)]
        command: Vec<String>,
    },
    /// List built-in presets.
    Presets,
    /// Generate shell completions for bash, zsh, fish, elvish, or powershell.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

fn main() -> ExitCode {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let msg = info.to_string();
        if msg.contains("Broken pipe")
            || msg.contains("broken pipe")
            || msg.contains("os error 32")
            || msg.contains("failed printing to stdout")
        {
            std::process::exit(0);
        }
        default_hook(info);
    }));

    let cli = Cli::parse();

    let default_level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("WHELK_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .init();

    let catalog_path = expand_tilde(&cli.catalog);
    let engine = match select_resolver(&cli.resolver, &catalog_path) {
        Ok(resolver) => Engine::new(resolver),
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(EXIT_FAILURE);
        }
    };
    let json_output = cli.json;

    let result = match cli.command {
        Commands::New {
            name,
            preset,
            force,
        } => commands::new::run(&name, preset.as_deref(), force, json_output),
        Commands::Check { descriptor } => commands::check::run(&engine, &descriptor, json_output),
        Commands::Plan {
            descriptor,
            locked,
            verify_sources,
            write_lock,
        } => commands::plan::run(
            &engine,
            &descriptor,
            &PlanOptions {
                locked,
                verify_sources,
                extra_packages: Vec::new(),
            },
            write_lock,
            json_output,
        ),
        Commands::Lock {
            descriptor,
            verify_sources,
        } => commands::lock::run(
            &engine,
            &descriptor,
            &PlanOptions {
                verify_sources,
                ..PlanOptions::default()
            },
            json_output,
        ),
        Commands::Shell {
            descriptor,
            locked,
            packages,
        } => commands::shell::run(&engine, &descriptor, locked, packages),
        Commands::Run {
            descriptor,
            locked,
            packages,
            command,
        } => commands::run::run(&engine, &descriptor, locked, packages, &command),
        Commands::Presets => commands::presets::run(json_output),
        Commands::Completions { shell } => commands::completions::run::<Cli>(shell),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(msg) => {
            eprintln!("error: {msg}");
            let code = if msg.starts_with("descriptor error:")
                || msg.starts_with("failed to parse descriptor")
                || msg.starts_with("failed to read descriptor")
            {
                EXIT_DESCRIPTOR_ERROR
            } else if msg.starts_with("resolve error:") || msg.starts_with("lock error:") {
                EXIT_RESOLVE_ERROR
            } else {
                EXIT_FAILURE
            };
            ExitCode::from(code)
        }
    }
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(stripped);
        }
    }
    PathBuf::from(path)
}
