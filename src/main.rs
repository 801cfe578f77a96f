//! eventwire CLI entry point

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use eventwire::commands::{
    run_add, run_delete_component, run_list, run_menu, run_remove, CommandContext,
};
use eventwire::{Cli, Commands, EventwireConfig};

fn main() -> ExitCode {
    match run() {
        Ok(output) => {
            print!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    }
}

fn run() -> eventwire::Result<String> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EventwireConfig::load_from(path)?,
        None => EventwireConfig::load()?,
    };
    init_tracing(&config, cli.verbose);

    let ctx = CommandContext::new(cli.format, cli.verbose, config, cli.classpath.clone());

    match &cli.command {
        Commands::List(args) => run_list(args, &ctx),
        Commands::Menu(args) => run_menu(args, &ctx),
        Commands::Add(args) => run_add(args, &ctx),
        Commands::Remove(args) => run_remove(args, &ctx),
        Commands::DeleteComponent(args) => run_delete_component(args, &ctx),
    }
}

/// Logs go to stderr. `EVENTWIRE_LOG` (or `RUST_LOG`) overrides the
/// configured level.
fn init_tracing(config: &EventwireConfig, verbose: bool) {
    let level = if verbose { "debug" } else { config.logging.level.as_str() };
    let filter = EnvFilter::try_from_env("EVENTWIRE_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(format!("eventwire={}", level)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
