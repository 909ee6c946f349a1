mod cli;
mod commands;
mod config;
mod error;
mod output;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use netledger_core::{InventoryStore, persist};

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let Cli {
        mut global,
        command,
    } = cli;

    match command {
        // Config commands don't touch the state file
        Command::Config(args) => commands::config_cmd::handle(args, &global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "netledger", &mut std::io::stdout());
            Ok(())
        }

        // Everything else: load, apply, save if the inventory changed
        cmd => {
            let cfg = config::load_config()?;
            config::apply_defaults(&mut global, &cfg);
            let path = config::data_file(&global, &cfg);

            let store = InventoryStore::new(persist::load(&path).await?);
            let before = store.snapshot();

            tracing::debug!(command = ?cmd, path = %path.display(), "dispatching command");
            commands::dispatch(cmd, &store, &global, &cfg)?;

            let after = store.snapshot();
            if !Arc::ptr_eq(&before, &after) {
                persist::save(&path, &after).await?;
            }
            Ok(())
        }
    }
}
