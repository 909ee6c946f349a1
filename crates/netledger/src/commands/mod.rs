//! Command dispatch: bridges CLI args -> store operations -> output formatting.

pub mod backup;
pub mod config_cmd;
pub mod dashboard;
pub mod devices;
pub mod exchange;
pub mod ips;
pub mod maintenance;
pub mod others;
pub mod ranges;
pub mod util;
pub mod vlans;

use netledger_core::InventoryStore;

use crate::cli::{Command, GlobalOpts};
use crate::config::Config;
use crate::error::CliError;

/// Dispatch an inventory command to the appropriate handler.
pub fn dispatch(
    cmd: Command,
    store: &InventoryStore,
    global: &GlobalOpts,
    cfg: &Config,
) -> Result<(), CliError> {
    match cmd {
        Command::Vlans(args) => vlans::handle(store, args, global),
        Command::Ranges(args) => ranges::handle(store, args, global),
        Command::Ips(args) => ips::handle(store, args, global),
        Command::Devices(args) => devices::handle(store, args, global),
        Command::Others(args) => others::handle(store, args, global),
        Command::Dashboard(args) => dashboard::handle(store, &args.filter, global),
        Command::Stats => maintenance::stats(store, global),
        Command::Import(args) => exchange::import(store, &args, global),
        Command::Export(args) => exchange::export(store, args, global),
        Command::Backup(args) => backup::backup(store, args, global, cfg),
        Command::Restore(args) => backup::restore(store, &args, global),
        Command::Clear => maintenance::clear(store, global),
        Command::Check => maintenance::check(store, global),
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "config and completions are not inventory commands".into(),
        )),
    }
}
