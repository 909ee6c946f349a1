//! Backup and restore handlers.

use std::path::PathBuf;

use chrono::Utc;
use netledger_core::{Backup, InventoryStore, RestoreReport, parse_backup};

use crate::cli::{BackupArgs, GlobalOpts, RestoreArgs};
use crate::config::Config;
use crate::error::CliError;
use crate::output;

use super::util;

fn default_backup_path(cfg: &Config) -> PathBuf {
    cfg.backup_dir_path().join(format!(
        "netledger-backup-{}.json",
        Utc::now().format("%Y-%m-%d")
    ))
}

pub fn backup(
    store: &InventoryStore,
    args: BackupArgs,
    global: &GlobalOpts,
    cfg: &Config,
) -> Result<(), CliError> {
    let backup = Backup::from_inventory(&store.snapshot());
    let path = args.out.unwrap_or_else(|| default_backup_path(cfg));
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, backup.to_json()?)?;

    output::notice(
        &format!(
            "Backed up {} VLAN(s), {} range(s), {} address(es), {} device(s) to {}",
            backup.data.vlans.len(),
            backup.data.ip_ranges.len(),
            backup.data.ip_addresses.len(),
            backup.data.devices.len(),
            path.display()
        ),
        global.quiet,
    );
    Ok(())
}

fn summary(report: &RestoreReport) -> String {
    let mut lines = vec![format!(
        "Restored {} VLAN(s), {} range(s), {} device(s), {} manual address(es), {} reservation(s)",
        report.vlans, report.ip_ranges, report.devices, report.manual_ips, report.reserved
    )];
    if !report.failures.is_empty() {
        lines.push(format!("{} record(s) could not be restored:", report.failures.len()));
        lines.extend(report.failures.iter().map(|f| format!("  {f}")));
    }
    lines.join("\n")
}

pub fn restore(
    store: &InventoryStore,
    args: &RestoreArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let parsed = parse_backup(&std::fs::read_to_string(&args.file)?)?;

    let taken = parsed
        .exported_at
        .as_deref()
        .map_or_else(String::new, |at| format!(" taken {at}"));
    if !util::confirm(
        &format!(
            "Replace all VLANs, ranges, addresses and devices with the backup{taken}?"
        ),
        "restore",
        global.yes,
    )? {
        return Ok(());
    }

    let report = store.restore(&parsed)?;
    let out = output::render_single(global.format(), &report, summary, |r| {
        r.devices.to_string()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
