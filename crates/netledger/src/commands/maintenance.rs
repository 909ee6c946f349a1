//! Whole-inventory commands: stats, clear, check.

use netledger_core::{InventoryStats, InventoryStore};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util;

fn stats_detail(s: &InventoryStats) -> String {
    output::detail_lines(&[
        ("Devices", s.devices.to_string()),
        ("IP addresses", s.total_ips.to_string()),
        ("  available", s.available.to_string()),
        ("  assigned", s.assigned.to_string()),
        ("  reserved", s.reserved.to_string()),
        ("VLANs", s.vlans.to_string()),
        ("Ranges", s.ranges.to_string()),
        ("Other devices", s.other_devices.to_string()),
    ])
}

pub fn stats(store: &InventoryStore, global: &GlobalOpts) -> Result<(), CliError> {
    let stats = InventoryStats::from(store.snapshot().as_ref());
    let out = output::render_single(global.format(), &stats, stats_detail, |s| {
        s.total_ips.to_string()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub fn clear(store: &InventoryStore, global: &GlobalOpts) -> Result<(), CliError> {
    if !util::confirm(
        "Delete every VLAN, range, address and device?",
        "clear",
        global.yes,
    )? {
        return Ok(());
    }
    store.clear_all_data();
    output::notice("Inventory cleared", global.quiet);
    Ok(())
}

/// List binding problems; any problem makes the command fail.
pub fn check(store: &InventoryStore, global: &GlobalOpts) -> Result<(), CliError> {
    let problems = store.snapshot().check_consistency();
    if problems.is_empty() {
        output::notice("No problems found", global.quiet);
        return Ok(());
    }
    let out = output::render_single(
        global.format(),
        &problems,
        |p| p.join("\n"),
        |p| p.join("\n"),
    )?;
    output::print_output(&out, global.quiet);
    Err(CliError::Inconsistent {
        count: problems.len(),
    })
}
