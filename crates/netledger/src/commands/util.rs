//! Shared helpers for command handlers.

use std::io::IsTerminal;

use chrono::{DateTime, Utc};
use netledger_core::addr;
use netledger_core::{
    Device, DeviceType, EntityId, Inventory, IpAddress, IpRange, IpStatus, OtherDevice, Vlan,
};

use crate::cli::StatusArg;
use crate::error::CliError;

// ── Identifier resolution ───────────────────────────────────────────

/// Resolve a VLAN by numeric tag, falling back to its ID.
pub fn resolve_vlan<'a>(inv: &'a Inventory, identifier: &str) -> Result<&'a Vlan, CliError> {
    let identifier = identifier.trim();
    let found = match identifier.parse::<u16>() {
        Ok(tag) => inv.vlan_by_tag(tag),
        Err(_) => inv.vlan(&EntityId::from(identifier)),
    };
    found.ok_or_else(|| CliError::not_found("VLAN", identifier))
}

/// Resolve an optional `--vlan` flag to the VLAN's ID.
pub fn resolve_vlan_id(
    inv: &Inventory,
    identifier: Option<&str>,
) -> Result<Option<EntityId>, CliError> {
    identifier
        .map(|v| resolve_vlan(inv, v).map(|vlan| vlan.id.clone()))
        .transpose()
}

/// Resolve a range by ID or case-insensitive name.
pub fn resolve_range<'a>(inv: &'a Inventory, identifier: &str) -> Result<&'a IpRange, CliError> {
    let identifier = identifier.trim();
    inv.ip_range(&EntityId::from(identifier))
        .or_else(|| {
            inv.ip_ranges()
                .find(|r| r.name.eq_ignore_ascii_case(identifier))
        })
        .ok_or_else(|| CliError::not_found("IP range", identifier))
}

/// Resolve an address record by dotted quad or ID.
pub fn resolve_ip<'a>(inv: &'a Inventory, identifier: &str) -> Result<&'a IpAddress, CliError> {
    let identifier = identifier.trim();
    let found = match addr::parse_ipv4(identifier) {
        Some(address) => inv.ip_by_address(address),
        None => inv.ip_address(&EntityId::from(identifier)),
    };
    found.ok_or_else(|| CliError::not_found("IP address", identifier))
}

/// Resolve a device by ID, assigned address, or name.
pub fn resolve_device<'a>(inv: &'a Inventory, identifier: &str) -> Result<&'a Device, CliError> {
    let identifier = identifier.trim();
    inv.device(&EntityId::from(identifier))
        .or_else(|| {
            addr::parse_ipv4(identifier).and_then(|address| inv.device_by_ip(address))
        })
        .or_else(|| inv.device_by_name(identifier))
        .ok_or_else(|| CliError::not_found("Device", identifier))
}

/// Resolve an auxiliary equipment entry by ID or name.
pub fn resolve_other<'a>(
    inv: &'a Inventory,
    identifier: &str,
) -> Result<&'a OtherDevice, CliError> {
    let identifier = identifier.trim();
    inv.other_device(&EntityId::from(identifier))
        .or_else(|| {
            inv.other_devices()
                .find(|o| o.name.eq_ignore_ascii_case(identifier))
        })
        .ok_or_else(|| CliError::not_found("Other device", identifier))
}

// ── Value parsing ───────────────────────────────────────────────────

pub fn status(arg: StatusArg) -> IpStatus {
    match arg {
        StatusArg::Available => IpStatus::Available,
        StatusArg::Assigned => IpStatus::Assigned,
        StatusArg::Reserved => IpStatus::Reserved,
    }
}

pub fn device_type(raw: &str) -> Result<DeviceType, CliError> {
    raw.parse().map_err(|_| CliError::Validation {
        field: "type".into(),
        reason: format!(
            "'{raw}' is not one of pc, laptop, phone, tablet, server, router, switch, \
             printer, camera, iot, other"
        ),
    })
}

// ── Display helpers ─────────────────────────────────────────────────

/// `-` for missing values in tables and detail views.
pub fn or_dash(value: Option<impl ToString>) -> String {
    value
        .as_ref()
        .map_or_else(|| "-".to_owned(), ToString::to_string)
}

pub fn when(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

pub fn maybe_when(at: Option<DateTime<Utc>>) -> String {
    at.map_or_else(|| "-".into(), when)
}

pub fn vlan_label(inv: &Inventory, vlan_id: Option<&EntityId>) -> String {
    vlan_id
        .and_then(|id| inv.vlan(id))
        .map_or_else(|| "-".into(), Vlan::label)
}

// ── Interaction ─────────────────────────────────────────────────────

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}
