// ── Backup and restore ──
//
// Backups are `{ version: 1, exportedAt, data: { devices, ipAddresses,
// ipRanges, vlans } }`. Restore does not trust stored ids or bindings:
// it replays the records through the regular store operations onto an
// empty inventory, remapping VLAN references to the recreated VLANs.

use std::collections::HashMap;
use std::net::Ipv4Addr;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::addr;
use crate::error::CoreError;
use crate::model::{Device, DeviceType, EntityId, IpAddress, IpRange, IpStatus, RangeRef, Vlan};
use crate::requests::{NewDevice, NewIpRange, NewVlan, RangeBounds};
use crate::store::{Inventory, InventoryStore};

/// Format version written into new backups.
pub const BACKUP_VERSION: u32 = 1;

// ── Writing ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupData {
    pub devices: Vec<Device>,
    pub ip_addresses: Vec<IpAddress>,
    pub ip_ranges: Vec<IpRange>,
    pub vlans: Vec<Vlan>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    pub data: BackupData,
}

impl Backup {
    pub fn from_inventory(inv: &Inventory) -> Self {
        Self {
            version: BACKUP_VERSION,
            exported_at: Utc::now(),
            data: BackupData {
                devices: inv.devices().cloned().collect(),
                ip_addresses: inv.ip_addresses().cloned().collect(),
                ip_ranges: inv.ip_ranges().cloned().collect(),
                vlans: inv.vlans().cloned().collect(),
            },
        }
    }

    pub fn to_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// ── Reading ─────────────────────────────────────────────────────────

/// A structurally valid backup whose records have not been checked yet.
#[derive(Debug, Clone)]
pub struct ParsedBackup {
    pub version: u64,
    pub exported_at: Option<String>,
    pub devices: Vec<Value>,
    pub ip_addresses: Vec<Value>,
    pub ip_ranges: Vec<Value>,
    pub vlans: Vec<Value>,
}

fn backup_error(message: &str) -> CoreError {
    CoreError::Backup {
        message: message.to_owned(),
    }
}

fn section(data: &Value, key: &str) -> Option<Vec<Value>> {
    data.get(key).and_then(Value::as_array).cloned()
}

/// Check the envelope of a backup document. Individual records are
/// validated during restore.
pub fn parse_backup(text: &str) -> Result<ParsedBackup, CoreError> {
    let doc: Value = serde_json::from_str(text)
        .map_err(|e| backup_error(&format!("not valid JSON ({e})")))?;

    let version = doc
        .get("version")
        .and_then(Value::as_u64)
        .filter(|v| *v != 0)
        .ok_or_else(|| backup_error("missing or zero version"))?;
    let data = doc
        .get("data")
        .filter(|d| d.is_object())
        .ok_or_else(|| backup_error("missing data section"))?;

    let (Some(devices), Some(ip_addresses), Some(vlans)) = (
        section(data, "devices"),
        section(data, "ipAddresses"),
        section(data, "vlans"),
    ) else {
        return Err(backup_error("missing required data sections"));
    };

    Ok(ParsedBackup {
        version,
        exported_at: doc
            .get("exportedAt")
            .and_then(Value::as_str)
            .map(str::to_owned),
        devices,
        ip_addresses,
        ip_ranges: section(data, "ipRanges").unwrap_or_default(),
        vlans,
    })
}

// ── Restore ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VlanRecord {
    id: Option<EntityId>,
    vlan_id: u16,
    name: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RangeRecord {
    name: String,
    #[serde(default)]
    start_ip: String,
    #[serde(default)]
    end_ip: String,
    cidr: Option<String>,
    vlan_id: Option<EntityId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeviceRecord {
    name: String,
    #[serde(rename = "type", default)]
    device_type: DeviceType,
    #[serde(default)]
    location: String,
    vlan_id: Option<EntityId>,
    mac_address: Option<String>,
    assigned_ip: Option<String>,
    switch_ip: Option<String>,
    #[serde(default)]
    notes: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddressRecord {
    address: String,
    status: Option<IpStatus>,
    range_id: Option<RangeRef>,
    vlan_id: Option<EntityId>,
}

/// What a restore recreated, and what it could not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreReport {
    pub vlans: usize,
    pub ip_ranges: usize,
    pub devices: usize,
    pub manual_ips: usize,
    pub reserved: usize,
    pub failures: Vec<String>,
}

fn decode<T: DeserializeOwned>(value: &Value, kind: &str, failures: &mut Vec<String>) -> Option<T> {
    match serde_json::from_value(value.clone()) {
        Ok(record) => Some(record),
        Err(e) => {
            failures.push(format!("{kind}: unreadable record ({e})"));
            None
        }
    }
}

fn parse_ip_field(raw: Option<&str>) -> Option<Ipv4Addr> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(addr::parse_ipv4)
}

/// Build the inventory a backup describes, keeping the auxiliary
/// equipment catalog of `base`.
pub fn rebuild(base: &Inventory, backup: &ParsedBackup) -> (Inventory, RestoreReport) {
    let mut inv = base.clone();
    inv.clear_all_data();
    let mut report = RestoreReport::default();
    let mut vlan_map: HashMap<EntityId, EntityId> = HashMap::new();
    let remap = |map: &HashMap<EntityId, EntityId>, old: Option<EntityId>| {
        old.and_then(|id| map.get(&id).cloned())
    };

    for value in &backup.vlans {
        let Some(record) = decode::<VlanRecord>(value, "VLAN", &mut report.failures) else {
            continue;
        };
        let tag = record.vlan_id;
        match inv.add_vlan(NewVlan {
            vlan_id: tag,
            name: record.name,
            description: record.description,
        }) {
            Ok(vlan) => {
                if let Some(old) = record.id {
                    vlan_map.insert(old, vlan.id);
                }
                report.vlans += 1;
            }
            Err(e) => report.failures.push(format!("VLAN {tag}: {e}")),
        }
    }

    for value in &backup.ip_ranges {
        let Some(record) = decode::<RangeRecord>(value, "IP range", &mut report.failures) else {
            continue;
        };
        let bounds = match (
            record.cidr.as_deref().filter(|c| addr::parse_cidr(c).is_some()),
            addr::parse_ipv4(&record.start_ip),
            addr::parse_ipv4(&record.end_ip),
        ) {
            (Some(cidr), _, _) => RangeBounds::Cidr(cidr.to_owned()),
            (None, Some(start), Some(end)) => RangeBounds::StartEnd { start, end },
            _ => {
                report
                    .failures
                    .push(format!("IP range \"{}\": invalid bounds", record.name));
                continue;
            }
        };
        let name = record.name.clone();
        match inv.add_ip_range(NewIpRange {
            name: record.name,
            bounds,
            vlan_id: remap(&vlan_map, record.vlan_id),
        }) {
            Ok(_) => report.ip_ranges += 1,
            Err(e) => report.failures.push(format!("IP range \"{name}\": {e}")),
        }
    }

    for value in &backup.devices {
        let Some(record) = decode::<DeviceRecord>(value, "Device", &mut report.failures) else {
            continue;
        };
        let vlan_id = remap(&vlan_map, record.vlan_id);
        let assigned_ip = parse_ip_field(record.assigned_ip.as_deref());
        if let Some(address) = assigned_ip {
            if let Ok(manual) = inv.add_manual_ip(address, vlan_id.clone()) {
                if manual.created {
                    report.manual_ips += 1;
                }
            }
        }
        let name = record.name.clone();
        match inv.add_device(NewDevice {
            name: record.name,
            device_type: record.device_type,
            location: record.location,
            vlan_id,
            mac_address: record.mac_address,
            assigned_ip,
            switch_ip: parse_ip_field(record.switch_ip.as_deref()),
            notes: record.notes,
        }) {
            Ok(_) => report.devices += 1,
            Err(e) => report.failures.push(format!("Device \"{name}\": {e}")),
        }
    }

    // Addresses: bring back stand-alone manual entries and reservations.
    for value in &backup.ip_addresses {
        let Some(record) = decode::<AddressRecord>(value, "IP address", &mut report.failures)
        else {
            continue;
        };
        let Some(address) = addr::parse_ipv4(&record.address) else {
            report
                .failures
                .push(format!("IP address {}: invalid address", record.address));
            continue;
        };
        if record.range_id.as_ref().is_some_and(RangeRef::is_manual) {
            if let Ok(manual) = inv.add_manual_ip(address, remap(&vlan_map, record.vlan_id)) {
                if manual.created {
                    report.manual_ips += 1;
                }
            }
        }
        if record.status == Some(IpStatus::Reserved) {
            let free = inv
                .ip_by_address(address)
                .filter(|ip| !ip.is_bound())
                .map(|ip| ip.id.clone());
            if let Some(id) = free {
                if inv.update_ip_status(&id, IpStatus::Reserved).is_ok() {
                    report.reserved += 1;
                }
            }
        }
    }

    (inv, report)
}

impl InventoryStore {
    /// Replace the allocation data with the contents of a backup in a
    /// single transition.
    pub fn restore(&self, backup: &ParsedBackup) -> Result<RestoreReport, CoreError> {
        let report = self.transaction(|inv| {
            let (rebuilt, report) = rebuild(inv, backup);
            *inv = rebuilt;
            Ok(report)
        })?;
        info!(
            vlans = report.vlans,
            ip_ranges = report.ip_ranges,
            devices = report.devices,
            failures = report.failures.len(),
            "backup restored"
        );
        Ok(report)
    }
}
