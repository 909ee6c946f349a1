// ── Read-side projections ──
//
// Dashboard rows, filtering and sorting, plus aggregate counts. Pure
// functions over an inventory snapshot.

use std::cmp::Ordering;
use std::net::Ipv4Addr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use strum::{Display, EnumIter, EnumString};

use crate::model::{EntityId, IpRange, IpStatus, Vlan};
use crate::store::Inventory;

// ── Dashboard ───────────────────────────────────────────────────────

/// One dashboard line: either a device holding an address, or an
/// address nobody holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardRow {
    pub ip_address: Ipv4Addr,
    pub ip_id: Option<EntityId>,
    pub device_id: Option<EntityId>,
    pub device_name: String,
    pub location: String,
    pub vlan_id: Option<EntityId>,
    pub vlan_tag: Option<u16>,
    pub vlan_name: Option<String>,
    pub status: IpStatus,
    pub switch_ip: Option<Ipv4Addr>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl DashboardRow {
    pub fn vlan_label(&self) -> Option<String> {
        match (self.vlan_tag, &self.vlan_name) {
            (Some(tag), Some(name)) => Some(format!("VLAN {tag} - {name}")),
            _ => None,
        }
    }
}

fn vlan_parts(inv: &Inventory, vlan_id: Option<&EntityId>) -> (Option<u16>, Option<String>) {
    match vlan_id.and_then(|id| inv.vlan(id)) {
        Some(Vlan { vlan_id, name, .. }) => (Some(*vlan_id), Some(name.clone())),
        None => (None, None),
    }
}

/// Devices with an address first, then every unbound address.
pub fn dashboard_rows(inv: &Inventory) -> Vec<DashboardRow> {
    let assigned = inv.devices().filter_map(|device| {
        let address = device.assigned_ip?;
        let ip = inv.ip_by_address(address);
        let (vlan_tag, vlan_name) = vlan_parts(inv, device.vlan_id.as_ref());
        Some(DashboardRow {
            ip_address: address,
            ip_id: ip.map(|i| i.id.clone()),
            device_id: Some(device.id.clone()),
            device_name: device.name.clone(),
            location: device.location.clone(),
            vlan_id: device.vlan_id.clone(),
            vlan_tag,
            vlan_name,
            status: ip.map_or(IpStatus::Assigned, |i| i.status),
            switch_ip: device.switch_ip,
            assigned_at: device.assigned_at.or_else(|| ip.and_then(|i| i.assigned_at)),
            created_at: device.created_at,
        })
    });

    let unbound = inv.ip_addresses().filter(|ip| !ip.is_bound()).map(|ip| {
        let (vlan_tag, vlan_name) = vlan_parts(inv, ip.vlan_id.as_ref());
        DashboardRow {
            ip_address: ip.address,
            ip_id: Some(ip.id.clone()),
            device_id: None,
            device_name: String::new(),
            location: String::new(),
            vlan_id: ip.vlan_id.clone(),
            vlan_tag,
            vlan_name,
            status: ip.status,
            switch_ip: None,
            assigned_at: ip.assigned_at,
            created_at: ip.created_at,
        }
    });

    assigned.chain(unbound).collect()
}

/// Dashboard filter. Empty fields match everything.
#[derive(Debug, Clone, Default)]
pub struct DashboardFilter {
    /// Address or switch address substring, or case-insensitive device
    /// name or location substring.
    pub search: Option<String>,
    pub status: Option<IpStatus>,
    pub vlan: Option<EntityId>,
}

impl DashboardFilter {
    pub fn matches(&self, row: &DashboardRow) -> bool {
        if let Some(status) = self.status {
            if row.status != status {
                return false;
            }
        }
        if let Some(vlan) = &self.vlan {
            if row.vlan_id.as_ref() != Some(vlan) {
                return false;
            }
        }
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let lower = term.to_lowercase();
                row.ip_address.to_string().contains(term)
                    || row.device_name.to_lowercase().contains(&lower)
                    || row.location.to_lowercase().contains(&lower)
                    || row.switch_ip.is_some_and(|s| s.to_string().contains(term))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "camelCase", ascii_case_insensitive)]
pub enum SortField {
    #[default]
    Ip,
    Device,
    Location,
    Vlan,
    Status,
    AssignedAt,
    SwitchIp,
    CreatedAt,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

fn compare(a: &DashboardRow, b: &DashboardRow, field: SortField) -> Ordering {
    match field {
        SortField::Ip => a.ip_address.cmp(&b.ip_address),
        SortField::Device => a.device_name.to_lowercase().cmp(&b.device_name.to_lowercase()),
        SortField::Location => a.location.to_lowercase().cmp(&b.location.to_lowercase()),
        SortField::Vlan => a.vlan_tag.unwrap_or(0).cmp(&b.vlan_tag.unwrap_or(0)),
        SortField::Status => a.status.to_string().cmp(&b.status.to_string()),
        SortField::AssignedAt => a.assigned_at.cmp(&b.assigned_at),
        SortField::SwitchIp => a.switch_ip.cmp(&b.switch_ip),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
    }
}

/// Stable sort; rows that compare equal keep their dashboard order.
pub fn sort_rows(rows: &mut [DashboardRow], field: SortField, direction: SortDirection) {
    rows.sort_by(|a, b| {
        let ord = compare(a, b, field);
        match direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
}

/// Build, filter and sort the dashboard in one call.
pub fn dashboard(
    inv: &Inventory,
    filter: &DashboardFilter,
    field: SortField,
    direction: SortDirection,
) -> Vec<DashboardRow> {
    let mut rows: Vec<_> = dashboard_rows(inv)
        .into_iter()
        .filter(|r| filter.matches(r))
        .collect();
    sort_rows(&mut rows, field, direction);
    rows
}

// ── Aggregates ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryStats {
    pub devices: usize,
    pub total_ips: usize,
    pub available: usize,
    pub assigned: usize,
    pub reserved: usize,
    pub vlans: usize,
    pub ranges: usize,
    pub other_devices: usize,
}

impl From<&Inventory> for InventoryStats {
    fn from(inv: &Inventory) -> Self {
        let mut stats = Self {
            devices: inv.devices().count(),
            vlans: inv.vlans().count(),
            ranges: inv.ip_ranges().count(),
            other_devices: inv.other_devices().count(),
            ..Self::default()
        };
        for ip in inv.ip_addresses() {
            stats.total_ips += 1;
            match ip.status {
                IpStatus::Available => stats.available += 1,
                IpStatus::Assigned => stats.assigned += 1,
                IpStatus::Reserved => stats.reserved += 1,
            }
        }
        stats
    }
}

/// Status breakdown of one range's addresses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeUsage {
    pub total: usize,
    pub available: usize,
    pub assigned: usize,
    pub reserved: usize,
}

impl RangeUsage {
    pub fn of(inv: &Inventory, range: &IpRange) -> Self {
        let mut usage = Self::default();
        for ip in inv.ips_by_range(&range.id) {
            usage.total += 1;
            match ip.status {
                IpStatus::Available => usage.available += 1,
                IpStatus::Assigned => usage.assigned += 1,
                IpStatus::Reserved => usage.reserved += 1,
            }
        }
        usage
    }
}
