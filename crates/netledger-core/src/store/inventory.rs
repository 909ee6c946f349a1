// ── Inventory: the allocation rules ──
//
// Plain owned state for VLANs, ranges, addresses, devices and the
// auxiliary equipment catalog. Every operation validates completely
// before it touches anything, so an `Err` always leaves the inventory
// as it was. The device/address link is keyed by address and both
// sides are always written together.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::Ipv4Addr;
use tracing::{debug, info, warn};

use super::collection::Collection;
use crate::addr;
use crate::error::CoreError;
use crate::model::{
    Device, EntityId, IpAddress, IpRange, IpStatus, MacAddress, OtherDevice, RangeRef,
    VLAN_TAG_MAX, VLAN_TAG_MIN, Vlan,
};
use crate::requests::{
    DeviceUpdate, NewDevice, NewIpRange, NewOtherDevice, NewVlan, OtherDeviceUpdate,
    RangeBounds, VlanUpdate,
};

/// How many conflicting addresses a range rejection lists by name.
const CONFLICT_PREVIEW: usize = 3;

// ── Operation results ───────────────────────────────────────────────

/// Outcome of [`Inventory::add_ip_range`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeCreated {
    pub range: IpRange,
    /// Address records actually created.
    pub count: usize,
    /// Size of the span that was asked for.
    pub requested: u64,
    /// `true` when the span exceeded [`addr::MAX_RANGE_ADDRESSES`].
    pub truncated: bool,
}

/// Outcome of [`Inventory::delete_ip_range`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeRemoval {
    pub range: IpRange,
    pub removed_addresses: usize,
    pub unbound_devices: usize,
}

/// Outcome of [`Inventory::delete_vlan`]: how many records lost their
/// reference to the removed VLAN.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VlanRemoval {
    pub vlan: Vlan,
    pub devices: usize,
    pub ip_addresses: usize,
    pub ip_ranges: usize,
}

/// Outcome of [`Inventory::add_manual_ip`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualIp {
    pub id: EntityId,
    /// `false` when the address was already tracked.
    pub created: bool,
}

// ── Serialized form ─────────────────────────────────────────────────

/// The five collections as plain arrays, in the persisted field order.
/// Missing collections deserialize as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InventoryData {
    pub devices: Vec<Device>,
    pub ip_addresses: Vec<IpAddress>,
    pub ip_ranges: Vec<IpRange>,
    pub vlans: Vec<Vlan>,
    pub other_devices: Vec<OtherDevice>,
}

// ── Inventory ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct Inventory {
    pub(crate) vlans: Collection<Vlan>,
    pub(crate) ip_ranges: Collection<IpRange>,
    pub(crate) ip_addresses: Collection<IpAddress>,
    pub(crate) devices: Collection<Device>,
    pub(crate) other_devices: Collection<OtherDevice>,
    by_address: HashMap<Ipv4Addr, EntityId>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild an inventory from its serialized form.
    ///
    /// Address records that repeat an already-seen address are dropped
    /// with a warning so the address index stays one-to-one.
    pub fn from_data(data: InventoryData) -> Self {
        let mut inventory = Self {
            vlans: data.vlans.into_iter().collect(),
            ip_ranges: data.ip_ranges.into_iter().collect(),
            devices: data.devices.into_iter().collect(),
            other_devices: data.other_devices.into_iter().collect(),
            ..Self::default()
        };
        for ip in data.ip_addresses {
            if inventory.by_address.contains_key(&ip.address) {
                warn!(address = %ip.address, id = %ip.id, "dropping duplicate address record");
                continue;
            }
            inventory.insert_ip(ip);
        }
        inventory
    }

    pub fn to_data(&self) -> InventoryData {
        InventoryData {
            devices: self.devices.iter().cloned().collect(),
            ip_addresses: self.ip_addresses.iter().cloned().collect(),
            ip_ranges: self.ip_ranges.iter().cloned().collect(),
            vlans: self.vlans.iter().cloned().collect(),
            other_devices: self.other_devices.iter().cloned().collect(),
        }
    }

    /// `true` when none of the four allocation collections hold anything.
    pub fn is_empty(&self) -> bool {
        self.vlans.is_empty()
            && self.ip_ranges.is_empty()
            && self.ip_addresses.is_empty()
            && self.devices.is_empty()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn vlans(&self) -> impl Iterator<Item = &Vlan> {
        self.vlans.iter()
    }

    pub fn ip_ranges(&self) -> impl Iterator<Item = &IpRange> {
        self.ip_ranges.iter()
    }

    pub fn ip_addresses(&self) -> impl Iterator<Item = &IpAddress> {
        self.ip_addresses.iter()
    }

    pub fn devices(&self) -> impl Iterator<Item = &Device> {
        self.devices.iter()
    }

    pub fn other_devices(&self) -> impl Iterator<Item = &OtherDevice> {
        self.other_devices.iter()
    }

    pub fn vlan(&self, id: &EntityId) -> Option<&Vlan> {
        self.vlans.get(id)
    }

    pub fn vlan_by_tag(&self, tag: u16) -> Option<&Vlan> {
        self.vlans.iter().find(|v| v.vlan_id == tag)
    }

    pub fn ip_range(&self, id: &EntityId) -> Option<&IpRange> {
        self.ip_ranges.get(id)
    }

    pub fn ip_address(&self, id: &EntityId) -> Option<&IpAddress> {
        self.ip_addresses.get(id)
    }

    pub fn ip_by_address(&self, address: Ipv4Addr) -> Option<&IpAddress> {
        self.by_address
            .get(&address)
            .and_then(|id| self.ip_addresses.get(id))
    }

    pub fn device(&self, id: &EntityId) -> Option<&Device> {
        self.devices.get(id)
    }

    pub fn device_by_ip(&self, address: Ipv4Addr) -> Option<&Device> {
        self.devices
            .iter()
            .find(|d| d.assigned_ip == Some(address))
    }

    /// Case-insensitive name lookup. Names are not unique; the first
    /// match in insertion order wins.
    pub fn device_by_name(&self, name: &str) -> Option<&Device> {
        let name = name.trim();
        self.devices
            .iter()
            .find(|d| d.name.eq_ignore_ascii_case(name))
    }

    pub fn other_device(&self, id: &EntityId) -> Option<&OtherDevice> {
        self.other_devices.get(id)
    }

    /// Addresses generated from the given range.
    pub fn ips_by_range<'a>(&'a self, range_id: &'a EntityId) -> impl Iterator<Item = &'a IpAddress> {
        self.ip_addresses
            .iter()
            .filter(move |ip| ip.range_id.range_id() == Some(range_id))
    }

    pub fn available_ips(&self) -> impl Iterator<Item = &IpAddress> {
        self.ip_addresses
            .iter()
            .filter(|ip| ip.status == IpStatus::Available)
    }

    /// Describe every broken device/address link or dangling reference.
    /// A healthy inventory returns an empty list.
    pub fn check_consistency(&self) -> Vec<String> {
        let mut problems = Vec::new();

        for ip in self.ip_addresses.iter() {
            match &ip.device_id {
                Some(device_id) => {
                    match self.devices.get(device_id) {
                        None => problems.push(format!(
                            "IP {} is bound to missing device {device_id}",
                            ip.address
                        )),
                        Some(d) if d.assigned_ip != Some(ip.address) => problems.push(format!(
                            "IP {} is bound to device \"{}\" which does not point back to it",
                            ip.address, d.name
                        )),
                        Some(_) => {}
                    }
                    if ip.status != IpStatus::Assigned {
                        problems.push(format!(
                            "IP {} has a device but status {}",
                            ip.address, ip.status
                        ));
                    }
                    if ip.assigned_at.is_none() {
                        problems.push(format!("IP {} has a device but no assignment time", ip.address));
                    }
                }
                None if ip.status == IpStatus::Assigned => {
                    problems.push(format!("IP {} is assigned without a device", ip.address));
                }
                None => {}
            }
            if let Some(range_id) = ip.range_id.range_id() {
                if !self.ip_ranges.contains(range_id) {
                    problems.push(format!("IP {} belongs to missing range {range_id}", ip.address));
                }
            }
        }

        for device in self.devices.iter() {
            let Some(address) = device.assigned_ip else {
                continue;
            };
            match self.ip_by_address(address) {
                None => problems.push(format!(
                    "device \"{}\" points at untracked IP {address}",
                    device.name
                )),
                Some(ip) if ip.device_id.as_ref() != Some(&device.id) => problems.push(format!(
                    "device \"{}\" points at IP {address} which is not bound to it",
                    device.name
                )),
                Some(_) => {}
            }
        }

        let vlan_refs = self
            .devices
            .iter()
            .map(|d| ("device", d.name.clone(), d.vlan_id.as_ref()))
            .chain(
                self.ip_addresses
                    .iter()
                    .map(|ip| ("IP", ip.address.to_string(), ip.vlan_id.as_ref())),
            )
            .chain(
                self.ip_ranges
                    .iter()
                    .map(|r| ("range", r.name.clone(), r.vlan_id.as_ref())),
            );
        for (kind, label, vlan_id) in vlan_refs {
            if let Some(vlan_id) = vlan_id {
                if !self.vlans.contains(vlan_id) {
                    problems.push(format!("{kind} {label} references missing VLAN {vlan_id}"));
                }
            }
        }

        problems
    }

    // ── VLANs ────────────────────────────────────────────────────────

    pub fn add_vlan(&mut self, req: NewVlan) -> Result<Vlan, CoreError> {
        validate_tag(req.vlan_id)?;
        let name = required(&req.name, "VLAN name is required")?;
        if self.vlan_by_tag(req.vlan_id).is_some() {
            return Err(CoreError::conflict(format!(
                "VLAN {} already exists",
                req.vlan_id
            )));
        }

        let now = Utc::now();
        let vlan = Vlan {
            id: EntityId::new(),
            vlan_id: req.vlan_id,
            name,
            description: req.description.trim().to_owned(),
            created_at: now,
            updated_at: now,
        };
        self.vlans.insert(vlan.clone());
        debug!(vlan_id = vlan.vlan_id, name = %vlan.name, "VLAN added");
        Ok(vlan)
    }

    pub fn update_vlan(&mut self, id: &EntityId, update: VlanUpdate) -> Result<Vlan, CoreError> {
        if !self.vlans.contains(id) {
            return Err(CoreError::not_found("VLAN", id));
        }
        if let Some(tag) = update.vlan_id {
            validate_tag(tag)?;
            if self.vlans.iter().any(|v| v.vlan_id == tag && &v.id != id) {
                return Err(CoreError::conflict(format!("VLAN {tag} already exists")));
            }
        }
        let name = update
            .name
            .as_deref()
            .map(|n| required(n, "VLAN name is required"))
            .transpose()?;

        let vlan = self
            .vlans
            .get_mut(id)
            .ok_or_else(|| CoreError::not_found("VLAN", id))?;
        if let Some(tag) = update.vlan_id {
            vlan.vlan_id = tag;
        }
        if let Some(name) = name {
            vlan.name = name;
        }
        if let Some(description) = update.description {
            vlan.description = description.trim().to_owned();
        }
        vlan.updated_at = Utc::now();
        debug!(vlan_id = vlan.vlan_id, "VLAN updated");
        Ok(vlan.clone())
    }

    /// Remove a VLAN and null out every reference to it.
    pub fn delete_vlan(&mut self, id: &EntityId) -> Option<VlanRemoval> {
        let vlan = self.vlans.remove(id)?;
        let now = Utc::now();
        let mut removal = VlanRemoval {
            vlan,
            devices: 0,
            ip_addresses: 0,
            ip_ranges: 0,
        };

        for device in self.devices.iter_mut() {
            if device.vlan_id.as_ref() == Some(id) {
                device.vlan_id = None;
                device.updated_at = now;
                removal.devices += 1;
            }
        }
        for ip in self.ip_addresses.iter_mut() {
            if ip.vlan_id.as_ref() == Some(id) {
                ip.vlan_id = None;
                ip.updated_at = now;
                removal.ip_addresses += 1;
            }
        }
        for range in self.ip_ranges.iter_mut() {
            if range.vlan_id.as_ref() == Some(id) {
                range.vlan_id = None;
                removal.ip_ranges += 1;
            }
        }

        debug!(
            vlan_id = removal.vlan.vlan_id,
            devices = removal.devices,
            ip_addresses = removal.ip_addresses,
            ip_ranges = removal.ip_ranges,
            "VLAN deleted"
        );
        Some(removal)
    }

    // ── Ranges and addresses ─────────────────────────────────────────

    /// Declare a range and materialize one `available` record per address.
    ///
    /// Rejected as a whole if any address in the span is already tracked.
    pub fn add_ip_range(&mut self, req: NewIpRange) -> Result<RangeCreated, CoreError> {
        let name = required(&req.name, "Range name is required")?;
        let (start, end, cidr) = match &req.bounds {
            RangeBounds::StartEnd { start, end } => {
                if end < start {
                    return Err(CoreError::validation(
                        "Start IP must be less than or equal to end IP",
                    ));
                }
                (*start, *end, None)
            }
            RangeBounds::Cidr(text) => {
                let text = text.trim();
                let bounds = addr::parse_cidr(text).ok_or_else(|| {
                    CoreError::validation(format!(
                        "Invalid CIDR notation: {text} (example: 192.168.1.0/24)"
                    ))
                })?;
                (bounds.start, bounds.end, Some(text.to_owned()))
            }
        };
        self.check_vlan_ref(req.vlan_id.as_ref())?;

        let generated = addr::generate_ip_range(start, end);
        let conflicts: Vec<Ipv4Addr> = generated
            .addresses
            .iter()
            .copied()
            .filter(|a| self.by_address.contains_key(a))
            .collect();
        if !conflicts.is_empty() {
            let preview = conflicts
                .iter()
                .take(CONFLICT_PREVIEW)
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            let more = if conflicts.len() > CONFLICT_PREVIEW { "..." } else { "" };
            return Err(CoreError::conflict(format!(
                "{} IP addresses already exist in other ranges: {preview}{more}",
                conflicts.len()
            )));
        }

        let range = IpRange {
            id: EntityId::new(),
            name,
            start_ip: start,
            end_ip: end,
            cidr,
            vlan_id: req.vlan_id,
            created_at: Utc::now(),
        };
        for address in &generated.addresses {
            self.insert_ip(IpAddress::new(
                *address,
                RangeRef::Range(range.id.clone()),
                range.vlan_id.clone(),
            ));
        }
        self.ip_ranges.insert(range.clone());

        let created = RangeCreated {
            range,
            count: generated.len(),
            requested: generated.requested,
            truncated: generated.truncated(),
        };
        debug!(
            range = %created.range.name,
            count = created.count,
            truncated = created.truncated,
            "IP range added"
        );
        Ok(created)
    }

    /// Remove a range with all of its addresses. Devices bound to any of
    /// them are kept but lose their assignment.
    pub fn delete_ip_range(&mut self, id: &EntityId) -> Option<RangeRemoval> {
        let range = self.ip_ranges.remove(id)?;
        let now = Utc::now();
        let owner = RangeRef::Range(id.clone());

        let mut removed_addresses = 0;
        let mut bound_devices = Vec::new();
        let by_address = &mut self.by_address;
        self.ip_addresses.retain(|ip| {
            if ip.range_id != owner {
                return true;
            }
            by_address.remove(&ip.address);
            if let Some(device_id) = &ip.device_id {
                bound_devices.push(device_id.clone());
            }
            removed_addresses += 1;
            false
        });
        for device_id in &bound_devices {
            self.unlink_device(device_id, now);
        }

        debug!(
            range = %range.name,
            removed_addresses,
            unbound_devices = bound_devices.len(),
            "IP range deleted"
        );
        Some(RangeRemoval {
            range,
            removed_addresses,
            unbound_devices: bound_devices.len(),
        })
    }

    /// Track a single address outside any range. Idempotent.
    pub fn add_manual_ip(
        &mut self,
        address: Ipv4Addr,
        vlan_id: Option<EntityId>,
    ) -> Result<ManualIp, CoreError> {
        if let Some(existing) = self.ip_by_address(address) {
            return Ok(ManualIp {
                id: existing.id.clone(),
                created: false,
            });
        }
        self.check_vlan_ref(vlan_id.as_ref())?;

        let ip = IpAddress::new(address, RangeRef::Manual, vlan_id);
        let id = ip.id.clone();
        self.insert_ip(ip);
        debug!(%address, "manual IP added");
        Ok(ManualIp { id, created: true })
    }

    /// Administrative status change. Moving a bound address to
    /// `available` or `reserved` releases its device as well.
    pub fn update_ip_status(
        &mut self,
        id: &EntityId,
        status: IpStatus,
    ) -> Result<IpAddress, CoreError> {
        let ip = self
            .ip_addresses
            .get(id)
            .ok_or_else(|| CoreError::not_found("IP address", id))?;
        if status == IpStatus::Assigned {
            if ip.is_bound() {
                return Ok(ip.clone());
            }
            return Err(CoreError::validation(
                "Addresses become assigned by binding them to a device",
            ));
        }

        let now = Utc::now();
        if let Some(device_id) = ip.device_id.clone() {
            self.unlink_device(&device_id, now);
        }
        let ip = self
            .ip_addresses
            .get_mut(id)
            .ok_or_else(|| CoreError::not_found("IP address", id))?;
        ip.release(status, now);
        debug!(address = %ip.address, %status, "IP status changed");
        Ok(ip.clone())
    }

    /// Bind an address to a device, releasing whatever the device held
    /// before. Re-binding the same pair is a no-op.
    pub fn assign_ip_to_device(
        &mut self,
        ip_id: &EntityId,
        device_id: &EntityId,
    ) -> Result<IpAddress, CoreError> {
        let ip = self
            .ip_addresses
            .get(ip_id)
            .ok_or_else(|| CoreError::not_found("IP address", ip_id))?;
        if !self.devices.contains(device_id) {
            return Err(CoreError::not_found("Device", device_id));
        }
        match &ip.device_id {
            Some(holder) if holder == device_id => return Ok(ip.clone()),
            Some(_) => {
                return Err(CoreError::conflict(format!(
                    "IP address {} is already assigned to another device",
                    ip.address
                )));
            }
            None => {}
        }

        let address = ip.address;
        let now = Utc::now();
        self.release_ips_held_by(device_id, now);
        if let Some(device) = self.devices.get_mut(device_id) {
            device.assigned_ip = Some(address);
            device.assigned_at = Some(now);
            device.updated_at = now;
        }
        let ip = self
            .ip_addresses
            .get_mut(ip_id)
            .ok_or_else(|| CoreError::not_found("IP address", ip_id))?;
        ip.bind(device_id.clone(), now);
        debug!(%address, %device_id, "IP assigned");
        Ok(ip.clone())
    }

    /// Release an address and its device. Returns `false` when nothing
    /// was bound.
    pub fn unassign_ip(&mut self, ip_id: &EntityId) -> Result<bool, CoreError> {
        let ip = self
            .ip_addresses
            .get(ip_id)
            .ok_or_else(|| CoreError::not_found("IP address", ip_id))?;
        let Some(device_id) = ip.device_id.clone() else {
            return Ok(false);
        };

        let now = Utc::now();
        self.unlink_device(&device_id, now);
        if let Some(ip) = self.ip_addresses.get_mut(ip_id) {
            ip.release(IpStatus::Available, now);
            debug!(address = %ip.address, %device_id, "IP unassigned");
        }
        Ok(true)
    }

    // ── Devices ──────────────────────────────────────────────────────

    pub fn add_device(&mut self, req: NewDevice) -> Result<Device, CoreError> {
        let name = required(&req.name, "Device name is required")?;
        let location = required(&req.location, "Location is required")?;
        let mac = parse_optional_mac(req.mac_address.as_deref())?;
        if let Some(mac) = &mac {
            if self.mac_in_use(mac, None) {
                return Err(CoreError::conflict(
                    "A device with this MAC address already exists",
                ));
            }
        }
        self.check_vlan_ref(req.vlan_id.as_ref())?;
        let ip_id = req
            .assigned_ip
            .map(|address| self.bindable_ip(address, None))
            .transpose()?;

        let now = Utc::now();
        let device = Device {
            id: EntityId::new(),
            name,
            device_type: req.device_type,
            location,
            vlan_id: req.vlan_id,
            mac_address: mac,
            assigned_ip: req.assigned_ip,
            switch_ip: req.switch_ip,
            notes: req.notes.trim().to_owned(),
            created_at: now,
            updated_at: now,
            assigned_at: ip_id.as_ref().map(|_| now),
        };
        if let Some(ip_id) = &ip_id {
            if let Some(ip) = self.ip_addresses.get_mut(ip_id) {
                ip.bind(device.id.clone(), now);
            }
        }
        self.devices.insert(device.clone());
        debug!(
            device_id = %device.id,
            name = %device.name,
            assigned_ip = ?device.assigned_ip,
            "device added"
        );
        Ok(device)
    }

    pub fn update_device(
        &mut self,
        id: &EntityId,
        update: DeviceUpdate,
    ) -> Result<Device, CoreError> {
        let current_ip = self
            .devices
            .get(id)
            .ok_or_else(|| CoreError::not_found("Device", id))?
            .assigned_ip;

        let name = update
            .name
            .as_deref()
            .map(|n| required(n, "Device name is required"))
            .transpose()?;
        let location = update
            .location
            .as_deref()
            .map(|l| required(l, "Location is required"))
            .transpose()?;
        let mac = update
            .mac_address
            .as_ref()
            .map(|raw| parse_optional_mac(raw.as_deref()))
            .transpose()?;
        if let Some(Some(mac)) = &mac {
            if self.mac_in_use(mac, Some(id)) {
                return Err(CoreError::conflict(
                    "A device with this MAC address already exists",
                ));
            }
        }
        if let Some(vlan_id) = &update.vlan_id {
            self.check_vlan_ref(vlan_id.as_ref())?;
        }
        let rebind = update.assigned_ip.filter(|next| *next != current_ip);
        let new_ip_id = match rebind {
            Some(Some(address)) => Some(self.bindable_ip(address, Some(id))?),
            _ => None,
        };

        let now = Utc::now();
        if rebind.is_some() {
            self.release_ips_held_by(id, now);
        }
        if let Some(ip_id) = &new_ip_id {
            if let Some(ip) = self.ip_addresses.get_mut(ip_id) {
                ip.bind(id.clone(), now);
            }
        }

        let device = self
            .devices
            .get_mut(id)
            .ok_or_else(|| CoreError::not_found("Device", id))?;
        if let Some(name) = name {
            device.name = name;
        }
        if let Some(device_type) = update.device_type {
            device.device_type = device_type;
        }
        if let Some(location) = location {
            device.location = location;
        }
        if let Some(vlan_id) = update.vlan_id {
            device.vlan_id = vlan_id;
        }
        if let Some(mac) = mac {
            device.mac_address = mac;
        }
        if let Some(switch_ip) = update.switch_ip {
            device.switch_ip = switch_ip;
        }
        if let Some(notes) = update.notes {
            device.notes = notes.trim().to_owned();
        }
        if let Some(next) = rebind {
            device.assigned_ip = next;
            device.assigned_at = next.map(|_| now);
        }
        device.updated_at = now;

        debug!(device_id = %device.id, rebound = rebind.is_some(), "device updated");
        Ok(device.clone())
    }

    /// Remove a device, returning its address to the pool.
    pub fn delete_device(&mut self, id: &EntityId) -> Option<Device> {
        let device = self.devices.remove(id)?;
        let released = self.release_ips_held_by(id, Utc::now());
        debug!(device_id = %device.id, name = %device.name, released, "device deleted");
        Some(device)
    }

    /// Drop all VLANs, ranges, addresses and devices. The auxiliary
    /// equipment catalog is kept.
    pub fn clear_all_data(&mut self) {
        let devices = self.devices.len();
        let ip_addresses = self.ip_addresses.len();
        self.vlans.clear();
        self.ip_ranges.clear();
        self.ip_addresses.clear();
        self.devices.clear();
        self.by_address.clear();
        info!(devices, ip_addresses, "inventory cleared");
    }

    // ── Other devices ────────────────────────────────────────────────

    pub fn add_other_device(&mut self, req: NewOtherDevice) -> Result<OtherDevice, CoreError> {
        let name = required(&req.name, "Name is required")?;
        let location = required(&req.location, "Location is required")?;
        self.check_display_ip(req.display_ip, None)?;
        let now = Utc::now();
        let other = OtherDevice {
            id: EntityId::new(),
            name,
            display_ip: req.display_ip,
            controller_ip: req.controller_ip,
            camera_ip: req.camera_ip,
            location,
            notes: req.notes.trim().to_owned(),
            created_at: now,
            updated_at: now,
        };
        self.other_devices.insert(other.clone());
        debug!(id = %other.id, name = %other.name, "other device added");
        Ok(other)
    }

    pub fn update_other_device(
        &mut self,
        id: &EntityId,
        update: OtherDeviceUpdate,
    ) -> Result<OtherDevice, CoreError> {
        let name = update
            .name
            .as_deref()
            .map(|n| required(n, "Name is required"))
            .transpose()?;
        let location = update
            .location
            .as_deref()
            .map(|l| required(l, "Location is required"))
            .transpose()?;
        if !self.other_devices.contains(id) {
            return Err(CoreError::not_found("Other device", id));
        }
        if let Some(ip) = update.display_ip {
            self.check_display_ip(ip, Some(id))?;
        }
        let other = self
            .other_devices
            .get_mut(id)
            .ok_or_else(|| CoreError::not_found("Other device", id))?;

        if let Some(name) = name {
            other.name = name;
        }
        if let Some(location) = location {
            other.location = location;
        }
        if let Some(ip) = update.display_ip {
            other.display_ip = ip;
        }
        if let Some(ip) = update.controller_ip {
            other.controller_ip = ip;
        }
        if let Some(ip) = update.camera_ip {
            other.camera_ip = ip;
        }
        if let Some(notes) = update.notes {
            other.notes = notes.trim().to_owned();
        }
        other.updated_at = Utc::now();
        Ok(other.clone())
    }

    pub fn delete_other_device(&mut self, id: &EntityId) -> Option<OtherDevice> {
        self.other_devices.remove(id)
    }

    // ── Internal helpers ─────────────────────────────────────────────

    /// Insert an address record and index it.
    pub(crate) fn insert_ip(&mut self, ip: IpAddress) {
        self.by_address.insert(ip.address, ip.id.clone());
        self.ip_addresses.insert(ip);
    }

    pub(crate) fn check_vlan_ref(&self, vlan_id: Option<&EntityId>) -> Result<(), CoreError> {
        match vlan_id {
            Some(id) if !self.vlans.contains(id) => Err(CoreError::not_found("VLAN", id)),
            _ => Ok(()),
        }
    }

    fn mac_in_use(&self, mac: &MacAddress, except: Option<&EntityId>) -> bool {
        self.devices.iter().any(|d| {
            Some(&d.id) != except && d.mac_address.as_ref().is_some_and(|m| m.matches(mac))
        })
    }

    /// Display addresses are unique across the auxiliary catalog.
    fn check_display_ip(&self, ip: Ipv4Addr, except: Option<&EntityId>) -> Result<(), CoreError> {
        if self
            .other_devices
            .iter()
            .any(|o| Some(&o.id) != except && o.display_ip == ip)
        {
            return Err(CoreError::conflict(format!(
                "Display IP {ip} already exists"
            )));
        }
        Ok(())
    }

    /// Resolve an address a device may bind to. `owner` is the device
    /// asking, which may already hold it.
    fn bindable_ip(
        &self,
        address: Ipv4Addr,
        owner: Option<&EntityId>,
    ) -> Result<EntityId, CoreError> {
        let ip = self.ip_by_address(address).ok_or_else(|| {
            CoreError::validation(format!(
                "IP address {address} is not in any managed range"
            ))
        })?;
        match &ip.device_id {
            Some(holder) if Some(holder) != owner => Err(CoreError::conflict(format!(
                "IP address {address} is already assigned to another device"
            ))),
            _ => Ok(ip.id.clone()),
        }
    }

    /// Return every address held by `device_id` to the pool.
    fn release_ips_held_by(&mut self, device_id: &EntityId, at: DateTime<Utc>) -> usize {
        let mut released = 0;
        for ip in self.ip_addresses.iter_mut() {
            if ip.device_id.as_ref() == Some(device_id) {
                ip.release(IpStatus::Available, at);
                released += 1;
            }
        }
        released
    }

    /// Clear the device side of a binding.
    fn unlink_device(&mut self, device_id: &EntityId, at: DateTime<Utc>) {
        if let Some(device) = self.devices.get_mut(device_id) {
            device.assigned_ip = None;
            device.assigned_at = None;
            device.updated_at = at;
        }
    }
}

fn required(value: &str, message: &str) -> Result<String, CoreError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CoreError::validation(message));
    }
    Ok(value.to_owned())
}

fn validate_tag(tag: u16) -> Result<(), CoreError> {
    if (VLAN_TAG_MIN..=VLAN_TAG_MAX).contains(&tag) {
        Ok(())
    } else {
        Err(CoreError::validation(format!(
            "VLAN ID must be between {VLAN_TAG_MIN} and {VLAN_TAG_MAX}"
        )))
    }
}

fn parse_optional_mac(raw: Option<&str>) -> Result<Option<MacAddress>, CoreError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => MacAddress::parse(raw).map(Some),
    }
}
