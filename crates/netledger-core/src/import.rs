// ── Bulk import ──
//
// Parses a device table (location, IP, device name) or an auxiliary
// equipment table (name, display/controller/camera IP, location) from
// CSV and merges the rows into the inventory in a single transition.
// Individual rows are skipped with a reason; the batch itself only
// fails on a bad source or an unknown target VLAN.

use std::collections::HashSet;
use std::io::Read;
use std::net::Ipv4Addr;

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::addr;
use crate::error::CoreError;
use crate::model::{Device, DeviceType, EntityId, IpAddress, RangeRef};
use crate::requests::NewOtherDevice;
use crate::store::{Inventory, InventoryStore};

/// One device to import, as read from the source table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRow {
    pub name: String,
    pub location: String,
    pub ip_address: String,
}

/// One auxiliary equipment entry to import. `camera_ip` is empty or
/// `-` when the entry has no camera.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OtherImportRow {
    pub name: String,
    pub display_ip: String,
    pub controller_ip: String,
    pub location: String,
    pub camera_ip: String,
}

/// Outcome of a bulk import. `skipped` counts every rejected row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
}

// ── Table parsing ───────────────────────────────────────────────────

/// Header positions of the three recognized device-table columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub location: usize,
    pub ip_address: usize,
    pub device: usize,
}

impl ColumnMap {
    /// Locate columns by case-insensitive substring. The first matching
    /// header wins for each column.
    pub fn detect<'a>(headers: impl IntoIterator<Item = &'a str>) -> Option<Self> {
        let headers: Vec<String> = headers.into_iter().map(str::to_lowercase).collect();
        let find = |needles: &[&str]| {
            headers
                .iter()
                .position(|h| needles.iter().any(|n| h.contains(n)))
        };
        Some(Self {
            location: find(&["location"])?,
            ip_address: find(&["ip", "address"])?,
            device: find(&["device", "name"])?,
        })
    }
}

/// Header positions of the auxiliary equipment table. The camera
/// column is optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OthersColumnMap {
    pub name: usize,
    pub display_ip: usize,
    pub controller_ip: usize,
    pub location: usize,
    pub camera_ip: Option<usize>,
}

impl OthersColumnMap {
    pub fn detect<'a>(headers: impl IntoIterator<Item = &'a str>) -> Option<Self> {
        let headers: Vec<String> = headers.into_iter().map(str::to_lowercase).collect();
        let find = |needle: &str| headers.iter().position(|h| h.contains(needle));
        Some(Self {
            name: find("name")?,
            display_ip: find("display ip")?,
            controller_ip: find("controller ip")?,
            location: find("location")?,
            camera_ip: find("camera ip"),
        })
    }
}

/// A source row with its validation verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedRow<T = ImportRow> {
    /// 1-based line in the source.
    pub line: u64,
    #[serde(flatten)]
    pub row: T,
    pub error: Option<String>,
}

impl<T> ParsedRow<T> {
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedTable<T = ImportRow> {
    pub rows: Vec<ParsedRow<T>>,
}

impl<T: Clone> ParsedTable<T> {
    pub fn valid_rows(&self) -> Vec<T> {
        self.rows
            .iter()
            .filter(|r| r.is_valid())
            .map(|r| r.row.clone())
            .collect()
    }

    pub fn invalid_rows(&self) -> impl Iterator<Item = &ParsedRow<T>> {
        self.rows.iter().filter(|r| !r.is_valid())
    }
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader)
}

/// Read a CSV device table. The first record is the header.
pub fn parse_table<R: Read>(reader: R) -> Result<ParsedTable, CoreError> {
    let mut reader = csv_reader(reader);

    let columns = ColumnMap::detect(reader.headers()?.iter()).ok_or_else(|| CoreError::Import {
        message: "the table must contain Location, IP Address and Device Name columns".into(),
    })?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let cell = |idx: usize| record.get(idx).unwrap_or_default().to_owned();
        let row = ImportRow {
            name: cell(columns.device),
            location: cell(columns.location),
            ip_address: cell(columns.ip_address),
        };
        if row.name.is_empty() && row.location.is_empty() && row.ip_address.is_empty() {
            continue;
        }

        let error = if row.name.is_empty() {
            Some("Device name is required")
        } else if row.location.is_empty() {
            Some("Location is required")
        } else if row.ip_address.is_empty() {
            Some("IP address is required")
        } else if !addr::is_valid_ip(&row.ip_address) {
            Some("Invalid IP format")
        } else {
            None
        };
        rows.push(ParsedRow {
            line: record.position().map_or(0, |p| p.line()),
            row,
            error: error.map(str::to_owned),
        });
    }

    Ok(ParsedTable { rows })
}

/// Read a CSV auxiliary equipment table. The first record is the header.
pub fn parse_others_table<R: Read>(reader: R) -> Result<ParsedTable<OtherImportRow>, CoreError> {
    let mut reader = csv_reader(reader);

    let columns =
        OthersColumnMap::detect(reader.headers()?.iter()).ok_or_else(|| CoreError::Import {
            message: "the table must contain Name, Display IP, Controller IP and Location columns"
                .into(),
        })?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let cell = |idx: usize| record.get(idx).unwrap_or_default().to_owned();
        let row = OtherImportRow {
            name: cell(columns.name),
            display_ip: cell(columns.display_ip),
            controller_ip: cell(columns.controller_ip),
            location: cell(columns.location),
            camera_ip: columns.camera_ip.map(cell).unwrap_or_default(),
        };
        if [&row.name, &row.display_ip, &row.controller_ip, &row.location]
            .iter()
            .all(|c| c.is_empty())
        {
            continue;
        }

        rows.push(ParsedRow {
            line: record.position().map_or(0, |p| p.line()),
            error: other_row_error(&row).map(str::to_owned),
            row,
        });
    }

    Ok(ParsedTable { rows })
}

fn other_row_error(row: &OtherImportRow) -> Option<&'static str> {
    if row.name.is_empty() {
        Some("Name is required")
    } else if row.display_ip.is_empty() {
        Some("Display IP is required")
    } else if !addr::is_valid_ip(&row.display_ip) {
        Some("Invalid Display IP format")
    } else if row.controller_ip.is_empty() {
        Some("Controller IP is required")
    } else if !addr::is_valid_ip(&row.controller_ip) {
        Some("Invalid Controller IP format")
    } else if row.location.is_empty() {
        Some("Location is required")
    } else if camera_ip(&row.camera_ip).is_none() {
        Some("Invalid Camera IP format")
    } else {
        None
    }
}

/// Empty and `-` both mean "no camera"; `None` means malformed.
fn camera_ip(raw: &str) -> Option<Option<Ipv4Addr>> {
    match raw.trim() {
        "" | "-" => Some(None),
        ip => addr::parse_ipv4(ip).map(Some),
    }
}

// ── Reconciliation ──────────────────────────────────────────────────

impl Inventory {
    /// Create one `other` device per row, skipping rows whose name
    /// (case-insensitive) or address is already taken, including by
    /// rows earlier in the same batch.
    pub fn bulk_import_devices(
        &mut self,
        rows: impl IntoIterator<Item = ImportRow>,
        vlan_id: Option<EntityId>,
    ) -> Result<ImportReport, CoreError> {
        self.check_vlan_ref(vlan_id.as_ref())?;

        let mut report = ImportReport::default();
        let mut taken_names: HashSet<String> =
            self.devices().map(|d| d.name.to_lowercase()).collect();
        let mut taken_ips: HashSet<Ipv4Addr> =
            self.devices().filter_map(|d| d.assigned_ip).collect();
        let now = Utc::now();

        for row in rows {
            let name = row.name.trim().to_owned();
            if name.is_empty() {
                report.skipped += 1;
                report
                    .errors
                    .push(format!("Skipped: row for IP {} has no device name", row.ip_address.trim()));
                continue;
            }
            if row.location.trim().is_empty() {
                report.skipped += 1;
                report
                    .errors
                    .push(format!("Skipped: Device \"{name}\" has no location"));
                continue;
            }
            let Some(address) = addr::parse_ipv4(&row.ip_address) else {
                report.skipped += 1;
                report.errors.push(format!(
                    "Skipped: Device \"{name}\" has invalid IP {}",
                    row.ip_address.trim()
                ));
                continue;
            };
            let held = self.ip_by_address(address).is_some_and(IpAddress::is_bound);
            if taken_names.contains(&name.to_lowercase()) || taken_ips.contains(&address) || held {
                report.skipped += 1;
                report.errors.push(format!(
                    "Skipped: Device \"{name}\" or IP {address} already exists"
                ));
                continue;
            }

            let device = Device {
                id: EntityId::new(),
                name,
                device_type: DeviceType::Other,
                location: row.location.trim().to_owned(),
                vlan_id: vlan_id.clone(),
                mac_address: None,
                assigned_ip: Some(address),
                switch_ip: None,
                notes: String::new(),
                created_at: now,
                updated_at: now,
                assigned_at: Some(now),
            };

            let ip_id = match self.ip_by_address(address) {
                Some(ip) => ip.id.clone(),
                None => {
                    let ip = IpAddress::new(address, RangeRef::ManualImport, vlan_id.clone());
                    let id = ip.id.clone();
                    self.insert_ip(ip);
                    id
                }
            };
            if let Some(ip) = self.ip_addresses.get_mut(&ip_id) {
                ip.bind(device.id.clone(), now);
            }

            taken_names.insert(device.name.to_lowercase());
            taken_ips.insert(address);
            self.devices.insert(device);
            report.imported += 1;
        }

        info!(
            imported = report.imported,
            skipped = report.skipped,
            "bulk import finished"
        );
        Ok(report)
    }

    /// Add one auxiliary equipment entry per row. Rows with missing or
    /// malformed fields, or whose display address is already taken
    /// (including by an earlier row of the batch), are skipped.
    pub fn bulk_import_other_devices(
        &mut self,
        rows: impl IntoIterator<Item = OtherImportRow>,
    ) -> ImportReport {
        let mut report = ImportReport::default();
        for row in rows {
            let name = row.name.trim().to_owned();
            let request = match other_request(&row) {
                Ok(request) => request,
                Err(reason) => {
                    report.skipped += 1;
                    report.errors.push(format!("Skipped: \"{name}\": {reason}"));
                    continue;
                }
            };
            match self.add_other_device(request) {
                Ok(_) => report.imported += 1,
                Err(e) => {
                    report.skipped += 1;
                    report.errors.push(format!("Skipped: \"{name}\": {e}"));
                }
            }
        }

        info!(
            imported = report.imported,
            skipped = report.skipped,
            "other device import finished"
        );
        report
    }
}

fn other_request(row: &OtherImportRow) -> Result<NewOtherDevice, &'static str> {
    if let Some(reason) = other_row_error(row) {
        return Err(reason);
    }
    let ip = |raw: &str, reason| addr::parse_ipv4(raw.trim()).ok_or(reason);
    Ok(NewOtherDevice {
        name: row.name.clone(),
        display_ip: ip(&row.display_ip, "Invalid Display IP format")?,
        controller_ip: ip(&row.controller_ip, "Invalid Controller IP format")?,
        camera_ip: camera_ip(&row.camera_ip).ok_or("Invalid Camera IP format")?,
        location: row.location.clone(),
        notes: String::new(),
    })
}

impl InventoryStore {
    /// Run [`Inventory::bulk_import_devices`] as one transition.
    pub fn bulk_import_devices(
        &self,
        rows: Vec<ImportRow>,
        vlan_id: Option<EntityId>,
    ) -> Result<ImportReport, CoreError> {
        self.transaction(|inv| inv.bulk_import_devices(rows, vlan_id))
    }

    /// Run [`Inventory::bulk_import_other_devices`] as one transition.
    pub fn bulk_import_other_devices(
        &self,
        rows: Vec<OtherImportRow>,
    ) -> Result<ImportReport, CoreError> {
        self.transaction(|inv| Ok(inv.bulk_import_other_devices(rows)))
    }
}
