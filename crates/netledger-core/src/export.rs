// ── CSV export ──
//
// Flat tables with foreign keys resolved to human labels. Quoting is
// left to the csv writer.

use std::collections::HashMap;

use chrono::{DateTime, SecondsFormat, Utc};
use csv::Writer;

use crate::error::CoreError;
use crate::model::{Device, EntityId};
use crate::store::Inventory;
use crate::view::DashboardRow;

/// Label for addresses whose range is unknown or manual.
const MANUAL_RANGE: &str = "Manual";

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn optional_timestamp(at: Option<DateTime<Utc>>) -> String {
    at.map(timestamp).unwrap_or_default()
}

fn opt_string(value: Option<impl ToString>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

fn finish(wtr: Writer<Vec<u8>>) -> Result<String, CoreError> {
    let data = wtr
        .into_inner()
        .map_err(|e| CoreError::Internal(format!("CSV writer error: {e}")))?;
    String::from_utf8(data).map_err(|e| CoreError::Internal(format!("UTF-8 conversion error: {e}")))
}

fn vlan_labels(inv: &Inventory) -> HashMap<&EntityId, String> {
    inv.vlans().map(|v| (&v.id, v.label())).collect()
}

fn vlan_label(labels: &HashMap<&EntityId, String>, vlan_id: Option<&EntityId>) -> String {
    vlan_id
        .and_then(|id| labels.get(id))
        .cloned()
        .unwrap_or_default()
}

pub fn devices_csv(inv: &Inventory) -> Result<String, CoreError> {
    let labels = vlan_labels(inv);
    let mut wtr = Writer::from_writer(vec![]);

    wtr.write_record([
        "Name",
        "Location",
        "VLAN",
        "IP Address",
        "Switch IP",
        "MAC Address",
        "Type",
        "Notes",
        "Assigned At",
        "Created At",
    ])?;

    for device in inv.devices() {
        wtr.write_record([
            device.name.clone(),
            device.location.clone(),
            vlan_label(&labels, device.vlan_id.as_ref()),
            opt_string(device.assigned_ip),
            opt_string(device.switch_ip),
            opt_string(device.mac_address.as_ref()),
            device.device_type.to_string(),
            device.notes.clone(),
            optional_timestamp(device.assigned_at),
            timestamp(device.created_at),
        ])?;
    }

    finish(wtr)
}

pub fn ip_addresses_csv(inv: &Inventory) -> Result<String, CoreError> {
    let labels = vlan_labels(inv);
    let ranges: HashMap<&EntityId, &str> = inv
        .ip_ranges()
        .map(|r| (&r.id, r.name.as_str()))
        .collect();
    let mut wtr = Writer::from_writer(vec![]);

    wtr.write_record([
        "IP Address",
        "Status",
        "Device Name",
        "Location",
        "Switch IP",
        "VLAN",
        "Range Name",
        "Assigned At",
        "Created At",
    ])?;

    for ip in inv.ip_addresses() {
        let device: Option<&Device> = ip.device_id.as_ref().and_then(|id| inv.device(id));
        let range = ip
            .range_id
            .range_id()
            .and_then(|id| ranges.get(id).copied())
            .unwrap_or(MANUAL_RANGE);
        wtr.write_record([
            ip.address.to_string(),
            ip.status.to_string(),
            opt_string(device.map(|d| &d.name)),
            opt_string(device.map(|d| &d.location)),
            opt_string(device.and_then(|d| d.switch_ip)),
            vlan_label(&labels, ip.vlan_id.as_ref()),
            range.to_owned(),
            optional_timestamp(ip.assigned_at),
            timestamp(ip.created_at),
        ])?;
    }

    finish(wtr)
}

pub fn vlans_csv(inv: &Inventory) -> Result<String, CoreError> {
    let mut wtr = Writer::from_writer(vec![]);
    wtr.write_record(["VLAN ID", "Name", "Description", "Created At"])?;
    for vlan in inv.vlans() {
        wtr.write_record([
            vlan.vlan_id.to_string(),
            vlan.name.clone(),
            vlan.description.clone(),
            timestamp(vlan.created_at),
        ])?;
    }
    finish(wtr)
}

/// The auxiliary equipment catalog. A missing camera renders as `-`.
pub fn other_devices_csv(inv: &Inventory) -> Result<String, CoreError> {
    let mut wtr = Writer::from_writer(vec![]);
    wtr.write_record([
        "Name",
        "Display IP",
        "Controller IP",
        "Camera IP",
        "Location",
        "Notes",
        "Created At",
    ])?;
    for other in inv.other_devices() {
        wtr.write_record([
            other.name.clone(),
            other.display_ip.to_string(),
            other.controller_ip.to_string(),
            other
                .camera_ip
                .as_ref()
                .map_or_else(|| "-".to_owned(), ToString::to_string),
            other.location.clone(),
            other.notes.clone(),
            timestamp(other.created_at),
        ])?;
    }
    finish(wtr)
}

/// Export already filtered and sorted dashboard rows.
pub fn dashboard_csv(rows: &[DashboardRow]) -> Result<String, CoreError> {
    let mut wtr = Writer::from_writer(vec![]);
    wtr.write_record([
        "IP Address",
        "Device Name",
        "Location",
        "VLAN",
        "Status",
        "Switch IP",
        "Assigned At",
        "Created At",
    ])?;
    for row in rows {
        wtr.write_record([
            row.ip_address.to_string(),
            row.device_name.clone(),
            row.location.clone(),
            row.vlan_label().unwrap_or_default(),
            row.status.to_string(),
            opt_string(row.switch_ip),
            optional_timestamp(row.assigned_at),
            timestamp(row.created_at),
        ])?;
    }
    finish(wtr)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::requests::{NewDevice, NewIpRange, NewOtherDevice, NewVlan, RangeBounds};
    use crate::view::dashboard_rows;

    fn fixture() -> Inventory {
        let mut inv = Inventory::new();
        let office = inv
            .add_vlan(NewVlan {
                vlan_id: 10,
                name: "Office".into(),
                description: "Desks, printers".into(),
            })
            .unwrap();
        inv.add_ip_range(NewIpRange {
            name: "Desk LAN".into(),
            bounds: RangeBounds::StartEnd {
                start: "192.168.1.1".parse().unwrap(),
                end: "192.168.1.2".parse().unwrap(),
            },
            vlan_id: Some(office.id.clone()),
        })
        .unwrap();
        inv.add_manual_ip("172.16.0.1".parse().unwrap(), None).unwrap();
        inv.add_device(NewDevice {
            name: "printer \"A\"".into(),
            location: "Copy room, 2F".into(),
            vlan_id: Some(office.id.clone()),
            assigned_ip: Some("192.168.1.2".parse().unwrap()),
            ..NewDevice::default()
        })
        .unwrap();
        inv
    }

    fn records(csv_text: &str) -> Vec<Vec<String>> {
        csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(csv_text.as_bytes())
            .records()
            .map(|r| r.unwrap().iter().map(str::to_owned).collect())
            .collect()
    }

    #[test]
    fn devices_export_resolves_vlan_and_quotes_fields() {
        let text = devices_csv(&fixture()).unwrap();
        assert!(text.contains("\"printer \"\"A\"\"\""));
        let rows = records(&text);
        assert_eq!(rows[0][0], "Name");
        assert_eq!(rows[1][0], "printer \"A\"");
        assert_eq!(rows[1][1], "Copy room, 2F");
        assert_eq!(rows[1][2], "VLAN 10 - Office");
        assert_eq!(rows[1][3], "192.168.1.2");
        assert!(rows[1][8].ends_with('Z'));
    }

    #[test]
    fn ip_export_names_ranges_and_falls_back_to_manual() {
        let rows = records(&ip_addresses_csv(&fixture()).unwrap());
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[1][6], "Desk LAN");
        assert_eq!(rows[2][1], "assigned");
        assert_eq!(rows[2][2], "printer \"A\"");
        assert_eq!(rows[3][0], "172.16.0.1");
        assert_eq!(rows[3][6], "Manual");
        assert_eq!(rows[3][5], "");
    }

    #[test]
    fn vlan_and_dashboard_exports() {
        let inv = fixture();
        let rows = records(&vlans_csv(&inv).unwrap());
        assert_eq!(rows[1][..3], ["10", "Office", "Desks, printers"]);

        let dash = dashboard_rows(&inv);
        let rows = records(&dashboard_csv(&dash).unwrap());
        assert_eq!(rows.len(), dash.len() + 1);
        assert_eq!(rows[1][1], "printer \"A\"");
    }

    #[test]
    fn other_devices_export_marks_missing_camera() {
        let mut inv = fixture();
        for (display, name, camera) in [
            ("10.8.0.1", "Screen 1", Some("10.7.0.1")),
            ("10.8.0.2", "Screen 2", None),
        ] {
            inv.add_other_device(NewOtherDevice {
                name: name.into(),
                display_ip: display.parse().unwrap(),
                controller_ip: "10.9.0.1".parse().unwrap(),
                camera_ip: camera.map(|c| c.parse().unwrap()),
                location: "Lobby, east".into(),
                notes: String::new(),
            })
            .unwrap();
        }

        let rows = records(&other_devices_csv(&inv).unwrap());
        assert_eq!(rows[0][..4], ["Name", "Display IP", "Controller IP", "Camera IP"]);
        assert_eq!(rows[1][3], "10.7.0.1");
        assert_eq!(rows[2][3], "-");
        assert_eq!(rows[2][4], "Lobby, east");
    }
}
