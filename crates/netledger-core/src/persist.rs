// ── State file ──
//
// Versioned JSON document holding the whole inventory:
// `{ "state": { devices, ipAddresses, ipRanges, vlans, otherDevices }, "version": 4 }`.
// A missing file loads as an empty inventory. An unreadable-as-JSON file is
// moved aside to `<name>.bad` and also loads as empty.

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::store::{Inventory, InventoryData};

/// Schema version written by this crate.
pub const STATE_VERSION: u32 = 4;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateFile {
    #[serde(default)]
    pub state: InventoryData,
    #[serde(default)]
    pub version: u32,
}

impl StateFile {
    pub fn from_inventory(inventory: &Inventory) -> Self {
        Self {
            state: inventory.to_data(),
            version: STATE_VERSION,
        }
    }
}

fn persistence_error(path: &Path, err: impl ToString) -> CoreError {
    CoreError::Persistence {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

/// Load the inventory stored at `path`.
///
/// Only I/O failures other than "not found" are errors. A malformed
/// document is renamed to `<path>.bad` so the next save cannot clobber it,
/// then treated as empty.
pub async fn load(path: &Path) -> Result<Inventory, CoreError> {
    let text = match tokio::fs::read_to_string(path).await {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no state file, starting empty");
            return Ok(Inventory::default());
        }
        Err(e) => return Err(persistence_error(path, e)),
    };

    let file: StateFile = match serde_json::from_str(&text) {
        Ok(file) => file,
        Err(e) => {
            let backup = bad_path(path);
            tokio::fs::rename(path, &backup)
                .await
                .map_err(|io| persistence_error(&backup, io))?;
            warn!(
                path = %path.display(),
                moved_to = %backup.display(),
                error = %e,
                "state file is malformed, set aside and starting empty"
            );
            return Ok(Inventory::default());
        }
    };
    if file.version != STATE_VERSION {
        warn!(
            path = %path.display(),
            found = file.version,
            expected = STATE_VERSION,
            "state file version differs, loading as-is"
        );
    }

    let inventory = Inventory::from_data(file.state);
    debug!(
        path = %path.display(),
        devices = inventory.devices().count(),
        ip_addresses = inventory.ip_addresses().count(),
        "state loaded"
    );
    Ok(inventory)
}

fn bad_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".bad");
    PathBuf::from(name)
}

/// Write the inventory to `path`, creating parent directories.
///
/// The document goes to a sibling temp file first and is renamed into
/// place, so a crash never leaves a half-written state file.
pub async fn save(path: &Path, inventory: &Inventory) -> Result<(), CoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| persistence_error(parent, e))?;
    }

    let json = serde_json::to_string_pretty(&StateFile::from_inventory(inventory))?;
    let staging = path.with_extension("json.tmp");
    tokio::fs::write(&staging, json)
        .await
        .map_err(|e| persistence_error(&staging, e))?;
    tokio::fs::rename(&staging, path)
        .await
        .map_err(|e| persistence_error(path, e))?;

    debug!(path = %path.display(), "state saved");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::requests::{NewDevice, NewIpRange, RangeBounds};

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let inv = load(&dir.path().join("absent.json")).await.unwrap();
        assert!(inv.is_empty());
    }

    #[tokio::test]
    async fn malformed_file_is_set_aside_and_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        tokio::fs::write(&path, "{ not json").await.unwrap();

        assert!(load(&path).await.unwrap().is_empty());
        assert!(!path.exists());
        let kept = tokio::fs::read_to_string(dir.path().join("state.json.bad"))
            .await
            .unwrap();
        assert_eq!(kept, "{ not json");

        // A save after the failed load leaves the set-aside copy untouched.
        save(&path, &Inventory::new()).await.unwrap();
        assert!(path.exists());
        assert!(dir.path().join("state.json.bad").exists());
    }

    #[tokio::test]
    async fn save_then_load_keeps_bindings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/dir/state.json");

        let mut inv = Inventory::new();
        inv.add_ip_range(NewIpRange {
            name: "LAN".into(),
            bounds: RangeBounds::Cidr("10.0.0.0/30".into()),
            vlan_id: None,
        })
        .unwrap();
        let device = inv
            .add_device(NewDevice {
                name: "gw".into(),
                location: "Closet".into(),
                assigned_ip: Some("10.0.0.1".parse().unwrap()),
                ..NewDevice::default()
            })
            .unwrap();
        save(&path, &inv).await.unwrap();

        let loaded = load(&path).await.unwrap();
        assert_eq!(loaded.to_data(), inv.to_data());
        assert_eq!(
            loaded.device_by_ip("10.0.0.1".parse().unwrap()).unwrap().id,
            device.id
        );
        assert!(loaded.check_consistency().is_empty());
    }

    #[tokio::test]
    async fn older_version_with_missing_collections_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let raw = r#"{
            "state": {
                "vlans": [{
                    "id": "v1",
                    "vlanId": 10,
                    "name": "Office",
                    "description": "",
                    "createdAt": "2024-05-01T10:00:00.000Z",
                    "updatedAt": "2024-05-01T10:00:00.000Z"
                }]
            },
            "version": 1
        }"#;
        tokio::fs::write(&path, raw).await.unwrap();

        let inv = load(&path).await.unwrap();
        assert_eq!(inv.vlan_by_tag(10).unwrap().name, "Office");
        assert_eq!(inv.devices().count(), 0);
        assert_eq!(inv.other_devices().count(), 0);
    }

    #[test]
    fn state_file_shape() {
        let json = serde_json::to_value(StateFile::from_inventory(&Inventory::new())).unwrap();
        assert_eq!(json["version"], 4);
        for key in ["devices", "ipAddresses", "ipRanges", "vlans", "otherDevices"] {
            assert!(json["state"][key].is_array(), "missing {key}");
        }
    }
}
