// ── Device domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use strum::{Display, EnumIter, EnumString};

use super::entity_id::{EntityId, MacAddress};

/// Device category.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DeviceType {
    Pc,
    Laptop,
    Phone,
    Tablet,
    Server,
    Router,
    Switch,
    Printer,
    Camera,
    Iot,
    #[default]
    Other,
}

impl DeviceType {
    pub fn label(self) -> &'static str {
        match self {
            Self::Pc => "Desktop PC",
            Self::Laptop => "Laptop",
            Self::Phone => "Phone",
            Self::Tablet => "Tablet",
            Self::Server => "Server",
            Self::Router => "Router",
            Self::Switch => "Switch",
            Self::Printer => "Printer",
            Self::Camera => "Camera",
            Self::Iot => "IoT Device",
            Self::Other => "Other",
        }
    }
}

/// A tracked device.
///
/// `assigned_ip` duplicates the address of at most one [`IpAddress`]
/// record; the pair is linked by address, not by id, and the store
/// updates both sides in the same transition.
///
/// [`IpAddress`]: super::IpAddress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: EntityId,
    pub name: String,
    #[serde(rename = "type", default)]
    pub device_type: DeviceType,
    #[serde(default)]
    pub location: String,
    pub vlan_id: Option<EntityId>,
    pub mac_address: Option<MacAddress>,
    pub assigned_ip: Option<Ipv4Addr>,
    pub switch_ip: Option<Ipv4Addr>,
    #[serde(default)]
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub assigned_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn device_type_round_trips_through_strings() {
        assert_eq!("iot".parse::<DeviceType>().unwrap(), DeviceType::Iot);
        assert_eq!("Server".parse::<DeviceType>().unwrap(), DeviceType::Server);
        assert_eq!(DeviceType::Pc.to_string(), "pc");
        assert_eq!(DeviceType::Iot.label(), "IoT Device");
    }

    #[test]
    fn device_type_serializes_under_type_key() {
        let raw = r#"{
            "id": "d1",
            "name": "printer-2f",
            "type": "printer",
            "location": "2nd floor",
            "vlanId": null,
            "macAddress": "aa-bb-cc-dd-ee-ff",
            "assignedIp": "192.168.1.3",
            "switchIp": null,
            "notes": "",
            "createdAt": "2024-05-01T10:00:00.000Z",
            "updatedAt": "2024-05-01T10:00:00.000Z",
            "assignedAt": "2024-05-01T10:00:00.000Z"
        }"#;
        let device: Device = serde_json::from_str(raw).unwrap();
        assert_eq!(device.device_type, DeviceType::Printer);
        assert_eq!(device.mac_address.unwrap().as_str(), "AA:BB:CC:DD:EE:FF");
        assert_eq!(device.assigned_ip, Some(Ipv4Addr::new(192, 168, 1, 3)));
    }
}
