// ── Typed request structs for store mutations ──
//
// Create requests carry raw user input (MAC strings, CIDR text) which
// the store validates. Update requests use `Option` for "leave as is"
// and `Option<Option<_>>` for nullable fields that may be cleared.

use serde::{Deserialize, Deserializer, Serialize};
use std::net::Ipv4Addr;

use crate::model::{DeviceType, EntityId};

/// Maps an explicit `null` to `Some(None)` so updates can clear a field.
fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

// ── Device ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDevice {
    pub name: String,
    #[serde(rename = "type", default)]
    pub device_type: DeviceType,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vlan_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_ip: Option<Ipv4Addr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub switch_ip: Option<Ipv4Addr>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub device_type: Option<DeviceType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub vlan_id: Option<Option<EntityId>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub mac_address: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub assigned_ip: Option<Option<Ipv4Addr>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub switch_ip: Option<Option<Ipv4Addr>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

// ── IP range ───────────────────────────────────────────────────────

/// How the extent of a new range is given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RangeBounds {
    /// Explicit inclusive endpoints.
    StartEnd { start: Ipv4Addr, end: Ipv4Addr },
    /// CIDR text such as `192.168.1.0/24`, resolved to its usable hosts.
    Cidr(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIpRange {
    pub name: String,
    pub bounds: RangeBounds,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vlan_id: Option<EntityId>,
}

// ── VLAN ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVlan {
    pub vlan_id: u16,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VlanUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vlan_id: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// ── Other devices ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOtherDevice {
    pub name: String,
    pub display_ip: Ipv4Addr,
    pub controller_ip: Ipv4Addr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera_ip: Option<Ipv4Addr>,
    pub location: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtherDeviceUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_ip: Option<Ipv4Addr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller_ip: Option<Ipv4Addr>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub camera_ip: Option<Option<Ipv4Addr>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}
