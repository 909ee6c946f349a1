// ── Domain model ──
//
// Canonical inventory types. Field names serialize in camelCase so
// state files and backups keep their established shape.

pub mod device;
pub mod entity_id;
pub mod ip;
pub mod other_device;
pub mod vlan;

pub use device::{Device, DeviceType};
pub use entity_id::{EntityId, MacAddress};
pub use ip::{IpAddress, IpRange, IpStatus, RangeRef};
pub use other_device::OtherDevice;
pub use vlan::{VLAN_TAG_MAX, VLAN_TAG_MIN, Vlan};
