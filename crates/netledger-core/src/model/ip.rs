// ── IP address and IP range domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use strum::{Display, EnumIter, EnumString};

use super::entity_id::EntityId;

/// Allocation state of a single address.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum IpStatus {
    Available,
    Assigned,
    Reserved,
}

/// Where an address record came from.
///
/// Serialized as a plain string: the owning range's id, or one of the
/// sentinels `"manual"` / `"manual-import"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RangeRef {
    Range(EntityId),
    /// Added ad hoc (manual entry or backup restore).
    Manual,
    /// Synthesized by a bulk import for an address outside any range.
    ManualImport,
}

impl RangeRef {
    const MANUAL: &'static str = "manual";
    const MANUAL_IMPORT: &'static str = "manual-import";

    pub fn range_id(&self) -> Option<&EntityId> {
        match self {
            Self::Range(id) => Some(id),
            Self::Manual | Self::ManualImport => None,
        }
    }

    pub fn is_manual(&self) -> bool {
        !matches!(self, Self::Range(_))
    }
}

impl fmt::Display for RangeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Range(id) => write!(f, "{id}"),
            Self::Manual => f.write_str(Self::MANUAL),
            Self::ManualImport => f.write_str(Self::MANUAL_IMPORT),
        }
    }
}

impl From<String> for RangeRef {
    fn from(s: String) -> Self {
        match s.as_str() {
            Self::MANUAL => Self::Manual,
            Self::MANUAL_IMPORT => Self::ManualImport,
            _ => Self::Range(EntityId::from(s)),
        }
    }
}

impl From<RangeRef> for String {
    fn from(r: RangeRef) -> Self {
        r.to_string()
    }
}

/// One trackable address.
///
/// `status == Assigned` iff `device_id` is set iff `assigned_at` is set;
/// the store keeps these in lockstep with the owning device's
/// `assigned_ip`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpAddress {
    pub id: EntityId,
    pub address: Ipv4Addr,
    pub status: IpStatus,
    pub device_id: Option<EntityId>,
    pub range_id: RangeRef,
    pub vlan_id: Option<EntityId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub assigned_at: Option<DateTime<Utc>>,
}

impl IpAddress {
    pub(crate) fn new(address: Ipv4Addr, range_id: RangeRef, vlan_id: Option<EntityId>) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::new(),
            address,
            status: IpStatus::Available,
            device_id: None,
            range_id,
            vlan_id,
            created_at: now,
            updated_at: now,
            assigned_at: None,
        }
    }

    pub fn is_bound(&self) -> bool {
        self.device_id.is_some()
    }

    pub(crate) fn bind(&mut self, device_id: EntityId, at: DateTime<Utc>) {
        self.status = IpStatus::Assigned;
        self.device_id = Some(device_id);
        self.assigned_at = Some(at);
        self.updated_at = at;
    }

    pub(crate) fn release(&mut self, status: IpStatus, at: DateTime<Utc>) {
        self.status = status;
        self.device_id = None;
        self.assigned_at = None;
        self.updated_at = at;
    }
}

/// A contiguous administratively defined block, materialized into
/// individual [`IpAddress`] records when it is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpRange {
    pub id: EntityId,
    pub name: String,
    pub start_ip: Ipv4Addr,
    pub end_ip: Ipv4Addr,
    pub cidr: Option<String>,
    pub vlan_id: Option<EntityId>,
    pub created_at: DateTime<Utc>,
}
