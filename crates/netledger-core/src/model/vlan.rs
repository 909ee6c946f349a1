// ── VLAN domain type ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity_id::EntityId;

/// Lowest and highest assignable 802.1Q tags.
pub const VLAN_TAG_MIN: u16 = 1;
pub const VLAN_TAG_MAX: u16 = 4094;

/// A network segment identified by its numeric tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vlan {
    pub id: EntityId,
    /// 802.1Q tag, unique across the inventory.
    pub vlan_id: u16,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vlan {
    /// Human label used wherever a VLAN reference is rendered,
    /// e.g. `VLAN 10 - Office`.
    pub fn label(&self) -> String {
        format!("VLAN {} - {}", self.vlan_id, self.name)
    }
}
