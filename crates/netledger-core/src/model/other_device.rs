// ── Auxiliary equipment catalog ──
//
// Display/controller (and optional camera) addresses kept alongside the
// inventory.
// These never draw from or affect the allocation pool.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

use super::entity_id::EntityId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtherDevice {
    pub id: EntityId,
    pub name: String,
    pub display_ip: Ipv4Addr,
    pub controller_ip: Ipv4Addr,
    #[serde(default)]
    pub camera_ip: Option<Ipv4Addr>,
    pub location: String,
    #[serde(default)]
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
