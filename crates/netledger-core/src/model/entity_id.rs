// ── Core identity types ──
//
// EntityId and MacAddress form the foundation of every domain type.
// Records created by this crate get UUIDs; identifiers carried in from
// older state files or backups are kept verbatim as strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::addr;
use crate::error::CoreError;

// ── EntityId ────────────────────────────────────────────────────────

/// Canonical identifier for any inventory record.
///
/// Wraps either a UUID (records created here) or an opaque legacy
/// string (records imported from older data). Consumers never care which.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Uuid(Uuid),
    Legacy(String),
}

impl EntityId {
    /// Fresh random identifier.
    pub fn new() -> Self {
        Self::Uuid(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Option<&Uuid> {
        match self {
            Self::Uuid(u) => Some(u),
            Self::Legacy(_) => None,
        }
    }

    pub fn as_legacy(&self) -> Option<&str> {
        match self {
            Self::Legacy(s) => Some(s),
            Self::Uuid(_) => None,
        }
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uuid(u) => write!(f, "{u}"),
            Self::Legacy(s) => write!(f, "{s}"),
        }
    }
}

impl FromStr for EntityId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_owned()))
    }
}

impl From<Uuid> for EntityId {
    fn from(u: Uuid) -> Self {
        Self::Uuid(u)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        match Uuid::parse_str(&s) {
            Ok(u) => Self::Uuid(u),
            Err(_) => Self::Legacy(s),
        }
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self::from(s.to_owned())
    }
}

// ── MacAddress ──────────────────────────────────────────────────────

/// MAC address, normalized to upper-case colon-separated format
/// (`AA:BB:CC:DD:EE:FF`).
///
/// [`MacAddress::parse`] validates; the `From<String>` conversion used
/// when reading stored data only normalizes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct MacAddress(String);

impl MacAddress {
    /// Validate and normalize a MAC in colon- or dash-separated form.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, CoreError> {
        let raw = raw.as_ref().trim();
        if !addr::is_valid_mac(raw) {
            return Err(CoreError::validation(format!(
                "Invalid MAC address format: {raw}"
            )));
        }
        Ok(Self(addr::format_mac(raw)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison, tolerant of un-normalized stored values.
    pub fn matches(&self, other: &MacAddress) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MacAddress {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<String> for MacAddress {
    fn from(raw: String) -> Self {
        Self(addr::format_mac(&raw))
    }
}

impl From<MacAddress> for String {
    fn from(mac: MacAddress) -> Self {
        mac.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn entity_id_from_uuid_string() {
        let id = EntityId::from("550e8400-e29b-41d4-a716-446655440000".to_owned());
        assert!(id.as_uuid().is_some());
    }

    #[test]
    fn entity_id_from_legacy_string() {
        let id = EntityId::from("1712345678901-k3j2h1g0f".to_owned());
        assert_eq!(id.as_legacy(), Some("1712345678901-k3j2h1g0f"));
    }

    #[test]
    fn entity_id_new_is_unique() {
        assert_ne!(EntityId::new(), EntityId::new());
    }

    #[test]
    fn entity_id_serializes_as_plain_string() {
        let id = EntityId::from("manual-legacy-id");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"manual-legacy-id\"");
        let back: EntityId = serde_json::from_str("\"manual-legacy-id\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn mac_address_normalizes_dashes_and_case() {
        let mac = MacAddress::parse("aa-bb-cc-dd-ee-ff").unwrap();
        assert_eq!(mac.as_str(), "AA:BB:CC:DD:EE:FF");
    }

    #[test]
    fn mac_address_rejects_garbage() {
        let err = MacAddress::parse("not-a-mac").unwrap_err();
        assert!(err.to_string().contains("Invalid MAC"));
    }

    #[test]
    fn mac_address_matches_ignores_case() {
        let a = MacAddress::from("aa:bb:cc:dd:ee:ff".to_owned());
        let b = MacAddress::parse("AA:BB:CC:DD:EE:FF").unwrap();
        assert!(a.matches(&b));
    }

    #[test]
    fn mac_address_deserialize_normalizes() {
        let mac: MacAddress = serde_json::from_str("\"aa-bb-cc-dd-ee-ff\"").unwrap();
        assert_eq!(mac.to_string(), "AA:BB:CC:DD:EE:FF");
    }
}
