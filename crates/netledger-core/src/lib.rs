// netledger-core: IP allocation model shared by the netledger CLI and any other front end.

pub mod addr;
pub mod backup;
pub mod error;
pub mod export;
pub mod import;
pub mod model;
pub mod persist;
pub mod requests;
pub mod store;
pub mod stream;
pub mod view;

// ── Primary re-exports ──────────────────────────────────────────────
pub use backup::{Backup, ParsedBackup, RestoreReport, parse_backup};
pub use error::CoreError;
pub use import::{
    ImportReport, ImportRow, OtherImportRow, ParsedTable, parse_others_table, parse_table,
};
pub use requests::*;
pub use store::{
    Inventory, InventoryData, InventoryStore, ManualIp, RangeCreated, RangeRemoval, VlanRemoval,
};
pub use stream::InventoryStream;
pub use view::{DashboardFilter, DashboardRow, InventoryStats, SortDirection, SortField};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    Device, DeviceType, EntityId, IpAddress, IpRange, IpStatus, MacAddress, OtherDevice,
    RangeRef, VLAN_TAG_MAX, VLAN_TAG_MIN, Vlan,
};
