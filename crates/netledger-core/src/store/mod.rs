// ── Allocation store ──
//
// `Inventory` holds the rules; `InventoryStore` shares one inventory
// between readers and serialized writers.

mod collection;
mod data_store;
mod inventory;

pub use data_store::InventoryStore;
pub use inventory::{Inventory, InventoryData, ManualIp, RangeCreated, RangeRemoval, VlanRemoval};
