// ── Shared inventory handle ──
//
// Publishes the inventory through a `watch` channel. Each mutation runs
// inside one `send_if_modified` call against a staged copy, which is
// committed only when the operation succeeds. Writers are serialized by
// the channel's lock and readers only ever see whole snapshots.

use std::net::Ipv4Addr;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use super::inventory::{Inventory, ManualIp, RangeCreated, RangeRemoval, VlanRemoval};
use crate::error::CoreError;
use crate::model::{Device, EntityId, IpAddress, IpStatus, OtherDevice, Vlan};
use crate::requests::{
    DeviceUpdate, NewDevice, NewIpRange, NewOtherDevice, NewVlan, OtherDeviceUpdate, VlanUpdate,
};
use crate::stream::InventoryStream;

/// Cheaply cloneable handle to one shared [`Inventory`].
#[derive(Debug, Clone)]
pub struct InventoryStore {
    state: Arc<watch::Sender<Arc<Inventory>>>,
}

impl Default for InventoryStore {
    fn default() -> Self {
        Self::new(Inventory::default())
    }
}

impl InventoryStore {
    pub fn new(inventory: Inventory) -> Self {
        let (state, _) = watch::channel(Arc::new(inventory));
        Self {
            state: Arc::new(state),
        }
    }

    /// The current state. Later mutations never alter a snapshot.
    pub fn snapshot(&self) -> Arc<Inventory> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> InventoryStream {
        InventoryStream::new(self.state.subscribe())
    }

    /// Swap in a whole inventory in one transition.
    pub fn replace(&self, inventory: Inventory) {
        self.state.send_replace(Arc::new(inventory));
        info!("inventory replaced");
    }

    /// Run `op` against a staged copy of the inventory and publish the
    /// result only if it returns `Ok`.
    pub fn transaction<T>(
        &self,
        op: impl FnOnce(&mut Inventory) -> Result<T, CoreError>,
    ) -> Result<T, CoreError> {
        let mut outcome = None;
        self.state.send_if_modified(|state| {
            let mut staged = Inventory::clone(state);
            let result = op(&mut staged);
            let commit = result.is_ok();
            if commit {
                *state = Arc::new(staged);
            }
            outcome = Some(result);
            commit
        });
        outcome.unwrap_or_else(|| Err(CoreError::Internal("mutation did not run".into())))
    }

    /// Like [`transaction`](Self::transaction) for operations that are a
    /// silent no-op when their target does not exist.
    fn transaction_opt<T>(&self, op: impl FnOnce(&mut Inventory) -> Option<T>) -> Option<T> {
        let mut outcome = None;
        self.state.send_if_modified(|state| {
            let mut staged = Inventory::clone(state);
            outcome = op(&mut staged);
            if outcome.is_some() {
                *state = Arc::new(staged);
            }
            outcome.is_some()
        });
        outcome
    }

    // ── VLANs ────────────────────────────────────────────────────────

    pub fn add_vlan(&self, req: NewVlan) -> Result<Vlan, CoreError> {
        self.transaction(|inv| inv.add_vlan(req))
    }

    pub fn update_vlan(&self, id: &EntityId, update: VlanUpdate) -> Result<Vlan, CoreError> {
        self.transaction(|inv| inv.update_vlan(id, update))
    }

    pub fn delete_vlan(&self, id: &EntityId) -> Option<VlanRemoval> {
        self.transaction_opt(|inv| inv.delete_vlan(id))
    }

    // ── Ranges and addresses ─────────────────────────────────────────

    pub fn add_ip_range(&self, req: NewIpRange) -> Result<RangeCreated, CoreError> {
        self.transaction(|inv| inv.add_ip_range(req))
    }

    pub fn delete_ip_range(&self, id: &EntityId) -> Option<RangeRemoval> {
        self.transaction_opt(|inv| inv.delete_ip_range(id))
    }

    pub fn add_manual_ip(
        &self,
        address: Ipv4Addr,
        vlan_id: Option<EntityId>,
    ) -> Result<ManualIp, CoreError> {
        self.transaction(|inv| inv.add_manual_ip(address, vlan_id))
    }

    pub fn update_ip_status(
        &self,
        id: &EntityId,
        status: IpStatus,
    ) -> Result<IpAddress, CoreError> {
        self.transaction(|inv| inv.update_ip_status(id, status))
    }

    pub fn assign_ip_to_device(
        &self,
        ip_id: &EntityId,
        device_id: &EntityId,
    ) -> Result<IpAddress, CoreError> {
        self.transaction(|inv| inv.assign_ip_to_device(ip_id, device_id))
    }

    pub fn unassign_ip(&self, ip_id: &EntityId) -> Result<bool, CoreError> {
        self.transaction(|inv| inv.unassign_ip(ip_id))
    }

    // ── Devices ──────────────────────────────────────────────────────

    pub fn add_device(&self, req: NewDevice) -> Result<Device, CoreError> {
        self.transaction(|inv| inv.add_device(req))
    }

    pub fn update_device(&self, id: &EntityId, update: DeviceUpdate) -> Result<Device, CoreError> {
        self.transaction(|inv| inv.update_device(id, update))
    }

    pub fn delete_device(&self, id: &EntityId) -> Option<Device> {
        self.transaction_opt(|inv| inv.delete_device(id))
    }

    pub fn clear_all_data(&self) {
        self.state.send_modify(|state| Arc::make_mut(state).clear_all_data());
    }

    // ── Other devices ────────────────────────────────────────────────

    pub fn add_other_device(&self, req: NewOtherDevice) -> Result<OtherDevice, CoreError> {
        self.transaction(|inv| inv.add_other_device(req))
    }

    pub fn update_other_device(
        &self,
        id: &EntityId,
        update: OtherDeviceUpdate,
    ) -> Result<OtherDevice, CoreError> {
        self.transaction(|inv| inv.update_other_device(id, update))
    }

    pub fn delete_other_device(&self, id: &EntityId) -> Option<OtherDevice> {
        self.transaction_opt(|inv| inv.delete_other_device(id))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::requests::RangeBounds;

    fn lan(start: &str, end: &str) -> NewIpRange {
        NewIpRange {
            name: "LAN".into(),
            bounds: RangeBounds::StartEnd {
                start: start.parse().unwrap(),
                end: end.parse().unwrap(),
            },
            vlan_id: None,
        }
    }

    #[tokio::test]
    async fn committed_mutation_notifies_subscribers() {
        let store = InventoryStore::default();
        let mut stream = store.subscribe();

        store.add_ip_range(lan("10.0.0.1", "10.0.0.4")).unwrap();
        let snap = stream.changed().await.unwrap();
        assert_eq!(snap.ip_addresses().count(), 4);
        assert_eq!(stream.current().ip_addresses().count(), 4);
    }

    #[tokio::test]
    async fn failed_mutation_is_invisible() {
        let store = InventoryStore::default();
        store.add_ip_range(lan("10.0.0.1", "10.0.0.4")).unwrap();
        let before = store.snapshot();
        let stream = store.subscribe();

        let err = store.add_ip_range(lan("10.0.0.3", "10.0.0.9")).unwrap_err();
        assert!(err.is_conflict());
        assert!(Arc::ptr_eq(&before, &store.snapshot()));
        assert!(Arc::ptr_eq(&before, &stream.latest()));
    }

    #[test]
    fn snapshots_are_isolated_from_later_writes() {
        let store = InventoryStore::default();
        store.add_ip_range(lan("10.0.0.1", "10.0.0.2")).unwrap();
        let old = store.snapshot();

        store.clear_all_data();
        assert_eq!(old.ip_addresses().count(), 2);
        assert_eq!(store.snapshot().ip_addresses().count(), 0);
    }

    #[test]
    fn delete_of_unknown_id_keeps_snapshot() {
        let store = InventoryStore::default();
        let before = store.snapshot();
        assert!(store.delete_device(&EntityId::from("ghost")).is_none());
        assert!(Arc::ptr_eq(&before, &store.snapshot()));
    }

    #[tokio::test]
    async fn replace_publishes_one_snapshot() {
        let store = InventoryStore::default();
        let mut stream = store.subscribe();

        let mut fresh = Inventory::new();
        fresh.add_manual_ip("172.16.0.1".parse().unwrap(), None).unwrap();
        store.replace(fresh);

        let snap = stream.changed().await.unwrap();
        assert_eq!(snap.ip_addresses().count(), 1);
    }

    #[test]
    fn clones_share_state() {
        let store = InventoryStore::default();
        let other = store.clone();
        other
            .add_vlan(NewVlan {
                vlan_id: 30,
                name: "Voice".into(),
                description: String::new(),
            })
            .unwrap();
        assert!(store.snapshot().vlan_by_tag(30).is_some());
    }
}
