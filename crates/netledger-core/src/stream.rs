// ── Reactive inventory stream ──
//
// Subscription handle over the store's watch channel. Every committed
// mutation publishes one whole-inventory snapshot.

use std::sync::Arc;

use tokio::sync::watch;

use crate::store::Inventory;

/// A subscription to the inventory.
///
/// Provides both point-in-time snapshot access and change notification
/// via [`changed`](Self::changed).
pub struct InventoryStream {
    current: Arc<Inventory>,
    receiver: watch::Receiver<Arc<Inventory>>,
}

impl InventoryStream {
    pub(crate) fn new(mut receiver: watch::Receiver<Arc<Inventory>>) -> Self {
        let current = receiver.borrow_and_update().clone();
        Self { current, receiver }
    }

    /// The snapshot captured at creation or at the last `changed()`.
    pub fn current(&self) -> &Arc<Inventory> {
        &self.current
    }

    /// The latest published snapshot.
    pub fn latest(&self) -> Arc<Inventory> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next committed mutation and return its snapshot.
    /// Returns `None` once the store has been dropped.
    pub async fn changed(&mut self) -> Option<Arc<Inventory>> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }
}
