//! Local cart state synchronized with the remote `cart_data` hashmap.
//!
//! Mutations are optimistic: local state changes immediately and the remote
//! write is queued behind it. Write failures are logged and never rolled
//! back; read failures degrade to an empty cart instead of blocking the
//! view.

mod writer;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tracing::warn;

use candleworks_core::{CartItem, CartRecord, QuantityInput};

use crate::api::ApiClient;
use crate::api::catalog::Product;
use writer::{CartWriter, WriteOp};

struct CartInner {
    api: ApiClient,
    writer: CartWriter,
    items: Mutex<Vec<CartItem>>,
    /// Raw text held for fields mid-edit (empty or invalid input); cleared
    /// once a valid value is written through or committed.
    edits: Mutex<HashMap<String, String>>,
    /// Distinct-item count, bumped on membership changes. Drives the header
    /// badge and any other cart-dependent view.
    changed_tx: watch::Sender<usize>,
}

/// The cart store: ordered local items plus the synchronization protocol.
///
/// Cheap to clone; all clones share one cart.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartInner>,
}

impl CartStore {
    /// Create an empty cart bound to the backend.
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        let writer = CartWriter::new(api.clone());
        let (changed_tx, _) = watch::channel(0);
        Self {
            inner: Arc::new(CartInner {
                api,
                writer,
                items: Mutex::new(Vec::new()),
                edits: Mutex::new(HashMap::new()),
                changed_tx,
            }),
        }
    }

    /// Subscribe to cart membership changes. The value is the distinct-item
    /// count.
    #[must_use]
    pub fn subscribe_changes(&self) -> watch::Receiver<usize> {
        self.inner.changed_tx.subscribe()
    }

    /// Snapshot of the current items, in stable name order.
    #[must_use]
    pub fn items(&self) -> Vec<CartItem> {
        self.inner
            .items
            .lock()
            .map(|items| items.clone())
            .unwrap_or_default()
    }

    /// Number of distinct items.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.inner.items.lock().map(|items| items.len()).unwrap_or(0)
    }

    /// Raw text held for an item's quantity field mid-edit, if any.
    #[must_use]
    pub fn pending_edit(&self, name: &str) -> Option<String> {
        self.inner
            .edits
            .lock()
            .ok()
            .and_then(|edits| edits.get(name).cloned())
    }

    /// Fetch the full remote hashmap and project it into the local cart.
    ///
    /// Any fetch or parse failure degrades to an empty cart with a warning;
    /// the view renders "cart is empty" rather than an error.
    pub async fn load(&self) {
        let items = match self.fetch_items().await {
            Ok(items) => items,
            Err(e) => {
                warn!(error = %e, "Failed to load cart; showing empty cart");
                Vec::new()
            }
        };
        self.replace_items(items);
    }

    async fn fetch_items(&self) -> Result<Vec<CartItem>, crate::api::ApiError> {
        let entries = self.inner.api.query_cart().await?;
        let mut items = Vec::with_capacity(entries.len());
        for (name, raw) in entries {
            let record: CartRecord = serde_json::from_str(&raw)
                .map_err(|e| crate::api::ApiError::Parse(format!("entry {name}: {e}")))?;
            items.push(CartItem::from_record(name, record));
        }
        Ok(items)
    }

    /// Handle a change event on an item's quantity field.
    ///
    /// Invalid or empty input is held locally without writing through, so
    /// the user can clear the field mid-edit. A valid positive integer
    /// updates local state immediately and queues the remote write.
    pub fn edit_quantity(&self, name: &str, raw: &str) {
        match QuantityInput::parse(raw).write_through() {
            Some(quantity) => self.apply_quantity(name, quantity),
            None => {
                if let Ok(mut edits) = self.inner.edits.lock() {
                    edits.insert(name.to_string(), raw.to_string());
                }
            }
        }
    }

    /// Handle a blur/commit on an item's quantity field. Anything that is
    /// not a positive integer coerces to 1 before writing through.
    ///
    /// Returns the committed quantity.
    pub fn commit_quantity(&self, name: &str, raw: &str) -> u32 {
        let quantity = QuantityInput::parse(raw).commit();
        self.apply_quantity(name, quantity);
        quantity
    }

    fn apply_quantity(&self, name: &str, quantity: u32) {
        if let Ok(mut edits) = self.inner.edits.lock() {
            edits.remove(name);
        }

        let record = {
            let Ok(mut items) = self.inner.items.lock() else {
                return;
            };
            let Some(item) = items.iter_mut().find(|item| item.name == name) else {
                return;
            };
            item.quantity = quantity;
            item.record()
        };

        self.inner.writer.enqueue(name, WriteOp::Upsert(record));
    }

    /// Remove an item: optimistic local removal plus a queued remote delete.
    pub fn remove(&self, name: &str) {
        let removed = {
            let Ok(mut items) = self.inner.items.lock() else {
                return;
            };
            let before = items.len();
            items.retain(|item| item.name != name);
            items.len() != before
        };
        if !removed {
            return;
        }

        if let Ok(mut edits) = self.inner.edits.lock() {
            edits.remove(name);
        }
        self.inner.writer.enqueue(name, WriteOp::Delete);
        self.notify_changed();
    }

    /// Add a catalog product with quantity 1, overwriting any existing entry
    /// for the same name.
    pub fn add(&self, product: &Product) {
        let record = {
            let Ok(mut items) = self.inner.items.lock() else {
                return;
            };
            match items.iter_mut().find(|item| item.name == product.name) {
                Some(existing) => {
                    existing.quantity = 1;
                    existing.price = product.price;
                    existing.image = product.image.clone();
                    existing.record()
                }
                None => {
                    let item = CartItem::from_record(
                        product.name.clone(),
                        CartRecord {
                            price: product.price,
                            quantity: 1,
                            image: product.image.clone(),
                        },
                    );
                    let record = item.record();
                    items.push(item);
                    items.sort_by(|a, b| a.name.cmp(&b.name));
                    record
                }
            }
        };

        self.inner.writer.enqueue(&product.name, WriteOp::Upsert(record));
        self.notify_changed();
    }

    /// Delete every item from the remote store, then clear locally.
    ///
    /// Used only after an order is confirmed placed. Every delete is
    /// attempted even if earlier ones fail; failures are logged and do not
    /// short-circuit the batch.
    pub async fn clear(&self) {
        let names: Vec<String> = self.items().into_iter().map(|item| item.name).collect();
        for name in &names {
            if let Err(e) = self.inner.api.delete_cart_entry(name).await {
                warn!(name, error = %e, "Failed to delete cart entry while clearing");
            }
        }

        self.replace_items(Vec::new());
    }

    /// Wait until every queued write has been attempted. Call before
    /// snapshotting the cart for checkout.
    pub async fn flush_writes(&self) {
        self.inner.writer.flush().await;
    }

    fn replace_items(&self, new_items: Vec<CartItem>) {
        if let Ok(mut items) = self.inner.items.lock() {
            *items = new_items;
        }
        if let Ok(mut edits) = self.inner.edits.lock() {
            edits.clear();
        }
        self.notify_changed();
    }

    fn notify_changed(&self) {
        let count = self.item_count();
        self.inner.changed_tx.send_replace(count);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use url::Url;

    fn store() -> CartStore {
        let api = ApiClient::new(Url::parse("http://localhost:1/").unwrap()).unwrap();
        CartStore::new(api)
    }

    fn seed(store: &CartStore, name: &str, quantity: u32) {
        let mut items = store.inner.items.lock().unwrap();
        items.push(CartItem::from_record(
            name,
            CartRecord {
                price: Decimal::new(25, 0),
                quantity,
                image: "/images/i1.jpg".to_string(),
            },
        ));
    }

    #[tokio::test]
    async fn edit_with_invalid_input_is_held_not_written() {
        let store = store();
        seed(&store, "Lavender Bliss", 2);

        store.edit_quantity("Lavender Bliss", "");
        assert_eq!(
            store.pending_edit("Lavender Bliss"),
            Some(String::new())
        );
        // Local quantity untouched.
        assert_eq!(store.items()[0].quantity, 2);

        store.edit_quantity("Lavender Bliss", "0");
        assert_eq!(store.items()[0].quantity, 2);
    }

    #[tokio::test]
    async fn edit_with_valid_input_updates_local_state() {
        let store = store();
        seed(&store, "Lavender Bliss", 2);

        store.edit_quantity("Lavender Bliss", "5");
        assert_eq!(store.items()[0].quantity, 5);
        assert!(store.pending_edit("Lavender Bliss").is_none());
    }

    #[tokio::test]
    async fn commit_coerces_invalid_to_one() {
        let store = store();
        seed(&store, "Lavender Bliss", 4);

        store.edit_quantity("Lavender Bliss", "");
        let committed = store.commit_quantity("Lavender Bliss", "");
        assert_eq!(committed, 1);
        assert_eq!(store.items()[0].quantity, 1);
        assert!(store.pending_edit("Lavender Bliss").is_none());
    }

    #[tokio::test]
    async fn remove_is_optimistic_and_signals_change() {
        let store = store();
        seed(&store, "Lavender Bliss", 1);
        seed(&store, "Midnight Oud", 1);
        let mut changes = store.subscribe_changes();

        store.remove("Lavender Bliss");
        assert_eq!(store.item_count(), 1);
        assert_eq!(*changes.borrow_and_update(), 1);

        // Removing a missing item does nothing.
        store.remove("Lavender Bliss");
        assert_eq!(store.item_count(), 1);
    }
}
