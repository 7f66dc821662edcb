//! Per-key serialization of remote cart writes.
//!
//! The cart view can produce quantity edits faster than the network round
//! trips. Writes for a given item name are funneled through a single-flight
//! queue: at most one request in flight per key, and queued values coalesce
//! to the latest one, so the remote store always converges on the last local
//! edit instead of whichever response happens to land last.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::error;

use candleworks_core::CartRecord;

use crate::api::ApiClient;

/// A pending remote mutation for one cart key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum WriteOp {
    Upsert(CartRecord),
    Delete,
}

#[derive(Default)]
struct KeyState {
    /// Latest value queued for this key; superseded values are dropped.
    pending: Option<WriteOp>,
    /// Whether a drain task currently owns this key.
    in_flight: bool,
}

struct WriterInner {
    api: ApiClient,
    keys: Mutex<HashMap<String, KeyState>>,
}

/// Single-flight, latest-wins write queue keyed by item name.
#[derive(Clone)]
pub(crate) struct CartWriter {
    inner: Arc<WriterInner>,
}

impl CartWriter {
    pub(crate) fn new(api: ApiClient) -> Self {
        Self {
            inner: Arc::new(WriterInner {
                api,
                keys: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Queue a write for `key`, replacing any not-yet-started write for the
    /// same key. Failures are logged, not retried; local state is not rolled
    /// back (reads reconcile on the next load).
    pub(crate) fn enqueue(&self, key: &str, op: WriteOp) {
        let spawn_drain = {
            let Ok(mut keys) = self.inner.keys.lock() else {
                return;
            };
            let state = keys.entry(key.to_string()).or_default();
            state.pending = Some(op);
            if state.in_flight {
                false
            } else {
                state.in_flight = true;
                true
            }
        };

        if spawn_drain {
            let inner = self.inner.clone();
            let key = key.to_string();
            tokio::spawn(async move {
                Self::drain(inner, key).await;
            });
        }
    }

    /// Work one key until its queue is empty, one request at a time.
    async fn drain(inner: Arc<WriterInner>, key: String) {
        loop {
            let op = {
                let Ok(mut keys) = inner.keys.lock() else {
                    return;
                };
                let Some(state) = keys.get_mut(&key) else {
                    return;
                };
                match state.pending.take() {
                    Some(op) => op,
                    None => {
                        state.in_flight = false;
                        return;
                    }
                }
            };

            let result = match &op {
                WriteOp::Upsert(record) => inner.api.upsert_cart_entry(&key, record).await,
                WriteOp::Delete => inner.api.delete_cart_entry(&key).await,
            };
            if let Err(e) = result {
                error!(key, error = %e, "Cart write failed");
            }
        }
    }

    /// Wait until every queued write has been attempted.
    pub(crate) async fn flush(&self) {
        loop {
            let busy = self
                .inner
                .keys
                .lock()
                .map(|keys| {
                    keys.values()
                        .any(|state| state.in_flight || state.pending.is_some())
                })
                .unwrap_or(false);
            if !busy {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}
