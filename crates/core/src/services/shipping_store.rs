use std::sync::Arc;

use crate::models::shipping::{ShippingFieldError, ShippingInfo};
use crate::storage::record;
use crate::storage::traits::DurableStorage;

use super::notifier::{Notifier, SubscriptionId};

/// Persisted shipping form.
///
/// Loaded once at open; every change is written back immediately. Like the
/// cart, storage failures are logged and the in-memory value wins.
pub struct ShippingStore {
    info: ShippingInfo,
    storage: Arc<dyn DurableStorage>,
    key: String,
    observers: Notifier<ShippingInfo>,
}

impl std::fmt::Debug for ShippingStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShippingStore")
            .field("key", &self.key)
            .field("complete", &self.info.is_valid())
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl ShippingStore {
    pub fn open(storage: Arc<dyn DurableStorage>, key: impl Into<String>) -> Self {
        let key = key.into();
        let info = match storage.get(&key) {
            Ok(Some(raw)) => match record::decode_shipping(&raw) {
                Ok(info) => info,
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "discarding malformed shipping record");
                    if let Err(e) = storage.remove(&key) {
                        tracing::warn!(key = %key, error = %e, "failed to delete malformed shipping record");
                    }
                    ShippingInfo::default()
                }
            },
            Ok(None) => ShippingInfo::default(),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "shipping record unreadable");
                ShippingInfo::default()
            }
        };

        Self {
            info,
            storage,
            key,
            observers: Notifier::new(),
        }
    }

    #[must_use]
    pub fn info(&self) -> &ShippingInfo {
        &self.info
    }

    /// Replace the form contents, persist, and notify.
    pub fn update(&mut self, info: ShippingInfo) {
        self.info = info;
        self.persist();
        self.observers.publish(&self.info);
    }

    /// Apply `edit` to a copy of the current form and store the result.
    pub fn edit<F>(&mut self, edit: F)
    where
        F: FnOnce(&mut ShippingInfo),
    {
        let mut info = self.info.clone();
        edit(&mut info);
        self.update(info);
    }

    /// Reset to an empty form. The empty form is persisted, not deleted.
    pub fn clear(&mut self) {
        self.update(ShippingInfo::default());
    }

    #[must_use]
    pub fn validate(&self) -> Vec<ShippingFieldError> {
        self.info.validate()
    }

    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(ShippingInfo) + Send + 'static,
    {
        self.observers.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    fn persist(&self) {
        let encoded = match record::encode_shipping(&self.info) {
            Ok(encoded) => encoded,
            Err(e) => {
                tracing::warn!(error = %e, "failed to encode shipping info");
                return;
            }
        };
        if let Err(e) = self.storage.set(&self.key, &encoded) {
            tracing::warn!(key = %self.key, error = %e, "failed to save shipping info");
        }
    }
}
