pub mod errors;
pub mod models;
pub mod services;
pub mod storage;

use std::sync::Arc;

use rust_decimal::Decimal;

use errors::CoreError;
use models::{
    cart::CartSnapshot,
    order::{OrderPlacement, OrderState},
    settings::StoreSettings,
};
use services::{
    cart_store::{CartStore, RemoveOutcome},
    catalog_service::Catalog,
    checkout_service::{CheckoutService, LinkOpener},
    shipping_store::ShippingStore,
};
use storage::{memory::MemoryStorage, traits::DurableStorage};

/// Main entry point for the Urban Crate core library.
///
/// One `Storefront` is one shopping session: it owns the catalog, the cart
/// and shipping stores, and the checkout service, all sharing one durable
/// storage backend. Create it when the session starts and drop it when the
/// session ends; views borrow it rather than reaching for global state.
#[must_use]
pub struct Storefront {
    settings: StoreSettings,
    storage: Arc<dyn DurableStorage>,
    catalog: Catalog,
    cart: CartStore,
    shipping: ShippingStore,
    checkout: CheckoutService,
}

impl std::fmt::Debug for Storefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storefront")
            .field("store_name", &self.settings.store_name)
            .field("storage", &self.storage.name())
            .field("products", &self.catalog.len())
            .field("cart", &self.cart)
            .finish()
    }
}

impl Storefront {
    /// Start a session over `storage`, restoring any persisted cart and
    /// shipping form.
    pub fn open(settings: StoreSettings, storage: Arc<dyn DurableStorage>, catalog: Catalog) -> Self {
        let cart = CartStore::open(Arc::clone(&storage), settings.cart_key.clone());
        let shipping = ShippingStore::open(Arc::clone(&storage), settings.shipping_key.clone());
        let checkout = CheckoutService::new(settings.clone(), Arc::clone(&storage));

        tracing::info!(
            store = %settings.store_name,
            storage = storage.name(),
            products = catalog.len(),
            cart_lines = cart.line_count(),
            "storefront session opened"
        );

        Self {
            settings,
            storage,
            catalog,
            cart,
            shipping,
            checkout,
        }
    }

    /// Session with default settings and nothing persisted beyond its lifetime.
    pub fn in_memory(catalog: Catalog) -> Self {
        Self::open(StoreSettings::default(), Arc::new(MemoryStorage::new()), catalog)
    }

    /// Session persisted to files under `dir` (native only, not WASM).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn open_in_dir(
        settings: StoreSettings,
        dir: impl AsRef<std::path::Path>,
        catalog: Catalog,
    ) -> Result<Self, CoreError> {
        let storage = storage::file::FileStorage::open(dir)?;
        Ok(Self::open(settings, Arc::new(storage), catalog))
    }

    // ── Accessors ───────────────────────────────────────────────────

    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    /// Mutable access for subscribing observers or calling store operations directly.
    pub fn cart_mut(&mut self) -> &mut CartStore {
        &mut self.cart
    }

    pub fn shipping(&self) -> &ShippingStore {
        &self.shipping
    }

    pub fn shipping_mut(&mut self) -> &mut ShippingStore {
        &mut self.shipping
    }

    pub fn checkout(&self) -> &CheckoutService {
        &self.checkout
    }

    // ── Cart ────────────────────────────────────────────────────────

    /// Add one unit of a catalog product by id. Returns its new quantity.
    pub fn add_to_cart(&mut self, product_id: &str) -> Result<u32, CoreError> {
        let product = self
            .catalog
            .get(product_id)
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;
        Ok(self.cart.add_one(product))
    }

    pub fn remove_from_cart(&mut self, product_id: &str, remove_all: bool) -> RemoveOutcome {
        self.cart.remove_one(product_id, remove_all)
    }

    pub fn cart_snapshot(&self) -> CartSnapshot {
        self.cart.snapshot()
    }

    // ── Checkout ────────────────────────────────────────────────────

    /// `true` once the cart is non-empty and at or above the minimum order value.
    #[must_use]
    pub fn can_checkout(&self) -> bool {
        !self.cart.is_empty() && self.checkout.meets_minimum(self.cart.total())
    }

    /// Amount still missing to reach the minimum order value.
    #[must_use]
    pub fn checkout_shortfall(&self) -> Decimal {
        self.checkout.shortfall(self.cart.total())
    }

    /// Send the current cart and shipping form to WhatsApp.
    /// The cart is kept until `start_new_order`.
    pub fn place_order(&mut self, opener: &mut dyn LinkOpener) -> Result<OrderPlacement, CoreError> {
        let snapshot = self.cart.snapshot();
        self.checkout
            .place_whatsapp_order(&snapshot, self.shipping.info(), opener)
    }

    #[must_use]
    pub fn order_state(&self) -> OrderState {
        self.checkout.order_state()
    }

    /// Clear the cart and the previous order's bookkeeping. The shipping form is kept.
    pub fn start_new_order(&mut self) {
        self.checkout.start_new_order(&mut self.cart);
    }
}
