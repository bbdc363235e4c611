use std::fmt::Write as _;
use std::sync::Arc;

use chrono::{Local, NaiveDateTime, Utc};
use rust_decimal::Decimal;

use crate::errors::CoreError;
use crate::models::cart::CartSnapshot;
use crate::models::order::{OrderNumber, OrderPlacement, OrderState, PaymentMethod};
use crate::models::settings::StoreSettings;
use crate::models::shipping::ShippingInfo;
use crate::storage::traits::DurableStorage;

use super::cart_store::CartStore;

/// Durable-storage keys for checkout progress.
pub const ORDER_NUMBER_KEY: &str = "urbancrate-order-number";
pub const WHATSAPP_SENT_KEY: &str = "urbancrate-whatsapp-sent";
pub const PAYMENT_METHOD_KEY: &str = "urbancrate-payment-method";
pub const WHATSAPP_URL_KEY: &str = "urbancrate-whatsapp-url";

const WHATSAPP_BASE_URL: &str = "https://wa.me";
const LINK_NOT_OPENED_NOTICE: &str =
    "WhatsApp link is ready. Please use the manual link below if it didn't open automatically.";
const UPI_NOT_OPENED: &str = "Failed to open UPI app. Please use WhatsApp order method.";

/// Something that can hand a URL to the platform: a browser window, the OS
/// URL handler, or a recorder in tests.
pub trait LinkOpener {
    fn open(&mut self, url: &str) -> Result<(), CoreError>;
}

/// Turns a cart and a shipping form into a WhatsApp order.
///
/// There is no order backend. "Placing" an order means building a message,
/// wrapping it in a `wa.me` deep link, trying to open it, and remembering
/// that it was sent.
pub struct CheckoutService {
    settings: StoreSettings,
    storage: Arc<dyn DurableStorage>,
}

impl std::fmt::Debug for CheckoutService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutService")
            .field("minimum_order_value", &self.settings.minimum_order_value)
            .field("whatsapp_number", &self.settings.whatsapp_number)
            .field("storage", &self.storage.name())
            .finish()
    }
}

impl CheckoutService {
    pub fn new(settings: StoreSettings, storage: Arc<dyn DurableStorage>) -> Self {
        Self { settings, storage }
    }

    #[must_use]
    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    // ── Minimum order gate ──────────────────────────────────────────

    #[must_use]
    pub fn meets_minimum(&self, total: Decimal) -> bool {
        total >= self.settings.minimum_order_value
    }

    /// How much more has to be added before checkout opens (zero once met).
    #[must_use]
    pub fn shortfall(&self, total: Decimal) -> Decimal {
        (self.settings.minimum_order_value - total).max(Decimal::ZERO)
    }

    pub fn ensure_minimum(&self, total: Decimal) -> Result<(), CoreError> {
        if self.meets_minimum(total) {
            Ok(())
        } else {
            Err(CoreError::BelowMinimumOrder {
                minimum: self.settings.minimum_order_value,
                total,
                shortfall: self.shortfall(total),
            })
        }
    }

    /// Everything the payment page needs before it may send an order.
    pub fn ensure_ready(&self, cart: &CartSnapshot, shipping: &ShippingInfo) -> Result<(), CoreError> {
        if cart.is_empty() {
            return Err(CoreError::EmptyCart);
        }
        self.ensure_minimum(cart.total)?;
        let errors = shipping.validate();
        if !errors.is_empty() {
            return Err(CoreError::InvalidShipping(errors));
        }
        Ok(())
    }

    // ── Message and links ───────────────────────────────────────────

    /// The order text sent to the store's WhatsApp number.
    #[must_use]
    pub fn order_message(
        &self,
        cart: &CartSnapshot,
        shipping: &ShippingInfo,
        order_number: &OrderNumber,
        at: NaiveDateTime,
    ) -> String {
        let store = &self.settings.store_name;
        let cur = &self.settings.currency_symbol;
        let total = money(cart.total);

        let mut text = String::new();
        let _ = writeln!(text, "🛒 *{store} Order Request*\n");
        let _ = writeln!(text, "📋 Order #: {order_number}");
        let _ = writeln!(
            text,
            "📅 Date: {} at {}",
            at.format("%d/%m/%Y"),
            at.format("%-I:%M:%S %P")
        );
        let _ = writeln!(text, "💰 Total Amount: {cur}{total}\n");

        let _ = writeln!(text, "👤 *Customer Details:*");
        let _ = writeln!(text, "Name: {}", shipping.name);
        let _ = writeln!(text, "Phone: {}", shipping.phone);
        let _ = writeln!(text, "Address: {}", shipping.address);
        let _ = writeln!(
            text,
            "City: {}, {} {}\n",
            shipping.city, shipping.state, shipping.pincode
        );

        let _ = writeln!(text, "📦 *Items Ordered ({}):*", cart.item_count);
        for (i, line) in cart.lines.iter().enumerate() {
            let _ = writeln!(text, "{}. {}", i + 1, line.product.name);
            let _ = writeln!(text, "   Brand: {}", line.product.brand);
            let _ = writeln!(
                text,
                "   Qty: {} x {cur}{} = {cur}{}\n",
                line.cart_quantity,
                money(line.product.selling_price),
                money(line.line_total())
            );
        }

        let _ = writeln!(text, "💳 *Payment Details:*");
        let _ = writeln!(text, "UPI ID: {}", self.settings.upi_id);
        let _ = writeln!(text, "Amount to Pay: {cur}{total}\n");

        text.push_str("Please confirm this order and provide delivery details. Thank you! 🙏");
        text
    }

    /// `https://wa.me/<number>?text=<percent-encoded message>`
    #[must_use]
    pub fn whatsapp_link(&self, message: &str) -> String {
        format!(
            "{WHATSAPP_BASE_URL}/{}?text={}",
            self.settings.whatsapp_number,
            urlencoding::encode(message)
        )
    }

    /// UPI intent for paying `total` directly; `reference` becomes the
    /// transaction reference (`tr`).
    #[must_use]
    pub fn upi_link(&self, total: Decimal, reference: &str) -> String {
        let store = &self.settings.store_name;
        format!(
            "upi://pay?pa={}&pn={}&am={}&cu=INR&tn={}&mc=0000&tr={}",
            self.settings.upi_id,
            urlencoding::encode(store),
            money(total),
            urlencoding::encode(&format!("{store} Order Payment")),
            urlencoding::encode(reference)
        )
    }

    /// WhatsApp link asking the store for help with an existing order.
    #[must_use]
    pub fn support_link(&self, order_number: &OrderNumber, total: Decimal) -> String {
        let message = format!(
            "Hi! I need help with my {} order #{order_number}. Order total: {}{}",
            self.settings.store_name,
            self.settings.currency_symbol,
            money(total)
        );
        self.whatsapp_link(&message)
    }

    // ── Placing orders ──────────────────────────────────────────────

    /// Build the order, try to open WhatsApp, and record the order as sent.
    ///
    /// The sent flag is set even when `opener` fails: the link is stored and
    /// the returned `notice` tells the customer to open it by hand.
    pub fn place_whatsapp_order(
        &self,
        cart: &CartSnapshot,
        shipping: &ShippingInfo,
        opener: &mut dyn LinkOpener,
    ) -> Result<OrderPlacement, CoreError> {
        self.ensure_ready(cart, shipping)?;

        let now = Utc::now();
        let order_number = OrderNumber::from_timestamp(now);
        let message = self.order_message(
            cart,
            shipping,
            &order_number,
            now.with_timezone(&Local).naive_local(),
        );
        let whatsapp_url = self.whatsapp_link(&message);

        self.store(ORDER_NUMBER_KEY, order_number.as_str());
        self.store(WHATSAPP_URL_KEY, &whatsapp_url);

        let (opened, notice) = match opener.open(&whatsapp_url) {
            Ok(()) => (true, None),
            Err(e) => {
                tracing::warn!(order = %order_number, error = %e, "WhatsApp link did not open");
                (false, Some(LINK_NOT_OPENED_NOTICE.to_string()))
            }
        };

        self.store(WHATSAPP_SENT_KEY, "true");
        self.store(PAYMENT_METHOD_KEY, PaymentMethod::Whatsapp.as_str());

        tracing::info!(
            order = %order_number,
            total = %cart.total,
            items = cart.item_count,
            opened,
            "order handed to WhatsApp"
        );

        Ok(OrderPlacement {
            order_number,
            message,
            whatsapp_url,
            total: cart.total,
            item_count: cart.item_count,
            opened,
            notice,
        })
    }

    /// Open the stored WhatsApp link again (the manual fallback button).
    /// Returns the link, or `None` when no order has been prepared.
    pub fn reopen_whatsapp(&self, opener: &mut dyn LinkOpener) -> Result<Option<String>, CoreError> {
        let Some(url) = self.read(WHATSAPP_URL_KEY) else {
            return Ok(None);
        };
        opener.open(&url)?;
        Ok(Some(url))
    }

    /// Hand the cart total to a UPI app. Returns the link that was opened.
    pub fn pay_with_upi(&self, cart: &CartSnapshot, opener: &mut dyn LinkOpener) -> Result<String, CoreError> {
        if cart.is_empty() {
            return Err(CoreError::EmptyCart);
        }
        let reference = Utc::now().timestamp_millis().to_string();
        let url = self.upi_link(cart.total, &reference);
        opener.open(&url).map_err(|e| {
            tracing::warn!(error = %e, "UPI link did not open");
            CoreError::LinkOpen(UPI_NOT_OPENED.to_string())
        })?;
        Ok(url)
    }

    /// Checkout progress as last persisted.
    #[must_use]
    pub fn order_state(&self) -> OrderState {
        OrderState {
            order_number: self.read(ORDER_NUMBER_KEY).map(OrderNumber::from_raw),
            whatsapp_sent: self.read(WHATSAPP_SENT_KEY).as_deref() == Some("true"),
            payment_method: self
                .read(PAYMENT_METHOD_KEY)
                .and_then(|m| PaymentMethod::parse(&m)),
            whatsapp_url: self.read(WHATSAPP_URL_KEY),
        }
    }

    /// Empty the cart and forget the previous order.
    pub fn start_new_order(&self, cart: &mut CartStore) {
        cart.clear();
        for key in [
            ORDER_NUMBER_KEY,
            WHATSAPP_SENT_KEY,
            PAYMENT_METHOD_KEY,
            WHATSAPP_URL_KEY,
        ] {
            if let Err(e) = self.storage.remove(key) {
                tracing::warn!(key, error = %e, "failed to clear order state");
            }
        }
        tracing::info!("ready for a new order");
    }

    // ── Internal ────────────────────────────────────────────────────

    fn store(&self, key: &str, value: &str) {
        if let Err(e) = self.storage.set(key, value) {
            tracing::warn!(key, error = %e, "failed to save order state");
        }
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to read order state");
                None
            }
        }
    }
}

/// Amount without trailing zeros: `999`, `22.5`.
fn money(amount: Decimal) -> String {
    amount.normalize().to_string()
}
