use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Store-wide settings: storage keys, checkout contact points and the
/// minimum order gate.
///
/// `Default` carries the production values; `from_env` lets a deployment
/// override any of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Name used in order messages and the UPI payee field
    pub store_name: String,

    /// Symbol printed before amounts in order messages
    pub currency_symbol: String,

    /// Checkout is blocked while the cart total is below this amount.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub minimum_order_value: Decimal,

    /// WhatsApp number (country code, no `+`) that receives order messages.
    pub whatsapp_number: String,

    /// UPI virtual payment address quoted in order messages.
    pub upi_id: String,

    /// Durable-storage key holding the cart record
    pub cart_key: String,

    /// Durable-storage key holding the shipping form
    pub shipping_key: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            store_name: "Urban Crate".to_string(),
            currency_symbol: "₹".to_string(),
            minimum_order_value: Decimal::from(999),
            whatsapp_number: "918076234610".to_string(),
            upi_id: "vrahulv695@oksbi".to_string(),
            cart_key: "urbancrate-cart-realtime".to_string(),
            shipping_key: "urbancrate-shipping".to_string(),
        }
    }
}

impl StoreSettings {
    /// Load settings from the environment on top of the defaults.
    ///
    /// Calls `dotenvy::dotenv()` first so a `.env` file is honoured when present.
    ///
    /// | Variable | Field |
    /// |---|---|
    /// | `URBAN_CRATE_STORE_NAME` | `store_name` |
    /// | `URBAN_CRATE_MIN_ORDER_VALUE` | `minimum_order_value` |
    /// | `URBAN_CRATE_WHATSAPP_NUMBER` | `whatsapp_number` |
    /// | `URBAN_CRATE_UPI_ID` | `upi_id` |
    /// | `URBAN_CRATE_CART_KEY` | `cart_key` |
    /// | `URBAN_CRATE_SHIPPING_KEY` | `shipping_key` |
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Config` when a variable is present but unusable.
    pub fn from_env() -> Result<Self, CoreError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string());

        if let Some(v) = get("URBAN_CRATE_STORE_NAME") {
            settings.store_name = non_empty("URBAN_CRATE_STORE_NAME", v)?;
        }
        if let Some(v) = get("URBAN_CRATE_MIN_ORDER_VALUE") {
            let value: Decimal = v.parse().map_err(|e| {
                CoreError::Config(format!("URBAN_CRATE_MIN_ORDER_VALUE '{v}': {e}"))
            })?;
            if value.is_sign_negative() {
                return Err(CoreError::Config(format!(
                    "URBAN_CRATE_MIN_ORDER_VALUE must not be negative, got {value}"
                )));
            }
            settings.minimum_order_value = value;
        }
        if let Some(v) = get("URBAN_CRATE_WHATSAPP_NUMBER") {
            if v.is_empty() || !v.chars().all(|c| c.is_ascii_digit()) {
                return Err(CoreError::Config(format!(
                    "URBAN_CRATE_WHATSAPP_NUMBER must be digits only (country code first), got '{v}'"
                )));
            }
            settings.whatsapp_number = v;
        }
        if let Some(v) = get("URBAN_CRATE_UPI_ID") {
            if !v.contains('@') {
                return Err(CoreError::Config(format!(
                    "URBAN_CRATE_UPI_ID must look like name@bank, got '{v}'"
                )));
            }
            settings.upi_id = v;
        }
        if let Some(v) = get("URBAN_CRATE_CART_KEY") {
            settings.cart_key = non_empty("URBAN_CRATE_CART_KEY", v)?;
        }
        if let Some(v) = get("URBAN_CRATE_SHIPPING_KEY") {
            settings.shipping_key = non_empty("URBAN_CRATE_SHIPPING_KEY", v)?;
        }

        Ok(settings)
    }
}

fn non_empty(name: &str, value: String) -> Result<String, CoreError> {
    if value.is_empty() {
        Err(CoreError::Config(format!("{name} must not be empty")))
    } else {
        Ok(value)
    }
}
