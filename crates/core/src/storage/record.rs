//! JSON layout of the records the stores keep in durable storage.
//!
//! Cart record: a JSON array of flat cart-line objects,
//!
//! ```text
//! [{"id":"12","name":"Tata Salt 1kg","brand":"Tata","category":"Staples",
//!   "quantity":"1kg","mrp":28,"buyPrice":22,"sellingPrice":22,
//!   "marginCategory":"low","cartQuantity":3}, ...]
//! ```
//!
//! Prices are written as exact JSON numbers, never through `f64`.
//!
//! Shipping record: one JSON object with the six form fields.

use std::collections::HashSet;

use crate::errors::CoreError;
use crate::models::cart::CartLine;
use crate::models::shipping::ShippingInfo;

/// Serialize cart lines into the durable cart record.
pub fn encode_cart(lines: &[CartLine]) -> Result<String, CoreError> {
    serde_json::to_string(lines)
        .map_err(|e| CoreError::Serialization(format!("Failed to serialize cart: {e}")))
}

/// Parse a durable cart record.
///
/// Besides the JSON shape, a record must keep the store's invariants: every
/// quantity is at least 1 and no product id appears twice. A record that
/// breaks either is rejected as a whole rather than repaired.
pub fn decode_cart(raw: &str) -> Result<Vec<CartLine>, CoreError> {
    let lines: Vec<CartLine> = serde_json::from_str(raw)
        .map_err(|e| CoreError::Deserialization(format!("Failed to parse cart record: {e}")))?;

    let mut seen = HashSet::with_capacity(lines.len());
    for line in &lines {
        if line.cart_quantity == 0 {
            return Err(CoreError::InvalidRecord(format!(
                "cart line for product '{}' has quantity 0",
                line.product.id
            )));
        }
        if !seen.insert(line.product.id.as_str()) {
            return Err(CoreError::InvalidRecord(format!(
                "product '{}' appears more than once in the cart record",
                line.product.id
            )));
        }
    }

    Ok(lines)
}

pub fn encode_shipping(info: &ShippingInfo) -> Result<String, CoreError> {
    serde_json::to_string(info)
        .map_err(|e| CoreError::Serialization(format!("Failed to serialize shipping info: {e}")))
}

pub fn decode_shipping(raw: &str) -> Result<ShippingInfo, CoreError> {
    serde_json::from_str(raw).map_err(|e| {
        CoreError::Deserialization(format!("Failed to parse shipping record: {e}"))
    })
}
