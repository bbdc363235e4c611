use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::shipping::ShippingFieldError;

/// Unified error type for the entire urban-crate-core library.
/// Every fallible public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Durable storage ─────────────────────────────────────────────
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Storage quota exceeded writing '{key}': needed {needed} bytes, {available} available")]
    StorageQuotaExceeded {
        key: String,
        needed: usize,
        available: usize,
    },

    #[error("File I/O error: {0}")]
    FileIO(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    // ── Catalog ─────────────────────────────────────────────────────
    #[error("Invalid CSV: {0}")]
    InvalidCsv(String),

    #[error("Product not found: {0}")]
    ProductNotFound(String),

    // ── Checkout ────────────────────────────────────────────────────
    #[error("Cart is empty")]
    EmptyCart,

    #[error("Order total {total} is below the minimum order value {minimum} (short by {shortfall})")]
    BelowMinimumOrder {
        minimum: Decimal,
        total: Decimal,
        shortfall: Decimal,
    },

    #[error("Invalid shipping details: {}", format_field_errors(.0))]
    InvalidShipping(Vec<ShippingFieldError>),

    #[error("Could not open link: {0}")]
    LinkOpen(String),

    // ── Configuration ───────────────────────────────────────────────
    #[error("Configuration error: {0}")]
    Config(String),
}

fn format_field_errors(errors: &[ShippingFieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}
