use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Human-facing order reference: `UC` followed by the last six digits of the
/// millisecond timestamp at which the order message was generated.
///
/// Not guaranteed unique; it only has to be quotable over WhatsApp.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    pub const PREFIX: &'static str = "UC";

    pub fn from_timestamp(at: DateTime<Utc>) -> Self {
        let millis = at.timestamp_millis().unsigned_abs() % 1_000_000;
        Self(format!("{}{millis:06}", Self::PREFIX))
    }

    /// Wrap an order number read back from storage.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// How the customer intends to pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Order message sent over WhatsApp; payment arranged by the operator.
    Whatsapp,
    /// Direct UPI deep link.
    Upi,
}

impl PaymentMethod {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Whatsapp => "whatsapp",
            PaymentMethod::Upi => "upi",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "whatsapp" => Some(PaymentMethod::Whatsapp),
            "upi" => Some(PaymentMethod::Upi),
            _ => None,
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of handing an order to WhatsApp.
///
/// `sent` is optimistic: it is set as soon as the link was produced, whether
/// or not the opener managed to launch it.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderPlacement {
    pub order_number: OrderNumber,

    /// Full order message, unencoded
    pub message: String,

    /// `https://wa.me/...` deep link carrying the encoded message
    pub whatsapp_url: String,

    pub total: Decimal,

    pub item_count: u64,

    /// Whether the `LinkOpener` reported success
    pub opened: bool,

    /// Shown to the customer when the link did not open on its own.
    pub notice: Option<String>,
}

/// Checkout progress persisted across page loads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderState {
    pub order_number: Option<OrderNumber>,
    pub whatsapp_sent: bool,
    pub payment_method: Option<PaymentMethod>,
    pub whatsapp_url: Option<String>,
}
