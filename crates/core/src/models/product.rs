use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Profit at or above this amount (selling − buy) classifies a product as `High`.
pub const HIGH_MARGIN_THRESHOLD: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// Profit at or above this amount (and below `HIGH_MARGIN_THRESHOLD`) is `Medium`.
pub const MEDIUM_MARGIN_THRESHOLD: Decimal = Decimal::from_parts(50, 0, 0, false, 0);

/// Margin classification of a product by absolute profit per unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarginCategory {
    High,
    Medium,
    /// Older catalog files call this tier "small".
    #[serde(alias = "small")]
    Low,
}

impl MarginCategory {
    /// Classify a per-unit profit: `>= 100` is high, `>= 50` is medium, anything
    /// else (including a loss) is low.
    #[must_use]
    pub fn classify(profit: Decimal) -> Self {
        if profit >= HIGH_MARGIN_THRESHOLD {
            MarginCategory::High
        } else if profit >= MEDIUM_MARGIN_THRESHOLD {
            MarginCategory::Medium
        } else {
            MarginCategory::Low
        }
    }

    /// Badge text shown next to products of this tier.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            MarginCategory::High => "Premium Pick",
            MarginCategory::Medium => "Great Value",
            MarginCategory::Low => "Cost Price",
        }
    }
}

impl std::fmt::Display for MarginCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarginCategory::High => write!(f, "high"),
            MarginCategory::Medium => write!(f, "medium"),
            MarginCategory::Low => write!(f, "low"),
        }
    }
}

/// A catalog product. Read-only as far as the cart is concerned: the cart
/// copies it into a line and never validates prices or identifiers.
///
/// `margin_category` is computed once when the catalog is generated and
/// carried as data; it is not re-derived from the prices at render time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Catalog-unique identifier
    pub id: String,

    /// Display name (the full product description)
    pub name: String,

    pub brand: String,

    pub category: String,

    /// Pack size / unit label, e.g. "500g" or "1 unit"
    pub quantity: String,

    /// Maximum retail price printed on the pack
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub mrp: Decimal,

    /// What the store paid per unit
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub buy_price: Decimal,

    /// What the customer pays per unit; cart totals use this
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub selling_price: Decimal,

    pub margin_category: MarginCategory,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Product {
    /// Build a product, classifying its margin from the given prices.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        brand: impl Into<String>,
        category: impl Into<String>,
        quantity: impl Into<String>,
        mrp: Decimal,
        buy_price: Decimal,
        selling_price: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            brand: brand.into(),
            category: category.into(),
            quantity: quantity.into(),
            mrp,
            buy_price,
            selling_price,
            margin_category: MarginCategory::classify(selling_price - buy_price),
            image_url: None,
        }
    }

    #[must_use]
    pub fn with_image(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    /// Profit per unit at the current selling price.
    #[must_use]
    pub fn profit_margin(&self) -> Decimal {
        self.selling_price - self.buy_price
    }

    /// Whole-percent discount of the selling price against MRP.
    /// Returns zero when MRP is not positive.
    #[must_use]
    pub fn discount_percent(&self) -> Decimal {
        if self.mrp <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        ((self.mrp - self.selling_price) / self.mrp * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
    }

    #[must_use]
    pub fn is_high_margin(&self) -> bool {
        self.margin_category == MarginCategory::High
    }
}
