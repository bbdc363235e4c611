use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::product::Product;

/// One product in the cart together with how many units of it were added.
///
/// Serialized flat: the product's fields sit next to `cartQuantity`, which is
/// the layout of the durable cart record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    #[serde(flatten)]
    pub product: Product,

    /// Always at least 1 while the line is in a store.
    pub cart_quantity: u32,
}

impl CartLine {
    pub fn new(product: Product) -> Self {
        Self {
            product,
            cart_quantity: 1,
        }
    }

    #[must_use]
    pub fn product_id(&self) -> &str {
        &self.product.id
    }

    /// `selling_price × cart_quantity`
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.selling_price * Decimal::from(self.cart_quantity)
    }
}

/// An owned copy of the cart handed to observers.
///
/// Built fresh for every notification; changing it has no effect on the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartSnapshot {
    /// Lines in insertion order
    pub lines: Vec<CartLine>,

    /// Sum of line totals at the time the snapshot was taken
    pub total: Decimal,

    /// Sum of quantities (not the number of lines)
    pub item_count: u64,
}

impl CartSnapshot {
    pub fn from_lines(lines: &[CartLine]) -> Self {
        Self {
            lines: lines.to_vec(),
            total: total_of(lines),
            item_count: item_count_of(lines),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct products.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn quantity_of(&self, product_id: &str) -> u32 {
        self.lines
            .iter()
            .find(|l| l.product.id == product_id)
            .map_or(0, |l| l.cart_quantity)
    }
}

impl Default for CartSnapshot {
    fn default() -> Self {
        Self::from_lines(&[])
    }
}

pub(crate) fn total_of(lines: &[CartLine]) -> Decimal {
    lines.iter().map(CartLine::line_total).sum()
}

pub(crate) fn item_count_of(lines: &[CartLine]) -> u64 {
    lines.iter().map(|l| u64::from(l.cart_quantity)).sum()
}
