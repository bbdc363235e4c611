use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::models::product::{MarginCategory, Product};

/// Pack-size token inside a product description, e.g. "500g", "1.5L", "6pcs".
static QUANTITY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?(?:g|kg|ml|l|pcs?|pieces?|units?))")
        .expect("valid quantity pattern")
});

/// Leading number of a price cell; trailing text such as "Rs" or "/-" is ignored.
static PRICE_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+(?:\.\d+)?|\.\d+)(?:[eE][+-]?\d+)?")
        .expect("valid price pattern")
});

const DEFAULT_BRAND: &str = "Generic";
const DEFAULT_QUANTITY: &str = "1 unit";
const MIN_CSV_COLUMNS: usize = 6;

/// Ordering applied by `Catalog::query`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    /// Catalog order
    #[default]
    Default,
    PriceLowHigh,
    PriceHighLow,
    NameAsc,
    NameDesc,
    /// Largest discount off MRP first
    DiscountHighLow,
}

/// Filter + sort request from the catalog page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogQuery {
    /// `None` means every category.
    pub category: Option<String>,
    /// Case-insensitive substring of name or brand; empty matches everything.
    pub search: Option<String>,
    pub sort: SortOrder,
}

/// Summary of one CSV ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    /// Data rows turned into products
    pub accepted: usize,
    /// Data rows dropped (too few columns, no description or category, no price)
    pub skipped: usize,
    pub high_margin: usize,
    pub medium_margin: usize,
    pub low_margin: usize,
}

/// Whole-catalog figures for the admin page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogStats {
    pub total_products: usize,
    pub high_margin_count: usize,
    pub medium_margin_count: usize,
    pub low_margin_count: usize,
    /// Mean of `selling_price − buy_price`, two decimal places
    pub average_profit_margin: Decimal,
    pub category_count: usize,
    pub total_mrp: Decimal,
    pub total_selling_value: Decimal,
    pub average_selling_price: Decimal,
}

/// Per-category figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub count: usize,
    pub average_profit_margin: Decimal,
    pub total_selling_value: Decimal,
}

/// The read-only product list the cart is filled from.
///
/// Products keep the order they were supplied in; lookups by id go through
/// an index built at construction.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Build a catalog from already-priced products. On duplicate ids the
    /// first product wins the id lookup.
    pub fn from_products(products: Vec<Product>) -> Self {
        let mut index = HashMap::with_capacity(products.len());
        for (i, p) in products.iter().enumerate() {
            index.entry(p.id.clone()).or_insert(i);
        }
        Self { products, index }
    }

    /// Ingest a supplier price list.
    ///
    /// Expected columns after a header row:
    /// `description, category, mrp, buy_price, selling_price, pricing_strategy, recommendation`.
    /// Values may be double-quoted to contain commas. Rows with fewer than six
    /// values, an empty description or category, or a selling price that is
    /// not positive are skipped.
    ///
    /// Pricing policy applied here, not in the cart: prices are rounded to
    /// whole units and low-margin products are resold at their buy price.
    pub fn from_csv(csv: &str) -> Result<(Self, IngestReport), CoreError> {
        let mut rows = csv.lines();
        let header = rows
            .next()
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .ok_or_else(|| CoreError::InvalidCsv("missing header row".into()))?;
        if split_csv_row(header).len() < MIN_CSV_COLUMNS {
            return Err(CoreError::InvalidCsv(format!(
                "header has fewer than {MIN_CSV_COLUMNS} columns: '{header}'"
            )));
        }

        let mut products = Vec::new();
        let mut report = IngestReport::default();

        for row in rows {
            let row = row.trim();
            if row.is_empty() {
                continue;
            }
            match product_from_row(row, products.len() + 1) {
                Some(product) => {
                    match product.margin_category {
                        MarginCategory::High => report.high_margin += 1,
                        MarginCategory::Medium => report.medium_margin += 1,
                        MarginCategory::Low => report.low_margin += 1,
                    }
                    products.push(product);
                }
                None => report.skipped += 1,
            }
        }

        report.accepted = products.len();
        tracing::info!(
            accepted = report.accepted,
            skipped = report.skipped,
            high = report.high_margin,
            medium = report.medium_margin,
            low = report.low_margin,
            "catalog ingested"
        );

        Ok((Self::from_products(products), report))
    }

    // ── Lookups ─────────────────────────────────────────────────────

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Product> {
        self.index.get(id).and_then(|&i| self.products.get(i))
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Distinct categories, sorted.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        self.products
            .iter()
            .map(|p| p.category.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    #[must_use]
    pub fn by_category(&self, category: &str) -> Vec<&Product> {
        self.products.iter().filter(|p| p.category == category).collect()
    }

    #[must_use]
    pub fn by_margin(&self, margin: MarginCategory) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| p.margin_category == margin)
            .collect()
    }

    /// Products whose name or brand contains `query`, ignoring case.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&Product> {
        let q = query.to_lowercase();
        self.products.iter().filter(|p| matches_search(p, &q)).collect()
    }

    /// Products with `min <= selling_price <= max`.
    #[must_use]
    pub fn in_price_range(&self, min: Decimal, max: Decimal) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| p.selling_price >= min && p.selling_price <= max)
            .collect()
    }

    /// Highest per-unit profit first.
    #[must_use]
    pub fn top_margin(&self, limit: usize) -> Vec<&Product> {
        let mut products: Vec<&Product> = self.products.iter().collect();
        products.sort_by(|a, b| b.profit_margin().cmp(&a.profit_margin()));
        products.truncate(limit);
        products
    }

    /// Category filter, then search, then sort. Sorting is stable, so ties
    /// keep catalog order.
    #[must_use]
    pub fn query(&self, query: &CatalogQuery) -> Vec<&Product> {
        let search = query.search.as_deref().unwrap_or("").to_lowercase();
        let mut products: Vec<&Product> = self
            .products
            .iter()
            .filter(|p| query.category.as_deref().map_or(true, |c| p.category == c))
            .filter(|p| matches_search(p, &search))
            .collect();

        match query.sort {
            SortOrder::Default => {}
            SortOrder::PriceLowHigh => products.sort_by(|a, b| a.selling_price.cmp(&b.selling_price)),
            SortOrder::PriceHighLow => products.sort_by(|a, b| b.selling_price.cmp(&a.selling_price)),
            SortOrder::NameAsc => products.sort_by_cached_key(|p| p.name.to_lowercase()),
            SortOrder::NameDesc => {
                products.sort_by(|a, b| b.name.to_lowercase().cmp(&a.name.to_lowercase()));
            }
            SortOrder::DiscountHighLow => {
                products.sort_by(|a, b| b.discount_percent().cmp(&a.discount_percent()));
            }
        }
        products
    }

    // ── Statistics ──────────────────────────────────────────────────

    #[must_use]
    pub fn stats(&self) -> CatalogStats {
        let total_products = self.products.len();
        let count = |m: MarginCategory| self.products.iter().filter(|p| p.margin_category == m).count();
        let total_profit: Decimal = self.products.iter().map(Product::profit_margin).sum();
        let total_mrp: Decimal = self.products.iter().map(|p| p.mrp).sum();
        let total_selling_value: Decimal = self.products.iter().map(|p| p.selling_price).sum();

        let (average_profit_margin, average_selling_price) = if total_products == 0 {
            (Decimal::ZERO, Decimal::ZERO)
        } else {
            let n = Decimal::from(total_products);
            (
                round_half_up(total_profit / n, 2),
                round_half_up(total_selling_value / n, 0),
            )
        };

        CatalogStats {
            total_products,
            high_margin_count: count(MarginCategory::High),
            medium_margin_count: count(MarginCategory::Medium),
            low_margin_count: count(MarginCategory::Low),
            average_profit_margin,
            category_count: self.categories().len(),
            total_mrp: round_half_up(total_mrp, 0),
            total_selling_value: round_half_up(total_selling_value, 0),
            average_selling_price,
        }
    }

    #[must_use]
    pub fn category_stats(&self) -> BTreeMap<String, CategoryStats> {
        let mut totals: BTreeMap<String, (usize, Decimal, Decimal)> = BTreeMap::new();
        for p in &self.products {
            let entry = totals
                .entry(p.category.clone())
                .or_insert((0, Decimal::ZERO, Decimal::ZERO));
            entry.0 += 1;
            entry.1 += p.profit_margin();
            entry.2 += p.selling_price;
        }
        totals
            .into_iter()
            .map(|(category, (count, profit, value))| {
                let stats = CategoryStats {
                    count,
                    average_profit_margin: round_half_up(profit / Decimal::from(count), 2),
                    total_selling_value: value,
                };
                (category, stats)
            })
            .collect()
    }
}

// ── CSV helpers ─────────────────────────────────────────────────────

/// Split one CSV row on commas outside double quotes. Quote characters are
/// dropped and each value is trimmed.
fn split_csv_row(row: &str) -> Vec<String> {
    let mut values = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in row.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                values.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    values.push(current.trim().to_string());
    values
}

/// Lenient number parse: reads the leading number of the cell (`"120 Rs"` is
/// 120) and counts a cell without one as zero.
fn parse_price(raw: Option<&String>) -> Decimal {
    raw.and_then(|v| PRICE_PREFIX.find(v.trim()))
        .and_then(|m| parse_number(m.as_str()))
        .unwrap_or(Decimal::ZERO)
}

fn parse_number(token: &str) -> Option<Decimal> {
    let (sign, digits) = match token.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", token.strip_prefix('+').unwrap_or(token)),
    };
    let digits = if digits.starts_with('.') {
        format!("0{digits}")
    } else {
        digits.to_string()
    };
    let normalized = format!("{sign}{digits}");

    if normalized.contains(['e', 'E']) {
        Decimal::from_scientific(&normalized).ok()
    } else {
        Decimal::from_str(&normalized).ok()
    }
}

fn product_from_row(row: &str, sequence: usize) -> Option<Product> {
    let values = split_csv_row(row);
    if values.len() < MIN_CSV_COLUMNS {
        return None;
    }

    let description = values[0].as_str();
    let category = values[1].as_str();
    let mrp = parse_price(values.get(2));
    let buy_price = parse_price(values.get(3));
    let listed_selling_price = parse_price(values.get(4));

    if description.is_empty() || category.is_empty() || listed_selling_price <= Decimal::ZERO {
        return None;
    }

    let margin_category = MarginCategory::classify(listed_selling_price - buy_price);
    let selling_price = match margin_category {
        MarginCategory::Low => buy_price,
        MarginCategory::High | MarginCategory::Medium => listed_selling_price,
    };

    let brand = description
        .split(' ')
        .next()
        .filter(|w| !w.is_empty())
        .unwrap_or(DEFAULT_BRAND);

    let quantity = QUANTITY_PATTERN
        .find(description)
        .map_or(DEFAULT_QUANTITY, |m| m.as_str());

    Some(Product {
        id: sequence.to_string(),
        name: description.to_string(),
        brand: brand.to_string(),
        category: category.to_string(),
        quantity: quantity.to_string(),
        mrp: round_half_up(mrp, 0),
        buy_price: round_half_up(buy_price, 0),
        selling_price: round_half_up(selling_price, 0),
        margin_category,
        image_url: Some(placeholder_image_url(brand, description)),
    })
}

/// Placeholder image reference keyed by a search-friendly product phrase.
fn placeholder_image_url(brand: &str, name: &str) -> String {
    let terms: String = format!("{brand} {name}")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect::<String>()
        .to_lowercase();
    format!(
        "/placeholder.svg?height=200&width=200&query={}",
        urlencoding::encode(&terms)
    )
}

fn matches_search(product: &Product, lowercase_query: &str) -> bool {
    lowercase_query.is_empty()
        || product.name.to_lowercase().contains(lowercase_query)
        || product.brand.to_lowercase().contains(lowercase_query)
}

fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}
