use crate::store::numeric_entity;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub type ProductId = u64;
pub type CategoryId = u64;
pub type OptionId = u64;
pub type StockRecordId = u64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default)]
    pub id: ProductId,
    pub title: String,
    #[serde(default)]
    pub upc: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub categories: Vec<CategoryId>,
    #[serde(default)]
    pub options: Vec<OptionId>,
    /// Whether lines of this product count towards shipping charges
    #[serde(default = "yes")]
    pub requires_shipping: bool,
    /// Whether availability depends on stock levels
    #[serde(default = "yes")]
    pub track_stock: bool,
    #[serde(default = "Utc::now")]
    pub date_created: DateTime<Utc>,
}
numeric_entity!(Product, "products", "product");

fn yes() -> bool {
    true
}

impl Product {
    pub fn new(title: &str) -> Self {
        Self {
            id: 0,
            title: title.to_string(),
            upc: None,
            description: String::new(),
            categories: Vec::new(),
            options: Vec::new(),
            requires_shipping: true,
            track_stock: true,
            date_created: Utc::now(),
        }
    }

    pub fn in_categories(mut self, categories: &[CategoryId]) -> Self {
        self.categories = categories.to_vec();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parent: Option<CategoryId>,
}
numeric_entity!(Category, "categories", "category");

impl Category {
    pub fn new(name: &str, slug: &str, parent: Option<CategoryId>) -> Self {
        Self {
            id: 0,
            name: name.to_string(),
            slug: slug.to_string(),
            description: String::new(),
            parent,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionType {
    Required,
    Optional,
}

/// A per-line customisation a product may accept (engraving text, size...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductOption {
    #[serde(default)]
    pub id: OptionId,
    pub name: String,
    pub code: String,
    #[serde(rename = "type", default = "optional")]
    pub option_type: OptionType,
}
numeric_entity!(ProductOption, "options", "option");

fn optional() -> OptionType {
    OptionType::Optional
}

/// A partner's offer of a product: price and stock levels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRecord {
    #[serde(default)]
    pub id: StockRecordId,
    pub product: ProductId,
    #[serde(default)]
    pub partner_name: String,
    pub partner_sku: String,
    #[serde(default)]
    pub price_currency: Option<String>,
    #[serde(default)]
    pub price_excl_tax: Option<Decimal>,
    #[serde(default)]
    pub price_retail: Option<Decimal>,
    #[serde(default)]
    pub num_in_stock: Option<u32>,
    #[serde(default)]
    pub num_allocated: Option<u32>,
}
numeric_entity!(StockRecord, "stockrecords", "stock record");

impl StockRecord {
    pub fn new(product: ProductId, sku: &str, price_excl_tax: Decimal, num_in_stock: u32) -> Self {
        Self {
            id: 0,
            product,
            partner_name: String::new(),
            partner_sku: sku.to_string(),
            price_currency: None,
            price_excl_tax: Some(price_excl_tax),
            price_retail: None,
            num_in_stock: Some(num_in_stock),
            num_allocated: None,
        }
    }

    /// Stock that is neither sold nor allocated to an order.
    pub fn net_stock_level(&self) -> u32 {
        self.num_in_stock
            .unwrap_or(0)
            .saturating_sub(self.num_allocated.unwrap_or(0))
    }
}
