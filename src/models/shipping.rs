use crate::store::numeric_entity;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub type ShippingMethodId = u64;

/// Shipping charged per order plus per shippable item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingMethod {
    #[serde(default)]
    pub id: ShippingMethodId,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price_per_order: Decimal,
    #[serde(default)]
    pub price_per_item: Decimal,
    /// Baskets at or above this tax-inclusive total ship free
    #[serde(default)]
    pub free_shipping_threshold: Option<Decimal>,
    /// Alpha-2 codes this method ships to; empty means everywhere
    #[serde(default)]
    pub countries: Vec<String>,
}
numeric_entity!(ShippingMethod, "shipping_methods", "shipping method");

impl ShippingMethod {
    pub fn new(code: &str, name: &str, price_per_order: Decimal, price_per_item: Decimal) -> Self {
        Self {
            id: 0,
            code: code.to_string(),
            name: name.to_string(),
            description: String::new(),
            price_per_order,
            price_per_item,
            free_shipping_threshold: None,
            countries: Vec::new(),
        }
    }

    pub fn ships_to(&self, country: &str) -> bool {
        self.countries.is_empty()
            || self
                .countries
                .iter()
                .any(|c| c.eq_ignore_ascii_case(country))
    }
}
