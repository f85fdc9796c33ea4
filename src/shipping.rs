//! Shipping method selection and charges.

use crate::basket_ops::BasketSummary;
use crate::error::{StorefrontError, StorefrontResult};
use crate::models::{Price, ShippingAddress, ShippingMethod};
use crate::store::Store;
use rust_decimal::Decimal;

pub const NO_SHIPPING_REQUIRED: &str = "no-shipping-required";

/// The method a basket will be shipped with.
#[derive(Debug, Clone, PartialEq)]
pub enum ShippingChoice {
    NoShippingRequired,
    Method(ShippingMethod),
}

impl ShippingChoice {
    pub fn code(&self) -> &str {
        match self {
            ShippingChoice::NoShippingRequired => NO_SHIPPING_REQUIRED,
            ShippingChoice::Method(method) => &method.code,
        }
    }

    pub fn calculate(&self, summary: &BasketSummary) -> Price {
        match self {
            ShippingChoice::NoShippingRequired => Price::zero(&summary.currency),
            ShippingChoice::Method(method) => {
                Price::new(&summary.currency, charge_for(method, summary), Decimal::ZERO)
            }
        }
    }
}

fn charge_for(method: &ShippingMethod, summary: &BasketSummary) -> Decimal {
    if let Some(threshold) = method.free_shipping_threshold {
        if summary.total_incl_tax >= threshold {
            return Decimal::ZERO;
        }
    }
    method.price_per_order + method.price_per_item * Decimal::from(summary.num_shippable_items)
}

/// Accepts `GB` as well as `.../countries/GB/`.
pub fn country_code(value: &str) -> Option<String> {
    value
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|code| !code.is_empty())
        .map(str::to_ascii_uppercase)
}

/// Pick the shipping method for a basket.
///
/// Baskets without shippable items need no shipping. Otherwise the address
/// must name a country; the first method shipping there (and matching `code`
/// when one is requested) wins.
pub fn choose_method(
    store: &Store,
    summary: &BasketSummary,
    address: Option<&ShippingAddress>,
    code: Option<&str>,
) -> StorefrontResult<ShippingChoice> {
    if !summary.is_shipping_required {
        return Ok(ShippingChoice::NoShippingRequired);
    }
    let country = address
        .and_then(|a| a.country.as_deref())
        .and_then(country_code)
        .ok_or_else(|| {
            StorefrontError::Validation("Please choose a shipping address".to_string())
        })?;

    let chosen = store
        .all::<ShippingMethod>()?
        .into_iter()
        .filter(|m| m.ships_to(&country))
        .find(|m| code.map_or(true, |c| m.code == c));
    Ok(match chosen {
        Some(method) => ShippingChoice::Method(method),
        None => ShippingChoice::NoShippingRequired,
    })
}
