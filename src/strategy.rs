//! Pricing and availability of products.
//!
//! A [`Strategy`] decides which stock record backs a product, what it costs
//! and whether it can be bought. The [`Selector`] picks the strategy for a
//! request; today every requester gets [`DefaultStrategy`].

use crate::error::StorefrontResult;
use crate::models::{Price, Product, StockRecord};
use crate::permissions::Requester;
use crate::store::Store;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    /// No stock record, or stock ran out
    Unavailable,
    /// Stock is not tracked for this product
    Available,
    /// Stock is tracked and some is on hand
    StockRequired { num_available: u32 },
}

impl Availability {
    pub fn is_available_to_buy(&self) -> bool {
        !matches!(self, Availability::Unavailable)
    }

    pub fn num_available(&self) -> Option<u32> {
        match self {
            Availability::StockRequired { num_available } => Some(*num_available),
            _ => None,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Availability::Unavailable => "Unavailable".to_string(),
            Availability::Available => "Available".to_string(),
            Availability::StockRequired { num_available } => {
                format!("In stock ({} available)", num_available)
            }
        }
    }

    /// `Err` carries the reason shown to the customer.
    pub fn is_purchase_permitted(&self, quantity: u32) -> Result<(), String> {
        match self {
            Availability::Unavailable => Err("unavailable".to_string()),
            Availability::Available => Ok(()),
            Availability::StockRequired { num_available } if quantity > *num_available => Err(
                format!("a maximum of {} can be bought", num_available),
            ),
            Availability::StockRequired { .. } => Ok(()),
        }
    }

    pub fn view(&self) -> AvailabilityView {
        AvailabilityView {
            is_available_to_buy: self.is_available_to_buy(),
            num_available: self.num_available(),
            message: self.message(),
        }
    }
}

/// JSON shape of `/products/{pk}/availability`.
#[derive(Debug, Clone, Serialize)]
pub struct AvailabilityView {
    pub is_available_to_buy: bool,
    pub num_available: Option<u32>,
    pub message: String,
}

/// Everything needed to put a product in a basket.
#[derive(Debug, Clone)]
pub struct PurchaseInfo {
    /// `None` when the product has no price
    pub price: Option<Price>,
    pub availability: Availability,
    pub stockrecord: Option<StockRecord>,
}

pub trait Strategy: Send + Sync {
    fn select_stockrecord(
        &self,
        store: &Store,
        product: &Product,
    ) -> StorefrontResult<Option<StockRecord>>;

    fn pricing(&self, record: Option<&StockRecord>) -> Option<Price>;

    fn availability(&self, product: &Product, record: Option<&StockRecord>) -> Availability;

    fn fetch_for_product(&self, store: &Store, product: &Product) -> StorefrontResult<PurchaseInfo> {
        let stockrecord = self.select_stockrecord(store, product)?;
        Ok(PurchaseInfo {
            price: self.pricing(stockrecord.as_ref()),
            availability: self.availability(product, stockrecord.as_ref()),
            stockrecord,
        })
    }
}

/// First stock record wins, stock is required, no tax is charged.
pub struct DefaultStrategy {
    default_currency: String,
}

impl DefaultStrategy {
    pub fn new(default_currency: &str) -> Self {
        Self {
            default_currency: default_currency.to_string(),
        }
    }
}

impl Strategy for DefaultStrategy {
    fn select_stockrecord(
        &self,
        store: &Store,
        product: &Product,
    ) -> StorefrontResult<Option<StockRecord>> {
        let records = store.filter(|r: &StockRecord| r.product == product.id)?;
        Ok(records.into_iter().min_by_key(|r| r.id))
    }

    fn pricing(&self, record: Option<&StockRecord>) -> Option<Price> {
        let record = record?;
        let excl_tax = record.price_excl_tax?;
        let currency = record
            .price_currency
            .as_deref()
            .unwrap_or(&self.default_currency);
        Some(Price::new(currency, excl_tax, Decimal::ZERO))
    }

    fn availability(&self, product: &Product, record: Option<&StockRecord>) -> Availability {
        let Some(record) = record else {
            return Availability::Unavailable;
        };
        if !product.track_stock {
            return Availability::Available;
        }
        match record.net_stock_level() {
            0 => Availability::Unavailable,
            n => Availability::StockRequired { num_available: n },
        }
    }
}

/// Chooses the strategy for a request.
#[derive(Debug, Clone)]
pub struct Selector {
    default_currency: String,
}

impl Selector {
    pub fn new(default_currency: &str) -> Self {
        Self {
            default_currency: default_currency.to_string(),
        }
    }

    pub fn strategy(&self, _requester: Option<&Requester>) -> Box<dyn Strategy> {
        Box::new(DefaultStrategy::new(&self.default_currency))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Store, Product) {
        let store = Store::temporary().unwrap();
        let product = store.create(Product::new("Kettle")).unwrap();
        (store, product)
    }

    #[test]
    fn no_stockrecord_means_unavailable_and_unpriced() {
        let (store, product) = setup();
        let info = DefaultStrategy::new("GBP")
            .fetch_for_product(&store, &product)
            .unwrap();
        assert!(info.price.is_none());
        assert_eq!(info.availability, Availability::Unavailable);
        assert_eq!(
            info.availability.is_purchase_permitted(1),
            Err("unavailable".to_string())
        );
    }

    #[test]
    fn first_stockrecord_prices_without_tax() {
        let (store, product) = setup();
        let first = store
            .create(StockRecord::new(product.id, "A", Decimal::new(1250, 2), 4))
            .unwrap();
        store
            .create(StockRecord::new(product.id, "B", Decimal::new(999, 2), 9))
            .unwrap();

        let info = DefaultStrategy::new("GBP")
            .fetch_for_product(&store, &product)
            .unwrap();
        assert_eq!(info.stockrecord.map(|r| r.id), Some(first.id));
        let price = info.price.unwrap();
        assert_eq!(price.currency, "GBP");
        assert_eq!(price.excl_tax, Decimal::new(1250, 2));
        assert_eq!(price.incl_tax, Some(Decimal::new(1250, 2)));
        assert_eq!(price.tax, Some(Decimal::ZERO));
    }

    #[test]
    fn stock_levels_limit_purchases() {
        let (store, product) = setup();
        let mut record = StockRecord::new(product.id, "A", Decimal::ONE, 5);
        record.num_allocated = Some(2);
        store.create(record).unwrap();

        let info = DefaultStrategy::new("GBP")
            .fetch_for_product(&store, &product)
            .unwrap();
        assert_eq!(info.availability, Availability::StockRequired { num_available: 3 });
        assert_eq!(info.availability.message(), "In stock (3 available)");
        assert!(info.availability.is_purchase_permitted(3).is_ok());
        assert_eq!(
            info.availability.is_purchase_permitted(4),
            Err("a maximum of 3 can be bought".to_string())
        );
    }

    #[test]
    fn untracked_stock_is_always_available() {
        let (store, mut product) = setup();
        product.track_stock = false;
        store.save(&product).unwrap();
        store
            .create(StockRecord::new(product.id, "A", Decimal::ONE, 0))
            .unwrap();

        let info = DefaultStrategy::new("GBP")
            .fetch_for_product(&store, &product)
            .unwrap();
        assert_eq!(info.availability, Availability::Available);
        assert!(info.availability.is_purchase_permitted(1000).is_ok());
    }

    #[test]
    fn record_currency_overrides_default() {
        let mut record = StockRecord::new(1, "A", Decimal::ONE, 1);
        record.price_currency = Some("EUR".into());
        let price = DefaultStrategy::new("GBP").pricing(Some(&record)).unwrap();
        assert_eq!(price.currency, "EUR");
    }
}
