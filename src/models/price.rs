use crate::error::{StorefrontError, StorefrontResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A monetary amount with its tax breakdown.
///
/// `incl_tax` and `tax` are optional because a price posted by a client may
/// only carry the tax-exclusive amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    pub currency: String,
    pub excl_tax: Decimal,
    #[serde(default)]
    pub incl_tax: Option<Decimal>,
    #[serde(default)]
    pub tax: Option<Decimal>,
}

impl Price {
    /// Price with a known tax amount.
    pub fn new(currency: &str, excl_tax: Decimal, tax: Decimal) -> Self {
        Self {
            currency: currency.to_string(),
            excl_tax,
            incl_tax: Some(excl_tax + tax),
            tax: Some(tax),
        }
    }

    pub fn zero(currency: &str) -> Self {
        Self::new(currency, Decimal::ZERO, Decimal::ZERO)
    }

    /// Tax-inclusive amount, treating an unknown tax as zero.
    pub fn effective_incl_tax(&self) -> Decimal {
        self.incl_tax.unwrap_or(self.excl_tax)
    }

    /// Sum of two prices in the same currency.
    pub fn add(&self, other: &Price) -> StorefrontResult<Price> {
        if self.currency != other.currency {
            return Err(StorefrontError::Validation(format!(
                "Currency mismatch: {} != {}",
                self.currency, other.currency
            )));
        }
        let excl_tax = self.excl_tax + other.excl_tax;
        let incl_tax = self.effective_incl_tax() + other.effective_incl_tax();
        Ok(Price {
            currency: self.currency.clone(),
            excl_tax,
            incl_tax: Some(incl_tax),
            tax: Some(incl_tax - excl_tax),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn add_sums_both_columns() {
        let a = Price::new("GBP", Decimal::new(1000, 2), Decimal::new(200, 2));
        let b = Price {
            currency: "GBP".into(),
            excl_tax: Decimal::new(500, 2),
            incl_tax: None,
            tax: None,
        };
        let sum = a.add(&b).unwrap();
        assert_eq!(sum.excl_tax, Decimal::new(1500, 2));
        assert_eq!(sum.incl_tax, Some(Decimal::new(1700, 2)));
        assert_eq!(sum.tax, Some(Decimal::new(200, 2)));
    }

    #[test]
    fn add_rejects_currency_mismatch() {
        let a = Price::zero("GBP");
        let b = Price::zero("EUR");
        assert!(a.add(&b).is_err());
    }

    #[test]
    fn amounts_serialize_as_strings() {
        let p = Price::new("EUR", Decimal::new(1999, 2), Decimal::ZERO);
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v["excl_tax"], "19.99");
        assert_eq!(v["incl_tax"], "19.99");
    }
}
