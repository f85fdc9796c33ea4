use super::catalogue::{OptionId, ProductId, StockRecordId};
use super::user::UserId;
use crate::store::numeric_entity;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub type BasketId = u64;
pub type LineId = u64;
pub type LineAttributeId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum BasketStatus {
    /// Currently active
    Open,
    /// Absorbed into another basket
    Merged,
    /// Kept for later
    Saved,
    /// Locked during checkout
    Frozen,
    /// Turned into an order
    Submitted,
}

impl BasketStatus {
    pub fn can_be_edited(self) -> bool {
        matches!(self, BasketStatus::Open | BasketStatus::Saved)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Basket {
    #[serde(default)]
    pub id: BasketId,
    /// `None` for baskets of anonymous sessions
    #[serde(default)]
    pub owner: Option<UserId>,
    #[serde(default = "open")]
    pub status: BasketStatus,
    #[serde(default = "Utc::now")]
    pub date_created: DateTime<Utc>,
    #[serde(default)]
    pub date_merged: Option<DateTime<Utc>>,
    #[serde(default)]
    pub date_submitted: Option<DateTime<Utc>>,
}
numeric_entity!(Basket, "baskets", "basket");

fn open() -> BasketStatus {
    BasketStatus::Open
}

impl Basket {
    pub fn new(owner: Option<UserId>) -> Self {
        Self {
            id: 0,
            owner,
            status: BasketStatus::Open,
            date_created: Utc::now(),
            date_merged: None,
            date_submitted: None,
        }
    }

    pub fn can_be_edited(&self) -> bool {
        self.status.can_be_edited()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasketLine {
    #[serde(default)]
    pub id: LineId,
    pub basket: BasketId,
    /// `<product>_<stockrecord>`; one line per reference within a basket
    pub line_reference: String,
    pub product: ProductId,
    #[serde(default)]
    pub stockrecord: Option<StockRecordId>,
    pub quantity: u32,
    pub price_currency: String,
    #[serde(default)]
    pub price_excl_tax: Option<Decimal>,
    #[serde(default)]
    pub price_incl_tax: Option<Decimal>,
    #[serde(default = "Utc::now")]
    pub date_created: DateTime<Utc>,
}
numeric_entity!(BasketLine, "basket_lines", "line");

impl BasketLine {
    pub fn reference_for(product: ProductId, stockrecord: Option<StockRecordId>) -> String {
        match stockrecord {
            Some(record) => format!("{}_{}", product, record),
            None => product.to_string(),
        }
    }

    pub fn line_price_excl_tax(&self) -> Decimal {
        self.price_excl_tax.unwrap_or_default() * Decimal::from(self.quantity)
    }

    pub fn line_price_incl_tax(&self) -> Decimal {
        self.price_incl_tax
            .or(self.price_excl_tax)
            .unwrap_or_default()
            * Decimal::from(self.quantity)
    }
}

/// Value of a product option chosen for a basket line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineAttribute {
    #[serde(default)]
    pub id: LineAttributeId,
    pub line: LineId,
    pub option: OptionId,
    pub value: String,
}
numeric_entity!(LineAttribute, "line_attributes", "line attribute");
