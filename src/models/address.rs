use crate::store::Entity;
use serde::{Deserialize, Serialize};

/// ISO 3166-1 country, keyed by its alpha-2 code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
    pub iso_3166_1_a2: String,
    #[serde(default)]
    pub iso_3166_1_a3: String,
    pub name: String,
    #[serde(default)]
    pub printable_name: String,
    #[serde(default)]
    pub is_shipping_country: bool,
}

impl Entity for Country {
    type Id = String;
    const TREE: &'static str = "countries";
    const KIND: &'static str = "country";

    fn id(&self) -> String {
        self.iso_3166_1_a2.clone()
    }

    fn set_id(&mut self, id: String) {
        self.iso_3166_1_a2 = id;
    }
}

/// Delivery address posted with shipping and total requests.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ShippingAddress {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub line1: String,
    #[serde(default)]
    pub line2: String,
    #[serde(default)]
    pub line3: String,
    #[serde(default)]
    pub line4: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub postcode: String,
    /// Alpha-2 code or a `.../countries/<code>/` url
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub notes: String,
}
