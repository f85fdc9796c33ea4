//! Catalogue fixtures: countries, categories, options, products, stock
//! records and shipping methods from one JSON document.
//!
//! Ids inside a fixture only link its records together. Every record gets a
//! fresh store id and references are rewritten to match.

use crate::error::StorefrontResult;
use crate::models::{Category, Country, Product, ProductOption, ShippingMethod, StockRecord};
use crate::store::Store;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;

#[derive(Debug, Default, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub countries: Vec<Country>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub options: Vec<ProductOption>,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub stockrecords: Vec<StockRecord>,
    #[serde(default)]
    pub shippingmethods: Vec<ShippingMethod>,
}

/// Number of records loaded per kind.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub countries: usize,
    pub categories: usize,
    pub options: usize,
    pub products: usize,
    pub stockrecords: usize,
    pub shippingmethods: usize,
}

fn remap(ids: &HashMap<u64, u64>, id: u64) -> u64 {
    ids.get(&id).copied().unwrap_or(id)
}

pub fn load_fixture(store: &Store, fixture: Fixture) -> StorefrontResult<LoadReport> {
    let mut report = LoadReport::default();

    for country in fixture.countries {
        store.save(&country)?;
        report.countries += 1;
    }

    // Parents may follow their children in the document.
    let mut category_ids = HashMap::new();
    let mut created = Vec::new();
    for category in fixture.categories {
        let old = category.id;
        let category = store.create(category)?;
        category_ids.insert(old, category.id);
        created.push(category);
    }
    for mut category in created {
        if let Some(parent) = category.parent {
            category.parent = Some(remap(&category_ids, parent));
            store.save(&category)?;
        }
        report.categories += 1;
    }

    let mut option_ids = HashMap::new();
    for option in fixture.options {
        let old = option.id;
        let option = store.create(option)?;
        option_ids.insert(old, option.id);
        report.options += 1;
    }

    let mut product_ids = HashMap::new();
    for mut product in fixture.products {
        let old = product.id;
        product.categories = product
            .categories
            .iter()
            .map(|c| remap(&category_ids, *c))
            .collect();
        product.options = product
            .options
            .iter()
            .map(|o| remap(&option_ids, *o))
            .collect();
        let product = store.create(product)?;
        product_ids.insert(old, product.id);
        report.products += 1;
    }

    for mut record in fixture.stockrecords {
        record.product = remap(&product_ids, record.product);
        store.create(record)?;
        report.stockrecords += 1;
    }

    for method in fixture.shippingmethods {
        store.create(method)?;
        report.shippingmethods += 1;
    }

    log::info!("Loaded fixture: {:?}", report);
    Ok(report)
}

pub fn load_fixture_from_file(
    path: &str,
    store: &Store,
) -> Result<LoadReport, Box<dyn std::error::Error>> {
    let contents = fs::read_to_string(path)?;
    let fixture: Fixture = serde_json::from_str(&contents)?;
    Ok(load_fixture(store, fixture)?)
}
