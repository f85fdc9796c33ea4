//! Basket operations shared by the basket, wishlist and checkout endpoints.

use crate::error::{StorefrontError, StorefrontResult};
use crate::models::{
    Basket, BasketId, BasketLine, BasketStatus, LineAttribute, LineId, Price, Product, UserId,
};
use crate::permissions::{Requester, SessionContext};
use crate::session::{self, ResolvedSession, SessionRecord};
use crate::store::Store;
use crate::storefront::Storefront;
use crate::strategy::PurchaseInfo;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

/// Computed totals of a basket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BasketSummary {
    pub currency: String,
    pub total_excl_tax: Decimal,
    pub total_incl_tax: Decimal,
    pub total_tax: Decimal,
    pub num_lines: usize,
    pub num_items: u32,
    /// Items whose product requires shipping
    #[serde(skip)]
    pub num_shippable_items: u32,
    pub is_empty: bool,
    pub is_shipping_required: bool,
}

impl BasketSummary {
    pub fn total(&self) -> Price {
        Price::new(&self.currency, self.total_excl_tax, self.total_tax)
    }
}

pub fn lines(store: &Store, basket: BasketId) -> StorefrontResult<Vec<BasketLine>> {
    store.filter(|l: &BasketLine| l.basket == basket)
}

pub fn summarize(sf: &Storefront, basket: &Basket) -> StorefrontResult<BasketSummary> {
    let lines = lines(&sf.store, basket.id)?;
    let mut total_excl_tax = Decimal::ZERO;
    let mut total_incl_tax = Decimal::ZERO;
    let mut num_items = 0u32;
    let mut num_shippable_items = 0u32;
    for line in &lines {
        total_excl_tax += line.line_price_excl_tax();
        total_incl_tax += line.line_price_incl_tax();
        num_items = num_items.saturating_add(line.quantity);
        let requires_shipping = sf
            .store
            .get::<Product>(&line.product)?
            .map_or(true, |p| p.requires_shipping);
        if requires_shipping {
            num_shippable_items = num_shippable_items.saturating_add(line.quantity);
        }
    }
    let currency = lines
        .first()
        .map(|l| l.price_currency.clone())
        .unwrap_or_else(|| sf.config.default_currency.clone());

    Ok(BasketSummary {
        currency,
        total_excl_tax,
        total_incl_tax,
        total_tax: total_incl_tax - total_excl_tax,
        num_lines: lines.len(),
        num_items,
        num_shippable_items,
        is_empty: lines.is_empty(),
        is_shipping_required: num_shippable_items > 0,
    })
}

/// Basket JSON: stored fields, totals and a link to the lines.
pub fn present(sf: &Storefront, basket: &Basket) -> StorefrontResult<Value> {
    let mut doc = serde_json::to_value(basket)?;
    let summary = serde_json::to_value(summarize(sf, basket)?)?;
    if let (Value::Object(fields), Value::Object(totals)) = (&mut doc, summary) {
        fields.extend(totals);
        fields.insert(
            "lines".to_string(),
            Value::String(format!("/api/baskets/{}/lines/", basket.id)),
        );
    }
    Ok(doc)
}

/// Baskets bound to the request: the anonymous session's basket and every
/// editable basket of the logged-in user.
pub fn session_context(
    store: &Store,
    requester: Option<&Requester>,
    session: Option<&SessionRecord>,
) -> StorefrontResult<SessionContext> {
    let mut bound = Vec::new();
    if let Some(basket_id) = session.and_then(|s| s.basket) {
        if let Some(basket) = store.get::<Basket>(&basket_id)? {
            if basket.can_be_edited() {
                bound.push(basket.id);
            }
        }
    }
    if let Some(user_id) = requester.and_then(Requester::user_id) {
        let owned = store.filter(|b: &Basket| b.owner == Some(user_id) && b.can_be_edited())?;
        bound.extend(owned.into_iter().map(|b| b.id));
    }
    Ok(SessionContext::bound_to(bound))
}

fn open_baskets_of(store: &Store, user: UserId) -> StorefrontResult<Vec<Basket>> {
    store.filter(|b: &Basket| b.owner == Some(user) && b.status == BasketStatus::Open)
}

/// The basket of the current request, created when missing.
///
/// A logged-in user gets their first open basket, with any further open
/// baskets merged into it. An anonymous session keeps the basket recorded on
/// it for as long as that basket stays open.
pub fn get_basket(
    sf: &Storefront,
    requester: &Requester,
    session: Option<&mut ResolvedSession>,
) -> StorefrontResult<Basket> {
    let store = &sf.store;
    if let Some(user_id) = requester.user_id() {
        let mut open = open_baskets_of(store, user_id)?.into_iter();
        return match open.next() {
            Some(basket) => {
                for mut extra in open {
                    merge(store, &basket, &mut extra)?;
                }
                Ok(basket)
            }
            None => store.create(Basket::new(Some(user_id))),
        };
    }

    let session = session.ok_or_else(|| {
        StorefrontError::NotAuthenticated("A session is required to use a basket".to_string())
    })?;
    if let Some(basket_id) = session.record.basket {
        if let Some(basket) = store.get::<Basket>(&basket_id)? {
            if basket.status == BasketStatus::Open {
                return Ok(basket);
            }
        }
    }
    let basket = store.create(Basket::new(None))?;
    session::bind_basket(store, session, basket.id)?;
    log::debug!("Created basket {} for anonymous session", basket.id);
    Ok(basket)
}

/// Move every line of `from` into `into` and retire `from`.
///
/// Lines with the same reference are summed. Moved lines are recreated in
/// `into`, so no line ever changes basket.
pub fn merge(store: &Store, into: &Basket, from: &mut Basket) -> StorefrontResult<()> {
    let existing = lines(store, into.id)?;
    for line in lines(store, from.id)? {
        match existing.iter().find(|l| l.line_reference == line.line_reference) {
            Some(target) => {
                let mut target = store.fetch::<BasketLine>(&target.id)?;
                target.quantity = target.quantity.saturating_add(line.quantity);
                store.save(&target)?;
                delete_line(store, &line)?;
            }
            None => {
                let moved = store.create(BasketLine {
                    basket: into.id,
                    ..line.clone()
                })?;
                for attribute in store.filter(|a: &LineAttribute| a.line == line.id)? {
                    store.create(LineAttribute {
                        line: moved.id,
                        ..attribute.clone()
                    })?;
                    store.remove::<LineAttribute>(&attribute.id)?;
                }
                store.remove::<BasketLine>(&line.id)?;
            }
        }
    }
    from.status = BasketStatus::Merged;
    from.date_merged = Some(Utc::now());
    store.save(from)?;
    log::info!("Merged basket {} into basket {}", from.id, into.id);
    Ok(())
}

/// After login, fold the basket the anonymous session was using into the
/// user's basket.
pub fn adopt_anonymous_basket(
    sf: &Storefront,
    requester: &Requester,
    anonymous_basket: Option<BasketId>,
) -> StorefrontResult<()> {
    let Some(basket_id) = anonymous_basket else {
        return Ok(());
    };
    let Some(mut anonymous) = sf.store.get::<Basket>(&basket_id)? else {
        return Ok(());
    };
    if anonymous.status != BasketStatus::Open || anonymous.owner.is_some() {
        return Ok(());
    }
    let basket = get_basket(sf, requester, None)?;
    merge(&sf.store, &basket, &mut anonymous)
}

fn too_many_items(threshold: u32) -> StorefrontError {
    StorefrontError::NotAcceptable(format!(
        "Due to technical limitations we are not able to ship more than {} items in one order.",
        threshold
    ))
}

/// Items already in the basket, leaving out `excluded`. `None` on overflow.
fn items_in_basket(
    store: &Store,
    basket: &Basket,
    excluded: Option<LineId>,
) -> StorefrontResult<Option<u32>> {
    Ok(lines(store, basket.id)?
        .iter()
        .filter(|l| Some(l.id) != excluded)
        .try_fold(0u32, |total, l| total.checked_add(l.quantity)))
}

/// Refuse quantities that would push the basket over the configured limit.
pub fn check_quantity_allowed(
    sf: &Storefront,
    basket: &Basket,
    quantity: u32,
) -> StorefrontResult<()> {
    within_threshold(sf, basket, None, quantity)
}

/// Like [`check_quantity_allowed`] for a line whose quantity is being set,
/// counting the line at its new quantity only.
pub fn check_line_quantity(
    sf: &Storefront,
    basket: &Basket,
    line: &BasketLine,
) -> StorefrontResult<()> {
    within_threshold(sf, basket, Some(line.id), line.quantity)
}

fn within_threshold(
    sf: &Storefront,
    basket: &Basket,
    excluded: Option<LineId>,
    quantity: u32,
) -> StorefrontResult<()> {
    let Some(threshold) = sf.config.max_basket_quantity_threshold else {
        return Ok(());
    };
    let total = items_in_basket(&sf.store, basket, excluded)?
        .and_then(|current| current.checked_add(quantity));
    match total {
        Some(total) if total <= threshold => Ok(()),
        _ => Err(too_many_items(threshold)),
    }
}

/// Availability and stock checks for putting `quantity` of `product` in a
/// basket.
pub fn check_purchase(
    sf: &Storefront,
    requester: Option<&Requester>,
    product: &Product,
    quantity: u32,
) -> StorefrontResult<PurchaseInfo> {
    let info = sf
        .strategy(requester)
        .fetch_for_product(&sf.store, product)?;
    if !info.availability.is_available_to_buy() {
        return Err(StorefrontError::NotAcceptable(info.availability.message()));
    }
    info.availability
        .is_purchase_permitted(quantity)
        .map_err(StorefrontError::NotAcceptable)?;
    Ok(info)
}

/// Add `quantity` of `product` to the basket after checking availability,
/// stock and the basket quantity limit.
pub fn add_product(
    sf: &Storefront,
    requester: Option<&Requester>,
    basket: &Basket,
    product: &Product,
    quantity: u32,
) -> StorefrontResult<BasketLine> {
    if quantity == 0 {
        return Err(StorefrontError::Validation(
            "Quantity must be at least 1".to_string(),
        ));
    }
    if !basket.can_be_edited() {
        return Err(StorefrontError::NotAcceptable(format!(
            "Basket {} can not be edited",
            basket.id
        )));
    }

    let info = check_purchase(sf, requester, product, quantity)?;
    check_quantity_allowed(sf, basket, quantity)?;

    let stockrecord = info.stockrecord.as_ref().map(|r| r.id);
    let reference = BasketLine::reference_for(product.id, stockrecord);
    let existing = sf
        .store
        .filter(|l: &BasketLine| l.basket == basket.id && l.line_reference == reference)?;
    if let Some(mut line) = existing.into_iter().next() {
        line.quantity = line.quantity.checked_add(quantity).ok_or_else(|| {
            StorefrontError::NotAcceptable(format!(
                "Quantity of line {} can not grow by {}",
                line.id, quantity
            ))
        })?;
        sf.store.save(&line)?;
        return Ok(line);
    }

    let currency = info
        .price
        .as_ref()
        .map(|p| p.currency.clone())
        .unwrap_or_else(|| sf.config.default_currency.clone());
    let line = sf.store.create(BasketLine {
        id: 0,
        basket: basket.id,
        line_reference: reference,
        product: product.id,
        stockrecord,
        quantity,
        price_currency: currency,
        price_excl_tax: info.price.as_ref().map(|p| p.excl_tax),
        price_incl_tax: info.price.as_ref().and_then(|p| p.incl_tax),
        date_created: Utc::now(),
    })?;
    log::info!(
        "Added {} x product {} to basket {}",
        quantity,
        product.id,
        basket.id
    );
    Ok(line)
}

/// Remove a line together with its attributes.
pub fn delete_line(store: &Store, line: &BasketLine) -> StorefrontResult<()> {
    for attribute in store.filter(|a: &LineAttribute| a.line == line.id)? {
        store.remove::<LineAttribute>(&attribute.id)?;
    }
    store.remove::<BasketLine>(&line.id)?;
    Ok(())
}

/// Remove every line of a basket.
pub fn clear(store: &Store, basket: BasketId) -> StorefrontResult<()> {
    for line in lines(store, basket)? {
        delete_line(store, &line)?;
    }
    Ok(())
}
