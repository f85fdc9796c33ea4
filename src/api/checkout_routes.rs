use super::basket_routes::requested_basket;
use super::context::RequestContext;
use super::generic;
use super::http_server::AppState;
use crate::basket_ops::{self, BasketSummary};
use crate::error::{StorefrontError, StorefrontResult};
use crate::models::{Basket, Price, ShippingAddress};
use crate::shipping;
use crate::storefront::Storefront;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub struct ShippingRequest {
    pub basket: Value,
    #[serde(default)]
    pub shipping_method_code: Option<String>,
    #[serde(default)]
    pub shipping_address: Option<ShippingAddress>,
}

#[derive(Debug, Deserialize)]
pub struct TotalRequest {
    pub basket: Value,
    pub shipping_charge: Price,
}

fn basket_url(basket: &Basket) -> String {
    format!("/api/baskets/{}/", basket.id)
}

fn non_empty_summary(storefront: &Storefront, basket: &Basket) -> StorefrontResult<BasketSummary> {
    let summary = basket_ops::summarize(storefront, basket)?;
    if summary.is_empty {
        return Err(StorefrontError::NotAcceptable("Basket is empty".to_string()));
    }
    Ok(summary)
}

/// Choose a shipping method for a basket and price it.
pub async fn shipping(
    state: web::Data<AppState>,
    ctx: RequestContext,
    body: web::Json<Value>,
) -> StorefrontResult<HttpResponse> {
    let storefront = &state.storefront;
    let request: ShippingRequest = generic::decode_body(body.into_inner())?;
    let basket = requested_basket(storefront, &ctx, &request.basket)?;
    let summary = non_empty_summary(storefront, &basket)?;

    let choice = shipping::choose_method(
        &storefront.store,
        &summary,
        request.shipping_address.as_ref(),
        request.shipping_method_code.as_deref(),
    )?;
    let charge = choice.calculate(&summary);
    Ok(HttpResponse::Ok().json(json!({
        "basket_url": basket_url(&basket),
        "shipping_address": request.shipping_address,
        "shipping_method_code": choice.code(),
        "shipping_charge": charge,
    })))
}

/// Basket total plus a previously computed shipping charge.
pub async fn total(
    state: web::Data<AppState>,
    ctx: RequestContext,
    body: web::Json<Value>,
) -> StorefrontResult<HttpResponse> {
    let storefront = &state.storefront;
    let request: TotalRequest = generic::decode_body(body.into_inner())?;
    let basket = requested_basket(storefront, &ctx, &request.basket)?;
    let summary = non_empty_summary(storefront, &basket)?;

    let total = summary.total().add(&request.shipping_charge)?;
    Ok(HttpResponse::Ok().json(json!({
        "basket_url": basket_url(&basket),
        "total": total,
    })))
}
