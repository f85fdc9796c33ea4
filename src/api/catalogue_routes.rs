use super::context::RequestContext;
use super::http_server::AppState;
use crate::error::{StorefrontError, StorefrontResult};
use crate::models::{Product, StockRecord};
use actix_web::{web, HttpResponse};
use serde_json::json;

fn product(state: &AppState, pk: &str) -> StorefrontResult<Product> {
    let id: u64 = pk
        .parse()
        .map_err(|_| StorefrontError::not_found("product", pk))?;
    state.storefront.store.fetch(&id)
}

/// Price of a product under the requester's strategy.
pub async fn product_price(
    state: web::Data<AppState>,
    ctx: RequestContext,
    path: web::Path<String>,
) -> StorefrontResult<HttpResponse> {
    let product = product(&state, &path)?;
    let info = state
        .storefront
        .strategy(ctx.requester())
        .fetch_for_product(&state.storefront.store, &product)?;
    let body = match info.price {
        Some(price) => json!({
            "exists": true,
            "currency": price.currency,
            "excl_tax": price.excl_tax,
            "incl_tax": price.incl_tax,
            "tax": price.tax,
        }),
        None => json!({ "exists": false }),
    };
    Ok(HttpResponse::Ok().json(body))
}

pub async fn product_availability(
    state: web::Data<AppState>,
    ctx: RequestContext,
    path: web::Path<String>,
) -> StorefrontResult<HttpResponse> {
    let product = product(&state, &path)?;
    let info = state
        .storefront
        .strategy(ctx.requester())
        .fetch_for_product(&state.storefront.store, &product)?;
    Ok(HttpResponse::Ok().json(info.availability.view()))
}

pub async fn product_stockrecords(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> StorefrontResult<HttpResponse> {
    let product = product(&state, &path)?;
    let records = state
        .storefront
        .store
        .filter(|r: &StockRecord| r.product == product.id)?;
    Ok(HttpResponse::Ok().json(records))
}
