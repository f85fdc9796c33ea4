use super::context::RequestContext;
use super::generic::{self, load_authorized, Resource};
use super::http_server::AppState;
use super::hyperlinks;
use crate::basket_ops;
use crate::error::{StorefrontError, StorefrontResult};
use crate::models::{Basket, Product};
use crate::permissions::Access;
use crate::storefront::Storefront;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::Value;

/// Body of `POST /basket/add-product`.
#[derive(Debug, Deserialize)]
pub struct AddProductRequest {
    #[serde(default)]
    pub url: Option<Value>,
    #[serde(default)]
    pub product: Option<Value>,
    #[serde(default = "one")]
    pub quantity: u32,
}

fn one() -> u32 {
    1
}

/// The product named by a request body. Every failure is a 406.
pub fn requested_product(
    storefront: &Storefront,
    url: Option<&Value>,
    product: Option<&Value>,
) -> StorefrontResult<Product> {
    let reference = url.or(product).ok_or_else(|| {
        StorefrontError::NotAcceptable("A product url is required".to_string())
    })?;
    let pk = hyperlinks::resolve_pk(reference, "products")
        .map_err(|e| StorefrontError::NotAcceptable(e.detail()))?;
    storefront
        .store
        .get::<Product>(&pk)?
        .ok_or_else(|| StorefrontError::NotAcceptable(format!("Product {} does not exist", pk)))
}

/// Basket referenced by a request body, after the basket policy.
pub fn requested_basket(
    storefront: &Storefront,
    ctx: &RequestContext,
    reference: &Value,
) -> StorefrontResult<Basket> {
    let pk = hyperlinks::resolve_pk(reference, "baskets")?;
    load_authorized(storefront, ctx, &pk.to_string())
}

/// The current session's basket, creating it when needed.
pub fn current_basket(storefront: &Storefront, ctx: &RequestContext) -> StorefrontResult<Basket> {
    let requester = ctx.identified()?;
    let mut session = ctx.session.clone();
    basket_ops::get_basket(storefront, requester, session.as_mut())
}

pub async fn get_basket(
    state: web::Data<AppState>,
    ctx: RequestContext,
) -> StorefrontResult<HttpResponse> {
    ctx.allows(Access::HasUser)?;
    let storefront = &state.storefront;
    let basket = current_basket(storefront, &ctx)?;
    Ok(HttpResponse::Ok().json(basket.present(storefront)?))
}

pub async fn basket_lines(
    state: web::Data<AppState>,
    ctx: RequestContext,
    path: web::Path<String>,
) -> StorefrontResult<HttpResponse> {
    let storefront = &state.storefront;
    let basket: Basket = load_authorized(storefront, &ctx, &path)?;
    let docs = basket_ops::lines(&storefront.store, basket.id)?
        .iter()
        .map(|line| line.present(storefront))
        .collect::<StorefrontResult<Vec<_>>>()?;
    Ok(HttpResponse::Ok().json(docs))
}

pub async fn add_product(
    state: web::Data<AppState>,
    ctx: RequestContext,
    body: web::Json<Value>,
) -> StorefrontResult<HttpResponse> {
    ctx.allows(Access::HasUser)?;
    let storefront = &state.storefront;
    let request: AddProductRequest = generic::decode_body(body.into_inner())
        .map_err(|e| StorefrontError::NotAcceptable(e.detail()))?;
    let product = requested_product(storefront, request.url.as_ref(), request.product.as_ref())?;

    let basket = current_basket(storefront, &ctx)?;
    basket_ops::add_product(
        storefront,
        ctx.requester(),
        &basket,
        &product,
        request.quantity,
    )
    .map_err(|e| match e {
        StorefrontError::Validation(reason) => StorefrontError::NotAcceptable(reason),
        other => other,
    })?;
    Ok(HttpResponse::Ok().json(basket.present(storefront)?))
}
