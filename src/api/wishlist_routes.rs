use super::basket_routes::{current_basket, requested_product};
use super::context::RequestContext;
use super::generic::{self, load_authorized, permission_denied, Resource};
use super::http_server::AppState;
use super::hyperlinks;
use crate::basket_ops;
use crate::error::{StorefrontError, StorefrontResult};
use crate::models::{Product, UserId, Visibility, WishList, WishListLine};
use crate::permissions::{can_access_wishlist, can_access_wishlist_line, Access};
use crate::store::Store;
use crate::storefront::Storefront;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::Value;

/// The user's most recent private wishlist, created when there is none.
pub fn get_wishlist(store: &Store, user: UserId) -> StorefrontResult<WishList> {
    let latest = store
        .filter(|w: &WishList| w.owner == user && w.visibility == Visibility::Private)?
        .into_iter()
        .max_by_key(|w| (w.date_created, w.id));
    match latest {
        Some(wishlist) => Ok(wishlist),
        None => {
            let wishlist = store.create(WishList::new(user))?;
            log::info!("Created wishlist {} for user {}", wishlist.id, user);
            Ok(wishlist)
        }
    }
}

/// Bump the line for `product`, or start one.
pub fn add_to_wishlist(
    store: &Store,
    wishlist: &WishList,
    product: &Product,
) -> StorefrontResult<WishListLine> {
    let existing = store
        .filter(|l: &WishListLine| l.wishlist == wishlist.id && l.product == Some(product.id))?
        .into_iter()
        .next();
    match existing {
        Some(mut line) => {
            line.quantity = line.quantity.saturating_add(1);
            store.save(&line)?;
            Ok(line)
        }
        None => store.create(WishListLine {
            id: 0,
            wishlist: wishlist.id,
            product: Some(product.id),
            quantity: 1,
            title: product.title.clone(),
        }),
    }
}

fn authenticated_user(ctx: &RequestContext) -> StorefrontResult<UserId> {
    ctx.allows(Access::IsAuthenticated)?;
    ctx.identified()?.user_id().ok_or_else(|| {
        StorefrontError::NotAuthenticated("Authentication credentials were not provided.".to_string())
    })
}

pub async fn my_wishlist(
    state: web::Data<AppState>,
    ctx: RequestContext,
) -> StorefrontResult<HttpResponse> {
    let user = authenticated_user(&ctx)?;
    let storefront = &state.storefront;
    let wishlist = get_wishlist(&storefront.store, user)?;
    Ok(HttpResponse::Ok().json(wishlist.present(storefront)?))
}

#[derive(Debug, Deserialize)]
pub struct WishListProductRequest {
    #[serde(default)]
    pub url: Option<Value>,
    #[serde(default)]
    pub product: Option<Value>,
}

pub async fn add_product(
    state: web::Data<AppState>,
    ctx: RequestContext,
    body: web::Json<Value>,
) -> StorefrontResult<HttpResponse> {
    let user = authenticated_user(&ctx)?;
    let storefront = &state.storefront;
    let request: WishListProductRequest = generic::decode_body(body.into_inner())
        .map_err(|e| StorefrontError::NotAcceptable(e.detail()))?;
    let product = requested_product(storefront, request.url.as_ref(), request.product.as_ref())?;

    let wishlist = get_wishlist(&storefront.store, user)?;
    let line = add_to_wishlist(&storefront.store, &wishlist, &product)?;
    log::info!(
        "Wishlist {} now holds {} x product {}",
        wishlist.id,
        line.quantity,
        product.id
    );
    Ok(HttpResponse::Ok().json(wishlist.present(storefront)?))
}

/// Lines of one wishlist that still point at a product.
pub async fn wishlist_lines(
    state: web::Data<AppState>,
    ctx: RequestContext,
    path: web::Path<String>,
) -> StorefrontResult<HttpResponse> {
    let storefront = &state.storefront;
    let wishlist: WishList = load_authorized(storefront, &ctx, &path)?;
    let lines = storefront
        .store
        .filter(|l: &WishListLine| l.wishlist == wishlist.id && l.product.is_some())?;
    Ok(HttpResponse::Ok().json(lines))
}

/// Add a line to the wishlist named in the url.
///
/// A `wishlist` in the body must be accessible and agree with the url.
pub async fn create_wishlist_line(
    state: web::Data<AppState>,
    ctx: RequestContext,
    path: web::Path<String>,
    body: web::Json<Value>,
) -> StorefrontResult<HttpResponse> {
    let storefront = &state.storefront;
    let wishlist: WishList = load_authorized(storefront, &ctx, &path)?;

    let mut body = body.into_inner();
    hyperlinks::resolve_fields(&mut body, WishListLine::RELATED_FIELDS)?;
    let Value::Object(fields) = &mut body else {
        return Err(StorefrontError::Validation(
            "Expected a JSON object".to_string(),
        ));
    };
    fields.remove("id");
    // The body's wishlist passes the policy before it is compared with the url.
    if let Some(target) = fields.get("wishlist").and_then(Value::as_u64) {
        let requested = storefront.store.get::<WishList>(&target)?.ok_or_else(|| {
            StorefrontError::Validation(format!("Wishlist {} does not exist", target))
        })?;
        if !can_access_wishlist(ctx.identified()?, &requested) {
            log::warn!("Denied adding a line to wishlist {}", target);
            return Err(permission_denied());
        }
        if target != wishlist.id {
            return Err(StorefrontError::NotAcceptable(format!(
                "Target wishlist inconsistent {} != {}",
                wishlist.id, target
            )));
        }
    }
    fields.insert("wishlist".to_string(), Value::from(wishlist.id));

    let mut line: WishListLine = generic::decode_body(body)?;
    if line.title.is_empty() {
        if let Some(product) = line.product {
            line.title = storefront.store.fetch::<Product>(&product)?.title;
        }
    }
    let session = ctx.session_context(storefront)?;
    line.validate(storefront, ctx.requester(), &session)?;
    let line = storefront.store.create(line)?;
    log::info!("Created wishlist line {} on wishlist {}", line.id, wishlist.id);
    Ok(HttpResponse::Created().json(line.present(storefront)?))
}

#[derive(Debug, Deserialize)]
pub struct AddFromWishListRequest {
    pub url: Value,
}

fn requested_wishlist_line(
    storefront: &Storefront,
    ctx: &RequestContext,
    reference: &Value,
) -> StorefrontResult<(WishListLine, Product)> {
    let pk = hyperlinks::resolve_pk(reference, "wishlistlines")
        .map_err(|e| StorefrontError::NotAcceptable(e.detail()))?;
    let line = storefront
        .store
        .get::<WishListLine>(&pk)?
        .ok_or_else(|| StorefrontError::NotAcceptable(format!("Wishlist line {} does not exist", pk)))?;
    let wishlist = storefront.store.fetch::<WishList>(&line.wishlist)?;
    if !can_access_wishlist_line(ctx.identified()?, &line, &wishlist) {
        log::warn!("Denied adding wishlist line {} to basket", line.id);
        return Err(permission_denied());
    }
    let product = match line.product {
        Some(id) => storefront.store.get::<Product>(&id)?,
        None => None,
    }
    .ok_or_else(|| {
        StorefrontError::NotAcceptable("The product of this line no longer exists".to_string())
    })?;
    Ok((line, product))
}

/// Move a wishlist line into the current basket.
pub async fn add_from_wishlist(
    state: web::Data<AppState>,
    ctx: RequestContext,
    body: web::Json<Value>,
) -> StorefrontResult<HttpResponse> {
    ctx.allows(Access::IsAuthenticated)?;
    let storefront = &state.storefront;
    let request: AddFromWishListRequest = generic::decode_body(body.into_inner())
        .map_err(|e| StorefrontError::NotAcceptable(e.detail()))?;
    let (line, product) = requested_wishlist_line(storefront, &ctx, &request.url)?;

    let basket = current_basket(storefront, &ctx)?;
    basket_ops::add_product(storefront, ctx.requester(), &basket, &product, line.quantity)?;
    storefront.store.remove::<WishListLine>(&line.id)?;
    log::info!(
        "Moved wishlist line {} into basket {}",
        line.id,
        basket.id
    );
    Ok(HttpResponse::Ok().json(basket.present(storefront)?))
}
