use super::context::RequestContext;
use super::generic::{self, Resource};
use super::http_server::AppState;
use crate::basket_ops;
use crate::constants::SESSION_HEADER;
use crate::error::{StorefrontError, StorefrontResult};
use crate::models::User;
use crate::permissions::Requester;
use crate::session::{self, credentials};
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// The logged-in user, or 204 when there is none.
pub async fn current_user(
    state: web::Data<AppState>,
    ctx: RequestContext,
) -> StorefrontResult<HttpResponse> {
    let storefront = &state.storefront;
    match ctx.requester().and_then(Requester::user_id) {
        Some(id) => {
            let user = storefront.store.fetch::<User>(&id)?;
            Ok(HttpResponse::Ok().json(user.present(storefront)?))
        }
        None => Ok(HttpResponse::NoContent().finish()),
    }
}

/// Log in on the current session.
///
/// The response carries the upgraded `Session-Id` the client must use from
/// now on.
pub async fn login(
    state: web::Data<AppState>,
    ctx: RequestContext,
    body: web::Json<Value>,
) -> StorefrontResult<HttpResponse> {
    let storefront = &state.storefront;
    let request: LoginRequest = generic::decode_body(body.into_inner())?;
    let current = ctx.session.as_ref().ok_or_else(|| {
        StorefrontError::Validation(format!("A {} header is required to log in", SESSION_HEADER))
    })?;

    let user = credentials::authenticate(&storefront.store, &request.username, &request.password)?;
    let (upgraded, anonymous_basket) = session::login(
        &storefront.store,
        &storefront.config.secret_key,
        current,
        &user,
    )?;
    basket_ops::adopt_anonymous_basket(storefront, &Requester::from_user(&user), anonymous_basket)?;

    Ok(HttpResponse::Ok()
        .insert_header((SESSION_HEADER, upgraded.uri.to_string()))
        .json(user.present(storefront)?))
}

pub async fn logout(
    state: web::Data<AppState>,
    ctx: RequestContext,
) -> StorefrontResult<HttpResponse> {
    let authenticated = ctx.requester().is_some_and(Requester::is_authenticated);
    let Some(current) = ctx.session.as_ref().filter(|_| authenticated) else {
        return Err(StorefrontError::MethodNotAllowed(
            "Not logged in".to_string(),
        ));
    };
    session::logout(&state.storefront.store, current)?;
    log::info!("Session logged out");
    Ok(HttpResponse::Ok().finish())
}
