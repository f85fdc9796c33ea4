//! List/retrieve/create/update/destroy handlers shared by every resource.
//!
//! A [`Resource`] declares its access levels and object-level permission;
//! the handlers here apply them uniformly. Update merges the request body
//! into the stored object, so PUT behaves like PATCH.

use super::context::RequestContext;
use super::http_server::AppState;
use super::hyperlinks;
use crate::error::{StorefrontError, StorefrontResult};
use crate::permissions::{Access, Requester, SessionContext};
use crate::store::Entity;
use crate::storefront::Storefront;
use actix_web::{web, HttpResponse};
use serde_json::Value;
use std::collections::HashMap;

pub type ListQuery = HashMap<String, String>;

pub trait Resource: Entity {
    /// Required to list, and to create where creation is routed
    const LIST_ACCESS: Access;
    /// Required before any single object is loaded
    const DETAIL_ACCESS: Access;
    /// Fields a request body can never change
    const READ_ONLY_FIELDS: &'static [&'static str] = &["id"];
    /// `(field, collection)` pairs accepting a url instead of a primary key
    const RELATED_FIELDS: &'static [(&'static str, &'static str)] = &[];

    fn has_object_permission(
        &self,
        _storefront: &Storefront,
        _requester: Option<&Requester>,
        _session: &SessionContext,
    ) -> StorefrontResult<bool> {
        Ok(true)
    }

    fn filter_list(
        _storefront: &Storefront,
        items: Vec<Self>,
        _query: &ListQuery,
    ) -> StorefrontResult<Vec<Self>> {
        Ok(items)
    }

    fn present(&self, _storefront: &Storefront) -> StorefrontResult<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Checked on create and update, before anything is written.
    fn validate(
        &self,
        _storefront: &Storefront,
        _requester: Option<&Requester>,
        _session: &SessionContext,
    ) -> StorefrontResult<()> {
        Ok(())
    }

    /// Remove dependent records before the object itself is deleted.
    fn on_destroy(&self, _storefront: &Storefront) -> StorefrontResult<()> {
        Ok(())
    }
}

pub fn permission_denied() -> StorefrontError {
    StorefrontError::PermissionDenied(
        "You do not have permission to perform this action.".to_string(),
    )
}

/// Decode a request body, reporting failures as 400.
pub fn decode_body<T: serde::de::DeserializeOwned>(body: Value) -> StorefrontResult<T> {
    serde_json::from_value(body).map_err(|e| StorefrontError::Validation(e.to_string()))
}

/// Load one object after the endpoint and object permission checks.
pub fn load_authorized<R: Resource>(
    storefront: &Storefront,
    ctx: &RequestContext,
    pk: &str,
) -> StorefrontResult<R> {
    ctx.allows(R::DETAIL_ACCESS)?;
    let id: R::Id = pk
        .parse()
        .map_err(|_| StorefrontError::not_found(R::KIND, pk))?;
    let item = storefront.store.fetch::<R>(&id)?;
    let session = ctx.session_context(storefront)?;
    if !item.has_object_permission(storefront, ctx.requester(), &session)? {
        log::warn!("Denied access to {} {}", R::KIND, pk);
        return Err(permission_denied());
    }
    Ok(item)
}

pub async fn list<R: Resource>(
    state: web::Data<AppState>,
    ctx: RequestContext,
    query: web::Query<ListQuery>,
) -> StorefrontResult<HttpResponse> {
    ctx.allows(R::LIST_ACCESS)?;
    let storefront = &state.storefront;
    let session = ctx.session_context(storefront)?;
    let items = R::filter_list(storefront, storefront.store.all::<R>()?, &query)?;

    let mut docs = Vec::with_capacity(items.len());
    for item in items {
        if item.has_object_permission(storefront, ctx.requester(), &session)? {
            docs.push(item.present(storefront)?);
        }
    }
    Ok(HttpResponse::Ok().json(docs))
}

pub async fn retrieve<R: Resource>(
    state: web::Data<AppState>,
    ctx: RequestContext,
    path: web::Path<String>,
) -> StorefrontResult<HttpResponse> {
    let storefront = &state.storefront;
    let item: R = load_authorized(storefront, &ctx, &path)?;
    Ok(HttpResponse::Ok().json(item.present(storefront)?))
}

pub async fn create<R: Resource + Entity<Id = u64>>(
    state: web::Data<AppState>,
    ctx: RequestContext,
    body: web::Json<Value>,
) -> StorefrontResult<HttpResponse> {
    ctx.allows(R::LIST_ACCESS)?;
    let storefront = &state.storefront;
    let mut body = body.into_inner();
    hyperlinks::resolve_fields(&mut body, R::RELATED_FIELDS)?;
    if let Value::Object(fields) = &mut body {
        fields.remove("id");
    }
    let item: R = decode_body(body)?;
    let session = ctx.session_context(storefront)?;
    item.validate(storefront, ctx.requester(), &session)?;

    let item = storefront.store.create(item)?;
    log::info!("Created {} {}", R::KIND, item.id());
    Ok(HttpResponse::Created().json(item.present(storefront)?))
}

pub async fn update<R: Resource>(
    state: web::Data<AppState>,
    ctx: RequestContext,
    path: web::Path<String>,
    body: web::Json<Value>,
) -> StorefrontResult<HttpResponse> {
    let storefront = &state.storefront;
    let existing: R = load_authorized(storefront, &ctx, &path)?;

    let mut body = body.into_inner();
    hyperlinks::resolve_fields(&mut body, R::RELATED_FIELDS)?;
    let Value::Object(changes) = body else {
        return Err(StorefrontError::Validation(
            "Expected a JSON object".to_string(),
        ));
    };
    let mut doc = serde_json::to_value(&existing)?;
    if let Value::Object(fields) = &mut doc {
        for (field, value) in changes {
            if !R::READ_ONLY_FIELDS.contains(&field.as_str()) {
                fields.insert(field, value);
            }
        }
    }
    let updated: R = decode_body(doc)?;
    let session = ctx.session_context(storefront)?;
    updated.validate(storefront, ctx.requester(), &session)?;

    storefront.store.save(&updated)?;
    log::info!("Updated {} {}", R::KIND, updated.id());
    Ok(HttpResponse::Ok().json(updated.present(storefront)?))
}

pub async fn destroy<R: Resource>(
    state: web::Data<AppState>,
    ctx: RequestContext,
    path: web::Path<String>,
) -> StorefrontResult<HttpResponse> {
    let storefront = &state.storefront;
    let item: R = load_authorized(storefront, &ctx, &path)?;
    item.on_destroy(storefront)?;
    storefront.store.remove::<R>(&item.id())?;
    log::info!("Deleted {} {}", R::KIND, item.id());
    Ok(HttpResponse::NoContent().finish())
}
