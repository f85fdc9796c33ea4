use super::http_server::AppState;
use crate::basket_ops;
use crate::constants::SESSION_HEADER;
use crate::error::{StorefrontError, StorefrontResult};
use crate::permissions::{Access, Requester, SessionContext};
use crate::session::{self, ResolvedSession};
use crate::storefront::Storefront;
use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};

/// Identity and session of the current request.
///
/// Resolved from the `Session-Id` header before the handler runs. A request
/// without the header has no session and no requester.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub session: Option<ResolvedSession>,
    pub requester: Option<Requester>,
}

impl RequestContext {
    fn resolve(req: &HttpRequest) -> StorefrontResult<Self> {
        let state = req.app_data::<web::Data<AppState>>().ok_or_else(|| {
            StorefrontError::Config("Application state is not configured".to_string())
        })?;
        let storefront = &state.storefront;
        let header = match req.headers().get(SESSION_HEADER) {
            Some(value) => Some(value.to_str().map_err(|_| {
                StorefrontError::Validation(format!("Invalid {} header", SESSION_HEADER))
            })?),
            None => None,
        };
        let session =
            session::resolve_session(&storefront.store, &storefront.config.secret_key, header)?;
        let requester = session::resolve_requester(&storefront.store, session.as_ref())?;
        Ok(Self { session, requester })
    }

    pub fn requester(&self) -> Option<&Requester> {
        self.requester.as_ref()
    }

    /// Enforce an endpoint access level.
    pub fn allows(&self, access: Access) -> StorefrontResult<()> {
        access.check(self.requester()).map_err(|e| {
            log::warn!("Denied {:?} endpoint: {}", access, e.detail());
            e
        })
    }

    /// The requester, once [`RequestContext::allows`] has admitted one.
    pub fn identified(&self) -> StorefrontResult<&Requester> {
        self.requester().ok_or_else(|| {
            StorefrontError::NotAuthenticated(
                "Authentication credentials were not provided.".to_string(),
            )
        })
    }

    /// Baskets bound to this request.
    pub fn session_context(&self, storefront: &Storefront) -> StorefrontResult<SessionContext> {
        basket_ops::session_context(
            &storefront.store,
            self.requester(),
            self.session.as_ref().map(|s| &s.record),
        )
    }
}

impl FromRequest for RequestContext {
    type Error = StorefrontError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Self::resolve(req))
    }
}
