//! HTTP API: route handlers, request context and the server itself.

pub mod basket_routes;
pub mod catalogue_routes;
pub mod checkout_routes;
pub mod context;
pub mod generic;
pub mod http_server;
pub mod hyperlinks;
pub mod log_routes;
pub mod login_routes;
pub mod resources;
pub mod system_routes;
pub mod wishlist_routes;

pub use context::RequestContext;
pub use generic::Resource;
pub use http_server::{app_state, configure, json_config, AppState, StorefrontHttpServer};
