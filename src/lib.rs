//! Storefront REST API.
//!
//! A catalogue, basket and wishlist service whose endpoints are guarded by a
//! small authorization policy:
//!
//! * [`permissions`] decides who may touch baskets, lines and wishlists,
//! * [`session`] resolves the `Session-Id` header into a requester,
//! * [`basket_ops`], [`strategy`] and [`shipping`] implement the shop logic,
//! * [`api`] exposes it all over HTTP with actix-web.

pub mod api;
pub mod basket_ops;
pub mod config;
pub mod constants;
pub mod error;
pub mod loader;
pub mod logging;
pub mod models;
pub mod permissions;
pub mod session;
pub mod shipping;
pub mod store;
pub mod storefront;
pub mod strategy;

pub use api::StorefrontHttpServer;
pub use config::{load_server_config, ServerConfig};
pub use error::{StorefrontError, StorefrontResult};
pub use permissions::{Access, Requester, SessionContext};
pub use store::Store;
pub use storefront::Storefront;
