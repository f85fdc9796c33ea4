use super::generic::{create, destroy, list, retrieve, update};
use super::{
    basket_routes, catalogue_routes, checkout_routes, log_routes, login_routes, system_routes,
    wishlist_routes,
};
use crate::constants::SESSION_HEADER;
use crate::error::{StorefrontError, StorefrontResult};
use crate::models::{
    Basket, BasketLine, Category, Country, LineAttribute, Product, ProductOption, ShippingMethod,
    StockRecord, User, WishList, WishListLine,
};
use crate::storefront::Storefront;

use actix_cors::Cors;
use actix_web::middleware::{NormalizePath, TrailingSlash};
use actix_web::{web, App, HttpServer as ActixHttpServer};
use log::info;
use std::sync::Arc;
use std::time::Instant;

/// HTTP server exposing the storefront REST API under `/api`.
pub struct StorefrontHttpServer {
    storefront: Arc<Storefront>,
    bind_address: String,
}

/// Shared application state for the HTTP server.
pub struct AppState {
    pub storefront: Arc<Storefront>,
    pub started_at: Instant,
}

impl StorefrontHttpServer {
    /// Serve `storefront` on the bind address from its configuration.
    pub fn new(storefront: Storefront) -> Self {
        let bind_address = storefront.config.bind_address.clone();
        Self {
            storefront: Arc::new(storefront),
            bind_address,
        }
    }

    /// Run until the server is stopped.
    ///
    /// # Errors
    ///
    /// Returns a `StorefrontError::Config` if the address cannot be bound or
    /// the server fails while running.
    pub async fn run(&self) -> StorefrontResult<()> {
        info!("HTTP server running on {}", self.bind_address);
        let state = app_state(self.storefront.clone());

        let server = ActixHttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .expose_headers([SESSION_HEADER])
                .max_age(3600);

            App::new()
                .wrap(cors)
                .wrap(NormalizePath::new(TrailingSlash::Trim))
                .app_data(state.clone())
                .app_data(json_config())
                .configure(configure)
        })
        .bind(&self.bind_address)
        .map_err(|e| StorefrontError::Config(format!("Failed to bind HTTP server: {}", e)))?
        .run();

        server
            .await
            .map_err(|e| StorefrontError::Config(format!("HTTP server error: {}", e)))?;

        Ok(())
    }
}

pub fn app_state(storefront: Arc<Storefront>) -> web::Data<AppState> {
    web::Data::new(AppState {
        storefront,
        started_at: Instant::now(),
    })
}

/// Malformed JSON bodies are reported as 400 `{"detail": ...}`.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| StorefrontError::Validation(err.to_string()).into())
}

/// Register every `/api` route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Reference data
            .route("/countries", web::get().to(list::<Country>))
            .route("/countries/{pk}", web::get().to(retrieve::<Country>))
            .route("/shippingmethods", web::get().to(list::<ShippingMethod>))
            .route("/shippingmethods/{pk}", web::get().to(retrieve::<ShippingMethod>))
            // Catalogue
            .route("/products", web::get().to(list::<Product>))
            .route("/products/{pk}", web::get().to(retrieve::<Product>))
            .route(
                "/products/{pk}/price",
                web::get().to(catalogue_routes::product_price),
            )
            .route(
                "/products/{pk}/availability",
                web::get().to(catalogue_routes::product_availability),
            )
            .route(
                "/products/{pk}/stockrecords",
                web::get().to(catalogue_routes::product_stockrecords),
            )
            .route("/stockrecords", web::get().to(list::<StockRecord>))
            .route("/stockrecords/{pk}", web::get().to(retrieve::<StockRecord>))
            .route("/options", web::get().to(list::<ProductOption>))
            .route("/options/{pk}", web::get().to(retrieve::<ProductOption>))
            .route("/categories", web::get().to(list::<Category>))
            .route("/categories/{pk}", web::get().to(retrieve::<Category>))
            .route("/users", web::get().to(list::<User>))
            .route("/users/{pk}", web::get().to(retrieve::<User>))
            // Baskets
            .service(
                web::resource("/baskets")
                    .route(web::get().to(list::<Basket>))
                    .route(web::post().to(create::<Basket>)),
            )
            .service(
                web::resource("/baskets/{pk}")
                    .route(web::get().to(retrieve::<Basket>))
                    .route(web::put().to(update::<Basket>))
                    .route(web::patch().to(update::<Basket>))
                    .route(web::delete().to(destroy::<Basket>)),
            )
            .route("/baskets/{pk}/lines", web::get().to(basket_routes::basket_lines))
            .service(
                web::resource("/lines/{pk}")
                    .route(web::get().to(retrieve::<BasketLine>))
                    .route(web::put().to(update::<BasketLine>))
                    .route(web::patch().to(update::<BasketLine>))
                    .route(web::delete().to(destroy::<BasketLine>)),
            )
            .route("/basket", web::get().to(basket_routes::get_basket))
            .route(
                "/basket/add-product",
                web::post().to(basket_routes::add_product),
            )
            .route(
                "/basket/add-from-wishlist",
                web::post().to(wishlist_routes::add_from_wishlist),
            )
            .service(
                web::resource("/lineattributes")
                    .route(web::get().to(list::<LineAttribute>))
                    .route(web::post().to(create::<LineAttribute>)),
            )
            .route(
                "/lineattributes/{pk}",
                web::get().to(retrieve::<LineAttribute>),
            )
            // Wishlists
            .route("/wishlists", web::get().to(list::<WishList>))
            .service(
                web::resource("/wishlists/{pk}")
                    .route(web::get().to(retrieve::<WishList>))
                    .route(web::put().to(update::<WishList>))
                    .route(web::patch().to(update::<WishList>))
                    .route(web::delete().to(destroy::<WishList>)),
            )
            .service(
                web::resource("/wishlists/{pk}/lines")
                    .route(web::get().to(wishlist_routes::wishlist_lines))
                    .route(web::post().to(wishlist_routes::create_wishlist_line)),
            )
            .route("/wishlist", web::get().to(wishlist_routes::my_wishlist))
            .route(
                "/wishlist/add-product",
                web::post().to(wishlist_routes::add_product),
            )
            .service(
                web::resource("/wishlistlines")
                    .route(web::get().to(list::<WishListLine>))
                    .route(web::post().to(create::<WishListLine>)),
            )
            .service(
                web::resource("/wishlistlines/{pk}")
                    .route(web::get().to(retrieve::<WishListLine>))
                    .route(web::put().to(update::<WishListLine>))
                    .route(web::patch().to(update::<WishListLine>))
                    .route(web::delete().to(destroy::<WishListLine>)),
            )
            // Checkout preparation
            .route("/shipping", web::post().to(checkout_routes::shipping))
            .route("/total", web::post().to(checkout_routes::total))
            // Session
            .service(
                web::resource("/login")
                    .route(web::get().to(login_routes::current_user))
                    .route(web::post().to(login_routes::login))
                    .route(web::delete().to(login_routes::logout)),
            )
            // Operations
            .route("/logs", web::get().to(log_routes::list_logs))
            .route("/logs/stream", web::get().to(log_routes::stream_logs))
            .route(
                "/system/status",
                web::get().to(system_routes::get_system_status),
            ),
    );
}
