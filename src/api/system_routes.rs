use super::http_server::AppState;
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

/// Get system status information
pub async fn get_system_status(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "running",
        "uptime": state.started_at.elapsed().as_secs(),
        "version": env!("CARGO_PKG_VERSION"),
        "currency": state.storefront.config.default_currency,
    }))
}
