//! End-to-end checks of the `/api` routes against a temporary store.

use actix_web::http::{Method, StatusCode};
use actix_web::middleware::{NormalizePath, TrailingSlash};
use actix_web::{test, App};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::sync::Arc;
use storefront_api::api::{app_state, configure, json_config};
use storefront_api::constants::SESSION_HEADER;
use storefront_api::models::{Category, Product, ShippingMethod, StockRecord, User, WishList};
use storefront_api::session::credentials::create_user;
use storefront_api::{ServerConfig, Store, Storefront};

struct Shop {
    storefront: Arc<Storefront>,
    teapot: u64,
    kettle: u64,
}

fn shop(threshold: Option<u32>) -> Shop {
    let mut config = ServerConfig::default().with_secret_key("integration");
    config.max_basket_quantity_threshold = threshold;
    let store = Store::temporary().unwrap();

    let drinks = store.create(Category::new("Drinks", "drinks", None)).unwrap();
    let tea = store
        .create(Category::new("Tea", "tea", Some(drinks.id)))
        .unwrap();
    let teapot = store
        .create(Product::new("Teapot").in_categories(&[tea.id]))
        .unwrap();
    store
        .create(StockRecord::new(teapot.id, "TP-1", Decimal::new(1000, 2), 10))
        .unwrap();
    let kettle = store.create(Product::new("Kettle")).unwrap();
    store
        .create(StockRecord::new(kettle.id, "KT-1", Decimal::new(2500, 2), 2))
        .unwrap();
    store
        .create(ShippingMethod::new(
            "std",
            "Standard",
            Decimal::new(200, 2),
            Decimal::new(50, 2),
        ))
        .unwrap();

    create_user(&store, User::new("alice"), "alice-pw").unwrap();
    create_user(&store, User::new("bob"), "bob-pw").unwrap();
    create_user(&store, User::new("admin").staff(), "admin-pw").unwrap();

    Shop {
        storefront: Arc::new(Storefront::with_store(config, store)),
        teapot: teapot.id,
        kettle: kettle.id,
    }
}

macro_rules! app {
    ($shop:expr) => {
        test::init_service(
            App::new()
                .wrap(NormalizePath::new(TrailingSlash::Trim))
                .app_data(app_state($shop.storefront.clone()))
                .app_data(json_config())
                .configure(configure),
        )
        .await
    };
}

fn request(method: Method, uri: &str, sid: Option<&str>, body: Option<Value>) -> test::TestRequest {
    let mut req = test::TestRequest::default().method(method).uri(uri);
    if let Some(sid) = sid {
        req = req.insert_header((SESSION_HEADER, sid.to_string()));
    }
    if let Some(body) = body {
        req = req.set_json(body);
    }
    req
}

/// Log in on an anonymous session and return the upgraded session id.
macro_rules! login {
    ($app:expr, $sid:expr, $user:expr, $password:expr) => {{
        let req = request(
            Method::POST,
            "/api/login/",
            Some($sid),
            Some(json!({"username": $user, "password": $password})),
        );
        let resp = test::call_service(&$app, req.to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        resp.headers()
            .get(SESSION_HEADER)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string()
    }};
}

#[actix_web::test]
async fn anonymous_session_builds_a_basket() {
    let shop = shop(None);
    let app = app!(shop);
    let sid = "SID:ANON:shop:anon-1";

    let add = json!({"url": format!("http://testserver/api/products/{}/", shop.teapot), "quantity": 2});
    let resp = test::call_service(
        &app,
        request(Method::POST, "/api/basket/add-product/", Some(sid), Some(add)).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let basket: Value = test::read_body_json(resp).await;
    assert_eq!(basket["num_items"], 2);
    assert_eq!(basket["status"], "Open");

    let again: Value = test::call_and_read_body_json(
        &app,
        request(Method::GET, "/api/basket", Some(sid), None).to_request(),
    )
    .await;
    assert_eq!(again["id"], basket["id"]);

    let lines: Value = test::call_and_read_body_json(
        &app,
        request(
            Method::GET,
            &format!("/api/baskets/{}/lines/", basket["id"]),
            Some(sid),
            None,
        )
        .to_request(),
    )
    .await;
    assert_eq!(lines.as_array().map(Vec::len), Some(1));
    assert_eq!(lines[0]["quantity"], 2);
}

#[actix_web::test]
async fn baskets_are_private_to_their_session() {
    let shop = shop(None);
    let app = app!(shop);

    let basket: Value = test::call_and_read_body_json(
        &app,
        request(Method::GET, "/api/basket", Some("SID:ANON:shop:owner"), None).to_request(),
    )
    .await;
    let uri = format!("/api/baskets/{}", basket["id"]);

    let resp = test::call_service(
        &app,
        request(Method::GET, &uri, Some("SID:ANON:shop:intruder"), None).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = test::call_service(&app, request(Method::GET, &uri, None, None).to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = test::call_service(
        &app,
        request(Method::DELETE, &uri, Some("SID:ANON:shop:intruder"), None).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = test::call_service(
        &app,
        request(Method::DELETE, &uri, Some("SID:ANON:shop:owner"), None).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn session_header_is_validated() {
    let shop = shop(None);
    let app = app!(shop);

    let resp = test::call_service(&app, request(Method::GET, "/api/basket", None, None).to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = test::call_service(
        &app,
        request(Method::GET, "/api/basket", Some("not-a-session"), None).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = test::call_service(
        &app,
        request(Method::GET, "/api/basket", Some("SID:AUTH:shop:never"), None).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn admin_collections_need_staff() {
    let shop = shop(None);
    let app = app!(shop);

    let anon = "SID:ANON:shop:a";
    let resp = test::call_service(&app, request(Method::GET, "/api/baskets", Some(anon), None).to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let alice = login!(app, "SID:ANON:shop:alice", "alice", "alice-pw");
    let resp = test::call_service(&app, request(Method::GET, "/api/baskets", Some(&alice), None).to_request()).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let admin = login!(app, "SID:ANON:shop:admin", "admin", "admin-pw");
    let users: Value = test::call_and_read_body_json(
        &app,
        request(Method::GET, "/api/users", Some(&admin), None).to_request(),
    )
    .await;
    let users = users.as_array().unwrap();
    assert_eq!(users.len(), 3);
    assert!(users.iter().all(|u| u.get("password").is_none()));
}

#[actix_web::test]
async fn login_carries_the_anonymous_basket_over() {
    let shop = shop(None);
    let app = app!(shop);
    let anon = "SID:ANON:shop:carry";

    let add = json!({"product": shop.teapot, "quantity": 1});
    let resp = test::call_service(
        &app,
        request(Method::POST, "/api/basket/add-product", Some(anon), Some(add)).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let auth = login!(app, anon, "alice", "alice-pw");
    assert_eq!(auth, "SID:AUTH:shop:carry");

    let me: Value = test::call_and_read_body_json(
        &app,
        request(Method::GET, "/api/login", Some(&auth), None).to_request(),
    )
    .await;
    assert_eq!(me["username"], "alice");

    let basket: Value = test::call_and_read_body_json(
        &app,
        request(Method::GET, "/api/basket", Some(&auth), None).to_request(),
    )
    .await;
    assert_eq!(basket["num_items"], 1);

    let resp = test::call_service(
        &app,
        request(Method::POST, "/api/login", Some(&auth), Some(json!({"username": "bob", "password": "bob-pw"})))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);

    let resp = test::call_service(&app, request(Method::DELETE, "/api/login", Some(&auth), None).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = test::call_service(&app, request(Method::GET, "/api/basket", Some(&auth), None).to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn login_rejects_bad_credentials_and_anonymous_logout() {
    let shop = shop(None);
    let app = app!(shop);
    let anon = "SID:ANON:shop:bad";

    let resp = test::call_service(
        &app,
        request(Method::POST, "/api/login", Some(anon), Some(json!({"username": "alice", "password": "nope"})))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = test::call_service(&app, request(Method::GET, "/api/login", Some(anon), None).to_request()).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = test::call_service(&app, request(Method::DELETE, "/api/login", Some(anon), None).to_request()).await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[actix_web::test]
async fn basket_limits_are_reported_as_not_acceptable() {
    let shop = shop(Some(3));
    let app = app!(shop);
    let sid = "SID:ANON:shop:limits";

    let resp = test::call_service(
        &app,
        request(Method::POST, "/api/basket/add-product", Some(sid), Some(json!({"product": shop.teapot, "quantity": 4})))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_ACCEPTABLE);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body["reason"],
        "Due to technical limitations we are not able to ship more than 3 items in one order."
    );

    let resp = test::call_service(
        &app,
        request(Method::POST, "/api/basket/add-product", Some(sid), Some(json!({"product": shop.kettle, "quantity": 3})))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_ACCEPTABLE);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["reason"], "a maximum of 2 can be bought");

    let resp = test::call_service(
        &app,
        request(Method::POST, "/api/basket/add-product", Some(sid), Some(json!({"url": "/api/products/9999/"})))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_ACCEPTABLE);
}

#[actix_web::test]
async fn line_updates_keep_ownership_fields() {
    let shop = shop(None);
    let app = app!(shop);
    let sid = "SID:ANON:shop:lines";

    let basket: Value = test::call_and_read_body_json(
        &app,
        request(Method::POST, "/api/basket/add-product", Some(sid), Some(json!({"product": shop.teapot})))
            .to_request(),
    )
    .await;
    let lines: Value = test::call_and_read_body_json(
        &app,
        request(Method::GET, &format!("/api/baskets/{}/lines", basket["id"]), Some(sid), None).to_request(),
    )
    .await;
    let line_uri = format!("/api/lines/{}/", lines[0]["id"]);

    let updated: Value = test::call_and_read_body_json(
        &app,
        request(Method::PUT, &line_uri, Some(sid), Some(json!({"quantity": 5, "basket": 424242}))).to_request(),
    )
    .await;
    assert_eq!(updated["quantity"], 5);
    assert_eq!(updated["basket"], basket["id"]);

    let resp = test::call_service(
        &app,
        request(Method::PATCH, &line_uri, Some("SID:ANON:shop:other"), Some(json!({"quantity": 1}))).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = test::call_service(
        &app,
        request(Method::PATCH, &line_uri, Some(sid), Some(json!({"quantity": 11}))).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_ACCEPTABLE);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["reason"], "a maximum of 10 can be bought");
}

#[actix_web::test]
async fn line_quantity_edits_respect_the_basket_limit() {
    let shop = shop(Some(6));
    let app = app!(shop);
    let sid = "SID:ANON:shop:line-limit";

    let basket: Value = test::call_and_read_body_json(
        &app,
        request(Method::POST, "/api/basket/add-product", Some(sid), Some(json!({"product": shop.teapot, "quantity": 2})))
            .to_request(),
    )
    .await;
    test::call_service(
        &app,
        request(Method::POST, "/api/basket/add-product", Some(sid), Some(json!({"product": shop.kettle, "quantity": 2})))
            .to_request(),
    )
    .await;
    let lines: Value = test::call_and_read_body_json(
        &app,
        request(Method::GET, &format!("/api/baskets/{}/lines", basket["id"]), Some(sid), None).to_request(),
    )
    .await;
    let teapot_line = lines
        .as_array()
        .unwrap()
        .iter()
        .find(|l| l["product"] == shop.teapot)
        .unwrap()["id"]
        .clone();
    let line_uri = format!("/api/lines/{}", teapot_line);

    let resp = test::call_service(
        &app,
        request(Method::PATCH, &line_uri, Some(sid), Some(json!({"quantity": 4}))).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    for quantity in [5u64, u64::from(u32::MAX)] {
        let resp = test::call_service(
            &app,
            request(Method::PATCH, &line_uri, Some(sid), Some(json!({"quantity": quantity}))).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_ACCEPTABLE);
    }
}

#[actix_web::test]
async fn oversized_add_product_quantity_is_refused() {
    let shop = shop(Some(10));
    let untracked = shop
        .storefront
        .store
        .create(Product {
            track_stock: false,
            ..Product::new("Gift card")
        })
        .unwrap();
    shop.storefront
        .store
        .create(StockRecord::new(untracked.id, "GC-1", Decimal::new(500, 2), 0))
        .unwrap();
    let app = app!(shop);
    let sid = "SID:ANON:shop:overflow";

    let basket: Value = test::call_and_read_body_json(
        &app,
        request(Method::POST, "/api/basket/add-product", Some(sid), Some(json!({"product": untracked.id})))
            .to_request(),
    )
    .await;
    assert_eq!(basket["num_items"], 1);

    let resp = test::call_service(
        &app,
        request(
            Method::POST,
            "/api/basket/add-product",
            Some(sid),
            Some(json!({"product": untracked.id, "quantity": u32::MAX})),
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_ACCEPTABLE);

    let again: Value = test::call_and_read_body_json(
        &app,
        request(Method::GET, "/api/basket", Some(sid), None).to_request(),
    )
    .await;
    assert_eq!(again["num_items"], 1);
}

#[actix_web::test]
async fn mismatched_wishlists_of_the_same_owner_are_not_acceptable() {
    let shop = shop(None);
    let app = app!(shop);
    let alice = login!(app, "SID:ANON:shop:two-lists", "alice", "alice-pw");

    let me: Value = test::call_and_read_body_json(
        &app,
        request(Method::GET, "/api/login", Some(&alice), None).to_request(),
    )
    .await;
    let first: Value = test::call_and_read_body_json(
        &app,
        request(Method::GET, "/api/wishlist", Some(&alice), None).to_request(),
    )
    .await;
    let owner = me["id"].as_u64().unwrap();
    let second = shop.storefront.store.create(WishList::new(owner)).unwrap();

    let resp = test::call_service(
        &app,
        request(
            Method::POST,
            &format!("/api/wishlists/{}/lines", first["id"]),
            Some(&alice),
            Some(json!({"wishlist": format!("/api/wishlists/{}/", second.id), "product": shop.kettle})),
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_ACCEPTABLE);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body["reason"],
        format!("Target wishlist inconsistent {} != {}", first["id"], second.id)
    );

    let resp = test::call_service(
        &app,
        request(
            Method::POST,
            &format!("/api/wishlists/{}/lines", first["id"]),
            Some(&alice),
            Some(json!({"wishlist": first["id"], "product": shop.kettle})),
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let line: Value = test::read_body_json(resp).await;
    assert_eq!(line["title"], "Kettle");
}

#[actix_web::test]
async fn wishlists_round_trip_into_the_basket() {
    let shop = shop(None);
    let app = app!(shop);
    let alice = login!(app, "SID:ANON:shop:wl-alice", "alice", "alice-pw");
    let bob = login!(app, "SID:ANON:shop:wl-bob", "bob", "bob-pw");

    let resp = test::call_service(
        &app,
        request(Method::GET, "/api/wishlist", Some("SID:ANON:shop:wl-anon"), None).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let wishlist: Value = test::call_and_read_body_json(
        &app,
        request(
            Method::POST,
            "/api/wishlist/add-product",
            Some(&alice),
            Some(json!({"url": format!("/api/products/{}/", shop.teapot)})),
        )
        .to_request(),
    )
    .await;
    let wishlist_uri = format!("/api/wishlists/{}", wishlist["id"]);

    let lines: Value = test::call_and_read_body_json(
        &app,
        request(Method::GET, &format!("{}/lines", wishlist_uri), Some(&alice), None).to_request(),
    )
    .await;
    assert_eq!(lines[0]["title"], "Teapot");
    let line_id = lines[0]["id"].clone();

    let resp = test::call_service(&app, request(Method::GET, &wishlist_uri, Some(&bob), None).to_request()).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let bobs: Value = test::call_and_read_body_json(
        &app,
        request(Method::GET, "/api/wishlist", Some(&bob), None).to_request(),
    )
    .await;
    let resp = test::call_service(
        &app,
        request(
            Method::POST,
            &format!("{}/lines", wishlist_uri),
            Some(&alice),
            Some(json!({"wishlist": bobs["id"], "product": shop.kettle})),
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(resp).await;
    assert!(body.get("reason").is_none());

    let from_line = json!({"url": format!("/api/wishlistlines/{}/", line_id)});
    let resp = test::call_service(
        &app,
        request(Method::POST, "/api/basket/add-from-wishlist", Some(&bob), Some(from_line.clone())).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let basket: Value = test::call_and_read_body_json(
        &app,
        request(Method::POST, "/api/basket/add-from-wishlist", Some(&alice), Some(from_line)).to_request(),
    )
    .await;
    assert_eq!(basket["num_items"], 1);

    let resp = test::call_service(
        &app,
        request(Method::GET, &format!("/api/wishlistlines/{}", line_id), Some(&alice), None).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn shipping_and_totals() {
    let shop = shop(None);
    let app = app!(shop);
    let sid = "SID:ANON:shop:checkout";

    let empty: Value = test::call_and_read_body_json(
        &app,
        request(Method::GET, "/api/basket", Some(sid), None).to_request(),
    )
    .await;
    let resp = test::call_service(
        &app,
        request(Method::POST, "/api/shipping", Some(sid), Some(json!({"basket": empty["id"]}))).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_ACCEPTABLE);

    let basket: Value = test::call_and_read_body_json(
        &app,
        request(Method::POST, "/api/basket/add-product", Some(sid), Some(json!({"product": shop.teapot})))
            .to_request(),
    )
    .await;
    let basket_url = format!("/api/baskets/{}/", basket["id"]);

    let resp = test::call_service(
        &app,
        request(Method::POST, "/api/shipping", Some(sid), Some(json!({"basket": basket_url}))).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let shipping: Value = test::call_and_read_body_json(
        &app,
        request(
            Method::POST,
            "/api/shipping",
            Some(sid),
            Some(json!({"basket": basket_url, "shipping_address": {"country": "/api/countries/GB/"}})),
        )
        .to_request(),
    )
    .await;
    assert_eq!(shipping["shipping_method_code"], "std");
    assert_eq!(shipping["shipping_charge"]["excl_tax"], "2.50");

    let total: Value = test::call_and_read_body_json(
        &app,
        request(
            Method::POST,
            "/api/total",
            Some(sid),
            Some(json!({"basket": basket_url, "shipping_charge": shipping["shipping_charge"]})),
        )
        .to_request(),
    )
    .await;
    assert_eq!(total["total"]["excl_tax"], "12.50");

    let resp = test::call_service(
        &app,
        request(
            Method::POST,
            "/api/total",
            Some(sid),
            Some(json!({"basket": basket_url, "shipping_charge": {"currency": "EUR", "excl_tax": "1.00"}})),
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = test::call_service(
        &app,
        request(Method::POST, "/api/total", Some("SID:ANON:shop:stranger"), Some(json!({
            "basket": basket_url,
            "shipping_charge": shipping["shipping_charge"],
        })))
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn catalogue_is_public() {
    let shop = shop(None);
    let app = app!(shop);

    let drinks: Value = test::call_and_read_body_json(
        &app,
        request(Method::GET, "/api/products?category=drinks", None, None).to_request(),
    )
    .await;
    assert_eq!(drinks.as_array().map(Vec::len), Some(1));
    assert_eq!(drinks[0]["title"], "Teapot");

    let none: Value = test::call_and_read_body_json(
        &app,
        request(Method::GET, "/api/products?category=nothing", None, None).to_request(),
    )
    .await;
    assert_eq!(none, json!([]));

    let availability: Value = test::call_and_read_body_json(
        &app,
        request(Method::GET, &format!("/api/products/{}/availability/", shop.kettle), None, None).to_request(),
    )
    .await;
    assert_eq!(availability["is_available_to_buy"], true);
    assert_eq!(availability["num_available"], 2);

    let price: Value = test::call_and_read_body_json(
        &app,
        request(Method::GET, &format!("/api/products/{}/price", shop.teapot), None, None).to_request(),
    )
    .await;
    assert_eq!(price["exists"], true);
    assert_eq!(price["excl_tax"], "10.00");

    let categories: Value = test::call_and_read_body_json(
        &app,
        request(Method::GET, "/api/categories", None, None).to_request(),
    )
    .await;
    let names: Vec<&str> = categories
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|c| c["full_name"].as_str())
        .collect();
    assert!(names.contains(&"Drinks > Tea"));
}
