// subvault_server/tests/api_tests.rs

//! End-to-end HTTP tests over the in-memory store and a temporary evidence directory.

use std::collections::HashMap;
use std::sync::Arc;

use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use chrono::Utc;
use once_cell::sync::Lazy;
use serde_json::{json, Value};
use subvault::{Category, MemoryStore, OrderStore, Product, ProductStore, RandomOrderIdGenerator, SystemClock};
use tempfile::TempDir;
use uuid::Uuid;

use subvault_server::config::AppConfig;
use subvault_server::services::auth_service::hash_password;
use subvault_server::services::evidence_disk::DiskEvidenceStore;
use subvault_server::state::{AppState, Backends};
use subvault_server::web::configure_app_routes;

const STAFF_EMAIL: &str = "ops@subvault.test";
const STAFF_PASSWORD: &str = "correct horse battery";
const MAX_UPLOAD: usize = 2048;

static STAFF_HASH: Lazy<String> = Lazy::new(|| hash_password(STAFF_PASSWORD).unwrap());

struct TestContext {
  state: AppState,
  store: Arc<MemoryStore>,
  _evidence_dir: TempDir,
}

async fn context_with(extra: &[(&str, &str)]) -> TestContext {
  let dir = TempDir::new().unwrap();
  let mut vars: HashMap<String, String> = HashMap::from([
    ("DATABASE_URL".to_string(), "postgres://unused/subvault".to_string()),
    ("APP_BASE_URL".to_string(), "http://shop.test".to_string()),
    ("EVIDENCE_DIR".to_string(), dir.path().display().to_string()),
    ("EVIDENCE_MAX_BYTES".to_string(), MAX_UPLOAD.to_string()),
    ("STAFF_EMAIL".to_string(), STAFF_EMAIL.to_string()),
    ("STAFF_PASSWORD_HASH".to_string(), STAFF_HASH.clone()),
  ]);
  for (k, v) in extra {
    vars.insert(k.to_string(), v.to_string());
  }
  let config = Arc::new(AppConfig::from_source(|name| vars.get(name).cloned()).unwrap());

  let store = Arc::new(MemoryStore::new());
  let evidence_files = Arc::new(
    DiskEvidenceStore::new(&config.evidence_dir, &config.app_base_url)
      .await
      .unwrap(),
  );
  let state = AppState::new(
    config,
    Backends {
      orders: store.clone(),
      products: store.clone(),
      evidence_files,
      ids: Arc::new(RandomOrderIdGenerator),
      clock: Arc::new(SystemClock),
    },
  );
  TestContext {
    state,
    store,
    _evidence_dir: dir,
  }
}

async fn context() -> TestContext {
  context_with(&[]).await
}

async fn seed_product(ctx: &TestContext, name: &str, price_cents: i64, available: bool) -> Product {
  let now = Utc::now();
  ctx
    .store
    .insert_product(Product {
      id: Uuid::new_v4(),
      name: name.to_string(),
      description: format!("{} premium plan", name),
      price_cents,
      plan_type: "1 Month".to_string(),
      category: Category::Streaming,
      thumbnail_url: "https://cdn.test/thumb.png".to_string(),
      benefits: vec!["4K".to_string(), "4 screens".to_string()],
      stock_available: available,
      created_at: now,
      updated_at: now,
    })
    .await
    .unwrap()
}

fn checkout_body(product_id: Uuid) -> Value {
  json!({
    "fullName": "Asha Rao",
    "email": "asha@example.com",
    "phone": "+91 98765 43210",
    "productId": product_id.to_string(),
    "paymentMethod": "upi",
    "transactionId": "UPI-20250314-0001"
  })
}

macro_rules! test_app {
  ($ctx:expr) => {
    test::init_service(
      App::new()
        .app_data(web::Data::new($ctx.state.clone()))
        .app_data(web::PayloadConfig::new(MAX_UPLOAD))
        .configure(configure_app_routes),
    )
    .await
  };
}

macro_rules! sign_in {
  ($app:expr) => {{
    let req = test::TestRequest::post()
      .uri("/api/v1/auth/signin")
      .set_json(json!({ "email": STAFF_EMAIL, "password": STAFF_PASSWORD }))
      .to_request();
    let body: Value = test::call_and_read_body_json(&$app, req).await;
    body["token"].as_str().unwrap().to_string()
  }};
}

macro_rules! place_order {
  ($app:expr, $product_id:expr) => {{
    let req = test::TestRequest::post()
      .uri("/api/v1/orders")
      .set_json(checkout_body($product_id))
      .to_request();
    let resp = test::call_service(&$app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    body["orderId"].as_str().unwrap().to_string()
  }};
}

fn bearer(token: &str) -> (header::HeaderName, String) {
  (header::AUTHORIZATION, format!("Bearer {}", token))
}

#[actix_web::test]
async fn health_check_reports_ok() {
  let ctx = context().await;
  let app = test_app!(ctx);
  let req = test::TestRequest::get().uri("/api/v1/health").to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(body, json!({ "status": "ok" }));
}

#[actix_web::test]
async fn catalog_lists_only_available_products() {
  let ctx = context().await;
  let listed = seed_product(&ctx, "Netflix", 19900, true).await;
  let hidden = seed_product(&ctx, "Old Plan", 9900, false).await;
  let app = test_app!(ctx);

  let req = test::TestRequest::get().uri("/api/v1/products").to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  let names: Vec<&str> = body["products"]
    .as_array()
    .unwrap()
    .iter()
    .map(|p| p["name"].as_str().unwrap())
    .collect();
  assert_eq!(names, vec![listed.name.as_str()]);

  // Detail stays reachable for unavailable products.
  let req = test::TestRequest::get()
    .uri(&format!("/api/v1/products/{}", hidden.id))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn checkout_then_track_shows_pending_order() {
  let ctx = context().await;
  let product = seed_product(&ctx, "Netflix", 19900, true).await;
  let app = test_app!(ctx);

  let order_id = place_order!(app, product.id);
  assert!(order_id.starts_with("OTT"));

  // Lookup is case-insensitive.
  let req = test::TestRequest::get()
    .uri(&format!("/api/v1/orders/{}", order_id.to_lowercase()))
    .to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  let order = &body["order"];
  assert_eq!(order["orderId"], json!(order_id));
  assert_eq!(order["status"], json!("pending"));
  assert_eq!(order["amountCents"], json!(19900));
  assert_eq!(order["productName"], json!("Netflix"));
  assert!(order.get("version").is_none());
  assert!(order.get("id").is_none());
}

#[actix_web::test]
async fn checkout_with_missing_fields_is_rejected() {
  let ctx = context().await;
  let product = seed_product(&ctx, "Netflix", 19900, true).await;
  let app = test_app!(ctx);

  let mut body = checkout_body(product.id);
  body["transactionId"] = json!("  ");
  let req = test::TestRequest::post().uri("/api/v1/orders").set_json(body).to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  assert!(ctx.store.list_orders().await.unwrap().is_empty());
}

#[actix_web::test]
async fn unknown_order_gets_generic_not_found_body() {
  let ctx = context().await;
  let app = test_app!(ctx);

  for raw in ["OTTNOPE0000000", "definitely-not-an-id"] {
    let req = test::TestRequest::get().uri(&format!("/api/v1/orders/{}", raw)).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "Order not found." }));
  }
}

#[actix_web::test]
async fn admin_routes_require_a_session() {
  let ctx = context().await;
  let app = test_app!(ctx);

  for uri in [
    "/api/v1/admin/orders",
    "/api/v1/admin/orders/export",
    "/api/v1/admin/dashboard",
    "/api/v1/admin/products",
  ] {
    let req = test::TestRequest::get().uri(uri).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{}", uri);
  }

  let req = test::TestRequest::get()
    .uri("/api/v1/admin/orders")
    .insert_header(bearer("not-a-real-token"))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn wrong_password_is_refused_without_detail() {
  let ctx = context().await;
  let app = test_app!(ctx);

  for (email, password) in [(STAFF_EMAIL, "guess"), ("someone@else.test", STAFF_PASSWORD)] {
    let req = test::TestRequest::post()
      .uri("/api/v1/auth/signin")
      .set_json(json!({ "email": email, "password": password }))
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "Invalid email or password." }));
  }
}

#[actix_web::test]
async fn staff_transition_is_visible_to_the_customer() {
  let ctx = context().await;
  let product = seed_product(&ctx, "Spotify", 11900, true).await;
  let app = test_app!(ctx);

  let order_id = place_order!(app, product.id);
  let token = sign_in!(app);

  let req = test::TestRequest::post()
    .uri(&format!("/api/v1/admin/orders/{}/transition", order_id))
    .insert_header(bearer(&token))
    .set_json(json!({
      "status": "completed",
      "operatorNote": "Enjoy!",
      "deliveryDetails": "user: asha / pass: s3cret"
    }))
    .to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(body["order"]["status"], json!("completed"));
  assert_eq!(body["order"]["version"], json!(2));

  let req = test::TestRequest::get()
    .uri(&format!("/api/v1/orders/{}", order_id))
    .to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(body["order"]["status"], json!("completed"));
  assert_eq!(body["order"]["deliveryDetails"], json!("user: asha / pass: s3cret"));
  assert_eq!(body["order"]["operatorNote"], json!("Enjoy!"));

  let req = test::TestRequest::get()
    .uri(&format!("/api/v1/admin/orders/{}/history", order_id))
    .insert_header(bearer(&token))
    .to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  let history = body["history"].as_array().unwrap();
  assert_eq!(history.len(), 1);
  assert_eq!(history[0]["actor"], json!(STAFF_EMAIL));
}

#[actix_web::test]
async fn stale_version_is_a_conflict() {
  let ctx = context().await;
  let product = seed_product(&ctx, "Spotify", 11900, true).await;
  let app = test_app!(ctx);
  let order_id = place_order!(app, product.id);
  let token = sign_in!(app);

  let req = test::TestRequest::post()
    .uri(&format!("/api/v1/admin/orders/{}/transition", order_id))
    .insert_header(bearer(&token))
    .set_json(json!({ "status": "processing", "expectedVersion": 7 }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn strict_policy_refuses_reopening_terminal_orders() {
  let ctx = context_with(&[("TRANSITION_POLICY", "strict")]).await;
  let product = seed_product(&ctx, "Spotify", 11900, true).await;
  let app = test_app!(ctx);
  let order_id = place_order!(app, product.id);
  let token = sign_in!(app);

  for (status, expected) in [("rejected", StatusCode::OK), ("pending", StatusCode::CONFLICT)] {
    let req = test::TestRequest::post()
      .uri(&format!("/api/v1/admin/orders/{}/transition", order_id))
      .insert_header(bearer(&token))
      .set_json(json!({ "status": status }))
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), expected, "to {}", status);
  }
}

#[actix_web::test]
async fn signout_revokes_the_token() {
  let ctx = context().await;
  let app = test_app!(ctx);
  let token = sign_in!(app);

  let req = test::TestRequest::post()
    .uri("/api/v1/auth/signout")
    .insert_header(bearer(&token))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

  let req = test::TestRequest::get()
    .uri("/api/v1/admin/dashboard")
    .insert_header(bearer(&token))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn evidence_upload_is_stored_and_served_to_staff() {
  let ctx = context().await;
  let product = seed_product(&ctx, "Netflix", 19900, true).await;
  let app = test_app!(ctx);
  let order_id = place_order!(app, product.id);

  let image = vec![0x89, b'P', b'N', b'G', 1, 2, 3, 4];
  let req = test::TestRequest::post()
    .uri(&format!("/api/v1/orders/{}/evidence", order_id))
    .insert_header((header::CONTENT_TYPE, "image/png"))
    .set_payload(image.clone())
    .to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  let url = body["paymentEvidenceUrl"].as_str().unwrap().to_string();
  let prefix = format!("http://shop.test/api/v1/evidence/{}-", order_id);
  assert!(url.starts_with(&prefix), "{}", url);
  let path = url.trim_start_matches("http://shop.test");

  let req = test::TestRequest::get().uri(path).to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

  let token = sign_in!(app);
  let req = test::TestRequest::get().uri(path).insert_header(bearer(&token)).to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap().to_str().unwrap(), "image/png");
  let bytes = test::read_body(resp).await;
  assert_eq!(bytes.as_ref(), image.as_slice());

  // Tracker now carries the reference; status is untouched.
  let req = test::TestRequest::get()
    .uri(&format!("/api/v1/orders/{}", order_id))
    .to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(body["order"]["paymentEvidenceUrl"], json!(url));
  assert_eq!(body["order"]["status"], json!("pending"));
}

#[actix_web::test]
async fn evidence_rejects_non_images_and_oversized_bodies() {
  let ctx = context().await;
  let product = seed_product(&ctx, "Netflix", 19900, true).await;
  let app = test_app!(ctx);
  let order_id = place_order!(app, product.id);

  let req = test::TestRequest::post()
    .uri(&format!("/api/v1/orders/{}/evidence", order_id))
    .insert_header((header::CONTENT_TYPE, "application/pdf"))
    .set_payload(vec![1u8; 16])
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

  let req = test::TestRequest::post()
    .uri(&format!("/api/v1/orders/{}/evidence", order_id))
    .insert_header((header::CONTENT_TYPE, "image/jpeg"))
    .set_payload(vec![1u8; MAX_UPLOAD + 1])
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::PAYLOAD_TOO_LARGE);

  let req = test::TestRequest::post()
    .uri("/api/v1/orders/OTTMISSING0000/evidence")
    .insert_header((header::CONTENT_TYPE, "image/jpeg"))
    .set_payload(vec![1u8; 16])
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn csv_export_is_an_attachment_named_for_today() {
  let ctx = context().await;
  let product = seed_product(&ctx, "Netflix", 19900, true).await;
  let app = test_app!(ctx);
  let order_id = place_order!(app, product.id);
  let token = sign_in!(app);

  let req = test::TestRequest::get()
    .uri("/api/v1/admin/orders/export?status=pending")
    .insert_header(bearer(&token))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let disposition = resp
    .headers()
    .get(header::CONTENT_DISPOSITION)
    .unwrap()
    .to_str()
    .unwrap()
    .to_string();
  assert_eq!(
    disposition,
    format!("attachment; filename=\"orders-{}.csv\"", Utc::now().date_naive().format("%Y-%m-%d"))
  );
  let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
  let lines: Vec<&str> = body.split("\r\n").filter(|l| !l.is_empty()).collect();
  assert_eq!(lines.len(), 2);
  assert!(lines[0].starts_with("Order ID,"));
  assert!(lines[1].starts_with(&order_id));
}

#[actix_web::test]
async fn dashboard_counts_orders() {
  let ctx = context().await;
  let product = seed_product(&ctx, "Netflix", 19900, true).await;
  let app = test_app!(ctx);
  let first = place_order!(app, product.id);
  place_order!(app, product.id);
  let token = sign_in!(app);

  let req = test::TestRequest::post()
    .uri(&format!("/api/v1/admin/orders/{}/transition", first))
    .insert_header(bearer(&token))
    .set_json(json!({ "status": "completed" }))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

  let req = test::TestRequest::get()
    .uri("/api/v1/admin/dashboard")
    .insert_header(bearer(&token))
    .to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  let report = &body["report"];
  assert_eq!(report["totalOrders"], json!(2));
  assert_eq!(report["pendingOrders"], json!(1));
  assert_eq!(report["completedOrders"], json!(1));
  assert_eq!(report["totalRevenueCents"], json!(19900));
  assert_eq!(report["todayOrders"], json!(2));
  assert_eq!(report["recentOrders"].as_array().unwrap().len(), 2);
}

#[actix_web::test]
async fn staff_manage_products() {
  let ctx = context().await;
  let app = test_app!(ctx);
  let token = sign_in!(app);

  let draft = json!({
    "name": "ChatGPT Plus",
    "description": "Shared seat",
    "price": "1499.00",
    "thumbnailUrl": "https://cdn.test/chatgpt.png",
    "planType": "1 Month",
    "category": "ai",
    "benefits": "GPT-4 access\nPriority",
    "stockAvailable": true
  });
  let req = test::TestRequest::post()
    .uri("/api/v1/admin/products")
    .insert_header(bearer(&token))
    .set_json(draft.clone())
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let body: Value = test::read_body_json(resp).await;
  let id = body["product"]["id"].as_str().unwrap().to_string();
  assert_eq!(body["product"]["priceCents"], json!(149900));

  let mut update = draft;
  update["stockAvailable"] = json!(false);
  let req = test::TestRequest::put()
    .uri(&format!("/api/v1/admin/products/{}", id))
    .insert_header(bearer(&token))
    .set_json(update)
    .to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(body["product"]["stockAvailable"], json!(false));

  let req = test::TestRequest::get().uri("/api/v1/products").to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert!(body["products"].as_array().unwrap().is_empty());

  let req = test::TestRequest::delete()
    .uri(&format!("/api/v1/admin/products/{}", id))
    .insert_header(bearer(&token))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

  let req = test::TestRequest::delete()
    .uri(&format!("/api/v1/admin/products/{}", id))
    .insert_header(bearer(&token))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}
