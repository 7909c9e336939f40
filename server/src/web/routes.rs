// subvault_server/src/web/routes.rs

use actix_web::web;

use crate::web::handlers::{admin_handlers, auth_handlers, order_handlers, product_handlers};

async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

// Called from `main.rs` and the API tests to mount every service on an Actix App.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api/v1")
      .route("/health", web::get().to(health_check_handler))
      .service(
        web::scope("/products")
          .route("", web::get().to(product_handlers::list_products_handler))
          .route("/{product_id}", web::get().to(product_handlers::get_product_handler)),
      )
      .service(
        web::scope("/orders")
          .route("", web::post().to(order_handlers::place_order_handler))
          .route("/{order_id}", web::get().to(order_handlers::track_order_handler))
          .route("/{order_id}/evidence", web::post().to(order_handlers::attach_evidence_handler)),
      )
      .service(
        web::scope("/auth")
          .route("/signin", web::post().to(auth_handlers::signin_handler))
          .route("/signout", web::post().to(auth_handlers::signout_handler)),
      )
      .service(
        web::scope("/admin")
          .route("/dashboard", web::get().to(admin_handlers::dashboard_handler))
          // `export` must be registered ahead of the `{order_id}` matcher.
          .route("/orders/export", web::get().to(admin_handlers::export_orders_handler))
          .route("/orders", web::get().to(admin_handlers::list_orders_handler))
          .route("/orders/{order_id}", web::get().to(admin_handlers::get_order_handler))
          .route("/orders/{order_id}/history", web::get().to(admin_handlers::order_history_handler))
          .route(
            "/orders/{order_id}/transition",
            web::post().to(admin_handlers::transition_order_handler),
          )
          .route("/products", web::get().to(admin_handlers::list_products_handler))
          .route("/products", web::post().to(admin_handlers::create_product_handler))
          .route("/products/{product_id}", web::put().to(admin_handlers::update_product_handler))
          .route("/products/{product_id}", web::delete().to(admin_handlers::delete_product_handler)),
      )
      .route("/evidence/{object_name}", web::get().to(admin_handlers::get_evidence_handler)),
  );
}
