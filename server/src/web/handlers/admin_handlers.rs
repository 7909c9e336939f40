// subvault_server/src/web/handlers/admin_handlers.rs

//! Staff endpoints. Each passes the caller's session into the core, which refuses
//! anonymous callers before touching storage.

use actix_web::{http::header, web, HttpResponse};
use serde_json::json;
use subvault::{OrderFilter, ProductDraft, TransitionRequest};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::Session;

#[instrument(name = "handler::admin_list_orders", skip(app_state, session))]
pub async fn list_orders_handler(
  app_state: web::Data<AppState>,
  session: Session,
  filter: web::Query<OrderFilter>,
) -> Result<HttpResponse, AppError> {
  let listing = app_state.admin.list_orders(&session.context, &filter).await?;
  Ok(HttpResponse::Ok().json(json!({
      "message": format!("Showing {} of {} orders", listing.orders.len(), listing.total),
      "orders": listing.orders,
      "total": listing.total,
  })))
}

#[instrument(name = "handler::admin_export_orders", skip(app_state, session))]
pub async fn export_orders_handler(
  app_state: web::Data<AppState>,
  session: Session,
  filter: web::Query<OrderFilter>,
) -> Result<HttpResponse, AppError> {
  let export = app_state.admin.export_csv(&session.context, &filter).await?;
  Ok(
    HttpResponse::Ok()
      .content_type("text/csv; charset=utf-8")
      .insert_header((
        header::CONTENT_DISPOSITION,
        format!("attachment; filename=\"{}\"", export.file_name),
      ))
      .body(export.body),
  )
}

#[instrument(name = "handler::admin_get_order", skip(app_state, session, path), fields(order_id = %path.as_str()))]
pub async fn get_order_handler(
  app_state: web::Data<AppState>,
  session: Session,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let order = app_state.admin.get_order(&session.context, &path).await?;
  Ok(HttpResponse::Ok().json(json!({ "message": "Order fetched successfully.", "order": order })))
}

#[instrument(name = "handler::admin_order_history", skip(app_state, session, path), fields(order_id = %path.as_str()))]
pub async fn order_history_handler(
  app_state: web::Data<AppState>,
  session: Session,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let history = app_state.admin.order_history(&session.context, &path).await?;
  Ok(HttpResponse::Ok().json(json!({ "message": "History fetched successfully.", "history": history })))
}

#[instrument(
  name = "handler::admin_transition_order",
  skip(app_state, session, path, req_payload),
  fields(order_id = %path.as_str(), to_status = %req_payload.status)
)]
pub async fn transition_order_handler(
  app_state: web::Data<AppState>,
  session: Session,
  path: web::Path<String>,
  req_payload: web::Json<TransitionRequest>,
) -> Result<HttpResponse, AppError> {
  let order = app_state
    .admin
    .transition_order(&session.context, &path, req_payload.into_inner())
    .await?;
  Ok(HttpResponse::Ok().json(json!({ "message": "Order updated successfully.", "order": order })))
}

#[instrument(name = "handler::admin_dashboard", skip_all)]
pub async fn dashboard_handler(app_state: web::Data<AppState>, session: Session) -> Result<HttpResponse, AppError> {
  let report = app_state.admin.dashboard(&session.context).await?;
  Ok(HttpResponse::Ok().json(json!({ "message": "Dashboard computed.", "report": report })))
}

#[instrument(name = "handler::admin_list_products", skip_all)]
pub async fn list_products_handler(app_state: web::Data<AppState>, session: Session) -> Result<HttpResponse, AppError> {
  let products = app_state.admin.list_products(&session.context).await?;
  Ok(HttpResponse::Ok().json(json!({ "message": "Products fetched successfully.", "products": products })))
}

#[instrument(name = "handler::admin_create_product", skip_all)]
pub async fn create_product_handler(
  app_state: web::Data<AppState>,
  session: Session,
  req_payload: web::Json<ProductDraft>,
) -> Result<HttpResponse, AppError> {
  let product = app_state
    .admin
    .create_product(&session.context, req_payload.into_inner())
    .await?;
  info!(product_id = %product.id, "Product created via admin API.");
  Ok(HttpResponse::Created().json(json!({ "message": "Product created successfully.", "product": product })))
}

#[instrument(name = "handler::admin_update_product", skip(app_state, session, req_payload))]
pub async fn update_product_handler(
  app_state: web::Data<AppState>,
  session: Session,
  path: web::Path<Uuid>,
  req_payload: web::Json<ProductDraft>,
) -> Result<HttpResponse, AppError> {
  let product = app_state
    .admin
    .update_product(&session.context, path.into_inner(), req_payload.into_inner())
    .await?;
  Ok(HttpResponse::Ok().json(json!({ "message": "Product updated successfully.", "product": product })))
}

#[instrument(name = "handler::admin_delete_product", skip(app_state, session))]
pub async fn delete_product_handler(
  app_state: web::Data<AppState>,
  session: Session,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  app_state.admin.delete_product(&session.context, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({ "message": "Product deleted successfully." })))
}

/// Evidence bytes for staff review. Anonymous callers get 401, unknown names 404.
#[instrument(name = "handler::admin_get_evidence", skip(app_state, session, path), fields(object_name = %path.as_str()))]
pub async fn get_evidence_handler(
  app_state: web::Data<AppState>,
  session: Session,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  session.context.require_staff()?;
  let stored = app_state
    .evidence_files
    .open(&path)
    .await
    .map_err(|e| AppError::Internal(format!("Reading evidence failed: {:#}", e)))?
    .ok_or_else(|| AppError::NotFound("Evidence not found.".to_string()))?;
  Ok(HttpResponse::Ok().content_type(stored.content_type).body(stored.bytes))
}
