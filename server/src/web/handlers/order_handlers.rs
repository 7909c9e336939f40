// subvault_server/src/web/handlers/order_handlers.rs

//! Customer-facing order endpoints. None of these require a session.

use actix_web::{http::header, web, HttpRequest, HttpResponse};
use serde_json::json;
use subvault::{CheckoutForm, EvidenceUpload};
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::state::AppState;

#[instrument(name = "handler::place_order", skip_all)]
pub async fn place_order_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<CheckoutForm>,
) -> Result<HttpResponse, AppError> {
  let order = app_state.checkout.place_order(req_payload.into_inner()).await?;
  info!(order_id = %order.order_id, "Checkout accepted.");

  Ok(HttpResponse::Created().json(json!({
      "message": "Order placed successfully.",
      "orderId": order.order_id,
      "status": order.status,
      "statusMessage": order.status.customer_message(),
  })))
}

#[instrument(name = "handler::track_order", skip_all)]
pub async fn track_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let order = app_state.lookup.track(&path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({
      "message": "Order found.",
      "order": order
  })))
}

/// Raw image body; the `Content-Type` header names the image format.
#[instrument(name = "handler::attach_evidence", skip_all, fields(size = body.len()))]
pub async fn attach_evidence_handler(
  app_state: web::Data<AppState>,
  req: HttpRequest,
  path: web::Path<String>,
  body: web::Bytes,
) -> Result<HttpResponse, AppError> {
  let content_type = req
    .headers()
    .get(header::CONTENT_TYPE)
    .and_then(|v| v.to_str().ok())
    .unwrap_or_default()
    .to_string();

  let upload = EvidenceUpload {
    content_type,
    bytes: body.to_vec(),
  };
  let order = app_state.evidence.attach(&path.into_inner(), upload).await?;

  Ok(HttpResponse::Ok().json(json!({
      "message": "Payment evidence uploaded.",
      "orderId": order.order_id,
      "paymentEvidenceUrl": order.payment_evidence_url,
  })))
}
