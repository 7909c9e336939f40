// subvault_server/src/web/handlers/auth_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::Session;

#[derive(Deserialize)]
pub struct SigninRequestPayload {
  pub email: String,
  pub password: String,
}

#[instrument(name = "handler::signin", skip_all)]
pub async fn signin_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<SigninRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  let identity = app_state.staff.check(&payload.email, &payload.password)?;
  let issued = app_state.sessions.issue(identity.clone());
  info!(staff = %identity.email, "Staff signed in.");

  Ok(HttpResponse::Ok().json(json!({
      "message": "Signed in successfully.",
      "token": issued.token,
      "expiresAt": issued.expires_at,
      "staff": identity,
  })))
}

#[instrument(name = "handler::signout", skip_all)]
pub async fn signout_handler(app_state: web::Data<AppState>, session: Session) -> Result<HttpResponse, AppError> {
  let staff = session.context.require_staff()?;
  if let Some(token) = session.token.as_deref() {
    app_state.sessions.revoke(token);
  }
  info!(staff = %staff.email, "Staff signed out.");
  Ok(HttpResponse::Ok().json(json!({ "message": "Signed out." })))
}
