// subvault_server/src/web/extractors.rs

use actix_web::{http::header, web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use subvault::SessionContext;
use tracing::debug;

use crate::errors::AppError;
use crate::state::AppState;

/// The caller's session as resolved from `Authorization: Bearer <token>`.
///
/// Extraction never fails on a missing or stale token; the request simply runs as
/// `Anonymous` and the core refuses staff operations.
#[derive(Debug)]
pub struct Session {
  pub context: SessionContext,
  pub token: Option<String>,
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
  let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
  let (scheme, token) = value.trim().split_once(' ')?;
  if !scheme.eq_ignore_ascii_case("bearer") || token.trim().is_empty() {
    return None;
  }
  Some(token.trim().to_string())
}

impl FromRequest for Session {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
    let Some(state) = req.app_data::<web::Data<AppState>>() else {
      return ready(Err(AppError::Internal("Application state is not configured.".to_string())));
    };

    let token = bearer_token(req);
    let context = match token.as_deref().and_then(|t| state.sessions.resolve(t)) {
      Some(identity) => SessionContext::Staff(identity),
      None => {
        if token.is_some() {
          debug!("Bearer token did not resolve to a staff session.");
        }
        SessionContext::Anonymous
      }
    };
    ready(Ok(Session { context, token }))
  }
}
