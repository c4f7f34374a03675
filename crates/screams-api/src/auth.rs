//! Caller identification via HTTP Basic credentials.
//!
//! Every route is registered with an [`AuthRequirement`]. The
//! [`authenticate`] middleware resolves a [`Caller`] according to it and
//! stores it in the request extensions, where handlers pick it up with
//! `Extension<Caller>`.

use std::sync::Arc;

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  extract::{Request, State},
  http::{HeaderMap, header},
  middleware::Next,
  response::Response,
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use screams_core::{caller::Caller, store::ScreamStore};

use crate::error::ApiError;

/// Whether a route needs an authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRequirement {
  /// Valid credentials must be presented.
  Required,
  /// Credentials are checked if presented; without them the caller is
  /// anonymous.
  Optional,
  /// Credentials are ignored; the caller is always anonymous.
  None,
}

/// State handed to [`authenticate`] for one route.
#[derive(Clone)]
pub struct Gate<S> {
  pub store:       Arc<S>,
  pub requirement: AuthRequirement,
}

/// Split a `Basic` authorization header into `(display_name, password)`.
///
/// Returns `Ok(None)` when no header is present and `Unauthorized` when one
/// is present but malformed.
pub fn basic_credentials(
  headers: &HeaderMap,
) -> Result<Option<(String, String)>, ApiError> {
  let Some(value) = headers.get(header::AUTHORIZATION) else {
    return Ok(None);
  };

  let encoded = value
    .to_str()
    .ok()
    .and_then(|v| v.strip_prefix("Basic "))
    .ok_or(ApiError::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| ApiError::Unauthorized)?;
  let creds = String::from_utf8(decoded).map_err(|_| ApiError::Unauthorized)?;
  let (name, password) = creds.split_once(':').ok_or(ApiError::Unauthorized)?;

  Ok(Some((name.to_owned(), password.to_owned())))
}

/// Check `password` against the stored argon2 hash for `display_name`.
pub async fn verify<S>(
  store: &S,
  display_name: &str,
  password: &str,
) -> Result<Caller, ApiError>
where
  S: ScreamStore,
{
  let (profile, hash) = store
    .credentials_for(display_name)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or(ApiError::Unauthorized)?;

  let parsed = PasswordHash::new(&hash).map_err(|_| ApiError::Unauthorized)?;
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .map_err(|_| ApiError::Unauthorized)?;

  Ok(Caller::user(profile.user_id))
}

/// Resolve the caller for a route guarded by `gate`.
pub async fn authenticate<S>(
  State(gate): State<Gate<S>>,
  mut req: Request,
  next: Next,
) -> Result<Response, ApiError>
where
  S: ScreamStore + 'static,
{
  let caller = match gate.requirement {
    AuthRequirement::None => Caller::ANONYMOUS,
    AuthRequirement::Optional => match basic_credentials(req.headers())? {
      Some((name, password)) => verify(&*gate.store, &name, &password).await?,
      None => Caller::ANONYMOUS,
    },
    AuthRequirement::Required => {
      let (name, password) =
        basic_credentials(req.headers())?.ok_or(ApiError::Unauthorized)?;
      verify(&*gate.store, &name, &password).await?
    }
  };

  tracing::debug!(
    user_id = caller.user_id,
    anonymous = caller.is_anonymous(),
    requirement = ?gate.requirement,
    "caller resolved"
  );
  req.extensions_mut().insert(caller);
  Ok(next.run(req).await)
}
