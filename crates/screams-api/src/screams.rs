//! Handlers for `/Screams` endpoints.
//!
//! | Method  | Path | Auth | Notes |
//! |---------|------|------|-------|
//! | `POST`  | `/Screams` | required | Body: `{"body":"..."}`; returns 201 + stored scream |
//! | `GET`   | `/Screams` | required | The caller's own screams |
//! | `GET`   | `/Screams/:displayName` | optional | Another user's screams |
//! | `PATCH` | `/Screams/:id` | required | 404 unless the scream exists |
//!
//! Both list endpoints accept `?orderColumn`, `?orderDirection`, `?offset`
//! and `?limit`.

use axum::{
  Extension, Json,
  extract::{FromRequestParts, Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use bytes::Bytes;
use screams_core::{
  caller::Caller,
  escape::lossy_body,
  profile::is_display_name,
  scream::Scream,
  store::{OrLoggedDefault as _, ScreamStore, UserListQuery},
};
use serde::{Deserialize, Deserializer};

use crate::{AppState, error::ApiError};

const CREATE_FAILED: &str = "You failed to scream into the void";

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub body: Option<String>,
}

/// `POST /Screams`, body: `{"body":"..."}`
///
/// The payload is decoded lossily, so invalid UTF-8 becomes U+FFFD instead
/// of failing the request.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Extension(caller): Extension<Caller>,
  payload: Bytes,
) -> Result<impl IntoResponse, ApiError>
where
  S: ScreamStore,
{
  let body = serde_json::from_str::<CreateBody>(&lossy_body(&payload))
    .ok()
    .and_then(|b| b.body)
    .ok_or_else(|| ApiError::bad_request("Missing required parameters"))?;

  let scream = Scream::new(caller.user_id, body);
  scream
    .check_create()
    .map_err(|e| ApiError::BadRequest(format!("{CREATE_FAILED}: {e}")))?;

  let scream = state.store.create_scream(scream).await.map_err(|e| {
    tracing::error!(error = %e, user_id = caller.user_id, "scream create failed");
    ApiError::Store(format!("{CREATE_FAILED}: {e}").into())
  })?;

  Ok((StatusCode::CREATED, Json(scream)))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// Query string of the list endpoints.
///
/// `offset` and `limit` that are not integers are ignored rather than
/// failing the request.
#[derive(Debug, Default, Deserialize, FromRequestParts)]
#[serde(rename_all = "camelCase")]
#[from_request(via(Query), rejection(ApiError))]
pub struct ListParams {
  pub order_column:    Option<String>,
  pub order_direction: Option<String>,
  #[serde(default, deserialize_with = "lenient_int")]
  pub offset:          Option<i64>,
  #[serde(default, deserialize_with = "lenient_int")]
  pub limit:           Option<i64>,
}

fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
  D: Deserializer<'de>,
{
  let raw = Option::<String>::deserialize(deserializer)?;
  Ok(raw.and_then(|v| v.trim().parse().ok()))
}

impl From<ListParams> for UserListQuery {
  fn from(p: ListParams) -> Self {
    UserListQuery {
      order_column:    p.order_column,
      order_direction: p.order_direction,
      offset:          p.offset,
      limit:           p.limit,
    }
  }
}

/// `GET /Screams`: the caller's own screams.
pub async fn list_own<S>(
  State(state): State<AppState<S>>,
  Extension(caller): Extension<Caller>,
  params: ListParams,
) -> Result<Json<Vec<Scream>>, ApiError>
where
  S: ScreamStore,
{
  list_for(&state, caller.user_id, params).await
}

/// `GET /Screams/:displayName`
///
/// A display name that matches no profile falls back to the caller, so only
/// anonymous callers get "User not found" for it.
pub async fn list_by_name<S>(
  State(state): State<AppState<S>>,
  Extension(caller): Extension<Caller>,
  Path(display_name): Path<String>,
  params: ListParams,
) -> Result<Json<Vec<Scream>>, ApiError>
where
  S: ScreamStore,
{
  let profile = if is_display_name(&display_name) {
    state
      .store
      .profile_by_display_name(&display_name)
      .await
      .or_logged_default("Failed to look up user profile")
  } else {
    None
  };

  let user_id = profile.map_or(caller.user_id, |p| p.user_id);

  list_for(&state, user_id, params).await
}

/// Storage failures collapse to an empty list.
async fn list_for<S>(
  state: &AppState<S>,
  user_id: i64,
  params: ListParams,
) -> Result<Json<Vec<Scream>>, ApiError>
where
  S: ScreamStore,
{
  if user_id < 1 {
    return Err(ApiError::not_found("User not found"));
  }

  let query = UserListQuery::from(params);
  let screams = state
    .store
    .get_user_screams(user_id, &query)
    .await
    .or_logged_default("Failed to retrieve user screams");

  Ok(Json(screams))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PATCH /Screams/:id`
///
/// Only confirms the scream exists and returns it; no fields are applied.
pub async fn update<S>(
  State(state): State<AppState<S>>,
  Path(key): Path<String>,
) -> Result<Json<Scream>, ApiError>
where
  S: ScreamStore,
{
  let id = parse_scream_id(&key).ok_or_else(|| ApiError::not_found("Scream not found"))?;

  let scream = state
    .store
    .get_scream(id)
    .await
    .or_logged_default("Failed to load scream")
    .ok_or_else(|| ApiError::not_found("Scream not found"))?;

  Ok(Json(scream))
}

/// Scream ids in paths are plain decimal digits.
fn parse_scream_id(key: &str) -> Option<i64> {
  if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
    return None;
  }
  key.parse().ok()
}
