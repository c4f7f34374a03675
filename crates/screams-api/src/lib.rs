//! JSON REST API for Screams.
//!
//! Exposes an axum [`Router`] backed by any [`ScreamStore`]. TLS and
//! transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .merge(screams_api::api_router(store.clone()))
//! ```

pub mod auth;
pub mod error;
pub mod screams;

use std::sync::Arc;

use axum::{
  Router,
  middleware,
  routing::{MethodRouter, get, patch, post},
};
use screams_core::store::ScreamStore;

pub use auth::AuthRequirement;
pub use error::ApiError;

use auth::{Gate, authenticate};

/// Shared state threaded through all handlers.
#[derive(Clone)]
pub struct AppState<S> {
  pub store: Arc<S>,
}

/// Attach the caller-resolving middleware for `requirement` to `route`.
fn guarded<S>(
  route: MethodRouter<AppState<S>>,
  state: &AppState<S>,
  requirement: AuthRequirement,
) -> MethodRouter<AppState<S>>
where
  S: ScreamStore + Clone + Send + Sync + 'static,
{
  let gate = Gate { store: state.store.clone(), requirement };
  route.route_layer(middleware::from_fn_with_state(gate, authenticate::<S>))
}

/// Build the API router for `store`.
///
/// Every path is reachable with and without a trailing slash.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: ScreamStore + Clone + Send + Sync + 'static,
{
  let state = AppState { store };

  let collection = guarded(post(screams::create::<S>), &state, AuthRequirement::Required)
    .merge(guarded(get(screams::list_own::<S>), &state, AuthRequirement::Required));

  let member = guarded(get(screams::list_by_name::<S>), &state, AuthRequirement::Optional)
    .merge(guarded(patch(screams::update::<S>), &state, AuthRequirement::Required));

  Router::new()
    .route("/Screams", collection.clone())
    .route("/Screams/", collection)
    .route("/Screams/{key}", member.clone())
    .route("/Screams/{key}/", member)
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
  };
  use base64::Engine as _;
  use base64::engine::general_purpose::STANDARD as B64;
  use rand_core::OsRng;
  use screams_core::{profile::UserProfile, scream::Scream};
  use screams_store_sqlite::SqliteStore;
  use serde_json::Value;
  use tower::ServiceExt as _;

  struct Fixture {
    store: Arc<SqliteStore>,
    alice: UserProfile,
    bob:   UserProfile,
  }

  async fn fixture() -> Fixture {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let salt  = SaltString::generate(&mut OsRng);
    let hash  = Argon2::default()
      .hash_password(b"secret", &salt)
      .unwrap()
      .to_string();

    let alice = store.add_user("alice", &hash).await.unwrap();
    let bob   = store.add_user("bob", &hash).await.unwrap();
    Fixture { store: Arc::new(store), alice, bob }
  }

  fn basic(user: &str, pass: &str) -> String {
    format!("Basic {}", B64.encode(format!("{user}:{pass}")))
  }

  async fn send(
    f:      &Fixture,
    method: &str,
    uri:    &str,
    auth:   Option<(&str, &str)>,
    body:   &str,
  ) -> Response {
    let mut builder = Request::builder()
      .method(method)
      .uri(uri)
      .header(header::CONTENT_TYPE, "application/json");
    if let Some((user, pass)) = auth {
      builder = builder.header(header::AUTHORIZATION, basic(user, pass));
    }
    let req = builder.body(Body::from(body.to_string())).unwrap();
    api_router(f.store.clone()).oneshot(req).await.unwrap()
  }

  async fn json(resp: Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  const ALICE: Option<(&str, &str)> = Some(("alice", "secret"));

  // ── Create ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_then_list_by_display_name() {
    let f = fixture().await;

    let resp = send(&f, "POST", "/Screams/", ALICE, r#"{"body":"hello"}"#).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = json(resp).await;
    assert_eq!(created["body"], "hello");
    assert_eq!(created["userId"], f.alice.user_id);
    assert!(created["id"].as_i64().unwrap() > 0);

    let resp = send(&f, "GET", "/Screams/alice/", None, "").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let listed = json(resp).await;
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], created["id"]);
  }

  #[tokio::test]
  async fn create_escapes_body() {
    let f = fixture().await;
    let resp = send(&f, "POST", "/Screams", ALICE, r#"{"body":" <b>hi</b> "}"#).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(json(resp).await["body"], "&lt;b&gt;hi&lt;/b&gt;");
  }

  #[tokio::test]
  async fn create_without_body_is_400() {
    let f = fixture().await;
    for payload in ["{}", "", "not json"] {
      let resp = send(&f, "POST", "/Screams", ALICE, payload).await;
      assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "payload {payload:?}");
      assert_eq!(json(resp).await["error"], "Missing required parameters");
    }
  }

  #[tokio::test]
  async fn create_with_blank_body_is_400_and_stores_nothing() {
    let f = fixture().await;
    let resp = send(&f, "POST", "/Screams", ALICE, r#"{"body":"   "}"#).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let err = json(resp).await;
    assert!(
      err["error"].as_str().unwrap().starts_with("You failed to scream into the void"),
      "{err}"
    );
    assert_eq!(f.store.get_user_scream_count(f.alice.user_id).await.unwrap(), 0);
  }

  #[tokio::test]
  async fn create_requires_auth() {
    let f = fixture().await;

    let resp = send(&f, "POST", "/Screams", None, r#"{"body":"hi"}"#).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));

    let resp = send(&f, "POST", "/Screams", Some(("alice", "wrong")), r#"{"body":"hi"}"#).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = send(&f, "POST", "/Screams", Some(("nobody", "secret")), r#"{"body":"hi"}"#).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  // ── List ────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn list_own_requires_auth_and_is_scoped() {
    let f = fixture().await;
    f.store.create_scream(Scream::new(f.alice.user_id, "a1")).await.unwrap();
    f.store.create_scream(Scream::new(f.bob.user_id, "b1")).await.unwrap();

    let resp = send(&f, "GET", "/Screams", None, "").await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = send(&f, "GET", "/Screams", ALICE, "").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let listed = json(resp).await;
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["body"], "a1");
  }

  #[tokio::test]
  async fn list_by_display_name_is_case_insensitive() {
    let f = fixture().await;
    f.store.create_scream(Scream::new(f.bob.user_id, "b1")).await.unwrap();

    let resp = send(&f, "GET", "/Screams/BOB", ALICE, "").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json(resp).await.as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn list_unknown_user_is_404_when_anonymous() {
    let f = fixture().await;

    let resp = send(&f, "GET", "/Screams/nobody", None, "").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(json(resp).await["error"], "User not found");

    let resp = send(&f, "GET", "/Screams/no%20body", None, "").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn list_unknown_user_falls_back_to_caller() {
    let f = fixture().await;
    for body in ["a1", "a2", "a3"] {
      f.store.create_scream(Scream::new(f.alice.user_id, body)).await.unwrap();
    }
    f.store.create_scream(Scream::new(f.bob.user_id, "b1")).await.unwrap();

    for uri in ["/Screams/nobody", "/Screams/no%20body/"] {
      let resp = send(&f, "GET", uri, ALICE, "").await;
      assert_eq!(resp.status(), StatusCode::OK, "{uri}");
      let listed = json(resp).await;
      let listed = listed.as_array().unwrap();
      assert_eq!(listed.len(), 3, "{uri}");
      assert!(listed.iter().all(|s| s["userId"] == f.alice.user_id));
    }
  }

  #[tokio::test]
  async fn list_by_display_name_rejects_bad_credentials() {
    let f = fixture().await;
    let resp = send(&f, "GET", "/Screams/alice", Some(("alice", "nope")), "").await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn list_pages_and_orders() {
    let f = fixture().await;
    let mut ids = Vec::new();
    for i in 0..4 {
      let s = f
        .store
        .create_scream(Scream::new(f.alice.user_id, format!("#{i}")))
        .await
        .unwrap();
      ids.push(s.id);
    }

    let resp = send(&f, "GET", "/Screams/alice?offset=1&limit=2", None, "").await;
    let got: Vec<i64> = json(resp)
      .await
      .as_array()
      .unwrap()
      .iter()
      .map(|s| s["id"].as_i64().unwrap())
      .collect();
    assert_eq!(got, &ids[1..3]);

    let resp = send(&f, "GET", "/Screams/alice?orderColumn=ID", None, "").await;
    let first = json(resp).await[0]["id"].as_i64().unwrap();
    assert_eq!(first, ids[3]);

    let resp = send(&f, "GET", "/Screams/alice?limit=2", None, "").await;
    assert_eq!(json(resp).await.as_array().unwrap().len(), 4);
  }

  #[tokio::test]
  async fn non_integer_paging_lists_everything() {
    let f = fixture().await;
    for i in 0..3 {
      f.store
        .create_scream(Scream::new(f.alice.user_id, format!("#{i}")))
        .await
        .unwrap();
    }

    let resp = send(&f, "GET", "/Screams/alice?offset=abc&limit=1", None, "").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json(resp).await.as_array().unwrap().len(), 3);
  }

  #[tokio::test]
  async fn malformed_query_uses_error_envelope() {
    let f = fixture().await;
    let resp = send(&f, "GET", "/Screams/alice?limit=1&limit=2", None, "").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(json(resp).await["error"].is_string());
  }

  #[tokio::test]
  async fn negative_page_collapses_to_empty() {
    let f = fixture().await;
    f.store.create_scream(Scream::new(f.alice.user_id, "x")).await.unwrap();

    for query in ["offset=0&limit=-1", "offset=-5&limit=2"] {
      let resp = send(&f, "GET", &format!("/Screams/alice?{query}"), None, "").await;
      assert_eq!(resp.status(), StatusCode::OK, "{query}");
      assert!(json(resp).await.as_array().unwrap().is_empty(), "{query}");
    }
  }

  #[tokio::test]
  async fn list_storage_failure_collapses_to_empty() {
    let f = fixture().await;
    f.store.create_scream(Scream::new(f.alice.user_id, "x")).await.unwrap();

    let resp = send(
      &f,
      "GET",
      "/Screams/alice?orderColumn=ID&orderDirection=SIDEWAYS",
      None,
      "",
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(json(resp).await.as_array().unwrap().is_empty());
  }

  // ── Update ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn update_existing_scream_returns_it_unchanged() {
    let f = fixture().await;
    let s = f
      .store
      .create_scream(Scream::new(f.alice.user_id, "keep"))
      .await
      .unwrap();

    let resp = send(&f, "PATCH", &format!("/Screams/{}/", s.id), ALICE, r#"{"body":"new"}"#).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json(resp).await["body"], "keep");
    assert!(f.store.get_scream_history(s.id).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn update_missing_or_malformed_id_is_404() {
    let f = fixture().await;
    for uri in ["/Screams/999", "/Screams/0", "/Screams/abc"] {
      let resp = send(&f, "PATCH", uri, ALICE, "").await;
      assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
      assert_eq!(json(resp).await["error"], "Scream not found");
    }
  }

  #[tokio::test]
  async fn update_requires_auth() {
    let f = fixture().await;
    let resp = send(&f, "PATCH", "/Screams/1", None, "").await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn unregistered_method_is_405() {
    let f = fixture().await;
    let resp = send(&f, "DELETE", "/Screams/1", ALICE, "").await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
  }
}
