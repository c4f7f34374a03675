//! The `ScreamStore` trait and supporting query types.
//!
//! Implemented by storage backends (e.g. `screams-store-sqlite`). The HTTP
//! layer depends on this abstraction, not on a concrete backend.

use std::{fmt::Display, future::Future};

use crate::{
  history::ScreamHistory,
  profile::UserProfile,
  scream::Scream,
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Ordering and paging for [`ScreamStore::get_user_screams`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserListQuery {
  /// Storage column to sort on, e.g. `"DateCreated"`.
  ///
  /// Not validated against the column set; the value reaches the SQL text
  /// as given.
  pub order_column:    Option<String>,
  /// `ASC` or `DESC`; defaults to `DESC` when `order_column` is set.
  pub order_direction: Option<String>,
  /// Paging is applied only when both `offset` and `limit` are set.
  pub offset:          Option<i64>,
  pub limit:           Option<i64>,
}

impl UserListQuery {
  /// `(offset, limit)` when both halves of the page are present.
  pub fn page(&self) -> Option<(i64, i64)> { self.offset.zip(self.limit) }
}

// ─── Failure collapsing ──────────────────────────────────────────────────────

/// Turn a failed read into an empty result after logging it.
///
/// Store methods report failures explicitly; handlers that must answer with
/// an empty list (or a zero, or "not found") on storage failure go through
/// this instead of matching on the error themselves.
pub trait OrLoggedDefault<T> {
  fn or_logged_default(self, context: &str) -> T;
}

impl<T, E> OrLoggedDefault<T> for Result<T, E>
where
  T: Default,
  E: Display,
{
  fn or_logged_default(self, context: &str) -> T {
    match self {
      Ok(v) => v,
      Err(e) => {
        tracing::error!(error = %e, "{context}");
        T::default()
      }
    }
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Screams storage backend.
///
/// Lifecycle methods validate with the `check_*` rules in
/// [`crate::scream`] and [`crate::history`] before touching storage, so a
/// validation failure never issues a statement.
pub trait ScreamStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Scream lifecycle ──────────────────────────────────────────────────

  /// Validate, escape and insert `scream`, returning it with its assigned id
  /// and creation time.
  fn create_scream(
    &self,
    scream: Scream,
  ) -> impl Future<Output = Result<Scream, Self::Error>> + Send + '_;

  /// Load a scream by id. Returns `None` if no such row exists.
  fn get_scream(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Scream>, Self::Error>> + Send + '_;

  /// Persist new field values for a stored scream.
  ///
  /// The currently stored state is first copied into the history table. A
  /// failed snapshot is logged and does not stop the update. `date_edited`
  /// is stamped by the store.
  fn update_scream(
    &self,
    scream: Scream,
  ) -> impl Future<Output = Result<Scream, Self::Error>> + Send + '_;

  /// Remove a scream. No snapshot is taken.
  fn delete_scream(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── History ───────────────────────────────────────────────────────────

  /// Snapshot a stored scream into the history table.
  fn record_history<'a>(
    &'a self,
    scream: &'a Scream,
  ) -> impl Future<Output = Result<ScreamHistory, Self::Error>> + Send + 'a;

  /// All snapshots taken of `scream_id`, in storage order.
  fn get_scream_history(
    &self,
    scream_id: i64,
  ) -> impl Future<Output = Result<Vec<ScreamHistory>, Self::Error>> + Send + '_;

  // ── Per-user queries ──────────────────────────────────────────────────

  fn get_user_scream_count(
    &self,
    user_id: i64,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + '_;

  fn get_user_screams<'a>(
    &'a self,
    user_id: i64,
    query: &'a UserListQuery,
  ) -> impl Future<Output = Result<Vec<Scream>, Self::Error>> + Send + 'a;

  // ── User profiles ─────────────────────────────────────────────────────

  /// Register a user. `password_hash` is an argon2 PHC string.
  fn add_user<'a>(
    &'a self,
    display_name: &'a str,
    password_hash: &'a str,
  ) -> impl Future<Output = Result<UserProfile, Self::Error>> + Send + 'a;

  /// Case-insensitive lookup by display name.
  fn profile_by_display_name<'a>(
    &'a self,
    display_name: &'a str,
  ) -> impl Future<Output = Result<Option<UserProfile>, Self::Error>> + Send + 'a;

  /// The profile and stored password hash for `display_name`, for
  /// credential checks.
  fn credentials_for<'a>(
    &'a self,
    display_name: &'a str,
  ) -> impl Future<Output = Result<Option<(UserProfile, String)>, Self::Error>>
  + Send
  + 'a;
}
