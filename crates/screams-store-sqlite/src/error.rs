//! Error type for `screams-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{0}")]
  Core(#[from] screams_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("scream not found: {0}")]
  ScreamNotFound(i64),

  #[error("display name already taken: {0}")]
  DisplayNameTaken(String),

  #[error("invalid page: offset {offset}, limit {limit}")]
  InvalidPage { offset: i64, limit: i64 },
}

impl Error {
  /// True when the failure was a validation rule rather than storage.
  pub fn is_validation(&self) -> bool { matches!(self, Self::Core(_)) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
