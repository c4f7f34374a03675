//! Error types for `screams-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("Invalid scream data.")]
  InvalidScream,

  #[error("Invalid scream history data.")]
  InvalidHistory,

  /// Scream history rows can be inserted, never read back individually,
  /// changed or removed.
  #[error("scream history is write-once")]
  HistoryWriteOnly,

  #[error("invalid display name: {0:?}")]
  InvalidDisplayName(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
