//! UserProfile: the public identity a scream's author is looked up by.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
  pub user_id:      i64,
  pub display_name: String,
  pub date_joined:  DateTime<Utc>,
}

/// Display names appear as a URL path segment, so they are limited to ASCII
/// letters, digits, `-`, `_` and `.`.
pub fn is_display_name(s: &str) -> bool {
  !s.is_empty()
    && s
      .bytes()
      .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
}

pub fn check_display_name(s: &str) -> Result<()> {
  if !is_display_name(s) {
    return Err(Error::InvalidDisplayName(s.to_owned()));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn display_name_charset() {
    assert!(is_display_name("andrew.m-k_2"));
    assert!(!is_display_name(""));
    assert!(!is_display_name("no spaces"));
    assert!(!is_display_name("semi;colon"));
    assert!(check_display_name("émile").is_err());
  }
}
