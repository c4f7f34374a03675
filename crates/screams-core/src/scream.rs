//! Scream: a short user-authored post.
//!
//! A scream with `id == 0` has not been stored yet. Storage assigns the id on
//! create; `date_created` is stamped at the same moment and never changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, escape::escape_body};

/// A single post row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scream {
  pub id:            i64,
  pub body:          String,
  /// Author.
  pub user_id:       i64,
  /// Root scream of the thread; 0 when this scream is a root.
  pub parent_id:     i64,
  /// Scream being replied to; 0 when this is not a reply.
  pub reply_to_id:   i64,
  /// Application the scream was posted from.
  pub source_app_id: i64,
  pub total_views:   i64,
  pub date_created:  DateTime<Utc>,
  /// Set on every successful update; `None` until the first edit.
  pub date_edited:   Option<DateTime<Utc>>,
}

impl Scream {
  /// An unsaved scream by `user_id` with all linkage fields zeroed.
  pub fn new(user_id: i64, body: impl Into<String>) -> Self {
    Self {
      id: 0,
      body: body.into(),
      user_id,
      parent_id: 0,
      reply_to_id: 0,
      source_app_id: 0,
      total_views: 0,
      date_created: Utc::now(),
      date_edited: None,
    }
  }

  pub fn is_persisted(&self) -> bool { self.id > 0 }

  // ── Rules ─────────────────────────────────────────────────────────────────

  /// A scream may be created only if it has no id yet, a body and an author.
  pub fn check_create(&self) -> Result<()> {
    if self.id > 0 || is_blank(&self.body) || self.user_id < 1 {
      return Err(Error::InvalidScream);
    }
    Ok(())
  }

  /// Validate for creation, then escape the body and stamp `date_created`.
  pub fn prepare_create(mut self) -> Result<Self> {
    self.check_create()?;
    self.body = escape_body(&self.body);
    self.date_created = Utc::now();
    Ok(self)
  }

  pub fn check_update(&self) -> Result<()> {
    if self.id < 1 || is_blank(&self.body) || self.user_id < 1 {
      return Err(Error::InvalidScream);
    }
    Ok(())
  }
}

pub fn check_read(id: i64) -> Result<()> {
  if id < 1 {
    return Err(Error::InvalidScream);
  }
  Ok(())
}

pub fn check_delete(id: i64) -> Result<()> {
  if id < 1 {
    return Err(Error::InvalidScream);
  }
  Ok(())
}

pub(crate) fn is_blank(body: &str) -> bool { body.trim().is_empty() }

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn create_requires_body_and_author() {
    assert!(Scream::new(1, "hi").check_create().is_ok());
    assert!(matches!(
      Scream::new(1, "").check_create(),
      Err(Error::InvalidScream)
    ));
    assert!(Scream::new(1, "   ").check_create().is_err());
    assert!(Scream::new(0, "hi").check_create().is_err());
    assert!(Scream::new(-3, "hi").check_create().is_err());
  }

  #[test]
  fn create_rejects_persisted_scream() {
    let mut s = Scream::new(1, "hi");
    s.id = 7;
    assert!(s.check_create().is_err());
  }

  #[test]
  fn prepare_create_escapes_and_stamps() {
    let before = Utc::now();
    let s = Scream::new(1, "  <hi>  ").prepare_create().unwrap();
    assert_eq!(s.body, "&lt;hi&gt;");
    assert!(s.date_created >= before);
    assert_eq!(s.id, 0);
  }

  #[test]
  fn update_requires_id() {
    let mut s = Scream::new(1, "hi");
    assert!(s.check_update().is_err());
    s.id = 4;
    assert!(s.check_update().is_ok());
    s.body.clear();
    assert!(s.check_update().is_err());
  }

  #[test]
  fn read_and_delete_require_positive_id() {
    assert!(check_read(0).is_err());
    assert!(check_read(1).is_ok());
    assert!(check_delete(-1).is_err());
    assert!(check_delete(9).is_ok());
  }

  #[test]
  fn serialises_camel_case() {
    let json = serde_json::to_value(Scream::new(42, "hello")).unwrap();
    assert_eq!(json["userId"], 42);
    assert_eq!(json["replyToId"], 0);
    assert!(json["dateEdited"].is_null());
  }
}
