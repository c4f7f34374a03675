//! ScreamHistory: write-once snapshots of a scream taken before each edit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, scream::{Scream, is_blank}};

/// The state of a scream as it was just before an update.
///
/// `id` identifies the snapshot itself; `scream_id` is the scream it was
/// taken from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreamHistory {
  pub id:            i64,
  pub scream_id:     i64,
  pub body:          String,
  pub user_id:       i64,
  pub parent_id:     i64,
  pub reply_to_id:   i64,
  pub source_app_id: i64,
  pub total_views:   i64,
  pub date_created:  DateTime<Utc>,
  pub date_edited:   Option<DateTime<Utc>>,
  /// When the snapshot was taken.
  pub date_recorded: DateTime<Utc>,
}

impl ScreamHistory {
  /// Copy a stored scream into an unsaved snapshot. Returns `None` if the
  /// scream has never been stored.
  pub fn snapshot(scream: &Scream) -> Option<Self> {
    if !scream.is_persisted() {
      return None;
    }
    Some(Self {
      id:            0,
      scream_id:     scream.id,
      body:          scream.body.clone(),
      user_id:       scream.user_id,
      parent_id:     scream.parent_id,
      reply_to_id:   scream.reply_to_id,
      source_app_id: scream.source_app_id,
      total_views:   scream.total_views,
      date_created:  scream.date_created,
      date_edited:   scream.date_edited,
      date_recorded: Utc::now(),
    })
  }

  pub fn check_create(&self) -> Result<()> {
    if self.scream_id < 1 || is_blank(&self.body) || self.user_id < 1 {
      return Err(Error::InvalidHistory);
    }
    Ok(())
  }

  pub fn check_read(&self) -> Result<()> { Err(Error::HistoryWriteOnly) }

  pub fn check_update(&self) -> Result<()> { Err(Error::HistoryWriteOnly) }

  pub fn check_delete(&self) -> Result<()> { Err(Error::HistoryWriteOnly) }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn stored(id: i64) -> Scream {
    let mut s = Scream::new(5, "original");
    s.id = id;
    s.parent_id = 2;
    s.total_views = 11;
    s
  }

  #[test]
  fn snapshot_copies_every_field() {
    let scream = stored(3);
    let h = ScreamHistory::snapshot(&scream).unwrap();
    assert_eq!(h.id, 0);
    assert_eq!(h.scream_id, 3);
    assert_eq!(h.body, "original");
    assert_eq!(h.user_id, 5);
    assert_eq!(h.parent_id, 2);
    assert_eq!(h.total_views, 11);
    assert_eq!(h.date_created, scream.date_created);
    assert!(h.check_create().is_ok());
  }

  #[test]
  fn snapshot_of_unsaved_scream_is_none() {
    assert!(ScreamHistory::snapshot(&Scream::new(5, "x")).is_none());
  }

  #[test]
  fn create_requires_source_body_and_author() {
    let mut h = ScreamHistory::snapshot(&stored(3)).unwrap();
    h.body = String::new();
    assert!(matches!(h.check_create(), Err(Error::InvalidHistory)));
  }

  #[test]
  fn read_update_delete_always_fail() {
    let h = ScreamHistory::snapshot(&stored(3)).unwrap();
    assert!(matches!(h.check_read(), Err(Error::HistoryWriteOnly)));
    assert!(matches!(h.check_update(), Err(Error::HistoryWriteOnly)));
    assert!(matches!(h.check_delete(), Err(Error::HistoryWriteOnly)));
  }
}
