//! Encoding and decoding helpers between domain types and the plain values
//! stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with a fixed microsecond
//! precision so that text ordering matches chronological ordering.

use chrono::{DateTime, SecondsFormat, SubsecRound as _, Utc};
use screams_core::{
  history::ScreamHistory, profile::UserProfile, scream::Scream,
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

/// `dt` cut to the precision it will have after a round trip through a
/// column.
pub fn stored_precision(dt: DateTime<Utc>) -> DateTime<Utc> {
  dt.trunc_subsecs(6)
}

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

fn decode_opt_dt(s: Option<&str>) -> Result<Option<DateTime<Utc>>> {
  s.map(decode_dt).transpose()
}

// ─── Column lists ────────────────────────────────────────────────────────────

pub const SCREAM_COLUMNS: &str = "ID, Body, DateCreated, DateEdited, ParentID, \
   ReplyToID, SourceAppID, TotalViews, UserID";

pub const HISTORY_COLUMNS: &str = "ID, ScreamID, Body, DateCreated, \
   DateEdited, DateRecorded, ParentID, ReplyToID, SourceAppID, TotalViews, \
   UserID";

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read from a `Screams` row, in [`SCREAM_COLUMNS`] order.
pub struct RawScream {
  pub id:            i64,
  pub body:          String,
  pub date_created:  String,
  pub date_edited:   Option<String>,
  pub parent_id:     i64,
  pub reply_to_id:   i64,
  pub source_app_id: i64,
  pub total_views:   i64,
  pub user_id:       i64,
}

impl RawScream {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      body:          row.get(1)?,
      date_created:  row.get(2)?,
      date_edited:   row.get(3)?,
      parent_id:     row.get(4)?,
      reply_to_id:   row.get(5)?,
      source_app_id: row.get(6)?,
      total_views:   row.get(7)?,
      user_id:       row.get(8)?,
    })
  }

  pub fn into_scream(self) -> Result<Scream> {
    Ok(Scream {
      id:            self.id,
      body:          self.body,
      user_id:       self.user_id,
      parent_id:     self.parent_id,
      reply_to_id:   self.reply_to_id,
      source_app_id: self.source_app_id,
      total_views:   self.total_views,
      date_created:  decode_dt(&self.date_created)?,
      date_edited:   decode_opt_dt(self.date_edited.as_deref())?,
    })
  }
}

/// Raw values read from a `ScreamHistory` row, in [`HISTORY_COLUMNS`] order.
pub struct RawHistory {
  pub id:            i64,
  pub scream_id:     i64,
  pub body:          String,
  pub date_created:  String,
  pub date_edited:   Option<String>,
  pub date_recorded: String,
  pub parent_id:     i64,
  pub reply_to_id:   i64,
  pub source_app_id: i64,
  pub total_views:   i64,
  pub user_id:       i64,
}

impl RawHistory {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      scream_id:     row.get(1)?,
      body:          row.get(2)?,
      date_created:  row.get(3)?,
      date_edited:   row.get(4)?,
      date_recorded: row.get(5)?,
      parent_id:     row.get(6)?,
      reply_to_id:   row.get(7)?,
      source_app_id: row.get(8)?,
      total_views:   row.get(9)?,
      user_id:       row.get(10)?,
    })
  }

  pub fn into_history(self) -> Result<ScreamHistory> {
    Ok(ScreamHistory {
      id:            self.id,
      scream_id:     self.scream_id,
      body:          self.body,
      user_id:       self.user_id,
      parent_id:     self.parent_id,
      reply_to_id:   self.reply_to_id,
      source_app_id: self.source_app_id,
      total_views:   self.total_views,
      date_created:  decode_dt(&self.date_created)?,
      date_edited:   decode_opt_dt(self.date_edited.as_deref())?,
      date_recorded: decode_dt(&self.date_recorded)?,
    })
  }
}

/// Raw values read from a `Users` row.
pub struct RawProfile {
  pub id:            i64,
  pub display_name:  String,
  pub date_joined:   String,
  pub password_hash: String,
}

impl RawProfile {
  /// Expects `ID, DisplayName, DateJoined, PasswordHash`.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      display_name:  row.get(1)?,
      date_joined:   row.get(2)?,
      password_hash: row.get(3)?,
    })
  }

  pub fn into_profile(self) -> Result<UserProfile> {
    Ok(self.into_credentials()?.0)
  }

  pub fn into_credentials(self) -> Result<(UserProfile, String)> {
    let profile = UserProfile {
      user_id:      self.id,
      display_name: self.display_name,
      date_joined:  decode_dt(&self.date_joined)?,
    };
    Ok((profile, self.password_hash))
  }
}
