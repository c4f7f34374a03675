//! [`SqliteStore`], the SQLite implementation of [`ScreamStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use screams_core::{
  history::ScreamHistory,
  profile::{UserProfile, check_display_name},
  scream::{self, Scream},
  store::{ScreamStore, UserListQuery},
};

use crate::{
  encode::{
    HISTORY_COLUMNS, RawHistory, RawProfile, RawScream, SCREAM_COLUMNS,
    encode_dt, stored_precision,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Screams store backed by a single SQLite file.
///
/// Clones share one reference-counted connection.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Copy the stored state of scream `id` into the history table.
  ///
  /// Failures are logged and swallowed: an edit is never blocked by its
  /// snapshot.
  async fn snapshot_before_update(&self, id: i64) {
    let current = match self.get_scream(id).await {
      Ok(Some(current)) => current,
      Ok(None) => {
        tracing::warn!(scream_id = id, "no stored scream to snapshot");
        return;
      }
      Err(e) => {
        tracing::warn!(scream_id = id, error = %e, "failed to load scream for snapshot");
        return;
      }
    };

    if let Err(e) = self.record_history(&current).await {
      tracing::warn!(scream_id = id, error = %e, "failed to record scream history");
    }
  }

  async fn insert_user(
    &self,
    display_name: &str,
    password_hash: &str,
  ) -> Result<UserProfile> {
    let joined    = stored_precision(Utc::now());
    let name      = display_name.to_owned();
    let hash      = password_hash.to_owned();
    let joined_at = encode_dt(joined);

    let id: Option<i64> = self
      .conn
      .call(move |conn| {
        let inserted = conn.execute(
          "INSERT INTO Users (DisplayName, PasswordHash, DateJoined)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![name, hash, joined_at],
        );
        match inserted {
          Ok(_) => Ok(Some(conn.last_insert_rowid())),
          Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
          {
            Ok(None)
          }
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    let user_id =
      id.ok_or_else(|| Error::DisplayNameTaken(display_name.to_owned()))?;

    Ok(UserProfile {
      user_id,
      display_name: display_name.to_owned(),
      date_joined: joined,
    })
  }

  async fn find_user(&self, display_name: &str) -> Result<Option<RawProfile>> {
    let name = display_name.to_owned();

    let raw = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT ID, DisplayName, DateJoined, PasswordHash
             FROM Users WHERE DisplayName = ?1",
            rusqlite::params![name],
            RawProfile::from_row,
          )
          .optional()?)
      })
      .await?;

    Ok(raw)
  }
}

// ─── ScreamStore impl ────────────────────────────────────────────────────────

impl ScreamStore for SqliteStore {
  type Error = Error;

  // ── Scream lifecycle ──────────────────────────────────────────────────────

  async fn create_scream(&self, scream: Scream) -> Result<Scream> {
    let mut scream = scream.prepare_create()?;
    scream.date_created = stored_precision(scream.date_created);

    let body       = scream.body.clone();
    let created_at = encode_dt(scream.date_created);
    let parent_id  = scream.parent_id;
    let reply_to   = scream.reply_to_id;
    let source_app = scream.source_app_id;
    let views      = scream.total_views;
    let user_id    = scream.user_id;

    scream.id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO Screams (
             Body, DateCreated, ParentID, ReplyToID, SourceAppID, TotalViews, UserID
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            body, created_at, parent_id, reply_to, source_app, views, user_id
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    tracing::info!(scream_id = scream.id, user_id = scream.user_id, "scream created");
    Ok(scream)
  }

  async fn get_scream(&self, id: i64) -> Result<Option<Scream>> {
    scream::check_read(id)?;

    let raw: Option<RawScream> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {SCREAM_COLUMNS} FROM Screams WHERE ID = ?1"),
            rusqlite::params![id],
            RawScream::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawScream::into_scream).transpose()
  }

  async fn update_scream(&self, scream: Scream) -> Result<Scream> {
    scream.check_update()?;

    self.snapshot_before_update(scream.id).await;

    let mut scream = scream;
    scream.date_edited = Some(stored_precision(Utc::now()));

    let id         = scream.id;
    let body       = scream.body.clone();
    let edited_at  = scream.date_edited.map(encode_dt);
    let parent_id  = scream.parent_id;
    let reply_to   = scream.reply_to_id;
    let source_app = scream.source_app_id;
    let views      = scream.total_views;

    // DateCreated and UserID are fixed at creation and never rewritten.
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE Screams
           SET Body = ?1, DateEdited = ?2, ParentID = ?3, ReplyToID = ?4,
               SourceAppID = ?5, TotalViews = ?6
           WHERE ID = ?7",
          rusqlite::params![
            body, edited_at, parent_id, reply_to, source_app, views, id
          ],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::ScreamNotFound(id));
    }

    tracing::info!(scream_id = id, "scream updated");
    Ok(scream)
  }

  async fn delete_scream(&self, id: i64) -> Result<()> {
    scream::check_delete(id)?;

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM Screams WHERE ID = ?1",
          rusqlite::params![id],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::ScreamNotFound(id));
    }

    tracing::info!(scream_id = id, "scream deleted");
    Ok(())
  }

  // ── History ───────────────────────────────────────────────────────────────

  async fn record_history(&self, scream: &Scream) -> Result<ScreamHistory> {
    let mut history = ScreamHistory::snapshot(scream)
      .ok_or(screams_core::Error::InvalidHistory)?;
    history.check_create()?;
    history.date_recorded = stored_precision(history.date_recorded);

    let scream_id   = history.scream_id;
    let body        = history.body.clone();
    let created_at  = encode_dt(history.date_created);
    let edited_at   = history.date_edited.map(encode_dt);
    let recorded_at = encode_dt(history.date_recorded);
    let parent_id   = history.parent_id;
    let reply_to    = history.reply_to_id;
    let source_app  = history.source_app_id;
    let views       = history.total_views;
    let user_id     = history.user_id;

    history.id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO ScreamHistory (
             ScreamID, Body, DateCreated, DateEdited, DateRecorded,
             ParentID, ReplyToID, SourceAppID, TotalViews, UserID
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
          rusqlite::params![
            scream_id,
            body,
            created_at,
            edited_at,
            recorded_at,
            parent_id,
            reply_to,
            source_app,
            views,
            user_id,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    tracing::debug!(scream_id, history_id = history.id, "scream history recorded");
    Ok(history)
  }

  async fn get_scream_history(&self, scream_id: i64) -> Result<Vec<ScreamHistory>> {
    let raws: Vec<RawHistory> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {HISTORY_COLUMNS} FROM ScreamHistory WHERE ScreamID = ?1"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![scream_id], RawHistory::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawHistory::into_history).collect()
  }

  // ── Per-user queries ──────────────────────────────────────────────────────

  async fn get_user_scream_count(&self, user_id: i64) -> Result<i64> {
    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM Screams WHERE UserID = ?1",
          rusqlite::params![user_id],
          |row| row.get(0),
        )?)
      })
      .await?;
    Ok(count)
  }

  async fn get_user_screams(
    &self,
    user_id: i64,
    query:   &UserListQuery,
  ) -> Result<Vec<Scream>> {
    let mut sql = format!("SELECT {SCREAM_COLUMNS} FROM Screams WHERE UserID = ?1");
    let mut params = vec![user_id];

    // TODO: restrict order_column to SCREAM_COLUMNS and order_direction to
    // ASC/DESC once existing clients are audited for the values they send.
    if let Some(column) = &query.order_column {
      let direction = query.order_direction.as_deref().unwrap_or("DESC");
      sql.push_str(&format!(" ORDER BY `{column}` {direction}"));
    }

    if let Some((offset, limit)) = query.page() {
      // SQLite reads a negative LIMIT as unbounded and a negative OFFSET as 0.
      if offset < 0 || limit < 0 {
        return Err(Error::InvalidPage { offset, limit });
      }
      sql.push_str(" LIMIT ?2 OFFSET ?3");
      params.extend([limit, offset]);
    }

    tracing::debug!(%sql, "listing user screams");

    let raws: Vec<RawScream> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), RawScream::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawScream::into_scream).collect()
  }

  // ── User profiles ─────────────────────────────────────────────────────────

  async fn add_user(
    &self,
    display_name:  &str,
    password_hash: &str,
  ) -> Result<UserProfile> {
    check_display_name(display_name)?;
    let profile = self.insert_user(display_name, password_hash).await?;
    tracing::info!(user_id = profile.user_id, display_name, "user added");
    Ok(profile)
  }

  async fn profile_by_display_name(
    &self,
    display_name: &str,
  ) -> Result<Option<UserProfile>> {
    self
      .find_user(display_name)
      .await?
      .map(RawProfile::into_profile)
      .transpose()
  }

  async fn credentials_for(
    &self,
    display_name: &str,
  ) -> Result<Option<(UserProfile, String)>> {
    self
      .find_user(display_name)
      .await?
      .map(RawProfile::into_credentials)
      .transpose()
  }
}
