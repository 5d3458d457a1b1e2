//! SQL schema for the dinebook SQLite store.
//!
//! The schema is an ordered list of additive migrations. The applied version
//! is kept in `PRAGMA user_version`; on open, every step above it runs in
//! ascending order, each in its own transaction together with the version
//! bump. Steps only ever create tables and indexes.

use rusqlite::Connection;

/// Connection settings applied on every open, outside any migration.
pub const PRAGMAS: &str = "PRAGMA journal_mode = WAL;";

/// One additive schema step.
#[derive(Debug, Clone, Copy)]
pub struct Migration {
  pub version:     u32,
  pub description: &'static str,
  pub sql:         &'static str,
}

/// Every migration, in strictly ascending version order.
pub const MIGRATIONS: &[Migration] = &[
  Migration {
    version:     1,
    description: "create restaurants partition",
    sql:         "
CREATE TABLE IF NOT EXISTS restaurants (
    id              INTEGER PRIMARY KEY,     -- server-assigned
    name            TEXT NOT NULL,
    neighborhood    TEXT NOT NULL,
    cuisine_type    TEXT NOT NULL,
    address         TEXT NOT NULL DEFAULT '',
    photograph      TEXT,
    latlng          TEXT,                    -- JSON {lat, lng} or NULL
    operating_hours TEXT NOT NULL DEFAULT '{}',
    is_favorite     INTEGER NOT NULL DEFAULT 0,
    created_at      TEXT,                    -- RFC 3339 UTC
    updated_at      TEXT
);
",
  },
  Migration {
    version:     2,
    description: "create reviews partition with restaurant index",
    sql:         "
-- review_key is local; id is the server's and stays NULL for reviews the
-- origin has not echoed back.
CREATE TABLE IF NOT EXISTS reviews (
    review_key    INTEGER PRIMARY KEY AUTOINCREMENT,
    id            INTEGER UNIQUE,
    restaurant_id INTEGER NOT NULL,
    name          TEXT NOT NULL,
    rating        INTEGER NOT NULL,
    comments      TEXT NOT NULL,
    created_at    TEXT NOT NULL,
    updated_at    TEXT
);

CREATE INDEX IF NOT EXISTS reviews_restaurant_idx ON reviews(restaurant_id);
",
  },
  Migration {
    version:     3,
    description: "create pending reviews partition",
    sql:         "
CREATE TABLE IF NOT EXISTS pending_reviews (
    queue_id      INTEGER PRIMARY KEY AUTOINCREMENT,
    restaurant_id INTEGER NOT NULL,
    name          TEXT NOT NULL,
    rating        INTEGER NOT NULL,
    comments      TEXT NOT NULL,
    created_at    TEXT NOT NULL
);
",
  },
];

/// The version a fully migrated store reports.
pub fn latest_version() -> u32 {
  MIGRATIONS.last().map_or(0, |m| m.version)
}

/// Read the stored schema version.
pub fn stored_version(conn: &Connection) -> rusqlite::Result<u32> {
  conn.query_row("PRAGMA user_version", [], |row| row.get(0))
}

/// Apply every migration newer than the stored version and return the
/// resulting version.
///
/// A store already ahead of [`latest_version`] is left untouched and its
/// version returned as-is; the caller decides whether that is acceptable.
pub fn migrate(conn: &mut Connection) -> rusqlite::Result<u32> {
  conn.execute_batch(PRAGMAS)?;

  let stored = stored_version(conn)?;
  let mut version = stored;
  for step in MIGRATIONS.iter().filter(|m| m.version > stored) {
    let tx = conn.transaction()?;
    tx.execute_batch(step.sql)?;
    tx.pragma_update(None, "user_version", step.version)?;
    tx.commit()?;

    tracing::info!(version = step.version, "applied migration: {}", step.description);
    version = step.version;
  }
  Ok(version)
}
