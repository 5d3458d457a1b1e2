//! [`SqliteStore`]: the SQLite implementation of [`LocalStore`].

use std::path::Path;

use dinebook_core::{
  restaurant::{Restaurant, RestaurantId},
  review::{NewReview, PendingId, PendingReview, Review},
  store::{LocalStore, Partition},
};
use rusqlite::OptionalExtension as _;

use crate::{
  Error, Result,
  encode::{RawPending, RawRestaurant, RawReview, encode_dt},
  schema,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A dinebook local store backed by a single SQLite file.
///
/// Clones share one reference-counted connection.
#[derive(Clone)]
pub struct SqliteStore {
  conn:           tokio_rusqlite::Connection,
  schema_version: u32,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and bring its schema up to date.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let label = path.as_ref().display().to_string();
    let conn = tokio_rusqlite::Connection::open(path)
      .await
      .map_err(|source| Error::Unavailable { path: label.clone(), source })?;
    Self::init(conn, label).await
  }

  /// Open a fresh in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory()
      .await
      .map_err(|source| Error::Unavailable { path: ":memory:".into(), source })?;
    Self::init(conn, ":memory:".into()).await
  }

  async fn init(conn: tokio_rusqlite::Connection, label: String) -> Result<Self> {
    let schema_version = conn
      .call(|conn| Ok(schema::migrate(conn)?))
      .await
      .map_err(|source| Error::Unavailable { path: label, source })?;

    let supported = schema::latest_version();
    if schema_version > supported {
      return Err(Error::FutureSchema { found: schema_version, supported });
    }

    Ok(Self { conn, schema_version })
  }
}

// ─── LocalStore impl ─────────────────────────────────────────────────────────

impl LocalStore for SqliteStore {
  type Error = Error;

  async fn schema_version(&self) -> Result<u32> { Ok(self.schema_version) }

  // ── Restaurants ───────────────────────────────────────────────────────────

  async fn all_restaurants(&self) -> Result<Vec<Restaurant>> {
    let raws: Vec<RawRestaurant> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!("{} ORDER BY id", RawRestaurant::SELECT))?;
        let rows = stmt
          .query_map([], RawRestaurant::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRestaurant::into_restaurant).collect()
  }

  async fn get_restaurant(&self, id: RestaurantId) -> Result<Option<Restaurant>> {
    let raw: Option<RawRestaurant> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("{} WHERE id = ?1", RawRestaurant::SELECT),
              rusqlite::params![id.0],
              RawRestaurant::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawRestaurant::into_restaurant).transpose()
  }

  async fn put_restaurant(&self, restaurant: &Restaurant) -> Result<()> {
    let raw = RawRestaurant::encode(restaurant)?;
    self
      .conn
      .call(move |conn| {
        raw.upsert(conn)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn put_restaurants(&self, restaurants: &[Restaurant]) -> Result<()> {
    let raws = restaurants
      .iter()
      .map(RawRestaurant::encode)
      .collect::<Result<Vec<_>>>()?;
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        for raw in &raws {
          raw.upsert(&tx)?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Reviews ───────────────────────────────────────────────────────────────

  async fn all_reviews(&self) -> Result<Vec<Review>> {
    let raws: Vec<RawReview> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!("{} ORDER BY review_key", RawReview::SELECT))?;
        let rows = stmt
          .query_map([], RawReview::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawReview::into_review).collect()
  }

  async fn reviews_for(&self, restaurant_id: RestaurantId) -> Result<Vec<Review>> {
    let raws: Vec<RawReview> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "{} WHERE restaurant_id = ?1 ORDER BY review_key",
          RawReview::SELECT
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![restaurant_id.0], RawReview::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawReview::into_review).collect()
  }

  async fn put_review(&self, review: &Review) -> Result<()> {
    let raw = RawReview::encode(review);
    self
      .conn
      .call(move |conn| {
        raw.upsert(conn)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn put_reviews(&self, reviews: &[Review]) -> Result<()> {
    let raws: Vec<RawReview> = reviews.iter().map(RawReview::encode).collect();
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        for raw in &raws {
          raw.upsert(&tx)?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Pending queue ─────────────────────────────────────────────────────────

  async fn pending_reviews(&self) -> Result<Vec<PendingReview>> {
    let raws: Vec<RawPending> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT queue_id, restaurant_id, name, rating, comments, created_at
           FROM pending_reviews
           ORDER BY queue_id",
        )?;
        let rows = stmt
          .query_map([], RawPending::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPending::into_pending).collect()
  }

  async fn put_pending(&self, review: &NewReview) -> Result<PendingReview> {
    let restaurant_id = review.restaurant_id.0;
    let name          = review.name.clone();
    let rating        = i64::from(review.rating);
    let comments      = review.comments.clone();
    let created_at    = encode_dt(review.created_at);

    let queue_id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO pending_reviews (restaurant_id, name, rating, comments, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![restaurant_id, name, rating, comments, created_at],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(PendingReview { queue_id: PendingId(queue_id), review: review.clone() })
  }

  async fn remove_pending(&self, ids: &[PendingId]) -> Result<()> {
    let ids: Vec<i64> = ids.iter().map(|id| id.0).collect();
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        for id in &ids {
          tx.execute(
            "DELETE FROM pending_reviews WHERE queue_id = ?1",
            rusqlite::params![id],
          )?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Maintenance ───────────────────────────────────────────────────────────

  async fn clear(&self, partition: Partition) -> Result<()> {
    let sql = match partition {
      Partition::Restaurants => "DELETE FROM restaurants",
      Partition::Reviews => "DELETE FROM reviews",
      Partition::Pending => "DELETE FROM pending_reviews",
    };
    self
      .conn
      .call(move |conn| {
        conn.execute(sql, [])?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
