//! Encoding and decoding between domain types and SQLite rows.
//!
//! Timestamps are stored as RFC 3339 strings. Structured restaurant fields
//! (position, opening hours) are stored as compact JSON.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use dinebook_core::{
  restaurant::{LatLng, Restaurant, RestaurantId},
  review::{NewReview, PendingId, PendingReview, Rating, Review, ReviewId},
};
use rusqlite::{Connection, Row};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

fn decode_opt_dt(s: Option<&str>) -> Result<Option<DateTime<Utc>>> {
  s.map(decode_dt).transpose()
}

// ─── Restaurants ─────────────────────────────────────────────────────────────

/// Column values of one `restaurants` row.
pub struct RawRestaurant {
  pub id:              i64,
  pub name:            String,
  pub neighborhood:    String,
  pub cuisine_type:    String,
  pub address:         String,
  pub photograph:      Option<String>,
  pub latlng:          Option<String>,
  pub operating_hours: String,
  pub is_favorite:     bool,
  pub created_at:      Option<String>,
  pub updated_at:      Option<String>,
}

impl RawRestaurant {
  pub const SELECT: &'static str = "SELECT id, name, neighborhood, cuisine_type, address,
            photograph, latlng, operating_hours, is_favorite, created_at, updated_at
     FROM restaurants";

  pub fn encode(r: &Restaurant) -> Result<Self> {
    Ok(Self {
      id:              r.id.0,
      name:            r.name.clone(),
      neighborhood:    r.neighborhood.clone(),
      cuisine_type:    r.cuisine_type.clone(),
      address:         r.address.clone(),
      photograph:      r.photograph.clone(),
      latlng:          r.latlng.as_ref().map(serde_json::to_string).transpose()?,
      operating_hours: serde_json::to_string(&r.operating_hours)?,
      is_favorite:     r.is_favorite,
      created_at:      r.created_at.map(encode_dt),
      updated_at:      r.updated_at.map(encode_dt),
    })
  }

  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:              row.get(0)?,
      name:            row.get(1)?,
      neighborhood:    row.get(2)?,
      cuisine_type:    row.get(3)?,
      address:         row.get(4)?,
      photograph:      row.get(5)?,
      latlng:          row.get(6)?,
      operating_hours: row.get(7)?,
      is_favorite:     row.get(8)?,
      created_at:      row.get(9)?,
      updated_at:      row.get(10)?,
    })
  }

  /// Insert-or-replace keyed by `id`.
  pub fn upsert(&self, conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
      "INSERT OR REPLACE INTO restaurants (
         id, name, neighborhood, cuisine_type, address,
         photograph, latlng, operating_hours, is_favorite, created_at, updated_at
       ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
      rusqlite::params![
        self.id,
        self.name,
        self.neighborhood,
        self.cuisine_type,
        self.address,
        self.photograph,
        self.latlng,
        self.operating_hours,
        self.is_favorite,
        self.created_at,
        self.updated_at,
      ],
    )?;
    Ok(())
  }

  pub fn into_restaurant(self) -> Result<Restaurant> {
    let latlng: Option<LatLng> = self
      .latlng
      .as_deref()
      .map(serde_json::from_str)
      .transpose()?;
    let operating_hours: BTreeMap<String, String> =
      serde_json::from_str(&self.operating_hours)?;

    Ok(Restaurant {
      id: RestaurantId(self.id),
      name: self.name,
      neighborhood: self.neighborhood,
      cuisine_type: self.cuisine_type,
      address: self.address,
      photograph: self.photograph,
      latlng,
      operating_hours,
      is_favorite: self.is_favorite,
      created_at: decode_opt_dt(self.created_at.as_deref())?,
      updated_at: decode_opt_dt(self.updated_at.as_deref())?,
    })
  }
}

// ─── Reviews ─────────────────────────────────────────────────────────────────

/// Column values of one `reviews` row (minus the local key).
pub struct RawReview {
  pub id:            Option<i64>,
  pub restaurant_id: i64,
  pub name:          String,
  pub rating:        i64,
  pub comments:      String,
  pub created_at:    String,
  pub updated_at:    Option<String>,
}

impl RawReview {
  pub const SELECT: &'static str = "SELECT id, restaurant_id, name, rating, comments, created_at, updated_at
     FROM reviews";

  pub fn encode(r: &Review) -> Self {
    Self {
      id:            r.id.map(|id| id.0),
      restaurant_id: r.restaurant_id.0,
      name:          r.name.clone(),
      rating:        r.rating.into(),
      comments:      r.comments.clone(),
      created_at:    encode_dt(r.created_at),
      updated_at:    r.updated_at.map(encode_dt),
    }
  }

  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      restaurant_id: row.get(1)?,
      name:          row.get(2)?,
      rating:        row.get(3)?,
      comments:      row.get(4)?,
      created_at:    row.get(5)?,
      updated_at:    row.get(6)?,
    })
  }

  /// Replaces an earlier copy with the same server id; rows without one
  /// never conflict (`UNIQUE` ignores `NULL`) and are appended.
  pub fn upsert(&self, conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
      "INSERT OR REPLACE INTO reviews (
         id, restaurant_id, name, rating, comments, created_at, updated_at
       ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
      rusqlite::params![
        self.id,
        self.restaurant_id,
        self.name,
        self.rating,
        self.comments,
        self.created_at,
        self.updated_at,
      ],
    )?;
    Ok(())
  }

  pub fn into_review(self) -> Result<Review> {
    Ok(Review {
      id:            self.id.map(ReviewId),
      restaurant_id: RestaurantId(self.restaurant_id),
      name:          self.name,
      rating:        Rating::try_from(self.rating)?,
      comments:      self.comments,
      created_at:    decode_dt(&self.created_at)?,
      updated_at:    decode_opt_dt(self.updated_at.as_deref())?,
    })
  }
}

// ─── Pending reviews ─────────────────────────────────────────────────────────

/// Column values of one `pending_reviews` row.
pub struct RawPending {
  pub queue_id:      i64,
  pub restaurant_id: i64,
  pub name:          String,
  pub rating:        i64,
  pub comments:      String,
  pub created_at:    String,
}

impl RawPending {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      queue_id:      row.get(0)?,
      restaurant_id: row.get(1)?,
      name:          row.get(2)?,
      rating:        row.get(3)?,
      comments:      row.get(4)?,
      created_at:    row.get(5)?,
    })
  }

  pub fn into_pending(self) -> Result<PendingReview> {
    Ok(PendingReview {
      queue_id: PendingId(self.queue_id),
      review:   NewReview {
        restaurant_id: RestaurantId(self.restaurant_id),
        name:          self.name,
        rating:        Rating::try_from(self.rating)?,
        comments:      self.comments,
        created_at:    decode_dt(&self.created_at)?,
      },
    })
  }
}
