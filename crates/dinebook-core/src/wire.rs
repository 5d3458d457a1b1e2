//! The origin's JSON schema and its translation to domain types.
//!
//! The origin is loose about types: flags arrive as `"true"`/`"false"`
//! strings, integers as numeric strings, timestamps as epoch milliseconds
//! under camel-cased keys. Decoding accepts all of those; encoding always
//! emits proper JSON types.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Result,
  restaurant::{LatLng, Restaurant, RestaurantId},
  review::{NewReview, Rating, Review, ReviewId},
};

// ─── Restaurants ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireRestaurant {
  #[serde(deserialize_with = "lenient::int")]
  pub id:              i64,
  #[serde(default)]
  pub name:            String,
  #[serde(default)]
  pub neighborhood:    String,
  #[serde(default)]
  pub cuisine_type:    String,
  #[serde(default)]
  pub address:         String,
  #[serde(
    default,
    deserialize_with = "lenient::opt_text",
    skip_serializing_if = "Option::is_none"
  )]
  pub photograph:      Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub latlng:          Option<LatLng>,
  #[serde(default)]
  pub operating_hours: BTreeMap<String, String>,
  #[serde(default, deserialize_with = "lenient::flag")]
  pub is_favorite:     bool,
  #[serde(
    default,
    rename = "createdAt",
    alias = "created_at",
    deserialize_with = "lenient::opt_timestamp",
    skip_serializing_if = "Option::is_none"
  )]
  pub created_at:      Option<DateTime<Utc>>,
  #[serde(
    default,
    rename = "updatedAt",
    alias = "updated_at",
    deserialize_with = "lenient::opt_timestamp",
    skip_serializing_if = "Option::is_none"
  )]
  pub updated_at:      Option<DateTime<Utc>>,
}

impl From<WireRestaurant> for Restaurant {
  fn from(w: WireRestaurant) -> Self {
    Self {
      id:              RestaurantId(w.id),
      name:            w.name,
      neighborhood:    w.neighborhood,
      cuisine_type:    w.cuisine_type,
      address:         w.address,
      photograph:      w.photograph,
      latlng:          w.latlng,
      operating_hours: w.operating_hours,
      is_favorite:     w.is_favorite,
      created_at:      w.created_at,
      updated_at:      w.updated_at,
    }
  }
}

impl From<&Restaurant> for WireRestaurant {
  fn from(r: &Restaurant) -> Self {
    Self {
      id:              r.id.0,
      name:            r.name.clone(),
      neighborhood:    r.neighborhood.clone(),
      cuisine_type:    r.cuisine_type.clone(),
      address:         r.address.clone(),
      photograph:      r.photograph.clone(),
      latlng:          r.latlng,
      operating_hours: r.operating_hours.clone(),
      is_favorite:     r.is_favorite,
      created_at:      r.created_at,
      updated_at:      r.updated_at,
    }
  }
}

// ─── Reviews ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireReview {
  #[serde(
    default,
    deserialize_with = "lenient::opt_int",
    skip_serializing_if = "Option::is_none"
  )]
  pub id:            Option<i64>,
  #[serde(deserialize_with = "lenient::int")]
  pub restaurant_id: i64,
  #[serde(default)]
  pub name:          String,
  #[serde(deserialize_with = "lenient::int")]
  pub rating:        i64,
  #[serde(default)]
  pub comments:      String,
  #[serde(
    default,
    rename = "createdAt",
    alias = "created_at",
    deserialize_with = "lenient::opt_timestamp",
    skip_serializing_if = "Option::is_none"
  )]
  pub created_at:    Option<DateTime<Utc>>,
  #[serde(
    default,
    rename = "updatedAt",
    alias = "updated_at",
    deserialize_with = "lenient::opt_timestamp",
    skip_serializing_if = "Option::is_none"
  )]
  pub updated_at:    Option<DateTime<Utc>>,
}

impl TryFrom<WireReview> for Review {
  type Error = crate::Error;

  fn try_from(w: WireReview) -> Result<Self> {
    Ok(Self {
      id:            w.id.map(ReviewId),
      restaurant_id: RestaurantId(w.restaurant_id),
      name:          w.name,
      rating:        Rating::try_from(w.rating)?,
      comments:      w.comments,
      // Reviews the origin never stamped are treated as created on receipt.
      created_at:    w.created_at.unwrap_or_else(Utc::now),
      updated_at:    w.updated_at,
    })
  }
}

/// Body of `POST /reviews`. `restaurant_id` and `rating` are always sent as
/// integers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireNewReview {
  #[serde(deserialize_with = "lenient::int")]
  pub restaurant_id: i64,
  #[serde(default)]
  pub name:          String,
  #[serde(deserialize_with = "lenient::int")]
  pub rating:        i64,
  #[serde(default)]
  pub comments:      String,
}

impl From<&NewReview> for WireNewReview {
  fn from(r: &NewReview) -> Self {
    Self {
      restaurant_id: r.restaurant_id.0,
      name:          r.name.clone(),
      rating:        r.rating.into(),
      comments:      r.comments.clone(),
    }
  }
}

// ─── Body decoding ───────────────────────────────────────────────────────────

/// Decode a `GET /restaurants` response body.
pub fn decode_restaurants(body: &str) -> Result<Vec<Restaurant>> {
  let wire: Vec<WireRestaurant> = serde_json::from_str(body)?;
  Ok(wire.into_iter().map(Restaurant::from).collect())
}

/// Decode a `GET /reviews` response body.
pub fn decode_reviews(body: &str) -> Result<Vec<Review>> {
  let wire: Vec<WireReview> = serde_json::from_str(body)?;
  wire.into_iter().map(Review::try_from).collect()
}

/// Decode a single review, e.g. the echo of `POST /reviews`.
pub fn decode_review(body: &str) -> Result<Review> {
  let wire: WireReview = serde_json::from_str(body)?;
  Review::try_from(wire)
}

// ─── Lenient field decoders ──────────────────────────────────────────────────

mod lenient {
  use chrono::{DateTime, Utc};
  use serde::{Deserialize, Deserializer, de::Error as _};

  #[derive(Deserialize)]
  #[serde(untagged)]
  enum Int {
    Number(i64),
    Text(String),
  }

  impl Int {
    fn resolve<E: serde::de::Error>(self) -> Result<i64, E> {
      match self {
        Self::Number(n) => Ok(n),
        Self::Text(s) => s
          .trim()
          .parse()
          .map_err(|_| E::custom(format!("expected an integer, got {s:?}"))),
      }
    }
  }

  pub fn int<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    Int::deserialize(d)?.resolve()
  }

  pub fn opt_int<'de, D: Deserializer<'de>>(
    d: D,
  ) -> Result<Option<i64>, D::Error> {
    Option::<Int>::deserialize(d)?.map(Int::resolve).transpose()
  }

  #[derive(Deserialize)]
  #[serde(untagged)]
  enum Flag {
    Bool(bool),
    Text(String),
  }

  pub fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    match Option::<Flag>::deserialize(d)? {
      None => Ok(false),
      Some(Flag::Bool(b)) => Ok(b),
      Some(Flag::Text(s)) => match s.trim() {
        "true" => Ok(true),
        "false" | "" => Ok(false),
        other => Err(D::Error::custom(format!(
          "expected a boolean, got {other:?}"
        ))),
      },
    }
  }

  #[derive(Deserialize)]
  #[serde(untagged)]
  enum TextOrNumber {
    Text(String),
    Number(serde_json::Number),
  }

  pub fn opt_text<'de, D: Deserializer<'de>>(
    d: D,
  ) -> Result<Option<String>, D::Error> {
    Ok(Option::<TextOrNumber>::deserialize(d)?.map(|v| match v {
      TextOrNumber::Text(s) => s,
      TextOrNumber::Number(n) => n.to_string(),
    }))
  }

  #[derive(Deserialize)]
  #[serde(untagged)]
  enum Timestamp {
    Millis(i64),
    Text(String),
  }

  pub fn opt_timestamp<'de, D: Deserializer<'de>>(
    d: D,
  ) -> Result<Option<DateTime<Utc>>, D::Error> {
    match Option::<Timestamp>::deserialize(d)? {
      None => Ok(None),
      Some(Timestamp::Millis(ms)) => DateTime::from_timestamp_millis(ms)
        .map(Some)
        .ok_or_else(|| D::Error::custom(format!("timestamp out of range: {ms}"))),
      Some(Timestamp::Text(s)) => DateTime::parse_from_rfc3339(&s)
        .map(|dt| Some(dt.with_timezone(&Utc)))
        .map_err(D::Error::custom),
    }
  }
}
