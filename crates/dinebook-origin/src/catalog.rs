//! In-memory catalog of restaurants and reviews served by the origin.

use std::{collections::BTreeMap, sync::Arc};

use chrono::Utc;
use dinebook_core::{
  review::{Rating, truncate_comments},
  wire::{WireNewReview, WireRestaurant, WireReview},
};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::OriginError;

/// Shared catalog handle threaded through all handlers.
pub type SharedCatalog = Arc<RwLock<Catalog>>;

/// Initial catalog contents, in the origin's wire format.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Seed {
  #[serde(default)]
  pub restaurants: Vec<WireRestaurant>,
  #[serde(default)]
  pub reviews:     Vec<WireReview>,
}

impl Seed {
  /// The sample data compiled into the binary.
  pub fn bundled() -> serde_json::Result<Self> {
    Self::from_json(include_str!("../data/seed.json"))
  }

  pub fn from_json(raw: &str) -> serde_json::Result<Self> { serde_json::from_str(raw) }
}

#[derive(Debug, Default)]
pub struct Catalog {
  restaurants:    BTreeMap<i64, WireRestaurant>,
  reviews:        Vec<WireReview>,
  next_review_id: i64,
}

impl Catalog {
  pub fn from_seed(seed: Seed) -> Self {
    let next_review_id = seed
      .reviews
      .iter()
      .filter_map(|r| r.id)
      .max()
      .unwrap_or(0)
      + 1;
    Self {
      restaurants: seed.restaurants.into_iter().map(|r| (r.id, r)).collect(),
      reviews: seed.reviews,
      next_review_id,
    }
  }

  pub fn shared(seed: Seed) -> SharedCatalog { Arc::new(RwLock::new(Self::from_seed(seed))) }

  pub fn restaurants(&self) -> Vec<WireRestaurant> { self.restaurants.values().cloned().collect() }

  pub fn restaurant(&self, id: i64) -> Option<&WireRestaurant> { self.restaurants.get(&id) }

  pub fn set_favorite(&mut self, id: i64, is_favorite: bool) -> Option<WireRestaurant> {
    let restaurant = self.restaurants.get_mut(&id)?;
    restaurant.is_favorite = is_favorite;
    restaurant.updated_at = Some(Utc::now());
    Some(restaurant.clone())
  }

  /// Reviews, optionally restricted to one restaurant, in creation order.
  pub fn reviews(&self, restaurant_id: Option<i64>) -> Vec<WireReview> {
    self
      .reviews
      .iter()
      .filter(|r| restaurant_id.is_none_or(|id| r.restaurant_id == id))
      .cloned()
      .collect()
  }

  /// Validate and store a posted review, assigning the next server id.
  pub fn add_review(&mut self, input: WireNewReview) -> Result<WireReview, OriginError> {
    if !self.restaurants.contains_key(&input.restaurant_id) {
      return Err(OriginError::NotFound(format!(
        "restaurant {}",
        input.restaurant_id
      )));
    }
    Rating::try_from(input.rating).map_err(|e| OriginError::BadRequest(e.to_string()))?;

    let now = Utc::now();
    let review = WireReview {
      id:            Some(self.next_review_id),
      restaurant_id: input.restaurant_id,
      name:          input.name,
      rating:        input.rating,
      comments:      truncate_comments(&input.comments),
      created_at:    Some(now),
      updated_at:    Some(now),
    };
    self.next_review_id += 1;
    self.reviews.push(review.clone());
    Ok(review)
  }
}
