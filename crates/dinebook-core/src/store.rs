//! The `LocalStore` trait: the persistent, partitioned cache.
//!
//! The trait is implemented by storage backends (e.g.
//! `dinebook-store-sqlite`). The sync layer is the only writer; it depends on
//! this abstraction, not on a concrete backend.

use std::{fmt, future::Future};

use crate::{
  restaurant::{Restaurant, RestaurantId},
  review::{NewReview, PendingId, PendingReview, Review},
};

/// A named subdivision of the local store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partition {
  /// Restaurants keyed by their server id.
  Restaurants,
  /// Confirmed and locally-created reviews, indexed by restaurant.
  Reviews,
  /// Reviews written while offline, waiting for replay.
  Pending,
}

impl Partition {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Restaurants => "restaurants",
      Self::Reviews => "reviews",
      Self::Pending => "pending",
    }
  }
}

impl fmt::Display for Partition {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Abstraction over a local store backend.
///
/// Every `put` is insert-or-replace keyed by the record's identity. Records
/// without an identity (locally created reviews, pending reviews) get a key
/// assigned by the store.
///
/// All methods return `Send` futures so the trait can be used from
/// multi-threaded async runtimes.
pub trait LocalStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// The schema version the store was migrated to when it was opened.
  fn schema_version(
    &self,
  ) -> impl Future<Output = Result<u32, Self::Error>> + Send + '_;

  // ── Restaurants ───────────────────────────────────────────────────────

  fn all_restaurants(
    &self,
  ) -> impl Future<Output = Result<Vec<Restaurant>, Self::Error>> + Send + '_;

  /// Retrieve a restaurant by id. Returns `None` if not cached.
  fn get_restaurant(
    &self,
    id: RestaurantId,
  ) -> impl Future<Output = Result<Option<Restaurant>, Self::Error>> + Send + '_;

  fn put_restaurant<'a>(
    &'a self,
    restaurant: &'a Restaurant,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Insert-or-replace a batch of restaurants in a single transaction.
  fn put_restaurants<'a>(
    &'a self,
    restaurants: &'a [Restaurant],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Reviews ───────────────────────────────────────────────────────────

  fn all_reviews(
    &self,
  ) -> impl Future<Output = Result<Vec<Review>, Self::Error>> + Send + '_;

  /// All reviews of one restaurant, looked up through the restaurant index.
  fn reviews_for(
    &self,
    restaurant_id: RestaurantId,
  ) -> impl Future<Output = Result<Vec<Review>, Self::Error>> + Send + '_;

  /// Store a review. Reviews carrying a server id replace any earlier copy
  /// with the same id; reviews without one are always appended.
  fn put_review<'a>(
    &'a self,
    review: &'a Review,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// [`put_review`](Self::put_review) for a batch, in a single transaction.
  fn put_reviews<'a>(
    &'a self,
    reviews: &'a [Review],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Pending queue ─────────────────────────────────────────────────────

  /// Pending reviews in submission (FIFO) order.
  fn pending_reviews(
    &self,
  ) -> impl Future<Output = Result<Vec<PendingReview>, Self::Error>> + Send + '_;

  /// Append a review to the pending queue.
  fn put_pending<'a>(
    &'a self,
    review: &'a NewReview,
  ) -> impl Future<Output = Result<PendingReview, Self::Error>> + Send + 'a;

  /// Drop specific entries from the pending queue. Unknown ids are ignored.
  fn remove_pending<'a>(
    &'a self,
    ids: &'a [PendingId],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Maintenance ───────────────────────────────────────────────────────

  /// Remove every record from `partition`.
  fn clear(
    &self,
    partition: Partition,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
