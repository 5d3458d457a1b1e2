//! The `RemoteGateway` trait: the stateless translator to the origin API.
//!
//! Every call is single-shot: implementations never retry. Retry policy, if
//! any, belongs to the caller.

use std::future::Future;

use crate::{
  restaurant::{Restaurant, RestaurantId},
  review::{NewReview, Review},
};

/// The origin accepted a request that carries no useful response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ack;

pub trait RemoteGateway: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// `GET /restaurants`
  fn fetch_restaurants(
    &self,
  ) -> impl Future<Output = Result<Vec<Restaurant>, Self::Error>> + Send + '_;

  /// `GET /reviews?restaurant_id={id}`
  fn fetch_reviews(
    &self,
    restaurant_id: RestaurantId,
  ) -> impl Future<Output = Result<Vec<Review>, Self::Error>> + Send + '_;

  /// `POST /reviews`; returns the review as created by the origin, carrying
  /// its server-assigned id.
  fn post_review<'a>(
    &'a self,
    review: &'a NewReview,
  ) -> impl Future<Output = Result<Review, Self::Error>> + Send + 'a;

  /// `PUT /restaurants/{id}/?is_favorite={bool}`
  fn set_favorite(
    &self,
    restaurant_id: RestaurantId,
    is_favorite: bool,
  ) -> impl Future<Output = Result<Ack, Self::Error>> + Send + '_;
}
