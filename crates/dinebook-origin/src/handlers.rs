//! Route handlers for the origin API.

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
};
use dinebook_core::wire::{WireNewReview, WireRestaurant, WireReview};
use serde::Deserialize;

use crate::{OriginError, SharedCatalog};

/// `GET /restaurants`
pub async fn list_restaurants(
  State(catalog): State<SharedCatalog>,
) -> Json<Vec<WireRestaurant>> {
  Json(catalog.read().await.restaurants())
}

/// `GET /restaurants/{id}`
pub async fn get_restaurant(
  State(catalog): State<SharedCatalog>,
  Path(id): Path<i64>,
) -> Result<Json<WireRestaurant>, OriginError> {
  catalog
    .read()
    .await
    .restaurant(id)
    .cloned()
    .map(Json)
    .ok_or_else(|| OriginError::NotFound(format!("restaurant {id}")))
}

#[derive(Debug, Deserialize)]
pub struct FavoriteParams {
  pub is_favorite: bool,
}

/// `PUT /restaurants/{id}/?is_favorite={bool}`
pub async fn set_favorite(
  State(catalog): State<SharedCatalog>,
  Path(id): Path<i64>,
  Query(params): Query<FavoriteParams>,
) -> Result<Json<WireRestaurant>, OriginError> {
  let updated = catalog
    .write()
    .await
    .set_favorite(id, params.is_favorite)
    .ok_or_else(|| OriginError::NotFound(format!("restaurant {id}")))?;
  tracing::info!(restaurant_id = id, is_favorite = params.is_favorite, "favorite updated");
  Ok(Json(updated))
}

#[derive(Debug, Deserialize, Default)]
pub struct ReviewParams {
  pub restaurant_id: Option<i64>,
}

/// `GET /reviews[?restaurant_id={id}]`
pub async fn list_reviews(
  State(catalog): State<SharedCatalog>,
  Query(params): Query<ReviewParams>,
) -> Json<Vec<WireReview>> {
  Json(catalog.read().await.reviews(params.restaurant_id))
}

/// `POST /reviews`
pub async fn create_review(
  State(catalog): State<SharedCatalog>,
  Json(input): Json<WireNewReview>,
) -> Result<(StatusCode, Json<WireReview>), OriginError> {
  let review = catalog.write().await.add_review(input)?;
  tracing::info!(
    review_id = review.id,
    restaurant_id = review.restaurant_id,
    "review created"
  );
  Ok((StatusCode::CREATED, Json(review)))
}
