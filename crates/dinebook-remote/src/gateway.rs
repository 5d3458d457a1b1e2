//! Async HTTP client for the origin's JSON API.

use std::time::Duration;

use dinebook_core::{
  gateway::{Ack, RemoteGateway},
  restaurant::{Restaurant, RestaurantId},
  review::{NewReview, Review},
  wire::{self, WireNewReview},
};
use reqwest::{Client, RequestBuilder};

use crate::{Error, Result};

/// Connection settings for the origin API.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
  pub base_url: String,
  pub timeout:  Duration,
}

impl GatewayConfig {
  pub fn new(base_url: impl Into<String>) -> Self {
    Self { base_url: base_url.into(), timeout: Duration::from_secs(30) }
  }
}

/// HTTP implementation of [`RemoteGateway`].
///
/// The inner [`reqwest::Client`] is `Arc`-based, so clones share a pool.
#[derive(Clone)]
pub struct HttpGateway {
  client: Client,
  config: GatewayConfig,
}

impl HttpGateway {
  pub fn new(config: GatewayConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(config.timeout)
      .build()
      .map_err(Error::Client)?;
    Ok(Self { client, config })
  }

  pub fn base_url(&self) -> &str { &self.config.base_url }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  /// Send `req` and return the body of a successful response.
  async fn send(&self, endpoint: &'static str, req: RequestBuilder) -> Result<String> {
    tracing::debug!(endpoint, "origin request");

    let resp = req
      .send()
      .await
      .map_err(|source| Error::Request { endpoint, source })?;

    let status = resp.status();
    if !status.is_success() {
      return Err(Error::Status { endpoint, status });
    }

    resp
      .text()
      .await
      .map_err(|source| Error::Request { endpoint, source })
  }
}

fn decoded<T>(endpoint: &'static str, result: dinebook_core::Result<T>) -> Result<T> {
  result.map_err(|source| Error::Decode { endpoint, source })
}

impl RemoteGateway for HttpGateway {
  type Error = Error;

  async fn fetch_restaurants(&self) -> Result<Vec<Restaurant>> {
    const ENDPOINT: &str = "GET /restaurants";
    let body = self
      .send(ENDPOINT, self.client.get(self.url("/restaurants")))
      .await?;
    decoded(ENDPOINT, wire::decode_restaurants(&body))
  }

  async fn fetch_reviews(&self, restaurant_id: RestaurantId) -> Result<Vec<Review>> {
    const ENDPOINT: &str = "GET /reviews";
    let req = self
      .client
      .get(self.url("/reviews"))
      .query(&[("restaurant_id", restaurant_id.0)]);
    let body = self.send(ENDPOINT, req).await?;
    decoded(ENDPOINT, wire::decode_reviews(&body))
  }

  async fn post_review(&self, review: &NewReview) -> Result<Review> {
    const ENDPOINT: &str = "POST /reviews";
    let req = self
      .client
      .post(self.url("/reviews"))
      .json(&WireNewReview::from(review));
    let body = self.send(ENDPOINT, req).await?;
    decoded(ENDPOINT, wire::decode_review(&body))
  }

  async fn set_favorite(&self, restaurant_id: RestaurantId, is_favorite: bool) -> Result<Ack> {
    const ENDPOINT: &str = "PUT /restaurants/{id}";
    let req = self
      .client
      .put(self.url(&format!("/restaurants/{restaurant_id}/")))
      .query(&[("is_favorite", is_favorite)]);
    self.send(ENDPOINT, req).await?;
    Ok(Ack)
  }
}
