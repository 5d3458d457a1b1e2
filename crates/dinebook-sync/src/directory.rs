//! [`Directory`]: the entry point for UI collaborators.
//!
//! Bundles an orchestrator with the connectivity watcher that feeds it and
//! layers the query helpers from [`dinebook_core::query`] on top of the
//! cache-first reads.

use std::sync::Arc;

use dinebook_core::{
  gateway::RemoteGateway,
  query::{self, Selection},
  restaurant::{Restaurant, RestaurantId},
  review::{NewReview, PendingReview, Review},
  store::LocalStore,
};
use tokio::sync::mpsc;

use crate::{
  ConnectivityWatcher, NetworkState, ReplayReport, Result, SubmitOutcome, SyncConfig,
  SyncError, SyncOrchestrator,
};

pub struct Directory<L, G> {
  orchestrator: SyncOrchestrator<L, G>,
  watcher:      ConnectivityWatcher,
}

impl<L, G> Directory<L, G>
where
  L: LocalStore,
  G: RemoteGateway,
{
  pub fn new(store: Arc<L>, gateway: Arc<G>, initial: NetworkState, config: SyncConfig) -> Self {
    let watcher = ConnectivityWatcher::new(initial);
    let orchestrator = SyncOrchestrator::new(store, gateway, watcher.subscribe(), config);
    Self { orchestrator, watcher }
  }

  // ── Restaurants ───────────────────────────────────────────────────────

  pub async fn fetch_restaurants(&self) -> Result<Vec<Restaurant>> {
    self.orchestrator.fetch_restaurants().await
  }

  pub async fn fetch_restaurant_by_id(&self, id: RestaurantId) -> Result<Restaurant> {
    let restaurants = self.fetch_restaurants().await?;
    query::find_by_id(&restaurants, id)
      .cloned()
      .ok_or(SyncError::NotFound(id))
  }

  pub async fn fetch_restaurants_by_cuisine(&self, cuisine: &str) -> Result<Vec<Restaurant>> {
    let restaurants = self.fetch_restaurants().await?;
    Ok(query::filter_by_cuisine(&restaurants, cuisine))
  }

  pub async fn fetch_restaurants_by_neighborhood(
    &self,
    neighborhood: &str,
  ) -> Result<Vec<Restaurant>> {
    let restaurants = self.fetch_restaurants().await?;
    Ok(query::filter_by_neighborhood(&restaurants, neighborhood))
  }

  pub async fn fetch_restaurants_by_cuisine_and_neighborhood(
    &self,
    cuisine: &Selection,
    neighborhood: &Selection,
  ) -> Result<Vec<Restaurant>> {
    let restaurants = self.fetch_restaurants().await?;
    Ok(query::filter_by(&restaurants, cuisine, neighborhood))
  }

  pub async fn fetch_neighborhoods(&self) -> Result<Vec<String>> {
    Ok(query::distinct_neighborhoods(&self.fetch_restaurants().await?))
  }

  pub async fn fetch_cuisines(&self) -> Result<Vec<String>> {
    Ok(query::distinct_cuisines(&self.fetch_restaurants().await?))
  }

  // ── Reviews ───────────────────────────────────────────────────────────

  pub async fn fetch_reviews(&self, restaurant_id: RestaurantId) -> Result<Vec<Review>> {
    self.orchestrator.fetch_reviews_for(restaurant_id).await
  }

  /// Validate user input and hand the review to the orchestrator.
  pub async fn submit_review(
    &self,
    restaurant_id: RestaurantId,
    name: impl Into<String>,
    rating: i64,
    comments: &str,
  ) -> Result<SubmitOutcome> {
    let review = NewReview::new(restaurant_id, name, rating, comments)?;
    self.orchestrator.submit_review(review).await
  }

  pub async fn set_favorite(
    &self,
    restaurant_id: RestaurantId,
    is_favorite: bool,
  ) -> Result<Option<Restaurant>> {
    self.orchestrator.set_favorite(restaurant_id, is_favorite).await
  }

  pub async fn pending_reviews(&self) -> Result<Vec<PendingReview>> {
    self.orchestrator.pending_reviews().await
  }

  /// Replay the pending partition now, regardless of transitions.
  ///
  /// Returns `None` when a replay was already running; that pass picks up
  /// the request as its follow-up.
  pub async fn flush_pending(&self) -> Result<Option<ReplayReport>> {
    self.watcher.flush(&self.orchestrator).await
  }

  // ── Connectivity ──────────────────────────────────────────────────────

  pub fn network_state(&self) -> NetworkState { self.watcher.state() }

  pub async fn go_online(&self) -> Result<Option<ReplayReport>> {
    self.watcher.signal(NetworkState::Online, &self.orchestrator).await
  }

  pub async fn go_offline(&self) -> Result<()> {
    self
      .watcher
      .signal(NetworkState::Offline, &self.orchestrator)
      .await
      .map(|_| ())
  }

  /// See [`ConnectivityWatcher::run`].
  pub async fn run_connectivity(&self, signals: mpsc::Receiver<NetworkState>) {
    self.watcher.run(&self.orchestrator, signals).await
  }
}
