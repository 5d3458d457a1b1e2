//! The sync orchestrator: the single writer of the local store.
//!
//! Reads are strictly cache-first with write-through on a miss. Review
//! submissions are persisted locally before anything else happens and, while
//! offline, queued in the pending partition for a later
//! [`flush_pending`](SyncOrchestrator::flush_pending).

use std::sync::Arc;

use dinebook_core::{
  gateway::RemoteGateway,
  query,
  restaurant::{Restaurant, RestaurantId},
  review::{NewReview, PendingId, PendingReview, Review},
  store::LocalStore,
};
use tokio::sync::watch;

use crate::{NetworkState, Result, SyncConfig, SyncError};

/// What happened to a submitted review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
  /// The origin accepted the review; carries the copy it created.
  Posted(Review),
  /// The review is waiting in the pending partition.
  Queued(PendingReview),
}

/// Result of one pass over the pending partition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayReport {
  pub posted:    usize,
  /// Entries still pending after the pass.
  pub remaining: usize,
}

impl ReplayReport {
  /// Fold a follow-up pass into this one.
  pub fn merge(self, next: ReplayReport) -> Self {
    Self { posted: self.posted + next.posted, remaining: next.remaining }
  }
}

pub struct SyncOrchestrator<L, G> {
  store:   Arc<L>,
  gateway: Arc<G>,
  network: watch::Receiver<NetworkState>,
  config:  SyncConfig,
}

impl<L, G> SyncOrchestrator<L, G>
where
  L: LocalStore,
  G: RemoteGateway,
{
  pub fn new(
    store: Arc<L>,
    gateway: Arc<G>,
    network: watch::Receiver<NetworkState>,
    config: SyncConfig,
  ) -> Self {
    Self { store, gateway, network, config }
  }

  /// The connectivity state as last published by the watcher.
  pub fn network_state(&self) -> NetworkState { *self.network.borrow() }

  // ── Reads ─────────────────────────────────────────────────────────────

  pub async fn fetch_restaurants(&self) -> Result<Vec<Restaurant>> {
    let cached = self.store.all_restaurants().await.map_err(SyncError::store)?;
    if !cached.is_empty() {
      tracing::debug!(count = cached.len(), "restaurants served from cache");
      return Ok(cached);
    }

    tracing::debug!("restaurant cache empty; fetching from origin");
    let fetched = self.gateway.fetch_restaurants().await.map_err(|e| {
      tracing::warn!(error = %e, "restaurant fetch failed");
      SyncError::network(e)
    })?;
    self
      .store
      .put_restaurants(&fetched)
      .await
      .map_err(SyncError::store)?;
    Ok(fetched)
  }

  pub async fn fetch_reviews_for(&self, restaurant_id: RestaurantId) -> Result<Vec<Review>> {
    let cached = self
      .store
      .reviews_for(restaurant_id)
      .await
      .map_err(SyncError::store)?;
    if !cached.is_empty() {
      tracing::debug!(%restaurant_id, count = cached.len(), "reviews served from cache");
      return Ok(cached);
    }

    tracing::debug!(%restaurant_id, "no cached reviews; fetching from origin");
    let fetched = self.gateway.fetch_reviews(restaurant_id).await.map_err(|e| {
      tracing::warn!(%restaurant_id, error = %e, "review fetch failed");
      SyncError::network(e)
    })?;
    self.store.put_reviews(&fetched).await.map_err(SyncError::store)?;
    Ok(fetched)
  }

  pub async fn pending_reviews(&self) -> Result<Vec<PendingReview>> {
    self.store.pending_reviews().await.map_err(SyncError::store)
  }

  // ── Writes ────────────────────────────────────────────────────────────

  /// Persist `review` locally, then either post it or queue it depending on
  /// the current connectivity state.
  ///
  /// The restaurant is resolved through [`fetch_restaurants`](Self::fetch_restaurants),
  /// so a cold cache is filled before the lookup.
  pub async fn submit_review(&self, review: NewReview) -> Result<SubmitOutcome> {
    let restaurant_id = review.restaurant_id;
    let restaurants = self.fetch_restaurants().await?;
    if query::find_by_id(&restaurants, restaurant_id).is_none() {
      return Err(SyncError::NotFound(restaurant_id));
    }

    self
      .store
      .put_review(&Review::from(review.clone()))
      .await
      .map_err(SyncError::store)?;

    if self.network_state() == NetworkState::Offline {
      let queued = self.enqueue(&review).await?;
      tracing::info!(%restaurant_id, queue_id = queued.queue_id.0, "offline; review queued");
      return Ok(SubmitOutcome::Queued(queued));
    }

    match self.gateway.post_review(&review).await {
      Ok(created) => {
        tracing::info!(%restaurant_id, review_id = ?created.id, "review posted");
        Ok(SubmitOutcome::Posted(created))
      }
      Err(e) if self.config.demote_failed_submissions => {
        tracing::warn!(%restaurant_id, error = %e, "review post failed; queued for replay");
        Ok(SubmitOutcome::Queued(self.enqueue(&review).await?))
      }
      Err(e) => {
        tracing::warn!(%restaurant_id, error = %e, "review post failed");
        Err(SyncError::network(e))
      }
    }
  }

  async fn enqueue(&self, review: &NewReview) -> Result<PendingReview> {
    self.store.put_pending(review).await.map_err(SyncError::store)
  }

  /// Toggle the favorite flag on the origin, then mirror it locally.
  ///
  /// Returns the updated cached restaurant, or `None` if the restaurant was
  /// not cached.
  pub async fn set_favorite(
    &self,
    restaurant_id: RestaurantId,
    is_favorite: bool,
  ) -> Result<Option<Restaurant>> {
    self
      .gateway
      .set_favorite(restaurant_id, is_favorite)
      .await
      .map_err(|e| {
        tracing::warn!(%restaurant_id, error = %e, "favorite update failed");
        SyncError::network(e)
      })?;

    let Some(mut restaurant) = self
      .store
      .get_restaurant(restaurant_id)
      .await
      .map_err(SyncError::store)?
    else {
      tracing::debug!(%restaurant_id, "favorite acknowledged for uncached restaurant");
      return Ok(None);
    };

    restaurant.is_favorite = is_favorite;
    self
      .store
      .put_restaurant(&restaurant)
      .await
      .map_err(SyncError::store)?;
    Ok(Some(restaurant))
  }

  // ── Replay ────────────────────────────────────────────────────────────

  /// Post every pending review in FIFO order, stopping at the first failure.
  ///
  /// Entries are removed only after all attempted posts have returned, and
  /// only the ones that were delivered. Entries queued while the pass was
  /// running are left for the next one.
  pub async fn flush_pending(&self) -> Result<ReplayReport> {
    let pending = self.pending_reviews().await?;
    if pending.is_empty() {
      tracing::debug!("nothing pending");
      return Ok(ReplayReport::default());
    }

    let mut posted: Vec<PendingId> = Vec::with_capacity(pending.len());
    for entry in &pending {
      match self.gateway.post_review(&entry.review).await {
        Ok(created) => {
          tracing::debug!(queue_id = entry.queue_id.0, review_id = ?created.id, "pending review posted");
          posted.push(entry.queue_id);
        }
        Err(e) => {
          tracing::warn!(queue_id = entry.queue_id.0, error = %e, "replay stopped");
          break;
        }
      }
    }

    if !posted.is_empty() {
      self
        .store
        .remove_pending(&posted)
        .await
        .map_err(SyncError::store)?;
    }

    let report = ReplayReport {
      posted:    posted.len(),
      remaining: pending.len() - posted.len(),
    };
    tracing::info!(posted = report.posted, remaining = report.remaining, "replay finished");
    Ok(report)
  }
}
