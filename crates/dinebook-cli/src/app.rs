//! Application state for one CLI invocation.

use std::sync::Arc;

use dinebook_core::{
  query::Selection,
  restaurant::{Restaurant, RestaurantId},
};
use dinebook_remote::{GatewayConfig, HttpGateway};
use dinebook_store_sqlite::SqliteStore;
use dinebook_sync::{Directory, NetworkState, ReplayReport, SyncError};

use crate::settings::ClientSettings;

pub type ClientDirectory = Directory<SqliteStore, HttpGateway>;

pub struct App {
  pub directory:    ClientDirectory,
  /// Active cuisine filter.
  pub cuisine:      Selection,
  /// Active neighborhood filter.
  pub neighborhood: Selection,
  /// Restaurants matching the active filters, as last loaded.
  pub listing:      Vec<Restaurant>,
}

impl App {
  pub fn new(directory: ClientDirectory) -> Self {
    Self {
      directory,
      cuisine: Selection::All,
      neighborhood: Selection::All,
      listing: Vec::new(),
    }
  }

  /// Open the local store and wire it to the origin described by `settings`.
  ///
  /// The directory starts offline; [`connect`](Self::connect) performs the
  /// transition that replays anything queued by earlier runs.
  pub async fn open(settings: &ClientSettings) -> Result<Self, SyncError> {
    if let Some(parent) = settings.store_path.parent()
      && !parent.as_os_str().is_empty()
    {
      std::fs::create_dir_all(parent).map_err(|e| {
        SyncError::StoreUnavailable(format!("{}: {e}", parent.display()))
      })?;
    }
    let store = SqliteStore::open(&settings.store_path)
      .await
      .map_err(|e| SyncError::StoreUnavailable(e.to_string()))?;

    let gateway = HttpGateway::new(GatewayConfig {
      base_url: settings.origin_url.clone(),
      timeout:  settings.request_timeout(),
    })
    .map_err(|e| SyncError::Network(Box::new(e)))?;

    tracing::debug!(
      store = %settings.store_path.display(),
      origin = %gateway.base_url(),
      "directory opened"
    );

    Ok(Self::new(Directory::new(
      Arc::new(store),
      Arc::new(gateway),
      NetworkState::Offline,
      settings.sync,
    )))
  }

  /// Go online, replaying the pending queue.
  pub async fn connect(&self) -> Result<Option<ReplayReport>, SyncError> {
    let report = self.directory.go_online().await?;
    if let Some(report) = report {
      tracing::info!(posted = report.posted, remaining = report.remaining, "startup replay");
    }
    Ok(report)
  }

  pub fn set_filters(&mut self, cuisine: Selection, neighborhood: Selection) {
    self.cuisine = cuisine;
    self.neighborhood = neighborhood;
  }

  /// Reload [`listing`](Self::listing) for the active filters.
  pub async fn refresh(&mut self) -> Result<&[Restaurant], SyncError> {
    self.listing = self
      .directory
      .fetch_restaurants_by_cuisine_and_neighborhood(&self.cuisine, &self.neighborhood)
      .await?;
    Ok(&self.listing)
  }

  pub async fn restaurant(&self, id: RestaurantId) -> Result<Restaurant, SyncError> {
    self.directory.fetch_restaurant_by_id(id).await
  }
}
