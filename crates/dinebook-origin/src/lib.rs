//! Development origin server for dinebook.
//!
//! Serves the restaurant/review JSON API the sync layer talks to, backed by
//! an in-memory [`Catalog`] seeded from JSON. Intended for local development
//! and gateway tests, not for production use.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = dinebook_origin::router(Catalog::shared(Seed::bundled()?));
//! ```

pub mod catalog;
pub mod error;
pub mod handlers;

pub use catalog::{Catalog, Seed, SharedCatalog};
pub use error::OriginError;

use std::path::PathBuf;

use axum::{Router, routing::get};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `origin.toml` and the
/// `ORIGIN_*` environment.
#[derive(Debug, Deserialize, Clone)]
pub struct OriginConfig {
  pub host:      String,
  pub port:      u16,
  /// JSON seed file; the bundled sample data is used when absent.
  #[serde(default)]
  pub seed_path: Option<PathBuf>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the origin's axum [`Router`].
///
/// Every path is accepted with and without a trailing slash.
pub fn router(catalog: SharedCatalog) -> Router {
  Router::new()
    .route("/restaurants", get(handlers::list_restaurants))
    .route(
      "/restaurants/{id}",
      get(handlers::get_restaurant).put(handlers::set_favorite),
    )
    .route(
      "/restaurants/{id}/",
      get(handlers::get_restaurant).put(handlers::set_favorite),
    )
    .route("/reviews", get(handlers::list_reviews).post(handlers::create_review))
    .route("/reviews/", get(handlers::list_reviews).post(handlers::create_review))
    .layer(TraceLayer::new_for_http())
    .with_state(catalog)
}
