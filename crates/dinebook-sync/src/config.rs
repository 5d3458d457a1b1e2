use serde::Deserialize;

/// Tunables for the sync layer, read from the `[sync]` table of the client
/// configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct SyncConfig {
  /// When a review post fails while the client believes it is online, queue
  /// the review for replay instead of returning the network error.
  #[serde(default)]
  pub demote_failed_submissions: bool,
}
