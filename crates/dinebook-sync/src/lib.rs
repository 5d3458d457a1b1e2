//! Offline-first synchronization for the dinebook restaurant directory.
//!
//! - [`SyncOrchestrator`] decides between the local store and the origin and
//!   is the only component that writes to the store.
//! - [`ConnectivityWatcher`] tracks Online/Offline and triggers the replay of
//!   queued reviews on reconnect.
//! - [`Directory`] is the facade handed to UI collaborators.
//!
//! Everything is generic over [`dinebook_core::store::LocalStore`] and
//! [`dinebook_core::gateway::RemoteGateway`]; nothing here holds global state.

pub mod config;
pub mod connectivity;
pub mod directory;
pub mod error;
pub mod orchestrator;

pub use config::SyncConfig;
pub use connectivity::{ConnectivityWatcher, NetworkState};
pub use directory::Directory;
pub use error::{Result, SyncError};
pub use orchestrator::{ReplayReport, SubmitOutcome, SyncOrchestrator};

#[cfg(test)]
mod tests;
