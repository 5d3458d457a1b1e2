//! Connectivity tracking and the replay trigger.
//!
//! The watcher owns the authoritative [`NetworkState`] and publishes it over a
//! [`watch`] channel. Every Offline → Online transition asks the orchestrator
//! to flush the pending partition. At most one flush runs at a time; a
//! transition that lands while one is in flight is folded into a single
//! follow-up pass.

use std::{
  fmt,
  sync::atomic::{AtomicBool, Ordering},
};

use dinebook_core::{gateway::RemoteGateway, store::LocalStore};
use tokio::sync::{Mutex, mpsc, watch};

use crate::{ReplayReport, Result, SyncOrchestrator};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum NetworkState {
  #[default]
  Offline,
  Online,
}

impl NetworkState {
  pub fn is_online(self) -> bool { self == Self::Online }
}

impl fmt::Display for NetworkState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Offline => "offline",
      Self::Online => "online",
    })
  }
}

pub struct ConnectivityWatcher {
  state:       watch::Sender<NetworkState>,
  replay_gate: Mutex<()>,
  rerun:       AtomicBool,
}

impl ConnectivityWatcher {
  pub fn new(initial: NetworkState) -> Self {
    let (state, _) = watch::channel(initial);
    Self { state, replay_gate: Mutex::new(()), rerun: AtomicBool::new(false) }
  }

  pub fn subscribe(&self) -> watch::Receiver<NetworkState> { self.state.subscribe() }

  pub fn state(&self) -> NetworkState { *self.state.borrow() }

  /// Record a connectivity change reported by the platform.
  ///
  /// Returns the replay report when this call ran the replay, `None` when
  /// there was no Offline → Online transition or when the replay was handed
  /// to a pass already in flight.
  pub async fn signal<L, G>(
    &self,
    next: NetworkState,
    orchestrator: &SyncOrchestrator<L, G>,
  ) -> Result<Option<ReplayReport>>
  where
    L: LocalStore,
    G: RemoteGateway,
  {
    let previous = self.state.send_replace(next);
    if previous == next {
      tracing::debug!(state = %next, "connectivity unchanged");
      return Ok(None);
    }
    tracing::info!(from = %previous, to = %next, "connectivity changed");
    if next == NetworkState::Offline {
      return Ok(None);
    }
    self.flush(orchestrator).await
  }

  /// Flush the pending partition through the replay gate.
  ///
  /// Shares the gate with transition-triggered replays: when a pass is
  /// already in flight this only queues a follow-up pass and returns `None`.
  pub async fn flush<L, G>(
    &self,
    orchestrator: &SyncOrchestrator<L, G>,
  ) -> Result<Option<ReplayReport>>
  where
    L: LocalStore,
    G: RemoteGateway,
  {
    // Raise the flag before contending for the gate: whoever holds the gate
    // re-checks it after releasing, so the request cannot be lost.
    self.rerun.store(true, Ordering::SeqCst);

    let mut ran: Option<ReplayReport> = None;
    loop {
      let Ok(guard) = self.replay_gate.try_lock() else {
        tracing::debug!("replay in flight; follow-up queued");
        return Ok(ran);
      };
      if !self.rerun.swap(false, Ordering::SeqCst) {
        return Ok(ran);
      }

      let report = orchestrator.flush_pending().await;
      drop(guard);
      let report = match report {
        Ok(report) => report,
        Err(e) if self.rerun.load(Ordering::SeqCst) => {
          tracing::warn!(error = %e, "replay failed; running queued follow-up");
          continue;
        }
        Err(e) => return Err(e),
      };
      ran = Some(match ran {
        Some(total) => total.merge(report),
        None => report,
      });
    }
  }

  /// Drive [`signal`](Self::signal) from a stream of platform connectivity
  /// events until every sender is dropped.
  pub async fn run<L, G>(
    &self,
    orchestrator: &SyncOrchestrator<L, G>,
    mut signals: mpsc::Receiver<NetworkState>,
  ) where
    L: LocalStore,
    G: RemoteGateway,
  {
    while let Some(next) = signals.recv().await {
      if let Err(e) = self.signal(next, orchestrator).await {
        tracing::warn!(error = %e, "replay failed");
      }
    }
    tracing::debug!("connectivity event stream closed");
  }
}
