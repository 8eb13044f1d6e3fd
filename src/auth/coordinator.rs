//! Coordinated, single-flight token refresh.
//!
//! When several in-flight requests discover a stale access token at the same
//! time, exactly one refresh exchange may hit the backend: a second exchange
//! racing the first would replay (or, with rotation, invalidate) the refresh
//! token. The first caller to demand a refresh becomes the driver of a
//! cycle; everyone arriving while that cycle is open becomes a follower and
//! receives the driver's outcome.
//!
//! The cycle itself runs on a detached task. A caller abandoning its request
//! mid-refresh therefore cannot tear the cycle down while other followers
//! are still waiting on it.
//!
//! Serialization is a mutex-guarded slot, never a wall-clock heuristic:
//! whether a caller joins a cycle or starts one depends only on whether a
//! cycle is open at that instant.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::auth::refresher::{RefreshOutcome, TokenRefresher};
use crate::auth::store::CredentialStore;

/// An open refresh cycle: its sequence number and a handle on the channel
/// the driver will publish the outcome to.
struct InFlight {
    cycle: u64,
    rx: watch::Receiver<Option<RefreshOutcome>>,
}

struct Inner {
    store: Arc<CredentialStore>,
    refresher: Arc<dyn TokenRefresher>,
    in_flight: Mutex<Option<InFlight>>,
    cycles: AtomicU64,
}

/// Collapses concurrent refresh demands into one exchange per cycle.
///
/// Cheap to clone; clones share the same cycle state.
#[derive(Clone)]
pub struct RefreshCoordinator {
    inner: Arc<Inner>,
}

impl RefreshCoordinator {
    pub fn new(store: Arc<CredentialStore>, refresher: Arc<dyn TokenRefresher>) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                refresher,
                in_flight: Mutex::new(None),
                cycles: AtomicU64::new(0),
            }),
        }
    }

    /// Obtain the outcome of a refresh cycle, starting one if none is open.
    ///
    /// Every caller of an open cycle receives a clone of the same
    /// [`RefreshOutcome`]. Store effects (new credentials on `Renewed`,
    /// sign-out on `Denied`) are applied before any caller is released.
    pub async fn refresh(&self) -> RefreshOutcome {
        let (cycle, mut rx) = {
            let mut slot = self.inner.in_flight.lock().unwrap();
            match slot.as_ref() {
                Some(open) => {
                    debug!(cycle = open.cycle, "joining in-flight refresh");
                    (open.cycle, open.rx.clone())
                }
                None => {
                    let cycle = self.inner.cycles.fetch_add(1, Ordering::Relaxed) + 1;
                    let (tx, rx) = watch::channel(None);
                    *slot = Some(InFlight {
                        cycle,
                        rx: rx.clone(),
                    });
                    debug!(cycle, "starting refresh");
                    let inner = Arc::clone(&self.inner);
                    tokio::spawn(async move {
                        drive(inner, cycle, tx).await;
                    });
                    (cycle, rx)
                }
            }
        };

        loop {
            let published = rx.borrow().clone();
            if let Some(outcome) = published {
                return outcome;
            }
            if rx.changed().await.is_err() {
                // The driver went away without publishing. Free the slot so
                // the next demand can start a fresh cycle instead of joining
                // a dead one.
                let mut slot = self.inner.in_flight.lock().unwrap();
                if slot.as_ref().map(|open| open.cycle) == Some(cycle) {
                    *slot = None;
                }
                return RefreshOutcome::TransientFailure(
                    "refresh cycle ended without an outcome".to_string(),
                );
            }
        }
    }
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let open = self.inner.in_flight.lock().unwrap().is_some();
        f.debug_struct("RefreshCoordinator")
            .field("in_flight", &open)
            .finish()
    }
}

/// Run one refresh cycle to completion and publish its outcome.
async fn drive(inner: Arc<Inner>, cycle: u64, tx: watch::Sender<Option<RefreshOutcome>>) {
    let outcome = match inner.store.read() {
        Some(current) => inner.refresher.exchange(&current).await,
        None => RefreshOutcome::Denied("no session to refresh".to_string()),
    };

    match &outcome {
        RefreshOutcome::Renewed(creds) => {
            // Persistence failure is already logged by the store; the
            // renewed session still lives in memory.
            let _ = inner.store.write(creds.clone());
        }
        RefreshOutcome::Denied(reason) => {
            warn!(cycle, reason = %reason, "refresh denied, signing out");
            let _ = inner.store.clear();
        }
        RefreshOutcome::TransientFailure(reason) => {
            debug!(cycle, reason = %reason, "refresh unavailable");
        }
    }

    // Close the cycle before publishing: anyone arriving from here on saw a
    // rejection that this cycle's token may not cure, and gets a fresh one.
    {
        let mut slot = inner.in_flight.lock().unwrap();
        if slot.as_ref().map(|open| open.cycle) == Some(cycle) {
            *slot = None;
        }
    }
    let _ = tx.send(Some(outcome));
}
