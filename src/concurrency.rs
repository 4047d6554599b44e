use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, warn};
use tokio_util::sync::CancellationToken;

/// Prefix of every concurrency group key.
pub const GROUP_PREFIX: &str = "benchmarks-";

pub fn group_key(ref_id: &str) -> String {
    format!("{GROUP_PREFIX}{ref_id}")
}

struct Holder {
    invocation_id: u64,
    token: CancellationToken,
}

/// Keyed registry that keeps at most one live invocation per ref.
///
/// Registering a key that is already held cancels the previous holder and
/// takes its place. There is no queue: the newest registration always wins.
#[derive(Clone, Default)]
pub struct ConcurrencyGuard {
    holders: Arc<Mutex<HashMap<String, Holder>>>,
    next_id: Arc<AtomicU64>,
}

impl ConcurrencyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an invocation for `ref_id`, cancelling whoever held the group.
    pub fn register(&self, ref_id: &str) -> Lease {
        let key = group_key(ref_id);
        let invocation_id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let token = CancellationToken::new();

        let previous = self.lock().insert(
            key.clone(),
            Holder {
                invocation_id,
                token: token.clone(),
            },
        );

        if let Some(previous) = previous {
            warn!(
                "Cancelling invocation #{} superseded by #{invocation_id} in group {key}",
                previous.invocation_id
            );
            previous.token.cancel();
        } else {
            debug!("Invocation #{invocation_id} registered in group {key}");
        }

        Lease {
            guard: self.clone(),
            key,
            invocation_id,
            token,
        }
    }

    /// Invocation currently holding the group for `ref_id`, if any.
    #[cfg(test)]
    pub fn holder(&self, ref_id: &str) -> Option<u64> {
        self.lock()
            .get(&group_key(ref_id))
            .map(|holder| holder.invocation_id)
    }

    #[cfg(test)]
    pub fn active_groups(&self) -> usize {
        self.lock().len()
    }

    fn release(&self, key: &str, invocation_id: u64) {
        let mut holders = self.lock();
        if holders
            .get(key)
            .is_some_and(|holder| holder.invocation_id == invocation_id)
        {
            holders.remove(key);
            debug!("Invocation #{invocation_id} released group {key}");
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Holder>> {
        self.holders.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Registration of one invocation. Dropping it frees the group unless a
/// newer invocation has already taken it over.
pub struct Lease {
    guard: ConcurrencyGuard,
    key: String,
    invocation_id: u64,
    token: CancellationToken,
}

impl Lease {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn invocation_id(&self) -> u64 {
        self.invocation_id
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for Lease {
    fn drop(&mut self) {
        self.guard.release(&self.key, self.invocation_id);
    }
}
