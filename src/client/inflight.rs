use std::sync::Arc;

use dashmap::DashSet;

/// Keys of operations currently waiting on the server.
///
/// A second call for the same key fails fast instead of being sent, the way
/// a submit button stays disabled until its request resolves.
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    keys: Arc<DashSet<String>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` when the key is already taken.
    pub fn begin(&self, key: impl Into<String>) -> Option<InFlightGuard> {
        let key = key.into();
        if self.keys.insert(key.clone()) {
            Some(InFlightGuard {
                keys: self.keys.clone(),
                key,
            })
        } else {
            None
        }
    }

    pub fn is_busy(&self, key: &str) -> bool {
        self.keys.contains(key)
    }
}

/// Releases its key on drop.
#[derive(Debug)]
pub struct InFlightGuard {
    keys: Arc<DashSet<String>>,
    key: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.keys.remove(&self.key);
    }
}
