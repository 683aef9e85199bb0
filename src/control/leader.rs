//! Best-effort leader address hint.
//!
//! The hint is written by the leadership-change observer and read by any
//! handler that needs to point a caller at the leader. It is not
//! authoritative and may stay stale if updates stop arriving.

use parking_lot::RwLock;

/// Single-cell register holding the last observed leader address.
///
/// Constructed once at server start and shared by `Arc` between the
/// observer and readers. The lock is held only around the field access.
#[derive(Debug, Default)]
pub struct LeaderAddressTracker {
    addr: RwLock<String>,
}

impl LeaderAddressTracker {
    /// Create a tracker with an empty hint.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the hint.
    pub fn set(&self, addr: impl Into<String>) {
        let addr = addr.into();
        *self.addr.write() = addr;
    }

    /// Most recently set address, or an empty string if never set.
    pub fn get(&self) -> String {
        self.addr.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_until_set() {
        let tracker = LeaderAddressTracker::new();
        assert_eq!(tracker.get(), "");

        tracker.set("10.0.0.1:8300");
        assert_eq!(tracker.get(), "10.0.0.1:8300");
    }

    #[test]
    fn set_overwrites() {
        let tracker = LeaderAddressTracker::new();
        tracker.set("a:1");
        tracker.set("b:2");
        assert_eq!(tracker.get(), "b:2");
    }
}
