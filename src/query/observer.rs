//! Filter-key change notification
//!
//! Components whose state is only meaningful for one filtered view (the page
//! cache, the selection) implement [`FilterKeyObserver`]. The session calls
//! every observer exactly once per actual key change, never for mutations
//! that leave the canonical query unchanged.

use super::canonical::QuerySnapshot;

/// Receiver of canonical filter key changes
pub trait FilterKeyObserver {
    /// Called after the canonical key changed to `snapshot.key`
    fn filter_key_changed(&mut self, snapshot: &QuerySnapshot);
}

impl<F> FilterKeyObserver for F
where
    F: FnMut(&QuerySnapshot),
{
    fn filter_key_changed(&mut self, snapshot: &QuerySnapshot) {
        self(snapshot);
    }
}
