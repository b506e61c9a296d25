//! Cross-collection deduplication of linked orders.

use std::collections::HashSet;

use keel_shared::types::OrderId;

use crate::records::BookingRecord;

/// Ids of every order reachable through a booking.
///
/// Built once from the booking collection, then consulted while folding the
/// standalone orders so the same order is never counted twice.
#[derive(Debug, Clone, Default)]
pub struct LinkedOrderIndex {
    ids: HashSet<OrderId>,
}

impl LinkedOrderIndex {
    /// Collects linked-order ids from all bookings. Blank ids are ignored.
    #[must_use]
    pub fn from_bookings(bookings: &[BookingRecord]) -> Self {
        let ids = bookings
            .iter()
            .flat_map(|booking| &booking.linked_orders)
            .filter_map(|linked| linked.order_id.as_ref())
            .filter(|id| !id.is_blank())
            .cloned()
            .collect();
        Self { ids }
    }

    /// Returns true if the order was already counted through a booking.
    #[must_use]
    pub fn contains(&self, id: &OrderId) -> bool {
        self.ids.contains(id)
    }

    /// Number of distinct linked orders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns true if no booking has linked orders.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
