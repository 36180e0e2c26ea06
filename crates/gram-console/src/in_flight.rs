use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Set of record ids with an operation in flight.
///
/// [`InFlightSet::try_acquire`] hands out a ticket that removes the id again
/// when dropped. Different ids never block each other.
#[derive(Debug, Clone, Default)]
pub struct InFlightSet {
    ids: Arc<Mutex<HashSet<String>>>,
}

#[derive(Debug)]
pub struct InFlightTicket {
    ids: Arc<Mutex<HashSet<String>>>,
    id: String,
}

impl InFlightSet {
    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.ids.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// `None` when `id` is already in flight
    pub fn try_acquire(&self, id: &str) -> Option<InFlightTicket> {
        if !self.lock().insert(id.to_string()) {
            return None;
        }
        Some(InFlightTicket {
            ids: self.ids.clone(),
            id: id.to_string(),
        })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lock().contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl InFlightTicket {
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Drop for InFlightTicket {
    fn drop(&mut self) {
        self.ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_id_is_exclusive_until_released() {
        let set = InFlightSet::default();
        let ticket = set.try_acquire("a").unwrap();
        assert!(set.try_acquire("a").is_none());
        assert!(set.contains("a"));

        let other = set.try_acquire("b");
        assert!(other.is_some());

        drop(ticket);
        assert!(!set.contains("a"));
        assert!(set.try_acquire("a").is_some());
    }

    #[test]
    fn clones_share_the_set() {
        let set = InFlightSet::default();
        let clone = set.clone();
        let _ticket = set.try_acquire("x").unwrap();
        assert!(clone.try_acquire("x").is_none());
    }
}
