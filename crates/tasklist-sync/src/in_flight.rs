use std::collections::HashSet;

use parking_lot::Mutex;

/// Identifiers with a mutating request currently awaiting the store.
#[derive(Debug, Default)]
pub(crate) struct InFlight {
    ids: Mutex<HashSet<String>>,
}

impl InFlight {
    /// Claim `id` for one request. `None` if another request holds it.
    pub(crate) fn try_acquire(&self, id: &str) -> Option<InFlightGuard<'_>> {
        if self.ids.lock().insert(id.to_string()) {
            Some(InFlightGuard {
                owner: self,
                id: id.to_string(),
            })
        } else {
            None
        }
    }

    pub(crate) fn contains(&self, id: &str) -> bool {
        self.ids.lock().contains(id)
    }
}

/// Releases the claim when dropped, whether the request succeeded, failed or was abandoned.
#[derive(Debug)]
pub(crate) struct InFlightGuard<'a> {
    owner: &'a InFlight,
    id: String,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.owner.ids.lock().remove(&self.id);
    }
}
