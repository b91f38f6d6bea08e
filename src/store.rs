use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::models::Routine;

/// The routine data source. Routines are owned elsewhere (backend /
/// list aggregation); the core reads snapshots and performs exactly one
/// write: flipping `is_done` after a confirmed verification success.
pub trait RoutineStore: Send + Sync {
    fn routine(&self, id: &str) -> Option<Routine>;

    /// Record a confirmed completion. Returns false when the id is
    /// unknown to the store.
    fn mark_done(&self, id: &str) -> bool;
}

/// In-memory store backing the demo driver and tests.
#[derive(Clone, Default)]
pub struct InMemoryRoutineStore {
    inner: Arc<Mutex<HashMap<String, Routine>>>,
}

impl InMemoryRoutineStore {
    pub fn new(routines: impl IntoIterator<Item = Routine>) -> Self {
        let map = routines
            .into_iter()
            .map(|routine| (routine.id.clone(), routine))
            .collect();
        Self {
            inner: Arc::new(Mutex::new(map)),
        }
    }

    pub fn upsert(&self, routine: Routine) {
        self.inner
            .lock()
            .unwrap()
            .insert(routine.id.clone(), routine);
    }
}

impl RoutineStore for InMemoryRoutineStore {
    fn routine(&self, id: &str) -> Option<Routine> {
        self.inner.lock().unwrap().get(id).cloned()
    }

    fn mark_done(&self, id: &str) -> bool {
        match self.inner.lock().unwrap().get_mut(id) {
            Some(routine) => {
                routine.is_done = true;
                true
            }
            None => false,
        }
    }
}
