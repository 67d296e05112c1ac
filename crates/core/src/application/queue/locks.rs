// Per-department mutation locks

use crate::domain::DepartmentId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// One async mutex per department.
///
/// Join, serve, miss and sweep hold the department guard for the whole
/// read-check-write sequence; departments never contend with each other.
/// Entries are never evicted: the catalog is small and immutable at runtime.
#[derive(Default)]
pub struct DepartmentLocks {
    locks: Mutex<HashMap<DepartmentId, Arc<AsyncMutex<()>>>>,
}

impl DepartmentLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to one department queue
    pub async fn acquire(&self, department_id: DepartmentId) -> OwnedMutexGuard<()> {
        let lock = {
            // The map only holds Arcs, so a poisoned guard is still consistent
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks.entry(department_id).or_default().clone()
        };
        lock.lock_owned().await
    }
}
