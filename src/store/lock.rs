//! Single-writer mutual exclusion per project document.
//!
//! Every operation, read or mutating, holds the document's lock around its
//! whole load-mutate-persist sequence, so two calls never interleave against
//! the same path. Locks are keyed by normalized path and live for the
//! process lifetime.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError};

use crate::util::fs;

static LOCKS: LazyLock<Mutex<HashMap<std::path::PathBuf, Arc<Mutex<()>>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Get the lock handle for a document path. Callers lock the returned
/// handle for the duration of the operation:
///
/// ```ignore
/// let lock = lock::document_lock(path);
/// let _guard = lock::acquire(&lock);
/// ```
pub fn document_lock(document: &Path) -> Arc<Mutex<()>> {
    let key = fs::normalize_path(document);
    let mut locks = LOCKS.lock().unwrap_or_else(PoisonError::into_inner);
    locks.entry(key).or_default().clone()
}

/// Lock a handle, recovering from poisoning. No in-memory graph state
/// survives across calls, so a poisoned guard carries nothing stale.
pub fn acquire(lock: &Arc<Mutex<()>>) -> MutexGuard<'_, ()> {
    lock.lock().unwrap_or_else(PoisonError::into_inner)
}
