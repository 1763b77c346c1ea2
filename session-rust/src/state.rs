use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lifecycle of a generation session.
///
/// `Submitting` is the in-flight window. It is always left once the request
/// resolves, whichever way it resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    #[default]
    Idle,
    Submitting,
    Completed,
    Failed,
}

impl SessionState {
    #[must_use]
    pub fn is_in_flight(self) -> bool {
        self == Self::Submitting
    }
}

// Critical sections never span an `.await`, so a poisoned lock still holds
// consistent data.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
