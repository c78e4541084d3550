//! Thread-safe handle to one [`ErrorStore`].
//!
//! Every call takes the same lock, so the primary list and both indices
//! always change together.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use order_guard_core::{ErrorKind, ErrorPattern, ErrorRecord, RetryDecision};

use crate::error::ServiceError;
use crate::error_store::{ErrorStats, ErrorStore};

#[derive(Clone)]
pub struct SharedErrorStore {
    inner: Arc<Mutex<ErrorStore>>,
}

fn lock_store<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, ServiceError> {
    mutex
        .lock()
        .map_err(|e: PoisonError<_>| ServiceError::LockPoisoned(format!("error store: {e}")))
}

impl SharedErrorStore {
    #[must_use]
    pub fn new(store: ErrorStore) -> Self {
        Self { inner: Arc::new(Mutex::new(store)) }
    }

    /// Run `f` with exclusive access, for multi-step workflows that must not interleave.
    pub fn with<R, F>(&self, f: F) -> Result<R, ServiceError>
    where
        F: FnOnce(&mut ErrorStore) -> R,
    {
        let mut guard = lock_store(&self.inner)?;
        Ok(f(&mut guard))
    }

    pub fn add_error(
        &self,
        order_id: &str,
        message: &str,
        kind: ErrorKind,
        actor_id: &str,
        context: Option<&str>,
    ) -> Result<String, ServiceError> {
        lock_store(&self.inner)?.add_error(order_id, message, kind, actor_id, context)
    }

    pub fn resolve_error(&self, id: &str) -> Result<bool, ServiceError> {
        lock_store(&self.inner)?.resolve_error(id)
    }

    pub fn increment_retry_count(&self, id: &str) -> Result<Option<u32>, ServiceError> {
        lock_store(&self.inner)?.increment_retry_count(id)
    }

    pub fn clear_resolved_errors(&self) -> Result<usize, ServiceError> {
        Ok(lock_store(&self.inner)?.clear_resolved_errors())
    }

    pub fn clear_all_errors(&self) -> Result<(), ServiceError> {
        lock_store(&self.inner)?.clear_all_errors();
        Ok(())
    }

    pub fn get_errors_for_order(&self, order_id: &str) -> Result<Vec<ErrorRecord>, ServiceError> {
        Ok(lock_store(&self.inner)?.get_errors_for_order(order_id))
    }

    pub fn get_unresolved_errors(&self) -> Result<Vec<ErrorRecord>, ServiceError> {
        Ok(lock_store(&self.inner)?.get_unresolved_errors())
    }

    pub fn persistent_errors(&self) -> Result<Vec<ErrorRecord>, ServiceError> {
        Ok(lock_store(&self.inner)?.persistent_errors())
    }

    pub fn enable_recovery_mode(&self) -> Result<(), ServiceError> {
        lock_store(&self.inner)?.enable_recovery_mode();
        Ok(())
    }

    pub fn disable_recovery_mode(&self) -> Result<(), ServiceError> {
        lock_store(&self.inner)?.disable_recovery_mode();
        Ok(())
    }

    pub fn is_recovery_mode(&self) -> Result<bool, ServiceError> {
        Ok(lock_store(&self.inner)?.is_recovery_mode())
    }

    pub fn detect_patterns(&self) -> Result<Vec<ErrorPattern>, ServiceError> {
        Ok(lock_store(&self.inner)?.detect_patterns())
    }

    pub fn should_auto_retry(&self, order_id: &str, kind: ErrorKind) -> Result<bool, ServiceError> {
        Ok(lock_store(&self.inner)?.should_auto_retry(order_id, kind))
    }

    pub fn retry_decision(
        &self,
        order_id: &str,
        kind: ErrorKind,
    ) -> Result<RetryDecision, ServiceError> {
        Ok(lock_store(&self.inner)?.retry_decision(order_id, kind))
    }

    pub fn stats(&self) -> Result<ErrorStats, ServiceError> {
        Ok(lock_store(&self.inner)?.stats())
    }
}
