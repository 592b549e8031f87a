use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::store::{CredentialStore, LoginOutcome, RegisterError, ValidateError};

/// Cloneable handle for using one `CredentialStore` from several threads.
///
/// Registration and removal take the write lock; validation only needs a read lock.
/// A poisoned lock is recovered since every mutation is a single map insert or remove.
#[derive(Clone, Default)]
pub struct SharedCredentialStore {
    inner: Arc<RwLock<CredentialStore>>,
}

impl SharedCredentialStore {
    pub fn new(store: CredentialStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    pub fn register(
        &self,
        username: &str,
        password: &str,
        scheme_id: &str,
    ) -> Result<(), RegisterError> {
        self.write().register(username, password, scheme_id)
    }

    pub fn validate(&self, username: &str, password: &str) -> Result<bool, ValidateError> {
        self.read().validate(username, password)
    }

    pub fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, ValidateError> {
        self.read().login(username, password)
    }

    pub fn remove(&self, username: &str) -> bool {
        self.write().remove(username)
    }

    /// Run a read-only closure against the underlying store
    pub fn with_store<R>(&self, f: impl FnOnce(&CredentialStore) -> R) -> R {
        f(&self.read())
    }

    fn read(&self) -> RwLockReadGuard<'_, CredentialStore> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CredentialStore> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_concurrent_validation() {
        let shared = SharedCredentialStore::default();
        shared.register("alice", "s3cret", "4").unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = shared.clone();
                thread::spawn(move || {
                    let password = if i % 2 == 0 { "s3cret" } else { "wrong" };
                    (i, store.validate("alice", password))
                })
            })
            .collect();

        for handle in handles {
            let (i, result) = handle.join().unwrap();
            assert_eq!(result, Ok(i % 2 == 0));
        }
    }

    #[test]
    fn test_concurrent_registration() {
        let shared = SharedCredentialStore::new(CredentialStore::new());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = shared.clone();
                thread::spawn(move || {
                    let username = format!("user{}", i);
                    store.register(&username, "pw", "2").unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(shared.with_store(|s| s.len()), 8);
        assert_eq!(shared.login("user3", "pw"), Ok(LoginOutcome::Matched));
        assert!(shared.remove("user3"));
        assert_eq!(shared.login("user3", "pw"), Err(ValidateError::NotFound));
    }
}
