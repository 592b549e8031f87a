use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use super::password::is_blank;
use crate::modules::encryption::{registry, PasswordTransform, Scheme, TransformError, TransformRegistry};
use crate::modules::utils::time::get_current_timestamp;

/// A stored password representation together with the scheme that produced it
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Credential {
    pub username: String,
    pub stored_value: String,
    pub scheme: Scheme,
    pub registered_at: u64,
}

/// Result of a login attempt against a known user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    Matched,
    Mismatched,
}

/// Errors returned by `CredentialStore::register`
#[derive(Debug, Clone, PartialEq)]
pub enum RegisterError {
    BlankField,
    UnknownScheme(String),
    TransformFailed(TransformError),
}

impl RegisterError {
    /// True for environment faults, as opposed to bad user input
    pub fn is_internal(&self) -> bool {
        matches!(self, RegisterError::TransformFailed(_))
    }
}

impl From<TransformError> for RegisterError {
    fn from(error: TransformError) -> Self {
        RegisterError::TransformFailed(error)
    }
}

impl fmt::Display for RegisterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegisterError::BlankField => write!(f, "Username and password cannot be empty"),
            RegisterError::UnknownScheme(token) => write!(f, "Unknown scheme: {}", token),
            RegisterError::TransformFailed(e) => write!(f, "Password transform failed: {}", e),
        }
    }
}

impl std::error::Error for RegisterError {}

/// Errors returned by `CredentialStore::validate`
#[derive(Debug, Clone, PartialEq)]
pub enum ValidateError {
    NotFound,
    TransformFailed(TransformError),
}

impl ValidateError {
    pub fn is_internal(&self) -> bool {
        matches!(self, ValidateError::TransformFailed(_))
    }
}

impl From<TransformError> for ValidateError {
    fn from(error: TransformError) -> Self {
        ValidateError::TransformFailed(error)
    }
}

impl fmt::Display for ValidateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidateError::NotFound => write!(f, "User not found"),
            ValidateError::TransformFailed(e) => write!(f, "Password transform failed: {}", e),
        }
    }
}

impl std::error::Error for ValidateError {}

/// Errors raised while saving or loading a store file
#[derive(Debug)]
pub enum StoreError {
    InvalidData(String),
    Serialization(serde_json::Error),
    IoError(io::Error),
}

impl From<io::Error> for StoreError {
    fn from(error: io::Error) -> Self {
        StoreError::IoError(error)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(error: serde_json::Error) -> Self {
        StoreError::Serialization(error)
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::InvalidData(msg) => write!(f, "Invalid data: {}", msg),
            StoreError::Serialization(e) => write!(f, "Serialization error: {}", e),
            StoreError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

/// Owns every credential, keyed by username
pub struct CredentialStore {
    credentials: HashMap<String, Credential>,
    registry: &'static TransformRegistry,
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore {
    /// Empty store backed by the built-in strategies
    pub fn new() -> Self {
        Self::with_registry(registry())
    }

    pub fn with_registry(registry: &'static TransformRegistry) -> Self {
        Self {
            credentials: HashMap::new(),
            registry,
        }
    }

    /// Register a user, silently replacing any previous credential for the same name
    pub fn register(
        &mut self,
        username: &str,
        password: &str,
        scheme_id: &str,
    ) -> Result<(), RegisterError> {
        if is_blank(username) || is_blank(password) {
            return Err(RegisterError::BlankField);
        }

        let strategy = self
            .registry
            .resolve(scheme_id)
            .ok_or_else(|| RegisterError::UnknownScheme(scheme_id.to_string()))?;

        let stored_value = strategy.transform(password)?;

        let credential = Credential {
            username: username.to_string(),
            stored_value,
            scheme: strategy.scheme(),
            registered_at: get_current_timestamp(),
        };
        self.credentials.insert(username.to_string(), credential);

        Ok(())
    }

    /// Check a password against the stored credential
    pub fn validate(&self, username: &str, password: &str) -> Result<bool, ValidateError> {
        let credential = self
            .credentials
            .get(username)
            .ok_or(ValidateError::NotFound)?;

        let candidate = self.strategy_for(credential)?.transform(password)?;
        Ok(candidate.as_bytes() == credential.stored_value.as_bytes())
    }

    /// Same as `validate`, with the result named for callers
    pub fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, ValidateError> {
        Ok(if self.validate(username, password)? {
            LoginOutcome::Matched
        } else {
            LoginOutcome::Mismatched
        })
    }

    /// Recover the plaintext password for users stored with a reversible scheme
    pub fn recover_password(&self, username: &str) -> Result<String, ValidateError> {
        let credential = self
            .credentials
            .get(username)
            .ok_or(ValidateError::NotFound)?;

        Ok(self
            .strategy_for(credential)?
            .recover(&credential.stored_value)?)
    }

    /// Remove a user, returning whether it existed
    pub fn remove(&mut self, username: &str) -> bool {
        self.credentials.remove(username).is_some()
    }

    pub fn get(&self, username: &str) -> Option<&Credential> {
        self.credentials.get(username)
    }

    pub fn contains(&self, username: &str) -> bool {
        self.credentials.contains_key(username)
    }

    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    /// Registered usernames in sorted order
    pub fn usernames(&self) -> Vec<String> {
        self.credentials.keys().cloned().sorted().collect()
    }

    fn strategy_for(&self, credential: &Credential) -> Result<&dyn PasswordTransform, TransformError> {
        self.registry.get(credential.scheme).ok_or_else(|| {
            TransformError::Unavailable(format!(
                "no strategy registered for {}",
                credential.scheme
            ))
        })
    }
}

/// Write the store's credentials to `path` as pretty JSON
pub fn save_store(store: &CredentialStore, path: &Path) -> Result<(), StoreError> {
    let data = serde_json::to_string_pretty(&store.credentials)?;
    File::create(path)?.write_all(data.as_bytes())?;
    Ok(())
}

/// Load a store from `path`; a missing file yields an empty store
pub fn load_store(path: &Path) -> Result<CredentialStore, StoreError> {
    load_store_with_registry(path, registry())
}

pub fn load_store_with_registry(
    path: &Path,
    registry: &'static TransformRegistry,
) -> Result<CredentialStore, StoreError> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Ok(CredentialStore::with_registry(registry));
        }
        Err(e) => return Err(StoreError::IoError(e)),
    };

    let mut data = String::new();
    file.read_to_string(&mut data)?;

    let credentials: HashMap<String, Credential> = serde_json::from_str(&data)?;

    for (key, credential) in &credentials {
        if is_blank(key) {
            return Err(StoreError::InvalidData("blank username in store".to_string()));
        }
        if key != &credential.username {
            return Err(StoreError::InvalidData(format!(
                "entry {} holds credential for {}",
                key, credential.username
            )));
        }
    }

    Ok(CredentialStore {
        credentials,
        registry,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::encryption::ReverseTransform;
    use tempfile::{tempdir, NamedTempFile};

    /// Strategy whose primitive is never available
    struct BrokenTransform;

    impl PasswordTransform for BrokenTransform {
        fn scheme(&self) -> Scheme {
            Scheme::FastHash
        }

        fn transform(&self, _plaintext: &str) -> Result<String, TransformError> {
            Err(TransformError::Unavailable("MD5 not available".to_string()))
        }
    }

    fn broken_registry() -> &'static TransformRegistry {
        Box::leak(Box::new(
            TransformRegistry::with_builtin().with(Box::new(BrokenTransform)),
        ))
    }

    #[test]
    fn test_register_then_validate_every_scheme() {
        let mut store = CredentialStore::new();

        for scheme in Scheme::ALL {
            let username = format!("user_{}", scheme.name());
            store.register(&username, "Password123!", scheme.token()).unwrap();
            assert_eq!(store.validate(&username, "Password123!"), Ok(true));
            assert_eq!(store.validate(&username, "password123!"), Ok(false));
            assert_eq!(store.get(&username).unwrap().scheme, scheme);
        }

        for scheme in Scheme::ALL {
            store.register("by_name", "hunter2", scheme.name()).unwrap();
            assert_eq!(store.validate("by_name", "hunter2"), Ok(true));
        }
    }

    #[test]
    fn test_alice_scenario() {
        let mut store = CredentialStore::new();

        assert!(store.register("alice", "s3cret", "SaltedHash").is_ok());
        assert_eq!(store.login("alice", "s3cret"), Ok(LoginOutcome::Matched));
        assert_eq!(store.login("alice", "wrong"), Ok(LoginOutcome::Mismatched));
        assert_eq!(store.login("bob", "anything"), Err(ValidateError::NotFound));
    }

    #[test]
    fn test_blank_fields_are_rejected() {
        let mut store = CredentialStore::new();

        for (username, password) in [("", "pw"), ("   ", "pw"), ("user", ""), ("user", " \t\n")] {
            assert_eq!(
                store.register(username, password, "1"),
                Err(RegisterError::BlankField)
            );
        }
        assert!(store.is_empty());
    }

    #[test]
    fn test_unknown_scheme_is_rejected() {
        let mut store = CredentialStore::new();

        let result = store.register("carol", "pw", "9");
        assert_eq!(result, Err(RegisterError::UnknownScheme("9".to_string())));
        assert!(!store.contains("carol"));
        assert_eq!(store.validate("carol", "pw"), Err(ValidateError::NotFound));
    }

    #[test]
    fn test_reregistration_overwrites() {
        let mut store = CredentialStore::new();

        store.register("dave", "first", "2").unwrap();
        store.register("dave", "second", "3").unwrap();

        assert_eq!(store.len(), 1);
        let credential = store.get("dave").unwrap();
        assert_eq!(credential.scheme, Scheme::ToyPermute);
        assert_eq!(credential.stored_value, "dnoces");
        assert_eq!(store.validate("dave", "second"), Ok(true));
        assert_eq!(store.validate("dave", "first"), Ok(false));
    }

    #[test]
    fn test_stored_values_by_scheme() {
        let mut store = CredentialStore::new();

        store.register("enc", "password", "Encoding").unwrap();
        store.register("fast", "password", "FastHash").unwrap();
        store.register("salted", "password", "SaltedHash").unwrap();

        assert_eq!(store.get("enc").unwrap().stored_value, "cGFzc3dvcmQ=");
        assert_eq!(
            store.get("fast").unwrap().stored_value,
            "5f4dcc3b5aa765d61d8327deb882cf99"
        );
        assert_ne!(store.get("salted").unwrap().stored_value, "password");
    }

    #[test]
    fn test_recover_password() {
        let mut store = CredentialStore::new();

        store.register("enc", "s3cret", "1").unwrap();
        store.register("perm", "s3cret", "3").unwrap();
        store.register("hash", "s3cret", "4").unwrap();

        assert_eq!(store.recover_password("enc").unwrap(), "s3cret");
        assert_eq!(store.recover_password("perm").unwrap(), "s3cret");
        assert_eq!(
            store.recover_password("hash"),
            Err(ValidateError::TransformFailed(TransformError::NotInvertible(
                Scheme::SaltedHash
            )))
        );
        assert_eq!(store.recover_password("nobody"), Err(ValidateError::NotFound));
    }

    #[test]
    fn test_transform_failure_is_reported() {
        let mut store = CredentialStore::with_registry(broken_registry());

        let result = store.register("erin", "pw", "FastHash");
        assert!(matches!(
            result,
            Err(RegisterError::TransformFailed(TransformError::Unavailable(_)))
        ));
        assert!(result.unwrap_err().is_internal());
        assert!(store.is_empty());

        // Other schemes keep working
        store.register("erin", "pw", "SaltedHash").unwrap();
        assert_eq!(store.validate("erin", "pw"), Ok(true));
        assert!(!RegisterError::BlankField.is_internal());
    }

    #[test]
    fn test_missing_strategy_fails_validation() {
        let partial: &'static TransformRegistry =
            Box::leak(Box::new(TransformRegistry::empty().with(Box::new(ReverseTransform))));

        let mut store = CredentialStore::new();
        store.register("frank", "pw", "4").unwrap();

        let file = NamedTempFile::new().unwrap();
        save_store(&store, file.path()).unwrap();
        let reloaded = load_store_with_registry(file.path(), partial).unwrap();

        let result = reloaded.validate("frank", "pw");
        assert!(matches!(
            result,
            Err(ValidateError::TransformFailed(TransformError::Unavailable(_)))
        ));
        assert!(result.unwrap_err().is_internal());
        assert!(!ValidateError::NotFound.is_internal());
    }

    #[test]
    fn test_remove_and_listing() {
        let mut store = CredentialStore::new();

        store.register("zed", "pw", "1").unwrap();
        store.register("amy", "pw", "2").unwrap();
        assert_eq!(store.usernames(), vec!["amy".to_string(), "zed".to_string()]);

        assert!(store.remove("zed"));
        assert!(!store.remove("zed"));
        assert_eq!(store.validate("zed", "pw"), Err(ValidateError::NotFound));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let mut store = CredentialStore::new();
        store.register("alice", "s3cret", "4").unwrap();
        store.register("bob", "hunter2", "1").unwrap();

        let file = NamedTempFile::new().unwrap();
        save_store(&store, file.path()).unwrap();

        let loaded = load_store(file.path()).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.get("alice"), store.get("alice"));
        assert_eq!(loaded.validate("alice", "s3cret"), Ok(true));
        assert_eq!(loaded.validate("bob", "hunter2"), Ok(true));
        assert_eq!(loaded.validate("bob", "wrong"), Ok(false));
    }

    #[test]
    fn test_load_missing_file_gives_empty_store() {
        let dir = tempdir().unwrap();
        let store = load_store(&dir.path().join("users.json")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_rejects_corrupt_files() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();
        assert!(matches!(
            load_store(file.path()),
            Err(StoreError::Serialization(_))
        ));

        let mut mismatched = NamedTempFile::new().unwrap();
        mismatched
            .write_all(
                br#"{"alice": {"username": "mallory", "stored_value": "x", "scheme": "Encoding", "registered_at": 0}}"#,
            )
            .unwrap();
        assert!(matches!(
            load_store(mismatched.path()),
            Err(StoreError::InvalidData(_))
        ));
    }

    #[test]
    fn test_usernames_are_kept_as_typed() {
        let mut store = CredentialStore::new();

        store.register(" alice", "one", "1").unwrap();
        store.register("alice", "two", "1").unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.validate(" alice", "one"), Ok(true));
        assert_eq!(store.validate("alice", "two"), Ok(true));
        assert_eq!(store.validate("alice", "one"), Ok(false));
    }
}
