pub mod password;
mod shared;
pub mod store;
pub mod user_interface;

// Re-export the main types and functions
pub use password::{is_blank, read_password};
pub use shared::SharedCredentialStore;
pub use store::{
    load_store, load_store_with_registry, save_store, Credential, CredentialStore, LoginOutcome,
    RegisterError, StoreError, ValidateError,
};
