// First, declare the modules folder itself
mod modules;

// Re-export everything from modules for easier access
pub use modules::{auth, config, encryption, utils};

// Re-export commonly used types
pub use modules::auth::{
    Credential, CredentialStore, LoginOutcome, RegisterError, SharedCredentialStore,
    ValidateError,
};
pub use modules::config::AppConfig;
pub use modules::encryption::{registry, PasswordTransform, Scheme, TransformError};

// Constants
/// Salt appended to every password by the SaltedHash scheme, shared by all users
pub const SALT: &str = "randomSalt";
pub const DEFAULT_LOG_FILE: &str = "passkeep.log";
pub const DEFAULT_CONFIG_FILE: &str = "passkeep.config.json";
