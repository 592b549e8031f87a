use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::modules::encryption::Scheme;
use crate::DEFAULT_LOG_FILE;

/// Front-end settings, read from a JSON file and overridden by command-line flags
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub log_file: String,
    pub log_level: String,
    pub store_file: Option<String>, // In-memory only when absent
    pub default_scheme: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_file: DEFAULT_LOG_FILE.to_string(),
            log_level: "info".to_string(),
            store_file: None,
            default_scheme: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from `path`; a missing file gives the defaults
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let mut file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };

        let mut data = String::new();
        file.read_to_string(&mut data)?;
        let config: AppConfig = serde_json::from_str(&data)?;
        config.check()?;
        Ok(config)
    }

    /// Parsed log level, falling back to Info on unrecognized names
    pub fn level_filter(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Info)
    }

    /// Scheme offered when the user does not pick one
    pub fn default_scheme(&self) -> Option<Scheme> {
        self.default_scheme.as_deref().and_then(Scheme::from_token)
    }

    fn check(&self) -> Result<(), String> {
        match &self.default_scheme {
            Some(token) if Scheme::from_token(token).is_none() => {
                Err(format!("Unknown default_scheme in config: {}", token))
            }
            _ => Ok(()),
        }
    }
}
