use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of the transform that governs a stored credential
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    Encoding,
    FastHash,
    ToyPermute,
    SaltedHash,
}

impl Scheme {
    /// All schemes in menu order
    pub const ALL: [Scheme; 4] = [
        Scheme::Encoding,
        Scheme::FastHash,
        Scheme::ToyPermute,
        Scheme::SaltedHash,
    ];

    /// Short numeric token used by the interactive menu
    pub fn token(&self) -> &'static str {
        match self {
            Scheme::Encoding => "1",
            Scheme::FastHash => "2",
            Scheme::ToyPermute => "3",
            Scheme::SaltedHash => "4",
        }
    }

    /// Stable scheme name
    pub fn name(&self) -> &'static str {
        match self {
            Scheme::Encoding => "Encoding",
            Scheme::FastHash => "FastHash",
            Scheme::ToyPermute => "ToyPermute",
            Scheme::SaltedHash => "SaltedHash",
        }
    }

    /// Human-readable label for menus
    pub fn label(&self) -> &'static str {
        match self {
            Scheme::Encoding => "Base64",
            Scheme::FastHash => "MD5",
            Scheme::ToyPermute => "Feistel (string reversal)",
            Scheme::SaltedHash => "Salted SHA-256",
        }
    }

    /// Parse either the numeric token or the scheme name (case-insensitive)
    pub fn from_token(token: &str) -> Option<Scheme> {
        let token = token.trim();
        Scheme::ALL
            .into_iter()
            .find(|s| s.token() == token || s.name().eq_ignore_ascii_case(token))
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
