use base64::{engine::general_purpose::STANDARD as base64, Engine as _};
use md5::Md5;
use sha2::{Digest, Sha256};
use std::fmt;

use super::scheme::Scheme;
use crate::SALT;

/// Errors raised while transforming or recovering a password
#[derive(Debug, Clone, PartialEq)]
pub enum TransformError {
    /// The underlying primitive could not be resolved
    Unavailable(String),
    /// The scheme is one-way, the plaintext cannot be recovered
    NotInvertible(Scheme),
    /// A stored value could not be decoded
    Malformed(String),
}

impl fmt::Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformError::Unavailable(msg) => write!(f, "Transform unavailable: {}", msg),
            TransformError::NotInvertible(scheme) => {
                write!(f, "Scheme {} cannot be reversed", scheme)
            }
            TransformError::Malformed(msg) => write!(f, "Malformed stored value: {}", msg),
        }
    }
}

impl std::error::Error for TransformError {}

/// A stateless password transform bound to one scheme
pub trait PasswordTransform: Send + Sync {
    fn scheme(&self) -> Scheme;

    /// Map a plaintext password to its stored representation
    fn transform(&self, plaintext: &str) -> Result<String, TransformError>;

    /// Recover the plaintext from a stored value, if the scheme allows it
    fn recover(&self, _stored: &str) -> Result<String, TransformError> {
        Err(TransformError::NotInvertible(self.scheme()))
    }

    fn is_invertible(&self) -> bool {
        false
    }
}

/// Reversible base64 encoding of the UTF-8 bytes
pub struct Base64Transform;

impl PasswordTransform for Base64Transform {
    fn scheme(&self) -> Scheme {
        Scheme::Encoding
    }

    fn transform(&self, plaintext: &str) -> Result<String, TransformError> {
        Ok(base64.encode(plaintext.as_bytes()))
    }

    fn recover(&self, stored: &str) -> Result<String, TransformError> {
        let bytes = base64
            .decode(stored)
            .map_err(|e| TransformError::Malformed(e.to_string()))?;
        String::from_utf8(bytes).map_err(|_| {
            TransformError::Malformed("Decoded data is not valid UTF-8".to_string())
        })
    }

    fn is_invertible(&self) -> bool {
        true
    }
}

/// Unsalted MD5 digest rendered as lowercase hex
pub struct Md5Transform;

impl PasswordTransform for Md5Transform {
    fn scheme(&self) -> Scheme {
        Scheme::FastHash
    }

    fn transform(&self, plaintext: &str) -> Result<String, TransformError> {
        Ok(hex::encode(Md5::digest(plaintext.as_bytes())))
    }
}

/// Character reversal standing in for a block cipher
pub struct ReverseTransform;

impl PasswordTransform for ReverseTransform {
    fn scheme(&self) -> Scheme {
        Scheme::ToyPermute
    }

    fn transform(&self, plaintext: &str) -> Result<String, TransformError> {
        Ok(plaintext.chars().rev().collect())
    }

    fn recover(&self, stored: &str) -> Result<String, TransformError> {
        Ok(stored.chars().rev().collect())
    }

    fn is_invertible(&self) -> bool {
        true
    }
}

/// SHA-256 over the plaintext followed by the shared salt
pub struct SaltedSha256Transform;

impl PasswordTransform for SaltedSha256Transform {
    fn scheme(&self) -> Scheme {
        Scheme::SaltedHash
    }

    fn transform(&self, plaintext: &str) -> Result<String, TransformError> {
        let mut hasher = Sha256::new();
        hasher.update(plaintext.as_bytes());
        hasher.update(SALT.as_bytes());
        Ok(hex::encode(hasher.finalize()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_answers() {
        assert_eq!(Base64Transform.transform("password").unwrap(), "cGFzc3dvcmQ=");
        assert_eq!(
            Md5Transform.transform("password").unwrap(),
            "5f4dcc3b5aa765d61d8327deb882cf99"
        );
        assert_eq!(ReverseTransform.transform("s3cret").unwrap(), "terc3s");

        let expected = hex::encode(Sha256::digest(b"passwordrandomSalt"));
        assert_eq!(SaltedSha256Transform.transform("password").unwrap(), expected);
    }

    #[test]
    fn test_transforms_are_deterministic() {
        let transforms: [&dyn PasswordTransform; 4] = [
            &Base64Transform,
            &Md5Transform,
            &ReverseTransform,
            &SaltedSha256Transform,
        ];
        for t in transforms {
            let first = t.transform("Password123!").unwrap();
            let second = t.transform("Password123!").unwrap();
            assert_eq!(first, second, "{} is not deterministic", t.scheme());
        }
    }

    #[test]
    fn test_invertible_schemes_recover_plaintext() {
        for input in ["s3cret", "пароль", "with space", "a"] {
            let encoded = Base64Transform.transform(input).unwrap();
            assert_eq!(Base64Transform.recover(&encoded).unwrap(), input);

            let reversed = ReverseTransform.transform(input).unwrap();
            assert_eq!(ReverseTransform.recover(&reversed).unwrap(), input);
        }
        assert!(Base64Transform.is_invertible());
        assert!(ReverseTransform.is_invertible());
    }

    #[test]
    fn test_hashes_are_one_way() {
        let password = "correct horse battery staple";

        let md5 = Md5Transform.transform(password).unwrap();
        assert_ne!(md5, password);
        assert_eq!(md5.len(), 32);
        assert!(md5.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));

        let salted = SaltedSha256Transform.transform(password).unwrap();
        assert_ne!(salted, password);
        assert_eq!(salted.len(), 64);

        assert!(matches!(
            Md5Transform.recover(&md5),
            Err(TransformError::NotInvertible(Scheme::FastHash))
        ));
        assert!(matches!(
            SaltedSha256Transform.recover(&salted),
            Err(TransformError::NotInvertible(Scheme::SaltedHash))
        ));
        assert!(!Md5Transform.is_invertible());
        assert!(!SaltedSha256Transform.is_invertible());
    }

    #[test]
    fn test_salt_changes_digest() {
        let plain = hex::encode(Sha256::digest(b"password"));
        assert_ne!(SaltedSha256Transform.transform("password").unwrap(), plain);
    }

    #[test]
    fn test_malformed_base64_is_rejected() {
        assert!(matches!(
            Base64Transform.recover("not base64!!"),
            Err(TransformError::Malformed(_))
        ));
        // 0xFF 0xFE is not valid UTF-8
        assert!(matches!(
            Base64Transform.recover("//4="),
            Err(TransformError::Malformed(_))
        ));
    }
}
