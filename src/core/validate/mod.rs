// ─── Validators ───
// Integrity checks attached to resources by the `validate` directive.

use std::fmt;

use md5::Md5;
use sha1::{Digest, Sha1};
use sha2::Sha256;

use crate::core::error::{LauncherError, LauncherResult};

/// Digest algorithms accepted in validator specs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    Sha1,
    Sha256,
    Md5,
}

impl DigestAlgorithm {
    fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "sha1" | "sha-1" => Some(DigestAlgorithm::Sha1),
            "sha256" | "sha-256" => Some(DigestAlgorithm::Sha256),
            "md5" => Some(DigestAlgorithm::Md5),
            _ => None,
        }
    }

    fn digest_len(self) -> usize {
        match self {
            DigestAlgorithm::Sha1 => 20,
            DigestAlgorithm::Sha256 => 32,
            DigestAlgorithm::Md5 => 16,
        }
    }

    pub fn digest(self, bytes: &[u8]) -> Vec<u8> {
        match self {
            DigestAlgorithm::Sha1 => Sha1::digest(bytes).to_vec(),
            DigestAlgorithm::Sha256 => Sha256::digest(bytes).to_vec(),
            DigestAlgorithm::Md5 => Md5::digest(bytes).to_vec(),
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DigestAlgorithm::Sha1 => write!(f, "sha1"),
            DigestAlgorithm::Sha256 => write!(f, "sha256"),
            DigestAlgorithm::Md5 => write!(f, "md5"),
        }
    }
}

/// A check applied to the bytes of a fetched resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Validator {
    Digest {
        algorithm: DigestAlgorithm,
        expected: Vec<u8>,
    },
}

impl Validator {
    /// Parse a validator spec of the form `ALGO:HEX`.
    ///
    /// `none` and the empty string denote "no validation" and yield `Ok(None)`.
    pub fn parse(spec: &str) -> LauncherResult<Option<Self>> {
        let spec = spec.trim();
        if spec.is_empty() || spec.eq_ignore_ascii_case("none") {
            return Ok(None);
        }

        let malformed = || LauncherError::MalformedValidator(spec.to_string());
        let (name, hex_digest) = spec.split_once(':').ok_or_else(malformed)?;
        let algorithm = DigestAlgorithm::from_name(name).ok_or_else(malformed)?;
        let expected = hex::decode(hex_digest).map_err(|_| malformed())?;
        if expected.len() != algorithm.digest_len() {
            return Err(malformed());
        }

        Ok(Some(Validator::Digest {
            algorithm,
            expected,
        }))
    }

    /// Verify `bytes` fetched from `uri`.
    pub fn check(&self, uri: &str, bytes: &[u8]) -> LauncherResult<()> {
        match self {
            Validator::Digest {
                algorithm,
                expected,
            } => {
                let actual = algorithm.digest(bytes);
                if &actual != expected {
                    return Err(LauncherError::ValidationFailed {
                        uri: uri.to_string(),
                        validator: self.to_string(),
                        actual: hex::encode(actual),
                    });
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Validator::Digest {
                algorithm,
                expected,
            } => write!(f, "{}:{}", algorithm, hex::encode(expected)),
        }
    }
}

impl serde::Serialize for Validator {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}
