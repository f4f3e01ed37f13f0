//! Domain identifier types with validation
//!
//! Newtype wrappers for identifiers that scope exported telemetry.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Instrumentation key newtype wrapper
///
/// Identifies the tenant that owns a batch of telemetry. The retry queue keeps
/// one storage directory per key, so records never leak between tenants.
///
/// # Examples
///
/// ```
/// use courier::domain::ids::InstrumentationKey;
/// use std::str::FromStr;
///
/// let key = InstrumentationKey::from_str("1aa11111-bbbb-1ccc-8ddd-eeeeffff3333").unwrap();
/// assert_eq!(key.as_str(), "1aa11111-bbbb-1ccc-8ddd-eeeeffff3333");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InstrumentationKey(String);

impl InstrumentationKey {
    /// Creates a new InstrumentationKey from a string
    ///
    /// # Returns
    ///
    /// Returns `Err` if the key is empty or contains whitespace
    pub fn new(key: impl Into<String>) -> Result<Self, String> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err("Instrumentation key cannot be empty".to_string());
        }
        if key.chars().any(char::is_whitespace) {
            return Err(format!(
                "Instrumentation key must not contain whitespace: '{key}'"
            ));
        }
        Ok(Self(key))
    }

    /// Returns the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Stable, filesystem-safe digest of the key
    ///
    /// Used as the name of the tenant's storage directory so the raw key
    /// never appears on disk.
    pub fn storage_digest(&self) -> String {
        let digest = Sha256::digest(self.0.as_bytes());
        let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
        hex[..32].to_string()
    }
}

impl fmt::Display for InstrumentationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for InstrumentationKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for InstrumentationKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<InstrumentationKey> for String {
    fn from(key: InstrumentationKey) -> Self {
        key.0
    }
}

impl AsRef<str> for InstrumentationKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
