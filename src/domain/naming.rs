// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource Naming Value Objects
//!
//! Every physical name in a declaration set is derived from a single
//! namespace prefix. Logical identifiers used in synthesized templates are
//! derived from those names.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use thiserror::Error;

/// Naming validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NameError {
    #[error("Name is empty")]
    Empty,

    #[error("Name exceeds maximum length of {max} characters: {name}")]
    TooLong { name: String, max: usize },

    #[error("Name is shorter than {min} characters: {name}")]
    TooShort { name: String, min: usize },

    #[error("Invalid character {ch:?} in name: {name}")]
    InvalidCharacter { name: String, ch: char },

    #[error("Name must start with a lowercase letter: {0}")]
    InvalidStart(String),

    #[error("Name cannot end with a hyphen or dot: {0}")]
    InvalidEnd(String),

    #[error("Name cannot contain consecutive separators: {0}")]
    ConsecutiveSeparators(String),

    #[error("Bucket name cannot be formatted as an IP address: {0}")]
    IpFormatted(String),

    #[error("Bucket name uses a reserved prefix or suffix: {0}")]
    Reserved(String),
}

fn check_charset(name: &str, extra: &[char]) -> Result<(), NameError> {
    match name
        .chars()
        .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-' || extra.contains(c)))
    {
        Some(ch) => Err(NameError::InvalidCharacter {
            name: name.to_string(),
            ch,
        }),
        None => Ok(()),
    }
}

/// Namespace prefix for a declaration set
///
/// Invariants:
/// - 1-40 characters
/// - Lowercase letters, digits and hyphens
/// - Starts with a letter, does not end with a hyphen
/// - No consecutive hyphens
///
/// # Examples
///
/// ```rust
/// use cim_cloud_stack::domain::NamePrefix;
///
/// let prefix = NamePrefix::new("backend-api").unwrap();
/// assert_eq!(prefix.derive("vpc").unwrap().as_str(), "backend-api-vpc");
/// assert!(NamePrefix::new("Backend").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NamePrefix(String);

impl NamePrefix {
    pub const MAX_LENGTH: usize = 40;

    pub fn new(prefix: impl Into<String>) -> Result<Self, NameError> {
        let prefix = prefix.into();

        if prefix.is_empty() {
            return Err(NameError::Empty);
        }
        if prefix.len() > Self::MAX_LENGTH {
            return Err(NameError::TooLong {
                name: prefix,
                max: Self::MAX_LENGTH,
            });
        }
        check_charset(&prefix, &[])?;
        if !prefix.starts_with(|c: char| c.is_ascii_lowercase()) {
            return Err(NameError::InvalidStart(prefix));
        }
        if prefix.ends_with('-') {
            return Err(NameError::InvalidEnd(prefix));
        }
        if prefix.contains("--") {
            return Err(NameError::ConsecutiveSeparators(prefix));
        }

        Ok(Self(prefix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derive `<prefix>-<suffix>`
    pub fn derive(&self, suffix: &str) -> Result<ResourceName, NameError> {
        ResourceName::derived(self, suffix)
    }
}

impl fmt::Display for NamePrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for NamePrefix {
    type Error = NameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for NamePrefix {
    type Error = NameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NamePrefix> for String {
    fn from(value: NamePrefix) -> Self {
        value.0
    }
}

/// Physical resource name, always `<prefix>-<suffix>`
///
/// Only constructible through [`NamePrefix::derive`], so every name in a
/// declaration set carries its namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ResourceName(String);

impl ResourceName {
    pub const MAX_LENGTH: usize = 63;

    fn derived(prefix: &NamePrefix, suffix: &str) -> Result<Self, NameError> {
        if suffix.is_empty() {
            return Err(NameError::Empty);
        }
        check_charset(suffix, &[])?;
        if suffix.starts_with('-') {
            return Err(NameError::InvalidStart(suffix.to_string()));
        }
        if suffix.ends_with('-') {
            return Err(NameError::InvalidEnd(suffix.to_string()));
        }
        if suffix.contains("--") {
            return Err(NameError::ConsecutiveSeparators(suffix.to_string()));
        }

        let name = format!("{}-{}", prefix.as_str(), suffix);
        if name.len() > Self::MAX_LENGTH {
            return Err(NameError::TooLong {
                name,
                max: Self::MAX_LENGTH,
            });
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check the name lives in `prefix`'s namespace
    pub fn has_prefix(&self, prefix: &NamePrefix) -> bool {
        self.0
            .strip_prefix(prefix.as_str())
            .is_some_and(|rest| rest.starts_with('-'))
    }

    /// Logical id for this name (`backend-api-vpc` -> `BackendApiVpc`)
    pub fn logical_id(&self) -> LogicalId {
        LogicalId::from_name(&self.0)
    }
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ResourceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Alphanumeric identifier of a resource inside a synthesized template
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogicalId(String);

impl LogicalId {
    /// PascalCase the hyphen/dot separated segments of `name`
    pub fn from_name(name: &str) -> Self {
        let id = name
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|segment| !segment.is_empty())
            .map(|segment| {
                let mut chars = segment.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                    None => String::new(),
                }
            })
            .collect();
        Self(id)
    }

    /// Child id, e.g. `BackendApiVpc` + `PublicSubnet1`
    pub fn child(&self, suffix: &str) -> Self {
        Self(format!("{}{}", self.0, Self::from_name(suffix).0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LogicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// S3 bucket name
///
/// Invariants (S3 general purpose bucket rules):
/// - 3-63 characters
/// - Lowercase letters, digits, hyphens and dots
/// - Begins and ends with a letter or digit
/// - No consecutive dots
/// - Not formatted as an IPv4 address
/// - No `xn--` prefix or `-s3alias` suffix
///
/// Global uniqueness can only be checked by the provider; a collision is
/// reported by the provisioning engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BucketName(String);

impl BucketName {
    pub const MIN_LENGTH: usize = 3;
    pub const MAX_LENGTH: usize = 63;

    pub fn new(name: impl Into<String>) -> Result<Self, NameError> {
        let name = name.into();

        if name.is_empty() {
            return Err(NameError::Empty);
        }
        if name.len() < Self::MIN_LENGTH {
            return Err(NameError::TooShort {
                name,
                min: Self::MIN_LENGTH,
            });
        }
        if name.len() > Self::MAX_LENGTH {
            return Err(NameError::TooLong {
                name,
                max: Self::MAX_LENGTH,
            });
        }
        check_charset(&name, &['.'])?;

        let alnum = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit();
        if !name.starts_with(alnum) {
            return Err(NameError::InvalidStart(name));
        }
        if !name.ends_with(alnum) {
            return Err(NameError::InvalidEnd(name));
        }
        if name.contains("..") {
            return Err(NameError::ConsecutiveSeparators(name));
        }
        if name.parse::<Ipv4Addr>().is_ok() {
            return Err(NameError::IpFormatted(name));
        }
        if name.starts_with("xn--") || name.ends_with("-s3alias") {
            return Err(NameError::Reserved(name));
        }

        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BucketName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for BucketName {
    type Error = NameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BucketName> for String {
    fn from(value: BucketName) -> Self {
        value.0
    }
}
