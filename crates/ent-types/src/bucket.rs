use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::key::validate_bucket_name;

/// A named partition of the object namespace.
///
/// The bucket carries configuration such as ownership. It is the place where
/// future concepts like quotas and permissions belong. Bucket names are unique
/// within a registry and immutable once loaded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    /// Partition identifier, also the bucket's directory name on disk.
    pub name: String,
    /// The single owner of this bucket.
    pub owner: Owner,
}

impl Bucket {
    /// Create a new bucket given a name and an owner.
    pub fn new(name: impl Into<String>, owner: Owner) -> Self {
        Self {
            name: name.into(),
            owner,
        }
    }

    /// Check that the bucket is usable as a storage partition.
    pub fn validate(&self) -> Result<(), TypeError> {
        validate_bucket_name(&self.name)?;
        self.owner.email.validate()
    }
}

/// The identity of a person or group owning a bucket.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub email: EmailAddress,
}

impl Owner {
    pub fn new(email: EmailAddress) -> Self {
        Self { email }
    }
}

/// A mail address with an optional display name.
///
/// Serialized with capitalised field names (`Name`, `Address`) to stay
/// compatible with existing policy files.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAddress {
    /// Display name, empty when absent.
    #[serde(rename = "Name", default)]
    pub name: String,
    /// The `local@domain` address.
    #[serde(rename = "Address")]
    pub address: String,
}

impl EmailAddress {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }

    /// Parse `"Display Name <local@domain>"` or a bare `"local@domain"`.
    pub fn parse(input: &str) -> Result<Self, TypeError> {
        let trimmed = input.trim();
        let parsed = match trimmed.rfind('<') {
            Some(open) => {
                let rest = &trimmed[open + 1..];
                let address = rest.strip_suffix('>').ok_or_else(|| TypeError::InvalidEmail {
                    input: input.to_string(),
                    reason: "missing closing '>'".into(),
                })?;
                let name = trimmed[..open].trim().trim_matches('"').trim();
                Self::new(name, address.trim())
            }
            None => Self::new("", trimmed),
        };
        parsed.validate()?;
        Ok(parsed)
    }

    /// Check the address part for a plausible `local@domain` shape.
    pub fn validate(&self) -> Result<(), TypeError> {
        let invalid = |reason: &str| TypeError::InvalidEmail {
            input: self.address.clone(),
            reason: reason.to_string(),
        };

        if self.address.chars().any(|c| c.is_whitespace() || c == '<' || c == '>') {
            return Err(invalid("contains whitespace or angle brackets"));
        }
        let (local, domain) = self
            .address
            .split_once('@')
            .ok_or_else(|| invalid("missing '@'"))?;
        if local.is_empty() || domain.is_empty() {
            return Err(invalid("empty local part or domain"));
        }
        if domain.contains('@') {
            return Err(invalid("more than one '@'"));
        }
        Ok(())
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "<{}>", self.address)
        } else {
            write!(f, "\"{}\" <{}>", self.name, self.address)
        }
    }
}
