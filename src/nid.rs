use core::{fmt, str::FromStr};

use crate::{Error, Result};

/// Checks the NID character rules: an ASCII alphanumeric first character followed by
/// ASCII alphanumerics or hyphens.
fn has_valid_nid_chars(s: &str) -> bool {
    let mut bytes = s.bytes();
    bytes.next().map_or(false, |b| b.is_ascii_alphanumeric())
        && bytes.all(|b| b.is_ascii_alphanumeric() || b == b'-')
}

/// A validated [NID](https://datatracker.ietf.org/doc/html/rfc8141#section-2) (Namespace
/// identifier), the first part of a URN.
///
/// For example, in `urn:ietf:rfc:2648`, `ietf` is the namespace identifier. The value is stored
/// as given, without case folding, and compared case-sensitively.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NamespaceIdentifier(String);

impl NamespaceIdentifier {
    /// Shortest allowed NID.
    pub const MIN_LENGTH: usize = 2;
    /// Longest allowed NID.
    pub const MAX_LENGTH: usize = 32;

    /// Validate and wrap a namespace identifier.
    /// # Errors
    /// Returns [`Error::InvalidFormat`] if the value is shorter than [`Self::MIN_LENGTH`],
    /// longer than [`Self::MAX_LENGTH`], or contains characters outside `[0-9A-Za-z-]`
    /// (or starts with a hyphen).
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        let len = value.chars().count();
        if len < Self::MIN_LENGTH {
            return Err(Error::InvalidFormat(format!(
                "{value} is shorter than {}",
                Self::MIN_LENGTH
            )));
        }
        if len > Self::MAX_LENGTH {
            return Err(Error::InvalidFormat(format!(
                "{value} is longer than {}",
                Self::MAX_LENGTH
            )));
        }
        if !has_valid_nid_chars(&value) {
            return Err(Error::InvalidFormat(format!(
                "{value} contains invalid characters"
            )));
        }
        Ok(Self(value))
    }

    /// The identifier, exactly as it was given.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }

    /// Same as [`Self::value`].
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NamespaceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for NamespaceIdentifier {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<&str> for NamespaceIdentifier {
    type Error = Error;
    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<String> for NamespaceIdentifier {
    type Error = Error;
    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<NamespaceIdentifier> for String {
    fn from(nid: NamespaceIdentifier) -> Self {
        nid.0
    }
}

impl AsRef<str> for NamespaceIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for NamespaceIdentifier {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for NamespaceIdentifier {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(feature = "serde")]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
impl<'de> serde::Deserialize<'de> for NamespaceIdentifier {
    fn deserialize<D>(de: D) -> core::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(de)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}

#[cfg(feature = "serde")]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
impl serde::Serialize for NamespaceIdentifier {
    fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}
