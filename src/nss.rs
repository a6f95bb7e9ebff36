use core::{
    fmt,
    hash::{self, Hash},
    str::{FromStr, Split},
};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{percent, Error, Result};

/// One `pchar`: unreserved, percent-encoded octet, sub-delim, `:` or `@`.
macro_rules! pchar {
    () => {
        r"[A-Za-z0-9._~-]|%[A-Fa-f0-9]{2}|[!$&'()*+,;=]|:|@"
    };
}

/// A `pchar` followed by any number of `pchar`s, `/`s and `?`s. A single trailing newline
/// is tolerated.
static NSS_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!("^(?:", pchar!(), ")(?:", pchar!(), r"|/|\?)*\n?$"))
        .expect("NSS pattern is valid")
});

/// A [NSS](https://datatracker.ietf.org/doc/html/rfc8141#section-2) (Namespace-specific string)
/// identifying the resource within its namespace.
///
/// For example, in `urn:ietf:rfc:2648`, `rfc:2648` is the NSS. Both the percent-encoded form
/// (as it appears in the URN) and the decoded form are kept. Two NSSs are equal when their
/// encoded forms are.
#[derive(Clone, Debug)]
pub struct NamespaceSpecificString {
    encoded: String,
    decoded: String,
}

impl NamespaceSpecificString {
    /// Validate percent-encoded NSS text.
    /// # Errors
    /// Returns [`Error::InvalidFormat`] if the text is empty or isn't a valid NSS.
    pub fn new(encoded: impl Into<String>) -> Result<Self> {
        let encoded = encoded.into();
        if encoded.is_empty() || !NSS_PATTERN.is_match(&encoded) {
            return Err(Error::InvalidFormat("NSS string is invalid".to_owned()));
        }
        let decoded = percent::decode(&encoded).into_owned();
        Ok(Self { encoded, decoded })
    }

    /// Build a NSS from decoded text, percent-encoding it as needed.
    ///
    /// Every octet other than ASCII alphanumerics and `_ . - ~ /` gets escaped, so `:` is
    /// encoded as `%3A`.
    #[must_use]
    pub fn from_decoded(decoded: impl Into<String>) -> Self {
        let decoded = decoded.into();
        Self {
            encoded: percent::encode_path(&decoded),
            decoded,
        }
    }

    /// The percent-encoded form, as it appears in a URN.
    #[must_use]
    pub fn encoded(&self) -> &str {
        &self.encoded
    }

    /// The percent-decoded form.
    #[must_use]
    pub fn decoded(&self) -> &str {
        &self.decoded
    }

    /// Colon-separated parts of the decoded form. Consecutive colons yield empty parts.
    ///
    /// ```
    /// # use urnparse::NamespaceSpecificString;
    /// let nss = NamespaceSpecificString::new("de:bvb::19%2D146642").unwrap();
    /// assert_eq!(nss.parts().collect::<Vec<_>>(), ["de", "bvb", "", "19-146642"]);
    /// ```
    pub fn parts(&self) -> Split<'_, char> {
        self.decoded.split(':')
    }
}

impl PartialEq for NamespaceSpecificString {
    fn eq(&self, other: &Self) -> bool {
        self.encoded == other.encoded
    }
}

impl Eq for NamespaceSpecificString {}

impl Hash for NamespaceSpecificString {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.encoded.hash(state);
    }
}

impl PartialEq<str> for NamespaceSpecificString {
    fn eq(&self, other: &str) -> bool {
        self.encoded == other
    }
}

impl PartialEq<&str> for NamespaceSpecificString {
    fn eq(&self, other: &&str) -> bool {
        self.encoded == *other
    }
}

impl fmt::Display for NamespaceSpecificString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoded)
    }
}

impl FromStr for NamespaceSpecificString {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<&str> for NamespaceSpecificString {
    type Error = Error;
    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<String> for NamespaceSpecificString {
    type Error = Error;
    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl AsRef<str> for NamespaceSpecificString {
    fn as_ref(&self) -> &str {
        &self.encoded
    }
}

#[cfg(feature = "serde")]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
impl<'de> serde::Deserialize<'de> for NamespaceSpecificString {
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
impl serde::Serialize for NamespaceSpecificString {
    fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.encoded)
    }
}
