use core::{
    fmt,
    hash::{self, Hash},
};

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::percent;

/// Splits a non-empty suffix into its r-, q- and f-components, in that order. Each component is
/// optional, and every capture is lazy so that the next separator ends the previous component.
/// A single trailing newline is left out of the last component.
static RQF_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:\?\+(?P<resolution>.*?))?(?:\?=(?P<query>.*?))?(?:#(?P<fragment>.*?))?\n?$",
    )
    .expect("RQF pattern is valid")
});

/// The optional r-, q- and f-components trailing the NSS.
///
/// The r-component (after `?+`) and q-component (after `?=`) are decoded as `key=value` lists.
/// When a key appears more than once, the first value is kept. The f-component (after `#`) is
/// kept verbatim.
///
/// None of these take part in URN equivalence.
#[derive(Clone, Debug, Default)]
pub struct RqfComponent {
    resolution: IndexMap<String, String>,
    query: IndexMap<String, String>,
    fragment: String,
}

impl RqfComponent {
    /// Marks the start of the r-component.
    pub const RESOLUTION_SEPARATOR: &'static str = "?+";
    /// Marks the start of the q-component.
    pub const QUERY_SEPARATOR: &'static str = "?=";
    /// Marks the start of the f-component.
    pub const FRAGMENT_SEPARATOR: &'static str = "#";

    /// Build the component from the raw (still encoded) text of each part, without separators.
    ///
    /// This never fails: pieces that can't be read as `key=value` are skipped.
    ///
    /// ```
    /// # use urnparse::RqfComponent;
    /// let rqf = RqfComponent::new("", "a=a%20test&b=b%20test", "example.org");
    /// assert_eq!(rqf.query()["a"], "a test");
    /// assert_eq!(rqf.fragment(), "example.org");
    /// assert_eq!(rqf.to_string(), "?=a=a%20test&b=b%20test#example.org");
    /// ```
    #[must_use]
    pub fn new(resolution: &str, query: &str, fragment: &str) -> Self {
        Self {
            resolution: percent::decode_pairs(resolution),
            query: percent::decode_pairs(query),
            fragment: fragment.to_owned(),
        }
    }

    /// Build the component from already decoded arguments.
    #[must_use]
    pub fn from_parts(
        resolution: IndexMap<String, String>,
        query: IndexMap<String, String>,
        fragment: impl Into<String>,
    ) -> Self {
        Self {
            resolution,
            query,
            fragment: fragment.into(),
        }
    }

    /// Split a suffix such as `?+res=1?=q=2#frag` into its parts.
    ///
    /// An empty suffix, or one that doesn't follow the `?+`, `?=`, `#` order, gives an empty
    /// component.
    pub(crate) fn parse(suffix: &str) -> Self {
        if suffix.is_empty() {
            return Self::default();
        }
        let Some(captures) = RQF_PATTERN.captures(suffix) else {
            tracing::debug!(suffix, "unrecognised rqf component, ignoring it");
            return Self::default();
        };
        let group = |name| captures.name(name).map_or("", |m| m.as_str());
        Self::new(group("resolution"), group("query"), group("fragment"))
    }

    /// Resolution arguments, following `?+`.
    #[must_use]
    pub fn resolution(&self) -> &IndexMap<String, String> {
        &self.resolution
    }

    /// Query arguments, following `?=`.
    #[must_use]
    pub fn query(&self) -> &IndexMap<String, String> {
        &self.query
    }

    /// Fragment, following `#`.
    #[must_use]
    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    /// Whether there are no resolution arguments, no query arguments and no fragment.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resolution.is_empty() && self.query.is_empty() && self.fragment.is_empty()
    }
}

impl fmt::Display for RqfComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.resolution.is_empty() {
            f.write_str(Self::RESOLUTION_SEPARATOR)?;
            f.write_str(&percent::encode_pairs(&self.resolution))?;
        }
        if !self.query.is_empty() {
            f.write_str(Self::QUERY_SEPARATOR)?;
            f.write_str(&percent::encode_pairs(&self.query))?;
        }
        if !self.fragment.is_empty() {
            f.write_str(Self::FRAGMENT_SEPARATOR)?;
            f.write_str(&self.fragment)?;
        }
        Ok(())
    }
}

impl PartialEq for RqfComponent {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}

impl Eq for RqfComponent {}

impl Hash for RqfComponent {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.to_string().hash(state);
    }
}

impl PartialEq<str> for RqfComponent {
    fn eq(&self, other: &str) -> bool {
        self.to_string() == other
    }
}

impl PartialEq<&str> for RqfComponent {
    fn eq(&self, other: &&str) -> bool {
        self.to_string() == *other
    }
}
