use core::{
    fmt,
    hash::{self, Hash},
    str::FromStr,
};

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::{Error, NamespaceIdentifier, NamespaceSpecificString, Result, RqfComponent};

const URN_SCHEME: &str = "urn";

/// Options for [`Urn8141::from_string_with`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ParseOptions {
    encoded: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { encoded: true }
    }
}

impl ParseOptions {
    /// Default options: the NSS is expected to be percent-encoded already.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the NSS in the input is percent-encoded (and has to be validated), or decoded
    /// text that should be percent-encoded while parsing.
    #[must_use]
    pub fn encoded(mut self, encoded: bool) -> Self {
        self.encoded = encoded;
        self
    }

    /// Whether the NSS is expected to be percent-encoded.
    #[must_use]
    pub fn is_encoded(&self) -> bool {
        self.encoded
    }
}

/// Byte offset in `specific` where the NSS ends and the r/q/f-components begin.
///
/// The last occurrence of each separator is looked up in turn; a separator moves the boundary
/// only when it is found past the first byte and before the current boundary. Taking the last
/// occurrence keeps literal `?` and `#` characters earlier in the NSS intact.
fn nss_end(specific: &str) -> usize {
    [
        RqfComponent::RESOLUTION_SEPARATOR,
        RqfComponent::QUERY_SEPARATOR,
        RqfComponent::FRAGMENT_SEPARATOR,
    ]
    .iter()
    .fold(specific.len(), |end, separator| match specific.rfind(separator) {
        Some(i) if 0 < i && i < end => i,
        _ => end,
    })
}

fn parse_urn(s: &str, options: ParseOptions) -> Result<Urn8141> {
    let nid = s
        .split(':')
        .nth(1)
        .filter(|_| s.starts_with(URN_SCHEME) && s.matches(':').count() >= 2);
    let Some(nid) = nid else {
        debug!(urn = s, "missing urn scheme or separators");
        return Err(Error::InvalidFormat("URN string is invalid".to_owned()));
    };

    // The specific part starts right after `urn`, the NID and two separators, counted in
    // characters from the start of the input.
    let skip = URN_SCHEME.len() + nid.chars().count() + 2;
    let start = s.char_indices().nth(skip).map_or(s.len(), |(i, _)| i);
    let specific = s[start..].trim_end_matches('#');
    let end = nss_end(specific);
    let (nss, rqf) = specific.split_at(end);
    trace!(nid, nss, rqf, "split urn");

    let nid = NamespaceIdentifier::new(nid).map_err(|e| {
        debug!(urn = s, error = %e, "invalid namespace identifier");
        e
    })?;
    let nss = if options.encoded {
        NamespaceSpecificString::new(nss).map_err(|e| {
            debug!(urn = s, error = %e, "invalid namespace-specific string");
            e
        })?
    } else {
        NamespaceSpecificString::from_decoded(nss)
    };
    let rqf = RqfComponent::parse(rqf);

    Ok(Urn8141::new(nid, nss, rqf))
}

/// An [RFC 8141](https://datatracker.ietf.org/doc/html/rfc8141) URN (Uniform Resource Name).
///
/// **Note:** equivalence is decided [as in the RFC](https://www.rfc-editor.org/rfc/rfc8141.html#section-3),
/// only taking the NID and NSS into account. Compare the [`Display`](fmt::Display) output if the
/// r-, q- and f-components matter too.
#[derive(Clone, Debug)]
pub struct Urn8141 {
    nid: NamespaceIdentifier,
    nss: NamespaceSpecificString,
    rqf: RqfComponent,
}

impl Urn8141 {
    /// Assemble a URN from already validated parts.
    #[must_use]
    pub fn new(nid: NamespaceIdentifier, nss: NamespaceSpecificString, rqf: RqfComponent) -> Self {
        Self { nid, nss, rqf }
    }

    /// Parse a URN whose NSS is percent-encoded.
    ///
    /// ```
    /// # use urnparse::Urn8141;
    /// # fn main() -> Result<(), urnparse::Error> {
    /// let urn = Urn8141::from_string("urn:example:weather?=op=map&lat=39.56#now")?;
    /// assert_eq!(urn.namespace_id(), "example");
    /// assert_eq!(urn.specific_string(), "weather");
    /// assert_eq!(urn.rqf_component().query()["lat"], "39.56");
    /// # Ok(())
    /// # }
    /// ```
    /// # Errors
    /// Returns [`Error::InvalidFormat`] if the string doesn't start with `urn`, has fewer than
    /// two `:`, or has an invalid NID or NSS. A malformed r/q/f suffix is not an error: it is
    /// ignored and the URN gets an empty [`RqfComponent`].
    pub fn from_string(s: &str) -> Result<Self> {
        parse_urn(s, ParseOptions::default())
    }

    /// Parse a URN with the given options.
    /// # Errors
    /// See [`Urn8141::from_string`].
    pub fn from_string_with(s: &str, options: ParseOptions) -> Result<Self> {
        parse_urn(s, options)
    }

    /// NID (Namespace identifier), the first part of the URN.
    ///
    /// For example, in `urn:ietf:rfc:2648`, `ietf` is the namespace.
    #[must_use]
    pub fn namespace_id(&self) -> &NamespaceIdentifier {
        &self.nid
    }

    /// NSS (Namespace-specific string) identifying the resource.
    ///
    /// For example, in `urn:ietf:rfc:2648`, `rfc:2648` is the NSS.
    #[must_use]
    pub fn specific_string(&self) -> &NamespaceSpecificString {
        &self.nss
    }

    /// r-, q- and f-components following the NSS.
    ///
    /// Should not be used for equivalence checks.
    #[must_use]
    pub fn rqf_component(&self) -> &RqfComponent {
        &self.rqf
    }

    /// Split the URN into its NID, NSS and r/q/f-components.
    #[must_use]
    pub fn into_parts(self) -> (NamespaceIdentifier, NamespaceSpecificString, RqfComponent) {
        (self.nid, self.nss, self.rqf)
    }
}

impl PartialEq for Urn8141 {
    fn eq(&self, other: &Self) -> bool {
        self.nid == other.nid && self.nss == other.nss
    }
}

impl Eq for Urn8141 {}

impl Hash for Urn8141 {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.nid.hash(state);
        self.nss.hash(state);
    }
}

impl fmt::Display for Urn8141 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{URN_SCHEME}:{}:{}{}", self.nid, self.nss, self.rqf)
    }
}

impl FromStr for Urn8141 {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        Self::from_string(s)
    }
}

impl TryFrom<&str> for Urn8141 {
    type Error = Error;
    fn try_from(value: &str) -> Result<Self> {
        Self::from_string(value)
    }
}

impl TryFrom<String> for Urn8141 {
    type Error = Error;
    fn try_from(value: String) -> Result<Self> {
        Self::from_string(&value)
    }
}

#[cfg(feature = "serde")]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
impl<'de> serde::Deserialize<'de> for Urn8141 {
    fn deserialize<D>(de: D) -> core::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(de)?;
        Self::from_string(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(feature = "serde")]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
impl serde::Serialize for Urn8141 {
    fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[derive(Debug)]
enum NssText {
    Encoded(String),
    Decoded(String),
}

/// A struct used for constructing URNs.
#[derive(Debug)]
pub struct UrnBuilder {
    nid: String,
    nss: NssText,
    resolution: IndexMap<String, String>,
    query: IndexMap<String, String>,
    fragment: String,
}

impl UrnBuilder {
    /// Create a new UrnBuilder. The NSS must already be percent-encoded.
    pub fn new(nid: &str, nss: &str) -> Self {
        Self {
            nid: nid.to_owned(),
            nss: NssText::Encoded(nss.to_owned()),
            resolution: IndexMap::new(),
            query: IndexMap::new(),
            fragment: String::new(),
        }
    }
    /// Change the namespace.
    pub fn namespace(mut self, nid: &str) -> Self {
        self.nid = nid.to_owned();
        self
    }
    /// Change the namespace-specific string (percent-encoded).
    pub fn nss(mut self, nss: &str) -> Self {
        self.nss = NssText::Encoded(nss.to_owned());
        self
    }
    /// Change the namespace-specific string to decoded text, which gets percent-encoded.
    pub fn decoded_nss(mut self, nss: &str) -> Self {
        self.nss = NssText::Decoded(nss.to_owned());
        self
    }
    /// Add a resolution argument. A key that is already set keeps its value.
    pub fn resolution(mut self, key: &str, value: &str) -> Self {
        self.resolution
            .entry(key.to_owned())
            .or_insert_with(|| value.to_owned());
        self
    }
    /// Add a query argument. A key that is already set keeps its value.
    pub fn query(mut self, key: &str, value: &str) -> Self {
        self.query
            .entry(key.to_owned())
            .or_insert_with(|| value.to_owned());
        self
    }
    /// Change the fragment.
    pub fn fragment(mut self, fragment: &str) -> Self {
        self.fragment = fragment.to_owned();
        self
    }
    /// [Validate the data](https://datatracker.ietf.org/doc/html/rfc8141#section-2) and create the URN.
    ///
    /// # Example
    /// ```
    /// # use urnparse::{Urn8141, UrnBuilder};
    /// # fn main() -> Result<(), urnparse::Error> {
    /// let urn = UrnBuilder::new("example", "1234:5678")
    ///     .query("lang", "en gb")
    ///     .build()?;
    /// assert_eq!(urn.to_string(), "urn:example:1234:5678?=lang=en%20gb");
    /// assert_eq!(urn, Urn8141::from_string("urn:example:1234:5678")?);
    /// # Ok(())
    /// # }
    /// ```
    /// # Errors
    /// Returns [`Error::InvalidFormat`] if the NID or the encoded NSS is invalid.
    pub fn build(self) -> Result<Urn8141> {
        let nid = NamespaceIdentifier::new(self.nid)?;
        let nss = match self.nss {
            NssText::Encoded(nss) => NamespaceSpecificString::new(nss)?,
            NssText::Decoded(nss) => NamespaceSpecificString::from_decoded(nss),
        };
        let rqf = RqfComponent::from_parts(self.resolution, self.query, self.fragment);
        Ok(Urn8141::new(nid, nss, rqf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const EXAMPLE: &str = "urn:tests:example:attributes:123?=key=value%3Asubvalue#example.org";

    #[test]
    fn parses_components() {
        let urn = Urn8141::from_string(EXAMPLE).unwrap();
        assert_eq!(urn.namespace_id(), "tests");
        assert_eq!(urn.specific_string(), "example:attributes:123");
        assert_eq!(urn.rqf_component(), "?=key=value%3Asubvalue#example.org");
        assert_eq!(urn.rqf_component().query()["key"], "value:subvalue");
        assert_eq!(urn.to_string(), EXAMPLE);
    }

    #[test]
    fn equality_ignores_rqf() {
        let urn = Urn8141::from_string(EXAMPLE).unwrap();
        let other_nss = Urn8141::from_string(
            "urn:tests:example:attributes:234?=key=value%3Asubvalue#example.org",
        )
        .unwrap();
        assert_ne!(urn, other_nss);

        let other_rqf = Urn8141::from_string("urn:tests:example:attributes:123?+r=1#other").unwrap();
        assert_eq!(urn, other_rqf);
        let bare = Urn8141::from_string("urn:tests:example:attributes:123").unwrap();
        assert_eq!(urn, bare);

        let set: HashSet<_> = [urn, other_rqf, bare, other_nss].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn rejects_wrong_scheme() {
        for s in [
            "uri:tests:example:attributes:234?=key=value%3Asubvalue#example.org",
            "uri:tests#example.org",
            "URN:tests:abc",
            "urn:tests",
            "urn",
            "",
        ] {
            assert_eq!(
                Urn8141::from_string(s),
                Err(Error::InvalidFormat("URN string is invalid".to_owned())),
                "{s}"
            );
        }
    }

    #[test]
    fn rejects_invalid_nid_and_nss() {
        for s in [
            "urn:-example:abcd",
            "urn:a:abcd",
            "urn::abcd",
            "urn:example:/abcd",
            "urn:example:",
            "urn:example:%",
            "urn:example:%a_",
            "urn:example:a b",
            "urn:example:#",
        ] {
            assert!(
                matches!(Urn8141::from_string(s), Err(Error::InvalidFormat(_))),
                "{s}"
            );
        }
    }

    #[test]
    fn boundary_uses_last_separators() {
        assert_eq!(nss_end("abc"), 3);
        assert_eq!(nss_end("abc#f"), 3);
        assert_eq!(nss_end("a?+r?=q#f"), 1);
        assert_eq!(nss_end("#abc"), 4);
        assert_eq!(nss_end("a#b#c"), 3);
        assert_eq!(nss_end("a?=x?+y"), 1);
    }

    #[test]
    fn specific_part_is_cut_by_position() {
        // the scheme is only checked as a prefix, so the NSS starts a fixed number of
        // characters after it
        let urn = Urn8141::from_string("urnfoo:ab:cd").unwrap();
        assert_eq!(urn.namespace_id(), "ab");
        assert_eq!(urn.specific_string(), "ab:cd");
        assert_eq!(urn.to_string(), "urn:ab:ab:cd");

        let err = Urn8141::from_string("urn:né:abc").unwrap_err();
        assert_eq!(err, Error::InvalidFormat("né contains invalid characters".to_owned()));
    }

    #[test]
    fn trailing_newline_is_tolerated() {
        let urn = Urn8141::from_string("urn:ab:cd?=a=b\n").unwrap();
        assert_eq!(urn.specific_string(), "cd");
        assert_eq!(urn.rqf_component().query()["a"], "b");

        let urn = Urn8141::from_string("urn:ab:cd\n").unwrap();
        assert_eq!(urn.specific_string().decoded(), "cd\n");
        assert!(Urn8141::from_string("urn:ab:c\nd").is_err());
    }

    #[test]
    fn separator_at_start_stays_in_nss() {
        // a leading `?` can't start an NSS
        assert!(Urn8141::from_string("urn:example:?=a=b").is_err());
        // only the last `#` starts the fragment, and `#` isn't allowed in an NSS
        assert!(Urn8141::from_string("urn:example:a#b#c").is_err());
        assert!(Urn8141::from_string("urn:example:#abc").is_err());
    }

    #[test]
    fn literal_question_mark_in_nss() {
        let urn = Urn8141::from_string("urn:example:a?b?=q=1").unwrap();
        assert_eq!(urn.specific_string(), "a?b");
        assert_eq!(urn.rqf_component().query()["q"], "1");
        assert_eq!(urn.to_string(), "urn:example:a?b?=q=1");
    }

    #[test]
    fn full_rqf_round_trip() {
        let s = "urn:example:foo-bar-baz-qux?+CCResolve=uk?=op=map&lat=39.56#test";
        let urn = Urn8141::from_string(s).unwrap();
        assert_eq!(urn.specific_string(), "foo-bar-baz-qux");
        assert_eq!(urn.rqf_component().resolution()["CCResolve"], "uk");
        assert_eq!(urn.rqf_component().query().len(), 2);
        assert_eq!(urn.rqf_component().fragment(), "test");
        assert_eq!(urn.to_string(), s);
    }

    #[test]
    fn out_of_order_rqf_is_dropped() {
        let urn = Urn8141::from_string("urn:example:abc#f?+r=1").unwrap();
        assert_eq!(urn.specific_string(), "abc");
        assert_eq!(urn.rqf_component().fragment(), "f?+r=1");

        let urn = Urn8141::from_string("urn:example:abc?=q=1?+r=1").unwrap();
        assert_eq!(urn.specific_string(), "abc");
        assert_eq!(urn.rqf_component().query()["q"], "1? r=1");
    }

    #[test]
    fn trailing_hashes_are_stripped() {
        let urn = Urn8141::from_string("urn:example:abc##").unwrap();
        assert_eq!(urn.specific_string(), "abc");
        assert!(urn.rqf_component().is_empty());
        assert_eq!(urn.to_string(), "urn:example:abc");
    }

    #[test]
    fn nid_keeps_case() {
        let urn = Urn8141::from_string("urn:ExAmPlE:abc").unwrap();
        assert_eq!(urn.namespace_id(), "ExAmPlE");
        assert_ne!(urn, Urn8141::from_string("urn:example:abc").unwrap());
    }

    #[test]
    fn decoded_nss_option() {
        let options = ParseOptions::new().encoded(false);
        assert!(!options.is_encoded());
        let urn = Urn8141::from_string_with("urn:example:a b:c?=x=1", options).unwrap();
        assert_eq!(urn.specific_string().encoded(), "a%20b%3Ac");
        assert_eq!(urn.specific_string().decoded(), "a b:c");
        assert_eq!(urn.to_string(), "urn:example:a%20b%3Ac?=x=1");
    }

    #[test]
    fn trait_conversions() {
        let urn: Urn8141 = "urn:nbn:de:bvb:19-146642".parse().unwrap();
        assert_eq!(urn, Urn8141::try_from("urn:nbn:de:bvb:19-146642").unwrap());
        assert_eq!(urn, Urn8141::try_from(urn.to_string()).unwrap());
        let (nid, nss, rqf) = urn.into_parts();
        assert_eq!(nid, "nbn");
        assert_eq!(nss.parts().count(), 3);
        assert!(rqf.is_empty());
    }

    #[test]
    fn builder() {
        let urn = UrnBuilder::new("example", "foo")
            .resolution("CCResolve", "uk")
            .query("a", "first")
            .query("a", "second")
            .fragment("top")
            .build()
            .unwrap();
        assert_eq!(urn.to_string(), "urn:example:foo?+CCResolve=uk?=a=first#top");

        let urn = UrnBuilder::new("example", "unused")
            .namespace("other")
            .decoded_nss("a b")
            .build()
            .unwrap();
        assert_eq!(urn.to_string(), "urn:other:a%20b");

        assert!(UrnBuilder::new("x", "abc").build().is_err());
        assert!(UrnBuilder::new("example", "abc").nss("a b").build().is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_as_string() {
        let urn = Urn8141::from_string(EXAMPLE).unwrap();
        let json = serde_json::to_string(&urn).unwrap();
        assert_eq!(json, format!("\"{EXAMPLE}\""));
        let back: Urn8141 = serde_json::from_str(&json).unwrap();
        assert_eq!(back.to_string(), EXAMPLE);
        assert!(serde_json::from_str::<Urn8141>("\"uri:tests:abc\"").is_err());
    }
}
