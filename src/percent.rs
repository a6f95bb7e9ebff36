//! Percent-encoding helpers shared by the NSS and RQF components.
use std::borrow::Cow;

use indexmap::IndexMap;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Octets left alone when escaping a single query key or value: `A-Z a-z 0-9 _ . - ~`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~');

/// Like [`COMPONENT`], but `/` is also kept as is.
const PATH: &AsciiSet = &COMPONENT.remove(b'/');

/// Percent-encode decoded NSS text.
pub(crate) fn encode_path(s: &str) -> String {
    utf8_percent_encode(s, PATH).to_string()
}

/// Percent-encode a query key or value. Spaces become `%20`, never `+`.
pub(crate) fn encode_component(s: &str) -> String {
    utf8_percent_encode(s, COMPONENT).to_string()
}

/// Decode `%XX` escapes. Malformed escapes are kept verbatim and invalid UTF-8 is replaced.
pub(crate) fn decode(s: &str) -> Cow<'_, str> {
    percent_decode_str(s).decode_utf8_lossy()
}

/// Decode an `&`-separated `key=value` list into a map.
///
/// Pieces without a value are dropped. When a key repeats, the first value is kept.
pub(crate) fn decode_pairs(s: &str) -> IndexMap<String, String> {
    let mut pairs = IndexMap::new();
    for (key, value) in form_urlencoded::parse(s.as_bytes()) {
        if value.is_empty() {
            continue;
        }
        pairs
            .entry(key.into_owned())
            .or_insert_with(|| value.into_owned());
    }
    pairs
}

/// Encode a map back into an `&`-separated `key=value` list.
pub(crate) fn encode_pairs(pairs: &IndexMap<String, String>) -> String {
    pairs
        .iter()
        .map(|(key, value)| format!("{}={}", encode_component(key), encode_component(value)))
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_encoding_keeps_slashes() {
        assert_eq!(encode_path("a b/c:d"), "a%20b/c%3Ad");
        assert_eq!(encode_path("ünï"), "%C3%BCn%C3%AF");
        assert_eq!(encode_path("A-z_0.9~"), "A-z_0.9~");
    }

    #[test]
    fn component_encoding_escapes_slashes() {
        assert_eq!(encode_component("a b/c"), "a%20b%2Fc");
        assert_eq!(encode_component("value:subvalue"), "value%3Asubvalue");
    }

    #[test]
    fn decode_leaves_malformed_escapes() {
        assert_eq!(decode("test%20space"), "test space");
        assert_eq!(decode("100%"), "100%");
        assert_eq!(decode("%zz%41"), "%zzA");
        assert_eq!(decode("%ff"), "\u{fffd}");
    }

    #[test]
    fn pairs_first_occurrence_wins() {
        let pairs = decode_pairs("a=1&b=2&a=3");
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs["a"], "1");
        assert_eq!(pairs["b"], "2");
    }

    #[test]
    fn pairs_drop_blank_values() {
        let pairs = decode_pairs("flag&empty=&x=a+b&&y=%7E");
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs["x"], "a b");
        assert_eq!(pairs["y"], "~");
    }

    #[test]
    fn pairs_keep_insertion_order() {
        let pairs = decode_pairs("z=1&a=2&m=3");
        let keys: Vec<_> = pairs.keys().map(String::as_str).collect();
        assert_eq!(keys, ["z", "a", "m"]);
        assert_eq!(encode_pairs(&pairs), "z=1&a=2&m=3");
    }

    #[test]
    fn pairs_encode_spaces_as_percent() {
        let mut pairs = IndexMap::new();
        pairs.insert("a key".to_owned(), "a test".to_owned());
        assert_eq!(encode_pairs(&pairs), "a%20key=a%20test");
    }
}
