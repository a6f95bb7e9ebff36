//! A crate for parsing, validating and serializing [URNs](https://datatracker.ietf.org/doc/html/rfc8141).
//!
//! A URN is split into three parts: the [`NamespaceIdentifier`], the
//! [`NamespaceSpecificString`] and the optional [`RqfComponent`] (resolution, query and
//! fragment). Two URNs are equal when their NID and NSS are; the r/q/f-components are ignored.
//!
//! # Example
//! ```
//! # use urnparse::{Urn8141, UrnBuilder};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let urn = Urn8141::from_string("urn:tests:example:attributes:123?=key=value%3Asubvalue#example.org")?;
//! assert_eq!(urn.namespace_id(), "tests");
//! assert_eq!(urn.specific_string().parts().collect::<Vec<_>>(), ["example", "attributes", "123"]);
//! assert_eq!(urn.rqf_component().query()["key"], "value:subvalue");
//! assert_eq!(urn.to_string(), "urn:tests:example:attributes:123?=key=value%3Asubvalue#example.org");
//!
//! let built = UrnBuilder::new("tests", "example:attributes:123").build()?;
//! assert_eq!(urn, built);
//! # Ok(())
//! # }
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]

mod nid;
mod nss;
mod percent;
mod rqf;
mod urn;

pub use nid::NamespaceIdentifier;
pub use nss::NamespaceSpecificString;
pub use rqf::RqfComponent;
pub use urn::{ParseOptions, Urn8141, UrnBuilder};

/// A URN validation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The text doesn't follow the RFC 8141 syntax: bad scheme, too few `:` separators, or an
    /// invalid NID or NSS.
    #[error("invalid urn format: {0}")]
    InvalidFormat(String),
}

/// Result type used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;
