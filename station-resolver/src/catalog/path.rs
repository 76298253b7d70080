//! Opaque references to one extended station of one catalog version.
//!
//! A reference reads `"{named}.{extended}.{hash}"`. It stays valid only
//! while the catalog that issued it is the published one; after a rebuild
//! that changed the station set it is rejected as stale rather than
//! resolved against different data.

use std::fmt;
use std::str::FromStr;

use crate::domain::LookupError;

use super::hierarchy::{ExtendedStation, NamedStation, NamedStationId};
use super::registry::StationCatalog;

/// A decoded station reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationRef {
    pub named: NamedStationId,
    pub extended: usize,
    pub catalog_hash: String,
}

impl StationRef {
    /// Reference to `extended` within `named`, bound to `catalog`.
    pub fn new(catalog: &StationCatalog, named: NamedStationId, extended: usize) -> Self {
        Self {
            named,
            extended,
            catalog_hash: catalog.hash().to_string(),
        }
    }

    /// Parse the reference format without consulting a catalog.
    pub fn parse(s: &str) -> Result<Self, LookupError> {
        let mut parts = s.split('.');
        let (Some(named), Some(extended), Some(hash), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(LookupError::InvalidReference {
                reason: "expected three dot-separated parts",
            });
        };

        let named = parse_index::<u32>(named).ok_or(LookupError::InvalidReference {
            reason: "named station index is not a number",
        })?;
        let extended = parse_index::<usize>(extended).ok_or(LookupError::InvalidReference {
            reason: "extended station index is not a number",
        })?;

        if hash.is_empty() {
            return Err(LookupError::InvalidReference {
                reason: "missing catalog hash",
            });
        }

        Ok(Self {
            named: NamedStationId(named),
            extended,
            catalog_hash: hash.to_string(),
        })
    }

    /// Find the referenced stations in `catalog`.
    ///
    /// The catalog hash is checked before the indices, so a reference from
    /// another catalog version is always reported as stale.
    pub fn resolve<'c>(
        &self,
        catalog: &'c StationCatalog,
    ) -> Result<(&'c NamedStation, &'c ExtendedStation), LookupError> {
        if self.catalog_hash != catalog.hash() {
            return Err(LookupError::StaleReference {
                reference_hash: self.catalog_hash.clone(),
                current_hash: catalog.hash().to_string(),
            });
        }

        let named = catalog
            .station(self.named)
            .ok_or(LookupError::InvalidReference {
                reason: "named station index out of range",
            })?;
        let extended = named
            .extended(self.extended)
            .ok_or(LookupError::InvalidReference {
                reason: "extended station index out of range",
            })?;

        Ok((named, extended))
    }
}

impl fmt::Display for StationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.named.0, self.extended, self.catalog_hash)
    }
}

impl FromStr for StationRef {
    type Err = LookupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Parse an index in its canonical spelling: ASCII digits, no sign, no
/// leading zero.
fn parse_index<T: FromStr>(s: &str) -> Option<T> {
    let canonical = match s.as_bytes() {
        [] => false,
        [b'0', _, ..] => false,
        bytes => bytes.iter().all(u8::is_ascii_digit),
    };
    if !canonical {
        return None;
    }
    s.parse().ok()
}

/// Parse and resolve a reference string in one step.
pub fn decode<'c>(
    reference: &str,
    catalog: &'c StationCatalog,
) -> Result<(&'c NamedStation, &'c ExtendedStation), LookupError> {
    StationRef::parse(reference)?.resolve(catalog)
}
