//! Address codec: `ib + '^' + gib`.
//!
//! Addresses are the only way nodes reference each other. Parsing splits
//! at the LAST delimiter, so an ib containing `^` from legacy data still
//! yields the correct gib.

use serde::{Deserialize, Serialize};

use crate::{GIB, IBGIB_DELIMITER};

/// Length of a hex-rendered SHA-256 gib.
pub const GIB_HEX_LEN: usize = 64;

/// Error for malformed ibs, gibs and addresses.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    /// Empty ib.
    #[error("ib required")]
    EmptyIb,
    /// ib contains the delimiter.
    #[error("ib cannot contain the delimiter ({delimiter}): {ib}")]
    IbContainsDelimiter {
        /// Offending ib.
        ib: String,
        /// The delimiter character.
        delimiter: char,
    },
    /// Address has no delimiter.
    #[error("address missing delimiter: {0}")]
    MissingDelimiter(String),
    /// Address has nothing before the delimiter.
    #[error("address has empty ib part: {0}")]
    EmptyIbPart(String),
    /// gib is neither the sentinel nor a hex digest.
    #[error("invalid gib: {0}")]
    InvalidGib(String),
}

/// Build an address from its two identity fields.
pub fn get_ibgib_addr(ib: &str, gib: &str) -> String {
    format!("{ib}{IBGIB_DELIMITER}{gib}")
}

/// The two identity fields of an address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IbAndGib {
    /// Label part.
    pub ib: String,
    /// Digest or sentinel part.
    pub gib: String,
}

impl IbAndGib {
    /// Split an address at its last delimiter.
    pub fn parse(addr: &str) -> Result<Self, AddressError> {
        let (ib, gib) = addr
            .rsplit_once(IBGIB_DELIMITER)
            .ok_or_else(|| AddressError::MissingDelimiter(addr.to_string()))?;
        Ok(Self {
            ib: ib.to_string(),
            gib: gib.to_string(),
        })
    }

    /// Recombine into an address.
    pub fn addr(&self) -> String {
        get_ibgib_addr(&self.ib, &self.gib)
    }

    /// Whether the gib part is the primitive sentinel.
    pub fn is_primitive(&self) -> bool {
        self.gib == GIB
    }
}

/// Validate a node label: non-empty and free of the delimiter.
pub fn validate_ib(ib: &str) -> Result<(), AddressError> {
    if ib.is_empty() {
        return Err(AddressError::EmptyIb);
    }
    if ib.contains(IBGIB_DELIMITER) {
        return Err(AddressError::IbContainsDelimiter {
            ib: ib.to_string(),
            delimiter: IBGIB_DELIMITER,
        });
    }
    Ok(())
}

/// Validate a gib: the sentinel, or 64 uppercase hex characters.
pub fn validate_gib(gib: &str) -> Result<(), AddressError> {
    if gib == GIB {
        return Ok(());
    }
    let is_digest = gib.len() == GIB_HEX_LEN
        && gib
            .chars()
            .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c));
    if is_digest {
        Ok(())
    } else {
        Err(AddressError::InvalidGib(gib.to_string()))
    }
}

/// Minimal address shape check: non-empty, has a delimiter, non-empty ib.
///
/// Deliberately loose on the gib side; relationship targets may come from
/// other hashing schemes.
pub fn validate_ibgib_addr(addr: &str) -> Result<(), AddressError> {
    let parsed = IbAndGib::parse(addr)?;
    if parsed.ib.is_empty() {
        return Err(AddressError::EmptyIbPart(addr.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_addr_roundtrip() {
        let addr = get_ibgib_addr("comment", "ABC");
        assert_eq!(addr, "comment^ABC");
        let parsed = IbAndGib::parse(&addr).unwrap();
        assert_eq!(parsed.ib, "comment");
        assert_eq!(parsed.gib, "ABC");
        assert_eq!(parsed.addr(), addr);
    }

    #[test]
    fn test_parse_splits_at_last_delimiter() {
        let parsed = IbAndGib::parse("a^b^C0FFEE").unwrap();
        assert_eq!(parsed.ib, "a^b");
        assert_eq!(parsed.gib, "C0FFEE");
    }

    #[test]
    fn test_parse_root() {
        let parsed = IbAndGib::parse("ib^gib").unwrap();
        assert!(parsed.is_primitive());
        assert_eq!(parsed.ib, "ib");
    }

    #[test]
    fn test_parse_without_delimiter() {
        assert_eq!(
            IbAndGib::parse("nope"),
            Err(AddressError::MissingDelimiter("nope".to_string()))
        );
    }

    #[test]
    fn test_validate_ib() {
        assert!(validate_ib("comment").is_ok());
        assert_eq!(validate_ib(""), Err(AddressError::EmptyIb));
        assert!(matches!(
            validate_ib("bad^ib"),
            Err(AddressError::IbContainsDelimiter { .. })
        ));
    }

    #[test]
    fn test_validate_gib() {
        assert!(validate_gib("gib").is_ok());
        assert!(validate_gib(&"A".repeat(64)).is_ok());
        assert!(validate_gib(&"a".repeat(64)).is_err());
        assert!(validate_gib("ABC").is_err());
    }

    #[test]
    fn test_validate_ibgib_addr() {
        assert!(validate_ibgib_addr("ib^gib").is_ok());
        assert!(validate_ibgib_addr("x^").is_ok());
        assert!(validate_ibgib_addr("").is_err());
        assert!(validate_ibgib_addr("nodelim").is_err());
        assert_eq!(
            validate_ibgib_addr("^gib"),
            Err(AddressError::EmptyIbPart("^gib".to_string()))
        );
    }
}
