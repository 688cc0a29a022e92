//! Gib computation.
//!
//! ## Algorithm (sha256v1)
//!
//! ```text
//! ib_hash     = HEX(H(salt + ib))
//! rel8ns_hash = has_rel8ns ? HEX(H(salt + canonical(rel8ns))) : ""
//! data_hash   = has_data   ? HEX(H(salt + canonical(data)))   : ""
//! gib         = has_rel8ns || has_data
//!               ? HEX(H(salt + ib_hash + rel8ns_hash + data_hash))
//!               : HEX(H(salt + ib_hash))
//! ```
//!
//! `HEX` is uppercase hex. `has_rel8ns` is true iff some relationship has
//! at least one address; `has_data` is true iff data has at least one key.
//! When `has_rel8ns` holds, the whole mapping is rendered, including any
//! empty lists it still carries.
//!
//! The digest primitive is a type parameter; there is no global crypto
//! handle. `GibHasher` is stateless apart from its salt and can be shared
//! freely across threads.

use sha2::{Digest, Sha256};
use std::fmt;
use std::marker::PhantomData;

use crate::canonical::to_canonical_string;
use crate::types::{IbGib, IbGibData, Rel8ns};

/// Computes gibs with digest `D` (SHA-256 by default).
pub struct GibHasher<D = Sha256> {
    salt: String,
    _digest: PhantomData<fn() -> D>,
}

impl<D> GibHasher<D> {
    /// Hasher with an empty salt.
    pub fn new() -> Self {
        Self::with_salt(String::new())
    }

    /// Hasher with a domain-separation salt.
    pub fn with_salt(salt: impl Into<String>) -> Self {
        Self {
            salt: salt.into(),
            _digest: PhantomData,
        }
    }

    /// The salt prefixed to every digest step.
    pub fn salt(&self) -> &str {
        &self.salt
    }
}

impl<D> Default for GibHasher<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> Clone for GibHasher<D> {
    fn clone(&self) -> Self {
        Self::with_salt(self.salt.clone())
    }
}

impl<D> fmt::Debug for GibHasher<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GibHasher")
            .field("salt", &self.salt)
            .finish()
    }
}

impl<D: Digest> GibHasher<D> {
    /// Uppercase hex digest of `salt + message`.
    pub fn hex_digest(&self, message: &str) -> String {
        let mut hasher = D::new();
        hasher.update(self.salt.as_bytes());
        hasher.update(message.as_bytes());
        hex::encode_upper(hasher.finalize())
    }

    /// Compute the gib of `(ib, data, rel8ns)`.
    pub fn gib(
        &self,
        ib: &str,
        data: Option<&IbGibData>,
        rel8ns: Option<&Rel8ns>,
    ) -> Result<String, serde_json::Error> {
        let has_rel8ns = rel8ns.is_some_and(|r| r.values().any(|addrs| !addrs.is_empty()));
        let has_data = data.is_some_and(|d| !d.is_empty());

        let ib_hash = self.hex_digest(ib);
        if !has_rel8ns && !has_data {
            return Ok(self.hex_digest(&ib_hash));
        }

        let rel8ns_hash = match rel8ns {
            Some(r) if has_rel8ns => self.hex_digest(&to_canonical_string(r)?),
            _ => String::new(),
        };
        let data_hash = match data {
            Some(d) if has_data => self.hex_digest(&to_canonical_string(d)?),
            _ => String::new(),
        };

        Ok(self.hex_digest(&format!("{ib_hash}{rel8ns_hash}{data_hash}")))
    }

    /// Compute the gib a node should carry, ignoring its current gib.
    pub fn gib_of(&self, ibgib: &IbGib) -> Result<String, serde_json::Error> {
        self.gib(&ibgib.ib, ibgib.data.as_ref(), ibgib.rel8ns.as_ref())
    }

    /// Check that a node's gib is derived from its content.
    pub fn validate(&self, ibgib: &IbGib) -> Result<GibValidation, serde_json::Error> {
        let Some(expected) = ibgib.gib.as_deref() else {
            return Ok(GibValidation::Missing);
        };
        if ibgib.is_primitive() {
            return Ok(GibValidation::Primitive);
        }
        let computed = self.gib_of(ibgib)?;
        if computed == expected {
            Ok(GibValidation::Valid)
        } else {
            Ok(GibValidation::Mismatch {
                expected: expected.to_string(),
                computed,
            })
        }
    }
}

/// Outcome of checking a node's gib against its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GibValidation {
    /// gib matches the content digest.
    Valid,
    /// gib is the primitive sentinel; nothing to check.
    Primitive,
    /// Node has no gib.
    Missing,
    /// gib does not match the content digest.
    Mismatch {
        /// The gib stored on the node.
        expected: String,
        /// The gib computed from the node's content.
        computed: String,
    },
}

impl GibValidation {
    /// Valid or primitive.
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Valid | Self::Primitive)
    }
}

/// Compute a gib with the default unsalted SHA-256 hasher.
pub fn compute_gib(ibgib: &IbGib) -> Result<String, serde_json::Error> {
    GibHasher::<Sha256>::new().gib_of(ibgib)
}

/// Validate a node's gib with the default unsalted SHA-256 hasher.
pub fn validate_gib_intrinsically(ibgib: &IbGib) -> Result<GibValidation, serde_json::Error> {
    GibHasher::<Sha256>::new().validate(ibgib)
}
