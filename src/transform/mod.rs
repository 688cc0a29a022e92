//! The three canonical transforms and their composition.
//!
//! ```text
//! src + opts → validate → clone fields → apply → [DNA] → gib → TransformResult
//! ```
//!
//! Transforms are pure with respect to their inputs: the source node is
//! borrowed, cloned where needed, and never modified. A failed transform
//! produces nothing.

pub mod fork;
pub mod mut8;
pub mod rel8;
pub mod dna;
pub mod first_gen;

use sha2::{Digest, Sha256};

use crate::config::{Clock, TransformConfig};
use crate::hash::GibHasher;
use crate::types::{
    AddressError, ForkOptions, IbGib, Mut8Options, Rel8Options, Rel8ns, TransformOpts,
    TransformResult, TransformType,
};
use crate::DNA_REL8N_NAME;

pub use first_gen::FirstGenOptions;

/// Error type for transform operations.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// No source node given.
    #[error("src required")]
    MissingSrc,
    /// Source node has an empty ib.
    #[error("src.ib required")]
    MissingSrcIb,
    /// Source node has no gib (only allowed for fork).
    #[error("src.gib required")]
    MissingSrcGib,
    /// Requested label is malformed.
    #[error("invalid ib: {0}")]
    InvalidIb(AddressError),
    /// Both `noTimestamp` and `tpj.timestamp` were set.
    #[error("both noTimestamp and tpj.timestamp selected")]
    TimestampConflict,
    /// `mut8` called without any mutation.
    #[error("no mut8Ib, dataToRename, dataToRemove or dataToAddOrPatch given")]
    NothingToMutate,
    /// `mut8`/`rel8` called on a primitive.
    #[error("cannot {transform} primitive ibgib: {addr}")]
    PrimitiveSource {
        /// Transform attempted.
        transform: TransformType,
        /// Address of the primitive.
        addr: String,
    },
    /// Rename to or from a reserved key.
    #[error("cannot rename to or from reserved key: {0}")]
    ReservedRename(String),
    /// Rename target is neither a key nor a nested mapping.
    #[error("rename target for key {0} must be a string or a mapping")]
    InvalidRename(String),
    /// `rel8` called without additions or removals.
    #[error("no rel8ns to add or remove")]
    NothingToRel8,
    /// Relationship target address is malformed.
    #[error("invalid address {addr}: {source}")]
    InvalidAddress {
        /// The offending address.
        addr: String,
        /// Why it was rejected.
        #[source]
        source: AddressError,
    },
    /// Manual edit of a system-managed relationship.
    #[error("forbidden rel8n name: {0}")]
    ForbiddenRel8nName(String),
    /// Composition ran no steps.
    #[error("composition produced no steps")]
    ZeroSteps,
    /// Node is not decodable DNA.
    #[error("invalid dna: {0}")]
    InvalidDna(String),
    /// Canonical serialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TransformError {
    /// Bad or conflicting caller input.
    pub fn is_validation(&self) -> bool {
        !self.is_invariant() && !matches!(self, Self::ZeroSteps | Self::Serialization(_))
    }

    /// Attempt to break a model invariant (editing a primitive).
    pub fn is_invariant(&self) -> bool {
        matches!(self, Self::PrimitiveSource { .. })
    }
}

/// Applies transforms with a fixed salt and clock.
///
/// Stateless between calls; share one instance across threads freely.
#[derive(Debug, Clone)]
pub struct Transformer<D = Sha256> {
    hasher: GibHasher<D>,
    clock: Clock,
}

impl<D> Default for Transformer<D> {
    fn default() -> Self {
        Self::new(TransformConfig::default())
    }
}

impl<D> Transformer<D> {
    /// Create a transformer from configuration.
    pub fn new(config: TransformConfig) -> Self {
        Self {
            hasher: GibHasher::with_salt(config.salt),
            clock: config.clock,
        }
    }

    /// The gib hasher in use.
    pub fn hasher(&self) -> &GibHasher<D> {
        &self.hasher
    }

    /// The timestamp source in use.
    pub fn clock(&self) -> &Clock {
        &self.clock
    }
}

impl<D: Digest> Transformer<D> {
    /// Apply any transform.
    pub fn apply(&self, opts: &TransformOpts) -> Result<TransformResult, TransformError> {
        match opts {
            TransformOpts::Fork(o) => self.fork(o),
            TransformOpts::Mut8(o) => self.mut8(o),
            TransformOpts::Rel8(o) => self.rel8(o),
        }
    }

    /// Hash the assembled node, recording and linking DNA first if requested.
    ///
    /// The DNA address is linked before hashing so the gib covers it.
    fn finish(
        &self,
        mut node: IbGib,
        opts: TransformOpts,
        linked_rel8ns: &[String],
        link_dna: bool,
    ) -> Result<TransformResult, TransformError> {
        let dna = if opts.dna() {
            let dna = dna::build_dna(opts, &self.hasher)?;
            if link_dna {
                let rel8ns = node.rel8ns.get_or_insert_with(Rel8ns::new);
                append_rel8n(rel8ns, DNA_REL8N_NAME, dna.addr(), linked_rel8ns);
            }
            tracing::trace!(dna = %dna.addr(), "recorded dna");
            Some(dna)
        } else {
            None
        };

        node.gib = Some(self.hasher.gib_of(&node)?);
        Ok(TransformResult::new(node, dna))
    }
}

/// Source node must be present with a non-empty ib.
fn require_src(src: Option<&IbGib>) -> Result<&IbGib, TransformError> {
    let src = src.ok_or(TransformError::MissingSrc)?;
    if src.ib.is_empty() {
        return Err(TransformError::MissingSrcIb);
    }
    Ok(src)
}

/// Source must be a hashed, non-primitive node.
fn require_mutable(src: &IbGib, transform: TransformType) -> Result<(), TransformError> {
    if src.gib.is_none() {
        return Err(TransformError::MissingSrcGib);
    }
    if src.is_primitive() {
        return Err(TransformError::PrimitiveSource {
            transform,
            addr: src.addr(),
        });
    }
    Ok(())
}

/// Append `addr` under `name`, or replace the list if `name` is linked.
///
/// An existing name keeps its position; a new name goes last.
pub(crate) fn append_rel8n(rel8ns: &mut Rel8ns, name: &str, addr: String, linked_rel8ns: &[String]) {
    if linked_rel8ns.iter().any(|n| n == name) {
        rel8ns.insert(name.to_string(), vec![addr]);
    } else {
        rel8ns.entry(name.to_string()).or_default().push(addr);
    }
}

/// `fork` with the default transformer.
pub fn fork(opts: &ForkOptions) -> Result<TransformResult, TransformError> {
    Transformer::<Sha256>::default().fork(opts)
}

/// `mut8` with the default transformer.
pub fn mut8(opts: &Mut8Options) -> Result<TransformResult, TransformError> {
    Transformer::<Sha256>::default().mut8(opts)
}

/// `rel8` with the default transformer.
pub fn rel8(opts: &Rel8Options) -> Result<TransformResult, TransformError> {
    Transformer::<Sha256>::default().rel8(opts)
}

/// `first_gen` with the default transformer.
pub fn first_gen(opts: &FirstGenOptions) -> Result<TransformResult, TransformError> {
    Transformer::<Sha256>::default().first_gen(opts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_rel8n_cumulative() {
        let mut rel8ns = Rel8ns::new();
        append_rel8n(&mut rel8ns, "past", "a^1".to_string(), &[]);
        append_rel8n(&mut rel8ns, "past", "b^2".to_string(), &[]);
        assert_eq!(rel8ns["past"], vec!["a^1".to_string(), "b^2".to_string()]);
    }

    #[test]
    fn test_append_rel8n_linked() {
        let mut rel8ns = Rel8ns::new();
        let linked = vec!["past".to_string()];
        append_rel8n(&mut rel8ns, "past", "a^1".to_string(), &linked);
        append_rel8n(&mut rel8ns, "past", "b^2".to_string(), &linked);
        assert_eq!(rel8ns["past"], vec!["b^2".to_string()]);
    }

    #[test]
    fn test_append_rel8n_keeps_position() {
        let mut rel8ns = Rel8ns::new();
        rel8ns.insert("past".to_string(), vec!["a^1".to_string()]);
        rel8ns.insert("tag".to_string(), vec!["t^gib".to_string()]);
        append_rel8n(&mut rel8ns, "past", "b^2".to_string(), &["past".to_string()]);
        assert_eq!(rel8ns.keys().collect::<Vec<_>>(), ["past", "tag"]);
    }

    #[test]
    fn test_error_taxonomy() {
        let primitive = TransformError::PrimitiveSource {
            transform: TransformType::Mut8,
            addr: "ib^gib".to_string(),
        };
        assert!(primitive.is_invariant());
        assert!(!primitive.is_validation());
        assert!(TransformError::TimestampConflict.is_validation());
        assert!(!TransformError::ZeroSteps.is_validation());
    }

    #[test]
    fn test_require_src() {
        assert!(matches!(require_src(None), Err(TransformError::MissingSrc)));
        let blank = IbGib::default();
        assert!(matches!(
            require_src(Some(&blank)),
            Err(TransformError::MissingSrcIb)
        ));
        assert!(require_src(Some(&IbGib::root())).is_ok());
    }
}
