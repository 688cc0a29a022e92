//! # ibgib-core
//!
//! Content-addressed, immutable graph nodes ("ibGib") and the transforms
//! that derive new nodes from existing ones.
//!
//! Every node's identity is a digest of its own content:
//!
//! > Two independent computations of the same node produce the same address.
//!
//! ## Core Contract
//!
//! 1. A node is `(ib, gib, data, rel8ns)`; its address is `ib^gib`
//! 2. `gib` is derived from `(ib, data, rel8ns)`, never assigned (primitives excepted)
//! 3. Nodes are never modified; transforms return new nodes
//!
//! ## Architecture
//!
//! ```text
//! src + ForkOptions ─┐
//! src + Mut8Options ─┼─▶ Transformer ─▶ TransformResult { new_ibgib, dnas }
//! src + Rel8Options ─┘        │
//!                        GibHasher (sha256v1) + Clock
//! ```
//!
//! ## Determinism Guarantees
//!
//! - Same `(ib, data, rel8ns)` → identical gib
//! - Map key order is insertion order and is part of the digest input
//! - Floats render as JavaScript renders them (`1.0` hashes like `1`)
//! - DNA nodes carry no time-derived values, so replay reproduces them exactly

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod types;
pub mod canonical;
pub mod hash;
pub mod config;
pub mod transform;
pub mod store;

// Re-exports
pub use types::{
    IbGib, IbGibData, Rel8ns, IbAndGib, AddressError,
    get_ibgib_addr, validate_ib, validate_gib, validate_ibgib_addr,
    ForkOptions, Mut8Options, Rel8Options, TransformOpts, TransformType, Tpj,
    TransformResult,
};
pub use canonical::{to_canonical_string, to_canonical_bytes, JsNumberFormatter};
pub use hash::{GibHasher, GibValidation, compute_gib, validate_gib_intrinsically};
pub use config::{Clock, TransformConfig};
pub use transform::{
    Transformer, TransformError, FirstGenOptions,
    fork, mut8, rel8, first_gen,
};
pub use transform::dna::{build_dna, is_dna, opts_from_dna};
pub use store::{IbGibStore, InMemoryIbGibStore, StoreError};

/// Separates `ib` from `gib` in an address.
pub const IBGIB_DELIMITER: char = '^';

/// The primitive sentinel gib.
pub const GIB: &str = "gib";

/// ib of the root primitive.
pub const ROOT_IB: &str = "ib";

/// Address of the root primitive.
pub const ROOT_ADDR: &str = "ib^gib";

/// Previous versions of a node on its timeline.
pub const PAST_REL8N_NAME: &str = "past";

/// Nodes a timeline was forked from.
pub const ANCESTOR_REL8N_NAME: &str = "ancestor";

/// DNA records of the transforms that produced a node.
pub const DNA_REL8N_NAME: &str = "dna";

/// Identity a node is attributed to.
pub const IDENTITY_REL8N_NAME: &str = "identity";

/// Relationship names with special meaning.
pub const RESERVED_REL8N_NAMES: [&str; 4] = [
    PAST_REL8N_NAME,
    ANCESTOR_REL8N_NAME,
    DNA_REL8N_NAME,
    IDENTITY_REL8N_NAME,
];

/// System-managed names that `rel8` refuses to add to or remove from.
pub const FORBIDDEN_ADD_RENAME_REMOVE_REL8N_NAMES: [&str; 3] = [
    PAST_REL8N_NAME,
    ANCESTOR_REL8N_NAME,
    DNA_REL8N_NAME,
];

/// Data key stamped with the transform time.
pub const TIMESTAMP_KEY: &str = "timestamp";

/// Data key stamped with a fresh uuid by `fork`.
pub const UUID_KEY: &str = "uuid";
