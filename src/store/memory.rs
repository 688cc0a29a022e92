//! In-memory node store for testing.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use parking_lot::RwLock;
use sha2::{Digest, Sha256};

use super::IbGibStore;
use crate::hash::{GibHasher, GibValidation};
use crate::types::IbGib;

/// Error type for in-memory store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Node's gib does not match its content.
    #[error("refusing to store {addr}: {validation:?}")]
    InvalidGib {
        /// Address of the rejected node.
        addr: String,
        /// Validation outcome.
        validation: GibValidation,
    },
    /// Primitives are bare labels; one carrying data or rel8ns is forged.
    #[error("refusing to store primitive with content: {0}")]
    PrimitiveWithContent(String),
    /// Canonical serialization failed while validating.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// In-memory node store for testing.
///
/// Validates every node intrinsically before accepting it, using digest
/// `D` (SHA-256 by default). Pair it with the hasher of the `Transformer`
/// whose output it stores.
pub struct InMemoryIbGibStore<D = Sha256> {
    nodes: RwLock<HashMap<String, IbGib>>,
    hasher: GibHasher<D>,
}

impl InMemoryIbGibStore {
    /// Create a new empty store with the unsalted SHA-256 hasher.
    pub fn new() -> Self {
        Self::with_hasher(GibHasher::new())
    }
}

impl<D> InMemoryIbGibStore<D> {
    /// Create a store validating with a specific hasher (e.g. salted).
    pub fn with_hasher(hasher: GibHasher<D>) -> Self {
        Self {
            nodes: RwLock::new(HashMap::new()),
            hasher,
        }
    }

    /// Get number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.read().is_empty()
    }

    /// Get all addresses (sorted for determinism).
    pub fn addrs(&self) -> Vec<String> {
        let mut addrs: Vec<String> = self.nodes.read().keys().cloned().collect();
        addrs.sort();
        addrs
    }
}

impl<D> Default for InMemoryIbGibStore<D> {
    fn default() -> Self {
        Self::with_hasher(GibHasher::default())
    }
}

impl<D> fmt::Debug for InMemoryIbGibStore<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryIbGibStore")
            .field("len", &self.len())
            .field("hasher", &self.hasher)
            .finish()
    }
}

#[async_trait]
impl<D: Digest> IbGibStore for InMemoryIbGibStore<D> {
    type Error = StoreError;

    async fn get(&self, addr: &str) -> Result<Option<IbGib>, Self::Error> {
        Ok(self.nodes.read().get(addr).cloned())
    }

    async fn get_many(&self, addrs: &[String]) -> Result<Vec<IbGib>, Self::Error> {
        let nodes = self.nodes.read();
        Ok(addrs.iter()
            .filter_map(|addr| nodes.get(addr).cloned())
            .collect())
    }

    async fn put(&self, ibgib: &IbGib) -> Result<(), Self::Error> {
        let addr = ibgib.addr();
        if ibgib.is_primitive() && (ibgib.data.is_some() || ibgib.rel8ns.is_some()) {
            tracing::warn!(addr = %addr, "rejected primitive with content");
            return Err(StoreError::PrimitiveWithContent(addr));
        }
        let validation = self.hasher.validate(ibgib)?;
        if !validation.is_ok() {
            tracing::warn!(addr = %addr, ?validation, "rejected ibgib with invalid gib");
            return Err(StoreError::InvalidGib { addr, validation });
        }
        self.nodes.write().entry(addr).or_insert_with(|| ibgib.clone());
        Ok(())
    }

    async fn has(&self, addr: &str) -> Result<bool, Self::Error> {
        Ok(self.nodes.read().contains_key(addr))
    }
}
