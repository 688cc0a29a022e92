//! Node storage boundary.
//!
//! Persistence is an external concern; this trait is the seam through
//! which a backend exchanges nodes with the core. Only `ib`, `gib`,
//! `data` and `rel8ns` cross it.

pub mod memory;

use std::collections::HashSet;

use async_trait::async_trait;

use crate::types::{IbGib, TransformResult};
use crate::PAST_REL8N_NAME;

/// Trait for node storage backends.
///
/// Nodes are keyed by address. Since nodes are immutable, putting the
/// same address twice must be a no-op.
#[async_trait]
pub trait IbGibStore: Send + Sync {
    /// Error type for store operations.
    type Error: std::error::Error + Send + Sync;

    /// Fetch a node by address.
    async fn get(&self, addr: &str) -> Result<Option<IbGib>, Self::Error>;

    /// Fetch several nodes; missing addresses are skipped, order is kept.
    async fn get_many(&self, addrs: &[String]) -> Result<Vec<IbGib>, Self::Error>;

    /// Store a node under its address.
    async fn put(&self, ibgib: &IbGib) -> Result<(), Self::Error>;

    /// Whether a node is stored.
    async fn has(&self, addr: &str) -> Result<bool, Self::Error>;
}

/// Store every node a transform produced: intermediates, final and DNA.
pub async fn put_result<S: IbGibStore + ?Sized>(
    store: &S,
    result: &TransformResult,
) -> Result<(), S::Error> {
    for ibgib in result.all_ibgibs() {
        store.put(ibgib).await?;
    }
    Ok(())
}

/// Walk `past` links back from `addr`, newest first.
///
/// Follows the most recent `past` entry of each node, so it works for
/// both cumulative and linked `past`. Stops at the first node with no
/// `past`, whose predecessor is not stored, or whose predecessor was
/// already visited (a corrupt backend can hold a cycle).
pub async fn past_chain<S: IbGibStore + ?Sized>(
    store: &S,
    addr: &str,
) -> Result<Vec<IbGib>, S::Error> {
    let mut chain = Vec::new();
    let mut visited = HashSet::new();
    let mut next = Some(addr.to_string());
    while let Some(addr) = next.take() {
        if !visited.insert(addr.clone()) {
            tracing::warn!(addr = %addr, "cycle in past chain");
            break;
        }
        let Some(ibgib) = store.get(&addr).await? else {
            break;
        };
        next = ibgib.rel8n(PAST_REL8N_NAME).last().cloned();
        chain.push(ibgib);
    }
    Ok(chain)
}

pub use memory::{InMemoryIbGibStore, StoreError};
