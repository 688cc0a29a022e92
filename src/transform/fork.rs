//! `fork`: start a new timeline from a source node.
//!
//! Any node may be forked, primitives included. Forking the root yields a
//! node with no rel8ns at all; forking anything else records the source
//! under `ancestor`.

use serde_json::Value;
use sha2::Digest;
use uuid::Uuid;

use super::{append_rel8n, require_src, TransformError, Transformer};
use crate::types::{
    validate_ib, ForkOptions, IbGib, IbGibData, Rel8ns, TransformOpts, TransformResult,
};
use crate::{ANCESTOR_REL8N_NAME, ROOT_IB, TIMESTAMP_KEY, UUID_KEY};

impl<D: Digest> Transformer<D> {
    /// Fork `opts.src` into a new node.
    ///
    /// Data key order: cloned source data, then `timestamp`, then `uuid`.
    pub fn fork(&self, opts: &ForkOptions) -> Result<TransformResult, TransformError> {
        let src = require_src(opts.src.as_ref())?;
        let dest_ib = opts.dest_ib.as_deref().filter(|ib| !ib.is_empty());
        if let Some(ib) = dest_ib {
            validate_ib(ib).map_err(TransformError::InvalidIb)?;
        }
        let tpj = opts.tpj.unwrap_or_default();
        if opts.no_timestamp && tpj.timestamp {
            return Err(TransformError::TimestampConflict);
        }

        let src_addr = src.addr();
        let is_root = src.is_root();

        let rel8ns = if is_root {
            None
        } else {
            let mut rel8ns = if opts.clone_rel8ns {
                src.rel8ns.clone().unwrap_or_default()
            } else {
                Rel8ns::new()
            };
            if !rel8ns.contains_key(ANCESTOR_REL8N_NAME) {
                let prior = src.rel8n(ANCESTOR_REL8N_NAME);
                if !prior.is_empty() {
                    rel8ns.insert(ANCESTOR_REL8N_NAME.to_string(), prior.to_vec());
                }
            }
            append_rel8n(&mut rel8ns, ANCESTOR_REL8N_NAME, src_addr.clone(), &opts.linked_rel8ns);
            Some(rel8ns)
        };

        let mut data = if opts.clone_data && !is_root {
            src.data.clone().unwrap_or_default()
        } else {
            IbGibData::new()
        };
        if !opts.no_timestamp {
            data.insert(TIMESTAMP_KEY.to_string(), Value::String(self.clock.timestamp()));
        }
        if opts.uuid || tpj.uuid {
            data.insert(UUID_KEY.to_string(), Value::String(Uuid::new_v4().to_string()));
        }

        let node = IbGib {
            ib: dest_ib.unwrap_or(ROOT_IB).to_string(),
            gib: None,
            data: (!data.is_empty()).then_some(data),
            rel8ns,
        };

        let mut recorded = opts.clone();
        recorded.src = None;
        if recorded.src_addr.is_none() {
            recorded.src_addr = Some(src_addr.clone());
        }
        let result = self.finish(node, TransformOpts::Fork(recorded), &opts.linked_rel8ns, !is_root)?;

        tracing::debug!(
            src = %src_addr,
            new = %result.new_ibgib.addr(),
            "fork"
        );
        Ok(result)
    }
}
