//! `mut8`: change a node's intrinsic data (and optionally its ib).
//!
//! Mutations apply to a clone of the source data in a fixed order:
//! rename, then remove, then add-or-patch, then the timestamp. Each walk
//! recurses through nested mappings.
//!
//! Key order follows insertion semantics: a renamed key moves to the end
//! of its mapping, removed keys close ranks, overwritten keys stay put and
//! new keys append.

use serde_json::Value;
use sha2::Digest;

use super::{append_rel8n, require_mutable, require_src, TransformError, Transformer};
use crate::types::{
    validate_ib, IbGib, IbGibData, Mut8Options, TransformOpts, TransformResult, TransformType,
};
use crate::{PAST_REL8N_NAME, TIMESTAMP_KEY};

impl<D: Digest> Transformer<D> {
    /// Mutate `opts.src` into a new node.
    pub fn mut8(&self, opts: &Mut8Options) -> Result<TransformResult, TransformError> {
        let src = require_src(opts.src.as_ref())?;
        if let Some(ib) = &opts.mut8_ib {
            validate_ib(ib).map_err(TransformError::InvalidIb)?;
        }
        if opts.mut8_ib.is_none()
            && opts.data_to_rename.is_none()
            && opts.data_to_remove.is_none()
            && opts.data_to_add_or_patch.is_none()
        {
            return Err(TransformError::NothingToMutate);
        }
        require_mutable(src, TransformType::Mut8)?;
        if let Some(rename) = &opts.data_to_rename {
            check_reserved_renames(rename)?;
        }

        let src_addr = src.addr();
        let mut rel8ns = src.rel8ns.clone().unwrap_or_default();
        append_rel8n(&mut rel8ns, PAST_REL8N_NAME, src_addr.clone(), &opts.linked_rel8ns);

        let mut data = src.data.clone().unwrap_or_default();
        if let Some(rename) = &opts.data_to_rename {
            rename_keys(&mut data, rename)?;
        }
        if let Some(remove) = &opts.data_to_remove {
            remove_keys(&mut data, remove);
        }
        if let Some(patch) = &opts.data_to_add_or_patch {
            add_or_patch(&mut data, patch);
        }
        if !opts.no_timestamp {
            data.insert(TIMESTAMP_KEY.to_string(), Value::String(self.clock.timestamp()));
        }

        let node = IbGib {
            ib: opts.mut8_ib.clone().unwrap_or_else(|| src.ib.clone()),
            gib: None,
            data: (!data.is_empty()).then_some(data),
            rel8ns: Some(rel8ns),
        };

        let mut recorded = opts.clone();
        recorded.src = None;
        if recorded.src_addr.is_none() {
            recorded.src_addr = Some(src_addr.clone());
        }
        let result = self.finish(node, TransformOpts::Mut8(recorded), &opts.linked_rel8ns, true)?;

        tracing::debug!(
            src = %src_addr,
            new = %result.new_ibgib.addr(),
            "mut8"
        );
        Ok(result)
    }
}

/// `timestamp` is managed by the transforms and cannot be renamed.
fn check_reserved_renames(rename: &IbGibData) -> Result<(), TransformError> {
    for (old_key, new_key) in rename {
        if old_key == TIMESTAMP_KEY || new_key.as_str() == Some(TIMESTAMP_KEY) {
            return Err(TransformError::ReservedRename(TIMESTAMP_KEY.to_string()));
        }
    }
    Ok(())
}

/// Apply `old → new` renames; a mapping value recurses into that key.
pub fn rename_keys(target: &mut IbGibData, rename: &IbGibData) -> Result<(), TransformError> {
    for (old_key, spec) in rename {
        match spec {
            Value::String(new_key) => {
                if let Some(value) = target.shift_remove(old_key) {
                    target.insert(new_key.clone(), value);
                }
            }
            Value::Object(nested) => {
                if let Some(Value::Object(child)) = target.get_mut(old_key) {
                    rename_keys(child, nested)?;
                }
            }
            _ => return Err(TransformError::InvalidRename(old_key.clone())),
        }
    }
    Ok(())
}

/// Delete every key named in `remove`; a mapping value recurses when the
/// target is also a mapping.
pub fn remove_keys(target: &mut IbGibData, remove: &IbGibData) {
    for (key, marker) in remove {
        if let Value::Object(nested) = marker {
            if let Some(Value::Object(child)) = target.get_mut(key) {
                remove_keys(child, nested);
                continue;
            }
        }
        target.shift_remove(key);
    }
}

/// Deep merge `patch` into `target`.
///
/// Mapping into mapping recurses. Everything else, arrays included,
/// replaces or adds the value wholesale.
pub fn add_or_patch(target: &mut IbGibData, patch: &IbGibData) {
    for (key, value) in patch {
        if let Value::Object(nested) = value {
            if let Some(Value::Object(child)) = target.get_mut(key) {
                add_or_patch(child, nested);
                continue;
            }
        }
        target.insert(key.clone(), value.clone());
    }
}
