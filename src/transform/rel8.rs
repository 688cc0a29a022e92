//! `rel8`: change a node's extrinsic relationships.

use serde_json::Value;
use sha2::Digest;

use super::{append_rel8n, require_mutable, require_src, TransformError, Transformer};
use crate::types::{
    validate_ibgib_addr, IbGib, Rel8Options, Rel8ns, TransformOpts, TransformResult,
    TransformType,
};
use crate::{FORBIDDEN_ADD_RENAME_REMOVE_REL8N_NAMES, PAST_REL8N_NAME, TIMESTAMP_KEY};

fn has_any_addr(rel8ns: Option<&Rel8ns>) -> bool {
    rel8ns.is_some_and(|r| r.values().any(|addrs| !addrs.is_empty()))
}

impl<D: Digest> Transformer<D> {
    /// Relate `opts.src` to other nodes, producing a new node.
    ///
    /// Additions skip addresses already present; removals that empty a
    /// relationship delete its name.
    pub fn rel8(&self, opts: &Rel8Options) -> Result<TransformResult, TransformError> {
        let src = require_src(opts.src.as_ref())?;
        require_mutable(src, TransformType::Rel8)?;

        let to_add = opts.rel8ns_to_add_by_addr.as_ref();
        let to_remove = opts.rel8ns_to_remove_by_addr.as_ref();
        if !has_any_addr(to_add) && !has_any_addr(to_remove) {
            return Err(TransformError::NothingToRel8);
        }
        for (name, addrs) in to_add.into_iter().chain(to_remove).flatten() {
            if FORBIDDEN_ADD_RENAME_REMOVE_REL8N_NAMES.contains(&name.as_str()) {
                return Err(TransformError::ForbiddenRel8nName(name.clone()));
            }
            for addr in addrs {
                validate_ibgib_addr(addr).map_err(|source| TransformError::InvalidAddress {
                    addr: addr.clone(),
                    source,
                })?;
            }
        }

        let src_addr = src.addr();
        let mut rel8ns = src.rel8ns.clone().unwrap_or_default();
        append_rel8n(&mut rel8ns, PAST_REL8N_NAME, src_addr.clone(), &opts.linked_rel8ns);

        for (name, addrs) in to_add.into_iter().flatten() {
            if addrs.is_empty() {
                continue;
            }
            if opts.linked_rel8ns.contains(name) {
                if let Some(latest) = addrs.last() {
                    rel8ns.insert(name.clone(), vec![latest.clone()]);
                }
                continue;
            }
            let existing = rel8ns.entry(name.clone()).or_default();
            for addr in addrs {
                if !existing.contains(addr) {
                    existing.push(addr.clone());
                }
            }
        }

        for (name, addrs) in to_remove.into_iter().flatten() {
            if let Some(existing) = rel8ns.get_mut(name) {
                existing.retain(|addr| !addrs.contains(addr));
                if existing.is_empty() {
                    rel8ns.shift_remove(name);
                }
            }
        }

        let mut data = src.data.clone().unwrap_or_default();
        if !opts.no_timestamp {
            data.insert(TIMESTAMP_KEY.to_string(), Value::String(self.clock.timestamp()));
        }

        let node = IbGib {
            ib: src.ib.clone(),
            gib: None,
            data: (!data.is_empty()).then_some(data),
            rel8ns: Some(rel8ns),
        };

        let mut recorded = opts.clone();
        recorded.src = None;
        if recorded.src_addr.is_none() {
            recorded.src_addr = Some(src_addr.clone());
        }
        let result = self.finish(node, TransformOpts::Rel8(recorded), &opts.linked_rel8ns, true)?;

        tracing::debug!(
            src = %src_addr,
            new = %result.new_ibgib.addr(),
            "rel8"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Clock, TransformConfig};
    use crate::types::ForkOptions;
    use crate::{ANCESTOR_REL8N_NAME, DNA_REL8N_NAME};
    use chrono::{TimeZone, Utc};
    use sha2::Sha256;

    fn transformer() -> Transformer<Sha256> {
        let at = Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0).unwrap();
        Transformer::new(TransformConfig::new().with_clock(Clock::Fixed(at)))
    }

    fn node(t: &Transformer<Sha256>, ib: &str) -> IbGib {
        t.fork(&ForkOptions::new(IbGib::root()).with_dest_ib(ib)).unwrap().new_ibgib
    }

    #[test]
    fn test_rel8_add_and_past() {
        let t = transformer();
        let src = node(&t, "post");
        let result = t
            .rel8(&Rel8Options::new(src.clone()).add("comment", ["c^ABC"]))
            .unwrap();
        let new = result.new_ibgib;
        assert_eq!(new.rel8n("comment"), ["c^ABC".to_string()]);
        assert_eq!(new.rel8n(PAST_REL8N_NAME), [src.addr()]);
        assert_eq!(new.ib, "post");
        assert!(new.timestamp().is_some());
    }

    #[test]
    fn test_rel8_add_is_idempotent() {
        let t = transformer();
        let src = node(&t, "post");
        let once = t
            .rel8(&Rel8Options::new(src).add("comment", ["c^ABC", "c^ABC"]))
            .unwrap()
            .new_ibgib;
        let twice = t
            .rel8(&Rel8Options::new(once).add("comment", ["c^ABC", "d^DEF"]))
            .unwrap()
            .new_ibgib;
        assert_eq!(twice.rel8n("comment"), ["c^ABC".to_string(), "d^DEF".to_string()]);
    }

    #[test]
    fn test_rel8_remove_to_empty_deletes_name() {
        let t = transformer();
        let src = node(&t, "post");
        let related = t
            .rel8(&Rel8Options::new(src).add("comment", ["c^1", "c^2"]).add("tag", ["t^gib"]))
            .unwrap()
            .new_ibgib;

        let pruned = t
            .rel8(&Rel8Options::new(related.clone()).remove("comment", ["c^1"]))
            .unwrap()
            .new_ibgib;
        assert_eq!(pruned.rel8n("comment"), ["c^2".to_string()]);

        let emptied = t
            .rel8(&Rel8Options::new(pruned).remove("comment", ["c^2"]))
            .unwrap()
            .new_ibgib;
        assert!(!emptied.rel8ns.as_ref().unwrap().contains_key("comment"));
        assert_eq!(emptied.rel8n("tag"), ["t^gib".to_string()]);
    }

    #[test]
    fn test_rel8_linked_name_keeps_latest() {
        let t = transformer();
        let src = node(&t, "post");
        let first = t
            .rel8(&Rel8Options::new(src).add("head", ["a^1"]))
            .unwrap()
            .new_ibgib;
        let second = t
            .rel8(
                &Rel8Options::new(first)
                    .add("head", ["b^2"])
                    .with_linked_rel8ns(["head"]),
            )
            .unwrap()
            .new_ibgib;
        assert_eq!(second.rel8n("head"), ["b^2".to_string()]);
    }

    #[test]
    fn test_rel8_forbidden_names() {
        let t = transformer();
        let src = node(&t, "post");
        for name in [PAST_REL8N_NAME, ANCESTOR_REL8N_NAME, DNA_REL8N_NAME] {
            assert!(matches!(
                t.rel8(&Rel8Options::new(src.clone()).add(name, ["x^1"])),
                Err(TransformError::ForbiddenRel8nName(_))
            ));
            assert!(matches!(
                t.rel8(&Rel8Options::new(src.clone()).remove(name, ["x^1"])),
                Err(TransformError::ForbiddenRel8nName(_))
            ));
        }
    }

    #[test]
    fn test_rel8_invalid_addresses() {
        let t = transformer();
        let src = node(&t, "post");
        for bad in ["", "nodelimiter", "^ABC"] {
            assert!(matches!(
                t.rel8(&Rel8Options::new(src.clone()).add("comment", [bad])),
                Err(TransformError::InvalidAddress { .. })
            ));
        }
    }

    #[test]
    fn test_rel8_nothing_to_do() {
        let t = transformer();
        let src = node(&t, "post");
        assert!(matches!(
            t.rel8(&Rel8Options::new(src.clone())),
            Err(TransformError::NothingToRel8)
        ));
        let empty = Rel8Options::new(src).add("comment", Vec::<String>::new());
        assert!(matches!(t.rel8(&empty), Err(TransformError::NothingToRel8)));
    }

    #[test]
    fn test_rel8_primitive_fails() {
        let t = transformer();
        assert!(matches!(
            t.rel8(&Rel8Options::new(IbGib::primitive("7")).add("comment", ["c^1"])),
            Err(TransformError::PrimitiveSource { .. })
        ));
    }

    #[test]
    fn test_rel8_with_dna() {
        let t = transformer();
        let src = node(&t, "post");
        let result = t
            .rel8(&Rel8Options::new(src).add("comment", ["c^1"]).with_dna())
            .unwrap();
        let dna = &result.dnas.as_ref().unwrap()[0];
        assert_eq!(dna.ib, "rel8");
        assert_eq!(result.new_ibgib.rel8n(DNA_REL8N_NAME), [dna.addr()]);
    }
}
