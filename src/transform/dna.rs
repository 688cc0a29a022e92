//! DNA: content-addressed records of transform options.
//!
//! ## Replay Contract
//!
//! A DNA node captures everything a transform needs except the live source
//! node. Re-applying its options to an equivalent source reproduces the
//! same DNA exactly, and the same result save for timestamp and uuid
//! values.
//!
//! ```text
//! ib     = "fork" | "mut8" | "rel8"
//! data   = options (tagged by "type"), src stripped, srcAddr filled in
//! rel8ns = { ancestor: ["<type>^gib"] }
//! ```

use indexmap::IndexMap;
use serde_json::Value;
use sha2::Digest;

use super::{TransformError, Transformer};
use crate::hash::GibHasher;
use crate::types::{get_ibgib_addr, IbGib, TransformOpts, TransformResult, TransformType};
use crate::{ANCESTOR_REL8N_NAME, GIB};

/// Build the DNA node for a transform's options.
///
/// `srcAddr` is kept if already given, otherwise derived from `opts.src`.
pub fn build_dna<D: Digest>(
    mut opts: TransformOpts,
    hasher: &GibHasher<D>,
) -> Result<IbGib, TransformError> {
    let src = opts.take_src();
    if opts.src_addr().is_none() {
        let src = src.ok_or(TransformError::MissingSrc)?;
        opts.set_src_addr(Some(src.addr()));
    }

    let transform_type = opts.transform_type();
    let Value::Object(data) = serde_json::to_value(&opts)? else {
        return Err(TransformError::InvalidDna(format!(
            "{transform_type} options did not serialize to a mapping"
        )));
    };

    let mut rel8ns = IndexMap::new();
    rel8ns.insert(
        ANCESTOR_REL8N_NAME.to_string(),
        vec![get_ibgib_addr(transform_type.as_str(), GIB)],
    );

    let mut dna = IbGib {
        ib: transform_type.as_str().to_string(),
        gib: None,
        data: Some(data),
        rel8ns: Some(rel8ns),
    };
    dna.gib = Some(hasher.gib_of(&dna)?);
    Ok(dna)
}

/// Whether a node has the shape of a DNA record.
pub fn is_dna(ibgib: &IbGib) -> bool {
    TransformType::from_str(&ibgib.ib).is_some_and(|t| {
        ibgib.rel8n(ANCESTOR_REL8N_NAME) == [get_ibgib_addr(t.as_str(), GIB)]
    })
}

/// Decode the options recorded in a DNA node (without a live source).
pub fn opts_from_dna(dna: &IbGib) -> Result<TransformOpts, TransformError> {
    let expected = TransformType::from_str(&dna.ib)
        .ok_or_else(|| TransformError::InvalidDna(format!("unknown transform type: {}", dna.ib)))?;
    let data = dna
        .data
        .as_ref()
        .ok_or_else(|| TransformError::InvalidDna(format!("{} has no data", dna.addr())))?;

    let opts: TransformOpts = serde_json::from_value(Value::Object(data.clone()))?;
    if opts.transform_type() != expected {
        return Err(TransformError::InvalidDna(format!(
            "ib {} does not match recorded type {}",
            dna.ib,
            opts.transform_type()
        )));
    }
    Ok(opts)
}

impl<D: Digest> Transformer<D> {
    /// Re-apply the options recorded in `dna` to `src`.
    ///
    /// `srcAddr` is re-derived from `src`, so replaying against an
    /// equivalent source yields a DNA node equal to `dna`.
    pub fn replay(&self, dna: &IbGib, src: IbGib) -> Result<TransformResult, TransformError> {
        let mut opts = opts_from_dna(dna)?;
        opts.set_src_addr(None);
        opts.set_src(src);
        tracing::trace!(dna = %dna.addr(), "replaying dna");
        self.apply(&opts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Clock, TransformConfig};
    use crate::types::{ForkOptions, Mut8Options};
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use sha2::Sha256;

    fn transformer_at(second: u32) -> Transformer<Sha256> {
        let at = Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, second).unwrap();
        Transformer::new(TransformConfig::new().with_clock(Clock::Fixed(at)))
    }

    #[test]
    fn test_build_dna_shape() {
        let opts = TransformOpts::Fork(ForkOptions::new(IbGib::root()).with_dest_ib("x").with_dna());
        let dna = build_dna(opts, &GibHasher::<Sha256>::new()).unwrap();

        assert_eq!(dna.ib, "fork");
        assert_eq!(dna.rel8n(ANCESTOR_REL8N_NAME), ["fork^gib".to_string()]);
        assert_eq!(
            Value::Object(dna.data.clone().unwrap()),
            json!({"type": "fork", "srcAddr": "ib^gib", "dna": true, "destIb": "x"})
        );
        assert!(is_dna(&dna));
        assert_eq!(
            dna.gib,
            Some(GibHasher::<Sha256>::new().gib_of(&dna).unwrap())
        );
    }

    #[test]
    fn test_build_dna_keeps_given_src_addr() {
        let mut fork = ForkOptions::default();
        fork.src_addr = Some("elsewhere^ABC".to_string());
        let dna = build_dna(TransformOpts::Fork(fork), &GibHasher::<Sha256>::new()).unwrap();
        assert_eq!(dna.data_value("srcAddr"), Some(&json!("elsewhere^ABC")));
    }

    #[test]
    fn test_build_dna_requires_src_or_addr() {
        let result = build_dna(
            TransformOpts::Fork(ForkOptions::default()),
            &GibHasher::<Sha256>::new(),
        );
        assert!(matches!(result, Err(TransformError::MissingSrc)));
    }

    #[test]
    fn test_opts_from_dna_roundtrip() {
        let t = transformer_at(0);
        let src = t.fork(&ForkOptions::new(IbGib::root()).with_dest_ib("doc")).unwrap().new_ibgib;
        let patch = json!({"text": "hi"}).as_object().cloned().unwrap();
        let result = t
            .mut8(&Mut8Options::new(src.clone()).with_add_or_patch(patch.clone()).with_dna())
            .unwrap();
        let dna = &result.dnas.as_ref().unwrap()[0];

        match opts_from_dna(dna).unwrap() {
            TransformOpts::Mut8(opts) => {
                assert_eq!(opts.src_addr, Some(src.addr()));
                assert_eq!(opts.data_to_add_or_patch, Some(patch));
                assert!(opts.dna);
                assert!(opts.src.is_none());
            }
            other => panic!("Expected Mut8, got {other:?}"),
        }
    }

    #[test]
    fn test_opts_from_dna_rejects_non_dna() {
        assert!(matches!(
            opts_from_dna(&IbGib::root()),
            Err(TransformError::InvalidDna(_))
        ));

        let mut forged = build_dna(
            TransformOpts::Fork(ForkOptions::new(IbGib::root())),
            &GibHasher::<Sha256>::new(),
        )
        .unwrap();
        forged.ib = "mut8".to_string();
        assert!(matches!(
            opts_from_dna(&forged),
            Err(TransformError::InvalidDna(_))
        ));
    }

    #[test]
    fn test_replay_reproduces_dna() {
        let parent = transformer_at(0)
            .fork(&ForkOptions::new(IbGib::root()).with_dest_ib("parent"))
            .unwrap()
            .new_ibgib;
        let first = transformer_at(1)
            .fork(&ForkOptions::new(parent.clone()).with_dest_ib("child").with_dna())
            .unwrap();
        let dna1 = &first.dnas.as_ref().unwrap()[0];

        let second = transformer_at(2).replay(dna1, parent).unwrap();
        let dna2 = &second.dnas.as_ref().unwrap()[0];

        assert_eq!(dna1, dna2);
        assert_eq!(first.new_ibgib.ib, second.new_ibgib.ib);
        assert_ne!(first.new_ibgib.gib, second.new_ibgib.gib);
    }

    #[test]
    fn test_replay_same_clock_reproduces_node() {
        let t = transformer_at(0);
        let parent = t.fork(&ForkOptions::new(IbGib::root()).with_dest_ib("parent")).unwrap().new_ibgib;
        let first = t
            .fork(&ForkOptions::new(parent.clone()).with_dest_ib("child").with_dna())
            .unwrap();
        let second = t.replay(&first.dnas.as_ref().unwrap()[0], parent).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_is_dna() {
        assert!(!is_dna(&IbGib::root()));
        assert!(!is_dna(&IbGib::primitive("fork")));
    }
}
