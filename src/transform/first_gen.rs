//! `first_gen`: build a node from a parent in one call.
//!
//! ```text
//! parent ─fork─▶ n1 ─mut8(data)?─▶ n2 ─rel8(rel8ns)?─▶ n3
//! ```

use sha2::Digest;

use super::{TransformError, Transformer};
use crate::types::{
    ForkOptions, IbGib, IbGibData, Mut8Options, Rel8Options, Rel8ns, Tpj, TransformResult,
};

/// Options for `first_gen`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FirstGenOptions {
    /// Label of the new node.
    pub ib: String,
    /// Parent to fork from; the root if `None`.
    pub parent_ibgib: Option<IbGib>,
    /// Initial data, applied with `mut8`.
    pub data: Option<IbGibData>,
    /// Initial relationships, applied with `rel8`.
    pub rel8ns: Option<Rel8ns>,
    /// Record DNA for every step.
    pub dna: bool,
    /// Temporal junction point markers for the fork step.
    pub tpj: Option<Tpj>,
    /// Relationship names that keep only their latest address.
    pub linked_rel8ns: Vec<String>,
    /// Suppress `data.timestamp` on every step.
    pub no_timestamp: bool,
}

impl FirstGenOptions {
    /// Build a node labelled `ib` from the root.
    pub fn new(ib: impl Into<String>) -> Self {
        Self {
            ib: ib.into(),
            ..Self::default()
        }
    }

    /// Fork from `parent` instead of the root.
    pub fn with_parent(mut self, parent: IbGib) -> Self {
        self.parent_ibgib = Some(parent);
        self
    }

    /// Initial data.
    pub fn with_data(mut self, data: IbGibData) -> Self {
        self.data = Some(data);
        self
    }

    /// Initial relationships.
    pub fn with_rel8ns(mut self, rel8ns: Rel8ns) -> Self {
        self.rel8ns = Some(rel8ns);
        self
    }

    /// Record DNA for every step.
    pub fn with_dna(mut self) -> Self {
        self.dna = true;
        self
    }

    /// Temporal junction point markers.
    pub fn with_tpj(mut self, tpj: Tpj) -> Self {
        self.tpj = Some(tpj);
        self
    }

    /// Mark relationship names as linked.
    pub fn with_linked_rel8ns(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.linked_rel8ns = names.into_iter().map(Into::into).collect();
        self
    }

    /// Do not stamp `data.timestamp`.
    pub fn without_timestamp(mut self) -> Self {
        self.no_timestamp = true;
        self
    }
}

impl<D: Digest> Transformer<D> {
    /// fork, then mut8 if `data` is given, then rel8 if `rel8ns` is given.
    pub fn first_gen(&self, opts: &FirstGenOptions) -> Result<TransformResult, TransformError> {
        let parent = opts.parent_ibgib.clone().unwrap_or_else(IbGib::root);
        let mut steps: Vec<TransformResult> = Vec::with_capacity(3);

        steps.push(self.fork(&ForkOptions {
            src: Some(parent),
            dest_ib: Some(opts.ib.clone()),
            dna: opts.dna,
            tpj: opts.tpj,
            linked_rel8ns: opts.linked_rel8ns.clone(),
            no_timestamp: opts.no_timestamp,
            ..ForkOptions::default()
        })?);

        if let Some(data) = &opts.data {
            let src = latest(&steps)?;
            steps.push(self.mut8(&Mut8Options {
                src: Some(src),
                data_to_add_or_patch: Some(data.clone()),
                dna: opts.dna,
                linked_rel8ns: opts.linked_rel8ns.clone(),
                no_timestamp: opts.no_timestamp,
                ..Mut8Options::default()
            })?);
        }

        if let Some(rel8ns) = &opts.rel8ns {
            let src = latest(&steps)?;
            steps.push(self.rel8(&Rel8Options {
                src: Some(src),
                rel8ns_to_add_by_addr: Some(rel8ns.clone()),
                dna: opts.dna,
                linked_rel8ns: opts.linked_rel8ns.clone(),
                no_timestamp: opts.no_timestamp,
                ..Rel8Options::default()
            })?);
        }

        compose(steps, opts.dna)
    }
}

fn latest(steps: &[TransformResult]) -> Result<IbGib, TransformError> {
    steps
        .last()
        .map(|step| step.new_ibgib.clone())
        .ok_or(TransformError::ZeroSteps)
}

/// Fold per-step results into one: last node wins, earlier nodes become
/// intermediates, DNA concatenates in step order.
fn compose(mut steps: Vec<TransformResult>, dna: bool) -> Result<TransformResult, TransformError> {
    let last = steps.pop().ok_or(TransformError::ZeroSteps)?;
    if steps.is_empty() {
        return Ok(last);
    }

    let dnas = dna.then(|| {
        steps
            .iter()
            .chain(std::iter::once(&last))
            .flat_map(|step| step.dnas.iter().flatten().cloned())
            .collect()
    });
    let intermediates = steps.into_iter().map(|step| step.new_ibgib).collect();

    Ok(TransformResult {
        new_ibgib: last.new_ibgib,
        intermediate_ibgibs: Some(intermediates),
        dnas,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Clock, TransformConfig};
    use crate::{ANCESTOR_REL8N_NAME, PAST_REL8N_NAME};
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use sha2::Sha256;

    fn transformer() -> Transformer<Sha256> {
        let at = Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0).unwrap();
        Transformer::new(TransformConfig::new().with_clock(Clock::Fixed(at)))
    }

    #[test]
    fn test_first_gen_fork_only_is_unwrapped() {
        let result = transformer().first_gen(&FirstGenOptions::new("lonely")).unwrap();
        assert_eq!(result.new_ibgib.ib, "lonely");
        assert!(result.intermediate_ibgibs.is_none());
        assert!(result.dnas.is_none());
    }

    #[test]
    fn test_first_gen_all_steps() {
        let t = transformer();
        let mut rel8ns = Rel8ns::new();
        rel8ns.insert("tag".to_string(), vec!["t^gib".to_string()]);
        let data = json!({"text": "hello"}).as_object().cloned().unwrap();

        let result = t
            .first_gen(
                &FirstGenOptions::new("comment")
                    .with_data(data)
                    .with_rel8ns(rel8ns)
                    .with_dna(),
            )
            .unwrap();

        let intermediates = result.intermediate_ibgibs.as_ref().unwrap();
        assert_eq!(intermediates.len(), 2);
        let dnas = result.dnas.as_ref().unwrap();
        assert_eq!(
            dnas.iter().map(|d| d.ib.as_str()).collect::<Vec<_>>(),
            ["fork", "mut8", "rel8"]
        );

        let node = &result.new_ibgib;
        assert_eq!(node.ib, "comment");
        assert_eq!(node.data_value("text"), Some(&json!("hello")));
        assert_eq!(node.rel8n("tag"), ["t^gib".to_string()]);
        assert_eq!(
            node.rel8n(PAST_REL8N_NAME),
            [intermediates[0].addr(), intermediates[1].addr()]
        );
        assert!(node.rel8n(ANCESTOR_REL8N_NAME).is_empty());
    }

    #[test]
    fn test_first_gen_from_parent() {
        let t = transformer();
        let parent = t.first_gen(&FirstGenOptions::new("parent")).unwrap().new_ibgib;
        let data = json!({"n": 1}).as_object().cloned().unwrap();
        let result = t
            .first_gen(
                &FirstGenOptions::new("child")
                    .with_parent(parent.clone())
                    .with_data(data)
                    .with_linked_rel8ns(["past"]),
            )
            .unwrap();
        let node = result.new_ibgib;
        assert_eq!(node.rel8n(ANCESTOR_REL8N_NAME), [parent.addr()]);
        assert_eq!(node.rel8n(PAST_REL8N_NAME).len(), 1);
        assert!(result.dnas.is_none());
    }

    #[test]
    fn test_first_gen_propagates_step_errors() {
        let mut rel8ns = Rel8ns::new();
        rel8ns.insert("ancestor".to_string(), vec!["x^1".to_string()]);
        assert!(matches!(
            transformer().first_gen(&FirstGenOptions::new("bad").with_rel8ns(rel8ns)),
            Err(TransformError::ForbiddenRel8nName(_))
        ));
    }

    #[test]
    fn test_compose_zero_steps() {
        assert!(matches!(compose(Vec::new(), false), Err(TransformError::ZeroSteps)));
    }
}
