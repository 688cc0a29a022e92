//! Transform outputs.

use serde::{Deserialize, Serialize};

use super::ibgib::IbGib;

/// Output of a transform or composition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformResult {
    /// The final node produced.
    pub new_ibgib: IbGib,
    /// Nodes produced before the final one, oldest first (composition only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intermediate_ibgibs: Option<Vec<IbGib>>,
    /// DNA nodes, one per step, when recording was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dnas: Option<Vec<IbGib>>,
}

impl TransformResult {
    /// A single-step result.
    pub fn new(new_ibgib: IbGib, dna: Option<IbGib>) -> Self {
        Self {
            new_ibgib,
            intermediate_ibgibs: None,
            dnas: dna.map(|d| vec![d]),
        }
    }

    /// Every node produced, in creation order: intermediates, final, then DNA.
    pub fn all_ibgibs(&self) -> Vec<&IbGib> {
        self.intermediate_ibgibs
            .iter()
            .flatten()
            .chain(std::iter::once(&self.new_ibgib))
            .chain(self.dnas.iter().flatten())
            .collect()
    }
}
