//! The ibGib node record.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::address::get_ibgib_addr;
use crate::{GIB, ROOT_IB};

/// Intrinsic payload of a node.
///
/// Backed by `serde_json::Map` with `preserve_order`, so iteration and
/// serialization follow insertion order.
pub type IbGibData = serde_json::Map<String, serde_json::Value>;

/// Extrinsic links of a node: relationship name to ordered addresses.
pub type Rel8ns = IndexMap<String, Vec<String>>;

/// An immutable, content-addressed graph node.
///
/// Nodes are only produced by transforms (or constructed as primitives).
/// A node's `gib` is derived from `(ib, data, rel8ns)` and never assigned
/// by hand for non-primitives.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IbGib {
    /// Caller-chosen label.
    pub ib: String,
    /// Content digest, or the `gib` sentinel for primitives.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gib: Option<String>,
    /// Intrinsic payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<IbGibData>,
    /// Extrinsic relationships.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rel8ns: Option<Rel8ns>,
}

impl IbGib {
    /// The distinguished root primitive `ib^gib`.
    pub fn root() -> Self {
        Self::primitive(ROOT_IB)
    }

    /// A primitive node: `gib` is the sentinel, no data, no rel8ns.
    pub fn primitive(ib: impl Into<String>) -> Self {
        Self {
            ib: ib.into(),
            gib: Some(GIB.to_string()),
            data: None,
            rel8ns: None,
        }
    }

    /// Address of this node (`ib^gib`).
    ///
    /// A node still being assembled has no gib; its address then ends with
    /// an empty gib part.
    pub fn addr(&self) -> String {
        get_ibgib_addr(&self.ib, self.gib.as_deref().unwrap_or_default())
    }

    /// Whether this node is a primitive (gib equals the sentinel).
    pub fn is_primitive(&self) -> bool {
        self.gib.as_deref() == Some(GIB)
    }

    /// Whether this node is the root primitive.
    pub fn is_root(&self) -> bool {
        self.ib == ROOT_IB && self.is_primitive()
    }

    /// Addresses under a relationship name, empty if absent.
    pub fn rel8n(&self, name: &str) -> &[String] {
        self.rel8ns
            .as_ref()
            .and_then(|r| r.get(name))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Value of a top-level data key.
    pub fn data_value(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.as_ref().and_then(|d| d.get(key))
    }

    /// The `data.timestamp` string, if present.
    pub fn timestamp(&self) -> Option<&str> {
        self.data_value(crate::TIMESTAMP_KEY).and_then(|v| v.as_str())
    }
}

impl fmt::Display for IbGib {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.addr())
    }
}
