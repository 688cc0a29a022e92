//! Transform option records.
//!
//! Each transform takes a struct with named optional fields. The live
//! source node is held in `src` and is never serialized; everything else
//! serializes (camelCase, absent/false fields skipped) into the `data` of
//! a DNA node, which is why field declaration order matters here.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ibgib::{IbGib, IbGibData, Rel8ns};

fn is_false(b: &bool) -> bool {
    !*b
}

/// Which transform produced a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformType {
    /// New timeline from a source.
    Fork,
    /// Intrinsic data change.
    Mut8,
    /// Extrinsic relationship change.
    Rel8,
}

impl TransformType {
    /// Canonical name, also used as the ib of DNA nodes.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fork => "fork",
            Self::Mut8 => "mut8",
            Self::Rel8 => "rel8",
        }
    }

    /// Parse a transform name.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "fork" => Some(Self::Fork),
            "mut8" => Some(Self::Mut8),
            "rel8" => Some(Self::Rel8),
            _ => None,
        }
    }
}

impl fmt::Display for TransformType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Temporal junction point: origin markers stamped onto a forked node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tpj {
    /// Stamp `data.timestamp`.
    #[serde(default, skip_serializing_if = "is_false")]
    pub timestamp: bool,
    /// Stamp `data.uuid`.
    #[serde(default, skip_serializing_if = "is_false")]
    pub uuid: bool,
}

/// Options for `fork`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForkOptions {
    /// Source node.
    #[serde(skip)]
    pub src: Option<IbGib>,
    /// Source address, filled in when DNA is recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_addr: Option<String>,
    /// Record a DNA node.
    #[serde(default, skip_serializing_if = "is_false")]
    pub dna: bool,
    /// Relationship names that keep only their latest address.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub linked_rel8ns: Vec<String>,
    /// Suppress `data.timestamp`.
    #[serde(default, skip_serializing_if = "is_false")]
    pub no_timestamp: bool,
    /// Label of the new node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest_ib: Option<String>,
    /// Stamp `data.uuid`.
    #[serde(default, skip_serializing_if = "is_false")]
    pub uuid: bool,
    /// Temporal junction point markers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tpj: Option<Tpj>,
    /// Carry the source's rel8ns forward (ignored for the root).
    #[serde(default, skip_serializing_if = "is_false")]
    pub clone_rel8ns: bool,
    /// Carry the source's data forward (ignored for the root).
    #[serde(default, skip_serializing_if = "is_false")]
    pub clone_data: bool,
}

impl ForkOptions {
    /// Fork `src` with default options.
    pub fn new(src: IbGib) -> Self {
        Self {
            src: Some(src),
            ..Self::default()
        }
    }

    /// Set the new node's label.
    pub fn with_dest_ib(mut self, dest_ib: impl Into<String>) -> Self {
        self.dest_ib = Some(dest_ib.into());
        self
    }

    /// Stamp a fresh uuid into `data.uuid`.
    pub fn with_uuid(mut self) -> Self {
        self.uuid = true;
        self
    }

    /// Set temporal junction point markers.
    pub fn with_tpj(mut self, tpj: Tpj) -> Self {
        self.tpj = Some(tpj);
        self
    }

    /// Carry rel8ns and/or data forward from the source.
    pub fn with_clone(mut self, rel8ns: bool, data: bool) -> Self {
        self.clone_rel8ns = rel8ns;
        self.clone_data = data;
        self
    }

    /// Record a DNA node.
    pub fn with_dna(mut self) -> Self {
        self.dna = true;
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

/// Options for `mut8`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mut8Options {
    /// Source node.
    #[serde(skip)]
    pub src: Option<IbGib>,
    /// Source address, filled in when DNA is recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_addr: Option<String>,
    /// Record a DNA node.
    #[serde(default, skip_serializing_if = "is_false")]
    pub dna: bool,
    /// Relationship names that keep only their latest address.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub linked_rel8ns: Vec<String>,
    /// Suppress `data.timestamp`.
    #[serde(default, skip_serializing_if = "is_false")]
    pub no_timestamp: bool,
    /// New label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mut8_ib: Option<String>,
    /// Old key to new key; nested mappings recurse.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_to_rename: Option<IbGibData>,
    /// Keys to delete (values ignored); nested mappings recurse.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_to_remove: Option<IbGibData>,
    /// Deep merge into data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_to_add_or_patch: Option<IbGibData>,
}

impl Mut8Options {
    /// Mutate `src`; at least one mutation must still be supplied.
    pub fn new(src: IbGib) -> Self {
        Self {
            src: Some(src),
            ..Self::default()
        }
    }

    /// Rename the label.
    pub fn with_ib(mut self, ib: impl Into<String>) -> Self {
        self.mut8_ib = Some(ib.into());
        self
    }

    /// Rename data keys.
    pub fn with_rename(mut self, rename: IbGibData) -> Self {
        self.data_to_rename = Some(rename);
        self
    }

    /// Remove data keys.
    pub fn with_remove(mut self, remove: IbGibData) -> Self {
        self.data_to_remove = Some(remove);
        self
    }

    /// Add or deep-patch data.
    pub fn with_add_or_patch(mut self, patch: IbGibData) -> Self {
        self.data_to_add_or_patch = Some(patch);
        self
    }

    /// Record a DNA node.
    pub fn with_dna(mut self) -> Self {
        self.dna = true;
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

/// Options for `rel8`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rel8Options {
    /// Source node.
    #[serde(skip)]
    pub src: Option<IbGib>,
    /// Source address, filled in when DNA is recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_addr: Option<String>,
    /// Record a DNA node.
    #[serde(default, skip_serializing_if = "is_false")]
    pub dna: bool,
    /// Relationship names that keep only their latest address.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub linked_rel8ns: Vec<String>,
    /// Suppress `data.timestamp`.
    #[serde(default, skip_serializing_if = "is_false")]
    pub no_timestamp: bool,
    /// Addresses to add, per relationship name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rel8ns_to_add_by_addr: Option<Rel8ns>,
    /// Addresses to remove, per relationship name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rel8ns_to_remove_by_addr: Option<Rel8ns>,
}

impl Rel8Options {
    /// Relate `src`; additions or removals must still be supplied.
    pub fn new(src: IbGib) -> Self {
        Self {
            src: Some(src),
            ..Self::default()
        }
    }

    /// Add addresses under a relationship name.
    pub fn add(mut self, name: impl Into<String>, addrs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.rel8ns_to_add_by_addr
            .get_or_insert_with(Rel8ns::new)
            .entry(name.into())
            .or_default()
            .extend(addrs.into_iter().map(Into::into));
        self
    }

    /// Remove addresses under a relationship name.
    pub fn remove(mut self, name: impl Into<String>, addrs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.rel8ns_to_remove_by_addr
            .get_or_insert_with(Rel8ns::new)
            .entry(name.into())
            .or_default()
            .extend(addrs.into_iter().map(Into::into));
        self
    }

    /// Record a DNA node.
    pub fn with_dna(mut self) -> Self {
        self.dna = true;
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

/// Options of any transform, tagged by `type`.
///
/// This is the shape recorded in a DNA node's data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransformOpts {
    /// `fork` options.
    Fork(ForkOptions),
    /// `mut8` options.
    Mut8(Mut8Options),
    /// `rel8` options.
    Rel8(Rel8Options),
}

impl TransformOpts {
    /// The transform these options drive.
    pub fn transform_type(&self) -> TransformType {
        match self {
            Self::Fork(_) => TransformType::Fork,
            Self::Mut8(_) => TransformType::Mut8,
            Self::Rel8(_) => TransformType::Rel8,
        }
    }

    /// The live source node, if attached.
    pub fn src(&self) -> Option<&IbGib> {
        match self {
            Self::Fork(o) => o.src.as_ref(),
            Self::Mut8(o) => o.src.as_ref(),
            Self::Rel8(o) => o.src.as_ref(),
        }
    }

    /// Attach a live source node.
    pub fn set_src(&mut self, src: IbGib) {
        match self {
            Self::Fork(o) => o.src = Some(src),
            Self::Mut8(o) => o.src = Some(src),
            Self::Rel8(o) => o.src = Some(src),
        }
    }

    /// The recorded source address, if any.
    pub fn src_addr(&self) -> Option<&str> {
        match self {
            Self::Fork(o) => o.src_addr.as_deref(),
            Self::Mut8(o) => o.src_addr.as_deref(),
            Self::Rel8(o) => o.src_addr.as_deref(),
        }
    }

    /// Whether a DNA node should be recorded.
    pub fn dna(&self) -> bool {
        match self {
            Self::Fork(o) => o.dna,
            Self::Mut8(o) => o.dna,
            Self::Rel8(o) => o.dna,
        }
    }

    /// Detach and return the live source node.
    pub fn take_src(&mut self) -> Option<IbGib> {
        match self {
            Self::Fork(o) => o.src.take(),
            Self::Mut8(o) => o.src.take(),
            Self::Rel8(o) => o.src.take(),
        }
    }

    pub(crate) fn set_src_addr(&mut self, addr: Option<String>) {
        match self {
            Self::Fork(o) => o.src_addr = addr,
            Self::Mut8(o) => o.src_addr = addr,
            Self::Rel8(o) => o.src_addr = addr,
        }
    }
}

impl From<ForkOptions> for TransformOpts {
    fn from(opts: ForkOptions) -> Self {
        Self::Fork(opts)
    }
}

impl From<Mut8Options> for TransformOpts {
    fn from(opts: Mut8Options) -> Self {
        Self::Mut8(opts)
    }
}

impl From<Rel8Options> for TransformOpts {
    fn from(opts: Rel8Options) -> Self {
        Self::Rel8(opts)
    }
}
