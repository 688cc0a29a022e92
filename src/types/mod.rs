//! Core types: nodes, addresses, transform options and results.

pub mod ibgib;
pub mod address;
pub mod options;
pub mod result;

pub use ibgib::{IbGib, IbGibData, Rel8ns};
pub use address::{
    get_ibgib_addr, validate_ib, validate_gib, validate_ibgib_addr,
    AddressError, IbAndGib, GIB_HEX_LEN,
};
pub use options::{ForkOptions, Mut8Options, Rel8Options, TransformOpts, TransformType, Tpj};
pub use result::TransformResult;
