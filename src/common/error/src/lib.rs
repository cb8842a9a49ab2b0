//! Error types and result aliases for Strata.
//!
//! Every crate in the workspace reports failures through [`StrataError`];
//! Arrow, IO and JSON errors convert into it with `?`.

mod error;

pub use error::{GenericError, StrataError, StrataResult};
