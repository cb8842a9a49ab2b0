//! Strata - bulk-synchronous, vertex-centric graph computation over a lazily
//! planned Arrow table engine.
//!
//! The member crates are re-exported under short names:
//!
//! - [`error`]: `StrataError` and `StrataResult`
//! - [`config`]: JSON-loadable runtime configuration
//! - [`core`]: logical values and types
//! - [`logical`]: expressions and lineage-carrying logical plans
//! - [`engine`]: the `TableEngine` trait and the local engine
//! - [`pregel`]: the round driver and its builder

#![forbid(unsafe_code)]
#![allow(clippy::module_name_repetitions)]

pub use common_config as config;
pub use common_error as error;
pub use strata_core as core;
pub use strata_engine as engine;
pub use strata_logical as logical;
pub use strata_pregel as pregel;

pub use common_error::{StrataError, StrataResult};
pub use strata_engine::{LocalEngine, TableEngine};
pub use strata_pregel::{GraphModel, Pregel, PregelBuilder, PregelEngine, PregelOutput};

/// Strata version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
