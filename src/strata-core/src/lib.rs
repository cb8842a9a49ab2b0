//! Core data model for Strata.
//!
//! `Value` and `DataType` form the logical type system that expressions
//! and literals are written against. The engine maps them onto Arrow.

pub mod types;

pub use types::{DataType, Value};
