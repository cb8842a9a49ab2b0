//! Physical planning module.
//!
//! Converts logical plans to physical plans for execution.

mod local;

pub use local::{LocalPhysicalPlanner, PhysicalPlanner};
