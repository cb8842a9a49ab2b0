//! Physical plan structures.
//!
//! A physical plan is a tree of executable operators produced from a logical
//! plan against the current catalog state.

mod plan;
mod properties;
mod schema;

pub use plan::PhysicalPlan;
pub use properties::OperatorCaps;
pub use schema::PhysicalSchema;
