//! Physical execution operators.
//!
//! Each operator implements the `PhysicalOperator` trait and follows
//! the pull-based execution model.
//!
//! # Operator Categories
//!
//! | Category | Blocking | Examples |
//! |----------|----------|----------|
//! | Source | No | `MemoryScanExec`, `FileScanExec` |
//! | Unary | No | `FilterExec`, `ProjectExec`, `RenameExec`, `CacheExec` |
//! | Binary | No | `UnionExec` |
//! | Blocking | Yes | `HashJoinExec`, `HashAggregateExec` |

mod aggregate;
mod cache;
mod filter;
mod join;
mod project;
mod rename;
mod scan;
mod traits;
mod union;

pub use traits::{BoxedPhysicalOperator, PhysicalOperator};

pub use aggregate::HashAggregateExec;
pub use cache::CacheExec;
pub use filter::FilterExec;
pub use join::HashJoinExec;
pub use project::ProjectExec;
pub use rename::RenameExec;
pub use scan::{FileScanExec, MemoryScanExec};
pub use union::UnionExec;
