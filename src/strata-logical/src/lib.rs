//! Logical planning layer for Strata.
//!
//! `strata-logical` provides the expression system and the lazily evaluated
//! relational plans that the engine executes.
//!
//! # Overview
//!
//! - **Expression System**: typed, deterministic expressions for predicates,
//!   projections, join keys and aggregations
//! - **Logical Operators**: Scan, Filter, Project, Rename, Join, Aggregate,
//!   Union and Cache
//! - **Logical Plan**: a shared DAG of operators that is also the lineage of
//!   the table it produces
//! - **Plan Building**: fluent API for constructing plans programmatically
//!
//! # Example
//!
//! ```rust
//! use strata_logical::{PlanBuilder, FilterOp, ProjectOp, ScanOp};
//! use strata_logical::expr::{col, lit};
//!
//! let plan = PlanBuilder::scan(ScanOp::table("vertices"))
//!     .filter(FilterOp::new(col("age").gt(lit(18i64))))
//!     .project(ProjectOp::columns(["id", "name"]))
//!     .build();
//!
//! assert_eq!(plan.depth(), 3);
//! println!("{}", plan.explain());
//! ```

pub mod expr;
pub mod ops;
mod plan;

pub use plan::{LogicalPlan, PlanBuilder};

pub use ops::{
    AggregateOp, CacheId, CacheOp, CheckpointId, FilterOp, JoinOp, JoinType, LogicalOp, ProjectOp,
    RenameOp, ScanOp, ScanSource, UnionOp,
};

pub use expr::{
    AggExpr, AggFunc, BinaryOp, BuiltinFunc, CaseBuilder, FuncExpr, LogicalExpr, UnaryOp,
};

pub use expr::{
    abs, avg, coalesce, col, count, count_star, greatest, least, lit, max, min, qualified_col,
    sum, when,
};
