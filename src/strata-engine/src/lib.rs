//! Local table engine for Strata.
//!
//! This crate turns `strata-logical` plans into pipelines of Arrow-native,
//! vectorized operators and runs them in-process. It also owns the state an
//! iterative driver needs between runs: registered tables, pinned caches
//! and checkpoints.

#![allow(clippy::doc_markdown)] // Documentation backticks are sometimes unnecessary
#![allow(
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation
)] // Row indices are u32 by Arrow convention
#![allow(clippy::significant_drop_tightening)] // Operator state locks span a whole pull
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────────┐     ┌──────────────────┐
//! │  LogicalPlan    │ ──▶ │ LocalPhysical    │ ──▶ │   LocalExecutor  │
//! │ (strata-logical)│     │ Planner          │     │                  │
//! └─────────────────┘     └──────────────────┘     └──────────────────┘
//!                                │                         │
//!                                ▼                         ▼
//!                         PhysicalPlan              Arrow RecordBatch
//! ```
//!
//! The planner resolves scans against the [`Catalog`]. A cache whose slot is
//! materialized becomes a scan of the stored batches, so a pinned result is
//! never recomputed and its lineage drops out of the physical plan.
//!
//! # Key Components
//!
//! - **Operators** ([`operators`]): scans, filter, project, rename, hash
//!   join, hash aggregate, union and cache fill, all behind the pull-based
//!   [`PhysicalOperator`] trait
//! - **Expressions** ([`expr`]): [`ExprEvaluator`] maps `LogicalExpr` onto
//!   Arrow compute kernels
//! - **Execution** ([`executor`]): [`LocalExecutor`] drives one pipeline and
//!   gathers per-operator [`OperatorMetrics`]
//! - **Resources**: [`MemoryManager`] accounts the bytes held by pinned
//!   results; [`CheckpointStore`] writes Arrow IPC checkpoint files
//! - **Facade** ([`engine`]): the [`TableEngine`] trait and [`LocalEngine`]
//!
//! # Example
//!
//! ```rust,ignore
//! use strata_engine::{LocalEngine, TableEngine};
//! use strata_logical::{FilterOp, PlanBuilder};
//! use strata_logical::expr::{col, lit};
//!
//! let engine = LocalEngine::default();
//! let v = engine.register("v", schema, batches).await?;
//! let adults = PlanBuilder::from_plan(&v)
//!     .filter(FilterOp::new(col("age").gt_eq(lit(18i64))))
//!     .build();
//! let n = engine.count(&adults).await?;
//! ```
//!
//! [`PhysicalOperator`]: operators::PhysicalOperator
//! [`ExprEvaluator`]: expr::ExprEvaluator
//! [`LocalExecutor`]: executor::LocalExecutor
//! [`OperatorMetrics`]: metrics::OperatorMetrics
//! [`MemoryManager`]: memory::MemoryManager

pub mod catalog;
pub mod checkpoint;
pub mod engine;
pub mod executor;
pub mod expr;
pub mod memory;
pub mod metrics;
pub mod operators;
pub mod physical;
pub mod planner;

pub use catalog::{CacheState, Catalog, CheckpointData, TableData};
pub use checkpoint::CheckpointStore;
pub use engine::{LocalEngine, TableEngine};
pub use executor::{ExecutionContext, ExecutionResult, LocalExecutor, RuntimeConfig};
pub use expr::ExprEvaluator;
pub use memory::{MemoryManager, MemoryReservation, TrackingMemoryManager};
pub use metrics::{ExecutionTimer, MetricsSink, OperatorMetrics};
pub use operators::PhysicalOperator;
pub use physical::{OperatorCaps, PhysicalPlan, PhysicalSchema};
pub use planner::{LocalPhysicalPlanner, PhysicalPlanner};
