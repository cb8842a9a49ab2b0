//! Integration tests for the strata-pregel crate.
//!
//! Every test runs the full round protocol on a `LocalEngine`:
//! - Graph registration
//! - Builder validation and freezing
//! - Message generation, gating and aggregation
//! - Checkpointing and cleanup
//!
//! ## Test Categories
//!
//! 1. **Protocol Tests**: update, null handling, gating, propagation
//! 2. **Numerical Tests**: rank-style aggregation
//! 3. **Termination Tests**: early exit, including a property test
//! 4. **Lineage Tests**: checkpoint schedule and storage cleanup

use std::collections::BTreeMap;
use std::sync::Arc;

use arrow::array::{ArrayRef, AsArray, Float64Array, Int64Array};
use arrow::datatypes::{DataType, Field, Float64Type, Int64Type, Schema};
use arrow::record_batch::RecordBatch;
use proptest::prelude::*;

use common_config::{CheckpointConfig, StrataConfig};
use common_error::StrataError;
use strata_engine::{LocalEngine, TableEngine};
use strata_logical::expr::{coalesce, col, count, greatest, lit, max, sum, when};
use strata_logical::{PlanBuilder, ProjectOp};
use strata_pregel::{GraphModel, Pregel, PregelBuilder, PregelEngine, PregelOutput, ID};

fn batch(columns: Vec<(&str, ArrayRef)>) -> RecordBatch {
    let schema = Arc::new(Schema::new(
        columns
            .iter()
            .map(|(name, array)| Field::new(*name, array.data_type().clone(), false))
            .collect::<Vec<_>>(),
    ));
    RecordBatch::try_new(schema, columns.into_iter().map(|(_, a)| a).collect()).unwrap()
}

fn ints(values: Vec<i64>) -> ArrayRef {
    Arc::new(Int64Array::from(values))
}

fn vertices(ids: Vec<i64>) -> RecordBatch {
    batch(vec![("id", ints(ids))])
}

fn edges(pairs: &[(i64, i64)]) -> RecordBatch {
    batch(vec![
        ("src", ints(pairs.iter().map(|p| p.0).collect())),
        ("dst", ints(pairs.iter().map(|p| p.1).collect())),
    ])
}

async fn graph(engine: &LocalEngine, v: RecordBatch, e: RecordBatch) -> GraphModel {
    GraphModel::from_batches(engine, v, e).await.unwrap()
}

fn int_column(output: &PregelOutput, name: &str) -> BTreeMap<i64, Option<i64>> {
    let ids = output.vertices.column_by_name(ID).unwrap();
    let values = output.vertices.column_by_name(name).unwrap();
    ids.as_primitive::<Int64Type>()
        .values()
        .iter()
        .copied()
        .zip(values.as_primitive::<Int64Type>().iter())
        .collect()
}

fn sorted_values(output: &PregelOutput, name: &str) -> Vec<i64> {
    int_column(output, name)
        .into_values()
        .map(|v| v.unwrap())
        .collect()
}

/// Each vertex adds the sum of its senders' values; ids below 3 start at 42.
fn gated_sum() -> PregelBuilder {
    PregelBuilder::new()
        .set_max_iter(7)
        .with_vertex_column(
            "value",
            when(col(ID).lt(lit(3i64)), lit(42i64)).otherwise(lit(0i64)),
            col("value").add_expr(coalesce(vec![Pregel::msg(), lit(0i64)])),
        )
        .agg_msgs(sum(Pregel::msg()))
}

/// Push a 1 from vertex 1 along the edges until every reachable vertex has it.
fn propagate(to_dst: bool) -> PregelBuilder {
    let builder = PregelBuilder::new()
        .with_vertex_column(
            "value",
            when(col(ID).eq(lit(1i64)), lit(1i64)).otherwise(lit(0i64)),
            greatest(vec![Pregel::msg(), col("value")]),
        )
        .agg_msgs(max(Pregel::msg()));
    if to_dst {
        builder.send_msg_to_dst(
            when(
                Pregel::src("value").not_eq(Pregel::dst("value")),
                Pregel::src("value"),
            )
            .end(),
        )
    } else {
        builder.send_msg_to_src(
            when(
                Pregel::dst("value").not_eq(Pregel::src("value")),
                Pregel::dst("value"),
            )
            .end(),
        )
    }
}

// =============================================================================
// Protocol Tests
// =============================================================================

#[tokio::test]
async fn test_no_op_update_equals_init() {
    let engine = Arc::new(LocalEngine::default());
    let v = batch(vec![
        ("id", ints(vec![1, 2, 3, 4])),
        ("value", ints(vec![10, 20, 30, 40])),
    ]);
    let g = graph(&engine, v, edges(&[(1, 2), (1, 3), (2, 3), (3, 4), (4, 1)])).await;

    let init = col("value").mul_expr(lit(2i64));
    let output = PregelBuilder::new()
        .set_max_iter(1)
        .with_vertex_column("double", init.clone(), col("double"))
        .send_msg_to_dst(Pregel::src("value"))
        .agg_msgs(sum(Pregel::msg()))
        .run(engine.clone(), &g)
        .await
        .unwrap();

    assert_eq!(output.rounds, 1);
    let names: Vec<_> = output
        .vertices
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    assert_eq!(names, vec!["id", "value", "double"]);

    let direct = PlanBuilder::from_plan(g.vertices())
        .project(ProjectOp::new(vec![col(ID), init.alias("double")]))
        .build();
    let direct = engine.collect_batch(&direct).await.unwrap();
    let expected: BTreeMap<_, _> = direct
        .column(0)
        .as_primitive::<Int64Type>()
        .values()
        .iter()
        .copied()
        .zip(direct.column(1).as_primitive::<Int64Type>().iter())
        .collect();
    assert_eq!(int_column(&output, "double"), expected);
}

#[tokio::test]
async fn test_case_init_and_greatest_update() {
    let engine = Arc::new(LocalEngine::default());
    let g = graph(&engine, vertices(vec![1, 2, 3]), edges(&[(1, 2), (2, 3)])).await;

    let output = PregelBuilder::new()
        .set_max_iter(1)
        .with_vertex_column(
            "v",
            when(col(ID).eq(lit(1i64)), lit(1i64)).otherwise(lit(0i64)),
            greatest(vec![col("v"), lit(0i64)]),
        )
        .send_msg_to_dst(Pregel::src("v"))
        .agg_msgs(max(Pregel::msg()))
        .run(engine.clone(), &g)
        .await
        .unwrap();

    assert_eq!(output.rounds, 1);
    assert_eq!(sorted_values(&output, "v"), vec![1, 0, 0]);
}

#[tokio::test]
async fn test_null_payload_is_excluded() {
    let engine = Arc::new(LocalEngine::default());
    let g = graph(&engine, vertices(vec![1, 2, 3]), edges(&[(1, 2), (2, 3)])).await;

    // Only vertex 2 sends a non-null payload.
    let output = PregelBuilder::new()
        .with_vertex_column(
            "received",
            lit(0i64),
            col("received").add_expr(coalesce(vec![Pregel::msg(), lit(0i64)])),
        )
        .send_msg_to_dst(when(Pregel::src(ID).eq(lit(2i64)), lit(1i64)).end())
        .agg_msgs(count(Pregel::msg()))
        .run(engine.clone(), &g)
        .await
        .unwrap();

    assert_eq!(
        int_column(&output, "received"),
        BTreeMap::from([(1, Some(0)), (2, Some(0)), (3, Some(1))])
    );
    // Vertex 2 got only a null message, so it may not send in round 2.
    assert_eq!(output.history[0].messages, 1);
    assert_eq!(output.rounds, 2);
    assert!(output.converged);
}

#[tokio::test]
async fn test_active_vertex_gating() {
    let engine = Arc::new(LocalEngine::default());
    let g = graph(
        &engine,
        vertices(vec![1, 2, 3, 4, 5]),
        edges(&[(1, 3), (2, 3), (3, 4), (4, 5)]),
    )
    .await;

    let output = gated_sum()
        .send_msg_to_dst(Pregel::src("value"))
        .run(engine.clone(), &g)
        .await
        .unwrap();

    assert_eq!(sorted_values(&output, "value"), vec![42, 42, 84, 84, 84]);
    assert_eq!(output.rounds, 4);
    assert!(output.converged);
    let sent: Vec<_> = output.history.iter().map(|r| r.messages).collect();
    assert_eq!(sent, vec![3, 2, 1, 0]);
}

#[tokio::test]
async fn test_reverse_active_vertex_gating() {
    let engine = Arc::new(LocalEngine::default());
    let g = graph(
        &engine,
        vertices(vec![1, 2, 3, 4, 5]),
        edges(&[(3, 1), (3, 2), (4, 3), (5, 4)]),
    )
    .await;

    let output = gated_sum()
        .send_msg_to_src(Pregel::dst("value"))
        .run(engine.clone(), &g)
        .await
        .unwrap();

    assert_eq!(sorted_values(&output, "value"), vec![42, 42, 84, 84, 84]);
}

#[tokio::test]
async fn test_propagation_reaches_fixed_point() {
    let engine = Arc::new(LocalEngine::default());
    let g = graph(
        &engine,
        vertices(vec![1, 2, 3, 4, 5]),
        edges(&[(1, 2), (2, 3), (3, 4), (4, 5)]),
    )
    .await;

    let output = propagate(true)
        .set_max_iter(10)
        .run(engine.clone(), &g)
        .await
        .unwrap();

    assert_eq!(sorted_values(&output, "value"), vec![1; 5]);
    assert!(output.converged);
    assert_eq!(output.rounds, 5);
}

#[tokio::test]
async fn test_minimal_iteration_propagation() {
    let engine = Arc::new(LocalEngine::default());
    let g = graph(
        &engine,
        vertices(vec![1, 2, 3, 4, 5]),
        edges(&[(2, 1), (3, 2), (4, 3), (5, 4)]),
    )
    .await;

    let output = propagate(false)
        .set_max_iter(4)
        .run(engine.clone(), &g)
        .await
        .unwrap();

    assert_eq!(sorted_values(&output, "value"), vec![1; 5]);
    assert_eq!(output.rounds, 4);
    assert!(!output.converged);
}

#[tokio::test]
async fn test_messages_in_both_directions() {
    let engine = Arc::new(LocalEngine::default());
    let g = graph(
        &engine,
        vertices(vec![1, 2, 3, 4]),
        edges(&[(1, 2), (1, 3), (2, 3), (3, 4), (4, 1)]),
    )
    .await;

    let output = PregelBuilder::new()
        .set_max_iter(1)
        .with_vertex_column(
            "degree",
            lit(0i64),
            coalesce(vec![Pregel::msg(), lit(0i64)]),
        )
        .send_msg_to_dst(lit(1i64))
        .send_msg_to_src(lit(1i64))
        .agg_msgs(count(Pregel::msg()))
        .run(engine.clone(), &g)
        .await
        .unwrap();

    assert_eq!(sorted_values(&output, "degree"), vec![3, 2, 3, 2]);
}

#[tokio::test]
async fn test_edge_columns_in_payload() {
    let engine = Arc::new(LocalEngine::default());
    let v = batch(vec![("id", ints(vec![1, 2, 3])), ("value", ints(vec![1, 2, 3]))]);
    let e = batch(vec![
        ("src", ints(vec![1, 2, 3])),
        ("dst", ints(vec![3, 3, 1])),
        ("weight", ints(vec![10, 100, 1000])),
    ]);
    let g = graph(&engine, v, e).await;

    let output = PregelBuilder::new()
        .set_max_iter(1)
        .with_vertex_column(
            "weighted",
            lit(0i64),
            coalesce(vec![Pregel::msg(), lit(0i64)]),
        )
        .send_msg_to_dst(Pregel::src("value").mul_expr(Pregel::edge("weight")))
        .agg_msgs(sum(Pregel::msg()))
        .run(engine.clone(), &g)
        .await
        .unwrap();

    assert_eq!(sorted_values(&output, "weighted"), vec![3000, 0, 210]);
}

#[tokio::test]
async fn test_additional_column_shadows_original() {
    let engine = Arc::new(LocalEngine::default());
    let v = batch(vec![
        ("id", ints(vec![1, 2])),
        ("value", ints(vec![5, 7])),
        ("tag", ints(vec![0, 0])),
    ]);
    let g = graph(&engine, v, edges(&[(1, 2)])).await;

    let output = PregelBuilder::new()
        .set_max_iter(1)
        .with_vertex_column(
            "value",
            col("value").add_expr(lit(1i64)),
            col("value").add_expr(coalesce(vec![Pregel::msg(), lit(0i64)])),
        )
        .send_msg_to_dst(Pregel::src("value"))
        .agg_msgs(sum(Pregel::msg()))
        .run(engine.clone(), &g)
        .await
        .unwrap();

    let names: Vec<_> = output
        .vertices
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    assert_eq!(names, vec!["id", "tag", "value"]);
    assert_eq!(sorted_values(&output, "value"), vec![6, 14]);
}

#[tokio::test]
async fn test_invalid_builder_fails_before_running() {
    let engine = Arc::new(LocalEngine::default());
    let g = graph(&engine, vertices(vec![1]), edges(&[])).await;

    let missing_agg = PregelBuilder::new()
        .with_vertex_column("value", lit(0i64), col("value"))
        .send_msg_to_dst(lit(1i64));
    let err = missing_agg.run(engine.clone(), &g).await.unwrap_err();
    assert!(matches!(err, StrataError::ConfigError(_)));

    let reserved = gated_sum()
        .send_msg_to_dst(Pregel::src("value"))
        .with_vertex_column(ID, lit(0i64), lit(0i64));
    let err = reserved.run(engine.clone(), &g).await.unwrap_err();
    assert!(matches!(err, StrataError::ConfigError(_)));
}

#[tokio::test]
async fn test_engine_errors_propagate() {
    let engine = Arc::new(LocalEngine::default());
    let g = graph(&engine, vertices(vec![1, 2]), edges(&[(1, 2)])).await;

    let err = PregelBuilder::new()
        .with_vertex_column("value", lit(0i64), col("no_such_column"))
        .send_msg_to_dst(Pregel::src("value"))
        .agg_msgs(sum(Pregel::msg()))
        .run(engine.clone(), &g)
        .await
        .unwrap_err();
    assert!(!matches!(err, StrataError::ConfigError(_)));
}

// =============================================================================
// Numerical Tests
// =============================================================================

#[tokio::test]
async fn test_rank_style_aggregation() {
    let engine = Arc::new(LocalEngine::default());
    let pairs = [
        (0, 1),
        (1, 2),
        (2, 4),
        (2, 0),
        (3, 4),
        (4, 3),
        (4, 0),
        (4, 2),
    ];
    let out_degree = (0..5)
        .map(|v| pairs.iter().filter(|(s, _)| *s == v).count() as i64)
        .collect();
    let v = batch(vec![
        ("id", ints((0..5).collect())),
        ("out_degree", ints(out_degree)),
    ]);
    let g = graph(&engine, v, edges(&pairs)).await;

    let output = PregelBuilder::new()
        .set_max_iter(5)
        .with_vertex_column(
            "rank",
            lit(1.0 / 5.0),
            coalesce(vec![Pregel::msg(), lit(0.0)])
                .mul_expr(lit(0.85))
                .add_expr(lit(0.15 / 5.0)),
        )
        .send_msg_to_dst(Pregel::src("rank").div_expr(Pregel::src("out_degree")))
        .agg_msgs(sum(Pregel::msg()))
        .run(engine.clone(), &g)
        .await
        .unwrap();

    assert_eq!(output.rounds, 5);
    let ids = output.vertices.column_by_name(ID).unwrap();
    let ranks = output.vertices.column_by_name("rank").unwrap();
    let ranks: BTreeMap<i64, f64> = ids
        .as_primitive::<Int64Type>()
        .values()
        .iter()
        .copied()
        .zip(ranks.as_primitive::<Float64Type>().values().iter().copied())
        .collect();

    let total: f64 = ranks.values().sum();
    assert!((total - 1.0).abs() < 1e-6, "sum of ranks {total}");
    for (id, expected) in [(0, 0.209), (1, 0.200), (2, 0.266), (3, 0.089), (4, 0.234)] {
        assert!(
            (ranks[&id] - expected).abs() < 1e-3,
            "rank of {id}: {} vs {expected}",
            ranks[&id]
        );
    }
}

// =============================================================================
// Termination Tests
// =============================================================================

#[tokio::test]
async fn test_no_rounds_after_empty_messages() {
    let engine = Arc::new(LocalEngine::default());
    let g = graph(
        &engine,
        vertices(vec![1, 2, 3, 4, 5]),
        edges(&[(1, 3), (2, 3), (3, 4), (4, 5)]),
    )
    .await;

    let builder = gated_sum().send_msg_to_dst(Pregel::src("value"));
    let exact = builder
        .clone()
        .set_max_iter(4)
        .run(engine.clone(), &g)
        .await
        .unwrap();
    let generous = builder
        .set_max_iter(50)
        .run(engine.clone(), &g)
        .await
        .unwrap();

    assert_eq!(exact.rounds, 4);
    assert_eq!(generous.rounds, 4);
    assert_eq!(int_column(&exact, "value"), int_column(&generous, "value"));
}

#[tokio::test]
async fn test_isolated_vertices_run_one_round() {
    let engine = Arc::new(LocalEngine::default());
    let g = graph(&engine, vertices(vec![1, 2, 3]), edges(&[])).await;
    let output = gated_sum()
        .send_msg_to_dst(Pregel::src("value"))
        .run(engine.clone(), &g)
        .await
        .unwrap();
    assert_eq!(output.rounds, 1);
    assert!(output.converged);
    assert_eq!(sorted_values(&output, "value"), vec![42, 42, 0]);
}

fn forward_edges() -> impl Strategy<Value = (i64, Vec<(i64, i64)>)> {
    (2i64..7).prop_flat_map(|n| {
        let edge = (0..n - 1).prop_flat_map(move |a| (Just(a), a + 1..n));
        (Just(n), prop::collection::vec(edge, 0..12))
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn prop_early_termination((n, pairs) in forward_edges()) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let engine = Arc::new(LocalEngine::default());
            let g = graph(&engine, vertices((0..n).collect()), edges(&pairs)).await;
            let builder = gated_sum()
                .send_msg_to_dst(Pregel::src("value"))
                .set_checkpoint_interval(3);

            let first = builder
                .clone()
                .set_max_iter(n as usize + 1)
                .run(engine.clone(), &g)
                .await
                .unwrap();
            assert!(first.converged);
            let (last, earlier) = first.history.split_last().unwrap();
            assert_eq!(last.messages, 0);
            assert!(earlier.iter().all(|r| r.messages > 0));

            let again = builder
                .set_max_iter(first.rounds + 3)
                .run(engine.clone(), &g)
                .await
                .unwrap();
            assert_eq!(again.rounds, first.rounds);
            assert_eq!(int_column(&again, "value"), int_column(&first, "value"));
        });
    }
}

// =============================================================================
// Lineage Tests
// =============================================================================

async fn chain_run(interval: usize) -> PregelOutput {
    let engine = Arc::new(LocalEngine::default());
    let pairs: Vec<_> = (1..12).map(|i| (i, i + 1)).collect();
    let g = graph(&engine, vertices((1..=12).collect()), edges(&pairs)).await;
    propagate(true)
        .set_max_iter(20)
        .set_checkpoint_interval(interval)
        .run(engine.clone(), &g)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_checkpointing_bounds_lineage() {
    let unbounded = chain_run(0).await;
    let depths: Vec<_> = unbounded.history.iter().map(|r| r.lineage_depth).collect();
    assert!(depths.windows(2).all(|w| w[0] < w[1]), "{depths:?}");
    assert!(unbounded.history.iter().all(|r| !r.checkpointed));

    let bounded = chain_run(2).await;
    assert_eq!(bounded.rounds, unbounded.rounds);
    assert_eq!(
        int_column(&bounded, "value"),
        int_column(&unbounded, "value")
    );

    let even: Vec<_> = bounded
        .history
        .iter()
        .filter(|r| r.checkpointed)
        .map(|r| r.lineage_depth)
        .collect();
    assert!(even.len() >= 5);
    assert!(even.windows(2).all(|w| w[0] == w[1]), "{even:?}");
    let deepest = bounded.history.iter().map(|r| r.lineage_depth).max().unwrap();
    assert!(deepest < *depths.last().unwrap());
}

#[tokio::test]
async fn test_reliable_checkpoints_are_cleaned_up() {
    let dir = tempfile::tempdir().unwrap();
    let config = StrataConfig {
        checkpoint: CheckpointConfig::reliable(dir.path()),
        ..StrataConfig::default()
    };
    let engine = Arc::new(LocalEngine::new(&config).unwrap());
    let pairs: Vec<_> = (1..6).map(|i| (i, i + 1)).collect();
    let g = graph(&engine, vertices((1..=6).collect()), edges(&pairs)).await;

    let output = propagate(true)
        .set_checkpoint_interval(1)
        .run(engine.clone(), &g)
        .await
        .unwrap();

    assert!(output.history.iter().all(|r| r.checkpointed));
    assert_eq!(sorted_values(&output, "value"), vec![1; 6]);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_retained_checkpoints_released_at_end() {
    let dir = tempfile::tempdir().unwrap();
    let config = StrataConfig {
        checkpoint: CheckpointConfig::reliable(dir.path()),
        ..StrataConfig::default()
    };
    let engine = Arc::new(LocalEngine::new(&config).unwrap());
    let pairs: Vec<_> = (1..5).map(|i| (i, i + 1)).collect();
    let g = graph(&engine, vertices((1..=5).collect()), edges(&pairs)).await;

    let plan = propagate(true).set_checkpoint_interval(1).build().unwrap();
    let output = PregelEngine::new(engine.clone())
        .with_checkpoint_retain(3)
        .run(&plan, &g)
        .await
        .unwrap();

    assert_eq!(output.rounds, 5);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_float_vertex_columns() {
    let engine = Arc::new(LocalEngine::default());
    let v = batch(vec![
        ("id", ints(vec![1, 2])),
        ("weight", Arc::new(Float64Array::from(vec![0.5, 1.5])) as ArrayRef),
    ]);
    let g = graph(&engine, v, edges(&[(1, 2), (2, 1)])).await;
    let output = PregelBuilder::new()
        .set_max_iter(1)
        .with_vertex_column(
            "total",
            col("weight"),
            col("total").add_expr(coalesce(vec![Pregel::msg(), lit(0.0)])),
        )
        .send_msg_to_dst(Pregel::src("weight"))
        .agg_msgs(sum(Pregel::msg()))
        .run(engine.clone(), &g)
        .await
        .unwrap();

    let totals = output.vertices.column_by_name("total").unwrap();
    let mut totals: Vec<_> = totals.as_primitive::<Float64Type>().values().to_vec();
    totals.sort_by(f64::total_cmp);
    assert_eq!(totals, vec![2.0, 2.0]);
    assert_eq!(output.vertices.schema().field(1).data_type(), &DataType::Float64);
}
