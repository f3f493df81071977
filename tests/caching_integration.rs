//! Integration tests for stamp-gated re-execution
//!
//! These cover the executive's caching contract:
//! - an unchanged pipeline does no work on a repeated update,
//! - a change upstream re-runs everything downstream of it and nothing above it.

mod common;

use common::builders::{ChainBuilder, CountingFilter, PhaseCounts};
use vispipe_rs::data::{DataKind, DataObject};
use vispipe_rs::pipeline::nodes::{AppendArrays, DataSetSource};
use vispipe_rs::pipeline::{Executive, PipelineError};
use vispipe_rs::ExecutiveConfig;

const ONCE: PhaseCounts = PhaseCounts {
    data_object: 1,
    information: 1,
    update_extent: 1,
    data: 1,
};

#[test]
fn test_first_update_runs_every_phase_once() {
    common::init_tracing();
    let chain = ChainBuilder::new().filters(3).build();
    chain.last().update().unwrap();

    for i in 0..3 {
        assert_eq!(chain.counts(i), ONCE, "filter{i}");
    }
    assert_eq!(chain.source_executions(), 1);
    assert_eq!(common::point_count(chain.last()), 8);
}

#[test]
fn test_repeated_update_without_changes_does_nothing() {
    let chain = ChainBuilder::new().filters(3).build();
    chain.last().update().unwrap();
    let data_time = chain.last().data_time();

    for _ in 0..5 {
        chain.last().update().unwrap();
    }

    for i in 0..3 {
        assert_eq!(chain.counts(i), ONCE, "filter{i}");
    }
    assert_eq!(chain.source_executions(), 1);
    assert_eq!(chain.last().data_time(), data_time);
}

#[test]
fn test_source_change_reruns_everything_downstream() {
    let chain = ChainBuilder::new().filters(3).build();
    chain.last().update().unwrap();

    chain
        .source
        .algorithm_mut::<DataSetSource>()
        .unwrap()
        .set_number_of_points(20);
    chain.last().update().unwrap();

    for i in 0..3 {
        let counts = chain.counts(i);
        assert_eq!(counts.information, 2, "filter{i}");
        assert_eq!(counts.data, 2, "filter{i}");
    }
    assert_eq!(chain.source_executions(), 2);
    assert_eq!(common::point_count(chain.last()), 20);
}

#[test]
fn test_middle_change_leaves_upstream_alone() {
    let chain = ChainBuilder::new().filters(3).build();
    chain.last().update().unwrap();

    chain.filters[1]
        .algorithm_mut::<CountingFilter>()
        .unwrap()
        .set_parameter(7);
    chain.last().update().unwrap();

    assert_eq!(chain.source_executions(), 1);
    assert_eq!(chain.counts(0), ONCE);
    assert_eq!(chain.counts(1).data, 2);
    assert_eq!(chain.counts(2).data, 2);
}

#[test]
fn test_setting_the_same_parameter_is_not_a_change() {
    let chain = ChainBuilder::new().filters(1).build();
    chain.last().update().unwrap();

    chain
        .source
        .algorithm_mut::<DataSetSource>()
        .unwrap()
        .set_number_of_points(8);
    chain.last().update().unwrap();

    assert_eq!(chain.source_executions(), 1);
    assert_eq!(chain.counts(0), ONCE);
}

#[test]
fn test_updating_upstream_node_directly_does_not_disturb_downstream() {
    let chain = ChainBuilder::new().filters(2).build();
    chain.last().update().unwrap();

    chain.filters[0].update().unwrap();
    chain.last().update().unwrap();

    assert_eq!(chain.counts(0), ONCE);
    assert_eq!(chain.counts(1), ONCE);
}

#[test]
fn test_modified_executive_reruns_its_node() {
    let chain = ChainBuilder::new().filters(2).build();
    chain.last().update().unwrap();

    chain.filters[0].modified();
    chain.last().update().unwrap();

    assert_eq!(chain.source_executions(), 1);
    assert_eq!(chain.counts(0).data, 2);
    assert_eq!(chain.counts(1).data, 2);
}

#[test]
fn test_reconnecting_bumps_consumer_only() {
    let chain = ChainBuilder::new().filters(2).build();
    chain.last().update().unwrap();
    let before = chain.last().mtime();

    chain.filters[1]
        .set_input_connection(0, &chain.source, 0)
        .unwrap();
    assert!(chain.filters[1].mtime() > before);
    chain.last().update().unwrap();

    assert_eq!(chain.source_executions(), 1);
    assert_eq!(chain.counts(0), ONCE);
    assert_eq!(chain.counts(1).data, 2);
}

#[test]
fn test_pipeline_mtime_is_max_over_upstream() {
    let chain = ChainBuilder::new().filters(2).build();
    chain.last().update().unwrap();
    let settled = chain.last().pipeline_mtime();
    assert!(settled >= chain.source.pipeline_mtime());

    chain
        .source
        .algorithm_mut::<DataSetSource>()
        .unwrap()
        .set_number_of_points(3);
    let recomputed = chain.last().update_pipeline_mtime().unwrap();

    assert!(recomputed > settled);
    assert_eq!(recomputed, chain.source.pipeline_mtime());
    assert!(chain.last().need_to_execute_data(None));
}

#[test]
fn test_released_input_is_regenerated_on_next_execution() {
    let chain = ChainBuilder::new().filters(1).build();
    chain.source.set_release_data_flag(0, true).unwrap();
    assert!(chain.source.release_data_flag(0));

    chain.last().update().unwrap();
    let source_data = common::output_of(&chain.source);
    assert!(source_data.borrow().data_released());
    assert_eq!(common::point_count(chain.last()), 8);

    // The consumer's own output is intact, so nothing re-runs.
    chain.last().update().unwrap();
    assert_eq!(chain.source_executions(), 1);

    chain.filters[0]
        .algorithm_mut::<CountingFilter>()
        .unwrap()
        .set_parameter(1);
    chain.last().update().unwrap();
    assert_eq!(chain.source_executions(), 2);
    assert_eq!(common::point_count(chain.last()), 8);
}

#[test]
fn test_release_data_default_comes_from_config() {
    let chain = ChainBuilder::new()
        .filters(1)
        .config(ExecutiveConfig::default().with_release_data(true))
        .build();
    assert!(chain.source.release_data_flag(0));
    assert!(chain.last().release_data_flag(0));
}

#[test]
fn test_failed_update_is_retried_in_full() {
    let source = Executive::new(
        DataSetSource::new(DataKind::PolyData, 4).with_array_name("Other"),
        ExecutiveConfig::default(),
    )
    .unwrap();
    let append = Executive::new(AppendArrays::new("Values"), ExecutiveConfig::default()).unwrap();
    append.add_input_connection(0, &source, 0).unwrap();

    let err = append.update().unwrap_err();
    assert!(matches!(err, PipelineError::FieldNotFound { port: 0, .. }));
    let failed_time = append.data_time();

    source
        .algorithm_mut::<DataSetSource>()
        .unwrap()
        .set_array_name("Values");
    append.update().unwrap();

    assert!(append.data_time() > failed_time);
    assert_eq!(common::point_values(&append, "Values"), vec![0.0, 1.0, 2.0, 3.0]);
    assert_eq!(append.algorithm::<AppendArrays>().unwrap().executions(), 1);
}

#[test]
fn test_update_while_caller_holds_algorithm_fails() {
    let chain = ChainBuilder::new().filters(2).build();
    chain.last().update().unwrap();

    let mut source = chain.source.algorithm_mut::<DataSetSource>().unwrap();
    source.set_number_of_points(10);
    let err = chain.last().update().unwrap_err();
    assert_eq!(
        err,
        PipelineError::AlgorithmBorrowed {
            node: "DataSetSource".to_string(),
            phase: "data object",
        }
    );
    assert!(!err.is_contract_violation());
    assert!(chain.last().update_pipeline_mtime().is_err());
    drop(source);

    // Nothing was stamped while the algorithm was held, so the change still lands.
    chain.last().update().unwrap();
    assert_eq!(chain.source_executions(), 2);
    assert_eq!(common::point_count(chain.last()), 10);
}
