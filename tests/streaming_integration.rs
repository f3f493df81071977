//! Integration tests for streaming requests: pieces, time steps and extents

mod common;

use common::builders::{ChainBuilder, CountingFilter};
use vispipe_rs::data::{DataKind, DataObject, Extent};
use vispipe_rs::information::{keys, Information, InformationRef};
use vispipe_rs::pipeline::nodes::{DataSetSource, GroupDataSets};
use vispipe_rs::pipeline::{
    input_data, output_data, Algorithm, Executive, InputInformation, InputPortSpec,
    OutputPortSpec, PipelineError, PipelineResult, RequestContext,
};
use vispipe_rs::ExecutiveConfig;

fn data_info_i64(executive: &Executive, key: &vispipe_rs::InformationKey<i64>) -> Option<i64> {
    let data = common::output_of(executive);
    let data = data.borrow();
    data.core().information().get_copied(key)
}

fn data_time_step(executive: &Executive) -> Option<f64> {
    let data = common::output_of(executive);
    let data = data.borrow();
    data.core().information().get_copied(&keys::DATA_TIME_STEP)
}

fn counting_data(executive: &Executive) -> usize {
    executive.algorithm::<CountingFilter>().unwrap().counts.data
}

// ── Pieces ──

#[test]
fn test_piece_request_reaches_source() {
    common::init_tracing();
    let chain = ChainBuilder::new()
        .source(DataSetSource::new(DataKind::PolyData, 10))
        .filters(1)
        .build();
    let filter = chain.last();

    filter.update_piece(0, 1, 3, 0).unwrap();

    assert_eq!(common::point_values(filter, "Values"), vec![3.0, 4.0, 5.0]);
    assert_eq!(data_info_i64(filter, &keys::DATA_PIECE_NUMBER), Some(1));
    assert_eq!(data_info_i64(filter, &keys::DATA_NUMBER_OF_PIECES), Some(3));
}

#[test]
fn test_changing_piece_reexecutes_and_same_piece_does_not() {
    let chain = ChainBuilder::new()
        .source(DataSetSource::new(DataKind::PolyData, 10))
        .filters(1)
        .build();
    let filter = chain.last();

    filter.update_piece(0, 1, 3, 0).unwrap();
    filter.update_piece(0, 2, 3, 0).unwrap();
    assert_eq!(common::point_values(filter, "Values"), vec![6.0, 7.0, 8.0, 9.0]);
    assert_eq!(counting_data(filter), 2);
    assert_eq!(chain.source_executions(), 2);

    filter.update_piece(0, 2, 3, 0).unwrap();
    assert_eq!(counting_data(filter), 2);
    assert_eq!(chain.source_executions(), 2);
}

#[test]
fn test_more_ghost_levels_reexecute() {
    let chain = ChainBuilder::new().filters(1).build();
    let filter = chain.last();

    filter.update_piece(0, 0, 2, 0).unwrap();
    filter.update_piece(0, 0, 2, 1).unwrap();
    assert_eq!(counting_data(filter), 2);
    assert_eq!(data_info_i64(filter, &keys::DATA_NUMBER_OF_GHOST_LEVELS), Some(1));

    // Fewer ghosts than were generated are already satisfied.
    filter.update_piece(0, 0, 2, 0).unwrap();
    assert_eq!(counting_data(filter), 2);
}

#[test]
fn test_whole_extent_resets_a_piece_request() {
    let chain = ChainBuilder::new()
        .source(DataSetSource::new(DataKind::PolyData, 10))
        .filters(1)
        .build();
    let filter = chain.last();

    filter.update_piece(0, 1, 2, 0).unwrap();
    assert_eq!(common::point_count(filter), 5);

    filter.update_whole_extent(0).unwrap();
    assert_eq!(common::point_count(filter), 10);
    assert_eq!(data_info_i64(filter, &keys::DATA_NUMBER_OF_PIECES), Some(1));
}

/// Source without piece support; always produces five points.
struct WholeOnlySource {
    executions: usize,
}

impl Algorithm for WholeOnlySource {
    fn number_of_input_ports(&self) -> usize {
        0
    }

    fn number_of_output_ports(&self) -> usize {
        1
    }

    fn fill_output_port_information(&self, _port: usize, info: &mut Information) -> PipelineResult<()> {
        OutputPortSpec::new("output").produces(DataKind::PolyData).fill(info);
        Ok(())
    }

    fn request_data(
        &mut self,
        ctx: &RequestContext<'_>,
        _request: &mut Information,
        _inputs: &InputInformation,
        outputs: &[InformationRef],
    ) -> PipelineResult<()> {
        let output = output_data(outputs, 0).ok_or_else(|| ctx.fail("no output"))?;
        output
            .borrow_mut()
            .as_any_mut()
            .downcast_mut::<vispipe_rs::DataSet>()
            .ok_or_else(|| ctx.fail("not a data set"))?
            .set_number_of_points(5);
        self.executions += 1;
        Ok(())
    }
}

#[test]
fn test_source_without_piece_support_skips_later_pieces() {
    let source = Executive::new(WholeOnlySource { executions: 0 }, ExecutiveConfig::default())
        .unwrap();
    assert_eq!(source.name(), "WholeOnlySource");

    source.update_piece(0, 1, 2, 0).unwrap();
    assert_eq!(source.algorithm::<WholeOnlySource>().unwrap().executions, 0);

    source.update_piece(0, 0, 2, 0).unwrap();
    assert_eq!(source.algorithm::<WholeOnlySource>().unwrap().executions, 1);
    assert_eq!(common::point_count(&source), 5);
}

// ── Time ──

fn timed_chain() -> common::builders::Chain {
    ChainBuilder::new()
        .source(DataSetSource::new(DataKind::PolyData, 3).with_time_steps(vec![0.0, 1.0, 2.0]))
        .filters(1)
        .build()
}

#[test]
fn test_time_metadata_flows_downstream() {
    let chain = timed_chain();
    chain.last().update_information().unwrap();

    let info = chain.last().output_information(0).unwrap();
    let info = info.borrow();
    assert_eq!(info.get(&keys::TIME_STEPS), Some(&vec![0.0, 1.0, 2.0]));
    assert_eq!(info.get(&keys::TIME_RANGE), Some(&vec![0.0, 2.0]));
}

#[test]
fn test_time_step_request_snaps_to_published_step() {
    let chain = timed_chain();
    let filter = chain.last();

    filter.update_time_step(0, 1.5).unwrap();

    assert_eq!(data_time_step(filter), Some(1.0));
    assert_eq!(common::point_values(filter, "Values"), vec![1.0, 2.0, 3.0]);
}

#[test]
fn test_repeated_time_request_is_cached() {
    let chain = timed_chain();
    let filter = chain.last();

    filter.update_time_step(0, 1.5).unwrap();
    filter.update_time_step(0, 1.5).unwrap();
    assert_eq!(counting_data(filter), 1);
    assert_eq!(chain.source_executions(), 1);

    filter.update_time_step(0, 2.0).unwrap();
    assert_eq!(counting_data(filter), 2);
    assert_eq!(chain.source_executions(), 2);
    common::assert_float_eq(data_time_step(filter).unwrap(), 2.0, 1e-12);
    assert_eq!(common::point_values(filter, "Values"), vec![2.0, 3.0, 4.0]);
}

// ── Structured extents ──

fn image_chain() -> common::builders::Chain {
    let source = Executive::new(
        DataSetSource::new(DataKind::ImageData, 10),
        ExecutiveConfig::strict(),
    )
    .unwrap();
    let filter = Executive::new(
        CountingFilter::new("image filter").with_output_kind(DataKind::ImageData),
        ExecutiveConfig::strict(),
    )
    .unwrap();
    filter.set_input_connection(0, &source, 0).unwrap();
    common::builders::Chain {
        source,
        filters: vec![filter],
    }
}

#[test]
fn test_whole_extent_is_published() {
    let chain = image_chain();
    chain.last().update().unwrap();

    let info = chain.last().output_information(0).unwrap();
    assert_eq!(
        info.borrow().get_copied(&keys::WHOLE_EXTENT),
        Some(Extent::new(0, 9, 0, 0, 0, 0))
    );
    assert_eq!(common::point_count(chain.last()), 10);
}

#[test]
fn test_sub_extent_request() {
    let chain = image_chain();
    let filter = chain.last();

    filter.update_extent(0, Extent::new(2, 4, 0, 0, 0, 0)).unwrap();
    assert_eq!(common::point_values(filter, "Values"), vec![2.0, 3.0, 4.0]);

    // Contained in what was generated: nothing to do.
    filter.update_extent(0, Extent::new(3, 4, 0, 0, 0, 0)).unwrap();
    assert_eq!(counting_data(filter), 1);

    filter.update_extent(0, Extent::new(0, 9, 0, 0, 0, 0)).unwrap();
    assert_eq!(counting_data(filter), 2);
    assert_eq!(common::point_count(filter), 10);
}

#[test]
fn test_extent_outside_whole_is_rejected() {
    let chain = image_chain();
    let err = chain
        .last()
        .update_extent(0, Extent::new(0, 20, 0, 0, 0, 0))
        .unwrap_err();
    assert!(matches!(err, PipelineError::InvalidRequest(_)));
    assert_eq!(counting_data(chain.last()), 0);
}

#[test]
fn test_extent_is_not_forwarded_to_unstructured_input() {
    let source = Executive::new(DataSetSource::new(DataKind::PolyData, 6), ExecutiveConfig::default())
        .unwrap();
    let filter = Executive::new(
        CountingFilter::new("to image").with_output_kind(DataKind::ImageData),
        ExecutiveConfig::default(),
    )
    .unwrap();
    filter.set_input_connection(0, &source, 0).unwrap();

    filter.update().unwrap();

    let info = source.output_information(0).unwrap();
    assert!(!info.borrow().has(&keys::UPDATE_EXTENT));
    assert_eq!(common::point_count(&filter), 6);
}

/// Image filter that always asks its input for one fixed sub-extent.
struct CropRequest {
    extent: Extent,
}

impl Algorithm for CropRequest {
    fn number_of_input_ports(&self) -> usize {
        1
    }

    fn number_of_output_ports(&self) -> usize {
        1
    }

    fn fill_input_port_information(&self, _port: usize, info: &mut Information) -> PipelineResult<()> {
        InputPortSpec::new("input").accepts(DataKind::ImageData).fill(info);
        Ok(())
    }

    fn fill_output_port_information(&self, _port: usize, info: &mut Information) -> PipelineResult<()> {
        OutputPortSpec::new("output").produces(DataKind::ImageData).fill(info);
        Ok(())
    }

    fn request_update_extent(
        &mut self,
        _ctx: &RequestContext<'_>,
        _request: &mut Information,
        inputs: &InputInformation,
        _outputs: &[InformationRef],
    ) -> PipelineResult<()> {
        inputs[0][0]
            .borrow_mut()
            .set(&keys::UPDATE_EXTENT, self.extent);
        Ok(())
    }

    fn request_data(
        &mut self,
        ctx: &RequestContext<'_>,
        _request: &mut Information,
        inputs: &InputInformation,
        outputs: &[InformationRef],
    ) -> PipelineResult<()> {
        let output = output_data(outputs, 0).ok_or_else(|| ctx.fail("no output"))?;
        let input = input_data(inputs, 0, 0).ok_or_else(|| ctx.fail("no input"))?;
        output.borrow_mut().shallow_copy(&*input.borrow());
        Ok(())
    }
}

#[test]
fn test_consumers_of_one_output_share_a_combined_extent() {
    let source = Executive::new(
        DataSetSource::new(DataKind::ImageData, 10),
        ExecutiveConfig::default(),
    )
    .unwrap();
    let group = Executive::new(GroupDataSets::new(), ExecutiveConfig::default()).unwrap();
    for extent in [Extent::new(0, 2, 0, 0, 0, 0), Extent::new(5, 7, 0, 0, 0, 0)] {
        let crop = Executive::new(CropRequest { extent }, ExecutiveConfig::default()).unwrap();
        crop.set_input_connection(0, &source, 0).unwrap();
        group.add_input_connection(0, &crop, 0).unwrap();
    }

    group.update().unwrap();

    assert_eq!(
        source.algorithm::<DataSetSource>().unwrap().executions(),
        1
    );
    let expected: Vec<f64> = (0..=7).map(|i| i as f64).collect();
    assert_eq!(common::point_values(&source, "Values"), expected);
    let info = source.output_information(0).unwrap();
    assert!(!info.borrow().has(&keys::COMBINED_UPDATE_EXTENT));

    // A later update with the same requests is already satisfied.
    group.update().unwrap();
    assert_eq!(
        source.algorithm::<DataSetSource>().unwrap().executions(),
        1
    );
}

// ── Continue executing ──

/// Source that asks for `wanted` data passes per update, one point per pass.
struct Accumulator {
    wanted: usize,
    passes: usize,
}

impl Algorithm for Accumulator {
    fn number_of_input_ports(&self) -> usize {
        0
    }

    fn number_of_output_ports(&self) -> usize {
        1
    }

    fn fill_output_port_information(&self, _port: usize, info: &mut Information) -> PipelineResult<()> {
        OutputPortSpec::new("output").produces(DataKind::PolyData).fill(info);
        Ok(())
    }

    fn request_data(
        &mut self,
        ctx: &RequestContext<'_>,
        request: &mut Information,
        _inputs: &InputInformation,
        outputs: &[InformationRef],
    ) -> PipelineResult<()> {
        let continuing = request.get_or(&keys::CONTINUE_EXECUTING, false);
        let round = if continuing { self.passes + 1 } else { 1 };
        self.passes = round;
        let output = output_data(outputs, 0).ok_or_else(|| ctx.fail("no output"))?;
        output
            .borrow_mut()
            .as_any_mut()
            .downcast_mut::<vispipe_rs::DataSet>()
            .ok_or_else(|| ctx.fail("not a data set"))?
            .set_number_of_points(round);
        if round < self.wanted {
            request.set(&keys::CONTINUE_EXECUTING, true);
        }
        Ok(())
    }
}

#[test]
fn test_continue_executing_runs_extra_passes() {
    let source = Executive::new(
        Accumulator { wanted: 3, passes: 0 },
        ExecutiveConfig::default(),
    )
    .unwrap();

    source.update().unwrap();

    assert_eq!(source.algorithm::<Accumulator>().unwrap().passes, 3);
    assert_eq!(common::point_count(&source), 3);
    assert_eq!(data_info_i64(&source, &keys::DATA_NUMBER_OF_PIECES), Some(1));
}

#[test]
fn test_continue_executing_is_bounded() {
    let config = ExecutiveConfig {
        max_continue_executions: 4,
        ..ExecutiveConfig::default()
    };
    let source = Executive::new(Accumulator { wanted: 100, passes: 0 }, config).unwrap();

    source.update().unwrap();

    assert_eq!(source.algorithm::<Accumulator>().unwrap().passes, 4);
}
