//! Test algorithms and pipeline builders

use std::rc::Rc;
use vispipe_rs::config::ExecutiveConfig;
use vispipe_rs::data::{DataKind, DataObject};
use vispipe_rs::information::{Information, InformationRef};
use vispipe_rs::pipeline::nodes::DataSetSource;
use vispipe_rs::pipeline::{
    input_data, output_data, Algorithm, Executive, InputInformation, InputPortSpec,
    OutputPortSpec, PipelineResult, RequestContext,
};
use vispipe_rs::TimeStamp;

/// How often each phase handler of a `CountingFilter` ran.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseCounts {
    pub data_object: usize,
    pub information: usize,
    pub update_extent: usize,
    pub data: usize,
}

impl PhaseCounts {
    pub fn total(&self) -> usize {
        self.data_object + self.information + self.update_extent + self.data
    }
}

/// One-input filter that shallow-copies its input and counts every handler
/// call. Port contracts are configurable so the same filter can exercise
/// validation.
pub struct CountingFilter {
    name: String,
    input: InputPortSpec,
    output_kind: DataKind,
    parameter: i64,
    mtime: TimeStamp,
    pub counts: PhaseCounts,
}

impl CountingFilter {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            input: InputPortSpec::new("input").accepts(DataKind::DataSet),
            output_kind: DataKind::PolyData,
            parameter: 0,
            mtime: TimeStamp::now(),
            counts: PhaseCounts::default(),
        }
    }

    pub fn with_input(mut self, input: InputPortSpec) -> Self {
        self.input = input;
        self
    }

    pub fn with_output_kind(mut self, kind: DataKind) -> Self {
        self.output_kind = kind;
        self
    }

    pub fn parameter(&self) -> i64 {
        self.parameter
    }

    pub fn set_parameter(&mut self, value: i64) {
        if self.parameter != value {
            self.parameter = value;
            self.mtime.modified();
        }
    }
}

impl Algorithm for CountingFilter {
    fn name(&self) -> &str {
        &self.name
    }

    fn number_of_input_ports(&self) -> usize {
        1
    }

    fn number_of_output_ports(&self) -> usize {
        1
    }

    fn fill_input_port_information(&self, _port: usize, info: &mut Information) -> PipelineResult<()> {
        self.input.fill(info);
        Ok(())
    }

    fn fill_output_port_information(&self, _port: usize, info: &mut Information) -> PipelineResult<()> {
        OutputPortSpec::new("output").produces(self.output_kind).fill(info);
        Ok(())
    }

    fn mtime(&self) -> TimeStamp {
        self.mtime
    }

    fn request_data_object(
        &mut self,
        _ctx: &RequestContext<'_>,
        _request: &mut Information,
        _inputs: &InputInformation,
        _outputs: &[InformationRef],
    ) -> PipelineResult<()> {
        self.counts.data_object += 1;
        Ok(())
    }

    fn request_information(
        &mut self,
        _ctx: &RequestContext<'_>,
        _request: &mut Information,
        _inputs: &InputInformation,
        _outputs: &[InformationRef],
    ) -> PipelineResult<()> {
        self.counts.information += 1;
        Ok(())
    }

    fn request_update_extent(
        &mut self,
        _ctx: &RequestContext<'_>,
        _request: &mut Information,
        _inputs: &InputInformation,
        _outputs: &[InformationRef],
    ) -> PipelineResult<()> {
        self.counts.update_extent += 1;
        Ok(())
    }

    fn request_data(
        &mut self,
        ctx: &RequestContext<'_>,
        _request: &mut Information,
        inputs: &InputInformation,
        outputs: &[InformationRef],
    ) -> PipelineResult<()> {
        self.counts.data += 1;
        let output = output_data(outputs, 0).ok_or_else(|| ctx.fail("no output"))?;
        if let Some(input) = input_data(inputs, 0, 0) {
            output.borrow_mut().shallow_copy(&*input.borrow());
        }
        Ok(())
    }
}

/// Which phase a `ReentrantFilter` calls back into its own executive from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reenter {
    FromInformation,
    FromData,
}

/// Source whose handler pulls on its own executive.
pub struct ReentrantSource {
    from: Reenter,
    pub calls: usize,
}

impl ReentrantSource {
    pub fn new(from: Reenter) -> Self {
        Self { from, calls: 0 }
    }

    fn reenter(&mut self, ctx: &RequestContext<'_>) -> PipelineResult<()> {
        self.calls += 1;
        let executive = ctx.executive_rc().ok_or_else(|| ctx.fail("executive dropped"))?;
        executive.update()
    }
}

impl Algorithm for ReentrantSource {
    fn name(&self) -> &str {
        "ReentrantSource"
    }

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

    fn request_information(
        &mut self,
        ctx: &RequestContext<'_>,
        _request: &mut Information,
        _inputs: &InputInformation,
        _outputs: &[InformationRef],
    ) -> PipelineResult<()> {
        match self.from {
            Reenter::FromInformation => self.reenter(ctx),
            Reenter::FromData => Ok(()),
        }
    }

    fn request_data(
        &mut self,
        ctx: &RequestContext<'_>,
        _request: &mut Information,
        _inputs: &InputInformation,
        _outputs: &[InformationRef],
    ) -> PipelineResult<()> {
        match self.from {
            Reenter::FromData => self.reenter(ctx),
            Reenter::FromInformation => Ok(()),
        }
    }
}

/// A source feeding a straight line of counting filters.
pub struct Chain {
    pub source: Rc<Executive>,
    pub filters: Vec<Rc<Executive>>,
}

impl Chain {
    pub fn last(&self) -> &Rc<Executive> {
        self.filters.last().unwrap_or(&self.source)
    }

    pub fn counts(&self, index: usize) -> PhaseCounts {
        self.filters[index]
            .algorithm::<CountingFilter>()
            .map(|f| f.counts)
            .expect("filter is a CountingFilter")
    }

    pub fn source_executions(&self) -> usize {
        self.source
            .algorithm::<DataSetSource>()
            .map(|s| s.executions())
            .expect("source is a DataSetSource")
    }
}

/// Builder for a source followed by `n` counting filters.
pub struct ChainBuilder {
    source: DataSetSource,
    filters: usize,
    config: ExecutiveConfig,
}

impl ChainBuilder {
    pub fn new() -> Self {
        Self {
            source: DataSetSource::new(DataKind::PolyData, 8),
            filters: 2,
            config: ExecutiveConfig::strict(),
        }
    }

    pub fn source(mut self, source: DataSetSource) -> Self {
        self.source = source;
        self
    }

    pub fn filters(mut self, n: usize) -> Self {
        self.filters = n;
        self
    }

    pub fn config(mut self, config: ExecutiveConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Chain {
        let source = Executive::new(self.source, self.config.clone()).expect("source");
        let mut filters: Vec<Rc<Executive>> = Vec::new();
        for i in 0..self.filters {
            let filter = Executive::new(
                CountingFilter::new(&format!("filter{i}")),
                self.config.clone(),
            )
            .expect("filter");
            let producer = filters.last().unwrap_or(&source);
            filter.set_input_connection(0, producer, 0).expect("connect");
            filters.push(filter);
        }
        Chain { source, filters }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_builder() {
        let chain = ChainBuilder::new().filters(3).build();
        assert_eq!(chain.filters.len(), 3);
        assert_eq!(chain.last().name(), "filter2");
        assert_eq!(chain.last().number_of_input_connections(0), 1);
        assert_eq!(chain.counts(0), PhaseCounts::default());
    }
}
