//! DataSetSource: synthetic leaf data producer.
//!
//! Generates a data set of a configurable kind with one named point array.
//! Point `i` of time step `t` carries `i + t`. Unstructured kinds split
//! their points evenly across pieces; structured kinds generate exactly the
//! requested update extent.

use crate::data::{DataKind, DataObject, DataSet, Extent, ExtentType};
use crate::data::{AttributeRole, DataArray};
use crate::information::{keys, Information, InformationRef};
use crate::pipeline::algorithm::{output_data, Algorithm, InputInformation, RequestContext};
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::port::OutputPortSpec;
use crate::pipeline::streaming::PieceRequest;
use crate::time_stamp::TimeStamp;

pub struct DataSetSource {
    kind: DataKind,
    number_of_points: usize,
    array_name: String,
    time_steps: Vec<f64>,
    mtime: TimeStamp,
    executions: usize,
}

impl DataSetSource {
    pub fn new(kind: DataKind, number_of_points: usize) -> Self {
        Self {
            kind,
            number_of_points,
            array_name: "Values".to_string(),
            time_steps: Vec::new(),
            mtime: TimeStamp::now(),
            executions: 0,
        }
    }

    pub fn with_array_name(mut self, name: impl Into<String>) -> Self {
        self.array_name = name.into();
        self
    }

    pub fn with_time_steps(mut self, steps: Vec<f64>) -> Self {
        self.time_steps = steps;
        self
    }

    pub fn kind(&self) -> DataKind {
        self.kind
    }

    pub fn number_of_points(&self) -> usize {
        self.number_of_points
    }

    pub fn set_number_of_points(&mut self, n: usize) {
        if self.number_of_points != n {
            self.number_of_points = n;
            self.mtime.modified();
        }
    }

    pub fn array_name(&self) -> &str {
        &self.array_name
    }

    pub fn set_array_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        if self.array_name != name {
            self.array_name = name;
            self.mtime.modified();
        }
    }

    pub fn set_time_steps(&mut self, steps: Vec<f64>) {
        self.time_steps = steps;
        self.mtime.modified();
    }

    /// How many times the data handler has run.
    pub fn executions(&self) -> usize {
        self.executions
    }

    fn whole_extent(&self) -> Extent {
        if self.number_of_points == 0 {
            Extent::EMPTY
        } else {
            Extent::new(0, self.number_of_points as i64 - 1, 0, 0, 0, 0)
        }
    }

    /// Point index range of one piece.
    fn piece_range(&self, request: &PieceRequest) -> std::ops::Range<usize> {
        let pieces = request.pieces.max(1) as usize;
        let piece = request.piece.clamp(0, pieces as i64 - 1) as usize;
        let start = self.number_of_points * piece / pieces;
        let end = self.number_of_points * (piece + 1) / pieces;
        start..end
    }

    /// Snap a requested time onto the published steps.
    fn time_for(&self, requested: Option<f64>) -> Option<f64> {
        let requested = requested?;
        if self.time_steps.is_empty() {
            return Some(requested);
        }
        self.time_steps
            .iter()
            .copied()
            .filter(|&t| t <= requested)
            .last()
            .or_else(|| self.time_steps.first().copied())
    }
}

impl Algorithm for DataSetSource {
    fn name(&self) -> &str {
        "DataSetSource"
    }

    fn number_of_input_ports(&self) -> usize {
        0
    }

    fn number_of_output_ports(&self) -> usize {
        1
    }

    fn fill_output_port_information(&self, _port: usize, info: &mut Information) -> PipelineResult<()> {
        if self.kind.is_abstract() || self.kind.is_composite() {
            return Err(PipelineError::Configuration {
                node: self.name().to_string(),
                message: format!("cannot generate {}", self.kind),
            });
        }
        OutputPortSpec::new("output")
            .produces(self.kind)
            .handles_pieces()
            .fill(info);
        Ok(())
    }

    fn mtime(&self) -> TimeStamp {
        self.mtime
    }

    fn request_information(
        &mut self,
        _ctx: &RequestContext<'_>,
        _request: &mut Information,
        _inputs: &InputInformation,
        outputs: &[InformationRef],
    ) -> PipelineResult<()> {
        let mut out = outputs[0].borrow_mut();
        if self.kind.extent_type() == ExtentType::ThreeD {
            out.set(&keys::WHOLE_EXTENT, self.whole_extent());
        }
        match (self.time_steps.first(), self.time_steps.last()) {
            (Some(&first), Some(&last)) => {
                out.set(&keys::TIME_STEPS, self.time_steps.clone());
                out.set(&keys::TIME_RANGE, vec![first, last]);
            }
            _ => {
                out.remove(&keys::TIME_STEPS);
                out.remove(&keys::TIME_RANGE);
            }
        }
        Ok(())
    }

    fn request_data(
        &mut self,
        ctx: &RequestContext<'_>,
        _request: &mut Information,
        _inputs: &InputInformation,
        outputs: &[InformationRef],
    ) -> PipelineResult<()> {
        let (request, update_extent, update_time) = {
            let out = outputs[0].borrow();
            (
                PieceRequest::from_information(&out),
                out.get_copied(&keys::UPDATE_EXTENT),
                out.get_copied(&keys::UPDATE_TIME_STEP),
            )
        };
        let output = output_data(outputs, 0).ok_or_else(|| ctx.fail("no output data object"))?;
        let mut output = output.borrow_mut();
        let data = output
            .as_any_mut()
            .downcast_mut::<DataSet>()
            .ok_or_else(|| ctx.fail("output is not a DataSet"))?;

        let time = self.time_for(update_time);
        let offset = time.unwrap_or(0.0);
        let points = if self.kind.extent_type() == ExtentType::ThreeD {
            let extent = update_extent
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| self.whole_extent());
            data.set_extent(extent);
            if extent.is_empty() {
                0..0
            } else {
                extent.0[0] as usize..extent.0[1] as usize + 1
            }
        } else {
            let range = self.piece_range(&request);
            data.set_number_of_points(range.len());
            range
        };

        let values = points.map(|i| i as f64 + offset).collect();
        let point_data = data.point_data_mut();
        point_data.add_array(DataArray::scalars(self.array_name.clone(), values));
        point_data.set_active_attribute(AttributeRole::Scalars, &self.array_name);
        if let Some(time) = time {
            data.core_mut()
                .information_mut()
                .set(&keys::DATA_TIME_STEP, time);
        }

        self.executions += 1;
        tracing::debug!(
            "DataSetSource generated {} points of {} (piece {}/{})",
            data.number_of_points(),
            self.kind,
            request.piece,
            request.pieces
        );
        Ok(())
    }
}
