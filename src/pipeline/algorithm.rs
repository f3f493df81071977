//! The contract between a processing node and its executive.
//!
//! An algorithm declares its ports, fills their capability information once
//! at construction, and answers the four phase requests. It never decides
//! *when* it runs; that is the executive's job.

use crate::data::DataObjectRef;
use crate::information::{keys, Information, InformationRef};
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::executive::Executive;
use crate::time_stamp::TimeStamp;
use std::any::Any;
use std::rc::Rc;

/// Per input port, the output information of every connected producer.
pub type InputInformation = [Vec<InformationRef>];

/// Upcast helper so executives can hand out typed access to their algorithm.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// What a handler can see of the executive driving it.
pub struct RequestContext<'a> {
    executive: &'a Executive,
}

impl<'a> RequestContext<'a> {
    pub(crate) fn new(executive: &'a Executive) -> Self {
        Self { executive }
    }

    pub fn executive(&self) -> &'a Executive {
        self.executive
    }

    /// Strong handle to the executive, for handlers that need to call back
    /// into the pipeline.
    pub fn executive_rc(&self) -> Option<Rc<Executive>> {
        self.executive.rc()
    }

    pub fn node(&self) -> &'a str {
        self.executive.name()
    }

    /// Build a handler failure attributed to this node.
    pub fn fail(&self, message: impl Into<String>) -> PipelineError {
        PipelineError::Node {
            node: self.node().to_string(),
            message: message.into(),
        }
    }
}

/// A processing node.
///
/// Only `request_data` is mandatory. The default `process_request` routes a
/// request to the handler for whichever phase key it carries.
pub trait Algorithm: AsAny {
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
            .rsplit("::")
            .next()
            .unwrap_or("algorithm")
    }

    fn number_of_input_ports(&self) -> usize;

    fn number_of_output_ports(&self) -> usize;

    /// Declare the contract of input `port`. Called once per port.
    fn fill_input_port_information(
        &self,
        _port: usize,
        _info: &mut Information,
    ) -> PipelineResult<()> {
        Ok(())
    }

    /// Declare what output `port` produces. Called once per port.
    fn fill_output_port_information(
        &self,
        _port: usize,
        _info: &mut Information,
    ) -> PipelineResult<()> {
        Ok(())
    }

    /// Last time a parameter of this node changed.
    fn mtime(&self) -> TimeStamp {
        TimeStamp::ZERO
    }

    fn process_request(
        &mut self,
        ctx: &RequestContext<'_>,
        request: &mut Information,
        inputs: &InputInformation,
        outputs: &[InformationRef],
    ) -> PipelineResult<()> {
        if request.has(&keys::REQUEST_DATA_OBJECT) {
            self.request_data_object(ctx, request, inputs, outputs)
        } else if request.has(&keys::REQUEST_INFORMATION) {
            self.request_information(ctx, request, inputs, outputs)
        } else if request.has(&keys::REQUEST_UPDATE_EXTENT) {
            self.request_update_extent(ctx, request, inputs, outputs)
        } else if request.has(&keys::REQUEST_DATA) {
            self.request_data(ctx, request, inputs, outputs)
        } else {
            Err(PipelineError::InvalidRequest(format!(
                "request to '{}' carries no phase key",
                ctx.node()
            )))
        }
    }

    /// Create output data objects the executive cannot infer from
    /// `DATA_TYPE_NAME`.
    fn request_data_object(
        &mut self,
        _ctx: &RequestContext<'_>,
        _request: &mut Information,
        _inputs: &InputInformation,
        _outputs: &[InformationRef],
    ) -> PipelineResult<()> {
        Ok(())
    }

    /// Publish metadata (whole extent, time steps) on the outputs.
    fn request_information(
        &mut self,
        _ctx: &RequestContext<'_>,
        _request: &mut Information,
        _inputs: &InputInformation,
        _outputs: &[InformationRef],
    ) -> PipelineResult<()> {
        Ok(())
    }

    /// Adjust what is asked of the inputs after the default copy.
    fn request_update_extent(
        &mut self,
        _ctx: &RequestContext<'_>,
        _request: &mut Information,
        _inputs: &InputInformation,
        _outputs: &[InformationRef],
    ) -> PipelineResult<()> {
        Ok(())
    }

    fn request_data(
        &mut self,
        ctx: &RequestContext<'_>,
        request: &mut Information,
        inputs: &InputInformation,
        outputs: &[InformationRef],
    ) -> PipelineResult<()>;
}

/// Data object on connection `connection` of input `port`, if any.
pub fn input_data(
    inputs: &InputInformation,
    port: usize,
    connection: usize,
) -> Option<DataObjectRef> {
    inputs
        .get(port)?
        .get(connection)?
        .borrow()
        .data_object()
}

/// Data object installed on output `port`, if any.
pub fn output_data(outputs: &[InformationRef], port: usize) -> Option<DataObjectRef> {
    outputs.get(port)?.borrow().data_object()
}
