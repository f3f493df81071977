//! PassThrough: forwards its input unchanged.
//!
//! The output is a data object of the input's concrete kind sharing the
//! input's arrays.

use crate::data::{DataKind, DataObject};
use crate::information::{keys, Information, InformationRef};
use crate::pipeline::algorithm::{input_data, output_data, Algorithm, InputInformation, RequestContext};
use crate::pipeline::error::PipelineResult;
use crate::pipeline::port::InputPortSpec;

#[derive(Debug, Default)]
pub struct PassThrough {
    executions: usize,
}

impl PassThrough {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn executions(&self) -> usize {
        self.executions
    }
}

impl Algorithm for PassThrough {
    fn name(&self) -> &str {
        "PassThrough"
    }

    fn number_of_input_ports(&self) -> usize {
        1
    }

    fn number_of_output_ports(&self) -> usize {
        1
    }

    fn fill_input_port_information(&self, _port: usize, info: &mut Information) -> PipelineResult<()> {
        InputPortSpec::new("input").accepts(DataKind::DataObject).fill(info);
        Ok(())
    }

    /// Mirror the input's concrete kind on the output.
    fn request_data_object(
        &mut self,
        ctx: &RequestContext<'_>,
        _request: &mut Information,
        inputs: &InputInformation,
        outputs: &[InformationRef],
    ) -> PipelineResult<()> {
        let input = input_data(inputs, 0, 0).ok_or_else(|| ctx.fail("no input data object"))?;
        let input = input.borrow();
        let reuse = output_data(outputs, 0).is_some_and(|out| out.borrow().kind() == input.kind());
        if !reuse {
            outputs[0]
                .borrow_mut()
                .set(&keys::DATA_OBJECT, input.new_instance());
        }
        Ok(())
    }

    fn request_data(
        &mut self,
        ctx: &RequestContext<'_>,
        _request: &mut Information,
        inputs: &InputInformation,
        outputs: &[InformationRef],
    ) -> PipelineResult<()> {
        let input = input_data(inputs, 0, 0).ok_or_else(|| ctx.fail("no input data object"))?;
        let output = output_data(outputs, 0).ok_or_else(|| ctx.fail("no output data object"))?;
        output.borrow_mut().shallow_copy(&*input.borrow());
        self.executions += 1;
        Ok(())
    }
}
