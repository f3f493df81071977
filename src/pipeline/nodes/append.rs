//! AppendArrays: concatenates one named point array across every input.
//!
//! The input port is repeatable and each connection must carry the array on
//! its points, so validation rejects inputs missing it before the handler
//! runs.

use crate::data::{ArrayValues, DataArray, DataKind, DataSet, FieldAssociation, FieldRequirement};
use crate::information::{Information, InformationRef};
use crate::pipeline::algorithm::{input_data, output_data, Algorithm, InputInformation, RequestContext};
use crate::pipeline::error::PipelineResult;
use crate::pipeline::port::{InputPortSpec, OutputPortSpec};
use crate::time_stamp::TimeStamp;

pub struct AppendArrays {
    array_name: String,
    mtime: TimeStamp,
    executions: usize,
}

impl AppendArrays {
    pub fn new(array_name: impl Into<String>) -> Self {
        Self {
            array_name: array_name.into(),
            mtime: TimeStamp::now(),
            executions: 0,
        }
    }

    pub fn array_name(&self) -> &str {
        &self.array_name
    }

    pub fn executions(&self) -> usize {
        self.executions
    }
}

fn to_f64(values: &ArrayValues) -> Vec<f64> {
    match values {
        ArrayValues::U8(v) => v.iter().map(|&x| f64::from(x)).collect(),
        ArrayValues::I32(v) => v.iter().map(|&x| f64::from(x)).collect(),
        ArrayValues::I64(v) => v.iter().map(|&x| x as f64).collect(),
        ArrayValues::F32(v) => v.iter().map(|&x| f64::from(x)).collect(),
        ArrayValues::F64(v) => v.clone(),
    }
}

impl Algorithm for AppendArrays {
    fn name(&self) -> &str {
        "AppendArrays"
    }

    fn number_of_input_ports(&self) -> usize {
        1
    }

    fn number_of_output_ports(&self) -> usize {
        1
    }

    fn fill_input_port_information(&self, _port: usize, info: &mut Information) -> PipelineResult<()> {
        InputPortSpec::new("input")
            .accepts(DataKind::DataSet)
            .repeatable()
            .requires_field(
                FieldRequirement::named(self.array_name.clone()).on(FieldAssociation::Points),
            )
            .fill(info);
        Ok(())
    }

    fn fill_output_port_information(&self, _port: usize, info: &mut Information) -> PipelineResult<()> {
        OutputPortSpec::new("output").produces(DataKind::PolyData).fill(info);
        Ok(())
    }

    fn mtime(&self) -> TimeStamp {
        self.mtime
    }

    fn request_data(
        &mut self,
        ctx: &RequestContext<'_>,
        _request: &mut Information,
        inputs: &InputInformation,
        outputs: &[InformationRef],
    ) -> PipelineResult<()> {
        let mut values = Vec::new();
        let mut components = 1;
        for connection in 0..inputs.first().map_or(0, Vec::len) {
            let input = input_data(inputs, 0, connection)
                .ok_or_else(|| ctx.fail(format!("input {connection} has no data object")))?;
            let input = input.borrow();
            let array = input
                .attributes(FieldAssociation::Points)
                .and_then(|points| points.array(&self.array_name))
                .ok_or_else(|| ctx.fail(format!("input {connection} lost '{}'", self.array_name)))?;
            components = array.number_of_components();
            values.extend(to_f64(array.values()));
        }

        let output = output_data(outputs, 0).ok_or_else(|| ctx.fail("no output data object"))?;
        let mut output = output.borrow_mut();
        let data = output
            .as_any_mut()
            .downcast_mut::<DataSet>()
            .ok_or_else(|| ctx.fail("output is not a DataSet"))?;
        data.set_number_of_points(values.len() / components);
        data.point_data_mut().add_array(DataArray::new(
            self.array_name.clone(),
            components,
            ArrayValues::F64(values),
        ));
        self.executions += 1;
        tracing::debug!(
            "AppendArrays joined '{}' from {} inputs into {} points",
            self.array_name,
            inputs.first().map_or(0, Vec::len),
            data.number_of_points()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_f64_widens_every_element_type() {
        assert_eq!(to_f64(&ArrayValues::I32(vec![1, -2])), vec![1.0, -2.0]);
        assert_eq!(to_f64(&ArrayValues::U8(vec![7])), vec![7.0]);
        assert_eq!(to_f64(&ArrayValues::F32(vec![0.5])), vec![0.5]);
    }

    #[test]
    fn test_declares_point_field_requirement() {
        let node = AppendArrays::new("Temp");
        let mut info = Information::new();
        node.fill_input_port_information(0, &mut info).unwrap();
        let fields = info.required_fields().unwrap();
        assert_eq!(fields[0].name.as_deref(), Some("Temp"));
        assert_eq!(fields[0].association, Some(FieldAssociation::Points));
    }
}
