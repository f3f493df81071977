//! GroupDataSets: collects every input into one multi-block output.
//!
//! Block `i` is a shallow copy of connection `i`, named after the node that
//! produced it.

use crate::data::{CompositeDataSet, DataKind, DataObject};
use crate::information::{keys, Information, InformationRef};
use crate::pipeline::algorithm::{input_data, output_data, Algorithm, InputInformation, RequestContext};
use crate::pipeline::error::PipelineResult;
use crate::pipeline::port::{InputPortSpec, OutputPortSpec};

#[derive(Debug, Default)]
pub struct GroupDataSets {
    executions: usize,
}

impl GroupDataSets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn executions(&self) -> usize {
        self.executions
    }
}

impl Algorithm for GroupDataSets {
    fn name(&self) -> &str {
        "GroupDataSets"
    }

    fn number_of_input_ports(&self) -> usize {
        1
    }

    fn number_of_output_ports(&self) -> usize {
        1
    }

    fn fill_input_port_information(&self, _port: usize, info: &mut Information) -> PipelineResult<()> {
        InputPortSpec::new("input")
            .accepts(DataKind::DataObject)
            .optional()
            .repeatable()
            .fill(info);
        Ok(())
    }

    fn fill_output_port_information(&self, _port: usize, info: &mut Information) -> PipelineResult<()> {
        OutputPortSpec::new("output")
            .produces(DataKind::MultiBlockDataSet)
            .fill(info);
        Ok(())
    }

    fn request_data(
        &mut self,
        ctx: &RequestContext<'_>,
        _request: &mut Information,
        inputs: &InputInformation,
        outputs: &[InformationRef],
    ) -> PipelineResult<()> {
        let output = output_data(outputs, 0).ok_or_else(|| ctx.fail("no output data object"))?;
        let mut output = output.borrow_mut();
        let group = output
            .as_composite_mut()
            .ok_or_else(|| ctx.fail("output is not composite"))?;

        let connections = inputs.first().map_or(0, Vec::len);
        group.set_number_of_children(connections);
        for index in 0..connections {
            let Some(input) = input_data(inputs, 0, index) else {
                continue;
            };
            let input = input.borrow();
            let block = input.new_instance();
            block.borrow_mut().shallow_copy(&*input);

            let name = input
                .core()
                .producer()
                .and_then(|link| link.executive())
                .map_or_else(|| format!("block{index}"), |exec| exec.name().to_string());
            let mut meta = Information::new();
            meta.set(&keys::NAME, name);

            group.set_child(index, Some(block));
            group.set_child_meta_data(index, meta.into_ref());
        }

        self.executions += 1;
        tracing::debug!(
            "GroupDataSets built {} blocks ({} leaves)",
            group.number_of_children(),
            group.number_of_leaves()
        );
        Ok(())
    }
}

impl GroupDataSets {
    /// Names recorded on each block of a grouped output.
    pub fn block_names(group: &CompositeDataSet) -> Vec<Option<String>> {
        (0..group.number_of_children())
            .map(|i| {
                if !group.has_child_meta_data(i) {
                    return None;
                }
                group
                    .child_meta_data(i)
                    .and_then(|meta| meta.borrow().get(&keys::NAME).cloned())
            })
            .collect()
    }
}
