//! Port descriptors for algorithms.
//!
//! Each algorithm declares its ports via `InputPortSpec` / `OutputPortSpec`
//! values. The executive turns them into port information, which is what the
//! validator actually reads.

use crate::data::{DataKind, FieldRequirement};
use crate::information::{keys, Information};

/// Whether a port is an input or output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortDirection {
    Input,
    Output,
}

/// Contract of one input port.
#[derive(Debug, Clone)]
pub struct InputPortSpec {
    pub name: &'static str,
    pub required_kinds: Vec<DataKind>,
    pub optional: bool,
    pub repeatable: bool,
    pub required_fields: Vec<FieldRequirement>,
}

impl InputPortSpec {
    /// A required, single-connection port accepting any data object.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            required_kinds: Vec::new(),
            optional: false,
            repeatable: false,
            required_fields: Vec::new(),
        }
    }

    pub fn accepts(mut self, kind: DataKind) -> Self {
        self.required_kinds.push(kind);
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn repeatable(mut self) -> Self {
        self.repeatable = true;
        self
    }

    pub fn requires_field(mut self, requirement: FieldRequirement) -> Self {
        self.required_fields.push(requirement);
        self
    }

    pub fn direction(&self) -> PortDirection {
        PortDirection::Input
    }

    /// Write this contract into port information. Unset capabilities are
    /// left absent rather than stored as `false`.
    pub fn fill(&self, info: &mut Information) {
        if !self.required_kinds.is_empty() {
            info.set(&keys::INPUT_REQUIRED_DATA_TYPE, self.required_kinds.clone());
        }
        if self.optional {
            info.set(&keys::INPUT_IS_OPTIONAL, true);
        }
        if self.repeatable {
            info.set(&keys::INPUT_IS_REPEATABLE, true);
        }
        if !self.required_fields.is_empty() {
            info.set(&keys::INPUT_REQUIRED_FIELDS, self.required_fields.clone());
        }
    }
}

/// Contract of one output port.
#[derive(Debug, Clone)]
pub struct OutputPortSpec {
    pub name: &'static str,
    pub kind: Option<DataKind>,
    pub can_handle_piece_request: bool,
}

impl OutputPortSpec {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            kind: None,
            can_handle_piece_request: false,
        }
    }

    /// Declare the concrete kind the executive should instantiate.
    pub const fn produces(mut self, kind: DataKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub const fn handles_pieces(mut self) -> Self {
        self.can_handle_piece_request = true;
        self
    }

    pub fn direction(&self) -> PortDirection {
        PortDirection::Output
    }

    pub fn fill(&self, info: &mut Information) {
        if let Some(kind) = self.kind {
            info.set(&keys::DATA_TYPE_NAME, kind);
        }
        if self.can_handle_piece_request {
            info.set(&keys::CAN_HANDLE_PIECE_REQUEST, true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::FieldAssociation;

    #[test]
    fn test_input_spec_fills_only_declared_keys() {
        let mut info = Information::new();
        InputPortSpec::new("input").fill(&mut info);
        assert!(info.is_empty());

        InputPortSpec::new("input")
            .accepts(DataKind::DataSet)
            .repeatable()
            .requires_field(FieldRequirement::named("Temp").on(FieldAssociation::Points))
            .fill(&mut info);
        assert_eq!(info.required_kinds(), Some(&[DataKind::DataSet][..]));
        assert_eq!(info.get_copied(&keys::INPUT_IS_REPEATABLE), Some(true));
        assert!(!info.has(&keys::INPUT_IS_OPTIONAL));
        assert_eq!(info.required_fields().map(<[_]>::len), Some(1));
    }

    #[test]
    fn test_output_spec() {
        let mut info = Information::new();
        OutputPortSpec::new("output")
            .produces(DataKind::PolyData)
            .handles_pieces()
            .fill(&mut info);
        assert_eq!(info.get_copied(&keys::DATA_TYPE_NAME), Some(DataKind::PolyData));
        assert_eq!(info.get_copied(&keys::CAN_HANDLE_PIECE_REQUEST), Some(true));
    }
}
