//! Pipeline-specific error types.

use crate::pipeline::executive::Phase;
use crate::pipeline::id::{EdgeId, NodeId};
use thiserror::Error;

/// Errors raised while building or updating a pipeline.
///
/// Every variant names the node it concerns so that a failure deep in a
/// chain can be traced from the top-level `update` call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("Reentrant {attempted} request on '{node}' while its {active} handler is running")]
    Reentrancy {
        node: String,
        active: Phase,
        attempted: Phase,
    },

    #[error("Input port {port} of '{node}' requires a connection but has none")]
    InputRequired { node: String, port: usize },

    #[error("Input port {port} of '{node}' is not repeatable but has {connections} connections")]
    InputNotRepeatable {
        node: String,
        port: usize,
        connections: usize,
    },

    #[error(
        "Input {connection} on port {port} of '{node}' is {actual}, but one of [{expected}] is required"
    )]
    InputType {
        node: String,
        port: usize,
        connection: usize,
        expected: String,
        actual: String,
    },

    #[error(
        "Required field not found on input {connection} of port {port} of '{node}' \
         (searched {association}; requirement {requirement})"
    )]
    FieldNotFound {
        node: String,
        port: usize,
        connection: usize,
        association: String,
        requirement: String,
    },

    #[error("{operation} given output port {port} on '{node}' with {ports} output ports")]
    OutputPortRange {
        node: String,
        operation: &'static str,
        port: usize,
        ports: usize,
    },

    #[error("Input port {port} out of range on '{node}' with {ports} input ports")]
    InputPortRange {
        node: String,
        port: usize,
        ports: usize,
    },

    #[error("Connection {index} out of range on input port {port} of '{node}' with {connections} connections")]
    ConnectionRange {
        node: String,
        port: usize,
        index: usize,
        connections: usize,
    },

    #[error("Node '{node}' is broken: {message}")]
    NodeImplementation { node: String, message: String },

    #[error("Algorithm of '{node}' is borrowed by the caller during {phase}")]
    AlgorithmBorrowed { node: String, phase: &'static str },

    #[error("Configuration error on '{node}': {message}")]
    Configuration { node: String, message: String },

    #[error("Connecting '{producer}' into '{consumer}' would create a cycle")]
    Cycle { producer: String, consumer: String },

    #[error("Node '{node}' failed: {message}")]
    Node { node: String, message: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unknown node {0}")]
    UnknownNode(NodeId),

    #[error("Unknown edge {0:?}")]
    UnknownEdge(EdgeId),
}

impl PipelineError {
    /// Port-contract violations, as opposed to programming or node defects.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            PipelineError::InputRequired { .. }
                | PipelineError::InputNotRepeatable { .. }
                | PipelineError::InputType { .. }
                | PipelineError::FieldNotFound { .. }
        )
    }

    /// Input port named by a contract violation.
    pub fn port(&self) -> Option<usize> {
        match self {
            PipelineError::InputRequired { port, .. }
            | PipelineError::InputNotRepeatable { port, .. }
            | PipelineError::InputType { port, .. }
            | PipelineError::FieldNotFound { port, .. }
            | PipelineError::InputPortRange { port, .. }
            | PipelineError::ConnectionRange { port, .. } => Some(*port),
            _ => None,
        }
    }
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
