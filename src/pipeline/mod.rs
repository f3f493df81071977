//! Demand-driven pipeline execution.
//!
//! Algorithms are wrapped in executives; consumers hold their producers and
//! pull. Nothing runs until someone calls `update` on a downstream node.
//!
//! # Architecture
//!
//! ```text
//! [DataSetSource] ──► [PassThrough] ──► [AppendArrays]
//!        │                                   ▲
//!        └───────────────────────────────────┘
//! ```
//!
//! # Design
//!
//! - **Single threaded**: executives share state through `Rc`/`RefCell`;
//!   data objects point back at their producer through a `Weak`.
//! - **Stamp gated**: each phase compares its own stamp with the pipeline
//!   modification time and skips when current.
//! - **Reentrancy guarded**: a handler calling back into its own executive
//!   gets `PipelineError::Reentrancy` instead of a borrow panic.

pub mod algorithm;
pub mod error;
pub mod executive;
pub mod graph;
pub mod id;
pub mod nodes;
pub mod port;
pub mod streaming;
pub mod validation;

pub use algorithm::{input_data, output_data, Algorithm, AsAny, InputInformation, RequestContext};
pub use error::{PipelineError, PipelineResult};
pub use executive::{Connection, Executive, Phase};
pub use graph::{Edge, Pipeline};
pub use id::{EdgeId, NodeId};
pub use port::{InputPortSpec, OutputPortSpec, PortDirection};
pub use streaming::PieceRequest;
