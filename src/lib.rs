//! # VisPipe-RS: demand-driven visualization pipelines
//!
//! A pipeline of processing nodes where nothing runs until a consumer asks
//! for data. Each node is an [`Algorithm`] wrapped in an [`Executive`]; a
//! pull on a downstream executive walks upstream through four phases and
//! re-executes only the nodes whose inputs or parameters changed.
//!
//! ## Architecture
//!
//! - **Information**: typed key/value maps carrying requests and metadata
//!   between executives
//! - **Data**: data objects (plain data sets and composite trees) flowing
//!   along connections
//! - **Pipeline**: executives, ports, streaming requests and the registry
//!
//! ## Example
//!
//! ```ignore
//! use vispipe_rs::{
//!     config::ExecutiveConfig,
//!     data::DataKind,
//!     pipeline::{nodes::{DataSetSource, PassThrough}, Pipeline},
//! };
//!
//! let mut pipeline = Pipeline::new(ExecutiveConfig::default());
//! let source = pipeline.add_node(DataSetSource::new(DataKind::PolyData, 100))?;
//! let filter = pipeline.add_node(PassThrough::new())?;
//! pipeline.connect(source, 0, filter, 0)?;
//!
//! // First update executes both nodes, the second executes nothing.
//! pipeline.update(filter)?;
//! pipeline.update(filter)?;
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod information;
pub mod pipeline;
pub mod time_stamp;

// Re-export commonly used types
pub use config::{ExecutiveConfig, PipelineConfig};
pub use data::{CompositeDataIterator, CompositeDataSet, DataKind, DataObject, DataObjectRef, DataSet};
pub use error::{Result, ResultExt, VisPipeError};
pub use information::{keys, Information, InformationKey, InformationRef};
pub use pipeline::{Algorithm, Executive, Pipeline, PipelineError, PipelineResult};
pub use time_stamp::TimeStamp;
