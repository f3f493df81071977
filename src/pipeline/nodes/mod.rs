//! Built-in pipeline node implementations.

pub mod append;
pub mod group;
pub mod pass_through;
pub mod source;

pub use append::AppendArrays;
pub use group::GroupDataSets;
pub use pass_through::PassThrough;
pub use source::DataSetSource;
