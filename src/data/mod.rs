//! Data objects flowing between pipeline ports.

pub mod composite;
pub mod data_set;
pub mod extent;
pub mod field;
pub mod kind;
pub mod object;

pub use composite::{
    CompositeDataIterator, CompositeDataSet, CompositeError, CompositeIndex, CompositeItem,
    CompositeResult,
};
pub use data_set::DataSet;
pub use extent::Extent;
pub use field::{
    ArrayValues, AttributeRole, DataArray, ElementType, FieldAssociation, FieldData,
    FieldRequirement,
};
pub use kind::{DataKind, ExtentType};
pub use object::{new_data_object, DataObject, DataObjectCore, DataObjectRef, ProducerLink};
