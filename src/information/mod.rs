//! Information objects: typed key → value maps.
//!
//! Used for three things in the pipeline:
//! - per-port capability declarations filled by algorithms,
//! - per-output pipeline information shared between a producer and its
//!   consumers (data object handle, extents, pieces, time),
//! - transient request objects built by the executive for each phase.

pub mod key;
pub mod keys;

pub use key::{InfoType, InformationKey, KeyId, Request};

use crate::data::{DataKind, DataObjectRef, Extent, FieldRequirement};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Shared handle to an information object. Producers and consumers of a
/// connection hold the same output information through this.
pub type InformationRef = Rc<RefCell<Information>>;

/// Every value kind an information slot can hold.
#[derive(Debug, Clone)]
pub enum InfoValue {
    Bool(bool),
    Integer(i64),
    IntegerVector(Vec<i64>),
    Double(f64),
    DoubleVector(Vec<f64>),
    String(String),
    StringVector(Vec<String>),
    Request,
    Extent(Extent),
    Kind(DataKind),
    Kinds(Vec<DataKind>),
    DataObject(DataObjectRef),
    Fields(Vec<FieldRequirement>),
    InformationVector(Vec<Information>),
}

/// Typed key → value map. Absence of a key is distinct from a stored zero.
#[derive(Debug, Clone, Default)]
pub struct Information {
    entries: BTreeMap<KeyId, InfoValue>,
}

impl Information {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap into a shared handle.
    pub fn into_ref(self) -> InformationRef {
        Rc::new(RefCell::new(self))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn set<T: InfoType>(&mut self, key: &InformationKey<T>, value: T) {
        self.entries.insert(key.id(), value.into_value());
    }

    /// Set a request marker key.
    pub fn set_request(&mut self, key: &InformationKey<Request>) {
        self.set(key, Request);
    }

    pub fn get<T: InfoType>(&self, key: &InformationKey<T>) -> Option<&T> {
        self.entries.get(&key.id()).and_then(T::from_value)
    }

    /// Copy out a `Copy` value.
    #[inline]
    pub fn get_copied<T: InfoType + Copy>(&self, key: &InformationKey<T>) -> Option<T> {
        self.get(key).copied()
    }

    /// Copy out a `Copy` value, falling back to `default` when absent.
    #[inline]
    pub fn get_or<T: InfoType + Copy>(&self, key: &InformationKey<T>, default: T) -> T {
        self.get_copied(key).unwrap_or(default)
    }

    pub fn has<T: InfoType>(&self, key: &InformationKey<T>) -> bool {
        self.get(key).is_some()
    }

    /// Remove a key. Returns whether it was present.
    pub fn remove<T: InfoType>(&mut self, key: &InformationKey<T>) -> bool {
        self.entries.remove(&key.id()).is_some()
    }

    /// Make `self[key]` mirror `from[key]`, removing it when `from` lacks it.
    pub fn copy_entry<T: InfoType>(&mut self, from: &Information, key: &InformationKey<T>) {
        match from.entries.get(&key.id()) {
            Some(value) if T::from_value(value).is_some() => {
                self.entries.insert(key.id(), value.clone());
            }
            _ => {
                self.entries.remove(&key.id());
            }
        }
    }

    /// Copy every entry of `other` into `self`, overwriting duplicates.
    pub fn append(&mut self, other: &Information) {
        for (id, value) in &other.entries {
            self.entries.insert(*id, value.clone());
        }
    }

    /// Keys currently present, in a stable order.
    pub fn keys(&self) -> impl Iterator<Item = KeyId> + '_ {
        self.entries.keys().copied()
    }

    /// Convenience for the data object slot of pipeline information.
    pub fn data_object(&self) -> Option<DataObjectRef> {
        self.get(&keys::DATA_OBJECT).cloned()
    }

    pub fn required_kinds(&self) -> Option<&[DataKind]> {
        self.get(&keys::INPUT_REQUIRED_DATA_TYPE).map(Vec::as_slice)
    }

    pub fn required_fields(&self) -> Option<&[FieldRequirement]> {
        self.get(&keys::INPUT_REQUIRED_FIELDS).map(Vec::as_slice)
    }
}
