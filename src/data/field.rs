//! Attribute arrays, their collections, and port field requirements.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// Which collection of a data object an array belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldAssociation {
    Points,
    Cells,
    Vertices,
    Edges,
    Rows,
    /// The generic field data every data object carries.
    Field,
}

impl FieldAssociation {
    pub fn name(self) -> &'static str {
        match self {
            FieldAssociation::Points => "points",
            FieldAssociation::Cells => "cells",
            FieldAssociation::Vertices => "vertices",
            FieldAssociation::Edges => "edges",
            FieldAssociation::Rows => "rows",
            FieldAssociation::Field => "field",
        }
    }
}

/// Role an array plays inside an attribute collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AttributeRole {
    Scalars,
    Vectors,
    Normals,
    TCoords,
    Tensors,
    GlobalIds,
    PedigreeIds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    U8,
    I32,
    I64,
    F32,
    F64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArrayValues {
    U8(Vec<u8>),
    I32(Vec<i32>),
    I64(Vec<i64>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

impl ArrayValues {
    pub fn len(&self) -> usize {
        match self {
            ArrayValues::U8(v) => v.len(),
            ArrayValues::I32(v) => v.len(),
            ArrayValues::I64(v) => v.len(),
            ArrayValues::F32(v) => v.len(),
            ArrayValues::F64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn element_type(&self) -> ElementType {
        match self {
            ArrayValues::U8(_) => ElementType::U8,
            ArrayValues::I32(_) => ElementType::I32,
            ArrayValues::I64(_) => ElementType::I64,
            ArrayValues::F32(_) => ElementType::F32,
            ArrayValues::F64(_) => ElementType::F64,
        }
    }
}

/// A named, component-interleaved array.
#[derive(Debug, Clone, PartialEq)]
pub struct DataArray {
    name: String,
    components: usize,
    values: ArrayValues,
}

impl DataArray {
    pub fn new(name: impl Into<String>, components: usize, values: ArrayValues) -> Self {
        Self {
            name: name.into(),
            components: components.max(1),
            values,
        }
    }

    /// Single-component `f64` array.
    pub fn scalars(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self::new(name, 1, ArrayValues::F64(values))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn number_of_components(&self) -> usize {
        self.components
    }

    pub fn number_of_tuples(&self) -> usize {
        self.values.len() / self.components
    }

    pub fn element_type(&self) -> ElementType {
        self.values.element_type()
    }

    pub fn values(&self) -> &ArrayValues {
        &self.values
    }
}

/// Ordered collection of arrays with optional active attributes.
///
/// Arrays are reference counted so that shallow copies share storage.
#[derive(Debug, Clone, Default)]
pub struct FieldData {
    arrays: Vec<Rc<DataArray>>,
    active: BTreeMap<AttributeRole, usize>,
}

impl FieldData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.arrays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }

    /// Add an array, replacing any array with the same name. Returns its index.
    pub fn add_array(&mut self, array: DataArray) -> usize {
        self.add_shared(Rc::new(array))
    }

    pub fn add_shared(&mut self, array: Rc<DataArray>) -> usize {
        if let Some(idx) = self.index_of(array.name()) {
            self.arrays[idx] = array;
            idx
        } else {
            self.arrays.push(array);
            self.arrays.len() - 1
        }
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.arrays.iter().position(|a| a.name() == name)
    }

    pub fn array(&self, name: &str) -> Option<&Rc<DataArray>> {
        self.arrays.iter().find(|a| a.name() == name)
    }

    pub fn array_at(&self, index: usize) -> Option<&Rc<DataArray>> {
        self.arrays.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rc<DataArray>> {
        self.arrays.iter()
    }

    pub fn remove_array(&mut self, name: &str) -> Option<Rc<DataArray>> {
        let idx = self.index_of(name)?;
        let removed = self.arrays.remove(idx);
        self.active.retain(|_, slot| *slot != idx);
        for slot in self.active.values_mut() {
            if *slot > idx {
                *slot -= 1;
            }
        }
        Some(removed)
    }

    /// Mark the named array as the active `role` attribute.
    pub fn set_active_attribute(&mut self, role: AttributeRole, name: &str) -> bool {
        match self.index_of(name) {
            Some(idx) => {
                self.active.insert(role, idx);
                true
            }
            None => false,
        }
    }

    pub fn attribute(&self, role: AttributeRole) -> Option<&Rc<DataArray>> {
        self.active.get(&role).and_then(|&idx| self.arrays.get(idx))
    }

    pub fn clear(&mut self) {
        self.arrays.clear();
        self.active.clear();
    }

    /// Share every array of `other`.
    pub fn shallow_copy(&mut self, other: &FieldData) {
        self.clone_from(other);
    }

    /// Copy every array of `other` into fresh storage.
    pub fn deep_copy(&mut self, other: &FieldData) {
        self.arrays = other
            .arrays
            .iter()
            .map(|a| Rc::new(DataArray::clone(a)))
            .collect();
        self.active = other.active.clone();
    }
}

/// A port's description of an array its input must carry.
///
/// Every criterion left at `None` matches anything. An absent association
/// searches every collection of the input.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldRequirement {
    pub association: Option<FieldAssociation>,
    pub attribute: Option<AttributeRole>,
    pub name: Option<String>,
    pub element_type: Option<ElementType>,
    pub components: Option<usize>,
    pub tuples: Option<usize>,
}

impl FieldRequirement {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn on(mut self, association: FieldAssociation) -> Self {
        self.association = Some(association);
        self
    }

    pub fn with_attribute(mut self, role: AttributeRole) -> Self {
        self.attribute = Some(role);
        self
    }

    pub fn with_element_type(mut self, element_type: ElementType) -> Self {
        self.element_type = Some(element_type);
        self
    }

    pub fn with_components(mut self, components: usize) -> Self {
        self.components = Some(components);
        self
    }

    pub fn with_tuples(mut self, tuples: usize) -> Self {
        self.tuples = Some(tuples);
        self
    }

    pub fn matches_array(&self, array: &DataArray) -> bool {
        self.name.as_deref().map_or(true, |n| n == array.name())
            && self.element_type.map_or(true, |t| t == array.element_type())
            && self.components.map_or(true, |c| c == array.number_of_components())
            && self.tuples.map_or(true, |t| t == array.number_of_tuples())
    }

    /// Search one collection. With an attribute role only the active array
    /// for that role is considered.
    pub fn satisfied_by(&self, fields: &FieldData) -> bool {
        match self.attribute {
            Some(role) => fields
                .attribute(role)
                .is_some_and(|a| self.matches_array(a)),
            None => fields.iter().any(|a| self.matches_array(a)),
        }
    }
}

impl fmt::Display for FieldRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "association={}",
            self.association.map_or("any", FieldAssociation::name)
        )?;
        if let Some(role) = self.attribute {
            write!(f, " attribute={role:?}")?;
        }
        if let Some(name) = &self.name {
            write!(f, " name={name:?}")?;
        }
        if let Some(t) = self.element_type {
            write!(f, " type={t:?}")?;
        }
        if let Some(c) = self.components {
            write!(f, " components={c}")?;
        }
        if let Some(t) = self.tuples {
            write!(f, " tuples={t}")?;
        }
        Ok(())
    }
}
