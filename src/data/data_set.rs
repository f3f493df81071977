//! Concrete leaf data object used for every non-composite kind.
//!
//! Geometry is reduced to point and cell counts; the interesting payload is
//! the attribute collections, which input field requirements search.

use crate::data::field::{FieldAssociation, FieldData};
use crate::data::kind::DataKind;
use crate::data::object::{DataObject, DataObjectCore, DataObjectRef};
use crate::data::Extent;
use crate::information::keys;
use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug)]
pub struct DataSet {
    kind: DataKind,
    core: DataObjectCore,
    number_of_points: usize,
    number_of_cells: usize,
    point_data: FieldData,
    cell_data: FieldData,
    vertex_data: FieldData,
    edge_data: FieldData,
    row_data: FieldData,
}

impl DataSet {
    pub fn new(kind: DataKind) -> Self {
        debug_assert!(
            !kind.is_composite() && !kind.is_abstract(),
            "DataSet cannot represent {kind}"
        );
        Self {
            kind,
            core: DataObjectCore::new(),
            number_of_points: 0,
            number_of_cells: 0,
            point_data: FieldData::new(),
            cell_data: FieldData::new(),
            vertex_data: FieldData::new(),
            edge_data: FieldData::new(),
            row_data: FieldData::new(),
        }
    }

    pub fn into_ref(self) -> DataObjectRef {
        Rc::new(RefCell::new(self))
    }

    pub fn number_of_points(&self) -> usize {
        self.number_of_points
    }

    pub fn set_number_of_points(&mut self, n: usize) {
        self.number_of_points = n;
        self.core.modified();
    }

    pub fn number_of_cells(&self) -> usize {
        self.number_of_cells
    }

    pub fn set_number_of_cells(&mut self, n: usize) {
        self.number_of_cells = n;
        self.core.modified();
    }

    /// Record the structured extent this object covers.
    pub fn set_extent(&mut self, extent: Extent) {
        self.core.information_mut().set(&keys::DATA_EXTENT, extent);
        self.number_of_points = extent.number_of_points() as usize;
        self.core.modified();
    }

    pub fn point_data(&self) -> &FieldData {
        &self.point_data
    }

    pub fn point_data_mut(&mut self) -> &mut FieldData {
        &mut self.point_data
    }

    pub fn cell_data(&self) -> &FieldData {
        &self.cell_data
    }

    pub fn cell_data_mut(&mut self) -> &mut FieldData {
        &mut self.cell_data
    }

    /// Mutable attribute collection for an association valid for this kind.
    pub fn attributes_mut(&mut self, association: FieldAssociation) -> Option<&mut FieldData> {
        if !self.has_association(association) {
            return None;
        }
        Some(match association {
            FieldAssociation::Points => &mut self.point_data,
            FieldAssociation::Cells => &mut self.cell_data,
            FieldAssociation::Vertices => &mut self.vertex_data,
            FieldAssociation::Edges => &mut self.edge_data,
            FieldAssociation::Rows => &mut self.row_data,
            FieldAssociation::Field => self.core.field_data_mut(),
        })
    }

    fn has_association(&self, association: FieldAssociation) -> bool {
        match association {
            FieldAssociation::Points | FieldAssociation::Cells => {
                self.kind.is_a(DataKind::DataSet)
            }
            FieldAssociation::Vertices | FieldAssociation::Edges => self.kind == DataKind::Graph,
            FieldAssociation::Rows => self.kind == DataKind::Table,
            FieldAssociation::Field => true,
        }
    }

    fn copy_attributes(&mut self, src: &DataSet, deep: bool) {
        let pairs = [
            (&mut self.point_data, &src.point_data),
            (&mut self.cell_data, &src.cell_data),
            (&mut self.vertex_data, &src.vertex_data),
            (&mut self.edge_data, &src.edge_data),
            (&mut self.row_data, &src.row_data),
        ];
        for (dst, from) in pairs {
            if deep {
                dst.deep_copy(from);
            } else {
                dst.shallow_copy(from);
            }
        }
        self.number_of_points = src.number_of_points;
        self.number_of_cells = src.number_of_cells;
    }
}

impl DataObject for DataSet {
    fn kind(&self) -> DataKind {
        self.kind
    }

    fn core(&self) -> &DataObjectCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut DataObjectCore {
        &mut self.core
    }

    fn new_instance(&self) -> DataObjectRef {
        DataSet::new(self.kind).into_ref()
    }

    fn clear_payload(&mut self) {
        self.number_of_points = 0;
        self.number_of_cells = 0;
        self.point_data.clear();
        self.cell_data.clear();
        self.vertex_data.clear();
        self.edge_data.clear();
        self.row_data.clear();
    }

    fn shallow_copy(&mut self, src: &dyn DataObject) {
        if let Some(ds) = src.as_any().downcast_ref::<DataSet>() {
            self.copy_attributes(ds, false);
        }
        self.core.shallow_copy_from(src.core());
    }

    fn deep_copy(&mut self, src: &dyn DataObject) {
        if let Some(ds) = src.as_any().downcast_ref::<DataSet>() {
            self.copy_attributes(ds, true);
        }
        self.core.deep_copy_from(src.core());
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn attributes(&self, association: FieldAssociation) -> Option<&FieldData> {
        if !self.has_association(association) {
            return None;
        }
        Some(match association {
            FieldAssociation::Points => &self.point_data,
            FieldAssociation::Cells => &self.cell_data,
            FieldAssociation::Vertices => &self.vertex_data,
            FieldAssociation::Edges => &self.edge_data,
            FieldAssociation::Rows => &self.row_data,
            FieldAssociation::Field => self.core.field_data(),
        })
    }
}
