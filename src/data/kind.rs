//! Closed tag over the known data object kinds.
//!
//! Port type requirements are expressed as `DataKind`s and checked with
//! `is_a`, which walks the kind hierarchy:
//!
//! ```text
//! DataObject
//! +-- DataSet
//! |   +-- PointSet
//! |   |   +-- PolyData
//! |   |   +-- UnstructuredGrid
//! |   |   +-- StructuredGrid
//! |   +-- ImageData
//! |   +-- RectilinearGrid
//! +-- Table
//! +-- Graph
//! +-- CompositeDataSet
//!     +-- MultiBlockDataSet
//!     +-- MultiPieceDataSet
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataKind {
    DataObject,
    DataSet,
    PointSet,
    PolyData,
    UnstructuredGrid,
    StructuredGrid,
    ImageData,
    RectilinearGrid,
    Table,
    Graph,
    CompositeDataSet,
    MultiBlockDataSet,
    MultiPieceDataSet,
}

/// How a kind describes the portion of the whole it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtentType {
    /// Unstructured data split into numbered pieces.
    Pieces,
    /// Structured data addressed by an `[i, j, k]` index box.
    ThreeD,
}

impl DataKind {
    pub const ALL: [DataKind; 13] = [
        DataKind::DataObject,
        DataKind::DataSet,
        DataKind::PointSet,
        DataKind::PolyData,
        DataKind::UnstructuredGrid,
        DataKind::StructuredGrid,
        DataKind::ImageData,
        DataKind::RectilinearGrid,
        DataKind::Table,
        DataKind::Graph,
        DataKind::CompositeDataSet,
        DataKind::MultiBlockDataSet,
        DataKind::MultiPieceDataSet,
    ];

    pub fn parent(self) -> Option<DataKind> {
        use DataKind::*;
        match self {
            DataObject => None,
            DataSet | Table | Graph | CompositeDataSet => Some(DataObject),
            PointSet | ImageData | RectilinearGrid => Some(DataSet),
            PolyData | UnstructuredGrid | StructuredGrid => Some(PointSet),
            MultiBlockDataSet | MultiPieceDataSet => Some(CompositeDataSet),
        }
    }

    /// Whether `self` is `other` or derives from it.
    pub fn is_a(self, other: DataKind) -> bool {
        let mut kind = Some(self);
        while let Some(k) = kind {
            if k == other {
                return true;
            }
            kind = k.parent();
        }
        false
    }

    /// Abstract kinds cannot be instantiated.
    pub fn is_abstract(self) -> bool {
        matches!(
            self,
            DataKind::DataObject | DataKind::DataSet | DataKind::PointSet | DataKind::CompositeDataSet
        )
    }

    pub fn is_composite(self) -> bool {
        self.is_a(DataKind::CompositeDataSet)
    }

    pub fn extent_type(self) -> ExtentType {
        match self {
            DataKind::ImageData | DataKind::RectilinearGrid | DataKind::StructuredGrid => {
                ExtentType::ThreeD
            }
            _ => ExtentType::Pieces,
        }
    }

    pub fn name(self) -> &'static str {
        use DataKind::*;
        match self {
            DataObject => "DataObject",
            DataSet => "DataSet",
            PointSet => "PointSet",
            PolyData => "PolyData",
            UnstructuredGrid => "UnstructuredGrid",
            StructuredGrid => "StructuredGrid",
            ImageData => "ImageData",
            RectilinearGrid => "RectilinearGrid",
            Table => "Table",
            Graph => "Graph",
            CompositeDataSet => "CompositeDataSet",
            MultiBlockDataSet => "MultiBlockDataSet",
            MultiPieceDataSet => "MultiPieceDataSet",
        }
    }

    pub fn from_name(name: &str) -> Option<DataKind> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
