//! Well-known information keys.
//!
//! Grouped by the layer that owns them. The location string is part of the
//! key identity.

use crate::data::{DataKind, DataObjectRef, Extent, FieldRequirement};
use crate::information::{InformationKey, Request};

const EXECUTIVE: &str = "Executive";
const ALGORITHM: &str = "Algorithm";
const DATA_OBJECT_LOC: &str = "DataObject";
const STREAMING: &str = "Streaming";
const COMPOSITE: &str = "Composite";

// Request phase markers. Exactly one is present on a dispatched request.

pub const REQUEST_DATA_OBJECT: InformationKey<Request> =
    InformationKey::new("REQUEST_DATA_OBJECT", EXECUTIVE);
pub const REQUEST_INFORMATION: InformationKey<Request> =
    InformationKey::new("REQUEST_INFORMATION", EXECUTIVE);
pub const REQUEST_UPDATE_EXTENT: InformationKey<Request> =
    InformationKey::new("REQUEST_UPDATE_EXTENT", EXECUTIVE);
pub const REQUEST_DATA: InformationKey<Request> = InformationKey::new("REQUEST_DATA", EXECUTIVE);

/// Output port that triggered the request; -1 means the caller updated directly.
pub const FROM_OUTPUT_PORT: InformationKey<i64> =
    InformationKey::new("FROM_OUTPUT_PORT", EXECUTIVE);
/// Set by a node on the data request to ask for another pass.
pub const CONTINUE_EXECUTING: InformationKey<bool> =
    InformationKey::new("CONTINUE_EXECUTING", EXECUTIVE);
/// Set by a node on an output's information to suppress "mark generated".
pub const DATA_NOT_GENERATED: InformationKey<bool> =
    InformationKey::new("DATA_NOT_GENERATED", EXECUTIVE);
/// Per-output release flag: consumers release the data after they execute.
pub const RELEASE_DATA: InformationKey<bool> = InformationKey::new("RELEASE_DATA", EXECUTIVE);

// Port capability declarations.

pub const INPUT_REQUIRED_DATA_TYPE: InformationKey<Vec<DataKind>> =
    InformationKey::new("INPUT_REQUIRED_DATA_TYPE", ALGORITHM);
pub const INPUT_IS_OPTIONAL: InformationKey<bool> =
    InformationKey::new("INPUT_IS_OPTIONAL", ALGORITHM);
pub const INPUT_IS_REPEATABLE: InformationKey<bool> =
    InformationKey::new("INPUT_IS_REPEATABLE", ALGORITHM);
pub const INPUT_REQUIRED_FIELDS: InformationKey<Vec<FieldRequirement>> =
    InformationKey::new("INPUT_REQUIRED_FIELDS", ALGORITHM);
/// Concrete kind an output port produces.
pub const DATA_TYPE_NAME: InformationKey<DataKind> =
    InformationKey::new("DATA_TYPE_NAME", DATA_OBJECT_LOC);
/// Declared on a source's output port when it can produce one of several pieces.
pub const CAN_HANDLE_PIECE_REQUEST: InformationKey<bool> =
    InformationKey::new("CAN_HANDLE_PIECE_REQUEST", ALGORITHM);

// Data object slot and the data-side description of what was generated.

pub const DATA_OBJECT: InformationKey<DataObjectRef> =
    InformationKey::new("DATA_OBJECT", DATA_OBJECT_LOC);
pub const DATA_EXTENT: InformationKey<Extent> = InformationKey::new("DATA_EXTENT", DATA_OBJECT_LOC);
pub const DATA_PIECE_NUMBER: InformationKey<i64> =
    InformationKey::new("DATA_PIECE_NUMBER", DATA_OBJECT_LOC);
pub const DATA_NUMBER_OF_PIECES: InformationKey<i64> =
    InformationKey::new("DATA_NUMBER_OF_PIECES", DATA_OBJECT_LOC);
pub const DATA_NUMBER_OF_GHOST_LEVELS: InformationKey<i64> =
    InformationKey::new("DATA_NUMBER_OF_GHOST_LEVELS", DATA_OBJECT_LOC);
pub const DATA_TIME_STEP: InformationKey<f64> =
    InformationKey::new("DATA_TIME_STEP", DATA_OBJECT_LOC);
pub const ORIGIN: InformationKey<Vec<f64>> = InformationKey::new("ORIGIN", DATA_OBJECT_LOC);
pub const SPACING: InformationKey<Vec<f64>> = InformationKey::new("SPACING", DATA_OBJECT_LOC);

// Streaming request keys on output information.

pub const WHOLE_EXTENT: InformationKey<Extent> = InformationKey::new("WHOLE_EXTENT", STREAMING);
pub const UPDATE_EXTENT: InformationKey<Extent> = InformationKey::new("UPDATE_EXTENT", STREAMING);
pub const UPDATE_EXTENT_INITIALIZED: InformationKey<bool> =
    InformationKey::new("UPDATE_EXTENT_INITIALIZED", STREAMING);
/// Bounding box of the extents requested by every consumer in one update.
pub const COMBINED_UPDATE_EXTENT: InformationKey<Extent> =
    InformationKey::new("COMBINED_UPDATE_EXTENT", STREAMING);
pub const UPDATE_PIECE_NUMBER: InformationKey<i64> =
    InformationKey::new("UPDATE_PIECE_NUMBER", STREAMING);
pub const UPDATE_NUMBER_OF_PIECES: InformationKey<i64> =
    InformationKey::new("UPDATE_NUMBER_OF_PIECES", STREAMING);
pub const UPDATE_NUMBER_OF_GHOST_LEVELS: InformationKey<i64> =
    InformationKey::new("UPDATE_NUMBER_OF_GHOST_LEVELS", STREAMING);
pub const UPDATE_TIME_STEP: InformationKey<f64> =
    InformationKey::new("UPDATE_TIME_STEP", STREAMING);
pub const PREVIOUS_UPDATE_TIME_STEP: InformationKey<f64> =
    InformationKey::new("PREVIOUS_UPDATE_TIME_STEP", STREAMING);
pub const TIME_STEPS: InformationKey<Vec<f64>> = InformationKey::new("TIME_STEPS", STREAMING);
pub const TIME_RANGE: InformationKey<Vec<f64>> = InformationKey::new("TIME_RANGE", STREAMING);
pub const TIME_DEPENDENT_INFORMATION: InformationKey<bool> =
    InformationKey::new("TIME_DEPENDENT_INFORMATION", STREAMING);
/// Consumer needs exactly the update extent, no more.
pub const EXACT_EXTENT: InformationKey<bool> = InformationKey::new("EXACT_EXTENT", STREAMING);

// Per-node metadata in composite trees.

pub const NAME: InformationKey<String> = InformationKey::new("NAME", COMPOSITE);
