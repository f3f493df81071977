//! Update-request bookkeeping on output information.
//!
//! Helpers here only read and write `Information`; the executive decides
//! when each one applies.

use crate::data::{DataObject, Extent, ExtentType};
use crate::information::{keys, Information};

/// Which piece of a partitioned output a consumer asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceRequest {
    pub piece: i64,
    pub pieces: i64,
    pub ghost_levels: i64,
}

impl PieceRequest {
    pub const WHOLE: PieceRequest = PieceRequest {
        piece: 0,
        pieces: 1,
        ghost_levels: 0,
    };

    pub const fn new(piece: i64, pieces: i64, ghost_levels: i64) -> Self {
        Self {
            piece,
            pieces,
            ghost_levels,
        }
    }

    /// Read the request from output information, defaulting each missing key.
    pub fn from_information(info: &Information) -> Self {
        Self {
            piece: info.get_or(&keys::UPDATE_PIECE_NUMBER, 0),
            pieces: info.get_or(&keys::UPDATE_NUMBER_OF_PIECES, 1),
            ghost_levels: info.get_or(&keys::UPDATE_NUMBER_OF_GHOST_LEVELS, 0),
        }
    }

    pub fn write(&self, info: &mut Information) {
        info.set(&keys::UPDATE_PIECE_NUMBER, self.piece);
        info.set(&keys::UPDATE_NUMBER_OF_PIECES, self.pieces);
        info.set(&keys::UPDATE_NUMBER_OF_GHOST_LEVELS, self.ghost_levels);
    }
}

impl Default for PieceRequest {
    fn default() -> Self {
        Self::WHOLE
    }
}

/// Keys a filter inherits from its first input during the information pass.
pub fn copy_downstream_information(from: &Information, to: &mut Information) {
    to.copy_entry(from, &keys::WHOLE_EXTENT);
    to.copy_entry(from, &keys::TIME_STEPS);
    to.copy_entry(from, &keys::TIME_RANGE);
    to.copy_entry(from, &keys::ORIGIN);
    to.copy_entry(from, &keys::SPACING);
    to.copy_entry(from, &keys::TIME_DEPENDENT_INFORMATION);
}

/// Ask for everything: piece 0 of 1, no ghosts, the whole extent if known.
pub fn set_request_to_whole(info: &mut Information) {
    PieceRequest::WHOLE.write(info);
    if let Some(whole) = info.get_copied(&keys::WHOLE_EXTENT) {
        info.set(&keys::UPDATE_EXTENT, whole);
    }
    info.set(&keys::UPDATE_EXTENT_INITIALIZED, true);
}

/// Ask for one structured sub-extent.
pub fn set_update_extent(info: &mut Information, extent: Extent) {
    info.set(&keys::UPDATE_EXTENT, extent);
    info.set(&keys::UPDATE_EXTENT_INITIALIZED, true);
}

/// Fold this output's update extent into what other consumers asked for
/// earlier in the same update, so one execution serves all of them.
pub fn combine_update_extent(info: &mut Information) {
    let Some(update) = info.get_copied(&keys::UPDATE_EXTENT) else {
        return;
    };
    match info.get_copied(&keys::COMBINED_UPDATE_EXTENT) {
        Some(combined) if !combined.is_empty() => {
            let merged = combined.union(&update);
            info.set(&keys::COMBINED_UPDATE_EXTENT, merged);
            info.set(&keys::UPDATE_EXTENT, merged);
        }
        _ => info.set(&keys::COMBINED_UPDATE_EXTENT, update),
    }
}

/// Forget combined requests once an update cycle settles.
pub fn clear_combined_update_extent(info: &mut Information) {
    info.remove(&keys::COMBINED_UPDATE_EXTENT);
}

/// Forward a consumer's update request to one of its inputs.
///
/// `input_extent` is the extent type of the data currently on the input;
/// structured extents are only forwarded to structured inputs.
pub fn copy_update_request(from: &Information, to: &mut Information, input_extent: ExtentType) {
    if let Some(step) = from.get_copied(&keys::UPDATE_TIME_STEP) {
        to.set(&keys::UPDATE_TIME_STEP, step);
    }
    to.remove(&keys::EXACT_EXTENT);
    if input_extent == ExtentType::ThreeD {
        if let Some(extent) = from.get_copied(&keys::UPDATE_EXTENT) {
            to.set(&keys::UPDATE_EXTENT, extent);
        }
    }
    copy_if_present(from, to, &keys::UPDATE_PIECE_NUMBER);
    copy_if_present(from, to, &keys::UPDATE_NUMBER_OF_PIECES);
    copy_if_present(from, to, &keys::UPDATE_NUMBER_OF_GHOST_LEVELS);
    if let Some(initialized) = from.get_copied(&keys::UPDATE_EXTENT_INITIALIZED) {
        to.set(&keys::UPDATE_EXTENT_INITIALIZED, initialized);
    }
}

fn copy_if_present(from: &Information, to: &mut Information, key: &crate::information::InformationKey<i64>) {
    if let Some(value) = from.get_copied(key) {
        to.set(key, value);
    }
}

/// Whether the data on an output no longer matches the requested piece.
pub fn piece_needs_update(request: &PieceRequest, data_info: &Information) -> bool {
    let data_pieces = data_info.get_or(&keys::DATA_NUMBER_OF_PIECES, 0);
    if data_pieces != request.pieces {
        return true;
    }
    if request.pieces > 1 {
        let data_ghosts = data_info.get_or(&keys::DATA_NUMBER_OF_GHOST_LEVELS, 0);
        if data_ghosts < request.ghost_levels {
            return true;
        }
    }
    if data_pieces != 1 {
        let data_piece = data_info.get_or(&keys::DATA_PIECE_NUMBER, -1);
        if data_piece != request.piece {
            return true;
        }
    }
    false
}

/// Whether a structured update extent reaches outside what was generated.
///
/// `None` when the output carries no structured request.
pub fn extent_needs_update(out_info: &Information, data: &dyn DataObject) -> Option<bool> {
    let update = out_info.get_copied(&keys::UPDATE_EXTENT)?;
    if data.extent_type() != ExtentType::ThreeD {
        return None;
    }
    Some(match data.data_extent() {
        None => true,
        Some(generated) => !update.is_empty() && !generated.contains(&update),
    })
}

/// Whether a time-aware output was generated for a different time step.
///
/// `None` when the pipeline is not time aware or no step was requested.
pub fn time_needs_update(out_info: &Information, data_info: &Information) -> Option<bool> {
    if !out_info.has(&keys::TIME_RANGE) {
        return None;
    }
    let requested = out_info.get_copied(&keys::UPDATE_TIME_STEP)?;
    let Some(generated) = data_info.get_copied(&keys::DATA_TIME_STEP) else {
        return Some(true);
    };
    if out_info.get_copied(&keys::PREVIOUS_UPDATE_TIME_STEP) == Some(requested) {
        return Some(false);
    }
    Some(generated != requested)
}
