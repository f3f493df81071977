//! The `DataObject` contract and the state every data object shares.

use crate::data::composite::CompositeDataSet;
use crate::data::field::{FieldAssociation, FieldData};
use crate::data::kind::{DataKind, ExtentType};
use crate::data::Extent;
use crate::information::{keys, Information};
use crate::pipeline::Executive;
use crate::time_stamp::TimeStamp;
use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// Shared handle to a data object.
pub type DataObjectRef = Rc<RefCell<dyn DataObject>>;

/// Non-owning link from a data object to the executive output that made it.
#[derive(Clone)]
pub struct ProducerLink {
    executive: Weak<Executive>,
    port: usize,
}

impl ProducerLink {
    pub fn new(executive: Weak<Executive>, port: usize) -> Self {
        Self { executive, port }
    }

    pub fn executive(&self) -> Option<Rc<Executive>> {
        self.executive.upgrade()
    }

    pub fn port(&self) -> usize {
        self.port
    }
}

impl fmt::Debug for ProducerLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.executive() {
            Some(exec) => write!(f, "ProducerLink({}:{})", exec.name(), self.port),
            None => write!(f, "ProducerLink(dropped:{})", self.port),
        }
    }
}

/// State carried by every data object regardless of kind.
#[derive(Debug, Default)]
pub struct DataObjectCore {
    mtime: TimeStamp,
    information: Information,
    field_data: FieldData,
    data_released: bool,
    update_time: TimeStamp,
    producer: Option<ProducerLink>,
}

impl DataObjectCore {
    pub fn new() -> Self {
        Self {
            mtime: TimeStamp::now(),
            ..Self::default()
        }
    }

    pub fn mtime(&self) -> TimeStamp {
        self.mtime
    }

    pub fn modified(&mut self) {
        self.mtime.modified();
    }

    /// The object's own metadata (data extent, piece, time step).
    pub fn information(&self) -> &Information {
        &self.information
    }

    pub fn information_mut(&mut self) -> &mut Information {
        &mut self.information
    }

    pub fn field_data(&self) -> &FieldData {
        &self.field_data
    }

    pub fn field_data_mut(&mut self) -> &mut FieldData {
        &mut self.field_data
    }

    pub fn data_released(&self) -> bool {
        self.data_released
    }

    pub fn set_data_released(&mut self, released: bool) {
        self.data_released = released;
    }

    /// When the producing executive last regenerated this object.
    pub fn update_time(&self) -> TimeStamp {
        self.update_time
    }

    pub fn mark_updated(&mut self) {
        self.update_time.modified();
    }

    pub fn producer(&self) -> Option<&ProducerLink> {
        self.producer.as_ref()
    }

    pub fn set_producer(&mut self, producer: Option<ProducerLink>) {
        self.producer = producer;
    }

    /// Drop field data and the data-side description keys.
    pub fn initialize(&mut self) {
        self.field_data.clear();
        for key in [
            &keys::DATA_PIECE_NUMBER,
            &keys::DATA_NUMBER_OF_PIECES,
            &keys::DATA_NUMBER_OF_GHOST_LEVELS,
        ] {
            self.information.remove(key);
        }
        self.information.remove(&keys::DATA_TIME_STEP);
        self.information.remove(&keys::DATA_EXTENT);
        self.modified();
    }

    pub fn shallow_copy_from(&mut self, other: &DataObjectCore) {
        self.field_data.shallow_copy(&other.field_data);
        self.copy_information_from(other);
        self.modified();
    }

    pub fn deep_copy_from(&mut self, other: &DataObjectCore) {
        self.field_data.deep_copy(&other.field_data);
        self.copy_information_from(other);
        self.modified();
    }

    fn copy_information_from(&mut self, other: &DataObjectCore) {
        self.information.clear();
        self.information.append(&other.information);
    }
}

/// A unit of data flowing between ports.
///
/// Implementors hold a `DataObjectCore` and expose their payload through
/// `clear_payload` and the copy methods. The provided methods build the
/// executive-facing behavior on top of those.
pub trait DataObject: fmt::Debug + 'static {
    fn kind(&self) -> DataKind;

    fn core(&self) -> &DataObjectCore;

    fn core_mut(&mut self) -> &mut DataObjectCore;

    /// A new, empty object of the same concrete kind.
    fn new_instance(&self) -> DataObjectRef;

    /// Drop the kind-specific payload. Field data is handled by the core.
    fn clear_payload(&mut self);

    /// Share `src`'s payload. `src` of a different concrete type only
    /// contributes its core state.
    fn shallow_copy(&mut self, src: &dyn DataObject);

    /// Copy `src`'s payload into fresh storage.
    fn deep_copy(&mut self, src: &dyn DataObject);

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Attribute collection for an association, if this kind has one.
    fn attributes(&self, association: FieldAssociation) -> Option<&FieldData> {
        match association {
            FieldAssociation::Field => Some(self.core().field_data()),
            _ => None,
        }
    }

    fn as_composite(&self) -> Option<&CompositeDataSet> {
        None
    }

    fn as_composite_mut(&mut self) -> Option<&mut CompositeDataSet> {
        None
    }

    fn extent_type(&self) -> ExtentType {
        self.kind().extent_type()
    }

    fn is_a(&self, kind: DataKind) -> bool {
        self.kind().is_a(kind)
    }

    fn mtime(&self) -> TimeStamp {
        self.core().mtime()
    }

    fn modified(&mut self) {
        self.core_mut().modified();
    }

    /// Reset to the freshly constructed state, keeping identity.
    fn initialize(&mut self) {
        self.clear_payload();
        self.core_mut().initialize();
    }

    /// Discard the payload without touching the modification time.
    fn release_data(&mut self) {
        self.clear_payload();
        let core = self.core_mut();
        core.field_data_mut().clear();
        core.set_data_released(true);
    }

    fn data_released(&self) -> bool {
        self.core().data_released()
    }

    fn update_time(&self) -> TimeStamp {
        self.core().update_time()
    }

    fn data_extent(&self) -> Option<Extent> {
        self.core().information().get_copied(&keys::DATA_EXTENT)
    }

    fn field_data(&self) -> &FieldData {
        self.core().field_data()
    }
}

/// Instantiate an empty object of a concrete kind. Abstract kinds yield `None`.
pub fn new_data_object(kind: DataKind) -> Option<DataObjectRef> {
    if kind.is_abstract() {
        return None;
    }
    if kind.is_composite() {
        Some(CompositeDataSet::new(kind).into_ref())
    } else {
        Some(crate::data::DataSet::new(kind).into_ref())
    }
}
