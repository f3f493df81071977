//! Hierarchical composite data: an ordered tree of data objects.
//!
//! Each slot of a `CompositeDataSet` holds an optional child (a leaf data
//! object or another composite) and optional per-slot metadata. An unset
//! child is an *empty* slot, which differs from an *absent* one (index past
//! the end).
//!
//! ```text
//! root (flat 0)
//! +-- [0] A          (flat 1)
//! +-- [1] <empty>    (flat 2)
//! +-- [2] composite  (flat 3)
//!     +-- [0] D      (flat 4)
//!     +-- [1] E      (flat 5)
//! ```
//!
//! Flat indices number every node of the full tree in preorder, independent
//! of how an iterator is configured.

pub mod index;
pub mod iterator;

pub use index::CompositeIndex;
pub use iterator::{CompositeDataIterator, CompositeItemRef, Items};

use crate::data::kind::DataKind;
use crate::data::object::{DataObject, DataObjectCore, DataObjectRef};
use crate::information::{Information, InformationRef};
use std::any::Any;
use std::cell::{OnceCell, RefCell};
use std::rc::Rc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompositeError {
    #[error("Iterator is not positioned on an item")]
    InvalidState,

    #[error("Composite index is empty")]
    EmptyIndex,
}

pub type CompositeResult<T> = std::result::Result<T, CompositeError>;

/// One slot of a composite tree.
#[derive(Debug, Clone, Default)]
pub struct CompositeItem {
    data: Option<DataObjectRef>,
    meta: OnceCell<InformationRef>,
}

impl CompositeItem {
    pub fn data(&self) -> Option<&DataObjectRef> {
        self.data.as_ref()
    }

    pub fn has_meta_data(&self) -> bool {
        self.meta.get().is_some()
    }

    /// Metadata for this slot, allocated on first request.
    pub fn meta_data(&self) -> InformationRef {
        self.meta.get_or_init(|| Information::new().into_ref()).clone()
    }

    fn copy_meta_from(&mut self, other: &CompositeItem) {
        self.meta = OnceCell::new();
        if let Some(meta) = other.meta.get() {
            let copy = meta.borrow().clone().into_ref();
            let _ = self.meta.set(copy);
        }
    }
}

/// What a slot holds, as seen by traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Slot {
    Empty,
    Leaf,
    Composite,
}

#[derive(Debug)]
pub struct CompositeDataSet {
    kind: DataKind,
    core: DataObjectCore,
    children: Vec<CompositeItem>,
}

impl CompositeDataSet {
    pub fn new(kind: DataKind) -> Self {
        debug_assert!(kind.is_composite(), "{kind} is not a composite kind");
        Self {
            kind,
            core: DataObjectCore::new(),
            children: Vec::new(),
        }
    }

    pub fn multi_block() -> Self {
        Self::new(DataKind::MultiBlockDataSet)
    }

    pub fn multi_piece() -> Self {
        Self::new(DataKind::MultiPieceDataSet)
    }

    pub fn into_ref(self) -> DataObjectRef {
        Rc::new(RefCell::new(self))
    }

    pub fn number_of_children(&self) -> usize {
        self.children.len()
    }

    /// Grow with empty slots or truncate.
    pub fn set_number_of_children(&mut self, n: usize) {
        self.children.resize_with(n, CompositeItem::default);
        self.core.modified();
    }

    pub fn item(&self, index: usize) -> Option<&CompositeItem> {
        self.children.get(index)
    }

    /// Child at `index`. Empty and absent slots both yield `None`.
    pub fn child(&self, index: usize) -> Option<DataObjectRef> {
        self.children.get(index).and_then(|item| item.data.clone())
    }

    /// Set a child, growing the tree when `index` is past the end.
    pub fn set_child(&mut self, index: usize, data: Option<DataObjectRef>) {
        if index >= self.children.len() {
            self.children.resize_with(index + 1, CompositeItem::default);
        }
        self.children[index].data = data;
        self.core.modified();
    }

    /// Remove the slot at `index`, shifting later slots down.
    pub fn remove_child(&mut self, index: usize) -> Option<DataObjectRef> {
        if index >= self.children.len() {
            return None;
        }
        let item = self.children.remove(index);
        self.core.modified();
        item.data
    }

    pub fn has_child_meta_data(&self, index: usize) -> bool {
        self.children
            .get(index)
            .is_some_and(CompositeItem::has_meta_data)
    }

    /// Metadata for slot `index`, allocated on demand. Absent slots yield `None`.
    pub fn child_meta_data(&self, index: usize) -> Option<InformationRef> {
        self.children.get(index).map(CompositeItem::meta_data)
    }

    pub fn set_child_meta_data(&mut self, index: usize, meta: InformationRef) {
        if index >= self.children.len() {
            self.children.resize_with(index + 1, CompositeItem::default);
        }
        self.children[index].meta = OnceCell::from(meta);
        self.core.modified();
    }

    /// Become an empty-payload copy of `src`'s shape. Nested composites are
    /// recreated with the same kind, leaves become empty slots, and slot
    /// metadata is copied shallowly.
    pub fn copy_structure(&mut self, src: &CompositeDataSet) {
        self.children.clear();
        for src_item in &src.children {
            let mut item = CompositeItem::default();
            if let Some(data) = &src_item.data {
                let data = data.borrow();
                if let Some(nested) = data.as_composite() {
                    let mut copy = CompositeDataSet::new(nested.kind);
                    copy.copy_structure(nested);
                    item.data = Some(copy.into_ref());
                }
            }
            item.copy_meta_from(src_item);
            self.children.push(item);
        }
        self.core.modified();
    }

    /// Data object at the iterator's current position.
    pub fn get_data_set(&self, iter: &CompositeDataIterator<'_>) -> CompositeResult<Option<DataObjectRef>> {
        let index = iter.current_index()?;
        Ok(self.data_set_at(&index))
    }

    /// Data object addressed by `index`. Missing intermediate nodes yield `None`.
    pub fn data_set_at(&self, index: &[usize]) -> Option<DataObjectRef> {
        let (&first, rest) = index.split_first()?;
        let child = self.child(first)?;
        if rest.is_empty() {
            return Some(child);
        }
        let nested = child.borrow();
        let found = nested.as_composite()?.data_set_at(rest);
        found
    }

    /// Place `data` at the iterator's current position, creating
    /// intermediate multi-block nodes as needed.
    pub fn set_data_set(
        &mut self,
        iter: &CompositeDataIterator<'_>,
        data: Option<DataObjectRef>,
    ) -> CompositeResult<()> {
        let index = iter.current_index()?;
        self.set_data_set_at(&index, data)
    }

    pub fn set_data_set_at(
        &mut self,
        index: &[usize],
        data: Option<DataObjectRef>,
    ) -> CompositeResult<()> {
        let (&first, rest) = index.split_first().ok_or(CompositeError::EmptyIndex)?;
        if rest.is_empty() {
            self.set_child(first, data);
            return Ok(());
        }
        let existing = self
            .child(first)
            .filter(|c| c.borrow().as_composite().is_some());
        let nested = match existing {
            Some(nested) => nested,
            None => {
                let created = CompositeDataSet::multi_block().into_ref();
                self.set_child(first, Some(created.clone()));
                created
            }
        };
        let mut nested = nested.borrow_mut();
        match nested.as_composite_mut() {
            Some(composite) => composite.set_data_set_at(rest, data),
            None => Err(CompositeError::EmptyIndex),
        }
    }

    /// Number of non-empty leaves in the whole tree.
    pub fn number_of_leaves(&self) -> usize {
        self.children
            .iter()
            .filter_map(|item| item.data.as_ref())
            .map(|data| match data.borrow().as_composite() {
                Some(nested) => nested.number_of_leaves(),
                None => 1,
            })
            .sum()
    }

    pub fn new_iterator(&self) -> CompositeDataIterator<'_> {
        CompositeDataIterator::new(self)
    }

    /// Nodes in this subtree, including this node and empty slots.
    pub fn subtree_size(&self) -> usize {
        1 + (0..self.children.len())
            .map(|i| self.slot_size(i))
            .sum::<usize>()
    }

    pub(crate) fn slot(&self, index: usize) -> Slot {
        match self.children.get(index).and_then(|item| item.data.as_ref()) {
            None => Slot::Empty,
            Some(data) if data.borrow().as_composite().is_some() => Slot::Composite,
            Some(_) => Slot::Leaf,
        }
    }

    /// Flat-index span of the slot at `index`.
    pub(crate) fn slot_size(&self, index: usize) -> usize {
        self.children
            .get(index)
            .and_then(|item| item.data.as_ref())
            .and_then(|data| data.borrow().as_composite().map(CompositeDataSet::subtree_size))
            .unwrap_or(1)
    }

    fn copy_children(&mut self, src: &CompositeDataSet, deep: bool) {
        self.children.clear();
        for src_item in &src.children {
            let mut item = CompositeItem::default();
            if let Some(data) = &src_item.data {
                let data_ref = data.borrow();
                item.data = if let Some(nested) = data_ref.as_composite() {
                    let mut copy = CompositeDataSet::new(nested.kind);
                    copy.copy_children(nested, deep);
                    copy.core.shallow_copy_from(nested.core());
                    Some(copy.into_ref())
                } else if deep {
                    let copy = data_ref.new_instance();
                    copy.borrow_mut().deep_copy(&*data_ref);
                    Some(copy)
                } else {
                    Some(data.clone())
                };
            }
            item.copy_meta_from(src_item);
            self.children.push(item);
        }
    }
}

impl DataObject for CompositeDataSet {
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
        CompositeDataSet::new(self.kind).into_ref()
    }

    fn clear_payload(&mut self) {
        self.children.clear();
    }

    /// Leaves are shared; nested composites are recreated.
    fn shallow_copy(&mut self, src: &dyn DataObject) {
        if let Some(composite) = src.as_composite() {
            self.copy_children(composite, false);
        }
        self.core.shallow_copy_from(src.core());
    }

    fn deep_copy(&mut self, src: &dyn DataObject) {
        if let Some(composite) = src.as_composite() {
            self.copy_children(composite, true);
        }
        self.core.deep_copy_from(src.core());
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn as_composite(&self) -> Option<&CompositeDataSet> {
        Some(self)
    }

    fn as_composite_mut(&mut self) -> Option<&mut CompositeDataSet> {
        Some(self)
    }

    /// Composite trees have no time of their own beyond their children's.
    fn mtime(&self) -> crate::time_stamp::TimeStamp {
        self.children
            .iter()
            .filter_map(|item| item.data.as_ref())
            .map(|data| data.borrow().mtime())
            .fold(self.core.mtime(), std::cmp::max)
    }
}
