//! Configurable preorder traversal over a composite tree.
//!
//! The iterator borrows the tree and walks it lazily with a stack of frames,
//! one per composite level it has descended into. Each step re-resolves the
//! current composite from the root through the index path, so no `RefCell`
//! borrow is held between steps.

use super::{CompositeDataSet, CompositeError, CompositeIndex, CompositeResult, Slot};
use crate::data::object::DataObjectRef;
use crate::information::InformationRef;

/// Position among the children of one composite level.
#[derive(Debug, Clone, Copy)]
struct Frame {
    /// Child offset under the cursor; `None` once the level is exhausted.
    cursor: Option<usize>,
    /// Flat index of the child under the cursor.
    flat: usize,
}

/// Run `f` on the composite reached by following `path` from `root`.
fn with_node<R>(
    root: &CompositeDataSet,
    path: &[usize],
    f: impl FnOnce(&CompositeDataSet) -> R,
) -> Option<R> {
    match path.split_first() {
        None => Some(f(root)),
        Some((&offset, rest)) => {
            let child = root.child(offset)?;
            let child = child.borrow();
            let out = with_node(child.as_composite()?, rest, f);
            out
        }
    }
}

#[derive(Debug)]
pub struct CompositeDataIterator<'a> {
    tree: &'a CompositeDataSet,
    visit_only_leaves: bool,
    traverse_sub_tree: bool,
    skip_empty_nodes: bool,
    reverse: bool,
    stack: Vec<Frame>,
    /// The current item is a composite whose children come next.
    descend_current: bool,
}

impl<'a> CompositeDataIterator<'a> {
    /// A new iterator. It is done until `init_traversal` or
    /// `init_reverse_traversal` is called.
    pub fn new(tree: &'a CompositeDataSet) -> Self {
        Self {
            tree,
            visit_only_leaves: true,
            traverse_sub_tree: true,
            skip_empty_nodes: true,
            reverse: false,
            stack: Vec::new(),
            descend_current: false,
        }
    }

    pub fn tree(&self) -> &'a CompositeDataSet {
        self.tree
    }

    pub fn visit_only_leaves(&self) -> bool {
        self.visit_only_leaves
    }

    pub fn set_visit_only_leaves(&mut self, on: bool) {
        self.visit_only_leaves = on;
    }

    pub fn traverse_sub_tree(&self) -> bool {
        self.traverse_sub_tree
    }

    pub fn set_traverse_sub_tree(&mut self, on: bool) {
        self.traverse_sub_tree = on;
    }

    pub fn skip_empty_nodes(&self) -> bool {
        self.skip_empty_nodes
    }

    pub fn set_skip_empty_nodes(&mut self, on: bool) {
        self.skip_empty_nodes = on;
    }

    pub fn is_reverse(&self) -> bool {
        self.reverse
    }

    pub fn init_traversal(&mut self) {
        self.reverse = false;
        self.go_to_first_item();
    }

    pub fn init_reverse_traversal(&mut self) {
        self.reverse = true;
        self.go_to_first_item();
    }

    /// Restart in the current direction.
    pub fn go_to_first_item(&mut self) {
        self.stack.clear();
        self.descend_current = false;
        let root = self.first_frame(self.tree, 0);
        self.stack.push(root);
        self.settle();
    }

    pub fn go_to_next_item(&mut self) {
        let Some(&top) = self.stack.last() else {
            return;
        };
        if std::mem::take(&mut self.descend_current) {
            let Ok(index) = self.current_index() else {
                self.stack.clear();
                return;
            };
            match with_node(self.tree, &index, |node| self.first_frame(node, top.flat)) {
                Some(frame) => self.stack.push(frame),
                None => self.stack.clear(),
            }
        } else {
            self.advance_top();
        }
        self.settle();
    }

    pub fn is_done_with_traversal(&self) -> bool {
        self.stack.is_empty()
    }

    /// Preorder position of the current node in the full tree.
    pub fn current_flat_index(&self) -> CompositeResult<usize> {
        self.stack
            .last()
            .filter(|frame| frame.cursor.is_some())
            .map(|frame| frame.flat)
            .ok_or(CompositeError::InvalidState)
    }

    pub fn current_index(&self) -> CompositeResult<CompositeIndex> {
        if self.stack.is_empty() {
            return Err(CompositeError::InvalidState);
        }
        self.stack
            .iter()
            .map(|frame| frame.cursor)
            .collect::<Option<CompositeIndex>>()
            .ok_or(CompositeError::InvalidState)
    }

    /// Data object at the current position; `None` for an empty slot.
    pub fn current_data_object(&self) -> CompositeResult<Option<DataObjectRef>> {
        let (path, pos) = self.position()?;
        with_node(self.tree, &path, |node| node.child(pos)).ok_or(CompositeError::InvalidState)
    }

    /// Metadata of the current slot, allocated on demand.
    pub fn current_meta_data(&self) -> CompositeResult<InformationRef> {
        let (path, pos) = self.position()?;
        with_node(self.tree, &path, |node| node.child_meta_data(pos))
            .flatten()
            .ok_or(CompositeError::InvalidState)
    }

    pub fn has_current_meta_data(&self) -> CompositeResult<bool> {
        let (path, pos) = self.position()?;
        with_node(self.tree, &path, |node| node.has_child_meta_data(pos))
            .ok_or(CompositeError::InvalidState)
    }

    /// Walk from the first item as a Rust iterator, honoring the flags and
    /// direction currently set.
    pub fn items(&mut self) -> Items<'_, 'a> {
        Items {
            iter: self,
            started: false,
        }
    }

    /// Path to the composite holding the current node, and the node's offset in it.
    fn position(&self) -> CompositeResult<(Vec<usize>, usize)> {
        let mut index = self.current_index()?;
        let pos = index.pop().ok_or(CompositeError::InvalidState)?;
        Ok((index.as_slice().to_vec(), pos))
    }

    /// Path to the composite the top frame iterates.
    fn top_node_path(&self) -> Vec<usize> {
        let levels = self.stack.len().saturating_sub(1);
        self.stack[..levels]
            .iter()
            .filter_map(|frame| frame.cursor)
            .collect()
    }

    fn first_frame(&self, node: &CompositeDataSet, node_flat: usize) -> Frame {
        let n = node.number_of_children();
        if n == 0 {
            return Frame {
                cursor: None,
                flat: node_flat + 1,
            };
        }
        if self.reverse {
            let last = n - 1;
            Frame {
                cursor: Some(last),
                flat: node_flat + node.subtree_size() - node.slot_size(last),
            }
        } else {
            Frame {
                cursor: Some(0),
                flat: node_flat + 1,
            }
        }
    }

    fn step(&self, node: &CompositeDataSet, frame: Frame) -> Frame {
        let Some(pos) = frame.cursor else {
            return frame;
        };
        if self.reverse {
            match pos.checked_sub(1) {
                Some(prev) => Frame {
                    cursor: Some(prev),
                    flat: frame.flat - node.slot_size(prev),
                },
                None => Frame {
                    cursor: None,
                    ..frame
                },
            }
        } else {
            let next = pos + 1;
            Frame {
                cursor: (next < node.number_of_children()).then_some(next),
                flat: frame.flat + node.slot_size(pos),
            }
        }
    }

    /// Move the top frame to its next sibling in the traversal direction.
    fn advance_top(&mut self) {
        let Some(&top) = self.stack.last() else {
            return;
        };
        let path = self.top_node_path();
        match with_node(self.tree, &path, |node| self.step(node, top)) {
            Some(next) => {
                if let Some(frame) = self.stack.last_mut() {
                    *frame = next;
                }
            }
            None => self.stack.clear(),
        }
    }

    /// From the top frame's cursor, move forward until it rests on an
    /// acceptable node or the traversal is done.
    fn settle(&mut self) {
        loop {
            let Some(&top) = self.stack.last() else {
                return;
            };
            let Some(pos) = top.cursor else {
                self.stack.pop();
                self.advance_top();
                continue;
            };
            let path = self.top_node_path();
            let Some(slot) = with_node(self.tree, &path, |node| node.slot(pos)) else {
                self.stack.clear();
                return;
            };
            match slot {
                Slot::Empty if self.skip_empty_nodes => self.advance_top(),
                Slot::Empty | Slot::Leaf => return,
                Slot::Composite if !self.visit_only_leaves => {
                    self.descend_current = self.traverse_sub_tree;
                    return;
                }
                Slot::Composite if self.traverse_sub_tree => {
                    let mut child_path = path;
                    child_path.push(pos);
                    match with_node(self.tree, &child_path, |node| self.first_frame(node, top.flat)) {
                        Some(frame) => self.stack.push(frame),
                        None => {
                            self.stack.clear();
                            return;
                        }
                    }
                }
                Slot::Composite => self.advance_top(),
            }
        }
    }
}

/// One visited node, as yielded by [`CompositeDataIterator::items`].
#[derive(Debug, Clone)]
pub struct CompositeItemRef {
    pub flat_index: usize,
    pub index: CompositeIndex,
    pub data: Option<DataObjectRef>,
}

pub struct Items<'i, 'a> {
    iter: &'i mut CompositeDataIterator<'a>,
    started: bool,
}

impl Iterator for Items<'_, '_> {
    type Item = CompositeItemRef;

    fn next(&mut self) -> Option<Self::Item> {
        if self.started {
            self.iter.go_to_next_item();
        } else {
            self.started = true;
            self.iter.go_to_first_item();
        }
        if self.iter.is_done_with_traversal() {
            return None;
        }
        Some(CompositeItemRef {
            flat_index: self.iter.current_flat_index().ok()?,
            index: self.iter.current_index().ok()?,
            data: self.iter.current_data_object().ok()?,
        })
    }
}
