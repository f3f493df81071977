use std::fmt;
use std::ops::Deref;

/// Path of child offsets from a composite root to one node.
///
/// Two trees with the same structure share indices, so an index taken from
/// one tree addresses the matching node of the other.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct CompositeIndex(Vec<usize>);

impl CompositeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, offset: usize) {
        self.0.push(offset);
    }

    pub fn pop(&mut self) -> Option<usize> {
        self.0.pop()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }
}

impl Deref for CompositeIndex {
    type Target = [usize];

    fn deref(&self) -> &[usize] {
        &self.0
    }
}

impl From<Vec<usize>> for CompositeIndex {
    fn from(path: Vec<usize>) -> Self {
        Self(path)
    }
}

impl FromIterator<usize> for CompositeIndex {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Debug for CompositeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CompositeIndex{:?}", self.0)
    }
}

impl fmt::Display for CompositeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}
