//! Structured index boxes `[x0, x1, y0, y1, z0, z1]`.

use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Extent(pub [i64; 6]);

impl Extent {
    /// Canonical empty extent.
    pub const EMPTY: Extent = Extent([0, -1, 0, -1, 0, -1]);

    pub const fn new(x0: i64, x1: i64, y0: i64, y1: i64, z0: i64, z1: i64) -> Self {
        Self([x0, x1, y0, y1, z0, z1])
    }

    /// An extent is empty when any axis has `min > max`.
    pub fn is_empty(&self) -> bool {
        let e = &self.0;
        e[1] < e[0] || e[3] < e[2] || e[5] < e[4]
    }

    /// Whether `other` lies entirely inside `self`. The empty extent is
    /// inside everything.
    pub fn contains(&self, other: &Extent) -> bool {
        if other.is_empty() {
            return true;
        }
        if self.is_empty() {
            return false;
        }
        (0..3).all(|axis| {
            let (lo, hi) = (self.0[2 * axis], self.0[2 * axis + 1]);
            other.0[2 * axis] >= lo && other.0[2 * axis + 1] <= hi
        })
    }

    /// Smallest extent holding both. An empty operand contributes nothing.
    pub fn union(&self, other: &Extent) -> Extent {
        if other.is_empty() {
            return *self;
        }
        if self.is_empty() {
            return *other;
        }
        let mut out = self.0;
        for axis in 0..3 {
            out[2 * axis] = out[2 * axis].min(other.0[2 * axis]);
            out[2 * axis + 1] = out[2 * axis + 1].max(other.0[2 * axis + 1]);
        }
        Extent(out)
    }

    pub fn number_of_points(&self) -> u64 {
        if self.is_empty() {
            return 0;
        }
        (0..3)
            .map(|axis| (self.0[2 * axis + 1] - self.0[2 * axis] + 1) as u64)
            .product()
    }
}

impl Default for Extent {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Debug for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Extent{:?}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        assert!(Extent::EMPTY.is_empty());
        assert!(!Extent::new(0, 0, 0, 0, 0, 0).is_empty());
        assert_eq!(Extent::EMPTY.number_of_points(), 0);
    }

    #[test]
    fn test_contains() {
        let whole = Extent::new(0, 9, 0, 9, 0, 0);
        assert!(whole.contains(&Extent::new(2, 5, 0, 9, 0, 0)));
        assert!(!whole.contains(&Extent::new(2, 10, 0, 9, 0, 0)));
        assert!(whole.contains(&Extent::EMPTY));
        assert!(!Extent::EMPTY.contains(&whole));
        assert_eq!(whole.number_of_points(), 100);
    }

    #[test]
    fn test_union() {
        let a = Extent::new(0, 2, 0, 0, 0, 0);
        let b = Extent::new(5, 7, 0, 3, 0, 0);
        assert_eq!(a.union(&b), Extent::new(0, 7, 0, 3, 0, 0));
        assert_eq!(a.union(&Extent::EMPTY), a);
        assert_eq!(Extent::EMPTY.union(&b), b);
    }
}
