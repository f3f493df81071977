//! Typed keys for `Information` maps.
//!
//! A key fixes the Rust type of the value stored under it, so call sites never
//! pick a type themselves. Two keys are the same slot when their
//! `(location, name)` pair matches.

use crate::data::{DataKind, DataObjectRef, Extent, FieldRequirement};
use crate::information::{InfoValue, Information};
use std::fmt;
use std::marker::PhantomData;

/// Identity of a key slot, independent of its value type.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyId {
    pub location: &'static str,
    pub name: &'static str,
}

impl fmt::Debug for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.location, self.name)
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A named slot whose values are always of type `T`.
pub struct InformationKey<T> {
    id: KeyId,
    _marker: PhantomData<fn() -> T>,
}

impl<T> InformationKey<T> {
    pub const fn new(name: &'static str, location: &'static str) -> Self {
        Self {
            id: KeyId { location, name },
            _marker: PhantomData,
        }
    }

    #[inline]
    pub fn id(&self) -> KeyId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.id.name
    }

    #[inline]
    pub fn location(&self) -> &'static str {
        self.id.location
    }
}

// Manual impls: deriving would require `T: Clone`.
impl<T> Clone for InformationKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for InformationKey<T> {}

impl<T> fmt::Debug for InformationKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InformationKey({})", self.id)
    }
}

/// Marker value for request keys: presence is the whole payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Request;

/// Types that can live in an `Information` slot.
pub trait InfoType: Sized + 'static {
    fn into_value(self) -> InfoValue;
    fn from_value(value: &InfoValue) -> Option<&Self>;
}

macro_rules! info_type {
    ($ty:ty, $variant:ident) => {
        impl InfoType for $ty {
            #[inline]
            fn into_value(self) -> InfoValue {
                InfoValue::$variant(self)
            }

            #[inline]
            fn from_value(value: &InfoValue) -> Option<&Self> {
                match value {
                    InfoValue::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }
    };
}

info_type!(bool, Bool);
info_type!(i64, Integer);
info_type!(Vec<i64>, IntegerVector);
info_type!(f64, Double);
info_type!(Vec<f64>, DoubleVector);
info_type!(String, String);
info_type!(Vec<String>, StringVector);
info_type!(Extent, Extent);
info_type!(DataKind, Kind);
info_type!(Vec<DataKind>, Kinds);
info_type!(DataObjectRef, DataObject);
info_type!(Vec<FieldRequirement>, Fields);
info_type!(Vec<Information>, InformationVector);

impl InfoType for Request {
    #[inline]
    fn into_value(self) -> InfoValue {
        InfoValue::Request
    }

    #[inline]
    fn from_value(value: &InfoValue) -> Option<&Self> {
        static MARKER: Request = Request;
        match value {
            InfoValue::Request => Some(&MARKER),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: InformationKey<i64> = InformationKey::new("A", "Test");
    const A_AGAIN: InformationKey<i64> = InformationKey::new("A", "Test");
    const A_ELSEWHERE: InformationKey<i64> = InformationKey::new("A", "Other");

    #[test]
    fn test_key_identity() {
        assert_eq!(A.id(), A_AGAIN.id());
        assert_ne!(A.id(), A_ELSEWHERE.id());
        assert_eq!(A.id().to_string(), "Test::A");
    }

    #[test]
    fn test_value_round_trip_by_type() {
        let value = 7i64.into_value();
        assert_eq!(i64::from_value(&value), Some(&7));
        assert!(f64::from_value(&value).is_none());
        assert!(Request::from_value(&InfoValue::Request).is_some());
    }
}
