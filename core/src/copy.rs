//! Deep-copy dispatch.
//!
//! [`DeepCopy`] is implemented by every type that can appear as a property
//! value. The implementation picks one of the dispatch rules:
//!
//! - collections and `Option` copy element-wise, handing the same scope to
//!   each element (`None` elements stay `None`);
//! - [`PartialCopyable`](crate::PartialCopyable) types continue the partial
//!   copy below themselves ([`deep_copy_via_partial!`]);
//! - types that are only [`Copyable`](crate::Copyable) ignore the selection
//!   below them and copy in full ([`deep_copy_via_copyable!`]);
//! - plain values are cloned ([`deep_copy_by_value!`]).

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use crate::decision::CopyScope;
use crate::error::Result;

/// A value that can be copied as part of a structural copy.
pub trait DeepCopy: Sized {
    /// Unfiltered deep copy.
    fn deep_copy(&self) -> Self;

    /// Copy below a property the selection included. The default ignores the
    /// selection, which is right for every type that cannot be partially
    /// copied.
    fn deep_copy_within(&self, _scope: CopyScope<'_>) -> Result<Self> {
        Ok(self.deep_copy())
    }
}

/// Implements [`DeepCopy`] by cloning, for immutable or plain value types.
#[macro_export]
macro_rules! deep_copy_by_value {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::DeepCopy for $ty {
                fn deep_copy(&self) -> Self {
                    ::std::clone::Clone::clone(self)
                }
            }
        )+
    };
}

/// Implements [`DeepCopy`] through [`Copyable`](crate::Copyable) for types
/// that cannot be partially copied.
#[macro_export]
macro_rules! deep_copy_via_copyable {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::DeepCopy for $ty {
                fn deep_copy(&self) -> Self {
                    $crate::Copyable::create_copy(self)
                }
            }
        )+
    };
}

/// Implements [`DeepCopy`] through
/// [`PartialCopyable`](crate::PartialCopyable), continuing the selection
/// below the value.
#[macro_export]
macro_rules! deep_copy_via_partial {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::DeepCopy for $ty {
                fn deep_copy(&self) -> Self {
                    $crate::Copyable::create_copy(self)
                }

                fn deep_copy_within(
                    &self,
                    scope: $crate::CopyScope<'_>,
                ) -> $crate::Result<Self> {
                    if scope.is_full() {
                        Ok($crate::Copyable::create_copy(self))
                    } else {
                        $crate::PartialCopyable::copy_within(self, scope)
                    }
                }
            }
        )+
    };
}

deep_copy_by_value!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
    String, ()
);

impl<T: DeepCopy> DeepCopy for Option<T> {
    fn deep_copy(&self) -> Self {
        self.as_ref().map(T::deep_copy)
    }

    fn deep_copy_within(&self, scope: CopyScope<'_>) -> Result<Self> {
        self.as_ref().map(|v| v.deep_copy_within(scope)).transpose()
    }
}

impl<T: DeepCopy> DeepCopy for Box<T> {
    fn deep_copy(&self) -> Self {
        Box::new(T::deep_copy(self))
    }

    fn deep_copy_within(&self, scope: CopyScope<'_>) -> Result<Self> {
        T::deep_copy_within(self, scope).map(Box::new)
    }
}

impl<T: DeepCopy> DeepCopy for Vec<T> {
    fn deep_copy(&self) -> Self {
        self.iter().map(T::deep_copy).collect()
    }

    fn deep_copy_within(&self, scope: CopyScope<'_>) -> Result<Self> {
        self.iter().map(|v| v.deep_copy_within(scope)).collect()
    }
}

impl<K: Ord + Clone, V: DeepCopy> DeepCopy for BTreeMap<K, V> {
    fn deep_copy(&self) -> Self {
        self.iter().map(|(k, v)| (k.clone(), v.deep_copy())).collect()
    }

    fn deep_copy_within(&self, scope: CopyScope<'_>) -> Result<Self> {
        self.iter()
            .map(|(k, v)| Ok((k.clone(), v.deep_copy_within(scope)?)))
            .collect()
    }
}

impl<K: Eq + Hash + Clone, V: DeepCopy> DeepCopy for HashMap<K, V> {
    fn deep_copy(&self) -> Self {
        self.iter().map(|(k, v)| (k.clone(), v.deep_copy())).collect()
    }

    fn deep_copy_within(&self, scope: CopyScope<'_>) -> Result<Self> {
        self.iter()
            .map(|(k, v)| Ok((k.clone(), v.deep_copy_within(scope)?)))
            .collect()
    }
}
