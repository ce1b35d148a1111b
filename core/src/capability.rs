//! Capability contracts implemented by schema-derived types.
//!
//! These traits are the boundary between this crate and the classes a
//! schema produces: copy implementations call into [`CopyScope`] and
//! [`DeepCopy`](crate::DeepCopy), builders are reached through
//! [`Buildable`].

use crate::decision::CopyScope;
use crate::error::Result;
use crate::tree::{SelectionMode, SelectionTree};

/// Unconditional deep copy.
pub trait Copyable: Sized {
    /// Returns a deep copy of `self`.
    fn create_copy(&self) -> Self;
}

/// Deep copy filtered by a [`SelectionTree`].
///
/// Implementors provide [`copy_within`](Self::copy_within): check the scope
/// against the class's properties with [`CopyScope::check`], then copy each
/// property through [`CopyScope::field`].
///
/// # Examples
///
/// ```
/// use partial_copy_core::*;
///
/// #[derive(Debug, Clone, Default, PartialEq)]
/// struct City {
///     town: Option<String>,
///     postal_code: Option<String>,
/// }
///
/// impl Copyable for City {
///     fn create_copy(&self) -> Self {
///         City {
///             town: self.town.deep_copy(),
///             postal_code: self.postal_code.deep_copy(),
///         }
///     }
/// }
///
/// impl PartialCopyable for City {
///     fn copy_within(&self, scope: CopyScope<'_>) -> Result<Self> {
///         scope.check("City", &["town", "postalCode"])?;
///         Ok(City {
///             town: scope.field_or_default("town", &self.town)?,
///             postal_code: scope.field_or_default("postalCode", &self.postal_code)?,
///         })
///     }
/// }
///
/// let city = City { town: Some("Porto".into()), postal_code: Some("4000".into()) };
/// let only_town = city
///     .copy_only(&SelectionTree::from_paths(SelectionMode::Include, ["town"]))
///     .unwrap();
/// assert_eq!(only_town, City { town: Some("Porto".into()), postal_code: None });
/// ```
pub trait PartialCopyable: Copyable {
    /// Copies `self` at the given position of a selection.
    fn copy_within(&self, scope: CopyScope<'_>) -> Result<Self>;

    /// Copies `self` keeping or dropping the properties named in `tree`.
    fn create_copy_with(&self, tree: &SelectionTree, mode: SelectionMode) -> Result<Self> {
        self.copy_within(CopyScope::new(tree, mode))
    }

    /// Copies everything except the leaves of `tree`.
    fn copy_except(&self, tree: &SelectionTree) -> Result<Self> {
        self.create_copy_with(tree, SelectionMode::Exclude)
    }

    /// Copies only what `tree` selects.
    fn copy_only(&self, tree: &SelectionTree) -> Result<Self> {
        self.create_copy_with(tree, SelectionMode::Include)
    }
}

/// Access to a type's builder.
pub trait Buildable: Sized {
    /// Builder producing `Self`.
    type Builder;

    /// Returns a builder that starts from an empty product.
    fn builder() -> Self::Builder;

    /// Returns a builder seeded with a copy of `self`; fields left untouched
    /// on the builder keep their current values.
    fn new_copy_builder(&self) -> Self::Builder;
}
