//! Builder composition.
//!
//! A schema-derived builder is made of three parts:
//!
//! - a *state* type holding one field per declared property. A derived
//!   class's state holds its base class's state and its [`Populate`] impl
//!   runs the base first, so base fields are always assigned before derived
//!   ones;
//! - a [`Draft`] pairing that state with an optional pre-existing product
//!   (copy-then-modify);
//! - a [`ParentLink`] to the builder that opened it. `end()` hands the
//!   finished draft to the parent and returns the parent itself; `()` marks
//!   a top-level builder.
//!
//! `end()` and `build()` take `self`, so a builder cannot be touched after
//! it was handed over.

use std::any::type_name;

use tracing::debug;

/// Turns an accumulated builder into its product.
pub trait Build {
    /// Finished type.
    type Product;

    /// Consumes the builder.
    fn build(self) -> Self::Product;
}

/// Assigns the fields one builder level declares onto a product.
///
/// `T` is the product, or any type exposing the fields of the level (for
/// inherited levels this is usually a trait implemented by every derived
/// product).
pub trait Populate<T: ?Sized> {
    /// Writes every field that was set on the builder.
    fn populate(self, product: &mut T);
}

/// Builder state plus the product it will be applied to.
///
/// # Examples
///
/// ```
/// use partial_copy_core::{Build, Draft, Populate};
///
/// #[derive(Debug, Default, PartialEq, Clone)]
/// struct City {
///     town: Option<String>,
///     postal_code: Option<String>,
/// }
///
/// #[derive(Default)]
/// struct CityState {
///     town: Option<String>,
/// }
///
/// impl Populate<City> for CityState {
///     fn populate(self, product: &mut City) {
///         if let Some(town) = self.town {
///             product.town = Some(town);
///         }
///     }
/// }
///
/// let existing = City { town: Some("Porto".into()), postal_code: Some("4000".into()) };
/// let mut draft: Draft<CityState, City> = Draft::seeded(existing.clone());
/// draft.state_mut().town = Some("Braga".into());
///
/// let city = draft.build();
/// assert_eq!(city.town.as_deref(), Some("Braga"));
/// assert_eq!(city.postal_code, existing.postal_code);
/// ```
#[derive(Debug, Clone)]
pub struct Draft<S, T> {
    state: S,
    product: Option<T>,
}

impl<S: Default, T> Draft<S, T> {
    /// Draft building a fresh product.
    pub fn new() -> Self {
        Self {
            state: S::default(),
            product: None,
        }
    }

    /// Draft modifying `product`. Fields never set on the builder keep the
    /// product's values; a draft left untouched builds `product` unchanged.
    pub fn seeded(product: T) -> Self {
        Self {
            state: S::default(),
            product: Some(product),
        }
    }
}

impl<S: Default, T> Default for Draft<S, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, T> Draft<S, T> {
    /// Accumulated field values.
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Mutable access to the accumulated field values.
    pub fn state_mut(&mut self) -> &mut S {
        &mut self.state
    }

    /// Product being modified, if any.
    pub fn product(&self) -> Option<&T> {
        self.product.as_ref()
    }

    /// Returns `true` for a copy-then-modify draft.
    pub fn is_seeded(&self) -> bool {
        self.product.is_some()
    }
}

impl<S: Populate<T>, T: Default> Build for Draft<S, T> {
    type Product = T;

    fn build(self) -> T {
        let mut product = self.product.unwrap_or_default();
        self.state.populate(&mut product);
        product
    }
}

/// Builder field for a singular property whose type has its own builder.
#[derive(Debug, Clone)]
pub enum Slot<T, B> {
    /// Nothing assigned.
    Unset,
    /// A finished value.
    Value(T),
    /// A child builder, built when the owning builder is.
    Builder(B),
}

impl<T, B> Default for Slot<T, B> {
    fn default() -> Self {
        Self::Unset
    }
}

impl<T, B: Build<Product = T>> Slot<T, B> {
    /// Assigns a finished value, dropping any child builder.
    pub fn set(&mut self, value: T) {
        *self = Self::Value(value);
    }

    /// Stores a finished child builder.
    pub fn set_builder(&mut self, builder: B) {
        *self = Self::Builder(builder);
    }

    /// Takes the stored child builder back out, so that reopening a child
    /// continues where it left off.
    pub fn take_builder(&mut self) -> Option<B> {
        match std::mem::take(self) {
            Self::Builder(builder) => Some(builder),
            other => {
                *self = other;
                None
            }
        }
    }

    /// Returns `true` when anything was assigned.
    pub fn is_set(&self) -> bool {
        !matches!(self, Self::Unset)
    }

    /// Builds the slot's value, `None` when unset.
    pub fn resolve(self) -> Option<T> {
        match self {
            Self::Unset => None,
            Self::Value(value) => Some(value),
            Self::Builder(builder) => Some(builder.build()),
        }
    }
}

/// One element of a [`ListSlot`].
#[derive(Debug, Clone)]
pub enum Pending<T, B> {
    /// A finished element.
    Value(T),
    /// An element still to be built.
    Builder(B),
}

/// Builder field for a collection property.
///
/// An untouched list resolves to `None`, so a copy-then-modify builder keeps
/// the existing collection.
#[derive(Debug, Clone)]
pub struct ListSlot<T, B> {
    items: Vec<Pending<T, B>>,
    touched: bool,
}

impl<T, B> Default for ListSlot<T, B> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            touched: false,
        }
    }
}

impl<T, B: Build<Product = T>> ListSlot<T, B> {
    /// Replaces the whole collection.
    pub fn replace(&mut self, values: impl IntoIterator<Item = T>) {
        self.items = values.into_iter().map(Pending::Value).collect();
        self.touched = true;
    }

    /// Appends a value.
    pub fn add(&mut self, value: T) {
        self.items.push(Pending::Value(value));
        self.touched = true;
    }

    /// Appends several values.
    pub fn add_all(&mut self, values: impl IntoIterator<Item = T>) {
        self.items.extend(values.into_iter().map(Pending::Value));
        self.touched = true;
    }

    /// Appends an element built later.
    pub fn add_builder(&mut self, builder: B) {
        self.items.push(Pending::Builder(builder));
        self.touched = true;
    }

    /// Number of pending elements.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` when no element is pending.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns `true` once the list was assigned or appended to.
    pub fn is_touched(&self) -> bool {
        self.touched
    }

    /// Builds the collection in insertion order, `None` when untouched.
    pub fn resolve(self) -> Option<Vec<T>> {
        if !self.touched {
            return None;
        }
        let values = self
            .items
            .into_iter()
            .map(|item| match item {
                Pending::Value(value) => value,
                Pending::Builder(builder) => builder.build(),
            })
            .collect();
        Some(values)
    }
}

/// Link from a child builder back to the builder that opened it.
///
/// Holds the parent by value together with the function that stores the
/// finished child draft in it.
pub struct ParentLink<P, S> {
    parent: P,
    attach: fn(&mut P, S),
}

fn detach<S>(_: &mut (), _: S) {}

impl<S> ParentLink<(), S> {
    /// Link of a top-level builder.
    pub fn detached() -> Self {
        Self {
            parent: (),
            attach: detach::<S>,
        }
    }
}

impl<S> Default for ParentLink<(), S> {
    fn default() -> Self {
        Self::detached()
    }
}

impl<P, S> ParentLink<P, S> {
    /// Link to `parent`; `attach` stores the finished child in it.
    pub fn new(parent: P, attach: fn(&mut P, S)) -> Self {
        Self { parent, attach }
    }

    /// The parent builder.
    pub fn parent(&self) -> &P {
        &self.parent
    }

    /// Hands `child` to the parent and returns the parent.
    pub fn finish(self, child: S) -> P {
        let Self { mut parent, attach } = self;
        attach(&mut parent, child);
        debug!(
            parent = type_name::<P>(),
            child = type_name::<S>(),
            "child builder attached"
        );
        parent
    }
}

impl<P: std::fmt::Debug, S> std::fmt::Debug for ParentLink<P, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParentLink")
            .field("parent", &self.parent)
            .finish()
    }
}
