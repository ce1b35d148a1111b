//! Travel model written the way schema-derived classes wire themselves to
//! the copy, selector and builder protocols.
//!
//! ```text
//! Person   { name }
//! Tourist  extends Person { destination, address: Address, visited: [City],
//!                           tags: [string], souvenir: Postcard | Magnet,
//!                           passport: Passport }
//! Address  { street, city: City }
//! City     { town, postalCode }
//! Postcard { text, stamp }
//! Magnet   { shape, city: City }
//! Passport { number }              (copyable, not partially copyable)
//! ```

#![allow(dead_code)]

use std::collections::BTreeSet;
use std::ops::Deref;

use partial_copy_core::{
    Build, Buildable, CopyScope, Copyable, DeepCopy, Draft, ListSlot, ParentLink,
    PartialCopyable, Populate, Result, RootSelector, SelectionMode, SelectionTree,
    SelectorGraph, SelectorNode, Slot, deep_copy_via_copyable, deep_copy_via_partial,
};

// ---------------------------------------------------------------------------
// City
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct City {
    pub town: Option<String>,
    pub postal_code: Option<String>,
}

impl City {
    pub const PROPERTIES: &'static [&'static str] = &["town", "postalCode"];
}

impl Copyable for City {
    fn create_copy(&self) -> Self {
        City {
            town: self.town.deep_copy(),
            postal_code: self.postal_code.deep_copy(),
        }
    }
}

impl PartialCopyable for City {
    fn copy_within(&self, scope: CopyScope<'_>) -> Result<Self> {
        scope.check("City", Self::PROPERTIES)?;
        Ok(City {
            town: scope.field_or_default("town", &self.town)?,
            postal_code: scope.field_or_default("postalCode", &self.postal_code)?,
        })
    }
}

deep_copy_via_partial!(City);

#[derive(Debug, Default)]
pub struct CityState {
    town: Option<String>,
    postal_code: Option<String>,
}

impl Populate<City> for CityState {
    fn populate(self, product: &mut City) {
        if let Some(town) = self.town {
            product.town = Some(town);
        }
        if let Some(postal_code) = self.postal_code {
            product.postal_code = Some(postal_code);
        }
    }
}

pub type CityDraft = Draft<CityState, City>;

pub struct CityBuilder<P = ()> {
    link: ParentLink<P, CityDraft>,
    draft: CityDraft,
}

impl<P> CityBuilder<P> {
    pub fn child(parent: P, draft: CityDraft, attach: fn(&mut P, CityDraft)) -> Self {
        Self {
            link: ParentLink::new(parent, attach),
            draft,
        }
    }

    pub fn town(mut self, town: impl Into<String>) -> Self {
        self.draft.state_mut().town = Some(town.into());
        self
    }

    pub fn postal_code(mut self, postal_code: impl Into<String>) -> Self {
        self.draft.state_mut().postal_code = Some(postal_code.into());
        self
    }

    pub fn end(self) -> P {
        self.link.finish(self.draft)
    }

    pub fn build(self) -> City {
        self.draft.build()
    }
}

impl Buildable for City {
    type Builder = CityBuilder;

    fn builder() -> CityBuilder {
        CityBuilder {
            link: ParentLink::detached(),
            draft: Draft::new(),
        }
    }

    fn new_copy_builder(&self) -> CityBuilder {
        CityBuilder {
            link: ParentLink::detached(),
            draft: Draft::seeded(self.create_copy()),
        }
    }
}

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Address {
    pub street: Option<String>,
    pub city: Option<City>,
}

impl Address {
    pub const PROPERTIES: &'static [&'static str] = &["street", "city"];
}

impl Copyable for Address {
    fn create_copy(&self) -> Self {
        Address {
            street: self.street.deep_copy(),
            city: self.city.deep_copy(),
        }
    }
}

impl PartialCopyable for Address {
    fn copy_within(&self, scope: CopyScope<'_>) -> Result<Self> {
        scope.check("Address", Self::PROPERTIES)?;
        Ok(Address {
            street: scope.field_or_default("street", &self.street)?,
            city: scope.field_or_default("city", &self.city)?,
        })
    }
}

deep_copy_via_partial!(Address);

#[derive(Debug, Default)]
pub struct AddressState {
    street: Option<String>,
    city: Slot<City, CityDraft>,
}

impl Populate<Address> for AddressState {
    fn populate(self, product: &mut Address) {
        if let Some(street) = self.street {
            product.street = Some(street);
        }
        if let Some(city) = self.city.resolve() {
            product.city = Some(city);
        }
    }
}

pub type AddressDraft = Draft<AddressState, Address>;

pub struct AddressBuilder<P = ()> {
    link: ParentLink<P, AddressDraft>,
    draft: AddressDraft,
}

impl<P> AddressBuilder<P> {
    pub fn child(parent: P, draft: AddressDraft, attach: fn(&mut P, AddressDraft)) -> Self {
        Self {
            link: ParentLink::new(parent, attach),
            draft,
        }
    }

    pub fn street(mut self, street: impl Into<String>) -> Self {
        self.draft.state_mut().street = Some(street.into());
        self
    }

    pub fn city(mut self, city: City) -> Self {
        self.draft.state_mut().city.set(city);
        self
    }

    pub fn with_city(mut self) -> CityBuilder<Self> {
        let draft = match self.draft.state_mut().city.take_builder() {
            Some(draft) => draft,
            None => match self.draft.product().and_then(|a| a.city.clone()) {
                Some(city) => Draft::seeded(city),
                None => Draft::new(),
            },
        };
        CityBuilder::child(self, draft, |parent, city| {
            parent.draft.state_mut().city.set_builder(city);
        })
    }

    pub fn end(self) -> P {
        self.link.finish(self.draft)
    }

    pub fn build(self) -> Address {
        self.draft.build()
    }
}

impl Buildable for Address {
    type Builder = AddressBuilder;

    fn builder() -> AddressBuilder {
        AddressBuilder {
            link: ParentLink::detached(),
            draft: Draft::new(),
        }
    }

    fn new_copy_builder(&self) -> AddressBuilder {
        AddressBuilder {
            link: ParentLink::detached(),
            draft: Draft::seeded(self.create_copy()),
        }
    }
}

// ---------------------------------------------------------------------------
// Souvenir (choice of Postcard | Magnet)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Postcard {
    pub text: Option<String>,
    pub stamp: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Magnet {
    pub shape: Option<String>,
    pub city: Option<City>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Souvenir {
    Postcard(Postcard),
    Magnet(Magnet),
}

impl Souvenir {
    /// Union of the alternatives' properties.
    pub const PROPERTIES: &'static [&'static str] = &["text", "stamp", "shape", "city"];
}

impl Copyable for Souvenir {
    fn create_copy(&self) -> Self {
        match self {
            Souvenir::Postcard(p) => Souvenir::Postcard(Postcard {
                text: p.text.deep_copy(),
                stamp: p.stamp.deep_copy(),
            }),
            Souvenir::Magnet(m) => Souvenir::Magnet(Magnet {
                shape: m.shape.deep_copy(),
                city: m.city.deep_copy(),
            }),
        }
    }
}

impl PartialCopyable for Souvenir {
    fn copy_within(&self, scope: CopyScope<'_>) -> Result<Self> {
        scope.check("Souvenir", Self::PROPERTIES)?;
        Ok(match self {
            Souvenir::Postcard(p) => Souvenir::Postcard(Postcard {
                text: scope.field_or_default("text", &p.text)?,
                stamp: scope.field_or_default("stamp", &p.stamp)?,
            }),
            Souvenir::Magnet(m) => Souvenir::Magnet(Magnet {
                shape: scope.field_or_default("shape", &m.shape)?,
                city: scope.field_or_default("city", &m.city)?,
            }),
        })
    }
}

deep_copy_via_partial!(Souvenir);

// ---------------------------------------------------------------------------
// Passport
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Passport {
    pub number: String,
}

impl Copyable for Passport {
    fn create_copy(&self) -> Self {
        Passport {
            number: self.number.clone(),
        }
    }
}

deep_copy_via_copyable!(Passport);

// ---------------------------------------------------------------------------
// Person
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Person {
    pub name: Option<String>,
}

impl Person {
    pub const PROPERTIES: &'static [&'static str] = &["name"];

    /// Copies the fields Person declares; the caller checked the scope.
    fn copy_fields_within(&self, scope: CopyScope<'_>) -> Result<Person> {
        Ok(Person {
            name: scope.field_or_default("name", &self.name)?,
        })
    }
}

impl Copyable for Person {
    fn create_copy(&self) -> Self {
        Person {
            name: self.name.deep_copy(),
        }
    }
}

impl PartialCopyable for Person {
    fn copy_within(&self, scope: CopyScope<'_>) -> Result<Self> {
        scope.check("Person", Self::PROPERTIES)?;
        self.copy_fields_within(scope)
    }
}

pub trait PersonFields {
    fn set_name(&mut self, name: String);
}

impl PersonFields for Person {
    fn set_name(&mut self, name: String) {
        self.name = Some(name);
    }
}

#[derive(Debug, Default)]
pub struct PersonState {
    name: Option<String>,
}

impl<T: PersonFields> Populate<T> for PersonState {
    fn populate(self, product: &mut T) {
        if let Some(name) = self.name {
            product.set_name(name);
        }
    }
}

// ---------------------------------------------------------------------------
// Tourist
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tourist {
    pub person: Person,
    pub destination: Option<String>,
    pub address: Option<Address>,
    pub visited: Vec<City>,
    pub tags: Vec<String>,
    pub souvenir: Option<Souvenir>,
    pub passport: Option<Passport>,
}

impl Tourist {
    pub const PROPERTIES: &'static [&'static str] = &[
        "name",
        "destination",
        "address",
        "visited",
        "tags",
        "souvenir",
        "passport",
    ];
}

impl PersonFields for Tourist {
    fn set_name(&mut self, name: String) {
        self.person.set_name(name);
    }
}

impl Copyable for Tourist {
    fn create_copy(&self) -> Self {
        Tourist {
            person: self.person.create_copy(),
            destination: self.destination.deep_copy(),
            address: self.address.deep_copy(),
            visited: self.visited.deep_copy(),
            tags: self.tags.deep_copy(),
            souvenir: self.souvenir.deep_copy(),
            passport: self.passport.deep_copy(),
        }
    }
}

impl PartialCopyable for Tourist {
    fn copy_within(&self, scope: CopyScope<'_>) -> Result<Self> {
        scope.check("Tourist", Self::PROPERTIES)?;
        Ok(Tourist {
            person: self.person.copy_fields_within(scope)?,
            destination: scope.field_or_default("destination", &self.destination)?,
            address: scope.field_or_default("address", &self.address)?,
            visited: scope.field_or_default("visited", &self.visited)?,
            tags: scope.field_or_default("tags", &self.tags)?,
            souvenir: scope.field_or_default("souvenir", &self.souvenir)?,
            passport: scope.field_or_default("passport", &self.passport)?,
        })
    }
}

deep_copy_via_partial!(Tourist);

#[derive(Debug, Default)]
pub struct TouristState {
    person: PersonState,
    destination: Option<String>,
    address: Slot<Address, AddressDraft>,
    visited: ListSlot<City, CityDraft>,
    tags: Option<Vec<String>>,
    souvenir: Option<Souvenir>,
    passport: Option<Passport>,
}

impl Populate<Tourist> for TouristState {
    fn populate(self, product: &mut Tourist) {
        self.person.populate(product);
        if let Some(destination) = self.destination {
            product.destination = Some(destination);
        }
        if let Some(address) = self.address.resolve() {
            product.address = Some(address);
        }
        if let Some(visited) = self.visited.resolve() {
            product.visited = visited;
        }
        if let Some(tags) = self.tags {
            product.tags = tags;
        }
        if let Some(souvenir) = self.souvenir {
            product.souvenir = Some(souvenir);
        }
        if let Some(passport) = self.passport {
            product.passport = Some(passport);
        }
    }
}

pub type TouristDraft = Draft<TouristState, Tourist>;

pub struct TouristBuilder<P = ()> {
    link: ParentLink<P, TouristDraft>,
    draft: TouristDraft,
}

impl<P> TouristBuilder<P> {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.draft.state_mut().person.name = Some(name.into());
        self
    }

    pub fn destination(mut self, destination: impl Into<String>) -> Self {
        self.draft.state_mut().destination = Some(destination.into());
        self
    }

    pub fn address(mut self, address: Address) -> Self {
        self.draft.state_mut().address.set(address);
        self
    }

    pub fn with_address(mut self) -> AddressBuilder<Self> {
        let draft = match self.draft.state_mut().address.take_builder() {
            Some(draft) => draft,
            None => match self.draft.product().and_then(|t| t.address.clone()) {
                Some(address) => Draft::seeded(address),
                None => Draft::new(),
            },
        };
        AddressBuilder::child(self, draft, |parent, address| {
            parent.draft.state_mut().address.set_builder(address);
        })
    }

    pub fn visited(mut self, cities: impl IntoIterator<Item = City>) -> Self {
        self.draft.state_mut().visited.replace(cities);
        self
    }

    pub fn add_visited(mut self, city: City) -> Self {
        self.draft.state_mut().visited.add(city);
        self
    }

    pub fn add_all_visited(mut self, cities: impl IntoIterator<Item = City>) -> Self {
        self.draft.state_mut().visited.add_all(cities);
        self
    }

    pub fn add_visited_city(self) -> CityBuilder<Self> {
        CityBuilder::child(self, Draft::new(), |parent, city| {
            parent.draft.state_mut().visited.add_builder(city);
        })
    }

    pub fn add_tag(mut self, tag: impl Into<String>) -> Self {
        self.draft
            .state_mut()
            .tags
            .get_or_insert_with(Vec::new)
            .push(tag.into());
        self
    }

    pub fn souvenir(mut self, souvenir: Souvenir) -> Self {
        self.draft.state_mut().souvenir = Some(souvenir);
        self
    }

    pub fn passport(mut self, passport: Passport) -> Self {
        self.draft.state_mut().passport = Some(passport);
        self
    }

    pub fn pending_visits(&self) -> usize {
        self.draft.state().visited.len()
    }

    pub fn end(self) -> P {
        self.link.finish(self.draft)
    }

    pub fn build(self) -> Tourist {
        self.draft.build()
    }
}

impl Buildable for Tourist {
    type Builder = TouristBuilder;

    fn builder() -> TouristBuilder {
        TouristBuilder {
            link: ParentLink::detached(),
            draft: Draft::new(),
        }
    }

    fn new_copy_builder(&self) -> TouristBuilder {
        TouristBuilder {
            link: ParentLink::detached(),
            draft: Draft::seeded(self.create_copy()),
        }
    }
}

// ---------------------------------------------------------------------------
// Selectors
// ---------------------------------------------------------------------------

/// Selector for a property without selectable children.
pub struct LeafSelector<R, P> {
    node: SelectorNode<R, P>,
}

macro_rules! selector_common {
    ($name:ident) => {
        impl<R, P: Clone> Clone for $name<R, P> {
            fn clone(&self) -> Self {
                Self {
                    node: self.node.clone(),
                }
            }
        }

        impl<R: RootSelector, P> $name<R, P> {
            pub fn node(&self) -> &SelectorNode<R, P> {
                &self.node
            }

            pub fn parent(&self) -> &P {
                self.node.parent()
            }

            pub fn root(&self) -> R {
                self.node.root_selector()
            }

            pub fn build(&self) -> SelectionTree {
                self.node.build()
            }
        }
    };
}

selector_common!(LeafSelector);

pub struct CitySelector<R, P> {
    node: SelectorNode<R, P>,
}

selector_common!(CitySelector);

impl<R: RootSelector, P: Clone> CitySelector<R, P> {
    pub fn town(&self) -> LeafSelector<R, Self> {
        LeafSelector {
            node: self.node.child("town", self.clone()),
        }
    }

    pub fn postal_code(&self) -> LeafSelector<R, Self> {
        LeafSelector {
            node: self.node.child("postalCode", self.clone()),
        }
    }
}

pub struct AddressSelector<R, P> {
    node: SelectorNode<R, P>,
}

selector_common!(AddressSelector);

impl<R: RootSelector, P: Clone> AddressSelector<R, P> {
    pub fn street(&self) -> LeafSelector<R, Self> {
        LeafSelector {
            node: self.node.child("street", self.clone()),
        }
    }

    pub fn city(&self) -> CitySelector<R, Self> {
        CitySelector {
            node: self.node.child("city", self.clone()),
        }
    }
}

/// Offers the properties of every alternative of the choice.
pub struct SouvenirSelector<R, P> {
    node: SelectorNode<R, P>,
}

selector_common!(SouvenirSelector);

impl<R: RootSelector, P: Clone> SouvenirSelector<R, P> {
    pub fn text(&self) -> LeafSelector<R, Self> {
        LeafSelector {
            node: self.node.child("text", self.clone()),
        }
    }

    pub fn stamp(&self) -> LeafSelector<R, Self> {
        LeafSelector {
            node: self.node.child("stamp", self.clone()),
        }
    }

    pub fn shape(&self) -> LeafSelector<R, Self> {
        LeafSelector {
            node: self.node.child("shape", self.clone()),
        }
    }

    pub fn city(&self) -> CitySelector<R, Self> {
        CitySelector {
            node: self.node.child("city", self.clone()),
        }
    }
}

pub struct TouristSelector<R, P> {
    node: SelectorNode<R, P>,
}

selector_common!(TouristSelector);

impl<R: RootSelector, P: Clone> TouristSelector<R, P> {
    pub fn name(&self) -> LeafSelector<R, Self> {
        LeafSelector {
            node: self.node.child("name", self.clone()),
        }
    }

    pub fn destination(&self) -> LeafSelector<R, Self> {
        LeafSelector {
            node: self.node.child("destination", self.clone()),
        }
    }

    pub fn address(&self) -> AddressSelector<R, Self> {
        AddressSelector {
            node: self.node.child("address", self.clone()),
        }
    }

    pub fn visited(&self) -> CitySelector<R, Self> {
        CitySelector {
            node: self.node.child("visited", self.clone()),
        }
    }

    pub fn tags(&self) -> LeafSelector<R, Self> {
        LeafSelector {
            node: self.node.child("tags", self.clone()),
        }
    }

    pub fn souvenir(&self) -> SouvenirSelector<R, Self> {
        SouvenirSelector {
            node: self.node.child("souvenir", self.clone()),
        }
    }

    pub fn passport(&self) -> LeafSelector<R, Self> {
        LeafSelector {
            node: self.node.child("passport", self.clone()),
        }
    }
}

/// Root selector for [`Tourist`].
#[derive(Clone)]
pub struct TouristSelect(TouristSelector<TouristSelect, ()>);

impl TouristSelect {
    pub fn new() -> Self {
        Self::root(SelectionMode::Include)
    }
}

impl RootSelector for TouristSelect {
    fn from_graph(graph: SelectorGraph) -> Self {
        TouristSelect(TouristSelector {
            node: SelectorNode::root(graph),
        })
    }
}

impl Deref for TouristSelect {
    type Target = TouristSelector<TouristSelect, ()>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub fn porto() -> City {
    City {
        town: Some("Porto".into()),
        postal_code: Some("4000".into()),
    }
}

pub fn sample_tourist() -> Tourist {
    Tourist {
        person: Person {
            name: Some("Ada".into()),
        },
        destination: Some("Lisbon".into()),
        address: Some(Address {
            street: Some("Rua das Flores".into()),
            city: Some(porto()),
        }),
        visited: vec![
            porto(),
            City {
                town: Some("Braga".into()),
                postal_code: None,
            },
        ],
        tags: vec!["beach".into(), "food".into()],
        souvenir: Some(Souvenir::Magnet(Magnet {
            shape: Some("tram".into()),
            city: Some(porto()),
        })),
        passport: Some(Passport {
            number: "P-123".into(),
        }),
    }
}

fn city_paths(prefix: &str, city: &City, out: &mut BTreeSet<String>) {
    if city.town.is_some() {
        out.insert(format!("{prefix}.town"));
    }
    if city.postal_code.is_some() {
        out.insert(format!("{prefix}.postalCode"));
    }
}

/// Leaf property paths holding a value; collection elements share a path.
pub fn populated_paths(tourist: &Tourist) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    if tourist.person.name.is_some() {
        out.insert("name".to_string());
    }
    if tourist.destination.is_some() {
        out.insert("destination".to_string());
    }
    if let Some(address) = &tourist.address {
        if address.street.is_some() {
            out.insert("address.street".to_string());
        }
        if let Some(city) = &address.city {
            city_paths("address.city", city, &mut out);
        }
    }
    for city in &tourist.visited {
        city_paths("visited", city, &mut out);
    }
    if !tourist.tags.is_empty() {
        out.insert("tags".to_string());
    }
    match &tourist.souvenir {
        Some(Souvenir::Postcard(p)) => {
            if p.text.is_some() {
                out.insert("souvenir.text".to_string());
            }
            if p.stamp.is_some() {
                out.insert("souvenir.stamp".to_string());
            }
        }
        Some(Souvenir::Magnet(m)) => {
            if m.shape.is_some() {
                out.insert("souvenir.shape".to_string());
            }
            if let Some(city) = &m.city {
                city_paths("souvenir.city", city, &mut out);
            }
        }
        None => {}
    }
    if tourist.passport.is_some() {
        out.insert("passport".to_string());
    }
    out
}

pub fn tree(mode: SelectionMode, paths: &[&str]) -> SelectionTree {
    SelectionTree::from_paths(mode, paths.iter().copied())
}

/// Builds a detached city through the builder protocol.
pub fn built_city(town: &str) -> City {
    City::builder().town(town).build()
}
