//! Entities, their attributes, and attribute resolution across supertypes.

use super::declaration::{DeclId, Declaration};
use super::types::ParameterType;
use super::SchemaDefinition;
use crate::registry::{eq_ignore_case, TypeCode};
use std::fmt;
use std::ptr;

/// An explicit attribute of an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    name: String,
    type_of_attribute: ParameterType,
    optional: bool,
}

impl Attribute {
    /// Create a required attribute.
    pub fn new(name: impl Into<String>, type_of_attribute: ParameterType) -> Self {
        Self {
            name: name.into(),
            type_of_attribute,
            optional: false,
        }
    }

    /// Create an optional attribute (value may be omitted in instances).
    pub fn optional(name: impl Into<String>, type_of_attribute: ParameterType) -> Self {
        Self {
            name: name.into(),
            type_of_attribute,
            optional: true,
        }
    }

    /// Attribute name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value type.
    pub fn type_of_attribute(&self) -> &ParameterType {
        &self.type_of_attribute
    }

    /// Check if the value may be absent.
    pub fn is_optional(&self) -> bool {
        self.optional
    }
}

/// Identity of an own attribute: the declaring entity and its local position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttributeId {
    entity: DeclId,
    index: usize,
}

impl AttributeId {
    /// Refer to the `index`-th own attribute of `entity`.
    pub fn new(entity: DeclId, index: usize) -> Self {
        Self { entity, index }
    }

    /// Declaring entity.
    pub fn entity(&self) -> DeclId {
        self.entity
    }

    /// Position among the declaring entity's own attributes.
    pub fn index(&self) -> usize {
        self.index
    }

    fn remap(self, map: &[DeclId]) -> Self {
        Self {
            entity: self.entity.remap(map),
            index: self.index,
        }
    }
}

/// Aggregation of an inverse attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InverseAggregation {
    /// BAG OF the referencing entity.
    Bag,
    /// SET OF the referencing entity.
    Set,
    /// A single reference.
    Unspecified,
}

/// A back-reference mirroring a forward attribute of another entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InverseAttribute {
    name: String,
    type_of_aggregation: InverseAggregation,
    bound1: i32,
    bound2: Option<i32>,
    entity_reference: DeclId,
    attribute_reference: AttributeId,
}

impl InverseAttribute {
    /// Create an inverse attribute over `entity_reference`, mirroring
    /// `attribute_reference`. Bounds default to `[0:?]`.
    pub fn new(
        name: impl Into<String>,
        type_of_aggregation: InverseAggregation,
        entity_reference: DeclId,
        attribute_reference: AttributeId,
    ) -> Self {
        Self {
            name: name.into(),
            type_of_aggregation,
            bound1: 0,
            bound2: None,
            entity_reference,
            attribute_reference,
        }
    }

    /// Set the cardinality bounds.
    pub fn with_bounds(mut self, bound1: i32, bound2: Option<i32>) -> Self {
        self.bound1 = bound1;
        self.bound2 = bound2;
        self
    }

    /// Attribute name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Aggregation kind.
    pub fn type_of_aggregation(&self) -> InverseAggregation {
        self.type_of_aggregation
    }

    /// Lower bound.
    pub fn bound1(&self) -> i32 {
        self.bound1
    }

    /// Upper bound, `None` when unbounded.
    pub fn bound2(&self) -> Option<i32> {
        self.bound2
    }

    /// Entity on the other side of the relationship.
    pub fn entity_reference(&self) -> DeclId {
        self.entity_reference
    }

    /// Forward attribute this inverse mirrors.
    pub fn attribute_reference(&self) -> AttributeId {
        self.attribute_reference
    }

    fn remap(&mut self, map: &[DeclId]) {
        self.entity_reference = self.entity_reference.remap(map);
        self.attribute_reference = self.attribute_reference.remap(map);
    }
}

/// An entity declaration with single inheritance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entity {
    supertype: Option<DeclId>,
    subtypes: Vec<DeclId>,
    attributes: Vec<Attribute>,
    derived: Vec<bool>,
    inverse_attributes: Vec<InverseAttribute>,
}

impl Entity {
    pub(crate) fn new(supertype: Option<DeclId>) -> Self {
        Self {
            supertype,
            ..Default::default()
        }
    }

    /// Direct supertype.
    pub fn supertype(&self) -> Option<DeclId> {
        self.supertype
    }

    /// Direct subtypes, in type code order unless listed explicitly.
    pub fn subtypes(&self) -> &[DeclId] {
        &self.subtypes
    }

    /// Own attributes, excluding inherited ones.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Derived flags, index-aligned with [`Entity::attributes`].
    pub fn derived(&self) -> &[bool] {
        &self.derived
    }

    /// Own inverse attributes.
    pub fn inverse_attributes(&self) -> &[InverseAttribute] {
        &self.inverse_attributes
    }

    pub(crate) fn set_subtypes(&mut self, subtypes: Vec<DeclId>) {
        self.subtypes = subtypes;
    }

    pub(crate) fn push_subtype(&mut self, subtype: DeclId) {
        self.subtypes.push(subtype);
    }

    pub(crate) fn set_attributes(&mut self, attributes: Vec<Attribute>, derived: Vec<bool>) {
        debug_assert_eq!(attributes.len(), derived.len());
        self.attributes = attributes;
        self.derived = derived;
    }

    pub(crate) fn set_inverse_attributes(&mut self, inverse_attributes: Vec<InverseAttribute>) {
        self.inverse_attributes = inverse_attributes;
    }

    pub(crate) fn for_each_reference(&self, f: &mut impl FnMut(DeclId)) {
        self.supertype.into_iter().for_each(&mut *f);
        self.subtypes.iter().copied().for_each(&mut *f);
        for attribute in &self.attributes {
            attribute.type_of_attribute.for_each_reference(f);
        }
        for inverse in &self.inverse_attributes {
            f(inverse.entity_reference);
            f(inverse.attribute_reference.entity);
        }
    }

    pub(crate) fn remap(&mut self, map: &[DeclId]) {
        self.supertype = self.supertype.map(|id| id.remap(map));
        for subtype in &mut self.subtypes {
            *subtype = subtype.remap(map);
        }
        for attribute in &mut self.attributes {
            attribute.type_of_attribute.remap(map);
        }
        for inverse in &mut self.inverse_attributes {
            inverse.remap(map);
        }
    }
}

/// An entity together with the schema it belongs to.
///
/// Supertype links are handles, so walking the inheritance chain needs the
/// owning schema. All attribute resolution lives here.
#[derive(Clone, Copy)]
pub struct EntityRef<'a> {
    schema: &'a SchemaDefinition,
    declaration: &'a Declaration,
    entity: &'a Entity,
}

impl<'a> EntityRef<'a> {
    pub(crate) fn new(schema: &'a SchemaDefinition, declaration: &'a Declaration) -> Option<Self> {
        let entity = declaration.as_entity()?;
        Some(Self {
            schema,
            declaration,
            entity,
        })
    }

    /// Handle of the entity.
    pub fn id(&self) -> DeclId {
        self.declaration.id()
    }

    /// Type code of the entity.
    pub fn code(&self) -> TypeCode {
        self.declaration.code()
    }

    /// Name of the entity.
    pub fn name(&self) -> &'a str {
        self.declaration.name()
    }

    /// The underlying declaration.
    pub fn declaration(&self) -> &'a Declaration {
        self.declaration
    }

    /// The entity data without schema context.
    pub fn entity(&self) -> &'a Entity {
        self.entity
    }

    /// The owning schema.
    pub fn schema(&self) -> &'a SchemaDefinition {
        self.schema
    }

    /// Direct supertype.
    pub fn supertype(&self) -> Option<EntityRef<'a>> {
        self.entity.supertype.and_then(|id| self.schema.entity(id))
    }

    /// Direct subtypes.
    pub fn subtypes(&self) -> impl Iterator<Item = EntityRef<'a>> + 'a {
        let schema = self.schema;
        self.entity
            .subtypes
            .iter()
            .filter_map(move |id| schema.entity(*id))
    }

    /// Own attributes.
    pub fn attributes(&self) -> &'a [Attribute] {
        &self.entity.attributes
    }

    /// Own derived flags.
    pub fn derived(&self) -> &'a [bool] {
        &self.entity.derived
    }

    /// Own inverse attributes.
    pub fn inverse_attributes(&self) -> &'a [InverseAttribute] {
        &self.entity.inverse_attributes
    }

    /// This entity followed by each supertype up to the root.
    pub fn lineage(&self) -> Lineage<'a> {
        Lineage { next: Some(*self) }
    }

    /// Check if this entity is, or derives from, the entity with `code`.
    pub fn is(&self, code: TypeCode) -> bool {
        self.lineage().any(|level| level.code() == code)
    }

    /// Check if this entity is, or derives from, the entity named `name`.
    pub fn is_named(&self, name: &str) -> bool {
        self.lineage().any(|level| eq_ignore_case(level.name(), name))
    }

    /// Inherited and own attributes, root supertype first.
    pub fn all_attributes(&self) -> Vec<&'a Attribute> {
        self.flatten(|entity| entity.attributes.as_slice())
    }

    /// Derived flags, index-aligned with [`EntityRef::all_attributes`].
    pub fn all_derived(&self) -> Vec<bool> {
        self.flatten(|entity| entity.derived.as_slice())
            .into_iter()
            .copied()
            .collect()
    }

    /// Inherited and own inverse attributes, root supertype first.
    pub fn all_inverse_attributes(&self) -> Vec<&'a InverseAttribute> {
        self.flatten(|entity| entity.inverse_attributes.as_slice())
    }

    /// Length of [`EntityRef::all_attributes`], without allocating.
    pub fn attribute_count(&self) -> usize {
        self.lineage()
            .map(|level| level.entity.attributes.len())
            .sum()
    }

    /// Attribute at a position of the flattened attribute list.
    pub fn attribute_at(&self, index: usize) -> Option<&'a Attribute> {
        // Distance from the end of the flattened list, where this entity's
        // own attributes sit.
        let mut from_end = self.attribute_count().checked_sub(index)?.checked_sub(1)?;
        for level in self.lineage() {
            let own = level.attributes();
            if from_end < own.len() {
                return own.get(own.len() - 1 - from_end);
            }
            from_end -= own.len();
        }
        None
    }

    /// Position of an attribute in [`EntityRef::all_attributes`], compared by identity.
    pub fn attribute_index(&self, attribute: &Attribute) -> Option<usize> {
        self.resolve_index(|level| {
            level
                .entity
                .attributes
                .iter()
                .position(|candidate| ptr::eq(candidate, attribute))
        })
    }

    /// Position of the nearest attribute called `name` (case-sensitive).
    pub fn attribute_index_by_name(&self, name: &str) -> Option<usize> {
        self.resolve_index(|level| {
            level
                .entity
                .attributes
                .iter()
                .position(|candidate| candidate.name == name)
        })
    }

    /// Position of the attribute identified by `id`.
    pub fn attribute_index_of(&self, id: AttributeId) -> Option<usize> {
        self.resolve_index(|level| {
            (level.id() == id.entity && id.index < level.entity.attributes.len())
                .then_some(id.index)
        })
    }

    /// The nearest attribute called `name` and its flattened position.
    pub fn attribute_by_name(&self, name: &str) -> Option<(usize, &'a Attribute)> {
        let index = self.attribute_index_by_name(name)?;
        self.attribute_at(index).map(|attribute| (index, attribute))
    }

    /// Find the first level (from this entity upward) where `find` matches and
    /// offset its local position by the attributes of every level above it.
    fn resolve_index(
        &self,
        mut find: impl FnMut(&EntityRef<'a>) -> Option<usize>,
    ) -> Option<usize> {
        let mut lineage = self.lineage();
        let local = lineage.by_ref().find_map(|level| find(&level))?;
        let inherited: usize = lineage.map(|level| level.entity.attributes.len()).sum();
        Some(inherited + local)
    }

    fn flatten<T: 'a>(&self, items: impl Fn(&'a Entity) -> &'a [T]) -> Vec<&'a T> {
        let levels: Vec<EntityRef<'a>> = self.lineage().collect();
        levels
            .iter()
            .rev()
            .flat_map(|level| items(level.entity))
            .collect()
    }
}

impl fmt::Debug for EntityRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityRef")
            .field("id", &self.id())
            .field("name", &self.name())
            .finish()
    }
}

impl PartialEq for EntityRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.schema, other.schema) && self.id() == other.id()
    }
}

impl Eq for EntityRef<'_> {}

/// Iterator over an entity and its supertypes, nearest first.
#[derive(Debug, Clone)]
pub struct Lineage<'a> {
    next: Option<EntityRef<'a>>,
}

impl<'a> Iterator for Lineage<'a> {
    type Item = EntityRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = current.supertype();
        Some(current)
    }
}
