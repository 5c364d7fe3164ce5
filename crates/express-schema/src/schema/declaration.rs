//! Top-level schema declarations.

use super::entity::Entity;
use super::types::ParameterType;
use crate::registry::TypeCode;
use std::fmt;

/// Handle of a declaration within its schema.
///
/// Handles issued by a [`SchemaBuilder`](super::SchemaBuilder) are remapped to
/// positions in the code-sorted declaration list when the schema is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeclId(u32);

impl DeclId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index as u32)
    }

    /// Position of the declaration in its schema.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub(crate) fn remap(self, map: &[DeclId]) -> DeclId {
        map[self.index()]
    }
}

impl fmt::Display for DeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A named alias for a parameter type (`TYPE Label = STRING;`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDeclaration {
    declared_type: ParameterType,
}

impl TypeDeclaration {
    pub(crate) fn new(declared_type: ParameterType) -> Self {
        Self { declared_type }
    }

    /// The underlying value type.
    pub fn declared_type(&self) -> &ParameterType {
        &self.declared_type
    }
}

/// A tagged union over other declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectType {
    select_list: Vec<DeclId>,
}

impl SelectType {
    pub(crate) fn new(select_list: Vec<DeclId>) -> Self {
        Self { select_list }
    }

    /// Member declarations, in declaration order.
    pub fn select_list(&self) -> &[DeclId] {
        &self.select_list
    }

    /// Check if a declaration is a direct member of this select.
    pub fn contains(&self, id: DeclId) -> bool {
        self.select_list.contains(&id)
    }
}

/// An enumeration of case-sensitive item names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumerationType {
    items: Vec<String>,
}

impl EnumerationType {
    pub(crate) fn new(items: Vec<String>) -> Self {
        Self { items }
    }

    /// Item names in declaration order.
    pub fn enumeration_items(&self) -> &[String] {
        &self.items
    }

    /// Position of an item, which is how enumeration values are stored.
    pub fn item_index(&self, name: &str) -> Option<usize> {
        self.items.iter().position(|item| item == name)
    }

    /// Item name at a position.
    pub fn item(&self, index: usize) -> Option<&str> {
        self.items.get(index).map(String::as_str)
    }
}

/// The variant-specific part of a declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclarationKind {
    /// Type alias.
    Type(TypeDeclaration),
    /// Select type.
    Select(SelectType),
    /// Enumeration type.
    Enumeration(EnumerationType),
    /// Entity.
    Entity(Entity),
}

impl DeclarationKind {
    /// EXPRESS keyword naming the kind.
    pub fn keyword(&self) -> &'static str {
        match self {
            DeclarationKind::Type(_) => "TYPE",
            DeclarationKind::Select(_) => "SELECT",
            DeclarationKind::Enumeration(_) => "ENUMERATION",
            DeclarationKind::Entity(_) => "ENTITY",
        }
    }
}

/// A top-level schema item identified by its type code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    id: DeclId,
    code: TypeCode,
    name: String,
    kind: DeclarationKind,
}

impl Declaration {
    pub(crate) fn new(id: DeclId, code: TypeCode, name: String, kind: DeclarationKind) -> Self {
        Self {
            id,
            code,
            name,
            kind,
        }
    }

    /// Handle of this declaration within its schema.
    pub fn id(&self) -> DeclId {
        self.id
    }

    /// Canonical type code.
    pub fn code(&self) -> TypeCode {
        self.code
    }

    /// Canonical name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The variant-specific part.
    pub fn kind(&self) -> &DeclarationKind {
        &self.kind
    }

    /// Narrow to a type declaration.
    pub fn as_type_declaration(&self) -> Option<&TypeDeclaration> {
        match &self.kind {
            DeclarationKind::Type(declaration) => Some(declaration),
            _ => None,
        }
    }

    /// Narrow to a select type.
    pub fn as_select_type(&self) -> Option<&SelectType> {
        match &self.kind {
            DeclarationKind::Select(select) => Some(select),
            _ => None,
        }
    }

    /// Narrow to an enumeration type.
    pub fn as_enumeration_type(&self) -> Option<&EnumerationType> {
        match &self.kind {
            DeclarationKind::Enumeration(enumeration) => Some(enumeration),
            _ => None,
        }
    }

    /// Narrow to an entity.
    pub fn as_entity(&self) -> Option<&Entity> {
        match &self.kind {
            DeclarationKind::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    pub(crate) fn kind_mut(&mut self) -> &mut DeclarationKind {
        &mut self.kind
    }

    pub(crate) fn as_entity_mut(&mut self) -> Option<&mut Entity> {
        match &mut self.kind {
            DeclarationKind::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    /// Visit every declaration handle this declaration refers to.
    pub(crate) fn for_each_reference(&self, f: &mut impl FnMut(DeclId)) {
        match &self.kind {
            DeclarationKind::Type(declaration) => declaration.declared_type.for_each_reference(f),
            DeclarationKind::Select(select) => select.select_list.iter().copied().for_each(f),
            DeclarationKind::Enumeration(_) => {}
            DeclarationKind::Entity(entity) => entity.for_each_reference(f),
        }
    }

    /// Move this declaration to a new position, rewriting every handle it holds.
    pub(crate) fn remap(&mut self, map: &[DeclId]) {
        self.id = self.id.remap(map);
        match &mut self.kind {
            DeclarationKind::Type(declaration) => declaration.declared_type.remap(map),
            DeclarationKind::Select(select) => {
                for member in &mut select.select_list {
                    *member = member.remap(map);
                }
            }
            DeclarationKind::Enumeration(_) => {}
            DeclarationKind::Entity(entity) => entity.remap(map),
        }
    }
}
