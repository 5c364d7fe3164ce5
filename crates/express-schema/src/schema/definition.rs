//! Immutable schema definition and its lookup structures.

use super::declaration::{DeclId, Declaration, DeclarationKind};
use super::entity::{Attribute, AttributeId, EntityRef};
use super::SchemaConfig;
use crate::error::Error;
use crate::registry::{cmp_ignore_case, TypeCode};
use tracing::debug;

/// All declarations of one schema, sorted by type code.
///
/// Built once by a [`SchemaBuilder`](super::SchemaBuilder) and never mutated
/// afterwards, so it can be shared between threads for concurrent reads.
#[derive(Debug, Clone)]
pub struct SchemaDefinition {
    name: String,
    built_in: bool,
    declarations: Vec<Declaration>,
    type_declarations: Vec<DeclId>,
    select_types: Vec<DeclId>,
    enumeration_types: Vec<DeclId>,
    entities: Vec<DeclId>,
    /// Handles sorted case-insensitively by declaration name.
    by_name: Vec<DeclId>,
}

impl SchemaDefinition {
    /// Assemble a schema from validated declarations already sorted by code,
    /// each holding its final handle. Names must be unique ignoring case.
    pub(crate) fn from_sorted(config: SchemaConfig, declarations: Vec<Declaration>) -> Self {
        let mut type_declarations = Vec::new();
        let mut select_types = Vec::new();
        let mut enumeration_types = Vec::new();
        let mut entities = Vec::new();

        for declaration in &declarations {
            let view = match declaration.kind() {
                DeclarationKind::Type(_) => &mut type_declarations,
                DeclarationKind::Select(_) => &mut select_types,
                DeclarationKind::Enumeration(_) => &mut enumeration_types,
                DeclarationKind::Entity(_) => &mut entities,
            };
            view.push(declaration.id());
        }

        let mut by_name: Vec<DeclId> = declarations.iter().map(Declaration::id).collect();
        by_name.sort_by(|a, b| {
            cmp_ignore_case(declarations[a.index()].name(), declarations[b.index()].name())
        });

        Self {
            name: config.name,
            built_in: config.built_in,
            declarations,
            type_declarations,
            select_types,
            enumeration_types,
            entities,
            by_name,
        }
    }

    /// Schema name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check if type codes index the declaration list directly.
    pub fn is_built_in(&self) -> bool {
        self.built_in
    }

    /// Number of declarations.
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    /// Check if the schema has no declarations.
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// All declarations, sorted by type code.
    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    /// Resolve a handle.
    ///
    /// # Panics
    ///
    /// Panics if the handle was not issued for this schema.
    pub fn declaration(&self, id: DeclId) -> &Declaration {
        &self.declarations[id.index()]
    }

    /// Handles of type declarations, in code order.
    pub fn type_declaration_ids(&self) -> &[DeclId] {
        &self.type_declarations
    }

    /// Handles of select types, in code order.
    pub fn select_type_ids(&self) -> &[DeclId] {
        &self.select_types
    }

    /// Handles of enumeration types, in code order.
    pub fn enumeration_type_ids(&self) -> &[DeclId] {
        &self.enumeration_types
    }

    /// Handles of entities, in code order.
    pub fn entity_ids(&self) -> &[DeclId] {
        &self.entities
    }

    /// Type declarations, in code order.
    pub fn type_declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.resolve_all(&self.type_declarations)
    }

    /// Select types, in code order.
    pub fn select_types(&self) -> impl Iterator<Item = &Declaration> {
        self.resolve_all(&self.select_types)
    }

    /// Enumeration types, in code order.
    pub fn enumeration_types(&self) -> impl Iterator<Item = &Declaration> {
        self.resolve_all(&self.enumeration_types)
    }

    /// Entities, in code order.
    pub fn entities(&self) -> impl Iterator<Item = EntityRef<'_>> {
        self.entities.iter().filter_map(|id| self.entity(*id))
    }

    /// Look up a declaration by name, ignoring case.
    pub fn declaration_by_name(&self, name: &str) -> Result<&Declaration, Error> {
        self.by_name
            .binary_search_by(|id| cmp_ignore_case(self.declaration(*id).name(), name))
            .map(|position| self.declaration(self.by_name[position]))
            .map_err(|_| {
                debug!(schema = %self.name, lookup = name, "declaration lookup failed");
                Error::DeclarationNotFound {
                    name: name.to_string(),
                }
            })
    }

    /// Look up an entity by name, ignoring case.
    pub fn entity_by_name(&self, name: &str) -> Result<EntityRef<'_>, Error> {
        let declaration = self.declaration_by_name(name)?;
        EntityRef::new(self, declaration).ok_or_else(|| Error::KindMismatch {
            name: declaration.name().to_string(),
            expected: "ENTITY",
            found: declaration.kind().keyword(),
        })
    }

    /// Look up a declaration of a built-in schema by type code in constant time.
    ///
    /// # Panics
    ///
    /// Panics if the schema is not built-in or the code is out of range.
    pub fn declaration_by_code(&self, code: TypeCode) -> &Declaration {
        assert!(
            self.built_in,
            "lookup by type code requires a built-in schema, '{}' is not",
            self.name
        );
        &self.declarations[code.index()]
    }

    /// Look up a declaration by type code in any schema.
    pub fn try_declaration_by_code(&self, code: TypeCode) -> Option<&Declaration> {
        if self.built_in {
            return self.declarations.get(code.index());
        }
        self.declarations
            .binary_search_by_key(&code, Declaration::code)
            .ok()
            .map(|position| &self.declarations[position])
    }

    /// View a declaration as an entity.
    pub fn entity(&self, id: DeclId) -> Option<EntityRef<'_>> {
        EntityRef::new(self, self.declarations.get(id.index())?)
    }

    /// Check if a declaration is, or derives from, the declaration with `code`.
    ///
    /// # Panics
    ///
    /// Panics if the handle was not issued for this schema.
    pub fn is(&self, id: DeclId, code: TypeCode) -> bool {
        match self.entity(id) {
            Some(entity) => entity.is(code),
            None => self.declaration(id).code() == code,
        }
    }

    /// Check if a declaration is, or derives from, the declaration named `name`.
    ///
    /// # Panics
    ///
    /// Panics if the handle was not issued for this schema.
    pub fn is_named(&self, id: DeclId, name: &str) -> bool {
        match self.entity(id) {
            Some(entity) => entity.is_named(name),
            None => cmp_ignore_case(self.declaration(id).name(), name).is_eq(),
        }
    }

    /// Resolve an attribute handle.
    pub fn attribute(&self, id: AttributeId) -> Option<&Attribute> {
        self.entity(id.entity())?.attributes().get(id.index())
    }

    fn resolve_all<'a>(&'a self, ids: &'a [DeclId]) -> impl Iterator<Item = &'a Declaration> {
        ids.iter().map(move |id| self.declaration(*id))
    }
}
