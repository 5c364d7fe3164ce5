//! Two-phase construction of schema definitions.

use super::declaration::{
    DeclId, Declaration, DeclarationKind, EnumerationType, SelectType, TypeDeclaration,
};
use super::entity::{Attribute, Entity, InverseAttribute};
use super::types::ParameterType;
use super::{SchemaConfig, SchemaDefinition};
use crate::error::Error;
use crate::registry::{cmp_ignore_case, eq_ignore_case, TypeCode, TypeRegistry};
use std::collections::{HashMap, HashSet};
use std::iter;
use tracing::{debug, instrument, warn};

/// Accumulates declarations and their wiring, then produces an immutable
/// [`SchemaDefinition`].
///
/// Declarations may reference each other in any order: contents that point
/// forward (attributes, select members, underlying types) can be set after
/// all declarations have been added. Supertypes are the exception and must
/// be added before their subtypes, which keeps every inheritance chain
/// acyclic.
pub struct SchemaBuilder<'r> {
    config: SchemaConfig,
    registry: &'r dyn TypeRegistry,
    declarations: Vec<Declaration>,
    codes: HashMap<TypeCode, DeclId>,
    explicit_subtypes: HashSet<DeclId>,
}

impl<'r> SchemaBuilder<'r> {
    /// Start a schema whose names are resolved through `registry`.
    pub fn new(config: SchemaConfig, registry: &'r dyn TypeRegistry) -> Self {
        Self {
            config,
            registry,
            declarations: Vec::new(),
            codes: HashMap::new(),
            explicit_subtypes: HashSet::new(),
        }
    }

    /// Number of declarations added so far.
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    /// Check if nothing has been added yet.
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Add a type alias.
    pub fn add_type_declaration(
        &mut self,
        name: &str,
        declared_type: ParameterType,
    ) -> Result<DeclId, Error> {
        let declaration = TypeDeclaration::new(declared_type);
        self.declare(name, DeclarationKind::Type(declaration))
    }

    /// Add a select type over existing or later declarations.
    pub fn add_select_type(
        &mut self,
        name: &str,
        select_list: Vec<DeclId>,
    ) -> Result<DeclId, Error> {
        self.declare(name, DeclarationKind::Select(SelectType::new(select_list)))
    }

    /// Add an enumeration type.
    pub fn add_enumeration_type<I, S>(&mut self, name: &str, items: I) -> Result<DeclId, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let enumeration = EnumerationType::new(items.into_iter().map(Into::into).collect());
        self.declare(name, DeclarationKind::Enumeration(enumeration))
    }

    /// Add an entity. The supertype, if any, must already be an entity of
    /// this builder.
    pub fn add_entity(&mut self, name: &str, supertype: Option<DeclId>) -> Result<DeclId, Error> {
        if let Some(supertype) = supertype {
            self.expect_kind(supertype, "ENTITY")?;
        }
        self.declare(name, DeclarationKind::Entity(Entity::new(supertype)))
    }

    /// Replace the underlying type of a type declaration.
    pub fn set_declared_type(
        &mut self,
        id: DeclId,
        declared_type: ParameterType,
    ) -> Result<(), Error> {
        self.expect_kind(id, "TYPE")?;
        if let DeclarationKind::Type(declaration) = self.declarations[id.index()].kind_mut() {
            *declaration = TypeDeclaration::new(declared_type);
        }
        Ok(())
    }

    /// Replace the members of a select type.
    pub fn set_select_list(&mut self, id: DeclId, select_list: Vec<DeclId>) -> Result<(), Error> {
        self.expect_kind(id, "SELECT")?;
        if let DeclarationKind::Select(select) = self.declarations[id.index()].kind_mut() {
            *select = SelectType::new(select_list);
        }
        Ok(())
    }

    /// Set the own attributes of an entity and their derived flags.
    pub fn set_attributes(
        &mut self,
        id: DeclId,
        attributes: Vec<Attribute>,
        derived: Vec<bool>,
    ) -> Result<(), Error> {
        let declaration = self.expect_kind(id, "ENTITY")?;
        if attributes.len() != derived.len() {
            return Err(Error::DerivedFlagMismatch {
                entity: declaration.name().to_string(),
                attributes: attributes.len(),
                derived: derived.len(),
            });
        }
        if let Some(entity) = self.declarations[id.index()].as_entity_mut() {
            entity.set_attributes(attributes, derived);
        }
        Ok(())
    }

    /// Set the own inverse attributes of an entity.
    pub fn set_inverse_attributes(
        &mut self,
        id: DeclId,
        inverse_attributes: Vec<InverseAttribute>,
    ) -> Result<(), Error> {
        self.expect_kind(id, "ENTITY")?;
        if let Some(entity) = self.declarations[id.index()].as_entity_mut() {
            entity.set_inverse_attributes(inverse_attributes);
        }
        Ok(())
    }

    /// List the direct subtypes of an entity explicitly.
    ///
    /// Entities without an explicit list get one derived from supertype links
    /// when the schema is built.
    pub fn set_subtypes(&mut self, id: DeclId, subtypes: Vec<DeclId>) -> Result<(), Error> {
        self.expect_kind(id, "ENTITY")?;
        if let Some(entity) = self.declarations[id.index()].as_entity_mut() {
            entity.set_subtypes(subtypes);
        }
        self.explicit_subtypes.insert(id);
        Ok(())
    }

    /// Validate the accumulated declarations and freeze them into a schema.
    ///
    /// Declarations are sorted by type code and every handle issued by this
    /// builder is rewritten to its final position.
    #[instrument(skip(self), fields(schema = %self.config.name))]
    pub fn build(self) -> Result<SchemaDefinition, Error> {
        if let Err(error) = self.validate() {
            warn!(%error, "schema validation failed");
            return Err(error);
        }

        let SchemaBuilder {
            config,
            mut declarations,
            explicit_subtypes,
            ..
        } = self;

        let mut order: Vec<usize> = (0..declarations.len()).collect();
        order.sort_by_key(|&index| declarations[index].code());
        let mut map = vec![DeclId::new(0); declarations.len()];
        for (position, &index) in order.iter().enumerate() {
            map[index] = DeclId::new(position);
        }

        for declaration in &mut declarations {
            declaration.remap(&map);
        }
        declarations.sort_by_key(Declaration::id);

        let explicit: HashSet<DeclId> =
            explicit_subtypes.iter().map(|id| id.remap(&map)).collect();
        for position in 0..declarations.len() {
            let supertype = declarations[position]
                .as_entity()
                .and_then(Entity::supertype)
                .filter(|supertype| !explicit.contains(supertype));
            if let Some(supertype) = supertype {
                if let Some(parent) = declarations[supertype.index()].as_entity_mut() {
                    parent.push_subtype(DeclId::new(position));
                }
            }
        }

        let schema = SchemaDefinition::from_sorted(config, declarations);
        debug!(
            declarations = schema.len(),
            type_declarations = schema.type_declaration_ids().len(),
            select_types = schema.select_type_ids().len(),
            enumeration_types = schema.enumeration_type_ids().len(),
            entities = schema.entity_ids().len(),
            built_in = schema.is_built_in(),
            "schema built"
        );
        Ok(schema)
    }

    fn declare(&mut self, name: &str, kind: DeclarationKind) -> Result<DeclId, Error> {
        let code = self.registry.from_name(name)?;
        let name = self.registry.to_name(code).unwrap_or(name).to_string();
        if self.codes.contains_key(&code) {
            return Err(Error::DuplicateTypeCode { code, name });
        }

        let id = DeclId::new(self.declarations.len());
        self.declarations.push(Declaration::new(id, code, name, kind));
        self.codes.insert(code, id);
        Ok(id)
    }

    fn expect_kind(&self, id: DeclId, expected: &'static str) -> Result<&Declaration, Error> {
        let declaration = self
            .declarations
            .get(id.index())
            .ok_or(Error::UnknownDeclaration(id))?;
        let found = declaration.kind().keyword();
        if found != expected {
            return Err(Error::KindMismatch {
                name: declaration.name().to_string(),
                expected,
                found,
            });
        }
        Ok(declaration)
    }

    /// An entity followed by its supertypes. Supertypes are always added
    /// first, so the walk terminates.
    fn ancestry(&self, id: DeclId) -> impl Iterator<Item = DeclId> + '_ {
        iter::successors(Some(id), move |current| {
            self.declarations
                .get(current.index())
                .and_then(Declaration::as_entity)
                .and_then(Entity::supertype)
        })
    }

    fn validate(&self) -> Result<(), Error> {
        if self.config.built_in {
            let mut codes: Vec<TypeCode> = self.codes.keys().copied().collect();
            codes.sort();
            for (position, code) in codes.into_iter().enumerate() {
                let expected = TypeCode::new(position as u32);
                if code != expected {
                    return Err(Error::SparseBuiltInCodes {
                        expected,
                        found: code,
                    });
                }
            }
        }

        let mut names: Vec<&str> = self.declarations.iter().map(Declaration::name).collect();
        names.sort_by(|a, b| cmp_ignore_case(a, b));
        if let Some(pair) = names.windows(2).find(|pair| eq_ignore_case(pair[0], pair[1])) {
            return Err(Error::DuplicateName(pair[1].to_string()));
        }

        let count = self.declarations.len();
        for declaration in &self.declarations {
            let mut unknown = None;
            declaration.for_each_reference(&mut |id| {
                if id.index() >= count {
                    unknown.get_or_insert(id);
                }
            });
            if let Some(id) = unknown {
                return Err(Error::UnknownDeclaration(id));
            }
        }

        for declaration in &self.declarations {
            let Some(entity) = declaration.as_entity() else {
                continue;
            };
            if self.explicit_subtypes.contains(&declaration.id()) {
                self.validate_subtypes(declaration, entity)?;
            }
            for inverse in entity.inverse_attributes() {
                self.validate_inverse(declaration, inverse)?;
            }
        }

        Ok(())
    }

    fn validate_subtypes(&self, declaration: &Declaration, entity: &Entity) -> Result<(), Error> {
        let mut listed = HashSet::new();
        for subtype in entity.subtypes() {
            let candidate = &self.declarations[subtype.index()];
            let inherits = candidate
                .as_entity()
                .is_some_and(|candidate| candidate.supertype() == Some(declaration.id()));
            if !inherits {
                return Err(Error::InconsistentSubtype {
                    entity: declaration.name().to_string(),
                    subtype: candidate.name().to_string(),
                });
            }
            if !listed.insert(*subtype) {
                return Err(Error::DuplicateSubtype {
                    entity: declaration.name().to_string(),
                    subtype: candidate.name().to_string(),
                });
            }
        }

        let missing = self.declarations.iter().find(|candidate| {
            candidate.as_entity().and_then(Entity::supertype) == Some(declaration.id())
                && !listed.contains(&candidate.id())
        });
        if let Some(missing) = missing {
            return Err(Error::MissingSubtype {
                entity: declaration.name().to_string(),
                subtype: missing.name().to_string(),
            });
        }
        Ok(())
    }

    fn validate_inverse(
        &self,
        declaration: &Declaration,
        inverse: &InverseAttribute,
    ) -> Result<(), Error> {
        let invalid = |reason: String| Error::InvalidInverseAttribute {
            entity: declaration.name().to_string(),
            attribute: inverse.name().to_string(),
            reason,
        };

        let target = &self.declarations[inverse.entity_reference().index()];
        if target.as_entity().is_none() {
            return Err(invalid(format!("'{}' is not an entity", target.name())));
        }

        let forward = inverse.attribute_reference();
        if !self.ancestry(target.id()).any(|id| id == forward.entity()) {
            return Err(invalid(format!(
                "forward attribute is not declared on '{}' or its supertypes",
                target.name()
            )));
        }

        let owner = &self.declarations[forward.entity().index()];
        let own_attributes = owner.as_entity().map_or(0, |entity| entity.attributes().len());
        if forward.index() >= own_attributes {
            return Err(invalid(format!(
                "'{}' has no attribute at position {}",
                owner.name(),
                forward.index()
            )));
        }
        Ok(())
    }
}
