//! EXPRESS schema declaration model.
//!
//! An in-memory representation of an EXPRESS schema (the data-modeling
//! language behind STEP and IFC files): type aliases, selects, enumerations,
//! and entities with single inheritance, attributes and inverse attributes.
//! Record readers and writers consult it to validate and interpret instances.
//!
//! # Usage
//!
//! ```rust
//! use express_schema::{
//!     Attribute, ParameterType, SchemaBuilder, SchemaConfig, SimpleType, TypeTable,
//! };
//!
//! let registry = TypeTable::new(["Base", "Derived"]);
//! let mut builder = SchemaBuilder::new(SchemaConfig::new("EXAMPLE"), &registry);
//!
//! let base = builder.add_entity("Base", None)?;
//! let derived = builder.add_entity("Derived", Some(base))?;
//! builder.set_attributes(
//!     base,
//!     vec![Attribute::new("a", ParameterType::simple(SimpleType::Integer))],
//!     vec![false],
//! )?;
//! builder.set_attributes(
//!     derived,
//!     vec![Attribute::new("b", ParameterType::simple(SimpleType::String))],
//!     vec![false],
//! )?;
//!
//! let schema = builder.build()?;
//! let derived = schema.entity_by_name("derived")?;
//! assert_eq!(derived.attribute_index_by_name("b"), Some(1));
//! # Ok::<(), express_schema::Error>(())
//! ```

pub mod error;
pub mod registry;
pub mod schema;

pub use error::Error;
pub use registry::{TypeCode, TypeRegistry, TypeTable};
pub use schema::{
    AggregationKind, AggregationType, Attribute, AttributeId, DeclId, Declaration,
    DeclarationKind, Entity, EntityRef, EnumerationType, InverseAggregation, InverseAttribute,
    Lineage, ParameterType, SchemaBuilder, SchemaConfig, SchemaDefinition, SelectType,
    SimpleType, TypeDeclaration,
};
