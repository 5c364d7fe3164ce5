//! Schema declaration model.
//!
//! Declarations, their parameter types, and the schema definition that owns
//! them. A [`SchemaBuilder`] accumulates declarations during the build phase
//! and produces an immutable [`SchemaDefinition`] for the query phase.

mod builder;
mod config;
mod declaration;
mod definition;
mod entity;
mod types;

pub use builder::SchemaBuilder;
pub use config::SchemaConfig;
pub use declaration::{
    DeclId, Declaration, DeclarationKind, EnumerationType, SelectType, TypeDeclaration,
};
pub use definition::SchemaDefinition;
pub use entity::{
    Attribute, AttributeId, Entity, EntityRef, InverseAggregation, InverseAttribute, Lineage,
};
pub use types::{AggregationKind, AggregationType, ParameterType, ParameterTypeDisplay, SimpleType};
