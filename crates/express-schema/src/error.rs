//! Schema model error types.

use crate::registry::TypeCode;
use crate::schema::DeclId;
use thiserror::Error;

/// Errors raised while building or querying a schema definition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// No declaration with this name exists in the schema.
    #[error("declaration '{name}' not found")]
    DeclarationNotFound {
        /// The name that was looked up.
        name: String,
    },

    /// The type registry has no code for this name.
    #[error("unknown type name '{0}'")]
    UnknownTypeName(String),

    /// Two declarations were registered under the same type code.
    #[error("duplicate type code {code} for '{name}'")]
    DuplicateTypeCode {
        /// The code declared twice.
        code: TypeCode,
        /// Name of the second declaration.
        name: String,
    },

    /// Two declarations share a name (compared case-insensitively).
    #[error("duplicate declaration name '{0}'")]
    DuplicateName(String),

    /// A declaration was used where a different kind was required.
    #[error("declaration '{name}' is {found}, expected {expected}")]
    KindMismatch {
        /// Name of the offending declaration.
        name: String,
        /// Kind that was required.
        expected: &'static str,
        /// Kind the declaration actually has.
        found: &'static str,
    },

    /// A handle does not belong to this schema.
    #[error("unknown declaration handle {0}")]
    UnknownDeclaration(DeclId),

    /// Attribute and derived-flag lists of an entity differ in length.
    #[error("entity '{entity}' has {attributes} attributes but {derived} derived flags")]
    DerivedFlagMismatch {
        /// Entity name.
        entity: String,
        /// Number of attributes supplied.
        attributes: usize,
        /// Number of derived flags supplied.
        derived: usize,
    },

    /// A built-in schema must use every code in `0..n` exactly once.
    #[error("built-in schema codes must be dense: expected {expected}, found {found}")]
    SparseBuiltInCodes {
        /// Code expected at this position.
        expected: TypeCode,
        /// Code actually present.
        found: TypeCode,
    },

    /// An inverse attribute points at something that cannot be its forward side.
    #[error("invalid inverse attribute '{attribute}' on '{entity}': {reason}")]
    InvalidInverseAttribute {
        /// Entity declaring the inverse attribute.
        entity: String,
        /// Inverse attribute name.
        attribute: String,
        /// What is wrong with it.
        reason: String,
    },

    /// An explicit subtype list names an entity that does not inherit from the owner.
    #[error("'{subtype}' is listed as a subtype of '{entity}' but does not inherit from it")]
    InconsistentSubtype {
        /// Entity owning the subtype list.
        entity: String,
        /// The listed entity.
        subtype: String,
    },

    /// An explicit subtype list names the same entity twice.
    #[error("'{subtype}' is listed more than once as a subtype of '{entity}'")]
    DuplicateSubtype {
        /// Entity owning the subtype list.
        entity: String,
        /// The repeated entity.
        subtype: String,
    },

    /// An explicit subtype list omits an entity that inherits from the owner.
    #[error("'{subtype}' inherits from '{entity}' but is missing from its subtype list")]
    MissingSubtype {
        /// Entity owning the subtype list.
        entity: String,
        /// The omitted entity.
        subtype: String,
    },
}
