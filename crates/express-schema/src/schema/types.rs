//! Parameter types: the value shape of attributes and type declarations.

use super::{DeclId, SchemaDefinition};
use crate::registry::TypeCode;
use std::fmt;

/// Primitive EXPRESS data types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimpleType {
    /// Bit sequence.
    Binary,
    /// TRUE or FALSE.
    Boolean,
    /// Whole number.
    Integer,
    /// TRUE, FALSE or UNKNOWN.
    Logical,
    /// Any numeric value.
    Number,
    /// Floating point value.
    Real,
    /// Character string.
    String,
}

impl SimpleType {
    /// All simple types in declaration order.
    pub const ALL: [SimpleType; 7] = [
        SimpleType::Binary,
        SimpleType::Boolean,
        SimpleType::Integer,
        SimpleType::Logical,
        SimpleType::Number,
        SimpleType::Real,
        SimpleType::String,
    ];

    /// The EXPRESS keyword for this type.
    pub fn keyword(&self) -> &'static str {
        match self {
            SimpleType::Binary => "BINARY",
            SimpleType::Boolean => "BOOLEAN",
            SimpleType::Integer => "INTEGER",
            SimpleType::Logical => "LOGICAL",
            SimpleType::Number => "NUMBER",
            SimpleType::Real => "REAL",
            SimpleType::String => "STRING",
        }
    }

    /// Check if this type is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            SimpleType::Integer | SimpleType::Number | SimpleType::Real
        )
    }
}

impl fmt::Display for SimpleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Collection kinds of an aggregation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregationKind {
    /// Fixed-index collection.
    Array,
    /// Unordered collection allowing duplicates.
    Bag,
    /// Ordered collection.
    List,
    /// Unordered collection without duplicates.
    Set,
}

impl AggregationKind {
    /// The EXPRESS keyword for this kind.
    pub fn keyword(&self) -> &'static str {
        match self {
            AggregationKind::Array => "ARRAY",
            AggregationKind::Bag => "BAG",
            AggregationKind::List => "LIST",
            AggregationKind::Set => "SET",
        }
    }
}

impl fmt::Display for AggregationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// An aggregate of elements with cardinality bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationType {
    kind: AggregationKind,
    bound1: i32,
    bound2: Option<i32>,
    element: Box<ParameterType>,
}

impl AggregationType {
    /// Create an aggregation. An upper bound of `-1` means unbounded.
    pub fn new(kind: AggregationKind, bound1: i32, bound2: i32, element: ParameterType) -> Self {
        let bound2 = (bound2 != -1).then_some(bound2);
        Self::bounded(kind, bound1, bound2, element)
    }

    /// Create an aggregation with an explicit optional upper bound.
    pub fn bounded(
        kind: AggregationKind,
        bound1: i32,
        bound2: Option<i32>,
        element: ParameterType,
    ) -> Self {
        Self {
            kind,
            bound1,
            bound2,
            element: Box::new(element),
        }
    }

    /// Kind of collection.
    pub fn type_of_aggregation(&self) -> AggregationKind {
        self.kind
    }

    /// Lower bound.
    pub fn bound1(&self) -> i32 {
        self.bound1
    }

    /// Upper bound, `None` when unbounded.
    pub fn bound2(&self) -> Option<i32> {
        self.bound2
    }

    /// Check if the aggregation has no upper bound.
    pub fn is_unbounded(&self) -> bool {
        self.bound2.is_none()
    }

    /// Type of the elements, possibly another aggregation.
    pub fn type_of_element(&self) -> &ParameterType {
        &self.element
    }

    /// Number of nested aggregation levels, 1 for a flat collection.
    pub fn depth(&self) -> usize {
        1 + self
            .element
            .as_aggregation_type()
            .map_or(0, AggregationType::depth)
    }

    /// The first non-aggregate type found by descending through element types.
    pub fn innermost_element(&self) -> &ParameterType {
        match self.element.as_aggregation_type() {
            Some(inner) => inner.innermost_element(),
            None => &self.element,
        }
    }
}

/// Value type of an attribute or type declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterType {
    /// A primitive type.
    Simple(SimpleType),
    /// A reference to another declaration of the schema.
    Named(DeclId),
    /// A collection of another parameter type.
    Aggregation(AggregationType),
}

impl ParameterType {
    /// Create a simple parameter type.
    pub fn simple(simple: SimpleType) -> Self {
        ParameterType::Simple(simple)
    }

    /// Create a named parameter type.
    pub fn named(declaration: DeclId) -> Self {
        ParameterType::Named(declaration)
    }

    /// Create an aggregation parameter type. An upper bound of `-1` means unbounded.
    pub fn aggregation(
        kind: AggregationKind,
        bound1: i32,
        bound2: i32,
        element: ParameterType,
    ) -> Self {
        ParameterType::Aggregation(AggregationType::new(kind, bound1, bound2, element))
    }

    /// Narrow to a simple type.
    pub fn as_simple_type(&self) -> Option<SimpleType> {
        match self {
            ParameterType::Simple(simple) => Some(*simple),
            _ => None,
        }
    }

    /// Narrow to a named type.
    pub fn as_named_type(&self) -> Option<DeclId> {
        match self {
            ParameterType::Named(id) => Some(*id),
            _ => None,
        }
    }

    /// Narrow to an aggregation type.
    pub fn as_aggregation_type(&self) -> Option<&AggregationType> {
        match self {
            ParameterType::Aggregation(aggregation) => Some(aggregation),
            _ => None,
        }
    }

    /// Check if this is a named type whose declaration is, or derives from, `code`.
    pub fn is(&self, schema: &SchemaDefinition, code: TypeCode) -> bool {
        self.as_named_type().is_some_and(|id| schema.is(id, code))
    }

    /// Check if this is a named type whose declaration is, or derives from, `name`.
    pub fn is_named(&self, schema: &SchemaDefinition, name: &str) -> bool {
        self.as_named_type().is_some_and(|id| schema.is_named(id, name))
    }

    /// Render the type in EXPRESS notation, resolving names through `schema`.
    pub fn display<'a>(&'a self, schema: &'a SchemaDefinition) -> ParameterTypeDisplay<'a> {
        ParameterTypeDisplay { ty: self, schema }
    }

    /// Visit every declaration handle referenced by this type.
    pub(crate) fn for_each_reference(&self, f: &mut impl FnMut(DeclId)) {
        match self {
            ParameterType::Simple(_) => {}
            ParameterType::Named(id) => f(*id),
            ParameterType::Aggregation(aggregation) => aggregation.element.for_each_reference(f),
        }
    }

    pub(crate) fn remap(&mut self, map: &[DeclId]) {
        match self {
            ParameterType::Simple(_) => {}
            ParameterType::Named(id) => *id = id.remap(map),
            ParameterType::Aggregation(aggregation) => aggregation.element.remap(map),
        }
    }
}

/// EXPRESS rendering of a [`ParameterType`], e.g. `LIST [1:?] OF IfcCartesianPoint`.
pub struct ParameterTypeDisplay<'a> {
    ty: &'a ParameterType,
    schema: &'a SchemaDefinition,
}

impl fmt::Display for ParameterTypeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ty {
            ParameterType::Simple(simple) => write!(f, "{simple}"),
            ParameterType::Named(id) => f.write_str(self.schema.declaration(*id).name()),
            ParameterType::Aggregation(aggregation) => {
                write!(f, "{} [{}:", aggregation.kind, aggregation.bound1)?;
                match aggregation.bound2 {
                    Some(bound) => write!(f, "{bound}")?,
                    None => f.write_str("?")?,
                }
                write!(f, "] OF {}", aggregation.element.display(self.schema))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_type_checks() {
        assert!(SimpleType::Integer.is_numeric());
        assert!(SimpleType::Real.is_numeric());
        assert!(!SimpleType::Logical.is_numeric());
        assert_eq!(SimpleType::ALL.len(), 7);
        assert_eq!(SimpleType::Binary.to_string(), "BINARY");
    }

    #[test]
    fn test_capability_queries() {
        let int = ParameterType::simple(SimpleType::Integer);
        assert_eq!(int.as_simple_type(), Some(SimpleType::Integer));
        assert!(int.as_named_type().is_none());
        assert!(int.as_aggregation_type().is_none());

        let list = ParameterType::aggregation(AggregationKind::List, 1, -1, int.clone());
        assert!(list.as_simple_type().is_none());
        let aggregation = list.as_aggregation_type().unwrap();
        assert_eq!(aggregation.type_of_aggregation(), AggregationKind::List);
        assert_eq!(aggregation.type_of_element(), &int);
    }

    #[test]
    fn test_unbounded_sentinel() {
        let element = ParameterType::simple(SimpleType::Real);

        let open = AggregationType::new(AggregationKind::Set, 1, -1, element.clone());
        assert!(open.is_unbounded());
        assert_eq!(open.bound1(), 1);
        assert_eq!(open.bound2(), None);

        let closed = AggregationType::new(AggregationKind::Array, 1, 3, element);
        assert!(!closed.is_unbounded());
        assert_eq!(closed.bound2(), Some(3));
    }

    #[test]
    fn test_nested_aggregation() {
        let row = ParameterType::aggregation(
            AggregationKind::List,
            2,
            -1,
            ParameterType::simple(SimpleType::Real),
        );
        let matrix = AggregationType::new(AggregationKind::List, 2, -1, row);

        assert_eq!(matrix.depth(), 2);
        assert_eq!(
            matrix.innermost_element(),
            &ParameterType::simple(SimpleType::Real)
        );
    }
}
