//! Canonical type codes and the name <-> code registry.
//!
//! Every declaration in a schema is identified by a [`TypeCode`] drawn from a
//! schema-wide registry. The registry itself is supplied by the embedding
//! application through the [`TypeRegistry`] trait; [`TypeTable`] is a simple
//! table-backed implementation that assigns codes in name order.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Canonical code of a schema type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeCode(u32);

impl TypeCode {
    /// Create a type code from its raw value.
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Raw code value.
    pub const fn value(self) -> u32 {
        self.0
    }

    /// The code as a dense array index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for TypeCode {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Bidirectional mapping between schema type names and their codes.
pub trait TypeRegistry {
    /// Resolve a type name to its code.
    fn from_name(&self, name: &str) -> Result<TypeCode, Error>;

    /// Canonical spelling of the name behind a code.
    fn to_name(&self, code: TypeCode) -> Option<&str>;
}

/// A registry backed by a sorted name table.
///
/// Codes are assigned in case-insensitive lexicographic order of the names,
/// so code order and name order coincide. Lookups by name ignore case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct TypeTable {
    names: Vec<String>,
}

impl TypeTable {
    /// Build a table from type names. Names differing only in case collapse
    /// into one entry.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = names.into_iter().map(Into::into).collect();
        names.sort_by(|a, b| cmp_ignore_case(a, b));
        names.dedup_by(|a, b| cmp_ignore_case(a, b) == Ordering::Equal);
        Self { names }
    }

    /// Number of registered names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate over `(code, name)` pairs in code order.
    pub fn iter(&self) -> impl Iterator<Item = (TypeCode, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(i, name)| (TypeCode::new(i as u32), name.as_str()))
    }
}

impl TypeRegistry for TypeTable {
    fn from_name(&self, name: &str) -> Result<TypeCode, Error> {
        self.names
            .binary_search_by(|candidate| cmp_ignore_case(candidate, name))
            .map(|i| TypeCode::new(i as u32))
            .map_err(|_| Error::UnknownTypeName(name.to_string()))
    }

    fn to_name(&self, code: TypeCode) -> Option<&str> {
        self.names.get(code.index()).map(String::as_str)
    }
}

impl From<Vec<String>> for TypeTable {
    fn from(names: Vec<String>) -> Self {
        Self::new(names)
    }
}

impl From<TypeTable> for Vec<String> {
    fn from(table: TypeTable) -> Self {
        table.names
    }
}

/// Compare two names ignoring case, without allocating.
pub(crate) fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

/// Case-insensitive name equality.
pub(crate) fn eq_ignore_case(a: &str, b: &str) -> bool {
    cmp_ignore_case(a, b) == Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_follow_name_order() {
        let table = TypeTable::new(["IfcWall", "IfcActor", "IfcRoot"]);

        assert_eq!(table.len(), 3);
        assert_eq!(table.from_name("IfcActor").unwrap(), TypeCode::new(0));
        assert_eq!(table.from_name("IfcRoot").unwrap(), TypeCode::new(1));
        assert_eq!(table.from_name("IfcWall").unwrap(), TypeCode::new(2));
    }

    #[test]
    fn test_lookup_ignores_case() {
        let table = TypeTable::new(["IfcWall", "IfcRoot"]);

        assert_eq!(table.from_name("IFCWALL").unwrap(), TypeCode::new(1));
        assert_eq!(table.to_name(TypeCode::new(1)), Some("IfcWall"));
    }

    #[test]
    fn test_unknown_name_and_code() {
        let table = TypeTable::new(["IfcRoot"]);

        assert_eq!(
            table.from_name("IfcDoor"),
            Err(Error::UnknownTypeName("IfcDoor".into()))
        );
        assert!(table.to_name(TypeCode::new(7)).is_none());
    }

    #[test]
    fn test_case_duplicates_collapse() {
        let table = TypeTable::new(["IfcRoot", "IFCROOT", "ifcroot"]);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_deserialize_from_name_list() {
        let table: TypeTable = serde_json::from_str(r#"["IfcWall", "IfcDoor"]"#).unwrap();

        let pairs: Vec<_> = table.iter().collect();
        assert_eq!(
            pairs,
            vec![(TypeCode::new(0), "IfcDoor"), (TypeCode::new(1), "IfcWall")]
        );

        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(json, r#"["IfcDoor","IfcWall"]"#);
    }

    #[test]
    fn test_cmp_ignore_case() {
        assert_eq!(cmp_ignore_case("abc", "ABD"), Ordering::Less);
        assert!(eq_ignore_case("IfcRoot", "IFCROOT"));
        assert!(!eq_ignore_case("IfcRoot", "IfcRoots"));
    }
}
