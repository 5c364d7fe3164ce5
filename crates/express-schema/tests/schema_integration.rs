//! Integration tests for building and querying schema definitions.

use express_schema::{
    AggregationKind, Attribute, AttributeId, Error, InverseAggregation, InverseAttribute,
    ParameterType, SchemaBuilder, SchemaConfig, SchemaDefinition, SimpleType, TypeCode,
    TypeRegistry, TypeTable,
};
use pretty_assertions::assert_eq;

fn attribute_names(attributes: &[&Attribute]) -> Vec<String> {
    attributes
        .iter()
        .map(|attribute| attribute.name().to_string())
        .collect()
}

fn setup_inheritance_schema() -> SchemaDefinition {
    let registry = TypeTable::new(["Base", "Choice", "Derived", "Other"]);
    let mut builder = SchemaBuilder::new(SchemaConfig::new("INHERITANCE"), &registry);

    let base = builder.add_entity("Base", None).unwrap();
    let derived = builder.add_entity("Derived", Some(base)).unwrap();
    builder.add_entity("Other", None).unwrap();
    builder.add_select_type("Choice", vec![base, derived]).unwrap();

    builder
        .set_attributes(
            base,
            vec![Attribute::new("a", ParameterType::simple(SimpleType::Integer))],
            vec![false],
        )
        .unwrap();
    builder
        .set_attributes(
            derived,
            vec![Attribute::new("b", ParameterType::simple(SimpleType::String))],
            vec![false],
        )
        .unwrap();

    builder.build().unwrap()
}

/// A slice of the IFC kernel: roots, objects and the relationship that
/// defines them, with the inverse attribute pointing back from objects.
fn setup_kernel_schema(config: SchemaConfig) -> SchemaDefinition {
    let registry = TypeTable::new([
        "IfcGloballyUniqueId",
        "IfcLabel",
        "IfcObject",
        "IfcObjectDefinition",
        "IfcRelDefines",
        "IfcRoot",
        "IfcWallTypeEnum",
    ]);
    let mut builder = SchemaBuilder::new(config, &registry);

    let guid = builder
        .add_type_declaration("IfcGloballyUniqueId", ParameterType::simple(SimpleType::String))
        .unwrap();
    let label = builder
        .add_type_declaration("IfcLabel", ParameterType::simple(SimpleType::String))
        .unwrap();
    builder
        .add_enumeration_type("IfcWallTypeEnum", ["STANDARD", "POLYGONAL", "NOTDEFINED"])
        .unwrap();

    let root = builder.add_entity("IfcRoot", None).unwrap();
    let definition = builder.add_entity("IfcObjectDefinition", Some(root)).unwrap();
    let object = builder.add_entity("IfcObject", Some(definition)).unwrap();
    let rel = builder.add_entity("IfcRelDefines", Some(root)).unwrap();

    builder
        .set_attributes(
            root,
            vec![
                Attribute::new("GlobalId", ParameterType::named(guid)),
                Attribute::optional("Name", ParameterType::named(label)),
            ],
            vec![false, false],
        )
        .unwrap();
    builder
        .set_attributes(
            object,
            vec![Attribute::optional("ObjectType", ParameterType::named(label))],
            vec![false],
        )
        .unwrap();
    builder
        .set_attributes(
            rel,
            vec![Attribute::new(
                "RelatedObjects",
                ParameterType::aggregation(
                    AggregationKind::Set,
                    1,
                    -1,
                    ParameterType::named(object),
                ),
            )],
            vec![false],
        )
        .unwrap();
    builder
        .set_inverse_attributes(
            definition,
            vec![InverseAttribute::new(
                "HasAssociations",
                InverseAggregation::Set,
                rel,
                AttributeId::new(rel, 0),
            )],
        )
        .unwrap();
    builder
        .set_inverse_attributes(
            object,
            vec![InverseAttribute::new(
                "IsDefinedBy",
                InverseAggregation::Set,
                rel,
                AttributeId::new(rel, 0),
            )
            .with_bounds(0, Some(1))],
        )
        .unwrap();

    builder.build().unwrap()
}

#[test]
fn test_attributes_flatten_root_first() {
    let schema = setup_inheritance_schema();
    let derived = schema.entity_by_name("Derived").unwrap();

    assert_eq!(attribute_names(&derived.all_attributes()), vec!["a", "b"]);
    assert_eq!(derived.all_derived(), vec![false, false]);
    assert_eq!(derived.attribute_count(), 2);
    assert_eq!(derived.attribute_index_by_name("b"), Some(1));
    assert_eq!(derived.attribute_index_by_name("a"), Some(0));
    assert_eq!(derived.attribute_index_by_name("c"), None);

    let own = &derived.attributes()[0];
    assert_eq!(derived.attribute_index(own), Some(1));
    let base = derived.supertype().unwrap();
    assert_eq!(derived.attribute_index(&base.attributes()[0]), Some(0));
    assert_eq!(base.attribute_index(own), None);
}

#[test]
fn test_select_keeps_member_order() {
    let schema = setup_inheritance_schema();

    let choice = schema.declaration_by_name("Choice").unwrap();
    let members: Vec<&str> = choice
        .as_select_type()
        .unwrap()
        .select_list()
        .iter()
        .map(|id| schema.declaration(*id).name())
        .collect();
    assert_eq!(members, vec!["Base", "Derived"]);
}

#[test]
fn test_unknown_name_is_not_found() {
    let schema = setup_inheritance_schema();

    assert_eq!(
        schema.declaration_by_name("Nonexistent").err(),
        Some(Error::DeclarationNotFound {
            name: "Nonexistent".into()
        })
    );
}

#[test]
fn test_built_in_schema_lookup_by_code() {
    let registry = TypeTable::new(["A", "B", "C", "D", "E"]);
    let mut builder = SchemaBuilder::new(SchemaConfig::built_in("DENSE"), &registry);
    for name in ["E", "C", "A", "D", "B"] {
        builder.add_entity(name, None).unwrap();
    }
    let schema = builder.build().unwrap();

    assert!(schema.is_built_in());
    let declaration = schema.declaration_by_code(TypeCode::new(3));
    assert_eq!(declaration.name(), "D");
    assert_eq!(declaration.code(), TypeCode::new(3));
}

#[test]
fn test_inverse_attributes_flatten_root_first() {
    let schema = setup_kernel_schema(SchemaConfig::new("IFC_KERNEL"));
    let object = schema.entity_by_name("IfcObject").unwrap();

    let names: Vec<&str> = object
        .all_inverse_attributes()
        .iter()
        .map(|inverse| inverse.name())
        .collect();
    assert_eq!(names, vec!["HasAssociations", "IsDefinedBy"]);

    let defined_by = &object.inverse_attributes()[0];
    assert_eq!(defined_by.bound2(), Some(1));
    let rel = schema.entity(defined_by.entity_reference()).unwrap();
    assert_eq!(rel.name(), "IfcRelDefines");

    let forward = schema.attribute(defined_by.attribute_reference()).unwrap();
    assert_eq!(forward.name(), "RelatedObjects");
    assert_eq!(
        rel.attribute_index_of(defined_by.attribute_reference()),
        Some(2)
    );
}

#[test]
fn test_kernel_attribute_positions() {
    let schema = setup_kernel_schema(SchemaConfig::new("IFC_KERNEL"));
    let object = schema.entity_by_name("ifcobject").unwrap();

    assert_eq!(
        attribute_names(&object.all_attributes()),
        vec!["GlobalId", "Name", "ObjectType"]
    );
    let (index, name) = object.attribute_by_name("Name").unwrap();
    assert_eq!(index, 1);
    assert!(name.is_optional());
    assert_eq!(
        name.type_of_attribute().display(&schema).to_string(),
        "IfcLabel"
    );

    let lineage: Vec<&str> = object.lineage().map(|level| level.name()).collect();
    assert_eq!(lineage, vec!["IfcObject", "IfcObjectDefinition", "IfcRoot"]);
    assert!(object.is_named("IFCROOT"));
    assert!(!object.is_named("IfcRelDefines"));
}

#[test]
fn test_attribute_at_spans_supertypes() {
    let schema = setup_kernel_schema(SchemaConfig::new("IFC_KERNEL"));
    let object = schema.entity_by_name("IfcObject").unwrap();

    let names: Vec<&str> = (0..object.attribute_count())
        .filter_map(|index| object.attribute_at(index))
        .map(|attribute| attribute.name())
        .collect();
    assert_eq!(names, vec!["GlobalId", "Name", "ObjectType"]);
    assert!(object.attribute_at(3).is_none());
    assert!(object.attribute_at(usize::MAX).is_none());

    let definition = object.supertype().unwrap();
    assert_eq!(definition.attribute_at(1).map(Attribute::name), Some("Name"));
}

#[test]
fn test_enumeration_items() {
    let schema = setup_kernel_schema(SchemaConfig::new("IFC_KERNEL"));

    let declaration = schema.declaration_by_name("IfcWallTypeEnum").unwrap();
    assert_eq!(declaration.kind().keyword(), "ENUMERATION");
    let enumeration = declaration.as_enumeration_type().unwrap();
    assert_eq!(
        enumeration.enumeration_items(),
        &["STANDARD", "POLYGONAL", "NOTDEFINED"]
    );
    assert_eq!(enumeration.item_index("POLYGONAL"), Some(1));
}

#[test]
fn test_subtypes_are_back_filled() {
    let schema = setup_kernel_schema(SchemaConfig::built_in("IFC_KERNEL"));
    let root = schema.entity_by_name("IfcRoot").unwrap();

    let subtypes: Vec<&str> = root.subtypes().map(|subtype| subtype.name()).collect();
    assert_eq!(subtypes, vec!["IfcObjectDefinition", "IfcRelDefines"]);
    for subtype in root.subtypes() {
        assert_eq!(subtype.supertype(), Some(root));
    }
}

#[test]
fn test_codes_agree_with_registry() {
    let registry = TypeTable::new(["Base", "Choice", "Derived", "Other"]);
    let schema = setup_inheritance_schema();

    for declaration in schema.declarations() {
        assert_eq!(
            registry.from_name(declaration.name()).unwrap(),
            declaration.code()
        );
        assert_eq!(registry.to_name(declaration.code()), Some(declaration.name()));
    }
}

#[test]
fn test_registry_from_json() {
    let registry: TypeTable =
        serde_json::from_str(r#"["IfcWall", "IfcDoor", "IfcBeam"]"#).unwrap();

    assert_eq!(registry.from_name("ifcdoor").unwrap(), TypeCode::new(1));
    assert_eq!(registry.to_name(TypeCode::new(0)), Some("IfcBeam"));
    assert_eq!(
        registry.from_name("IfcWindow"),
        Err(Error::UnknownTypeName("IfcWindow".into()))
    );
}
