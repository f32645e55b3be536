use metamodel_engine::{
    FeatureLocation, MetamodelConfig, ProgrammingModel, SpecState, SpecificationLoader,
    TypeRegistry, TypeSource, UnconsumedPolicy,
};
use metamodel_types::{FacetKind, FeatureKind, LifecycleEvent, TypeKey};
use std::io::Write;
use std::sync::Arc;

const SHOP: &str = r#"[
  {
    "key": "shop.Party",
    "members": [
      {"name": "id", "shape": "field", "returns": {"kind": "value", "of": "int"},
       "attributes": {"readonly": true}}
    ]
  },
  {
    "key": "shop.Customer",
    "supertypes": ["shop.Party"],
    "attributes": {"describedAs": "Someone who buys"},
    "members": [
      {"name": "firstName", "shape": "accessor", "returns": {"kind": "value", "of": "string"}},
      {"name": "setFirstName", "shape": "mutator", "returns": {"kind": "void"},
       "params": [{"name": "value", "type": {"kind": "value", "of": "string"}}]},
      {"name": "email", "shape": "field", "returns": {"kind": "value", "of": "string"},
       "attributes": {"optional": true, "maxLength": 120, "named": "E-mail"}},
      {"name": "orders", "shape": "accessor", "returns": {"kind": "collection", "of": "shop.Order"}},
      {"name": "placeOrder", "shape": "method", "returns": {"kind": "value", "of": "shop.Order"},
       "params": [{"name": "product", "type": {"kind": "value", "of": "string"},
                   "attributes": {"describedAs": "Catalogue code"}}]},
      {"name": "default0PlaceOrder", "shape": "method", "returns": {"kind": "value", "of": "string"}},
      {"name": "validatePlaceOrder", "shape": "method", "returns": {"kind": "value", "of": "string"},
       "params": [{"name": "product", "type": {"kind": "value", "of": "string"}}]},
      {"name": "hidePlaceOrder", "shape": "method", "returns": {"kind": "value", "of": "bool"}},
      {"name": "created", "shape": "method", "returns": {"kind": "void"}},
      {"name": "onCreated", "shape": "method", "returns": {"kind": "void"}},
      {"name": "toString", "shape": "method", "returns": {"kind": "value", "of": "string"}},
      {"name": "recalculate", "shape": "method", "returns": {"kind": "void"},
       "attributes": {"programmatic": true}}
    ]
  },
  {
    "key": "shop.Order",
    "attributes": {"title": "An order"},
    "members": [
      {"name": "customer", "shape": "accessor", "returns": {"kind": "value", "of": "shop.Customer"}}
    ]
  }
]"#;

fn shop() -> Arc<TypeRegistry> {
    Arc::new(TypeRegistry::from_json(SHOP).unwrap())
}

#[test]
fn test_customer_metamodel() {
    let loader = SpecificationLoader::new(shop(), ProgrammingModel::default_model());
    let customer = loader.load(&TypeKey::new("shop.Customer")).unwrap();

    // Type level
    assert_eq!(customer.facet_of_type(FacetKind::Named).and_then(|f| f.as_text()), Some("Customer"));
    assert_eq!(
        customer.facet_of_type(FacetKind::Description).and_then(|f| f.as_text()),
        Some("Someone who buys")
    );
    assert!(customer.is_subtype_of(&TypeKey::new("shop.Party")));
    let created = customer
        .facet_of_type(FacetKind::Callback(LifecycleEvent::Created))
        .unwrap();
    assert_eq!(created.methods(), ["created", "onCreated"]);

    // Properties
    let first_name = customer.member_at("firstName").unwrap();
    assert_eq!(first_name.facet(FacetKind::Named).and_then(|f| f.as_text()), Some("First Name"));
    assert_eq!(
        first_name.facet(FacetKind::PropertyAccessor).and_then(|f| f.as_method()),
        Some("firstName")
    );
    assert_eq!(
        first_name.facet(FacetKind::TypeOf).and_then(|f| f.as_type()),
        Some(&TypeKey::new("string"))
    );
    assert!(first_name.facet(FacetKind::Mandatory).is_some());
    assert_eq!(
        first_name.facet(FacetKind::PropertySetter).and_then(|f| f.as_method()),
        Some("setFirstName")
    );

    let email = customer.member_at("email").unwrap();
    assert_eq!(email.facet(FacetKind::Named).and_then(|f| f.as_text()), Some("E-mail"));
    assert!(email.facet(FacetKind::Mandatory).is_none());
    assert_eq!(email.facet(FacetKind::MaxLength).and_then(|f| f.as_integer()), Some(120));
    assert_eq!(email.facet(FacetKind::PropertySetter).and_then(|f| f.as_method()), Some("email"));

    let id = customer.member_at("id").unwrap();
    assert_eq!(id.declared_by, TypeKey::new("shop.Party"));
    assert!(id.facet(FacetKind::PropertySetter).is_none());

    // Collection
    let orders = customer.member_at("orders").unwrap();
    assert_eq!(orders.kind, FeatureKind::Collection);
    assert_eq!(orders.element_type(), Some(&TypeKey::new("shop.Order")));
    assert!(orders.facet(FacetKind::CollectionAccessor).is_some());

    // Action
    let place_order = customer.member_at("placeOrder").unwrap();
    assert_eq!(place_order.kind, FeatureKind::Action);
    assert_eq!(
        place_order.facet(FacetKind::ActionInvocation).and_then(|f| f.as_method()),
        Some("placeOrder")
    );
    assert_eq!(
        place_order.facet(FacetKind::TypeOf).and_then(|f| f.as_type()),
        Some(&TypeKey::new("shop.Order"))
    );
    assert_eq!(
        place_order.facet(FacetKind::Hidden).and_then(|f| f.as_method()),
        Some("hidePlaceOrder")
    );
    assert_eq!(
        place_order.facet(FacetKind::Validate).and_then(|f| f.as_method()),
        Some("validatePlaceOrder")
    );

    let product = &place_order.parameters[0];
    assert_eq!(product.name, "product");
    assert_eq!(product.facets.get_facet(FacetKind::Named).and_then(|f| f.as_text()), Some("Product"));
    assert_eq!(
        product.facets.get_facet(FacetKind::Description).and_then(|f| f.as_text()),
        Some("Catalogue code")
    );
    assert_eq!(
        product.facets.get_facet(FacetKind::Default).and_then(|f| f.as_method()),
        Some("default0PlaceOrder")
    );
    assert!(product.facets.contains_facet(FacetKind::Mandatory));

    // Everything else was consumed or suppressed
    let ids: Vec<&str> = customer.members().iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["firstName", "email", "orders", "placeOrder", "id"]);
    assert!(customer.diagnostics().is_empty());
}

#[test]
fn test_whole_registry_is_sound() {
    let source = shop();
    let keys = source.keys();
    let loader = SpecificationLoader::new(source, ProgrammingModel::default_model());

    let handles = loader.load_all(&keys);
    assert_eq!(handles.len(), keys.len());
    assert!(handles.iter().all(|h| h.state() == SpecState::Built));

    let failures = loader.validate();
    assert!(failures.is_empty(), "unexpected failures: {:?}", failures);
    assert!(loader.report().is_empty());

    let order = loader.load(&TypeKey::new("shop.Order")).unwrap();
    assert_eq!(order.facet_of_type(FacetKind::Title).and_then(|f| f.as_text()), Some("An order"));

    // Value types picked up value semantics
    let string = loader.load(&TypeKey::new("string")).unwrap();
    assert!(string.facets().contains_facet(FacetKind::Encodable));
    assert!(string.facets().contains_facet(FacetKind::Parseable));
    assert!(string.facets().contains_facet(FacetKind::Immutable));
}

#[test]
fn test_simple_names_resolve() {
    let source = shop();
    assert_eq!(source.resolve("Customer"), Some(TypeKey::new("shop.Customer")));
    assert!(source.is_known(&TypeKey::new("shop.Order")));
}

#[test]
fn test_config_file_shapes_the_model() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"[metamodel]
unconsumed = "report"
disabled-rules = ["description-attribute"]
"#
    )
    .unwrap();

    let config = MetamodelConfig::load(file.path()).unwrap();
    assert_eq!(config.unconsumed, UnconsumedPolicy::Report);

    let loader = SpecificationLoader::new(shop(), ProgrammingModel::with_config(config));
    let customer = loader.load(&TypeKey::new("shop.Customer")).unwrap();

    assert!(customer.facet_of_type(FacetKind::Description).is_none());
    assert!(customer.member_at("placeOrder").unwrap().parameters[0]
        .facets
        .get_facet(FacetKind::Description)
        .is_none());
    // Every member was claimed, so the strict policy has nothing to report
    assert!(customer.diagnostics().is_empty());
}

#[test]
fn test_failure_report_serializes() {
    let loader = SpecificationLoader::new(shop(), ProgrammingModel::default_model());
    loader.load(&TypeKey::new("shop.Missing")).unwrap();

    let report = loader.report();
    let json = report.to_json();
    assert_eq!(json["sound"], false);
    assert_eq!(json["count"], 1);
    let entries = json["failures"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["severity"], "fatal");
    assert_eq!(
        report.iter().next().unwrap().location,
        FeatureLocation::of_type(&TypeKey::new("shop.Missing"))
    );
}
