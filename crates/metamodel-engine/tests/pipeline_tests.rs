use metamodel_engine::{
    FacetRule, MemberContext, MetamodelConfig, Placement, ProgrammingModel, RuleError, RuleMeta,
    SpecificationLoader, TypeContext, TypeRegistry,
};
use metamodel_types::{
    Facet, FacetKind, FeatureKind, FeatureSelector, ReflectedMember, ReflectedType, TypeKey,
    TypeRef,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// Helper: a registry with the usual shop types
fn shop() -> TypeRegistry {
    TypeRegistry::with_builtin_values()
        .with(
            ReflectedType::new("Customer")
                .attribute("title", "A customer")
                .member(ReflectedMember::method("title", TypeRef::value("string")))
                .member(ReflectedMember::accessor("firstName", TypeRef::value("string")))
                .member(ReflectedMember::mutator("setFirstName", TypeRef::value("string")))
                .member(
                    ReflectedMember::field("notes", TypeRef::value("string"))
                        .attribute("optional", true),
                )
                .member(ReflectedMember::accessor("orders", TypeRef::collection("Order"))),
        )
        .with(
            ReflectedType::new("Order")
                .member(ReflectedMember::accessor("customer", TypeRef::value("Customer"))),
        )
        .with(
            ReflectedType::new("Widget")
                .member(ReflectedMember::accessor("foo", TypeRef::value("string")))
                .member(ReflectedMember::accessor("bar", TypeRef::value("string"))),
        )
}

fn loader_with(model: ProgrammingModel) -> SpecificationLoader {
    SpecificationLoader::new(Arc::new(shop()), model)
}

// A rule that attaches a fixed facet kind to every member it sees
struct Attach {
    meta: RuleMeta,
    kind: FacetKind,
}

impl FacetRule for Attach {
    fn meta(&self) -> &RuleMeta {
        &self.meta
    }

    fn process_member(&self, ctx: &mut MemberContext<'_>) -> Result<(), RuleError> {
        ctx.facets.add_facet(Facet::marker(self.kind, self.meta.name));
        Ok(())
    }
}

fn attach(name: &'static str, interest: FeatureSelector, kind: FacetKind) -> Box<dyn FacetRule> {
    Box::new(Attach {
        meta: RuleMeta {
            name,
            description: "attaches a marker facet",
            interest,
            prefixes: &[],
        },
        kind,
    })
}

// ============================================================================
// Determinism and precedence
// ============================================================================

#[test]
fn test_builds_are_deterministic() {
    let first = loader_with(ProgrammingModel::default_model());
    let second = loader_with(ProgrammingModel::default_model());

    for name in ["Customer", "Order", "Widget"] {
        let key = TypeKey::new(name);
        let a = first.load(&key).unwrap();
        let b = second.load(&key).unwrap();
        assert_eq!(
            a.fingerprint().unwrap(),
            b.fingerprint().unwrap(),
            "fingerprint of {}",
            name
        );
        assert_eq!(a.as_ref(), b.as_ref());
    }
}

#[test]
fn test_title_attribute_overrides_title_method() {
    let loader = loader_with(ProgrammingModel::default_model());
    let customer = loader.load(&TypeKey::new("Customer")).unwrap();

    let title = customer.facet_of_type(FacetKind::Title).unwrap();
    assert_eq!(title.origin(), "title-attribute");
    assert_eq!(title.as_text(), Some("A customer"));
    // The title method was consumed at type level
    assert!(customer.member_at("title").is_none());
}

#[test]
fn test_title_method_alone() {
    let model = ProgrammingModel::with_config(MetamodelConfig::default().disable_rule("title-attribute"));
    let loader = loader_with(model);
    let customer = loader.load(&TypeKey::new("Customer")).unwrap();

    let title = customer.facet_of_type(FacetKind::Title).unwrap();
    assert_eq!(title.origin(), "title-method");
    assert_eq!(title.as_method(), Some("title"));
}

#[test]
fn test_last_registered_facet_wins() {
    let model = ProgrammingModel::default_model()
        .with_rule(
            attach("early-hidden", FeatureSelector::Members, FacetKind::Hidden),
            Placement::First,
        )
        .unwrap()
        .with_rule(
            attach("late-hidden", FeatureSelector::Members, FacetKind::Hidden),
            Placement::Before("property-accessor"),
        )
        .unwrap();
    let loader = loader_with(model);
    let customer = loader.load(&TypeKey::new("Customer")).unwrap();

    let hidden = customer
        .member_at("firstName")
        .and_then(|m| m.facet(FacetKind::Hidden))
        .unwrap();
    assert_eq!(hidden.origin(), "late-hidden");
}

#[test]
fn test_suppress_then_attach_keeps_last_writer() {
    // optionality-attribute removes Mandatory from `notes`; a later rule
    // attaching Mandatory again wins.
    let after = ProgrammingModel::default_model()
        .with_rule(
            attach("force-mandatory", FeatureSelector::Only(FeatureKind::ScalarProperty), FacetKind::Mandatory),
            Placement::After("optionality-attribute"),
        )
        .unwrap();
    let customer = loader_with(after).load(&TypeKey::new("Customer")).unwrap();
    let notes = customer.member_at("notes").unwrap();
    assert_eq!(
        notes.facet(FacetKind::Mandatory).map(|f| f.origin()),
        Some("force-mandatory")
    );

    // Registered before the suppressing rule, the attachment is removed.
    let before = ProgrammingModel::default_model()
        .with_rule(
            attach("force-mandatory", FeatureSelector::Only(FeatureKind::ScalarProperty), FacetKind::Mandatory),
            Placement::Before("optionality-attribute"),
        )
        .unwrap();
    let customer = loader_with(before).load(&TypeKey::new("Customer")).unwrap();
    assert!(customer
        .member_at("notes")
        .unwrap()
        .facet(FacetKind::Mandatory)
        .is_none());
}

// ============================================================================
// Consumption
// ============================================================================

struct CountMembers {
    seen: Arc<AtomicUsize>,
}

static COUNT_MEMBERS_META: RuleMeta = RuleMeta {
    name: "count-members",
    description: "counts the members it is offered",
    interest: FeatureSelector::Members,
    prefixes: &[],
};

impl FacetRule for CountMembers {
    fn meta(&self) -> &RuleMeta {
        &COUNT_MEMBERS_META
    }

    fn process_member(&self, _ctx: &mut MemberContext<'_>) -> Result<(), RuleError> {
        self.seen.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn test_consumed_members_are_not_offered_to_later_rules() {
    let seen = Arc::new(AtomicUsize::new(0));
    let model = ProgrammingModel::default_model()
        .with_rule(
            Box::new(CountMembers {
                seen: Arc::clone(&seen),
            }),
            Placement::Last,
        )
        .unwrap();
    let loader = loader_with(model);
    let customer = loader.load(&TypeKey::new("Customer")).unwrap();

    // Every member was consumed by an accessor rule before the counter ran
    assert_eq!(seen.load(Ordering::SeqCst), 0);
    assert_eq!(customer.members().len(), 3);
}

#[test]
fn test_setter_is_consumed_by_its_property() {
    let loader = loader_with(ProgrammingModel::default_model());
    let customer = loader.load(&TypeKey::new("Customer")).unwrap();

    assert!(customer.member_at("setFirstName").is_none());
    let first_name = customer.member_at("firstName").unwrap();
    assert_eq!(first_name.kind, FeatureKind::ScalarProperty);
    assert_eq!(
        first_name
            .facet(FacetKind::PropertySetter)
            .and_then(Facet::as_method),
        Some("setFirstName")
    );
    assert!(customer.diagnostics().is_empty());
}

// ============================================================================
// Idempotence
// ============================================================================

struct CountTypes {
    seen: Arc<AtomicUsize>,
}

static COUNT_TYPES_META: RuleMeta = RuleMeta {
    name: "count-types",
    description: "counts type-level invocations",
    interest: FeatureSelector::ObjectOnly,
    prefixes: &[],
};

impl FacetRule for CountTypes {
    fn meta(&self) -> &RuleMeta {
        &COUNT_TYPES_META
    }

    fn process_type(&self, ctx: &mut TypeContext<'_>) -> Result<(), RuleError> {
        if ctx.key.as_str() == "Widget" {
            self.seen.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

#[test]
fn test_repeat_requests_do_not_rebuild() {
    let seen = Arc::new(AtomicUsize::new(0));
    let model = ProgrammingModel::default_model()
        .with_rule(
            Box::new(CountTypes {
                seen: Arc::clone(&seen),
            }),
            Placement::First,
        )
        .unwrap();
    let loader = loader_with(model);
    let key = TypeKey::new("Widget");

    let first = loader.load(&key).unwrap();
    for _ in 0..5 {
        let again = loader.load(&key).unwrap();
        assert!(Arc::ptr_eq(&first, &again));
    }
    assert_eq!(seen.load(Ordering::SeqCst), 1);
}

// ============================================================================
// Failure isolation
// ============================================================================

struct FailOnFoo;

static FAIL_ON_FOO_META: RuleMeta = RuleMeta {
    name: "fail-on-foo",
    description: "always fails for members named foo",
    interest: FeatureSelector::Members,
    prefixes: &[],
};

impl FacetRule for FailOnFoo {
    fn meta(&self) -> &RuleMeta {
        &FAIL_ON_FOO_META
    }

    fn process_member(&self, ctx: &mut MemberContext<'_>) -> Result<(), RuleError> {
        if ctx.name() == "foo" {
            return Err(RuleError::failed("foo is not supported"));
        }
        Ok(())
    }
}

struct PanicOnFoo;

static PANIC_ON_FOO_META: RuleMeta = RuleMeta {
    name: "panic-on-foo",
    description: "panics for members named foo",
    interest: FeatureSelector::Members,
    prefixes: &[],
};

impl FacetRule for PanicOnFoo {
    fn meta(&self) -> &RuleMeta {
        &PANIC_ON_FOO_META
    }

    fn process_member(&self, ctx: &mut MemberContext<'_>) -> Result<(), RuleError> {
        if ctx.name() == "foo" {
            panic!("unexpected member foo");
        }
        Ok(())
    }
}

fn assert_single_failure_on_foo(rule: Box<dyn FacetRule>, origin: &str) {
    let model = ProgrammingModel::default_model()
        .with_rule(rule, Placement::First)
        .unwrap();
    let loader = loader_with(model);
    let widget = loader.load(&TypeKey::new("Widget")).unwrap();

    let report = loader.report();
    let failures: Vec<_> = report.at("Widget.foo").collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].origin, origin);
    assert!(failures[0].is_disqualifying());
    assert_eq!(report.len(), 1);

    // Every other rule still ran, for foo and for the rest of the type
    let foo = widget.member_at("foo").unwrap();
    assert!(foo.facet(FacetKind::PropertyAccessor).is_some());
    assert!(foo.facet(FacetKind::Named).is_some());
    assert!(widget.member_at("bar").unwrap().facet(FacetKind::PropertyAccessor).is_some());
}

#[test]
fn test_failing_rule_yields_one_failure() {
    assert_single_failure_on_foo(Box::new(FailOnFoo), "fail-on-foo");
}

#[test]
fn test_panicking_rule_yields_one_failure() {
    assert_single_failure_on_foo(Box::new(PanicOnFoo), "panic-on-foo");
}
