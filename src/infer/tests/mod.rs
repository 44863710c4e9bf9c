//! 推断表测试


use super::*;

pub(crate) fn i32_ty() -> Ty {
    Ty::scalar(Scalar::I32)
}

pub(crate) fn u32_ty() -> Ty {
    Ty::scalar(Scalar::U32)
}

pub(crate) fn vec_of(ty: Ty) -> Ty {
    Ty::adt("Vec", vec![ty.cast()])
}

pub(crate) fn var(index: usize) -> Ty {
    InferenceVar::new(index).to_ty()
}

pub(crate) fn reference(
    mutability: Mutability,
    lifetime: Lifetime,
    ty: Ty,
) -> Ty {
    Ty::apply(TypeName::Ref(mutability), vec![lifetime.cast(), ty.cast()])
}

pub(crate) fn implemented(
    trait_name: &str,
    parameters: Vec<Parameter>,
) -> DomainGoal {
    DomainGoal::Implemented(TraitRef::new(TraitId::new(trait_name), parameters))
}

/// Truncation measures the largest type
#[test]
fn test_needs_truncation() {
    let table = InferenceTable::new();
    let ty = vec_of(vec_of(vec_of(i32_ty())));
    assert_eq!(truncate::ty_size(&table, &ty), 4);
    assert!(truncate::needs_truncation(&table, 3, &ty));
    assert!(!truncate::needs_truncation(&table, 4, &ty));
}

/// Truncation sees through bound variables
#[test]
fn test_needs_truncation_resolves_vars() {
    let mut table = InferenceTable::new();
    let v = table.new_variable(UniverseIndex::ROOT);
    table
        .unify(&Environment::new(), &v.to_ty(), &vec_of(vec_of(i32_ty())))
        .unwrap();
    let goal = implemented("Foo", vec![vec_of(v.to_ty()).cast()]);
    assert!(truncate::needs_truncation(&table, 3, &goal));
}

/// Negation turns placeholders into existential variables
#[test]
fn test_invert_placeholders() {
    let mut table = InferenceTable::new();
    let ui = table.new_universe();
    let placeholder = PlaceholderIndex { ui, idx: 0 }.to_ty();
    let goal = implemented("Foo", vec![placeholder.cast()]);

    let inverted = table.invert(&goal).unwrap();
    match &inverted {
        DomainGoal::Implemented(trait_ref) => {
            assert!(matches!(trait_ref.parameters[0], Parameter::Ty(Ty::InferenceVar(_))));
        }
        other => panic!("unexpected goal {}", other),
    }
}

/// Negation of a goal with unresolved variables flounders
#[test]
fn test_invert_unresolved_var() {
    let mut table = InferenceTable::new();
    let v = table.new_variable(UniverseIndex::ROOT);
    let goal = implemented("Foo", vec![v.to_ty().cast()]);
    assert!(table.invert(&goal).is_none());

    table
        .unify(&Environment::new(), &v.to_ty(), &i32_ty())
        .unwrap();
    assert_eq!(
        table.invert(&goal),
        Some(implemented("Foo", vec![i32_ty().cast()]))
    );
}

/// Universal instantiation creates placeholders in a new universe
#[test]
fn test_instantiate_universally() {
    let mut table = InferenceTable::new();
    let binders = Binders::new(
        vec![ParameterKind::Ty],
        implemented(
            "Foo",
            vec![BoundVar::new(DebruijnIndex::INNERMOST, 0).to_ty().cast()],
        ),
    );
    let goal = table.instantiate_binders_universally(&binders);
    let expected = PlaceholderIndex {
        ui: UniverseIndex(1),
        idx: 0,
    };
    assert_eq!(goal, implemented("Foo", vec![expected.to_ty().cast()]));
    assert_eq!(table.max_universe(), UniverseIndex(1));

    let goal = table.instantiate_binders_existentially(&binders);
    assert_eq!(goal, implemented("Foo", vec![var(0).cast()]));
    assert_eq!(table.universe_of_unbound_var(InferenceVar::new(0)), Some(UniverseIndex(1)));
}
