//! 项模型测试

mod fold;

use super::*;

pub(crate) fn ty(name: &str) -> Ty {
    Ty::adt(name, Vec::new())
}

pub(crate) fn i32_ty() -> Ty {
    Ty::scalar(Scalar::I32)
}

pub(crate) fn implemented(
    trait_name: &str,
    parameters: Vec<Parameter>,
) -> DomainGoal {
    DomainGoal::Implemented(TraitRef::new(TraitId::new(trait_name), parameters))
}

pub(crate) fn bound_ty(
    depth: u32,
    index: usize,
) -> Ty {
    BoundVar::new(DebruijnIndex::new(depth), index).to_ty()
}

/// Environment extension marks hypotheses as high priority and drops duplicates
#[test]
fn test_environment_add_clauses() {
    let clause = ProgramClause::fact(implemented("Foo", vec![i32_ty().cast()]));
    let env = Environment::new().add_clauses(vec![clause.clone(), clause.clone()]);
    assert_eq!(env.clauses.len(), 1);
    assert_eq!(env.clauses[0].0.value.priority, ClausePriority::High);

    let env = env.add_clauses(vec![clause]);
    assert_eq!(env.clauses.len(), 1);
}

/// Identity substitution and composition
#[test]
fn test_substitution_identity_and_compose() {
    let identity = Substitution::identity(vec![ParameterKind::Ty, ParameterKind::Lifetime]);
    assert!(identity.is_identity());
    assert_eq!(identity.len(), 2);

    let first = Substitution::new(vec![ty("Vec").cast(), bound_ty(0, 0).cast()]);
    assert!(!first.is_identity());
    let second = Substitution::new(vec![i32_ty().cast()]);
    let composed = first.compose(&second);
    assert_eq!(
        composed,
        Substitution::new(vec![ty("Vec").cast(), i32_ty().cast()])
    );
}

/// Quantifying over no binders is the goal itself
#[test]
fn test_goal_quantify_empty() {
    let goal = implemented("Foo", vec![i32_ty().cast()]).into_goal();
    assert_eq!(
        Goal::quantify(QuantifierKind::ForAll, Vec::new(), goal.clone()),
        goal
    );
    assert_eq!(goal.clone().implied_by(Vec::new()), goal);
    assert!(Goal::all(Vec::new()).is_trivially_true());
    assert!(!goal.is_trivially_true());
}

/// Domain goal accessors
#[test]
fn test_domain_goal_accessors() {
    let goal = implemented("Eq", vec![i32_ty().cast()]);
    assert_eq!(goal.trait_id(), Some(&TraitId::new("Eq")));
    assert_eq!(goal.self_ty(), Some(&i32_ty()));

    let outlives = DomainGoal::LifetimeOutlives {
        a: Lifetime::Static,
        b: Lifetime::Static,
    };
    assert_eq!(outlives.trait_id(), None);
    assert_eq!(outlives.self_ty(), None);
}

/// Universes only see placeholders from their own or enclosing universes
#[test]
fn test_universe_visibility() {
    let root = UniverseIndex::root();
    let next = root.next();
    assert!(next.can_see(root));
    assert!(next.can_see(next));
    assert!(!root.can_see(next));
}

/// Serde round trip through RON keeps the term intact
#[test]
fn test_goal_ron_roundtrip() {
    let goal = Goal::quantify(
        QuantifierKind::Exists,
        vec![ParameterKind::Ty],
        implemented("Foo", vec![bound_ty(0, 0).cast()]).into_goal(),
    );
    let text = ron::to_string(&goal).unwrap();
    let back: Goal = ron::from_str(&text).unwrap();
    assert_eq!(back, goal);
}
