//! 求解器测试

mod cache;

use super::*;
use crate::infer::canonicalize_query;
use crate::ir::*;
use crate::program::Program;

pub(crate) fn i32_ty() -> Ty {
    Ty::scalar(Scalar::I32)
}

pub(crate) fn u32_ty() -> Ty {
    Ty::scalar(Scalar::U32)
}

pub(crate) fn string_ty() -> Ty {
    Ty::adt("String", Vec::new())
}

pub(crate) fn var(index: usize) -> Ty {
    InferenceVar::new(index).to_ty()
}

/// `^depth.index`
pub(crate) fn bound(
    depth: u32,
    index: usize,
) -> Ty {
    BoundVar::new(DebruijnIndex::new(depth), index).to_ty()
}

pub(crate) fn implemented(
    trait_name: &str,
    ty: Ty,
) -> DomainGoal {
    DomainGoal::Implemented(TraitRef::new(TraitId::new(trait_name), vec![ty.cast()]))
}

pub(crate) fn fact(goal: DomainGoal) -> ProgramClause {
    ProgramClause::fact(goal)
}

/// `forall<T> { consequence(T) :- conditions(T) }`
pub(crate) fn rule(
    consequence: DomainGoal,
    conditions: Vec<DomainGoal>,
) -> ProgramClause {
    ProgramClause::new(
        vec![ParameterKind::Ty],
        consequence,
        conditions.into_iter().map(DomainGoal::into_goal).collect(),
    )
}

pub(crate) fn query(goal: Goal) -> UCanonicalGoal {
    canonicalize_query(&InEnvironment::new(&Environment::new(), goal)).goal
}

pub(crate) fn solve(
    program: &Program,
    goal: Goal,
) -> Result<Option<Solution>, SolverError> {
    solve_with(SolverChoice::recursive_default(), program, goal)
}

pub(crate) fn solve_with(
    choice: SolverChoice,
    program: &Program,
    goal: Goal,
) -> Result<Option<Solution>, SolverError> {
    let solver = Solver::new(choice).unwrap();
    solver.solve(program, &query(goal))
}

pub(crate) fn recursive(
    overflow_depth: usize,
    max_size: usize,
) -> SolverChoice {
    SolverChoice::Recursive {
        overflow_depth,
        max_size,
        caching_enabled: true,
        overflow_policy: OverflowPolicy::NoGuidance,
    }
}

/// `Unique` with the given substitution, no constraints and no binders
pub(crate) fn unique(parameters: Vec<Parameter>) -> Solution {
    Solution::Unique(Canonical {
        value: ConstrainedSubst {
            subst: Substitution::new(parameters),
            constraints: Vec::new(),
        },
        binders: Vec::new(),
    })
}

/// Zero-configuration solver choices are rejected
#[test]
fn test_invalid_config() {
    assert!(matches!(
        Solver::new(recursive(0, 30)),
        Err(SolverError::InvalidConfig(_))
    ));
    assert!(matches!(
        Solver::new(recursive(10, 0)),
        Err(SolverError::InvalidConfig(_))
    ));
    assert!(Solver::new(SolverChoice::default()).is_ok());
}

/// Default limits
#[test]
fn test_recursive_default() {
    assert_eq!(
        SolverChoice::recursive_default(),
        SolverChoice::Recursive {
            overflow_depth: 100,
            max_size: 30,
            caching_enabled: true,
            overflow_policy: OverflowPolicy::NoGuidance,
        }
    );
}
