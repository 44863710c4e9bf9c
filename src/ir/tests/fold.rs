//! Shifting and substitution tests

use super::*;

/// Shifting in and back out is the identity
#[test]
fn test_shift_in_out() {
    let ty = Ty::adt("Vec", vec![bound_ty(0, 1).cast()]);
    let shifted = ty.shifted_in();
    assert_eq!(shifted, Ty::adt("Vec", vec![bound_ty(1, 1).cast()]));
    assert_eq!(shifted.shifted_out(), Ok(ty));
}

/// Shifting out a variable bound by the removed binder fails
#[test]
fn test_shift_out_escaping() {
    let ty = bound_ty(0, 0);
    assert_eq!(ty.shifted_out(), Err(NoSolution));
}

/// Variables bound inside a value are not shifted
#[test]
fn test_shift_respects_inner_binders() {
    let goal = Goal::quantify(
        QuantifierKind::ForAll,
        vec![ParameterKind::Ty],
        Goal::Eq(EqGoal {
            a: bound_ty(0, 0).cast(),
            b: bound_ty(1, 0).cast(),
        }),
    );
    let shifted = goal.shifted_in();
    let expected = Goal::quantify(
        QuantifierKind::ForAll,
        vec![ParameterKind::Ty],
        Goal::Eq(EqGoal {
            a: bound_ty(0, 0).cast(),
            b: bound_ty(2, 0).cast(),
        }),
    );
    assert_eq!(shifted, expected);
}

/// Substitution replaces innermost variables
#[test]
fn test_binders_substitute() {
    let binders = Binders::new(
        vec![ParameterKind::Ty, ParameterKind::Ty],
        implemented("Foo", vec![bound_ty(0, 1).cast(), bound_ty(0, 0).cast()]),
    );
    let result = binders.substitute(&[i32_ty().cast(), ty("String").cast()]);
    assert_eq!(
        result,
        implemented("Foo", vec![ty("String").cast(), i32_ty().cast()])
    );
}

/// Checked substitution rejects parameters of the wrong number or kind
#[test]
fn test_binders_try_substitute() {
    let binders = Binders::new(
        vec![ParameterKind::Ty],
        implemented("Foo", vec![bound_ty(0, 0).cast()]),
    );
    assert_eq!(
        binders.try_substitute(&[i32_ty().cast()]),
        Some(implemented("Foo", vec![i32_ty().cast()]))
    );
    assert_eq!(binders.try_substitute(&[]), None);
    assert_eq!(
        binders.try_substitute(&[i32_ty().cast(), i32_ty().cast()]),
        None
    );
    assert_eq!(binders.try_substitute(&[Lifetime::Static.cast()]), None);
}

/// Substituting under a nested binder reaches the right variables
#[test]
fn test_substitute_under_binder() {
    let binders = Binders::new(
        vec![ParameterKind::Ty],
        Goal::quantify(
            QuantifierKind::ForAll,
            vec![ParameterKind::Ty],
            Goal::Eq(EqGoal {
                a: bound_ty(0, 0).cast(),
                b: bound_ty(1, 0).cast(),
            }),
        ),
    );
    let result = binders.substitute(&[i32_ty().cast()]);
    let expected = Goal::quantify(
        QuantifierKind::ForAll,
        vec![ParameterKind::Ty],
        Goal::Eq(EqGoal {
            a: bound_ty(0, 0).cast(),
            b: i32_ty().cast(),
        }),
    );
    assert_eq!(result, expected);
}

/// Substituted values containing bound variables are shifted under binders
#[test]
fn test_substitute_shifts_replacement() {
    let binders = Binders::new(
        vec![ParameterKind::Ty],
        Goal::quantify(
            QuantifierKind::Exists,
            vec![ParameterKind::Ty],
            Goal::Eq(EqGoal {
                a: bound_ty(1, 0).cast(),
                b: bound_ty(0, 0).cast(),
            }),
        ),
    );
    // the replacement refers to a variable one binder further out
    let result = binders.substitute(&[bound_ty(0, 3).cast()]);
    let expected = Goal::quantify(
        QuantifierKind::Exists,
        vec![ParameterKind::Ty],
        Goal::Eq(EqGoal {
            a: bound_ty(1, 3).cast(),
            b: bound_ty(0, 0).cast(),
        }),
    );
    assert_eq!(result, expected);
}

/// Free variables beyond the substituted binder move out by one
#[test]
fn test_substitute_outer_free_vars() {
    let binders = Binders::new(vec![ParameterKind::Ty], bound_ty(1, 2));
    assert_eq!(binders.substitute(&[i32_ty().cast()]), bound_ty(0, 2));
}
