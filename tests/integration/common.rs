//! Programs shared by the integration tests

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use yaoxiang_solve::ir::*;
use yaoxiang_solve::{NamedGoal, Program, ProgramFile};

pub fn implemented(
    trait_name: &str,
    ty: Ty,
) -> DomainGoal {
    DomainGoal::Implemented(TraitRef::new(TraitId::new(trait_name), vec![ty.cast()]))
}

pub fn i32_ty() -> Ty {
    Ty::scalar(Scalar::I32)
}

pub fn string_ty() -> Ty {
    Ty::adt("String", Vec::new())
}

fn nat(n: usize) -> Ty {
    (0..n).fold(Ty::adt("Z", Vec::new()), |ty, _| Ty::adt("S", vec![ty.cast()]))
}

/// `Eq`/`PartialEq` for `i32`, a hypothetical `Foo`, and a disjunction
pub fn traits_file() -> ProgramFile {
    let t = || BoundVar::new(DebruijnIndex::INNERMOST, 0).to_ty();
    let program = Program::new()
        .with_clause(ProgramClause::new(
            vec![ParameterKind::Ty],
            implemented("Eq", t()),
            vec![implemented("PartialEq", t()).into_goal()],
        ))
        .with_clause(ProgramClause::fact(implemented("PartialEq", i32_ty())))
        .with_clause(ProgramClause::fact(implemented("Foo", i32_ty())));

    // forall<T> { if (T: Foo) { T: Foo } }
    let hypothetical = Goal::quantify(
        QuantifierKind::ForAll,
        vec![ParameterKind::Ty],
        implemented("Foo", t()).into_goal().implied_by(vec![ProgramClause::fact(
            implemented("Foo", BoundVar::new(DebruijnIndex::ONE, 0).to_ty()),
        )]),
    );

    ProgramFile {
        program,
        goals: vec![
            NamedGoal::new("eq_i32", implemented("Eq", i32_ty()).into_goal()),
            NamedGoal::new("eq_string", implemented("Eq", string_ty()).into_goal()),
            NamedGoal::new(
                "eq_var",
                implemented("Eq", InferenceVar::new(0).to_ty()).into_goal(),
            ),
            NamedGoal::new("hypothetical", hypothetical),
            NamedGoal::new(
                "either",
                Goal::Any(vec![
                    implemented("Foo", i32_ty()).into_goal(),
                    implemented("Foo", string_ty()).into_goal(),
                ]),
            ),
            NamedGoal::new(
                "not_foo_string",
                Goal::Not(Box::new(implemented("Foo", string_ty()).into_goal())),
            ),
        ],
    }
}

/// `Z: Even`, `forall<N> { S<S<N>>: Even :- N: Even }` with `S^4<Z>: Even`
pub fn even_file() -> ProgramFile {
    let n = BoundVar::new(DebruijnIndex::INNERMOST, 0).to_ty();
    let s = |ty: Ty| Ty::adt("S", vec![ty.cast()]);
    let program = Program::new()
        .with_clause(ProgramClause::fact(implemented("Even", nat(0))))
        .with_clause(ProgramClause::new(
            vec![ParameterKind::Ty],
            implemented("Even", s(s(n.clone()))),
            vec![implemented("Even", n).into_goal()],
        ));
    ProgramFile {
        program,
        goals: vec![NamedGoal::new("even_4", implemented("Even", nat(4)).into_goal())],
    }
}

pub fn write_file(
    dir: &TempDir,
    name: &str,
    file: &ProgramFile,
) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, file.to_ron_string().unwrap()).unwrap();
    path
}
