//! 程序数据库测试

use super::*;

fn i32_ty() -> Ty {
    Ty::scalar(Scalar::I32)
}

fn vec_of(ty: Ty) -> Ty {
    Ty::adt("Vec", vec![ty.cast()])
}

fn bound_ty(index: usize) -> Ty {
    BoundVar::new(DebruijnIndex::INNERMOST, index).to_ty()
}

fn implemented(
    trait_name: &str,
    ty: Ty,
) -> DomainGoal {
    DomainGoal::Implemented(TraitRef::new(TraitId::new(trait_name), vec![ty.cast()]))
}

fn well_formed(ty: Ty) -> Goal {
    DomainGoal::WellFormed(WellFormed::Ty(ty)).into_goal()
}

fn sample_program() -> Program {
    Program::new()
        .with_clause(ProgramClause::fact(implemented("Copy", i32_ty())))
        .with_clause(ProgramClause::new(
            vec![ParameterKind::Ty],
            implemented("Clone", vec_of(bound_ty(0))),
            vec![implemented("Clone", bound_ty(0)).into_goal()],
        ))
        .with_adt(
            AdtId::new("Vec"),
            vec![ParameterKind::Ty],
            vec![implemented("Sized", bound_ty(0)).into_goal()],
        )
        .with_coinductive_trait(TraitId::new("Send"))
        .with_non_enumerable_trait(TraitId::new("Sized"))
}

/// Only clauses whose consequence could match are returned
#[test]
fn test_clauses_relevant_to_filters() {
    let program = sample_program();
    let copy = program
        .clauses_relevant_to(&implemented("Copy", i32_ty()))
        .unwrap();
    assert_eq!(copy.len(), 1);

    let clone_vec = program
        .clauses_relevant_to(&implemented("Clone", vec_of(i32_ty())))
        .unwrap();
    assert_eq!(clone_vec.len(), 1);

    let clone_i32 = program
        .clauses_relevant_to(&implemented("Clone", i32_ty()))
        .unwrap();
    assert!(clone_i32.is_empty());

    // an unknown receiver matches every impl of the trait
    let unknown = program
        .clauses_relevant_to(&implemented("Clone", bound_ty(0)))
        .unwrap();
    assert_eq!(unknown.len(), 1);
}

/// Trait flags
#[test]
fn test_trait_flags() {
    let program = sample_program();
    assert!(program.is_coinductive(&TraitId::new("Send")));
    assert!(!program.is_coinductive(&TraitId::new("Copy")));
    assert!(!program.is_enumerable(&TraitId::new("Sized")));
    assert!(program.is_enumerable(&TraitId::new("Copy")));
}

/// Declared where clauses are instantiated with the type's parameters
#[test]
fn test_adt_well_formed_facts() {
    let program = sample_program();
    let facts = program
        .well_formed_facts_for(&WellFormed::Ty(vec_of(i32_ty())))
        .unwrap();
    assert_eq!(
        facts,
        vec![
            implemented("Sized", i32_ty()).into_goal(),
            well_formed(i32_ty()),
        ]
    );
}

/// Built-in types are well formed when their arguments are
#[test]
fn test_builtin_well_formed_facts() {
    let program = Program::new();
    let slice = Ty::apply(TypeName::Slice, vec![i32_ty().cast()]);
    assert_eq!(
        program.well_formed_facts_for(&WellFormed::Ty(slice)).unwrap(),
        vec![well_formed(i32_ty())]
    );
    assert!(program
        .well_formed_facts_for(&WellFormed::Ty(i32_ty()))
        .unwrap()
        .is_empty());

    let placeholder = PlaceholderIndex {
        ui: UniverseIndex(1),
        idx: 0,
    }
    .to_ty();
    assert!(program
        .well_formed_facts_for(&WellFormed::Ty(placeholder))
        .unwrap()
        .is_empty());
}

/// Unknown types and wrong arity are program errors
#[test]
fn test_well_formed_invalid_program() {
    let program = sample_program();
    let unknown = Ty::adt("HashMap", vec![i32_ty().cast(), i32_ty().cast()]);
    assert!(matches!(
        program.well_formed_facts_for(&WellFormed::Ty(unknown)),
        Err(DatabaseError::InvalidProgram(_))
    ));

    let wrong_arity = Ty::adt("Vec", Vec::new());
    assert!(matches!(
        program.well_formed_facts_for(&WellFormed::Ty(wrong_arity)),
        Err(DatabaseError::InvalidProgram(_))
    ));

    let wrong_kind = Ty::adt("Vec", vec![Lifetime::Static.cast()]);
    assert!(matches!(
        program.well_formed_facts_for(&WellFormed::Ty(wrong_kind)),
        Err(DatabaseError::InvalidProgram(_))
    ));
}

/// A trait reference with a parameter of the wrong kind is a program error
#[test]
fn test_trait_well_formed_wrong_kind() {
    let program = Program::new().with_trait(
        TraitId::new("Eq"),
        vec![ParameterKind::Ty],
        vec![implemented("PartialEq", bound_ty(0)).into_goal()],
    );
    let trait_ref = TraitRef::new(TraitId::new("Eq"), vec![Lifetime::Static.cast()]);
    assert!(matches!(
        program.well_formed_facts_for(&WellFormed::Trait(trait_ref)),
        Err(DatabaseError::InvalidProgram(_))
    ));
}

/// Trait well-formedness requires the impl and the trait's where clauses
#[test]
fn test_trait_well_formed_facts() {
    let program = Program::new().with_trait(
        TraitId::new("Eq"),
        vec![ParameterKind::Ty],
        vec![implemented("PartialEq", bound_ty(0)).into_goal()],
    );
    let trait_ref = TraitRef::new(TraitId::new("Eq"), vec![i32_ty().cast()]);
    let facts = program
        .well_formed_facts_for(&WellFormed::Trait(trait_ref))
        .unwrap();
    assert_eq!(
        facts,
        vec![
            implemented("Eq", i32_ty()).into_goal(),
            implemented("PartialEq", i32_ty()).into_goal(),
            well_formed(i32_ty()),
        ]
    );
}

/// Validation accepts well-scoped clauses
#[test]
fn test_validate_ok() {
    assert!(sample_program().validate().is_ok());
}

/// Validation rejects unbound variables and kind mismatches
#[test]
fn test_validate_rejects_bad_binders() {
    let unbound = Program::new().with_clause(ProgramClause::fact(implemented("Foo", bound_ty(0))));
    assert!(matches!(unbound.validate(), Err(ProgramError::Invalid(_))));

    let wrong_kind = Program::new().with_clause(ProgramClause::new(
        vec![ParameterKind::Lifetime],
        implemented("Foo", bound_ty(0)),
        Vec::new(),
    ));
    let err = wrong_kind.validate().unwrap_err();
    assert!(err.to_string().contains("clause 0"));

    let escaping = Program::new().with_clause(ProgramClause::new(
        vec![ParameterKind::Ty],
        implemented("Foo", BoundVar::new(DebruijnIndex::new(1), 0).to_ty()),
        Vec::new(),
    ));
    assert!(escaping.validate().is_err());
}

/// Program files survive a RON round trip
#[test]
fn test_program_file_ron_round_trip() {
    let file = ProgramFile {
        program: sample_program(),
        goals: vec![NamedGoal::new(
            "vec_clone",
            implemented("Clone", vec_of(InferenceVar::new(0).to_ty())).into_goal(),
        )],
    };
    let text = file.to_ron_string().unwrap();
    let parsed = ProgramFile::from_ron_str(&text).unwrap();
    assert_eq!(parsed, file);
}

/// Malformed RON is a parse error
#[test]
fn test_program_file_parse_error() {
    assert!(matches!(
        ProgramFile::from_ron_str("(program: ("),
        Err(ProgramError::Parse(_))
    ));
}

/// A missing file reports its path
#[test]
fn test_program_file_missing() {
    let err = ProgramFile::load(Path::new("/definitely/not/here.ron")).unwrap_err();
    assert!(err.to_string().contains("/definitely/not/here.ron"));
}

/// Named goals canonicalize their inference variables
#[test]
fn test_named_goal_query() {
    let goal = NamedGoal::new(
        "clone",
        implemented("Clone", vec_of(InferenceVar::new(3).to_ty())).into_goal(),
    );
    let query = goal.to_query();
    assert_eq!(query.free_vars.len(), 1);
    assert_eq!(query.goal.canonical.binders.len(), 1);
    assert_eq!(
        query.goal.canonical.value.goal,
        implemented("Clone", vec_of(bound_ty(0))).into_goal()
    );
}

/// Goals and their hypotheses may only use variables they quantify
#[test]
fn test_program_file_validates_goals() {
    let quantified = NamedGoal::new(
        "forall_clone",
        Goal::quantify(
            QuantifierKind::ForAll,
            vec![ParameterKind::Ty],
            implemented("Clone", vec_of(bound_ty(0))).into_goal(),
        ),
    );
    let ok = ProgramFile {
        program: sample_program(),
        goals: vec![quantified],
    };
    assert!(ok.validate().is_ok());

    let unbound = ProgramFile {
        program: sample_program(),
        goals: vec![NamedGoal::new(
            "unbound",
            implemented("Clone", bound_ty(0)).into_goal(),
        )],
    };
    let err = unbound.validate().unwrap_err();
    assert!(err.to_string().contains("goal `unbound`"));
    let text = unbound.to_ron_string().unwrap();
    assert!(matches!(
        ProgramFile::from_ron_str(&text),
        Err(ProgramError::Invalid(_))
    ));

    let mut bad_hypothesis = NamedGoal::new("hyp", implemented("Copy", i32_ty()).into_goal());
    bad_hypothesis.environment = Environment::new().add_clauses(vec![ProgramClause::fact(
        implemented("Copy", bound_ty(0)),
    )]);
    let file = ProgramFile {
        program: sample_program(),
        goals: vec![bad_hypothesis],
    };
    assert!(matches!(file.validate(), Err(ProgramError::Invalid(_))));
}
