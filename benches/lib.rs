//! # YaoXiang Solve benchmarks
//!
//! ## Groups
//! - `solve`: single queries, with and without the answer cache
//! - `batch`: many independent queries on the rayon pool
//!
//! ## Usage
//! ```bash
//! cargo bench          # everything
//! cargo bench solve    # single queries only
//! ```

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use yaoxiang_solve::infer::canonicalize_query;
use yaoxiang_solve::ir::*;
use yaoxiang_solve::{OverflowPolicy, Program, Solver, SolverChoice};

fn implemented(
    trait_name: &str,
    ty: Ty,
) -> DomainGoal {
    DomainGoal::Implemented(TraitRef::new(TraitId::new(trait_name), vec![ty.cast()]))
}

fn nat(n: usize) -> Ty {
    (0..n).fold(Ty::adt("Z", Vec::new()), |ty, _| Ty::adt("S", vec![ty.cast()]))
}

fn vec_of(
    depth: usize,
    ty: Ty,
) -> Ty {
    (0..depth).fold(ty, |ty, _| Ty::adt("Vec", vec![ty.cast()]))
}

fn query(goal: DomainGoal) -> UCanonicalGoal {
    canonicalize_query(&InEnvironment::new(&Environment::new(), goal.into_goal())).goal
}

/// Peano evenness plus `Vec<T>: Clone :- T: Clone`
fn program() -> Program {
    let t = || BoundVar::new(DebruijnIndex::INNERMOST, 0).to_ty();
    Program::new()
        .with_clause(ProgramClause::fact(implemented("Even", nat(0))))
        .with_clause(ProgramClause::new(
            vec![ParameterKind::Ty],
            implemented("Even", Ty::adt("S", vec![Ty::adt("S", vec![t().cast()]).cast()])),
            vec![implemented("Even", t()).into_goal()],
        ))
        .with_clause(ProgramClause::fact(implemented("Clone", Ty::scalar(Scalar::I32))))
        .with_clause(ProgramClause::new(
            vec![ParameterKind::Ty],
            implemented("Clone", vec_of(1, t())),
            vec![implemented("Clone", t()).into_goal()],
        ))
}

fn choice(caching_enabled: bool) -> SolverChoice {
    SolverChoice::Recursive {
        overflow_depth: SolverChoice::DEFAULT_OVERFLOW_DEPTH,
        max_size: 64,
        caching_enabled,
        overflow_policy: OverflowPolicy::NoGuidance,
    }
}

fn bench_solve(c: &mut Criterion) {
    let program = program();
    let mut group = c.benchmark_group("solve");
    for n in [10, 40] {
        let goal = query(implemented("Even", nat(n)));
        group.bench_with_input(BenchmarkId::new("even_fresh", n), &goal, |b, goal| {
            b.iter(|| {
                let solver = Solver::new(choice(true)).unwrap();
                black_box(solver.solve(&program, goal))
            })
        });
        group.bench_with_input(BenchmarkId::new("even_cached", n), &goal, |b, goal| {
            let solver = Solver::new(choice(true)).unwrap();
            b.iter(|| black_box(solver.solve(&program, goal)))
        });
    }
    let goal = query(implemented("Clone", vec_of(20, Ty::scalar(Scalar::I32))));
    group.bench_function("vec_clone_uncached", |b| {
        let solver = Solver::new(choice(false)).unwrap();
        b.iter(|| black_box(solver.solve(&program, &goal)))
    });
    group.finish();
}

fn bench_batch(c: &mut Criterion) {
    let program = program();
    let goals: Vec<_> = (0..64).map(|n| query(implemented("Even", nat(n)))).collect();
    c.bench_function("batch_even_64", |b| {
        b.iter(|| {
            let solver = Solver::new(choice(true)).unwrap();
            black_box(solver.solve_batch(&program, &goals))
        })
    });
}

criterion_group!(benches, bench_solve, bench_batch);
criterion_main!(benches);
