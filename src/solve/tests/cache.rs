use super::*;

fn program() -> Program {
    Program::new()
        .with_clause(rule(
            implemented("Eq", bound(0, 0)),
            vec![implemented("PartialEq", bound(0, 0))],
        ))
        .with_clause(fact(implemented("PartialEq", i32_ty())))
        .with_clause(fact(implemented("PartialEq", u32_ty())))
        .with_clause(rule(
            implemented("A", bound(0, 0)),
            vec![implemented("A", bound(0, 0))],
        ))
        .with_clause(fact(implemented("A", i32_ty())))
        .with_coinductive_trait(TraitId::new("Send"))
        .with_clause(rule(
            implemented("Send", Ty::adt("Box", vec![bound(0, 0).cast()])),
            vec![implemented("Send", Ty::adt("Box", vec![bound(0, 0).cast()]))],
        ))
        .with_clause(ProgramClause::new(
            Vec::new(),
            implemented("Send", foo()),
            vec![implemented("Bar", foo()).into_goal()],
        ))
        .with_clause(ProgramClause::new(
            Vec::new(),
            implemented("Bar", foo()),
            vec![implemented("Send", foo()).into_goal()],
        ))
}

fn foo() -> Ty {
    Ty::adt("Foo", Vec::new())
}

fn goals() -> Vec<UCanonicalGoal> {
    vec![
        query(implemented("Eq", i32_ty()).into_goal()),
        query(implemented("Eq", var(0)).into_goal()),
        query(implemented("Eq", string_ty()).into_goal()),
        query(implemented("A", i32_ty()).into_goal()),
        query(implemented("A", var(0)).into_goal()),
        query(implemented("Send", Ty::adt("Box", vec![i32_ty().cast()])).into_goal()),
        query(Goal::Any(vec![
            implemented("Eq", string_ty()).into_goal(),
            implemented("A", u32_ty()).into_goal(),
        ])),
        query(implemented("Send", foo()).into_goal()),
        query(implemented("Bar", foo()).into_goal()),
    ]
}

fn no_cache() -> SolverChoice {
    SolverChoice::Recursive {
        overflow_depth: 100,
        max_size: 30,
        caching_enabled: false,
        overflow_policy: OverflowPolicy::NoGuidance,
    }
}

/// Caching never changes an answer
#[test]
fn test_cache_transparency() {
    let program = program();
    let cached = Solver::new(SolverChoice::default()).unwrap();
    let uncached = Solver::new(no_cache()).unwrap();

    // twice, so the second round is served from the cache
    for _ in 0..2 {
        for goal in goals() {
            assert_eq!(
                cached.solve(&program, &goal),
                uncached.solve(&program, &goal),
                "goal {}",
                goal
            );
        }
    }
    assert!(cached.cache_stats().hits > 0);
    assert_eq!(uncached.cache_stats().entries, 0);
}

/// An answer does not depend on what the cache already holds
#[test]
fn test_warmed_cache_transparency() {
    let program = program();
    let goals = goals();
    let uncached = Solver::new(no_cache()).unwrap();

    for (index, goal) in goals.iter().enumerate() {
        let warmed = Solver::new(SolverChoice::default()).unwrap();
        for other in goals.iter().rev().filter(|other| *other != goal) {
            let _ = warmed.solve(&program, other);
        }
        assert_eq!(
            warmed.solve(&program, goal),
            uncached.solve(&program, goal),
            "goal {} ({})",
            index,
            goal
        );
    }
}

/// Repeated queries hit the cache; clearing empties it
#[test]
fn test_cache_stats_and_clear() {
    let program = program();
    let solver = Solver::new(SolverChoice::default()).unwrap();
    let goal = query(implemented("Eq", i32_ty()).into_goal());

    solver.solve(&program, &goal).unwrap();
    let first = solver.cache_stats();
    assert!(first.entries >= 2);
    assert_eq!(first.hits, 0);

    solver.solve(&program, &goal).unwrap();
    let second = solver.cache_stats();
    assert_eq!(second.hits, 1);
    assert!(second.hit_rate() > 0.0);

    solver.clear_cache();
    assert_eq!(solver.cache_stats(), CacheStats::default());
}

/// Batch answers equal sequential ones, in input order
#[test]
fn test_solve_batch_matches_sequential() {
    let program = program();
    let goals = goals();
    let batch = Solver::new(SolverChoice::default())
        .unwrap()
        .solve_batch(&program, &goals);
    let sequential = Solver::new(SolverChoice::default()).unwrap();
    let expected: Vec<_> = goals
        .iter()
        .map(|goal| sequential.solve(&program, goal))
        .collect();
    assert_eq!(batch, expected);
}

/// Clones of a cache share entries
#[test]
fn test_answer_cache_shared() {
    let cache = AnswerCache::new();
    let other = cache.clone();
    let goal = query(implemented("Eq", i32_ty()).into_goal());

    assert!(cache.get(&goal).is_none());
    other.insert(goal.clone(), Ok(unique(Vec::new())));
    assert_eq!(cache.get(&goal), Some(Ok(unique(Vec::new()))));
    assert_eq!(cache.len(), 1);

    let stats = cache.stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hit_rate(), 50.0);
}

/// Hit rate of an unused cache
#[test]
fn test_hit_rate_empty() {
    assert_eq!(CacheStats::default().hit_rate(), 0.0);
}

/// Concurrent requests for one goal resolve it once
#[test]
fn test_solve_batch_duplicate_goals() {
    let program = program();
    let goal = query(implemented("Eq", i32_ty()).into_goal());
    let goals = vec![goal; 16];
    let solver = Solver::new(SolverChoice::default()).unwrap();

    let single = Solver::new(SolverChoice::default()).unwrap();
    single.solve(&program, &goals[0]).unwrap();

    let answers = solver.solve_batch(&program, &goals);
    assert!(answers
        .iter()
        .all(|answer| *answer == Ok(Some(unique(Vec::new())))));
    // one worker does the misses of a single solve; the rest wait and hit
    let stats = solver.cache_stats();
    assert_eq!(stats.misses, single.cache_stats().misses);
    assert_eq!(stats.hits, 15);
}

/// A second claim on a goal waits until the first is released
#[test]
fn test_claim_waits_for_release() {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    let cache = AnswerCache::new();
    let goal = query(implemented("Eq", i32_ty()).into_goal());
    let released = AtomicBool::new(false);

    let first = cache.claim(&goal);
    std::thread::scope(|scope| {
        let waiter = scope.spawn(|| {
            let _second = cache.claim(&goal);
            released.load(Ordering::SeqCst)
        });
        std::thread::sleep(Duration::from_millis(50));
        released.store(true, Ordering::SeqCst);
        drop(first);
        assert!(waiter.join().unwrap());
    });

    // other goals are never blocked
    let _eq = cache.claim(&goal);
    let _other = cache.claim(&query(implemented("Eq", u32_ty()).into_goal()));
}
