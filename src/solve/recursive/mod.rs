//! 递归求解器
//!
//! 目标按深度优先求解。当前路径上的每个目标都在 [`Stack`](stack::Stack) 上，
//! 并在 [`SearchGraph`](search_graph::SearchGraph) 中有一个节点。子目标回指栈上的目标时：
//! - 环上所有目标都是余归纳的：环即证明
//! - 环上同时有归纳和余归纳目标：环不是证明，子目标无解
//! - 否则子目标看到该目标的临时答案，该目标被反复求解直到答案不再变化
//!
//! 归纳目标的临时答案从“无解”开始，因此没有其他出路的环会失败；余归纳目标从“平凡为真”开始。

mod clauses;
mod fulfill;
mod search_graph;
mod stack;

use self::clauses::{is_coinductive_goal, program_clauses_for_goal};
use self::fulfill::Fulfill;
use self::search_graph::{DepthFirstNumber, Minimums, SearchGraph};
use self::stack::{Stack, StackDepth};
use super::cache::AnswerCache;
use super::database::{Database, DatabaseError};
use super::solution::{Guidance, Solution};
use super::{OverflowPolicy, SolverError};
use crate::infer::InferenceTable;
use crate::ir::*;
use tracing::{debug, info, trace};

/// 当前查询提前停止的原因
#[derive(Debug, Clone, PartialEq, Eq)]
enum Abort {
    Cancelled,
    InvalidProgram(String),
}

impl From<Abort> for SolverError {
    fn from(abort: Abort) -> SolverError {
        match abort {
            Abort::Cancelled => SolverError::Cancelled,
            Abort::InvalidProgram(message) => SolverError::InvalidProgram(message),
        }
    }
}

/// 一次递归搜索的限制
#[derive(Debug, Clone, Copy)]
pub(crate) struct RecursiveLimits {
    pub(crate) overflow_depth: usize,
    pub(crate) max_size: usize,
    pub(crate) overflow_policy: OverflowPolicy,
}

/// 一次顶层查询的状态
pub(crate) struct RecursiveContext<'db> {
    db: &'db dyn Database,
    stack: Stack,
    search_graph: SearchGraph,
    /// 禁用缓存时为 `None`
    cache: Option<&'db AnswerCache>,
    max_size: usize,
    overflow_policy: OverflowPolicy,
    should_continue: &'db (dyn Fn() -> bool + Sync),
    abort: Option<Abort>,
}

impl<'db> RecursiveContext<'db> {
    pub(crate) fn new(
        db: &'db dyn Database,
        limits: RecursiveLimits,
        cache: Option<&'db AnswerCache>,
        should_continue: &'db (dyn Fn() -> bool + Sync),
    ) -> Self {
        RecursiveContext {
            db,
            stack: Stack::new(limits.overflow_depth),
            search_graph: SearchGraph::new(),
            cache,
            max_size: limits.max_size,
            overflow_policy: limits.overflow_policy,
            should_continue,
            abort: None,
        }
    }

    /// 求解顶层目标。`None` 表示目标被反驳。
    pub(crate) fn solve_root_goal(
        mut self,
        goal: &UCanonicalGoal,
    ) -> Result<Option<Solution>, SolverError> {
        debug!(goal = %goal, "solve root goal");
        let mut minimums = Minimums::new();
        let answer = self.solve_goal(goal.clone(), &mut minimums);
        debug_assert!(self.stack.is_empty());
        if let Some(abort) = self.abort.take() {
            info!(?abort, "query aborted");
            return Err(abort.into());
        }
        Ok(answer.ok())
    }

    /// 求解规范目标，先查缓存和进行中的目标
    pub(super) fn solve_goal(
        &mut self,
        goal: UCanonicalGoal,
        minimums: &mut Minimums,
    ) -> Fallible<Solution> {
        if self.abort.is_none() && !(self.should_continue)() {
            self.abort = Some(Abort::Cancelled);
        }
        if self.abort.is_some() {
            return Ok(Solution::Ambig(Guidance::Unknown));
        }

        if let Some(cache) = self.cache {
            if let Some(answer) = cache.get(&goal) {
                trace!(goal = %goal, "cache hit");
                return answer;
            }
        }

        if let Some(dfn) = self.search_graph.lookup(&goal) {
            let node = &self.search_graph[dfn];
            minimums.update_from(node.links);
            if let Some(depth) = node.stack_depth {
                if self.stack.coinductive_cycle_from(depth) {
                    debug!(goal = %goal, "coinductive cycle");
                    return Ok(trivial_solution(&goal));
                }
                if self.stack.mixed_inductive_coinductive_cycle_from(depth) {
                    debug!(goal = %goal, "mixed inductive/coinductive cycle");
                    return Err(NoSolution);
                }
                debug!(goal = %goal, "inductive cycle");
                self.stack[depth].flag_cycle();
            }
            return self.search_graph[dfn].solution.clone();
        }

        if self.stack.is_full() {
            info!(goal = %goal, depth = self.stack.len(), "overflow");
            minimums.overflowed = true;
            return Ok(Solution::Ambig(Guidance::Overflow));
        }

        let coinductive = is_coinductive_goal(self.db, &goal.canonical.value.goal);
        let depth = self.stack.push(coinductive);
        let provisional = if coinductive {
            Ok(trivial_solution(&goal))
        } else {
            Err(NoSolution)
        };
        let dfn = self.search_graph.insert(&goal, depth, provisional);

        let subgoal_minimums = self.solve_new_subgoal(&goal, depth, dfn);

        let node = &mut self.search_graph[dfn];
        node.links = subgoal_minimums;
        node.stack_depth = None;
        if subgoal_minimums.overflowed {
            node.solution = apply_overflow_policy(self.overflow_policy, node.solution.clone());
        }
        let result = node.solution.clone();
        self.stack.pop(depth);
        minimums.update_from(subgoal_minimums);

        // 强连通分量的头：从 `dfn` 起的节点都已确定
        if subgoal_minimums.positive >= dfn {
            match self.cache {
                Some(cache) if self.abort.is_none() && !subgoal_minimums.overflowed => {
                    self.search_graph.move_to_cache(dfn, cache);
                }
                _ => self.search_graph.rollback_to(dfn),
            }
        }

        debug!(goal = %goal, result = %DisplayAnswer(&result), "solved");
        result
    }

    /// 迭代直到目标答案到达不动点
    fn solve_new_subgoal(
        &mut self,
        goal: &UCanonicalGoal,
        depth: StackDepth,
        dfn: DepthFirstNumber,
    ) -> Minimums {
        loop {
            let mut minimums = Minimums::new();
            let (answer, priority) = self.solve_iteration(goal, &mut minimums);

            if self.abort.is_some() || !self.stack[depth].read_and_reset_cycle_flag() {
                let node = &mut self.search_graph[dfn];
                node.solution = answer;
                node.solution_priority = priority;
                return minimums;
            }

            let node = &self.search_graph[dfn];
            let (answer, priority) = merge_answers(
                &goal.canonical.value.goal,
                (node.solution.clone(), node.solution_priority),
                (answer, priority),
            );
            if node.solution == answer {
                return minimums;
            }

            debug!(goal = %goal, answer = %DisplayAnswer(&answer), "answer changed, iterating");
            let answer_is_ambig = matches!(answer, Ok(Solution::Ambig(_)));
            let node = &mut self.search_graph[dfn];
            node.solution = answer;
            node.solution_priority = priority;
            // an ambiguous answer can only get more ambiguous
            if answer_is_ambig {
                return minimums;
            }
            self.search_graph.rollback_to(dfn + 1);
        }
    }

    /// 用当前临时答案尝试求解一次目标
    fn solve_iteration(
        &mut self,
        goal: &UCanonicalGoal,
        minimums: &mut Minimums,
    ) -> (Fallible<Solution>, ClausePriority) {
        let canonical = &goal.canonical;
        match &canonical.value.goal {
            Goal::Domain(domain_goal) => {
                let clauses = program_clauses_for_goal(
                    self.db,
                    &canonical.value.environment,
                    domain_goal,
                    &canonical.binders,
                );
                match clauses {
                    Ok(clauses) => self.solve_from_clauses(goal, domain_goal, clauses, minimums),
                    Err(DatabaseError::Floundered) => {
                        (Ok(Solution::Ambig(Guidance::Unknown)), ClausePriority::High)
                    }
                    Err(DatabaseError::InvalidProgram(message)) => {
                        info!(%message, "invalid program");
                        self.abort = Some(Abort::InvalidProgram(message));
                        (Ok(Solution::Ambig(Guidance::Unknown)), ClausePriority::High)
                    }
                }
            }
            Goal::Any(branches) => {
                let mut result: Option<(Fallible<Solution>, ClausePriority)> = None;
                for branch in branches {
                    let answer = self.solve_via_simplification(goal, branch.clone(), minimums);
                    result = Some(match result {
                        None => answer,
                        Some(current) => merge_answers(&canonical.value.goal, current, answer),
                    });
                    if matches!(&result, Some((Ok(s), _)) if s.is_trivial_and_always_true()) {
                        break;
                    }
                }
                result.unwrap_or((Err(NoSolution), ClausePriority::High))
            }
            other => self.solve_via_simplification(goal, other.clone(), minimums),
        }
    }

    fn solve_from_clauses(
        &mut self,
        goal: &UCanonicalGoal,
        domain_goal: &DomainGoal,
        clauses: Vec<ProgramClause>,
        minimums: &mut Minimums,
    ) -> (Fallible<Solution>, ClausePriority) {
        let mut current: Option<(Solution, ClausePriority)> = None;
        for clause in clauses {
            let priority = clause.0.value.priority;
            let (table, subst, in_env) = InferenceTable::from_canonical(
                goal.universes,
                &goal.canonical.clone().map(|value| InEnvironment {
                    environment: value.environment,
                    goal: domain_goal.clone(),
                }),
            );
            // 假设引用目标的规范变量；程序子句是封闭的，原样通过
            let clause = subst.apply(&clause);
            let answer = Fulfill::new_with_clause(self, table, subst, in_env, &clause.0)
                .and_then(|fulfill| fulfill.solve(minimums));
            match answer {
                Ok(solution) => {
                    trace!(%clause, %solution, ?priority, "clause applies");
                    current = Some(match current {
                        None => (solution, priority),
                        Some((current, current_priority)) => with_priorities(
                            domain_goal,
                            current,
                            current_priority,
                            solution,
                            priority,
                        ),
                    });
                }
                Err(NoSolution) => trace!(%clause, "clause does not apply"),
            }
            if matches!(&current, Some((s, _)) if s.is_trivial_and_always_true()) {
                break;
            }
            if self.abort.is_some() {
                break;
            }
        }
        match current {
            Some((solution, priority)) => (Ok(solution), priority),
            None => (Err(NoSolution), ClausePriority::High),
        }
    }

    /// Solve `body` under the binders and environment of `goal`.
    fn solve_via_simplification(
        &mut self,
        goal: &UCanonicalGoal,
        body: Goal,
        minimums: &mut Minimums,
    ) -> (Fallible<Solution>, ClausePriority) {
        let (table, subst, in_env) = InferenceTable::from_canonical(
            goal.universes,
            &goal.canonical.clone().map(|value| InEnvironment {
                environment: value.environment,
                goal: body,
            }),
        );
        let answer = Fulfill::new_with_simplification(self, table, subst, in_env)
            .and_then(|fulfill| fulfill.solve(minimums));
        (answer, ClausePriority::High)
    }
}

/// 把 `goal` 每个变量绑定到自身的 `Unique` 答案
fn trivial_solution(goal: &UCanonicalGoal) -> Solution {
    Solution::Unique(Canonical {
        value: ConstrainedSubst {
            subst: goal.trivial_substitution(),
            constraints: Vec::new(),
        },
        binders: goal.canonical.binders.clone(),
    })
}

fn apply_overflow_policy(
    policy: OverflowPolicy,
    answer: Fallible<Solution>,
) -> Fallible<Solution> {
    match answer {
        Ok(Solution::Ambig(guidance)) => {
            let guidance = match (policy, guidance) {
                (OverflowPolicy::PartialGuidance, Guidance::Definite(subst))
                    if !subst.value.is_identity() =>
                {
                    Guidance::Definite(subst)
                }
                _ => Guidance::Overflow,
            };
            Ok(Solution::Ambig(guidance))
        }
        other => other,
    }
}

/// 合并同一目标的两个答案；反驳不贡献任何内容
fn merge_answers(
    goal: &Goal,
    (a, prio_a): (Fallible<Solution>, ClausePriority),
    (b, prio_b): (Fallible<Solution>, ClausePriority),
) -> (Fallible<Solution>, ClausePriority) {
    match (a, b) {
        (Ok(a), Ok(b)) => {
            let (solution, priority) = match goal {
                Goal::Domain(domain_goal) => with_priorities(domain_goal, a, prio_a, b, prio_b),
                _ => (a.combine(b), prio_a),
            };
            (Ok(solution), priority)
        }
        (Ok(a), Err(_)) => (Ok(a), prio_a),
        (Err(_), Ok(b)) => (Ok(b), prio_b),
        (Err(_), Err(_)) => (Err(NoSolution), prio_a),
    }
}

/// 合并不同优先级子句的答案
///
/// 假设与程序子句对相同输入回答目标时，假设覆盖程序子句；更具体的假设不得遮蔽通用的 impl。
fn with_priorities(
    goal: &DomainGoal,
    a: Solution,
    prio_a: ClausePriority,
    b: Solution,
    prio_b: ClausePriority,
) -> (Solution, ClausePriority) {
    match (prio_a, prio_b) {
        (ClausePriority::High, ClausePriority::Low) | (ClausePriority::Low, ClausePriority::High) => {
            let (higher, lower) = if prio_a == ClausePriority::High {
                (a, b)
            } else {
                (b, a)
            };
            if calculate_inputs(goal, &higher) == calculate_inputs(goal, &lower) {
                (higher, ClausePriority::High)
            } else {
                (higher.combine(lower), ClausePriority::High)
            }
        }
        _ => (a.combine(b), prio_a),
    }
}

/// Parameters that select the answer; only projections have any.
fn calculate_inputs(
    goal: &DomainGoal,
    solution: &Solution,
) -> Vec<Parameter> {
    let goal = match solution.constrained_subst() {
        Some(answer) => answer.value.subst.apply(goal),
        None => goal.clone(),
    };
    match goal {
        DomainGoal::Normalize(normalize) => normalize.alias.parameters,
        _ => Vec::new(),
    }
}

struct DisplayAnswer<'a>(&'a Fallible<Solution>);

impl std::fmt::Display for DisplayAnswer<'_> {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self.0 {
            Ok(solution) => write!(f, "{}", solution),
            Err(NoSolution) => write!(f, "no solution"),
        }
    }
}
