//! 在单个推断表内求解一组义务的合取

use super::search_graph::Minimums;
use super::RecursiveContext;
use crate::infer::truncate::needs_truncation;
use crate::infer::{
    Canonicalized, InferenceTable, UCanonicalized, UnificationResult, UniverseMap, Variance, Zip,
};
use crate::ir::*;
use crate::solve::solution::{Guidance, Solution};
use tracing::debug;

#[derive(Debug, Clone)]
enum Obligation {
    /// 必须证明
    Prove(InEnvironment<Goal>),
    /// 必须反驳（`not { .. }`）
    Refute(InEnvironment<Goal>),
}

/// Answer to a positive obligation, with what is needed to apply it.
struct PositiveSolution {
    free_vars: Vec<InferenceVar>,
    universes: UniverseMap,
    solution: Solution,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NegativeSolution {
    Refuted,
    Ambiguous,
}

enum Outcome {
    Complete,
    Incomplete,
}

/// 单个目标的待处理义务，在私有推断表中求解
///
/// `subst` 保存代表被求解规范目标绑定器的表变量；最终答案以它们表示。
pub(super) struct Fulfill<'s, 'db> {
    solver: &'s mut RecursiveContext<'db>,
    infer: InferenceTable,
    subst: Substitution,
    obligations: Vec<Obligation>,
    constraints: Vec<InEnvironment<Constraint>>,
    /// Some obligation can never be decided (`CannotProve` or an oversized
    /// subgoal)
    cannot_prove: bool,
}

impl<'s, 'db> Fulfill<'s, 'db> {
    /// 把 `goal` 拆成义务来证明
    pub(super) fn new_with_simplification(
        solver: &'s mut RecursiveContext<'db>,
        infer: InferenceTable,
        subst: Substitution,
        goal: InEnvironment<Goal>,
    ) -> Fallible<Self> {
        let mut fulfill = Fulfill::new(solver, infer, subst);
        fulfill.push_goal(&goal.environment, goal.goal)?;
        Ok(fulfill)
    }

    /// 应用 `clause` 证明 `goal`：与其结论合一，并把其条件作为义务
    pub(super) fn new_with_clause(
        solver: &'s mut RecursiveContext<'db>,
        infer: InferenceTable,
        subst: Substitution,
        goal: InEnvironment<DomainGoal>,
        clause: &Binders<ProgramClauseImplication>,
    ) -> Fallible<Self> {
        let mut fulfill = Fulfill::new(solver, infer, subst);
        let ProgramClauseImplication {
            consequence,
            conditions,
            priority: _,
        } = fulfill.infer.instantiate_binders_existentially(clause);
        debug!(%consequence, conditions = conditions.len(), "applying clause");

        fulfill.unify(&goal.environment, &goal.goal, &consequence)?;
        for condition in conditions {
            fulfill.push_goal(&goal.environment, condition)?;
        }
        Ok(fulfill)
    }

    fn new(
        solver: &'s mut RecursiveContext<'db>,
        infer: InferenceTable,
        subst: Substitution,
    ) -> Self {
        Fulfill {
            solver,
            infer,
            subst,
            obligations: Vec::new(),
            constraints: Vec::new(),
            cannot_prove: false,
        }
    }

    fn push_goal(
        &mut self,
        environment: &Environment,
        goal: Goal,
    ) -> Fallible<()> {
        match goal {
            Goal::Quantified(QuantifierKind::ForAll, body) => {
                let body = self.infer.instantiate_binders_universally(&body);
                self.push_goal(environment, *body)?;
            }
            Goal::Quantified(QuantifierKind::Exists, body) => {
                let body = self.infer.instantiate_binders_existentially(&body);
                self.push_goal(environment, *body)?;
            }
            Goal::Implies(clauses, body) => {
                let environment = environment.add_clauses(clauses);
                self.push_goal(&environment, *body)?;
            }
            Goal::All(goals) => {
                for goal in goals {
                    self.push_goal(environment, goal)?;
                }
            }
            Goal::Not(body) => {
                self.obligations
                    .push(Obligation::Refute(InEnvironment::new(environment, *body)));
            }
            Goal::Domain(DomainGoal::LifetimeOutlives { a, b }) => {
                self.push_constraint(InEnvironment::new(environment, Constraint::Outlives(a, b)));
            }
            goal @ (Goal::Domain(_) | Goal::Any(_)) => {
                self.obligations
                    .push(Obligation::Prove(InEnvironment::new(environment, goal)));
            }
            Goal::Eq(EqGoal { a, b }) => {
                self.unify(environment, &a, &b)?;
            }
            Goal::Subtype(SubtypeGoal { a, b }) => {
                self.relate(environment, Variance::Covariant, &a, &b)?;
            }
            Goal::CannotProve => {
                debug!("pushed CannotProve");
                self.cannot_prove = true;
            }
        }
        Ok(())
    }

    fn unify<T: Zip + ?Sized>(
        &mut self,
        environment: &Environment,
        a: &T,
        b: &T,
    ) -> Fallible<()> {
        self.relate(environment, Variance::Invariant, a, b)
    }

    fn relate<T: Zip + ?Sized>(
        &mut self,
        environment: &Environment,
        variance: Variance,
        a: &T,
        b: &T,
    ) -> Fallible<()> {
        let UnificationResult { goals, constraints } =
            self.infer.relate(environment, variance, a, b)?;
        for constraint in constraints {
            self.push_constraint(constraint);
        }
        self.obligations.extend(
            goals
                .into_iter()
                .map(|goal| Obligation::Prove(goal.map(Goal::Domain))),
        );
        Ok(())
    }

    fn push_constraint(
        &mut self,
        constraint: InEnvironment<Constraint>,
    ) {
        if !self.constraints.contains(&constraint) {
            self.constraints.push(constraint);
        }
    }

    fn prove(
        &mut self,
        goal: &InEnvironment<Goal>,
        minimums: &mut Minimums,
    ) -> Fallible<PositiveSolution> {
        if needs_truncation(&self.infer, self.solver.max_size, goal) {
            debug!(goal = %goal, "goal too large, truncated");
            self.cannot_prove = true;
            return Ok(PositiveSolution {
                free_vars: Vec::new(),
                universes: UniverseMap::new(),
                solution: Solution::Ambig(Guidance::Unknown),
            });
        }

        let Canonicalized {
            quantified,
            free_vars,
        } = self.infer.canonicalize(goal);
        let UCanonicalized {
            quantified,
            universes,
        } = self.infer.u_canonicalize(&quantified);
        let solution = self.solver.solve_goal(quantified, minimums)?;
        Ok(PositiveSolution {
            free_vars,
            universes,
            solution,
        })
    }

    fn refute(
        &mut self,
        goal: &InEnvironment<Goal>,
        minimums: &mut Minimums,
    ) -> Fallible<NegativeSolution> {
        let canonical = match self.infer.invert_then_canonicalize(goal) {
            Some(canonical) => canonical,
            None => {
                // more inference may make the goal ground later
                debug!(goal = %goal, "negative goal not ground");
                return Ok(NegativeSolution::Ambiguous);
            }
        };
        let UCanonicalized { quantified, .. } = self.infer.u_canonicalize(&canonical);
        match self.solver.solve_goal(quantified, minimums) {
            Ok(solution) if solution.is_unique() => Err(NoSolution),
            Ok(_) => Ok(NegativeSolution::Ambiguous),
            Err(NoSolution) => Ok(NegativeSolution::Refuted),
        }
    }

    /// 把规范化进子目标的变量与子目标的答案合一
    fn apply_solution(
        &mut self,
        free_vars: Vec<InferenceVar>,
        universes: &UniverseMap,
        answer: &Canonical<ConstrainedSubst>,
    ) -> Fallible<()> {
        let answer = universes.map_from_canonical(answer);
        let ConstrainedSubst { subst, constraints } = self.infer.instantiate_canonical(&answer);
        let environment = Environment::new();
        for (index, var) in free_vars.into_iter().enumerate() {
            let value = subst.at(index).ok_or(NoSolution)?;
            let var = var.to_parameter(value.kind());
            self.unify(&environment, &var, value)?;
        }
        for constraint in constraints {
            self.push_constraint(constraint);
        }
        Ok(())
    }

    /// 按顺序处理义务；只要答案带来新信息就重复
    fn fulfill(
        &mut self,
        minimums: &mut Minimums,
    ) -> Fallible<Outcome> {
        let mut progress = true;
        while progress {
            progress = false;
            debug!(obligations = self.obligations.len(), "start of round");

            let round = std::mem::take(&mut self.obligations);
            let mut ambiguous = Vec::new();
            for obligation in round {
                let is_ambiguous = match &obligation {
                    Obligation::Prove(goal) => {
                        let PositiveSolution {
                            free_vars,
                            universes,
                            solution,
                        } = self.prove(goal, minimums)?;
                        if let Some(answer) = solution.constrained_subst() {
                            let informative = !answer.value.subst.is_identity()
                                || !answer.value.constraints.is_empty();
                            if informative {
                                self.apply_solution(free_vars, &universes, &answer)?;
                                progress = true;
                            }
                        }
                        solution.is_ambig()
                    }
                    Obligation::Refute(goal) => {
                        self.refute(goal, minimums)? == NegativeSolution::Ambiguous
                    }
                };
                if is_ambiguous {
                    ambiguous.push(obligation);
                }
            }

            // obligations pushed during the round go after the retained ones
            ambiguous.append(&mut self.obligations);
            self.obligations = ambiguous;
            debug!(obligations = self.obligations.len(), "end of round");
        }

        if self.obligations.is_empty() {
            Ok(Outcome::Complete)
        } else {
            Ok(Outcome::Incomplete)
        }
    }

    /// Solve every obligation and package what was learned about the
    /// goal's variables.
    pub(super) fn solve(
        mut self,
        minimums: &mut Minimums,
    ) -> Fallible<Solution> {
        let outcome = self.fulfill(minimums)?;

        if self.cannot_prove {
            debug!("cannot prove");
            return Ok(Solution::Ambig(Guidance::CannotProve));
        }

        if let Outcome::Complete = outcome {
            let constrained = ConstrainedSubst {
                subst: self.subst.clone(),
                constraints: std::mem::take(&mut self.constraints),
            };
            return Ok(Solution::Unique(self.infer.canonicalize(&constrained).quantified));
        }

        let canonical_subst = self.infer.canonicalize(&self.subst).quantified;
        if !canonical_subst.value.is_identity() {
            return Ok(Solution::Ambig(Guidance::Definite(canonical_subst)));
        }

        // 没有强制结果；采用第一个给出建议的剩余义务的建议
        let obligations = std::mem::take(&mut self.obligations);
        for obligation in obligations {
            let Obligation::Prove(goal) = obligation else {
                continue;
            };
            let Ok(PositiveSolution {
                free_vars,
                universes,
                solution,
            }) = self.prove(&goal, minimums)
            else {
                continue;
            };
            if let Some(answer) = solution.suggested_subst() {
                if self.apply_solution(free_vars, &universes, &answer).is_ok() {
                    let suggested = self.infer.canonicalize(&self.subst).quantified;
                    return Ok(Solution::Ambig(Guidance::Suggested(suggested)));
                }
                break;
            }
        }
        Ok(Solution::Ambig(Guidance::Unknown))
    }
}
