//! 领域目标的候选子句

use crate::ir::could_match::CouldMatch;
use crate::ir::*;
use crate::solve::database::{Database, DatabaseError};
use tracing::debug;

/// 可能证明 `goal` 的子句：先是匹配的假设，然后是程序子句，最后是目标主体的良构规则。
///
/// `goal` 是规范目标的值，其自由变量即 `binders` 描述的规范绑定器 `^0.i`。
pub(crate) fn program_clauses_for_goal(
    db: &dyn Database,
    environment: &Environment,
    goal: &DomainGoal,
    binders: &[CanonicalVarKind],
) -> Result<Vec<ProgramClause>, DatabaseError> {
    if flounders(db, goal) {
        debug!(%goal, "floundered");
        return Err(DatabaseError::Floundered);
    }

    let mut clauses: Vec<ProgramClause> = environment
        .clauses
        .iter()
        .filter(|clause| clause.could_match(goal))
        .cloned()
        .collect();
    clauses.extend(db.clauses_relevant_to(goal)?);

    if let DomainGoal::WellFormed(subject) = goal {
        let conditions = db.well_formed_facts_for(subject)?;
        clauses.push(ProgramClause(Binders::new(
            binders.iter().map(|binder| binder.kind).collect(),
            ProgramClauseImplication {
                consequence: goal.clone(),
                conditions,
                priority: ClausePriority::Low,
            },
        )));
    }

    debug!(%goal, candidates = clauses.len(), "program clauses");
    Ok(clauses)
}

/// 接收者未知时无法列出候选
fn flounders(
    db: &dyn Database,
    goal: &DomainGoal,
) -> bool {
    match goal {
        DomainGoal::Implemented(_) | DomainGoal::Normalize(_) => {
            let unknown_receiver = goal.self_ty().is_some_and(Ty::is_var);
            let enumerable = goal.trait_id().map_or(true, |id| db.is_enumerable(id));
            unknown_receiver && !enumerable
        }
        DomainGoal::WellFormed(WellFormed::Ty(ty)) => ty.is_var(),
        _ => false,
    }
}

/// 经过 `goal` 的环能否被接受为证明
pub(crate) fn is_coinductive_goal(
    db: &dyn Database,
    goal: &Goal,
) -> bool {
    match goal {
        Goal::Domain(DomainGoal::Implemented(trait_ref)) => db.is_coinductive(&trait_ref.trait_id),
        Goal::Domain(DomainGoal::WellFormed(_)) => true,
        Goal::Quantified(QuantifierKind::ForAll, body) => is_coinductive_goal(db, &body.value),
        _ => false,
    }
}
