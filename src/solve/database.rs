//! 求解器所推理程序的只读视图

use crate::ir::*;

/// 数据库无法回答查询的原因
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DatabaseError {
    /// 暂时无法枚举候选（例如接收者未解析）；目标报告为歧义
    #[error("goal flounders: clauses cannot be enumerated")]
    Floundered,
    /// 程序不一致；查询中止
    #[error("invalid program: {0}")]
    InvalidProgram(String),
}

/// 求解器使用的子句来源
///
/// 所有方法都是纯的。“没有适用子句”是空向量而非错误。
/// 子句只通过自身的绑定器引用目标的变量。
pub trait Database: Send + Sync {
    /// 结论可能与 `goal` 合一的程序子句，按尝试顺序排列
    fn clauses_relevant_to(
        &self,
        goal: &DomainGoal,
    ) -> Result<Vec<ProgramClause>, DatabaseError>;

    /// 经过此特质的环是否算作证明
    fn is_coinductive(
        &self,
        trait_id: &TraitId,
    ) -> bool;

    /// `subject` 良构的条件，以其自身参数表示
    fn well_formed_facts_for(
        &self,
        subject: &WellFormed,
    ) -> Result<Vec<Goal>, DatabaseError>;

    /// 自类型未知时能否列出该特质的实现。不可枚举特质上的目标会 flounder。
    fn is_enumerable(
        &self,
        _trait_id: &TraitId,
    ) -> bool {
        true
    }
}

impl<D: Database + ?Sized> Database for &D {
    fn clauses_relevant_to(
        &self,
        goal: &DomainGoal,
    ) -> Result<Vec<ProgramClause>, DatabaseError> {
        (**self).clauses_relevant_to(goal)
    }

    fn is_coinductive(
        &self,
        trait_id: &TraitId,
    ) -> bool {
        (**self).is_coinductive(trait_id)
    }

    fn well_formed_facts_for(
        &self,
        subject: &WellFormed,
    ) -> Result<Vec<Goal>, DatabaseError> {
        (**self).well_formed_facts_for(subject)
    }

    fn is_enumerable(
        &self,
        trait_id: &TraitId,
    ) -> bool {
        (**self).is_enumerable(trait_id)
    }
}
