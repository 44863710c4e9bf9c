//! 目标求解器
//!
//! [`Solver`] 是入口：持有答案缓存和构造时选定的求解策略。答案形式：
//! - `Ok(None)`：目标被反驳
//! - `Ok(Some(Solution::Unique(..)))`：恰有一个答案
//! - `Ok(Some(Solution::Ambig(..)))`：可能成立；guidance 给出已知信息
//! - `Err(..)`：无法回答查询（程序无效、已取消）

pub mod cache;
pub mod database;
mod recursive;
pub mod solution;

#[cfg(test)]
mod tests;

pub use cache::{AnswerCache, CacheStats, InFlight};
pub use database::{Database, DatabaseError};
pub use solution::{Guidance, Solution};

use crate::infer::{canonicalize_query, CanonicalQuery};
use crate::ir::{Goal, InEnvironment, InferenceVar, UCanonicalGoal};
use rayon::prelude::*;
use recursive::{RecursiveContext, RecursiveLimits};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// 查询没有答案的原因
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SolverError {
    /// 数据库报告了不一致
    #[error("invalid program: {0}")]
    InvalidProgram(String),
    /// 求解器配置不可用
    #[error("invalid solver configuration: {0}")]
    InvalidConfig(String),
    /// 调用方要求停止查询
    #[error("query cancelled")]
    Cancelled,
}

/// 歧义答案触及深度限制时报告什么
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OverflowPolicy {
    /// `Ambig(Overflow)`
    #[default]
    NoGuidance,
    /// 保留触及限制前已找到的确定替换
    PartialGuidance,
}

/// 求解策略及其限制
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SolverChoice {
    /// 带环检测和不动点迭代的深度优先搜索
    Recursive {
        /// 栈上目标的最大数量
        overflow_depth: usize,
        /// 子目标中类型的最大大小
        max_size: usize,
        caching_enabled: bool,
        overflow_policy: OverflowPolicy,
    },
}

impl SolverChoice {
    pub const DEFAULT_OVERFLOW_DEPTH: usize = 100;
    pub const DEFAULT_MAX_SIZE: usize = 30;

    pub fn recursive_default() -> Self {
        SolverChoice::Recursive {
            overflow_depth: Self::DEFAULT_OVERFLOW_DEPTH,
            max_size: Self::DEFAULT_MAX_SIZE,
            caching_enabled: true,
            overflow_policy: OverflowPolicy::NoGuidance,
        }
    }

    pub fn validate(&self) -> Result<(), SolverError> {
        let SolverChoice::Recursive {
            overflow_depth,
            max_size,
            ..
        } = *self;
        if overflow_depth == 0 {
            return Err(SolverError::InvalidConfig(
                "overflow_depth must be at least 1".to_string(),
            ));
        }
        if max_size == 0 {
            return Err(SolverError::InvalidConfig(
                "max_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for SolverChoice {
    fn default() -> Self {
        SolverChoice::recursive_default()
    }
}

/// [`Solver::solve_goal`] 的答案
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryAnswer {
    /// `free_vars[i]` 是规范绑定器 `i` 背后调用方的变量
    pub free_vars: Vec<InferenceVar>,
    /// 目标被反驳时为 `None`
    pub solution: Option<Solution>,
}

/// 求解器，其缓存由它回答的所有查询共享
///
/// 缓存的答案只对一个程序有效；子句变化时调用 [`Solver::clear_cache`]。
#[derive(Debug, Clone)]
pub struct Solver {
    choice: SolverChoice,
    cache: AnswerCache,
}

impl Solver {
    pub fn new(choice: SolverChoice) -> Result<Self, SolverError> {
        choice.validate()?;
        info!(?choice, "solver created");
        Ok(Solver {
            choice,
            cache: AnswerCache::new(),
        })
    }

    pub fn choice(&self) -> SolverChoice {
        self.choice
    }

    pub fn solve(
        &self,
        db: &dyn Database,
        goal: &UCanonicalGoal,
    ) -> Result<Option<Solution>, SolverError> {
        self.solve_limited(db, goal, &|| true)
    }

    /// 规范化含推断变量 `?0..?n` 的目标并求解
    ///
    /// 答案替换以规范绑定器表示；绑定器 `i` 对应返回答案中的 `free_vars[i]`。
    pub fn solve_goal(
        &self,
        db: &dyn Database,
        goal: &InEnvironment<Goal>,
    ) -> Result<QueryAnswer, SolverError> {
        let CanonicalQuery { goal, free_vars } = canonicalize_query(goal);
        let solution = self.solve(db, &goal)?;
        Ok(QueryAnswer {
            free_vars,
            solution,
        })
    }

    /// 同 [`Solver::solve`]，但 `should_continue` 返回 false 后以 [`SolverError::Cancelled`] 停止
    pub fn solve_limited(
        &self,
        db: &dyn Database,
        goal: &UCanonicalGoal,
        should_continue: &(dyn Fn() -> bool + Sync),
    ) -> Result<Option<Solution>, SolverError> {
        let SolverChoice::Recursive {
            overflow_depth,
            max_size,
            caching_enabled,
            overflow_policy,
        } = self.choice;
        let limits = RecursiveLimits {
            overflow_depth,
            max_size,
            overflow_policy,
        };
        let cache = caching_enabled.then_some(&self.cache);
        // 同一目标的第二个调用方等待，然后读取答案
        let _claim = cache.map(|cache| cache.claim(goal));
        RecursiveContext::new(db, limits, cache, should_continue).solve_root_goal(goal)
    }

    /// 并行求解相互独立的目标，结果与输入顺序一致
    pub fn solve_batch(
        &self,
        db: &dyn Database,
        goals: &[UCanonicalGoal],
    ) -> Vec<Result<Option<Solution>, SolverError>> {
        debug!(goals = goals.len(), "solve batch");
        goals.par_iter().map(|goal| self.solve(db, goal)).collect()
    }

    pub fn clear_cache(&self) {
        debug!("clearing answer cache");
        self.cache.clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
