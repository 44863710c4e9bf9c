//! 求解器产生的答案

use crate::ir::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// 未被反驳的目标
///
/// 替换以被求解规范目标的绑定器表示：第 `i` 项是目标变量 `^0.i` 的值。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Solution {
    /// 目标恰以此替换成立（附带列出的生命周期约束）
    Unique(Canonical<ConstrainedSubst>),
    /// 目标可能成立；guidance 给出已知信息
    Ambig(Guidance),
}

/// 歧义答案仍能告诉调用方的信息
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Guidance {
    /// 所有解都有此替换
    Definite(Canonical<Substitution>),
    /// 存在具有此替换的解，也可能有其他解
    Suggested(Canonical<Substitution>),
    /// 一无所知
    Unknown,
    /// 目标既无法证明也无法反驳
    CannotProve,
    /// 搜索预算耗尽
    Overflow,
}

impl Solution {
    /// 合并两个备选的答案
    ///
    /// 相同的答案保留；平凡为真的答案胜出；否则结果为歧义，且仅当两边一致时保留替换。
    pub fn combine(
        self,
        other: Solution,
    ) -> Solution {
        if self == other {
            return self;
        }
        if self.is_trivial_and_always_true() {
            return self;
        }
        if other.is_trivial_and_always_true() {
            return other;
        }

        debug!(%self, %other, "combine");
        let guidance = match (self.into_guidance(), other.into_guidance()) {
            (Guidance::Definite(a), Guidance::Definite(b)) if a == b => Guidance::Definite(a),
            (Guidance::Suggested(a), Guidance::Suggested(b)) if a == b => Guidance::Suggested(a),
            _ => Guidance::Unknown,
        };
        Solution::Ambig(guidance)
    }

    /// 把唯一答案弱化为 guidance
    pub fn into_guidance(self) -> Guidance {
        match self {
            Solution::Unique(constrained) => Guidance::Definite(constrained.map(|c| c.subst)),
            Solution::Ambig(guidance) => guidance,
        }
    }

    /// 所有解必须具有的替换（若已知）
    pub fn constrained_subst(&self) -> Option<Canonical<ConstrainedSubst>> {
        match self {
            Solution::Unique(constrained) => Some(constrained.clone()),
            Solution::Ambig(Guidance::Definite(subst)) => Some(subst.clone().map(|subst| {
                ConstrainedSubst {
                    subst,
                    constraints: Vec::new(),
                }
            })),
            _ => None,
        }
    }

    /// Like [`Solution::constrained_subst`] but also accepts suggestions.
    pub fn suggested_subst(&self) -> Option<Canonical<ConstrainedSubst>> {
        match self {
            Solution::Ambig(Guidance::Suggested(subst)) => Some(subst.clone().map(|subst| {
                ConstrainedSubst {
                    subst,
                    constraints: Vec::new(),
                }
            })),
            _ => self.constrained_subst(),
        }
    }

    pub fn has_definite(&self) -> bool {
        matches!(
            self,
            Solution::Unique(_) | Solution::Ambig(Guidance::Definite(_))
        )
    }

    pub fn is_unique(&self) -> bool {
        matches!(self, Solution::Unique(_))
    }

    pub fn is_ambig(&self) -> bool {
        matches!(self, Solution::Ambig(_))
    }

    /// 唯一、无约束、每个变量绑定到自身
    pub fn is_trivial_and_always_true(&self) -> bool {
        match self {
            Solution::Unique(constrained) => {
                constrained.value.subst.is_identity() && constrained.value.constraints.is_empty()
            }
            Solution::Ambig(_) => false,
        }
    }
}

impl fmt::Display for Solution {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Solution::Unique(constrained) => write!(f, "Unique; {}", constrained),
            Solution::Ambig(guidance) => write!(f, "Ambiguous; {}", guidance),
        }
    }
}

impl fmt::Display for Guidance {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Guidance::Definite(subst) => write!(f, "definite {}", subst),
            Guidance::Suggested(subst) => write!(f, "suggested {}", subst),
            Guidance::Unknown => write!(f, "no inference guidance"),
            Guidance::CannotProve => write!(f, "cannot prove"),
            Guidance::Overflow => write!(f, "overflow"),
        }
    }
}
