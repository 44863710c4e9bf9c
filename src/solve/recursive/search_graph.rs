//! 当前顶层查询访问过的目标
//!
//! 节点按首次访问顺序编号（深度优先编号）。只要节点依赖的任一目标仍在进行中，它就留在这里；
//! 其强连通分量的头完成后，图的整个尾部被移入答案缓存或丢弃。

use super::stack::StackDepth;
use crate::ir::{ClausePriority, Fallible, UCanonicalGoal};
use crate::solve::cache::AnswerCache;
use crate::solve::solution::Solution;
use indexmap::IndexMap;
use std::ops::{Add, Index, IndexMut};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct DepthFirstNumber {
    index: usize,
}

impl DepthFirstNumber {
    pub(crate) const MAX: DepthFirstNumber = DepthFirstNumber { index: usize::MAX };
}

impl Add<usize> for DepthFirstNumber {
    type Output = DepthFirstNumber;

    fn add(
        self,
        offset: usize,
    ) -> DepthFirstNumber {
        DepthFirstNumber {
            index: self.index + offset,
        }
    }
}

/// 子树搜索所依赖的内容
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Minimums {
    /// 被使用的进行中目标的最小深度优先编号
    pub(crate) positive: DepthFirstNumber,
    /// 子树中有答案因深度限制而中断
    pub(crate) overflowed: bool,
}

impl Minimums {
    pub(crate) fn new() -> Self {
        Minimums {
            positive: DepthFirstNumber::MAX,
            overflowed: false,
        }
    }

    pub(crate) fn update_from(
        &mut self,
        other: Minimums,
    ) {
        self.positive = self.positive.min(other.positive);
        self.overflowed |= other.overflowed;
    }
}

#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) solution: Fallible<Solution>,
    pub(crate) solution_priority: ClausePriority,
    /// 目标在栈上时设置
    pub(crate) stack_depth: Option<StackDepth>,
    pub(crate) links: Minimums,
}

#[derive(Debug, Default)]
pub(crate) struct SearchGraph {
    nodes: IndexMap<UCanonicalGoal, Node>,
}

impl SearchGraph {
    pub(crate) fn new() -> Self {
        SearchGraph::default()
    }

    pub(crate) fn lookup(
        &self,
        goal: &UCanonicalGoal,
    ) -> Option<DepthFirstNumber> {
        self.nodes
            .get_index_of(goal)
            .map(|index| DepthFirstNumber { index })
    }

    /// 加入刚压栈的目标及其临时答案
    pub(crate) fn insert(
        &mut self,
        goal: &UCanonicalGoal,
        stack_depth: StackDepth,
        solution: Fallible<Solution>,
    ) -> DepthFirstNumber {
        let dfn = DepthFirstNumber {
            index: self.nodes.len(),
        };
        let node = Node {
            solution,
            solution_priority: ClausePriority::Low,
            stack_depth: Some(stack_depth),
            links: Minimums {
                positive: dfn,
                overflowed: false,
            },
        };
        self.nodes.insert(goal.clone(), node);
        dfn
    }

    /// 遗忘 `dfn` 及之后访问的所有节点；它们的答案来自已改变的临时值
    pub(crate) fn rollback_to(
        &mut self,
        dfn: DepthFirstNumber,
    ) {
        debug!(nodes = self.nodes.len() - dfn.index.min(self.nodes.len()), "rollback");
        self.nodes.truncate(dfn.index);
    }

    /// 把从 `dfn` 开始已完成的图尾部移入缓存
    pub(crate) fn move_to_cache(
        &mut self,
        dfn: DepthFirstNumber,
        cache: &AnswerCache,
    ) {
        debug!(nodes = self.nodes.len() - dfn.index, "move to cache");
        for (goal, node) in self.nodes.drain(dfn.index..) {
            debug_assert!(node.stack_depth.is_none());
            debug_assert!(node.links.positive >= dfn);
            cache.insert(goal, node.solution);
        }
    }
}

impl Index<DepthFirstNumber> for SearchGraph {
    type Output = Node;

    fn index(
        &self,
        dfn: DepthFirstNumber,
    ) -> &Node {
        &self.nodes[dfn.index]
    }
}

impl IndexMut<DepthFirstNumber> for SearchGraph {
    fn index_mut(
        &mut self,
        dfn: DepthFirstNumber,
    ) -> &mut Node {
        &mut self.nodes[dfn.index]
    }
}
