//! 正在求解的目标，最内层在末尾

use std::ops::{Index, IndexMut};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct StackDepth(usize);

#[derive(Debug)]
pub(crate) struct StackEntry {
    /// 经过此目标的环能否被接受为证明
    coinductive_goal: bool,
    /// 子目标回指此目标时设置；其答案由临时值算出，必须迭代
    cycle: bool,
}

#[derive(Debug)]
pub(crate) struct Stack {
    entries: Vec<StackEntry>,
    overflow_depth: usize,
}

impl Stack {
    pub(crate) fn new(overflow_depth: usize) -> Self {
        Stack {
            entries: Vec::new(),
            overflow_depth,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// 再压入目标将超出深度限制
    pub(crate) fn is_full(&self) -> bool {
        self.entries.len() >= self.overflow_depth
    }

    pub(crate) fn push(
        &mut self,
        coinductive_goal: bool,
    ) -> StackDepth {
        let depth = StackDepth(self.entries.len());
        self.entries.push(StackEntry {
            coinductive_goal,
            cycle: false,
        });
        depth
    }

    pub(crate) fn pop(
        &mut self,
        depth: StackDepth,
    ) {
        debug_assert_eq!(depth.0 + 1, self.entries.len());
        self.entries.truncate(depth.0);
    }

    /// 从 `depth` 到栈顶的目标是否全为余归纳，即在 `depth` 闭合的环算作证明
    pub(crate) fn coinductive_cycle_from(
        &self,
        depth: StackDepth,
    ) -> bool {
        self.entries[depth.0..]
            .iter()
            .all(|entry| entry.coinductive_goal)
    }

    /// 在 `depth` 闭合的环是否同时经过余归纳和归纳目标；这样的环永远不是证明
    pub(crate) fn mixed_inductive_coinductive_cycle_from(
        &self,
        depth: StackDepth,
    ) -> bool {
        let cycle = &self.entries[depth.0..];
        let coinductive = cycle.iter().filter(|entry| entry.coinductive_goal).count();
        coinductive != 0 && coinductive != cycle.len()
    }
}

impl StackEntry {
    pub(crate) fn flag_cycle(&mut self) {
        self.cycle = true;
    }

    pub(crate) fn read_and_reset_cycle_flag(&mut self) -> bool {
        std::mem::replace(&mut self.cycle, false)
    }
}

impl Index<StackDepth> for Stack {
    type Output = StackEntry;

    fn index(
        &self,
        depth: StackDepth,
    ) -> &StackEntry {
        &self.entries[depth.0]
    }
}

impl IndexMut<StackDepth> for Stack {
    fn index_mut(
        &mut self,
        depth: StackDepth,
    ) -> &mut StackEntry {
        &mut self.entries[depth.0]
    }
}
