//! 答案缓存
//!
//! 以 u-规范目标为键的已完成答案。缓存的克隆共享同一张表，批量求解的各工作线程由此看到彼此的结果。
//! 只存入不依赖进行中目标、且未因溢出或取消而中断的答案，因此查表永远不会改变全新搜索给出的答案。

use super::solution::Solution;
use crate::ir::{Fallible, UCanonicalGoal};
use parking_lot::{Condvar, Mutex, RwLock};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::trace;

/// 缓存统计信息
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// 由缓存回答的查询次数
    pub hits: usize,
    /// 未命中次数
    pub misses: usize,
    /// 当前条目数
    pub entries: usize,
}

impl CacheStats {
    /// 命中率（百分比）
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

#[derive(Debug, Default)]
struct CacheInner {
    entries: RwLock<HashMap<UCanonicalGoal, Fallible<Solution>>>,
    /// 正在被某个调用方求解的顶层目标
    in_flight: Mutex<HashSet<UCanonicalGoal>>,
    released: Condvar,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

#[derive(Debug, Clone, Default)]
pub struct AnswerCache {
    inner: Arc<CacheInner>,
}

impl AnswerCache {
    pub fn new() -> Self {
        AnswerCache::default()
    }

    pub fn get(
        &self,
        goal: &UCanonicalGoal,
    ) -> Option<Fallible<Solution>> {
        let entries = self.inner.entries.read();
        match entries.get(goal) {
            Some(answer) => {
                self.inner.hits.fetch_add(1, Ordering::Relaxed);
                Some(answer.clone())
            }
            None => {
                self.inner.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    pub fn insert(
        &self,
        goal: UCanonicalGoal,
        answer: Fallible<Solution>,
    ) {
        self.inner.entries.write().insert(goal, answer);
    }

    pub fn len(&self) -> usize {
        self.inner.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 清空所有条目并重置统计
    pub fn clear(&self) {
        self.inner.entries.write().clear();
        self.inner.hits.store(0, Ordering::Relaxed);
        self.inner.misses.store(0, Ordering::Relaxed);
    }

    /// 把 `goal` 标记为求解中；若另一调用方正在求解同一目标，先等待其完成。
    /// 返回的守卫被丢弃时移除标记。
    ///
    /// 只有顶层目标会被占用：调用方最多持有一个占用，且持有期间从不等待。
    pub fn claim(
        &self,
        goal: &UCanonicalGoal,
    ) -> InFlight<'_> {
        let mut in_flight = self.inner.in_flight.lock();
        while in_flight.contains(goal) {
            trace!(goal = %goal, "waiting for goal in flight");
            self.inner.released.wait(&mut in_flight);
        }
        in_flight.insert(goal.clone());
        InFlight {
            cache: self,
            goal: goal.clone(),
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.inner.hits.load(Ordering::Relaxed),
            misses: self.inner.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}

/// 对求解中目标的占用；见 [`AnswerCache::claim`]
#[derive(Debug)]
pub struct InFlight<'c> {
    cache: &'c AnswerCache,
    goal: UCanonicalGoal,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.cache.inner.in_flight.lock().remove(&self.goal);
        self.cache.inner.released.notify_all();
    }
}
