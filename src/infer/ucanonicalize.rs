//! 宇宙规范化
//!
//! 仅占位符所在宇宙不同的规范目标是同一个问题。把实际出现的宇宙重新编号为
//! `0..n`，它们就能共用一个缓存条目。

use super::InferenceTable;
use crate::ir::fold::{infallible, Fold, Folder};
use crate::ir::*;

/// 原始宇宙的有序列表；位置 `i` 即规范宇宙 `i`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniverseMap {
    universes: Vec<UniverseIndex>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UCanonicalized<T> {
    pub quantified: UCanonical<T>,
    /// 把规范宇宙映射回表中的宇宙
    pub universes: UniverseMap,
}

impl Default for UniverseMap {
    fn default() -> Self {
        UniverseMap::new()
    }
}

impl UniverseMap {
    /// 只含根宇宙的映射
    pub fn new() -> Self {
        UniverseMap {
            universes: vec![UniverseIndex::ROOT],
        }
    }

    pub fn add(
        &mut self,
        universe: UniverseIndex,
    ) {
        if let Err(position) = self.universes.binary_search(&universe) {
            self.universes.insert(position, universe);
        }
    }

    pub fn num_canonical_universes(&self) -> usize {
        self.universes.len()
    }

    pub fn map_universe_to_canonical(
        &self,
        universe: UniverseIndex,
    ) -> Option<UniverseIndex> {
        self.universes.binary_search(&universe).ok().map(UniverseIndex)
    }

    /// 超出已知范围的宇宙是在求解规范目标时创建的，映射到所有已知宇宙之上
    pub fn map_universe_from_canonical(
        &self,
        universe: UniverseIndex,
    ) -> UniverseIndex {
        match self.universes.get(universe.0) {
            Some(original) => *original,
            None => {
                let max = self.universes.last().copied().unwrap_or(UniverseIndex::ROOT);
                UniverseIndex(max.0 + 1 + universe.0 - self.universes.len())
            }
        }
    }

    /// 把规范目标的答案翻译回表中的宇宙
    pub fn map_from_canonical<T: Fold>(
        &self,
        canonical: &Canonical<T>,
    ) -> Canonical<T> {
        let mut mapper = UniverseMapper {
            map: |ui: UniverseIndex| self.map_universe_from_canonical(ui),
        };
        let value = infallible(canonical.value.fold_with(&mut mapper, DebruijnIndex::INNERMOST));
        let binders = canonical
            .binders
            .iter()
            .map(|b| CanonicalVarKind::new(b.kind, self.map_universe_from_canonical(b.universe)))
            .collect();
        Canonical { value, binders }
    }
}

impl InferenceTable {
    pub fn u_canonicalize<T: Fold>(
        &self,
        canonical: &Canonical<T>,
    ) -> UCanonicalized<T> {
        let mut collector = UniverseCollector {
            universes: UniverseMap::new(),
        };
        for binder in &canonical.binders {
            collector.universes.add(binder.universe);
        }
        infallible(
            canonical
                .value
                .fold_with(&mut collector, DebruijnIndex::INNERMOST),
        );
        let universes = collector.universes;

        let to_canonical = |ui: UniverseIndex| {
            universes
                .map_universe_to_canonical(ui)
                .unwrap_or(UniverseIndex::ROOT)
        };
        let mut mapper = UniverseMapper { map: to_canonical };
        let value = infallible(canonical.value.fold_with(&mut mapper, DebruijnIndex::INNERMOST));
        let binders = canonical
            .binders
            .iter()
            .map(|b| CanonicalVarKind::new(b.kind, to_canonical(b.universe)))
            .collect();

        UCanonicalized {
            quantified: UCanonical {
                canonical: Canonical { value, binders },
                universes: universes.num_canonical_universes(),
            },
            universes,
        }
    }
}

struct UniverseCollector {
    universes: UniverseMap,
}

impl Folder for UniverseCollector {
    fn as_dyn(&mut self) -> &mut dyn Folder {
        self
    }

    fn fold_placeholder_ty(
        &mut self,
        placeholder: PlaceholderIndex,
        _outer_binder: DebruijnIndex,
    ) -> Fallible<Ty> {
        self.universes.add(placeholder.ui);
        Ok(placeholder.to_ty())
    }

    fn fold_placeholder_lifetime(
        &mut self,
        placeholder: PlaceholderIndex,
        _outer_binder: DebruijnIndex,
    ) -> Fallible<Lifetime> {
        self.universes.add(placeholder.ui);
        Ok(placeholder.to_lifetime())
    }

    fn fold_placeholder_const(
        &mut self,
        placeholder: PlaceholderIndex,
        _outer_binder: DebruijnIndex,
    ) -> Fallible<Const> {
        self.universes.add(placeholder.ui);
        Ok(placeholder.to_const())
    }
}

struct UniverseMapper<F> {
    map: F,
}

impl<F: FnMut(UniverseIndex) -> UniverseIndex> UniverseMapper<F> {
    fn placeholder(
        &mut self,
        placeholder: PlaceholderIndex,
    ) -> PlaceholderIndex {
        PlaceholderIndex {
            ui: (self.map)(placeholder.ui),
            idx: placeholder.idx,
        }
    }
}

impl<F: FnMut(UniverseIndex) -> UniverseIndex> Folder for UniverseMapper<F> {
    fn as_dyn(&mut self) -> &mut dyn Folder {
        self
    }

    fn fold_placeholder_ty(
        &mut self,
        placeholder: PlaceholderIndex,
        _outer_binder: DebruijnIndex,
    ) -> Fallible<Ty> {
        Ok(self.placeholder(placeholder).to_ty())
    }

    fn fold_placeholder_lifetime(
        &mut self,
        placeholder: PlaceholderIndex,
        _outer_binder: DebruijnIndex,
    ) -> Fallible<Lifetime> {
        Ok(self.placeholder(placeholder).to_lifetime())
    }

    fn fold_placeholder_const(
        &mut self,
        placeholder: PlaceholderIndex,
        _outer_binder: DebruijnIndex,
    ) -> Fallible<Const> {
        Ok(self.placeholder(placeholder).to_const())
    }
}
