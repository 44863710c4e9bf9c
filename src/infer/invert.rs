//! 否定目标的反演
//!
//! `not { G }` 仅在 `G` 不含未解析推断变量时才可靠：
//! `forall<T> { not { T: Foo } }` 的含义是“不存在满足 `T: Foo` 的 `T`”，
//! 因此求解 `G` 之前要把占位符变回存在变量。

use super::{Canonicalized, InferenceTable};
use crate::ir::fold::{infallible, Fold, Folder};
use crate::ir::*;
use std::collections::HashMap;

impl InferenceTable {
    /// 若 `value` 仍含未解析的推断变量则返回 `None`（否定 flounder）
    pub fn invert<T: Fold>(
        &mut self,
        value: &T,
    ) -> Option<T> {
        let Canonicalized {
            quantified,
            free_vars,
        } = self.canonicalize(value);
        if !free_vars.is_empty() {
            return None;
        }
        let mut inverter = Inverter {
            table: self,
            inverted: HashMap::new(),
        };
        Some(infallible(
            quantified
                .value
                .fold_with(&mut inverter, DebruijnIndex::INNERMOST),
        ))
    }

    /// 一步完成反演与规范化
    pub fn invert_then_canonicalize<T: Fold>(
        &mut self,
        value: &T,
    ) -> Option<Canonical<T>> {
        let inverted = self.invert(value)?;
        Some(self.canonicalize(&inverted).quantified)
    }
}

struct Inverter<'t> {
    table: &'t mut InferenceTable,
    inverted: HashMap<PlaceholderIndex, InferenceVar>,
}

impl Inverter<'_> {
    fn var_for(
        &mut self,
        placeholder: PlaceholderIndex,
    ) -> InferenceVar {
        let table = &mut *self.table;
        *self
            .inverted
            .entry(placeholder)
            .or_insert_with(|| table.new_variable(placeholder.ui))
    }
}

impl Folder for Inverter<'_> {
    fn as_dyn(&mut self) -> &mut dyn Folder {
        self
    }

    fn fold_placeholder_ty(
        &mut self,
        placeholder: PlaceholderIndex,
        _outer_binder: DebruijnIndex,
    ) -> Fallible<Ty> {
        Ok(self.var_for(placeholder).to_ty())
    }

    fn fold_placeholder_lifetime(
        &mut self,
        placeholder: PlaceholderIndex,
        _outer_binder: DebruijnIndex,
    ) -> Fallible<Lifetime> {
        Ok(self.var_for(placeholder).to_lifetime())
    }

    fn fold_placeholder_const(
        &mut self,
        placeholder: PlaceholderIndex,
        _outer_binder: DebruijnIndex,
    ) -> Fallible<Const> {
        Ok(self.var_for(placeholder).to_const())
    }
}
