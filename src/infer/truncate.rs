//! 子目标的大小限制
//!
//! 形如 `T: Foo :- Vec<T>: Foo` 的子句会产生越来越大且永不重复的目标，
//! 环检测无法让它停下。含有超过配置大小的类型的目标不再展开，求解器以歧义作答。

use super::InferenceTable;
use crate::ir::fold::{infallible, super_fold_ty, Fold, Folder};
use crate::ir::*;

/// `value` 中是否有类型的节点数超过 `max_size`（穿过已绑定的推断变量计数）
pub fn needs_truncation<T: Fold>(
    table: &InferenceTable,
    max_size: usize,
    value: &T,
) -> bool {
    ty_size(table, value) > max_size
}

/// `value` 中任一类型的最大节点数
pub fn ty_size<T: Fold>(
    table: &InferenceTable,
    value: &T,
) -> usize {
    let mut sizer = TySizer {
        table,
        depth: 0,
        size: 0,
        max_size: 0,
    };
    infallible(value.fold_with(&mut sizer, DebruijnIndex::INNERMOST));
    sizer.max_size
}

struct TySizer<'t> {
    table: &'t InferenceTable,
    /// Nesting inside the type currently measured
    depth: usize,
    size: usize,
    max_size: usize,
}

impl Folder for TySizer<'_> {
    fn as_dyn(&mut self) -> &mut dyn Folder {
        self
    }

    fn fold_ty(
        &mut self,
        ty: &Ty,
        outer_binder: DebruijnIndex,
    ) -> Fallible<Ty> {
        if let Some(resolved) = self.table.normalize_shallow(ty) {
            return self.fold_ty(&resolved, outer_binder);
        }
        if self.depth == 0 {
            self.size = 0;
        }
        self.size += 1;
        self.max_size = self.max_size.max(self.size);

        self.depth += 1;
        let result = super_fold_ty(self, ty, outer_binder);
        self.depth -= 1;
        result
    }
}
