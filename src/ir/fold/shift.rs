//! 在绑定器之间移动值
//!
//! 把值放到额外的绑定器下，需要把其中每个自由绑定变量的 de Bruijn 索引加一（移入）；
//! 移出则相反，若有变量会逃逸则失败。

use super::{infallible, Fold, Folder};
use crate::ir::*;

pub trait Shift: Fold {
    /// 自由绑定变量移入一层绑定器
    fn shifted_in(&self) -> Self {
        self.shifted_in_from(DebruijnIndex::ONE)
    }

    /// 自由绑定变量移入 `adjustment` 层绑定器
    fn shifted_in_from(
        &self,
        adjustment: DebruijnIndex,
    ) -> Self;

    /// 自由绑定变量移出一层绑定器
    fn shifted_out(&self) -> Fallible<Self> {
        self.shifted_out_to(DebruijnIndex::ONE)
    }

    /// 自由绑定变量移出 `adjustment` 层绑定器；若变量由被移除的绑定器绑定则失败
    fn shifted_out_to(
        &self,
        adjustment: DebruijnIndex,
    ) -> Fallible<Self>;
}

impl<T: Fold> Shift for T {
    fn shifted_in_from(
        &self,
        adjustment: DebruijnIndex,
    ) -> Self {
        infallible(self.fold_with(&mut Shifter { adjustment }, DebruijnIndex::INNERMOST))
    }

    fn shifted_out_to(
        &self,
        adjustment: DebruijnIndex,
    ) -> Fallible<Self> {
        self.fold_with(&mut DownShifter { adjustment }, DebruijnIndex::INNERMOST)
    }
}

struct Shifter {
    adjustment: DebruijnIndex,
}

impl Shifter {
    fn adjust(
        &self,
        bound_var: BoundVar,
        outer_binder: DebruijnIndex,
    ) -> BoundVar {
        bound_var
            .shifted_in_from(self.adjustment)
            .shifted_in_from(outer_binder)
    }
}

impl Folder for Shifter {
    fn as_dyn(&mut self) -> &mut dyn Folder {
        self
    }

    fn fold_free_var_ty(
        &mut self,
        bound_var: BoundVar,
        outer_binder: DebruijnIndex,
    ) -> Fallible<Ty> {
        Ok(self.adjust(bound_var, outer_binder).to_ty())
    }

    fn fold_free_var_lifetime(
        &mut self,
        bound_var: BoundVar,
        outer_binder: DebruijnIndex,
    ) -> Fallible<Lifetime> {
        Ok(self.adjust(bound_var, outer_binder).to_lifetime())
    }

    fn fold_free_var_const(
        &mut self,
        bound_var: BoundVar,
        outer_binder: DebruijnIndex,
    ) -> Fallible<Const> {
        Ok(self.adjust(bound_var, outer_binder).to_const())
    }
}

struct DownShifter {
    adjustment: DebruijnIndex,
}

impl DownShifter {
    fn adjust(
        &self,
        bound_var: BoundVar,
        outer_binder: DebruijnIndex,
    ) -> Fallible<BoundVar> {
        match bound_var.shifted_out_to(self.adjustment) {
            Some(bv) => Ok(bv.shifted_in_from(outer_binder)),
            None => Err(NoSolution),
        }
    }
}

impl Folder for DownShifter {
    fn as_dyn(&mut self) -> &mut dyn Folder {
        self
    }

    fn fold_free_var_ty(
        &mut self,
        bound_var: BoundVar,
        outer_binder: DebruijnIndex,
    ) -> Fallible<Ty> {
        Ok(self.adjust(bound_var, outer_binder)?.to_ty())
    }

    fn fold_free_var_lifetime(
        &mut self,
        bound_var: BoundVar,
        outer_binder: DebruijnIndex,
    ) -> Fallible<Lifetime> {
        Ok(self.adjust(bound_var, outer_binder)?.to_lifetime())
    }

    fn fold_free_var_const(
        &mut self,
        bound_var: BoundVar,
        outer_binder: DebruijnIndex,
    ) -> Fallible<Const> {
        Ok(self.adjust(bound_var, outer_binder)?.to_const())
    }
}
