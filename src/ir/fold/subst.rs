//! 用具体参数实例化最内层绑定器

use super::{infallible, Fold, Folder};
use crate::ir::*;

/// 把 `^0.i` 替换为 `parameters[i]`，其余自由绑定变量移出一层，
/// 因为它们跨过的绑定器已不存在。
///
/// 调用方须为每个绑定器传入一个种类正确的参数；没有匹配参数的 `^0.i` 原样保留。
/// 参数不可信时使用 [`Binders::try_substitute`]。
pub struct Subst<'s> {
    parameters: &'s [Parameter],
}

impl<'s> Subst<'s> {
    pub fn apply<T: Fold>(
        parameters: &'s [Parameter],
        value: &T,
    ) -> T {
        infallible(value.fold_with(&mut Subst { parameters }, DebruijnIndex::INNERMOST))
    }

    fn lookup(
        &self,
        bound_var: BoundVar,
    ) -> Option<&'s Parameter> {
        bound_var
            .index_if_innermost()
            .and_then(|index| self.parameters.get(index))
    }

    fn outer(
        bound_var: BoundVar,
        outer_binder: DebruijnIndex,
    ) -> BoundVar {
        bound_var
            .shifted_out()
            .unwrap_or(bound_var)
            .shifted_in_from(outer_binder)
    }
}

impl Folder for Subst<'_> {
    fn as_dyn(&mut self) -> &mut dyn Folder {
        self
    }

    fn fold_free_var_ty(
        &mut self,
        bound_var: BoundVar,
        outer_binder: DebruijnIndex,
    ) -> Fallible<Ty> {
        match self.lookup(bound_var) {
            Some(Parameter::Ty(ty)) => Ok(ty.shifted_in_from(outer_binder)),
            Some(_) | None if bound_var.index_if_innermost().is_some() => {
                // 种类不符或越界：变量保持不变
                Ok(bound_var.shifted_in_from(outer_binder).to_ty())
            }
            _ => Ok(Self::outer(bound_var, outer_binder).to_ty()),
        }
    }

    fn fold_free_var_lifetime(
        &mut self,
        bound_var: BoundVar,
        outer_binder: DebruijnIndex,
    ) -> Fallible<Lifetime> {
        match self.lookup(bound_var) {
            Some(Parameter::Lifetime(lt)) => Ok(lt.shifted_in_from(outer_binder)),
            Some(_) | None if bound_var.index_if_innermost().is_some() => {
                Ok(bound_var.shifted_in_from(outer_binder).to_lifetime())
            }
            _ => Ok(Self::outer(bound_var, outer_binder).to_lifetime()),
        }
    }

    fn fold_free_var_const(
        &mut self,
        bound_var: BoundVar,
        outer_binder: DebruijnIndex,
    ) -> Fallible<Const> {
        match self.lookup(bound_var) {
            Some(Parameter::Const(c)) => Ok(c.shifted_in_from(outer_binder)),
            Some(_) | None if bound_var.index_if_innermost().is_some() => {
                Ok(bound_var.shifted_in_from(outer_binder).to_const())
            }
            _ => Ok(Self::outer(bound_var, outer_binder).to_const()),
        }
    }
}
