//! 规范化：把自由推断变量替换为绑定变量

use super::InferenceTable;
use crate::ir::fold::{infallible, Fold, Folder};
use crate::ir::*;

/// [`InferenceTable::canonicalize`] 的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canonicalized<T> {
    pub quantified: Canonical<T>,
    /// `free_vars[i]` 是被绑定器 `^0.i` 替换的变量
    pub free_vars: Vec<InferenceVar>,
}

impl InferenceTable {
    /// 解析 `value` 中所有已绑定的变量，并按首次出现顺序为其余未绑定变量编号。
    ///
    /// 只有变量名不同的两个值得到相同的规范形式。
    pub fn canonicalize<T: Fold>(
        &mut self,
        value: &T,
    ) -> Canonicalized<T> {
        let mut canonicalizer = Canonicalizer {
            table: self,
            free_vars: Vec::new(),
        };
        let value = infallible(value.fold_with(&mut canonicalizer, DebruijnIndex::INNERMOST));
        let free_vars = canonicalizer.free_vars;
        let binders = free_vars
            .iter()
            .map(|(var, kind)| {
                let universe = self
                    .universe_of_unbound_var(*var)
                    .unwrap_or(UniverseIndex::ROOT);
                CanonicalVarKind::new(*kind, universe)
            })
            .collect();
        Canonicalized {
            quantified: Canonical { value, binders },
            free_vars: free_vars.into_iter().map(|(var, _)| var).collect(),
        }
    }
}

struct Canonicalizer<'t> {
    table: &'t mut InferenceTable,
    free_vars: Vec<(InferenceVar, ParameterKind)>,
}

impl Canonicalizer<'_> {
    fn add(
        &mut self,
        var: InferenceVar,
        kind: ParameterKind,
    ) -> usize {
        match self.free_vars.iter().position(|(v, _)| *v == var) {
            Some(index) => index,
            None => {
                self.free_vars.push((var, kind));
                self.free_vars.len() - 1
            }
        }
    }

    fn bound_var(
        &mut self,
        var: InferenceVar,
        kind: ParameterKind,
        outer_binder: DebruijnIndex,
    ) -> BoundVar {
        let index = self.add(var, kind);
        BoundVar::new(DebruijnIndex::INNERMOST, index).shifted_in_from(outer_binder)
    }
}

impl Folder for Canonicalizer<'_> {
    fn as_dyn(&mut self) -> &mut dyn Folder {
        self
    }

    fn fold_inference_ty(
        &mut self,
        var: InferenceVar,
        outer_binder: DebruijnIndex,
    ) -> Fallible<Ty> {
        let root = self.table.find(var);
        match self.table.probe_var(root).cloned() {
            Some(Parameter::Ty(ty)) => Ok(ty
                .fold_with(self, DebruijnIndex::INNERMOST)?
                .shifted_in_from(outer_binder)),
            _ => Ok(self.bound_var(root, ParameterKind::Ty, outer_binder).to_ty()),
        }
    }

    fn fold_inference_lifetime(
        &mut self,
        var: InferenceVar,
        outer_binder: DebruijnIndex,
    ) -> Fallible<Lifetime> {
        let root = self.table.find(var);
        match self.table.probe_var(root).cloned() {
            Some(Parameter::Lifetime(lt)) => Ok(lt
                .fold_with(self, DebruijnIndex::INNERMOST)?
                .shifted_in_from(outer_binder)),
            _ => Ok(self
                .bound_var(root, ParameterKind::Lifetime, outer_binder)
                .to_lifetime()),
        }
    }

    fn fold_inference_const(
        &mut self,
        var: InferenceVar,
        outer_binder: DebruijnIndex,
    ) -> Fallible<Const> {
        let root = self.table.find(var);
        match self.table.probe_var(root).cloned() {
            Some(Parameter::Const(c)) => Ok(c
                .fold_with(self, DebruijnIndex::INNERMOST)?
                .shifted_in_from(outer_binder)),
            _ => Ok(self
                .bound_var(root, ParameterKind::Const, outer_binder)
                .to_const()),
        }
    }
}
