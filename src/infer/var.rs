//! 变量绑定与显式变量替换

use crate::ir::fold::{infallible, Fold, Folder};
use crate::ir::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 推断变量的绑定状态（并查集节点）
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum VarBinding {
    /// 尚未求解；只能引用该宇宙可见的占位符
    Unbound(UniverseIndex),
    /// 已求解
    Bound(Parameter),
    /// 已与另一变量合一；沿其找到根
    Link(InferenceVar),
}

/// 推断变量到其求解值的映射
///
/// 由 [`crate::infer::unify`] 产生。该替换是幂等的：没有值会引用作为键的变量。
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VarSubstitution {
    map: BTreeMap<InferenceVar, Parameter>,
}

impl VarSubstitution {
    pub fn new() -> Self {
        VarSubstitution::default()
    }

    pub fn insert(
        &mut self,
        var: InferenceVar,
        value: Parameter,
    ) {
        self.map.insert(var, value);
    }

    pub fn get(
        &self,
        var: InferenceVar,
    ) -> Option<&Parameter> {
        self.map.get(&var)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&InferenceVar, &Parameter)> {
        self.map.iter()
    }

    /// Replace every mapped variable in `value`.
    pub fn apply<T: Fold>(
        &self,
        value: &T,
    ) -> T {
        infallible(value.fold_with(&mut VarSubstFolder { subst: self }, DebruijnIndex::INNERMOST))
    }

    /// `self` followed by `other`.
    pub fn compose(
        &self,
        other: &VarSubstitution,
    ) -> VarSubstitution {
        let mut map: BTreeMap<_, _> = self
            .map
            .iter()
            .map(|(var, value)| (*var, other.apply(value)))
            .collect();
        for (var, value) in &other.map {
            map.entry(*var).or_insert_with(|| value.clone());
        }
        VarSubstitution { map }
    }
}

struct VarSubstFolder<'s> {
    subst: &'s VarSubstitution,
}

impl Folder for VarSubstFolder<'_> {
    fn as_dyn(&mut self) -> &mut dyn Folder {
        self
    }

    fn fold_inference_ty(
        &mut self,
        var: InferenceVar,
        outer_binder: DebruijnIndex,
    ) -> Fallible<Ty> {
        match self.subst.get(var) {
            Some(Parameter::Ty(ty)) => Ok(ty.shifted_in_from(outer_binder)),
            _ => Ok(var.to_ty()),
        }
    }

    fn fold_inference_lifetime(
        &mut self,
        var: InferenceVar,
        outer_binder: DebruijnIndex,
    ) -> Fallible<Lifetime> {
        match self.subst.get(var) {
            Some(Parameter::Lifetime(lt)) => Ok(lt.shifted_in_from(outer_binder)),
            _ => Ok(var.to_lifetime()),
        }
    }

    fn fold_inference_const(
        &mut self,
        var: InferenceVar,
        outer_binder: DebruijnIndex,
    ) -> Fallible<Const> {
        match self.subst.get(var) {
            Some(Parameter::Const(c)) => Ok(c.shifted_in_from(outer_binder)),
            _ => Ok(var.to_const()),
        }
    }
}
