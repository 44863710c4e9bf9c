//! 推断表
//!
//! 持有一次归结尝试中的推断变量：
//! - 带路径压缩的并查集绑定
//! - `forall` 引入的占位符所在的宇宙
//! - 值与缓存键之间的规范化及其逆过程
//!
//! 这里的内容不在线程间共享；每个求解帧都从规范目标构建自己的表。

mod canonicalize;
mod instantiate;
mod invert;
pub mod truncate;
mod ucanonicalize;
pub mod unify;
mod var;

#[cfg(test)]
mod tests;

pub use canonicalize::Canonicalized;
pub use ucanonicalize::{UCanonicalized, UniverseMap};
pub use unify::{UnificationResult, UnifyError, Variance, Zip};
pub use var::VarSubstitution;

use crate::ir::fold::{infallible, Fold, Folder};
use crate::ir::*;
use serde::{Deserialize, Serialize};
use var::VarBinding;

#[derive(Debug, Clone, Default)]
pub struct InferenceTable {
    /// 绑定状态，按变量索引
    bindings: Vec<VarBinding>,
    /// 目前创建的最高宇宙
    max_universe: UniverseIndex,
}

impl InferenceTable {
    /// 只含根宇宙的空表
    pub fn new() -> Self {
        InferenceTable::default()
    }

    /// 含 `num_universes` 个宇宙、`canonical` 每个绑定器一个新变量的表，以及实例化后的值
    pub fn from_canonical<T: Fold>(
        num_universes: usize,
        canonical: &Canonical<T>,
    ) -> (Self, Substitution, T) {
        let mut table = InferenceTable::new();
        table.max_universe = UniverseIndex(num_universes.saturating_sub(1));
        let subst = table.fresh_subst(&canonical.binders);
        let value = subst.apply(&canonical.value);
        (table, subst, value)
    }

    pub fn max_universe(&self) -> UniverseIndex {
        self.max_universe
    }

    pub fn num_vars(&self) -> usize {
        self.bindings.len()
    }

    /// 创建能看见所有现有宇宙的新宇宙
    pub fn new_universe(&mut self) -> UniverseIndex {
        self.max_universe = self.max_universe.next();
        self.max_universe
    }

    /// 在 `universe` 中创建未绑定变量
    pub fn new_variable(
        &mut self,
        universe: UniverseIndex,
    ) -> InferenceVar {
        if universe > self.max_universe {
            self.max_universe = universe;
        }
        let var = InferenceVar::new(self.bindings.len());
        self.bindings.push(VarBinding::Unbound(universe));
        var
    }

    /// 每个规范绑定器一个新变量
    pub fn fresh_subst(
        &mut self,
        binders: &[CanonicalVarKind],
    ) -> Substitution {
        Substitution::new(
            binders
                .iter()
                .map(|binder| self.new_variable(binder.universe).to_parameter(binder.kind))
                .collect(),
        )
    }

    /// 变量并查集树的根（路径压缩）
    pub(crate) fn find(
        &mut self,
        var: InferenceVar,
    ) -> InferenceVar {
        match self.bindings.get(var.index()) {
            Some(VarBinding::Link(next)) => {
                let next = *next;
                let root = self.find(next);
                if let Some(binding) = self.bindings.get_mut(var.index()) {
                    *binding = VarBinding::Link(root);
                }
                root
            }
            _ => var,
        }
    }

    pub(crate) fn find_readonly(
        &self,
        var: InferenceVar,
    ) -> InferenceVar {
        let mut current = var;
        while let Some(VarBinding::Link(next)) = self.bindings.get(current.index()) {
            current = *next;
        }
        current
    }

    /// 绑定到 `var` 的值（如有）
    pub fn probe_var(
        &self,
        var: InferenceVar,
    ) -> Option<&Parameter> {
        match self.bindings.get(self.find_readonly(var).index()) {
            Some(VarBinding::Bound(value)) => Some(value),
            _ => None,
        }
    }

    /// 未绑定变量所在的宇宙
    pub fn universe_of_unbound_var(
        &self,
        var: InferenceVar,
    ) -> Option<UniverseIndex> {
        match self.bindings.get(self.find_readonly(var).index()) {
            Some(VarBinding::Unbound(universe)) => Some(*universe),
            _ => None,
        }
    }

    pub fn var_is_bound(
        &self,
        var: InferenceVar,
    ) -> bool {
        self.probe_var(var).is_some()
    }

    pub(crate) fn bind(
        &mut self,
        var: InferenceVar,
        value: Parameter,
    ) {
        let root = self.find(var);
        if let Some(binding) = self.bindings.get_mut(root.index()) {
            *binding = VarBinding::Bound(value);
        }
    }

    /// 让 `from` 成为 `to` 的别名
    pub(crate) fn link(
        &mut self,
        from: InferenceVar,
        to: InferenceVar,
    ) {
        let from = self.find(from);
        let to = self.find(to);
        if from != to {
            if let Some(binding) = self.bindings.get_mut(from.index()) {
                *binding = VarBinding::Link(to);
            }
        }
    }

    /// 把未绑定变量移到更小的宇宙
    pub(crate) fn lower_universe(
        &mut self,
        var: InferenceVar,
        universe: UniverseIndex,
    ) {
        let root = self.find(var);
        if let Some(VarBinding::Unbound(current)) = self.bindings.get_mut(root.index()) {
            if universe < *current {
                *current = universe;
            }
        }
    }

    /// Resolve `ty` if it is a bound variable, repeatedly.
    pub fn normalize_shallow(
        &self,
        ty: &Ty,
    ) -> Option<Ty> {
        let var = ty.inference_var()?;
        match self.probe_var(var) {
            Some(Parameter::Ty(bound)) => {
                Some(self.normalize_shallow(bound).unwrap_or_else(|| bound.clone()))
            }
            _ => None,
        }
    }

    pub fn normalize_lifetime(
        &self,
        lifetime: &Lifetime,
    ) -> Option<Lifetime> {
        let var = lifetime.inference_var()?;
        match self.probe_var(var) {
            Some(Parameter::Lifetime(bound)) => {
                Some(self.normalize_lifetime(bound).unwrap_or_else(|| bound.clone()))
            }
            _ => None,
        }
    }

    pub fn normalize_const(
        &self,
        constant: &Const,
    ) -> Option<Const> {
        let var = constant.inference_var()?;
        match self.probe_var(var) {
            Some(Parameter::Const(bound)) => {
                Some(self.normalize_const(bound).unwrap_or_else(|| bound.clone()))
            }
            _ => None,
        }
    }

    /// 把 `value` 中每个已绑定变量替换为其值；未绑定变量替换为其根
    pub fn resolve_vars<T: Fold>(
        &self,
        value: &T,
    ) -> T {
        infallible(value.fold_with(&mut DeepNormalizer { table: self }, DebruijnIndex::INNERMOST))
    }

    /// True if `ty` is (or resolves to) an unbound inference variable.
    pub fn is_unresolved_ty(
        &self,
        ty: &Ty,
    ) -> bool {
        match self.normalize_shallow(ty).as_ref().unwrap_or(ty) {
            Ty::InferenceVar(var) => !self.var_is_bound(*var),
            _ => false,
        }
    }
}

struct DeepNormalizer<'t> {
    table: &'t InferenceTable,
}

impl Folder for DeepNormalizer<'_> {
    fn as_dyn(&mut self) -> &mut dyn Folder {
        self
    }

    fn fold_inference_ty(
        &mut self,
        var: InferenceVar,
        outer_binder: DebruijnIndex,
    ) -> Fallible<Ty> {
        match self.table.probe_var(var) {
            Some(Parameter::Ty(ty)) => {
                let ty = ty.clone();
                Ok(ty.fold_with(self, DebruijnIndex::INNERMOST)?.shifted_in_from(outer_binder))
            }
            _ => Ok(self.table.find_readonly(var).to_ty()),
        }
    }

    fn fold_inference_lifetime(
        &mut self,
        var: InferenceVar,
        outer_binder: DebruijnIndex,
    ) -> Fallible<Lifetime> {
        match self.table.probe_var(var) {
            Some(Parameter::Lifetime(lt)) => {
                let lt = lt.clone();
                Ok(lt.fold_with(self, DebruijnIndex::INNERMOST)?.shifted_in_from(outer_binder))
            }
            _ => Ok(self.table.find_readonly(var).to_lifetime()),
        }
    }

    fn fold_inference_const(
        &mut self,
        var: InferenceVar,
        outer_binder: DebruijnIndex,
    ) -> Fallible<Const> {
        match self.table.probe_var(var) {
            Some(Parameter::Const(c)) => {
                let c = c.clone();
                Ok(c.fold_with(self, DebruijnIndex::INNERMOST)?.shifted_in_from(outer_binder))
            }
            _ => Ok(self.table.find_readonly(var).to_const()),
        }
    }
}

/// [`unify`] 的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unified {
    /// 两个项的最一般合一子
    pub subst: VarSubstitution,
    /// `Normalize` goals for projections that were related to other types
    pub goals: Vec<InEnvironment<DomainGoal>>,
    /// Lifetime relations that must hold
    pub constraints: Vec<InEnvironment<Constraint>>,
}

/// 合一两个可能含推断变量 `?0..?n` 的项
///
/// 这些变量被视为位于任一项中占位符所提及的最高宇宙。
pub fn unify<T: Zip + Fold>(
    a: &T,
    b: &T,
) -> Result<Unified, UnifyError> {
    let mut table = InferenceTable::new();
    let mut scan = VarScan::default();
    scan.visit(a);
    scan.visit(b);
    table.max_universe = scan.max_universe;
    for _ in 0..scan.num_vars {
        table.new_variable(scan.max_universe);
    }

    let result = table.unify(&Environment::new(), a, b)?;

    let mut subst = VarSubstitution::new();
    for index in 0..scan.num_vars {
        let var = InferenceVar::new(index);
        let root = table.find_readonly(var);
        if root == var && !table.var_is_bound(var) {
            continue;
        }
        let value = match table.probe_var(var) {
            Some(value) => table.resolve_vars(value),
            None => root.to_parameter(scan.kind_of(var)),
        };
        subst.insert(var, value);
    }

    Ok(Unified {
        subst,
        goals: result.goals,
        constraints: result.constraints,
    })
}

/// 为求解器准备好的用户目标
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalQuery {
    pub goal: UCanonicalGoal,
    /// `free_vars[i]` 是成为规范绑定器 `i` 的变量
    pub free_vars: Vec<InferenceVar>,
}

/// 规范化可能含推断变量 `?0..?n` 的目标
pub fn canonicalize_query(goal: &InEnvironment<Goal>) -> CanonicalQuery {
    let mut table = InferenceTable::new();
    let mut scan = VarScan::default();
    scan.visit(goal);
    for _ in 0..scan.num_vars {
        table.new_variable(UniverseIndex::ROOT);
    }
    let Canonicalized {
        quantified,
        free_vars,
    } = table.canonicalize(goal);
    let UCanonicalized { quantified, .. } = table.u_canonicalize(&quantified);
    CanonicalQuery {
        goal: quantified,
        free_vars,
    }
}

/// 项中的自由推断变量与占位符宇宙
#[derive(Default)]
struct VarScan {
    num_vars: usize,
    kinds: std::collections::HashMap<InferenceVar, ParameterKind>,
    max_universe: UniverseIndex,
}

impl VarScan {
    fn visit<T: Fold>(
        &mut self,
        value: &T,
    ) {
        infallible(value.fold_with(self, DebruijnIndex::INNERMOST));
    }

    fn kind_of(
        &self,
        var: InferenceVar,
    ) -> ParameterKind {
        self.kinds.get(&var).copied().unwrap_or(ParameterKind::Ty)
    }

    fn record_var(
        &mut self,
        var: InferenceVar,
        kind: ParameterKind,
    ) {
        self.num_vars = self.num_vars.max(var.index() + 1);
        self.kinds.entry(var).or_insert(kind);
    }

    fn record_placeholder(
        &mut self,
        placeholder: PlaceholderIndex,
    ) {
        if placeholder.ui > self.max_universe {
            self.max_universe = placeholder.ui;
        }
    }
}

impl Folder for VarScan {
    fn as_dyn(&mut self) -> &mut dyn Folder {
        self
    }

    fn fold_inference_ty(
        &mut self,
        var: InferenceVar,
        _outer_binder: DebruijnIndex,
    ) -> Fallible<Ty> {
        self.record_var(var, ParameterKind::Ty);
        Ok(var.to_ty())
    }

    fn fold_inference_lifetime(
        &mut self,
        var: InferenceVar,
        _outer_binder: DebruijnIndex,
    ) -> Fallible<Lifetime> {
        self.record_var(var, ParameterKind::Lifetime);
        Ok(var.to_lifetime())
    }

    fn fold_inference_const(
        &mut self,
        var: InferenceVar,
        _outer_binder: DebruijnIndex,
    ) -> Fallible<Const> {
        self.record_var(var, ParameterKind::Const);
        Ok(var.to_const())
    }

    fn fold_placeholder_ty(
        &mut self,
        placeholder: PlaceholderIndex,
        _outer_binder: DebruijnIndex,
    ) -> Fallible<Ty> {
        self.record_placeholder(placeholder);
        Ok(placeholder.to_ty())
    }

    fn fold_placeholder_lifetime(
        &mut self,
        placeholder: PlaceholderIndex,
        _outer_binder: DebruijnIndex,
    ) -> Fallible<Lifetime> {
        self.record_placeholder(placeholder);
        Ok(placeholder.to_lifetime())
    }

    fn fold_placeholder_const(
        &mut self,
        placeholder: PlaceholderIndex,
        _outer_binder: DebruijnIndex,
    ) -> Fallible<Const> {
        self.record_placeholder(placeholder);
        Ok(placeholder.to_const())
    }
}
