//! 合一与子类型
//!
//! 关联两个项要么绑定推断变量，要么失败。两类副作用不在此求解而是返回：
//! - 投影遇到其他类型时产生的 `Normalize` 目标
//! - 两个生命周期必须相关时产生的生命周期约束

use super::InferenceTable;
use crate::ir::fold::{Fold, Folder};
use crate::ir::*;
use tracing::trace;

/// 两个项合一失败的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum UnifyError {
    /// 类型构造器、占位符或常量不同
    #[error("mismatched terms")]
    Mismatch,
    /// 变量将包含自身
    #[error("cyclic type: occurs check failed")]
    Cyclic,
    /// 占位符将逃逸到无法指代它的宇宙
    #[error("placeholder is not visible from the variable's universe")]
    Universe,
}

impl From<UnifyError> for NoSolution {
    fn from(_: UnifyError) -> NoSolution {
        NoSolution
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variance {
    /// `a == b`
    Invariant,
    /// `a <: b`
    Covariant,
    /// `b <: a`
    Contravariant,
}

impl Variance {
    /// Variance of a position with variance `other` inside a position with
    /// variance `self`.
    pub fn xform(
        self,
        other: Variance,
    ) -> Variance {
        match (self, other) {
            (Variance::Invariant, _) | (_, Variance::Invariant) => Variance::Invariant,
            (Variance::Covariant, v) => v,
            (Variance::Contravariant, v) => v.invert(),
        }
    }

    pub fn invert(self) -> Variance {
        match self {
            Variance::Invariant => Variance::Invariant,
            Variance::Covariant => Variance::Contravariant,
            Variance::Contravariant => Variance::Covariant,
        }
    }
}

/// 合一成功后剩余的义务
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnificationResult {
    pub goals: Vec<InEnvironment<DomainGoal>>,
    pub constraints: Vec<InEnvironment<Constraint>>,
}

impl InferenceTable {
    /// 使 `a` 与 `b` 相等
    ///
    /// 失败时表中可能残留部分绑定；调用方会丢弃该表。
    pub fn unify<T: Zip + ?Sized>(
        &mut self,
        environment: &Environment,
        a: &T,
        b: &T,
    ) -> Result<UnificationResult, UnifyError> {
        self.relate(environment, Variance::Invariant, a, b)
    }

    /// 在 `variance` 下关联 `a` 与 `b`
    pub fn relate<T: Zip + ?Sized>(
        &mut self,
        environment: &Environment,
        variance: Variance,
        a: &T,
        b: &T,
    ) -> Result<UnificationResult, UnifyError> {
        let mut unifier = Unifier {
            table: self,
            environment,
            result: UnificationResult::default(),
        };
        T::zip_with(&mut unifier, variance, a, b)?;
        Ok(unifier.result)
    }
}

/// Walks two terms in lockstep
pub struct Unifier<'t> {
    table: &'t mut InferenceTable,
    environment: &'t Environment,
    result: UnificationResult,
}

/// Terms that can be related structurally.
pub trait Zip {
    fn zip_with(
        unifier: &mut Unifier<'_>,
        variance: Variance,
        a: &Self,
        b: &Self,
    ) -> Result<(), UnifyError>;
}

impl Unifier<'_> {
    fn resolve_ty(
        &mut self,
        ty: &Ty,
    ) -> Ty {
        match self.table.normalize_shallow(ty) {
            Some(ty) => ty,
            None => match ty {
                Ty::InferenceVar(var) => self.table.find(*var).to_ty(),
                _ => ty.clone(),
            },
        }
    }

    fn resolve_lifetime(
        &mut self,
        lifetime: &Lifetime,
    ) -> Lifetime {
        match self.table.normalize_lifetime(lifetime) {
            Some(lt) => lt,
            None => match lifetime {
                Lifetime::InferenceVar(var) => self.table.find(*var).to_lifetime(),
                _ => lifetime.clone(),
            },
        }
    }

    fn resolve_const(
        &mut self,
        constant: &Const,
    ) -> Const {
        match self.table.normalize_const(constant) {
            Some(c) => c,
            None => match constant {
                Const::InferenceVar(var) => self.table.find(*var).to_const(),
                _ => constant.clone(),
            },
        }
    }

    pub fn relate_tys(
        &mut self,
        variance: Variance,
        a: &Ty,
        b: &Ty,
    ) -> Result<(), UnifyError> {
        let a = self.resolve_ty(a);
        let b = self.resolve_ty(b);
        trace!(%a, %b, ?variance, "relate_tys");

        match (&a, &b) {
            (Ty::Projection(x), Ty::Projection(y)) => {
                if x == y {
                    return Ok(());
                }
                let universe = self.table.max_universe();
                let var = self.table.new_variable(universe).to_ty();
                self.push_normalize(x.clone(), var.clone());
                self.push_normalize(y.clone(), var);
                Ok(())
            }
            (Ty::Projection(projection), other) | (other, Ty::Projection(projection)) => {
                self.push_normalize(projection.clone(), other.clone());
                Ok(())
            }

            (Ty::InferenceVar(x), Ty::InferenceVar(y)) => {
                self.unify_var_var(*x, *y);
                Ok(())
            }
            (Ty::InferenceVar(var), other) | (other, Ty::InferenceVar(var)) => {
                self.bind_var(*var, Parameter::Ty(other.clone()))
            }

            (Ty::ForAll(x), Ty::ForAll(y)) => self.relate_forall_tys(variance, x, y),
            (Ty::ForAll(x), other) => self.relate_forall_other(variance, x, other),
            (other, Ty::ForAll(y)) => self.relate_forall_other(variance.invert(), y, other),

            (Ty::Apply(x), Ty::Apply(y)) => {
                if x.name != y.name || x.parameters.len() != y.parameters.len() {
                    return Err(UnifyError::Mismatch);
                }
                self.relate_application(variance, x, y)
            }
            (Ty::Placeholder(x), Ty::Placeholder(y)) if x == y => Ok(()),
            (Ty::BoundVar(x), Ty::BoundVar(y)) if x == y => Ok(()),
            _ => Err(UnifyError::Mismatch),
        }
    }

    fn relate_application(
        &mut self,
        variance: Variance,
        a: &ApplicationTy,
        b: &ApplicationTy,
    ) -> Result<(), UnifyError> {
        for (index, (x, y)) in a.parameters.iter().zip(&b.parameters).enumerate() {
            let position = parameter_variance(&a.name, index);
            Parameter::zip_with(self, variance.xform(position), x, y)?;
        }
        Ok(())
    }

    /// `for<..> A` against `for<..> B`: each side must be at least as general
    /// as the other for equality, only the supertype side for subtyping.
    fn relate_forall_tys(
        &mut self,
        variance: Variance,
        a: &QuantifiedTy,
        b: &QuantifiedTy,
    ) -> Result<(), UnifyError> {
        if variance != Variance::Contravariant {
            let general = self.instantiate_universally(b);
            let specific = self.instantiate_existentially(a);
            self.relate_tys(variance, &specific, &general)?;
        }
        if variance != Variance::Covariant {
            let general = self.instantiate_universally(a);
            let specific = self.instantiate_existentially(b);
            self.relate_tys(variance, &general, &specific)?;
        }
        Ok(())
    }

    /// `for<..> A` against a type that is not higher-ranked.
    fn relate_forall_other(
        &mut self,
        variance: Variance,
        quantified: &QuantifiedTy,
        other: &Ty,
    ) -> Result<(), UnifyError> {
        let instantiated = self.instantiate_universally(quantified);
        self.relate_tys(variance, &instantiated, other)
    }

    fn instantiate_universally(
        &mut self,
        quantified: &QuantifiedTy,
    ) -> Ty {
        let universe = self.table.new_universe();
        let parameters: Vec<_> = (0..quantified.num_binders)
            .map(|idx| PlaceholderIndex { ui: universe, idx }.to_lifetime().cast())
            .collect();
        Subst::apply(&parameters, &quantified.ty)
    }

    fn instantiate_existentially(
        &mut self,
        quantified: &QuantifiedTy,
    ) -> Ty {
        let universe = self.table.max_universe();
        let parameters: Vec<_> = (0..quantified.num_binders)
            .map(|_| self.table.new_variable(universe).to_lifetime().cast())
            .collect();
        Subst::apply(&parameters, &quantified.ty)
    }

    pub fn relate_lifetimes(
        &mut self,
        variance: Variance,
        a: &Lifetime,
        b: &Lifetime,
    ) -> Result<(), UnifyError> {
        let a = self.resolve_lifetime(a);
        let b = self.resolve_lifetime(b);
        if a == b {
            return Ok(());
        }

        match (variance, &a, &b) {
            (Variance::Invariant, Lifetime::InferenceVar(x), Lifetime::InferenceVar(y)) => {
                self.unify_var_var(*x, *y);
            }
            (Variance::Invariant, Lifetime::InferenceVar(var), other)
            | (Variance::Invariant, other, Lifetime::InferenceVar(var)) => {
                self.unify_lifetime_var(*var, other);
            }
            (Variance::Invariant, _, _) => self.push_constraint(Constraint::LifetimeEq(a, b)),
            (Variance::Covariant, _, _) => self.push_constraint(Constraint::Outlives(a, b)),
            (Variance::Contravariant, _, _) => self.push_constraint(Constraint::Outlives(b, a)),
        }
        Ok(())
    }

    /// Bind a lifetime variable if it can name `value`, else record equality.
    fn unify_lifetime_var(
        &mut self,
        var: InferenceVar,
        value: &Lifetime,
    ) {
        let universe = self
            .table
            .universe_of_unbound_var(var)
            .unwrap_or(UniverseIndex::ROOT);
        let visible = match value {
            Lifetime::Placeholder(p) => universe.can_see(p.ui),
            Lifetime::Static => true,
            Lifetime::BoundVar(_) | Lifetime::InferenceVar(_) => false,
        };
        if visible {
            self.table.bind(var, value.clone().cast());
        } else {
            self.push_constraint(Constraint::LifetimeEq(var.to_lifetime(), value.clone()));
        }
    }

    pub fn relate_consts(
        &mut self,
        a: &Const,
        b: &Const,
    ) -> Result<(), UnifyError> {
        let a = self.resolve_const(a);
        let b = self.resolve_const(b);
        match (&a, &b) {
            (Const::InferenceVar(x), Const::InferenceVar(y)) => {
                self.unify_var_var(*x, *y);
                Ok(())
            }
            (Const::InferenceVar(var), other) | (other, Const::InferenceVar(var)) => {
                self.bind_var(*var, Parameter::Const(other.clone()))
            }
            (Const::Value(x), Const::Value(y)) if x == y => Ok(()),
            (Const::Placeholder(x), Const::Placeholder(y)) if x == y => Ok(()),
            (Const::BoundVar(x), Const::BoundVar(y)) if x == y => Ok(()),
            _ => Err(UnifyError::Mismatch),
        }
    }

    /// 宇宙较小的变量成为根
    fn unify_var_var(
        &mut self,
        a: InferenceVar,
        b: InferenceVar,
    ) {
        let a = self.table.find(a);
        let b = self.table.find(b);
        if a == b {
            return;
        }
        let ua = self.table.universe_of_unbound_var(a);
        let ub = self.table.universe_of_unbound_var(b);
        if ua <= ub {
            self.table.link(b, a);
        } else {
            self.table.link(a, b);
        }
    }

    fn bind_var(
        &mut self,
        var: InferenceVar,
        value: Parameter,
    ) -> Result<(), UnifyError> {
        let var = self.table.find(var);
        let universe = self
            .table
            .universe_of_unbound_var(var)
            .unwrap_or(UniverseIndex::ROOT);
        let mut check = OccursCheck {
            unifier: self,
            var,
            universe,
            failure: None,
        };
        let value = match value.fold_with(&mut check, DebruijnIndex::INNERMOST) {
            Ok(value) => value,
            Err(NoSolution) => return Err(check.failure.unwrap_or(UnifyError::Mismatch)),
        };
        trace!(%var, %value, "bind_var");
        self.table.bind(var, value);
        Ok(())
    }

    fn push_normalize(
        &mut self,
        alias: ProjectionTy,
        ty: Ty,
    ) {
        let goal = DomainGoal::Normalize(Normalize { alias, ty });
        self.result
            .goals
            .push(InEnvironment::new(self.environment, goal));
    }

    fn push_constraint(
        &mut self,
        constraint: Constraint,
    ) {
        self.result
            .constraints
            .push(InEnvironment::new(self.environment, constraint));
    }
}

/// `&'a T` is covariant in both positions, `&'a mut T` only in `'a`.
fn parameter_variance(
    name: &TypeName,
    index: usize,
) -> Variance {
    match (name, index) {
        (TypeName::Ref(_), 0) => Variance::Covariant,
        (TypeName::Ref(Mutability::Not), 1) => Variance::Covariant,
        _ => Variance::Invariant,
    }
}

/// 拒绝会成环或泄漏占位符的绑定，并把值中变量的宇宙降到被绑定变量的宇宙
struct OccursCheck<'u, 't> {
    unifier: &'u mut Unifier<'t>,
    var: InferenceVar,
    universe: UniverseIndex,
    failure: Option<UnifyError>,
}

impl OccursCheck<'_, '_> {
    fn fail<T>(
        &mut self,
        error: UnifyError,
    ) -> Fallible<T> {
        self.failure = Some(error);
        Err(NoSolution)
    }

    /// Root of `var` and its bound value, after checking for cycles.
    fn visit_var(
        &mut self,
        var: InferenceVar,
    ) -> Fallible<(InferenceVar, Option<Parameter>)> {
        let root = self.unifier.table.find(var);
        if root == self.var {
            return self.fail(UnifyError::Cyclic);
        }
        let bound = self.unifier.table.probe_var(root).cloned();
        if bound.is_none() {
            self.unifier.table.lower_universe(root, self.universe);
        }
        Ok((root, bound))
    }
}

impl Folder for OccursCheck<'_, '_> {
    fn as_dyn(&mut self) -> &mut dyn Folder {
        self
    }

    fn fold_inference_ty(
        &mut self,
        var: InferenceVar,
        outer_binder: DebruijnIndex,
    ) -> Fallible<Ty> {
        match self.visit_var(var)? {
            (_, Some(Parameter::Ty(ty))) => Ok(ty
                .fold_with(self, DebruijnIndex::INNERMOST)?
                .shifted_in_from(outer_binder)),
            (root, _) => Ok(root.to_ty()),
        }
    }

    fn fold_inference_lifetime(
        &mut self,
        var: InferenceVar,
        outer_binder: DebruijnIndex,
    ) -> Fallible<Lifetime> {
        match self.visit_var(var)? {
            (_, Some(Parameter::Lifetime(lt))) => Ok(lt
                .fold_with(self, DebruijnIndex::INNERMOST)?
                .shifted_in_from(outer_binder)),
            (root, _) => Ok(root.to_lifetime()),
        }
    }

    fn fold_inference_const(
        &mut self,
        var: InferenceVar,
        outer_binder: DebruijnIndex,
    ) -> Fallible<Const> {
        match self.visit_var(var)? {
            (_, Some(Parameter::Const(c))) => Ok(c
                .fold_with(self, DebruijnIndex::INNERMOST)?
                .shifted_in_from(outer_binder)),
            (root, _) => Ok(root.to_const()),
        }
    }

    fn fold_placeholder_ty(
        &mut self,
        placeholder: PlaceholderIndex,
        _outer_binder: DebruijnIndex,
    ) -> Fallible<Ty> {
        if self.universe.can_see(placeholder.ui) {
            Ok(placeholder.to_ty())
        } else {
            self.fail(UnifyError::Universe)
        }
    }

    /// An invisible lifetime is replaced by a fresh variable constrained to
    /// equal it.
    fn fold_placeholder_lifetime(
        &mut self,
        placeholder: PlaceholderIndex,
        _outer_binder: DebruijnIndex,
    ) -> Fallible<Lifetime> {
        if self.universe.can_see(placeholder.ui) {
            return Ok(placeholder.to_lifetime());
        }
        let fresh = self.unifier.table.new_variable(self.universe).to_lifetime();
        self.unifier
            .push_constraint(Constraint::LifetimeEq(fresh.clone(), placeholder.to_lifetime()));
        Ok(fresh)
    }

    fn fold_placeholder_const(
        &mut self,
        placeholder: PlaceholderIndex,
        _outer_binder: DebruijnIndex,
    ) -> Fallible<Const> {
        if self.universe.can_see(placeholder.ui) {
            Ok(placeholder.to_const())
        } else {
            self.fail(UnifyError::Universe)
        }
    }
}

impl Zip for Ty {
    fn zip_with(
        unifier: &mut Unifier<'_>,
        variance: Variance,
        a: &Self,
        b: &Self,
    ) -> Result<(), UnifyError> {
        unifier.relate_tys(variance, a, b)
    }
}

impl Zip for Lifetime {
    fn zip_with(
        unifier: &mut Unifier<'_>,
        variance: Variance,
        a: &Self,
        b: &Self,
    ) -> Result<(), UnifyError> {
        unifier.relate_lifetimes(variance, a, b)
    }
}

impl Zip for Const {
    fn zip_with(
        unifier: &mut Unifier<'_>,
        _variance: Variance,
        a: &Self,
        b: &Self,
    ) -> Result<(), UnifyError> {
        unifier.relate_consts(a, b)
    }
}

impl Zip for Parameter {
    fn zip_with(
        unifier: &mut Unifier<'_>,
        variance: Variance,
        a: &Self,
        b: &Self,
    ) -> Result<(), UnifyError> {
        match (a, b) {
            (Parameter::Ty(x), Parameter::Ty(y)) => unifier.relate_tys(variance, x, y),
            (Parameter::Lifetime(x), Parameter::Lifetime(y)) => {
                unifier.relate_lifetimes(variance, x, y)
            }
            (Parameter::Const(x), Parameter::Const(y)) => unifier.relate_consts(x, y),
            _ => Err(UnifyError::Mismatch),
        }
    }
}

impl<T: Zip> Zip for [T] {
    fn zip_with(
        unifier: &mut Unifier<'_>,
        variance: Variance,
        a: &Self,
        b: &Self,
    ) -> Result<(), UnifyError> {
        if a.len() != b.len() {
            return Err(UnifyError::Mismatch);
        }
        for (x, y) in a.iter().zip(b) {
            T::zip_with(unifier, variance, x, y)?;
        }
        Ok(())
    }
}

impl<T: Zip> Zip for Vec<T> {
    fn zip_with(
        unifier: &mut Unifier<'_>,
        variance: Variance,
        a: &Self,
        b: &Self,
    ) -> Result<(), UnifyError> {
        <[T]>::zip_with(unifier, variance, a, b)
    }
}

impl Zip for TraitRef {
    fn zip_with(
        unifier: &mut Unifier<'_>,
        _variance: Variance,
        a: &Self,
        b: &Self,
    ) -> Result<(), UnifyError> {
        if a.trait_id != b.trait_id {
            return Err(UnifyError::Mismatch);
        }
        Vec::zip_with(unifier, Variance::Invariant, &a.parameters, &b.parameters)
    }
}

/// Projections are compared structurally here; only projections inside
/// types turn into `Normalize` goals.
impl Zip for ProjectionTy {
    fn zip_with(
        unifier: &mut Unifier<'_>,
        _variance: Variance,
        a: &Self,
        b: &Self,
    ) -> Result<(), UnifyError> {
        if a.associated_ty_id != b.associated_ty_id {
            return Err(UnifyError::Mismatch);
        }
        Vec::zip_with(unifier, Variance::Invariant, &a.parameters, &b.parameters)
    }
}

impl Zip for DomainGoal {
    fn zip_with(
        unifier: &mut Unifier<'_>,
        _variance: Variance,
        a: &Self,
        b: &Self,
    ) -> Result<(), UnifyError> {
        let invariant = Variance::Invariant;
        match (a, b) {
            (DomainGoal::Implemented(x), DomainGoal::Implemented(y)) => {
                TraitRef::zip_with(unifier, invariant, x, y)
            }
            (DomainGoal::Normalize(x), DomainGoal::Normalize(y)) => {
                ProjectionTy::zip_with(unifier, invariant, &x.alias, &y.alias)?;
                unifier.relate_tys(invariant, &x.ty, &y.ty)
            }
            (DomainGoal::WellFormed(WellFormed::Ty(x)), DomainGoal::WellFormed(WellFormed::Ty(y)))
            | (DomainGoal::FromEnv(FromEnv::Ty(x)), DomainGoal::FromEnv(FromEnv::Ty(y))) => {
                unifier.relate_tys(invariant, x, y)
            }
            (
                DomainGoal::WellFormed(WellFormed::Trait(x)),
                DomainGoal::WellFormed(WellFormed::Trait(y)),
            )
            | (DomainGoal::FromEnv(FromEnv::Trait(x)), DomainGoal::FromEnv(FromEnv::Trait(y))) => {
                TraitRef::zip_with(unifier, invariant, x, y)
            }
            (
                DomainGoal::LifetimeOutlives { a: a1, b: b1 },
                DomainGoal::LifetimeOutlives { a: a2, b: b2 },
            ) => {
                unifier.relate_lifetimes(invariant, a1, a2)?;
                unifier.relate_lifetimes(invariant, b1, b2)
            }
            _ => Err(UnifyError::Mismatch),
        }
    }
}
