//! IR 项的结构化折叠
//!
//! [`Folder`] 改写项的叶子（变量和占位符），[`Fold`] 负责遍历每种 IR 类型，
//! 并记录已进入的绑定器数（`outer_binder`）。

pub mod shift;
pub mod subst;

use super::*;

/// 改写项中类变量的叶子
///
/// 所有方法默认为恒等。绑定变量只有相对于被折叠的值是自由的，才会到达
/// `fold_free_var_*`；到达时已移出 `outer_binder`。
pub trait Folder {
    fn as_dyn(&mut self) -> &mut dyn Folder;

    fn fold_ty(
        &mut self,
        ty: &Ty,
        outer_binder: DebruijnIndex,
    ) -> Fallible<Ty> {
        super_fold_ty(self.as_dyn(), ty, outer_binder)
    }

    fn fold_lifetime(
        &mut self,
        lifetime: &Lifetime,
        outer_binder: DebruijnIndex,
    ) -> Fallible<Lifetime> {
        super_fold_lifetime(self.as_dyn(), lifetime, outer_binder)
    }

    fn fold_const(
        &mut self,
        constant: &Const,
        outer_binder: DebruijnIndex,
    ) -> Fallible<Const> {
        super_fold_const(self.as_dyn(), constant, outer_binder)
    }

    fn fold_free_var_ty(
        &mut self,
        bound_var: BoundVar,
        outer_binder: DebruijnIndex,
    ) -> Fallible<Ty> {
        Ok(bound_var.shifted_in_from(outer_binder).to_ty())
    }

    fn fold_free_var_lifetime(
        &mut self,
        bound_var: BoundVar,
        outer_binder: DebruijnIndex,
    ) -> Fallible<Lifetime> {
        Ok(bound_var.shifted_in_from(outer_binder).to_lifetime())
    }

    fn fold_free_var_const(
        &mut self,
        bound_var: BoundVar,
        outer_binder: DebruijnIndex,
    ) -> Fallible<Const> {
        Ok(bound_var.shifted_in_from(outer_binder).to_const())
    }

    fn fold_inference_ty(
        &mut self,
        var: InferenceVar,
        _outer_binder: DebruijnIndex,
    ) -> Fallible<Ty> {
        Ok(var.to_ty())
    }

    fn fold_inference_lifetime(
        &mut self,
        var: InferenceVar,
        _outer_binder: DebruijnIndex,
    ) -> Fallible<Lifetime> {
        Ok(var.to_lifetime())
    }

    fn fold_inference_const(
        &mut self,
        var: InferenceVar,
        _outer_binder: DebruijnIndex,
    ) -> Fallible<Const> {
        Ok(var.to_const())
    }

    fn fold_placeholder_ty(
        &mut self,
        placeholder: PlaceholderIndex,
        _outer_binder: DebruijnIndex,
    ) -> Fallible<Ty> {
        Ok(placeholder.to_ty())
    }

    fn fold_placeholder_lifetime(
        &mut self,
        placeholder: PlaceholderIndex,
        _outer_binder: DebruijnIndex,
    ) -> Fallible<Lifetime> {
        Ok(placeholder.to_lifetime())
    }

    fn fold_placeholder_const(
        &mut self,
        placeholder: PlaceholderIndex,
        _outer_binder: DebruijnIndex,
    ) -> Fallible<Const> {
        Ok(placeholder.to_const())
    }
}

pub fn super_fold_ty(
    folder: &mut dyn Folder,
    ty: &Ty,
    outer_binder: DebruijnIndex,
) -> Fallible<Ty> {
    match ty {
        Ty::BoundVar(bv) => match bv.shifted_out_to(outer_binder) {
            Some(free) => folder.fold_free_var_ty(free, outer_binder),
            None => Ok(ty.clone()),
        },
        Ty::InferenceVar(var) => folder.fold_inference_ty(*var, outer_binder),
        Ty::Placeholder(p) => folder.fold_placeholder_ty(*p, outer_binder),
        Ty::Apply(apply) => Ok(Ty::Apply(ApplicationTy {
            name: apply.name.clone(),
            parameters: apply.parameters.fold_with(folder, outer_binder)?,
        })),
        Ty::Projection(proj) => Ok(Ty::Projection(proj.fold_with(folder, outer_binder)?)),
        Ty::ForAll(quantified) => Ok(Ty::ForAll(Box::new(QuantifiedTy {
            num_binders: quantified.num_binders,
            ty: quantified.ty.fold_with(folder, outer_binder.shifted_in())?,
        }))),
    }
}

pub fn super_fold_lifetime(
    folder: &mut dyn Folder,
    lifetime: &Lifetime,
    outer_binder: DebruijnIndex,
) -> Fallible<Lifetime> {
    match lifetime {
        Lifetime::BoundVar(bv) => match bv.shifted_out_to(outer_binder) {
            Some(free) => folder.fold_free_var_lifetime(free, outer_binder),
            None => Ok(lifetime.clone()),
        },
        Lifetime::InferenceVar(var) => folder.fold_inference_lifetime(*var, outer_binder),
        Lifetime::Placeholder(p) => folder.fold_placeholder_lifetime(*p, outer_binder),
        Lifetime::Static => Ok(Lifetime::Static),
    }
}

pub fn super_fold_const(
    folder: &mut dyn Folder,
    constant: &Const,
    outer_binder: DebruijnIndex,
) -> Fallible<Const> {
    match constant {
        Const::BoundVar(bv) => match bv.shifted_out_to(outer_binder) {
            Some(free) => folder.fold_free_var_const(free, outer_binder),
            None => Ok(constant.clone()),
        },
        Const::InferenceVar(var) => folder.fold_inference_const(*var, outer_binder),
        Const::Placeholder(p) => folder.fold_placeholder_const(*p, outer_binder),
        Const::Value(v) => Ok(Const::Value(*v)),
    }
}

/// 可被 [`Folder`] 改写的值
pub trait Fold: Sized {
    fn fold_with(
        &self,
        folder: &mut dyn Folder,
        outer_binder: DebruijnIndex,
    ) -> Fallible<Self>;
}

/// 展开不会失败的折叠器的结果
pub(crate) fn infallible<T>(result: Fallible<T>) -> T {
    match result {
        Ok(value) => value,
        Err(NoSolution) => unreachable!("infallible folder reported NoSolution"),
    }
}

impl Fold for Ty {
    fn fold_with(
        &self,
        folder: &mut dyn Folder,
        outer_binder: DebruijnIndex,
    ) -> Fallible<Self> {
        folder.fold_ty(self, outer_binder)
    }
}

impl Fold for Lifetime {
    fn fold_with(
        &self,
        folder: &mut dyn Folder,
        outer_binder: DebruijnIndex,
    ) -> Fallible<Self> {
        folder.fold_lifetime(self, outer_binder)
    }
}

impl Fold for Const {
    fn fold_with(
        &self,
        folder: &mut dyn Folder,
        outer_binder: DebruijnIndex,
    ) -> Fallible<Self> {
        folder.fold_const(self, outer_binder)
    }
}

impl Fold for Parameter {
    fn fold_with(
        &self,
        folder: &mut dyn Folder,
        outer_binder: DebruijnIndex,
    ) -> Fallible<Self> {
        Ok(match self {
            Parameter::Ty(ty) => Parameter::Ty(ty.fold_with(folder, outer_binder)?),
            Parameter::Lifetime(lt) => Parameter::Lifetime(lt.fold_with(folder, outer_binder)?),
            Parameter::Const(c) => Parameter::Const(c.fold_with(folder, outer_binder)?),
        })
    }
}

impl<T: Fold> Fold for Vec<T> {
    fn fold_with(
        &self,
        folder: &mut dyn Folder,
        outer_binder: DebruijnIndex,
    ) -> Fallible<Self> {
        self.iter()
            .map(|item| item.fold_with(folder, outer_binder))
            .collect()
    }
}

impl<T: Fold> Fold for Box<T> {
    fn fold_with(
        &self,
        folder: &mut dyn Folder,
        outer_binder: DebruijnIndex,
    ) -> Fallible<Self> {
        Ok(Box::new((**self).fold_with(folder, outer_binder)?))
    }
}

impl<A: Fold, B: Fold> Fold for (A, B) {
    fn fold_with(
        &self,
        folder: &mut dyn Folder,
        outer_binder: DebruijnIndex,
    ) -> Fallible<Self> {
        Ok((
            self.0.fold_with(folder, outer_binder)?,
            self.1.fold_with(folder, outer_binder)?,
        ))
    }
}

impl<T: Fold> Fold for Binders<T> {
    fn fold_with(
        &self,
        folder: &mut dyn Folder,
        outer_binder: DebruijnIndex,
    ) -> Fallible<Self> {
        Ok(Binders {
            binders: self.binders.clone(),
            value: self.value.fold_with(folder, outer_binder.shifted_in())?,
        })
    }
}

impl<T: Fold> Fold for Canonical<T> {
    fn fold_with(
        &self,
        folder: &mut dyn Folder,
        outer_binder: DebruijnIndex,
    ) -> Fallible<Self> {
        Ok(Canonical {
            value: self.value.fold_with(folder, outer_binder.shifted_in())?,
            binders: self.binders.clone(),
        })
    }
}

impl Fold for ProjectionTy {
    fn fold_with(
        &self,
        folder: &mut dyn Folder,
        outer_binder: DebruijnIndex,
    ) -> Fallible<Self> {
        Ok(ProjectionTy {
            associated_ty_id: self.associated_ty_id.clone(),
            parameters: self.parameters.fold_with(folder, outer_binder)?,
        })
    }
}

impl Fold for TraitRef {
    fn fold_with(
        &self,
        folder: &mut dyn Folder,
        outer_binder: DebruijnIndex,
    ) -> Fallible<Self> {
        Ok(TraitRef {
            trait_id: self.trait_id.clone(),
            parameters: self.parameters.fold_with(folder, outer_binder)?,
        })
    }
}

impl Fold for Normalize {
    fn fold_with(
        &self,
        folder: &mut dyn Folder,
        outer_binder: DebruijnIndex,
    ) -> Fallible<Self> {
        Ok(Normalize {
            alias: self.alias.fold_with(folder, outer_binder)?,
            ty: self.ty.fold_with(folder, outer_binder)?,
        })
    }
}

impl Fold for WellFormed {
    fn fold_with(
        &self,
        folder: &mut dyn Folder,
        outer_binder: DebruijnIndex,
    ) -> Fallible<Self> {
        Ok(match self {
            WellFormed::Ty(ty) => WellFormed::Ty(ty.fold_with(folder, outer_binder)?),
            WellFormed::Trait(tr) => WellFormed::Trait(tr.fold_with(folder, outer_binder)?),
        })
    }
}

impl Fold for FromEnv {
    fn fold_with(
        &self,
        folder: &mut dyn Folder,
        outer_binder: DebruijnIndex,
    ) -> Fallible<Self> {
        Ok(match self {
            FromEnv::Ty(ty) => FromEnv::Ty(ty.fold_with(folder, outer_binder)?),
            FromEnv::Trait(tr) => FromEnv::Trait(tr.fold_with(folder, outer_binder)?),
        })
    }
}

impl Fold for DomainGoal {
    fn fold_with(
        &self,
        folder: &mut dyn Folder,
        outer_binder: DebruijnIndex,
    ) -> Fallible<Self> {
        Ok(match self {
            DomainGoal::Implemented(tr) => DomainGoal::Implemented(tr.fold_with(folder, outer_binder)?),
            DomainGoal::Normalize(n) => DomainGoal::Normalize(n.fold_with(folder, outer_binder)?),
            DomainGoal::WellFormed(wf) => DomainGoal::WellFormed(wf.fold_with(folder, outer_binder)?),
            DomainGoal::FromEnv(fe) => DomainGoal::FromEnv(fe.fold_with(folder, outer_binder)?),
            DomainGoal::LifetimeOutlives { a, b } => DomainGoal::LifetimeOutlives {
                a: a.fold_with(folder, outer_binder)?,
                b: b.fold_with(folder, outer_binder)?,
            },
        })
    }
}

impl Fold for Goal {
    fn fold_with(
        &self,
        folder: &mut dyn Folder,
        outer_binder: DebruijnIndex,
    ) -> Fallible<Self> {
        Ok(match self {
            Goal::Quantified(kind, subgoal) => {
                Goal::Quantified(*kind, subgoal.fold_with(folder, outer_binder)?)
            }
            Goal::Implies(clauses, subgoal) => Goal::Implies(
                clauses.fold_with(folder, outer_binder)?,
                subgoal.fold_with(folder, outer_binder)?,
            ),
            Goal::All(goals) => Goal::All(goals.fold_with(folder, outer_binder)?),
            Goal::Any(goals) => Goal::Any(goals.fold_with(folder, outer_binder)?),
            Goal::Not(subgoal) => Goal::Not(subgoal.fold_with(folder, outer_binder)?),
            Goal::Eq(EqGoal { a, b }) => Goal::Eq(EqGoal {
                a: a.fold_with(folder, outer_binder)?,
                b: b.fold_with(folder, outer_binder)?,
            }),
            Goal::Subtype(SubtypeGoal { a, b }) => Goal::Subtype(SubtypeGoal {
                a: a.fold_with(folder, outer_binder)?,
                b: b.fold_with(folder, outer_binder)?,
            }),
            Goal::Domain(dg) => Goal::Domain(dg.fold_with(folder, outer_binder)?),
            Goal::CannotProve => Goal::CannotProve,
        })
    }
}

impl Fold for ProgramClauseImplication {
    fn fold_with(
        &self,
        folder: &mut dyn Folder,
        outer_binder: DebruijnIndex,
    ) -> Fallible<Self> {
        Ok(ProgramClauseImplication {
            consequence: self.consequence.fold_with(folder, outer_binder)?,
            conditions: self.conditions.fold_with(folder, outer_binder)?,
            priority: self.priority,
        })
    }
}

impl Fold for ProgramClause {
    fn fold_with(
        &self,
        folder: &mut dyn Folder,
        outer_binder: DebruijnIndex,
    ) -> Fallible<Self> {
        Ok(ProgramClause(self.0.fold_with(folder, outer_binder)?))
    }
}

impl Fold for Environment {
    fn fold_with(
        &self,
        folder: &mut dyn Folder,
        outer_binder: DebruijnIndex,
    ) -> Fallible<Self> {
        Ok(Environment {
            clauses: self.clauses.fold_with(folder, outer_binder)?,
        })
    }
}

impl<G: Fold> Fold for InEnvironment<G> {
    fn fold_with(
        &self,
        folder: &mut dyn Folder,
        outer_binder: DebruijnIndex,
    ) -> Fallible<Self> {
        Ok(InEnvironment {
            environment: self.environment.fold_with(folder, outer_binder)?,
            goal: self.goal.fold_with(folder, outer_binder)?,
        })
    }
}

impl Fold for Constraint {
    fn fold_with(
        &self,
        folder: &mut dyn Folder,
        outer_binder: DebruijnIndex,
    ) -> Fallible<Self> {
        Ok(match self {
            Constraint::LifetimeEq(a, b) => Constraint::LifetimeEq(
                a.fold_with(folder, outer_binder)?,
                b.fold_with(folder, outer_binder)?,
            ),
            Constraint::Outlives(a, b) => Constraint::Outlives(
                a.fold_with(folder, outer_binder)?,
                b.fold_with(folder, outer_binder)?,
            ),
        })
    }
}

impl Fold for Substitution {
    fn fold_with(
        &self,
        folder: &mut dyn Folder,
        outer_binder: DebruijnIndex,
    ) -> Fallible<Self> {
        Ok(Substitution {
            parameters: self.parameters.fold_with(folder, outer_binder)?,
        })
    }
}

impl Fold for ConstrainedSubst {
    fn fold_with(
        &self,
        folder: &mut dyn Folder,
        outer_binder: DebruijnIndex,
    ) -> Fallible<Self> {
        Ok(ConstrainedSubst {
            subst: self.subst.fold_with(folder, outer_binder)?,
            constraints: self.constraints.fold_with(folder, outer_binder)?,
        })
    }
}
