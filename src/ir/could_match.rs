//! 候选子句的廉价预筛选
//!
//! `could_match` 在没有推断表的情况下回答“这两个项是否可能合一”。
//! 它是保守的：`false` 表示合一必然失败，`true` 不说明任何事。

use super::*;

pub trait CouldMatch<T: ?Sized> {
    fn could_match(
        &self,
        other: &T,
    ) -> bool;
}

impl CouldMatch<Ty> for Ty {
    fn could_match(
        &self,
        other: &Ty,
    ) -> bool {
        match (self, other) {
            (Ty::InferenceVar(_), _) | (_, Ty::InferenceVar(_)) => true,
            (Ty::BoundVar(_), _) | (_, Ty::BoundVar(_)) => true,
            // 投影可能归一化为任何类型
            (Ty::Projection(_), _) | (_, Ty::Projection(_)) => true,
            (Ty::Placeholder(a), Ty::Placeholder(b)) => a == b,
            (Ty::Apply(a), Ty::Apply(b)) => {
                a.name == b.name && a.parameters.could_match(&b.parameters)
            }
            (Ty::ForAll(a), Ty::ForAll(b)) => {
                a.num_binders == b.num_binders && a.ty.could_match(&b.ty)
            }
            _ => false,
        }
    }
}

impl CouldMatch<Parameter> for Parameter {
    fn could_match(
        &self,
        other: &Parameter,
    ) -> bool {
        match (self, other) {
            (Parameter::Ty(a), Parameter::Ty(b)) => a.could_match(b),
            // lifetimes never prevent a match; they become constraints
            (Parameter::Lifetime(_), Parameter::Lifetime(_)) => true,
            (Parameter::Const(Const::Value(a)), Parameter::Const(Const::Value(b))) => a == b,
            (Parameter::Const(_), Parameter::Const(_)) => true,
            _ => false,
        }
    }
}

impl CouldMatch<[Parameter]> for [Parameter] {
    fn could_match(
        &self,
        other: &[Parameter],
    ) -> bool {
        self.len() == other.len() && self.iter().zip(other).all(|(a, b)| a.could_match(b))
    }
}

impl CouldMatch<Vec<Parameter>> for Vec<Parameter> {
    fn could_match(
        &self,
        other: &Vec<Parameter>,
    ) -> bool {
        self.as_slice().could_match(other.as_slice())
    }
}

impl CouldMatch<TraitRef> for TraitRef {
    fn could_match(
        &self,
        other: &TraitRef,
    ) -> bool {
        self.trait_id == other.trait_id && self.parameters.could_match(&other.parameters)
    }
}

impl CouldMatch<ProjectionTy> for ProjectionTy {
    fn could_match(
        &self,
        other: &ProjectionTy,
    ) -> bool {
        self.associated_ty_id == other.associated_ty_id
            && self.parameters.could_match(&other.parameters)
    }
}

impl CouldMatch<DomainGoal> for DomainGoal {
    fn could_match(
        &self,
        other: &DomainGoal,
    ) -> bool {
        match (self, other) {
            (DomainGoal::Implemented(a), DomainGoal::Implemented(b)) => a.could_match(b),
            (DomainGoal::Normalize(a), DomainGoal::Normalize(b)) => {
                a.alias.could_match(&b.alias) && a.ty.could_match(&b.ty)
            }
            (DomainGoal::WellFormed(WellFormed::Ty(a)), DomainGoal::WellFormed(WellFormed::Ty(b)))
            | (DomainGoal::FromEnv(FromEnv::Ty(a)), DomainGoal::FromEnv(FromEnv::Ty(b))) => {
                a.could_match(b)
            }
            (
                DomainGoal::WellFormed(WellFormed::Trait(a)),
                DomainGoal::WellFormed(WellFormed::Trait(b)),
            )
            | (DomainGoal::FromEnv(FromEnv::Trait(a)), DomainGoal::FromEnv(FromEnv::Trait(b))) => {
                a.could_match(b)
            }
            (
                DomainGoal::LifetimeOutlives { .. },
                DomainGoal::LifetimeOutlives { .. },
            ) => true,
            _ => false,
        }
    }
}

impl CouldMatch<DomainGoal> for ProgramClause {
    fn could_match(
        &self,
        goal: &DomainGoal,
    ) -> bool {
        self.0.value.consequence.could_match(goal)
    }
}
