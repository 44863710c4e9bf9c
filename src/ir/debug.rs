//! IR 项的可读输出

use super::*;
use std::fmt::{self, Display, Formatter};

fn comma_separated<T: Display>(
    f: &mut Formatter<'_>,
    items: &[T],
) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

fn angle_bracketed<T: Display>(
    f: &mut Formatter<'_>,
    items: &[T],
) -> fmt::Result {
    if items.is_empty() {
        return Ok(());
    }
    write!(f, "<")?;
    comma_separated(f, items)?;
    write!(f, ">")
}

impl Display for UniverseIndex {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "U{}", self.0)
    }
}

impl Display for BoundVar {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "^{}.{}", self.debruijn.depth(), self.index)
    }
}

impl Display for InferenceVar {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "?{}", self.0)
    }
}

impl Display for PlaceholderIndex {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "!{}_{}", self.ui.0, self.idx)
    }
}

impl Display for Scalar {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> fmt::Result {
        let name = match self {
            Scalar::Bool => "bool",
            Scalar::Char => "char",
            Scalar::I8 => "i8",
            Scalar::I16 => "i16",
            Scalar::I32 => "i32",
            Scalar::I64 => "i64",
            Scalar::I128 => "i128",
            Scalar::Isize => "isize",
            Scalar::U8 => "u8",
            Scalar::U16 => "u16",
            Scalar::U32 => "u32",
            Scalar::U64 => "u64",
            Scalar::U128 => "u128",
            Scalar::Usize => "usize",
            Scalar::F32 => "f32",
            Scalar::F64 => "f64",
        };
        write!(f, "{}", name)
    }
}

impl Display for TraitId {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Display for AdtId {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Display for FnDefId {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Display for AssocTypeId {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}::{}", self.trait_id, self.name)
    }
}

impl Display for ApplicationTy {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> fmt::Result {
        let params = &self.parameters;
        match &self.name {
            TypeName::Adt(id) => {
                write!(f, "{}", id)?;
                angle_bracketed(f, params)
            }
            TypeName::FnDef(id) => {
                write!(f, "fn {}", id)?;
                angle_bracketed(f, params)
            }
            TypeName::Scalar(scalar) => write!(f, "{}", scalar),
            TypeName::Str => write!(f, "str"),
            TypeName::Never => write!(f, "!"),
            TypeName::Tuple(_) => {
                write!(f, "(")?;
                comma_separated(f, params)?;
                if params.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
            TypeName::Ref(mutability) => {
                let mutbl = match mutability {
                    Mutability::Mut => "mut ",
                    Mutability::Not => "",
                };
                match params.as_slice() {
                    [lt, ty] => write!(f, "&{} {}{}", lt, mutbl, ty),
                    _ => {
                        write!(f, "&{}", mutbl)?;
                        angle_bracketed(f, params)
                    }
                }
            }
            TypeName::Slice => {
                write!(f, "[")?;
                comma_separated(f, params)?;
                write!(f, "]")
            }
            TypeName::Array => match params.as_slice() {
                [ty, len] => write!(f, "[{}; {}]", ty, len),
                _ => {
                    write!(f, "array")?;
                    angle_bracketed(f, params)
                }
            },
        }
    }
}

impl Display for ProjectionTy {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "({})", self.associated_ty_id)?;
        angle_bracketed(f, &self.parameters)
    }
}

impl Display for Ty {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Ty::Apply(apply) => write!(f, "{}", apply),
            Ty::Placeholder(p) => write!(f, "{}", p),
            Ty::Projection(proj) => write!(f, "{}", proj),
            Ty::ForAll(q) => write!(f, "for<{}> {}", q.num_binders, q.ty),
            Ty::BoundVar(bv) => write!(f, "{}", bv),
            Ty::InferenceVar(var) => write!(f, "{}", var),
        }
    }
}

impl Display for Lifetime {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Lifetime::BoundVar(bv) => write!(f, "'{}", bv),
            Lifetime::InferenceVar(var) => write!(f, "'{}", var),
            Lifetime::Placeholder(p) => write!(f, "'{}", p),
            Lifetime::Static => write!(f, "'static"),
        }
    }
}

impl Display for Const {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Const::BoundVar(bv) => write!(f, "{}", bv),
            Const::InferenceVar(var) => write!(f, "{}", var),
            Const::Placeholder(p) => write!(f, "{}", p),
            Const::Value(v) => write!(f, "{}", v),
        }
    }
}

impl Display for Parameter {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Parameter::Ty(ty) => write!(f, "{}", ty),
            Parameter::Lifetime(lt) => write!(f, "{}", lt),
            Parameter::Const(c) => write!(f, "{}", c),
        }
    }
}

impl Display for ParameterKind {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> fmt::Result {
        match self {
            ParameterKind::Ty => write!(f, "type"),
            ParameterKind::Lifetime => write!(f, "lifetime"),
            ParameterKind::Const => write!(f, "const"),
        }
    }
}

impl Display for TraitRef {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> fmt::Result {
        match self.parameters.split_first() {
            Some((self_ty, rest)) => {
                write!(f, "{}: {}", self_ty, self.trait_id)?;
                angle_bracketed(f, rest)
            }
            None => write!(f, "{}", self.trait_id),
        }
    }
}

impl Display for DomainGoal {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> fmt::Result {
        match self {
            DomainGoal::Implemented(tr) => write!(f, "Implemented({})", tr),
            DomainGoal::Normalize(n) => write!(f, "Normalize({} -> {})", n.alias, n.ty),
            DomainGoal::WellFormed(WellFormed::Ty(ty)) => write!(f, "WellFormed({})", ty),
            DomainGoal::WellFormed(WellFormed::Trait(tr)) => write!(f, "WellFormed({})", tr),
            DomainGoal::FromEnv(FromEnv::Ty(ty)) => write!(f, "FromEnv({})", ty),
            DomainGoal::FromEnv(FromEnv::Trait(tr)) => write!(f, "FromEnv({})", tr),
            DomainGoal::LifetimeOutlives { a, b } => write!(f, "{}: {}", a, b),
        }
    }
}

impl Display for Goal {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Goal::Quantified(kind, subgoal) => {
                let q = match kind {
                    QuantifierKind::ForAll => "forall",
                    QuantifierKind::Exists => "exists",
                };
                write!(f, "{}<", q)?;
                comma_separated(f, &subgoal.binders)?;
                write!(f, "> {{ {} }}", subgoal.value)
            }
            Goal::Implies(clauses, subgoal) => {
                write!(f, "if (")?;
                comma_separated(f, clauses)?;
                write!(f, ") {{ {} }}", subgoal)
            }
            Goal::All(goals) => {
                write!(f, "(")?;
                comma_separated(f, goals)?;
                write!(f, ")")
            }
            Goal::Any(goals) => {
                write!(f, "(")?;
                for (i, g) in goals.iter().enumerate() {
                    if i > 0 {
                        write!(f, " || ")?;
                    }
                    write!(f, "{}", g)?;
                }
                write!(f, ")")
            }
            Goal::Not(subgoal) => write!(f, "not {{ {} }}", subgoal),
            Goal::Eq(EqGoal { a, b }) => write!(f, "{} = {}", a, b),
            Goal::Subtype(SubtypeGoal { a, b }) => write!(f, "{} <: {}", a, b),
            Goal::Domain(dg) => write!(f, "{}", dg),
            Goal::CannotProve => write!(f, "CannotProve"),
        }
    }
}

impl Display for ProgramClause {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> fmt::Result {
        let implication = &self.0.value;
        if !self.0.binders.is_empty() {
            write!(f, "forall<")?;
            comma_separated(f, &self.0.binders)?;
            write!(f, "> {{ ")?;
        }
        write!(f, "{}", implication.consequence)?;
        if !implication.conditions.is_empty() {
            write!(f, " :- ")?;
            comma_separated(f, &implication.conditions)?;
        }
        if !self.0.binders.is_empty() {
            write!(f, " }}")?;
        }
        Ok(())
    }
}

impl Display for Environment {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "Env(")?;
        comma_separated(f, &self.clauses)?;
        write!(f, ")")
    }
}

impl<G: Display> Display for InEnvironment<G> {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> fmt::Result {
        if self.environment.clauses.is_empty() {
            write!(f, "{}", self.goal)
        } else {
            write!(f, "{} |- {}", self.environment, self.goal)
        }
    }
}

impl Display for Constraint {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Constraint::LifetimeEq(a, b) => write!(f, "{} == {}", a, b),
            Constraint::Outlives(a, b) => write!(f, "{}: {}", a, b),
        }
    }
}

impl Display for Substitution {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "[")?;
        for (i, p) in self.parameters.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "?{} := {}", i, p)?;
        }
        write!(f, "]")
    }
}

impl Display for ConstrainedSubst {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.subst)?;
        if !self.constraints.is_empty() {
            write!(f, " with constraints [")?;
            comma_separated(f, &self.constraints)?;
            write!(f, "]")?;
        }
        Ok(())
    }
}

impl<T: Display> Display for Canonical<T> {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> fmt::Result {
        if self.binders.is_empty() {
            return write!(f, "{}", self.value);
        }
        write!(f, "for<")?;
        for (i, binder) in self.binders.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "?{} {}", binder.universe, binder.kind)?;
        }
        write!(f, "> {{ {} }}", self.value)
    }
}

impl<T: Display> Display for UCanonical<T> {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.canonical)
    }
}
