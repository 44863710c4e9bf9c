//! 内存中的程序
//!
//! [`Program`] 是已降级子句的列表，加上求解器询问的特质与类型事实。
//! 它实现了 [`Database`]，也是 CLI 从 RON 文件加载的内容。

use crate::infer::{canonicalize_query, CanonicalQuery};
use crate::ir::could_match::CouldMatch;
use crate::ir::fold::{infallible, Fold, Folder};
use crate::ir::*;
use crate::solve::database::{Database, DatabaseError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

#[cfg(test)]
mod tests;

/// 加载或校验程序时的错误
#[derive(Debug, thiserror::Error)]
pub enum ProgramError {
    #[error("cannot read `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse program: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("invalid program: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    #[serde(default)]
    pub clauses: Vec<ProgramClause>,
    /// 其环算作证明的特质（类似 auto trait 的标记）
    #[serde(default)]
    pub coinductive_traits: BTreeSet<TraitId>,
    /// 自类型未知时不可列出其 impl 的特质
    #[serde(default)]
    pub non_enumerable_traits: BTreeSet<TraitId>,
    /// 每个类型的 where 子句，以类型参数表示
    #[serde(default)]
    pub adt_well_formed: BTreeMap<AdtId, Binders<Vec<Goal>>>,
    /// 每个特质的 where 子句，以特质参数表示（`Self` 在前）
    #[serde(default)]
    pub trait_well_formed: BTreeMap<TraitId, Binders<Vec<Goal>>>,
}

impl Program {
    pub fn new() -> Self {
        Program::default()
    }

    pub fn with_clause(
        mut self,
        clause: ProgramClause,
    ) -> Self {
        self.clauses.push(clause);
        self
    }

    pub fn with_coinductive_trait(
        mut self,
        trait_id: TraitId,
    ) -> Self {
        self.coinductive_traits.insert(trait_id);
        self
    }

    pub fn with_non_enumerable_trait(
        mut self,
        trait_id: TraitId,
    ) -> Self {
        self.non_enumerable_traits.insert(trait_id);
        self
    }

    /// 声明具有 `kinds` 参数的类型及其良构条件
    pub fn with_adt(
        mut self,
        adt_id: AdtId,
        kinds: Vec<ParameterKind>,
        where_clauses: Vec<Goal>,
    ) -> Self {
        self.adt_well_formed
            .insert(adt_id, Binders::new(kinds, where_clauses));
        self
    }

    pub fn with_trait(
        mut self,
        trait_id: TraitId,
        kinds: Vec<ParameterKind>,
        where_clauses: Vec<Goal>,
    ) -> Self {
        self.trait_well_formed
            .insert(trait_id, Binders::new(kinds, where_clauses));
        self
    }

    /// 检查每个子句只使用其绑定器声明的变量，且种类一致
    pub fn validate(&self) -> Result<(), ProgramError> {
        for (index, clause) in self.clauses.iter().enumerate() {
            check_binders(&clause.0.binders, &clause.0.value)
                .map_err(|message| ProgramError::Invalid(format!("clause {}: {}", index, message)))?;
        }
        for (adt_id, binders) in &self.adt_well_formed {
            check_binders(&binders.binders, &binders.value)
                .map_err(|message| ProgramError::Invalid(format!("type `{}`: {}", adt_id, message)))?;
        }
        for (trait_id, binders) in &self.trait_well_formed {
            check_binders(&binders.binders, &binders.value).map_err(|message| {
                ProgramError::Invalid(format!("trait `{}`: {}", trait_id, message))
            })?;
        }
        debug!(clauses = self.clauses.len(), "program validated");
        Ok(())
    }

    fn ty_well_formed_facts(
        &self,
        ty: &Ty,
    ) -> Result<Vec<Goal>, DatabaseError> {
        let facts = match ty {
            Ty::Apply(apply) => {
                let mut facts = match &apply.name {
                    TypeName::Adt(adt_id) => {
                        let declared = self.adt_well_formed.get(adt_id).ok_or_else(|| {
                            DatabaseError::InvalidProgram(format!("unknown type `{}`", adt_id))
                        })?;
                        declared.try_substitute(&apply.parameters).ok_or_else(|| {
                            DatabaseError::InvalidProgram(format!(
                                "type `{}` expects parameters {:?}, found {}",
                                adt_id,
                                declared.binders,
                                apply.parameters.len()
                            ))
                        })?
                    }
                    _ => Vec::new(),
                };
                facts.extend(well_formed_parameters(&apply.parameters));
                facts
            }
            Ty::Projection(projection) => {
                let trait_ref = TraitRef::new(
                    projection.associated_ty_id.trait_id.clone(),
                    projection.parameters.clone(),
                );
                let mut facts = vec![DomainGoal::Implemented(trait_ref).into_goal()];
                facts.extend(well_formed_parameters(&projection.parameters));
                facts
            }
            Ty::ForAll(quantified) => vec![Goal::quantify(
                QuantifierKind::ForAll,
                vec![ParameterKind::Lifetime; quantified.num_binders],
                DomainGoal::WellFormed(WellFormed::Ty(quantified.ty.clone())).into_goal(),
            )],
            Ty::Placeholder(_) => Vec::new(),
            Ty::BoundVar(_) | Ty::InferenceVar(_) => return Err(DatabaseError::Floundered),
        };
        Ok(facts)
    }

    fn trait_well_formed_facts(
        &self,
        trait_ref: &TraitRef,
    ) -> Result<Vec<Goal>, DatabaseError> {
        let mut facts = vec![DomainGoal::Implemented(trait_ref.clone()).into_goal()];
        if let Some(declared) = self.trait_well_formed.get(&trait_ref.trait_id) {
            let where_clauses = declared.try_substitute(&trait_ref.parameters).ok_or_else(|| {
                DatabaseError::InvalidProgram(format!(
                    "trait `{}` expects parameters {:?}, found {}",
                    trait_ref.trait_id,
                    declared.binders,
                    trait_ref.parameters.len()
                ))
            })?;
            facts.extend(where_clauses);
        }
        facts.extend(well_formed_parameters(&trait_ref.parameters));
        Ok(facts)
    }
}

/// `parameters` 中每个类型的 `WellFormed(T)`
fn well_formed_parameters(parameters: &[Parameter]) -> impl Iterator<Item = Goal> + '_ {
    parameters
        .iter()
        .filter_map(Parameter::ty)
        .map(|ty| DomainGoal::WellFormed(WellFormed::Ty(ty.clone())).into_goal())
}

impl Database for Program {
    fn clauses_relevant_to(
        &self,
        goal: &DomainGoal,
    ) -> Result<Vec<ProgramClause>, DatabaseError> {
        let clauses: Vec<_> = self
            .clauses
            .iter()
            .filter(|clause| clause.could_match(goal))
            .cloned()
            .collect();
        trace!(%goal, clauses = clauses.len(), "relevant clauses");
        Ok(clauses)
    }

    fn is_coinductive(
        &self,
        trait_id: &TraitId,
    ) -> bool {
        self.coinductive_traits.contains(trait_id)
    }

    fn well_formed_facts_for(
        &self,
        subject: &WellFormed,
    ) -> Result<Vec<Goal>, DatabaseError> {
        match subject {
            WellFormed::Ty(ty) => self.ty_well_formed_facts(ty),
            WellFormed::Trait(trait_ref) => self.trait_well_formed_facts(trait_ref),
        }
    }

    fn is_enumerable(
        &self,
        trait_id: &TraitId,
    ) -> bool {
        !self.non_enumerable_traits.contains(trait_id)
    }
}

/// 与程序一起保存的查询
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedGoal {
    pub name: String,
    /// 作用域内的假设
    #[serde(default)]
    pub environment: Environment,
    /// 可引用推断变量 `?0..?n`
    pub goal: Goal,
}

impl NamedGoal {
    pub fn new(
        name: &str,
        goal: Goal,
    ) -> Self {
        NamedGoal {
            name: name.to_string(),
            environment: Environment::new(),
            goal,
        }
    }

    pub fn to_query(&self) -> CanonicalQuery {
        canonicalize_query(&InEnvironment::new(&self.environment, self.goal.clone()))
    }
}

/// 程序及要对其求解的目标，即磁盘上的存储形式
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramFile {
    pub program: Program,
    #[serde(default)]
    pub goals: Vec<NamedGoal>,
}

impl ProgramFile {
    pub fn from_ron_str(source: &str) -> Result<Self, ProgramError> {
        let file: ProgramFile = ron::from_str(source)?;
        file.validate()?;
        Ok(file)
    }

    /// 先校验程序，再检查每个目标及其假设只使用自身量词绑定的变量
    pub fn validate(&self) -> Result<(), ProgramError> {
        self.program.validate()?;
        for goal in &self.goals {
            goal.environment
                .clauses
                .iter()
                .try_for_each(|clause| check_binders(&clause.0.binders, &clause.0.value))
                .and_then(|()| check_binders(&[], &goal.goal))
                .map_err(|message| ProgramError::Invalid(format!("goal `{}`: {}", goal.name, message)))?;
        }
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, ProgramError> {
        debug!(path = %path.display(), "loading program");
        let source = fs::read_to_string(path).map_err(|source| ProgramError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        ProgramFile::from_ron_str(&source)
    }

    pub fn to_ron_string(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }
}

/// 按绑定器种类检查绑定变量
fn check_binders<T: Fold>(
    kinds: &[ParameterKind],
    value: &T,
) -> Result<(), String> {
    let mut checker = BinderChecker {
        kinds,
        error: None,
    };
    infallible(value.fold_with(&mut checker, DebruijnIndex::INNERMOST));
    match checker.error {
        Some(message) => Err(message),
        None => Ok(()),
    }
}

struct BinderChecker<'k> {
    kinds: &'k [ParameterKind],
    error: Option<String>,
}

impl BinderChecker<'_> {
    fn check(
        &mut self,
        bound_var: BoundVar,
        kind: ParameterKind,
    ) {
        if self.error.is_some() {
            return;
        }
        let Some(index) = bound_var.index_if_innermost() else {
            self.error = Some(format!("variable {} escapes its binders", bound_var));
            return;
        };
        match self.kinds.get(index) {
            Some(declared) if *declared == kind => {}
            Some(declared) => {
                self.error = Some(format!(
                    "variable {} is used as a {} but declared as a {}",
                    bound_var, kind, declared
                ));
            }
            None => {
                self.error = Some(format!(
                    "variable {} is not bound ({} binders)",
                    bound_var,
                    self.kinds.len()
                ));
            }
        }
    }
}

impl Folder for BinderChecker<'_> {
    fn as_dyn(&mut self) -> &mut dyn Folder {
        self
    }

    fn fold_free_var_ty(
        &mut self,
        bound_var: BoundVar,
        outer_binder: DebruijnIndex,
    ) -> Fallible<Ty> {
        self.check(bound_var, ParameterKind::Ty);
        Ok(bound_var.shifted_in_from(outer_binder).to_ty())
    }

    fn fold_free_var_lifetime(
        &mut self,
        bound_var: BoundVar,
        outer_binder: DebruijnIndex,
    ) -> Fallible<Lifetime> {
        self.check(bound_var, ParameterKind::Lifetime);
        Ok(bound_var.shifted_in_from(outer_binder).to_lifetime())
    }

    fn fold_free_var_const(
        &mut self,
        bound_var: BoundVar,
        outer_binder: DebruijnIndex,
    ) -> Fallible<Const> {
        self.check(bound_var, ParameterKind::Const);
        Ok(bound_var.shifted_in_from(outer_binder).to_const())
    }
}
