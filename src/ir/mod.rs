//! 项与替换模型
//!
//! 求解器推理所用的逻辑项：
//! - 类型、生命周期和常量，可包含推断变量（`?0`）、绑定变量（`^0.1`）和占位符（`!1_0`）
//! - 目标、程序子句和环境
//! - 用作缓存键的规范值
//!
//! 绑定变量使用 de Bruijn 索引，因此 alpha 等价的两个项结构相等、哈希一致。

use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub mod could_match;
mod debug;
pub mod fold;

#[cfg(test)]
mod tests;

pub use fold::shift::Shift;
pub use fold::subst::Subst;
pub use fold::{Fold, Folder};

/// 共享且克隆廉价的名称
pub type Identifier = Arc<str>;

/// 合一或归结未成功
///
/// 这不是求解器错误：反驳是正常结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
#[error("no solution")]
pub struct NoSolution;

/// 可能被反驳的操作结果
pub type Fallible<T> = Result<T, NoSolution>;

macro_rules! define_id {
    ($(#[$attr:meta])* $name:ident) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub Identifier);

        impl $name {
            pub fn new(name: &str) -> Self {
                $name(Arc::from(name))
            }

            pub fn name(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(
    /// 程序中声明的特质
    TraitId
);
define_id!(
    /// 程序中声明的结构体/枚举
    AdtId
);
define_id!(
    /// 函数定义类型
    FnDefId
);

/// 关联类型 `Trait::Name`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssocTypeId {
    pub trait_id: TraitId,
    pub name: Identifier,
}

impl AssocTypeId {
    pub fn new(
        trait_id: TraitId,
        name: &str,
    ) -> Self {
        AssocTypeId {
            trait_id,
            name: Arc::from(name),
        }
    }
}

/// 占位符所在的宇宙
///
/// 宇宙 `U` 中的推断变量只能绑定到其占位符全部位于 `<= U` 宇宙中的项。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct UniverseIndex(pub usize);

impl UniverseIndex {
    pub const ROOT: UniverseIndex = UniverseIndex(0);

    pub fn root() -> Self {
        Self::ROOT
    }

    pub fn next(self) -> Self {
        UniverseIndex(self.0 + 1)
    }

    /// `self` 中的变量能否指代 `other` 中的占位符
    pub fn can_see(
        self,
        other: UniverseIndex,
    ) -> bool {
        self >= other
    }
}

/// De Bruijn 索引：绑定变量与引入它的绑定器之间相隔的绑定器数
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct DebruijnIndex {
    depth: u32,
}

impl DebruijnIndex {
    pub const INNERMOST: DebruijnIndex = DebruijnIndex { depth: 0 };
    pub const ONE: DebruijnIndex = DebruijnIndex { depth: 1 };

    pub fn new(depth: u32) -> Self {
        DebruijnIndex { depth }
    }

    pub fn depth(self) -> u32 {
        self.depth
    }

    /// 索引为此值的变量是否在 `outer_binder` 内被绑定
    pub fn within(
        self,
        outer_binder: DebruijnIndex,
    ) -> bool {
        self < outer_binder
    }

    pub fn shifted_in(self) -> Self {
        self.shifted_in_from(DebruijnIndex::ONE)
    }

    pub fn shift_in(&mut self) {
        *self = self.shifted_in();
    }

    pub fn shifted_in_from(
        self,
        outer_binder: DebruijnIndex,
    ) -> Self {
        DebruijnIndex::new(self.depth + outer_binder.depth)
    }

    pub fn shifted_out(self) -> Option<Self> {
        self.shifted_out_to(DebruijnIndex::ONE)
    }

    pub fn shift_out(&mut self) {
        *self = self.shifted_out().unwrap_or(DebruijnIndex::INNERMOST);
    }

    pub fn shifted_out_to(
        self,
        outer_binder: DebruijnIndex,
    ) -> Option<Self> {
        if self.within(outer_binder) {
            None
        } else {
            Some(DebruijnIndex::new(self.depth - outer_binder.depth))
        }
    }
}

/// 由外层某个绑定器绑定的变量（`^debruijn.index`）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BoundVar {
    pub debruijn: DebruijnIndex,
    pub index: usize,
}

impl BoundVar {
    pub fn new(
        debruijn: DebruijnIndex,
        index: usize,
    ) -> Self {
        BoundVar { debruijn, index }
    }

    pub fn to_ty(self) -> Ty {
        Ty::BoundVar(self)
    }

    pub fn to_lifetime(self) -> Lifetime {
        Lifetime::BoundVar(self)
    }

    pub fn to_const(self) -> Const {
        Const::BoundVar(self)
    }

    pub fn to_parameter(
        self,
        kind: ParameterKind,
    ) -> Parameter {
        match kind {
            ParameterKind::Ty => Parameter::Ty(self.to_ty()),
            ParameterKind::Lifetime => Parameter::Lifetime(self.to_lifetime()),
            ParameterKind::Const => Parameter::Const(self.to_const()),
        }
    }

    pub fn bound_within(
        self,
        outer_binder: DebruijnIndex,
    ) -> bool {
        self.debruijn.within(outer_binder)
    }

    #[must_use]
    pub fn shifted_in(self) -> Self {
        BoundVar::new(self.debruijn.shifted_in(), self.index)
    }

    #[must_use]
    pub fn shifted_in_from(
        self,
        outer_binder: DebruijnIndex,
    ) -> Self {
        BoundVar::new(self.debruijn.shifted_in_from(outer_binder), self.index)
    }

    #[must_use]
    pub fn shifted_out(self) -> Option<Self> {
        self.debruijn
            .shifted_out()
            .map(|db| BoundVar::new(db, self.index))
    }

    #[must_use]
    pub fn shifted_out_to(
        self,
        outer_binder: DebruijnIndex,
    ) -> Option<Self> {
        self.debruijn
            .shifted_out_to(outer_binder)
            .map(|db| BoundVar::new(db, self.index))
    }

    /// 若由最内层绑定器绑定，返回其索引
    pub fn index_if_innermost(self) -> Option<usize> {
        self.index_if_bound_at(DebruijnIndex::INNERMOST)
    }

    pub fn index_if_bound_at(
        self,
        debruijn: DebruijnIndex,
    ) -> Option<usize> {
        if self.debruijn == debruijn {
            Some(self.index)
        } else {
            None
        }
    }
}

/// 待求解的逻辑变量（`?index`）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InferenceVar(pub usize);

impl InferenceVar {
    pub fn new(index: usize) -> Self {
        InferenceVar(index)
    }

    pub fn index(self) -> usize {
        self.0
    }

    pub fn to_ty(self) -> Ty {
        Ty::InferenceVar(self)
    }

    pub fn to_lifetime(self) -> Lifetime {
        Lifetime::InferenceVar(self)
    }

    pub fn to_const(self) -> Const {
        Const::InferenceVar(self)
    }

    pub fn to_parameter(
        self,
        kind: ParameterKind,
    ) -> Parameter {
        match kind {
            ParameterKind::Ty => Parameter::Ty(self.to_ty()),
            ParameterKind::Lifetime => Parameter::Lifetime(self.to_lifetime()),
            ParameterKind::Const => Parameter::Const(self.to_const()),
        }
    }
}

/// 全称量化的未知量（`!ui_idx`），即 skolem 常量
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlaceholderIndex {
    pub ui: UniverseIndex,
    pub idx: usize,
}

impl PlaceholderIndex {
    pub fn to_ty(self) -> Ty {
        Ty::Placeholder(self)
    }

    pub fn to_lifetime(self) -> Lifetime {
        Lifetime::Placeholder(self)
    }

    pub fn to_const(self) -> Const {
        Const::Placeholder(self)
    }

    pub fn to_parameter(
        self,
        kind: ParameterKind,
    ) -> Parameter {
        match kind {
            ParameterKind::Ty => Parameter::Ty(self.to_ty()),
            ParameterKind::Lifetime => Parameter::Lifetime(self.to_lifetime()),
            ParameterKind::Const => Parameter::Const(self.to_const()),
        }
    }
}

/// 内建标量类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Scalar {
    Bool,
    Char,
    I8,
    I16,
    I32,
    I64,
    I128,
    Isize,
    U8,
    U16,
    U32,
    U64,
    U128,
    Usize,
    F32,
    F64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Mutability {
    Mut,
    Not,
}

/// 应用类型的头部
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TypeName {
    Adt(AdtId),
    Scalar(Scalar),
    Str,
    Never,
    /// 给定元数的元组
    Tuple(usize),
    /// `&'a T` / `&'a mut T`; parameters are `['a, T]`
    Ref(Mutability),
    /// `[T]`
    Slice,
    /// `[T; N]`；参数为 `[T, N]`
    Array,
    FnDef(FnDefId),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Ty {
    /// 应用于参数的类型构造器：`i32`、`Vec<T>`、`(A, B)`
    Apply(ApplicationTy),
    /// 来自外层 `forall` 的全称量化类型
    Placeholder(PlaceholderIndex),
    /// `<T as Trait>::Name`
    Projection(ProjectionTy),
    /// 高阶类型 `for<'a..> T`
    ForAll(Box<QuantifiedTy>),
    BoundVar(BoundVar),
    InferenceVar(InferenceVar),
}

impl Ty {
    pub fn apply(
        name: TypeName,
        parameters: Vec<Parameter>,
    ) -> Ty {
        Ty::Apply(ApplicationTy { name, parameters })
    }

    pub fn scalar(scalar: Scalar) -> Ty {
        Ty::apply(TypeName::Scalar(scalar), Vec::new())
    }

    pub fn adt(
        name: &str,
        parameters: Vec<Parameter>,
    ) -> Ty {
        Ty::apply(TypeName::Adt(AdtId::new(name)), parameters)
    }

    pub fn inference_var(&self) -> Option<InferenceVar> {
        match self {
            Ty::InferenceVar(var) => Some(*var),
            _ => None,
        }
    }

    pub fn bound_var(&self) -> Option<BoundVar> {
        match self {
            Ty::BoundVar(bv) => Some(*bv),
            _ => None,
        }
    }

    pub fn is_var(&self) -> bool {
        matches!(self, Ty::InferenceVar(_) | Ty::BoundVar(_))
    }

    pub fn cast(self) -> Parameter {
        Parameter::Ty(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicationTy {
    pub name: TypeName,
    pub parameters: Vec<Parameter>,
}

impl ApplicationTy {
    pub fn first_type_parameter(&self) -> Option<&Ty> {
        self.parameters.iter().find_map(Parameter::ty)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectionTy {
    pub associated_ty_id: AssocTypeId,
    /// Trait parameters (`Self` first) followed by the associated type's own
    pub parameters: Vec<Parameter>,
}

impl ProjectionTy {
    pub fn self_type_parameter(&self) -> Option<&Ty> {
        self.parameters.first().and_then(Parameter::ty)
    }
}

/// `for<'a, 'b> ty`；绑定 `num_binders` 个生命周期
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuantifiedTy {
    pub num_binders: usize,
    pub ty: Ty,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Lifetime {
    BoundVar(BoundVar),
    InferenceVar(InferenceVar),
    Placeholder(PlaceholderIndex),
    Static,
}

impl Lifetime {
    pub fn inference_var(&self) -> Option<InferenceVar> {
        match self {
            Lifetime::InferenceVar(var) => Some(*var),
            _ => None,
        }
    }

    pub fn cast(self) -> Parameter {
        Parameter::Lifetime(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Const {
    BoundVar(BoundVar),
    InferenceVar(InferenceVar),
    Placeholder(PlaceholderIndex),
    Value(u64),
}

impl Const {
    pub fn inference_var(&self) -> Option<InferenceVar> {
        match self {
            Const::InferenceVar(var) => Some(*var),
            _ => None,
        }
    }

    pub fn cast(self) -> Parameter {
        Parameter::Const(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ParameterKind {
    Ty,
    Lifetime,
    Const,
}

/// 泛型实参：类型、生命周期或常量
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Parameter {
    Ty(Ty),
    Lifetime(Lifetime),
    Const(Const),
}

impl Parameter {
    pub fn kind(&self) -> ParameterKind {
        match self {
            Parameter::Ty(_) => ParameterKind::Ty,
            Parameter::Lifetime(_) => ParameterKind::Lifetime,
            Parameter::Const(_) => ParameterKind::Const,
        }
    }

    pub fn ty(&self) -> Option<&Ty> {
        match self {
            Parameter::Ty(ty) => Some(ty),
            _ => None,
        }
    }

    pub fn lifetime(&self) -> Option<&Lifetime> {
        match self {
            Parameter::Lifetime(lt) => Some(lt),
            _ => None,
        }
    }

    pub fn constant(&self) -> Option<&Const> {
        match self {
            Parameter::Const(c) => Some(c),
            _ => None,
        }
    }

    pub fn inference_var(&self) -> Option<InferenceVar> {
        match self {
            Parameter::Ty(ty) => ty.inference_var(),
            Parameter::Lifetime(lt) => lt.inference_var(),
            Parameter::Const(c) => c.inference_var(),
        }
    }

    /// 若为最内层绑定器绑定的变量，返回 `^0.index`
    pub fn innermost_bound_index(&self) -> Option<usize> {
        let bv = match self {
            Parameter::Ty(Ty::BoundVar(bv)) => bv,
            Parameter::Lifetime(Lifetime::BoundVar(bv)) => bv,
            Parameter::Const(Const::BoundVar(bv)) => bv,
            _ => return None,
        };
        bv.index_if_innermost()
    }
}

/// 位于绑定器列表之下的值，例如 `forall<T, 'a>` 的主体
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Binders<T> {
    pub binders: Vec<ParameterKind>,
    pub value: T,
}

impl<T> Binders<T> {
    pub fn new(
        binders: Vec<ParameterKind>,
        value: T,
    ) -> Self {
        Binders { binders, value }
    }

    /// 无绑定器；`value` 不得引用 `^0.*`
    pub fn empty(value: T) -> Self {
        Binders::new(Vec::new(), value)
    }

    pub fn len(&self) -> usize {
        self.binders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.binders.is_empty()
    }

    pub fn skip_binders(&self) -> &T {
        &self.value
    }

    pub fn map<U, F>(
        self,
        op: F,
    ) -> Binders<U>
    where
        F: FnOnce(T) -> U,
    {
        Binders::new(self.binders, op(self.value))
    }

    pub fn as_ref(&self) -> Binders<&T> {
        Binders::new(self.binders.clone(), &self.value)
    }
}

impl<T: Fold> Binders<T> {
    /// 用 `parameters` 实例化绑定变量
    pub fn substitute(
        &self,
        parameters: &[Parameter],
    ) -> T {
        debug_assert!(self.accepts(parameters));
        Subst::apply(parameters, &self.value)
    }

    /// 同 [`Binders::substitute`]，但 `parameters` 的数量或种类与绑定器不符时返回 `None`
    pub fn try_substitute(
        &self,
        parameters: &[Parameter],
    ) -> Option<T> {
        self.accepts(parameters)
            .then(|| Subst::apply(parameters, &self.value))
    }

    fn accepts(
        &self,
        parameters: &[Parameter],
    ) -> bool {
        self.binders.len() == parameters.len()
            && self
                .binders
                .iter()
                .zip(parameters)
                .all(|(kind, parameter)| *kind == parameter.kind())
    }
}

/// `Trait<Self, P1..Pn>`；`parameters[0]` 为 self 类型
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TraitRef {
    pub trait_id: TraitId,
    pub parameters: Vec<Parameter>,
}

impl TraitRef {
    pub fn new(
        trait_id: TraitId,
        parameters: Vec<Parameter>,
    ) -> Self {
        TraitRef {
            trait_id,
            parameters,
        }
    }

    pub fn self_type_parameter(&self) -> Option<&Ty> {
        self.parameters.first().and_then(Parameter::ty)
    }
}

/// `Normalize(<T as Trait>::Name -> U)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Normalize {
    pub alias: ProjectionTy,
    pub ty: Ty,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WellFormed {
    Ty(Ty),
    Trait(TraitRef),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FromEnv {
    Ty(Ty),
    Trait(TraitRef),
}

/// 原子谓词
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DomainGoal {
    Implemented(TraitRef),
    Normalize(Normalize),
    WellFormed(WellFormed),
    FromEnv(FromEnv),
    /// `'a: 'b`，作为剩余约束输出
    LifetimeOutlives { a: Lifetime, b: Lifetime },
}

impl DomainGoal {
    /// 能证明此目标的子句所属的特质（如有）
    pub fn trait_id(&self) -> Option<&TraitId> {
        match self {
            DomainGoal::Implemented(trait_ref)
            | DomainGoal::WellFormed(WellFormed::Trait(trait_ref))
            | DomainGoal::FromEnv(FromEnv::Trait(trait_ref)) => Some(&trait_ref.trait_id),
            DomainGoal::Normalize(normalize) => Some(&normalize.alias.associated_ty_id.trait_id),
            _ => None,
        }
    }

    /// 谓词的接收者，用于 floundering 检查
    pub fn self_ty(&self) -> Option<&Ty> {
        match self {
            DomainGoal::Implemented(trait_ref)
            | DomainGoal::WellFormed(WellFormed::Trait(trait_ref))
            | DomainGoal::FromEnv(FromEnv::Trait(trait_ref)) => trait_ref.self_type_parameter(),
            DomainGoal::Normalize(normalize) => normalize.alias.self_type_parameter(),
            DomainGoal::WellFormed(WellFormed::Ty(ty)) | DomainGoal::FromEnv(FromEnv::Ty(ty)) => {
                Some(ty)
            }
            DomainGoal::LifetimeOutlives { .. } => None,
        }
    }

    pub fn into_goal(self) -> Goal {
        Goal::Domain(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QuantifierKind {
    ForAll,
    Exists,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EqGoal {
    pub a: Parameter,
    pub b: Parameter,
}

/// `a <: b`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubtypeGoal {
    pub a: Ty,
    pub b: Ty,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Goal {
    Quantified(QuantifierKind, Binders<Box<Goal>>),
    /// 假设子句成立时证明该目标
    Implies(Vec<ProgramClause>, Box<Goal>),
    /// 合取
    All(Vec<Goal>),
    /// 析取
    Any(Vec<Goal>),
    Not(Box<Goal>),
    Eq(EqGoal),
    Subtype(SubtypeGoal),
    Domain(DomainGoal),
    /// 永远无法证明，也无法反驳
    CannotProve,
}

impl Goal {
    pub fn quantify(
        kind: QuantifierKind,
        binders: Vec<ParameterKind>,
        goal: Goal,
    ) -> Goal {
        if binders.is_empty() {
            goal
        } else {
            Goal::Quantified(kind, Binders::new(binders, Box::new(goal)))
        }
    }

    pub fn implied_by(
        self,
        clauses: Vec<ProgramClause>,
    ) -> Goal {
        if clauses.is_empty() {
            self
        } else {
            Goal::Implies(clauses, Box::new(self))
        }
    }

    pub fn all(goals: impl IntoIterator<Item = Goal>) -> Goal {
        Goal::All(goals.into_iter().collect())
    }

    pub fn is_trivially_true(&self) -> bool {
        matches!(self, Goal::All(goals) if goals.is_empty())
    }
}

/// 不同子句所得答案之间的优先级
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum ClausePriority {
    High,
    #[default]
    Low,
}

/// `consequence :- conditions`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProgramClauseImplication {
    pub consequence: DomainGoal,
    #[serde(default)]
    pub conditions: Vec<Goal>,
    #[serde(default)]
    pub priority: ClausePriority,
}

/// `forall<binders> { consequence :- conditions }`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProgramClause(pub Binders<ProgramClauseImplication>);

impl ProgramClause {
    pub fn new(
        binders: Vec<ParameterKind>,
        consequence: DomainGoal,
        conditions: Vec<Goal>,
    ) -> Self {
        ProgramClause(Binders::new(
            binders,
            ProgramClauseImplication {
                consequence,
                conditions,
                priority: ClausePriority::Low,
            },
        ))
    }

    /// 不含变量和条件的子句
    pub fn fact(consequence: DomainGoal) -> Self {
        ProgramClause::new(Vec::new(), consequence, Vec::new())
    }

    pub fn with_priority(
        mut self,
        priority: ClausePriority,
    ) -> Self {
        self.0.value.priority = priority;
        self
    }

    pub fn implication(&self) -> &Binders<ProgramClauseImplication> {
        &self.0
    }
}

/// 目标作用域内的假设
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Environment {
    pub clauses: Vec<ProgramClause>,
}

impl Environment {
    pub fn new() -> Self {
        Environment::default()
    }

    /// 加入假设；假设优先于程序子句
    pub fn add_clauses(
        &self,
        clauses: impl IntoIterator<Item = ProgramClause>,
    ) -> Environment {
        let mut env = self.clone();
        for clause in clauses {
            let clause = clause.with_priority(ClausePriority::High);
            if !env.clauses.contains(&clause) {
                env.clauses.push(clause);
            }
        }
        env
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InEnvironment<G> {
    pub environment: Environment,
    pub goal: G,
}

impl<G> InEnvironment<G> {
    pub fn new(
        environment: &Environment,
        goal: G,
    ) -> Self {
        InEnvironment {
            environment: environment.clone(),
            goal,
        }
    }

    pub fn map<H, F>(
        self,
        op: F,
    ) -> InEnvironment<H>
    where
        F: FnOnce(G) -> H,
    {
        InEnvironment {
            environment: self.environment,
            goal: op(self.goal),
        }
    }
}

/// 留给调用方而非就地求解的附加条件
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Constraint {
    LifetimeEq(Lifetime, Lifetime),
    /// `'a: 'b`
    Outlives(Lifetime, Lifetime),
}

/// 按位置替换：规范值的第 `i` 个绑定器映射到 `parameters[i]`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Substitution {
    pub parameters: Vec<Parameter>,
}

impl Substitution {
    pub fn new(parameters: Vec<Parameter>) -> Self {
        Substitution { parameters }
    }

    pub fn empty() -> Self {
        Substitution::default()
    }

    /// 给定种类对应的 `[^0.0, ^0.1, ..]`
    pub fn identity(kinds: impl IntoIterator<Item = ParameterKind>) -> Self {
        Substitution {
            parameters: kinds
                .into_iter()
                .enumerate()
                .map(|(index, kind)| {
                    BoundVar::new(DebruijnIndex::INNERMOST, index).to_parameter(kind)
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn at(
        &self,
        index: usize,
    ) -> Option<&Parameter> {
        self.parameters.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Parameter> {
        self.parameters.iter()
    }

    /// 每个绑定器是否都映射到自身
    pub fn is_identity(&self) -> bool {
        self.parameters
            .iter()
            .enumerate()
            .all(|(index, p)| p.innermost_bound_index() == Some(index))
    }

    /// 将 `value` 中的绑定变量 `^0.i` 替换为 `parameters[i]`
    pub fn apply<T: Fold>(
        &self,
        value: &T,
    ) -> T {
        Subst::apply(&self.parameters, value)
    }

    /// 先 `self` 后 `other`：绑定器 `i` 映射到 `other(self[i])`
    pub fn compose(
        &self,
        other: &Substitution,
    ) -> Substitution {
        Substitution {
            parameters: self.parameters.iter().map(|p| other.apply(p)).collect(),
        }
    }
}

/// 答案替换及剩余约束
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConstrainedSubst {
    pub subst: Substitution,
    #[serde(default)]
    pub constraints: Vec<InEnvironment<Constraint>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CanonicalVarKind {
    pub kind: ParameterKind,
    pub universe: UniverseIndex,
}

impl CanonicalVarKind {
    pub fn new(
        kind: ParameterKind,
        universe: UniverseIndex,
    ) -> Self {
        CanonicalVarKind { kind, universe }
    }
}

/// 自由推断变量已按首次出现顺序替换为 `^0.i` 的值
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Canonical<T> {
    pub value: T,
    pub binders: Vec<CanonicalVarKind>,
}

impl<T> Canonical<T> {
    pub fn trivial_substitution(&self) -> Substitution {
        Substitution::identity(self.binders.iter().map(|b| b.kind))
    }

    pub fn map<U, F>(
        self,
        op: F,
    ) -> Canonical<U>
    where
        F: FnOnce(T) -> U,
    {
        Canonical {
            value: op(self.value),
            binders: self.binders,
        }
    }
}

/// 宇宙也被重新编号到 `0..universes` 的规范值
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UCanonical<T> {
    pub canonical: Canonical<T>,
    pub universes: usize,
}

impl<T> UCanonical<T> {
    pub fn trivial_substitution(&self) -> Substitution {
        self.canonical.trivial_substitution()
    }

    /// `subst` 是否把本目标的每个绑定器映射到自身且不带约束
    pub fn is_trivial_substitution(
        &self,
        subst: &Canonical<ConstrainedSubst>,
    ) -> bool {
        subst.value.subst.len() == self.canonical.binders.len()
            && subst.value.subst.is_identity()
            && subst.value.constraints.is_empty()
    }
}

/// 求解器的缓存键
pub type UCanonicalGoal = UCanonical<InEnvironment<Goal>>;
