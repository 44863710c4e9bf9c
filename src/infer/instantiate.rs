//! 用新变量或占位符打开绑定器

use super::InferenceTable;
use crate::ir::fold::Fold;
use crate::ir::*;

impl InferenceTable {
    /// 把规范值的绑定器替换为所需宇宙中的新变量
    pub fn instantiate_canonical<T: Fold>(
        &mut self,
        canonical: &Canonical<T>,
    ) -> T {
        let subst = self.fresh_subst(&canonical.binders);
        subst.apply(&canonical.value)
    }

    /// `exists<..> value`：每个绑定器变为当前最大宇宙中的新变量
    pub fn instantiate_binders_existentially<T: Fold>(
        &mut self,
        binders: &Binders<T>,
    ) -> T {
        let universe = self.max_universe();
        let parameters: Vec<_> = binders
            .binders
            .iter()
            .map(|kind| self.new_variable(universe).to_parameter(*kind))
            .collect();
        binders.substitute(&parameters)
    }

    /// `forall<..> value`：每个绑定器变为新宇宙中的占位符
    pub fn instantiate_binders_universally<T: Fold>(
        &mut self,
        binders: &Binders<T>,
    ) -> T {
        let ui = self.new_universe();
        let parameters: Vec<_> = binders
            .binders
            .iter()
            .enumerate()
            .map(|(idx, kind)| PlaceholderIndex { ui, idx }.to_parameter(*kind))
            .collect();
        binders.substitute(&parameters)
    }
}
