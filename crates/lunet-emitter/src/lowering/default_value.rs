//! `default(T)` lowering.

use super::Lowerer;
use crate::ast::NodeIndex;
use crate::resolution::TypeFlags;
use lunet_common::TranslationError;

impl<'a> Lowerer<'a> {
    /// Reference and nullable types default to `nil`; value types defer to
    /// the type's own default constructor.
    pub(crate) fn lower_default_value(&mut self, idx: NodeIndex) -> Result<(), TranslationError> {
        let Some(data) = self.arena.get_default_value(idx) else {
            return Ok(());
        };
        let ty = data.ty.clone();
        if ty.is_reference() || ty.flags.contains(TypeFlags::NULLABLE) || ty.is_dynamic() {
            self.write("nil");
        } else {
            self.write(&ty.name);
            self.write(".");
            let invoke = self.config.default_invoke.clone();
            self.write(&invoke);
        }
        Ok(())
    }
}
