//! Hand-off to a code generator.
//!
//! A back end implements [`Lowering`] to map canonical types and folded
//! values to its own representation. [`lower_statics`] walks a translation
//! unit and lowers every static declaration through it.

use tracing::trace;

use crate::{
    ast::ast::DeclId,
    context::Context,
    eval::value::Value,
    types::types::{TypeFactory, TypeId},
};

#[cfg(feature = "llvm")]
pub mod llvm;

pub trait Lowering {
    type Type;
    type Constant;

    fn lower_type(&mut self, types: &TypeFactory, ty: TypeId) -> Self::Type;

    /// `None` when `value` has no constant representation of type `ty`.
    fn lower_constant(
        &mut self,
        types: &TypeFactory,
        ty: TypeId,
        value: Value,
    ) -> Option<Self::Constant>;
}

/// A static declaration as seen by the back end.
pub struct LoweredStatic<L: Lowering> {
    pub decl: DeclId,
    pub name: String,
    pub ty: L::Type,
    /// Folded initial value, if any.
    pub init: Option<L::Constant>,
}

/// Lowers the members of `unit` that have a bound value, in declaration
/// order. A variable is lowered through the current value of its object.
pub fn lower_statics<L: Lowering>(
    cx: &Context,
    unit: DeclId,
    lowering: &mut L,
) -> Vec<LoweredStatic<L>> {
    let mut lowered = vec![];

    for decl in cx.members(unit).iter().copied() {
        let (Some(value), Some(ty)) = (cx.store.get_if(decl), cx.ast.decl(decl).ty) else {
            continue;
        };

        let value = match value {
            Value::Reference(object) if cx.ast.decl(decl).is_variable() => {
                cx.store.object(object).value()
            }
            value => value,
        };

        trace!(name = %cx.name(decl), %value, "lowering");
        let init = if value.is_indeterminate() {
            None
        } else {
            lowering.lower_constant(&cx.types, ty, value)
        };

        lowered.push(LoweredStatic {
            decl,
            name: cx.name(decl).to_string(),
            ty: lowering.lower_type(&cx.types, ty),
            init,
        });
    }

    lowered
}

#[cfg(test)]
mod tests;
