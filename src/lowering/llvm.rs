//! Lowering to LLVM types and constants.

use inkwell::{
    context::Context,
    types::{AnyTypeEnum, BasicMetadataTypeEnum, BasicType, BasicTypeEnum},
    values::BasicValueEnum,
    AddressSpace,
};

use crate::{
    eval::value::Value,
    types::types::{FloatRank, IntRank, Type, TypeFactory, TypeId},
};

use super::Lowering;

pub struct LlvmLowering<'ctx> {
    context: &'ctx Context,
}

impl<'ctx> LlvmLowering<'ctx> {
    pub fn new(context: &'ctx Context) -> Self {
        LlvmLowering { context }
    }

    fn int_type(&self, rank: IntRank) -> BasicTypeEnum<'ctx> {
        match rank {
            IntRank::I8 => self.context.i8_type().into(),
            IntRank::I16 => self.context.i16_type().into(),
            IntRank::I32 => self.context.i32_type().into(),
            IntRank::I64 => self.context.i64_type().into(),
        }
    }

    /// Storage type of a value of `ty`. `void` has none.
    fn basic_type(&self, types: &TypeFactory, ty: TypeId) -> Option<BasicTypeEnum<'ctx>> {
        let basic = match types.get(ty) {
            Type::Unit => return None,
            Type::Bool => self.context.bool_type().into(),
            Type::Int(rank) => self.int_type(*rank),
            // Only declarations in an initialization cycle stay `auto`.
            Type::Auto => self.context.i64_type().into(),
            Type::Float(FloatRank::F32) => self.context.f32_type().into(),
            Type::Float(FloatRank::F64) => self.context.f64_type().into(),
            Type::Function { .. } | Type::Reference(_) => self
                .context
                .i8_type()
                .ptr_type(AddressSpace::default())
                .into(),
        };
        Some(basic)
    }
}

impl<'ctx> Lowering for LlvmLowering<'ctx> {
    type Type = AnyTypeEnum<'ctx>;
    type Constant = BasicValueEnum<'ctx>;

    fn lower_type(&mut self, types: &TypeFactory, ty: TypeId) -> AnyTypeEnum<'ctx> {
        if let Type::Function { params, ret } = types.get(ty) {
            let params: Vec<BasicMetadataTypeEnum> = params
                .iter()
                .filter_map(|param| self.basic_type(types, *param))
                .map(|param| param.into())
                .collect();

            return match self.basic_type(types, *ret) {
                Some(ret) => ret.fn_type(&params, false).into(),
                None => self.context.void_type().fn_type(&params, false).into(),
            };
        }

        match self.basic_type(types, ty) {
            Some(basic) => basic.as_any_type_enum(),
            None => self.context.void_type().into(),
        }
    }

    fn lower_constant(
        &mut self,
        types: &TypeFactory,
        ty: TypeId,
        value: Value,
    ) -> Option<BasicValueEnum<'ctx>> {
        match (self.basic_type(types, ty)?, value) {
            (BasicTypeEnum::IntType(int), Value::Integer(value)) => {
                Some(int.const_int(value as u64, true).into())
            }
            (BasicTypeEnum::FloatType(float), Value::Float(value)) => {
                Some(float.const_float(value).into())
            }
            _ => None,
        }
    }
}
