use std::collections::HashMap;

use crate::define_id;

define_id!(TypeId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IntRank {
    I8,
    I16,
    I32,
    I64,
}

impl IntRank {
    pub const ALL: [IntRank; 4] = [IntRank::I8, IntRank::I16, IntRank::I32, IntRank::I64];

    pub fn bits(self) -> u32 {
        match self {
            IntRank::I8 => 8,
            IntRank::I16 => 16,
            IntRank::I32 => 32,
            IntRank::I64 => 64,
        }
    }

    pub fn min_value(self) -> i64 {
        match self {
            IntRank::I8 => i8::MIN as i64,
            IntRank::I16 => i16::MIN as i64,
            IntRank::I32 => i32::MIN as i64,
            IntRank::I64 => i64::MIN,
        }
    }

    pub fn max_value(self) -> i64 {
        match self {
            IntRank::I8 => i8::MAX as i64,
            IntRank::I16 => i16::MAX as i64,
            IntRank::I32 => i32::MAX as i64,
            IntRank::I64 => i64::MAX,
        }
    }

    pub fn contains(self, value: i64) -> bool {
        value >= self.min_value() && value <= self.max_value()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FloatRank {
    F32,
    F64,
}

impl FloatRank {
    pub const ALL: [FloatRank; 2] = [FloatRank::F32, FloatRank::F64];

    pub fn bits(self) -> u32 {
        match self {
            FloatRank::F32 => 32,
            FloatRank::F64 => 64,
        }
    }
}

/// The structural shape of a type. Component types are canonical ids, so
/// deriving `Hash`/`Eq` over the shape is a structural hash over the whole
/// type tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Unit,
    Bool,
    Int(IntRank),
    Float(FloatRank),
    /// Placeholder for a declaration whose type comes from its initializer.
    Auto,
    Function { params: Vec<TypeId>, ret: TypeId },
    Reference(TypeId),
}

/// Hash-consing factory. Owns every type of a compilation context and hands
/// out one canonical [`TypeId`] per distinct shape.
#[derive(Debug)]
pub struct TypeFactory {
    types: Vec<Type>,
    interned: HashMap<Type, TypeId>,
    unit: TypeId,
    bool_: TypeId,
    auto: TypeId,
    ints: [TypeId; 4],
    floats: [TypeId; 2],
}

impl Default for TypeFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeFactory {
    pub fn new() -> Self {
        let mut factory = TypeFactory {
            types: Vec::new(),
            interned: HashMap::new(),
            unit: TypeId(0),
            bool_: TypeId(0),
            auto: TypeId(0),
            ints: [TypeId(0); 4],
            floats: [TypeId(0); 2],
        };

        factory.unit = factory.intern(Type::Unit);
        factory.bool_ = factory.intern(Type::Bool);
        factory.auto = factory.intern(Type::Auto);
        for (slot, rank) in IntRank::ALL.iter().enumerate() {
            factory.ints[slot] = factory.intern(Type::Int(*rank));
        }
        for (slot, rank) in FloatRank::ALL.iter().enumerate() {
            factory.floats[slot] = factory.intern(Type::Float(*rank));
        }

        factory
    }

    fn intern(&mut self, ty: Type) -> TypeId {
        if let Some(id) = self.interned.get(&ty) {
            return *id;
        }

        let id = TypeId(self.types.len() as u32);
        self.types.push(ty.clone());
        self.interned.insert(ty, id);
        id
    }

    pub fn get_unit(&self) -> TypeId {
        self.unit
    }

    pub fn get_bool(&self) -> TypeId {
        self.bool_
    }

    pub fn get_auto(&self) -> TypeId {
        self.auto
    }

    pub fn get_int(&self, rank: IntRank) -> TypeId {
        self.ints[rank as usize]
    }

    pub fn get_float(&self, rank: FloatRank) -> TypeId {
        self.floats[rank as usize]
    }

    pub fn get_function(&mut self, params: Vec<TypeId>, ret: TypeId) -> TypeId {
        self.intern(Type::Function { params, ret })
    }

    pub fn get_reference(&mut self, pointee: TypeId) -> TypeId {
        self.intern(Type::Reference(pointee))
    }

    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id.index()]
    }

    /// Number of distinct types created so far.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn is_reference(&self, id: TypeId) -> bool {
        matches!(self.get(id), Type::Reference(_))
    }

    /// Strips one level of reference.
    pub fn non_reference(&self, id: TypeId) -> TypeId {
        match self.get(id) {
            Type::Reference(pointee) => *pointee,
            _ => id,
        }
    }

    pub fn is_integer(&self, id: TypeId) -> bool {
        matches!(self.get(id), Type::Int(_))
    }

    pub fn is_float(&self, id: TypeId) -> bool {
        matches!(self.get(id), Type::Float(_))
    }

    pub fn is_arithmetic(&self, id: TypeId) -> bool {
        self.is_integer(id) || self.is_float(id)
    }

    pub fn is_bool(&self, id: TypeId) -> bool {
        id == self.bool_
    }

    pub fn is_auto(&self, id: TypeId) -> bool {
        id == self.auto
    }

    pub fn is_unit(&self, id: TypeId) -> bool {
        id == self.unit
    }

    pub fn display(&self, id: TypeId) -> String {
        match self.get(id) {
            Type::Unit => String::from("void"),
            Type::Bool => String::from("bool"),
            Type::Auto => String::from("auto"),
            Type::Int(rank) => format!("i{}", rank.bits()),
            Type::Float(rank) => format!("f{}", rank.bits()),
            Type::Reference(pointee) => format!("&{}", self.display(*pointee)),
            Type::Function { params, ret } => {
                let params = params
                    .iter()
                    .map(|param| self.display(*param))
                    .collect::<Vec<String>>()
                    .join(", ");
                format!("func({}) -> {}", params, self.display(*ret))
            }
        }
    }
}
