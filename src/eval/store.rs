use std::collections::{HashMap, HashSet};

use crate::{
    ast::ast::{Arena, ArenaId, DeclId, ExprId},
    define_id,
    types::types::TypeId,
};

use super::value::Value;

define_id!(ObjectId);

impl ArenaId for ObjectId {
    fn from_index(index: usize) -> Self {
        ObjectId::from_raw(index as u32)
    }
    fn to_index(self) -> usize {
        self.index()
    }
}

/// What allocated an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Creator {
    Decl(DeclId),
    Expr(ExprId),
}

/// A typed storage cell. Starts indeterminate, is initialized once and may
/// be stored to afterwards.
#[derive(Debug, Clone)]
pub struct Object {
    pub ty: TypeId,
    pub creator: Creator,
    value: Value,
    constant_written: bool,
}

impl Object {
    pub fn new(ty: TypeId, creator: Creator) -> Self {
        Object {
            ty,
            creator,
            value: Value::Indeterminate,
            constant_written: false,
        }
    }

    pub fn value(&self) -> Value {
        self.value
    }

    pub fn is_indeterminate(&self) -> bool {
        self.value.is_indeterminate()
    }

    pub fn initialize(&mut self, value: Value) {
        assert!(
            self.value.is_indeterminate(),
            "object initialized twice (holds {})",
            self.value
        );
        self.value = value;
    }

    pub fn store(&mut self, value: Value) {
        self.value = value;
    }

    /// Records that the current value was written by a constant-evaluated
    /// assignment, making it readable in constant expressions.
    pub fn mark_constant_written(&mut self) {
        self.constant_written = true;
    }

    pub fn is_constant_written(&self) -> bool {
        self.constant_written
    }
}

/// Values of static-storage declarations and the objects backing static
/// variables.
#[derive(Debug, Default)]
pub struct StaticStore {
    bindings: HashMap<DeclId, Value>,
    objects: Arena<ObjectId, Object>,
    elaborating: HashSet<DeclId>,
}

impl StaticStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a constant or function directly to its value.
    pub fn bind(&mut self, decl: DeclId, value: Value) {
        let previous = self.bindings.insert(decl, value);
        assert!(previous.is_none(), "{:?} is already bound", decl);
    }

    /// Allocates the object of a variable and binds the variable to a
    /// reference to it. The object is indeterminate until initialized.
    pub fn create(&mut self, decl: DeclId, ty: TypeId) -> ObjectId {
        let object = self.allocate(ty, Creator::Decl(decl));
        self.bind(decl, Value::Reference(object));
        object
    }

    /// Drops the binding of `decl` after its elaboration failed. The object
    /// it referred to stays allocated but is no longer reachable by name.
    pub fn unbind(&mut self, decl: DeclId) -> Option<Value> {
        self.bindings.remove(&decl)
    }

    pub fn allocate(&mut self, ty: TypeId, creator: Creator) -> ObjectId {
        self.objects.alloc(Object::new(ty, creator))
    }

    pub fn get(&self, decl: DeclId) -> Value {
        match self.bindings.get(&decl) {
            Some(value) => *value,
            None => panic!("{:?} has no value", decl),
        }
    }

    pub fn get_if(&self, decl: DeclId) -> Option<Value> {
        self.bindings.get(&decl).copied()
    }

    pub fn object(&self, object: ObjectId) -> &Object {
        &self.objects[object]
    }

    pub fn object_mut(&mut self, object: ObjectId) -> &mut Object {
        &mut self.objects[object]
    }

    /// Marks `decl` as being elaborated. Returns false if it already is.
    pub fn begin_elaboration(&mut self, decl: DeclId) -> bool {
        self.elaborating.insert(decl)
    }

    pub fn end_elaboration(&mut self, decl: DeclId) {
        self.elaborating.remove(&decl);
    }

    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }
}
