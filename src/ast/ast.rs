use std::ops::{Index, IndexMut};

use crate::define_id;

use super::{declarations::Decl, expressions::Expr, statements::Stmt};

define_id!(DeclId);
define_id!(ExprId);
define_id!(StmtId);

/// Typed index into an [`Arena`].
pub trait ArenaId: Copy {
    fn from_index(index: usize) -> Self;
    fn to_index(self) -> usize;
}

macro_rules! arena_id {
    ($name:ident) => {
        impl ArenaId for $name {
            fn from_index(index: usize) -> Self {
                $name::from_raw(index as u32)
            }
            fn to_index(self) -> usize {
                self.index()
            }
        }
    };
}

arena_id!(DeclId);
arena_id!(ExprId);
arena_id!(StmtId);

/// Append-only storage handing out stable indices. Nodes are never removed,
/// so an index stays valid for the lifetime of the arena.
#[derive(Debug)]
pub struct Arena<I: ArenaId, T> {
    entries: Vec<T>,
    _marker: std::marker::PhantomData<I>,
}

impl<I: ArenaId, T> Default for Arena<I, T> {
    fn default() -> Self {
        Arena {
            entries: Vec::new(),
            _marker: std::marker::PhantomData,
        }
    }
}

impl<I: ArenaId, T> Arena<I, T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, value: T) -> I {
        let index = self.entries.len();
        self.entries.push(value);
        I::from_index(index)
    }

    pub fn get(&self, id: I) -> Option<&T> {
        self.entries.get(id.to_index())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| (I::from_index(index), entry))
    }
}

impl<I: ArenaId, T> Index<I> for Arena<I, T> {
    type Output = T;

    fn index(&self, id: I) -> &T {
        &self.entries[id.to_index()]
    }
}

impl<I: ArenaId, T> IndexMut<I> for Arena<I, T> {
    fn index_mut(&mut self, id: I) -> &mut T {
        &mut self.entries[id.to_index()]
    }
}

/// The syntax tree of one compilation context: one arena per node category.
#[derive(Debug, Default)]
pub struct Ast {
    pub decls: Arena<DeclId, Decl>,
    pub exprs: Arena<ExprId, Expr>,
    pub stmts: Arena<StmtId, Stmt>,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decl(&self, id: DeclId) -> &Decl {
        &self.decls[id]
    }

    pub fn decl_mut(&mut self, id: DeclId) -> &mut Decl {
        &mut self.decls[id]
    }

    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id]
    }

    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id]
    }

    /// Whether `decl` is data declared directly in a translation unit.
    pub fn has_static_storage(&self, decl: DeclId) -> bool {
        let decl = self.decl(decl);
        decl.is_data()
            && decl
                .cx
                .map(|cx| self.decl(cx).is_translation_unit())
                .unwrap_or(false)
    }

    /// Walks the enclosing declarations of `decl`, innermost first.
    pub fn enclosing(&self, decl: DeclId) -> Vec<DeclId> {
        let mut chain = Vec::new();
        let mut current = self.decl(decl).cx;
        while let Some(cx) = current {
            chain.push(cx);
            current = self.decl(cx).cx;
        }
        chain
    }
}
