//! Runtime scope stack used during name resolution.
//!
//! The stack is not part of the declaration tree. A frame either forwards to
//! the [`ScopeRecord`](crate::ast::declarations::ScopeRecord) of a scoped
//! declaration or owns the names of a block. Frames are pushed and popped in
//! strict pairs; an unbalanced pop is a bug in the caller and panics.

use std::collections::HashMap;

use crate::{
    ast::ast::{Ast, DeclId},
    symbols::symbols::Symbol,
};

#[derive(Debug, Default)]
pub struct BlockScope {
    lookup: HashMap<Symbol, Vec<DeclId>>,
}

#[derive(Debug)]
pub enum Scope {
    Declaration(DeclId),
    Block(BlockScope),
}

#[derive(Debug, Default)]
pub struct ScopeStack {
    frames: Vec<Scope>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter_declaration(&mut self, ast: &Ast, decl: DeclId) {
        assert!(
            ast.decl(decl).is_scoped(),
            "{:?} is not a scoped declaration",
            decl
        );
        self.frames.push(Scope::Declaration(decl));
    }

    pub fn leave_declaration(&mut self, decl: DeclId) {
        match self.frames.pop() {
            Some(Scope::Declaration(top)) if top == decl => {}
            other => panic!(
                "unbalanced scope stack: leaving {:?}, found {:?}",
                decl, other
            ),
        }
    }

    pub fn enter_block(&mut self) {
        self.frames.push(Scope::Block(BlockScope::default()));
    }

    pub fn leave_block(&mut self) {
        match self.frames.pop() {
            Some(Scope::Block(_)) => {}
            other => panic!("unbalanced scope stack: leaving a block, found {:?}", other),
        }
    }

    /// Declares `name` in the innermost frame. Returns false if the frame
    /// already has a declaration of that name.
    pub fn declare(&mut self, ast: &mut Ast, name: Symbol, decl: DeclId) -> bool {
        match self.frames.last_mut() {
            Some(Scope::Declaration(owner)) => ast
                .decl_mut(*owner)
                .scope
                .as_mut()
                .map(|record| record.declare(name, decl))
                .unwrap_or(false),
            Some(Scope::Block(block)) => {
                if block.lookup.contains_key(&name) {
                    return false;
                }
                block.lookup.insert(name, vec![decl]);
                true
            }
            None => panic!("declaration outside of any scope"),
        }
    }

    /// Unqualified lookup: the first frame, innermost to outermost, with a
    /// non-empty result wins. Results of outer frames are never merged in.
    pub fn lookup<'a>(&'a self, ast: &'a Ast, name: Symbol) -> Option<&'a [DeclId]> {
        for frame in self.frames.iter().rev() {
            let found = match frame {
                Scope::Declaration(owner) => ast
                    .decl(*owner)
                    .scope
                    .as_ref()
                    .map(|record| record.lookup(name))
                    .unwrap_or(&[]),
                Scope::Block(block) => block
                    .lookup
                    .get(&name)
                    .map(Vec::as_slice)
                    .unwrap_or(&[]),
            };

            if !found.is_empty() {
                return Some(found);
            }
        }

        None
    }

    /// Rebuilds the stack for resuming work on `decl`: its enclosing
    /// declarations are pushed outermost first, so the innermost enclosing
    /// scope ends up on top. `decl` itself is not entered.
    pub fn restore(&mut self, ast: &Ast, decl: DeclId) {
        assert!(
            self.frames.is_empty(),
            "restoring over a non-empty scope stack"
        );
        for cx in ast.enclosing(decl).into_iter().rev() {
            self.enter_declaration(ast, cx);
        }
    }

    /// Unwinds a stack built by [`ScopeStack::restore`].
    pub fn empty(&mut self) {
        while let Some(frame) = self.frames.pop() {
            if let Scope::Block(_) = frame {
                panic!("unbalanced scope stack: a block is still open");
            }
        }
    }

    /// Drops every frame without checking the pairing. Used after a failed
    /// replay, which may leave blocks open.
    pub fn reset(&mut self) {
        self.frames.clear();
    }

    /// The innermost declaration frame.
    pub fn current_declaration(&self) -> Option<DeclId> {
        self.frames.iter().rev().find_map(|frame| match frame {
            Scope::Declaration(decl) => Some(*decl),
            Scope::Block(_) => None,
        })
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
