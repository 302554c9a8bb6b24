use std::collections::HashMap;

use crate::{symbols::symbols::Symbol, types::types::TypeId, Span};

use super::ast::{DeclId, ExprId, StmtId};

/// How far the scheduler has progressed on a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DeclState {
    /// Name known, type and definition unknown.
    Identified,
    /// Type known.
    Declared,
    /// Initializer or body analyzed.
    Defined,
}

/// Name lookup table owned by a scoped declaration. The member list and the
/// lookup map always hold the same declarations.
#[derive(Debug, Default, Clone)]
pub struct ScopeRecord {
    members: Vec<DeclId>,
    lookup: HashMap<Symbol, Vec<DeclId>>,
}

impl ScopeRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `decl` under `name`. Returns false, leaving the record untouched,
    /// if `name` is already declared here.
    pub fn declare(&mut self, name: Symbol, decl: DeclId) -> bool {
        if self.lookup.contains_key(&name) {
            return false;
        }

        self.lookup.insert(name, vec![decl]);
        self.members.push(decl);
        true
    }

    /// Declarations named `name` in exactly this scope.
    pub fn lookup(&self, name: Symbol) -> &[DeclId] {
        self.lookup.get(&name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn members(&self) -> &[DeclId] {
        &self.members
    }
}

#[derive(Debug, Clone, Default)]
pub struct FunctionDecl {
    pub params: Vec<DeclId>,
    pub return_type: Option<TypeId>,
    pub body: Option<StmtId>,
}

#[derive(Debug, Clone, Default)]
pub struct DataDecl {
    pub init: Option<ExprId>,
}

#[derive(Debug, Clone)]
pub struct ParameterDecl {
    /// Nesting depth of the function declaring the parameter.
    pub depth: u32,
    /// Position in the parameter list.
    pub index: u32,
    /// The value or variable declaration the parameter introduces.
    pub underlying: DeclId,
}

#[derive(Debug, Clone)]
pub enum DeclKind {
    TranslationUnit,
    Function(FunctionDecl),
    /// Immutable data (`val`).
    Value(DataDecl),
    /// Mutable data (`var`).
    Variable(DataDecl),
    Parameter(ParameterDecl),
}

#[derive(Debug, Clone)]
pub struct Decl {
    pub name: Symbol,
    pub ty: Option<TypeId>,
    /// Enclosing declaration. Not owning.
    pub cx: Option<DeclId>,
    pub span: Span,
    pub kind: DeclKind,
    /// Present exactly for translation units and functions.
    pub scope: Option<ScopeRecord>,
    pub state: DeclState,
}

impl Decl {
    pub fn new(name: Symbol, cx: Option<DeclId>, span: Span, kind: DeclKind) -> Self {
        let scope = match kind {
            DeclKind::TranslationUnit | DeclKind::Function(_) => Some(ScopeRecord::new()),
            _ => None,
        };

        Decl {
            name,
            ty: None,
            cx,
            span,
            kind,
            scope,
            state: DeclState::Identified,
        }
    }

    pub fn is_scoped(&self) -> bool {
        self.scope.is_some()
    }

    pub fn is_translation_unit(&self) -> bool {
        matches!(self.kind, DeclKind::TranslationUnit)
    }

    pub fn is_function(&self) -> bool {
        matches!(self.kind, DeclKind::Function(_))
    }

    pub fn is_data(&self) -> bool {
        matches!(
            self.kind,
            DeclKind::Value(_) | DeclKind::Variable(_) | DeclKind::Parameter(_)
        )
    }

    pub fn is_variable(&self) -> bool {
        matches!(self.kind, DeclKind::Variable(_))
    }

    pub fn initializer(&self) -> Option<ExprId> {
        match &self.kind {
            DeclKind::Value(data) | DeclKind::Variable(data) => data.init,
            _ => None,
        }
    }

    pub fn set_initializer(&mut self, init: ExprId) {
        match &mut self.kind {
            DeclKind::Value(data) | DeclKind::Variable(data) => data.init = Some(init),
            _ => panic!("only data declarations have initializers"),
        }
    }

    pub fn as_function(&self) -> Option<&FunctionDecl> {
        match &self.kind {
            DeclKind::Function(function) => Some(function),
            _ => None,
        }
    }

    pub fn as_function_mut(&mut self) -> Option<&mut FunctionDecl> {
        match &mut self.kind {
            DeclKind::Function(function) => Some(function),
            _ => None,
        }
    }
}
