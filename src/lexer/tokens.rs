use lazy_static::lazy_static;
use std::{collections::HashMap, fmt::Display};

use crate::{symbols::symbols::Symbol, Span};

lazy_static! {
    pub static ref RESERVED_LOOKUP: HashMap<&'static str, TokenKind> = {
        let mut map = HashMap::new();
        map.insert("var", TokenKind::Var);
        map.insert("val", TokenKind::Val);
        map.insert("func", TokenKind::Func);
        map.insert("return", TokenKind::Return);
        map.insert("if", TokenKind::If);
        map.insert("else", TokenKind::Else);
        map.insert("while", TokenKind::While);
        map.insert("true", TokenKind::True);
        map.insert("false", TokenKind::False);
        map.insert("void", TokenKind::Void);
        map.insert("bool", TokenKind::Bool);
        map.insert("auto", TokenKind::Auto);
        map.insert("int", TokenKind::Int);
        map.insert("i8", TokenKind::Int8);
        map.insert("i16", TokenKind::Int16);
        map.insert("i32", TokenKind::Int32);
        map.insert("i64", TokenKind::Int64);
        map.insert("float", TokenKind::Float);
        map.insert("f32", TokenKind::Float32);
        map.insert("f64", TokenKind::Float64);
        map
    };
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    EOF,
    Integer,
    FloatLiteral,
    Identifier,

    OpenBracket,
    CloseBracket,
    OpenCurly,
    CloseCurly,
    OpenParen,
    CloseParen,

    Assignment, // =
    Equals,     // ==
    Not,        // !
    NotEquals,  // !=

    Less,
    LessEquals,
    Greater,
    GreaterEquals,

    Or,  // ||
    And, // &&

    Ampersand, // &
    Pipe,      // |
    Caret,     // ^
    Tilde,     // ~

    Semicolon,
    Colon,
    Question,
    Comma,
    Arrow,

    Plus,
    Dash,
    Slash,
    Star,
    Percent,

    // Reserved
    Var,
    Val,
    Func,
    Return,
    If,
    Else,
    While,
    True,
    False,

    // Type keywords
    Void,
    Bool,
    Auto,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Float,
    Float32,
    Float64,
}

impl TokenKind {
    /// Opening bracket kinds tracked when capturing token spans.
    pub fn is_open_bracket(self) -> bool {
        matches!(
            self,
            TokenKind::OpenParen | TokenKind::OpenCurly | TokenKind::OpenBracket
        )
    }

    pub fn is_close_bracket(self) -> bool {
        matches!(
            self,
            TokenKind::CloseParen | TokenKind::CloseCurly | TokenKind::CloseBracket
        )
    }

    pub fn closing_bracket(self) -> Option<TokenKind> {
        match self {
            TokenKind::OpenParen => Some(TokenKind::CloseParen),
            TokenKind::OpenCurly => Some(TokenKind::CloseCurly),
            TokenKind::OpenBracket => Some(TokenKind::CloseBracket),
            _ => None,
        }
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub value: Symbol,
    pub span: Span,
}

impl Token {
    pub fn is_one_of_many(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.kind)
    }
}
