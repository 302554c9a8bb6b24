//! Pull-based token stream with lookahead and injection.
//!
//! Injected sequences are consumed before the underlying stream resumes. Each
//! injected frame is closed by a synthetic `EOF` token so a replayed span can
//! never read past its own end.

use super::tokens::{Token, TokenKind};

struct Frame {
    tokens: Vec<Token>,
    pos: usize,
}

impl Frame {
    fn current(&self) -> &Token {
        // The last token of every frame is EOF and is never advanced past.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self, n: usize) -> &Token {
        &self.tokens[(self.pos + n).min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) {
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
    }
}

pub struct TokenStream {
    live: Frame,
    injected: Vec<Frame>,
}

impl TokenStream {
    /// `tokens` must end with an `EOF` token, as produced by `tokenize`.
    pub fn new(tokens: Vec<Token>) -> Self {
        assert!(
            tokens.last().map(|token| token.kind) == Some(TokenKind::EOF),
            "token stream must be terminated by EOF"
        );

        TokenStream {
            live: Frame { tokens, pos: 0 },
            injected: Vec::new(),
        }
    }

    fn frame(&self) -> &Frame {
        self.injected.last().unwrap_or(&self.live)
    }

    fn frame_mut(&mut self) -> &mut Frame {
        match self.injected.last_mut() {
            Some(frame) => frame,
            None => &mut self.live,
        }
    }

    pub fn current(&self) -> &Token {
        self.frame().current()
    }

    /// Token `n` positions after the current one, within the active frame.
    pub fn peek(&self, n: usize) -> &Token {
        self.frame().peek(n)
    }

    /// Moves past the current token and returns it.
    pub fn advance(&mut self) -> Token {
        let token = self.current().clone();
        self.frame_mut().advance();
        token
    }

    /// Pushes `tokens` in front of the remaining input. `end` becomes the
    /// position of the synthetic end marker.
    pub fn inject(&mut self, mut tokens: Vec<Token>, end: Token) {
        tokens.push(Token {
            kind: TokenKind::EOF,
            value: end.value,
            span: end.span,
        });
        self.injected.push(Frame { tokens, pos: 0 });
    }

    /// Drops the innermost injected frame. Returns whether all of it was
    /// consumed.
    pub fn finish_injection(&mut self) -> bool {
        let frame = self
            .injected
            .pop()
            .expect("finish_injection called without an injected frame");
        frame.current().kind == TokenKind::EOF
    }

    pub fn is_injecting(&self) -> bool {
        !self.injected.is_empty()
    }

    pub fn at_eof(&self) -> bool {
        self.current().kind == TokenKind::EOF
    }
}
