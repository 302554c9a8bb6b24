use std::{collections::HashMap, fmt::Display, rc::Rc};

/// Interned identifier. Two symbols are equal iff their spellings are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u32);

impl Symbol {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Default)]
pub struct SymbolTable {
    spellings: Vec<Rc<str>>,
    lookup: HashMap<Rc<str>, Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, spelling: &str) -> Symbol {
        if let Some(symbol) = self.lookup.get(spelling) {
            return *symbol;
        }

        let symbol = Symbol(self.spellings.len() as u32);
        let spelling: Rc<str> = Rc::from(spelling);
        self.spellings.push(Rc::clone(&spelling));
        self.lookup.insert(spelling, symbol);
        symbol
    }

    /// Returns the symbol for `spelling` without interning it.
    pub fn find(&self, spelling: &str) -> Option<Symbol> {
        self.lookup.get(spelling).copied()
    }

    pub fn get(&self, symbol: Symbol) -> &str {
        &self.spellings[symbol.index()]
    }

    pub fn len(&self) -> usize {
        self.spellings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spellings.is_empty()
    }
}
