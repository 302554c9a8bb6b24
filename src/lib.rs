#![allow(clippy::module_inception)]

use std::{fmt::Display, rc::Rc};

use crate::errors::errors::{Error, ErrorTip};

pub mod ast;
pub mod context;
pub mod errors;
pub mod eval;
pub mod lexer;
pub mod lowering;
pub mod macros;
pub mod parser;
pub mod semantics;
pub mod symbols;
pub mod types;

extern crate regex;

/// Byte offset into a named source.
#[derive(Debug, Clone, PartialEq)]
pub struct Position(pub u32, pub Rc<String>);

impl Position {
    pub fn null() -> Self {
        Position(0, Rc::new(String::from("<null>")))
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.1, self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

/// Line number (1-based), line text and column of the byte offset
/// `position` in `content`.
pub fn get_line_at_position(content: &str, position: u32) -> Option<(usize, String, usize)> {
    let pos = position as usize;

    let mut start = 0;
    let mut line_number = 1;

    for line in content.split_inclusive('\n') {
        let end = start + line.len();

        if (start..end).contains(&pos) {
            let line_pos = pos - start;
            return Some((line_number, line.to_string(), line_pos));
        }

        start = end;
        line_number += 1;
    }

    None
}

/// Renders `error` with the offending source line underneath.
pub fn format_error(error: &Error, source: &str) -> String {
    /*
        error: message
        -> final.bn
           |
        20 | val a = #;
           | --------^
    */

    let position = error.get_position();
    let mut out = match error.get_tip() {
        ErrorTip::None => format!("Error: {}\n", error.get_error_name()),
        tip => format!("Error: {} ({})\n", error.get_error_name(), tip),
    };
    out.push_str(&format!("-> {}\n", position.1));

    let Some((line, line_text, line_pos)) = get_line_at_position(source, position.0) else {
        out.push_str(&format!("   {}\n", error));
        return out;
    };

    let line_string = line.to_string();
    let padding = line_string.len() + 2;

    out.push_str(&format!("{:>padding$}\n", "|"));

    let (line_text_removed, removed_whitespace) = remove_starting_whitespace(&line_text);
    out.push_str(&format!("{} | {}\n", line_string, line_text_removed.trim_end()));

    let arrows = line_pos.saturating_sub(removed_whitespace) + 1;
    out.push_str(&format!("{:>padding$} {:->arrows$}\n", "|", "^"));
    out
}

pub fn display_error(error: &Error, source: &str) {
    eprint!("{}", format_error(error, source));
}

fn remove_starting_whitespace(string: &str) -> (String, usize) {
    let start = string.chars().take_while(|c| *c == ' ').count();
    (String::from(&string[start..]), start)
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use crate::{
        errors::errors::{Error, ErrorImpl},
        Position,
    };

    const SOURCE: &str = "val a = 1;\nval b = 2;\n\nfunc f() { }\n";

    #[test]
    fn test_get_line_at_position() {
        let (line_number, line, line_pos) = super::get_line_at_position(SOURCE, 4).unwrap();
        assert_eq!(line_number, 1);
        assert_eq!(line, "val a = 1;\n");
        assert_eq!(line_pos, 4);

        let (line_number, line, line_pos) = super::get_line_at_position(SOURCE, 28).unwrap();
        assert_eq!(line_number, 4);
        assert_eq!(line, "func f() { }\n");
        assert_eq!(line_pos, 5);

        assert!(super::get_line_at_position(SOURCE, 1000).is_none());
    }

    #[test]
    fn test_format_error_points_at_column() {
        let error = Error::new(
            ErrorImpl::UnresolvedIdentifier {
                name: "b".to_string(),
            },
            Position(8, Rc::new("test.bn".to_string())),
        );

        let rendered = super::format_error(&error, "val a = b;\n");
        let lines: Vec<&str> = rendered.lines().collect();

        assert!(lines[0].starts_with("Error: UnresolvedIdentifier"));
        assert_eq!(lines[1], "-> test.bn");
        assert_eq!(lines[3], "1 | val a = b;");
        assert_eq!(lines[4], "  | --------^");
    }

    #[test]
    fn test_position_display() {
        let position = Position(7, Rc::new("main.bn".to_string()));
        assert_eq!(position.to_string(), "main.bn:7");
    }
}
