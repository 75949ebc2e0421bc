//! Character- and line-level scanning for scene documents.
//!
//! The grammar is indentation sensitive, so the parser works with two views of
//! the same text: a [`LineTable`] for block structure and a [`Cursor`] plus the
//! scanners in [`scan`] for the tokens inside a line.

mod cursor;
mod lines;
pub mod scan;

pub use cursor::{Cursor, EOF_CHAR};
pub use lines::{Line, LineKind, LineTable};

pub fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

pub fn is_flow_indicator(c: char) -> bool {
    matches!(c, ',' | '[' | ']' | '{' | '}')
}
