use text_size::{TextRange, TextSize};

use crate::cursor::EOF_CHAR;
use crate::{Cursor, is_blank, is_flow_indicator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Context {
    Block,
    Flow,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quoted {
    pub range: TextRange,
    pub value: String,
    pub double: bool,
}

/// A quoted scalar whose closing quote is missing on its line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unterminated {
    pub range: TextRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chomp {
    Clip,
    Strip,
    Keep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    pub literal: bool,
    pub chomp: Chomp,
    pub indent: Option<u32>,
}

/// `:` ends a key when followed by whitespace, a line end, or (in flow) an indicator.
fn ends_key(next: char, context: Context) -> bool {
    is_blank(next)
        || matches!(next, '\n' | '\r' | EOF_CHAR)
        || (context == Context::Flow && is_flow_indicator(next))
}

/// Scans a plain scalar, leaving the cursor right after its last non-blank
/// character. The returned range never includes trailing blanks.
pub fn plain_scalar(cursor: &mut Cursor<'_>, context: Context) -> TextRange {
    let start = cursor.offset();
    let mut end = start;

    while !cursor.at_eol() && !cursor.at_comment() {
        let c = cursor.peek();
        if c == ':' && ends_key(cursor.second(), context) {
            break;
        }
        if context == Context::Flow && is_flow_indicator(c) {
            break;
        }
        cursor.advance();
        if !is_blank(c) {
            end = cursor.offset();
        }
    }

    cursor.seek(end);
    TextRange::new(start, end)
}

/// Scans a single- or double-quoted scalar on the current line.
pub fn quoted_scalar(cursor: &mut Cursor<'_>) -> Result<Quoted, Unterminated> {
    let start = cursor.offset();
    let quote = cursor.advance();
    let double = quote == '"';
    let mut value = String::new();

    loop {
        if cursor.at_eol() {
            return Err(Unterminated { range: cursor.range_from(start) });
        }

        match cursor.advance() {
            '\'' if !double => {
                if cursor.eat('\'') {
                    value.push('\'');
                } else {
                    break;
                }
            }
            '"' if double => break,
            '\\' if double => escape(cursor, &mut value),
            c => value.push(c),
        }
    }

    Ok(Quoted { range: cursor.range_from(start), value, double })
}

fn escape(cursor: &mut Cursor<'_>, value: &mut String) {
    let decoded = match cursor.peek() {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        '0' => '\0',
        'b' => '\u{8}',
        'e' => '\u{1b}',
        ' ' => ' ',
        '/' => '/',
        '\\' => '\\',
        '"' => '"',
        'x' => return hex_escape(cursor, value, 2),
        'u' => return hex_escape(cursor, value, 4),
        'U' => return hex_escape(cursor, value, 8),
        _ => {
            value.push('\\');
            return;
        }
    };
    cursor.advance();
    value.push(decoded);
}

fn hex_escape(cursor: &mut Cursor<'_>, value: &mut String, digits: usize) {
    let rest = &cursor.rest()[1..];
    let decoded = rest
        .get(..digits)
        .filter(|hex| hex.chars().all(|c| c.is_ascii_hexdigit()))
        .and_then(|hex| u32::from_str_radix(hex, 16).ok())
        .and_then(char::from_u32);

    match decoded {
        Some(c) => {
            cursor.seek(cursor.offset() + TextSize::new(1 + digits as u32));
            value.push(c);
        }
        None => value.push('\\'),
    }
}

/// Scans the name after an `&` or `*` indicator (the cursor sits on the indicator).
pub fn anchor_name(cursor: &mut Cursor<'_>) -> TextRange {
    cursor.advance();
    let start = cursor.offset();
    cursor.advance_while(|c| !is_blank(c) && !matches!(c, '\n' | '\r') && !is_flow_indicator(c));
    cursor.range_from(start)
}

pub fn skip_tag(cursor: &mut Cursor<'_>) {
    cursor.advance_while(|c| !is_blank(c) && !matches!(c, '\n' | '\r') && !is_flow_indicator(c));
}

/// `true` if a `key:` (plain or quoted) starts at the cursor.
pub fn mapping_key_ahead(cursor: &Cursor<'_>, context: Context) -> bool {
    let mut probe = cursor.clone();

    match probe.peek() {
        '\'' | '"' => {
            if quoted_scalar(&mut probe).is_err() {
                return false;
            }
        }
        '-' if is_blank(probe.second()) || matches!(probe.second(), '\n' | '\r' | EOF_CHAR) => {
            return false;
        }
        c if can_start_plain(c) => {
            if plain_scalar(&mut probe, context).is_empty() {
                return false;
            }
        }
        _ => return false,
    }

    probe.skip_blanks();
    probe.matches(':') && ends_key(probe.second(), context)
}

pub fn can_start_plain(c: char) -> bool {
    !is_blank(c)
        && !matches!(
            c,
            '\n' | '\r'
                | EOF_CHAR
                | '['
                | ']'
                | '{'
                | '}'
                | ','
                | '#'
                | '&'
                | '*'
                | '!'
                | '|'
                | '>'
                | '\''
                | '"'
                | '%'
                | '@'
                | '`'
        )
}

/// Scans `|` / `>` and its chomping and indentation indicators.
pub fn block_header(cursor: &mut Cursor<'_>) -> BlockHeader {
    let literal = cursor.advance() == '|';
    let mut header = BlockHeader { literal, chomp: Chomp::Clip, indent: None };

    loop {
        match cursor.peek() {
            '-' => header.chomp = Chomp::Strip,
            '+' => header.chomp = Chomp::Keep,
            c @ '1'..='9' => header.indent = c.to_digit(10),
            _ => break,
        }
        cursor.advance();
    }

    header
}

/// Builds the value of a block scalar from its dedented content lines.
///
/// `lines` excludes trailing blank lines; `trailing_blank` counts them.
pub fn block_value(header: BlockHeader, lines: &[&str], trailing_blank: usize) -> String {
    let mut body = String::new();

    if header.literal {
        body = lines.join("\n");
    } else {
        let mut pending_breaks = 0;
        for line in lines {
            if line.is_empty() {
                pending_breaks += 1;
                continue;
            }
            if !body.is_empty() {
                if pending_breaks > 0 {
                    body.extend(std::iter::repeat_n('\n', pending_breaks));
                } else if line.starts_with(' ') {
                    body.push('\n');
                } else {
                    body.push(' ');
                }
            }
            pending_breaks = 0;
            body.push_str(line);
        }
    }

    match header.chomp {
        Chomp::Strip => {}
        Chomp::Clip if !body.is_empty() => body.push('\n'),
        Chomp::Clip => {}
        Chomp::Keep => {
            let breaks = if body.is_empty() { trailing_blank } else { trailing_blank + 1 };
            body.extend(std::iter::repeat_n('\n', breaks));
        }
    }

    body
}
