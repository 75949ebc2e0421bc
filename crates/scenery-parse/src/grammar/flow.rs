use scenery_tokenizer::LineKind;
use scenery_tokenizer::scan::{self, Context};
use scenery_tree::{NodeData, NodeId};
use text_size::{TextRange, TextSize};

use super::scalars;
use crate::parser::Parser;

/// A broken flow collection was reported and skipped; the cursor is at the
/// start of a line owned by an enclosing block.
pub(crate) struct Recovered;

struct FlowError {
    message: &'static str,
    range: TextRange,
}

impl FlowError {
    fn here(p: &Parser<'_>, message: &'static str) -> Self {
        let len = if p.is_eof() { TextSize::new(0) } else { TextSize::of(p.peek()) };
        Self { message, range: TextRange::at(p.offset(), len) }
    }

    fn unterminated(open: TextSize) -> Self {
        Self { message: "unterminated flow collection", range: TextRange::at(open, 1.into()) }
    }
}

/// A value that starts on the current line of a block.
pub(crate) fn inline(p: &mut Parser<'_>, owner: i32) -> Result<Option<NodeId>, Recovered> {
    match p.peek() {
        '[' | '{' => match collection(p, owner) {
            Ok(node) => Ok(Some(node)),
            Err(err) => {
                p.error(err.message, err.range);
                p.recover_to_indent(owner);
                Err(Recovered)
            }
        },
        '*' => Ok(scalars::alias(p)),
        '\'' | '"' => Ok(match scalars::quoted(p) {
            Ok(node) => Some(node),
            Err(unterminated) => {
                p.error("unterminated quoted scalar", unterminated.range);
                None
            }
        }),
        _ => Ok(scalars::plain(p, Context::Block)),
    }
}

fn collection(p: &mut Parser<'_>, owner: i32) -> Result<NodeId, FlowError> {
    let open = p.offset();
    let m = p.start();

    let data = if p.eat_token('[') {
        sequence_items(p, owner, open).map(|items| NodeData::Sequence { items, flow: true })
    } else {
        p.eat_token('{');
        map_entries(p, owner, open).map(|mappings| NodeData::Map { mappings, flow: true })
    };

    match data {
        Ok(data) => Ok(m.complete(p, data)),
        Err(err) => {
            m.abandon(p);
            Err(err)
        }
    }
}

fn node(p: &mut Parser<'_>, owner: i32, open: TextSize) -> Result<Option<NodeId>, FlowError> {
    trivia(p, owner, open)?;
    let anchor = scalars::properties(p);
    trivia(p, owner, open)?;

    let node = match p.peek() {
        '[' | '{' => Some(collection(p, owner)?),
        '*' => scalars::alias(p),
        '\'' | '"' => Some(scalars::quoted(p).map_err(|unterminated| FlowError {
            message: "unterminated quoted scalar",
            range: unterminated.range,
        })?),
        ',' | ']' | '}' => None,
        _ => scalars::plain(p, Context::Flow),
    };

    if let (Some(name), Some(node)) = (anchor, node) {
        p.define_anchor(name, node);
    }
    Ok(node)
}

fn sequence_items(
    p: &mut Parser<'_>,
    owner: i32,
    open: TextSize,
) -> Result<Vec<Option<NodeId>>, FlowError> {
    let mut items = Vec::new();

    loop {
        trivia(p, owner, open)?;
        if p.eat_token(']') {
            return Ok(items);
        }

        items.push(node(p, owner, open)?);
        trivia(p, owner, open)?;
        if !p.eat_token(',') && !p.matches(']') {
            return Err(FlowError::here(p, "expected `,` or `]`"));
        }
    }
}

fn map_entries(p: &mut Parser<'_>, owner: i32, open: TextSize) -> Result<Vec<NodeId>, FlowError> {
    let mut mappings = Vec::new();

    loop {
        trivia(p, owner, open)?;
        if p.eat_token('}') {
            return Ok(mappings);
        }

        let m = p.start();
        let key = match p.peek() {
            '\'' | '"' => scalars::quoted(p).ok(),
            c if scan::can_start_plain(c) => scalars::plain(p, Context::Flow),
            _ => None,
        };
        let Some(key) = key else {
            m.abandon(p);
            return Err(FlowError::here(p, "expected a key"));
        };

        match entry_value(p, owner, open) {
            Ok(value) => mappings.push(m.complete(p, NodeData::Mapping { key, value })),
            Err(err) => {
                m.abandon(p);
                return Err(err);
            }
        }

        trivia(p, owner, open)?;
        if !p.eat_token(',') && !p.matches('}') {
            return Err(FlowError::here(p, "expected `,` or `}`"));
        }
    }
}

/// `: value`, or nothing for a bare key.
fn entry_value(
    p: &mut Parser<'_>,
    owner: i32,
    open: TextSize,
) -> Result<Option<NodeId>, FlowError> {
    trivia(p, owner, open)?;
    if !p.eat_token(':') {
        return Ok(None);
    }
    node(p, owner, open)
}

/// Skips blanks, comments and line breaks inside a flow collection.
///
/// Continuation lines must be indented deeper than `owner`; a closing
/// bracket may sit at the owner's own indentation.
fn trivia(p: &mut Parser<'_>, owner: i32, open: TextSize) -> Result<(), FlowError> {
    loop {
        p.skip_blanks();
        if p.at_comment() {
            p.cursor().advance_while(|c| !matches!(c, '\n' | '\r'));
        }
        if p.is_eof() {
            return Err(FlowError::unterminated(open));
        }
        if !p.at_eol() {
            return Ok(());
        }

        p.skip_line();
        if p.is_eof() {
            return Err(FlowError::unterminated(open));
        }

        let line = p.line_at_cursor();
        if line.kind != LineKind::Content {
            continue;
        }
        let indent = line.indent as i32;
        let closing = p.text()[line.content_range()].starts_with([']', '}']);
        if indent < owner || (indent == owner && !closing) {
            return Err(FlowError::unterminated(open));
        }
    }
}
