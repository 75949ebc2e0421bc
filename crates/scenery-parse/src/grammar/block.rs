use std::cmp::Ordering;

use rustc_hash::FxHashSet;
use scenery_tokenizer::scan::Context;
use scenery_tree::{NodeData, NodeId};
use text_size::{TextRange, TextSize};

use super::{flow, scalars};
use crate::parser::Parser;

/// A block node whose first line starts at column `col`.
pub(crate) fn node(p: &mut Parser<'_>, col: u32) -> Option<NodeId> {
    if p.at_sequence_item() {
        return Some(sequence(p, col));
    }
    if p.at_mapping_key(Context::Block) {
        return Some(map(p, col));
    }
    value(p, col as i32 - 1, false)
}

/// The value after `key:` or `-`, on the same line or nested below.
///
/// Nested lines must be indented deeper than `owner`. A mapping value may
/// also be a sequence at the key's own indentation.
pub(crate) fn value(p: &mut Parser<'_>, owner: i32, same_indent_sequence: bool) -> Option<NodeId> {
    p.skip_blanks();
    let anchor_start = p.offset();
    let anchor = scalars::properties(p);

    let node = if p.at_line_end() {
        p.finish_line();
        nested(p, owner, same_indent_sequence)
    } else if matches!(p.peek(), '|' | '>') {
        Some(scalars::block_scalar(p, owner))
    } else {
        match flow::inline(p, owner) {
            Ok(node) => {
                p.finish_line();
                node
            }
            Err(flow::Recovered) => None,
        }
    };

    match (anchor, node) {
        (Some(name), Some(node)) => p.define_anchor(name, node),
        (Some(name), None) => {
            let len = TextSize::of(name.as_str()) + TextSize::new(1);
            p.warning(format!("anchor `{name}` has no value"), TextRange::at(anchor_start, len));
        }
        (None, _) => {}
    }
    node
}

fn nested(p: &mut Parser<'_>, owner: i32, same_indent_sequence: bool) -> Option<NodeId> {
    let line = p.skip_to_content_line()?;
    if p.is_document_marker(&line, "---") || p.is_document_marker(&line, "...") {
        return None;
    }

    let indent = line.indent as i32;
    let owned = indent > owner
        || (same_indent_sequence && indent == owner && p.line_starts_with_item(&line));
    if !owned {
        return None;
    }

    p.enter(&line);
    node(p, line.indent)
}

fn map(p: &mut Parser<'_>, col: u32) -> NodeId {
    let m = p.start();
    let mut mappings = Vec::new();
    let mut keys = FxHashSet::default();

    loop {
        if p.at_mapping_key(Context::Block) {
            let (mapping, key) = entry(p, col);
            let text = p.scalar_text(key).unwrap_or_default().to_owned();
            if !keys.insert(text.clone()) {
                let range = p.node_range(key);
                p.warning(format!("duplicate key `{text}`"), range);
            }
            mappings.push(mapping);
        } else {
            let message = if p.at_sequence_item() {
                "sequence item is not allowed in a mapping"
            } else {
                "expected a `key: value` entry"
            };
            let range = TextRange::new(p.offset(), p.line_at_cursor().range.end());
            p.error(message, range);
            p.skip_line();
        }

        if !next_line_at(p, col, false) {
            break;
        }
    }

    m.complete(p, NodeData::Map { mappings, flow: false })
}

fn entry(p: &mut Parser<'_>, col: u32) -> (NodeId, NodeId) {
    let m = p.start();
    let key = scalars::key(p);
    p.skip_blanks();
    p.eat_token(':');
    let value = value(p, col as i32, true);
    (m.complete(p, NodeData::Mapping { key, value }), key)
}

fn sequence(p: &mut Parser<'_>, col: u32) -> NodeId {
    let m = p.start();
    let mut items = Vec::new();

    loop {
        p.bump_token();
        items.push(item(p, col));

        if !next_line_at(p, col, true) {
            break;
        }
    }

    m.complete(p, NodeData::Sequence { items, flow: false })
}

fn item(p: &mut Parser<'_>, col: u32) -> Option<NodeId> {
    p.skip_blanks();
    if !p.at_line_end() {
        let column = p.column();
        if p.at_sequence_item() {
            return Some(sequence(p, column));
        }
        if p.at_mapping_key(Context::Block) {
            return Some(map(p, column));
        }
    }
    value(p, col as i32, false)
}

/// Moves to the next content line if it continues the block at column `col`.
/// Deeper lines that nothing owns are reported and skipped.
fn next_line_at(p: &mut Parser<'_>, col: u32, items: bool) -> bool {
    loop {
        let Some(line) = p.skip_to_content_line() else {
            return false;
        };
        if p.is_document_marker(&line, "---") || p.is_document_marker(&line, "...") {
            return false;
        }

        match line.indent.cmp(&col) {
            Ordering::Less => return false,
            Ordering::Equal => {
                if items && !p.line_starts_with_item(&line) {
                    return false;
                }
                p.enter(&line);
                return true;
            }
            Ordering::Greater => {
                p.error("unexpected indentation", line.content_range());
                p.skip_line();
            }
        }
    }
}
