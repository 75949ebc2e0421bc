use scenery_tokenizer::LineKind;
use scenery_tokenizer::scan::{self, Context, Unterminated};
use scenery_tree::{NodeData, NodeId, ScalarStyle};
use text_size::{TextRange, TextSize};

use crate::parser::Parser;

pub(super) fn plain(p: &mut Parser<'_>, context: Context) -> Option<NodeId> {
    let range = scan::plain_scalar(p.cursor(), context);
    if range.is_empty() {
        return None;
    }

    let value = p.text()[range].to_owned();
    Some(p.leaf(NodeData::Scalar { value, style: ScalarStyle::Plain }, range))
}

pub(super) fn quoted(p: &mut Parser<'_>) -> Result<NodeId, Unterminated> {
    let quoted = scan::quoted_scalar(p.cursor())?;
    let style = if quoted.double { ScalarStyle::DoubleQuoted } else { ScalarStyle::SingleQuoted };
    Ok(p.leaf(NodeData::Scalar { value: quoted.value, style }, quoted.range))
}

/// A block mapping key. Only called once `key:` has been seen ahead.
pub(super) fn key(p: &mut Parser<'_>) -> NodeId {
    let start = p.offset();
    let key = match p.peek() {
        '\'' | '"' => quoted(p).ok(),
        _ => plain(p, Context::Block),
    };

    key.unwrap_or_else(|| {
        p.leaf(
            NodeData::Scalar { value: String::new(), style: ScalarStyle::Plain },
            TextRange::empty(start),
        )
    })
}

pub(super) fn alias(p: &mut Parser<'_>) -> Option<NodeId> {
    let start = p.offset();
    let name_range = scan::anchor_name(p.cursor());
    let range = TextRange::new(start, name_range.end());

    if name_range.is_empty() {
        p.error("expected an alias name after `*`", range);
        return None;
    }

    let name = p.text()[name_range].to_owned();
    match p.anchor(&name) {
        Some(target) => Some(p.leaf(NodeData::AnchorRef { name, target }, range)),
        None => {
            p.error(format!("undefined alias `{name}`"), range);
            None
        }
    }
}

/// Consumes `&anchor` and `!tag` properties; tags are ignored.
pub(super) fn properties(p: &mut Parser<'_>) -> Option<String> {
    let mut anchor = None;

    loop {
        match p.peek() {
            '&' => {
                let start = p.offset();
                let name = scan::anchor_name(p.cursor());
                if name.is_empty() {
                    p.error("expected an anchor name after `&`", TextRange::new(start, name.end()));
                } else {
                    anchor = Some(p.text()[name].to_owned());
                }
            }
            '!' => scan::skip_tag(p.cursor()),
            _ => return anchor,
        }
        p.skip_blanks();
    }
}

/// `|` or `>` with the content lines indented deeper than `owner`.
pub(super) fn block_scalar(p: &mut Parser<'_>, owner: i32) -> NodeId {
    let start = p.offset();
    let header = scan::block_header(p.cursor());
    let mut end = p.offset();
    p.finish_line();

    let text = p.text();
    let mut content_indent = header.indent.map(|n| owner.max(0) as u32 + n);
    let mut lines = Vec::new();
    let mut blank = 0;
    let mut resume = p.offset();

    let mut index = p.line_count();
    if !p.is_eof() {
        index = p.line_index_at_cursor();
        if p.line(index).range.start() < p.offset() {
            index += 1;
        }
    }

    while index < p.line_count() {
        let line = p.line(index);
        index += 1;

        if line.kind == LineKind::Blank {
            blank += 1;
            continue;
        }
        if line.indent as i32 <= owner {
            break;
        }
        let indent = *content_indent.get_or_insert(line.indent);
        if line.indent < indent {
            break;
        }

        lines.extend(std::iter::repeat_n("", blank));
        blank = 0;
        let content = line.range.start() + TextSize::new(indent);
        lines.push(&text[TextRange::new(content, line.range.end())]);
        end = line.range.end();
        resume = line.next;
    }

    p.seek(resume);
    let style = if header.literal { ScalarStyle::Literal } else { ScalarStyle::Folded };
    let value = scan::block_value(header, &lines, blank);
    p.leaf(NodeData::Scalar { value, style }, TextRange::new(start, end))
}
