use scenery_tree::NodeId;
use text_size::TextSize;

use crate::parser::Parser;

mod block;
mod flow;
mod scalars;

/// Parses a single document, optionally introduced by `---`.
pub(crate) fn document(p: &mut Parser<'_>) -> Option<NodeId> {
    let line = p.skip_to_content_line()?;

    let root = if p.is_document_marker(&line, "---") {
        p.seek(line.range.start() + TextSize::new(3));
        block::value(p, -1, false)
    } else if p.is_document_marker(&line, "...") {
        None
    } else {
        p.enter(&line);
        block::node(p, line.indent)
    };

    trailing(p);
    root
}

fn trailing(p: &mut Parser<'_>) {
    while let Some(line) = p.skip_to_content_line() {
        if p.is_document_marker(&line, "...") {
            return;
        }
        if p.is_document_marker(&line, "---") {
            p.error("multiple documents in one file are not supported", line.content_range());
            return;
        }

        p.error("unexpected content", line.content_range());
        p.skip_line();
    }
}
