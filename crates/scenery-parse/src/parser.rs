use drop_bomb::DropBomb;
use rustc_hash::FxHashMap;
use scenery_tokenizer::scan::{self, Context};
use scenery_tokenizer::{Cursor, EOF_CHAR, Line, LineKind, LineTable, is_blank};
use scenery_tree::{NodeData, NodeId, SceneTree, TreeBuilder};
use text_size::{TextRange, TextSize};

pub(crate) struct Parser<'a> {
    cursor: Cursor<'a>,
    lines: LineTable,
    builder: TreeBuilder,
    anchors: FxHashMap<String, NodeId>,
    /// End of the last significant token; trivia never moves it.
    last_end: TextSize,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self {
            cursor: Cursor::new(text),
            lines: LineTable::new(text),
            builder: TreeBuilder::new(),
            anchors: FxHashMap::default(),
            last_end: TextSize::new(0),
        }
    }

    pub(crate) fn finish(self, root: Option<NodeId>) -> SceneTree {
        self.builder.finish(root)
    }

    pub(crate) fn cursor(&mut self) -> &mut Cursor<'a> {
        &mut self.cursor
    }

    pub(crate) fn text(&self) -> &'a str {
        self.cursor.text()
    }

    pub(crate) fn offset(&self) -> TextSize {
        self.cursor.offset()
    }

    pub(crate) fn seek(&mut self, offset: TextSize) {
        self.cursor.seek(offset);
    }

    pub(crate) fn peek(&self) -> char {
        self.cursor.peek()
    }

    pub(crate) fn is_eof(&self) -> bool {
        self.cursor.is_eof()
    }

    pub(crate) fn at_eol(&self) -> bool {
        self.cursor.at_eol()
    }

    pub(crate) fn at_comment(&self) -> bool {
        self.cursor.at_comment()
    }

    pub(crate) fn matches(&self, c: char) -> bool {
        self.cursor.matches(c)
    }

    pub(crate) fn column(&self) -> u32 {
        self.cursor.column()
    }

    pub(crate) fn skip_blanks(&mut self) {
        self.cursor.skip_blanks();
    }

    pub(crate) fn at_line_end(&self) -> bool {
        self.cursor.at_line_end()
    }

    pub(crate) fn at_mapping_key(&self, context: Context) -> bool {
        scan::mapping_key_ahead(&self.cursor, context)
    }

    /// `-` followed by whitespace or a line end.
    pub(crate) fn at_sequence_item(&self) -> bool {
        self.matches('-') && {
            let next = self.cursor.second();
            is_blank(next) || matches!(next, '\n' | '\r' | EOF_CHAR)
        }
    }

    /// Consumes `c` as a significant token.
    pub(crate) fn eat_token(&mut self, c: char) -> bool {
        let eaten = self.cursor.eat(c);
        if eaten {
            self.last_end = self.offset();
        }
        eaten
    }

    pub(crate) fn bump_token(&mut self) {
        self.cursor.advance();
        self.last_end = self.offset();
    }

    pub(crate) fn start(&self) -> Marker {
        Marker::new(self.offset(), self.builder.len(), self.last_end)
    }

    /// Allocates a leaf node whose tokens have already been consumed.
    pub(crate) fn leaf(&mut self, data: NodeData, range: TextRange) -> NodeId {
        self.last_end = range.end();
        self.builder.alloc(data, range)
    }

    pub(crate) fn scalar_text(&self, id: NodeId) -> Option<&str> {
        self.builder.scalar(id)
    }

    pub(crate) fn node_range(&self, id: NodeId) -> TextRange {
        self.builder.range(id)
    }

    pub(crate) fn define_anchor(&mut self, name: String, node: NodeId) {
        self.builder.set_anchor(node, name.as_str());
        self.anchors.insert(name, node);
    }

    pub(crate) fn anchor(&self, name: &str) -> Option<NodeId> {
        self.anchors.get(name).copied()
    }

    pub(crate) fn error(&mut self, message: impl Into<String>, range: TextRange) {
        let message = message.into();
        tracing::debug!(%message, ?range, "syntax error");
        self.builder.error(message, range);
    }

    pub(crate) fn warning(&mut self, message: impl Into<String>, range: TextRange) {
        self.builder.warning(message, range);
    }

    pub(crate) fn line_at_cursor(&self) -> Line {
        self.line(self.line_index_at_cursor())
    }

    pub(crate) fn line_index_at_cursor(&self) -> usize {
        self.lines.line_of(self.offset())
    }

    pub(crate) fn line(&self, index: usize) -> Line {
        self.lines.get(index).copied().unwrap_or_else(|| {
            let end = TextSize::of(self.text());
            Line { range: TextRange::empty(end), next: end, indent: 0, kind: LineKind::Blank }
        })
    }

    pub(crate) fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Moves to the start of the next line holding block content, skipping
    /// blank, comment and tab-indented lines on the way.
    pub(crate) fn skip_to_content_line(&mut self) -> Option<Line> {
        loop {
            if self.cursor.is_eof() {
                return None;
            }

            let line = self.line_at_cursor();
            if self.offset() > line.range.start() {
                self.seek(line.next);
                continue;
            }

            match line.kind {
                LineKind::Blank | LineKind::Comment => self.seek(line.next),
                LineKind::TabIndented => {
                    self.error("tabs are not allowed in indentation", line.range);
                    self.seek(line.next);
                }
                LineKind::Content => return Some(line),
            }
        }
    }

    pub(crate) fn enter(&mut self, line: &Line) {
        self.seek(line.content_start());
    }

    pub(crate) fn line_starts_with_item(&self, line: &Line) -> bool {
        let mut probe = self.cursor.clone();
        probe.seek(line.content_start());
        probe.matches('-') && {
            let next = probe.second();
            is_blank(next) || matches!(next, '\n' | '\r' | EOF_CHAR)
        }
    }

    /// `---` or `...` in column zero.
    pub(crate) fn is_document_marker(&self, line: &Line, marker: &str) -> bool {
        let content = &self.text()[line.range];
        line.indent == 0
            && content.strip_prefix(marker).is_some_and(|rest| {
                rest.is_empty() || rest.starts_with(is_blank) || rest.starts_with('#')
            })
    }

    /// Ends the current line: only blanks and a comment may follow the value.
    pub(crate) fn finish_line(&mut self) {
        self.skip_blanks();
        if !self.cursor.at_eol() && !self.cursor.at_comment() {
            let start = self.offset();
            let mut end = start;
            while !self.cursor.at_eol() && !self.cursor.at_comment() {
                if !is_blank(self.cursor.advance()) {
                    end = self.offset();
                }
            }
            self.error("unexpected content after value", TextRange::new(start, end));
        }
        self.cursor.skip_line();
    }

    pub(crate) fn skip_line(&mut self) {
        self.cursor.skip_line();
    }

    /// Skips everything indented deeper than `owner`, leaving the cursor at
    /// the start of the line that belongs to an enclosing block.
    pub(crate) fn recover_to_indent(&mut self, owner: i32) {
        if self.column() != 0 {
            self.skip_line();
        }

        while !self.cursor.is_eof() {
            let line = self.line_at_cursor();
            let nested = match line.kind {
                LineKind::Blank | LineKind::Comment | LineKind::TabIndented => true,
                LineKind::Content => line.indent as i32 > owner,
            };
            if !nested {
                break;
            }
            self.seek(line.next);
        }
    }
}

/// An unfinished node. Must be completed or abandoned.
pub(crate) struct Marker {
    start: TextSize,
    checkpoint: u32,
    last_end: TextSize,
    bomb: DropBomb,
}

impl Marker {
    fn new(start: TextSize, checkpoint: u32, last_end: TextSize) -> Self {
        Self {
            start,
            checkpoint,
            last_end,
            bomb: DropBomb::new("Marker must be either completed or abandoned"),
        }
    }

    /// Allocates the node, spanning from the marker to the last consumed token.
    pub(crate) fn complete(mut self, p: &mut Parser<'_>, data: NodeData) -> NodeId {
        self.bomb.defuse();
        let range = TextRange::new(self.start, p.last_end.max(self.start));
        p.builder.alloc(data, range)
    }

    /// Drops every node allocated since the marker was started.
    pub(crate) fn abandon(mut self, p: &mut Parser<'_>) {
        self.bomb.defuse();
        p.builder.truncate(self.checkpoint);
        p.anchors.retain(|_, node| node.index() < self.checkpoint);
        p.last_end = self.last_end;
    }
}
