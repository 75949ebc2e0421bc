use text_size::{TextRange, TextSize};

pub const EOF_CHAR: char = '\0';

/// A seekable character cursor over a document.
///
/// Unlike a streaming lexer the parser jumps back and forth between lines
/// (it peeks at the indentation of the next content line before deciding who
/// owns it), so the position is a plain byte offset that can be restored.
#[derive(Clone)]
pub struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn offset(&self) -> TextSize {
        TextSize::new(self.pos as u32)
    }

    pub fn seek(&mut self, offset: TextSize) {
        self.pos = usize::from(offset).min(self.text.len());
    }

    pub fn is_eof(&self) -> bool {
        self.pos >= self.text.len()
    }

    pub fn peek(&self) -> char {
        self.rest().chars().next().unwrap_or(EOF_CHAR)
    }

    pub fn second(&self) -> char {
        self.nth(1)
    }

    pub fn nth(&self, n: usize) -> char {
        self.rest().chars().nth(n).unwrap_or(EOF_CHAR)
    }

    pub fn matches(&self, c: char) -> bool {
        self.peek() == c
    }

    pub fn advance(&mut self) -> char {
        match self.rest().chars().next() {
            Some(c) => {
                self.pos += c.len_utf8();
                c
            }
            None => EOF_CHAR,
        }
    }

    pub fn eat(&mut self, c: char) -> bool {
        if self.matches(c) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn advance_while(&mut self, f: impl Fn(char) -> bool + Copy) {
        while !self.is_eof() && f(self.peek()) {
            self.advance();
        }
    }

    /// Skips spaces and tabs on the current line.
    pub fn skip_blanks(&mut self) {
        self.advance_while(crate::is_blank);
    }

    /// `true` at a line break or the end of input.
    pub fn at_eol(&self) -> bool {
        matches!(self.peek(), '\n' | '\r' | EOF_CHAR)
    }

    /// `true` at a comment: `#` is only a comment at line start or after whitespace.
    pub fn at_comment(&self) -> bool {
        self.matches('#') && (self.pos == 0 || self.text[..self.pos].ends_with([' ', '\t', '\n']))
    }

    /// `true` when nothing but blanks and an optional comment remain on the line.
    pub fn at_line_end(&self) -> bool {
        let mut probe = self.clone();
        probe.skip_blanks();
        probe.at_eol() || probe.at_comment()
    }

    /// Moves past the rest of the current line and its line break.
    pub fn skip_line(&mut self) {
        self.advance_while(|c| c != '\n');
        self.eat('\n');
    }

    /// Column of the cursor, in bytes from the start of its line.
    pub fn column(&self) -> u32 {
        let line_start = self.text[..self.pos].rfind('\n').map_or(0, |it| it + 1);
        (self.pos - line_start) as u32
    }

    pub fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    pub fn slice(&self, range: TextRange) -> &'a str {
        &self.text[range]
    }

    pub fn range_from(&self, start: TextSize) -> TextRange {
        TextRange::new(start, self.offset())
    }
}
