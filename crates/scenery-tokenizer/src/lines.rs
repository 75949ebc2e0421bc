use text_size::{TextRange, TextSize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    Comment,
    Content,
    /// Indentation contains a tab; such lines cannot take part in block structure.
    TabIndented,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line {
    /// The line without its terminating `\n` / `\r\n`.
    pub range: TextRange,
    /// Offset of the first byte after the line break.
    pub next: TextSize,
    /// Leading spaces.
    pub indent: u32,
    pub kind: LineKind,
}

impl Line {
    pub fn content_start(&self) -> TextSize {
        self.range.start() + TextSize::new(self.indent)
    }

    pub fn content_range(&self) -> TextRange {
        TextRange::new(self.content_start().min(self.range.end()), self.range.end())
    }
}

/// Line structure of a document, computed once per parse.
#[derive(Debug, Clone)]
pub struct LineTable {
    lines: Vec<Line>,
}

impl LineTable {
    pub fn new(text: &str) -> Self {
        let mut lines = Vec::new();
        let mut start = 0;

        loop {
            let rest = &text[start..];
            let (len, next) = match rest.find('\n') {
                Some(newline) => (newline, start + newline + 1),
                None => (rest.len(), text.len()),
            };
            let body = rest[..len].strip_suffix('\r').unwrap_or(&rest[..len]);
            lines.push(classify(body, start));

            if next >= text.len() {
                if rest.len() > len {
                    lines.push(classify("", text.len()));
                }
                break;
            }
            start = next;
        }

        for (line, next) in lines.iter_mut().zip(next_starts(text)) {
            line.next = next;
        }

        Self { lines }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn get(&self, line: usize) -> Option<&Line> {
        self.lines.get(line)
    }

    /// Index of the line containing `offset`; offsets past the end map to the last line.
    pub fn line_of(&self, offset: TextSize) -> usize {
        self.lines.partition_point(|line| line.range.start() <= offset).saturating_sub(1)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Line> {
        self.lines.iter()
    }
}

fn classify(body: &str, start: usize) -> Line {
    let indent = body.len() - body.trim_start_matches(' ').len();
    let content = &body[indent..];
    let kind = if content.trim().is_empty() {
        LineKind::Blank
    } else if content.starts_with('\t') {
        if content.trim_start().starts_with('#') {
            LineKind::Comment
        } else {
            LineKind::TabIndented
        }
    } else if content.starts_with('#') {
        LineKind::Comment
    } else {
        LineKind::Content
    };

    let start = TextSize::new(start as u32);
    Line {
        range: TextRange::at(start, TextSize::new(body.len() as u32)),
        next: start,
        indent: indent as u32,
        kind,
    }
}

fn next_starts(text: &str) -> impl Iterator<Item = TextSize> + '_ {
    text.match_indices('\n')
        .map(|(at, _)| TextSize::new(at as u32 + 1))
        .chain(std::iter::repeat(TextSize::new(text.len() as u32)))
}
