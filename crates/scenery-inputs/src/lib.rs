//! Salsa inputs: the scene documents whose text the editing surface owns.

pub use line_index::{LineCol, LineIndex, TextRange, TextSize};

#[salsa::input(debug)]
pub struct Document {
    #[returns(ref)]
    pub path: camino::Utf8PathBuf,
    #[returns(deref)]
    pub text: String,
}

#[salsa::tracked]
impl Document {
    #[salsa::tracked(returns(ref), no_eq)]
    pub fn line_index(self, db: &dyn salsa::Database) -> LineIndex {
        LineIndex::new(self.text(db))
    }
}

/// Number of lines in `text`, counting a trailing partial line and the empty
/// line after a final newline.
pub fn line_count(index: &LineIndex) -> u32 {
    index.line_col(index.len()).line + 1
}

/// Byte range of `line` excluding its terminating newline.
pub fn line_range(index: &LineIndex, text: &str, line: u32) -> Option<TextRange> {
    let start = index.offset(LineCol { line, col: 0 })?;
    let rest = &text[usize::from(start)..];
    let len = rest.find('\n').unwrap_or(rest.len());
    let len = if rest[..len].ends_with('\r') { len - 1 } else { len };
    Some(TextRange::at(start, TextSize::new(len as u32)))
}
