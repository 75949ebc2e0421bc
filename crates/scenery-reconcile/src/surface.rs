use std::collections::BTreeSet;
use std::ops::Bound;

use line_index::{LineCol, LineIndex};
use rustc_hash::FxHashMap;
use text_size::{TextRange, TextSize};

use crate::event::{EditEvent, EditOrigin};

/// Handle of a visual anchor placed on a text surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnchorId(pub u32);

/// The editing surface that owns the document text and draws annotations.
///
/// Anchors are positions that follow the text as it is edited.
pub trait TextSurface {
    fn text(&self) -> &str;

    fn line_count(&self) -> u32;

    /// `line` without its line break.
    fn line_range(&self, line: u32) -> Option<TextRange>;

    fn line_of(&self, offset: TextSize) -> u32;

    fn line_text(&self, line: u32) -> Option<&str> {
        let range = self.line_range(line)?;
        self.text().get(usize::from(range.start())..usize::from(range.end()))
    }

    fn insert_anchor(&mut self, offset: TextSize) -> AnchorId;

    fn remove_anchor(&mut self, anchor: AnchorId);

    fn anchor_offset(&self, anchor: AnchorId) -> Option<TextSize>;

    fn anchor_at(&self, offset: TextSize) -> Option<AnchorId>;

    /// Anchors on lines `from..=to`, ordered by offset.
    fn anchors_in_lines(&self, from: u32, to: u32) -> Vec<AnchorId>;

    /// Replaces `range` with `text` and reports the change.
    fn replace(&mut self, range: TextRange, text: &str, origin: EditOrigin) -> EditEvent;
}

/// A [`TextSurface`] backed by a `String`.
#[derive(Debug)]
pub struct MemorySurface {
    text: String,
    index: LineIndex,
    anchors: FxHashMap<AnchorId, TextSize>,
    /// `anchors` ordered by offset.
    by_offset: BTreeSet<(TextSize, AnchorId)>,
    next_anchor: u32,
}

impl MemorySurface {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let index = LineIndex::new(&text);
        Self {
            text,
            index,
            anchors: FxHashMap::default(),
            by_offset: BTreeSet::new(),
            next_anchor: 0,
        }
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.index
    }

    pub fn anchor_count(&self) -> usize {
        self.anchors.len()
    }

    /// Replaces the whole document, dropping every anchor.
    pub fn set_text(&mut self, text: impl Into<String>) -> EditEvent {
        let removed_lines = self.line_count().saturating_sub(1);
        self.text = text.into();
        self.index = LineIndex::new(&self.text);
        self.anchors.clear();
        self.by_offset.clear();
        EditEvent::new(0, removed_lines, EditOrigin::SetValue)
            .with_line_delta(self.line_count().saturating_sub(1), removed_lines)
    }
}

impl TextSurface for MemorySurface {
    fn text(&self) -> &str {
        &self.text
    }

    fn line_count(&self) -> u32 {
        scenery_inputs::line_count(&self.index)
    }

    fn line_range(&self, line: u32) -> Option<TextRange> {
        scenery_inputs::line_range(&self.index, &self.text, line)
    }

    fn line_of(&self, offset: TextSize) -> u32 {
        self.index.line_col(offset.min(self.index.len())).line
    }

    fn insert_anchor(&mut self, offset: TextSize) -> AnchorId {
        let anchor = AnchorId(self.next_anchor);
        self.next_anchor += 1;
        self.anchors.insert(anchor, offset);
        self.by_offset.insert((offset, anchor));
        anchor
    }

    fn remove_anchor(&mut self, anchor: AnchorId) {
        if let Some(offset) = self.anchors.remove(&anchor) {
            self.by_offset.remove(&(offset, anchor));
        }
    }

    fn anchor_offset(&self, anchor: AnchorId) -> Option<TextSize> {
        self.anchors.get(&anchor).copied()
    }

    fn anchor_at(&self, offset: TextSize) -> Option<AnchorId> {
        self.by_offset
            .range((offset, AnchorId(0))..=(offset, AnchorId(u32::MAX)))
            .next()
            .map(|&(_, anchor)| anchor)
    }

    fn anchors_in_lines(&self, from: u32, to: u32) -> Vec<AnchorId> {
        let Some(start) = self.index.offset(LineCol { line: from, col: 0 }) else {
            return Vec::new();
        };
        // Everything up to the next line's start, line break included.
        let end = match self.index.offset(LineCol { line: to.saturating_add(1), col: 0 }) {
            Some(next) => Bound::Excluded((next, AnchorId(0))),
            None => Bound::Included((self.index.len(), AnchorId(u32::MAX))),
        };

        self.by_offset
            .range((Bound::Included((start, AnchorId(0))), end))
            .map(|&(_, anchor)| anchor)
            .collect()
    }

    fn replace(&mut self, range: TextRange, text: &str, origin: EditOrigin) -> EditEvent {
        let range = TextRange::new(
            range.start().min(self.index.len()),
            range.end().min(self.index.len()),
        );
        let from_line = self.line_of(range.start());
        let to_line = self.line_of(range.end());
        let removed = &self.text[range];
        let removed_lines = removed.matches('\n').count() as u32;
        let inserted_lines = text.matches('\n').count() as u32;
        let removed_len = range.len();
        let inserted_len = TextSize::of(text);

        self.text.replace_range(std::ops::Range::<usize>::from(range), text);
        self.index = LineIndex::new(&self.text);

        // Anchors inside the replaced text end up at its new end.
        for offset in self.anchors.values_mut() {
            if *offset >= range.end() {
                *offset = *offset - removed_len + inserted_len;
            } else if *offset > range.start() {
                *offset = range.start() + inserted_len;
            }
        }
        self.by_offset = self.anchors.iter().map(|(&anchor, &offset)| (offset, anchor)).collect();

        tracing::trace!(?range, %origin, from_line, to_line, "replaced text");
        EditEvent { from_line, to_line, origin, inserted_lines, removed_lines }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: u32, end: u32) -> TextRange {
        TextRange::new(start.into(), end.into())
    }

    #[test]
    fn lines() {
        let surface = MemorySurface::new("a: 1\r\n\nb: 2");
        assert_eq!(surface.line_count(), 3);
        assert_eq!(surface.line_text(0), Some("a: 1"));
        assert_eq!(surface.line_text(1), Some(""));
        assert_eq!(surface.line_text(2), Some("b: 2"));
        assert_eq!(surface.line_text(3), None);
        assert_eq!(surface.line_of(7.into()), 2);
    }

    #[test]
    fn anchors_follow_edits() {
        let mut surface = MemorySurface::new("a: 1\nb: 22\nc: 3\n");
        let before = surface.insert_anchor(4.into());
        let inside = surface.insert_anchor(10.into());
        let after = surface.insert_anchor(15.into());

        let event = surface.replace(range(8, 10), "333", EditOrigin::ValueChange);
        assert_eq!(surface.text(), "a: 1\nb: 333\nc: 3\n");
        assert_eq!(event, EditEvent::new(1, 1, EditOrigin::ValueChange));

        assert_eq!(surface.anchor_offset(before), Some(4.into()));
        assert_eq!(surface.anchor_offset(inside), Some(11.into()));
        assert_eq!(surface.anchor_offset(after), Some(16.into()));
        assert_eq!(surface.anchor_at(11.into()), Some(inside));
        assert_eq!(surface.anchors_in_lines(1, 2), [inside, after]);
    }

    #[test]
    fn multi_line_edits_report_line_delta() {
        let mut surface = MemorySurface::new("a: 1\nb: 2\nc: 3\n");

        let event = surface.replace(range(4, 14), "", EditOrigin::Delete);
        assert_eq!(surface.text(), "a: 1\n");
        assert_eq!(event, EditEvent::new(0, 2, EditOrigin::Delete).with_line_delta(0, 2));

        let event = surface.replace(range(5, 5), "x: 1\ny: 2\n", EditOrigin::Paste);
        assert_eq!(event, EditEvent::new(1, 1, EditOrigin::Paste).with_line_delta(2, 0));
        assert_eq!(surface.line_count(), 4);
    }
}
