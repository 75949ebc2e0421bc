use std::fmt;
use std::str::FromStr;

/// Tag an editor attaches to a change, telling what produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditOrigin {
    Input,
    Delete,
    Cut,
    Paste,
    Undo,
    Redo,
    /// Written by an annotation's own widget.
    ValueChange,
    /// The whole document was replaced.
    SetValue,
    Other,
}

impl EditOrigin {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Input => "+input",
            Self::Delete => "+delete",
            Self::Cut => "cut",
            Self::Paste => "paste",
            Self::Undo => "undo",
            Self::Redo => "redo",
            Self::ValueChange => "+value_change",
            Self::SetValue => "setValue",
            Self::Other => "other",
        }
    }
}

impl FromStr for EditOrigin {
    type Err = std::convert::Infallible;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        Ok(match tag.strip_prefix('+').unwrap_or(tag) {
            "input" => Self::Input,
            "delete" => Self::Delete,
            "cut" => Self::Cut,
            "paste" => Self::Paste,
            "undo" => Self::Undo,
            "redo" => Self::Redo,
            "value_change" => Self::ValueChange,
            "setValue" => Self::SetValue,
            _ => Self::Other,
        })
    }
}

impl From<&str> for EditOrigin {
    fn from(tag: &str) -> Self {
        match tag.parse() {
            Ok(origin) => origin,
            Err(never) => match never {},
        }
    }
}

impl fmt::Display for EditOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A change reported by the text surface. Lines are 0-based and refer to the
/// document before the change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditEvent {
    pub from_line: u32,
    pub to_line: u32,
    pub origin: EditOrigin,
    pub inserted_lines: u32,
    pub removed_lines: u32,
}

impl EditEvent {
    pub fn new(from_line: u32, to_line: u32, origin: EditOrigin) -> Self {
        Self { from_line, to_line, origin, inserted_lines: 0, removed_lines: 0 }
    }

    pub fn with_line_delta(mut self, inserted_lines: u32, removed_lines: u32) -> Self {
        self.inserted_lines = inserted_lines;
        self.removed_lines = removed_lines;
        self
    }

    pub fn is_single_line(&self) -> bool {
        self.from_line == self.to_line
    }

    /// The lines of the edited document that must be revisited.
    ///
    /// Deleted lines no longer exist, so a delete or cut only touches its
    /// first line. Pasted and history-restored text may add lines below the
    /// reported range. The result never reaches past `last_line`.
    pub fn normalized(&self, last_line: u32) -> LineSpan {
        let from = self.from_line;
        let to = match self.origin {
            EditOrigin::Delete | EditOrigin::Cut => from,
            EditOrigin::Paste | EditOrigin::Undo | EditOrigin::Redo => {
                let delta = i64::from(self.inserted_lines) - i64::from(self.removed_lines);
                (i64::from(self.to_line) + delta).max(i64::from(from)) as u32
            }
            _ => self.to_line.max(from),
        };
        LineSpan { from: from.min(last_line), to: to.min(last_line) }
    }
}

/// Inclusive range of 0-based lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSpan {
    pub from: u32,
    pub to: u32,
}

impl LineSpan {
    pub fn lines(self) -> std::ops::RangeInclusive<u32> {
        self.from..=self.to
    }

    pub fn contains(self, line: u32) -> bool {
        self.lines().contains(&line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_tags() {
        assert_eq!(EditOrigin::from("+input"), EditOrigin::Input);
        assert_eq!(EditOrigin::from("+delete"), EditOrigin::Delete);
        assert_eq!(EditOrigin::from("delete"), EditOrigin::Delete);
        assert_eq!(EditOrigin::from("+value_change"), EditOrigin::ValueChange);
        assert_eq!(EditOrigin::from("setValue"), EditOrigin::SetValue);
        assert_eq!(EditOrigin::from("*compose"), EditOrigin::Other);
        assert_eq!(EditOrigin::from(EditOrigin::Paste.as_str()), EditOrigin::Paste);
    }

    #[test]
    fn delete_collapses_range() {
        let event = EditEvent::new(2, 4, EditOrigin::Delete).with_line_delta(0, 2);
        assert_eq!(event.normalized(9), LineSpan { from: 2, to: 2 });

        let event = EditEvent::new(5, 7, EditOrigin::Cut);
        assert_eq!(event.normalized(9), LineSpan { from: 5, to: 5 });
    }

    #[test]
    fn paste_extends_range() {
        let event = EditEvent::new(1, 1, EditOrigin::Paste).with_line_delta(3, 0);
        assert_eq!(event.normalized(9), LineSpan { from: 1, to: 4 });

        let event = EditEvent::new(3, 6, EditOrigin::Undo).with_line_delta(0, 3);
        assert_eq!(event.normalized(9), LineSpan { from: 3, to: 3 });

        let event = EditEvent::new(3, 3, EditOrigin::Redo).with_line_delta(0, 5);
        assert_eq!(event.normalized(9), LineSpan { from: 3, to: 3 });
    }

    #[test]
    fn range_is_clamped() {
        let event = EditEvent::new(7, 8, EditOrigin::Paste).with_line_delta(10, 0);
        assert_eq!(event.normalized(9), LineSpan { from: 7, to: 9 });

        let event = EditEvent::new(12, 12, EditOrigin::Input);
        assert_eq!(event.normalized(9), LineSpan { from: 9, to: 9 });
    }
}
