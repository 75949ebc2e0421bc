use std::fmt::Display;

pub use annotate_snippets::Renderer;
use annotate_snippets::{Level, Snippet};
pub use scenery_tree::{Severity, TextRange};

/// A problem found while building the tree of a scene document.
///
/// Malformed regions never abort the build; they surface here instead, next to
/// a `None` in the tree where the subtree would have been.
#[salsa::accumulator]
pub struct Diagnostic {
    severity: Severity,
    message: String,
    range: TextRange,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>, range: TextRange) -> Self {
        Self { severity, message: message.into(), range }
    }

    pub fn error(message: impl Into<String>, range: TextRange) -> Self {
        Self { severity: Severity::Error, message: message.into(), range }
    }

    pub fn warning(message: impl Into<String>, range: TextRange) -> Self {
        Self { severity: Severity::Warning, message: message.into(), range }
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    pub fn render<'a>(
        &'a self,
        renderer: &'a Renderer,
        path: &'a str,
        text: &'a str,
    ) -> impl Display + 'a {
        let level = match self.severity {
            Severity::Error => Level::Error,
            Severity::Warning => Level::Warning,
        };

        // Empty spans at end of input still need something to point at.
        let span: std::ops::Range<usize> = self.range.into();
        let span = if span.is_empty() && span.start >= text.len() {
            text.len().saturating_sub(1)..text.len()
        } else {
            span
        };

        let message = level.title(&self.message).snippet(
            Snippet::source(text)
                .origin(path)
                .annotation(level.span(span).label("here"))
                .fold(true),
        );
        renderer.render(message)
    }
}
