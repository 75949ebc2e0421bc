//! Keeps the annotations of a document in step with its text.
//!
//! Each edit reported by a [`TextSurface`] names a line range. After the tree
//! is rebuilt, [`ReconcileContext::reconcile`] revisits only those lines:
//! annotations whose node no longer matches are torn down, and nodes the
//! [`Registry`](scenery_registry::Registry) claims get a fresh one.

mod annotation;
mod context;
mod debounce;
mod event;
mod surface;
mod widget;

pub use annotation::{Annotation, AnnotationId, AnnotationState};
pub use context::{ReconcileContext, ReconcileReport};
pub use debounce::Debounce;
pub use event::{EditEvent, EditOrigin, LineSpan};
pub use surface::{AnchorId, MemorySurface, TextSurface};
pub use widget::{AnnotationWidget, WidgetFactory, WidgetTarget};

#[cfg(test)]
mod tests;
