use std::fmt;

use scenery_query::Address;
use scenery_registry::{AnnotationKind, EntryIndex};

use crate::surface::AnchorId;
use crate::widget::AnnotationWidget;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnnotationId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationState {
    /// Built, but not yet placed on the surface.
    Unattached,
    Attached,
    /// Its lines were touched by an unrelated edit; about to be torn down.
    Stale,
    Destroyed,
}

/// A widget bound to one value of the document, shown at an anchor.
pub struct Annotation {
    id: AnnotationId,
    entry: EntryIndex,
    kind: AnnotationKind,
    address: Address,
    value: String,
    anchor: Option<AnchorId>,
    state: AnnotationState,
    widget: Box<dyn AnnotationWidget>,
}

impl Annotation {
    pub(crate) fn new(
        id: AnnotationId,
        entry: EntryIndex,
        kind: AnnotationKind,
        address: Address,
        value: String,
        widget: Box<dyn AnnotationWidget>,
    ) -> Self {
        Self {
            id,
            entry,
            kind,
            address,
            value,
            anchor: None,
            state: AnnotationState::Unattached,
            widget,
        }
    }

    pub fn id(&self) -> AnnotationId {
        self.id
    }

    pub fn entry(&self) -> EntryIndex {
        self.entry
    }

    pub fn kind(&self) -> AnnotationKind {
        self.kind
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn anchor(&self) -> Option<AnchorId> {
        self.anchor
    }

    pub fn state(&self) -> AnnotationState {
        self.state
    }

    pub fn widget(&self) -> &dyn AnnotationWidget {
        self.widget.as_ref()
    }

    pub(crate) fn attach(&mut self, anchor: AnchorId) {
        debug_assert_eq!(self.state, AnnotationState::Unattached);
        self.anchor = Some(anchor);
        self.state = AnnotationState::Attached;
    }

    pub(crate) fn refresh(&mut self, value: &str) {
        self.widget.refresh(value);
        self.value = value.to_owned();
    }

    pub(crate) fn mark_stale(&mut self) {
        self.state = AnnotationState::Stale;
    }

    pub(crate) fn destroy(&mut self) {
        debug_assert_eq!(self.state, AnnotationState::Stale);
        self.widget.release();
        self.anchor = None;
        self.state = AnnotationState::Destroyed;
    }
}

impl fmt::Debug for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Annotation")
            .field("id", &self.id)
            .field("entry", &self.entry)
            .field("kind", &self.kind)
            .field("address", &self.address)
            .field("value", &self.value)
            .field("anchor", &self.anchor)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
