use rustc_hash::{FxHashMap, FxHashSet};
use scenery_query::{Address, address_for_node, node_at_offset, nodes_in_range};
use scenery_registry::{EntryIndex, Registry, RegistryEntry};
use scenery_tree::{NodeId, NodeKind, SceneTree};
use text_size::TextSize;

use crate::annotation::{Annotation, AnnotationId};
use crate::event::{EditEvent, EditOrigin, LineSpan};
use crate::surface::{AnchorId, TextSurface};
use crate::widget::{WidgetFactory, WidgetTarget};

/// What one reconciliation pass did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Lines that were revisited.
    pub span: Option<LineSpan>,
    pub created: Vec<AnnotationId>,
    pub destroyed: Vec<AnnotationId>,
    pub refreshed: Vec<AnnotationId>,
}

impl ReconcileReport {
    pub fn is_noop(&self) -> bool {
        self.created.is_empty() && self.destroyed.is_empty() && self.refreshed.is_empty()
    }
}

/// An annotation the current tree asks for.
#[derive(Debug)]
struct Desired {
    offset: TextSize,
    node: NodeId,
    entry: EntryIndex,
    address: Address,
    value: String,
}

impl Desired {
    /// `annotation` shows exactly this value of this node.
    fn is_shown_by(&self, annotation: &Annotation) -> bool {
        self.entry == annotation.entry()
            && self.address == *annotation.address()
            && self.value == annotation.value()
    }
}

/// Owner of every live annotation of one document.
///
/// The surface, the freshly parsed tree and the registry are passed into each
/// call; the tree must have been built from the surface's current text.
pub struct ReconcileContext {
    annotations: FxHashMap<AnchorId, Annotation>,
    next_id: u32,
    factory: Box<dyn WidgetFactory>,
}

impl ReconcileContext {
    pub fn new(factory: impl WidgetFactory + 'static) -> Self {
        Self { annotations: FxHashMap::default(), next_id: 0, factory: Box::new(factory) }
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    pub fn get(&self, anchor: AnchorId) -> Option<&Annotation> {
        self.annotations.get(&anchor)
    }

    /// Live annotations, oldest first.
    pub fn annotations(&self) -> Vec<&Annotation> {
        let mut annotations = self.annotations.values().collect::<Vec<_>>();
        annotations.sort_unstable_by_key(|annotation| annotation.id());
        annotations
    }

    /// The annotation anchored at `offset`, if any.
    pub fn annotation_at(
        &self,
        surface: &dyn TextSurface,
        offset: TextSize,
    ) -> Option<&Annotation> {
        surface.anchor_at(offset).and_then(|anchor| self.annotations.get(&anchor))
    }

    pub fn reconcile(
        &mut self,
        surface: &mut dyn TextSurface,
        tree: &SceneTree,
        registry: &Registry,
        event: &EditEvent,
    ) -> ReconcileReport {
        match event.origin {
            EditOrigin::SetValue => return self.reset(surface, tree, registry),
            EditOrigin::ValueChange if event.is_single_line() => {
                return self.refresh_line(surface, tree, registry, event);
            }
            _ => {}
        }

        let span = event.normalized(last_line(surface));
        let mut report = ReconcileReport { span: Some(span), ..ReconcileReport::default() };
        self.reconcile_span(surface, tree, registry, span, &mut report);

        tracing::debug!(
            from = span.from,
            to = span.to,
            origin = %event.origin,
            created = report.created.len(),
            destroyed = report.destroyed.len(),
            "reconciled"
        );
        report
    }

    /// Drops every annotation and rebuilds them over the whole document.
    pub fn reset(
        &mut self,
        surface: &mut dyn TextSurface,
        tree: &SceneTree,
        registry: &Registry,
    ) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        let mut anchors = self.annotations.keys().copied().collect::<Vec<_>>();
        anchors.sort_unstable();
        for anchor in anchors {
            self.destroy(surface, anchor, &mut report);
        }

        let span = LineSpan { from: 0, to: last_line(surface) };
        report.span = Some(span);
        self.reconcile_span(surface, tree, registry, span, &mut report);

        tracing::debug!(
            lines = span.to + 1,
            created = report.created.len(),
            destroyed = report.destroyed.len(),
            "reset annotations"
        );
        report
    }

    /// Writes `value` over the node the annotation at `anchor` edits.
    ///
    /// The returned event should be fed back into [`Self::reconcile`] once the
    /// tree has been rebuilt.
    pub fn set_value(
        &self,
        surface: &mut dyn TextSurface,
        tree: &SceneTree,
        registry: &Registry,
        anchor: AnchorId,
        value: &str,
    ) -> Option<EditEvent> {
        let annotation = self.annotations.get(&anchor)?;
        let offset = surface.anchor_offset(anchor)?;
        let desired = desired_at(tree, registry, surface.text(), offset)?;
        if desired.entry != annotation.entry() || desired.address != *annotation.address() {
            return None;
        }

        let range = tree.range(desired.node);
        Some(surface.replace(range, value, EditOrigin::ValueChange))
    }

    /// A widget wrote to its own line: update values without rebuilding.
    fn refresh_line(
        &mut self,
        surface: &mut dyn TextSurface,
        tree: &SceneTree,
        registry: &Registry,
        event: &EditEvent,
    ) -> ReconcileReport {
        let span = event.normalized(last_line(surface));
        let mut report = ReconcileReport { span: Some(span), ..ReconcileReport::default() };

        for desired in desired_in_lines(surface, tree, registry, span) {
            let Some(anchor) = surface.anchor_at(desired.offset) else {
                self.create(surface, tree, registry, desired, &mut report);
                continue;
            };
            let Some(annotation) = self.annotations.get_mut(&anchor) else {
                continue;
            };

            if annotation.entry() == desired.entry && *annotation.address() == desired.address {
                if annotation.value() != desired.value {
                    annotation.refresh(&desired.value);
                    tracing::trace!(id = annotation.id().0, value = %desired.value, "refreshed");
                    report.refreshed.push(annotation.id());
                }
            } else {
                self.destroy(surface, anchor, &mut report);
                self.create(surface, tree, registry, desired, &mut report);
            }
        }

        tracing::debug!(line = span.from, refreshed = report.refreshed.len(), "refreshed line");
        report
    }

    fn reconcile_span(
        &mut self,
        surface: &mut dyn TextSurface,
        tree: &SceneTree,
        registry: &Registry,
        span: LineSpan,
        report: &mut ReconcileReport,
    ) {
        let mut kept = FxHashSet::default();
        for anchor in surface.anchors_in_lines(span.from, span.to) {
            let Some(annotation) = self.annotations.get(&anchor) else {
                continue;
            };

            let still_wanted = surface
                .anchor_offset(anchor)
                .filter(|offset| !kept.contains(offset))
                .and_then(|offset| desired_at(tree, registry, surface.text(), offset))
                .is_some_and(|desired| desired.is_shown_by(annotation));

            if still_wanted {
                kept.extend(surface.anchor_offset(anchor));
            } else {
                self.destroy(surface, anchor, report);
            }
        }

        // Nodes starting in the span may be anchored past it, like a block
        // sequence ending a few lines below the edited item.
        for desired in desired_in_lines(surface, tree, registry, span) {
            let Some(anchor) = surface.anchor_at(desired.offset) else {
                self.create(surface, tree, registry, desired, report);
                continue;
            };
            let outdated = self
                .annotations
                .get(&anchor)
                .is_some_and(|annotation| !desired.is_shown_by(annotation));
            if outdated {
                self.destroy(surface, anchor, report);
                self.create(surface, tree, registry, desired, report);
            }
        }
    }

    fn create(
        &mut self,
        surface: &mut dyn TextSurface,
        tree: &SceneTree,
        registry: &Registry,
        desired: Desired,
        report: &mut ReconcileReport,
    ) {
        let Some(entry) = registry.get(desired.entry) else {
            return;
        };

        let Desired { offset, node, entry: index, address, value } = desired;
        let target = WidgetTarget {
            tree,
            node,
            entry,
            address: &address,
            value: &value,
            options: Registry::resolve_options(tree, entry),
        };
        let widget = self.factory.create(&target);

        let id = AnnotationId(self.next_id);
        self.next_id += 1;

        tracing::trace!(id = id.0, %address, kind = %entry.kind(), "created annotation");
        let mut annotation = Annotation::new(id, index, entry.kind(), address, value, widget);
        let anchor = surface.insert_anchor(offset);
        annotation.attach(anchor);

        self.annotations.insert(anchor, annotation);
        report.created.push(id);
    }

    fn destroy(
        &mut self,
        surface: &mut dyn TextSurface,
        anchor: AnchorId,
        report: &mut ReconcileReport,
    ) {
        let Some(mut annotation) = self.annotations.remove(&anchor) else {
            return;
        };

        annotation.mark_stale();
        surface.remove_anchor(anchor);
        annotation.destroy();

        tracing::trace!(
            id = annotation.id().0,
            address = %annotation.address(),
            "destroyed annotation"
        );
        report.destroyed.push(annotation.id());
    }
}

impl std::fmt::Debug for ReconcileContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReconcileContext")
            .field("annotations", &self.annotations())
            .field("next_id", &self.next_id)
            .finish_non_exhaustive()
    }
}

fn last_line(surface: &dyn TextSurface) -> u32 {
    surface.line_count().saturating_sub(1)
}

/// Annotations wanted by the nodes starting on the lines of `span`, one per
/// anchor offset, first match wins. Blank lines hold no node starts, so one
/// range query covers the whole span.
fn desired_in_lines(
    surface: &dyn TextSurface,
    tree: &SceneTree,
    registry: &Registry,
    span: LineSpan,
) -> Vec<Desired> {
    let (Some(first), Some(last)) = (surface.line_range(span.from), surface.line_range(span.to))
    else {
        return Vec::new();
    };

    let mut desired = Vec::new();
    let mut offsets = FxHashSet::default();
    for node in nodes_in_range(tree, first.cover(last)) {
        let Some(wanted) = desired_for(tree, registry, surface.text(), node) else {
            continue;
        };
        if offsets.insert(wanted.offset) {
            desired.push(wanted);
        }
    }

    desired
}

/// The annotation wanted at `offset`, checking the outermost node ending
/// there first so it agrees with [`desired_in_lines`].
fn desired_at(
    tree: &SceneTree,
    registry: &Registry,
    text: &str,
    offset: TextSize,
) -> Option<Desired> {
    let innermost = node_at_offset(tree, offset)?;
    let ending_here =
        tree.ancestors(innermost).filter(|&id| tree.range(id).end() == offset).collect::<Vec<_>>();

    ending_here
        .into_iter()
        .rev()
        .filter_map(|node| desired_for(tree, registry, text, node))
        .find(|desired| desired.offset == offset)
}

fn desired_for(tree: &SceneTree, registry: &Registry, text: &str, node: NodeId) -> Option<Desired> {
    let bears_value = match tree.kind(node) {
        NodeKind::Scalar => !tree.is_key(node),
        NodeKind::Sequence => true,
        NodeKind::Map | NodeKind::Mapping | NodeKind::AnchorRef => false,
    };
    if !bears_value {
        return None;
    }

    let (entry, registry_entry) = registry.find(tree, node)?;
    let anchored = anchor_node(tree, node, registry_entry)?;
    Some(Desired {
        offset: tree.range(anchored).end(),
        node: anchored,
        entry,
        address: address_for_node(tree, anchored),
        value: node_value(tree, text, anchored),
    })
}

/// The node an annotation for `node` sits on. Scalars of a collapsing entry
/// share their sequence's annotation.
fn anchor_node(tree: &SceneTree, node: NodeId, entry: &RegistryEntry) -> Option<NodeId> {
    match tree.kind(node) {
        NodeKind::Scalar => match tree.parent(node) {
            Some(parent)
                if entry.collapses_sequences() && tree.kind(parent) == NodeKind::Sequence =>
            {
                Some(parent)
            }
            _ => Some(node),
        },
        NodeKind::Sequence => entry.collapses_sequences().then_some(node),
        NodeKind::Map | NodeKind::Mapping | NodeKind::AnchorRef => None,
    }
}

/// Decoded text of a scalar, source text of anything else.
fn node_value(tree: &SceneTree, text: &str, node: NodeId) -> String {
    if let Some(value) = tree.scalar(node) {
        return value.to_owned();
    }

    let range = tree.range(node);
    text.get(usize::from(range.start())..usize::from(range.end())).unwrap_or_default().to_owned()
}
