use std::cell::RefCell;
use std::rc::Rc;

use scenery_parse::parse;
use scenery_query::{Address, address_for_node, node_at_address, node_at_offset};
use scenery_registry::{AnnotationKind, Registry};
use scenery_tree::{SceneTree, TextRange, TextSize};

use crate::{
    AnchorId, AnnotationId, AnnotationState, AnnotationWidget, EditEvent, EditOrigin, LineSpan,
    MemorySurface, ReconcileContext, ReconcileReport, TextSurface, WidgetFactory, WidgetTarget,
};

#[derive(Debug, Default)]
struct Log {
    created: Vec<(AnnotationKind, String, String)>,
    options: Vec<Vec<String>>,
    refreshed: Vec<String>,
    released: usize,
}

type SharedLog = Rc<RefCell<Log>>;

struct Recorder(SharedLog);

impl WidgetFactory for Recorder {
    fn create(&mut self, target: &WidgetTarget<'_>) -> Box<dyn AnnotationWidget> {
        let mut log = self.0.borrow_mut();
        log.created.push((target.kind(), target.address.to_string(), target.value.to_owned()));
        log.options.push(target.options.clone());
        Box::new(Widget(self.0.clone()))
    }
}

struct Widget(SharedLog);

impl AnnotationWidget for Widget {
    fn refresh(&mut self, value: &str) {
        self.0.borrow_mut().refreshed.push(value.to_owned());
    }

    fn release(&mut self) {
        self.0.borrow_mut().released += 1;
    }
}

struct Harness {
    surface: MemorySurface,
    registry: Registry,
    context: ReconcileContext,
    log: SharedLog,
}

impl Harness {
    fn new(text: &str, registry: Registry) -> Self {
        let log = SharedLog::default();
        let context = ReconcileContext::new(Recorder(log.clone()));
        Self { surface: MemorySurface::new(text), registry, context, log }
    }

    fn builtin(text: &str) -> Self {
        Self::new(text, Registry::builtin())
    }

    fn tree(&self) -> SceneTree {
        parse(self.surface.text())
    }

    fn reset(&mut self) -> ReconcileReport {
        let tree = self.tree();
        self.context.reset(&mut self.surface, &tree, &self.registry)
    }

    fn reconcile(&mut self, event: &EditEvent) -> ReconcileReport {
        let tree = self.tree();
        self.context.reconcile(&mut self.surface, &tree, &self.registry, event)
    }

    fn edit(&mut self, start: u32, end: u32, text: &str, origin: EditOrigin) -> ReconcileReport {
        let range = TextRange::new(start.into(), end.into());
        let event = self.surface.replace(range, text, origin);
        self.reconcile(&event)
    }

    fn anchor_of(&self, id: AnnotationId) -> AnchorId {
        self.context
            .annotations()
            .into_iter()
            .find(|annotation| annotation.id() == id)
            .and_then(|annotation| annotation.anchor())
            .unwrap()
    }

    fn lines_of(&self, created: &[AnnotationId]) -> Vec<u32> {
        created
            .iter()
            .map(|&id| {
                let offset = self.surface.anchor_offset(self.anchor_of(id)).unwrap();
                self.surface.line_of(offset)
            })
            .collect()
    }

    /// Every live annotation sits on a node with the address it was built for.
    fn assert_anchored_on_own_nodes(&self) {
        let tree = self.tree();
        for annotation in self.context.annotations() {
            let offset = self.surface.anchor_offset(annotation.anchor().unwrap()).unwrap();
            let node = node_at_offset(&tree, offset).unwrap();
            assert_eq!(&address_for_node(&tree, node), annotation.address(), "{annotation:?}");
        }
    }

    fn ids(&self) -> Vec<u32> {
        self.context.annotations().iter().map(|annotation| annotation.id().0).collect()
    }
}

fn ids(ids: &[u32]) -> Vec<AnnotationId> {
    ids.iter().copied().map(AnnotationId).collect()
}

#[test]
fn reset_annotates_registered_values() {
    let mut harness = Harness::builtin("visible: true\norder: 1\nname: roads\n");
    let report = harness.reset();

    assert_eq!(report.created, ids(&[0, 1]));
    assert_eq!(report.span, Some(LineSpan { from: 0, to: 3 }));

    let log = harness.log.borrow();
    assert_eq!(
        log.created,
        [
            (AnnotationKind::Boolean, "visible".to_owned(), "true".to_owned()),
            (AnnotationKind::Number, "order".to_owned(), "1".to_owned()),
        ]
    );

    let annotations = harness.context.annotations();
    assert!(annotations.iter().all(|annotation| annotation.state() == AnnotationState::Attached));
    let order = annotations[1];
    assert_eq!(harness.surface.anchor_offset(order.anchor().unwrap()), Some(TextSize::from(22)));
}

#[test]
fn color_sequence_gets_one_annotation() {
    let text = "layers:\n  earth:\n    draw:\n      color: [0.5, 0.5, 0.5]\n      order: 1\n";
    let registry = Registry::from_json(
        r#"[
            { "matchAddress": "^layers:earth:draw:color$", "type": "color" },
            { "matchKey": "order", "type": "number" }
        ]"#,
    )
    .unwrap();
    let mut harness = Harness::new(text, registry);
    harness.reset();

    let tree = harness.tree();
    let mapping = node_at_address(&tree, &Address::parse("layers:earth:draw:color")).unwrap();
    let sequence = tree.mapping_value(mapping).unwrap();

    let colors = harness
        .context
        .annotations()
        .into_iter()
        .filter(|annotation| annotation.kind() == AnnotationKind::Color)
        .collect::<Vec<_>>();
    assert_eq!(colors.len(), 1);

    let color = colors[0];
    assert_eq!(color.address().to_string(), "layers:earth:draw:color");
    assert_eq!(color.value(), "[0.5, 0.5, 0.5]");
    assert_eq!(
        harness.surface.anchor_offset(color.anchor().unwrap()),
        Some(tree.range(sequence).end())
    );
    assert_eq!(harness.context.len(), 2);
}

#[test]
fn block_sequence_collapses_under_vector() {
    let mut harness = Harness::builtin("offset:\n  - 1\n  - 2\n");
    let report = harness.reset();

    assert_eq!(report.created.len(), 1);
    let annotation = harness.context.annotations()[0];
    assert_eq!(annotation.kind(), AnnotationKind::Vector);
    assert_eq!(annotation.address().to_string(), "offset");
}

#[test]
fn delete_only_touches_its_first_line() {
    let text = (0..10).map(|n| format!("w{n}: {n}")).collect::<Vec<_>>().join("\n");
    let registry = Registry::from_json(r#"[{ "matchAddress": "^w", "type": "number" }]"#).unwrap();
    let mut harness = Harness::new(&text, registry);
    assert_eq!(harness.reset().created.len(), 10);

    // Select from the value of line 2 up to the value of line 4 and delete.
    let event = {
        let range = TextRange::new(16.into(), 28.into());
        harness.surface.replace(range, "", EditOrigin::from("delete"))
    };
    assert_eq!(event.from_line, 2);
    assert_eq!(event.to_line, 4);
    assert_eq!(harness.surface.line_text(2), Some("w2: 4"));

    let report = harness.reconcile(&event);
    assert_eq!(report.span, Some(LineSpan { from: 2, to: 2 }));
    // The anchor of `w4: 4` slid onto `w2: 4`; same value, different node.
    assert_eq!(report.destroyed, ids(&[2, 3, 4]));
    assert_eq!(report.created, ids(&[10]));

    assert_eq!(harness.ids(), [0, 1, 5, 6, 7, 8, 9, 10]);
    assert_eq!(harness.log.borrow().released, 3);
    assert_eq!(
        harness.log.borrow().created.last(),
        Some(&(AnnotationKind::Number, "w2".to_owned(), "4".to_owned()))
    );
    harness.assert_anchored_on_own_nodes();
}

#[test]
fn paste_and_undo_cover_the_moved_lines() {
    let mut harness = Harness::builtin("order: 1\nwidth: 2\n");
    harness.reset();

    let report = harness.edit(9, 9, "visible: true\ncap: round\n", EditOrigin::from("paste"));
    assert_eq!(report.span, Some(LineSpan { from: 1, to: 3 }));
    assert_eq!(report.created, ids(&[2, 3]));
    assert!(report.destroyed.is_empty());
    assert_eq!(harness.lines_of(&report.created), [1, 2]);
    harness.assert_anchored_on_own_nodes();

    let report = harness.edit(9, 34, "", EditOrigin::from("undo"));
    assert_eq!(harness.surface.text(), "order: 1\nwidth: 2\n");
    assert_eq!(report.span, Some(LineSpan { from: 1, to: 1 }));
    assert_eq!(report.destroyed, ids(&[2, 3]));
    assert!(report.created.is_empty());
    assert_eq!(harness.ids(), [0, 1]);
    harness.assert_anchored_on_own_nodes();
}

#[test]
fn inner_item_edit_refreshes_block_sequence() {
    let mut harness = Harness::builtin("color:\n  - 1\n  - 2\n  - 3\n");
    harness.reset();
    assert_eq!(harness.context.len(), 1);

    // The annotation is anchored on the last item's line, below the edit.
    let report = harness.edit(17, 18, "5", EditOrigin::Input);
    assert_eq!(report.span, Some(LineSpan { from: 2, to: 2 }));
    assert_eq!(report.destroyed, ids(&[0]));
    assert_eq!(report.created, ids(&[1]));

    let annotation = harness.context.annotations()[0];
    assert_eq!(annotation.address().to_string(), "color");
    assert!(annotation.value().ends_with("- 5\n  - 3"), "{:?}", annotation.value());
    harness.assert_anchored_on_own_nodes();
}

#[test]
fn value_change_keeps_annotation_identity() {
    let mut harness = Harness::builtin("visible: true\norder: 1\n");
    harness.reset();

    let anchor = harness.anchor_of(AnnotationId(1));
    let tree = harness.tree();
    let event = harness
        .context
        .set_value(&mut harness.surface, &tree, &harness.registry, anchor, "5")
        .unwrap();
    assert_eq!(event, EditEvent::new(1, 1, EditOrigin::ValueChange));
    assert_eq!(harness.surface.text(), "visible: true\norder: 5\n");

    let report = harness.reconcile(&event);
    assert_eq!(report.refreshed, ids(&[1]));
    assert!(report.created.is_empty());
    assert!(report.destroyed.is_empty());

    let annotation = harness.context.get(anchor).unwrap();
    assert_eq!(annotation.id(), AnnotationId(1));
    assert_eq!(annotation.value(), "5");
    assert_eq!(annotation.state(), AnnotationState::Attached);

    let log = harness.log.borrow();
    assert_eq!(log.refreshed, ["5"]);
    assert_eq!(log.created.len(), 2);
    assert_eq!(log.released, 0);
}

#[test]
fn typing_rebuilds_changed_annotation() {
    let mut harness = Harness::builtin("visible: true\norder: 1\n");
    harness.reset();

    // Typing appends to the value; the stale annotation is replaced.
    let report = harness.edit(22, 22, "0", EditOrigin::Input);
    assert_eq!(report.destroyed, ids(&[1]));
    assert_eq!(report.created, ids(&[2]));
    assert_eq!(harness.context.annotations()[1].value(), "10");
    assert_eq!(harness.context.annotations()[0].id(), AnnotationId(0));
}

#[test]
fn reconcile_is_idempotent() {
    let text = "layers:\n  earth:\n    draw:\n      color: [0.5, 0.5, 0.5]\n      order: 1\n      visible: true\n";
    let mut harness = Harness::builtin(text);
    harness.reset();
    let before = harness.ids();

    let whole = EditEvent::new(0, 6, EditOrigin::Input);
    assert!(harness.reconcile(&whole).is_noop());
    assert!(harness.reconcile(&whole).is_noop());
    assert_eq!(harness.ids(), before);
}

#[test]
fn blank_lines_are_skipped() {
    let mut harness = Harness::builtin("order: 1\n\n\nwidth: 2\n");
    harness.reset();

    let report = harness.reconcile(&EditEvent::new(1, 2, EditOrigin::Input));
    assert!(report.is_noop());
    assert_eq!(harness.context.len(), 2);
}

#[test]
fn set_value_origin_resets_everything() {
    let mut harness = Harness::builtin("order: 1\nwidth: 2\n");
    harness.reset();

    let event = harness.surface.set_text("visible: false\n");
    assert_eq!(event.origin, EditOrigin::SetValue);
    let report = harness.reconcile(&event);

    assert_eq!(report.destroyed, ids(&[0, 1]));
    assert_eq!(report.created, ids(&[2]));
    assert_eq!(harness.context.annotations()[0].kind(), AnnotationKind::Boolean);
    assert_eq!(harness.log.borrow().released, 2);
}

#[test]
fn dropdown_options_follow_the_document() {
    let text = "styles:\n  dashed:\n    order: 1\n  dotted:\n    order: 2\nroad:\n  style: dotted\n";
    let mut harness = Harness::builtin(text);
    harness.reset();

    let log = harness.log.borrow();
    let (kind, address, value) = log.created.last().unwrap();
    assert_eq!(*kind, AnnotationKind::Dropdown);
    assert_eq!(address, "road:style");
    assert_eq!(value, "dotted");
    assert_eq!(log.options.last().unwrap(), &["dashed", "dotted"]);
}

#[test]
fn occupied_anchors_are_left_alone() {
    let mut harness = Harness::builtin("order: 1\n");
    let foreign = harness.surface.insert_anchor(8.into());

    let report = harness.reset();
    assert!(report.created.is_empty());
    assert_eq!(harness.surface.anchor_at(8.into()), Some(foreign));
}

#[test]
fn set_value_needs_a_live_annotation() {
    let mut harness = Harness::builtin("order: 1\n");
    let tree = harness.tree();
    let value = harness.context.set_value(
        &mut harness.surface,
        &tree,
        &harness.registry,
        AnchorId(7),
        "2",
    );
    assert_eq!(value, None);
    assert_eq!(harness.surface.text(), "order: 1\n");
}
