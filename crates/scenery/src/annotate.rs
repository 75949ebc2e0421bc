use scenery_inputs::LineIndex;
use scenery_reconcile::{
    AnnotationWidget, MemorySurface, ReconcileContext, WidgetFactory, WidgetTarget,
};
use scenery_registry::Registry;
use scenery_tree::SceneTree;

/// Prints each annotation as it is created.
struct Printer {
    index: LineIndex,
}

/// Stands in for an editor widget.
struct Label;

impl AnnotationWidget for Label {
    fn refresh(&mut self, _value: &str) {}
}

impl WidgetFactory for Printer {
    fn create(&mut self, target: &WidgetTarget<'_>) -> Box<dyn AnnotationWidget> {
        let end = target.tree.range(target.node).end();
        let position = self.index.line_col(end);

        let mut line = format!(
            "{}:{} {} {} = {}",
            position.line + 1,
            position.col + 1,
            target.kind(),
            target.address,
            target.value
        );
        if !target.options.is_empty() {
            line.push_str(&format!(" [{}]", target.options.join(", ")));
        }
        println!("{line}");

        Box::new(Label)
    }
}

pub(crate) fn run(text: &str, tree: &SceneTree, registry: &Registry) {
    let printer = Printer { index: LineIndex::new(text) };
    let mut surface = MemorySurface::new(text);
    let mut context = ReconcileContext::new(printer);

    let report = context.reset(&mut surface, tree, registry);
    tracing::info!(annotations = report.created.len(), "annotated document");
}
