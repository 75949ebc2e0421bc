use scenery_query::Address;
use scenery_registry::{AnnotationKind, RegistryEntry};
use scenery_tree::{NodeId, SceneTree};

/// Everything a widget is built from.
pub struct WidgetTarget<'a> {
    pub tree: &'a SceneTree,
    /// The scalar or collapsed sequence the widget edits.
    pub node: NodeId,
    pub entry: &'a RegistryEntry,
    pub address: &'a Address,
    pub value: &'a str,
    /// Dropdown choices; empty for other kinds.
    pub options: Vec<String>,
}

impl WidgetTarget<'_> {
    pub fn kind(&self) -> AnnotationKind {
        self.entry.kind()
    }
}

/// The UI resource owned by an annotation. Dropping it releases the resource.
pub trait AnnotationWidget {
    /// The node's value changed without the annotation being rebuilt.
    fn refresh(&mut self, value: &str);

    /// Called once before the annotation is dropped.
    fn release(&mut self) {}
}

pub trait WidgetFactory {
    fn create(&mut self, target: &WidgetTarget<'_>) -> Box<dyn AnnotationWidget>;
}
