use camino::Utf8PathBuf;
use salsa::{Accumulator as _, Database};
pub use scenery_errors::Diagnostic;
pub use scenery_inputs::Document;
pub use scenery_parse::DocumentParse;

#[salsa::db]
#[derive(Default, Clone)]
pub struct RootDatabase {
    storage: salsa::Storage<Self>,
}

#[salsa::db]
impl Database for RootDatabase {}

impl RootDatabase {
    pub fn open(&self, path: impl Into<Utf8PathBuf>, text: String) -> Document {
        Document::new(self, path.into(), text)
    }
}

#[salsa::tracked]
pub fn check_document(db: &dyn Database, document: Document) {
    for error in document.tree(db).errors() {
        Diagnostic::new(error.severity, error.message.clone(), error.range).accumulate(db);
    }
}

/// Syntax problems of `document`, in source order of discovery.
pub fn diagnostics(db: &dyn Database, document: Document) -> Vec<&Diagnostic> {
    check_document::accumulated::<Diagnostic>(db, document)
}
