//! Error-tolerant parser for scene documents.
//!
//! Produces a [`SceneTree`] for any input: malformed regions are reported in
//! [`SceneTree::errors`] and parsing resumes at the next line the enclosing
//! block owns.

use salsa::Database;
use scenery_inputs::Document;
use scenery_tree::SceneTree;

mod grammar;
mod parser;

pub fn parse(text: &str) -> SceneTree {
    let mut parser = parser::Parser::new(text);
    let root = grammar::document(&mut parser);
    let tree = parser.finish(root);
    tracing::debug!(nodes = tree.len(), errors = tree.errors().len(), "parsed document");
    tree
}

pub trait DocumentParse {
    fn tree(self, db: &dyn Database) -> &SceneTree;
}

#[salsa::tracked]
impl DocumentParse for Document {
    #[salsa::tracked(returns(ref), no_eq)]
    fn tree(self, db: &dyn Database) -> SceneTree {
        parse(self.text(db))
    }
}
