use crate::SceneTree;
use crate::node::NodeId;

pub struct Preorder<'a> {
    tree: &'a SceneTree,
    start: NodeId,
    next: Option<WalkEvent>,
    skip_subtree: bool,
}

impl<'a> Preorder<'a> {
    pub fn new(tree: &'a SceneTree, start: NodeId) -> Self {
        Self { tree, start, next: Some(WalkEvent::Enter(start)), skip_subtree: false }
    }

    pub fn skip_subtree(&mut self) {
        self.skip_subtree = true;
    }
}

impl Iterator for Preorder<'_> {
    type Item = WalkEvent;

    fn next(&mut self) -> Option<Self::Item> {
        if self.skip_subtree {
            self.next = self.next.take().map(|next| match next {
                WalkEvent::Enter(first_child) => match self.tree.parent(first_child) {
                    Some(parent) => WalkEvent::Leave(parent),
                    None => WalkEvent::Leave(first_child),
                },
                WalkEvent::Leave(parent) => WalkEvent::Leave(parent),
            });
            self.skip_subtree = false;
        }

        let next = self.next.take();

        self.next = next.and_then(|event| {
            Some(match event {
                WalkEvent::Enter(node) => match self.tree.first_child(node) {
                    Some(child) => WalkEvent::Enter(child),
                    None => WalkEvent::Leave(node),
                },
                WalkEvent::Leave(node) => {
                    if node == self.start {
                        return None;
                    }

                    match self.tree.next_sibling(node) {
                        Some(sibling) => WalkEvent::Enter(sibling),
                        None => WalkEvent::Leave(self.tree.parent(node)?),
                    }
                }
            })
        });

        next
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkEvent {
    Enter(NodeId),
    Leave(NodeId),
}
