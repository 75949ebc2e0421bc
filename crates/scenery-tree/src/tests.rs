use text_size::{TextRange, TextSize};

use crate::{NodeData, NodeId, NodeKind, ScalarStyle, SceneTree, TreeBuilder};

fn range(start: u32, end: u32) -> TextRange {
    TextRange::new(TextSize::new(start), TextSize::new(end))
}

fn scalar(builder: &mut TreeBuilder, value: &str, start: u32) -> NodeId {
    let data = NodeData::Scalar { value: value.to_owned(), style: ScalarStyle::Plain };
    builder.alloc(data, range(start, start + value.len() as u32))
}

/// a: &x [1, 2]
/// b: *x
fn sample() -> (SceneTree, [NodeId; 4]) {
    let mut builder = TreeBuilder::new();

    let key_a = scalar(&mut builder, "a", 0);
    let one = scalar(&mut builder, "1", 7);
    let two = scalar(&mut builder, "2", 10);
    let seq = builder.alloc(
        NodeData::Sequence { items: vec![Some(one), Some(two)], flow: true },
        range(6, 12),
    );
    builder.set_anchor(seq, "x");
    let mapping_a = builder.alloc(NodeData::Mapping { key: key_a, value: Some(seq) }, range(0, 12));

    let key_b = scalar(&mut builder, "b", 13);
    let alias =
        builder.alloc(NodeData::AnchorRef { name: "x".to_owned(), target: seq }, range(16, 18));
    let mapping_b =
        builder.alloc(NodeData::Mapping { key: key_b, value: Some(alias) }, range(13, 18));

    let map = builder
        .alloc(NodeData::Map { mappings: vec![mapping_a, mapping_b], flow: false }, range(0, 18));
    (builder.finish(Some(map)), [map, seq, two, alias])
}

#[test]
fn parents_are_assigned_on_alloc() {
    let (tree, [map, seq, two, _]) = sample();

    assert_eq!(tree.ancestors(two).collect::<Vec<_>>().len(), 4);
    assert_eq!(tree.ancestors(two).last(), Some(map));
    assert_eq!(tree.parent(two), Some(seq));
    assert_eq!(tree.parent(map), None);
}

#[test]
fn keys_and_aliases() {
    let (tree, [map, seq, _, alias]) = sample();

    let mapping_a = tree.first_child(map).unwrap();
    let key = tree.first_child(mapping_a).unwrap();
    assert!(tree.is_key(key));
    assert!(!tree.is_key(seq));
    assert_eq!(tree.mapping_key(mapping_a), Some("a"));
    assert_eq!(tree.resolve(alias), seq);
    assert_eq!(tree[seq].anchor(), Some("x"));
    assert_eq!(tree.kind(alias), NodeKind::AnchorRef);
}

#[test]
fn siblings_and_children_by_offset() {
    let (tree, [map, seq, two, _]) = sample();
    let [mapping_a, mapping_b] = tree.children(map) else { panic!("{:?}", tree.children(map)) };
    let (mapping_a, mapping_b) = (*mapping_a, *mapping_b);

    assert_eq!(tree.next_sibling(mapping_a), Some(mapping_b));
    assert_eq!(tree.next_sibling(mapping_b), None);
    assert_eq!(tree.next_sibling(tree.first_child(mapping_a).unwrap()), Some(seq));
    assert_eq!(tree.next_sibling(map), None);

    assert_eq!(tree.child_at(map, 12.into()), Some(mapping_a));
    assert_eq!(tree.child_at(map, 13.into()), Some(mapping_b));
    assert_eq!(tree.child_at(seq, 9.into()), None);
    assert_eq!(tree.child_at(seq, 11.into()), Some(two));

    assert_eq!(tree.children_in(map, range(12, 12)), [mapping_a]);
    assert_eq!(tree.children_in(map, range(12, 13)), [mapping_a, mapping_b]);
    assert_eq!(tree.children_in(seq, range(8, 8)).len(), 1);
    assert!(tree.children_in(seq, range(9, 9)).is_empty());
}

#[test]
fn descendants_visit_parents_first() {
    let (tree, _) = sample();

    let ids = tree.descendants().collect::<Vec<_>>();
    assert_eq!(ids.len(), tree.len());
    for id in ids {
        if let Some(parent) = tree.parent(id) {
            assert!(tree.range(parent).contains_range(tree.range(id)));
        }
    }
}

#[test]
fn outline() {
    let (tree, _) = sample();

    assert_eq!(
        tree.to_string(),
        "\
MAP@0..18
  MAPPING@0..12
    SCALAR@0..1 \"a\"
    SEQUENCE@6..12 &x
      SCALAR@7..8 \"1\"
      SCALAR@10..11 \"2\"
  MAPPING@13..18
    SCALAR@13..14 \"b\"
    ANCHOR_REF@16..18 *x -> SEQUENCE@6..12
"
    );
}
