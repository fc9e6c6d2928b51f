//! Tests for the attribute, class, child-copy and typed-leaf mutators

use xdom::{Document, Error, InsertMode, NodeType, SimpleView, TreeView};

#[test]
fn test_copy_attributes_keeps_existing_unless_overwriting() {
    let doc = Document::parse(r#"<root><s a="1" b="2"/><t a="0"/><u a="0"/></root>"#).unwrap();
    let root = doc.root();
    let source = root.child("s").unwrap();

    let kept = root.child("t").unwrap();
    kept.copy_attributes_from(&source, false).unwrap();
    assert_eq!(kept.attr("a").as_deref(), Some("0"));
    assert_eq!(kept.attr("b").as_deref(), Some("2"));

    let replaced = root.child("u").unwrap();
    replaced.copy_attributes_from(&source, true).unwrap();
    assert_eq!(replaced.attr("a").as_deref(), Some("1"));
    assert_eq!(replaced.attr("b").as_deref(), Some("2"));
}

#[test]
fn test_copy_attributes_across_documents() {
    let doc = Document::parse("<root/>").unwrap();
    let other = Document::parse(r#"<s xmlns:x="urn:x" x:lang="en" n="1"/>"#).unwrap();

    doc.root().copy_attributes_from(&other.root(), false).unwrap();

    let raw = doc.root().raw();
    assert_eq!(raw.get_attribute_ns(Some("urn:x"), "lang").as_deref(), Some("en"));
    assert_eq!(raw.get_attribute("n").as_deref(), Some("1"));
}

#[test]
fn test_set_attributes() {
    let doc = Document::parse("<root/>").unwrap();
    let root = doc.root();

    root.set_attributes(&[("a", "1"), ("b", "2")], None).unwrap();
    root.set_attributes(&[("p:k", "v")], Some("urn:p")).unwrap();

    assert_eq!(root.attr("a").as_deref(), Some("1"));
    assert_eq!(root.attr("b").as_deref(), Some("2"));
    assert_eq!(
        root.raw().get_attribute_ns(Some("urn:p"), "k").as_deref(),
        Some("v")
    );
}

#[test]
fn test_clone_children_deep_and_shallow() {
    let doc = Document::parse("<root><s><c><g/></c>t</s><deep/><shallow/></root>").unwrap();
    let root = doc.root();
    let source = root.child("s").unwrap();

    let deep = root.child("deep").unwrap();
    deep.clone_children_from(&source, true).unwrap();
    assert_eq!(deep.outer_markup().unwrap(), "<deep><c><g/></c>t</deep>");

    let shallow = root.child("shallow").unwrap();
    shallow.clone_children_from(&source, false).unwrap();
    assert_eq!(shallow.outer_markup().unwrap(), "<shallow><c/>t</shallow>");

    // The source keeps its children
    assert_eq!(source.outer_markup().unwrap(), "<s><c><g/></c>t</s>");
}

#[test]
fn test_clone_children_from_self_uses_a_snapshot() {
    let doc = Document::parse("<root><a><b/></a></root>").unwrap();
    let a = doc.root().child("a").unwrap();

    a.clone_children_from(&a, true).unwrap();
    assert_eq!(a.outer_markup().unwrap(), "<a><b/><b/></a>");
}

#[test]
fn test_clone_children_from_another_document() {
    let doc = Document::parse("<root/>").unwrap();
    let other = Document::parse("<s><x>1</x><y/></s>").unwrap();

    doc.root().clone_children_from(&other.root(), true).unwrap();
    assert_eq!(doc.root().outer_markup().unwrap(), "<root><x>1</x><y/></root>");
    assert!(doc.root().element_children()[0].document().same(&doc));
}

#[test]
fn test_move_to_within_a_document() {
    let doc = Document::parse("<root><a><x/></a><b/></root>").unwrap();
    let root = doc.root();
    let x = root.child("a").unwrap().child("x").unwrap();
    let b = root.child("b").unwrap();

    let moved = x.move_to(&b).unwrap();
    assert_eq!(moved.name(), "x");
    assert_eq!(root.outer_markup().unwrap(), "<root><a/><b><x/></b></root>");
}

#[test]
fn test_move_to_another_document() {
    let doc = Document::parse("<root><x k=\"1\"/></root>").unwrap();
    let target = Document::parse("<target/>").unwrap();
    let x = doc.root().child("x").unwrap();

    let moved = x.move_to(&target.root()).unwrap();
    assert!(moved.document().same(&target));
    assert_eq!(doc.root().outer_markup().unwrap(), "<root/>");
    assert_eq!(
        target.root().outer_markup().unwrap(),
        r#"<target><x k="1"/></target>"#
    );
}

#[test]
fn test_root_cannot_be_moved() {
    let doc = Document::parse("<root><a/></root>").unwrap();
    let root = doc.root();
    let a = root.child("a").unwrap();

    let err = root.move_to(&a).unwrap_err();
    assert!(matches!(err, Error::InvalidStructuralOperation(_)));
    assert_eq!(root.outer_markup().unwrap(), "<root><a/></root>");
}

#[test]
fn test_rejected_move_leaves_the_tree_unchanged() {
    let doc = Document::parse("<r><a><b/></a></r>").unwrap();
    let root = doc.root();
    let a = root.child("a").unwrap();
    let b = a.child("b").unwrap();

    let err = a.move_to(&b).unwrap_err();
    assert!(matches!(err, Error::InvalidStructuralOperation(_)));
    assert_eq!(root.outer_markup().unwrap(), "<r><a><b/></a></r>");

    let text = b.insert_text("t", None).unwrap();
    assert!(a.move_to(&text).is_err());
    assert_eq!(root.outer_markup().unwrap(), "<r><a><b>t</b></a></r>");
}

#[test]
fn test_class_list() {
    let doc = Document::parse("<root><p/></root>").unwrap();
    let p = doc.root().child("p").unwrap();

    p.add_class("a").unwrap().add_class("b").unwrap().add_class("a").unwrap();
    assert_eq!(p.attr("class").as_deref(), Some("a b"));
    assert!(p.has_class("a"));
    assert!(!p.has_class("c"));

    p.remove_class("a").unwrap();
    assert_eq!(p.attr("class").as_deref(), Some("b"));
    p.remove_class("missing").unwrap();
    assert_eq!(p.attr("class").as_deref(), Some("b"));

    p.remove_class("b").unwrap();
    assert!(p.attr("class").is_none());
    assert!(!p.raw().has_attributes());
}

#[test]
fn test_elements_by_class_name() {
    let doc = Document::parse(
        r#"<root><p class="x y"/><q class="xy"/><r class=" y  x "><s class="x"/></r></root>"#,
    )
    .unwrap();
    let root = doc.root();

    let names: Vec<_> = root
        .elements_by_class_name("x")
        .unwrap()
        .iter()
        .map(|n| n.name())
        .collect();
    assert_eq!(names, vec!["p", "r", "s"]);

    assert!(root.elements_by_class_name("x'").unwrap().is_empty());
    assert!(root.elements_by_class_name("\"x").unwrap().is_empty());
    assert!(root.elements_by_class_name("  ").unwrap().is_empty());
}

#[test]
fn test_typed_leaves() {
    let doc = Document::parse("<root><a/></root>").unwrap();
    let root = doc.root();
    let a = root.child("a").unwrap();

    let text = a.insert_text("x < y", None).unwrap();
    assert_eq!(text.node_type(), NodeType::Text);
    a.insert_comment("note", Some(InsertMode::Before)).unwrap();
    a.insert_cdata("z", Some(InsertMode::After)).unwrap();

    assert_eq!(
        root.outer_markup().unwrap(),
        "<root><!--note--><a>x &lt; y</a>z</root>"
    );
}

#[test]
fn test_processing_instructions() {
    let doc = Document::parse("<root><a/></root>").unwrap();
    let root = doc.root();
    let a = root.child("a").unwrap();

    let pi = a
        .insert_pi("cfg", [("k", "a\"b"), ("m", "1 & 2")], None)
        .unwrap();
    assert_eq!(pi.node_type(), NodeType::ProcessingInstruction);
    a.insert_pi("note", "raw data", Some(InsertMode::Append))
        .unwrap();

    assert_eq!(
        root.outer_markup().unwrap(),
        r#"<root><?cfg k="a&quot;b" m="1 &amp; 2"?><a><?note raw data?></a></root>"#
    );
}

#[test]
fn test_text_inserted_next_to_text_stays_separate_until_normalized() {
    let doc = Document::parse("<root>a</root>").unwrap();
    let root = doc.root();

    let b = root.insert_text("b", None).unwrap();
    assert_eq!(b.text(), "b");
    assert_eq!(root.text(), "ab");
    assert_eq!(root.raw().child_nodes().len(), 2);

    root.raw().normalize().unwrap();
    assert_eq!(root.raw().child_nodes().len(), 1);
    assert_eq!(root.outer_markup().unwrap(), "<root>ab</root>");
}

#[test]
fn test_text_handles_survive_deleting_a_sibling() {
    let doc = Document::parse("<r>a<b/>c</r>").unwrap();
    let root = doc.root();
    let texts = root.xpath("text()").unwrap();
    assert_eq!(texts.len(), 2);

    root.child("b").unwrap().delete_self().unwrap();
    assert_eq!(texts[0].text(), "a");
    assert_eq!(texts[1].text(), "c");
    assert_eq!(root.outer_markup().unwrap(), "<r>ac</r>");
}

#[test]
fn test_deleted_node_stays_readable() {
    let doc = Document::parse("<r><b k=\"1\">x</b></r>").unwrap();
    let root = doc.root();
    let b = root.child("b").unwrap();

    b.delete_self().unwrap();
    assert_eq!(b.name(), "b");
    assert_eq!(b.attr("k").as_deref(), Some("1"));
    assert!(b.raw().parent().is_none());
    assert_eq!(root.outer_markup().unwrap(), "<r/>");
}
