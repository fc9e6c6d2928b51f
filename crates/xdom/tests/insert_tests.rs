//! Tests for insertion modes, removal and the document root rules

use xdom::{
    Document, Error, Fragment, InsertMode, Inserted, NodeType, ReturnAs, SimpleView, TreeView,
};

fn is_structural(err: &Error) -> bool {
    matches!(err, Error::InvalidStructuralOperation(_))
}

#[test]
fn test_root_cannot_be_deleted_removed_or_replaced() {
    let doc = Document::parse("<root><a/></root>").unwrap();
    let root = doc.root();
    let replacement = Document::parse("<other/>").unwrap().root();

    assert!(is_structural(&root.delete_self().unwrap_err()));
    assert!(is_structural(&root.remove_self().unwrap_err()));
    assert!(is_structural(&root.replace_self(&replacement).unwrap_err()));
    assert_eq!(doc.root().outer_markup().unwrap(), "<root><a/></root>");
}

#[test]
fn test_no_element_or_text_beside_root() {
    let doc = Document::parse("<root/>").unwrap();
    let root = doc.root();
    let element = Document::parse("<x/>").unwrap().root();

    for mode in [InsertMode::Before, InsertMode::After] {
        assert!(is_structural(&root.insert(&element, mode).unwrap_err()));
        let text = Fragment::parse(&doc, "text").unwrap();
        assert!(is_structural(&root.insert(text, mode).unwrap_err()));
        assert!(is_structural(&root.insert_text("t", Some(mode)).unwrap_err()));
    }
    assert_eq!(root.as_xml().unwrap(), "<?xml version=\"1.0\"?>\n<root/>");
}

#[test]
fn test_comments_and_instructions_may_surround_root() {
    let doc = Document::parse("<root/>").unwrap();
    let root = doc.root();

    root.insert_comment("before", Some(InsertMode::Before)).unwrap();
    root.insert_comment("after", Some(InsertMode::After)).unwrap();
    root.insert_pi("xml-stylesheet", [("href", "style.xsl")], None)
        .unwrap();

    let xml = root.as_xml().unwrap();
    let comment = xml.find("<!--before-->").unwrap();
    let pi = xml.find(r#"<?xml-stylesheet href="style.xsl"?>"#).unwrap();
    let element = xml.find("<root/>").unwrap();
    let trailing = xml.find("<!--after-->").unwrap();
    assert!(comment < pi && pi < element && element < trailing);
}

#[test]
fn test_insert_modes() {
    let doc = Document::parse("<root><a/><b/></root>").unwrap();
    let root = doc.root();
    let a = root.child("a").unwrap();

    a.insert_fragment("<x/>", InsertMode::Before).unwrap();
    a.insert_fragment("<y/>", InsertMode::After).unwrap();
    a.insert_fragment("<z/>", InsertMode::Append).unwrap();

    assert_eq!(
        root.outer_markup().unwrap(),
        "<root><x/><a><z/></a><y/><b/></root>"
    );
}

#[test]
fn test_after_last_child_appends_to_parent() {
    let doc = Document::parse("<root><a/><b/></root>").unwrap();
    let root = doc.root();
    let b = root.child("b").unwrap();

    let placed = b.insert_fragment("<c/><d/>", InsertMode::After).unwrap();
    assert_eq!(placed, &b);
    assert_eq!(root.outer_markup().unwrap(), "<root><a/><b/><c/><d/></root>");
}

#[test]
fn test_insert_moves_nodes_within_a_document() {
    let doc = Document::parse("<root><a/><b/></root>").unwrap();
    let root = doc.root();
    let a = root.child("a").unwrap();
    let b = root.child("b").unwrap();

    let placed = a.insert(&b, InsertMode::Before).unwrap();
    assert_eq!(placed, vec![b.clone()]);
    assert_eq!(root.outer_markup().unwrap(), "<root><b/><a/></root>");
}

#[test]
fn test_insert_copies_from_another_document() {
    let doc = Document::parse("<root/>").unwrap();
    let root = doc.root();
    let other = Document::parse(r#"<n k="v"><m/></n>"#).unwrap();

    let placed = root.insert(other.root(), InsertMode::Append).unwrap();
    assert_eq!(placed.len(), 1);
    assert!(placed[0].document().same(&doc));
    assert_eq!(root.outer_markup().unwrap(), r#"<root><n k="v"><m/></n></root>"#);
    assert_eq!(other.root().outer_markup().unwrap(), r#"<n k="v"><m/></n>"#);
}

#[test]
fn test_insert_into_itself_fails() {
    let doc = Document::parse("<root><a><b/></a></root>").unwrap();
    let root = doc.root();
    let a = root.child("a").unwrap();
    let b = a.child("b").unwrap();

    assert!(is_structural(&b.insert(&a, InsertMode::Append).unwrap_err()));
    assert!(is_structural(&b.insert(&a, InsertMode::Before).unwrap_err()));
    assert!(is_structural(&a.insert(&root, InsertMode::Append).unwrap_err()));
    assert_eq!(root.outer_markup().unwrap(), "<root><a><b/></a></root>");
}

#[test]
fn test_leaves_cannot_take_children() {
    let doc = Document::parse("<root>text</root>").unwrap();
    let text = doc.root().xpath("text()").unwrap().remove(0);

    let err = text.insert_fragment("<x/>", InsertMode::Append).unwrap_err();
    assert!(is_structural(&err));
    assert_eq!(doc.root().outer_markup().unwrap(), "<root>text</root>");
}

#[test]
fn test_return_shapes() {
    let doc = Document::parse("<root/>").unwrap();
    let root = doc.root();
    let fragment = Fragment::parse(&doc, "<a/><b/>").unwrap();

    let raw = root
        .insert_as(fragment, InsertMode::Append, ReturnAs::Raw)
        .unwrap();
    assert!(matches!(raw, Inserted::Raw(ref nodes) if nodes.len() == 2));

    let fragment = Fragment::parse(&doc, "<c/>").unwrap();
    let wrapped = root
        .insert_as(fragment, InsertMode::Append, ReturnAs::Wrapped)
        .unwrap();
    let nodes = wrapped.into_nodes();
    assert_eq!(nodes[0].name(), "c");
}

#[test]
fn test_sibling_helpers() {
    let doc = Document::parse("<root><a/></root>").unwrap();
    let root = doc.root();
    let a = root.child("a").unwrap();

    a.insert_before_self(Fragment::parse(&doc, "<x/>").unwrap())
        .unwrap();
    a.insert_after_self(Document::parse("<y/>").unwrap().root())
        .unwrap();
    assert_eq!(root.outer_markup().unwrap(), "<root><x/><a/><y/></root>");
}

#[test]
fn test_remove_and_replace_self() {
    let doc = Document::parse("<root><a><x/></a><b/></root>").unwrap();
    let root = doc.root();

    let removed = root.child("a").unwrap().remove_self().unwrap();
    assert_eq!(removed.outer_markup().unwrap(), "<a><x/></a>");
    assert_eq!(root.outer_markup().unwrap(), "<root><b/></root>");

    let b = root.child("b").unwrap();
    let displaced = b.replace_self(&removed).unwrap();
    assert_eq!(displaced, b);
    assert_eq!(root.outer_markup().unwrap(), "<root><a><x/></a></root>");

    // The replacement was copied, the detached original is untouched
    assert!(removed.raw().parent().is_none());
}

#[test]
fn test_delete_self_of_attribute() {
    let doc = Document::parse(r#"<root><a x="1" y="2"/></root>"#).unwrap();
    let attr = doc.root().xpath("a/@x").unwrap().remove(0);
    assert_eq!(attr.node_type(), NodeType::Attribute);

    attr.delete_self().unwrap();
    assert_eq!(doc.root().outer_markup().unwrap(), r#"<root><a y="2"/></root>"#);
}

#[test]
fn test_bulk_delete_counts_nested_matches_and_skips_root() {
    let doc = Document::parse("<root><item/><item><item/></item><keep/></root>").unwrap();
    let root = doc.root();

    assert_eq!(root.delete_nodes("//item").unwrap(), 3);
    assert_eq!(root.outer_markup().unwrap(), "<root><keep/></root>");

    assert_eq!(root.delete_nodes("/root").unwrap(), 0);
    assert_eq!(root.delete_nodes("//@missing").unwrap(), 0);
    assert_eq!(root.outer_markup().unwrap(), "<root><keep/></root>");
}

#[test]
fn test_bulk_delete_of_attributes() {
    let doc = Document::parse(r#"<root x="r"><a x="1"/><b x="2"/></root>"#).unwrap();
    let root = doc.root();

    assert_eq!(root.delete_nodes("//*/@x").unwrap(), 3);
    assert_eq!(root.outer_markup().unwrap(), "<root><a/><b/></root>");
}

#[test]
fn test_bulk_remove_returns_detached_nodes() {
    let doc = Document::parse("<root><item n=\"1\"/><other/><item n=\"2\"/></root>").unwrap();
    let root = doc.root();

    let removed = root.remove_nodes("item").unwrap();
    assert_eq!(removed.len(), 2);
    assert_eq!(removed[0].attr("n").as_deref(), Some("1"));
    assert!(removed.iter().all(|n| n.raw().parent().is_none()));
    assert_eq!(root.outer_markup().unwrap(), "<root><other/></root>");
}

#[test]
fn test_bulk_remove_detaches_nested_matches_from_their_ancestors() {
    let doc = Document::parse(r#"<r><x n="1"><x n="2"/></x><x n="3"/></r>"#).unwrap();
    let root = doc.root();

    let removed = root.remove_nodes("//x").unwrap();
    let order: Vec<_> = removed.iter().map(|n| n.attr("n").unwrap()).collect();
    assert_eq!(order, vec!["1", "2", "3"]);
    assert!(removed.iter().all(|n| n.raw().parent().is_none()));
    assert_eq!(removed[0].outer_markup().unwrap(), r#"<x n="1"/>"#);
    assert_eq!(root.outer_markup().unwrap(), "<r/>");
}

#[test]
fn test_bulk_replace_uses_fresh_copies() {
    let doc = Document::parse("<root><item/><other/><item/></root>").unwrap();
    let root = doc.root();
    let new = Document::parse("<new/>").unwrap().root();

    let replaced = root.replace_nodes("item", &new).unwrap();
    assert_eq!(replaced.len(), 2);
    assert_eq!(
        root.outer_markup().unwrap(),
        "<root><new/><other/><new/></root>"
    );
    assert_eq!(root.replace_nodes(".", &new).unwrap().len(), 0);
}

#[test]
fn test_bulk_operations_report_bad_expressions() {
    let doc = Document::parse("<root/>").unwrap();
    let err = doc.root().delete_nodes("//[").unwrap_err();
    assert!(matches!(err, Error::InvalidExpression { .. }));
}

#[test]
fn test_fragment_after_keeps_order_when_text_follows() {
    let doc = Document::parse("<r><e/>y</r>").unwrap();
    let root = doc.root();
    let e = root.child("e").unwrap();

    let placed = e.insert_fragment("a<b/>", InsertMode::After).unwrap();
    assert_eq!(placed.len(), 2);
    assert_eq!(root.outer_markup().unwrap(), "<r><e/>a<b/>y</r>");
}

#[test]
fn test_after_can_move_the_following_sibling() {
    let doc = Document::parse("<r><a/><b/><c/></r>").unwrap();
    let root = doc.root();
    let a = root.child("a").unwrap();
    let b = root.child("b").unwrap();

    a.insert(&b, InsertMode::After).unwrap();
    assert_eq!(root.outer_markup().unwrap(), "<r><a/><b/><c/></r>");

    let c = root.child("c").unwrap();
    a.insert(&c, InsertMode::After).unwrap();
    assert_eq!(root.outer_markup().unwrap(), "<r><a/><c/><b/></r>");
}

#[test]
fn test_queries_see_through_empty_and_split_text() {
    let doc = Document::parse("<r><a/><b/></r>").unwrap();
    let root = doc.root();
    let b = root.child("b").unwrap();

    b.insert_text("", Some(InsertMode::Before)).unwrap();
    let found = root.xpath("b").unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].outer_markup().unwrap(), "<b/>");

    b.insert_text("x", Some(InsertMode::Before)).unwrap();
    b.insert_text("y", Some(InsertMode::Before)).unwrap();
    assert_eq!(root.xpath("b").unwrap()[0].name(), "b");

    // Adjacent text reads back as one node, found at the first of the run
    let texts = root.xpath("text()").unwrap();
    assert_eq!(texts.len(), 1);
    assert_eq!(texts[0].text(), "x");
}

#[test]
fn test_after_root_goes_directly_after_it() {
    let doc = Document::parse("<r/><!--tail-->").unwrap();
    let root = doc.root();

    root.insert_comment("mid", Some(InsertMode::After)).unwrap();
    assert!(root.as_xml().unwrap().ends_with("<r/><!--mid--><!--tail-->"));
}
