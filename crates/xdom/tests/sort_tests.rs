//! Tests for key parsing and multi-key stable sorting

use proptest::prelude::*;
use xdom::{sort, Comparison, Document, KeySpec, Node, Order, SimpleView, SortKey};

fn attrs(nodes: &[Node], name: &str) -> Vec<String> {
    nodes
        .iter()
        .map(|n| n.attr(name).unwrap_or_default())
        .collect()
}

#[test]
fn test_sort_is_stable() {
    let doc = Document::parse(
        r#"<root><i id="2" n="a"/><i id="1" n="b"/><i id="2" n="c"/></root>"#,
    )
    .unwrap();
    let mut nodes = doc.root().xpath("i").unwrap();

    sort(&mut nodes, &["@id".parse().unwrap()]).unwrap();
    assert_eq!(attrs(&nodes, "id"), vec!["1", "2", "2"]);
    assert_eq!(attrs(&nodes, "n"), vec!["b", "a", "c"]);
}

#[test]
fn test_descending_keeps_ties_in_input_order() {
    let doc = Document::parse(
        r#"<root><i id="2" n="a"/><i id="1" n="b"/><i id="2" n="c"/></root>"#,
    )
    .unwrap();
    let mut nodes = doc.root().xpath("i").unwrap();

    let key = KeySpec::new(SortKey::Attribute("id".to_string())).descending();
    sort(&mut nodes, &[key]).unwrap();
    assert_eq!(attrs(&nodes, "n"), vec!["a", "c", "b"]);
}

#[test]
fn test_later_keys_only_break_ties() {
    let doc = Document::parse(
        r#"<root><i g="b" n="2"/><i g="a" n="9"/><i g="b" n="1"/><i g="a" n="3"/></root>"#,
    )
    .unwrap();
    let nodes = doc
        .root()
        .sorted_xpath("i", &["@g".parse().unwrap(), "@n".parse().unwrap()])
        .unwrap();

    assert_eq!(attrs(&nodes, "g"), vec!["a", "a", "b", "b"]);
    assert_eq!(attrs(&nodes, "n"), vec!["3", "9", "1", "2"]);
}

#[test]
fn test_comparisons() {
    let doc = Document::parse(r#"<root><i v="10"/><i v="9"/><i v="x"/><i v="100"/></root>"#)
        .unwrap();
    let root = doc.root();
    let key = KeySpec::new(SortKey::Attribute("v".to_string()));

    let regular = root.sorted_xpath("i", &[key.clone()]).unwrap();
    // Mixed pairs fall back to string order, so only the numeric run is numeric
    let values = attrs(&regular, "v");
    let numbers: Vec<_> = values.iter().filter(|v| v.as_str() != "x").collect();
    assert_eq!(numbers, vec!["9", "10", "100"]);

    let numeric = root.sorted_xpath("i", &[key.clone().numeric()]).unwrap();
    assert_eq!(attrs(&numeric, "v"), vec!["x", "9", "10", "100"]);

    let string = root.sorted_xpath("i", &[key.string()]).unwrap();
    assert_eq!(attrs(&string, "v"), vec!["10", "100", "9", "x"]);
}

#[test]
fn test_numeric_treats_non_numbers_as_zero() {
    let doc = Document::parse(
        r#"<root><i v="3" n="a"/><i v="" n="b"/><i v="-1" n="c"/><i v="abc" n="d"/><i v="0" n="e"/></root>"#,
    )
    .unwrap();
    let key = KeySpec::new(SortKey::Attribute("v".to_string())).numeric();
    let nodes = doc.root().sorted_xpath("i", &[key]).unwrap();

    // "", "abc" and "0" tie at zero and keep their input order
    assert_eq!(attrs(&nodes, "n"), vec!["c", "b", "d", "e", "a"]);
}

#[test]
fn test_text_and_path_keys() {
    let doc = Document::parse(
        "<root><i><k>b</k>2</i><i><k>c</k>1</i><i><k>a</k>3</i></root>",
    )
    .unwrap();
    let root = doc.root();

    let by_path = root.sorted_xpath("i", &["k".parse().unwrap()]).unwrap();
    let keys: Vec<_> = by_path.iter().map(|n| n.child("k").unwrap().text()).collect();
    assert_eq!(keys, vec!["a", "b", "c"]);

    // Self text is the full text content: "b2", "c1", "a3"
    let by_text = root.sorted_xpath("i", &[".".parse().unwrap()]).unwrap();
    let texts: Vec<_> = by_text.iter().map(|n| n.text()).collect();
    assert_eq!(texts, vec!["3", "2", "1"]);
}

#[test]
fn test_sort_key_parsing() {
    assert_eq!(
        "@id".parse::<SortKey>().unwrap(),
        SortKey::Attribute("id".to_string())
    );
    assert_eq!(
        "@x:lang".parse::<SortKey>().unwrap(),
        SortKey::Attribute("x:lang".to_string())
    );
    for own_text in [".", "text()", "current()"] {
        assert_eq!(own_text.parse::<SortKey>().unwrap(), SortKey::SelfText);
    }
    assert_eq!(
        "title/@sort".parse::<SortKey>().unwrap(),
        SortKey::Path("title/@sort".to_string())
    );
    assert!("  ".parse::<SortKey>().is_err());

    assert_eq!("descending".parse::<Order>().unwrap(), Order::Descending);
    assert_eq!("numeric".parse::<Comparison>().unwrap(), Comparison::Numeric);
}

#[test]
fn test_sort_children_moves_elements_after_other_content() {
    let doc = Document::parse(r#"<root>t<x k="2"/>u<x k="1"/></root>"#).unwrap();
    let root = doc.root();

    root.sort_children(&["@k".parse().unwrap()]).unwrap();

    assert_eq!(attrs(&root.element_children(), "k"), vec!["1", "2"]);
    assert_eq!(root.text(), "tu");
    assert!(root
        .inner_xml()
        .unwrap()
        .ends_with(r#"<x k="1"/><x k="2"/>"#));
}

#[test]
fn test_sort_with_bad_path_key_fails() {
    let doc = Document::parse("<root><i/><i/></root>").unwrap();
    let result = doc.root().sorted_xpath("i", &[KeySpec::new(SortKey::Path("[".to_string()))]);
    assert!(result.is_err());
}

proptest! {
    #[test]
    fn prop_sort_orders_and_is_stable(values in proptest::collection::vec(0u8..5, 0..24)) {
        let items: String = values
            .iter()
            .enumerate()
            .map(|(pos, v)| format!(r#"<i k="{v}" pos="{pos}"/>"#))
            .collect();
        let doc = Document::parse(&format!("<root>{items}</root>")).unwrap();
        let mut nodes = doc.root().xpath("i").unwrap();

        sort(&mut nodes, &["@k".parse::<KeySpec>().unwrap().numeric()]).unwrap();

        let rows: Vec<(u8, usize)> = nodes
            .iter()
            .map(|n| {
                (
                    n.attr("k").unwrap().parse().unwrap(),
                    n.attr("pos").unwrap().parse().unwrap(),
                )
            })
            .collect();
        prop_assert_eq!(rows.len(), values.len());
        for pair in rows.windows(2) {
            prop_assert!(pair[0].0 <= pair[1].0);
            if pair[0].0 == pair[1].0 {
                prop_assert!(pair[0].1 < pair[1].1);
            }
        }
    }
}
