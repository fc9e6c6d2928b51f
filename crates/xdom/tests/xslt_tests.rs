//! Tests for stylesheet transformation of nodes

use xdom::{Document, Error, SimpleView};

const COUNT_STYLESHEET: &str = r#"<xsl:stylesheet version="3.0" xmlns:xsl="http://www.w3.org/1999/XSL/Transform"><xsl:template match="/"><count><xsl:value-of select="count(//b)"/></count></xsl:template></xsl:stylesheet>"#;

#[test]
fn test_xslt_from_file_on_the_root() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("count.xsl");
    std::fs::write(&path, COUNT_STYLESHEET).unwrap();

    let doc = Document::parse("<r><a><b/><b/></a><b/></r>").unwrap();
    assert_eq!(doc.root().xslt(&path).unwrap(), "<count>3</count>");
}

#[test]
fn test_xslt_on_a_child_sees_only_its_subtree() {
    let doc = Document::parse("<r><a><b/><b/></a><b/></r>").unwrap();
    let a = doc.root().child("a").unwrap();

    assert_eq!(a.xslt_str(COUNT_STYLESHEET).unwrap(), "<count>2</count>");
    // The source document is untouched
    assert_eq!(
        doc.root().outer_markup().unwrap(),
        "<r><a><b/><b/></a><b/></r>"
    );
}

#[test]
fn test_xslt_reports_missing_and_broken_stylesheets() {
    let dir = tempfile::tempdir().unwrap();
    let doc = Document::parse("<r/>").unwrap();
    let root = doc.root();

    let missing = root.xslt(dir.path().join("missing.xsl")).unwrap_err();
    assert!(matches!(missing, Error::Io(_)));

    let broken = root.xslt_str("<xsl:stylesheet").unwrap_err();
    assert!(matches!(broken, Error::Xslt(_)));
}
