//! Read-only XML views and byte-range edits.
//!
//! Documents are parsed with `roxmltree`, which keeps byte positions for every
//! node and attribute. Transplants walk the immutable tree, collect
//! [`TextEdit`]s, and splice them into the original text afterwards. Bytes not
//! covered by an edit come through untouched, so attribute order, whitespace
//! and unrelated nodes survive a rewrite exactly.

use std::borrow::Cow;
use std::ops::Range;

use roxmltree::{Attribute, Document, Node, ParsingOptions};
use tracing::warn;

use crate::error::ParseFailure;

const BOM: &str = "\u{feff}";

/// Replace `source[range]` with `replacement`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub range: Range<usize>,
    pub replacement: String,
}

/// Document text split into an optional byte-order mark and the XML body.
#[derive(Debug, Clone, Copy)]
pub struct XmlText<'a> {
    bom: &'a str,
    body: &'a str,
}

impl<'a> XmlText<'a> {
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        match text.strip_prefix(BOM) {
            Some(body) => Self { bom: BOM, body },
            None => Self { bom: "", body: text },
        }
    }

    /// The XML body. All node ranges are relative to it.
    #[must_use]
    pub const fn body(&self) -> &'a str {
        self.body
    }

    /// Parse the body into a read-only tree.
    ///
    /// # Errors
    ///
    /// Returns [`ParseFailure::Malformed`] if the body is not well-formed XML.
    pub fn parse(&self) -> Result<Document<'a>, ParseFailure> {
        let options = ParsingOptions {
            allow_dtd: true,
            ..ParsingOptions::default()
        };
        Ok(Document::parse_with_options(self.body, options)?)
    }

    /// Splice `edits` into the body and restore the byte-order mark.
    #[must_use]
    pub fn apply(&self, edits: Vec<TextEdit>) -> String {
        let mut out = String::with_capacity(self.bom.len() + self.body.len());
        out.push_str(self.bom);
        out.push_str(&apply_edits(self.body, edits));
        out
    }
}

/// Apply non-overlapping edits to `source`.
///
/// Edits are applied in start order. An edit overlapping an earlier one is
/// dropped with a warning.
#[must_use]
pub fn apply_edits(source: &str, mut edits: Vec<TextEdit>) -> String {
    edits.sort_by_key(|edit| (edit.range.start, edit.range.end));

    let mut out = String::with_capacity(source.len());
    let mut cursor = 0;
    for edit in edits {
        if edit.range.start < cursor || edit.range.end > source.len() {
            warn!(
                start = edit.range.start,
                end = edit.range.end,
                "dropping overlapping or out-of-bounds XML edit"
            );
            continue;
        }
        out.push_str(&source[cursor..edit.range.start]);
        out.push_str(&edit.replacement);
        cursor = edit.range.end;
    }
    out.push_str(&source[cursor..]);
    out
}

/// Escape a value for use as element content.
#[must_use]
pub fn escape_text(value: &str) -> Cow<'_, str> {
    escape(value, false)
}

/// Escape a value for use inside a quoted attribute.
#[must_use]
pub fn escape_attr(value: &str) -> Cow<'_, str> {
    escape(value, true)
}

fn escape(value: &str, attribute: bool) -> Cow<'_, str> {
    let needs_escape = |c: char| {
        matches!(c, '&' | '<' | '>' | '\r')
            || (attribute && matches!(c, '"' | '\'' | '\n' | '\t'))
    };
    if !value.contains(needs_escape) {
        return Cow::Borrowed(value);
    }

    let mut out = String::with_capacity(value.len() + 16);
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\r' => out.push_str("&#xD;"),
            '"' if attribute => out.push_str("&quot;"),
            '\'' if attribute => out.push_str("&apos;"),
            '\n' if attribute => out.push_str("&#xA;"),
            '\t' if attribute => out.push_str("&#x9;"),
            other => out.push(other),
        }
    }
    Cow::Owned(out)
}

/// Remove carriage-return character references from serialized output.
///
/// Some project tools choke on `&#xD;` in saved documents; callers opt into
/// this through `OutputOptions::strip_cr_entities`.
#[must_use]
pub fn strip_cr_entities(text: &str) -> Cow<'_, str> {
    const ENTITIES: [&str; 3] = ["&#xD;", "&#xd;", "&#13;"];
    if !ENTITIES.iter().any(|entity| text.contains(entity)) {
        return Cow::Borrowed(text);
    }
    let mut out = text.to_owned();
    for entity in ENTITIES {
        out = out.replace(entity, "");
    }
    Cow::Owned(out)
}

/// First child element named `name`.
#[must_use]
pub fn child_element<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|child| child.is_element() && child.tag_name().name() == name)
}

/// All child elements named `name`, in document order.
pub fn child_elements<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |child| child.is_element() && child.tag_name().name() == name)
}

/// Concatenated text of every text node below `node`.
#[must_use]
pub fn element_text(node: Node<'_, '_>) -> String {
    node.descendants()
        .filter(Node::is_text)
        .filter_map(|text| text.text())
        .collect()
}

/// Text of the child element `name`, if that child exists.
#[must_use]
pub fn child_text(node: Node<'_, '_>, name: &str) -> Option<String> {
    child_element(node, name).map(element_text)
}

/// Edit that replaces the whole content of `node` with `value` as text.
///
/// `<a/>` is expanded to `<a>value</a>`; an empty `<a></a>` gets the value
/// inserted between its tags.
#[must_use]
pub fn replace_element_text(source: &str, node: Node<'_, '_>, value: &str) -> Option<TextEdit> {
    let span = node.range();
    let scan_from = start_tag_scan_start(source, node)?;
    let gt = scan_from + source.get(scan_from..span.end)?.find('>')?;
    let escaped = escape_text(value);

    let head = &source[scan_from..gt];
    if head.trim_end().ends_with('/') {
        let slash = scan_from + head.rfind('/')?;
        return Some(TextEdit {
            range: slash..gt + 1,
            replacement: format!(">{escaped}</{}>", qualified_name(source, node)),
        });
    }

    let close_start = span.start + source[span.clone()].rfind("</")?;
    if close_start <= gt {
        return None;
    }
    Some(TextEdit {
        range: gt + 1..close_start,
        replacement: escaped.into_owned(),
    })
}

/// Edit that replaces the value of an existing attribute, keeping its quotes.
#[must_use]
pub fn replace_attribute_value(
    source: &str,
    attr: &Attribute<'_, '_>,
    value: &str,
) -> Option<TextEdit> {
    Some(TextEdit {
        range: attribute_value_range(source, attr)?,
        replacement: escape_attr(value).into_owned(),
    })
}

/// Edit that appends a new `name="value"` attribute to the start tag of `node`.
#[must_use]
pub fn insert_attribute(
    source: &str,
    node: Node<'_, '_>,
    name: &str,
    value: &str,
) -> Option<TextEdit> {
    let at = start_tag_scan_start(source, node)?;
    Some(TextEdit {
        range: at..at,
        replacement: format!(" {name}=\"{}\"", escape_attr(value)),
    })
}

/// Byte range of an attribute's value, without the surrounding quotes.
fn attribute_value_range(source: &str, attr: &Attribute<'_, '_>) -> Option<Range<usize>> {
    let start = attr.range().start;
    let rest = source.get(start..)?;
    let eq = rest.find('=')?;
    let after_eq = &rest[eq + 1..];
    let quote_offset = after_eq.find(['"', '\''])?;
    let quote = after_eq[quote_offset..].chars().next()?;

    let value_start = start + eq + 1 + quote_offset + 1;
    let value_end = value_start + source.get(value_start..)?.find(quote)?;
    Some(value_start..value_end)
}

/// Position just past the tag name or the last attribute of a start tag.
fn start_tag_scan_start(source: &str, node: Node<'_, '_>) -> Option<usize> {
    match node.attributes().last() {
        Some(attr) => attribute_value_range(source, &attr).map(|value| value.end + 1),
        None => Some(node.range().start + 1 + qualified_name(source, node).len()),
    }
}

/// Tag name as spelled in the source, including any prefix.
fn qualified_name<'s>(source: &'s str, node: Node<'_, '_>) -> &'s str {
    let rest = source.get(node.range().start + 1..).unwrap_or_default();
    let len = rest
        .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
        .unwrap_or(rest.len());
    &rest[..len]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edit_first(source: &str, tag: &str, value: &str) -> String {
        let text = XmlText::new(source);
        let doc = text.parse().expect("parse");
        let node = doc
            .descendants()
            .find(|n| n.has_tag_name(tag))
            .expect("node");
        let edit = replace_element_text(text.body(), node, value).expect("edit");
        text.apply(vec![edit])
    }

    #[test]
    fn replaces_existing_content() {
        let out = edit_first("<a><string>old</string></a>", "string", "new");
        assert_eq!(out, "<a><string>new</string></a>");
    }

    #[test]
    fn fills_empty_element() {
        let out = edit_first("<a><string></string></a>", "string", "x = 1;");
        assert_eq!(out, "<a><string>x = 1;</string></a>");
    }

    #[test]
    fn expands_self_closing_element() {
        let out = edit_first(r#"<a><string kind="1" /></a>"#, "string", "go");
        assert_eq!(out, r#"<a><string kind="1" >go</string></a>"#);
    }

    #[test]
    fn attribute_containing_gt_does_not_confuse_start_tag() {
        let out = edit_first(r#"<a><s cond="a>b">x</s></a>"#, "s", "y");
        assert_eq!(out, r#"<a><s cond="a>b">y</s></a>"#);
    }

    #[test]
    fn escapes_markup_in_content() {
        let out = edit_first("<a><s>x</s></a>", "s", "if (a < b && c > d) {}");
        assert_eq!(out, "<a><s>if (a &lt; b &amp;&amp; c &gt; d) {}</s></a>");

        let doc = roxmltree::Document::parse(&out).expect("reparse");
        let s = doc.descendants().find(|n| n.has_tag_name("s")).expect("s");
        assert_eq!(element_text(s), "if (a < b && c > d) {}");
    }

    #[test]
    fn attribute_value_is_replaced_in_place() {
        let source = r#"<room><instance objName="o" code='a' x="0"/></room>"#;
        let doc = roxmltree::Document::parse(source).expect("parse");
        let inst = doc
            .descendants()
            .find(|n| n.has_tag_name("instance"))
            .expect("instance");
        let attr = inst
            .attributes()
            .find(|a| a.name() == "code")
            .expect("code attr");
        let edit = replace_attribute_value(source, &attr, "say(\"hi\")\n").expect("edit");
        let out = apply_edits(source, vec![edit]);
        assert_eq!(
            out,
            r#"<room><instance objName="o" code='say(&quot;hi&quot;)&#xA;' x="0"/></room>"#
        );

        let doc = roxmltree::Document::parse(&out).expect("reparse");
        let inst = doc
            .descendants()
            .find(|n| n.has_tag_name("instance"))
            .expect("instance");
        assert_eq!(inst.attribute("code"), Some("say(\"hi\")\n"));
    }

    #[test]
    fn attribute_is_inserted_after_last_one() {
        let source = r#"<r><instance objName="o" x="1"/></r>"#;
        let doc = roxmltree::Document::parse(source).expect("parse");
        let inst = doc
            .descendants()
            .find(|n| n.has_tag_name("instance"))
            .expect("instance");
        let edit = insert_attribute(source, inst, "code", "a=1;").expect("edit");
        assert_eq!(
            apply_edits(source, vec![edit]),
            r#"<r><instance objName="o" x="1" code="a=1;"/></r>"#
        );
    }

    #[test]
    fn overlapping_edits_keep_first() {
        let edits = vec![
            TextEdit {
                range: 0..3,
                replacement: "X".into(),
            },
            TextEdit {
                range: 2..4,
                replacement: "Y".into(),
            },
        ];
        assert_eq!(apply_edits("abcdef", edits), "Xdef");
    }

    #[test]
    fn byte_order_mark_survives() {
        let source = "\u{feff}<a><s>1</s></a>";
        let out = edit_first(source, "s", "2");
        assert_eq!(out, "\u{feff}<a><s>2</s></a>");
    }

    #[test]
    fn strips_carriage_return_references() {
        assert_eq!(strip_cr_entities("a&#xD;&#xA;b&#13;"), "a&#xA;b");
        assert!(matches!(strip_cr_entities("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn malformed_body_is_a_parse_failure() {
        let err = XmlText::new("<a><b></a>").parse().expect_err("mismatched");
        assert!(matches!(err, ParseFailure::Malformed(_)));
    }
}
