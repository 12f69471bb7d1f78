//! HTML serialization of the document tree.
//!
//! Produces compact HTML5: no whitespace is inserted between elements, text
//! and attribute values are escaped, raw HTML nodes pass through verbatim.

use crate::tree::{Element, Node};

/// Elements serialized without a closing tag.
const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input"];

/// Escape text for HTML output.
///
/// # Example
///
/// ```
/// use mdx_renderer::escape_html;
///
/// assert_eq!(escape_html(r#"<a href="x">&"#), "&lt;a href=&quot;x&quot;&gt;&amp;");
/// ```
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}

/// Serialize the children of `root` (the root element itself is not emitted).
#[must_use]
pub fn to_html(root: &Element) -> String {
    let mut out = String::with_capacity(1024);
    for child in &root.children {
        write_node(child, &mut out);
    }
    out
}

/// Serialize a single element including its own tags.
#[must_use]
pub fn element_to_html(element: &Element) -> String {
    let mut out = String::new();
    write_element(element, &mut out);
    out
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Element(element) => write_element(element, out),
        Node::Text(text) => out.push_str(&escape_html(text)),
        Node::Html(html) => out.push_str(html),
    }
}

fn write_element(element: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&element.tag);
    for (key, value) in &element.attrs {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&escape_html(value));
        out.push('"');
    }
    out.push('>');

    if VOID_ELEMENTS.contains(&element.tag.as_str()) {
        return;
    }

    for child in &element.children {
        write_node(child, out);
    }
    out.push_str("</");
    out.push_str(&element.tag);
    out.push('>');
}
