//! Document tree produced from markdown and mutated by processors.

/// A node in the document tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    /// Structural element (`p`, `table`, `a`, ...).
    Element(Element),
    /// Plain text, escaped on output.
    Text(String),
    /// Raw HTML from the source, emitted verbatim.
    Html(String),
}

impl Node {
    /// Create a text node.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Borrow the element if this node is one.
    #[must_use]
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(element) => Some(element),
            Self::Text(_) | Self::Html(_) => None,
        }
    }

    /// Mutably borrow the element if this node is one.
    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Self::Element(element) => Some(element),
            Self::Text(_) | Self::Html(_) => None,
        }
    }

    /// Borrow the text if this node is a text node.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Element(_) | Self::Html(_) => None,
        }
    }

    /// Whether this node is an element with the given tag.
    #[must_use]
    pub fn is_element(&self, tag: &str) -> bool {
        self.as_element().is_some_and(|e| e.tag == tag)
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

/// An element with ordered attributes and children.
///
/// # Example
///
/// ```
/// use mdx_renderer::{Element, Node};
///
/// let link = Element::new("a").with_attr("href", "#fig:a").with_text("fig.");
/// assert_eq!(link.get("href"), Some("#fig:a"));
/// assert_eq!(link.text_content(), "fig.");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Element {
    /// Tag name.
    pub tag: String,
    /// Attributes in insertion order.
    pub attrs: Vec<(String, String)>,
    /// Child nodes.
    pub children: Vec<Node>,
}

impl Element {
    /// Create an empty element.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder form of [`set`](Self::set).
    #[must_use]
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Builder form of [`push`](Self::push).
    #[must_use]
    pub fn with_child(mut self, node: impl Into<Node>) -> Self {
        self.push(node);
        self
    }

    /// Builder form of [`push_text`](Self::push_text).
    #[must_use]
    pub fn with_text(mut self, text: &str) -> Self {
        self.push_text(text);
        self
    }

    /// Get an attribute value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing an existing value in place.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(slot) = self.attrs.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.attrs.push((key, value));
        }
    }

    /// Append a child. Adjacent text nodes are merged.
    pub fn push(&mut self, node: impl Into<Node>) {
        match node.into() {
            Node::Text(text) => self.push_text(&text),
            node => self.children.push(node),
        }
    }

    /// Append text, merging with a trailing text node. Empty text is ignored.
    pub fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Node::Text(last)) = self.children.last_mut() {
            last.push_str(text);
        } else {
            self.children.push(Node::Text(text.to_owned()));
        }
    }

    /// Insert a child at `index`.
    pub fn insert(&mut self, index: usize, node: impl Into<Node>) {
        self.children.insert(index, node.into());
    }

    /// Whether any direct child is an element with the given tag.
    #[must_use]
    pub fn has_child(&self, tag: &str) -> bool {
        self.children.iter().any(|c| c.is_element(tag))
    }

    /// Text of the leading text node, if the element starts with one.
    #[must_use]
    pub fn leading_text(&self) -> Option<&str> {
        self.children.first().and_then(Node::as_text)
    }

    /// Concatenated text of all descendant text nodes.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }
}

fn collect_text(element: &Element, out: &mut String) {
    for child in &element.children {
        match child {
            Node::Text(text) => out.push_str(text),
            Node::Element(e) => collect_text(e, out),
            Node::Html(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_set_replaces_in_place() {
        let mut el = Element::new("table").with_attr("id", "a").with_attr("class", "x");
        el.set("id", "b");
        assert_eq!(
            el.attrs,
            vec![
                ("id".to_owned(), "b".to_owned()),
                ("class".to_owned(), "x".to_owned())
            ]
        );
    }

    #[test]
    fn test_push_merges_text() {
        let mut el = Element::new("p");
        el.push_text("Hello");
        el.push(Node::text(", "));
        el.push_text("world");
        assert_eq!(el.children, vec![Node::text("Hello, world")]);
    }

    #[test]
    fn test_push_ignores_empty_text() {
        let mut el = Element::new("span");
        el.push_text("");
        assert!(el.children.is_empty());
    }

    #[test]
    fn test_push_keeps_text_after_element_separate() {
        let el = Element::new("p")
            .with_text("a")
            .with_child(Element::new("em").with_text("b"))
            .with_text("c");
        assert_eq!(el.children.len(), 3);
        assert_eq!(el.text_content(), "abc");
    }

    #[test]
    fn test_has_child() {
        let table = Element::new("table").with_child(Element::new("caption"));
        assert!(table.has_child("caption"));
        assert!(!table.has_child("thead"));
    }

    #[test]
    fn test_leading_text() {
        let p = Element::new("p").with_text("Table: x");
        assert_eq!(p.leading_text(), Some("Table: x"));

        let p = Element::new("p").with_child(Element::new("em").with_text("Table:"));
        assert_eq!(p.leading_text(), None);
    }

    #[test]
    fn test_node_accessors() {
        let node = Node::from(Element::new("table"));
        assert!(node.is_element("table"));
        assert!(!node.is_element("p"));
        assert_eq!(node.as_text(), None);
        assert_eq!(Node::Html("<br>".to_owned()).as_element(), None);
    }
}
