//! Processor traits and the inline pass that drives them.
//!
//! Two kinds of processors plug into [`Markdown`](crate::Markdown):
//!
//! - [`InlineProcessor`]: matched against the text of the tree, replaces a
//!   span of text with a node.
//! - [`TreeProcessor`]: runs once over the finished tree and mutates it in place.

use std::ops::Range;

use regex::{Captures, Regex};

use crate::registry::Registry;
use crate::tree::{Element, Node};

/// Elements whose text is never handed to inline processors.
const OPAQUE_TAGS: &[&str] = &["code", "pre"];

/// Replacement produced by an inline processor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineMatch {
    /// Node inserted in place of the span.
    pub node: Node,
    /// Byte range of the text replaced by `node`.
    pub span: Range<usize>,
}

/// Handler for a pattern found in text nodes.
///
/// The pipeline searches every text node with [`pattern`](Self::pattern) and
/// calls [`handle_match`](Self::handle_match) for each hit. Returning `None`
/// rejects the match: the text stays as it is and the search resumes one
/// character after the start of the rejected match.
///
/// Nodes returned by a processor are not scanned again.
///
/// # Thread Safety
///
/// Handlers implement `Send` only (not `Sync`) since each document pipeline
/// owns its processor instances.
///
/// # Example
///
/// ```
/// use std::sync::LazyLock;
/// use regex::{Captures, Regex};
/// use mdx_renderer::{Element, InlineMatch, InlineProcessor, Markdown};
///
/// static KBD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\+\+(\w+)\+\+").unwrap());
///
/// struct Kbd;
///
/// impl InlineProcessor for Kbd {
///     fn name(&self) -> &str { "kbd" }
///     fn pattern(&self) -> &Regex { &KBD }
///     fn handle_match(&self, caps: &Captures<'_>, _text: &str) -> Option<InlineMatch> {
///         let whole = caps.get(0)?;
///         Some(InlineMatch {
///             node: Element::new("kbd").with_text(&caps[1]).into(),
///             span: whole.range(),
///         })
///     }
/// }
///
/// let mut md = Markdown::new().with_inline(Kbd);
/// assert_eq!(md.convert("Press ++Enter++"), "<p>Press <kbd>Enter</kbd></p>");
/// ```
pub trait InlineProcessor: Send {
    /// Processor name, used in logs.
    fn name(&self) -> &str;

    /// Pattern searched in text nodes.
    fn pattern(&self) -> &Regex;

    /// Build the replacement for a match, or reject it.
    fn handle_match(&self, captures: &Captures<'_>, text: &str) -> Option<InlineMatch>;
}

/// Pass over the complete document tree.
pub trait TreeProcessor: Send {
    /// Processor name, used in logs.
    fn name(&self) -> &str;

    /// Mutate the tree in place. `registry` lists the pipeline's capabilities.
    fn run(&mut self, root: &mut Element, registry: &Registry);
}

/// Run one inline processor over every text node under `element`.
pub(crate) fn apply_inline(element: &mut Element, processor: &dyn InlineProcessor) {
    if OPAQUE_TAGS.contains(&element.tag.as_str()) {
        return;
    }

    let children = std::mem::take(&mut element.children);
    let mut rebuilt = Vec::with_capacity(children.len());
    for child in children {
        match child {
            Node::Text(text) => rebuilt.extend(expand_text(text, processor)),
            Node::Element(mut el) => {
                apply_inline(&mut el, processor);
                rebuilt.push(Node::Element(el));
            }
            html @ Node::Html(_) => rebuilt.push(html),
        }
    }
    element.children = rebuilt;
}

/// Split a text node around accepted matches.
fn expand_text(text: String, processor: &dyn InlineProcessor) -> Vec<Node> {
    let mut nodes = Vec::new();
    let mut copied = 0;
    let mut search = 0;

    while search <= text.len() {
        let Some(captures) = processor.pattern().captures_at(&text, search) else {
            break;
        };
        let Some(whole) = captures.get(0) else {
            break;
        };

        match processor.handle_match(&captures, &text) {
            Some(InlineMatch { node, span })
                if span.start >= copied && span.start <= span.end && span.end <= text.len() =>
            {
                if span.start > copied {
                    nodes.push(Node::Text(text[copied..span.start].to_owned()));
                }
                nodes.push(node);
                copied = span.end;
                search = if span.end > whole.start() {
                    span.end
                } else {
                    next_char(&text, whole.start())
                };
            }
            _ => {
                tracing::trace!(
                    processor = processor.name(),
                    matched = whole.as_str(),
                    "Inline match rejected"
                );
                search = next_char(&text, whole.start());
            }
        }
    }

    if nodes.is_empty() {
        return vec![Node::Text(text)];
    }
    if copied < text.len() {
        nodes.push(Node::Text(text[copied..].to_owned()));
    }
    nodes
}

/// Byte offset just past the character starting at `index`.
fn next_char(text: &str, index: usize) -> usize {
    text[index..]
        .chars()
        .next()
        .map_or(text.len() + 1, |c| index + c.len_utf8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::LazyLock;

    static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{(\w*)\}").unwrap());

    /// Replaces `{word}` with `<b>word</b>`, rejecting `{skip}`.
    struct Bold;

    impl InlineProcessor for Bold {
        fn name(&self) -> &'static str {
            "bold"
        }

        fn pattern(&self) -> &Regex {
            &WORD
        }

        fn handle_match(&self, captures: &Captures<'_>, _text: &str) -> Option<InlineMatch> {
            let word = captures.get(1)?.as_str();
            if word == "skip" {
                return None;
            }
            Some(InlineMatch {
                node: Element::new("b").with_text(word).into(),
                span: captures.get(0)?.range(),
            })
        }
    }

    fn bold(text: &str) -> Node {
        Element::new("b").with_text(text).into()
    }

    #[test]
    fn test_no_match_keeps_text() {
        let nodes = expand_text("plain text".to_owned(), &Bold);
        assert_eq!(nodes, vec![Node::text("plain text")]);
    }

    #[test]
    fn test_replaces_matches() {
        let nodes = expand_text("a {x} b {y}".to_owned(), &Bold);
        assert_eq!(
            nodes,
            vec![Node::text("a "), bold("x"), Node::text(" b "), bold("y")]
        );
    }

    #[test]
    fn test_rejected_match_left_verbatim() {
        let nodes = expand_text("{skip} and {z}".to_owned(), &Bold);
        assert_eq!(nodes, vec![Node::text("{skip} and "), bold("z")]);
    }

    #[test]
    fn test_only_rejected_matches() {
        let nodes = expand_text("é {skip} ü".to_owned(), &Bold);
        assert_eq!(nodes, vec![Node::text("é {skip} ü")]);
    }

    #[test]
    fn test_apply_skips_code() {
        let mut root = Element::new("div")
            .with_child(Element::new("p").with_text("{a}"))
            .with_child(Element::new("pre").with_child(Element::new("code").with_text("{b}")));
        apply_inline(&mut root, &Bold);

        let p = root.children[0].as_element().unwrap();
        assert_eq!(p.children, vec![bold("a")]);
        let pre = root.children[1].as_element().unwrap();
        assert_eq!(pre.text_content(), "{b}");
    }

    #[test]
    fn test_apply_recurses_into_inline_elements() {
        let mut root = Element::new("div").with_child(
            Element::new("p").with_child(Element::new("em").with_text("x {y}")),
        );
        apply_inline(&mut root, &Bold);
        let em = root.children[0].as_element().unwrap().children[0]
            .as_element()
            .unwrap();
        assert_eq!(em.children, vec![Node::text("x "), bold("y")]);
    }

    #[test]
    fn test_html_nodes_untouched() {
        let mut root = Element::new("div").with_child(Node::Html("{raw}".to_owned()));
        apply_inline(&mut root, &Bold);
        assert_eq!(root.children, vec![Node::Html("{raw}".to_owned())]);
    }
}
