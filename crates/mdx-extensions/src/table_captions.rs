//! Table captions from adjacent `Table:` paragraphs.
//!
//! A top-level paragraph starting with `Table:`, `table:` or `:` that sits
//! directly before or after a table becomes that table's `<caption>`:
//!
//! ```text
//! | a | b |
//! |---|---|
//! | 1 | 2 |
//!
//! Table: Results {#tbl:results .wide}
//! ```
//!
//! When the pipeline has the attribute list capability, a trailing `{...}`
//! on the caption is assigned to the table itself.

use std::cell::OnceCell;

use mdx_renderer::{Capability, Element, Node, Registry, TreeProcessor, assign_attrs};

/// Paragraph prefixes marking a caption.
const CAPTION_MARKERS: &[&str] = &["Table:", "table:", ":"];

/// Scanner state: the previous top-level node, if it can still pair up.
#[derive(Clone, Copy, Debug)]
enum Previous {
    None,
    Caption(usize),
    Table(usize),
}

/// Caption text and attribute list split from a caption paragraph.
#[derive(Debug, Default, PartialEq, Eq)]
struct CaptionCandidate {
    content: Vec<Node>,
    attrs: Option<String>,
}

impl CaptionCandidate {
    /// Split a caption paragraph's children into caption content and attributes.
    fn from_paragraph(mut content: Vec<Node>, use_attr_list: bool) -> Self {
        if let Some(Node::Text(first)) = content.first_mut() {
            let stripped = first
                .split_once(':')
                .map_or("", |(_, rest)| rest)
                .trim_start()
                .to_owned();
            *first = stripped;
        }

        let mut attrs = None;
        if let Some(Node::Text(last)) = content.last_mut() {
            let trimmed_len = last.trim_end().len();
            last.truncate(trimmed_len);
            if use_attr_list
                && last.ends_with('}')
                && let Some(open) = last.rfind('{')
            {
                attrs = Some(last[open + 1..last.len() - 1].to_owned());
                last.truncate(open);
                let trimmed_len = last.trim_end().len();
                last.truncate(trimmed_len);
            }
        }

        content.retain(|node| !matches!(node, Node::Text(text) if text.is_empty()));
        Self { content, attrs }
    }

    /// Insert the caption into `table` and apply attributes.
    fn attach(self, table: &mut Element) {
        if !self.content.is_empty() {
            let mut caption = Element::new("caption");
            caption.children = self.content;
            table.insert(0, caption);
        }
        if let Some(attrs) = self.attrs.filter(|a| !a.trim().is_empty()) {
            assign_attrs(table, &attrs);
        }
    }
}

/// Tree processor attaching caption paragraphs to adjacent tables.
///
/// Only direct children of the root are considered. A table that already
/// has a caption is treated like any other block, so running the processor
/// twice changes nothing.
///
/// # Example
///
/// ```
/// use mdx_extensions::TableCaptionProcessor;
/// use mdx_renderer::Markdown;
///
/// let mut md = Markdown::new().with_tree_processor(TableCaptionProcessor::new());
/// let html = md.convert("Table: Totals\n\n| a |\n|---|\n| 1 |");
/// assert!(html.starts_with("<table><caption>Totals</caption><thead>"));
/// ```
#[derive(Debug, Default)]
pub struct TableCaptionProcessor {
    /// Whether attribute lists are honored, read from the registry on first run.
    attr_list: OnceCell<bool>,
}

impl TableCaptionProcessor {
    /// Create a processor. Capabilities are read on the first run.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pairs of `(table index, caption index)` among `root`'s children.
    fn find_pairs(root: &Element) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        let mut previous = Previous::None;

        for (index, node) in root.children.iter().enumerate() {
            previous = if is_caption(node) {
                if let Previous::Table(table) = previous {
                    pairs.push((table, index));
                    Previous::None
                } else {
                    Previous::Caption(index)
                }
            } else if is_uncaptioned_table(node) {
                if let Previous::Caption(caption) = previous {
                    pairs.push((index, caption));
                    Previous::None
                } else {
                    Previous::Table(index)
                }
            } else {
                Previous::None
            };
        }

        pairs
    }
}

impl TreeProcessor for TableCaptionProcessor {
    fn name(&self) -> &'static str {
        "table_captions"
    }

    fn run(&mut self, root: &mut Element, registry: &Registry) {
        let use_attr_list = *self
            .attr_list
            .get_or_init(|| registry.has(Capability::AttrList));

        let pairs = Self::find_pairs(root);
        if pairs.is_empty() {
            return;
        }

        for &(table_index, caption_index) in &pairs {
            let content = root.children[caption_index]
                .as_element_mut()
                .map(|p| std::mem::take(&mut p.children))
                .unwrap_or_default();
            let candidate = CaptionCandidate::from_paragraph(content, use_attr_list);
            if let Some(table) = root.children[table_index].as_element_mut() {
                tracing::debug!(
                    table = table_index,
                    has_attrs = candidate.attrs.is_some(),
                    "Attached table caption"
                );
                candidate.attach(table);
            }
        }

        let mut removed: Vec<usize> = pairs.iter().map(|&(_, caption)| caption).collect();
        removed.sort_unstable();
        let children = std::mem::take(&mut root.children);
        root.children = children
            .into_iter()
            .enumerate()
            .filter(|(index, _)| removed.binary_search(index).is_err())
            .map(|(_, node)| node)
            .collect();
    }
}

fn is_caption(node: &Node) -> bool {
    node.as_element()
        .filter(|el| el.tag == "p")
        .and_then(Element::leading_text)
        .map(str::trim_start)
        .is_some_and(|text| CAPTION_MARKERS.iter().any(|m| text.starts_with(m)))
}

fn is_uncaptioned_table(node: &Node) -> bool {
    node.as_element()
        .is_some_and(|el| el.tag == "table" && !el.has_child("caption"))
}
