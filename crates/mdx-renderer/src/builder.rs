//! Builds a document tree from pulldown-cmark events.

use pulldown_cmark::{Alignment, CodeBlockKind, Event, HeadingLevel, Tag, TagEnd};

use crate::tree::{Element, Node};

/// Tag of the synthetic root element holding top-level blocks.
pub const ROOT_TAG: &str = "div";

/// Open element on the builder stack.
struct Frame {
    element: Element,
    /// Children are spliced into the parent instead of wrapping them.
    transparent: bool,
}

impl Frame {
    fn element(element: Element) -> Self {
        Self {
            element,
            transparent: false,
        }
    }

    fn transparent() -> Self {
        Self {
            element: Element::default(),
            transparent: true,
        }
    }
}

/// State for the table currently being built.
#[derive(Default)]
struct TableState {
    alignments: Vec<Alignment>,
    in_head: bool,
    cell: usize,
}

impl TableState {
    fn cell_style(&self) -> Option<&'static str> {
        match self.alignments.get(self.cell)? {
            Alignment::None => None,
            Alignment::Left => Some("text-align: left"),
            Alignment::Center => Some("text-align: center"),
            Alignment::Right => Some("text-align: right"),
        }
    }
}

/// Converts a pulldown-cmark event stream into an [`Element`] tree.
///
/// Adjacent text events are merged, so bracketed spans that the parser
/// split (`[`, `@fig:a`, `]`) arrive as one text node for inline processors.
///
/// # Example
///
/// ```
/// use pulldown_cmark::Parser;
/// use mdx_renderer::TreeBuilder;
///
/// let root = TreeBuilder::new().build(Parser::new("See [@fig:a]."));
/// let p = root.children[0].as_element().unwrap();
/// assert_eq!(p.leading_text(), Some("See [@fig:a]."));
/// ```
pub struct TreeBuilder {
    stack: Vec<Frame>,
    table: TableState,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    /// Create a builder with an empty root.
    #[must_use]
    pub fn new() -> Self {
        Self {
            stack: vec![Frame::element(Element::new(ROOT_TAG))],
            table: TableState::default(),
        }
    }

    /// Consume events and return the root element.
    pub fn build<'a, I>(mut self, events: I) -> Element
    where
        I: IntoIterator<Item = Event<'a>>,
    {
        for event in events {
            self.process_event(event);
        }

        // Unbalanced streams only happen with hand-built events; fold what is left.
        while self.stack.len() > 1 {
            self.close();
        }
        self.stack
            .pop()
            .map(|frame| frame.element)
            .unwrap_or_else(|| Element::new(ROOT_TAG))
    }

    fn current(&mut self) -> &mut Element {
        if self.stack.is_empty() {
            self.stack.push(Frame::element(Element::new(ROOT_TAG)));
        }
        let last = self.stack.len() - 1;
        &mut self.stack[last].element
    }

    fn current_tag(&self) -> Option<&str> {
        self.stack.last().map(|frame| frame.element.tag.as_str())
    }

    fn open(&mut self, element: Element) {
        self.stack.push(Frame::element(element));
    }

    /// Pop the innermost frame and attach it to its parent.
    fn close(&mut self) {
        if self.stack.len() <= 1 {
            return;
        }
        let Some(frame) = self.stack.pop() else {
            return;
        };
        let parent = self.current();
        if frame.transparent {
            for child in frame.element.children {
                parent.push(child);
            }
        } else {
            parent.push(frame.element);
        }
    }

    fn process_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.current().push_text(&text),
            Event::Code(code) => {
                let code = Element::new("code").with_text(&code);
                self.current().push(code);
            }
            Event::InlineMath(math) | Event::DisplayMath(math) => {
                self.current().push_text(&math);
            }
            Event::Html(html) | Event::InlineHtml(html) => {
                self.current().push(Node::Html(html.to_string()));
            }
            Event::FootnoteReference(label) => {
                self.current().push_text(&format!("[^{label}]"));
            }
            Event::SoftBreak => self.current().push_text("\n"),
            Event::HardBreak => self.current().push(Element::new("br")),
            Event::Rule => self.current().push(Element::new("hr")),
            Event::TaskListMarker(checked) => {
                let mut input = Element::new("input")
                    .with_attr("type", "checkbox")
                    .with_attr("disabled", "");
                if checked {
                    input.set("checked", "");
                }
                self.current().push(input);
            }
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.open(Element::new("p")),
            Tag::Heading {
                level,
                id,
                classes,
                attrs,
            } => {
                let mut heading = Element::new(format!("h{}", heading_level_to_num(level)));
                if let Some(id) = id {
                    heading.set("id", id.to_string());
                }
                if !classes.is_empty() {
                    let classes: Vec<String> = classes.iter().map(ToString::to_string).collect();
                    heading.set("class", classes.join(" "));
                }
                for (key, value) in attrs {
                    heading.set(key.to_string(), value.map(|v| v.to_string()).unwrap_or_default());
                }
                self.open(heading);
            }
            Tag::BlockQuote(_) => self.open(Element::new("blockquote")),
            Tag::CodeBlock(kind) => {
                self.open(Element::new("pre"));
                let mut code = Element::new("code");
                if let CodeBlockKind::Fenced(info) = kind
                    && let Some(lang) = info.split_whitespace().next()
                {
                    code.set("class", format!("language-{lang}"));
                }
                self.open(code);
            }
            Tag::List(start) => {
                let list = match start {
                    Some(1) => Element::new("ol"),
                    Some(n) => Element::new("ol").with_attr("start", n.to_string()),
                    None => Element::new("ul"),
                };
                self.open(list);
            }
            Tag::Item => self.open(Element::new("li")),
            Tag::FootnoteDefinition(_) | Tag::HtmlBlock | Tag::MetadataBlock(_) => {
                self.stack.push(Frame::transparent());
            }
            Tag::DefinitionList => self.open(Element::new("dl")),
            Tag::DefinitionListTitle => self.open(Element::new("dt")),
            Tag::DefinitionListDefinition => self.open(Element::new("dd")),
            Tag::Table(alignments) => {
                self.table = TableState {
                    alignments,
                    ..TableState::default()
                };
                self.open(Element::new("table"));
            }
            Tag::TableHead => {
                self.table.in_head = true;
                self.table.cell = 0;
                self.open(Element::new("thead"));
                self.open(Element::new("tr"));
            }
            Tag::TableRow => {
                if self.current_tag() != Some("tbody") {
                    self.open(Element::new("tbody"));
                }
                self.table.cell = 0;
                self.open(Element::new("tr"));
            }
            Tag::TableCell => {
                let tag = if self.table.in_head { "th" } else { "td" };
                let mut cell = Element::new(tag);
                if let Some(style) = self.table.cell_style() {
                    cell.set("style", style);
                }
                self.open(cell);
            }
            Tag::Emphasis => self.open(Element::new("em")),
            Tag::Strong => self.open(Element::new("strong")),
            Tag::Strikethrough => self.open(Element::new("s")),
            Tag::Superscript => self.open(Element::new("sup")),
            Tag::Subscript => self.open(Element::new("sub")),
            Tag::Link {
                dest_url, title, ..
            } => {
                let mut link = Element::new("a").with_attr("href", dest_url.to_string());
                if !title.is_empty() {
                    link.set("title", title.to_string());
                }
                self.open(link);
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                // Alt text is collected from children and folded in on close.
                let mut image = Element::new("img").with_attr("src", dest_url.to_string());
                if !title.is_empty() {
                    image.set("title", title.to_string());
                }
                self.open(image);
            }
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::CodeBlock => {
                self.close();
                self.close();
            }
            TagEnd::TableHead => {
                self.close();
                self.close();
                self.table.in_head = false;
            }
            TagEnd::TableCell => {
                self.close();
                self.table.cell += 1;
            }
            TagEnd::Table => {
                if self.current_tag() == Some("tbody") {
                    self.close();
                }
                self.close();
                self.table = TableState::default();
            }
            TagEnd::Image => {
                let image = self.current();
                let alt = image.text_content();
                image.children.clear();
                image.set("alt", alt);
                self.close();
            }
            TagEnd::Paragraph
            | TagEnd::Heading(_)
            | TagEnd::BlockQuote(_)
            | TagEnd::HtmlBlock
            | TagEnd::List(_)
            | TagEnd::Item
            | TagEnd::FootnoteDefinition
            | TagEnd::DefinitionList
            | TagEnd::DefinitionListTitle
            | TagEnd::DefinitionListDefinition
            | TagEnd::TableRow
            | TagEnd::Emphasis
            | TagEnd::Strong
            | TagEnd::Strikethrough
            | TagEnd::Superscript
            | TagEnd::Subscript
            | TagEnd::Link
            | TagEnd::MetadataBlock(_) => self.close(),
        }
    }
}

/// Convert heading level enum to number (1-6).
fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
