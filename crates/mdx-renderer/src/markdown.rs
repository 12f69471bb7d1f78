//! Markdown pipeline: parse, run processors, serialize.

use pulldown_cmark::{Options, Parser};

use crate::builder::TreeBuilder;
use crate::html::to_html;
use crate::processor::{InlineProcessor, TreeProcessor, apply_inline};
use crate::registry::{Capability, Registry};
use crate::tree::Element;

/// Markdown converter with pluggable processors.
///
/// Processing order:
///
/// 1. pulldown-cmark events are assembled into an [`Element`] tree.
/// 2. Inline processors run over all text, in registration order.
/// 3. Tree processors run once over the finished tree, in registration order.
///
/// The instance is reusable across documents; tree processors may cache
/// per-pipeline state between runs.
///
/// # Example
///
/// ```
/// use mdx_renderer::Markdown;
///
/// let mut md = Markdown::new();
/// assert_eq!(md.convert("# Hello\n\n**Bold** text"), "<h1>Hello</h1><p><strong>Bold</strong> text</p>");
/// ```
pub struct Markdown {
    registry: Registry,
    inline_processors: Vec<Box<dyn InlineProcessor>>,
    tree_processors: Vec<Box<dyn TreeProcessor>>,
}

impl Default for Markdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Markdown {
    /// Create a pipeline with no processors and no capabilities.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            inline_processors: Vec::new(),
            tree_processors: Vec::new(),
        }
    }

    /// Advertise a capability to tree processors.
    #[must_use]
    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.registry.register(capability);
        self
    }

    /// Register an inline processor.
    #[must_use]
    pub fn with_inline<P: InlineProcessor + 'static>(mut self, processor: P) -> Self {
        self.inline_processors.push(Box::new(processor));
        self
    }

    /// Register a tree processor.
    #[must_use]
    pub fn with_tree_processor<P: TreeProcessor + 'static>(mut self, processor: P) -> Self {
        self.tree_processors.push(Box::new(processor));
        self
    }

    /// Active capabilities.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Parser options: GFM tables and strikethrough, heading attributes.
    #[must_use]
    pub fn parser_options() -> Options {
        Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_HEADING_ATTRIBUTES
    }

    /// Parse markdown and run all processors, returning the root element.
    pub fn parse(&mut self, markdown: &str) -> Element {
        let parser = Parser::new_ext(markdown, Self::parser_options());
        let mut root = TreeBuilder::new().build(parser);
        self.process(&mut root);
        root
    }

    /// Run all processors over an already built tree.
    pub fn process(&mut self, root: &mut Element) {
        for processor in &self.inline_processors {
            tracing::debug!(processor = processor.name(), "Running inline processor");
            apply_inline(root, processor.as_ref());
        }
        for processor in &mut self.tree_processors {
            tracing::debug!(processor = processor.name(), "Running tree processor");
            processor.run(root, &self.registry);
        }
    }

    /// Convert markdown to HTML.
    pub fn convert(&mut self, markdown: &str) -> String {
        to_html(&self.parse(markdown))
    }
}
