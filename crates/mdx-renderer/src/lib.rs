//! Markdown document tree with pluggable processors.
//!
//! This crate parses markdown with pulldown-cmark into an [`Element`] tree,
//! lets [`InlineProcessor`]s and [`TreeProcessor`]s rewrite it, and serializes
//! the result to HTML.
//!
//! # Architecture
//!
//! - [`TreeBuilder`]: pulldown-cmark events to [`Element`]/[`Node`] tree
//! - [`InlineProcessor`]: regex-driven replacement of text spans
//! - [`TreeProcessor`]: whole-tree passes run after the tree is static
//! - [`Registry`]: capabilities a processor can query (e.g. [`Capability::AttrList`])
//! - [`to_html`]: compact HTML5 serialization
//!
//! # Example
//!
//! ```
//! use mdx_renderer::{Capability, Markdown};
//!
//! let mut md = Markdown::new().with_capability(Capability::AttrList);
//! let html = md.convert("| a |\n|---|\n| 1 |");
//! assert!(html.starts_with("<table>"));
//! ```

mod attr_list;
mod builder;
mod html;
mod markdown;
mod processor;
mod registry;
mod tree;

pub use attr_list::{AttrList, assign_attrs};
pub use builder::{ROOT_TAG, TreeBuilder};
pub use html::{element_to_html, escape_html, to_html};
pub use markdown::Markdown;
pub use processor::{InlineMatch, InlineProcessor, TreeProcessor};
pub use registry::{Capability, Registry};
pub use tree::{Element, Node};
