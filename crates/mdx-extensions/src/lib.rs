//! Cross-reference and table caption passes for mdx.
//!
//! - [`CrossRefProcessor`]: inline processor turning `[@fig:a; @tbl:b]` groups
//!   into spans of links to `#fig:a`, `#tbl:b`.
//! - [`TableCaptionProcessor`]: tree processor moving `Table: ...` paragraphs
//!   into the `<caption>` of the adjacent table.
//!
//! [`build_markdown`] assembles a pipeline from a loaded [`Config`].

mod crossref;
mod table_captions;

pub use crossref::{AtomicReference, CrossRefProcessor, GroupingTable};
pub use table_captions::TableCaptionProcessor;

use mdx_config::Config;
use mdx_renderer::{Capability, Markdown};

/// Build a pipeline with the passes enabled in `config`.
///
/// # Example
///
/// ```
/// use mdx_config::Config;
/// use mdx_extensions::build_markdown;
///
/// let mut md = build_markdown(&Config::default());
/// assert_eq!(
///     md.convert("See [@tbl:totals]."),
///     r##"<p>See <span><a href="#tbl:totals">tbl.</a></span>.</p>"##
/// );
/// ```
#[must_use]
pub fn build_markdown(config: &Config) -> Markdown {
    let extensions = &config.extensions;
    let mut md = Markdown::new();

    if extensions.attr_list {
        md = md.with_capability(Capability::AttrList);
    }
    if extensions.crossref {
        md = md.with_inline(CrossRefProcessor::new(config.crossref.clone()));
    }
    if extensions.table_captions {
        md = md.with_tree_processor(TableCaptionProcessor::new());
    }

    tracing::debug!(
        crossref = extensions.crossref,
        table_captions = extensions.table_captions,
        attr_list = extensions.attr_list,
        "Built markdown pipeline"
    );
    md
}
