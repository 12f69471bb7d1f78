//! Cross-reference groups: `[@fig:a; see @sec:b]`.
//!
//! A bracketed span whose `;`-separated pieces all read
//! `<prefix>@<type>:<tag>` is replaced by a `span` of links to `#<type>:<tag>`.
//! One unparsable piece or unknown type leaves the whole span as plain text.
//!
//! Within a group, references are bucketed by type and then by the literal
//! prefix the author wrote, both in first-seen order:
//!
//! ```text
//! [@fig:a; @sec:b; @fig:c]      fig: {"": [a, c]}, sec: {"": [b]}
//! [A @fig:1; A @fig:2; B @fig:3]  fig: {"A": [1, 2], "B": [3]}
//! ```

use std::sync::LazyLock;

use mdx_config::{CrossRefConfig, RefType};
use mdx_renderer::{Element, InlineMatch, InlineProcessor};
use regex::{Captures, Regex};

/// Bracketed span. The image marker (`![...]`) is checked in `handle_match`.
static GROUP_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[([^\]]*)\]").unwrap());

static ONE_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<prefix>[^@]*)@(?P<type>\w+):(?P<tag>[\w-]+)$").unwrap()
});

/// Literal prefix that suppresses the label entirely: `[-@fig:a]`.
const SUPPRESS_PREFIX: &str = "-";

/// One `@type:tag` reference with the text written before it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AtomicReference {
    /// Referenced object kind.
    pub ref_type: RefType,
    /// Trimmed text before the `@` (may be empty or `-`).
    pub literal_prefix: String,
    /// Identifier after the colon.
    pub tag: String,
    /// Reference number. Always 0 until references are numbered.
    pub ordinal: u32,
}

impl AtomicReference {
    /// Parse one trimmed piece of a group. `None` if the syntax or type is not recognized.
    ///
    /// # Example
    ///
    /// ```
    /// use mdx_config::RefType;
    /// use mdx_extensions::AtomicReference;
    ///
    /// let r = AtomicReference::parse("Appendix @sec:A1").unwrap();
    /// assert_eq!(r.ref_type, RefType::Section);
    /// assert_eq!(r.literal_prefix, "Appendix");
    /// assert_eq!(r.target_id(), "sec:A1");
    ///
    /// assert!(AtomicReference::parse("@chapter:1").is_none());
    /// ```
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let caps = ONE_REF.captures(text)?;
        let ref_type = RefType::from_token(&caps["type"])?;
        Some(Self {
            ref_type,
            literal_prefix: caps["prefix"].trim().to_owned(),
            tag: caps["tag"].to_owned(),
            ordinal: 0,
        })
    }

    /// Link target without the leading `#`.
    #[must_use]
    pub fn target_id(&self) -> String {
        format!("{}:{}", self.ref_type, self.tag)
    }
}

/// References of one type that share a literal prefix.
#[derive(Debug)]
struct PrefixBucket {
    literal_prefix: String,
    refs: Vec<AtomicReference>,
}

/// All buckets of one reference type.
#[derive(Debug)]
struct TypeBucket {
    ref_type: RefType,
    prefixes: Vec<PrefixBucket>,
}

/// Ordered `type -> literal prefix -> references` table for one group.
#[derive(Debug, Default)]
pub struct GroupingTable {
    types: Vec<TypeBucket>,
}

impl GroupingTable {
    /// Parse the inside of a bracketed group.
    ///
    /// Returns `None` unless every `;`-separated piece is a valid reference.
    #[must_use]
    pub fn parse(group: &str) -> Option<Self> {
        let mut table = Self::default();
        for piece in group.split(';') {
            table.insert(AtomicReference::parse(piece.trim())?);
        }
        Some(table)
    }

    /// Add a reference to its bucket, creating buckets in first-seen order.
    pub fn insert(&mut self, reference: AtomicReference) {
        let type_index = match self
            .types
            .iter()
            .position(|t| t.ref_type == reference.ref_type)
        {
            Some(index) => index,
            None => {
                self.types.push(TypeBucket {
                    ref_type: reference.ref_type,
                    prefixes: Vec::new(),
                });
                self.types.len() - 1
            }
        };
        let prefixes = &mut self.types[type_index].prefixes;

        if let Some(bucket) = prefixes
            .iter_mut()
            .find(|b| b.literal_prefix == reference.literal_prefix)
        {
            bucket.refs.push(reference);
        } else {
            prefixes.push(PrefixBucket {
                literal_prefix: reference.literal_prefix.clone(),
                refs: vec![reference],
            });
        }
    }

    /// Reference types in first-seen order.
    pub fn types(&self) -> impl Iterator<Item = RefType> + '_ {
        self.types.iter().map(|t| t.ref_type)
    }

    /// Total number of references.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types
            .iter()
            .flat_map(|t| &t.prefixes)
            .map(|b| b.refs.len())
            .sum()
    }

    /// Whether the table holds no references.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Inline processor resolving cross-reference groups.
///
/// # Example
///
/// ```
/// use mdx_config::CrossRefConfig;
/// use mdx_extensions::CrossRefProcessor;
/// use mdx_renderer::Markdown;
///
/// let mut md = Markdown::new().with_inline(CrossRefProcessor::new(CrossRefConfig::default()));
/// assert_eq!(
///     md.convert("See [@fig:a;@fig:b]."),
///     r##"<p>See <span><a href="#fig:a">fig.</a>, <a href="#fig:b">fig.</a></span>.</p>"##
/// );
/// ```
pub struct CrossRefProcessor {
    config: CrossRefConfig,
}

impl CrossRefProcessor {
    /// Create a processor with the given rendering options.
    #[must_use]
    pub fn new(config: CrossRefConfig) -> Self {
        Self { config }
    }

    /// Rendering options.
    #[must_use]
    pub fn config(&self) -> &CrossRefConfig {
        &self.config
    }

    /// Render a parsed group as a `span` of links.
    ///
    /// Dropped types produce nothing; if every reference was dropped the span is empty.
    #[must_use]
    pub fn render(&self, table: &GroupingTable) -> Element {
        let grouped = self.config.enable_ref_group;
        let mut span = Element::new("span");
        // Text owed before the next link: a delimiter, then a hoisted label in group mode.
        let mut pending = String::new();

        for type_bucket in &table.types {
            if self.config.is_removed(type_bucket.ref_type) {
                continue;
            }
            for bucket in &type_bucket.prefixes {
                let plural = grouped && bucket.refs.len() > 1;
                let label = self.label(type_bucket.ref_type, &bucket.literal_prefix, plural);

                if grouped && !label.is_empty() {
                    pending.push_str(label);
                    pending.push(' ');
                }

                for reference in &bucket.refs {
                    span.push_text(&pending);
                    span.push(self.link(reference, label));
                    pending.clone_from(&self.config.ref_delim);
                }
                pending.clone_from(&self.config.group_delim);
            }
        }

        span
    }

    /// Label shown for a bucket.
    fn label<'a>(&'a self, ref_type: RefType, literal_prefix: &'a str, plural: bool) -> &'a str {
        match literal_prefix {
            "" => self.config.prefix(ref_type).select(plural).trim(),
            SUPPRESS_PREFIX => "",
            literal => literal,
        }
    }

    fn link(&self, reference: &AtomicReference, label: &str) -> Element {
        let mut parts = Vec::with_capacity(2);
        if !self.config.enable_ref_group && !label.is_empty() {
            parts.push(label.to_owned());
        }
        if self.config.enable_ref_number {
            parts.push(reference.ordinal.to_string());
        }

        Element::new("a")
            .with_attr("href", format!("#{}", reference.target_id()))
            .with_text(&parts.join(" "))
    }
}

impl InlineProcessor for CrossRefProcessor {
    fn name(&self) -> &'static str {
        "crossref"
    }

    fn pattern(&self) -> &Regex {
        &GROUP_PATTERN
    }

    fn handle_match(&self, captures: &Captures<'_>, text: &str) -> Option<InlineMatch> {
        let whole = captures.get(0)?;
        if text[..whole.start()].ends_with('!') {
            return None;
        }

        let group = captures.get(1)?.as_str();
        let Some(table) = GroupingTable::parse(group) else {
            if group.contains('@') {
                tracing::debug!(group, "Cross-reference group left as text");
            }
            return None;
        };

        Some(InlineMatch {
            node: self.render(&table).into(),
            span: whole.range(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdx_config::PrefixPair;
    use mdx_renderer::{Markdown, element_to_html};
    use pretty_assertions::assert_eq;

    fn render(config: CrossRefConfig, group: &str) -> Option<String> {
        let table = GroupingTable::parse(group)?;
        Some(element_to_html(&CrossRefProcessor::new(config).render(&table)))
    }

    fn convert(config: CrossRefConfig, markdown: &str) -> String {
        Markdown::new()
            .with_inline(CrossRefProcessor::new(config))
            .convert(markdown)
    }

    fn grouped() -> CrossRefConfig {
        CrossRefConfig {
            enable_ref_group: true,
            ..CrossRefConfig::default()
        }
    }

    #[test]
    fn test_parse_atomic_reference() {
        let r = AtomicReference::parse("@fig:example-1").unwrap();
        assert_eq!(r.ref_type, RefType::Figure);
        assert_eq!(r.literal_prefix, "");
        assert_eq!(r.tag, "example-1");
        assert_eq!(r.ordinal, 0);
        assert_eq!(r.target_id(), "fig:example-1");
    }

    #[test]
    fn test_parse_suppressed_prefix() {
        let r = AtomicReference::parse("-@eq:energy").unwrap();
        assert_eq!(r.literal_prefix, "-");
        assert_eq!(r.ref_type, RefType::Equation);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(AtomicReference::parse("fig:a").is_none());
        assert!(AtomicReference::parse("@fig").is_none());
        assert!(AtomicReference::parse("@fig:a b").is_none());
        assert!(AtomicReference::parse("a@b @fig:c").is_none());
        assert!(AtomicReference::parse("@figure:a").is_none());
        assert!(AtomicReference::parse("").is_none());
    }

    #[test]
    fn test_grouping_order() {
        let table = GroupingTable::parse("@fig:a;@sec:b;@fig:c").unwrap();
        assert_eq!(
            table.types().collect::<Vec<_>>(),
            vec![RefType::Figure, RefType::Section]
        );
        assert_eq!(table.len(), 3);
        let fig_tags: Vec<&str> = table.types[0].prefixes[0]
            .refs
            .iter()
            .map(|r| r.tag.as_str())
            .collect();
        assert_eq!(fig_tags, vec!["a", "c"]);
    }

    #[test]
    fn test_grouping_by_literal_prefix() {
        let table = GroupingTable::parse("A @fig:1; A @fig:2; B @fig:3; @fig:4").unwrap();
        let prefixes: Vec<(&str, usize)> = table.types[0]
            .prefixes
            .iter()
            .map(|b| (b.literal_prefix.as_str(), b.refs.len()))
            .collect();
        assert_eq!(prefixes, vec![("A", 2), ("B", 1), ("", 1)]);
    }

    #[test]
    fn test_group_rejected_when_any_piece_invalid() {
        assert!(GroupingTable::parse("@fig:a;@invalid:b").is_none());
        assert!(GroupingTable::parse("@fig:a;").is_none());
        assert!(GroupingTable::parse("").is_none());
        assert!(GroupingTable::parse("just text").is_none());
    }

    #[test]
    fn test_single_reference() {
        assert_eq!(
            render(CrossRefConfig::default(), "@fig:example1").unwrap(),
            r##"<span><a href="#fig:example1">fig.</a></span>"##
        );
    }

    #[test]
    fn test_ordering_and_delimiters() {
        assert_eq!(
            render(CrossRefConfig::default(), "@fig:a;@sec:b;@fig:c").unwrap(),
            r##"<span><a href="#fig:a">fig.</a>, <a href="#fig:c">fig.</a>, <a href="#sec:b">sec.</a></span>"##
        );
    }

    #[test]
    fn test_distinct_delimiters() {
        let config = CrossRefConfig {
            ref_delim: " & ".to_owned(),
            group_delim: "; ".to_owned(),
            ..CrossRefConfig::default()
        };
        assert_eq!(
            render(config, "@fig:a;@fig:b;@tbl:c").unwrap(),
            r##"<span><a href="#fig:a">fig.</a> &amp; <a href="#fig:b">fig.</a>; <a href="#tbl:c">tbl.</a></span>"##
        );
    }

    #[test]
    fn test_dropped_type_keeps_group_valid() {
        let config = CrossRefConfig {
            remove_ref_types: vec![RefType::Section],
            ..CrossRefConfig::default()
        };
        assert_eq!(
            render(config, "@fig:a;@sec:b").unwrap(),
            r##"<span><a href="#fig:a">fig.</a></span>"##
        );
    }

    #[test]
    fn test_dropped_type_between_kept_types() {
        let config = CrossRefConfig {
            remove_ref_types: vec![RefType::Section],
            ..CrossRefConfig::default()
        };
        assert_eq!(
            render(config, "@fig:a;@sec:b;@tbl:c").unwrap(),
            r##"<span><a href="#fig:a">fig.</a>, <a href="#tbl:c">tbl.</a></span>"##
        );
    }

    #[test]
    fn test_all_references_dropped_renders_empty() {
        let config = CrossRefConfig {
            remove_ref_types: vec![RefType::Section],
            ..CrossRefConfig::default()
        };
        assert_eq!(render(config.clone(), "@sec:a;@sec:b").unwrap(), "<span></span>");
        assert_eq!(convert(config, "See [@sec:a] here."), "<p>See <span></span> here.</p>");
    }

    #[test]
    fn test_suppressed_prefix() {
        assert_eq!(
            render(CrossRefConfig::default(), "-@fig:example1").unwrap(),
            r##"<span><a href="#fig:example1"></a></span>"##
        );
    }

    #[test]
    fn test_literal_prefix_non_grouped() {
        assert_eq!(
            render(CrossRefConfig::default(), "Prefix @fig:1").unwrap(),
            r##"<span><a href="#fig:1">Prefix</a></span>"##
        );
    }

    #[test]
    fn test_non_grouped_always_singular() {
        assert_eq!(
            render(CrossRefConfig::default(), "@fig:a;@fig:b").unwrap(),
            r##"<span><a href="#fig:a">fig.</a>, <a href="#fig:b">fig.</a></span>"##
        );
    }

    #[test]
    fn test_grouped_literal_prefixes() {
        assert_eq!(
            render(grouped(), "A @fig:1; A @fig:2; B @fig:3").unwrap(),
            r##"<span>A <a href="#fig:1"></a>, <a href="#fig:2"></a>, B <a href="#fig:3"></a></span>"##
        );
    }

    #[test]
    fn test_grouped_plural_default_prefix() {
        assert_eq!(
            render(grouped(), "@fig:a;@fig:b;@sec:c").unwrap(),
            r##"<span>figs. <a href="#fig:a"></a>, <a href="#fig:b"></a>, sec. <a href="#sec:c"></a></span>"##
        );
    }

    #[test]
    fn test_grouped_suppressed_prefix() {
        assert_eq!(
            render(grouped(), "-@fig:a;-@fig:b").unwrap(),
            r##"<span><a href="#fig:a"></a>, <a href="#fig:b"></a></span>"##
        );
    }

    #[test]
    fn test_ordinal_shown() {
        let config = CrossRefConfig {
            enable_ref_number: true,
            ..CrossRefConfig::default()
        };
        assert_eq!(
            render(config, "@fig:a;-@eq:b").unwrap(),
            r##"<span><a href="#fig:a">fig. 0</a>, <a href="#eq:b">0</a></span>"##
        );
    }

    #[test]
    fn test_grouped_ordinal_shown() {
        let config = CrossRefConfig {
            enable_ref_number: true,
            ..grouped()
        };
        assert_eq!(
            render(config, "@tbl:a;@tbl:b").unwrap(),
            r##"<span>tbls. <a href="#tbl:a">0</a>, <a href="#tbl:b">0</a></span>"##
        );
    }

    #[test]
    fn test_custom_prefixes_and_delims() {
        let config = CrossRefConfig {
            ref_delim: "、".to_owned(),
            group_delim: "、".to_owned(),
            remove_ref_types: vec![RefType::Section],
            ..CrossRefConfig::default()
        }
        .with_prefix(RefType::Figure, PrefixPair::new("此图", "此图"));
        assert_eq!(
            render(config, "@fig:example1;@fig:example2;@sec:example3;@fig:example2").unwrap(),
            r##"<span><a href="#fig:example1">此图</a>、<a href="#fig:example2">此图</a>、<a href="#fig:example2">此图</a></span>"##
        );
    }

    #[test]
    fn test_inline_in_paragraph() {
        assert_eq!(
            convert(
                CrossRefConfig::default(),
                "This is a reference to [@fig:example1] and another to [@tbl:example2]."
            ),
            r##"<p>This is a reference to <span><a href="#fig:example1">fig.</a></span> and another to <span><a href="#tbl:example2">tbl.</a></span>.</p>"##
        );
    }

    #[test]
    fn test_invalid_group_left_unchanged() {
        let markdown = "Invalid reference [@invalid:example].";
        assert_eq!(
            convert(CrossRefConfig::default(), markdown),
            "<p>Invalid reference [@invalid:example].</p>"
        );
    }

    #[test]
    fn test_mixed_valid_invalid_left_unchanged() {
        assert_eq!(
            convert(CrossRefConfig::default(), "Mixed [@fig:a;@chapter:b] text"),
            "<p>Mixed [@fig:a;@chapter:b] text</p>"
        );
    }

    #[test]
    fn test_image_marker_not_a_group() {
        assert_eq!(
            convert(CrossRefConfig::default(), r"Bang \![@fig:a] here"),
            "<p>Bang ![@fig:a] here</p>"
        );
    }

    #[test]
    fn test_plain_brackets_after_rejection() {
        assert_eq!(
            convert(CrossRefConfig::default(), "[note] then [@sec:intro]"),
            r##"<p>[note] then <span><a href="#sec:intro">sec.</a></span></p>"##
        );
    }

    #[test]
    fn test_code_span_untouched() {
        assert_eq!(
            convert(CrossRefConfig::default(), "`[@fig:a]`"),
            "<p><code>[@fig:a]</code></p>"
        );
    }

    #[test]
    fn test_no_references_round_trip() {
        let markdown = "Just *plain* text with [brackets] and a [link](https://example.com).";
        assert_eq!(
            convert(CrossRefConfig::default(), markdown),
            Markdown::new().convert(markdown)
        );
    }
}
