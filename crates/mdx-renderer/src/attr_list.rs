//! Attribute lists: `{#id .class key="value"}`.
//!
//! Parses the text between the braces and assigns the result to an element.

use crate::tree::Element;

/// Parsed attribute list.
///
/// # Example
///
/// ```
/// use mdx_renderer::AttrList;
///
/// let attrs = AttrList::parse(r#"#tbl:results .wide summary="Totals""#);
/// assert_eq!(attrs.id.as_deref(), Some("tbl:results"));
/// assert_eq!(attrs.classes, vec!["wide"]);
/// assert_eq!(attrs.get("summary"), Some("Totals"));
/// ```
#[derive(Debug, Default, PartialEq, Eq)]
pub struct AttrList {
    /// ID from `#id`. The last one wins.
    pub id: Option<String>,
    /// Classes from `.class`, in source order.
    pub classes: Vec<String>,
    /// Key-value attributes in source order.
    pub attrs: Vec<(String, String)>,
}

impl AttrList {
    /// Parse the inside of an attribute list (without braces).
    ///
    /// A leading `:` (`{: #id}`) is accepted. A bare word sets an attribute
    /// whose value is the word itself. Other characters are skipped.
    #[must_use]
    pub fn parse(attrs_str: &str) -> Self {
        let mut list = Self::default();
        let trimmed = attrs_str.trim();
        let mut remaining = trimmed.strip_prefix(':').unwrap_or(trimmed);

        while !remaining.is_empty() {
            remaining = remaining.trim_start();

            if let Some(rest) = remaining.strip_prefix('#') {
                let end = token_end(rest);
                if end > 0 {
                    list.id = Some(rest[..end].to_owned());
                }
                remaining = &rest[end..];
            } else if let Some(rest) = remaining.strip_prefix('.') {
                let end = token_end(rest);
                if end > 0 {
                    list.classes.push(rest[..end].to_owned());
                }
                remaining = &rest[end..];
            } else if let Some((key, value, rest)) = parse_key_value(remaining) {
                list.set(key, value);
                remaining = rest;
            } else if let Some((word, rest)) = parse_word(remaining) {
                list.set(word, word);
                remaining = rest;
            } else {
                // Skip unrecognized character
                let skip = remaining.chars().next().map_or(remaining.len(), char::len_utf8);
                remaining = &remaining[skip..];
            }
        }

        list
    }

    /// Get an attribute value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Whether nothing was parsed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.classes.is_empty() && self.attrs.is_empty()
    }

    /// Assign to an element.
    ///
    /// `id` and key-value pairs overwrite existing attributes; classes are
    /// appended to the existing `class` attribute.
    pub fn apply(self, element: &mut Element) {
        if let Some(id) = self.id {
            element.set("id", id);
        }
        for (key, value) in self.attrs {
            if key == "class" {
                append_class(element, &value);
            } else {
                element.set(key, value);
            }
        }
        for class in self.classes {
            append_class(element, &class);
        }
    }

    fn set(&mut self, key: &str, value: &str) {
        if let Some(slot) = self.attrs.iter_mut().find(|(k, _)| k == key) {
            value.clone_into(&mut slot.1);
        } else {
            self.attrs.push((key.to_owned(), value.to_owned()));
        }
    }
}

/// Parse `attrs_str` and assign it to `element`.
///
/// # Example
///
/// ```
/// use mdx_renderer::{Element, assign_attrs};
///
/// let mut table = Element::new("table").with_attr("class", "data");
/// assign_attrs(&mut table, "#tbl:x .wide");
/// assert_eq!(table.get("id"), Some("tbl:x"));
/// assert_eq!(table.get("class"), Some("data wide"));
/// ```
pub fn assign_attrs(element: &mut Element, attrs_str: &str) {
    AttrList::parse(attrs_str).apply(element);
}

fn append_class(element: &mut Element, class: &str) {
    let merged = match element.get("class") {
        Some(existing) if !existing.is_empty() => format!("{existing} {class}"),
        _ => class.to_owned(),
    };
    element.set("class", merged);
}

/// Length of an `#id` or `.class` token.
fn token_end(s: &str) -> usize {
    s.find(|c: char| c.is_whitespace() || c == '.' || c == '#')
        .unwrap_or(s.len())
}

/// Parse a key-value pair from the attributes string.
///
/// Supports: `key="value"`, `key='value'`, `key=value`
fn parse_key_value(s: &str) -> Option<(&str, &str, &str)> {
    let eq_pos = s.find('=')?;
    let key = &s[..eq_pos];

    if key.is_empty() || !key.chars().all(is_key_char) {
        return None;
    }

    let after_eq = &s[eq_pos + 1..];

    if let Some(stripped) = after_eq.strip_prefix('"') {
        let end_quote = stripped.find('"')?;
        Some((key, &stripped[..end_quote], &stripped[end_quote + 1..]))
    } else if let Some(stripped) = after_eq.strip_prefix('\'') {
        let end_quote = stripped.find('\'')?;
        Some((key, &stripped[..end_quote], &stripped[end_quote + 1..]))
    } else {
        let end = after_eq.find(char::is_whitespace).unwrap_or(after_eq.len());
        Some((key, &after_eq[..end], &after_eq[end..]))
    }
}

/// Parse a bare attribute name.
fn parse_word(s: &str) -> Option<(&str, &str)> {
    let end = s.find(|c: char| !is_key_char(c)).unwrap_or(s.len());
    if end == 0 {
        return None;
    }
    Some((&s[..end], &s[end..]))
}

fn is_key_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_' || c == ':'
}
