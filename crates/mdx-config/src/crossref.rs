//! Cross-reference rendering options.

use std::fmt;

use serde::Deserialize;

/// Kind of object a cross-reference points at.
///
/// Authors write the short token (`@fig:overview`); anything outside this set
/// is not a cross-reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
pub enum RefType {
    #[serde(rename = "fig")]
    Figure,
    #[serde(rename = "eq")]
    Equation,
    #[serde(rename = "tbl")]
    Table,
    #[serde(rename = "lst")]
    Listing,
    #[serde(rename = "sec")]
    Section,
}

impl RefType {
    /// Every reference type, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Figure,
        Self::Equation,
        Self::Table,
        Self::Listing,
        Self::Section,
    ];

    /// Look up a reference type by its author-facing token.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.token() == token)
    }

    /// Author-facing token (`fig`, `eq`, `tbl`, `lst`, `sec`).
    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Self::Figure => "fig",
            Self::Equation => "eq",
            Self::Table => "tbl",
            Self::Listing => "lst",
            Self::Section => "sec",
        }
    }
}

impl fmt::Display for RefType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Singular and plural label shown before a reference.
///
/// Deserializes from either a single string (used for both forms) or a
/// two-element `[singular, plural]` list.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawPrefix")]
pub struct PrefixPair {
    /// Label for a single reference (e.g. `fig.`).
    pub singular: String,
    /// Label for several references sharing one label (e.g. `figs.`).
    pub plural: String,
}

impl PrefixPair {
    /// Create a prefix pair.
    #[must_use]
    pub fn new(singular: impl Into<String>, plural: impl Into<String>) -> Self {
        Self {
            singular: singular.into(),
            plural: plural.into(),
        }
    }

    /// Pick the singular or plural label.
    #[must_use]
    pub fn select(&self, plural: bool) -> &str {
        if plural { &self.plural } else { &self.singular }
    }
}

#[derive(Deserialize)]
#[serde(untagged, expecting = "a prefix string or a [singular, plural] list")]
enum RawPrefix {
    Single(String),
    Pair(Vec<String>),
}

impl TryFrom<RawPrefix> for PrefixPair {
    type Error = String;

    fn try_from(raw: RawPrefix) -> Result<Self, Self::Error> {
        match raw {
            RawPrefix::Single(label) => Ok(Self::new(label.clone(), label)),
            RawPrefix::Pair(labels) => match <[String; 2]>::try_from(labels) {
                Ok([singular, plural]) => Ok(Self::new(singular, plural)),
                Err(labels) => Err(format!(
                    "prefix list must be [singular, plural], got {} entries",
                    labels.len()
                )),
            },
        }
    }
}

/// Cross-reference rendering configuration.
///
/// The camelCase aliases accept option names used by existing Markdown
/// extension configs (`refDelim`, `figPrefix`, ...).
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CrossRefConfig {
    /// Hoist the prefix once per group of references sharing it.
    #[serde(alias = "enableRefGroup")]
    pub enable_ref_group: bool,
    /// Show the reference ordinal in link text.
    #[serde(alias = "enableRefNumber")]
    pub enable_ref_number: bool,
    /// Prefix for figure references.
    #[serde(alias = "figPrefix")]
    pub fig_prefix: PrefixPair,
    /// Prefix for equation references.
    #[serde(alias = "eqnPrefix")]
    pub eqn_prefix: PrefixPair,
    /// Prefix for table references.
    #[serde(alias = "tblPrefix")]
    pub tbl_prefix: PrefixPair,
    /// Prefix for listing references.
    #[serde(alias = "lstPrefix")]
    pub lst_prefix: PrefixPair,
    /// Prefix for section references.
    #[serde(alias = "secPrefix")]
    pub sec_prefix: PrefixPair,
    /// Text between references of the same group.
    #[serde(alias = "refDelim")]
    pub ref_delim: String,
    /// Text between groups.
    #[serde(alias = "groupDelim")]
    pub group_delim: String,
    /// Reference types accepted in the source but dropped from the output.
    #[serde(alias = "removeRefTypes")]
    pub remove_ref_types: Vec<RefType>,
}

impl Default for CrossRefConfig {
    fn default() -> Self {
        Self {
            enable_ref_group: false,
            enable_ref_number: false,
            fig_prefix: PrefixPair::new("fig.", "figs."),
            eqn_prefix: PrefixPair::new("eq.", "eqns."),
            tbl_prefix: PrefixPair::new("tbl.", "tbls."),
            lst_prefix: PrefixPair::new("lst.", "lsts."),
            sec_prefix: PrefixPair::new("sec.", "secs."),
            ref_delim: ", ".to_owned(),
            group_delim: ", ".to_owned(),
            remove_ref_types: Vec::new(),
        }
    }
}

impl CrossRefConfig {
    /// Prefix pair configured for a reference type.
    #[must_use]
    pub fn prefix(&self, ref_type: RefType) -> &PrefixPair {
        match ref_type {
            RefType::Figure => &self.fig_prefix,
            RefType::Equation => &self.eqn_prefix,
            RefType::Table => &self.tbl_prefix,
            RefType::Listing => &self.lst_prefix,
            RefType::Section => &self.sec_prefix,
        }
    }

    /// Replace the prefix pair for a reference type.
    #[must_use]
    pub fn with_prefix(mut self, ref_type: RefType, prefix: PrefixPair) -> Self {
        let slot = match ref_type {
            RefType::Figure => &mut self.fig_prefix,
            RefType::Equation => &mut self.eqn_prefix,
            RefType::Table => &mut self.tbl_prefix,
            RefType::Listing => &mut self.lst_prefix,
            RefType::Section => &mut self.sec_prefix,
        };
        *slot = prefix;
        self
    }

    /// Whether references of this type are dropped from the output.
    #[must_use]
    pub fn is_removed(&self, ref_type: RefType) -> bool {
        self.remove_ref_types.contains(&ref_type)
    }
}
