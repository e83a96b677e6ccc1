//! Declarative column schema
//!
//! Every logical field the dashboard needs is described by a [`ColumnSpec`]:
//! its canonical name, the raw header spellings seen across spreadsheet
//! revisions (in priority order) and how its cells are cleaned. Adding a new
//! historical spelling is a data edit here or in the YAML config.

use crate::error::{SiteBwError, SiteBwResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Canonical (post-normalization) header names.
pub mod columns {
    pub const SITE_NAME: &str = "Site Name";
    pub const BW_GROUP: &str = "BW Group";
    pub const BW_ALLOCATED: &str = "BW Allocated";
    pub const MARCH_AVG: &str = "March Avg Mbps";
    pub const MARCH_MAX: &str = "March Max Mbps";
    pub const APRIL_AVG: &str = "April Avg Mbps";
    pub const APRIL_MAX: &str = "April Max Mbps";
    pub const MAY_AVG: &str = "May Avg Mbps";
    pub const MAY_MAX: &str = "May Max Mbps";
    pub const SITE_VALUE: &str = "Site Value Rs";
    pub const CRITERIA_1: &str = "Criteria 1 Max-C";
    pub const CRITERIA_2: &str = "Criteria 2 Avg-C";
    pub const CRITERIA_3: &str = "Criteria 3 BW Upgrade";

    /// Monthly average columns, oldest month first.
    pub const MONTHLY_AVG: [(&str, &str); 3] = [
        ("March", MARCH_AVG),
        ("April", APRIL_AVG),
        ("May", MAY_AVG),
    ];
}

//==============================================================================
// Strip patterns
//==============================================================================

/// A substring removed from cell text before numeric coercion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "StripPatternDef", into = "StripPatternDef")]
pub enum StripPattern {
    Literal(String),
    Regex(Regex),
}

/// On-disk form: `{ pattern: " Mbps" }` or `{ pattern: "(?i)mbps", regex: true }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StripPatternDef {
    pattern: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    regex: bool,
}

impl TryFrom<StripPatternDef> for StripPattern {
    type Error = SiteBwError;

    fn try_from(def: StripPatternDef) -> Result<Self, Self::Error> {
        if def.regex {
            StripPattern::regex(&def.pattern)
        } else {
            Ok(StripPattern::Literal(def.pattern))
        }
    }
}

impl From<StripPattern> for StripPatternDef {
    fn from(p: StripPattern) -> Self {
        match p {
            StripPattern::Literal(pattern) => StripPatternDef {
                pattern,
                regex: false,
            },
            StripPattern::Regex(re) => StripPatternDef {
                pattern: re.as_str().to_string(),
                regex: true,
            },
        }
    }
}

impl StripPattern {
    pub fn literal(s: impl Into<String>) -> Self {
        StripPattern::Literal(s.into())
    }

    pub fn regex(pattern: &str) -> SiteBwResult<Self> {
        Regex::new(pattern)
            .map(StripPattern::Regex)
            .map_err(|e| SiteBwError::Config(format!("Invalid strip pattern '{}': {}", pattern, e)))
    }

    /// Remove every occurrence of the pattern.
    pub fn strip<'a>(&self, text: &'a str) -> Cow<'a, str> {
        match self {
            StripPattern::Literal(lit) if lit.is_empty() => Cow::Borrowed(text),
            StripPattern::Literal(lit) => {
                if text.contains(lit.as_str()) {
                    Cow::Owned(text.replace(lit.as_str(), ""))
                } else {
                    Cow::Borrowed(text)
                }
            }
            StripPattern::Regex(re) => re.replace_all(text, ""),
        }
    }
}

impl PartialEq for StripPattern {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (StripPattern::Literal(a), StripPattern::Literal(b)) => a == b,
            (StripPattern::Regex(a), StripPattern::Regex(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

//==============================================================================
// Column specs
//==============================================================================

/// How a field's cells are treated.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ColumnKind {
    /// Cells are stripped of each pattern in turn and coerced to numbers.
    Numeric {
        #[serde(default)]
        strip: Vec<StripPattern>,
    },
    /// Cells are left as loaded; only the header is resolved.
    #[default]
    Categorical,
}

/// One logical field: canonical name, raw header aliases in priority order,
/// and its cleaning transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub canonical: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub kind: ColumnKind,
}

impl ColumnSpec {
    pub fn numeric(canonical: &str, aliases: &[&str], strip: Vec<StripPattern>) -> Self {
        Self {
            canonical: canonical.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            kind: ColumnKind::Numeric { strip },
        }
    }

    pub fn categorical(canonical: &str, aliases: &[&str]) -> Self {
        Self {
            canonical: canonical.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            kind: ColumnKind::Categorical,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.kind, ColumnKind::Numeric { .. })
    }

    pub fn strip_patterns(&self) -> &[StripPattern] {
        match &self.kind {
            ColumnKind::Numeric { strip } => strip,
            ColumnKind::Categorical => &[],
        }
    }

    /// Aliases in priority order, followed by the canonical name if it is
    /// not already listed.
    pub fn candidates(&self) -> Vec<&str> {
        let mut out: Vec<&str> = self.aliases.iter().map(String::as_str).collect();
        if !out.contains(&self.canonical.as_str()) {
            out.push(&self.canonical);
        }
        out
    }
}

/// A header rename applied after normalization, on exact match only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderRename {
    pub from: String,
    pub to: String,
}

impl HeaderRename {
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

//==============================================================================
// Built-in site bandwidth schema
//==============================================================================

fn mbps_patterns() -> Vec<StripPattern> {
    vec![StripPattern::literal(" Mbps"), StripPattern::literal("Mbps")]
}

fn currency_patterns() -> Vec<StripPattern> {
    vec![
        StripPattern::literal(","),
        StripPattern::literal("Rs."),
        StripPattern::literal("Rs"),
    ]
}

/// Column specs for the site bandwidth spreadsheet.
pub fn site_bandwidth_columns() -> Vec<ColumnSpec> {
    use columns::*;

    vec![
        ColumnSpec::categorical(SITE_NAME, &["Site Name", "Site", "Site_Name"]),
        ColumnSpec::categorical(BW_GROUP, &["BW Group", "BW_Group", "Bandwidth Group"]),
        ColumnSpec::numeric(
            BW_ALLOCATED,
            &["BW Allocated", "BW Allocated (Mbps)", "Allocated BW"],
            mbps_patterns(),
        ),
        ColumnSpec::numeric(MAY_AVG, &["May Avg (Mbps)", "May Avg"], mbps_patterns()),
        ColumnSpec::numeric(MAY_MAX, &["May Max (Mbps)", "May Max"], mbps_patterns()),
        ColumnSpec::numeric(APRIL_AVG, &["April Avg (Mbps)", "April Avg"], mbps_patterns()),
        ColumnSpec::numeric(APRIL_MAX, &["April Max (Mbps)", "April Max"], mbps_patterns()),
        ColumnSpec::numeric(MARCH_AVG, &["March Avg (Mbps)", "March Avg"], mbps_patterns()),
        ColumnSpec::numeric(MARCH_MAX, &["March Max (Mbps)", "March Max"], mbps_patterns()),
        ColumnSpec::numeric(
            SITE_VALUE,
            &[
                "Site Value (Rs.)****",
                "Site Value (Rs.)",
                "Site Value Rs.",
                "Site Value",
            ],
            currency_patterns(),
        ),
        ColumnSpec::numeric(
            CRITERIA_1,
            &["Criteria 1 (Max-C)*", "Criteria 1 (Max-C)", "Criteria 1 Max-C"],
            Vec::new(),
        ),
        ColumnSpec::numeric(
            CRITERIA_2,
            &["Criteria 2 (Avg-C)**", "Criteria 2 (Avg-C)", "Criteria 2 Avg-C"],
            Vec::new(),
        ),
        ColumnSpec::categorical(
            CRITERIA_3,
            &[
                "Criteria 3 (BW Upgrade)***",
                "Criteria 3 (BW Upgrade)",
                "Criteria 3 BW Upgrade",
                "Criteria 3 (Upgrade)",
            ],
        ),
    ]
}

/// Canonical spellings for the known "site value" header variants.
pub fn site_bandwidth_renames() -> Vec<HeaderRename> {
    vec![
        HeaderRename::new("Site Value", columns::SITE_VALUE),
        HeaderRename::new("Site Value LKR", columns::SITE_VALUE),
        HeaderRename::new("Site Value Rupees", columns::SITE_VALUE),
    ]
}
