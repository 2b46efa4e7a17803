//! Structured page identifiers.
//!
//! A structured identifier is a fixed-width run of digits followed by `_` and a
//! language tag, e.g. `040100_en`. The digits are read as [`SEGMENT_COUNT`]
//! segments of [`SEGMENT_WIDTH`] characters each; `00` marks an unused level.

use std::sync::LazyLock;

use regex::Regex;

pub const SEGMENT_WIDTH: usize = 2;
pub const SEGMENT_COUNT: usize = 3;
pub const ZERO_SEGMENT: &str = "00";
pub const PREFIX_SEPARATOR: &str = "-";

// Whitespace separates code groups as well as `-`, so a title that itself
// opens with a two-digit number ("04 10 Things") loses it too. Stripping once
// therefore leaves nothing for a second pass to remove.
static LEADING_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}(?:[-\s]+\d{2})*\s+").expect("valid leading code regex"));

/// A decoded structured identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredId {
    segments: Vec<String>,
    lang: String,
}

impl StructuredId {
    pub fn parse(page_id: &str) -> Option<Self> {
        let (digits, lang) = page_id.trim().split_once('_')?;
        if digits.len() != SEGMENT_WIDTH * SEGMENT_COUNT
            || !digits.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }

        let segments = digits
            .as_bytes()
            .chunks(SEGMENT_WIDTH)
            .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
            .collect();

        Some(Self {
            segments,
            lang: lang.to_owned(),
        })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }

    /// Segments with trailing `00` levels removed.
    pub fn trimmed(&self) -> &[String] {
        trim_trailing_zeros(&self.segments)
    }

    pub fn prefix(&self) -> String {
        prefix(&self.segments)
    }

    /// Identifier of the ancestor at `depth` (1-based) in the same language:
    /// the first `depth` segments are kept and the rest zeroed.
    pub fn ancestor(&self, depth: usize) -> String {
        let digits = self
            .segments
            .iter()
            .enumerate()
            .map(|(idx, seg)| if idx < depth { seg.as_str() } else { ZERO_SEGMENT })
            .collect::<String>();
        format!("{digits}_{}", self.lang)
    }

    /// True when `self` lies strictly below `other`, ignoring the language tag.
    pub fn is_descendant_of(&self, other: &StructuredId) -> bool {
        let mine = self.trimmed();
        let theirs = other.trimmed();
        !theirs.is_empty() && mine.len() > theirs.len() && mine.starts_with(theirs)
    }

    /// True when `self` is exactly one level below `other`, ignoring the language tag.
    pub fn is_child_of(&self, other: &StructuredId) -> bool {
        self.is_descendant_of(other) && self.trimmed().len() == other.trimmed().len() + 1
    }
}

/// Decode an identifier into its segments; an unstructured identifier yields
/// no segments.
pub fn decode(page_id: &str) -> Vec<String> {
    StructuredId::parse(page_id)
        .map(|id| id.segments)
        .unwrap_or_default()
}

/// Join segments after dropping trailing zero segments. All-zero yields `""`.
pub fn prefix(segments: &[String]) -> String {
    trim_trailing_zeros(segments).join(PREFIX_SEPARATOR)
}

pub fn prefix_of(page_id: &str) -> String {
    prefix(&decode(page_id))
}

/// Remove a leading ordinal code such as `04 ` or `04-01 ` from a title.
pub fn strip_leading_code(title: &str) -> String {
    let trimmed = title.trim();
    let stripped = LEADING_CODE.replace(trimmed, "");
    let stripped = stripped.trim();
    if stripped.is_empty() {
        trimmed.to_owned()
    } else {
        stripped.to_owned()
    }
}

fn trim_trailing_zeros(segments: &[String]) -> &[String] {
    let end = segments
        .iter()
        .rposition(|seg| seg != ZERO_SEGMENT)
        .map_or(0, |idx| idx + 1);
    &segments[..end]
}
