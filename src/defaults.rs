//! Placeholder and sentinel values, plus the rules for substituting them.
//!
//! Loaded records keep missing values as `None`; the renderer and the
//! hierarchy resolver are the only places that turn them into display text.

/// Identifier of the root welcome page, which lives outside the generated tree.
pub const ROOT_PAGE_ID: &str = "000000_en";

/// The root page title as written in the page table, and its navigation name.
pub const ROOT_TITLE_RAW: &str = "00 Welcome";
pub const ROOT_TITLE_NAV: &str = "Welcome";

pub const DEFAULT_LAYOUT: &str = "home";
pub const DEFAULT_LANG_CODE: &str = "en";
pub const DEFAULT_TOPIC_INTRO: &str = "Introductory content for this topic will be added here.";

pub const INJECTION_MARKER: &str = "<!--INJECT_RESOURCE_LIST_HERE-->";

pub const NO_RESOURCES_NOTICE: &str = "No resources submitted for this topic yet.";

pub const PLACEHOLDER_PREFIX: &str = "TO_BE_FILLED";
pub const AFFILIATION_SENTINEL: &str = "TO_BE_FILLED_BY_COURSE_MANAGER";

pub const NOT_AVAILABLE: &str = "N/A";
pub const EMPTY_CELL: &str = "—";
pub const NO_DESCRIPTION: &str = "No description provided.";
pub const NO_PREREQUISITES: &str = "None specified.";
pub const URL_PLACEHOLDER: &str = "#";
pub const SLUG_FALLBACK: &str = "resource";

/// Type prefix (case-insensitive) of resources that get the interactive details table.
pub const INTERACTIVE_TYPE_PREFIX: &str = "streamlit";

/// True for values an author left as "fill in later".
pub fn is_placeholder(value: &str) -> bool {
    value
        .trim()
        .to_ascii_uppercase()
        .starts_with(PLACEHOLDER_PREFIX)
}

/// A value that is present and not a placeholder.
pub fn meaningful(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && !is_placeholder(v))
}

pub fn or_not_available(value: Option<&str>) -> &str {
    value.unwrap_or(NOT_AVAILABLE)
}

/// Usable link target, if any. `#` and placeholders are not links.
pub fn link_target(url: Option<&str>) -> Option<&str> {
    meaningful(url).filter(|u| *u != URL_PLACEHOLDER)
}

/// Page-table titles are shown as-is in navigation, except the root title.
pub fn nav_title(title: &str) -> String {
    let title = title.trim();
    if title == ROOT_TITLE_RAW {
        ROOT_TITLE_NAV.to_owned()
    } else {
        title.to_owned()
    }
}
