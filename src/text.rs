use unicode_normalization::UnicodeNormalization as _;
use url::Url;

use crate::defaults::SLUG_FALLBACK;

const MAX_HOST_CHARS: usize = 28;

/// Lower-case ASCII slug: accents stripped, runs of other characters become `-`.
pub fn slugify(text: &str) -> String {
    let ascii = text
        .trim()
        .to_lowercase()
        .chars()
        .nfkd()
        .filter(char::is_ascii)
        .collect::<String>();

    let mut slug = String::with_capacity(ascii.len());
    let mut pending_dash = false;
    for ch in ascii.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        SLUG_FALLBACK.to_owned()
    } else {
        slug
    }
}

pub fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Loose boolean used by spreadsheets and hand-written YAML.
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "yes" | "y" | "1" | "on"
    )
}

/// Short link text for table cells: `<host> · <action>`.
pub fn url_label(url: &str) -> String {
    let host = Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_lowercase))
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| "link".to_owned());

    let action = if host.contains("github.com") {
        "open repository"
    } else if host.contains("streamlit") {
        "open app"
    } else {
        "open link"
    };

    let host = if host.chars().count() > MAX_HOST_CHARS {
        let mut cut = host.chars().take(MAX_HOST_CHARS - 1).collect::<String>();
        cut.push('…');
        cut
    } else {
        host
    };

    format!("{host} · {action}")
}
