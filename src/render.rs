//! Markdown rendering of the resources attached to one page.
//!
//! Output is a pure function of the descriptors and the page prefix: resources
//! are ordered by title, display codes and figure numbers are positional, and
//! figure URLs are derived from names only.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::Path;

use crate::defaults::{
    AFFILIATION_SENTINEL, EMPTY_CELL, INTERACTIVE_TYPE_PREFIX, NO_DESCRIPTION, NO_PREREQUISITES,
    NO_RESOURCES_NOTICE, NOT_AVAILABLE, URL_PLACEHOLDER, link_target, meaningful, or_not_available,
};
use crate::formats::{AdditionalLink, Author, Feature, FigureRecord, ResourceDescriptor};
use crate::text::{html_escape, slugify, url_label};

pub const DEFAULT_ASSETS_ROOT: &str = "/assets/resources";

const FIGURE_WIDTH_PCT: u32 = 70;
const COLLAPSE_LINKS_OVER: usize = 3;

#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Public path under which each resource's figure folder is published.
    pub assets_root: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            assets_root: DEFAULT_ASSETS_ROOT.to_owned(),
        }
    }
}

/// `04-01-003` on a structured page, `003` otherwise.
pub fn display_code(page_prefix: &str, ordinal: usize) -> String {
    if page_prefix.is_empty() {
        format!("{ordinal:03}")
    } else {
        format!("{page_prefix}-{ordinal:03}")
    }
}

pub fn anchor(code: &str, title: &str) -> String {
    slugify(&format!("{code} {title}"))
}

/// Public path of a figure: `/<root>/<key>/<key>_fig<id><ext>`.
///
/// `None` when the figure has no id or its original file name has no extension.
pub fn figure_path(assets_root: &str, storage_key: &str, figure: &FigureRecord) -> Option<String> {
    let id = figure.id.as_deref()?;
    let ext = figure
        .original_filename
        .as_deref()
        .map(Path::new)
        .and_then(Path::extension)
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .filter(|ext| !ext.is_empty())?;
    if storage_key.is_empty() {
        return None;
    }

    let root = assets_root.trim_matches('/');
    let root = if root.is_empty() {
        String::new()
    } else {
        format!("/{root}")
    };
    Some(format!("{root}/{storage_key}/{storage_key}_fig{id}.{ext}"))
}

/// Index of the cover figure: the first flagged one, else the first figure.
pub fn pick_cover(figures: &[FigureRecord]) -> Option<usize> {
    if figures.is_empty() {
        return None;
    }
    Some(figures.iter().position(|f| f.is_cover).unwrap_or(0))
}

/// Render the resource section of a page.
///
/// Resource ids must be unique on a page: when two descriptors share one, the
/// one listed first is kept and the later one is left out.
pub fn render_resources(
    resources: &[&ResourceDescriptor],
    page_prefix: &str,
    options: &RenderOptions,
) -> String {
    let mut seen: HashMap<&str, &Path> = HashMap::new();
    let mut unique = Vec::with_capacity(resources.len());
    for &resource in resources {
        match seen.entry(resource.resource_id.as_str()) {
            Entry::Occupied(first) => {
                tracing::error!(
                    resource_id = %resource.resource_id,
                    kept = %first.get().display(),
                    dropped = %resource.source_path.display(),
                    "duplicate resource_id on one page; leaving out the later descriptor"
                );
            }
            Entry::Vacant(slot) => {
                slot.insert(resource.source_path.as_path());
                unique.push(resource);
            }
        }
    }

    if unique.is_empty() {
        return format!("{NO_RESOURCES_NOTICE}\n");
    }

    unique.sort_by(|a, b| {
        a.title
            .to_lowercase()
            .cmp(&b.title.to_lowercase())
            .then_with(|| a.resource_id.cmp(&b.resource_id))
    });

    let codes = (1..=unique.len())
        .map(|ordinal| display_code(page_prefix, ordinal))
        .collect::<Vec<_>>();

    let mut md = String::new();
    if unique.len() > 1 {
        md.push_str("### Contents\n\n");
        md.push_str("| Index | Description |\n");
        md.push_str("| :--- | :--- |\n");
        for (resource, code) in unique.iter().zip(&codes) {
            md.push_str(&format!(
                "| **{code}** | [{}](#{}) |\n",
                link_text(&resource.title),
                anchor(code, &resource.title)
            ));
        }
        md.push('\n');
    }

    for (resource, code) in unique.iter().zip(&codes) {
        md.push_str(&render_resource(resource, code, options));
    }

    md
}

/// Render one resource block, ending with a separator.
pub fn render_resource(resource: &ResourceDescriptor, code: &str, options: &RenderOptions) -> String {
    let title = resource.title.as_str();
    let link = link_target(resource.url.as_deref());

    let mut md = String::new();
    md.push_str(&format!("<!-- resource_id: {} -->\n", resource.resource_id));
    md.push_str(&format!(
        "### <span class=\"resource-header\" id=\"{}\">\
         <span class=\"resource-id\">{code}</span>\
         <span class=\"resource-title\">{}</span></span>\n\n",
        anchor(code, title),
        html_escape(title)
    ));

    let release = meaningful(resource.date_released.as_deref())
        .map(|date| format!(" | **Released:** {date}"))
        .unwrap_or_default();
    md.push_str(&format!(
        "**Type:** {} | **Time:** {}{release}\n\n",
        or_not_available(resource.resource_type.as_deref()),
        or_not_available(resource.time_required.as_deref()),
    ));

    let figures = numbered_figures(resource, options);
    let (cover, gallery) = match figures.first() {
        Some(first) if first.is_cover => (Some(first), &figures[1..]),
        _ => (None, figures.as_slice()),
    };

    if let Some(cover) = cover {
        md.push_str(&render_figure(cover, title, link));
    }

    md.push_str(resource.description_short.as_deref().unwrap_or(NO_DESCRIPTION));
    md.push_str("\n\n");

    md.push_str(&format!(
        "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\"><strong>LAUNCH RESOURCE</strong></a>\n\n",
        html_escape(resource.url.as_deref().unwrap_or(URL_PLACEHOLDER))
    ));

    md.push_str(&detail_table(resource, link));
    md.push_str(&interactive_table(resource));

    if !gallery.is_empty() {
        md.push_str("\n### Images\n\n");
        for figure in gallery {
            md.push_str(&render_figure(figure, title, link));
        }
    }

    md.push_str("\n---\n\n");
    md
}

/// A figure that can be shown, with its position among the resource's images.
#[derive(Debug)]
struct NumberedFigure<'a> {
    number: usize,
    path: String,
    figure: &'a FigureRecord,
    is_cover: bool,
}

/// Cover first, then the remaining figures in their original order; figures
/// without a derivable path are left out and do not take a number.
fn numbered_figures<'a>(
    resource: &'a ResourceDescriptor,
    options: &RenderOptions,
) -> Vec<NumberedFigure<'a>> {
    let cover = pick_cover(&resource.figures);
    let ordered = cover
        .map(|idx| (idx, true))
        .into_iter()
        .chain(
            (0..resource.figures.len())
                .filter(|idx| Some(*idx) != cover)
                .map(|idx| (idx, false)),
        );

    ordered
        .filter_map(|(idx, is_cover)| {
            let figure = &resource.figures[idx];
            let path = figure_path(&options.assets_root, &resource.storage_key, figure)?;
            Some((path, figure, is_cover))
        })
        .enumerate()
        .map(|(pos, (path, figure, is_cover))| NumberedFigure {
            number: pos + 1,
            path,
            figure,
            is_cover,
        })
        .collect()
}

fn caption_text(figure: &FigureRecord) -> Option<String> {
    let parts = [
        figure.caption.clone(),
        figure.kind.as_ref().map(|kind| format!("({kind})")),
    ];
    let text = parts.into_iter().flatten().collect::<Vec<_>>().join(" ");
    if text.is_empty() { None } else { Some(text) }
}

fn render_figure(figure: &NumberedFigure<'_>, resource_title: &str, link: Option<&str>) -> String {
    let caption = match caption_text(figure.figure) {
        Some(text) if text.to_lowercase().starts_with("figure") => text,
        Some(text) => format!("Figure {}: {text}", figure.number),
        None => format!("Figure {}.", figure.number),
    };
    let alt = if figure.is_cover {
        resource_title.to_owned()
    } else {
        figure
            .figure
            .caption
            .clone()
            .unwrap_or_else(|| format!("Image for {resource_title}"))
    };

    let mut img = format!(
        "<img src=\"{{{{ \"{}\" | relative_url }}}}\" alt=\"{}\" \
         style=\"width:100%; height:auto; border:1px solid #cfcfcf; padding:6px; background:#fafafa; border-radius:4px;\">\n",
        figure.path,
        html_escape(&alt)
    );
    if let Some(link) = link {
        img = format!(
            "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\" style=\"display:inline-block; text-decoration:none;\">\n{img}</a>\n",
            html_escape(link)
        );
    }

    format!(
        "<div style=\"width:{FIGURE_WIDTH_PCT}%; margin: auto; text-align: center;\">\n\
         {img}\
         <p style=\"text-align: left; font-size: 0.9em; margin-top: 6px;\">\n\
         <em>{}</em>\n\
         </p>\n\
         </div>\n\n",
        html_escape(&caption)
    )
}

fn detail_table(resource: &ResourceDescriptor, link: Option<&str>) -> String {
    let mut md = String::new();
    md.push_str("| Detail | Value |\n");
    md.push_str("| :--- | :--- |\n");

    match link {
        Some(url) => {
            md.push_str(&format!(
                "| **URL** | <a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a> |\n",
                html_escape(url),
                html_escape(&url_label(url))
            ));
        }
        None => {
            md.push_str(&format!("| **URL** | {EMPTY_CELL} |\n"));
        }
    }

    if let Some(links) = additional_data_cell(&resource.additional_data) {
        md.push_str(&format!("| **Additional data** | {links} |\n"));
    }

    md.push_str(&format!(
        "| **Author(s)** | {} |\n",
        cell(&format_authors(&resource.authors))
    ));
    md.push_str(&format!(
        "| **Keywords** | {} |\n",
        cell(&join_or_dash(&resource.keywords))
    ));
    md.push_str(&format!(
        "| **Fit For** | {} |\n",
        cell(&join_or_dash(&resource.fit_for))
    ));
    md.push_str(&format!(
        "| **Prerequisites** | {} |\n",
        cell(resource.prerequisites.as_deref().unwrap_or(NO_PREREQUISITES))
    ));
    if !resource.references.is_empty() {
        let refs = resource
            .references
            .iter()
            .map(|r| cell(r))
            .collect::<Vec<_>>()
            .join("<br>");
        md.push_str(&format!("| **References** | {refs} |\n"));
    }

    md
}

fn additional_data_cell(links: &[AdditionalLink]) -> Option<String> {
    let rendered = links
        .iter()
        .filter_map(|item| {
            let url = link_target(Some(&item.url))?;
            let label = item.label.clone().unwrap_or_else(|| url_label(url));
            let mut line = format!(
                "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a>",
                html_escape(url),
                html_escape(&label)
            );
            if let Some(note) = item.note.as_deref() {
                line.push_str(&format!(
                    "<br><span style=\"font-size:0.9em;\">{}</span>",
                    html_escape(note)
                ));
            }
            Some(line)
        })
        .collect::<Vec<_>>();

    if rendered.is_empty() {
        return None;
    }
    let joined = rendered.join("<br>");
    if rendered.len() > COLLAPSE_LINKS_OVER {
        Some(format!(
            "<details style=\"margin-top:4px;\"><summary>Show links</summary>{joined}</details>"
        ))
    } else {
        Some(joined)
    }
}

/// `Name (Affiliation); ...`, or `N/A` for no authors.
pub fn format_authors(authors: &[Author]) -> String {
    if authors.is_empty() {
        return NOT_AVAILABLE.to_owned();
    }
    authors
        .iter()
        .map(|a| {
            format!(
                "{} ({})",
                a.name,
                a.affiliation.as_deref().unwrap_or(AFFILIATION_SENTINEL)
            )
        })
        .collect::<Vec<_>>()
        .join("; ")
}

fn join_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        EMPTY_CELL.to_owned()
    } else {
        items.join(", ")
    }
}

fn interactive_table(resource: &ResourceDescriptor) -> String {
    let is_interactive = resource
        .resource_type
        .as_deref()
        .is_some_and(|t| t.trim().to_lowercase().starts_with(INTERACTIVE_TYPE_PREFIX));
    if !is_interactive {
        return String::new();
    }

    let features = &resource.features;
    let rows: [(&str, Feature, fn(&str) -> String); 4] = [
        ("Multipage app", features.multipage, |n| format!("yes – {n} page(s)")),
        ("Interactive plots", features.interactive_plots, |n| {
            format!("{n} interactive plot(s)")
        }),
        ("Assessments included", features.assessments, |n| format!("{n} question(s)")),
        ("Videos included", features.videos, |n| format!("{n} video(s)")),
    ];

    let rows = rows
        .into_iter()
        .filter(|(_, feature, _)| feature.present)
        .map(|(label, feature, phrase)| (label, phrase(&count_phrase(feature))))
        .collect::<Vec<_>>();
    if rows.is_empty() {
        return String::new();
    }

    let mut md = String::from("\n### Streamlit app details\n\n| Detail | Value |\n| :--- | :--- |\n");
    for (label, value) in rows {
        md.push_str(&format!("| {label} | {value} |\n"));
    }
    md
}

fn count_phrase(feature: Feature) -> String {
    match feature.count {
        Some(n) => n.to_string(),
        None => "unknown number of".to_owned(),
    }
}

/// Contents-table link text: HTML-escaped, with brackets that would end the
/// link label escaped for Markdown.
fn link_text(title: &str) -> String {
    cell(&html_escape(title))
        .replace('[', "\\[")
        .replace(']', "\\]")
}

/// Keep table cells on one row.
fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
