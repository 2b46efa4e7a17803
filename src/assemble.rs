use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::defaults::INJECTION_MARKER;
use crate::hierarchy::GenerationRecord;

/// Optional parts appended after the injected content.
#[derive(Debug, Clone, Default)]
pub struct PageExtras {
    /// Trailing list of child pages.
    pub child_contents: Option<String>,
    pub page_id_footer: bool,
}

/// Insert `content` right after the injection marker, keeping the marker so
/// the page can be regenerated. Without a marker the content is appended.
pub fn inject(skeleton: &str, content: &str, page_id: &str) -> String {
    match skeleton.split_once(INJECTION_MARKER) {
        Some((before, after)) => format!("{before}{INJECTION_MARKER}\n\n{content}{after}"),
        None => {
            tracing::warn!(page_id, "injection marker not found; appending resources at the end");
            format!("{skeleton}\n\n{content}")
        }
    }
}

/// The complete page text: front matter, maintainer comments and body.
pub fn assemble(
    record: &GenerationRecord,
    content: &str,
    extras: &PageExtras,
) -> anyhow::Result<String> {
    let yaml =
        serde_yaml::to_string(&record.front_matter).context("serialize page front matter")?;

    let mut body = inject(&record.skeleton, content, &record.page_id);
    if let Some(children) = extras.child_contents.as_deref() {
        body.push_str("\n---\n\n## Table of Contents\n\n");
        body.push_str(children);
    }
    if extras.page_id_footer {
        body.push_str(&format!("\n---\n\n_Page ID: {}_\n", record.page_id));
    }

    Ok(format!("---\n{yaml}---\n\n{}\n{body}", record.comments))
}

pub fn output_path(out_dir: &Path, page_id: &str) -> anyhow::Result<PathBuf> {
    if page_id.is_empty()
        || page_id == "."
        || page_id == ".."
        || page_id.contains(['/', '\\'])
    {
        anyhow::bail!("page_id cannot be used as a file name: {page_id:?}");
    }
    Ok(out_dir.join(format!("{page_id}.md")))
}

/// Write a page in one step: the text goes to a temporary file in `out_dir`
/// which then replaces the target.
pub fn write_page(out_dir: &Path, page_id: &str, contents: &str) -> anyhow::Result<PathBuf> {
    let path = output_path(out_dir, page_id)?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".topicpages-")
        .suffix(".md.tmp")
        .tempfile_in(out_dir)
        .with_context(|| format!("create temporary page in {}", out_dir.display()))?;
    tmp.write_all(contents.as_bytes())
        .with_context(|| format!("write page: {}", path.display()))?;
    tmp.flush()
        .with_context(|| format!("flush page: {}", path.display()))?;
    tmp.persist(&path)
        .map_err(|err| err.error)
        .with_context(|| format!("persist page: {}", path.display()))?;

    Ok(path)
}
