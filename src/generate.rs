use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::assemble::{PageExtras, assemble, write_page};
use crate::cli::GenerateArgs;
use crate::formats::PageRecord;
use crate::hierarchy::{is_root, resolve};
use crate::ownership::{Ownership, children_of};
use crate::page_id::prefix_of;
use crate::page_table::PageTable;
use crate::render::{RenderOptions, render_resources};
use crate::resources::ResourceIndex;

/// Per-run inputs shared by every page.
struct Site<'a> {
    table: &'a PageTable,
    ownership: &'a Ownership<'a>,
    counts: HashMap<String, usize>,
    options: RenderOptions,
    page_id_footer: bool,
}

pub fn run(args: GenerateArgs) -> anyhow::Result<()> {
    let out_dir = PathBuf::from(&args.out);

    let table = PageTable::load(Path::new(&args.pages)).context("load page table")?;
    tracing::info!(pages = table.pages().len(), "loaded page table");
    let index = ResourceIndex::load(Path::new(&args.resources));
    let ownership = Ownership::resolve(&table, &index);

    let site = Site {
        table: &table,
        ownership: &ownership,
        counts: ownership.subtree_counts(&table),
        options: RenderOptions {
            assets_root: args.assets_root.clone(),
        },
        page_id_footer: args.page_id_footer,
    };

    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("create output dir: {}", out_dir.display()))?;

    let mut written = 0usize;
    let mut skipped = 0usize;
    for page in select(&table, &args.page_ids) {
        if is_root(page) {
            tracing::debug!(page_id = %page.page_id, "root page is maintained by hand; skipping");
            continue;
        }
        match site.page_text(page) {
            Ok(Some(text)) => {
                let path = write_page(&out_dir, &page.page_id, &text)?;
                tracing::debug!(page_id = %page.page_id, path = %path.display(), "wrote page");
                written += 1;
            }
            Ok(None) => {}
            Err(err) => {
                tracing::error!(page_id = %page.page_id, "skipping page: {err:#}");
                skipped += 1;
            }
        }
    }
    tracing::info!(written, skipped, out = %out_dir.display(), "generated pages");

    if let Some(report_path) = args.report.as_deref() {
        let mut entries = index.report().to_vec();
        ownership.mark(&mut entries);
        crate::report::write(Path::new(report_path), entries).context("write report")?;
    }

    Ok(())
}

/// Pages to regenerate, in table order. An empty selection means all pages.
fn select<'t>(table: &'t PageTable, page_ids: &[String]) -> Vec<&'t PageRecord> {
    if page_ids.is_empty() {
        return table.pages().iter().collect();
    }

    let wanted = page_ids.iter().map(String::as_str).collect::<HashSet<_>>();
    for id in &wanted {
        if !table.contains_id(id) {
            tracing::warn!(page_id = id, "requested page is not in the page table");
        }
    }
    table
        .pages()
        .iter()
        .filter(|page| wanted.contains(page.page_id.as_str()))
        .collect()
}

impl Site<'_> {
    /// Full text of one page; `None` for pages that are not generated.
    fn page_text(&self, page: &PageRecord) -> anyhow::Result<Option<String>> {
        let Some(mut record) = resolve(page, self.table) else {
            return Ok(None);
        };
        record.front_matter.nav_title = Some(format!(
            "{} [{}]",
            page.title,
            self.count_of(&page.page_id)
        ));

        let resources = self.ownership.resources_of(&page.page_id);
        let content = render_resources(resources, &prefix_of(&page.page_id), &self.options);
        tracing::debug!(page_id = %page.page_id, resources = resources.len(), "rendered page");

        let extras = PageExtras {
            child_contents: if page.has_children {
                self.child_contents(&page.page_id)
            } else {
                None
            },
            page_id_footer: self.page_id_footer,
        };
        assemble(&record, &content, &extras).map(Some)
    }

    fn count_of(&self, page_id: &str) -> usize {
        self.counts.get(page_id).copied().unwrap_or_default()
    }

    fn child_contents(&self, page_id: &str) -> Option<String> {
        let children = children_of(self.table, page_id);
        if children.is_empty() {
            return None;
        }

        let mut md = String::new();
        for child in children {
            let title = self.table.title_of(child).unwrap_or(child);
            md.push_str(&format!(
                "- [{title}]({child}.html) [{}]\n",
                self.count_of(child)
            ));
        }
        Some(md)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
page_id,parent_id,title,display_order,has_children,layout,lang_code,description
000000_en,,00 Welcome,0,true,home,en,
040000_en,000000_en,04 Vadose Physics,4,true,home,en,
040100_en,040000_en,01 Soil Properties,1,false,home,en,
";

    #[test]
    fn selection_keeps_table_order_and_ignores_unknown_ids() -> anyhow::Result<()> {
        let table = PageTable::from_reader(TABLE.as_bytes())?;

        let all = select(&table, &[]);
        assert_eq!(all.len(), 3);

        let some = select(
            &table,
            &["040100_en".to_owned(), "999999_en".to_owned(), "040000_en".to_owned()],
        );
        let ids = some.iter().map(|p| p.page_id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["040000_en", "040100_en"]);
        Ok(())
    }

    #[test]
    fn category_page_lists_children_with_counts() -> anyhow::Result<()> {
        let table = PageTable::from_reader(TABLE.as_bytes())?;
        let index = ResourceIndex::default();
        let ownership = Ownership::resolve(&table, &index);
        let site = Site {
            table: &table,
            ownership: &ownership,
            counts: ownership.subtree_counts(&table),
            options: RenderOptions::default(),
            page_id_footer: false,
        };

        let page = &table.pages()[1];
        let text = site.page_text(page)?.expect("category page is generated");
        assert!(text.contains("nav_title: 04 Vadose Physics [0]\n"));
        assert!(text.contains("## Table of Contents\n\n- [01 Soil Properties](040100_en.html) [0]\n"));

        assert!(site.page_text(&table.pages()[0])?.is_none());
        Ok(())
    }
}
