//! Binding descriptor keys to pages, and the per-page resource counts shown
//! in navigation.

use std::collections::{HashMap, HashSet};

use crate::formats::{ReportStatus, ResourceDescriptor, ResourceReportEntry};
use crate::page_id::StructuredId;
use crate::page_table::PageTable;
use crate::resources::ResourceIndex;

/// Resources grouped by the single page that owns them.
#[derive(Debug, Default)]
pub struct Ownership<'a> {
    by_page: HashMap<String, Vec<&'a ResourceDescriptor>>,
    mapped_keys: HashSet<String>,
}

impl<'a> Ownership<'a> {
    /// A key equal to a page identifier binds to that page; any other key
    /// binds to the first page in table order with that title.
    pub fn resolve(table: &PageTable, index: &'a ResourceIndex) -> Self {
        let ids = table
            .pages()
            .iter()
            .map(|p| p.page_id.as_str())
            .collect::<HashSet<_>>();

        let mut by_title: HashMap<&str, Vec<&str>> = HashMap::new();
        for page in table.pages() {
            let pages = by_title.entry(page.title.trim()).or_default();
            if !pages.contains(&page.page_id.as_str()) {
                pages.push(&page.page_id);
            }
        }

        let mut ownership = Ownership::default();
        for key in index.keys() {
            let page_id = if ids.contains(key) {
                Some(key)
            } else {
                by_title.get(key.trim()).and_then(|pages| {
                    if pages.len() > 1 {
                        tracing::warn!(
                            topic = key,
                            page_id = pages[0],
                            candidates = pages.len(),
                            "topic title matches several pages; using the first"
                        );
                    }
                    pages.first().copied()
                })
            };

            let resources = index.get(key);
            match page_id {
                Some(page_id) => {
                    tracing::debug!(key, page_id, resources = resources.len(), "mapped resources");
                    ownership.mapped_keys.insert(key.to_owned());
                    ownership
                        .by_page
                        .entry(page_id.to_owned())
                        .or_default()
                        .extend(resources);
                }
                None => {
                    for resource in resources {
                        tracing::warn!(
                            file = %resource.source_path.display(),
                            key,
                            "resource does not match any page_id or page title"
                        );
                    }
                }
            }
        }

        ownership
    }

    pub fn resources_of(&self, page_id: &str) -> &[&'a ResourceDescriptor] {
        self.by_page
            .get(page_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Resources a page will list: repeated `resource_id`s count once.
    fn distinct_count(&self, page_id: &str) -> usize {
        self.resources_of(page_id)
            .iter()
            .map(|r| r.resource_id.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn is_mapped(&self, key: &str) -> bool {
        self.mapped_keys.contains(key)
    }

    /// Fill in the `mapped` flag of loaded report entries.
    pub fn mark(&self, report: &mut [ResourceReportEntry]) {
        for entry in report {
            if entry.status == ReportStatus::Loaded {
                entry.mapped = entry.map_key.as_deref().map(|key| self.is_mapped(key));
            }
        }
    }

    /// Resources owned by each page plus all pages below it. Descendancy
    /// follows identifier segments and ignores the language tag.
    pub fn subtree_counts(&self, table: &PageTable) -> HashMap<String, usize> {
        let pages = table
            .page_ids()
            .into_iter()
            .map(|id| (id, StructuredId::parse(id), self.distinct_count(id)))
            .collect::<Vec<_>>();

        pages
            .iter()
            .map(|(id, structured, direct)| {
                let below = structured.as_ref().map_or(0, |parent| {
                    pages
                        .iter()
                        .filter(|(_, other, _)| {
                            other.as_ref().is_some_and(|o| o.is_descendant_of(parent))
                        })
                        .map(|(_, _, count)| count)
                        .sum()
                });
                ((*id).to_owned(), direct + below)
            })
            .collect()
    }
}

/// Direct child pages in the same language, sorted by identifier.
pub fn children_of<'t>(table: &'t PageTable, page_id: &str) -> Vec<&'t str> {
    let Some(parent) = StructuredId::parse(page_id) else {
        return Vec::new();
    };
    let mut children = table
        .page_ids()
        .into_iter()
        .filter(|id| {
            StructuredId::parse(id)
                .is_some_and(|child| child.lang() == parent.lang() && child.is_child_of(&parent))
        })
        .collect::<Vec<_>>();
    children.sort_unstable();
    children
}
