use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use anyhow::Context as _;
use serde::Deserialize;

use crate::formats::PageRecord;
use crate::text::parse_flag;

pub const REQUIRED_COLUMNS: [&str; 8] = [
    "page_id",
    "parent_id",
    "title",
    "display_order",
    "has_children",
    "layout",
    "lang_code",
    "description",
];

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PageRow {
    page_id: String,
    parent_id: String,
    title: String,
    display_order: String,
    has_children: String,
    layout: String,
    lang_code: String,
    description: String,
}

impl TryFrom<PageRow> for PageRecord {
    type Error = anyhow::Error;

    fn try_from(row: PageRow) -> anyhow::Result<Self> {
        if row.page_id.is_empty() {
            anyhow::bail!("page_id is empty");
        }
        let display_order = row
            .display_order
            .parse::<i64>()
            .with_context(|| format!("display_order is not an integer: {:?}", row.display_order))?;

        Ok(PageRecord {
            page_id: row.page_id,
            parent_id: non_empty(row.parent_id),
            title: row.title,
            display_order,
            has_children: parse_flag(&row.has_children),
            layout: non_empty(row.layout),
            lang_code: non_empty(row.lang_code),
            description: non_empty(row.description),
        })
    }
}

/// The page table plus the id lookups the hierarchy resolver needs.
///
/// Lookups cover every row with an identifier, including rows that were
/// skipped for other defects, so that children still resolve their parents.
#[derive(Debug, Default)]
pub struct PageTable {
    pages: Vec<PageRecord>,
    titles: HashMap<String, String>,
    parents: HashMap<String, String>,
}

impl PageTable {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("open page table: {}", path.display()))?;
        Self::from_reader(file).with_context(|| format!("read page table: {}", path.display()))
    }

    pub fn from_reader(reader: impl Read) -> anyhow::Result<Self> {
        let mut csv = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv.headers().context("read page table header")?.clone();
        let missing = REQUIRED_COLUMNS
            .iter()
            .filter(|col| !headers.iter().any(|h| h == **col))
            .copied()
            .collect::<Vec<_>>();
        if !missing.is_empty() {
            anyhow::bail!("page table is missing required columns: {}", missing.join(", "));
        }

        let mut table = PageTable::default();
        for record in csv.records() {
            let record = record.context("read page table row")?;
            let line = record.position().map_or(0, csv::Position::line);
            let row: PageRow = record
                .deserialize(Some(&headers))
                .with_context(|| format!("decode page table row at line {line}"))?;

            if !row.page_id.is_empty() {
                if table.titles.contains_key(&row.page_id) {
                    tracing::warn!(
                        page_id = %row.page_id,
                        line,
                        "duplicate page_id in page table; the later row wins"
                    );
                }
                table.titles.insert(row.page_id.clone(), row.title.clone());
                table
                    .parents
                    .insert(row.page_id.clone(), row.parent_id.clone());
            }

            let page_id = row.page_id.clone();
            match PageRecord::try_from(row) {
                Ok(page) => table.pages.push(page),
                Err(err) => {
                    tracing::warn!(line, page_id = %page_id, "skipping page row: {err:#}");
                }
            }
        }

        Ok(table)
    }

    /// Valid rows in table order.
    pub fn pages(&self) -> &[PageRecord] {
        &self.pages
    }

    pub fn title_of(&self, page_id: &str) -> Option<&str> {
        self.titles.get(page_id).map(String::as_str)
    }

    pub fn parent_of(&self, page_id: &str) -> Option<&str> {
        self.parents
            .get(page_id)
            .map(String::as_str)
            .filter(|p| !p.is_empty())
    }

    pub fn contains_id(&self, page_id: &str) -> bool {
        self.titles.contains_key(page_id)
    }

    /// Every identifier in the table, in table order, without repeats.
    pub fn page_ids(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.pages
            .iter()
            .map(|p| p.page_id.as_str())
            .filter(|id| seen.insert(*id))
            .collect()
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}
