use crate::defaults::{
    DEFAULT_LANG_CODE, DEFAULT_LAYOUT, DEFAULT_TOPIC_INTRO, INJECTION_MARKER, ROOT_PAGE_ID,
    nav_title,
};
use crate::formats::{FrontMatter, PageRecord};
use crate::page_id::{StructuredId, ZERO_SEGMENT, strip_leading_code};
use crate::page_table::PageTable;

/// Where a page sits in the category tree, read off its identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLevel {
    Unstructured,
    Category,
    Subcategory,
    Topic,
}

impl PageLevel {
    pub fn of(id: Option<&StructuredId>) -> Self {
        let Some(id) = id else {
            return PageLevel::Unstructured;
        };
        let segments = id.segments();
        if segments.iter().skip(1).all(|s| s == ZERO_SEGMENT) {
            PageLevel::Category
        } else if segments.last().is_some_and(|s| s == ZERO_SEGMENT) {
            PageLevel::Subcategory
        } else {
            PageLevel::Topic
        }
    }
}

/// Everything known about a page before its resources are rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRecord {
    pub page_id: String,
    pub front_matter: FrontMatter,
    /// Maintainer-facing HTML comments placed right after the front matter.
    pub comments: String,
    /// Headings, intro text and the injection marker.
    pub skeleton: String,
}

pub fn is_root(page: &PageRecord) -> bool {
    page.page_id == ROOT_PAGE_ID
}

/// Build the generation record for one page; the root page yields `None`.
pub fn resolve(page: &PageRecord, table: &PageTable) -> Option<GenerationRecord> {
    if is_root(page) {
        return None;
    }

    let front_matter = front_matter(page, table);
    if let Some(parent_id) = page.parent_id.as_deref()
        && front_matter.parent.is_none()
    {
        tracing::warn!(page_id = %page.page_id, parent_id, "parent page not found; omitting parent");
    }
    let lang_code = page.lang_code.as_deref().unwrap_or(DEFAULT_LANG_CODE);
    let comments = format!(
        "<!-- page_id: {} -->\n<!-- parent_id: {} -->\n<!-- lang_code: {lang_code} -->\n",
        page.page_id,
        page.parent_id.as_deref().unwrap_or_default(),
    );

    let intro = page
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or(DEFAULT_TOPIC_INTRO);
    let skeleton = format!(
        "{}\n\n{intro}\n\n{INJECTION_MARKER}\n",
        headings(page, table).join("\n")
    );

    Some(GenerationRecord {
        page_id: page.page_id.clone(),
        front_matter,
        comments,
        skeleton,
    })
}

pub fn front_matter(page: &PageRecord, table: &PageTable) -> FrontMatter {
    let parent_title = page
        .parent_id
        .as_deref()
        .and_then(|id| table.title_of(id).map(|title| (id, title)))
        .filter(|(_, title)| !title.trim().is_empty());

    let grand_parent = parent_title
        .and_then(|(parent_id, _)| table.parent_of(parent_id))
        .and_then(|gp_id| table.title_of(gp_id))
        .filter(|title| !title.trim().is_empty())
        .map(nav_title);

    FrontMatter {
        title: page.title.clone(),
        layout: page
            .layout
            .clone()
            .unwrap_or_else(|| DEFAULT_LAYOUT.to_owned()),
        nav_order: page.display_order,
        has_children: page.has_children,
        has_toc: page.has_children.then_some(false),
        parent: parent_title.map(|(_, title)| nav_title(title)),
        grand_parent,
        nav_title: None,
    }
}

/// Heading lines for a page: the category, any intermediate levels, then the
/// page itself, one heading level deeper each step.
pub fn headings(page: &PageRecord, table: &PageTable) -> Vec<String> {
    let id = StructuredId::parse(&page.page_id);
    match PageLevel::of(id.as_ref()) {
        PageLevel::Unstructured => vec![format!("# {}", page.title.trim())],
        PageLevel::Category => vec![format!("# {}", strip_leading_code(&page.title))],
        PageLevel::Subcategory | PageLevel::Topic => {
            let Some(id) = id else {
                return vec![format!("# {}", page.title.trim())];
            };
            let depth = id.trimmed().len();

            let category = table.title_of(&id.ancestor(1)).unwrap_or(&page.title);
            let mut lines = vec![format!("# {}", strip_leading_code(category))];

            for level in 2..depth {
                let title = table
                    .title_of(&id.ancestor(level))
                    .map(strip_leading_code)
                    .unwrap_or_default();
                let prefix = id.segments()[..level].join("-");
                lines.push(format!("{} {prefix} {title}", "#".repeat(level)).trim_end().to_owned());
            }

            lines.push(format!(
                "{} {} {}",
                "#".repeat(depth),
                id.prefix(),
                strip_leading_code(&page.title)
            ));
            lines
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
page_id,parent_id,title,display_order,has_children,layout,lang_code,description
000000_en,,00 Welcome,0,true,home,en,
040000_en,000000_en,04 Vadose Physics,4,true,home,en,
040100_en,040000_en,01 Soil Properties,2,true,,,
040102_en,040100_en,02 Retention Curves,1,false,default,en,Curves and models.
040300_en,040000_en,03 Missing Sub Parent,3,true,home,en,
040301_en,049900_en,01 Orphan Topic,1,false,home,en,
050201_en,050200_en,01 Lonely,1,false,home,en,
welcome_page,,Intro Notes,9,false,home,en,
";

    fn table() -> PageTable {
        PageTable::from_reader(TABLE.as_bytes()).expect("test table parses")
    }

    fn page<'a>(table: &'a PageTable, id: &str) -> &'a PageRecord {
        table
            .pages()
            .iter()
            .find(|p| p.page_id == id)
            .expect("page present")
    }

    #[test]
    fn classifies_pages_by_zero_segments() {
        let level = |id: &str| PageLevel::of(StructuredId::parse(id).as_ref());
        assert_eq!(level("040000_en"), PageLevel::Category);
        assert_eq!(level("040100_en"), PageLevel::Subcategory);
        assert_eq!(level("040102_en"), PageLevel::Topic);
        assert_eq!(level("intro"), PageLevel::Unstructured);
    }

    #[test]
    fn subcategory_gets_category_and_own_heading() {
        let table = table();
        assert_eq!(
            headings(page(&table, "040100_en"), &table),
            vec!["# Vadose Physics", "## 04-01 Soil Properties"]
        );
    }

    #[test]
    fn category_gets_single_heading() {
        let table = table();
        assert_eq!(headings(page(&table, "040000_en"), &table), vec!["# Vadose Physics"]);
    }

    #[test]
    fn topic_gets_three_levels() {
        let table = table();
        assert_eq!(
            headings(page(&table, "040102_en"), &table),
            vec![
                "# Vadose Physics",
                "## 04-01 Soil Properties",
                "### 04-01-02 Retention Curves",
            ]
        );
    }

    #[test]
    fn intermediate_level_comes_from_the_zeroed_identifier() {
        let table = table();
        assert_eq!(
            headings(page(&table, "040301_en"), &table),
            vec!["# Vadose Physics", "## 04-03 Missing Sub Parent", "### 04-03-01 Orphan Topic"]
        );
    }

    #[test]
    fn missing_ancestors_fall_back_to_own_title_and_bare_prefix() {
        let table = table();
        assert_eq!(
            headings(page(&table, "050201_en"), &table),
            vec!["# Lonely", "## 05-02", "### 05-02-01 Lonely"]
        );
    }

    #[test]
    fn unstructured_ids_use_the_raw_title() {
        let table = table();
        assert_eq!(headings(page(&table, "welcome_page"), &table), vec!["# Intro Notes"]);
    }

    #[test]
    fn root_page_is_excluded() {
        let table = table();
        assert!(resolve(page(&table, ROOT_PAGE_ID), &table).is_none());
    }

    #[test]
    fn front_matter_resolves_parent_and_grand_parent() {
        let table = table();

        let fm = front_matter(page(&table, "040102_en"), &table);
        assert_eq!(fm.parent.as_deref(), Some("01 Soil Properties"));
        assert_eq!(fm.grand_parent.as_deref(), Some("04 Vadose Physics"));
        assert_eq!(fm.layout, "default");
        assert_eq!(fm.has_toc, None);

        let fm = front_matter(page(&table, "040000_en"), &table);
        assert_eq!(fm.parent.as_deref(), Some("Welcome"));
        assert_eq!(fm.grand_parent, None);
        assert_eq!(fm.has_toc, Some(false));

        let fm = front_matter(page(&table, "040100_en"), &table);
        assert_eq!(fm.layout, "home");
        assert_eq!(fm.grand_parent.as_deref(), Some("Welcome"));
    }

    #[test]
    fn unresolved_parent_omits_both_keys() {
        let table = table();
        let fm = front_matter(page(&table, "040301_en"), &table);
        assert_eq!(fm.parent, None);
        assert_eq!(fm.grand_parent, None);
    }

    #[test]
    fn skeleton_has_intro_and_one_marker() {
        let table = table();

        let record = resolve(page(&table, "040102_en"), &table).expect("not root");
        assert!(record.skeleton.contains("\n\nCurves and models.\n\n"));
        assert_eq!(record.skeleton.matches(INJECTION_MARKER).count(), 1);
        assert!(record.skeleton.ends_with(&format!("{INJECTION_MARKER}\n")));

        let record = resolve(page(&table, "040100_en"), &table).expect("not root");
        assert!(record.skeleton.contains(DEFAULT_TOPIC_INTRO));
        assert!(record.comments.contains("<!-- page_id: 040100_en -->"));
        assert!(record.comments.contains("<!-- lang_code: en -->"));
    }
}
