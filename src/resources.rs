//! Resource descriptor discovery and normalization.
//!
//! Descriptors come from several generations of the submission tool. Older
//! files carry a single `author` / `author_institute` pair, newer ones an
//! `authors` list plus figures and interactive-app metadata; scalar and list
//! fields are typed loosely by hand-edited files. Everything is decoded here
//! into one [`ResourceDescriptor`] shape.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use anyhow::Context as _;
use serde::Deserialize;
use serde_yaml::Value;
use walkdir::WalkDir;

use crate::defaults::is_placeholder;
use crate::formats::{
    AdditionalLink, Author, Feature, FigureRecord, InteractiveFeatures, OwnerKey, ReportStatus,
    ResourceDescriptor, ResourceReportEntry,
};
use crate::text::{parse_flag, slugify};

const DESCRIPTOR_EXTENSIONS: [&str; 2] = ["yaml", "yml"];

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawDescriptor {
    title: Option<Value>,
    topic: Option<Value>,
    topic_page_id: Option<Value>,
    item_id: Option<Value>,

    resource_type: Option<Value>,
    time_required: Option<Value>,
    date_released: Option<Value>,
    description_short: Option<Value>,
    url: Option<Value>,
    prerequisites: Option<Value>,

    keywords: Option<Value>,
    fit_for: Option<Value>,
    references: Option<Value>,

    authors: Option<Value>,
    author: Option<Value>,
    author_institute: Option<Value>,

    figures: Option<Value>,
    additional_data: Option<Value>,

    multipage_app: Option<Value>,
    num_pages: Option<Value>,
    interactive_plots: Option<Value>,
    num_interactive_plots: Option<Value>,
    assessments_included: Option<Value>,
    num_assessment_questions: Option<Value>,
    videos_included: Option<Value>,
    num_videos: Option<Value>,
}

/// How a descriptor declares its authors.
#[derive(Debug)]
enum AuthorSchema<'a> {
    List(&'a [Value]),
    Single {
        name: String,
        institute: Option<String>,
    },
    Anonymous,
}

impl RawDescriptor {
    fn author_schema(&self) -> AuthorSchema<'_> {
        if let Some(Value::Sequence(list)) = self.authors.as_ref()
            && !list.is_empty()
        {
            return AuthorSchema::List(list);
        }
        match scalar(self.author.as_ref()) {
            Some(name) => AuthorSchema::Single {
                name,
                institute: scalar(self.author_institute.as_ref()),
            },
            None => AuthorSchema::Anonymous,
        }
    }

    fn owner(&self) -> Option<OwnerKey> {
        scalar(self.topic_page_id.as_ref())
            .map(OwnerKey::PageId)
            .or_else(|| scalar(self.topic.as_ref()).map(OwnerKey::Topic))
    }
}

/// A parsed descriptor file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Descriptor {
    Owned(ResourceDescriptor),
    /// Neither `topic_page_id` nor `topic` was given.
    Orphan { title: String },
}

/// All descriptors under a directory, filed by owning key.
#[derive(Debug, Default)]
pub struct ResourceIndex {
    by_key: BTreeMap<String, Vec<ResourceDescriptor>>,
    report: Vec<ResourceReportEntry>,
}

impl ResourceIndex {
    pub fn load(resources_dir: &Path) -> Self {
        let mut index = ResourceIndex::default();
        if !resources_dir.is_dir() {
            tracing::warn!(
                dir = %resources_dir.display(),
                "resources directory not found; pages will list no resources"
            );
            return index;
        }

        for entry in WalkDir::new(resources_dir).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!(?err, "skipping unreadable entry under resources directory");
                    continue;
                }
            };
            let path = entry.path();
            let is_descriptor = entry.file_type().is_file()
                && path
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| DESCRIPTOR_EXTENSIONS.contains(&e));
            if !is_descriptor {
                continue;
            }

            let parsed = std::fs::read_to_string(path)
                .with_context(|| format!("read descriptor: {}", path.display()))
                .and_then(|yaml| parse_descriptor(path, &yaml));
            index.add(path, parsed);
        }

        tracing::info!(
            files = index.report.len(),
            resources = index.len(),
            "loaded resource descriptors"
        );
        index
    }

    /// Index already-parsed descriptors.
    #[cfg(test)]
    pub fn from_descriptors(descriptors: impl IntoIterator<Item = ResourceDescriptor>) -> Self {
        let mut index = ResourceIndex::default();
        for resource in descriptors {
            let path = resource.source_path.clone();
            index.add(&path, Ok(Descriptor::Owned(resource)));
        }
        index
    }

    fn add(&mut self, path: &Path, parsed: anyhow::Result<Descriptor>) {
        let file = path.to_string_lossy().to_string();
        match parsed {
            Ok(Descriptor::Owned(resource)) => {
                tracing::debug!(
                    file = %file,
                    resource_id = %resource.resource_id,
                    key = resource.owner.as_str(),
                    "loaded resource"
                );
                self.report.push(ResourceReportEntry {
                    file,
                    status: ReportStatus::Loaded,
                    error: None,
                    map_type: Some(resource.owner.map_type()),
                    map_key: Some(resource.owner.as_str().to_owned()),
                    title: Some(resource.title.clone()),
                    mapped: None,
                });
                self.by_key
                    .entry(resource.owner.as_str().to_owned())
                    .or_default()
                    .push(resource);
            }
            Ok(Descriptor::Orphan { title }) => {
                tracing::warn!(
                    file = %file,
                    "resource has neither 'topic_page_id' nor 'topic'; skipping"
                );
                self.report.push(ResourceReportEntry {
                    file,
                    status: ReportStatus::MissingOwner,
                    error: None,
                    map_type: None,
                    map_key: None,
                    title: Some(title),
                    mapped: None,
                });
            }
            Err(err) => {
                tracing::warn!(file = %file, "skipping unparseable resource: {err:#}");
                self.report.push(ResourceReportEntry {
                    file,
                    status: ReportStatus::ParseError,
                    error: Some(format!("{err:#}")),
                    map_type: None,
                    map_key: None,
                    title: None,
                    mapped: None,
                });
            }
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.by_key.keys().map(String::as_str)
    }

    pub fn get(&self, key: &str) -> &[ResourceDescriptor] {
        self.by_key.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Number of keyed resources.
    fn len(&self) -> usize {
        self.by_key.values().map(Vec::len).sum()
    }

    pub fn report(&self) -> &[ResourceReportEntry] {
        &self.report
    }
}

/// Parse and normalize one descriptor file.
pub fn parse_descriptor(path: &Path, yaml: &str) -> anyhow::Result<Descriptor> {
    let value: Value = if yaml.trim().is_empty() {
        Value::Null
    } else {
        serde_yaml::from_str(yaml).context("parse descriptor yaml")?
    };
    let raw: RawDescriptor = match value {
        Value::Null => RawDescriptor::default(),
        value @ Value::Mapping(_) => {
            serde_yaml::from_value(value).context("decode descriptor fields")?
        }
        _ => anyhow::bail!("descriptor must be a YAML mapping"),
    };

    let storage_key = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let title = scalar(raw.title.as_ref()).unwrap_or_else(|| storage_key.clone());

    let Some(owner) = raw.owner() else {
        return Ok(Descriptor::Orphan { title });
    };

    let resource_id = scalar(raw.item_id.as_ref())
        .filter(|id| !is_placeholder(id))
        .unwrap_or_else(|| slugify(&title));

    let authors = normalize_authors(raw.author_schema());
    let figures = normalize_figures(raw.figures.as_ref(), path);
    let features = InteractiveFeatures {
        multipage: feature(raw.multipage_app.as_ref(), raw.num_pages.as_ref()),
        interactive_plots: feature(
            raw.interactive_plots.as_ref(),
            raw.num_interactive_plots.as_ref(),
        ),
        assessments: feature(
            raw.assessments_included.as_ref(),
            raw.num_assessment_questions.as_ref(),
        ),
        videos: feature(raw.videos_included.as_ref(), raw.num_videos.as_ref()),
    };

    Ok(Descriptor::Owned(ResourceDescriptor {
        resource_id,
        storage_key,
        source_path: path.to_path_buf(),
        owner,
        title,
        resource_type: scalar(raw.resource_type.as_ref()),
        time_required: scalar(raw.time_required.as_ref()),
        date_released: scalar(raw.date_released.as_ref()),
        description_short: scalar(raw.description_short.as_ref()),
        url: scalar(raw.url.as_ref()),
        prerequisites: scalar(raw.prerequisites.as_ref()),
        keywords: as_list(raw.keywords.as_ref()),
        fit_for: as_list(raw.fit_for.as_ref()),
        references: as_list(raw.references.as_ref()),
        authors,
        figures,
        additional_data: normalize_additional_data(raw.additional_data.as_ref()),
        features,
    }))
}

/// Stringify any YAML value; compound values become compact JSON.
fn text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_owned(),
        Value::Tagged(tagged) => text(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => serde_json::to_string(value)
            .unwrap_or_default()
            .trim()
            .to_owned(),
    }
}

fn scalar(value: Option<&Value>) -> Option<String> {
    value.map(text).filter(|s| !s.is_empty())
}

/// Normalize a list-shaped field: a list, a single scalar, or nothing.
pub fn as_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Sequence(items)) => items
            .iter()
            .map(text)
            .filter(|s| !s.is_empty())
            .collect(),
        other => scalar(other).into_iter().collect(),
    }
}

fn flag(value: Option<&Value>) -> bool {
    value.is_some_and(|v| parse_flag(&text(v)))
}

fn feature(present: Option<&Value>, count: Option<&Value>) -> Feature {
    Feature {
        present: flag(present),
        count: count
            .and_then(|v| text(v).parse::<u32>().ok())
            .filter(|n| *n > 0),
    }
}

fn field<'a>(map: &'a serde_yaml::Mapping, key: &str) -> Option<&'a Value> {
    map.get(key)
}

fn normalize_authors(schema: AuthorSchema<'_>) -> Vec<Author> {
    match schema {
        AuthorSchema::List(entries) => entries
            .iter()
            .filter_map(Value::as_mapping)
            .filter_map(|entry| {
                let name = scalar(field(entry, "name"))?;
                Some(Author {
                    name,
                    affiliation: scalar(field(entry, "affiliation")),
                })
            })
            .collect(),
        AuthorSchema::Single { name, institute } => vec![Author {
            name,
            affiliation: institute,
        }],
        AuthorSchema::Anonymous => Vec::new(),
    }
}

fn normalize_figures(value: Option<&Value>, path: &Path) -> Vec<FigureRecord> {
    let Some(Value::Sequence(entries)) = value else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut figures = Vec::new();
    for entry in entries.iter().filter_map(Value::as_mapping) {
        let figure = FigureRecord {
            id: scalar(field(entry, "id")),
            original_filename: scalar(field(entry, "original_filename")),
            caption: scalar(field(entry, "caption")),
            kind: scalar(field(entry, "type")),
            is_cover: flag(field(entry, "is_cover")),
        };
        if let Some(id) = figure.id.as_deref()
            && !seen.insert(id.to_owned())
        {
            tracing::warn!(
                file = %path.display(),
                figure_id = id,
                "duplicate figure id; keeping the first"
            );
            continue;
        }
        figures.push(figure);
    }
    figures
}

fn normalize_additional_data(value: Option<&Value>) -> Vec<AdditionalLink> {
    let items = match value {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Sequence(items)) => items.iter().collect::<Vec<_>>(),
        Some(single) => vec![single],
    };

    items
        .into_iter()
        .filter_map(|item| match item {
            Value::Mapping(map) => Some(AdditionalLink {
                url: scalar(field(map, "url"))?,
                label: scalar(field(map, "label")),
                note: scalar(field(map, "note")),
            }),
            other => scalar(Some(other)).map(|url| AdditionalLink {
                label: None,
                url,
                note: None,
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn owned(yaml: &str) -> anyhow::Result<ResourceDescriptor> {
        match parse_descriptor(&PathBuf::from("res/theis_inverse.yaml"), yaml)? {
            Descriptor::Owned(resource) => Ok(resource),
            Descriptor::Orphan { .. } => anyhow::bail!("expected an owned descriptor"),
        }
    }

    fn yaml_value(src: &str) -> anyhow::Result<Value> {
        Ok(serde_yaml::from_str(src)?)
    }

    #[test]
    fn list_normalization_is_total() -> anyhow::Result<()> {
        assert_eq!(as_list(Some(&yaml_value("[a, 2, ' ', true]")?)), vec!["a", "2", "true"]);
        assert_eq!(as_list(Some(&yaml_value("infiltration")?)), vec!["infiltration"]);
        assert_eq!(as_list(Some(&yaml_value("''")?)), Vec::<String>::new());
        assert_eq!(as_list(Some(&Value::Null)), Vec::<String>::new());
        assert_eq!(as_list(None), Vec::<String>::new());
        assert_eq!(as_list(Some(&yaml_value("{a: 1}")?)), vec![r#"{"a":1}"#]);
        Ok(())
    }

    #[test]
    fn bare_string_keywords_become_a_single_entry() -> anyhow::Result<()> {
        let resource = owned("title: Infiltration\ntopic: 02 Hydrology\nkeywords: infiltration\n")?;
        assert_eq!(resource.keywords, vec!["infiltration"]);
        assert!(resource.fit_for.is_empty());
        assert!(resource.references.is_empty());
        Ok(())
    }

    #[test]
    fn legacy_author_fields_synthesize_one_author() -> anyhow::Result<()> {
        let resource = owned("title: X\ntopic: T\nauthor: Ada Lovelace\nauthor_institute: TU\n")?;
        assert_eq!(
            resource.authors,
            vec![Author {
                name: "Ada Lovelace".to_owned(),
                affiliation: Some("TU".to_owned()),
            }]
        );

        let resource = owned("title: X\ntopic: T\nauthor: Ada Lovelace\n")?;
        assert_eq!(resource.authors.len(), 1);
        assert_eq!(resource.authors[0].name, "Ada Lovelace");
        assert_eq!(resource.authors[0].affiliation, None);
        Ok(())
    }

    #[test]
    fn author_list_wins_and_drops_nameless_entries() -> anyhow::Result<()> {
        let resource = owned(
            "title: X\ntopic: T\nauthor: Legacy\nauthors:\n  - name: A\n    affiliation: U1\n  - affiliation: Nobody\n  - name: B\n  - just a string\n",
        )?;
        let names = resource.authors.iter().map(|a| a.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(resource.authors[1].affiliation, None);
        Ok(())
    }

    #[test]
    fn empty_author_list_falls_back_to_legacy_fields() -> anyhow::Result<()> {
        let resource = owned("title: X\ntopic: T\nauthors: []\nauthor: Legacy\n")?;
        assert_eq!(resource.authors.len(), 1);
        assert_eq!(resource.authors[0].name, "Legacy");

        let resource = owned("title: X\ntopic: T\n")?;
        assert!(resource.authors.is_empty());
        Ok(())
    }

    #[test]
    fn resource_id_prefers_explicit_item_id() -> anyhow::Result<()> {
        assert_eq!(owned("title: Théis Inverse\ntopic: T\nitem_id: '0503001'\n")?.resource_id, "0503001");
        assert_eq!(
            owned("title: Théis Inverse\ntopic: T\nitem_id: TO_BE_FILLED_BY_COURSE_MANAGER\n")?.resource_id,
            "theis-inverse"
        );
        assert_eq!(owned("title: Théis Inverse\ntopic: T\n")?.resource_id, "theis-inverse");
        Ok(())
    }

    #[test]
    fn owner_prefers_topic_page_id() -> anyhow::Result<()> {
        let resource = owned("title: X\ntopic: 01 Soil\ntopic_page_id: 040100_en\n")?;
        assert_eq!(resource.owner, OwnerKey::PageId("040100_en".to_owned()));

        let resource = owned("title: X\ntopic: 01 Soil\n")?;
        assert_eq!(resource.owner, OwnerKey::Topic("01 Soil".to_owned()));
        Ok(())
    }

    #[test]
    fn descriptor_without_owner_is_an_orphan() -> anyhow::Result<()> {
        let parsed = parse_descriptor(&PathBuf::from("res/lonely.yaml"), "description_short: hi\n")?;
        assert_eq!(
            parsed,
            Descriptor::Orphan {
                title: "lonely".to_owned()
            }
        );
        Ok(())
    }

    #[test]
    fn title_and_storage_key_come_from_the_file_stem() -> anyhow::Result<()> {
        let resource = owned("topic: T\n")?;
        assert_eq!(resource.title, "theis_inverse");
        assert_eq!(resource.storage_key, "theis_inverse");
        assert_eq!(resource.url, None);
        Ok(())
    }

    #[test]
    fn scalars_of_any_yaml_type_are_stringified() -> anyhow::Result<()> {
        let resource = owned("title: 42\ntopic: T\ntime_required: 30\ndate_released: 2024-05-01\n")?;
        assert_eq!(resource.title, "42");
        assert_eq!(resource.time_required.as_deref(), Some("30"));
        assert_eq!(resource.date_released.as_deref(), Some("2024-05-01"));
        Ok(())
    }

    #[test]
    fn figures_keep_order_and_drop_duplicate_ids() -> anyhow::Result<()> {
        let resource = owned(
            "title: X\ntopic: T\nfigures:\n  - {id: 1, original_filename: a.PNG}\n  - {id: 2, original_filename: b.jpg, is_cover: 'yes', type: plot, caption: Drawdown}\n  - {id: 1, original_filename: dup.png}\n",
        )?;
        assert_eq!(resource.figures.len(), 2);
        assert_eq!(resource.figures[0].id.as_deref(), Some("1"));
        assert!(!resource.figures[0].is_cover);
        assert!(resource.figures[1].is_cover);
        assert_eq!(resource.figures[1].kind.as_deref(), Some("plot"));
        Ok(())
    }

    #[test]
    fn interactive_features_read_flags_and_counts() -> anyhow::Result<()> {
        let resource = owned(
            "title: X\ntopic: T\nmultipage_app: true\nnum_pages: 4\ninteractive_plots: 'yes'\nnum_interactive_plots: 0\nvideos_included: false\nnum_videos: 3\n",
        )?;
        let features = resource.features;
        assert_eq!(features.multipage, Feature { present: true, count: Some(4) });
        assert_eq!(features.interactive_plots, Feature { present: true, count: None });
        assert!(!features.assessments.present);
        assert_eq!(features.videos, Feature { present: false, count: Some(3) });
        Ok(())
    }

    #[test]
    fn additional_data_accepts_urls_and_mappings() -> anyhow::Result<()> {
        let resource = owned(
            "title: X\ntopic: T\nadditional_data:\n  - https://data.test/a.zip\n  - {label: Dataset, url: https://data.test/b, note: CSV}\n  - {label: No url}\n",
        )?;
        assert_eq!(resource.additional_data.len(), 2);
        assert_eq!(resource.additional_data[0].label, None);
        assert_eq!(resource.additional_data[1].label.as_deref(), Some("Dataset"));
        assert_eq!(resource.additional_data[1].note.as_deref(), Some("CSV"));

        let resource = owned("title: X\ntopic: T\nadditional_data: https://data.test/one\n")?;
        assert_eq!(resource.additional_data.len(), 1);
        Ok(())
    }

    #[test]
    fn empty_file_is_an_orphan_not_an_error() -> anyhow::Result<()> {
        let parsed = parse_descriptor(&PathBuf::from("res/empty.yaml"), "")?;
        assert!(matches!(parsed, Descriptor::Orphan { .. }));
        Ok(())
    }

    #[test]
    fn non_mapping_document_is_a_parse_error() {
        assert!(parse_descriptor(&PathBuf::from("res/list.yaml"), "- a\n- b\n").is_err());
        assert!(parse_descriptor(&PathBuf::from("res/bad.yaml"), "title: [unclosed\n").is_err());
    }

    #[test]
    fn load_indexes_by_key_and_reports_every_file() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        let nested = temp.path().join("02").join("deep");
        std::fs::create_dir_all(&nested)?;
        std::fs::write(temp.path().join("a.yaml"), "title: A\ntopic_page_id: 040100_en\n")?;
        std::fs::write(nested.join("b.yml"), "title: B\ntopic: 01 Soil Properties\n")?;
        std::fs::write(temp.path().join("broken.yaml"), "title: [oops\n")?;
        std::fs::write(temp.path().join("orphan.yaml"), "title: Orphan\n")?;
        std::fs::write(temp.path().join("notes.txt"), "not a descriptor")?;

        let index = ResourceIndex::load(temp.path());
        assert_eq!(index.len(), 2);
        assert_eq!(index.get("040100_en").len(), 1);
        assert_eq!(index.get("01 Soil Properties")[0].title, "B");
        assert!(index.get("nothing").is_empty());

        let statuses = index.report().iter().map(|e| e.status).collect::<Vec<_>>();
        assert_eq!(statuses.len(), 4);
        assert_eq!(statuses.iter().filter(|s| **s == ReportStatus::ParseError).count(), 1);
        assert_eq!(statuses.iter().filter(|s| **s == ReportStatus::MissingOwner).count(), 1);
        Ok(())
    }
}
