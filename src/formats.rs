use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One row of the page table after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    pub page_id: String,
    pub parent_id: Option<String>,
    pub title: String,
    pub display_order: i64,
    pub has_children: bool,
    pub layout: Option<String>,
    pub lang_code: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub name: String,
    pub affiliation: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FigureRecord {
    pub id: Option<String>,
    pub original_filename: Option<String>,
    pub caption: Option<String>,
    pub kind: Option<String>,
    pub is_cover: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdditionalLink {
    pub label: Option<String>,
    pub url: String,
    pub note: Option<String>,
}

/// A notable feature of an interactive resource and how many of it there are.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Feature {
    pub present: bool,
    pub count: Option<u32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InteractiveFeatures {
    pub multipage: Feature,
    pub interactive_plots: Feature,
    pub assessments: Feature,
    pub videos: Feature,
}

/// Which page a descriptor belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OwnerKey {
    PageId(String),
    Topic(String),
}

impl OwnerKey {
    pub fn as_str(&self) -> &str {
        match self {
            OwnerKey::PageId(key) | OwnerKey::Topic(key) => key,
        }
    }

    pub fn map_type(&self) -> MapType {
        match self {
            OwnerKey::PageId(_) => MapType::TopicPageId,
            OwnerKey::Topic(_) => MapType::Topic,
        }
    }
}

/// A normalized resource submission. Nothing downstream of the loader cares
/// which descriptor schema it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDescriptor {
    pub resource_id: String,
    /// File stem of the descriptor; names the resource's asset folder.
    pub storage_key: String,
    pub source_path: PathBuf,
    pub owner: OwnerKey,

    pub title: String,
    pub resource_type: Option<String>,
    pub time_required: Option<String>,
    pub date_released: Option<String>,
    pub description_short: Option<String>,
    pub url: Option<String>,
    pub prerequisites: Option<String>,

    pub keywords: Vec<String>,
    pub fit_for: Vec<String>,
    pub references: Vec<String>,
    pub authors: Vec<Author>,
    pub figures: Vec<FigureRecord>,
    pub additional_data: Vec<AdditionalLink>,
    pub features: InteractiveFeatures,
}

/// Front matter of a generated page, in the key order the site expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrontMatter {
    pub title: String,
    pub layout: String,
    pub nav_order: i64,
    pub has_children: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_toc: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grand_parent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nav_title: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Loaded,
    ParseError,
    MissingOwner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapType {
    TopicPageId,
    Topic,
}

/// One line of the resource mapping report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceReportEntry {
    pub file: String,
    pub status: ReportStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_type: Option<MapType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapped: Option<bool>,
}
