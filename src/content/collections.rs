// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Typed content collections: projects, pages and focus areas.
//!
//! Each collection is a list of JSON objects stored together under
//! `cms_content`. Items are checked against a static field schema before
//! they are saved: required fields must be present and non-blank, select
//! fields must hold one of their options, and the remaining typed fields
//! must have a usable shape. Unknown keys are kept untouched.
//!
//! Every item carries `id`, `createdAt` and `lastModified`, which the
//! repository manages; values for those keys in saved data are ignored.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;
use std::str::FromStr;

use super::{activity, read_json, write_json, ContentError, ContentRepository, Result};
use crate::store::Store;

/// Durable storage key of all collections.
pub const CMS_CONTENT_KEY: &str = "cms_content";

/// RFC 3339 time of the last collection save.
pub const CMS_LAST_UPDATED_KEY: &str = "cms_last_updated";

pub const COLLECTIONS_VERSION: &str = "1.0.0";

/// Keys the repository owns on every item.
pub const METADATA_KEYS: [&str; 3] = ["id", "createdAt", "lastModified"];

/// One collection item: a JSON object keyed by field name.
pub type ContentItem = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CollectionKind {
    Projects,
    Pages,
    FocusAreas,
}

impl CollectionKind {
    pub const ALL: [CollectionKind; 3] = [Self::Projects, Self::Pages, Self::FocusAreas];

    /// Key of the collection inside `cms_content`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Projects => "projects",
            Self::Pages => "pages",
            Self::FocusAreas => "focusAreas",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Projects => "Projects",
            Self::Pages => "Pages",
            Self::FocusAreas => "Focus Areas",
        }
    }

    pub fn singular(self) -> &'static str {
        match self {
            Self::Projects => "Project",
            Self::Pages => "Page",
            Self::FocusAreas => "Focus Area",
        }
    }

    pub fn fields(self) -> &'static [FieldDef] {
        match self {
            Self::Projects => PROJECT_FIELDS,
            Self::Pages => PAGE_FIELDS,
            Self::FocusAreas => FOCUS_AREA_FIELDS,
        }
    }

    pub fn field(self, name: &str) -> Option<&'static FieldDef> {
        self.fields().iter().find(|f| f.name == name)
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollectionKind {
    type Err = String;

    /// Accepts `projects`, `pages`, `focus-areas` and their singular or
    /// camelCase spellings.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "projects" | "project" => Ok(Self::Projects),
            "pages" | "page" => Ok(Self::Pages),
            "focusareas" | "focusarea" => Ok(Self::FocusAreas),
            _ => Err(format!(
                "Unknown collection '{}'. Use projects, pages or focus-areas.",
                s
            )),
        }
    }
}

/// Input type of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    TextArea,
    RichText,
    Select,
    MultiSelect,
    Checkbox,
    Date,
    DateTime,
    Number,
    Url,
    Color,
    Image,
    Gallery,
    List,
    KeyValue,
}

impl FieldType {
    /// Fields holding several values, entered separated by `;`.
    pub fn is_list(self) -> bool {
        matches!(self, Self::MultiSelect | Self::Gallery | Self::List)
    }
}

/// A field of a collection schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldType,
    pub required: bool,
    pub readonly: bool,
    pub options: &'static [&'static str],
    /// Collection whose item ids a multiselect refers to
    pub source: Option<CollectionKind>,
}

impl FieldDef {
    const fn new(name: &'static str, kind: FieldType, label: &'static str) -> Self {
        Self {
            name,
            label,
            kind,
            required: false,
            readonly: false,
            options: &[],
            source: None,
        }
    }

    const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    const fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }

    const fn options(mut self, options: &'static [&'static str]) -> Self {
        self.options = options;
        self
    }

    const fn source(mut self, source: CollectionKind) -> Self {
        self.source = Some(source);
        self
    }

    /// Convert one line of user input into the stored value.
    ///
    /// Blank input is `Value::Null` ("not provided") except for checkboxes,
    /// which read it as unchecked.
    pub fn parse_input(&self, input: &str) -> std::result::Result<Value, String> {
        let input = input.trim();
        if self.kind == FieldType::Checkbox {
            return match input.to_lowercase().as_str() {
                "true" | "yes" | "y" | "1" | "on" => Ok(Value::Bool(true)),
                "false" | "no" | "n" | "0" | "off" | "" => Ok(Value::Bool(false)),
                _ => Err("expects yes or no".to_string()),
            };
        }
        if input.is_empty() {
            return Ok(Value::Null);
        }

        match self.kind {
            FieldType::Number => parse_number(input)
                .map(Value::Number)
                .ok_or_else(|| "expects a number".to_string()),
            FieldType::Select => self
                .options
                .iter()
                .find(|o| o.eq_ignore_ascii_case(input))
                .map(|o| Value::String(o.to_string()))
                .ok_or_else(|| self.options_message()),
            FieldType::MultiSelect | FieldType::Gallery | FieldType::List => Ok(Value::Array(
                split_list(input).map(|v| Value::String(v.to_string())).collect(),
            )),
            FieldType::KeyValue => {
                let mut pairs = Map::new();
                for entry in split_list(input) {
                    let (key, value) = entry
                        .split_once('=')
                        .ok_or_else(|| format!("expects key=value pairs, got '{}'", entry))?;
                    pairs.insert(key.trim().to_string(), Value::String(value.trim().to_string()));
                }
                Ok(Value::Object(pairs))
            }
            _ => {
                let value = Value::String(input.to_string());
                self.check(&value)?;
                Ok(value)
            }
        }
    }

    /// Check the shape of a stored, non-blank value.
    pub fn check(&self, value: &Value) -> std::result::Result<(), String> {
        let ok = match (self.kind, value) {
            (FieldType::Checkbox, Value::Bool(_)) => true,
            (FieldType::Number, Value::Number(_)) => true,
            (FieldType::Number, Value::String(s)) => parse_number(s.trim()).is_some(),
            (FieldType::Select, Value::String(s)) => {
                if !self.options.iter().any(|o| o.eq_ignore_ascii_case(s)) {
                    return Err(self.options_message());
                }
                true
            }
            (kind, Value::Array(values)) if kind.is_list() => values.iter().all(Value::is_string),
            // Older records keep lists as newline separated text
            (kind, Value::String(_)) if kind.is_list() => true,
            (FieldType::KeyValue, Value::Object(_) | Value::String(_)) => true,
            (FieldType::Date, Value::String(s)) => {
                if NaiveDate::parse_from_str(s, "%Y-%m-%d").is_err() {
                    return Err("expects a date like 2024-06-30".to_string());
                }
                true
            }
            (FieldType::DateTime, Value::String(s)) => {
                if DateTime::parse_from_rfc3339(s).is_err() {
                    return Err("expects an RFC 3339 time".to_string());
                }
                true
            }
            (FieldType::Url, Value::String(s)) => {
                if !is_link(s) {
                    return Err("expects an http(s) URL or a site path".to_string());
                }
                true
            }
            (FieldType::Color, Value::String(s)) => {
                if !is_hex_color(s) {
                    return Err("expects a colour like #2e7d32".to_string());
                }
                true
            }
            (
                FieldType::Text | FieldType::TextArea | FieldType::RichText | FieldType::Image,
                Value::String(_),
            ) => true,
            _ => false,
        };
        if ok {
            Ok(())
        } else {
            Err(format!("has the wrong type for a {:?} field", self.kind))
        }
    }

    fn options_message(&self) -> String {
        format!("must be one of: {}", self.options.join(", "))
    }
}

const PROJECT_STATUSES: &[&str] = &["Ongoing", "Completed", "Planned", "On Hold"];
const PROJECT_FOCUS_AREAS: &[&str] = &[
    "Agriculture",
    "Education",
    "Healthcare",
    "Environment",
    "Community Development",
];

pub static PROJECT_FIELDS: &[FieldDef] = &[
    FieldDef::new("title", FieldType::Text, "Project Title").required(),
    FieldDef::new("summary", FieldType::TextArea, "Project Summary").required(),
    FieldDef::new("description", FieldType::RichText, "Full Description").required(),
    FieldDef::new("status", FieldType::Select, "Status").required().options(PROJECT_STATUSES),
    FieldDef::new("focusArea", FieldType::Select, "Focus Area")
        .required()
        .options(PROJECT_FOCUS_AREAS),
    FieldDef::new("location", FieldType::Text, "Location").required(),
    FieldDef::new("startDate", FieldType::Date, "Start Date").required(),
    FieldDef::new("endDate", FieldType::Date, "End Date"),
    FieldDef::new("budget", FieldType::Number, "Budget (₹)"),
    FieldDef::new("beneficiaries", FieldType::Number, "Number of Beneficiaries"),
    FieldDef::new("heroImage", FieldType::Image, "Hero Image"),
    FieldDef::new("gallery", FieldType::Gallery, "Project Gallery"),
    FieldDef::new("outcomes", FieldType::List, "Key Outcomes"),
    FieldDef::new("partners", FieldType::List, "Project Partners"),
    FieldDef::new("ctaLabel", FieldType::Text, "Call-to-Action Label"),
    FieldDef::new("ctaLink", FieldType::Url, "Call-to-Action Link"),
];

pub static PAGE_FIELDS: &[FieldDef] = &[
    FieldDef::new("title", FieldType::Text, "Page Title").required(),
    FieldDef::new("slug", FieldType::Text, "URL Slug").required(),
    FieldDef::new("metaDescription", FieldType::TextArea, "Meta Description"),
    FieldDef::new("heroTitle", FieldType::Text, "Hero Section Title"),
    FieldDef::new("heroSubtitle", FieldType::TextArea, "Hero Section Subtitle"),
    FieldDef::new("heroImage", FieldType::Image, "Hero Background Image"),
    FieldDef::new("content", FieldType::RichText, "Page Content").required(),
    FieldDef::new("sidebar", FieldType::RichText, "Sidebar Content"),
    FieldDef::new("published", FieldType::Checkbox, "Published"),
    FieldDef::new("featured", FieldType::Checkbox, "Featured Page"),
    FieldDef::new("lastModified", FieldType::DateTime, "Last Modified").readonly(),
];

pub static FOCUS_AREA_FIELDS: &[FieldDef] = &[
    FieldDef::new("name", FieldType::Text, "Focus Area Name").required(),
    FieldDef::new("description", FieldType::TextArea, "Description").required(),
    FieldDef::new("detailedDescription", FieldType::RichText, "Detailed Description").required(),
    FieldDef::new("icon", FieldType::Text, "Icon Class (e.g., fas fa-seedling)").required(),
    FieldDef::new("color", FieldType::Color, "Theme Color"),
    FieldDef::new("heroImage", FieldType::Image, "Hero Image"),
    FieldDef::new("goals", FieldType::List, "Key Goals"),
    FieldDef::new("achievements", FieldType::List, "Key Achievements"),
    FieldDef::new("statistics", FieldType::KeyValue, "Statistics"),
    FieldDef::new("relatedProjects", FieldType::MultiSelect, "Related Projects")
        .source(CollectionKind::Projects),
    FieldDef::new("active", FieldType::Checkbox, "Active Focus Area"),
];

/// All collections as stored under `cms_content`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collections {
    #[serde(default)]
    pub projects: Vec<ContentItem>,
    #[serde(default)]
    pub pages: Vec<ContentItem>,
    #[serde(default)]
    pub focus_areas: Vec<ContentItem>,
}

impl Collections {
    pub fn items(&self, kind: CollectionKind) -> &[ContentItem] {
        match kind {
            CollectionKind::Projects => &self.projects,
            CollectionKind::Pages => &self.pages,
            CollectionKind::FocusAreas => &self.focus_areas,
        }
    }

    fn items_mut(&mut self, kind: CollectionKind) -> &mut Vec<ContentItem> {
        match kind {
            CollectionKind::Projects => &mut self.projects,
            CollectionKind::Pages => &mut self.pages,
            CollectionKind::FocusAreas => &mut self.focus_areas,
        }
    }

    pub fn total(&self) -> usize {
        self.projects.len() + self.pages.len() + self.focus_areas.len()
    }
}

/// Exported collections document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionsExport {
    pub timestamp: DateTime<Utc>,
    pub content: Collections,
    pub version: String,
}

/// Import side: a collection missing from the document is left alone.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CollectionsPatch {
    projects: Option<Vec<ContentItem>>,
    pages: Option<Vec<ContentItem>>,
    focus_areas: Option<Vec<ContentItem>>,
}

#[derive(Debug, Deserialize)]
struct CollectionsImport {
    content: CollectionsPatch,
}

/// `cms-content-YYYY-MM-DD.json`
pub fn collections_file_name(now: DateTime<Utc>) -> String {
    format!("cms-content-{}.json", now.format("%Y-%m-%d"))
}

pub fn item_id(item: &ContentItem) -> Option<&str> {
    item.get("id").and_then(Value::as_str)
}

/// `title`, else `name`, else "Untitled".
pub fn item_title(item: &ContentItem) -> &str {
    ["title", "name"]
        .iter()
        .filter_map(|key| item.get(*key).and_then(Value::as_str))
        .find(|s| !s.trim().is_empty())
        .unwrap_or("Untitled")
}

/// `status`, else Published/Draft from the `published` flag.
pub fn item_status(item: &ContentItem) -> &str {
    match item.get("status").and_then(Value::as_str) {
        Some(status) if !status.is_empty() => status,
        _ if item.get("published").and_then(Value::as_bool) == Some(true) => "Published",
        _ => "Draft",
    }
}

/// Check an item against the schema of its collection.
pub fn validate_item(kind: CollectionKind, item: &ContentItem) -> Result<()> {
    for field in kind.fields() {
        let value = item.get(field.name).filter(|v| !is_blank(v));
        match value {
            None if field.required => {
                return Err(invalid(kind, field.name, "is required".to_string()));
            }
            None => {}
            Some(value) => field
                .check(value)
                .map_err(|reason| invalid(kind, field.name, reason))?,
        }
    }
    Ok(())
}

fn invalid(collection: CollectionKind, field: &str, reason: String) -> ContentError {
    ContentError::InvalidItem {
        collection,
        field: field.to_string(),
        reason,
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(values) => values.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn split_list(input: &str) -> impl Iterator<Item = &str> {
    input
        .split([';', '\n'])
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn parse_number(input: &str) -> Option<Number> {
    if let Ok(int) = input.parse::<i64>() {
        return Some(Number::from(int));
    }
    input.parse::<f64>().ok().and_then(Number::from_f64)
}

fn is_link(s: &str) -> bool {
    ["http://", "https://", "mailto:", "/", "#"]
        .iter()
        .any(|prefix| s.starts_with(prefix))
}

fn is_hex_color(s: &str) -> bool {
    let Some(digits) = s.strip_prefix('#') else {
        return false;
    };
    matches!(digits.len(), 3 | 6) && digits.chars().all(|c| c.is_ascii_hexdigit())
}

fn timestamp(now: DateTime<Utc>) -> Value {
    Value::String(now.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Base-36 milliseconds followed by random hex.
fn generate_item_id(now: DateTime<Utc>) -> String {
    let mut millis = now.timestamp_millis().max(0) as u64;
    let mut digits = Vec::new();
    loop {
        digits.push(char::from_digit((millis % 36) as u32, 36).unwrap_or('0'));
        millis /= 36;
        if millis == 0 {
            break;
        }
    }
    let mut bytes = [0u8; 4];
    OsRng.fill_bytes(&mut bytes);
    let prefix: String = digits.into_iter().rev().collect();
    format!("{}{}", prefix, hex::encode(bytes))
}

impl<S: Store> ContentRepository<S> {
    pub fn collections(&self) -> Result<Collections> {
        read_json(&self.store, CMS_CONTENT_KEY)
    }

    pub fn items(&self, kind: CollectionKind) -> Result<Vec<ContentItem>> {
        Ok(self.collections()?.items(kind).to_vec())
    }

    pub fn find_item(&self, kind: CollectionKind, id: &str) -> Result<ContentItem> {
        self.collections()?
            .items(kind)
            .iter()
            .find(|item| item_id(item) == Some(id))
            .cloned()
            .ok_or_else(|| ContentError::ItemNotFound {
                collection: kind,
                id: id.to_string(),
            })
    }

    /// Create an item (`id` is `None`) or merge `data` into an existing one.
    ///
    /// Metadata keys in `data` are ignored. A null value removes the field
    /// from an existing item and is skipped on a new one. The result must
    /// pass [`validate_item`]; nothing is stored when it does not.
    pub fn save_item(
        &self,
        kind: CollectionKind,
        id: Option<&str>,
        mut data: ContentItem,
        now: DateTime<Utc>,
    ) -> Result<ContentItem> {
        data.retain(|key, _| !METADATA_KEYS.contains(&key.as_str()));

        let mut collections = self.collections()?;
        let items = collections.items_mut(kind);
        let (saved, created) = match id {
            Some(id) => {
                let existing = items
                    .iter_mut()
                    .find(|item| item_id(item) == Some(id))
                    .ok_or_else(|| ContentError::ItemNotFound {
                        collection: kind,
                        id: id.to_string(),
                    })?;
                let mut merged = existing.clone();
                for (key, value) in data {
                    if value.is_null() {
                        merged.remove(&key);
                    } else {
                        merged.insert(key, value);
                    }
                }
                merged.insert("lastModified".to_string(), timestamp(now));
                validate_item(kind, &merged)?;
                *existing = merged.clone();
                (merged, false)
            }
            None => {
                let mut item = ContentItem::new();
                item.insert("id".to_string(), Value::String(generate_item_id(now)));
                item.insert("createdAt".to_string(), timestamp(now));
                item.extend(data.into_iter().filter(|(_, value)| !value.is_null()));
                item.insert("lastModified".to_string(), timestamp(now));
                validate_item(kind, &item)?;
                items.push(item.clone());
                (item, true)
            }
        };
        self.save_collections(&collections, now)?;

        let verb = if created { "Created" } else { "Updated" };
        tracing::info!(
            "ITEM_SAVED | collection={} id={} created={}",
            kind,
            item_id(&saved).unwrap_or_default(),
            created
        );
        self.add_activity(
            format!(
                "{} {}: {}",
                verb,
                kind.singular().to_lowercase(),
                item_title(&saved)
            ),
            activity::ICON_EDIT,
            now,
        )?;
        Ok(saved)
    }

    pub fn delete_item(
        &self,
        kind: CollectionKind,
        id: &str,
        now: DateTime<Utc>,
    ) -> Result<ContentItem> {
        let mut collections = self.collections()?;
        let items = collections.items_mut(kind);
        let index = items
            .iter()
            .position(|item| item_id(item) == Some(id))
            .ok_or_else(|| ContentError::ItemNotFound {
                collection: kind,
                id: id.to_string(),
            })?;
        let removed = items.remove(index);
        self.save_collections(&collections, now)?;

        tracing::info!("ITEM_DELETED | collection={} id={}", kind, id);
        self.add_activity(
            format!(
                "Deleted {}: {}",
                kind.singular().to_lowercase(),
                item_title(&removed)
            ),
            activity::ICON_TRASH,
            now,
        )?;
        Ok(removed)
    }

    pub fn export_collections(&self, now: DateTime<Utc>) -> Result<CollectionsExport> {
        let export = CollectionsExport {
            timestamp: now,
            content: self.collections()?,
            version: COLLECTIONS_VERSION.to_string(),
        };
        self.add_activity("Exported content collections", activity::ICON_EXPORT, now)?;
        Ok(export)
    }

    /// Replace each collection present in the document. Every imported item
    /// must carry a string `id`. Returns the collections replaced.
    pub fn import_collections(
        &self,
        document: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<CollectionKind>> {
        let incoming: CollectionsImport = serde_json::from_str(document)
            .map_err(|e| ContentError::InvalidDocument(format!("collections: {}", e)))?;
        let patch = incoming.content;

        let mut collections = self.collections()?;
        let mut replaced = Vec::new();
        for (kind, items) in [
            (CollectionKind::Projects, patch.projects),
            (CollectionKind::Pages, patch.pages),
            (CollectionKind::FocusAreas, patch.focus_areas),
        ] {
            let Some(items) = items else {
                continue;
            };
            if let Some(position) = items.iter().position(|item| item_id(item).is_none()) {
                return Err(ContentError::InvalidDocument(format!(
                    "{} item {} has no id",
                    kind,
                    position + 1
                )));
            }
            *collections.items_mut(kind) = items;
            replaced.push(kind);
        }

        self.save_collections(&collections, now)?;
        tracing::info!("COLLECTIONS_IMPORTED | replaced={}", replaced.len());
        self.add_activity("Imported content collections", activity::ICON_IMPORT, now)?;
        Ok(replaced)
    }

    fn save_collections(&self, collections: &Collections, now: DateTime<Utc>) -> Result<()> {
        write_json(&self.store, CMS_CONTENT_KEY, collections)?;
        self.store.set(CMS_LAST_UPDATED_KEY, &now.to_rfc3339())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, 8, 0, 0).unwrap()
    }

    fn repo() -> ContentRepository<MemoryStore> {
        ContentRepository::new(MemoryStore::new())
    }

    fn object(value: Value) -> ContentItem {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {}", other),
        }
    }

    fn project() -> ContentItem {
        object(json!({
            "title": "Solar irrigation",
            "summary": "Pumps for 40 farms",
            "description": "<p>Solar pumps.</p>",
            "status": "Ongoing",
            "focusArea": "Agriculture",
            "location": "Nashik",
            "startDate": "2024-04-01",
            "budget": 250000
        }))
    }

    #[test]
    fn test_collection_names() {
        let parse = |s: &str| s.parse::<CollectionKind>();
        assert_eq!(parse("focus-areas"), Ok(CollectionKind::FocusAreas));
        assert_eq!(parse("focusAreas"), Ok(CollectionKind::FocusAreas));
        assert_eq!(parse("Project"), Ok(CollectionKind::Projects));
        assert!("news".parse::<CollectionKind>().is_err());
        assert_eq!(CollectionKind::FocusAreas.to_string(), "focusAreas");
    }

    #[test]
    fn test_parse_input_by_field_type() {
        let status = CollectionKind::Projects.field("status").unwrap();
        assert_eq!(status.parse_input("on hold"), Ok(json!("On Hold")));
        assert!(status.parse_input("Cancelled").unwrap_err().contains("Ongoing"));

        let budget = CollectionKind::Projects.field("budget").unwrap();
        assert_eq!(budget.parse_input("1500"), Ok(json!(1500)));
        assert_eq!(budget.parse_input(" "), Ok(Value::Null));
        assert!(budget.parse_input("lots").is_err());

        let outcomes = CollectionKind::Projects.field("outcomes").unwrap();
        assert_eq!(
            outcomes.parse_input("40 pumps; ; 120 families"),
            Ok(json!(["40 pumps", "120 families"]))
        );

        let published = CollectionKind::Pages.field("published").unwrap();
        assert_eq!(published.parse_input("yes"), Ok(json!(true)));
        assert_eq!(published.parse_input(""), Ok(json!(false)));

        let stats = CollectionKind::FocusAreas.field("statistics").unwrap();
        assert_eq!(
            stats.parse_input("farmers=1200; villages = 14"),
            Ok(json!({"farmers": "1200", "villages": "14"}))
        );

        let color = CollectionKind::FocusAreas.field("color").unwrap();
        assert!(color.parse_input("#2e7d32").is_ok());
        assert!(color.parse_input("green").is_err());

        let start = CollectionKind::Projects.field("startDate").unwrap();
        assert!(start.parse_input("2024-13-01").is_err());
    }

    #[test]
    fn test_create_sets_metadata() {
        let repo = repo();
        let mut data = project();
        data.insert("id".to_string(), json!("forged"));

        let item = repo.save_item(CollectionKind::Projects, None, data, now()).unwrap();
        let id = item_id(&item).unwrap();
        assert_ne!(id, "forged");
        assert_eq!(item["createdAt"], item["lastModified"]);
        assert_eq!(repo.items(CollectionKind::Projects).unwrap().len(), 1);
        assert!(repo.items(CollectionKind::Pages).unwrap().is_empty());

        let feed = repo.recent_activity(1).unwrap();
        assert_eq!(feed[0].text, "Created project: Solar irrigation");
    }

    #[test]
    fn test_required_fields_enforced() {
        let repo = repo();
        let mut data = project();
        data.remove("location");

        let err = repo
            .save_item(CollectionKind::Projects, None, data, now())
            .unwrap_err();
        assert!(matches!(
            err,
            ContentError::InvalidItem { ref field, .. } if field == "location"
        ));

        let blank = object(json!({"title": "  ", "slug": "about", "content": "x"}));
        assert!(repo.save_item(CollectionKind::Pages, None, blank, now()).is_err());
        assert!(repo.collections().unwrap().pages.is_empty());
    }

    #[test]
    fn test_update_merges_into_existing_item() {
        let repo = repo();
        let created = repo
            .save_item(CollectionKind::Projects, None, project(), now())
            .unwrap();
        let id = item_id(&created).unwrap().to_string();

        let later = now() + Duration::days(2);
        let patch = object(json!({"status": "Completed", "budget": null}));
        let updated = repo
            .save_item(CollectionKind::Projects, Some(&id), patch, later)
            .unwrap();

        assert_eq!(updated["status"], "Completed");
        assert_eq!(updated["location"], "Nashik");
        assert!(!updated.contains_key("budget"));
        assert_eq!(updated["createdAt"], created["createdAt"]);
        assert_ne!(updated["lastModified"], created["lastModified"]);
        assert_eq!(repo.find_item(CollectionKind::Projects, &id).unwrap(), updated);

        for bad in [json!({"status": "Abandoned"}), json!({"location": null})] {
            assert!(repo
                .save_item(CollectionKind::Projects, Some(&id), object(bad), later)
                .is_err());
        }
        assert_eq!(repo.find_item(CollectionKind::Projects, &id).unwrap()["status"], "Completed");
    }

    #[test]
    fn test_delete_and_missing_items() {
        let repo = repo();
        let focus = object(json!({
            "name": "Water",
            "description": "Clean water",
            "detailedDescription": "<p>Wells</p>",
            "icon": "fas fa-tint"
        }));
        let item = repo.save_item(CollectionKind::FocusAreas, None, focus, now()).unwrap();
        let id = item_id(&item).unwrap().to_string();

        let removed = repo.delete_item(CollectionKind::FocusAreas, &id, now()).unwrap();
        assert_eq!(item_title(&removed), "Water");
        assert!(matches!(
            repo.delete_item(CollectionKind::FocusAreas, &id, now()),
            Err(ContentError::ItemNotFound { .. })
        ));
        assert!(matches!(
            repo.save_item(CollectionKind::FocusAreas, Some(&id), ContentItem::new(), now()),
            Err(ContentError::ItemNotFound { .. })
        ));
    }

    #[test]
    fn test_import_replaces_listed_collections_only() {
        let repo = repo();
        let mut data = project();
        data.insert("status".to_string(), json!("Planned"));
        repo.save_item(CollectionKind::Projects, None, data, now()).unwrap();

        let document = json!({
            "timestamp": now().to_rfc3339(),
            "content": {
                "pages": [{"id": "p1", "title": "About", "slug": "about", "content": "Hi"}]
            },
            "version": COLLECTIONS_VERSION
        })
        .to_string();

        let replaced = repo.import_collections(&document, now()).unwrap();
        assert_eq!(replaced, vec![CollectionKind::Pages]);
        let collections = repo.collections().unwrap();
        assert_eq!(collections.projects.len(), 1);
        assert_eq!(item_status(&collections.pages[0]), "Draft");

        assert!(matches!(
            repo.import_collections(r#"{"timestamp": "x"}"#, now()),
            Err(ContentError::InvalidDocument(_))
        ));
        assert!(matches!(
            repo.import_collections(r#"{"content": {"projects": [{"title": "no id"}]}}"#, now()),
            Err(ContentError::InvalidDocument(_))
        ));
        assert_eq!(repo.collections().unwrap().total(), 2);
    }

    #[test]
    fn test_export_document_shape() {
        let repo = repo();
        let export = repo.export_collections(now()).unwrap();
        let value = serde_json::to_value(&export).unwrap();
        assert_eq!(value["version"], "1.0.0");
        assert_eq!(value["content"]["focusAreas"], json!([]));
        assert_eq!(collections_file_name(now()), "cms-content-2024-06-03.json");
    }

    #[test]
    fn test_status_and_title_fallbacks() {
        let item = object(json!({"name": "Health", "published": true}));
        assert_eq!(item_title(&item), "Health");
        assert_eq!(item_status(&item), "Published");
        assert_eq!(item_title(&ContentItem::new()), "Untitled");
    }
}
