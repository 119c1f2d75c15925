use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

pub const PROP_OBJECT_TYPE_ID: &str = "cmis:objectTypeId";
pub const PROP_BASE_TYPE_ID: &str = "cmis:baseTypeId";
pub const PROP_CONTENT_STREAM_LENGTH: &str = "cmis:contentStreamLength";

/// One property from a `<cmis:properties>` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CmisProperty {
    /// Element name, e.g. `propertyString` or `propertyDateTime`.
    pub kind: String,
    pub id: String,
    pub local_name: String,
    pub display_name: String,
    pub value: String,
}

/// A parsed AtomPub entry: a folder when `down_link` is set, a document otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CmisItem {
    pub title: String,
    pub id: String,
    pub author: String,
    pub modification_date: Option<DateTime<Utc>>,
    pub content_url: String,
    pub mime_type: String,
    pub down_link: String,
    pub self_url: String,
    pub properties: HashMap<String, CmisProperty>,
}

impl CmisItem {
    /// A bare item pointing at a feed, used for "up" navigation entries.
    pub fn navigation(title: impl Into<String>, feed: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            id: String::new(),
            author: String::new(),
            modification_date: None,
            content_url: String::new(),
            mime_type: String::new(),
            down_link: feed.into(),
            self_url: String::new(),
            properties: HashMap::new(),
        }
    }

    pub fn has_children(&self) -> bool {
        !self.down_link.is_empty()
    }

    pub fn property_value(&self, id: &str) -> Option<&str> {
        self.properties.get(id).map(|p| p.value.as_str())
    }

    /// Declared size of the content stream, when the server reports one.
    pub fn content_length(&self) -> Option<u64> {
        self.property_value(PROP_CONTENT_STREAM_LENGTH)
            .and_then(|v| v.trim().parse().ok())
    }
}

impl fmt::Display for CmisItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

/// How the text typed into a search box is turned into CMIS SQL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryType {
    Title,
    #[default]
    Fulltext,
    CmisQuery,
}

impl FromStr for QueryType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "title" => Ok(QueryType::Title),
            "fulltext" | "full-text" => Ok(QueryType::Fulltext),
            "cmis" | "cmisquery" | "query" => Ok(QueryType::CmisQuery),
            other => Err(format!("unknown query type: {other}")),
        }
    }
}

/// A stored connection profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub user: String,
    pub password: String,
    pub workspace: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favorite {
    pub id: i64,
    pub title: String,
    /// Feed URL for folders, self URL for documents.
    pub url: String,
    pub server_id: i64,
    /// Empty for folders.
    pub mime_type: String,
}

impl Favorite {
    pub fn is_folder(&self) -> bool {
        self.mime_type.is_empty()
    }
}

/// What a host share sheet needs to send a document somewhere else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SharePayload {
    pub subject: String,
    pub text: String,
    pub stream: Option<std::path::PathBuf>,
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentDetails {
    pub title: String,
    pub mime_type: String,
    pub object_type_id: String,
    pub base_type_id: String,
    pub content_url: String,
    pub self_url: String,
    pub content_stream_length: Option<u64>,
    pub properties: Vec<CmisProperty>,
}

impl From<&CmisItem> for DocumentDetails {
    fn from(item: &CmisItem) -> Self {
        let mut properties: Vec<CmisProperty> = item.properties.values().cloned().collect();
        properties.sort_by(|a, b| a.id.cmp(&b.id));

        Self {
            title: item.title.clone(),
            mime_type: item.mime_type.clone(),
            object_type_id: item
                .property_value(PROP_OBJECT_TYPE_ID)
                .unwrap_or_default()
                .to_string(),
            base_type_id: item
                .property_value(PROP_BASE_TYPE_ID)
                .unwrap_or_default()
                .to_string(),
            content_url: item.content_url.clone(),
            self_url: item.self_url.clone(),
            content_stream_length: item.content_length(),
            properties,
        }
    }
}
