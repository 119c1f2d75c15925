//! AtomPub parsing for CMIS service documents and feeds.
//!
//! Elements are matched by namespace and local name. Anything optional that
//! is missing in the document becomes an empty string.

use crate::domain::model::{CmisItem, CmisProperty};
use chrono::{DateTime, Utc};
use roxmltree::{Document, Node};
use std::collections::HashMap;
use thiserror::Error;

pub const NS_ATOM: &str = "http://www.w3.org/2005/Atom";
pub const NS_APP: &str = "http://www.w3.org/2007/app";
pub const NS_CMISRA: &str = "http://docs.oasis-open.org/ns/cmis/restatom/200908/";
pub const NS_CMIS: &str = "http://docs.oasis-open.org/ns/cmis/core/200908/";

const ATOM_FEED_TYPE: &str = "application/atom+xml";

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("malformed XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("unexpected root element <{0}>")]
    UnexpectedRoot(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collection {
    pub href: String,
    pub collection_type: String,
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UriTemplate {
    pub template_type: String,
    pub template: String,
    pub media_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Workspace {
    pub title: String,
    pub repository_id: String,
    pub repository_name: String,
    pub collections: Vec<Collection>,
    pub uri_templates: Vec<UriTemplate>,
}

impl Workspace {
    /// `href` of the collection of the given type, empty when there is none.
    pub fn collection_url(&self, kind: &str) -> &str {
        self.collections
            .iter()
            .find(|c| c.collection_type.eq_ignore_ascii_case(kind))
            .map(|c| c.href.as_str())
            .unwrap_or("")
    }

    pub fn uri_template(&self, kind: &str) -> Option<&str> {
        self.uri_templates
            .iter()
            .find(|t| t.template_type.eq_ignore_ascii_case(kind))
            .map(|t| t.template.as_str())
    }

    fn matches(&self, name: &str) -> bool {
        self.title == name || self.repository_id == name || self.repository_name == name
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceDocument {
    pub workspaces: Vec<Workspace>,
}

impl ServiceDocument {
    /// Empty `name` picks the first workspace.
    pub fn workspace(&self, name: &str) -> Option<&Workspace> {
        if name.is_empty() {
            return self.workspaces.first();
        }
        self.workspaces.iter().find(|w| w.matches(name))
    }
}

fn is(node: &Node, ns: &str, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name && node.tag_name().namespace() == Some(ns)
}

fn child<'a, 'input>(node: &Node<'a, 'input>, ns: &str, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|c| is(c, ns, name))
}

fn children<'a, 'input: 'a>(
    node: &Node<'a, 'input>,
    ns: &'a str,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children().filter(move |c| is(c, ns, name))
}

/// Element text exactly as written.
fn child_text(node: &Node, ns: &str, name: &str) -> String {
    child(node, ns, name)
        .and_then(|c| c.text())
        .map(str::to_string)
        .unwrap_or_default()
}

/// Element text for identifiers and URLs, where surrounding whitespace is layout.
fn child_token(node: &Node, ns: &str, name: &str) -> String {
    child(node, ns, name)
        .and_then(|c| c.text())
        .map(|t| t.trim().to_string())
        .unwrap_or_default()
}

fn attr(node: &Node, name: &str) -> String {
    node.attribute(name).unwrap_or_default().to_string()
}

pub fn parse_service_document(xml: &str) -> Result<ServiceDocument, FeedError> {
    let doc = Document::parse(xml)?;
    let root = doc.root_element();
    if !is(&root, NS_APP, "service") {
        return Err(FeedError::UnexpectedRoot(root.tag_name().name().to_string()));
    }

    let workspaces = children(&root, NS_APP, "workspace")
        .map(|ws| parse_workspace(&ws))
        .collect();

    Ok(ServiceDocument { workspaces })
}

fn parse_workspace(ws: &Node) -> Workspace {
    let info = child(ws, NS_CMISRA, "repositoryInfo");
    let info_text = |name: &str| {
        info.as_ref()
            .map(|i| child_token(i, NS_CMIS, name))
            .unwrap_or_default()
    };

    let collections = children(ws, NS_APP, "collection")
        .map(|c| Collection {
            href: attr(&c, "href"),
            collection_type: child_token(&c, NS_CMISRA, "collectionType"),
            title: child_token(&c, NS_ATOM, "title"),
        })
        .collect();

    let uri_templates = children(ws, NS_CMISRA, "uritemplate")
        .map(|t| UriTemplate {
            template_type: child_token(&t, NS_CMISRA, "type"),
            template: child_token(&t, NS_CMISRA, "template"),
            media_type: child_token(&t, NS_CMISRA, "mediatype"),
        })
        .collect();

    Workspace {
        title: child_token(ws, NS_ATOM, "title"),
        repository_id: info_text("repositoryId"),
        repository_name: info_text("repositoryName"),
        collections,
        uri_templates,
    }
}

/// Items of an `atom:feed`; a document holding a single `atom:entry` yields one item.
pub fn parse_feed(xml: &str) -> Result<Vec<CmisItem>, FeedError> {
    let doc = Document::parse(xml)?;
    let root = doc.root_element();

    if is(&root, NS_ATOM, "entry") {
        return Ok(vec![parse_entry(&root)]);
    }
    if !is(&root, NS_ATOM, "feed") {
        return Err(FeedError::UnexpectedRoot(root.tag_name().name().to_string()));
    }

    Ok(children(&root, NS_ATOM, "entry")
        .map(|entry| parse_entry(&entry))
        .collect())
}

pub fn parse_entry(entry: &Node) -> CmisItem {
    let author = child(entry, NS_ATOM, "author")
        .map(|a| child_text(&a, NS_ATOM, "name"))
        .unwrap_or_default();

    let (content_url, mime_type) = child(entry, NS_ATOM, "content")
        .map(|c| (attr(&c, "src"), attr(&c, "type")))
        .unwrap_or_default();

    let mut down_link = String::new();
    let mut self_url = String::new();
    for link in children(entry, NS_ATOM, "link") {
        let rel = link.attribute("rel").unwrap_or_default();
        let link_type = link.attribute("type").unwrap_or_default();
        match rel {
            "down" if link_type.starts_with(ATOM_FEED_TYPE) => down_link = attr(&link, "href"),
            "self" => self_url = attr(&link, "href"),
            _ => {}
        }
    }

    CmisItem {
        title: child_text(entry, NS_ATOM, "title"),
        id: child_text(entry, NS_ATOM, "id"),
        author,
        modification_date: parse_xml_date(&child_text(entry, NS_ATOM, "updated")),
        content_url,
        mime_type,
        down_link,
        self_url,
        properties: parse_properties(entry),
    }
}

/// Properties keyed by `propertyDefinitionId`. Multi-valued properties keep their first value.
pub fn parse_properties(entry: &Node) -> HashMap<String, CmisProperty> {
    let Some(properties) = child(entry, NS_CMISRA, "object")
        .and_then(|object| child(&object, NS_CMIS, "properties"))
    else {
        return HashMap::new();
    };

    properties
        .children()
        .filter(|p| p.is_element())
        .map(|p| {
            let id = attr(&p, "propertyDefinitionId");
            let property = CmisProperty {
                kind: p.tag_name().name().to_string(),
                id: id.clone(),
                local_name: attr(&p, "localName"),
                display_name: attr(&p, "displayName"),
                value: child_text(&p, NS_CMIS, "value"),
            };
            (id, property)
        })
        .collect()
}

/// RFC 3339 timestamps such as `2009-11-03T11:55:39.495Z`.
pub fn parse_xml_date(date: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(date.trim())
        .ok()
        .map(|d| d.with_timezone(&Utc))
}
