//! CMIS SQL construction and URI template expansion for the `query` collection.

use crate::domain::model::QueryType;
use url::form_urlencoded;

/// Placeholder names and the fixed values they expand to. `{q}` is filled per call.
const TEMPLATE_DEFAULTS: [(&str, &str); 5] = [
    ("searchAllVersions", "false"),
    ("maxItems", "50"),
    ("skipCount", "0"),
    ("includeAllowableActions", "false"),
    ("includeRelationships", "false"),
];

pub fn title_query(text: &str) -> String {
    format!("SELECT * FROM cmis:document WHERE cmis:name LIKE '%{text}%'")
}

/// Every whitespace separated word must be contained in the document.
pub fn fulltext_query(text: &str) -> String {
    let condition = text
        .split_whitespace()
        .map(|word| format!("contains ('{word}')"))
        .collect::<Vec<_>>()
        .join(" AND ");

    format!("SELECT * FROM cmis:document WHERE {condition}")
}

pub fn build_query(query_type: QueryType, text: &str) -> String {
    match query_type {
        QueryType::Title => title_query(text),
        QueryType::Fulltext => fulltext_query(text),
        QueryType::CmisQuery => text.to_string(),
    }
}

/// Form-encodes `cmis_query` into `{q}` and fills the remaining known
/// placeholders. Unknown `{...}` segments are left as they are, and inserted
/// values are never re-scanned.
pub fn expand_query_template(template: &str, cmis_query: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(cmis_query.as_bytes()).collect();

    let mut out = String::with_capacity(template.len() + encoded.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };

        let name = &after[..close];
        match placeholder_value(name, &encoded) {
            Some(value) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

fn placeholder_value<'a>(name: &str, encoded_query: &'a str) -> Option<&'a str> {
    if name == "q" {
        return Some(encoded_query);
    }
    TEMPLATE_DEFAULTS
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, value)| *value)
}

pub fn search_url(template: &str, query_type: QueryType, text: &str) -> String {
    expand_query_template(template, &build_query(query_type, text))
}
