//! SOAP 1.1 envelope for the `ServersList` operation and the parser that digs
//! server records out of whatever the upstream nests inside the response.

use std::collections::BTreeMap;

use roxmltree::{Document, Node};
use serde_json::Value;

use super::{FetchError, RawRecord};

pub const OPERATION: &str = "ServersList";
const SOAP_ENV_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
const XML_SCHEMA_NS: &str = "http://www.w3.org/2001/XMLSchema";
const DIFFGRAM_NS: &str = "urn:schemas-microsoft-com:xml-diffgram-v1";

/// Preferred members holding the record array in a JSON payload.
const JSON_LIST_KEYS: &[&str] = &["result", "servers", "Servers", "data", "items"];

fn escape_xml(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub fn soap_action(namespace: &str) -> String {
    if namespace.ends_with('/') {
        format!("\"{namespace}{OPERATION}\"")
    } else {
        format!("\"{namespace}/{OPERATION}\"")
    }
}

pub fn servers_list_envelope(namespace: &str, api_key: Option<&str>) -> String {
    let ns = escape_xml(namespace);
    let header = api_key
        .map(|key| {
            format!(
                "<soap:Header><AuthHeader xmlns=\"{ns}\"><ApiKey>{}</ApiKey></AuthHeader></soap:Header>",
                escape_xml(key)
            )
        })
        .unwrap_or_default();
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\
         <soap:Envelope xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\" \
         xmlns:xsd=\"http://www.w3.org/2001/XMLSchema\" xmlns:soap=\"{SOAP_ENV_NS}\">\
         {header}<soap:Body><{OPERATION} xmlns=\"{ns}\" /></soap:Body></soap:Envelope>"
    )
}

fn is_named(node: &Node, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name
}

fn is_leaf(node: &Node) -> bool {
    node.is_element() && !node.children().any(|c| c.is_element())
}

/// Inline DataSet schemas and diffgram bookkeeping (`before`, `errors`) carry no rows.
fn is_skipped(node: &Node) -> bool {
    match node.tag_name().namespace() {
        Some(XML_SCHEMA_NS) => true,
        Some(DIFFGRAM_NS) => matches!(node.tag_name().name(), "before" | "errors"),
        _ => false,
    }
}

fn elements<'a, 'input>(node: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|c| c.is_element() && !is_skipped(c))
}

/// A row carries at least one scalar field of its own.
fn has_fields(node: &Node) -> bool {
    elements(*node).any(|c| is_leaf(&c))
}

/// The rows of a list container, or `None` when `node` only wraps other
/// containers. Scalar siblings such as `<Count>` are not rows, and when rows
/// use several tag names only the most frequent ones are kept.
fn list_rows<'a, 'input>(node: Node<'a, 'input>) -> Option<Vec<Node<'a, 'input>>> {
    let nested: Vec<_> = elements(node).filter(|c| !is_leaf(c)).collect();
    if nested.is_empty() || !nested.iter().all(has_fields) {
        return None;
    }
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for row in &nested {
        *counts.entry(row.tag_name().name().to_string()).or_default() += 1;
    }
    let most = counts.values().copied().max().unwrap_or_default();
    Some(
        nested
            .into_iter()
            .filter(|row| counts.get(row.tag_name().name()) == Some(&most))
            .collect(),
    )
}

/// `<Disks><Disk>1TB</Disk><Disk>1TB</Disk></Disks>` becomes `1TB, 1TB`.
fn joined_text(node: &Node) -> String {
    node.descendants()
        .filter(|n| is_leaf(n) && !is_skipped(n))
        .filter_map(|n| n.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

fn record_from_node(node: &Node) -> RawRecord {
    let mut record = RawRecord::new();
    // Namespaced attributes are DataSet plumbing (diffgr:id, msdata:rowOrder, xsi:nil).
    for attr in node.attributes().filter(|a| a.namespace().is_none()) {
        record
            .entry(attr.name().to_string())
            .or_insert_with(|| attr.value().trim().to_string());
    }
    for field in elements(*node) {
        let value = if is_leaf(&field) {
            field.text().map(str::trim).unwrap_or_default().to_string()
        } else {
            joined_text(&field)
        };
        record
            .entry(field.tag_name().name().to_string())
            .or_insert(value);
    }
    record
}

fn collect_records(node: Node, out: &mut Vec<RawRecord>) {
    if is_skipped(&node) {
        return;
    }
    match list_rows(node) {
        Some(rows) => out.extend(rows.iter().map(record_from_node)),
        None => {
            for child in elements(node) {
                collect_records(child, out);
            }
        }
    }
}

fn record_from_json(value: &Value) -> Option<RawRecord> {
    let object = value.as_object()?;
    let record = object
        .iter()
        .filter_map(|(key, value)| {
            let text = match value {
                Value::String(s) => s.trim().to_string(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => return None,
            };
            Some((key.clone(), text))
        })
        .collect();
    Some(record)
}

fn records_from_json(text: &str) -> Result<Vec<RawRecord>, FetchError> {
    let value: Value = serde_json::from_str(text)?;
    let list = match &value {
        Value::Array(items) => items,
        Value::Object(map) => JSON_LIST_KEYS
            .iter()
            .filter_map(|key| map.get(*key))
            .chain(map.values())
            .find_map(Value::as_array)
            .ok_or_else(|| FetchError::Malformed("JSON payload holds no server list".to_string()))?,
        _ => {
            return Err(FetchError::Malformed(
                "JSON payload is neither a list nor an object".to_string(),
            ));
        }
    };
    Ok(list.iter().filter_map(record_from_json).collect())
}

/// The result element carried a string; it is either escaped XML or JSON.
fn records_from_text(text: &str) -> Result<Vec<RawRecord>, FetchError> {
    let text = text.trim();
    if text.is_empty() {
        Ok(Vec::new())
    } else if text.starts_with('<') {
        let doc = Document::parse(text)?;
        let root = doc.root_element();
        let mut records = Vec::new();
        collect_records(root, &mut records);
        if records.is_empty() && has_fields(&root) {
            records.push(record_from_node(&root));
        }
        Ok(records)
    } else if text.starts_with('[') || text.starts_with('{') {
        records_from_json(text)
    } else {
        Err(FetchError::Malformed(format!(
            "unexpected text payload in {OPERATION}Result"
        )))
    }
}

pub fn parse_servers_list(xml: &str) -> Result<Vec<RawRecord>, FetchError> {
    let doc = Document::parse(xml)?;
    let body = doc
        .descendants()
        .find(|n| is_named(n, "Body"))
        .ok_or_else(|| FetchError::Malformed("missing soap:Body".to_string()))?;

    if let Some(fault) = body.children().find(|n| is_named(n, "Fault")) {
        let reason = fault
            .descendants()
            .find(|n| is_named(n, "faultstring") || is_named(n, "Text"))
            .and_then(|n| n.text())
            .map(str::trim)
            .unwrap_or("unspecified fault");
        return Err(FetchError::Fault(reason.to_string()));
    }

    let result = body
        .descendants()
        .find(|n| is_named(n, "ServersListResult"))
        .or_else(|| body.descendants().find(|n| is_named(n, "ServersListResponse")))
        .ok_or_else(|| FetchError::Malformed("missing ServersListResult".to_string()))?;

    let records = if result.children().any(|c| c.is_element()) {
        let mut records = Vec::new();
        collect_records(result, &mut records);
        records
    } else {
        records_from_text(result.text().unwrap_or_default())?
    };

    if records.is_empty() {
        Err(FetchError::Empty)
    } else {
        Ok(records)
    }
}
