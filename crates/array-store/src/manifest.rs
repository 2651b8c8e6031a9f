//! XFDU manifest reader.
//!
//! Parses `xfdumanifest.xml` into an element tree once and answers the
//! lookups the product reader needs. Path lookups use a small subset of
//! XPath: slash-separated local names, each optionally followed by one
//! `[@attr='value']` predicate, evaluated from the document element.
//! Namespace prefixes are ignored throughout.

use chrono::{DateTime, NaiveDateTime, Utc};
use product_common::{Manifest, MetadataElement, ProductError, ProductResult};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};

#[derive(Debug, Clone, Default)]
struct XmlNode {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlNode>,
    text: String,
}

impl XmlNode {
    fn from_start(e: &BytesStart) -> StoreResult<Self> {
        let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
        let mut attributes = Vec::new();
        for attr in e.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).to_string();
            let value = attr.unescape_value()?.to_string();
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            children: Vec::new(),
            text: String::new(),
        })
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// First node with local name `name` in document order, self included.
    fn descendant(&self, name: &str) -> Option<&XmlNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.descendant(name))
    }

    fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

fn parse_document(xml: &str) -> StoreResult<XmlNode> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut stack: Vec<XmlNode> = Vec::new();
    let mut root: Option<XmlNode> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => stack.push(XmlNode::from_start(&e)?),
            Ok(Event::Empty(e)) => {
                let node = XmlNode::from_start(&e)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None => root = Some(node),
                }
            }
            Ok(Event::Text(t)) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&t.unescape()?);
                }
            }
            Ok(Event::CData(t)) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&String::from_utf8_lossy(&t));
                }
            }
            Ok(Event::End(_)) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| StoreError::Manifest("unbalanced end tag".to_string()))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None => root = Some(node),
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(StoreError::Manifest(format!(
                    "XML parsing error at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(StoreError::Manifest("unexpected end of document".to_string()));
    }
    root.ok_or_else(|| StoreError::Manifest("empty document".to_string()))
}

/// One step of a manifest path.
#[derive(Debug, PartialEq)]
struct PathStep<'a> {
    name: &'a str,
    predicate: Option<(&'a str, &'a str)>,
}

fn parse_step(step: &str) -> StoreResult<PathStep<'_>> {
    let invalid = || StoreError::Manifest(format!("unsupported path step '{}'", step));

    let Some(open) = step.find('[') else {
        let name = step.rsplit(':').next().unwrap_or(step);
        return Ok(PathStep {
            name,
            predicate: None,
        });
    };

    let name = &step[..open];
    let name = name.rsplit(':').next().unwrap_or(name);
    let inner = step[open + 1..].strip_suffix(']').ok_or_else(invalid)?;
    let inner = inner.strip_prefix('@').ok_or_else(invalid)?;
    let (attr, value) = inner.split_once('=').ok_or_else(invalid)?;
    let value = value
        .trim()
        .trim_matches(|c| c == '\'' || c == '"');
    Ok(PathStep {
        name,
        predicate: Some((attr.trim(), value)),
    })
}

fn matches_step(node: &XmlNode, step: &PathStep) -> bool {
    node.name == step.name
        && step
            .predicate
            .map(|(attr, value)| node.attribute(attr) == Some(value))
            .unwrap_or(true)
}

fn select<'a>(node: &'a XmlNode, steps: &[PathStep]) -> Option<&'a XmlNode> {
    let Some((step, rest)) = steps.split_first() else {
        return Some(node);
    };
    node.children
        .iter()
        .filter(|c| matches_step(c, step))
        .find_map(|c| select(c, rest))
}

fn parse_time(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(time) = DateTime::parse_from_rfc3339(text) {
        return Some(time.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|t| t.and_utc())
}

/// Convert an XML subtree into a metadata element.
///
/// XML attributes and text-only children become metadata attributes; children
/// with structure become nested elements.
fn to_metadata(node: &XmlNode) -> MetadataElement {
    let mut element = MetadataElement::new(node.name.clone());
    for (key, value) in &node.attributes {
        element.add_attribute(key.clone(), value.clone());
    }
    for child in &node.children {
        if child.is_leaf() && child.attributes.is_empty() {
            element.add_attribute(child.name.clone(), child.text.trim().to_string());
        } else {
            element.add_element(to_metadata(child));
        }
    }
    if node.is_leaf() && !node.text.trim().is_empty() {
        element.add_attribute("value", node.text.trim().to_string());
    }
    element
}

/// Data object entry of the manifest.
#[derive(Debug, Clone, PartialEq)]
struct DataObject {
    id: String,
    file_name: String,
}

/// A parsed XFDU manifest.
#[derive(Debug, Clone)]
pub struct XfduManifest {
    document: XmlNode,
    product_type: String,
    product_name: String,
    baseline_collection: String,
    description: String,
    start_time: Option<DateTime<Utc>>,
    stop_time: Option<DateTime<Utc>>,
    data_objects: Vec<DataObject>,
    metadata: MetadataElement,
}

impl XfduManifest {
    pub fn parse(xml: &str) -> StoreResult<Self> {
        let document = parse_document(xml)?;

        let metadata_section = document.child("metadataSection");
        let text_of = |name: &str| -> String {
            metadata_section
                .and_then(|s| s.descendant(name))
                .map(|n| n.text.trim().to_string())
                .unwrap_or_default()
        };

        let product_type = text_of("productType");
        if product_type.is_empty() {
            return Err(StoreError::Manifest("manifest has no productType".to_string()));
        }
        let product_name = text_of("productName");
        let baseline_collection = text_of("baselineCollection");

        let time_of = |name: &str| {
            let text = text_of(name);
            let time = parse_time(&text);
            if time.is_none() && !text.is_empty() {
                warn!(element = name, value = %text, "Ignoring unparseable time");
            }
            time
        };
        let start_time = time_of("startTime");
        let stop_time = time_of("stopTime");

        let description = document
            .descendant("contentUnit")
            .and_then(|n| n.attribute("textInfo"))
            .unwrap_or_default()
            .to_string();

        let data_objects: Vec<DataObject> = document
            .child("dataObjectSection")
            .map(|section| {
                section
                    .children
                    .iter()
                    .filter(|c| c.name == "dataObject")
                    .filter_map(|object| {
                        let href = object.descendant("fileLocation")?.attribute("href")?;
                        Some(DataObject {
                            id: object.attribute("ID").unwrap_or_default().to_string(),
                            file_name: href.trim_start_matches("./").to_string(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        let mut metadata = MetadataElement::new("Manifest");
        if let Some(section) = metadata_section {
            for object in section.children.iter().filter(|c| c.name == "metadataObject") {
                let Some(xml_data) = object.descendant("xmlData") else {
                    continue;
                };
                let element = match xml_data.children.as_slice() {
                    [single] => to_metadata(single),
                    children => {
                        let id = object.attribute("ID").unwrap_or("metadataObject");
                        let mut element = MetadataElement::new(id);
                        children
                            .iter()
                            .for_each(|c| element.add_element(to_metadata(c)));
                        element
                    }
                };
                metadata.add_element(element);
            }
        }

        debug!(
            product_type = %product_type,
            product_name = %product_name,
            data_objects = data_objects.len(),
            "Parsed XFDU manifest"
        );

        Ok(Self {
            document,
            product_type,
            product_name,
            baseline_collection,
            description,
            start_time,
            stop_time,
            data_objects,
            metadata,
        })
    }

    /// Trimmed text of the element at `path`.
    pub fn xpath_text(&self, path: &str) -> StoreResult<String> {
        let steps = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(parse_step)
            .collect::<StoreResult<Vec<_>>>()?;

        // Paths may start at the document element itself.
        let start = match steps.first() {
            Some(first) if matches_step(&self.document, first) => &steps[1..],
            _ => &steps[..],
        };

        select(&self.document, start)
            .map(|node| node.text.trim().to_string())
            .ok_or_else(|| StoreError::Manifest(format!("no element at {}", path)))
    }

    /// Data object ids with their file names, in manifest order.
    pub fn data_objects(&self) -> Vec<(String, String)> {
        self.data_objects
            .iter()
            .map(|o| (o.id.clone(), o.file_name.clone()))
            .collect()
    }
}

impl Manifest for XfduManifest {
    fn xpath_int(&self, path: &str) -> ProductResult<i64> {
        let text = self.xpath_text(path)?;
        text.parse().map_err(|_| {
            ProductError::Manifest(format!("value '{}' at {} is not an integer", text, path))
        })
    }

    fn product_type(&self) -> &str {
        &self.product_type
    }

    fn product_name(&self) -> &str {
        &self.product_name
    }

    fn baseline_collection(&self) -> &str {
        &self.baseline_collection
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start_time
    }

    fn stop_time(&self) -> Option<DateTime<Utc>> {
        self.stop_time
    }

    fn file_names(&self, excluded_ids: &[String]) -> Vec<String> {
        self.data_objects
            .iter()
            .filter(|o| !excluded_ids.contains(&o.id))
            .map(|o| o.file_name.clone())
            .collect()
    }

    fn metadata(&self) -> MetadataElement {
        self.metadata.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_step() {
        assert_eq!(
            parse_step("metadataObject[@ID='olciProductInformation']").unwrap(),
            PathStep {
                name: "metadataObject",
                predicate: Some(("ID", "olciProductInformation")),
            }
        );
        assert_eq!(
            parse_step("sentinel3:rows").unwrap(),
            PathStep {
                name: "rows",
                predicate: None,
            }
        );
        assert!(parse_step("a[ID='x']").is_err());
    }

    #[test]
    fn test_parse_time_formats() {
        assert!(parse_time("2016-04-19T10:13:02.000000Z").is_some());
        assert!(parse_time("2016-04-19T10:13:02.123456").is_some());
        assert!(parse_time("yesterday").is_none());
    }

    #[test]
    fn test_document_structure() {
        let node = parse_document("<a x='1'><b>text</b><c/></a>").unwrap();
        assert_eq!(node.name, "a");
        assert_eq!(node.attribute("x"), Some("1"));
        assert_eq!(node.children.len(), 2);
        assert_eq!(node.child("b").unwrap().text, "text");
        assert!(parse_document("<a><b></a>").is_err());
    }

    #[test]
    fn test_leaf_children_become_attributes() {
        let node = parse_document(
            "<band name='Oa01'><centralWavelength>400.0</centralWavelength><bandwidth>15</bandwidth></band>",
        )
        .unwrap();
        let element = to_metadata(&node);
        assert_eq!(element.name, "band");
        assert_eq!(element.attribute("name").and_then(|v| v.as_text()), Some("Oa01"));
        assert_eq!(
            element.attribute("centralWavelength").and_then(|v| v.as_f64()),
            Some(400.0)
        );
        assert_eq!(element.num_elements(), 0);
    }
}
