//! Metadata tree attached to products.

use serde::{Deserialize, Serialize};

/// Value of a variable attribute or metadata attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Text(String),
    Numbers(Vec<f64>),
}

impl AttributeValue {
    /// First numeric value, parsing text when necessary.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Numbers(values) => values.first().copied(),
            AttributeValue::Text(text) => text.trim().parse().ok(),
        }
    }

    /// All numeric values; text is split on whitespace and commas.
    pub fn as_f64_vec(&self) -> Option<Vec<f64>> {
        match self {
            AttributeValue::Numbers(values) => Some(values.clone()),
            AttributeValue::Text(text) => text
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|s| !s.is_empty())
                .map(|s| s.parse().ok())
                .collect(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(text) => Some(text),
            AttributeValue::Numbers(_) => None,
        }
    }

    /// Render the value the way it is shown in metadata listings.
    pub fn to_display_string(&self) -> String {
        match self {
            AttributeValue::Text(text) => text.clone(),
            AttributeValue::Numbers(values) => values
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(text: &str) -> Self {
        AttributeValue::Text(text.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(text: String) -> Self {
        AttributeValue::Text(text)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Numbers(vec![value])
    }
}

impl From<Vec<f64>> for AttributeValue {
    fn from(values: Vec<f64>) -> Self {
        AttributeValue::Numbers(values)
    }
}

/// A named attribute in a metadata element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataAttribute {
    pub name: String,
    pub value: AttributeValue,
}

/// A node of the product metadata tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataElement {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<MetadataAttribute>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub elements: Vec<MetadataElement>,
}

impl MetadataElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            elements: Vec::new(),
        }
    }

    pub fn add_attribute(&mut self, name: impl Into<String>, value: impl Into<AttributeValue>) {
        self.attributes.push(MetadataAttribute {
            name: name.into(),
            value: value.into(),
        });
    }

    pub fn add_element(&mut self, element: MetadataElement) {
        self.elements.push(element);
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.iter().find(|a| a.name == name).map(|a| &a.value)
    }

    pub fn element(&self, name: &str) -> Option<&MetadataElement> {
        self.elements.iter().find(|e| e.name == name)
    }

    /// Follow a path of child element names.
    pub fn element_at_path<S: AsRef<str>>(&self, path: &[S]) -> Option<&MetadataElement> {
        path.iter()
            .try_fold(self, |element, name| element.element(name.as_ref()))
    }

    pub fn num_elements(&self) -> usize {
        self.elements.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_value_parsing() {
        assert_eq!(AttributeValue::from("400.5").as_f64(), Some(400.5));
        assert_eq!(AttributeValue::from(vec![1.0, 2.0]).as_f64(), Some(1.0));
        assert_eq!(
            AttributeValue::from("1 2, 4").as_f64_vec(),
            Some(vec![1.0, 2.0, 4.0])
        );
        assert_eq!(AttributeValue::from("a b").as_f64_vec(), None);
        assert_eq!(AttributeValue::from("no").as_f64(), None);
    }

    #[test]
    fn test_element_at_path() {
        let mut band = MetadataElement::new("band");
        band.add_attribute("name", "Oa01");
        let mut descriptions = MetadataElement::new("bandDescriptions");
        descriptions.add_element(band);
        let mut info = MetadataElement::new("olciProductInformation");
        info.add_element(descriptions);
        let mut root = MetadataElement::new("Manifest");
        root.add_element(info);

        let found = root
            .element_at_path(&["olciProductInformation", "bandDescriptions"])
            .unwrap();
        assert_eq!(found.num_elements(), 1);
        assert_eq!(
            found.elements[0].attribute("name"),
            Some(&AttributeValue::from("Oa01"))
        );
        assert!(root.element_at_path(&["missing"]).is_none());
    }
}
