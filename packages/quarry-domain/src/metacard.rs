use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const ID: &str = "id";
pub const EFFECTIVE: &str = "effective";
pub const GEOGRAPHY: &str = "location";
pub const CONTENT_TYPE: &str = "metadata-content-type";
pub const CONTENT_TYPE_VERSION: &str = "metadata-content-type-version";
pub const METACARD_TYPE: &str = "metacard-type";
pub const TITLE: &str = "title";
pub const ANY_TEXT: &str = "anyText";
pub const ANY_GEO: &str = "anyGeo";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttributeFormat {
	String,
	Boolean,
	Date,
	Short,
	Integer,
	Long,
	Float,
	Double,
	Geometry,
	Xml,
	Binary,
	Object,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDescriptor {
	pub name: String,
	pub format: AttributeFormat,
	pub multivalued: bool,
}
impl AttributeDescriptor {
	pub fn new(name: impl Into<String>, format: AttributeFormat) -> Self {
		Self { name: name.into(), format, multivalued: false }
	}

	pub fn multivalued(mut self) -> Self {
		self.multivalued = true;

		self
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetacardType {
	pub name: String,
	pub descriptors: Vec<AttributeDescriptor>,
}
impl MetacardType {
	pub fn new(name: impl Into<String>, descriptors: Vec<AttributeDescriptor>) -> Self {
		Self { name: name.into(), descriptors }
	}

	pub fn descriptor(&self, name: &str) -> Option<&AttributeDescriptor> {
		self.descriptors.iter().find(|descriptor| descriptor.name == name)
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
	pub name: String,
	pub values: Vec<Value>,
}
impl Attribute {
	pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
		Self { name: name.into(), values }
	}

	pub fn single(name: impl Into<String>, value: impl Into<Value>) -> Self {
		Self { name: name.into(), values: vec![value.into()] }
	}

	pub fn value(&self) -> Option<&Value> {
		self.values.first()
	}
}

/// A catalog record: a type descriptor plus name-ordered attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metacard {
	pub metacard_type: MetacardType,
	pub attributes: BTreeMap<String, Attribute>,
}
impl Metacard {
	pub fn new(metacard_type: MetacardType) -> Self {
		Self { metacard_type, attributes: BTreeMap::new() }
	}

	/// Replaces any attribute with the same name.
	pub fn set_attribute(&mut self, attribute: Attribute) {
		self.attributes.insert(attribute.name.clone(), attribute);
	}

	pub fn with_attribute(mut self, attribute: Attribute) -> Self {
		self.set_attribute(attribute);

		self
	}

	pub fn attribute(&self, name: &str) -> Option<&Attribute> {
		self.attributes.get(name)
	}

	pub fn id(&self) -> Option<&str> {
		self.attribute(ID).and_then(Attribute::value).and_then(Value::as_str)
	}

	pub fn type_name(&self) -> &str {
		self.metacard_type.name.as_str()
	}
}

/// One query hit: the metacard plus the optional scores the backend reported for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
	pub metacard: Metacard,
	pub relevance_score: Option<f64>,
	pub distance_in_meters: Option<f64>,
}
impl Hit {
	pub fn new(metacard: Metacard) -> Self {
		Self { metacard, relevance_score: None, distance_in_meters: None }
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentType {
	pub name: String,
	pub version: Option<String>,
}
impl ContentType {
	pub fn new(name: impl Into<String>, version: Option<String>) -> Self {
		Self { name: name.into(), version }
	}
}
