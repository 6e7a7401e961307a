use std::collections::BTreeMap;

use serde_json::Value;

use crate::{
	Result,
	provider::{Document, InputDocument},
};
use quarry_domain::{AttributeFormat, Metacard, MetacardType};

pub const FIRST_CHAR_OF_SUFFIX: char = '_';
pub const TEXT_SUFFIX: &str = "_txt";
pub const XML_SUFFIX: &str = "_xml";
pub const DATE_SUFFIX: &str = "_tdt";
pub const GEO_SUFFIX: &str = "_geo";
pub const BINARY_SUFFIX: &str = "_bin";
pub const OBJECT_SUFFIX: &str = "_obj";
pub const BOOLEAN_SUFFIX: &str = "_bool";
pub const INTEGER_SUFFIX: &str = "_int";
pub const LONG_SUFFIX: &str = "_lng";
pub const FLOAT_SUFFIX: &str = "_flt";
pub const DOUBLE_SUFFIX: &str = "_dbl";
pub const SHORT_SUFFIX: &str = "_shr";

/// Free-form hints for field resolution, such as `caseSensitive`.
pub type FieldOptions = BTreeMap<String, Value>;

pub const CASE_SENSITIVE_OPTION: &str = "caseSensitive";

/// Maps catalog attributes onto backend fields and back.
pub trait SchemaResolver
where
	Self: Send + Sync,
{
	/// Display name of a backend field, with any type suffix removed.
	fn resolve_field_name(&self, field: &str) -> String;

	/// Concrete backend field for an attribute of `format`, if the schema knows one.
	fn field(
		&self,
		attribute: &str,
		format: AttributeFormat,
		is_search_phrase: bool,
		options: &FieldOptions,
	) -> Option<String>;

	/// Every typed backend field an attribute is stored under, most specific first.
	fn anonymous_fields(&self, attribute: &str) -> Vec<String>;

	fn sort_key(&self, field: &str) -> String;

	fn metacard_type(&self, doc: &Document) -> Result<MetacardType>;

	fn doc_values(&self, field: &str, values: &[Value]) -> Vec<Value>;

	/// Internal bookkeeping fields never surface as metacard attributes.
	fn is_private_field(&self, field: &str) -> bool;

	fn add_fields(&self, metacard: &Metacard, doc: &mut InputDocument) -> Result<()>;
}

pub fn suffix_for(format: AttributeFormat) -> &'static str {
	match format {
		AttributeFormat::String => TEXT_SUFFIX,
		AttributeFormat::Xml => XML_SUFFIX,
		AttributeFormat::Date => DATE_SUFFIX,
		AttributeFormat::Geometry => GEO_SUFFIX,
		AttributeFormat::Binary => BINARY_SUFFIX,
		AttributeFormat::Object => OBJECT_SUFFIX,
		AttributeFormat::Boolean => BOOLEAN_SUFFIX,
		AttributeFormat::Short => SHORT_SUFFIX,
		AttributeFormat::Integer => INTEGER_SUFFIX,
		AttributeFormat::Long => LONG_SUFFIX,
		AttributeFormat::Float => FLOAT_SUFFIX,
		AttributeFormat::Double => DOUBLE_SUFFIX,
	}
}

/// Binary and opaque object fields cannot be sorted on.
pub fn is_sortable(field: &str) -> bool {
	!(field.ends_with(BINARY_SUFFIX) || field.ends_with(OBJECT_SUFFIX))
}
