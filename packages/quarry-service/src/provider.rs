//! Backend-native query and response shapes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const ALL_FIELDS: &str = "*";
pub const RELEVANCE_SORT_FIELD: &str = "score";
pub const DISTANCE_SORT_FUNCTION: &str = "geodist()";
pub const DISTANCE_SORT_FIELD: &str = "_distance_";
pub const SORT_FIELD_KEY: &str = "sfield";
pub const POINT_KEY: &str = "pt";
pub const SPELLCHECK_PARAM: &str = "spellcheck";
pub const IDS_PARAM: &str = "ids";
pub const GET_HANDLER: &str = "/get";
pub const SUGGEST_HANDLER: &str = "/suggest";
pub const SUGGEST_Q: &str = "suggest.q";
pub const SUGGEST_CONTEXT_FILTER_QUERY: &str = "suggest.cfq";
pub const SUGGEST_DICT: &str = "suggest.dictionary";
pub const SUGGEST_BUILD: &str = "suggest.build";
pub const MATCH_ALL: &str = "*:*";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
	Asc,
	Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortClause {
	pub field: String,
	pub order: Order,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetParams {
	pub fields: Vec<String>,
	/// Comma-joined field paths, outermost first.
	pub pivot_fields: Vec<String>,
	pub sort: Option<String>,
	pub limit: Option<u32>,
	pub min_count: Option<u32>,
}

/// A query in the backend's own vocabulary, built up stage by stage before execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderQuery {
	pub request_handler: Option<String>,
	pub query: Option<String>,
	pub filter_queries: Vec<String>,
	pub fields: Vec<String>,
	pub sorts: Vec<SortClause>,
	pub start: Option<u64>,
	pub rows: Option<u32>,
	pub facet: Option<FacetParams>,
	pub time_allowed_ms: Option<u32>,
	pub params: BTreeMap<String, Vec<String>>,
}
impl ProviderQuery {
	pub fn new(query: impl Into<String>) -> Self {
		Self { query: Some(query.into()), ..Self::default() }
	}

	pub fn set_fields<I, S>(&mut self, fields: I)
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.fields = fields.into_iter().map(Into::into).collect();
	}

	pub fn add_sort(&mut self, field: impl Into<String>, order: Order) {
		self.sorts.push(SortClause { field: field.into(), order });
	}

	/// Replaces every existing value of `key`.
	pub fn set_param(&mut self, key: impl Into<String>, value: impl Into<String>) {
		self.params.insert(key.into(), vec![value.into()]);
	}

	pub fn add_param(&mut self, key: impl Into<String>, value: impl Into<String>) {
		self.params.entry(key.into()).or_default().push(value.into());
	}

	pub fn param(&self, key: &str) -> Option<&str> {
		self.params.get(key).and_then(|values| values.first()).map(String::as_str)
	}

	pub fn param_values(&self, key: &str) -> &[String] {
		self.params.get(key).map(Vec::as_slice).unwrap_or(&[])
	}

	pub fn facet_mut(&mut self) -> &mut FacetParams {
		self.facet.get_or_insert_with(FacetParams::default)
	}
}

/// A backend record as an ordered list of multi-valued fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
	pub fields: Vec<(String, Vec<Value>)>,
}
impl Document {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
		self.add_value(name, value);

		self
	}

	pub fn add_value(&mut self, name: impl Into<String>, value: impl Into<Value>) {
		let name = name.into();

		match self.fields.iter_mut().find(|(field, _)| *field == name) {
			Some((_, values)) => values.push(value.into()),
			None => self.fields.push((name, vec![value.into()])),
		}
	}

	pub fn set_values(&mut self, name: impl Into<String>, values: Vec<Value>) {
		let name = name.into();

		match self.fields.iter_mut().find(|(field, _)| *field == name) {
			Some((_, existing)) => *existing = values,
			None => self.fields.push((name, values)),
		}
	}

	pub fn field_names(&self) -> impl Iterator<Item = &str> {
		self.fields.iter().map(|(name, _)| name.as_str())
	}

	pub fn values(&self, name: &str) -> Option<&[Value]> {
		self.fields.iter().find(|(field, _)| field == name).map(|(_, values)| values.as_slice())
	}

	pub fn first(&self, name: &str) -> Option<&Value> {
		self.values(name).and_then(|values| values.first())
	}
}

/// Documents sent to the backend on writes share the read-side shape.
pub type InputDocument = Document;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentList {
	pub docs: Vec<Document>,
	pub num_found: u64,
}
impl DocumentList {
	pub fn len(&self) -> usize {
		self.docs.len()
	}

	pub fn is_empty(&self) -> bool {
		self.docs.is_empty()
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetCount {
	pub name: String,
	pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetField {
	pub name: String,
	pub values: Vec<FacetCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotField {
	pub field: String,
	pub value: Value,
	pub count: u64,
	#[serde(default)]
	pub pivot: Vec<PivotField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
	pub term: String,
	pub payload: String,
	pub weight: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionGroup {
	pub dictionary: String,
	pub suggestions: Vec<Suggestion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correction {
	pub original: String,
	pub correction: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collation {
	pub query_string: String,
	pub hits: i64,
	pub corrections: Vec<Correction>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellcheckResponse {
	pub collations: Vec<Collation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderResponse {
	/// Free-form response header (`partialResults`, echoed `params`, ...).
	#[serde(default)]
	pub header: Map<String, Value>,
	#[serde(default)]
	pub query_time_ms: u64,
	pub results: Option<DocumentList>,
	#[serde(default)]
	pub facet_fields: Vec<FacetField>,
	#[serde(default)]
	pub facet_pivot: Vec<(String, Vec<PivotField>)>,
	pub suggestions: Option<Vec<SuggestionGroup>>,
	pub spellcheck: Option<SpellcheckResponse>,
}
impl ProviderResponse {
	pub fn with_documents(docs: Vec<Document>, num_found: u64) -> Self {
		Self { results: Some(DocumentList { docs, num_found }), ..Self::default() }
	}

	pub fn document_count(&self) -> usize {
		self.results.as_ref().map(DocumentList::len).unwrap_or(0)
	}

	pub fn num_found(&self) -> u64 {
		self.results.as_ref().map(|results| results.num_found).unwrap_or(0)
	}
}
