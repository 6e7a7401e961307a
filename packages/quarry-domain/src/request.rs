use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::filter::FilterExpr;

pub const ADDITIONAL_SORT_BYS: &str = "additional.sort.bys";
pub const FACET_PROPERTIES_KEY: &str = "facet-properties";
pub const SUGGESTION_QUERY_KEY: &str = "suggestion-query";
pub const SUGGESTION_CONTEXT_KEY: &str = "suggestion-context";
pub const SUGGESTION_DICT_KEY: &str = "suggestion-dictionary";
pub const SUGGESTION_BUILD_KEY: &str = "suggestion-build";
pub const SPELLCHECK_KEY: &str = "spellcheck";
pub const DO_REALTIME_GET: &str = "doRealtimeGet";

/// Sort pseudo-property ordering by backend relevance score.
pub const RELEVANCE: &str = "RELEVANCE";
/// Sort pseudo-property ordering by distance from the filter's distance origin.
pub const DISTANCE: &str = "DISTANCE";
/// Sort pseudo-property ordering by the effective date.
pub const TEMPORAL: &str = "TEMPORAL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortOrder {
	Ascending,
	Descending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortBy {
	pub property: String,
	pub order: SortOrder,
}
impl SortBy {
	pub fn new(property: impl Into<String>, order: SortOrder) -> Self {
		Self { property: property.into(), order }
	}

	pub fn ascending(property: impl Into<String>) -> Self {
		Self::new(property, SortOrder::Ascending)
	}

	pub fn descending(property: impl Into<String>) -> Self {
		Self::new(property, SortOrder::Descending)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacetSortKey {
	Count,
	Index,
}
impl FacetSortKey {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Count => "count",
			Self::Index => "index",
		}
	}
}

/// Term facet request attached to a query under [`FACET_PROPERTIES_KEY`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermFacetProperties {
	pub facet_attributes: Vec<String>,
	pub sort_key: FacetSortKey,
	pub facet_limit: u32,
	pub min_facet_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
	String(String),
	Bool(bool),
	Long(i64),
	SortBys(Vec<SortBy>),
	TermFacet(TermFacetProperties),
}

/// Named request directives. Typed getters return `None` for a missing key and for a key
/// holding a value of another type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Properties(BTreeMap<String, PropertyValue>);
impl Properties {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(
		&mut self,
		key: impl Into<String>,
		value: PropertyValue,
	) -> Option<PropertyValue> {
		self.0.insert(key.into(), value)
	}

	pub fn with(mut self, key: impl Into<String>, value: PropertyValue) -> Self {
		self.insert(key, value);

		self
	}

	pub fn get(&self, key: &str) -> Option<&PropertyValue> {
		self.0.get(key)
	}

	pub fn get_str(&self, key: &str) -> Option<&str> {
		match self.get(key)? {
			PropertyValue::String(value) => Some(value.as_str()),
			_ => None,
		}
	}

	pub fn get_bool(&self, key: &str) -> Option<bool> {
		match self.get(key)? {
			PropertyValue::Bool(value) => Some(*value),
			_ => None,
		}
	}

	pub fn get_sort_bys(&self, key: &str) -> Option<&[SortBy]> {
		match self.get(key)? {
			PropertyValue::SortBys(value) => Some(value.as_slice()),
			_ => None,
		}
	}

	pub fn get_term_facet(&self, key: &str) -> Option<&TermFacetProperties> {
		match self.get(key)? {
			PropertyValue::TermFacet(value) => Some(value),
			_ => None,
		}
	}

	pub fn iter(&self) -> impl Iterator<Item = (&String, &PropertyValue)> {
		self.0.iter()
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
	pub filter: FilterExpr,
	/// One-based index of the first record to return.
	pub start_index: i64,
	pub page_size: i64,
	pub sort_by: Option<SortBy>,
	/// Caller's own deadline. It can only tighten the configured time budget.
	pub timeout_ms: Option<u64>,
}
impl Query {
	pub fn new(filter: FilterExpr) -> Self {
		Self { filter, start_index: 1, page_size: 10, sort_by: None, timeout_ms: None }
	}

	pub fn paged(mut self, start_index: i64, page_size: i64) -> Self {
		self.start_index = start_index;
		self.page_size = page_size;

		self
	}

	pub fn sorted(mut self, sort_by: SortBy) -> Self {
		self.sort_by = Some(sort_by);

		self
	}

	pub fn timeout(mut self, timeout_ms: u64) -> Self {
		self.timeout_ms = Some(timeout_ms);

		self
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
	pub query: Query,
	pub properties: Properties,
}
impl QueryRequest {
	pub fn new(query: Query) -> Self {
		Self { query, properties: Properties::new() }
	}

	pub fn with_property(mut self, key: impl Into<String>, value: PropertyValue) -> Self {
		self.properties.insert(key, value);

		self
	}

	/// Primary sort first, then any additional sorts in declaration order.
	pub fn sort_bys(&self) -> Vec<SortBy> {
		let mut sort_bys = Vec::new();

		if let Some(sort_by) = self.query.sort_by.as_ref() {
			sort_bys.push(sort_by.clone());
		}
		if let Some(additional) = self.properties.get_sort_bys(ADDITIONAL_SORT_BYS) {
			sort_bys.extend(additional.iter().cloned());
		}

		sort_bys
	}
}
