use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::metacard::Hit;

pub const FACET_RESULTS_KEY: &str = "facet-results";
pub const SUGGESTION_RESULT_KEY: &str = "suggestion-result";
pub const DID_YOU_MEAN_KEY: &str = "didYouMean";
pub const SHOWING_RESULTS_FOR_KEY: &str = "showingResultsFor";
pub const PARTIAL_RESULTS_KEY: &str = "partial-results";

/// Value/count breakdown for one faceted attribute, in backend order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetAttributeResult {
	pub attribute: String,
	pub values: Vec<String>,
	pub counts: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseValue {
	Facets(Vec<FacetAttributeResult>),
	/// `(payload, term)` pairs.
	Suggestions(Vec<(String, String)>),
	Terms(Vec<String>),
	Flag(bool),
}

/// Out-of-band annotations every pipeline stage may add to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseProperties(BTreeMap<String, ResponseValue>);
impl ResponseProperties {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&mut self, key: impl Into<String>, value: ResponseValue) {
		self.0.insert(key.into(), value);
	}

	pub fn get(&self, key: &str) -> Option<&ResponseValue> {
		self.0.get(key)
	}

	pub fn contains_key(&self, key: &str) -> bool {
		self.0.contains_key(key)
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn facets(&self) -> Option<&[FacetAttributeResult]> {
		match self.get(FACET_RESULTS_KEY)? {
			ResponseValue::Facets(facets) => Some(facets.as_slice()),
			_ => None,
		}
	}

	pub fn suggestions(&self) -> Option<&[(String, String)]> {
		match self.get(SUGGESTION_RESULT_KEY)? {
			ResponseValue::Suggestions(suggestions) => Some(suggestions.as_slice()),
			_ => None,
		}
	}

	pub fn terms(&self, key: &str) -> Option<&[String]> {
		match self.get(key)? {
			ResponseValue::Terms(terms) => Some(terms.as_slice()),
			_ => None,
		}
	}

	pub fn partial_results(&self) -> bool {
		matches!(self.get(PARTIAL_RESULTS_KEY), Some(ResponseValue::Flag(true)))
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceResponse {
	pub results: Vec<Hit>,
	pub total_hits: u64,
	pub properties: ResponseProperties,
}
impl SourceResponse {
	pub fn empty() -> Self {
		Self { results: Vec::new(), total_hits: 0, properties: ResponseProperties::new() }
	}
}
