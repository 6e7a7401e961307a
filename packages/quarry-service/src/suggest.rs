use crate::provider::{
	ProviderQuery, ProviderResponse, SUGGEST_BUILD, SUGGEST_CONTEXT_FILTER_QUERY, SUGGEST_DICT,
	SUGGEST_HANDLER, SUGGEST_Q,
};
use quarry_domain::{
	Properties, ResponseProperties, ResponseValue,
	request::{
		SUGGESTION_BUILD_KEY, SUGGESTION_CONTEXT_KEY, SUGGESTION_DICT_KEY, SUGGESTION_QUERY_KEY,
	},
	response::SUGGESTION_RESULT_KEY,
};

/// An autocomplete request. When present it replaces the primary query outright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionRequest {
	pub query: String,
	pub context: String,
	pub dictionary: String,
	pub build: Option<bool>,
}
impl SuggestionRequest {
	/// All three of query, context and dictionary must be present as strings.
	pub fn from_properties(properties: &Properties) -> Option<Self> {
		let query = properties.get_str(SUGGESTION_QUERY_KEY)?;
		let context = properties.get_str(SUGGESTION_CONTEXT_KEY)?;
		let dictionary = properties.get_str(SUGGESTION_DICT_KEY)?;

		Some(Self {
			query: query.to_string(),
			context: context.to_string(),
			dictionary: dictionary.to_string(),
			build: properties.get_bool(SUGGESTION_BUILD_KEY),
		})
	}

	pub fn to_provider_query(&self) -> ProviderQuery {
		let mut query = ProviderQuery {
			request_handler: Some(SUGGEST_HANDLER.to_string()),
			..ProviderQuery::default()
		};

		query.set_param(SUGGEST_Q, &self.query);
		query.set_param(SUGGEST_CONTEXT_FILTER_QUERY, &self.context);
		query.set_param(SUGGEST_DICT, &self.dictionary);

		if let Some(build) = self.build {
			query.set_param(SUGGEST_BUILD, build.to_string());
		}

		query
	}
}

/// Flattens every dictionary's suggestions into `(payload, term)` pairs.
pub fn decode_suggestions(response: &ProviderResponse, properties: &mut ResponseProperties) {
	let Some(groups) = response.suggestions.as_ref() else {
		return;
	};
	let suggestions = groups
		.iter()
		.flat_map(|group| group.suggestions.iter())
		.map(|suggestion| (suggestion.payload.clone(), suggestion.term.clone()))
		.collect();

	properties.insert(SUGGESTION_RESULT_KEY, ResponseValue::Suggestions(suggestions));
}
