//! The read path: route a request, run it, and assemble the response.

use serde_json::Value;

use crate::{
	Error, QuarryService, Result, compile, facet,
	provider::{GET_HANDLER, IDS_PARAM, ProviderQuery, ProviderResponse},
	results,
	suggest::{self, SuggestionRequest},
};
use quarry_domain::{
	Metacard, QueryRequest, ResponseProperties, ResponseValue, SourceResponse,
	request::{DO_REALTIME_GET, SPELLCHECK_KEY},
	response::PARTIAL_RESULTS_KEY,
};

const PARTIAL_RESULTS_HEADER: &str = "partialResults";
const PARAMS_HEADER: &str = "params";

/// Rewrites a compiled query into an identifier lookup against the real-time handler. The
/// main query string becomes a filter clause.
pub fn real_time_query(query: &ProviderQuery, ids: &[String]) -> ProviderQuery {
	let mut real_time = query.clone();

	if let Some(main) = real_time.query.take() {
		real_time.filter_queries.push(main);
	}

	real_time.request_handler = Some(GET_HANDLER.to_string());
	real_time.params.insert(IDS_PARAM.to_string(), ids.to_vec());

	real_time
}

/// Flags the response when the backend stopped early, usually on its time budget.
pub fn decode_partial_results(response: &ProviderResponse, properties: &mut ResponseProperties) {
	if response.header.get(PARTIAL_RESULTS_HEADER).and_then(Value::as_bool) != Some(true) {
		return;
	}

	properties.insert(PARTIAL_RESULTS_KEY, ResponseValue::Flag(true));

	let query = response
		.header
		.get(PARAMS_HEADER)
		.and_then(|params| params.get("q"))
		.map(|q| match q {
			Value::String(text) => text.clone(),
			other => other.to_string(),
		})
		.unwrap_or_else(|| "unknown".to_string());

	tracing::debug!(
		num_found = response.num_found(),
		query = query.as_str(),
		query_time_ms = response.query_time_ms,
		"Found partial results."
	);
}

impl QuarryService {
	pub async fn query(&self, request: &QueryRequest) -> Result<SourceResponse> {
		compile::validate_paging(request)?;

		let mut properties = ResponseProperties::new();

		// Suggestion requests never run the primary query.
		if let Some(suggestion) = SuggestionRequest::from_properties(&request.properties) {
			let response = self.execute(&suggestion.to_provider_query()).await?;

			suggest::decode_suggestions(&response, &mut properties);
			decode_partial_results(&response, &mut properties);

			return self.assemble(&response, properties);
		}

		let compiled = self.compile(request).await?;
		let real_time_get =
			request.properties.get_bool(DO_REALTIME_GET).unwrap_or(false) || compiled.real_time_get;
		let response = if real_time_get {
			tracing::debug!(ids = compiled.ids.len(), "Performing real time query.");

			self.execute(&real_time_query(&compiled.query, &compiled.ids)).await?
		} else {
			let mut query = compiled.query;
			let faceted =
				facet::apply_facets(&mut query, &request.properties, self.schema.as_ref());
			let spellcheck = request.properties.get_bool(SPELLCHECK_KEY).unwrap_or(false);
			let response = self.execute_with_spellcheck(query, spellcheck, &mut properties).await?;

			if faceted {
				facet::decode_facets(&response, self.schema.as_ref(), &mut properties);
			}

			response
		};

		suggest::decode_suggestions(&response, &mut properties);
		decode_partial_results(&response, &mut properties);

		self.assemble(&response, properties)
	}

	/// Runs a raw backend query string and returns the matching metacards.
	pub async fn query_raw(&self, query_string: &str) -> Result<Vec<Metacard>> {
		let response = self.execute(&ProviderQuery::new(query_string)).await?;

		match response.results.as_ref() {
			Some(results) => results::create_metacards(self.schema.as_ref(), &results.docs),
			None => Ok(Vec::new()),
		}
	}

	pub(crate) async fn execute(&self, query: &ProviderQuery) -> Result<ProviderResponse> {
		self.backend.query(query).await.map_err(Error::unsupported)
	}

	fn assemble(
		&self,
		response: &ProviderResponse,
		properties: ResponseProperties,
	) -> Result<SourceResponse> {
		let Some(documents) = response.results.as_ref() else {
			return Ok(SourceResponse { properties, ..SourceResponse::empty() });
		};
		let results = results::create_hits(self.schema.as_ref(), &documents.docs)?;

		Ok(SourceResponse { results, total_hits: documents.num_found, properties })
	}
}
