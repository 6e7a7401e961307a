//! Two-pass spellcheck: run the query, and when the backend offers collations, run the best one
//! and keep whichever pass found more documents.

use std::collections::BTreeSet;

use crate::{
	QuarryService, Result,
	provider::{Collation, ProviderQuery, ProviderResponse, SPELLCHECK_PARAM},
};
use quarry_domain::{
	ResponseProperties, ResponseValue,
	response::{DID_YOU_MEAN_KEY, SHOWING_RESULTS_FOR_KEY},
};

enum Phase {
	Compiled(ProviderQuery),
	FirstPassDone { query: ProviderQuery, response: ProviderResponse },
	Requerying { query: ProviderQuery, first: ProviderResponse, collation: Collation },
	Finalized(ProviderResponse),
}

/// The collation with the most hits. Ties keep the earliest.
pub fn best_collation(response: &ProviderResponse) -> Option<&Collation> {
	let collations = &response.spellcheck.as_ref()?.collations;
	let mut best: Option<&Collation> = None;

	for collation in collations {
		if best.is_none_or(|current| collation.hits > current.hits) {
			best = Some(collation);
		}
	}

	best
}

impl QuarryService {
	/// Executes `query`, re-querying with the best collation when `enabled`. Returns the
	/// response that should be treated as authoritative.
	pub(crate) async fn execute_with_spellcheck(
		&self,
		query: ProviderQuery,
		enabled: bool,
		properties: &mut ResponseProperties,
	) -> Result<ProviderResponse> {
		let mut phase = Phase::Compiled(query);

		loop {
			phase = match phase {
				Phase::Compiled(mut query) => {
					if enabled {
						query.set_param(SPELLCHECK_PARAM, "true");
					}

					let response = self.execute(&query).await?;

					Phase::FirstPassDone { query, response }
				},
				Phase::FirstPassDone { query, response } => {
					let collation = if enabled { best_collation(&response).cloned() } else { None };

					match collation {
						Some(collation) =>
							Phase::Requerying { query, first: response, collation },
						None => Phase::Finalized(response),
					}
				},
				Phase::Requerying { mut query, first, collation } => {
					query.query = Some(collation.query_string.clone());
					query.set_param(SPELLCHECK_PARAM, "false");

					let second = self.execute(&query).await?;

					if second.document_count() > first.document_count() {
						tracing::debug!(
							collation = collation.query_string.as_str(),
							first_pass = first.document_count(),
							second_pass = second.document_count(),
							"Adopting spellcheck collation results."
						);

						record_corrections(&collation, properties);

						Phase::Finalized(second)
					} else {
						Phase::Finalized(first)
					}
				},
				Phase::Finalized(response) => return Ok(response),
			};
		}
	}
}

fn record_corrections(collation: &Collation, properties: &mut ResponseProperties) {
	let originals: BTreeSet<_> =
		collation.corrections.iter().map(|correction| correction.original.clone()).collect();
	let corrections: BTreeSet<_> =
		collation.corrections.iter().map(|correction| correction.correction.clone()).collect();

	properties.insert(DID_YOU_MEAN_KEY, ResponseValue::Terms(originals.into_iter().collect()));
	properties
		.insert(SHOWING_RESULTS_FOR_KEY, ResponseValue::Terms(corrections.into_iter().collect()));
}
