//! Turns a catalog query request into a backend query: filter, paging, sort and time budget.

use crate::{Error, QuarryService, Result, error::ROW_COUNT_MESSAGE, provider::ProviderQuery, sort};
use quarry_domain::QueryRequest;

/// A backend query ready for execution, plus what compilation learned about the request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
	pub query: ProviderQuery,
	pub ids: Vec<String>,
	/// The filter is a pure identifier lookup.
	pub real_time_get: bool,
	/// Sort key of the last requested sort property.
	pub sort_key: String,
}

pub(crate) fn validate_paging(request: &QueryRequest) -> Result<()> {
	if request.query.start_index < 1 {
		return Err(Error::InvalidRequest {
			message: format!(
				"Start index must be greater than 0, got {}.",
				request.query.start_index
			),
		});
	}

	Ok(())
}

/// Zero in either place means no limit from that side.
pub(crate) fn time_budget(configured_ms: u32, requested_ms: Option<u64>) -> Option<u32> {
	let configured = (configured_ms > 0).then_some(configured_ms);
	let requested = requested_ms
		.filter(|ms| *ms > 0)
		.map(|ms| u32::try_from(ms).unwrap_or(u32::MAX).min(i32::MAX as u32));

	match (configured, requested) {
		(Some(configured), Some(requested)) => Some(configured.min(requested)),
		(configured, requested) => configured.or(requested),
	}
}

impl QuarryService {
	pub async fn compile(&self, request: &QueryRequest) -> Result<CompiledQuery> {
		validate_paging(request)?;

		let sort_bys = request.sort_bys();
		let adapted = self.filter_adapter.adapt(&request.query.filter, &sort_bys)?;
		let mut query = adapted.query;

		tracing::trace!(
			query = query.query.as_deref().unwrap_or_default(),
			filter_queries = ?query.filter_queries,
			"Prepared query."
		);

		// Backend offsets are zero-based.
		query.start = Some((request.query.start_index - 1) as u64);

		let paging_mode = self.cfg.search.paging_mode();

		query.rows = if paging_mode.wants_all_records(request.query.page_size) {
			Some(self.count_rows(&query).await?)
		} else {
			Some(u32::try_from(request.query.page_size).map_err(|err| {
				Error::InvalidRequest { message: format!("Page size is out of range: {err}.") }
			})?)
		};

		let sort_key =
			sort::apply_sort(&mut query, &sort_bys, self.schema.as_ref(), adapted.distance_point);

		query.time_allowed_ms =
			time_budget(self.cfg.search.time_allowed_ms, request.query.timeout_ms);

		tracing::trace!(
			start = query.start,
			rows = query.rows,
			sorts = ?query.sorts,
			sort_key = sort_key.as_str(),
			"Compiled query."
		);

		Ok(CompiledQuery {
			query,
			ids: adapted.ids,
			real_time_get: adapted.real_time_get,
			sort_key,
		})
	}

	/// Issues a zero-row probe and returns the total hit count as a row count.
	async fn count_rows(&self, query: &ProviderQuery) -> Result<u32> {
		let mut probe = query.clone();

		probe.rows = Some(0);

		let response = self
			.backend
			.query(&probe)
			.await
			.map_err(|err| Error::unsupported_with(ROW_COUNT_MESSAGE, err))?;
		let num_found = response
			.results
			.as_ref()
			.map(|results| results.num_found)
			.ok_or_else(|| {
				Error::unsupported_with(ROW_COUNT_MESSAGE, "Probe returned no results.")
			})?;

		u32::try_from(num_found).map_err(|err| Error::unsupported_with(ROW_COUNT_MESSAGE, err))
	}
}
