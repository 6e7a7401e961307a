pub mod bulk;
pub mod commit;
pub mod compile;
pub mod error;
pub mod facet;
pub mod filter;
pub mod provider;
pub mod query;
pub mod results;
pub mod schema;
pub mod sort;
pub mod spellcheck;
pub mod suggest;

use std::{future::Future, pin::Pin, sync::Arc};

pub use commit::CommitStrategy;
pub use compile::CompiledQuery;
pub use error::{Error, ROW_COUNT_MESSAGE, Result, UNSUPPORTED_QUERY_MESSAGE};
pub use filter::{AdaptedFilter, FilterAdapter, FilterDelegate, StandardFilterAdapter};
pub use provider::{Document, DocumentList, InputDocument, ProviderQuery, ProviderResponse};
pub use schema::{FieldOptions, SchemaResolver};
pub use suggest::SuggestionRequest;

use quarry_config::Config;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Commit flags for writes that must be searchable before the call returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitOptions {
	pub wait_flush: bool,
	pub wait_searcher: bool,
	pub soft: bool,
}
impl CommitOptions {
	pub fn soft() -> Self {
		Self { wait_flush: true, wait_searcher: true, soft: true }
	}
}

/// Execution seam for the faceted search engine. Calls are awaited one at a time per request.
pub trait SearchBackend
where
	Self: Send + Sync,
{
	/// Queries travel as POST bodies so long filter strings never hit URL length limits.
	fn query<'a>(
		&'a self,
		query: &'a ProviderQuery,
	) -> BoxFuture<'a, color_eyre::Result<ProviderResponse>>;

	fn get_by_id<'a>(
		&'a self,
		ids: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<DocumentList>>;

	fn add<'a>(
		&'a self,
		docs: &'a [InputDocument],
		commit_within_ms: Option<u32>,
	) -> BoxFuture<'a, color_eyre::Result<()>>;

	fn add_and_commit<'a>(
		&'a self,
		docs: &'a [InputDocument],
		options: CommitOptions,
	) -> BoxFuture<'a, color_eyre::Result<()>>;

	fn delete_by_id<'a>(&'a self, ids: &'a [String]) -> BoxFuture<'a, color_eyre::Result<()>>;

	fn delete_by_query<'a>(&'a self, query: &'a str) -> BoxFuture<'a, color_eyre::Result<()>>;

	fn commit(&self) -> BoxFuture<'_, color_eyre::Result<()>>;
}

pub struct QuarryService {
	pub cfg: Config,
	pub backend: Arc<dyn SearchBackend>,
	pub schema: Arc<dyn SchemaResolver>,
	pub filter_adapter: Arc<dyn FilterAdapter>,
}
impl QuarryService {
	pub fn new(
		cfg: Config,
		backend: Arc<dyn SearchBackend>,
		schema: Arc<dyn SchemaResolver>,
	) -> Self {
		let filter_adapter = Arc::new(StandardFilterAdapter::new(schema.clone()));

		Self { cfg, backend, schema, filter_adapter }
	}

	pub fn with_filter_adapter(mut self, filter_adapter: Arc<dyn FilterAdapter>) -> Self {
		self.filter_adapter = filter_adapter;

		self
	}
}
