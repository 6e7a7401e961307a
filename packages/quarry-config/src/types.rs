use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
	#[serde(default)]
	pub search: Search,
	#[serde(default)]
	pub commit: Commit,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Search {
	/// Budget forwarded to the backend as its time-allowed cutoff. Zero disables it.
	#[serde(default)]
	pub time_allowed_ms: u32,
	/// When true, a page size below one (not only below zero) requests every matching record.
	#[serde(default)]
	pub zero_page_size_compatibility: bool,
	#[serde(default = "default_get_by_id_limit")]
	pub get_by_id_limit: usize,
	#[serde(default = "default_max_boolean_clauses")]
	pub max_boolean_clauses: usize,
}
impl Search {
	pub fn paging_mode(&self) -> PagingMode {
		if self.zero_page_size_compatibility { PagingMode::Legacy } else { PagingMode::Standard }
	}
}
impl Default for Search {
	fn default() -> Self {
		Self {
			time_allowed_ms: 0,
			zero_page_size_compatibility: false,
			get_by_id_limit: default_get_by_id_limit(),
			max_boolean_clauses: default_max_boolean_clauses(),
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Commit {
	/// Metacard type names whose writes become visible within `nrt_commit_within_ms`.
	#[serde(default)]
	pub nrt_metacard_types: Vec<String>,
	#[serde(default = "default_nrt_commit_within_ms")]
	pub nrt_commit_within_ms: u32,
}
impl Commit {
	pub fn is_nrt_type(&self, metacard_type: &str) -> bool {
		self.nrt_metacard_types.iter().any(|name| name == metacard_type)
	}
}
impl Default for Commit {
	fn default() -> Self {
		Self {
			nrt_metacard_types: Vec::new(),
			nrt_commit_within_ms: default_nrt_commit_within_ms(),
		}
	}
}

/// How a page size is interpreted when deciding whether a query asks for every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagingMode {
	/// Negative page sizes fetch everything; zero fetches no rows.
	Standard,
	/// Zero and negative page sizes both fetch everything.
	Legacy,
}
impl PagingMode {
	pub fn wants_all_records(self, page_size: i64) -> bool {
		match self {
			Self::Standard => page_size < 0,
			Self::Legacy => page_size < 1,
		}
	}
}

fn default_get_by_id_limit() -> usize {
	100
}

fn default_max_boolean_clauses() -> usize {
	1_024
}

fn default_nrt_commit_within_ms() -> u32 {
	1_000
}
