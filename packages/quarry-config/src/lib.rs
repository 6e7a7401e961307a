mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Commit, Config, PagingMode, Search};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.search.get_by_id_limit == 0 {
		return Err(invalid("search.get_by_id_limit", "must be greater than zero."));
	}
	if cfg.search.max_boolean_clauses == 0 {
		return Err(invalid("search.max_boolean_clauses", "must be greater than zero."));
	}
	if cfg.search.time_allowed_ms > i32::MAX as u32 {
		return Err(invalid("search.time_allowed_ms", "must fit in a signed 32-bit integer."));
	}
	if cfg.commit.nrt_commit_within_ms > i32::MAX as u32 {
		return Err(invalid("commit.nrt_commit_within_ms", "must fit in a signed 32-bit integer."));
	}

	Ok(())
}

fn invalid(key: &'static str, message: &str) -> Error {
	Error::Validation { key, message: message.to_string() }
}

fn normalize(cfg: &mut Config) {
	let types = std::mem::take(&mut cfg.commit.nrt_metacard_types);

	for name in types {
		let name = name.trim();

		if name.is_empty() || cfg.commit.nrt_metacard_types.iter().any(|known| known == name) {
			continue;
		}

		cfg.commit.nrt_metacard_types.push(name.to_string());
	}
}
