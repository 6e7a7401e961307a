use crate::{
	CommitOptions, Error, QuarryService, Result,
	provider::{Document, InputDocument},
};
use quarry_config::Config;
use quarry_domain::Metacard;

/// How a write batch becomes visible to searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitStrategy {
	/// Left to the backend's own autocommit schedule.
	Batched,
	/// Visible within the given milliseconds.
	Within(u32),
	/// Committed, flushed and visible before the write returns.
	Soft,
}

/// A forced commit wins over the near-real-time bound.
pub fn commit_strategy(cfg: &Config, metacards: &[Metacard], force_commit: bool) -> CommitStrategy {
	if force_commit {
		return CommitStrategy::Soft;
	}

	if metacards.iter().any(|metacard| cfg.commit.is_nrt_type(metacard.type_name())) {
		CommitStrategy::Within(cfg.commit.nrt_commit_within_ms)
	} else {
		CommitStrategy::Batched
	}
}

impl QuarryService {
	/// Converts and writes `metacards`, returning the documents sent to the backend.
	pub async fn add(
		&self,
		metacards: &[Metacard],
		force_commit: bool,
	) -> Result<Vec<InputDocument>> {
		if metacards.is_empty() {
			return Ok(Vec::new());
		}

		let mut docs = Vec::with_capacity(metacards.len());

		for metacard in metacards {
			let mut doc = Document::new();

			self.schema.add_fields(metacard, &mut doc)?;

			docs.push(doc);
		}

		let strategy = commit_strategy(&self.cfg, metacards, force_commit);

		tracing::debug!(documents = docs.len(), strategy = ?strategy, "Writing documents.");

		let written = match strategy {
			CommitStrategy::Batched => self.backend.add(&docs, None).await,
			CommitStrategy::Within(ms) => self.backend.add(&docs, Some(ms)).await,
			CommitStrategy::Soft => self.backend.add_and_commit(&docs, CommitOptions::soft()).await,
		};

		written.map_err(Error::backend)?;

		Ok(docs)
	}
}
