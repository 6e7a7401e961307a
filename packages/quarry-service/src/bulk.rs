//! Identifier lookups and deletes chunked to backend limits, plus content-type discovery.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::{
	Error, QuarryService, Result,
	provider::{PivotField, ProviderQuery},
	results,
	schema::FieldOptions,
};
use quarry_domain::{AttributeFormat, ContentType, Metacard, metacard};

/// `field:"a" OR field:"b" ...` over `ids`.
pub fn identifier_query(field: &str, ids: &[String]) -> String {
	ids.iter().map(|id| format!("{field}:\"{id}\"")).collect::<Vec<_>>().join(" OR ")
}

impl QuarryService {
	/// Fetches metacards by identifier, one backend lookup per batch, in request order.
	/// Repeated identifiers are fetched once.
	pub async fn get_ids(&self, ids: &[String]) -> Result<Vec<Metacard>> {
		let ids = distinct_ids(ids);
		let mut docs = Vec::with_capacity(ids.len());

		for batch in ids.chunks(self.cfg.search.get_by_id_limit) {
			let page = self.backend.get_by_id(batch).await.map_err(Error::unsupported)?;

			docs.extend(page.docs);
		}

		results::create_metacards(self.schema.as_ref(), &docs)
	}

	/// Distinct content types present in the catalog. Backend failures yield an empty set.
	pub async fn content_types(&self) -> BTreeSet<ContentType> {
		let mut content_types = BTreeSet::new();
		let options = FieldOptions::new();
		let name_field =
			self.schema.field(metacard::CONTENT_TYPE, AttributeFormat::String, true, &options);
		let version_field = self.schema.field(
			metacard::CONTENT_TYPE_VERSION,
			AttributeFormat::String,
			true,
			&options,
		);
		// A missing field means no metacard in the catalog has ever carried it.
		let (Some(name_field), Some(version_field)) = (name_field, version_field) else {
			return content_types;
		};
		let mut query = ProviderQuery::new(format!("{name_field}:[* TO *]"));
		let facet = query.facet_mut();

		facet.fields.push(name_field.clone());
		facet.pivot_fields.push(format!("{name_field},{version_field}"));

		let response = match self.backend.query(&query).await {
			Ok(response) => response,
			Err(err) => {
				tracing::info!(error = %err, "Backend failed while listing content types.");

				return content_types;
			},
		};

		for (_, pivots) in &response.facet_pivot {
			if pivots.is_empty() {
				tracing::debug!(
					"No content type versions found associated with any available content types."
				);

				if let Some(names) = response.facet_fields.first() {
					content_types
						.extend(names.values.iter().map(|name| ContentType::new(&name.name, None)));
				}

				continue;
			}

			for pivot in pivots {
				collect_pivot(pivot, &mut content_types);
			}
		}

		content_types
	}

	/// Deletes by primary key directly, or by OR'd identifier queries on any other field.
	pub async fn delete_by_ids(
		&self,
		field: &str,
		ids: &[String],
		force_commit: bool,
	) -> Result<()> {
		if ids.is_empty() {
			return Ok(());
		}

		if field == metacard::ID {
			self.backend.delete_by_id(ids).await.map_err(Error::backend)?;
		} else {
			for chunk in ids.chunks(self.cfg.search.max_boolean_clauses) {
				let query = identifier_query(field, chunk);

				self.backend.delete_by_query(&query).await.map_err(Error::backend)?;
			}
		}

		if force_commit {
			self.backend.commit().await.map_err(Error::backend)?;
		}

		Ok(())
	}

	pub async fn delete_by_query(&self, query: &str) -> Result<()> {
		self.backend.delete_by_query(query).await.map_err(Error::backend)
	}
}

fn distinct_ids(ids: &[String]) -> Vec<String> {
	let mut seen = BTreeSet::new();

	ids.iter().filter(|id| seen.insert(id.as_str())).cloned().collect()
}

fn collect_pivot(pivot: &PivotField, content_types: &mut BTreeSet<ContentType>) {
	let name = pivot_value(&pivot.value);

	if pivot.pivot.is_empty() {
		tracing::debug!(
			content_type = name.as_str(),
			"Content type has no associated content type version."
		);

		content_types.insert(ContentType::new(name, None));

		return;
	}

	for version in &pivot.pivot {
		content_types.insert(ContentType::new(name.clone(), Some(pivot_value(&version.value))));
	}
}

fn pivot_value(value: &Value) -> String {
	match value {
		Value::String(text) => text.clone(),
		other => other.to_string(),
	}
}
