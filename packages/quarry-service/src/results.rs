use serde_json::Value;

use crate::{
	Result,
	provider::{DISTANCE_SORT_FIELD, Document, RELEVANCE_SORT_FIELD},
	schema::SchemaResolver,
};
use quarry_domain::{Attribute, Hit, Metacard};

const METERS_PER_KILOMETER: f64 = 1_000.0;

/// Builds a metacard from every public field of `doc`.
pub fn create_metacard(schema: &dyn SchemaResolver, doc: &Document) -> Result<Metacard> {
	let mut metacard = Metacard::new(schema.metacard_type(doc)?);

	for (field, values) in &doc.fields {
		if schema.is_private_field(field) {
			continue;
		}

		metacard.set_attribute(Attribute::new(
			schema.resolve_field_name(field),
			schema.doc_values(field, values),
		));
	}

	Ok(metacard)
}

pub fn create_metacards(schema: &dyn SchemaResolver, docs: &[Document]) -> Result<Vec<Metacard>> {
	docs.iter().map(|doc| create_metacard(schema, doc)).collect()
}

/// Builds a hit, overlaying the relevance score and the distance (reported in kilometers).
pub fn create_hit(schema: &dyn SchemaResolver, doc: &Document) -> Result<Hit> {
	let mut hit = Hit::new(create_metacard(schema, doc)?);

	if let Some(score) = doc.first(RELEVANCE_SORT_FIELD) {
		hit.relevance_score = number(score);

		if hit.relevance_score.is_none() {
			tracing::warn!(score = %score, "Relevance score is not numeric. Ignoring it.");
		}
	}
	if let Some(distance) = doc.first(DISTANCE_SORT_FIELD) {
		tracing::debug!(distance = %distance, "Distance returned from backend.");

		match number(distance) {
			Some(kilometers) => hit.distance_in_meters = Some(kilometers * METERS_PER_KILOMETER),
			None => tracing::warn!(distance = %distance, "Distance is not numeric. Ignoring it."),
		}
	}

	Ok(hit)
}

pub fn create_hits(schema: &dyn SchemaResolver, docs: &[Document]) -> Result<Vec<Hit>> {
	docs.iter().map(|doc| create_hit(schema, doc)).collect()
}

fn number(value: &Value) -> Option<f64> {
	match value {
		Value::Number(number) => number.as_f64(),
		Value::String(text) => text.trim().parse().ok(),
		_ => None,
	}
}
