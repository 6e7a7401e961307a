use crate::{
	provider::{FacetField, ProviderQuery, ProviderResponse},
	schema::{FIRST_CHAR_OF_SUFFIX, SchemaResolver},
};
use quarry_domain::{
	FacetAttributeResult, Properties, ResponseProperties, ResponseValue,
	request::FACET_PROPERTIES_KEY, response::FACET_RESULTS_KEY,
};

/// Configures term faceting when the request carries facet properties. Returns whether the
/// query is faceted.
pub fn apply_facets(
	query: &mut ProviderQuery,
	properties: &Properties,
	schema: &dyn SchemaResolver,
) -> bool {
	let Some(facet) = properties.get_term_facet(FACET_PROPERTIES_KEY) else {
		return false;
	};

	tracing::trace!(attributes = ?facet.facet_attributes, "Enabling faceted query.");

	let params = query.facet_mut();

	for attribute in &facet.facet_attributes {
		let field = schema
			.anonymous_fields(attribute)
			.into_iter()
			.next()
			.unwrap_or_else(|| attribute.clone());

		// Only suffix-bearing fields are typed facet targets.
		if field.contains(FIRST_CHAR_OF_SUFFIX) {
			params.fields.push(field);
		} else {
			tracing::debug!(
				attribute = attribute.as_str(),
				"Facet attribute has no typed field. Skipping it."
			);
		}
	}

	params.sort = Some(facet.sort_key.as_str().to_string());
	params.limit = Some(facet.facet_limit);
	params.min_count = Some(facet.min_facet_count);

	true
}

/// Attaches per-attribute facet counts when the response carries at least one facet field.
pub fn decode_facets(
	response: &ProviderResponse,
	schema: &dyn SchemaResolver,
	properties: &mut ResponseProperties,
) {
	if response.facet_fields.is_empty() {
		return;
	}

	let results = response.facet_fields.iter().map(|field| convert(field, schema)).collect();

	properties.insert(FACET_RESULTS_KEY, ResponseValue::Facets(results));
}

fn convert(field: &FacetField, schema: &dyn SchemaResolver) -> FacetAttributeResult {
	let (values, counts) =
		field.values.iter().map(|count| (count.name.clone(), count.count)).unzip();

	FacetAttributeResult { attribute: schema.resolve_field_name(&field.name), values, counts }
}
