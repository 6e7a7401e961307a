//! Sort clause resolution for relevance, distance, temporal and attribute sorts.

use crate::{
	filter::point_param,
	provider::{
		ALL_FIELDS, DISTANCE_SORT_FIELD, DISTANCE_SORT_FUNCTION, Order, POINT_KEY,
		ProviderQuery, RELEVANCE_SORT_FIELD, SORT_FIELD_KEY,
	},
	schema::{self, FieldOptions, GEO_SUFFIX, SchemaResolver},
};
use quarry_domain::{
	AttributeFormat, Point, SortBy, SortOrder, metacard,
	request::{DISTANCE, RELEVANCE, TEMPORAL},
};

/// Applies `sort_bys` in order and returns the sort key of the last property, or an empty
/// string when nothing was requested.
pub fn apply_sort(
	query: &mut ProviderQuery,
	sort_bys: &[SortBy],
	schema: &dyn SchemaResolver,
	distance_point: Option<Point>,
) -> String {
	let mut sort_property = None;

	for sort_by in sort_bys {
		let order = order_of(sort_by.order);
		let property = sort_by.property.as_str();

		sort_property = Some(property);

		match property {
			RELEVANCE => {
				query.set_fields([ALL_FIELDS, RELEVANCE_SORT_FIELD]);
				query.add_sort(RELEVANCE_SORT_FIELD, order);
			},
			DISTANCE => {
				let field = format!("{}{GEO_SUFFIX}", metacard::GEOGRAPHY);

				add_distance_sort(query, &schema.sort_key(&field), order, distance_point);
			},
			TEMPORAL => {
				match schema.field(
					metacard::EFFECTIVE,
					AttributeFormat::Date,
					false,
					&FieldOptions::new(),
				) {
					Some(field) => query.add_sort(schema.sort_key(&field), order),
					None => tracing::debug!(
						property,
						"No effective date field is known. Temporal sort was not added."
					),
				}
			},
			_ => apply_attribute_sort(query, property, order, schema, distance_point),
		}
	}

	sort_property.map(|property| schema.sort_key(property)).unwrap_or_default()
}

fn apply_attribute_sort(
	query: &mut ProviderQuery,
	property: &str,
	order: Order,
	schema: &dyn SchemaResolver,
	distance_point: Option<Point>,
) {
	let fields = schema.anonymous_fields(property);

	if fields.is_empty() {
		tracing::debug!(
			property,
			"No schema field was found for sort property. No sort field was added."
		);

		return;
	}

	for field in fields {
		if field.ends_with(GEO_SUFFIX) {
			add_distance_sort(query, &schema.sort_key(&field), order, distance_point);
		} else if schema::is_sortable(&field) {
			query.add_sort(schema.sort_key(&field), order);
		}
	}
}

fn add_distance_sort(
	query: &mut ProviderQuery,
	sort_field: &str,
	order: Order,
	distance_point: Option<Point>,
) {
	let Some(point) = distance_point else {
		tracing::debug!(
			sort_field,
			"Distance sort requested without a distance predicate. Sort was not added."
		);

		return;
	};

	query.add_sort(DISTANCE_SORT_FUNCTION, order);
	query.set_fields([
		ALL_FIELDS.to_string(),
		format!("{DISTANCE_SORT_FIELD}:{DISTANCE_SORT_FUNCTION}"),
	]);
	query.add_param(SORT_FIELD_KEY, sort_field);
	query.add_param(POINT_KEY, point_param(point));
}

fn order_of(order: SortOrder) -> Order {
	match order {
		SortOrder::Ascending => Order::Asc,
		SortOrder::Descending => Order::Desc,
	}
}
