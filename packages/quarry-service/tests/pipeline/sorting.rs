use std::sync::Arc;

use quarry_domain::{
	FilterExpr, Point, PropertyValue, SortBy, SpatialOp, metacard,
	request::{ADDITIONAL_SORT_BYS, DISTANCE, RELEVANCE, TEMPORAL},
};
use quarry_service::provider::{
	DISTANCE_SORT_FUNCTION, Order, POINT_KEY, ProviderQuery, SORT_FIELD_KEY, SortClause,
};
use quarry_testkit::ScriptedBackend;

async fn compiled_query(filter: FilterExpr, sort_bys: Vec<SortBy>) -> ProviderQuery {
	let backend = Arc::new(ScriptedBackend::new());
	let service = super::service(&backend);
	let request = quarry_testkit::request(filter)
		.with_property(ADDITIONAL_SORT_BYS, PropertyValue::SortBys(sort_bys));

	service.query(&request).await.expect("Query failed.");

	backend.queries().remove(0)
}

fn near_origin() -> FilterExpr {
	FilterExpr::spatial(
		metacard::GEOGRAPHY,
		SpatialOp::PointRadius { point: Point::new(10.0, 20.0), radius_meters: 5_000.0 },
	)
}

fn clause(field: &str, order: Order) -> SortClause {
	SortClause { field: field.to_string(), order }
}

#[tokio::test]
async fn distance_sort_uses_the_filter_origin() {
	let query = compiled_query(near_origin(), vec![SortBy::ascending(DISTANCE)]).await;

	assert_eq!(query.sorts, vec![clause(DISTANCE_SORT_FUNCTION, Order::Asc)]);
	assert_eq!(query.fields, vec!["*".to_string(), "_distance_:geodist()".to_string()]);
	assert_eq!(query.param(SORT_FIELD_KEY), Some("location_geo"));
	assert_eq!(query.param(POINT_KEY), Some("10,20"));
	assert_eq!(query.query.as_deref(), Some("{!geofilt sfield=location_geo pt=10,20 d=5}"));
}

#[tokio::test]
async fn geometry_attribute_sort_orders_by_distance_from_the_filter_origin() {
	let query =
		compiled_query(near_origin(), vec![SortBy::ascending(metacard::GEOGRAPHY)]).await;

	assert_eq!(query.sorts, vec![clause(DISTANCE_SORT_FUNCTION, Order::Asc)]);
	assert_eq!(query.fields, vec!["*".to_string(), "_distance_:geodist()".to_string()]);
	assert_eq!(query.param(SORT_FIELD_KEY), Some("location_geo"));
	assert_eq!(query.param(POINT_KEY), Some("10,20"));
}

#[tokio::test]
async fn geometry_attribute_sort_without_a_distance_predicate_is_a_no_op() {
	let query = compiled_query(
		FilterExpr::like(metacard::ANY_TEXT, "*"),
		vec![SortBy::descending(metacard::GEOGRAPHY)],
	)
	.await;

	assert!(query.sorts.is_empty());
	assert_eq!(query.param(POINT_KEY), None);
}

#[tokio::test]
async fn distance_sort_without_a_distance_predicate_is_a_no_op() {
	let query = compiled_query(
		FilterExpr::like(metacard::ANY_TEXT, "*"),
		vec![SortBy::ascending(DISTANCE)],
	)
	.await;

	assert!(query.sorts.is_empty());
	assert!(query.fields.is_empty());
	assert_eq!(query.param(POINT_KEY), None);
}

#[tokio::test]
async fn relevance_sort_requests_the_score() {
	let query = compiled_query(
		FilterExpr::like(metacard::ANY_TEXT, "*"),
		vec![SortBy::descending(RELEVANCE)],
	)
	.await;

	assert_eq!(query.sorts, vec![clause("score", Order::Desc)]);
	assert_eq!(query.fields, vec!["*".to_string(), "score".to_string()]);
}

#[tokio::test]
async fn attribute_sorts_resolve_through_the_schema() {
	let query = compiled_query(
		FilterExpr::like(metacard::ANY_TEXT, "*"),
		vec![
			SortBy::ascending(metacard::TITLE),
			SortBy::ascending("thumbnail"),
			SortBy::descending("unknown"),
			SortBy::descending(TEMPORAL),
		],
	)
	.await;

	assert_eq!(
		query.sorts,
		vec![clause("title_txt_sort", Order::Asc), clause("effective_tdt", Order::Desc)]
	);
}

#[tokio::test]
async fn primary_sort_precedes_additional_sorts() {
	let backend = Arc::new(ScriptedBackend::new());
	let service = super::service(&backend);
	let mut request = quarry_testkit::request(FilterExpr::like(metacard::ANY_TEXT, "*"))
		.with_property(
			ADDITIONAL_SORT_BYS,
			PropertyValue::SortBys(vec![SortBy::ascending(metacard::TITLE)]),
		);

	request.query.sort_by = Some(SortBy::descending(TEMPORAL));

	service.query(&request).await.expect("Query failed.");

	let sorts = backend.queries().remove(0).sorts;

	assert_eq!(
		sorts,
		vec![clause("effective_tdt", Order::Desc), clause("title_txt_sort", Order::Asc)]
	);
}
