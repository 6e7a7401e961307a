use std::sync::Arc;

use serde_json::Value;

use quarry_domain::{FilterExpr, metacard};
use quarry_service::{Error, provider::Document};
use quarry_testkit::{METACARD_TYPE_FIELD, ScriptedBackend};

fn any_text() -> FilterExpr {
	FilterExpr::like(metacard::ANY_TEXT, "*")
}

#[tokio::test]
async fn private_fields_never_become_attributes() {
	let backend = Arc::new(ScriptedBackend::new());
	let service = super::service(&backend);
	let doc = quarry_testkit::document("a", "Harbor survey")
		.with_field("title_txt_sort", "harbor survey")
		.with_field("title_txt_tokenized", "harbor")
		.with_field("_version_", 17);

	backend.respond(super::found(vec![doc]));

	let response =
		service.query(&quarry_testkit::request(any_text())).await.expect("Query failed.");
	let metacard = &response.results[0].metacard;
	let names: Vec<_> = metacard.attributes.keys().map(String::as_str).collect();

	assert_eq!(names, vec![metacard::ID, metacard::TITLE]);
	assert_eq!(metacard.id(), Some("a"));
	assert_eq!(metacard.type_name(), quarry_testkit::RESOURCE_TYPE);
}

#[tokio::test]
async fn scores_and_distances_are_overlaid() {
	let backend = Arc::new(ScriptedBackend::new());
	let service = super::service(&backend);
	let scored = quarry_testkit::document("a", "Near")
		.with_field("score", 0.75)
		.with_field("_distance_", 1.5);
	let textual = quarry_testkit::document("b", "Far").with_field("_distance_", "2.5");
	let plain = quarry_testkit::document("c", "Plain");

	backend.respond(super::found(vec![scored, textual, plain]));

	let response =
		service.query(&quarry_testkit::request(any_text())).await.expect("Query failed.");
	let hits = &response.results;

	assert_eq!(hits[0].relevance_score, Some(0.75));
	assert_eq!(hits[0].distance_in_meters, Some(1_500.0));
	assert_eq!(hits[1].relevance_score, None);
	assert_eq!(hits[1].distance_in_meters, Some(2_500.0));
	assert_eq!(hits[2].distance_in_meters, None);
	assert!(hits[0].metacard.attribute("score").is_none());
}

#[tokio::test]
async fn unknown_metacard_types_fail_the_whole_page() {
	let backend = Arc::new(ScriptedBackend::new());
	let service = super::service(&backend);
	let stray = Document::new()
		.with_field("id_txt", "x")
		.with_field(METACARD_TYPE_FIELD, Value::from("unregistered"));

	backend.respond(super::found(vec![quarry_testkit::document("a", "Fine"), stray]));

	let err = service
		.query(&quarry_testkit::request(any_text()))
		.await
		.expect_err("Expected creation failure.");

	assert!(matches!(err, Error::MetacardCreation { .. }));
}

#[tokio::test]
async fn raw_queries_return_metacards() {
	let backend = Arc::new(ScriptedBackend::new());
	let service = super::service(&backend);

	backend.respond(super::found(quarry_testkit::documents(2)));

	let metacards = service.query_raw("title_txt:survey").await.expect("Raw query failed.");
	let queries = backend.queries();

	assert_eq!(queries[0].query.as_deref(), Some("title_txt:survey"));
	assert_eq!(metacards.len(), 2);
	assert_eq!(metacards[1].id(), Some("id-1"));

	backend.fail("Timed out.");

	let err = service.query_raw("title_txt:survey").await.expect_err("Expected failure.");

	assert!(matches!(err, Error::UnsupportedQuery { .. }));
	assert_eq!(err.to_string(), quarry_service::UNSUPPORTED_QUERY_MESSAGE);
}
