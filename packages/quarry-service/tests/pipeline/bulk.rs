use std::{collections::BTreeSet, sync::Arc};

use serde_json::Value;

use quarry_domain::{AttributeFormat, ContentType, metacard};
use quarry_service::{
	Error,
	provider::{FacetCount, FacetField, PivotField, ProviderResponse},
};
use quarry_testkit::{BackendCall, DynamicSchema, ScriptedBackend};

fn content_type_schema() -> DynamicSchema {
	quarry_testkit::schema()
		.with_attribute(metacard::CONTENT_TYPE, AttributeFormat::String)
		.with_attribute(metacard::CONTENT_TYPE_VERSION, AttributeFormat::String)
}

fn pivot(value: &str, versions: &[&str]) -> PivotField {
	PivotField {
		field: "metadata-content-type_txt".to_string(),
		value: Value::from(value),
		count: 1,
		pivot: versions
			.iter()
			.map(|version| PivotField {
				field: "metadata-content-type-version_txt".to_string(),
				value: Value::from(*version),
				count: 1,
				pivot: Vec::new(),
			})
			.collect(),
	}
}

fn content_type(name: &str, version: Option<&str>) -> ContentType {
	ContentType::new(name, version.map(str::to_string))
}

#[tokio::test]
async fn non_primary_deletes_are_chunked_by_clause_limit() {
	let backend = Arc::new(ScriptedBackend::new());
	let mut cfg = quarry_testkit::config();

	cfg.search.max_boolean_clauses = 100;

	let service = super::service_with(cfg, &backend, quarry_testkit::schema());

	service
		.delete_by_ids("tags", &quarry_testkit::ids(250), false)
		.await
		.expect("Delete failed.");

	let clause_counts: Vec<_> = backend
		.calls()
		.into_iter()
		.map(|call| match call {
			BackendCall::DeleteByQuery(query) => query.split(" OR ").count(),
			other => panic!("Unexpected backend call: {other:?}."),
		})
		.collect();

	assert_eq!(clause_counts, vec![100, 100, 50]);
}

#[tokio::test]
async fn primary_key_deletes_go_direct_and_commit_on_request() {
	let backend = Arc::new(ScriptedBackend::new());
	let service = super::service(&backend);
	let ids = quarry_testkit::ids(3);

	service.delete_by_ids(metacard::ID, &ids, true).await.expect("Delete failed.");

	assert_eq!(backend.calls(), vec![BackendCall::DeleteById(ids), BackendCall::Commit]);
}

#[tokio::test]
async fn deleting_nothing_is_a_no_op() {
	let backend = Arc::new(ScriptedBackend::new());
	let service = super::service(&backend);

	service.delete_by_ids("tags", &[], true).await.expect("Delete failed.");

	assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn failed_deletes_are_backend_errors() {
	let backend = Arc::new(ScriptedBackend::new());
	let service = super::service(&backend);

	backend.fail_writes();

	let err = service
		.delete_by_query("tags_txt:\"a\"")
		.await
		.expect_err("Expected write failure.");

	assert!(matches!(err, Error::Backend { .. }));
}

#[tokio::test]
async fn id_lookups_are_batched_in_order() {
	let backend = Arc::new(ScriptedBackend::new());
	let service = super::service(&backend);
	let ids = quarry_testkit::ids(250);

	for (id, doc) in ids.iter().zip(quarry_testkit::documents(250)) {
		backend.store(id, doc);
	}

	let metacards = service.get_ids(&ids).await.expect("Lookup failed.");
	let batch_sizes: Vec<_> = backend
		.calls()
		.into_iter()
		.map(|call| match call {
			BackendCall::GetById(batch) => batch.len(),
			other => panic!("Unexpected backend call: {other:?}."),
		})
		.collect();
	let returned: Vec<_> = metacards.iter().filter_map(|metacard| metacard.id()).collect();

	assert_eq!(batch_sizes, vec![100, 100, 50]);
	assert_eq!(returned, ids.iter().map(String::as_str).collect::<Vec<_>>());
}

#[tokio::test]
async fn repeated_ids_are_fetched_once() {
	let backend = Arc::new(ScriptedBackend::new());
	let service = super::service(&backend);

	backend.store("id-0", quarry_testkit::document("id-0", "Title 0"));

	let ids = vec!["id-0".to_string(), "id-0".to_string()];
	let metacards = service.get_ids(&ids).await.expect("Lookup failed.");

	assert_eq!(metacards.len(), 1);
	assert_eq!(backend.calls(), vec![BackendCall::GetById(vec!["id-0".to_string()])]);
}

#[tokio::test]
async fn failed_id_lookup_aborts_the_whole_fetch() {
	let backend = Arc::new(ScriptedBackend::new());
	let service = super::service(&backend);

	backend.fail_get_by_id();

	let err = service.get_ids(&quarry_testkit::ids(5)).await.expect_err("Expected failure.");

	assert!(matches!(err, Error::UnsupportedQuery { .. }));
}

#[tokio::test]
async fn content_types_are_read_from_the_pivot_tree() {
	let backend = Arc::new(ScriptedBackend::new());
	let service = super::service_with(quarry_testkit::config(), &backend, content_type_schema());

	backend.respond(ProviderResponse {
		facet_pivot: vec![(
			"metadata-content-type_txt,metadata-content-type-version_txt".to_string(),
			vec![pivot("A", &["1", "2"]), pivot("B", &[]), pivot("A", &["1"])],
		)],
		..ProviderResponse::default()
	});

	let content_types = service.content_types().await;
	let queries = backend.queries();
	let facet = queries[0].facet.as_ref().expect("Expected facet parameters.");

	assert_eq!(
		content_types,
		BTreeSet::from([
			content_type("A", Some("1")),
			content_type("A", Some("2")),
			content_type("B", None),
		])
	);
	assert_eq!(queries[0].query.as_deref(), Some("metadata-content-type_txt:[* TO *]"));
	assert_eq!(facet.fields, vec!["metadata-content-type_txt".to_string()]);
	assert_eq!(
		facet.pivot_fields,
		vec!["metadata-content-type_txt,metadata-content-type-version_txt".to_string()]
	);
}

#[tokio::test]
async fn content_types_without_versions_fall_back_to_facet_values() {
	let backend = Arc::new(ScriptedBackend::new());
	let service = super::service_with(quarry_testkit::config(), &backend, content_type_schema());

	backend.respond(ProviderResponse {
		facet_fields: vec![FacetField {
			name: "metadata-content-type_txt".to_string(),
			values: vec![
				FacetCount { name: "A".to_string(), count: 2 },
				FacetCount { name: "B".to_string(), count: 1 },
			],
		}],
		facet_pivot: vec![("pivot".to_string(), Vec::new())],
		..ProviderResponse::default()
	});

	let content_types = service.content_types().await;

	assert_eq!(content_types, BTreeSet::from([content_type("A", None), content_type("B", None)]));
}

#[tokio::test]
async fn content_type_discovery_degrades_quietly() {
	let backend = Arc::new(ScriptedBackend::new());
	let unresolvable = super::service(&backend);

	assert!(unresolvable.content_types().await.is_empty());
	assert!(backend.calls().is_empty());

	let service = super::service_with(quarry_testkit::config(), &backend, content_type_schema());

	backend.fail("Backend unavailable.");

	assert!(service.content_types().await.is_empty());
	assert_eq!(backend.queries().len(), 1);
}
