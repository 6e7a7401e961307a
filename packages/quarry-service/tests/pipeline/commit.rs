use std::sync::Arc;

use serde_json::Value;

use quarry_domain::{Attribute, Metacard, MetacardType, metacard};
use quarry_service::{CommitOptions, Error};
use quarry_testkit::{BackendCall, METACARD_TYPE_FIELD, RESOURCE_TYPE, ScriptedBackend};

fn resource(id: &str) -> Metacard {
	Metacard::new(quarry_testkit::resource_type())
		.with_attribute(Attribute::single(metacard::ID, id))
		.with_attribute(Attribute::single(metacard::TITLE, "Harbor survey"))
}

fn written_commit(call: &BackendCall) -> (usize, Option<u32>, Option<CommitOptions>) {
	match call {
		BackendCall::Add { docs, commit_within_ms } => (docs.len(), *commit_within_ms, None),
		BackendCall::AddAndCommit { docs, options } => (docs.len(), None, Some(*options)),
		other => panic!("Unexpected backend call: {other:?}."),
	}
}

#[tokio::test]
async fn batched_writes_leave_commit_to_the_backend() {
	let backend = Arc::new(ScriptedBackend::new());
	let service = super::service(&backend);
	let docs = service.add(&[resource("a"), resource("b")], false).await.expect("Add failed.");
	let calls = backend.calls();

	assert_eq!(docs.len(), 2);
	assert_eq!(docs[0].first("id_txt"), Some(&Value::from("a")));
	assert_eq!(docs[0].first(METACARD_TYPE_FIELD), Some(&Value::from(RESOURCE_TYPE)));
	assert_eq!(calls.len(), 1);
	assert_eq!(written_commit(&calls[0]), (2, None, None));
}

#[tokio::test]
async fn near_real_time_types_commit_within_the_bound() {
	let backend = Arc::new(ScriptedBackend::new());
	let mut cfg = quarry_testkit::config();

	cfg.commit.nrt_metacard_types = vec![RESOURCE_TYPE.to_string()];
	cfg.commit.nrt_commit_within_ms = 750;

	let service = super::service_with(cfg, &backend, quarry_testkit::schema());

	service.add(&[resource("a")], false).await.expect("Add failed.");

	assert_eq!(written_commit(&backend.calls()[0]), (1, Some(750), None));
}

#[tokio::test]
async fn forced_commit_overrides_near_real_time() {
	let backend = Arc::new(ScriptedBackend::new());
	let mut cfg = quarry_testkit::config();

	cfg.commit.nrt_metacard_types = vec![RESOURCE_TYPE.to_string()];

	let service = super::service_with(cfg, &backend, quarry_testkit::schema());

	service.add(&[resource("a")], true).await.expect("Add failed.");

	assert_eq!(written_commit(&backend.calls()[0]), (1, None, Some(CommitOptions::soft())));
}

#[tokio::test]
async fn empty_batches_do_not_reach_the_backend() {
	let backend = Arc::new(ScriptedBackend::new());
	let service = super::service(&backend);
	let docs = service.add(&[], true).await.expect("Add failed.");

	assert!(docs.is_empty());
	assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn unconvertible_metacards_are_creation_failures() {
	let backend = Arc::new(ScriptedBackend::new());
	let service = super::service(&backend);
	let stray = Metacard::new(MetacardType::new("stray", Vec::new()))
		.with_attribute(Attribute::single("mystery", 1));
	let err = service.add(&[stray], false).await.expect_err("Expected creation failure.");

	assert!(matches!(err, Error::MetacardCreation { .. }));
	assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn failed_writes_are_backend_errors() {
	let backend = Arc::new(ScriptedBackend::new());
	let service = super::service(&backend);

	backend.fail_writes();

	let err = service.add(&[resource("a")], false).await.expect_err("Expected write failure.");

	assert!(matches!(err, Error::Backend { .. }));
}
