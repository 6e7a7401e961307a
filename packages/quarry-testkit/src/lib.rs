//! In-memory collaborators for exercising the service without a search engine.

use std::{
	collections::{BTreeMap, VecDeque},
	sync::{
		Mutex,
		atomic::{AtomicBool, Ordering},
	},
};

use color_eyre::eyre;
use serde_json::Value;

use quarry_config::Config;
use quarry_domain::{
	AttributeDescriptor, AttributeFormat, FilterExpr, Metacard, MetacardType, Query, QueryRequest,
	metacard,
};
use quarry_service::{
	BoxFuture, CommitOptions, Error, FieldOptions, Result, SchemaResolver, SearchBackend,
	provider::{
		DISTANCE_SORT_FIELD, Document, DocumentList, InputDocument, ProviderQuery,
		ProviderResponse, RELEVANCE_SORT_FIELD,
	},
	schema::{self, FIRST_CHAR_OF_SUFFIX, TEXT_SUFFIX},
};

/// Private document field naming the metacard type.
pub const METACARD_TYPE_FIELD: &str = "metacard_type_name";
pub const SORT_SUFFIX: &str = "_sort";
pub const RESOURCE_TYPE: &str = "resource";

const KNOWN_SUFFIXES: [&str; 12] = [
	schema::TEXT_SUFFIX,
	schema::XML_SUFFIX,
	schema::DATE_SUFFIX,
	schema::GEO_SUFFIX,
	schema::BINARY_SUFFIX,
	schema::OBJECT_SUFFIX,
	schema::BOOLEAN_SUFFIX,
	schema::INTEGER_SUFFIX,
	schema::LONG_SUFFIX,
	schema::FLOAT_SUFFIX,
	schema::DOUBLE_SUFFIX,
	schema::SHORT_SUFFIX,
];

#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
	Query(ProviderQuery),
	GetById(Vec<String>),
	Add { docs: Vec<InputDocument>, commit_within_ms: Option<u32> },
	AddAndCommit { docs: Vec<InputDocument>, options: CommitOptions },
	DeleteById(Vec<String>),
	DeleteByQuery(String),
	Commit,
}

enum Scripted {
	Respond(ProviderResponse),
	Fail(String),
}

/// Records every call and answers queries from a queue. An empty queue answers with an empty
/// result list.
#[derive(Default)]
pub struct ScriptedBackend {
	calls: Mutex<Vec<BackendCall>>,
	responses: Mutex<VecDeque<Scripted>>,
	documents: Mutex<BTreeMap<String, Document>>,
	fail_get_by_id: AtomicBool,
	fail_writes: AtomicBool,
}
impl ScriptedBackend {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn respond(&self, response: ProviderResponse) {
		lock(&self.responses).push_back(Scripted::Respond(response));
	}

	pub fn fail(&self, message: &str) {
		lock(&self.responses).push_back(Scripted::Fail(message.to_string()));
	}

	/// Makes `doc` available to identifier lookups.
	pub fn store(&self, id: &str, doc: Document) {
		lock(&self.documents).insert(id.to_string(), doc);
	}

	pub fn fail_get_by_id(&self) {
		self.fail_get_by_id.store(true, Ordering::SeqCst);
	}

	pub fn fail_writes(&self) {
		self.fail_writes.store(true, Ordering::SeqCst);
	}

	pub fn calls(&self) -> Vec<BackendCall> {
		lock(&self.calls).clone()
	}

	pub fn queries(&self) -> Vec<ProviderQuery> {
		self.calls()
			.into_iter()
			.filter_map(|call| match call {
				BackendCall::Query(query) => Some(query),
				_ => None,
			})
			.collect()
	}

	fn record(&self, call: BackendCall) {
		lock(&self.calls).push(call);
	}

	fn write(&self, call: BackendCall) -> color_eyre::Result<()> {
		self.record(call);

		if self.fail_writes.load(Ordering::SeqCst) {
			return Err(eyre::eyre!("Scripted write failure."));
		}

		Ok(())
	}
}
impl SearchBackend for ScriptedBackend {
	fn query<'a>(
		&'a self,
		query: &'a ProviderQuery,
	) -> BoxFuture<'a, color_eyre::Result<ProviderResponse>> {
		Box::pin(async move {
			self.record(BackendCall::Query(query.clone()));

			match lock(&self.responses).pop_front() {
				Some(Scripted::Respond(response)) => Ok(response),
				Some(Scripted::Fail(message)) => Err(eyre::eyre!(message)),
				None => Ok(ProviderResponse::with_documents(Vec::new(), 0)),
			}
		})
	}

	fn get_by_id<'a>(
		&'a self,
		ids: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<DocumentList>> {
		Box::pin(async move {
			self.record(BackendCall::GetById(ids.to_vec()));

			if self.fail_get_by_id.load(Ordering::SeqCst) {
				return Err(eyre::eyre!("Scripted lookup failure."));
			}

			let documents = lock(&self.documents);
			let docs: Vec<_> = ids.iter().filter_map(|id| documents.get(id).cloned()).collect();
			let num_found = docs.len() as u64;

			Ok(DocumentList { docs, num_found })
		})
	}

	fn add<'a>(
		&'a self,
		docs: &'a [InputDocument],
		commit_within_ms: Option<u32>,
	) -> BoxFuture<'a, color_eyre::Result<()>> {
		Box::pin(
			async move { self.write(BackendCall::Add { docs: docs.to_vec(), commit_within_ms }) },
		)
	}

	fn add_and_commit<'a>(
		&'a self,
		docs: &'a [InputDocument],
		options: CommitOptions,
	) -> BoxFuture<'a, color_eyre::Result<()>> {
		Box::pin(async move {
			self.write(BackendCall::AddAndCommit { docs: docs.to_vec(), options })
		})
	}

	fn delete_by_id<'a>(&'a self, ids: &'a [String]) -> BoxFuture<'a, color_eyre::Result<()>> {
		Box::pin(async move { self.write(BackendCall::DeleteById(ids.to_vec())) })
	}

	fn delete_by_query<'a>(&'a self, query: &'a str) -> BoxFuture<'a, color_eyre::Result<()>> {
		Box::pin(async move { self.write(BackendCall::DeleteByQuery(query.to_string())) })
	}

	fn commit(&self) -> BoxFuture<'_, color_eyre::Result<()>> {
		Box::pin(async move { self.write(BackendCall::Commit) })
	}
}

/// Suffix-based schema: every registered attribute lives in `<attribute><suffix>`, where the
/// suffix follows the attribute's format. Text fields sort on a `_sort` copy.
#[derive(Debug, Clone, Default)]
pub struct DynamicSchema {
	attributes: BTreeMap<String, AttributeFormat>,
	types: BTreeMap<String, MetacardType>,
}
impl DynamicSchema {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `metacard_type` and every attribute it describes.
	pub fn with_type(mut self, metacard_type: MetacardType) -> Self {
		for descriptor in &metacard_type.descriptors {
			self.attributes.insert(descriptor.name.clone(), descriptor.format);
		}

		self.types.insert(metacard_type.name.clone(), metacard_type);

		self
	}

	pub fn with_attribute(mut self, name: &str, format: AttributeFormat) -> Self {
		self.attributes.insert(name.to_string(), format);

		self
	}

	fn typed_field(&self, attribute: &str) -> Option<String> {
		self.attributes
			.get(attribute)
			.map(|format| format!("{attribute}{}", schema::suffix_for(*format)))
	}
}
impl SchemaResolver for DynamicSchema {
	fn resolve_field_name(&self, field: &str) -> String {
		match field.rfind(FIRST_CHAR_OF_SUFFIX) {
			Some(index) if KNOWN_SUFFIXES.contains(&&field[index..]) => field[..index].to_string(),
			_ => field.to_string(),
		}
	}

	fn field(
		&self,
		attribute: &str,
		_format: AttributeFormat,
		_is_search_phrase: bool,
		_options: &FieldOptions,
	) -> Option<String> {
		self.typed_field(attribute)
	}

	fn anonymous_fields(&self, attribute: &str) -> Vec<String> {
		self.typed_field(attribute).into_iter().collect()
	}

	fn sort_key(&self, field: &str) -> String {
		if field.ends_with(TEXT_SUFFIX) {
			format!("{field}{SORT_SUFFIX}")
		} else {
			field.to_string()
		}
	}

	fn metacard_type(&self, doc: &Document) -> Result<MetacardType> {
		let name = doc.first(METACARD_TYPE_FIELD).and_then(Value::as_str).ok_or_else(|| {
			Error::MetacardCreation { message: "Document carries no metacard type.".to_string() }
		})?;

		self.types.get(name).cloned().ok_or_else(|| Error::MetacardCreation {
			message: format!("Unknown metacard type '{name}'."),
		})
	}

	fn doc_values(&self, _field: &str, values: &[Value]) -> Vec<Value> {
		values.to_vec()
	}

	fn is_private_field(&self, field: &str) -> bool {
		field.ends_with(SORT_SUFFIX)
			|| field.contains("_tokenized")
			|| matches!(field, METACARD_TYPE_FIELD | RELEVANCE_SORT_FIELD | DISTANCE_SORT_FIELD)
			|| field == "_version_"
	}

	fn add_fields(&self, metacard: &Metacard, doc: &mut InputDocument) -> Result<()> {
		for attribute in metacard.attributes.values() {
			let format = metacard
				.metacard_type
				.descriptor(&attribute.name)
				.map(|descriptor| descriptor.format)
				.or_else(|| self.attributes.get(&attribute.name).copied())
				.ok_or_else(|| Error::MetacardCreation {
					message: format!("No format is known for attribute '{}'.", attribute.name),
				})?;

			doc.set_values(
				format!("{}{}", attribute.name, schema::suffix_for(format)),
				attribute.values.clone(),
			);
		}

		doc.set_values(METACARD_TYPE_FIELD, vec![Value::from(metacard.type_name())]);

		Ok(())
	}
}

pub fn config() -> Config {
	Config::default()
}

pub fn resource_type() -> MetacardType {
	MetacardType::new(
		RESOURCE_TYPE,
		vec![
			AttributeDescriptor::new(metacard::ID, AttributeFormat::String),
			AttributeDescriptor::new(metacard::TITLE, AttributeFormat::String),
			AttributeDescriptor::new(metacard::ANY_TEXT, AttributeFormat::String),
			AttributeDescriptor::new(metacard::EFFECTIVE, AttributeFormat::Date),
			AttributeDescriptor::new(metacard::GEOGRAPHY, AttributeFormat::Geometry),
			AttributeDescriptor::new("thumbnail", AttributeFormat::Binary),
			AttributeDescriptor::new("tags", AttributeFormat::String).multivalued(),
		],
	)
}

pub fn schema() -> DynamicSchema {
	DynamicSchema::new().with_type(resource_type())
}

/// A stored document for a `resource` metacard.
pub fn document(id: &str, title: &str) -> Document {
	Document::new()
		.with_field(format!("{}{TEXT_SUFFIX}", metacard::ID), id)
		.with_field(format!("{}{TEXT_SUFFIX}", metacard::TITLE), title)
		.with_field(METACARD_TYPE_FIELD, RESOURCE_TYPE)
}

pub fn documents(count: usize) -> Vec<Document> {
	(0..count).map(|index| document(&format!("id-{index}"), &format!("Title {index}"))).collect()
}

pub fn ids(count: usize) -> Vec<String> {
	(0..count).map(|index| format!("id-{index}")).collect()
}

pub fn request(filter: FilterExpr) -> QueryRequest {
	QueryRequest::new(Query::new(filter))
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
	mutex.lock().unwrap_or_else(|err| err.into_inner())
}
