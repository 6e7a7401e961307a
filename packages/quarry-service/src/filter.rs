use std::sync::Arc;

use time::{UtcOffset, format_description::well_known::Rfc3339};

use crate::{
	Error, Result,
	provider::{MATCH_ALL, ProviderQuery},
	schema::{CASE_SENSITIVE_OPTION, FieldOptions, GEO_SUFFIX, SchemaResolver},
};
use quarry_domain::{
	AttributeFormat, ComparisonOp, FilterExpr, Literal, Point, SortBy, SpatialOp, TemporalOp,
	TextMatch, metacard, request::DISTANCE,
};

const MAX_FILTER_DEPTH: usize = 64;

/// Output of translating a filter: the backend query plus what the translation learned.
#[derive(Debug, Clone, PartialEq)]
pub struct AdaptedFilter {
	pub query: ProviderQuery,
	/// Origin of the distance predicate, present only when a distance sort was requested.
	pub distance_point: Option<Point>,
	/// Identifiers named by `id` equality predicates, in filter order.
	pub ids: Vec<String>,
	/// True when the filter is nothing but `id` equality predicates joined by OR.
	pub real_time_get: bool,
}

pub trait FilterAdapter
where
	Self: Send + Sync,
{
	fn adapt(&self, filter: &FilterExpr, sort_policy: &[SortBy]) -> Result<AdaptedFilter>;
}

/// One callback per node kind. Children are translated before their parent.
pub trait FilterDelegate {
	type Output;

	fn and(&mut self, children: Vec<Self::Output>) -> Result<Self::Output>;

	fn or(&mut self, children: Vec<Self::Output>) -> Result<Self::Output>;

	fn not(&mut self, child: Self::Output) -> Result<Self::Output>;

	fn comparison(&mut self, property: &str, op: ComparisonOp, value: &Literal)
	-> Result<Self::Output>;

	fn spatial(&mut self, property: &str, op: &SpatialOp) -> Result<Self::Output>;

	fn temporal(&mut self, property: &str, op: &TemporalOp) -> Result<Self::Output>;

	fn text(&mut self, property: &str, text: &TextMatch) -> Result<Self::Output>;
}

pub fn adapt<D>(expr: &FilterExpr, delegate: &mut D) -> Result<D::Output>
where
	D: FilterDelegate,
{
	adapt_at(expr, delegate, 1)
}

fn adapt_at<D>(expr: &FilterExpr, delegate: &mut D, depth: usize) -> Result<D::Output>
where
	D: FilterDelegate,
{
	if depth > MAX_FILTER_DEPTH {
		return Err(Error::InvalidRequest {
			message: format!("Filter nesting exceeds {MAX_FILTER_DEPTH} levels."),
		});
	}

	match expr {
		FilterExpr::And(children) => {
			let children = adapt_children(children, delegate, depth)?;

			delegate.and(children)
		},
		FilterExpr::Or(children) => {
			let children = adapt_children(children, delegate, depth)?;

			delegate.or(children)
		},
		FilterExpr::Not(child) => {
			let child = adapt_at(child, delegate, depth + 1)?;

			delegate.not(child)
		},
		FilterExpr::Comparison { property, op, value } => delegate.comparison(property, *op, value),
		FilterExpr::Spatial { property, op } => delegate.spatial(property, op),
		FilterExpr::Temporal { property, op } => delegate.temporal(property, op),
		FilterExpr::Text { property, text } => delegate.text(property, text),
	}
}

fn adapt_children<D>(
	children: &[FilterExpr],
	delegate: &mut D,
	depth: usize,
) -> Result<Vec<D::Output>>
where
	D: FilterDelegate,
{
	children.iter().map(|child| adapt_at(child, delegate, depth + 1)).collect()
}

/// Translates filters into Lucene-style query strings over schema-resolved fields.
pub struct StandardFilterAdapter {
	schema: Arc<dyn SchemaResolver>,
}
impl StandardFilterAdapter {
	pub fn new(schema: Arc<dyn SchemaResolver>) -> Self {
		Self { schema }
	}
}
impl FilterAdapter for StandardFilterAdapter {
	fn adapt(&self, filter: &FilterExpr, sort_policy: &[SortBy]) -> Result<AdaptedFilter> {
		let sort_by_distance =
			sort_policy.iter().any(|sort_by| is_distance_sort(self.schema.as_ref(), sort_by));
		let mut delegate = QueryStringDelegate::new(self.schema.as_ref(), sort_by_distance);
		let query_string = adapt(filter, &mut delegate)?;
		let real_time_get = adapt(filter, &mut RealTimeGetDelegate)?;

		Ok(AdaptedFilter {
			query: ProviderQuery::new(query_string),
			distance_point: delegate.distance_point,
			ids: delegate.ids,
			real_time_get,
		})
	}
}

/// A sort orders by distance when it names the distance pseudo-property or any
/// geometry-typed field.
pub fn is_distance_sort(schema: &dyn SchemaResolver, sort_by: &SortBy) -> bool {
	sort_by.property == DISTANCE
		|| schema
			.anonymous_fields(&sort_by.property)
			.iter()
			.any(|field| field.ends_with(GEO_SUFFIX))
}

pub struct QueryStringDelegate<'a> {
	schema: &'a dyn SchemaResolver,
	sort_by_distance: bool,
	distance_point: Option<Point>,
	ids: Vec<String>,
}
impl<'a> QueryStringDelegate<'a> {
	pub fn new(schema: &'a dyn SchemaResolver, sort_by_distance: bool) -> Self {
		Self { schema, sort_by_distance, distance_point: None, ids: Vec::new() }
	}

	pub fn distance_point(&self) -> Option<Point> {
		self.distance_point
	}

	pub fn ids(&self) -> &[String] {
		&self.ids
	}

	fn resolve(
		&self,
		property: &str,
		format: AttributeFormat,
		is_search_phrase: bool,
		options: &FieldOptions,
	) -> Result<String> {
		self.schema.field(property, format, is_search_phrase, options).ok_or_else(|| {
			Error::unsupported(format!("No schema field found for property '{property}'."))
		})
	}
}
impl FilterDelegate for QueryStringDelegate<'_> {
	type Output = String;

	fn and(&mut self, children: Vec<String>) -> Result<String> {
		Ok(join_clauses(children, " AND ", MATCH_ALL))
	}

	fn or(&mut self, children: Vec<String>) -> Result<String> {
		Ok(join_clauses(children, " OR ", "-*:*"))
	}

	fn not(&mut self, child: String) -> Result<String> {
		Ok(negate(&child))
	}

	fn comparison(&mut self, property: &str, op: ComparisonOp, value: &Literal) -> Result<String> {
		let field = self.resolve(property, literal_format(value), false, &FieldOptions::new())?;
		let term = literal_term(value);

		if property == metacard::ID
			&& op == ComparisonOp::Equal
			&& let Literal::String(id) = value
		{
			self.ids.push(id.clone());
		}

		Ok(match op {
			ComparisonOp::Equal => format!("{field}:{term}"),
			ComparisonOp::NotEqual => negate(&format!("{field}:{term}")),
			ComparisonOp::LessThan => format!("{field}:{{* TO {term}}}"),
			ComparisonOp::LessThanOrEqual => format!("{field}:[* TO {term}]"),
			ComparisonOp::GreaterThan => format!("{field}:{{{term} TO *}}"),
			ComparisonOp::GreaterThanOrEqual => format!("{field}:[{term} TO *]"),
		})
	}

	fn spatial(&mut self, property: &str, op: &SpatialOp) -> Result<String> {
		let field = self.resolve(property, AttributeFormat::Geometry, false, &FieldOptions::new())?;

		if self.sort_by_distance
			&& self.distance_point.is_none()
			&& let Some(point) = op.distance_origin()
		{
			self.distance_point = Some(point);
		}

		Ok(match op {
			SpatialOp::Intersects { wkt } =>
				format!("{field}:\"Intersects({})\"", escape_quoted(wkt)),
			SpatialOp::Within { wkt } => format!("{field}:\"IsWithin({})\"", escape_quoted(wkt)),
			SpatialOp::Contains { wkt } => format!("{field}:\"Contains({})\"", escape_quoted(wkt)),
			SpatialOp::Disjoint { wkt } =>
				format!("{field}:\"IsDisjointTo({})\"", escape_quoted(wkt)),
			SpatialOp::PointRadius { point, radius_meters } => format!(
				"{{!geofilt sfield={field} pt={} d={}}}",
				point_param(*point),
				radius_meters / 1_000.0
			),
			SpatialOp::Nearest { .. } => format!("{field}:[* TO *]"),
		})
	}

	fn temporal(&mut self, property: &str, op: &TemporalOp) -> Result<String> {
		let field = self.resolve(property, AttributeFormat::Date, false, &FieldOptions::new())?;

		Ok(match op {
			TemporalOp::Before(instant) => format!("{field}:[* TO {}}}", format_instant(*instant)?),
			TemporalOp::After(instant) => format!("{field}:{{{} TO *]", format_instant(*instant)?),
			TemporalOp::During { start, end } => format!(
				"{field}:{{{} TO {}}}",
				format_instant(*start)?,
				format_instant(*end)?
			),
		})
	}

	fn text(&mut self, property: &str, text: &TextMatch) -> Result<String> {
		let mut options = FieldOptions::new();

		if text.case_sensitive {
			options.insert(CASE_SENSITIVE_OPTION.to_string(), serde_json::Value::Bool(true));
		}

		let field = self.resolve(property, AttributeFormat::String, true, &options)?;
		let term = text_term(&text.pattern);

		if text.fuzzy { Ok(format!("{field}:{term}~")) } else { Ok(format!("{field}:{term}")) }
	}
}

/// Decides whether a filter can be served by a direct identifier lookup.
pub struct RealTimeGetDelegate;
impl FilterDelegate for RealTimeGetDelegate {
	type Output = bool;

	fn and(&mut self, _children: Vec<bool>) -> Result<bool> {
		Ok(false)
	}

	fn or(&mut self, children: Vec<bool>) -> Result<bool> {
		Ok(!children.is_empty() && children.into_iter().all(|child| child))
	}

	fn not(&mut self, _child: bool) -> Result<bool> {
		Ok(false)
	}

	fn comparison(&mut self, property: &str, op: ComparisonOp, value: &Literal) -> Result<bool> {
		Ok(property == metacard::ID
			&& op == ComparisonOp::Equal
			&& matches!(value, Literal::String(_)))
	}

	fn spatial(&mut self, _property: &str, _op: &SpatialOp) -> Result<bool> {
		Ok(false)
	}

	fn temporal(&mut self, _property: &str, _op: &TemporalOp) -> Result<bool> {
		Ok(false)
	}

	fn text(&mut self, _property: &str, _text: &TextMatch) -> Result<bool> {
		Ok(false)
	}
}

pub fn point_param(point: Point) -> String {
	format!("{},{}", point.lat, point.lon)
}

fn join_clauses(children: Vec<String>, separator: &str, empty: &str) -> String {
	match children.len() {
		0 => empty.to_string(),
		1 => children.into_iter().next().unwrap_or_default(),
		_ => format!("({})", children.join(separator)),
	}
}

fn negate(clause: &str) -> String {
	format!("(*:* -{clause})")
}

fn literal_format(value: &Literal) -> AttributeFormat {
	match value {
		Literal::String(_) => AttributeFormat::String,
		Literal::Integer(_) => AttributeFormat::Long,
		Literal::Double(_) => AttributeFormat::Double,
		Literal::Boolean(_) => AttributeFormat::Boolean,
	}
}

fn literal_term(value: &Literal) -> String {
	match value {
		Literal::String(value) => format!("\"{}\"", escape_quoted(value)),
		Literal::Integer(value) => value.to_string(),
		Literal::Double(value) => value.to_string(),
		Literal::Boolean(value) => value.to_string(),
	}
}

/// Wildcards stay live; every other query-syntax character is escaped. Multi-word patterns
/// become phrases.
fn text_term(pattern: &str) -> String {
	if pattern.chars().any(char::is_whitespace) {
		return format!("\"{}\"", escape_quoted(pattern));
	}

	let mut escaped = String::with_capacity(pattern.len());

	for c in pattern.chars() {
		if matches!(
			c,
			'\\' | '+' | '-' | '!' | '(' | ')' | ':' | '^' | '[' | ']' | '"' | '{' | '}' | '~'
				| '|' | '&' | '/'
		) {
			escaped.push('\\');
		}

		escaped.push(c);
	}

	escaped
}

fn escape_quoted(value: &str) -> String {
	value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn format_instant(instant: time::OffsetDateTime) -> Result<String> {
	instant.to_offset(UtcOffset::UTC).format(&Rfc3339).map_err(|err| Error::InvalidRequest {
		message: format!("Temporal filter instant cannot be formatted: {err}."),
	})
}
