//! Filter expressions: a closed tree of node kinds that backends translate through a delegate.

use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpr {
	And(Vec<FilterExpr>),
	Or(Vec<FilterExpr>),
	Not(Box<FilterExpr>),
	Comparison { property: String, op: ComparisonOp, value: Literal },
	Spatial { property: String, op: SpatialOp },
	Temporal { property: String, op: TemporalOp },
	Text { property: String, text: TextMatch },
}
impl FilterExpr {
	pub fn and(children: Vec<FilterExpr>) -> Self {
		Self::And(children)
	}

	pub fn or(children: Vec<FilterExpr>) -> Self {
		Self::Or(children)
	}

	#[allow(clippy::should_implement_trait)]
	pub fn not(child: FilterExpr) -> Self {
		Self::Not(Box::new(child))
	}

	pub fn equal(property: impl Into<String>, value: impl Into<Literal>) -> Self {
		Self::Comparison { property: property.into(), op: ComparisonOp::Equal, value: value.into() }
	}

	pub fn compare(
		property: impl Into<String>,
		op: ComparisonOp,
		value: impl Into<Literal>,
	) -> Self {
		Self::Comparison { property: property.into(), op, value: value.into() }
	}

	pub fn like(property: impl Into<String>, pattern: impl Into<String>) -> Self {
		Self::Text { property: property.into(), text: TextMatch::new(pattern) }
	}

	pub fn spatial(property: impl Into<String>, op: SpatialOp) -> Self {
		Self::Spatial { property: property.into(), op }
	}

	pub fn temporal(property: impl Into<String>, op: TemporalOp) -> Self {
		Self::Temporal { property: property.into(), op }
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
	Equal,
	NotEqual,
	LessThan,
	LessThanOrEqual,
	GreaterThan,
	GreaterThanOrEqual,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
	String(String),
	Integer(i64),
	Double(f64),
	Boolean(bool),
}
impl From<&str> for Literal {
	fn from(value: &str) -> Self {
		Self::String(value.to_string())
	}
}
impl From<String> for Literal {
	fn from(value: String) -> Self {
		Self::String(value)
	}
}
impl From<i64> for Literal {
	fn from(value: i64) -> Self {
		Self::Integer(value)
	}
}
impl From<f64> for Literal {
	fn from(value: f64) -> Self {
		Self::Double(value)
	}
}
impl From<bool> for Literal {
	fn from(value: bool) -> Self {
		Self::Boolean(value)
	}
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
	pub lat: f64,
	pub lon: f64,
}
impl Point {
	pub fn new(lat: f64, lon: f64) -> Self {
		Self { lat, lon }
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum SpatialOp {
	Intersects { wkt: String },
	Within { wkt: String },
	Contains { wkt: String },
	Disjoint { wkt: String },
	/// Everything within `radius_meters` of `point`; carries a distance origin.
	PointRadius { point: Point, radius_meters: f64 },
	/// Nearest neighbours of `point`; carries a distance origin.
	Nearest { point: Point },
}
impl SpatialOp {
	pub fn distance_origin(&self) -> Option<Point> {
		match self {
			Self::PointRadius { point, .. } | Self::Nearest { point } => Some(*point),
			_ => None,
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum TemporalOp {
	Before(OffsetDateTime),
	After(OffsetDateTime),
	During { start: OffsetDateTime, end: OffsetDateTime },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextMatch {
	pub pattern: String,
	pub case_sensitive: bool,
	pub fuzzy: bool,
}
impl TextMatch {
	pub fn new(pattern: impl Into<String>) -> Self {
		Self { pattern: pattern.into(), case_sensitive: false, fuzzy: false }
	}

	pub fn case_sensitive(mut self) -> Self {
		self.case_sensitive = true;

		self
	}

	pub fn fuzzy(mut self) -> Self {
		self.fuzzy = true;

		self
	}
}
