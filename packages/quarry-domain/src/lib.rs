//! Engine-agnostic catalog model shared by the query compiler, the result assembler and their
//! callers.

pub mod filter;
pub mod metacard;
pub mod request;
pub mod response;

pub use filter::{ComparisonOp, FilterExpr, Literal, Point, SpatialOp, TemporalOp, TextMatch};
pub use metacard::{
	Attribute, AttributeDescriptor, AttributeFormat, ContentType, Hit, Metacard, MetacardType,
};
pub use request::{
	FacetSortKey, Properties, PropertyValue, Query, QueryRequest, SortBy, SortOrder,
	TermFacetProperties,
};
pub use response::{FacetAttributeResult, ResponseProperties, ResponseValue, SourceResponse};
