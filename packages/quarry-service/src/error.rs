use std::fmt::Display;

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub const UNSUPPORTED_QUERY_MESSAGE: &str = "Could not complete query.";
pub const ROW_COUNT_MESSAGE: &str = "Could not retrieve number of records.";

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("{message}")]
	UnsupportedQuery { message: String, cause: String },
	#[error("Metacard creation failed: {message}")]
	MetacardCreation { message: String },
	#[error("Backend error: {message}")]
	Backend { message: String },
}
impl Error {
	pub(crate) fn unsupported(cause: impl Display) -> Self {
		Self::unsupported_with(UNSUPPORTED_QUERY_MESSAGE, cause)
	}

	pub(crate) fn unsupported_with(message: &str, cause: impl Display) -> Self {
		Self::UnsupportedQuery { message: message.to_string(), cause: cause.to_string() }
	}

	pub(crate) fn backend(cause: impl Display) -> Self {
		Self::Backend { message: cause.to_string() }
	}

	pub fn cause(&self) -> Option<&str> {
		match self {
			Self::UnsupportedQuery { cause, .. } => Some(cause.as_str()),
			_ => None,
		}
	}
}
