pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Quarry config {path:?} could not be read.")]
	ReadConfig { path: std::path::PathBuf, source: std::io::Error },
	#[error("Quarry config {path:?} does not match the [search]/[commit] layout: {source}")]
	ParseConfig { path: std::path::PathBuf, source: toml::de::Error },
	#[error("Quarry config key {key} {message}")]
	Validation { key: &'static str, message: String },
}
