use thiserror::Error;

/// Failures while loading the catalog and representation matrix.
///
/// Loading is all-or-nothing: any of these leaves the engine without data.
#[derive(Debug, Error)]
pub enum LoadError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	#[error("Parse error: {0}")]
	Parse(String),
	#[error("Corruption: {0}")]
	Corruption(String),
	#[error("Invalid catalog row {row}: {reason}")]
	InvalidRow { row: usize, reason: String },
	#[error("Catalog has {catalog_rows} rows but representation matrix has {matrix_rows}")]
	Misaligned {
		catalog_rows: usize,
		matrix_rows: usize,
	},
	#[error("Catalog is empty")]
	EmptyCatalog,
}

#[derive(Debug, Error)]
pub enum RecommendError {
	#[error("No title matches query: {0}")]
	NotFound(String),
	#[error("Index {index} out of range for catalog of {len} items")]
	IndexOutOfRange { index: usize, len: usize },
	#[error("Recommendation engine unavailable: {0}")]
	Unavailable(String),
	#[error("No recommendations match the current constraints")]
	EmptyResult,
	#[error("Invalid query: {0}")]
	InvalidQuery(String),
	#[error("Invalid params: {0}")]
	InvalidParams(String),
	#[error("Load failed: {0}")]
	Load(#[from] LoadError),
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	#[error("Serialization error: {0}")]
	Serialization(String),
}

impl From<serde_json::Error> for RecommendError {
	fn from(e: serde_json::Error) -> Self {
		Self::Serialization(e.to_string())
	}
}

impl RecommendError {
	pub fn code(&self) -> &str {
		match self {
			Self::NotFound(_) => "REC_NOT_FOUND",
			Self::IndexOutOfRange { .. } => "REC_INDEX_OUT_OF_RANGE",
			Self::Unavailable(_) => "REC_UNAVAILABLE",
			Self::EmptyResult => "REC_EMPTY_RESULT",
			Self::InvalidQuery(_) => "REC_INVALID_QUERY",
			Self::InvalidParams(_) => "REC_INVALID_PARAMS",
			Self::Load(_) => "REC_LOAD_FAILED",
			Self::Io(_) => "REC_IO",
			Self::Serialization(_) => "REC_SERIALIZATION",
		}
	}

	pub fn to_json_rpc_error(&self) -> serde_json::Value {
		serde_json::json!({
			"recCode": self.code(),
			"message": self.to_string(),
		})
	}
}
