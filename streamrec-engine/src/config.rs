use std::path::PathBuf;

use clap::Parser;

use crate::error::RecommendError;
use crate::hybrid::{
	BlendConfig, BlendWeights, DEFAULT_COLLAB_WEIGHT, DEFAULT_CONTENT_WEIGHT, DEFAULT_OVER_FETCH,
};
use crate::server::{ServerConfig, DEFAULT_K};
use crate::types::MergeKey;

#[derive(Parser, Debug)]
#[command(
	name = "streamrec-engine",
	about = "Hybrid content recommendation engine over JSON-RPC 2.0 / NDJSON stdio"
)]
pub struct CliArgs {
	/// Catalog file (JSON array of rows, optionally gzipped)
	#[arg(long, env = "STREAMREC_CATALOG")]
	pub catalog: Option<PathBuf>,

	/// Representation matrix file (nested JSON rows or packed base64, optionally gzipped)
	#[arg(long, env = "STREAMREC_REPRESENTATIONS")]
	pub representations: Option<PathBuf>,

	/// Weight of the similarity component in hybrid scores
	#[arg(long, default_value_t = DEFAULT_CONTENT_WEIGHT)]
	pub content_weight: f64,

	/// Weight of the popularity component in hybrid scores
	#[arg(long, default_value_t = DEFAULT_COLLAB_WEIGHT)]
	pub collab_weight: f64,

	/// Candidates fetched from each scorer per requested result in hybrid mode
	#[arg(long, default_value_t = DEFAULT_OVER_FETCH)]
	pub over_fetch: usize,

	/// Identity used when merging hybrid candidates
	#[arg(long, value_enum, default_value_t = MergeKey::Title)]
	pub merge_key: MergeKey,

	/// Number of results when a request does not specify `k`
	#[arg(long, default_value_t = DEFAULT_K)]
	pub default_k: usize,

	/// Log level (trace, debug, info, warn, error)
	#[arg(long, default_value = "info", env = "STREAMREC_LOG_LEVEL")]
	pub log_level: String,
}

impl CliArgs {
	pub fn server_config(&self) -> Result<ServerConfig, RecommendError> {
		if self.over_fetch == 0 {
			return Err(RecommendError::InvalidParams(
				"over-fetch must be at least 1".into(),
			));
		}
		Ok(ServerConfig {
			blend: BlendConfig {
				weights: BlendWeights::new(self.content_weight, self.collab_weight)?,
				merge_key: self.merge_key,
				over_fetch: self.over_fetch,
			},
			default_k: self.default_k,
		})
	}
}
