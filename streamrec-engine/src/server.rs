// ---------------------------------------------------------------------------
// RecommendServer — JSON-RPC dispatcher
// ---------------------------------------------------------------------------
//
// Routes JSON-RPC 2.0 requests (NDJSON over stdin) to a RecommendationEngine.
// A `run()` loop feeds `dispatch()`, which matches on the method name and
// calls free-standing handlers through `with_engine`.
//
// Until an engine is loaded, or after a load fails, every query method
// answers REC_UNAVAILABLE.
// ---------------------------------------------------------------------------

use std::io::{self, BufRead};
use std::path::PathBuf;

use serde::Deserialize;

use crate::catalog::DEFAULT_SEARCH_RESULTS;
use crate::engine::RecommendationEngine;
use crate::error::RecommendError;
use crate::hybrid::BlendConfig;
use crate::protocol::*;
use crate::transport::NdjsonTransport;
use crate::types::RecommendationMode;
use crate::validation::{validate_query, DEFAULT_MIN_QUERY_LENGTH};

pub const DEFAULT_K: usize = 10;

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ServerConfig {
	pub blend: BlendConfig,
	pub default_k: usize,
}

impl Default for ServerConfig {
	fn default() -> Self {
		Self {
			blend: BlendConfig::default(),
			default_k: DEFAULT_K,
		}
	}
}

pub struct RecommendServer {
	transport: NdjsonTransport,
	config: ServerConfig,
	engine: Option<RecommendationEngine>,
	unavailable_reason: String,
}

impl RecommendServer {
	pub fn new(transport: NdjsonTransport, config: ServerConfig) -> Self {
		Self {
			transport,
			config,
			engine: None,
			unavailable_reason: "no catalog loaded".to_string(),
		}
	}

	/// Install a loaded engine, making the server available.
	pub fn set_engine(&mut self, engine: RecommendationEngine) {
		self.engine = Some(engine);
	}

	/// Drop any engine and refuse queries with `reason`.
	pub fn mark_unavailable(&mut self, reason: impl Into<String>) {
		self.engine = None;
		self.unavailable_reason = reason.into();
	}

	pub fn is_available(&self) -> bool {
		self.engine.is_some()
	}

	/// Main loop: read JSON-RPC messages from stdin, dispatch to handlers.
	pub fn run(&mut self) -> Result<(), RecommendError> {
		let stdin = io::stdin();
		self.serve(stdin.lock())
	}

	pub fn serve<R: BufRead>(&mut self, reader: R) -> Result<(), RecommendError> {
		for line_result in reader.lines() {
			let line = line_result?;
			if line.trim().is_empty() {
				continue;
			}

			let request: JsonRpcRequest = match serde_json::from_str(&line) {
				Ok(r) => r,
				Err(e) => {
					tracing::error!("Failed to parse request: {}", e);
					continue;
				}
			};

			self.dispatch(request);
		}

		Ok(())
	}

	// ── Dispatch ──────────────────────────────────────────────────────────

	fn dispatch(&mut self, req: JsonRpcRequest) {
		let id = req.id;
		let default_k = self.config.default_k;
		let result = match req.method.as_str() {
			// -- Lifecycle -----------------------------------------------
			"engine/load" => self.handle_load(req.params),
			"engine/status" => Ok(self.status()),

			// -- Query ---------------------------------------------------
			"query/validate" => handle_validate(req.params),

			// -- Catalog -------------------------------------------------
			"catalog/resolve" => self.with_engine(|e| handle_resolve(e, req.params)),
			"catalog/search" => self.with_engine(|e| handle_search(e, req.params)),
			"catalog/item" => self.with_engine(|e| handle_item(e, req.params)),
			"catalog/trending" => {
				self.with_engine(|e| handle_trending(e, req.params, default_k))
			}
			"catalog/analytics" => {
				self.with_engine(|e| Ok(serde_json::to_value(e.analytics())?))
			}

			// -- Recommendation ------------------------------------------
			"recommend/byIndex" => {
				self.with_engine(|e| handle_recommend_by_index(e, req.params, default_k))
			}
			"recommend/byQuery" => {
				self.with_engine(|e| handle_recommend_by_query(e, req.params, default_k))
			}

			// -- Unknown -------------------------------------------------
			_ => {
				self.transport.write_error(
					id,
					METHOD_NOT_FOUND,
					format!("Unknown method: {}", req.method),
					None,
				);
				return;
			}
		};

		match result {
			Ok(value) => self.transport.write_response(id, value),
			Err(e) => {
				let code = if matches!(e, RecommendError::InvalidParams(_)) {
					INVALID_PARAMS
				} else {
					RECOMMEND_ERROR
				};
				self.transport
					.write_error(id, code, e.to_string(), Some(e.to_json_rpc_error()))
			}
		}
	}

	// ── Engine accessor ───────────────────────────────────────────────────

	fn with_engine<F>(&self, f: F) -> Result<serde_json::Value, RecommendError>
	where
		F: FnOnce(&RecommendationEngine) -> Result<serde_json::Value, RecommendError>,
	{
		match &self.engine {
			Some(e) => f(e),
			None => Err(RecommendError::Unavailable(self.unavailable_reason.clone())),
		}
	}

	// ── Lifecycle ─────────────────────────────────────────────────────────

	fn handle_load(&mut self, params: serde_json::Value) -> Result<serde_json::Value, RecommendError> {
		let p: LoadParams = parse_params(params)?;
		match RecommendationEngine::from_paths(
			&p.catalog_path,
			&p.representations_path,
			self.config.blend,
		) {
			Ok(engine) => {
				let loaded = serde_json::json!({
					"items": engine.len(),
					"dimensions": engine.dimensions(),
				});
				self.set_engine(engine);
				Ok(loaded)
			}
			Err(e) => {
				tracing::error!("Load failed: {}", e);
				self.mark_unavailable(format!("load failed: {e}"));
				Err(e.into())
			}
		}
	}

	fn status(&self) -> serde_json::Value {
		match &self.engine {
			Some(e) => serde_json::json!({
				"available": true,
				"items": e.len(),
				"dimensions": e.dimensions(),
				"reason": null,
			}),
			None => serde_json::json!({
				"available": false,
				"items": 0,
				"dimensions": 0,
				"reason": self.unavailable_reason,
			}),
		}
	}
}

// ---------------------------------------------------------------------------
// Param types
// ---------------------------------------------------------------------------

/// Missing params are read as an empty object, so methods whose params are
/// all optional accept a bare request.
fn parse_params<T: serde::de::DeserializeOwned>(
	params: serde_json::Value,
) -> Result<T, RecommendError> {
	let params = match params {
		serde_json::Value::Null => serde_json::Value::Object(serde_json::Map::new()),
		other => other,
	};
	serde_json::from_value(params).map_err(|e| RecommendError::InvalidParams(e.to_string()))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoadParams {
	catalog_path: PathBuf,
	representations_path: PathBuf,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValidateParams {
	query: String,
	min_length: Option<usize>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryParams {
	query: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchParams {
	query: String,
	max_results: Option<usize>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndexParams {
	index: usize,
}

#[derive(Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct TrendingParams {
	content_type: Option<String>,
	language: Option<String>,
	k: Option<usize>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecommendByIndexParams {
	index: usize,
	k: Option<usize>,
	mode: Option<RecommendationMode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecommendByQueryParams {
	query: String,
	k: Option<usize>,
	mode: Option<RecommendationMode>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn handle_validate(params: serde_json::Value) -> Result<serde_json::Value, RecommendError> {
	let p: ValidateParams = parse_params(params)?;
	let result = validate_query(&p.query, p.min_length.unwrap_or(DEFAULT_MIN_QUERY_LENGTH));
	Ok(serde_json::to_value(result)?)
}

fn handle_resolve(
	engine: &RecommendationEngine,
	params: serde_json::Value,
) -> Result<serde_json::Value, RecommendError> {
	let p: QueryParams = parse_params(params)?;
	let item = engine.resolve(&p.query)?;
	Ok(serde_json::json!({ "item": item }))
}

fn handle_search(
	engine: &RecommendationEngine,
	params: serde_json::Value,
) -> Result<serde_json::Value, RecommendError> {
	let p: SearchParams = parse_params(params)?;
	let items = engine.search(&p.query, p.max_results.unwrap_or(DEFAULT_SEARCH_RESULTS));
	Ok(serde_json::json!({ "items": items }))
}

fn handle_item(
	engine: &RecommendationEngine,
	params: serde_json::Value,
) -> Result<serde_json::Value, RecommendError> {
	let p: IndexParams = parse_params(params)?;
	let item = engine.item(p.index)?;
	Ok(serde_json::json!({ "item": item }))
}

fn handle_trending(
	engine: &RecommendationEngine,
	params: serde_json::Value,
	default_k: usize,
) -> Result<serde_json::Value, RecommendError> {
	let p: TrendingParams = parse_params(params)?;
	let items = engine.trending(
		p.content_type.as_deref(),
		p.language.as_deref(),
		p.k.unwrap_or(default_k),
	);
	Ok(serde_json::json!({ "items": items }))
}

fn handle_recommend_by_index(
	engine: &RecommendationEngine,
	params: serde_json::Value,
	default_k: usize,
) -> Result<serde_json::Value, RecommendError> {
	let p: RecommendByIndexParams = parse_params(params)?;
	let recommendations = engine.recommend(
		p.index,
		p.k.unwrap_or(default_k),
		p.mode.unwrap_or_default(),
	)?;
	Ok(serde_json::json!({ "recommendations": recommendations }))
}

fn handle_recommend_by_query(
	engine: &RecommendationEngine,
	params: serde_json::Value,
	default_k: usize,
) -> Result<serde_json::Value, RecommendError> {
	let p: RecommendByQueryParams = parse_params(params)?;
	let outcome = engine.recommend_for_query(
		&p.query,
		p.k.unwrap_or(default_k),
		p.mode.unwrap_or_default(),
	)?;
	Ok(serde_json::to_value(outcome)?)
}
