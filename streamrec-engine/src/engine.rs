// ---------------------------------------------------------------------------
// RecommendationEngine — immutable query context
// ---------------------------------------------------------------------------
//
// Owns the catalog and representation matrix for the life of the process.
// Every query borrows it immutably, so one engine can serve any number of
// threads without locking.
// ---------------------------------------------------------------------------

use std::path::Path;

use serde::{Serialize, Serializer};

use crate::analytics::{self, CatalogAnalytics, DiversityMetrics};
use crate::catalog::Catalog;
use crate::error::{LoadError, RecommendError};
use crate::hybrid::{hybrid_recommendations, BlendConfig};
use crate::loader::{self, LoadedData};
use crate::popularity::popular_peers;
use crate::representations::RepresentationMatrix;
use crate::similarity::similar_items;
use crate::types::{RecommendationMode, RecommendationRecord, ResolvedItem, ScoredIndex};

/// Result of recommending from a free-text title query.
///
/// On the wire every status carries a `recommendations` array, empty unless
/// the status is `ok`.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
	Found {
		resolved: ResolvedItem,
		recommendations: Vec<RecommendationRecord>,
		diversity: Option<DiversityMetrics>,
	},
	NotFound { query: String },
	/// The title resolved but nothing survived scoring.
	Empty { resolved: ResolvedItem },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OutcomeWire<'a> {
	status: &'static str,
	#[serde(skip_serializing_if = "Option::is_none")]
	query: Option<&'a str>,
	#[serde(skip_serializing_if = "Option::is_none")]
	resolved: Option<&'a ResolvedItem>,
	recommendations: &'a [RecommendationRecord],
	#[serde(skip_serializing_if = "Option::is_none")]
	diversity: Option<&'a DiversityMetrics>,
}

impl Serialize for QueryOutcome {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let wire = match self {
			Self::Found {
				resolved,
				recommendations,
				diversity,
			} => OutcomeWire {
				status: "ok",
				query: None,
				resolved: Some(resolved),
				recommendations: recommendations.as_slice(),
				diversity: diversity.as_ref(),
			},
			Self::NotFound { query } => OutcomeWire {
				status: "notFound",
				query: Some(query.as_str()),
				resolved: None,
				recommendations: &[],
				diversity: None,
			},
			Self::Empty { resolved } => OutcomeWire {
				status: "empty",
				query: None,
				resolved: Some(resolved),
				recommendations: &[],
				diversity: None,
			},
		};
		wire.serialize(serializer)
	}
}

impl QueryOutcome {
	/// Collapse into a `Result`, turning the non-fatal outcomes into their
	/// error variants.
	pub fn into_result(self) -> Result<(ResolvedItem, Vec<RecommendationRecord>), RecommendError> {
		match self {
			Self::Found {
				resolved,
				recommendations,
				..
			} => Ok((resolved, recommendations)),
			Self::NotFound { query } => Err(RecommendError::NotFound(query)),
			Self::Empty { .. } => Err(RecommendError::EmptyResult),
		}
	}
}

#[derive(Debug, Clone)]
pub struct RecommendationEngine {
	catalog: Catalog,
	matrix: RepresentationMatrix,
	config: BlendConfig,
}

impl RecommendationEngine {
	pub fn new(
		catalog: Catalog,
		matrix: RepresentationMatrix,
		config: BlendConfig,
	) -> Result<Self, LoadError> {
		loader::check_alignment(&catalog, &matrix)?;
		Ok(Self {
			catalog,
			matrix,
			config,
		})
	}

	pub fn from_loaded(data: LoadedData, config: BlendConfig) -> Result<Self, LoadError> {
		Self::new(data.catalog, data.matrix, config)
	}

	pub fn from_paths(
		catalog_path: &Path,
		representations_path: &Path,
		config: BlendConfig,
	) -> Result<Self, LoadError> {
		Self::from_loaded(loader::load(catalog_path, representations_path)?, config)
	}

	pub fn len(&self) -> usize {
		self.catalog.len()
	}

	pub fn is_empty(&self) -> bool {
		self.catalog.is_empty()
	}

	pub fn dimensions(&self) -> usize {
		self.matrix.dimensions()
	}

	pub fn catalog(&self) -> &Catalog {
		&self.catalog
	}

	pub fn config(&self) -> &BlendConfig {
		&self.config
	}

	// ── Lookup ────────────────────────────────────────────────────────────

	pub fn resolve(&self, query: &str) -> Result<Option<ResolvedItem>, RecommendError> {
		self.catalog.resolve(query)
	}

	pub fn search(&self, query: &str, max_results: usize) -> Vec<ResolvedItem> {
		self.catalog.search(query, max_results)
	}

	pub fn item(&self, index: usize) -> Result<ResolvedItem, RecommendError> {
		Ok(ResolvedItem {
			index,
			item: self.catalog.get(index)?.clone(),
		})
	}

	// ── Recommendation ────────────────────────────────────────────────────

	/// Top `k` recommendations for the item at `index`.
	pub fn recommend(
		&self,
		index: usize,
		k: usize,
		mode: RecommendationMode,
	) -> Result<Vec<RecommendationRecord>, RecommendError> {
		let records = match mode {
			RecommendationMode::Similarity => {
				self.records(similar_items(&self.matrix, index, k)?, mode)
			}
			RecommendationMode::Popularity => {
				self.records(popular_peers(&self.catalog, index, k)?, mode)
			}
			RecommendationMode::Hybrid => {
				hybrid_recommendations(&self.catalog, &self.matrix, index, k, &self.config)?
			}
		};

		tracing::debug!(index, k, ?mode, results = records.len(), "recommend");
		Ok(records)
	}

	/// Resolve `query` to a title, then recommend for it.
	pub fn recommend_for_query(
		&self,
		query: &str,
		k: usize,
		mode: RecommendationMode,
	) -> Result<QueryOutcome, RecommendError> {
		let Some(resolved) = self.resolve(query)? else {
			tracing::debug!(query, "no title matched");
			return Ok(QueryOutcome::NotFound {
				query: query.to_string(),
			});
		};

		let recommendations = self.recommend(resolved.index, k, mode)?;
		if recommendations.is_empty() {
			return Ok(QueryOutcome::Empty { resolved });
		}

		let diversity = analytics::diversity(&recommendations);
		Ok(QueryOutcome::Found {
			resolved,
			recommendations,
			diversity,
		})
	}

	fn records(
		&self,
		scored: Vec<ScoredIndex>,
		mode: RecommendationMode,
	) -> Vec<RecommendationRecord> {
		scored
			.into_iter()
			.filter_map(|s| {
				self.catalog
					.items()
					.get(s.index)
					.map(|item| RecommendationRecord::from_item(s.index, item, s.score, mode))
			})
			.collect()
	}

	// ── Catalog views ─────────────────────────────────────────────────────

	pub fn trending(
		&self,
		content_type: Option<&str>,
		language: Option<&str>,
		k: usize,
	) -> Vec<ResolvedItem> {
		analytics::trending(&self.catalog, content_type, language, k)
	}

	pub fn analytics(&self) -> CatalogAnalytics {
		analytics::analyze(&self.catalog)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::catalog::tests::item;
	use crate::types::MergeKey;

	fn abc_engine() -> RecommendationEngine {
		let catalog = Catalog::new(vec![
			item("A", "Movie", "EN", 0.9),
			item("B", "Movie", "EN", 0.5),
			item("C", "Show", "FR", 0.8),
		])
		.unwrap();
		let matrix =
			RepresentationMatrix::from_rows(vec![vec![1.0, 0.0], vec![0.9, 0.1], vec![0.0, 1.0]])
				.unwrap();
		RecommendationEngine::new(catalog, matrix, BlendConfig::default()).unwrap()
	}

	fn titles(records: &[RecommendationRecord]) -> Vec<&str> {
		records.iter().map(|r| r.title.as_str()).collect()
	}

	#[test]
	fn rejects_misaligned_parts() {
		let catalog = Catalog::new(vec![item("A", "Movie", "EN", 0.9)]).unwrap();
		let matrix = RepresentationMatrix::from_rows(vec![vec![1.0], vec![0.5]]).unwrap();
		assert!(matches!(
			RecommendationEngine::new(catalog, matrix, BlendConfig::default()),
			Err(LoadError::Misaligned { .. })
		));
	}

	#[test]
	fn example_popularity_scenario() {
		let engine = abc_engine();
		let resolved = engine.resolve("A").unwrap().unwrap();
		let records = engine
			.recommend(resolved.index, 2, RecommendationMode::Popularity)
			.unwrap();
		assert_eq!(titles(&records), vec!["B"]);
		assert_eq!(records[0].score, 0.5);
		assert_eq!(records[0].method, RecommendationMode::Popularity);
	}

	#[test]
	fn similarity_results_follow_row_alignment() {
		let engine = abc_engine();
		let records = engine.recommend(2, 2, RecommendationMode::Similarity).unwrap();
		assert_eq!(titles(&records), vec!["B", "A"]);
		assert!(records.iter().all(|r| r.index != 2));

		let records = engine.recommend(0, 1, RecommendationMode::Similarity).unwrap();
		assert_eq!(titles(&records), vec!["B"]);
	}

	#[test]
	fn recommend_is_deterministic() {
		let engine = abc_engine();
		for mode in [
			RecommendationMode::Similarity,
			RecommendationMode::Popularity,
			RecommendationMode::Hybrid,
		] {
			let first = engine.recommend(1, 2, mode).unwrap();
			let second = engine.recommend(1, 2, mode).unwrap();
			assert_eq!(first, second);
		}
	}

	#[test]
	fn result_length_never_exceeds_k() {
		let engine = abc_engine();
		for k in 0..5 {
			for mode in [
				RecommendationMode::Similarity,
				RecommendationMode::Popularity,
				RecommendationMode::Hybrid,
			] {
				let records = engine.recommend(0, k, mode).unwrap();
				assert!(records.len() <= k);
			}
		}
		assert_eq!(engine.recommend(0, 5, RecommendationMode::Similarity).unwrap().len(), 2);
	}

	#[test]
	fn out_of_range_index_fails_every_mode() {
		let engine = abc_engine();
		for mode in [
			RecommendationMode::Similarity,
			RecommendationMode::Popularity,
			RecommendationMode::Hybrid,
		] {
			assert!(matches!(
				engine.recommend(3, 2, mode),
				Err(RecommendError::IndexOutOfRange { index: 3, len: 3 })
			));
		}
		assert!(engine.item(3).is_err());
	}

	#[test]
	fn query_outcomes_are_distinct() {
		let engine = abc_engine();

		let outcome = engine
			.recommend_for_query("zzz", 2, RecommendationMode::Hybrid)
			.unwrap();
		assert_eq!(outcome, QueryOutcome::NotFound { query: "zzz".into() });
		assert!(matches!(outcome.into_result(), Err(RecommendError::NotFound(_))));

		let outcome = engine
			.recommend_for_query("c", 0, RecommendationMode::Hybrid)
			.unwrap();
		assert!(matches!(outcome, QueryOutcome::Empty { .. }));
		assert!(matches!(outcome.into_result(), Err(RecommendError::EmptyResult)));

		let outcome = engine
			.recommend_for_query("a", 2, RecommendationMode::Hybrid)
			.unwrap();
		let (resolved, records) = outcome.into_result().unwrap();
		assert_eq!(resolved.index, 0);
		assert_eq!(records.len(), 2);
	}

	#[test]
	fn every_outcome_serializes_a_recommendations_array() {
		let engine = abc_engine();

		let missing = serde_json::to_value(
			engine
				.recommend_for_query("zzz", 2, RecommendationMode::Hybrid)
				.unwrap(),
		)
		.unwrap();
		assert_eq!(missing["status"], "notFound");
		assert_eq!(missing["recommendations"], serde_json::json!([]));
		assert!(missing.get("resolved").is_none());
		assert!(missing.get("diversity").is_none());

		let empty = serde_json::to_value(
			engine
				.recommend_for_query("c", 0, RecommendationMode::Hybrid)
				.unwrap(),
		)
		.unwrap();
		assert_eq!(empty["status"], "empty");
		assert_eq!(empty["resolved"]["index"], 2);
		assert_eq!(empty["recommendations"], serde_json::json!([]));
		assert!(empty.get("diversity").is_none());

		let found = serde_json::to_value(
			engine
				.recommend_for_query("a", 2, RecommendationMode::Hybrid)
				.unwrap(),
		)
		.unwrap();
		assert_eq!(found["status"], "ok");
		assert_eq!(found["recommendations"].as_array().unwrap().len(), 2);
	}

	#[test]
	fn single_item_catalog_recommends_nothing() {
		let catalog = Catalog::new(vec![item("Solo", "Movie", "EN", 0.5)]).unwrap();
		let matrix = RepresentationMatrix::from_rows(vec![vec![1.0, 0.0]]).unwrap();
		let engine = RecommendationEngine::new(catalog, matrix, BlendConfig::default()).unwrap();
		assert!(engine.recommend(0, 3, RecommendationMode::Similarity).unwrap().is_empty());
		assert!(engine.recommend(0, 3, RecommendationMode::Hybrid).unwrap().is_empty());
		assert!(matches!(
			engine.recommend_for_query("solo", 3, RecommendationMode::Hybrid).unwrap(),
			QueryOutcome::Empty { .. }
		));
	}

	#[test]
	fn index_merge_key_keeps_duplicate_titles_apart() {
		let catalog = Catalog::new(vec![
			item("Target", "Movie", "EN", 0.1),
			item("Twin", "Movie", "EN", 0.7),
			item("Twin", "Movie", "EN", 0.3),
		])
		.unwrap();
		let matrix = RepresentationMatrix::from_rows(vec![
			vec![1.0, 0.0],
			vec![0.8, 0.2],
			vec![0.7, 0.3],
		])
		.unwrap();
		let config = BlendConfig {
			merge_key: MergeKey::Index,
			..BlendConfig::default()
		};
		let by_index = RecommendationEngine::new(catalog.clone(), matrix.clone(), config).unwrap();
		assert_eq!(by_index.recommend(0, 5, RecommendationMode::Hybrid).unwrap().len(), 2);

		let by_title = RecommendationEngine::new(catalog, matrix, BlendConfig::default()).unwrap();
		assert_eq!(by_title.recommend(0, 5, RecommendationMode::Hybrid).unwrap().len(), 1);
	}

	#[test]
	fn concurrent_readers_share_one_engine() {
		let engine = abc_engine();
		let expected = engine.recommend(0, 2, RecommendationMode::Hybrid).unwrap();
		std::thread::scope(|scope| {
			for _ in 0..4 {
				scope.spawn(|| {
					let got = engine.recommend(0, 2, RecommendationMode::Hybrid).unwrap();
					assert_eq!(got, expected);
				});
			}
		});
	}
}
