use serde::{Deserialize, Serialize};

/// One row of the content catalog. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
	pub title: String,
	pub content_type: String,
	pub language: String,
	pub hours_viewed: f64,
	pub popularity_score: f64,
	pub content_age: i64,
	pub content_type_code: u32,
	pub language_code: u32,
}

/// A catalog row together with its position, which is also its row in the
/// representation matrix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedItem {
	pub index: usize,
	#[serde(flatten)]
	pub item: ContentItem,
}

/// Which scoring strategy a recommendation request uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationMode {
	#[serde(alias = "content")]
	Similarity,
	#[serde(alias = "collaborative")]
	Popularity,
	#[default]
	Hybrid,
}

/// Identity used by the hybrid blender when the same item shows up in both
/// source lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MergeKey {
	/// Rows with equal titles collapse into one logical item.
	#[default]
	Title,
	/// Every catalog row is its own item.
	Index,
}

/// A catalog index with the score a scorer assigned to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredIndex {
	pub index: usize,
	pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreComponents {
	pub content: f64,
	pub collab: f64,
}

/// Per-query recommendation output. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRecord {
	pub index: usize,
	pub title: String,
	pub language: String,
	pub content_type: String,
	pub hours_viewed: f64,
	pub popularity_score: f64,
	pub score: f64,
	pub method: RecommendationMode,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub components: Option<ScoreComponents>,
}

impl RecommendationRecord {
	pub fn from_item(
		index: usize,
		item: &ContentItem,
		score: f64,
		method: RecommendationMode,
	) -> Self {
		Self {
			index,
			title: item.title.clone(),
			language: item.language.clone(),
			content_type: item.content_type.clone(),
			hours_viewed: item.hours_viewed,
			popularity_score: item.popularity_score,
			score,
			method,
			components: None,
		}
	}
}
