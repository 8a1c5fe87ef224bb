// ---------------------------------------------------------------------------
// Catalog analytics, trending lists and recommendation diversity
// ---------------------------------------------------------------------------

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use crate::catalog::Catalog;
use crate::types::{RecommendationRecord, ResolvedItem};

const TOP_CONTENT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
	pub name: String,
	pub count: usize,
}

/// Distribution summary of `popularity_score` across the catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopularitySummary {
	pub count: usize,
	pub mean: f64,
	/// Sample standard deviation; `None` below two items.
	pub std: Option<f64>,
	pub min: f64,
	pub p25: f64,
	pub p50: f64,
	pub p75: f64,
	pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopItem {
	pub index: usize,
	pub title: String,
	pub content_type: String,
	pub popularity_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgeBucket {
	pub age: i64,
	pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogAnalytics {
	pub total_content: usize,
	pub content_by_type: Vec<CategoryCount>,
	pub content_by_language: Vec<CategoryCount>,
	pub popularity: PopularitySummary,
	pub top_content: Vec<TopItem>,
	pub content_age_distribution: Vec<AgeBucket>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiversityMetrics {
	pub content_diversity: f64,
	pub language_diversity: f64,
	pub avg_popularity: f64,
	pub popularity_std: Option<f64>,
}

// ---------------------------------------------------------------------------
// Trending
// ---------------------------------------------------------------------------

/// Most popular items, optionally restricted to an exact content type and/or
/// language. Equal popularity keeps catalog order.
pub fn trending(
	catalog: &Catalog,
	content_type: Option<&str>,
	language: Option<&str>,
	k: usize,
) -> Vec<ResolvedItem> {
	let mut hits: Vec<(usize, f64)> = catalog
		.items()
		.iter()
		.enumerate()
		.filter(|(_, item)| content_type.map_or(true, |t| item.content_type == t))
		.filter(|(_, item)| language.map_or(true, |l| item.language == l))
		.map(|(i, item)| (i, item.popularity_score))
		.collect();

	hits.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
	hits.into_iter()
		.take(k)
		.map(|(index, _)| ResolvedItem {
			index,
			item: catalog.items()[index].clone(),
		})
		.collect()
}

// ---------------------------------------------------------------------------
// Catalog analytics
// ---------------------------------------------------------------------------

pub fn analyze(catalog: &Catalog) -> CatalogAnalytics {
	let items = catalog.items();

	let content_by_type = count_by(items.iter().map(|i| i.content_type.as_str()));
	let content_by_language = count_by(items.iter().map(|i| i.language.as_str()));

	let popularity: Vec<f64> = items.iter().map(|i| i.popularity_score).collect();

	let top_content = trending(catalog, None, None, TOP_CONTENT)
		.into_iter()
		.map(|r| TopItem {
			index: r.index,
			title: r.item.title,
			content_type: r.item.content_type,
			popularity_score: r.item.popularity_score,
		})
		.collect();

	let mut ages: BTreeMap<i64, usize> = BTreeMap::new();
	for item in items {
		*ages.entry(item.content_age).or_default() += 1;
	}

	CatalogAnalytics {
		total_content: items.len(),
		content_by_type,
		content_by_language,
		popularity: summarize(&popularity),
		top_content,
		content_age_distribution: ages
			.into_iter()
			.map(|(age, count)| AgeBucket { age, count })
			.collect(),
	}
}

/// Counts per distinct value, most frequent first, ties by first appearance.
fn count_by<'a>(values: impl Iterator<Item = &'a str>) -> Vec<CategoryCount> {
	let mut counts: Vec<CategoryCount> = Vec::new();
	let mut seen: HashMap<&'a str, usize> = HashMap::new();
	for value in values {
		match seen.get(value) {
			Some(&slot) => counts[slot].count += 1,
			None => {
				seen.insert(value, counts.len());
				counts.push(CategoryCount {
					name: value.to_string(),
					count: 1,
				});
			}
		}
	}
	counts.sort_by(|a, b| b.count.cmp(&a.count));
	counts
}

fn summarize(values: &[f64]) -> PopularitySummary {
	let mut sorted = values.to_vec();
	sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

	PopularitySummary {
		count: sorted.len(),
		mean: mean(&sorted),
		std: sample_std(&sorted),
		min: sorted.first().copied().unwrap_or(0.0),
		p25: quantile(&sorted, 0.25),
		p50: quantile(&sorted, 0.50),
		p75: quantile(&sorted, 0.75),
		max: sorted.last().copied().unwrap_or(0.0),
	}
}

fn mean(values: &[f64]) -> f64 {
	if values.is_empty() {
		return 0.0;
	}
	values.iter().sum::<f64>() / values.len() as f64
}

fn sample_std(values: &[f64]) -> Option<f64> {
	if values.len() < 2 {
		return None;
	}
	let m = mean(values);
	let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
	Some((ss / (values.len() - 1) as f64).sqrt())
}

/// Linear-interpolated quantile of an ascending slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
	if sorted.is_empty() {
		return 0.0;
	}
	let pos = q * (sorted.len() - 1) as f64;
	let lo = pos.floor() as usize;
	let hi = pos.ceil() as usize;
	sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

// ---------------------------------------------------------------------------
// Diversity
// ---------------------------------------------------------------------------

/// How varied a recommendation list is. `None` for an empty list.
pub fn diversity(records: &[RecommendationRecord]) -> Option<DiversityMetrics> {
	if records.is_empty() {
		return None;
	}
	let n = records.len() as f64;
	let types: HashSet<&str> = records.iter().map(|r| r.content_type.as_str()).collect();
	let languages: HashSet<&str> = records.iter().map(|r| r.language.as_str()).collect();
	let popularity: Vec<f64> = records.iter().map(|r| r.popularity_score).collect();

	Some(DiversityMetrics {
		content_diversity: types.len() as f64 / n,
		language_diversity: languages.len() as f64 / n,
		avg_popularity: mean(&popularity),
		popularity_std: sample_std(&popularity),
	})
}
