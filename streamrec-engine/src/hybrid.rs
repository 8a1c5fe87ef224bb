// ---------------------------------------------------------------------------
// Hybrid blender — weighted merge of similarity and popularity rankings
// ---------------------------------------------------------------------------
//
// Both scorers are over-fetched so that items dropped by one list can still
// surface through the other without starving the final top-K. Items present
// in both lists get one record carrying both components.
// ---------------------------------------------------------------------------

use std::cmp::Ordering;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::catalog::Catalog;
use crate::error::RecommendError;
use crate::popularity::popular_peers;
use crate::representations::RepresentationMatrix;
use crate::similarity::similar_items;
use crate::types::{
	MergeKey, RecommendationMode, RecommendationRecord, ScoreComponents, ScoredIndex,
};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

pub const DEFAULT_CONTENT_WEIGHT: f64 = 0.6;
pub const DEFAULT_COLLAB_WEIGHT: f64 = 0.4;
pub const DEFAULT_OVER_FETCH: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendWeights {
	pub content: f64,
	pub collab: f64,
}

impl Default for BlendWeights {
	fn default() -> Self {
		Self {
			content: DEFAULT_CONTENT_WEIGHT,
			collab: DEFAULT_COLLAB_WEIGHT,
		}
	}
}

impl BlendWeights {
	/// Weights must be finite and non-negative so the blend stays monotonic.
	pub fn new(content: f64, collab: f64) -> Result<Self, RecommendError> {
		for (name, w) in [("content", content), ("collab", collab)] {
			if !w.is_finite() || w < 0.0 {
				return Err(RecommendError::InvalidParams(format!(
					"{name} weight must be a non-negative number, got {w}"
				)));
			}
		}
		Ok(Self { content, collab })
	}

	pub fn combine(&self, content: f64, collab: f64) -> f64 {
		self.content * content + self.collab * collab
	}
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendConfig {
	pub weights: BlendWeights,
	pub merge_key: MergeKey,
	/// Each scorer is asked for `over_fetch * k` candidates.
	pub over_fetch: usize,
}

impl Default for BlendConfig {
	fn default() -> Self {
		Self {
			weights: BlendWeights::default(),
			merge_key: MergeKey::default(),
			over_fetch: DEFAULT_OVER_FETCH,
		}
	}
}

// ---------------------------------------------------------------------------
// Blending
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Identity<'a> {
	Title(&'a str),
	Row(usize),
}

fn identity<'a>(catalog: &'a Catalog, key: MergeKey, index: usize) -> Identity<'a> {
	match key {
		MergeKey::Title => match catalog.items().get(index) {
			Some(item) => Identity::Title(item.title.as_str()),
			None => Identity::Row(index),
		},
		MergeKey::Index => Identity::Row(index),
	}
}

struct Slot {
	index: usize,
	content: Option<f64>,
	collab: Option<f64>,
}

/// Merge two ranked lists into at most `k` hybrid records.
///
/// Within each source list the first occurrence of an identity wins. With
/// [`MergeKey::Title`] that means distinct rows sharing a title collapse into
/// the row that was seen first.
pub fn blend(
	catalog: &Catalog,
	similar: &[ScoredIndex],
	popular: &[ScoredIndex],
	k: usize,
	config: &BlendConfig,
) -> Vec<RecommendationRecord> {
	let mut slots: Vec<Slot> = Vec::with_capacity(similar.len() + popular.len());
	let mut by_identity: HashMap<Identity<'_>, usize> = HashMap::new();

	for s in similar {
		if let Entry::Vacant(v) = by_identity.entry(identity(catalog, config.merge_key, s.index)) {
			v.insert(slots.len());
			slots.push(Slot {
				index: s.index,
				content: Some(s.score),
				collab: None,
			});
		}
	}

	for p in popular {
		match by_identity.entry(identity(catalog, config.merge_key, p.index)) {
			Entry::Occupied(o) => {
				let slot = &mut slots[*o.get()];
				if slot.collab.is_none() {
					slot.collab = Some(p.score);
				}
			}
			Entry::Vacant(v) => {
				v.insert(slots.len());
				slots.push(Slot {
					index: p.index,
					content: None,
					collab: Some(p.score),
				});
			}
		}
	}

	let mut records: Vec<RecommendationRecord> = slots
		.into_iter()
		.filter_map(|slot| {
			let item = catalog.items().get(slot.index)?;
			let components = ScoreComponents {
				content: slot.content.unwrap_or(0.0),
				collab: slot.collab.unwrap_or(0.0),
			};
			let score = config.weights.combine(components.content, components.collab);
			let mut record =
				RecommendationRecord::from_item(slot.index, item, score, RecommendationMode::Hybrid);
			record.components = Some(components);
			Some(record)
		})
		.collect();

	records.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
	records.truncate(k);
	records
}

/// Run both scorers for `target` with over-fetch, then blend.
pub fn hybrid_recommendations(
	catalog: &Catalog,
	matrix: &RepresentationMatrix,
	target: usize,
	k: usize,
	config: &BlendConfig,
) -> Result<Vec<RecommendationRecord>, RecommendError> {
	let fetch = k.saturating_mul(config.over_fetch.max(1));
	let similar = similar_items(matrix, target, fetch)?;
	let popular = popular_peers(catalog, target, fetch)?;

	tracing::debug!(
		target,
		k,
		similar = similar.len(),
		popular = popular.len(),
		"blending hybrid candidates"
	);

	Ok(blend(catalog, &similar, &popular, k, config))
}
