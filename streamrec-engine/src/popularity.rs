// ---------------------------------------------------------------------------
// Popularity scorer — peers sharing a content type or language
// ---------------------------------------------------------------------------
//
// Stands in for collaborative filtering when no interaction logs exist:
// items of the same type or language are assumed to share an audience, and
// the most popular of them are recommended.
// ---------------------------------------------------------------------------

use crate::catalog::Catalog;
use crate::error::RecommendError;
use crate::similarity::sort_descending;
use crate::types::ScoredIndex;

/// Top `k` items sharing `content_type_code` or `language_code` with
/// `target`, ranked by `popularity_score`. The score of each entry is the
/// item's popularity. Equal popularity keeps catalog order.
pub fn popular_peers(
	catalog: &Catalog,
	target: usize,
	k: usize,
) -> Result<Vec<ScoredIndex>, RecommendError> {
	let anchor = catalog.get(target)?;
	if k == 0 {
		return Ok(Vec::new());
	}

	let mut peers: Vec<ScoredIndex> = catalog
		.items()
		.iter()
		.enumerate()
		.filter(|(index, item)| {
			*index != target
				&& (item.content_type_code == anchor.content_type_code
					|| item.language_code == anchor.language_code)
		})
		.map(|(index, item)| ScoredIndex {
			index,
			score: item.popularity_score,
		})
		.collect();

	sort_descending(&mut peers);
	peers.truncate(k);
	Ok(peers)
}
