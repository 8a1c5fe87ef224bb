// ---------------------------------------------------------------------------
// Similarity scorer — cosine ranking over the representation matrix
// ---------------------------------------------------------------------------

use std::cmp::Ordering;

use crate::cosine::cosine_with_magnitudes;
use crate::error::RecommendError;
use crate::representations::RepresentationMatrix;
use crate::types::ScoredIndex;

/// Rank every other row by cosine similarity to `target`, best first.
///
/// The target row is never part of the result. Equal scores keep catalog
/// order. At most `min(k, rows - 1)` entries are returned.
pub fn similar_items(
	matrix: &RepresentationMatrix,
	target: usize,
	k: usize,
) -> Result<Vec<ScoredIndex>, RecommendError> {
	let (target_row, target_mag) = match (matrix.row(target), matrix.magnitude(target)) {
		(Some(row), Some(mag)) => (row, mag),
		_ => {
			return Err(RecommendError::IndexOutOfRange {
				index: target,
				len: matrix.len(),
			})
		}
	};

	if k == 0 {
		return Ok(Vec::new());
	}

	let mut scored: Vec<ScoredIndex> = matrix
		.iter()
		.filter(|(index, _, _)| *index != target)
		.map(|(index, row, mag)| ScoredIndex {
			index,
			score: cosine_with_magnitudes(target_row, row, target_mag, mag),
		})
		.collect();

	sort_descending(&mut scored);
	scored.truncate(k);
	Ok(scored)
}

/// Stable descending sort by score. `-0.0` and `0.0` compare equal.
pub(crate) fn sort_descending(scored: &mut [ScoredIndex]) {
	scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
}

#[cfg(test)]
mod tests {
	use super::*;

	fn matrix(rows: Vec<Vec<f32>>) -> RepresentationMatrix {
		RepresentationMatrix::from_rows(rows).unwrap()
	}

	#[test]
	fn ranks_by_cosine_and_excludes_self() {
		let m = matrix(vec![vec![1.0, 0.0], vec![0.9, 0.1], vec![0.0, 1.0]]);
		let result = similar_items(&m, 0, 5).unwrap();
		let indices: Vec<usize> = result.iter().map(|s| s.index).collect();
		assert_eq!(indices, vec![1, 2]);
		assert!(result[0].score > 0.99);
		assert!(result[1].score.abs() < 1e-12);
	}

	#[test]
	fn self_excluded_even_when_duplicated() {
		let m = matrix(vec![vec![0.5, 0.5], vec![0.5, 0.5], vec![1.0, 0.0]]);
		let result = similar_items(&m, 1, 2).unwrap();
		assert!(result.iter().all(|s| s.index != 1));
		assert_eq!(result[0].index, 0);
	}

	#[test]
	fn ties_keep_catalog_order() {
		let m = matrix(vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.0, 2.0], vec![0.0, 3.0]]);
		let result = similar_items(&m, 0, 3).unwrap();
		let indices: Vec<usize> = result.iter().map(|s| s.index).collect();
		assert_eq!(indices, vec![1, 2, 3]);
	}

	#[test]
	fn k_clamped_to_peers() {
		let m = matrix(vec![vec![1.0], vec![2.0], vec![3.0]]);
		assert_eq!(similar_items(&m, 2, 10).unwrap().len(), 2);
		assert_eq!(similar_items(&m, 2, 1).unwrap().len(), 1);
		assert!(similar_items(&m, 2, 0).unwrap().is_empty());
	}

	#[test]
	fn single_row_has_no_peers() {
		let m = matrix(vec![vec![1.0, 2.0]]);
		assert!(similar_items(&m, 0, 5).unwrap().is_empty());
	}

	#[test]
	fn out_of_range_target() {
		let m = matrix(vec![vec![1.0]]);
		assert!(matches!(
			similar_items(&m, 4, 1),
			Err(RecommendError::IndexOutOfRange { index: 4, len: 1 })
		));
	}
}
