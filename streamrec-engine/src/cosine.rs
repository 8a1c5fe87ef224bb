/// Dot product of two equal-length rows, accumulated in f64.
fn dot(a: &[f32], b: &[f32]) -> f64 {
	a.iter()
		.zip(b.iter())
		.map(|(&x, &y)| x as f64 * y as f64)
		.sum()
}

/// L2 norm of a representation row.
pub fn magnitude(row: &[f32]) -> f64 {
	row.iter().map(|&v| (v as f64) * (v as f64)).sum::<f64>().sqrt()
}

/// Cosine similarity between two rows.
/// Returns 0.0 for zero-magnitude rows or dimension mismatches.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
	cosine_with_magnitudes(a, b, magnitude(a), magnitude(b))
}

/// Cosine similarity using magnitudes computed ahead of time.
/// Result clamped to [-1.0, 1.0]; non-finite results collapse to 0.0.
pub fn cosine_with_magnitudes(a: &[f32], b: &[f32], mag_a: f64, mag_b: f64) -> f64 {
	if a.len() != b.len() || a.is_empty() {
		return 0.0;
	}

	let denom = mag_a * mag_b;
	if denom == 0.0 {
		return 0.0;
	}

	let result = dot(a, b) / denom;
	if !result.is_finite() {
		return 0.0;
	}
	result.clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parallel_rows_score_one() {
		let row = [0.2f32, 0.4, 0.8];
		let scaled = [1.0f32, 2.0, 4.0];
		assert!((cosine_similarity(&row, &scaled) - 1.0).abs() < 1e-9);
	}

	#[test]
	fn orthogonal_rows_score_zero() {
		assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-12);
	}

	#[test]
	fn opposite_rows_score_minus_one() {
		assert!((cosine_similarity(&[1.0, 1.0], &[-1.0, -1.0]) + 1.0).abs() < 1e-9);
	}

	#[test]
	fn zero_row_scores_zero() {
		assert_eq!(cosine_similarity(&[0.0, 0.0], &[0.3, 0.1]), 0.0);
	}

	#[test]
	fn dimension_mismatch_scores_zero() {
		assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
		assert_eq!(cosine_similarity(&[], &[]), 0.0);
	}

	#[test]
	fn magnitude_of_three_four() {
		assert!((magnitude(&[3.0, 4.0]) - 5.0).abs() < 1e-12);
		assert_eq!(magnitude(&[]), 0.0);
	}

	#[test]
	fn precomputed_magnitudes_match_direct() {
		let a = [1.0f32, 0.0];
		let b = [0.9f32, 0.1];
		let direct = cosine_similarity(&a, &b);
		let cached = cosine_with_magnitudes(&a, &b, magnitude(&a), magnitude(&b));
		assert!((direct - cached).abs() < 1e-12);
		assert!(direct > 0.99 && direct < 1.0);
	}
}
