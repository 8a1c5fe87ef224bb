use crate::cosine::magnitude;
use crate::error::LoadError;

/// Dense row-major `rows x dimensions` matrix of item embeddings.
///
/// Read-only after construction. Row magnitudes are cached so similarity
/// scans only pay for the dot products.
#[derive(Debug, Clone)]
pub struct RepresentationMatrix {
	rows: usize,
	dimensions: usize,
	data: Vec<f32>,
	magnitudes: Vec<f64>,
}

impl RepresentationMatrix {
	/// Build from packed row-major values.
	pub fn from_flat(rows: usize, dimensions: usize, data: Vec<f32>) -> Result<Self, LoadError> {
		if rows == 0 {
			return Err(LoadError::Corruption("representation matrix has no rows".into()));
		}
		if dimensions == 0 {
			return Err(LoadError::Corruption(
				"representation matrix has zero dimensions".into(),
			));
		}
		let expected = rows.checked_mul(dimensions).ok_or_else(|| {
			LoadError::Corruption(format!("matrix shape {rows}x{dimensions} overflows"))
		})?;
		if data.len() != expected {
			return Err(LoadError::Corruption(format!(
				"expected {} values for a {}x{} matrix, found {}",
				expected,
				rows,
				dimensions,
				data.len()
			)));
		}
		if let Some(pos) = data.iter().position(|v| !v.is_finite()) {
			return Err(LoadError::Corruption(format!(
				"non-finite value in row {}",
				pos / dimensions
			)));
		}

		let magnitudes = data.chunks_exact(dimensions).map(magnitude).collect();
		Ok(Self {
			rows,
			dimensions,
			data,
			magnitudes,
		})
	}

	/// Build from nested rows; every row must have the same length.
	pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self, LoadError> {
		let dimensions = rows.first().map(Vec::len).unwrap_or(0);
		if let Some(bad) = rows.iter().position(|r| r.len() != dimensions) {
			return Err(LoadError::Corruption(format!(
				"row {} has {} dimensions, expected {}",
				bad,
				rows[bad].len(),
				dimensions
			)));
		}
		let count = rows.len();
		let data: Vec<f32> = rows.into_iter().flatten().collect();
		Self::from_flat(count, dimensions, data)
	}

	pub fn len(&self) -> usize {
		self.rows
	}

	pub fn is_empty(&self) -> bool {
		self.rows == 0
	}

	pub fn dimensions(&self) -> usize {
		self.dimensions
	}

	pub fn row(&self, index: usize) -> Option<&[f32]> {
		if index >= self.rows {
			return None;
		}
		let start = index * self.dimensions;
		Some(&self.data[start..start + self.dimensions])
	}

	pub fn magnitude(&self, index: usize) -> Option<f64> {
		self.magnitudes.get(index).copied()
	}

	/// Iterate `(index, row, magnitude)` in row order.
	pub fn iter(&self) -> impl Iterator<Item = (usize, &[f32], f64)> + '_ {
		self.data
			.chunks_exact(self.dimensions)
			.zip(self.magnitudes.iter().copied())
			.enumerate()
			.map(|(i, (row, mag))| (i, row, mag))
	}
}
