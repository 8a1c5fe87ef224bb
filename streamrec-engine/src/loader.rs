// ---------------------------------------------------------------------------
// Loader — catalog and representation files
// ---------------------------------------------------------------------------
//
// Catalog: JSON array of camelCase rows.
// Representations: JSON, either nested rows `[[f32, ...], ...]` or a packed
// object `{ "rows": N, "dimensions": D, "data": "<base64>" }` where `data`
// is N*D little-endian f32 values.
//
// Either file may be gzip-compressed; compression is detected from the magic
// bytes. Loading is all-or-nothing.
// ---------------------------------------------------------------------------

use std::io::Read;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flate2::read::GzDecoder;
use serde::Deserialize;

use crate::catalog::Catalog;
use crate::error::LoadError;
use crate::representations::RepresentationMatrix;
use crate::types::ContentItem;

/// Both halves of the engine's data, index-aligned.
#[derive(Debug, Clone)]
pub struct LoadedData {
	pub catalog: Catalog,
	pub matrix: RepresentationMatrix,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RepresentationFile {
	Packed {
		rows: usize,
		dimensions: usize,
		data: String,
	},
	Nested(Vec<Vec<f32>>),
}

// ---------------------------------------------------------------------------
// Byte-level helpers
// ---------------------------------------------------------------------------

/// Check for the gzip magic bytes (0x1f, 0x8b).
pub fn is_gzipped(data: &[u8]) -> bool {
	data.len() >= 2 && data[0] == 0x1f && data[1] == 0x8b
}

/// Gunzip when the payload is compressed, otherwise pass it through.
pub fn inflate(data: Vec<u8>) -> Result<Vec<u8>, LoadError> {
	if !is_gzipped(&data) {
		return Ok(data);
	}
	let mut decoder = GzDecoder::new(data.as_slice());
	let mut out = Vec::new();
	decoder.read_to_end(&mut out)?;
	Ok(out)
}

/// Decode base64 of little-endian f32 values.
pub fn decode_f32_le(encoded: &str) -> Result<Vec<f32>, LoadError> {
	let bytes = STANDARD
		.decode(encoded.trim())
		.map_err(|e| LoadError::Corruption(format!("Invalid base64: {}", e)))?;
	if bytes.len() % 4 != 0 {
		return Err(LoadError::Corruption(format!(
			"packed data is {} bytes, not a multiple of 4",
			bytes.len()
		)));
	}
	Ok(bytes
		.chunks_exact(4)
		.map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
		.collect())
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

pub fn parse_catalog(bytes: Vec<u8>) -> Result<Catalog, LoadError> {
	let raw = inflate(bytes)?;
	let items: Vec<ContentItem> = serde_json::from_slice(&raw)
		.map_err(|e| LoadError::Parse(format!("catalog: {}", e)))?;
	Catalog::new(items)
}

pub fn parse_representations(bytes: Vec<u8>) -> Result<RepresentationMatrix, LoadError> {
	let raw = inflate(bytes)?;
	let file: RepresentationFile = serde_json::from_slice(&raw)
		.map_err(|e| LoadError::Parse(format!("representations: {}", e)))?;
	match file {
		RepresentationFile::Packed {
			rows,
			dimensions,
			data,
		} => RepresentationMatrix::from_flat(rows, dimensions, decode_f32_le(&data)?),
		RepresentationFile::Nested(rows) => RepresentationMatrix::from_rows(rows),
	}
}

/// Fail unless catalog row *i* and matrix row *i* can describe the same item.
pub fn check_alignment(catalog: &Catalog, matrix: &RepresentationMatrix) -> Result<(), LoadError> {
	if catalog.len() != matrix.len() {
		return Err(LoadError::Misaligned {
			catalog_rows: catalog.len(),
			matrix_rows: matrix.len(),
		});
	}
	Ok(())
}

// ---------------------------------------------------------------------------
// File loading
// ---------------------------------------------------------------------------

pub fn load(catalog_path: &Path, representations_path: &Path) -> Result<LoadedData, LoadError> {
	tracing::info!(path = %catalog_path.display(), "Loading catalog");
	let catalog = parse_catalog(std::fs::read(catalog_path)?)?;

	tracing::info!(path = %representations_path.display(), "Loading representations");
	let matrix = parse_representations(std::fs::read(representations_path)?)?;

	check_alignment(&catalog, &matrix)?;

	tracing::info!(
		items = catalog.len(),
		dimensions = matrix.dimensions(),
		"Catalog and representations loaded"
	);
	Ok(LoadedData { catalog, matrix })
}

#[cfg(test)]
mod tests {
	use super::*;
	use flate2::write::GzEncoder;
	use flate2::Compression;
	use serde_json::json;
	use std::io::Write;

	fn encode_f32_le(values: &[f32]) -> String {
		let bytes: Vec<u8> = values.iter().flat_map(|f| f.to_le_bytes()).collect();
		STANDARD.encode(bytes)
	}

	fn gzip(data: &[u8]) -> Vec<u8> {
		let mut enc = GzEncoder::new(Vec::new(), Compression::new(6));
		enc.write_all(data).unwrap();
		enc.finish().unwrap()
	}

	fn catalog_json() -> serde_json::Value {
		json!([
			{
				"title": "A", "contentType": "Movie", "language": "EN",
				"hoursViewed": 900.0, "popularityScore": 0.9, "contentAge": 1,
				"contentTypeCode": 0, "languageCode": 0
			},
			{
				"title": "B", "contentType": "Movie", "language": "EN",
				"hoursViewed": 500.0, "popularityScore": 0.5, "contentAge": 2,
				"contentTypeCode": 0, "languageCode": 0
			}
		])
	}

	#[test]
	fn gzip_detection() {
		assert!(is_gzipped(&gzip(b"[]")));
		assert!(!is_gzipped(b"[]"));
		assert!(!is_gzipped(&[0x1f]));
	}

	#[test]
	fn parses_plain_and_gzipped_catalog() {
		let raw = serde_json::to_vec(&catalog_json()).unwrap();
		let plain = parse_catalog(raw.clone()).unwrap();
		let zipped = parse_catalog(gzip(&raw)).unwrap();
		assert_eq!(plain.len(), 2);
		assert_eq!(plain.items(), zipped.items());
	}

	#[test]
	fn catalog_with_missing_field_is_parse_error() {
		let raw = br#"[{"title": "A"}]"#.to_vec();
		assert!(matches!(parse_catalog(raw), Err(LoadError::Parse(_))));
	}

	#[test]
	fn parses_nested_representations() {
		let raw = serde_json::to_vec(&json!([[1.0, 0.0], [0.9, 0.1]])).unwrap();
		let m = parse_representations(raw).unwrap();
		assert_eq!(m.len(), 2);
		assert_eq!(m.dimensions(), 2);
	}

	#[test]
	fn parses_packed_gzipped_representations() {
		let values = [1.0f32, 0.0, 0.9, 0.1, 0.0, 1.0];
		let raw = serde_json::to_vec(&json!({
			"rows": 3,
			"dimensions": 2,
			"data": encode_f32_le(&values),
		}))
		.unwrap();
		let m = parse_representations(gzip(&raw)).unwrap();
		assert_eq!(m.len(), 3);
		assert_eq!(m.row(2), Some(&[0.0f32, 1.0][..]));
	}

	#[test]
	fn packed_shape_mismatch_is_corruption() {
		let raw = serde_json::to_vec(&json!({
			"rows": 2,
			"dimensions": 2,
			"data": encode_f32_le(&[1.0, 2.0, 3.0]),
		}))
		.unwrap();
		assert!(matches!(
			parse_representations(raw),
			Err(LoadError::Corruption(_))
		));
	}

	#[test]
	fn bad_base64_is_corruption() {
		assert!(decode_f32_le("not base64!!").is_err());
		assert!(decode_f32_le(&STANDARD.encode([0u8, 1, 2])).is_err());
	}

	#[test]
	fn load_rejects_misaligned_files() {
		let dir = tempfile::tempdir().unwrap();
		let catalog_path = dir.path().join("catalog.json");
		let repr_path = dir.path().join("repr.json");
		std::fs::write(&catalog_path, serde_json::to_vec(&catalog_json()).unwrap()).unwrap();
		std::fs::write(&repr_path, b"[[1.0, 0.0]]").unwrap();

		let err = load(&catalog_path, &repr_path).unwrap_err();
		assert!(matches!(
			err,
			LoadError::Misaligned {
				catalog_rows: 2,
				matrix_rows: 1
			}
		));
	}

	#[test]
	fn load_reads_both_files() {
		let dir = tempfile::tempdir().unwrap();
		let catalog_path = dir.path().join("catalog.json.gz");
		let repr_path = dir.path().join("repr.json");
		std::fs::write(&catalog_path, gzip(&serde_json::to_vec(&catalog_json()).unwrap())).unwrap();
		std::fs::write(&repr_path, b"[[1.0, 0.0], [0.0, 1.0]]").unwrap();

		let data = load(&catalog_path, &repr_path).unwrap();
		assert_eq!(data.catalog.len(), 2);
		assert_eq!(data.matrix.len(), 2);
	}

	#[test]
	fn missing_file_is_io_error() {
		let dir = tempfile::tempdir().unwrap();
		let err = load(&dir.path().join("nope.json"), &dir.path().join("nope2.json")).unwrap_err();
		assert!(matches!(err, LoadError::Io(_)));
	}
}
