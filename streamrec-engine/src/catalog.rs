// ---------------------------------------------------------------------------
// Catalog — immutable table of content items
// ---------------------------------------------------------------------------
//
// Row order is fixed at construction. Every index handed out by this module
// is also the row of the same item in the representation matrix.
// ---------------------------------------------------------------------------

use std::collections::HashMap;

use crate::error::{LoadError, RecommendError};
use crate::types::{ContentItem, ResolvedItem};

/// Default cap for [`Catalog::search`].
pub const DEFAULT_SEARCH_RESULTS: usize = 10;

#[derive(Debug, Clone)]
pub struct Catalog {
	items: Vec<ContentItem>,
}

impl Catalog {
	/// Build a catalog, rejecting malformed rows up front.
	///
	/// Category codes must be 1:1 with their category names across the
	/// whole table.
	pub fn new(items: Vec<ContentItem>) -> Result<Self, LoadError> {
		if items.is_empty() {
			return Err(LoadError::EmptyCatalog);
		}
		validate_table(&items)?;
		Ok(Self { items })
	}

	pub fn len(&self) -> usize {
		self.items.len()
	}

	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	pub fn items(&self) -> &[ContentItem] {
		&self.items
	}

	pub fn get(&self, index: usize) -> Result<&ContentItem, RecommendError> {
		self.items.get(index).ok_or(RecommendError::IndexOutOfRange {
			index,
			len: self.items.len(),
		})
	}

	/// Case-insensitive substring lookup. The first matching row in catalog
	/// order wins, regardless of how close other matches are.
	pub fn resolve(&self, query: &str) -> Result<Option<ResolvedItem>, RecommendError> {
		if query.trim().is_empty() {
			return Err(RecommendError::InvalidQuery("query is empty".into()));
		}
		let needle = query.to_lowercase();

		let hit = self
			.matching(&needle)
			.next()
			.map(|(index, item)| ResolvedItem {
				index,
				item: item.clone(),
			});
		Ok(hit)
	}

	/// All rows whose title contains `query`, in catalog order, capped at
	/// `max_results`. An empty query matches nothing.
	pub fn search(&self, query: &str, max_results: usize) -> Vec<ResolvedItem> {
		if query.trim().is_empty() {
			return Vec::new();
		}
		let needle = query.to_lowercase();

		self.matching(&needle)
			.take(max_results)
			.map(|(index, item)| ResolvedItem {
				index,
				item: item.clone(),
			})
			.collect()
	}

	fn matching<'a>(
		&'a self,
		needle: &'a str,
	) -> impl Iterator<Item = (usize, &'a ContentItem)> + 'a {
		self.items
			.iter()
			.enumerate()
			.filter(move |(_, item)| item.title.to_lowercase().contains(needle))
	}
}

fn validate_table(items: &[ContentItem]) -> Result<(), LoadError> {
	let mut type_codes = CodeBook::new("content type");
	let mut language_codes = CodeBook::new("language");

	for (row, item) in items.iter().enumerate() {
		validate_row(item)
			.and_then(|_| type_codes.observe(&item.content_type, item.content_type_code))
			.and_then(|_| language_codes.observe(&item.language, item.language_code))
			.map_err(|reason| {
				tracing::warn!(row, %reason, "rejecting catalog row");
				LoadError::InvalidRow { row, reason }
			})?;
	}
	Ok(())
}

fn validate_row(item: &ContentItem) -> Result<(), String> {
	if item.title.trim().is_empty() {
		return Err("title is empty".into());
	}
	if !item.hours_viewed.is_finite() || item.hours_viewed < 0.0 {
		return Err(format!(
			"hoursViewed must be a non-negative number, got {}",
			item.hours_viewed
		));
	}
	if !item.popularity_score.is_finite() {
		return Err("popularityScore is not finite".into());
	}
	Ok(())
}

/// Tracks the category <-> code mapping seen so far.
struct CodeBook<'a> {
	field: &'static str,
	by_name: HashMap<&'a str, u32>,
	by_code: HashMap<u32, &'a str>,
}

impl<'a> CodeBook<'a> {
	fn new(field: &'static str) -> Self {
		Self {
			field,
			by_name: HashMap::new(),
			by_code: HashMap::new(),
		}
	}

	fn observe(&mut self, name: &'a str, code: u32) -> Result<(), String> {
		if let Some(&known) = self.by_name.get(name) {
			if known != code {
				return Err(format!(
					"{} '{}' has code {} but was previously encoded as {}",
					self.field, name, code, known
				));
			}
		}
		if let Some(&known) = self.by_code.get(&code) {
			if known != name {
				return Err(format!(
					"{} code {} is used for both '{}' and '{}'",
					self.field, code, known, name
				));
			}
		}
		self.by_name.insert(name, code);
		self.by_code.insert(code, name);
		Ok(())
	}
}
