use serde::Serialize;

pub const DEFAULT_MIN_QUERY_LENGTH: usize = 2;

/// Markup fragments never accepted in a title query.
const REJECTED_PATTERNS: &[&str] = &["<script", "javascript:", "onload=", "onerror="];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryValidation {
	pub valid: bool,
	pub message: String,
}

impl QueryValidation {
	fn ok() -> Self {
		Self {
			valid: true,
			message: String::new(),
		}
	}

	fn rejected(message: impl Into<String>) -> Self {
		Self {
			valid: false,
			message: message.into(),
		}
	}
}

/// Check a user-supplied title query before it reaches the resolver.
pub fn validate_query(input: &str, min_length: usize) -> QueryValidation {
	if input.is_empty() {
		return QueryValidation::rejected("Please enter a search term");
	}
	if input.trim().chars().count() < min_length {
		return QueryValidation::rejected(format!(
			"Search term must be at least {min_length} characters"
		));
	}
	let lowered = input.to_lowercase();
	if REJECTED_PATTERNS.iter().any(|p| lowered.contains(p)) {
		return QueryValidation::rejected("Invalid characters in search term");
	}
	QueryValidation::ok()
}
