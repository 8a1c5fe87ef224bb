use std::io::Write;
use std::sync::Mutex;

use crate::protocol::{JsonRpcError, JsonRpcResponse};

/// NDJSON writer for JSON-RPC 2.0 responses: one JSON object per line.
///
/// Defaults to stdout; any writer can be substituted for tests.
pub struct NdjsonTransport {
	out: Mutex<Box<dyn Write + Send>>,
}

impl Default for NdjsonTransport {
	fn default() -> Self {
		Self::new()
	}
}

impl NdjsonTransport {
	pub fn new() -> Self {
		Self::with_writer(Box::new(std::io::stdout()))
	}

	pub fn with_writer(out: Box<dyn Write + Send>) -> Self {
		Self {
			out: Mutex::new(out),
		}
	}

	pub fn write_response(&self, id: u64, result: serde_json::Value) {
		self.write_line(&JsonRpcResponse {
			jsonrpc: "2.0",
			id,
			result: Some(result),
			error: None,
		});
	}

	pub fn write_error(
		&self,
		id: u64,
		code: i32,
		message: impl Into<String>,
		data: Option<serde_json::Value>,
	) {
		self.write_line(&JsonRpcResponse {
			jsonrpc: "2.0",
			id,
			result: None,
			error: Some(JsonRpcError {
				code,
				message: message.into(),
				data,
			}),
		});
	}

	fn write_line(&self, value: &impl serde::Serialize) {
		let mut out = match self.out.lock() {
			Ok(guard) => guard,
			Err(poisoned) => poisoned.into_inner(),
		};
		if let Err(e) = serde_json::to_writer(&mut *out, value) {
			tracing::error!("Failed to serialize response: {}", e);
			return;
		}
		if let Err(e) = writeln!(out) {
			tracing::error!("Failed to write newline: {}", e);
		}
		if let Err(e) = out.flush() {
			tracing::error!("Failed to flush output: {}", e);
		}
	}
}
