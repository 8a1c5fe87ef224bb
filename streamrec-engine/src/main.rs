use anyhow::Result;
use clap::Parser;
use streamrec_engine::config::CliArgs;
use streamrec_engine::engine::RecommendationEngine;
use streamrec_engine::server::RecommendServer;
use streamrec_engine::transport::NdjsonTransport;

fn main() -> Result<()> {
	let args = CliArgs::parse();

	// stdout carries the protocol, logs go to stderr
	tracing_subscriber::fmt()
		.with_writer(std::io::stderr)
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level)),
		)
		.init();

	let config = args.server_config()?;
	let mut server = RecommendServer::new(NdjsonTransport::new(), config.clone());

	match (&args.catalog, &args.representations) {
		(Some(catalog), Some(representations)) => {
			match RecommendationEngine::from_paths(catalog, representations, config.blend) {
				Ok(engine) => server.set_engine(engine),
				Err(e) => {
					tracing::error!("Failed to load catalog: {}", e);
					server.mark_unavailable(format!("load failed: {e}"));
				}
			}
		}
		(None, None) => tracing::info!("No catalog configured; waiting for engine/load"),
		_ => {
			tracing::warn!("Both --catalog and --representations are required to preload");
			server.mark_unavailable("incomplete load configuration");
		}
	}

	tracing::info!(available = server.is_available(), "streamrec-engine ready");
	server.run()?;
	Ok(())
}
