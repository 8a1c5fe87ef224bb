pub mod analytics;
pub mod catalog;
pub mod config;
pub mod cosine;
pub mod engine;
pub mod error;
pub mod hybrid;
pub mod loader;
pub mod popularity;
pub mod protocol;
pub mod representations;
pub mod server;
pub mod similarity;
pub mod transport;
pub mod types;
pub mod validation;
