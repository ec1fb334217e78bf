//! qpaper-client: Generation-service integration.
//!
//! Implements the `GenerationClient` trait over the question bank's REST
//! API, loads configuration, and provides a mock client for tests.

pub mod config;
pub mod http;
pub mod mock;

pub use config::{create_client, load_config, load_config_from, QpaperConfig, ServiceConfig};
pub use http::HttpGenerationClient;
pub use mock::{MockGenerationClient, MockReply};
pub use qpaper_core::error::ClientError;
