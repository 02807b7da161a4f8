pub mod config;
pub mod models;
pub mod pipeline;

pub use config::{MapperConfig, APP_NAME, APP_VERSION};
pub use models::{DocumentType, ExtractedLayout, FieldName, TextBlock};
pub use pipeline::extraction::{build_extraction, ExtractionOutput};
pub use pipeline::mapping::{map_fields, MappingResult};

use tracing_subscriber::EnvFilter;

/// Install the stderr tracing subscriber.
///
/// The filter comes from `PLANPROOF_LOG`, falling back to
/// [`config::default_log_filter`] when unset or unparsable.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env(config::LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
