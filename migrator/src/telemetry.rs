//! Tracing setup shared by both binaries.
use std::env;

use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "migrator=info,migrator_pipeline=info,migrator_repository=info";

/// Output format of the log layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable console output.
    Pretty,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// Reads `LOG_FORMAT`; `json` (any case) selects JSON, anything else the console.
    pub fn from_env() -> Self {
        Self::parse(env::var("LOG_FORMAT").ok().as_deref())
    }

    fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_lowercase()) {
            Some(v) if v == "json" => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Initializes the global subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing(service_name: &'static str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_target(true))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_target(true))
                .init();
        }
    }

    info!(
        service_name,
        service_version = env!("CARGO_PKG_VERSION"),
        log_format = ?format,
        "Tracing initialized"
    );
}
