use std::env;

use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Deployment flavour read from `ENVIRONMENT`. Picks the log format and the
/// default filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Production,
    Development,
    Other,
}

impl Environment {
    pub fn from_name(name: &str) -> Self {
        match name {
            "production" => Environment::Production,
            "development" => Environment::Development,
            _ => Environment::Other,
        }
    }

    pub fn from_env() -> Self {
        env::var("ENVIRONMENT")
            .map(|name| Self::from_name(&name))
            .unwrap_or(Environment::Development)
    }

    /// Filter used when `RUST_LOG` is not set.
    pub fn default_filter(self) -> &'static str {
        match self {
            Environment::Production => "info,jam_sync=debug",
            Environment::Development => "debug",
            Environment::Other => "info",
        }
    }
}

/// Installs the global subscriber: JSON lines in production, pretty output
/// with file and line otherwise. `RUST_LOG` wins over the preset filter.
pub fn init_logging() {
    let environment = Environment::from_env();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(environment.default_filter()));

    let format = match environment {
        Environment::Production => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_thread_ids(true)
            .with_target(true)
            .boxed(),
        _ => tracing_subscriber::fmt::layer()
            .pretty()
            .with_file(true)
            .with_line_number(true)
            .with_thread_ids(true)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();
}
