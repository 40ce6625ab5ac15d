use tracing_subscriber::{fmt, EnvFilter};

use crate::app::AppError;

/// Default verbosity when `RUST_LOG` is unset: the pipeline at info, with
/// the noisier server and fetch internals held back to warnings.
const DEFAULT_FILTER: &str = "info,actix_server=warn,reqwest=warn";

pub fn init() -> Result<(), AppError> {
    fmt()
        .with_env_filter(default_filter())
        .with_target(true)
        .try_init()
        .map_err(AppError::logging_init)
}

fn default_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

#[cfg(test)]
mod tests {
    use tracing_subscriber::EnvFilter;

    use super::DEFAULT_FILTER;

    #[test]
    fn default_filter_directive_parses() {
        EnvFilter::try_new(DEFAULT_FILTER).expect("default filter directive must parse");
    }
}
