//! Tracing subscriber setup for embedders and tests

use super::constants::{APP_NAME_LOWER, ENV_LOG};

/// Install a compact fmt subscriber filtered by `FILTERKIT_LOG` or `RUST_LOG`
///
/// Returns `false` if a global subscriber was already installed.
pub fn init_logging() -> bool {
    let default_filter = format!("warn,{}=info", APP_NAME_LOWER);

    let filter = std::env::var(ENV_LOG)
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or(default_filter);

    tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true)
        .compact()
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_is_idempotent() {
        init_logging();
        assert!(!init_logging());
    }
}
