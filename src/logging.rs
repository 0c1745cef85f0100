//! Logger setup for native and browser builds.

use crate::config::LogLevel;

/// Install the platform logger at the given level.
///
/// Native builds log through `env_logger` (`RUST_LOG` still overrides the
/// level), browser builds through the devtools console. Calling this more
/// than once keeps the first logger.
pub fn init_logging(level: LogLevel) {
    #[cfg(not(target_arch = "wasm32"))]
    {
        let result = env_logger::Builder::new()
            .filter_level(level.to_level_filter())
            .parse_default_env()
            .try_init();
        if result.is_err() {
            log::debug!("Logger already initialized");
        }
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(level.to_level()).is_err() {
            log::debug!("Logger already initialized");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_is_harmless() {
        init_logging(LogLevel::Debug);
        init_logging(LogLevel::Trace);
        log::debug!("still logging");
    }
}
