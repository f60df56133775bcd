use tracing_subscriber::EnvFilter;

pub const LOG_ENV_VAR: &str = "TASKDECK_LOG";

/// Installs a stderr subscriber. `TASKDECK_LOG` takes precedence over the
/// configured level. Calling it twice is harmless.
pub fn init_logging(default_level: &str) {
    let filter = filter_for(std::env::var(LOG_ENV_VAR).ok().as_deref(), default_level);

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .try_init();
}

fn filter_for(env_value: Option<&str>, default_level: &str) -> EnvFilter {
    env_value
        .filter(|value| !value.trim().is_empty())
        .and_then(|value| EnvFilter::try_new(value).ok())
        .unwrap_or_else(|| EnvFilter::new(default_level))
}

#[cfg(test)]
mod tests {
    use super::filter_for;

    #[test]
    fn env_value_wins_over_default() {
        assert_eq!(filter_for(Some("debug"), "warn").to_string(), "debug");
    }

    #[test]
    fn blank_env_value_uses_default() {
        assert_eq!(filter_for(Some("  "), "info").to_string(), "info");
        assert_eq!(filter_for(None, "warn").to_string(), "warn");
    }
}
