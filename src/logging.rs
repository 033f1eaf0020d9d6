use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_DIRECTIVE: &str = "pom_timer=info";

/// Human-readable logs on stderr. `RUST_LOG` replaces the default filter
/// when it is set and valid.
pub fn init_logging() {
    let env_spec = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = build_filter(env_spec.as_deref());

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(filter)
        .try_init();
}

fn build_filter(env_spec: Option<&str>) -> EnvFilter {
    env_spec
        .filter(|spec| !spec.trim().is_empty())
        .and_then(|spec| EnvFilter::try_new(spec).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    fn with_filter<T>(env_spec: Option<&str>, f: impl FnOnce() -> T) -> T {
        let subscriber = tracing_subscriber::registry().with(build_filter(env_spec));
        tracing::subscriber::with_default(subscriber, f)
    }

    #[test]
    fn test_default_filter_is_info() {
        with_filter(None, || {
            assert!(tracing::enabled!(target: "pom_timer::countdown", Level::INFO));
            assert!(!tracing::enabled!(target: "pom_timer::countdown", Level::DEBUG));
        });
    }

    #[test]
    fn test_rust_log_enables_crate_debug() {
        with_filter(Some("pom_timer=debug"), || {
            assert!(tracing::enabled!(target: "pom_timer::focus", Level::DEBUG));
        });
    }

    #[test]
    fn test_bare_level_enables_crate_debug() {
        with_filter(Some("debug"), || {
            assert!(tracing::enabled!(target: "pom_timer::windows", Level::DEBUG));
        });
    }

    #[test]
    fn test_invalid_or_empty_spec_falls_back_to_default() {
        with_filter(Some("pom_timer=loudest"), || {
            assert!(tracing::enabled!(target: "pom_timer::shell", Level::INFO));
            assert!(!tracing::enabled!(target: "pom_timer::shell", Level::DEBUG));
        });
        with_filter(Some("  "), || {
            assert!(tracing::enabled!(target: "pom_timer::alarm", Level::INFO));
        });
    }

    #[test]
    fn test_init_logging_twice_does_not_panic() {
        init_logging();
        init_logging();
    }
}
