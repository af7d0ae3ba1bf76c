use tracing_subscriber::EnvFilter;

fn default_directive(verbosity: u8) -> String {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    format!("vid2gif={level}")
}

/// Installs the stderr subscriber. `RUST_LOG` wins over the verbosity flag.
/// A second call is a no-op.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_raises_level() {
        assert_eq!(default_directive(0), "vid2gif=warn");
        assert_eq!(default_directive(1), "vid2gif=info");
        assert_eq!(default_directive(4), "vid2gif=debug");
    }
}
