//! Subscriber setup for binaries. The library crates only emit events.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;

/// Install a stderr `fmt` subscriber.
///
/// `RUST_LOG` takes precedence over `level` when set. Calling this again
/// after a subscriber is installed has no effect.
pub fn init(level: &str) -> Result<(), ParseError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)?,
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_is_harmless() {
        init("warn").unwrap();
        init("debug").unwrap();
    }

    #[test]
    fn invalid_directive() {
        if std::env::var_os("RUST_LOG").is_none() {
            assert!(init("eql=notalevel").is_err());
        }
    }
}
