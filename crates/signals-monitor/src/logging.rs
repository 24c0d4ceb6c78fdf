//! Logging setup.

use signals_config::LogFormat;
use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{fmt, fmt::writer::BoxMakeWriter, prelude::*, EnvFilter};

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over `level`. Logs go to stderr, or are
/// appended to `file` without ANSI colours.
pub fn setup_logging(level: &str, format: LogFormat, file: Option<&Path>) -> io::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    let writer = match file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        None => BoxMakeWriter::new(io::stderr),
    };
    let ansi = file.is_none();

    let registry = tracing_subscriber::registry().with(filter);
    let result = match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(writer))
            .try_init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().pretty().with_ansi(ansi).with_writer(writer))
            .try_init(),
        LogFormat::Compact => registry
            .with(fmt::layer().compact().with_ansi(ansi).with_writer(writer))
            .try_init(),
    };
    result.map_err(io::Error::other)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_logging_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("signals.log");

        // only one global subscriber per process; this test owns it
        setup_logging("info", LogFormat::Json, Some(&path)).unwrap();
        tracing::info!(pair = "BTC/USDT", "hello");
        assert!(path.exists());

        // a second install is reported, not panicked on
        assert!(setup_logging("info", LogFormat::Pretty, None).is_err());
    }

    #[test]
    fn test_unwritable_file() {
        let result = setup_logging("info", LogFormat::Compact, Some(Path::new("/nonexistent/dir/x.log")));
        assert!(result.is_err());
    }
}
