use std::env;
use std::fs;
use std::path::Path;
use tracing::warn;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Silent,
    Normal,
    Verbose,
}

impl Verbosity {
    fn default_filter(self) -> &'static str {
        match self {
            Verbosity::Verbose => "debug",
            Verbosity::Normal | Verbosity::Silent => "info",
        }
    }
}

/// Install the global subscriber. `TRACING_LEVEL` overrides the verbosity
/// flags. When `log_file` is set, events are also appended there; keep the
/// returned guard alive until exit so the file writer flushes.
pub fn init_logger(verbosity: Verbosity, log_file: Option<&Path>) -> Option<WorkerGuard> {
    let filter = env::var("TRACING_LEVEL").unwrap_or_else(|_| verbosity.default_filter().to_string());
    let filter_layer = EnvFilter::new(filter);

    let stdout_layer = (verbosity != Verbosity::Silent).then(|| {
        fmt::layer()
            .with_writer(std::io::stdout)
            .with_target(false)
            .without_time()
            .with_ansi(true)
    });

    let mut file_error = None;
    let (file_layer, guard) = match log_file.map(open_appender) {
        Some(Ok(appender)) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(non_blocking).with_ansi(false);
            (Some(layer), Some(guard))
        }
        Some(Err(e)) => {
            file_error = Some(e);
            (None, None)
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .with(filter_layer)
        .init();

    if let Some(e) = file_error {
        warn!("File logging disabled: {}", e);
    }

    guard
}

fn open_appender(path: &Path) -> std::io::Result<tracing_appender::rolling::RollingFileAppender> {
    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path.file_name().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("log path {} has no file name", path.display()),
        )
    })?;
    fs::create_dir_all(dir)?;
    Ok(tracing_appender::rolling::never(dir, file_name))
}
